//! Element symbol lookup by atomic number.

/// Element symbols indexed by atomic number. Index 0 is the free neutron.
pub const ATOMIC_SYMBOLS: [&str; 119] = [
    "n", //
    "H", "He", //
    "Li", "Be", "B", "C", "N", "O", "F", "Ne", //
    "Na", "Mg", "Al", "Si", "P", "S", "Cl", "Ar", //
    "K", "Ca", "Sc", "Ti", "V", "Cr", "Mn", "Fe", "Co", "Ni", "Cu", "Zn", "Ga", "Ge", "As",
    "Se", "Br", "Kr", //
    "Rb", "Sr", "Y", "Zr", "Nb", "Mo", "Tc", "Ru", "Rh", "Pd", "Ag", "Cd", "In", "Sn", "Sb",
    "Te", "I", "Xe", //
    "Cs", "Ba", "La", "Ce", "Pr", "Nd", "Pm", "Sm", "Eu", "Gd", "Tb", "Dy", "Ho", "Er", "Tm",
    "Yb", "Lu", "Hf", "Ta", "W", "Re", "Os", "Ir", "Pt", "Au", "Hg", "Tl", "Pb", "Bi", "Po",
    "At", "Rn", //
    "Fr", "Ra", "Ac", "Th", "Pa", "U", "Np", "Pu", "Am", "Cm", "Bk", "Cf", "Es", "Fm", "Md",
    "No", "Lr", "Rf", "Db", "Sg", "Bh", "Hs", "Mt", "Ds", "Rg", "Cn", "Nh", "Fl", "Mc", "Lv",
    "Ts", "Og",
];

/// Returns the element symbol for an atomic number, if known.
pub fn symbol(z: u32) -> Option<&'static str> {
    if z == 0 {
        return None;
    }
    ATOMIC_SYMBOLS.get(z as usize).copied()
}

/// Returns the atomic number for an element symbol (case sensitive).
pub fn atomic_number(symbol: &str) -> Option<u32> {
    ATOMIC_SYMBOLS
        .iter()
        .skip(1)
        .position(|candidate| *candidate == symbol)
        .map(|idx| idx as u32 + 1)
}
