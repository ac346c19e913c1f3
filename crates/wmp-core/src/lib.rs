#![deny(missing_docs)]
#![doc = "Core error, nuclide identity and reaction types shared by the WMP validation crates."]

pub mod elements;
pub mod errors;
pub mod identity;
pub mod reaction;

pub use errors::{ErrorInfo, WmpError};
pub use identity::{FilenameIdentity, IdentitySource, NameIdentity, NuclideId};
pub use reaction::{Convention, Reaction};
