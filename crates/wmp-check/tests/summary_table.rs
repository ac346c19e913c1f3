use std::fs;

use serde_json::json;
use tempfile::tempdir;
use wmp_check::{render_table, scientific, summarize_directory, write_metadata_table, MetadataRow};

const HEADER: &str =
    "| Nuclide  | WMP File    | Energy Range                 | # Poles | # Windows | CF Order | Zero k0RS |";
const SEPARATOR: &str =
    "| -------- | ----------- | ---------------------------- | ------- | --------- | -------- | --------- |";

fn row(nuclide: &str, file_name: &str, flag: Option<bool>) -> MetadataRow {
    MetadataRow {
        nuclide: nuclide.into(),
        file_name: file_name.into(),
        e_min: 1e-5,
        e_max: 2e4,
        poles: 5,
        windows: 3,
        fit_order: 2,
        zero_radius_correction: flag,
    }
}

#[test]
fn scientific_matches_c_style_exponents() {
    assert_eq!(scientific(1e-5), "1.000000e-05");
    assert_eq!(scientific(2e4), "2.000000e+04");
    assert_eq!(scientific(1.0), "1.000000e+00");
    assert_eq!(scientific(1.5e-120), "1.500000e-120");
}

#[test]
fn table_has_title_header_and_fixed_width_rows() {
    let table = render_table(&[row("U238", "092238.json", Some(true)), row("H1", "001001.json", None)]);
    let lines: Vec<&str> = table.lines().collect();
    assert_eq!(lines[0], "# WMP Library Overview");
    assert_eq!(lines[1], "");
    assert_eq!(lines[2], HEADER);
    assert_eq!(lines[3], SEPARATOR);
    assert_eq!(
        lines[4],
        "| U238     | 092238.json | [1.000000e-05, 2.000000e+04] | 5       | 3         | 2        | yes       |"
    );
    assert!(lines[5].ends_with("| -         |"));
    assert_eq!(lines.len(), 6);
}

#[test]
fn directory_summary_skips_unreadable_files() {
    let dir = tempdir().unwrap();
    let current = json!({
        "E_min": 1e-5,
        "E_max": 2e4,
        "windows": [[1, 2], [3, 4], [5, 5]],
        "data": [[0.0], [0.0], [0.0], [0.0], [0.0]],
        "fit_order": 2,
        "pseudo_k0rs": [0.0, 1.0],
        "samples": {}
    });
    let named = json!({
        "name": "Am242_m1",
        "E_min": 1.0,
        "E_max": 100.0,
        "windows": [[1, 2]],
        "data": [[0.0], [0.0]],
        "fit_order": 3
    });
    fs::write(dir.path().join("092238.json"), serde_json::to_vec(&current).unwrap()).unwrap();
    fs::write(dir.path().join("custom.json"), serde_json::to_vec(&named).unwrap()).unwrap();
    fs::write(dir.path().join("broken.json"), b"{").unwrap();
    fs::write(dir.path().join("notes.txt"), b"ignored").unwrap();

    let summary = summarize_directory(dir.path()).unwrap();
    assert_eq!(summary.rows.len(), 2);
    assert_eq!(summary.skipped.len(), 1);
    assert!(summary.skipped[0].0.ends_with("broken.json"));

    let first = &summary.rows[0];
    assert_eq!(first.nuclide, "U238");
    assert_eq!(first.windows, 3);
    assert_eq!(first.poles, 5);
    assert_eq!(first.zero_radius_correction, Some(false));

    let second = &summary.rows[1];
    assert_eq!(second.nuclide, "Am242_m1");
    assert_eq!(second.file_name, "custom.json");
    assert_eq!(second.zero_radius_correction, None);

    let out = dir.path().join("nuclides.md");
    write_metadata_table(&out, &summary.rows).unwrap();
    assert!(fs::read_to_string(out).unwrap().contains("| U238     | 092238.json |"));
}
