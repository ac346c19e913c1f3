use wmp_core::errors::{ErrorInfo, WmpError};

fn sample_info(code: &str, message: &str) -> ErrorInfo {
    ErrorInfo::new(code, message)
        .with_context("nuclide", "U238")
        .with_context("path", "/tmp/092238.json")
}

#[test]
fn config_errors_are_fatal() {
    let err = WmpError::Config(sample_info("wmp_dir", "directory not found"));
    assert_eq!(err.info().code, "wmp_dir");
    assert!(err.is_fatal());
}

#[test]
fn per_nuclide_errors_are_not_fatal() {
    let errors = [
        WmpError::Precondition(sample_info("ace_file", "reference file not found")),
        WmpError::MissingTemperature(sample_info("temperature", "294K not present")),
        WmpError::InvalidRange(sample_info("grid_bounds", "e_min must be positive")),
        WmpError::Data(sample_info("length", "row length mismatch")),
        WmpError::Identity(sample_info("name_symbol", "unknown element symbol")),
        WmpError::State(sample_info("transition", "out of order")),
    ];
    for err in errors {
        assert!(!err.is_fatal(), "{err} should not abort the batch");
        assert!(err.info().context.contains_key("nuclide"));
    }
}

#[test]
fn display_includes_context_and_hint() {
    let err = WmpError::MissingTemperature(
        ErrorInfo::new("temperature", "reference lacks temperature")
            .with_context("label", "294K")
            .with_hint("regenerate the reference at 294K"),
    );
    let rendered = err.to_string();
    assert!(rendered.starts_with("missing temperature: reference lacks temperature"));
    assert!(rendered.contains("label=294K"));
    assert!(rendered.contains("hint: regenerate"));
}

#[test]
fn errors_round_trip_through_json() {
    let err = WmpError::Precondition(sample_info("ace_file", "reference file not found"));
    let json = serde_json::to_string(&err).expect("serialize");
    assert!(json.contains("\"family\":\"Precondition\""));
    let decoded: WmpError = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(decoded, err);
}
