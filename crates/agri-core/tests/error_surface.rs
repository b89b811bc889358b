use agri_core::errors::{AgriError, ErrorInfo};

fn sample_info(code: &str, message: &str) -> ErrorInfo {
    ErrorInfo::new(code, message)
        .with_context("location", "7")
        .with_context("reason", "example")
}

#[test]
fn not_found_is_recoverable() {
    let err = AgriError::NotFound(sample_info("N001", "no model for location"));
    assert_eq!(err.info().code, "N001");
    assert!(err.info().context.contains_key("location"));
    assert!(!err.is_fatal());
}

#[test]
fn validation_is_recoverable() {
    let err = AgriError::validation("seed-length", "seed window must hold 12 months");
    assert_eq!(err.info().code, "seed-length");
    assert!(!err.is_fatal());
}

#[test]
fn training_and_evaluation_are_fatal() {
    assert!(AgriError::Training(sample_info("T001", "diverged")).is_fatal());
    assert!(AgriError::Evaluation(sample_info("E001", "bad row")).is_fatal());
    assert!(AgriError::Storage(sample_info("S001", "disk full")).is_fatal());
    assert!(AgriError::Serde(sample_info("S002", "schema mismatch")).is_fatal());
}

#[test]
fn with_context_keeps_family() {
    let err = AgriError::not_found("crop", "unknown crop").with_context("crop", "wheat");
    assert!(matches!(err, AgriError::NotFound(_)));
    assert_eq!(err.info().context.get("crop").map(String::as_str), Some("wheat"));
}

#[test]
fn display_includes_context_and_hint() {
    let err = AgriError::Validation(
        ErrorInfo::new("boundary", "drivers do not follow the seed")
            .with_context("seed_end", "2022-09")
            .with_hint("fetch drivers starting one month after the seed"),
    );
    let rendered = err.to_string();
    assert!(rendered.starts_with("validation error: drivers do not follow the seed"));
    assert!(rendered.contains("seed_end=2022-09"));
    assert!(rendered.contains("hint: fetch drivers"));
}

#[test]
fn error_serializes_with_family_tag() {
    let err = AgriError::Training(sample_info("T002", "empty split"));
    let json = serde_json::to_value(&err).unwrap();
    assert_eq!(json["family"], "Training");
    assert_eq!(json["detail"]["code"], "T002");
    let back: AgriError = serde_json::from_value(json).unwrap();
    assert_eq!(back, err);
}
