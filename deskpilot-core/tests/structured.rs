use serde::Deserialize;

use deskpilot_core::{parse_structured, DeskpilotError};

#[derive(Debug, Deserialize, PartialEq)]
struct Outline {
    steps: Vec<String>,
}

#[test]
fn decodes_bare_json() {
    let outline: Outline = parse_structured("outline", r#"{"steps": ["greet"]}"#).unwrap();
    assert_eq!(outline.steps, vec!["greet"]);
}

#[test]
fn strips_json_code_fence() {
    let raw = "```json\n{\"steps\": [\"a\", \"b\"]}\n```";
    let outline: Outline = parse_structured("outline", raw).unwrap();
    assert_eq!(outline.steps.len(), 2);
}

#[test]
fn strips_anonymous_code_fence() {
    let raw = "```\n{\"steps\": [\"a\"]}\n```";
    let outline: Outline = parse_structured("outline", raw).unwrap();
    assert_eq!(outline.steps, vec!["a"]);
}

#[test]
fn schema_violation_names_expected_type() {
    let err = parse_structured::<Outline>("outline", "not json at all").unwrap_err();
    match err {
        DeskpilotError::SchemaViolation { expected, output } => {
            assert_eq!(expected, "outline");
            assert!(output.contains("not json"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn clips_oversized_output_in_error() {
    let raw = "x".repeat(5_000);
    let err = parse_structured::<Outline>("outline", &raw).unwrap_err();
    match err {
        DeskpilotError::SchemaViolation { output, .. } => {
            assert!(output.chars().count() < 300);
        }
        other => panic!("unexpected error: {other}"),
    }
}
