//! Integration tests for parsing ProjectManager response data.
//!
//! These tests validate that the pm-sdk models deserialize captured API
//! responses, including fields the models do not declare.

use pm_core::response::ApiResponse;
use pm_core::Error;
use pm_sdk::{Task, UserProfile};
use std::fs;
use std::path::PathBuf;

/// Get the path to the test fixtures directory.
fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

fn load_fixture(name: &str) -> String {
    let fixture_path = fixtures_dir().join(name);
    fs::read_to_string(&fixture_path).unwrap_or_else(|e| {
        panic!(
            "Failed to read fixture at {}: {}",
            fixture_path.display(),
            e
        )
    })
}

#[test]
fn test_deserialize_me() {
    let json_data = load_fixture("me.json");
    let envelope: ApiResponse<UserProfile> = serde_json::from_str(&json_data).unwrap();

    let me = envelope.into_result().unwrap();
    assert_eq!(me.full_name, "Jane Doe");
    assert_eq!(me.email_address, "jane@example.com");
    assert_eq!(me.work_space_name.as_deref(), Some("Acme Consulting"));
    assert_eq!(
        me.user_id.map(|id| id.to_string()).as_deref(),
        Some("0b3b5f8e-7a3f-4c55-9a49-6a3a1f1f2d10")
    );
}

#[test]
fn test_deserialize_task_list() {
    let json_data = load_fixture("tasks.json");
    let envelope: ApiResponse<Vec<Task>> = serde_json::from_str(&json_data).unwrap();

    let tasks = envelope.into_result().unwrap();
    assert_eq!(tasks.len(), 3, "Expected 3 tasks in test data");

    let short_ids: Vec<_> = tasks.iter().map(|t| t.short_id.as_str()).collect();
    assert_eq!(short_ids, ["T-1", "T-2", "T-3"]);

    assert!(tasks.iter().all(|t| t.project_id == tasks[0].project_id));
    assert_eq!(tasks[1].description, None);
    assert_eq!(tasks[2].percent_complete, Some(100));
}

#[test]
fn test_deserialize_unauthorized() {
    let json_data = load_fixture("unauthorized.json");
    let envelope: ApiResponse<UserProfile> = serde_json::from_str(&json_data).unwrap();

    assert_eq!(
        envelope
            .error
            .as_ref()
            .and_then(|e| e.technical_error.as_deref()),
        Some("Bearer token was not recognized")
    );
    assert_eq!(
        envelope.into_result().unwrap_err(),
        Error::Api {
            message: "unauthorized".to_string()
        }
    );
}
