//! Tests for helpdesk configuration

use std::fs;
use std::path::Path;

use helpdesk::config::DeskConfig;
use helpdesk::core::services::{AssigneeSelection, ReferenceTime, TransitionTable, Uniqueness};
use tempfile::TempDir;

// =============================================================================
// PARSING
// =============================================================================

#[test]
fn test_config_default() {
    let config = DeskConfig::default();
    assert_eq!(config.workflow.transitions, TransitionTable::Strict);
    assert_eq!(config.escalation.reference, ReferenceTime::Created);
    assert_eq!(config.escalation.assignee_selection, AssigneeSelection::First);
    assert_eq!(config.verification.uniqueness, Uniqueness::Any);
    assert!(config.verification.require_resolved);
    assert!(config.verification.reopen_on_reject);
}

#[test]
fn test_empty_file_is_defaults() {
    assert_eq!(DeskConfig::parse("").unwrap(), DeskConfig::default());
}

#[test]
fn test_partial_sections_keep_other_defaults() {
    let config = DeskConfig::parse(
        r#"
[escalation]
assignee_selection = "round_robin"

[verification]
reopen_on_reject = false
"#,
    )
    .unwrap();
    assert_eq!(config.escalation.assignee_selection, AssigneeSelection::RoundRobin);
    assert_eq!(config.escalation.reference, ReferenceTime::Created);
    assert!(!config.verification.reopen_on_reject);
    assert!(config.verification.require_resolved);
}

#[test]
fn test_all_options() {
    let config = DeskConfig::parse(
        r#"
[workflow]
transitions = "permissive"

[escalation]
reference = "status_changed"
assignee_selection = "notify_all"

[verification]
uniqueness = "pending"
require_resolved = false
reopen_on_reject = false
"#,
    )
    .unwrap();
    assert_eq!(config.workflow.transitions, TransitionTable::Permissive);
    assert_eq!(config.escalation.reference, ReferenceTime::StatusChanged);
    assert_eq!(config.escalation.assignee_selection, AssigneeSelection::NotifyAll);
    assert_eq!(config.verification.uniqueness, Uniqueness::Pending);
    assert!(!config.verification.require_resolved);
}

#[test]
fn test_unknown_value_is_an_error() {
    assert!(DeskConfig::parse("[workflow]\ntransitions = \"loose\"\n").is_err());
}

// =============================================================================
// FILES
// =============================================================================

#[test]
fn test_missing_file_loads_defaults() {
    let temp = TempDir::new().unwrap();
    let config = DeskConfig::load(&temp.path().join("absent.toml")).unwrap();
    assert_eq!(config, DeskConfig::default());
}

#[test]
fn test_malformed_file_is_an_error() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("config.toml");
    fs::write(&path, "[escalation\nreference = ").unwrap();

    let err = DeskConfig::load(&path).unwrap_err();
    assert!(format!("{err:#}").contains("config.toml"));
}

#[test]
fn test_saved_config_loads_back() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("nested").join("config.toml");
    let mut config = DeskConfig::default();
    config.escalation.assignee_selection = AssigneeSelection::RoundRobin;
    config.verification.uniqueness = Uniqueness::Pending;

    config.save(&path).unwrap();
    assert!(path.exists());
    assert_eq!(DeskConfig::load(&path).unwrap(), config);
}

#[test]
fn test_explicit_path_wins() {
    let explicit = Path::new("/tmp/helpdesk-explicit.toml");
    assert_eq!(DeskConfig::resolve_path(Some(explicit)), explicit);
}

#[test]
fn test_default_path_is_under_helpdesk_dir() {
    let path = DeskConfig::default_path();
    assert!(path.ends_with("helpdesk/config.toml"));
}
