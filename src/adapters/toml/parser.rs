//! TOML parser for policy files
//!
//! A policy file declares the users, roles and escalation rules a helpdesk
//! starts with:
//!
//! ```toml
//! [[user]]
//! id = "alice"
//! role = "agent"
//!
//! [[role]]
//! name = "triage"
//! permissions = ["escalation:receive"]
//!
//! [[rule]]
//! name = "High priority"
//! priority = "high"
//!
//! [[rule.tier]]
//! level = 1
//! threshold_minutes = 60
//! assignees = ["alice"]
//! ```

use std::fs;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::core::models::{RuleDraft, User};

/// A policy file structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyFile {
    /// Known users
    #[serde(default, rename = "user", skip_serializing_if = "Vec::is_empty")]
    pub users: Vec<User>,

    /// Roles on top of the built-in ones
    #[serde(default, rename = "role", skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<RoleEntry>,

    /// Escalation rules, in evaluation order
    #[serde(default, rename = "rule", skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<RuleEntry>,
}

/// A role entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleEntry {
    /// Optional custom ID (generated as `ROLE-<name>` if omitted)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Unique role name; a built-in name replaces that built-in role
    pub name: String,

    /// What the role is for
    #[serde(default)]
    pub description: String,

    /// Granted permissions
    #[serde(default)]
    pub permissions: Vec<String>,
}

/// A rule entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleEntry {
    /// Optional custom ID (generated as `RULE-N` if omitted)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// The rule itself
    #[serde(flatten)]
    pub draft: RuleDraft,
}

/// Parse a policy from TOML text
pub fn parse_policy(content: &str) -> anyhow::Result<PolicyFile> {
    Ok(toml::from_str(content)?)
}

/// Load a policy file
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load_file(path: &Path) -> anyhow::Result<PolicyFile> {
    let content =
        fs::read_to_string(path).with_context(|| format!("reading policy {}", path.display()))?;
    parse_policy(&content).with_context(|| format!("parsing policy {}", path.display()))
}
