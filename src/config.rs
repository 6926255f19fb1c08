//! Helpdesk configuration
//!
//! Workflow policies that the domain leaves open are chosen here.
//! Config is read from TOML: an explicit path, `$HELPDESK_CONFIG`, or
//! `~/.config/helpdesk/config.toml` (XDG standard).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::core::services::{AssigneeSelection, ReferenceTime, TransitionTable, Uniqueness};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV: &str = "HELPDESK_CONFIG";

/// Top-level configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeskConfig {
    /// Ticket state machine
    #[serde(default)]
    pub workflow: WorkflowConfig,
    /// Escalation sweep
    #[serde(default)]
    pub escalation: EscalationConfig,
    /// Verification step
    #[serde(default)]
    pub verification: VerificationConfig,
}

/// Ticket state machine settings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowConfig {
    /// Which status changes are legal
    #[serde(default)]
    pub transitions: TransitionTable,
}

/// Escalation sweep settings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscalationConfig {
    /// Instant ticket age is measured from
    #[serde(default)]
    pub reference: ReferenceTime,
    /// Who gets the ticket when it escalates
    #[serde(default)]
    pub assignee_selection: AssigneeSelection,
}

/// Verification step settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationConfig {
    /// How many verifications a ticket may carry
    #[serde(default)]
    pub uniqueness: Uniqueness,
    /// Only resolved tickets can be verified
    #[serde(default = "default_true")]
    pub require_resolved: bool,
    /// Move the ticket back to open when its verification is rejected
    #[serde(default = "default_true")]
    pub reopen_on_reject: bool,
}

const fn default_true() -> bool {
    true
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            uniqueness: Uniqueness::default(),
            require_resolved: true,
            reopen_on_reject: true,
        }
    }
}

impl DeskConfig {
    /// Default config file location
    #[must_use]
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("helpdesk")
            .join("config.toml")
    }

    /// Where config is read from: `explicit`, then `$HELPDESK_CONFIG`, then the default path
    #[must_use]
    pub fn resolve_path(explicit: Option<&Path>) -> PathBuf {
        explicit
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from))
            .unwrap_or_else(Self::default_path)
    }

    /// Parse config from TOML text
    pub fn parse(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load config from `path`.
    ///
    /// A missing file yields defaults; an unreadable or malformed one is an error.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            log::debug!("no config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Save config to `path`, creating parent directories
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    /// Render as TOML
    pub fn to_toml(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}
