//! TOML policy files
//!
//! Users, roles and escalation rules declared up front.
//!
//! - [`parser`] - Read and deserialize policy files
//! - [`policy`] - Validate entries into domain records

pub mod parser;
pub mod policy;

pub use parser::{PolicyFile, RoleEntry, RuleEntry, load_file, parse_policy};
pub use policy::{Policy, PolicyIssue, load_policy};
