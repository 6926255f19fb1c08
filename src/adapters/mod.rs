//! Adapter implementations for port traits
//!
//! This module contains concrete implementations that handle I/O:
//!
//! - `memory/` - lock-protected in-memory repositories
//! - `toml/` - policy file parsing and validation
//! - `json/` - ticket snapshots and the escalation ledger

pub mod json;
pub mod memory;
pub mod toml;
