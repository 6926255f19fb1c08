//! helpdesk - ticket lifecycle, tiered escalation and verification for a support desk
//!
//! The library is a hexagonal core plus reference adapters:
//!
//! - [`core`] - models, ports, pure services and the error taxonomy
//! - [`desk`] - the [`desk::Helpdesk`] application service
//! - [`adapters`] - in-memory repositories, TOML policy files, JSON snapshots
//! - [`config`] - workflow policy configuration
//! - [`output`] - human / JSON rendering for the CLI

// Deny all clippy warnings in this crate
#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    missing_debug_implementations,
    trivial_numeric_casts,
    unsafe_code,
    unused_import_braces
)]
// Allow some pedantic lints that are too noisy or not applicable
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::cargo_common_metadata
)]

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod adapters;
pub mod config;
pub mod core;
pub mod desk;
pub mod output;

pub use crate::core::{Error, ErrorKind, Result};
pub use desk::{Collaborators, Helpdesk};
