//! Core domain logic for the helpdesk
//!
//! This module contains the business rules with no storage or transport
//! dependencies. All external interactions are abstracted through port traits.
//!
//! ## Architecture
//!
//! - `models/` - Domain types (Ticket, EscalationRule, Verification, Role)
//! - `services/` - Lifecycle, permission, escalation and verification rules
//! - `ports/` - Trait definitions for collaborators (repositories, clock, identity)
//! - `error` - The error taxonomy shared by all of the above

pub mod error;
pub mod models;
pub mod ports;
pub mod services;

pub use error::{Error, ErrorKind, Result};
