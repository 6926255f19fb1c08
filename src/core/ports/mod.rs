//! Port traits (interfaces) for external collaborators
//!
//! These traits define the boundaries between the helpdesk rules and the
//! systems around them: storage, identity, time and notification delivery.
//!
//! Implementations live in the `adapters` module.
//!
//! ## Design Principle
//!
//! The core depends only on these traits, never on concrete implementations.
//! Repositories are passed in explicitly; there is no ambient data source.

mod clock;
mod directory;
mod role_repo;
mod rule_repo;
mod ticket_repo;
mod verification_repo;

pub use clock::{Clock, FixedClock, SystemClock};
pub use directory::{LogNotifier, Notifier, UserDirectory};
pub use role_repo::RoleRepository;
pub use rule_repo::RuleRepository;
pub use ticket_repo::TicketRepository;
pub use verification_repo::VerificationRepository;
