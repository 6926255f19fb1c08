//! Domain models for the helpdesk
//!
//! Pure data structures with no I/O dependencies.
//!
//! - [`Ticket`] - a support request and its lifecycle fields
//! - [`EscalationRule`] - priority-scoped tiers of responsible assignees
//! - [`Verification`] - post-resolution accept/reject record
//! - [`Actor`] / [`Role`] - who acts, and what they may do

mod escalation;
mod identity;
mod page;
mod ticket;
mod verification;

pub use escalation::{EscalationAction, EscalationRule, EscalationTier, RuleDraft};
pub use identity::{Actor, ActorRole, Role, User, permissions};
pub use page::{DEFAULT_LIMIT, MAX_LIMIT, Page};
pub use ticket::{Priority, Ticket, TicketDraft, TicketFilter, TicketPatch, TicketStatus};
pub use verification::{
    MAX_RATING, MIN_RATING, Uniqueness, Verification, VerificationFilter, VerificationPatch,
    VerificationStatus,
};
