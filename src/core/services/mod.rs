//! Business logic services
//!
//! Pure rule evaluation over domain models. Apart from [`RoleAuthority`],
//! which reads the role repository, nothing here performs I/O: functions take
//! the current value and return the next one.
//!
//! - [`authority`] - role permissions and the ticket ownership guard
//! - [`lifecycle`] - ticket state machine
//! - [`escalation`] - rule validation and the sweep evaluator
//! - [`verification`] - accept/reject workflow

pub mod authority;
pub mod escalation;
pub mod lifecycle;
pub mod verification;

pub use authority::{AssignmentPolicy, RoleAuthority, default_roles};
pub use escalation::{AssigneeSelection, EscalationEngine, EscalationLedger, ReferenceTime};
pub use lifecycle::TransitionTable;
pub use verification::Uniqueness;
