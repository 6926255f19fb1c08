//! Application services
//!
//! [`Helpdesk`] wires the pure services to their collaborators. It is the
//! single place tickets are written back, so user updates, attachment edits,
//! sweep reassignments and verification reopens all pass the same optimistic
//! version check.
//!
//! - [`tickets`] - ticket CRUD and attachments
//! - [`escalation`] - rule authoring and sweeps
//! - [`verification`] - open / accept / reject / correct
//! - [`roles`] - role management

pub mod escalation;
pub mod roles;
pub mod tickets;
pub mod verification;

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::adapters::memory::{
    MemoryRoleRepository, MemoryRuleRepository, MemoryTicketRepository, MemoryUserDirectory,
    MemoryVerificationRepository,
};
use crate::config::DeskConfig;
use crate::core::error::Result;
use crate::core::models::Ticket;
use crate::core::ports::{
    Clock, LogNotifier, Notifier, RoleRepository, RuleRepository, SystemClock, TicketRepository,
    UserDirectory, VerificationRepository,
};
use crate::core::services::{EscalationEngine, EscalationLedger, RoleAuthority};

pub use escalation::{SweepEntry, SweepOutcome, SweepReport};

/// Everything the helpdesk talks to
#[derive(Clone)]
pub struct Collaborators {
    /// Ticket storage
    pub tickets: Arc<dyn TicketRepository>,
    /// Escalation rule storage
    pub rules: Arc<dyn RuleRepository>,
    /// Verification storage
    pub verifications: Arc<dyn VerificationRepository>,
    /// Role storage
    pub roles: Arc<dyn RoleRepository>,
    /// Identity lookup
    pub users: Arc<dyn UserDirectory>,
    /// Time source
    pub clock: Arc<dyn Clock>,
    /// Escalation notice delivery
    pub notifier: Arc<dyn Notifier>,
}

impl std::fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collaborators").finish_non_exhaustive()
    }
}

impl Collaborators {
    /// Empty in-memory stores with the built-in roles, the system clock and a log notifier
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            tickets: Arc::new(MemoryTicketRepository::new()),
            rules: Arc::new(MemoryRuleRepository::new()),
            verifications: Arc::new(MemoryVerificationRepository::new()),
            roles: Arc::new(MemoryRoleRepository::with_default_roles()),
            users: Arc::new(MemoryUserDirectory::new()),
            clock: Arc::new(SystemClock),
            notifier: Arc::new(LogNotifier),
        }
    }

    /// Replace the clock
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replace the user directory
    #[must_use]
    pub fn with_users(mut self, users: Arc<dyn UserDirectory>) -> Self {
        self.users = users;
        self
    }

    /// Replace the notifier
    #[must_use]
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }
}

/// Sweep bookkeeping that outlives a single sweep
#[derive(Debug, Default)]
struct SweepState {
    ledger: EscalationLedger,
    // next round-robin index per (rule id, tier level)
    rotation: HashMap<(String, u32), usize>,
}

/// The helpdesk application service
#[derive(Debug)]
pub struct Helpdesk {
    collab: Collaborators,
    config: DeskConfig,
    authority: RoleAuthority,
    engine: EscalationEngine,
    sweep: Mutex<SweepState>,
}

impl Helpdesk {
    /// Build a helpdesk over `collab` with `config`
    #[must_use]
    pub fn new(collab: Collaborators, config: DeskConfig) -> Self {
        let authority = RoleAuthority::new(Arc::clone(&collab.roles));
        let engine = EscalationEngine::new(config.escalation.reference);
        Self {
            collab,
            config,
            authority,
            engine,
            sweep: Mutex::new(SweepState::default()),
        }
    }

    /// Active configuration
    #[must_use]
    pub const fn config(&self) -> &DeskConfig {
        &self.config
    }

    /// Collaborators in use
    #[must_use]
    pub const fn collaborators(&self) -> &Collaborators {
        &self.collab
    }

    /// Permission resolver
    #[must_use]
    pub const fn authority(&self) -> &RoleAuthority {
        &self.authority
    }

    /// Escalation evaluator
    #[must_use]
    pub const fn engine(&self) -> &EscalationEngine {
        &self.engine
    }

    /// Write `next` over `current`, failing with `Conflict` if someone else wrote first.
    ///
    /// This is the one serialization point for ticket writes. Callers do not retry.
    pub fn commit(&self, current: &Ticket, next: &Ticket) -> Result<Ticket> {
        let stored = self.collab.tickets.update(next, current.version())?;
        log::debug!("ticket {} stored at version {}", stored.id(), stored.version());
        Ok(stored)
    }

    fn sweep_state(&self) -> MutexGuard<'_, SweepState> {
        self.sweep.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
