//! Escalation rule authoring and sweeps

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::core::error::{Error, Result};
use crate::core::models::{
    Actor, EscalationAction, EscalationRule, EscalationTier, Page, Priority, RuleDraft, Ticket,
    TicketFilter, permissions,
};
use crate::core::services::escalation::{self, AssigneeSelection, EscalationLedger};
use crate::core::services::lifecycle;

use super::Helpdesk;

/// What happened to one escalation during a sweep
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SweepOutcome {
    /// Ticket reassigned to a tier assignee
    Assigned,
    /// Tier assignees notified, assignee left alone
    Notified,
    /// A concurrent write won; the next sweep will retry
    Conflict,
    /// Ticket vanished or stopped qualifying since the snapshot
    Skipped,
}

impl std::fmt::Display for SweepOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Assigned => write!(f, "assigned"),
            Self::Notified => write!(f, "notified"),
            Self::Conflict => write!(f, "conflict"),
            Self::Skipped => write!(f, "skipped"),
        }
    }
}

/// One processed escalation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SweepEntry {
    /// Ticket id
    pub ticket_id: String,
    /// Rule that fired
    pub rule_id: String,
    /// Tier reached
    pub tier_level: u32,
    /// Result
    pub outcome: SweepOutcome,
    /// New assignee, when reassigned
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    /// Users notified
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notified: Vec<String>,
    /// Why the entry was skipped or conflicted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl SweepEntry {
    fn new(action: &EscalationAction, outcome: SweepOutcome) -> Self {
        Self {
            ticket_id: action.ticket_id.clone(),
            rule_id: action.rule_id.clone(),
            tier_level: action.tier_level,
            outcome,
            assignee: None,
            notified: Vec::new(),
            detail: None,
        }
    }

    fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// Result of one sweep
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    /// Instant the sweep evaluated against
    pub now: DateTime<Utc>,
    /// Active tickets in the snapshot
    pub evaluated: usize,
    /// Escalations processed, in snapshot order
    pub entries: Vec<SweepEntry>,
    /// Whether the sweep stopped early
    pub cancelled: bool,
}

impl SweepReport {
    /// Entries that changed or notified something
    pub fn applied(&self) -> impl Iterator<Item = &SweepEntry> {
        self.entries
            .iter()
            .filter(|e| matches!(e.outcome, SweepOutcome::Assigned | SweepOutcome::Notified))
    }

    /// Entries lost to a concurrent write
    pub fn conflicts(&self) -> impl Iterator<Item = &SweepEntry> {
        self.entries.iter().filter(|e| e.outcome == SweepOutcome::Conflict)
    }
}

impl Helpdesk {
    // =========================================================================
    // RULE AUTHORING
    // =========================================================================

    fn validate_tier_assignees(&self, tiers: &[EscalationTier]) -> Result<()> {
        for assignee in tiers.iter().flat_map(|t| &t.assignees) {
            let user = self
                .collab
                .users
                .find_user(assignee)?
                .ok_or_else(|| Error::not_found("user", assignee))?;
            self.authority.validate_assignee(&user)?;
        }
        Ok(())
    }

    /// Author a new rule
    pub fn create_rule(&self, actor: &Actor, draft: RuleDraft) -> Result<EscalationRule> {
        self.authority.require(actor, permissions::ESCALATION_MANAGE)?;
        escalation::validate_rule(&draft)?;
        self.validate_tier_assignees(&draft.tiers)?;

        let id = self.collab.rules.next_id()?;
        let rule = escalation::build_rule(id, draft, self.collab.clock.now())?;
        let stored = self.collab.rules.create(&rule)?;
        log::info!(
            "rule {} ({}) created for {} with {} tier(s)",
            stored.id(),
            stored.name(),
            stored.priority(),
            stored.tiers().len()
        );
        Ok(stored)
    }

    /// Replace all tiers of a rule atomically
    pub fn replace_tiers(
        &self,
        actor: &Actor,
        rule_id: &str,
        tiers: Vec<EscalationTier>,
    ) -> Result<EscalationRule> {
        self.authority.require(actor, permissions::ESCALATION_MANAGE)?;
        let rule = self.collab.rules.get(rule_id)?;
        self.validate_tier_assignees(&tiers)?;
        let next = escalation::replace_tiers(&rule, tiers, self.collab.clock.now())?;
        self.collab.rules.update(&next)
    }

    /// Add one tier to a rule
    pub fn add_tier(&self, actor: &Actor, rule_id: &str, tier: EscalationTier) -> Result<EscalationRule> {
        self.authority.require(actor, permissions::ESCALATION_MANAGE)?;
        let rule = self.collab.rules.get(rule_id)?;
        self.validate_tier_assignees(std::slice::from_ref(&tier))?;
        let next = escalation::add_tier(&rule, tier, self.collab.clock.now())?;
        self.collab.rules.update(&next)
    }

    /// Remove one tier from a rule
    pub fn remove_tier(&self, actor: &Actor, rule_id: &str, level: u32) -> Result<EscalationRule> {
        self.authority.require(actor, permissions::ESCALATION_MANAGE)?;
        let rule = self.collab.rules.get(rule_id)?;
        let next = escalation::remove_tier(&rule, level, self.collab.clock.now())?;
        self.collab.rules.update(&next)
    }

    /// Delete a rule
    pub fn delete_rule(&self, actor: &Actor, rule_id: &str) -> Result<()> {
        self.authority.require(actor, permissions::ESCALATION_MANAGE)?;
        self.collab.rules.delete(rule_id)?;
        log::info!("rule {rule_id} deleted by {}", actor.user_id);
        Ok(())
    }

    /// Fetch a rule
    pub fn rule(&self, id: &str) -> Result<EscalationRule> {
        self.collab.rules.get(id)
    }

    /// List rules
    pub fn list_rules(
        &self,
        priority: Option<Priority>,
        page: usize,
        limit: usize,
    ) -> Result<Page<EscalationRule>> {
        self.collab.rules.find_all(priority, page, limit)
    }

    // =========================================================================
    // SWEEPS
    // =========================================================================

    /// Copy of the escalation ledger
    #[must_use]
    pub fn ledger(&self) -> EscalationLedger {
        self.sweep_state().ledger.clone()
    }

    /// Replace the escalation ledger (e.g. with one persisted by a previous run)
    pub fn restore_ledger(&self, ledger: EscalationLedger) {
        self.sweep_state().ledger = ledger;
    }

    /// Escalations a sweep would perform right now, without applying them
    pub fn pending_escalations(&self) -> Result<Vec<EscalationAction>> {
        let now = self.collab.clock.now();
        let rules = self.collab.rules.all()?;
        let snapshot = self.collab.tickets.snapshot(&TicketFilter::active())?;
        let state = self.sweep_state();
        Ok(self.engine.evaluate(now, &snapshot, &rules, &state.ledger))
    }

    /// Evaluate every active ticket and apply the resulting escalations
    pub fn sweep(&self) -> Result<SweepReport> {
        self.sweep_until(|| false)
    }

    /// Like [`Self::sweep`], checking `stop` before each ticket.
    ///
    /// Stopping leaves already-applied escalations in place; the next sweep
    /// picks up the rest.
    pub fn sweep_until(&self, mut stop: impl FnMut() -> bool) -> Result<SweepReport> {
        let now = self.collab.clock.now();
        let rules = self.collab.rules.all()?;
        let snapshot = self.collab.tickets.snapshot(&TicketFilter::active())?;
        let actions = {
            let state = self.sweep_state();
            self.engine.evaluate(now, &snapshot, &rules, &state.ledger)
        };

        let mut report = SweepReport {
            now,
            evaluated: snapshot.len(),
            entries: Vec::with_capacity(actions.len()),
            cancelled: false,
        };
        for action in &actions {
            if stop() {
                log::info!("sweep stopped after {} escalation(s)", report.entries.len());
                report.cancelled = true;
                break;
            }
            report.entries.push(self.apply_escalation(now, action, &rules)?);
        }

        if !report.cancelled {
            self.sweep_state()
                .ledger
                .retain(|id| snapshot.iter().any(|t| t.id() == id));
        }
        log::info!(
            "sweep at {now}: {} active ticket(s), {} escalation(s) applied, {} conflict(s)",
            report.evaluated,
            report.applied().count(),
            report.conflicts().count()
        );
        Ok(report)
    }

    fn apply_escalation(
        &self,
        now: DateTime<Utc>,
        planned: &EscalationAction,
        rules: &[EscalationRule],
    ) -> Result<SweepEntry> {
        let Some(current) = self.collab.tickets.find_by_id(&planned.ticket_id)? else {
            return Ok(SweepEntry::new(planned, SweepOutcome::Skipped).with_detail("ticket no longer exists"));
        };

        // The snapshot may be stale; decide again on the ticket as stored now.
        let action = {
            let state = self.sweep_state();
            self.engine.evaluate_ticket(now, &current, rules, &state.ledger)
        };
        let Some(action) = action else {
            return Ok(SweepEntry::new(planned, SweepOutcome::Skipped).with_detail("no longer due"));
        };

        let (assignee, recipients) = match self.config.escalation.assignee_selection {
            AssigneeSelection::First => {
                let pick = action.assignees.first().cloned();
                (pick.clone(), pick.into_iter().collect())
            },
            AssigneeSelection::RoundRobin => {
                let pick = self.next_in_rotation(&action);
                (pick.clone(), pick.into_iter().collect())
            },
            AssigneeSelection::NotifyAll => (None, action.assignees.clone()),
        };

        let mut entry = SweepEntry::new(&action, SweepOutcome::Notified);
        let mut ticket = current.clone();
        if let Some(assignee) = assignee {
            if !current.is_assignee(&assignee) {
                let next = lifecycle::assign(&current, assignee.as_str(), now);
                ticket = match self.commit(&current, &next) {
                    Ok(stored) => stored,
                    Err(Error::Conflict(reason)) => {
                        log::warn!("escalation of {} deferred: {reason}", action.ticket_id);
                        return Ok(SweepEntry::new(&action, SweepOutcome::Conflict).with_detail(reason));
                    },
                    Err(e) => return Err(e),
                };
            }
            entry.outcome = SweepOutcome::Assigned;
            entry.assignee = Some(assignee);
        }

        self.notify_all(&ticket, &action, &recipients, &mut entry);
        self.sweep_state().ledger.record(&action);
        log::info!(
            "ticket {} escalated to tier {} of rule {} after {}m ({})",
            action.ticket_id,
            action.tier_level,
            action.rule_id,
            action.elapsed_minutes,
            entry.outcome
        );
        Ok(entry)
    }

    fn next_in_rotation(&self, action: &EscalationAction) -> Option<String> {
        if action.assignees.is_empty() {
            return None;
        }
        let mut state = self.sweep_state();
        let cursor = state
            .rotation
            .entry((action.rule_id.clone(), action.tier_level))
            .or_insert(0);
        let pick = action.assignees[*cursor % action.assignees.len()].clone();
        *cursor = (*cursor + 1) % action.assignees.len();
        Some(pick)
    }

    fn notify_all(
        &self,
        ticket: &Ticket,
        action: &EscalationAction,
        recipients: &[String],
        entry: &mut SweepEntry,
    ) {
        for recipient in recipients {
            match self.collab.notifier.notify(recipient, ticket, action) {
                Ok(()) => entry.notified.push(recipient.clone()),
                Err(e) => log::warn!("could not notify {recipient} about {}: {e}", ticket.id()),
            }
        }
    }
}
