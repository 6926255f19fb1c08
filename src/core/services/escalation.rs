//! Escalation engine
//!
//! Rules are validated when authored. A sweep is a pure query: given "now",
//! a snapshot of tickets, the rules and the ledger of tiers already reached,
//! it returns the escalations that should happen. Applying them is up to the caller.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::error::{Error, Result};
use crate::core::models::{EscalationAction, EscalationRule, EscalationTier, RuleDraft, Ticket};

/// Instant a ticket's escalation age is measured from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceTime {
    /// Ticket creation
    #[default]
    Created,
    /// Most recent status change
    StatusChanged,
}

impl ReferenceTime {
    /// The reference instant of `ticket`
    #[must_use]
    pub const fn of(self, ticket: &Ticket) -> DateTime<Utc> {
        match self {
            Self::Created => ticket.created_at,
            Self::StatusChanged => ticket.status_changed_at,
        }
    }
}

/// How an escalation picks who gets the ticket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssigneeSelection {
    /// Assign the first listed tier assignee
    #[default]
    First,
    /// Rotate through the tier assignees across escalations
    RoundRobin,
    /// Leave the assignee alone and notify every tier assignee
    NotifyAll,
}

impl std::fmt::Display for AssigneeSelection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::First => write!(f, "first"),
            Self::RoundRobin => write!(f, "round_robin"),
            Self::NotifyAll => write!(f, "notify_all"),
        }
    }
}

impl std::str::FromStr for AssigneeSelection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "first" => Ok(Self::First),
            "round_robin" | "roundrobin" => Ok(Self::RoundRobin),
            "notify_all" | "all" => Ok(Self::NotifyAll),
            _ => Err(format!(
                "Invalid assignee selection: {s}. Use: first, round_robin, notify_all"
            )),
        }
    }
}

// =============================================================================
// RULE AUTHORING
// =============================================================================

/// Check the shape of a rule before it is stored.
///
/// - name is not blank
/// - tier levels are positive and strictly increasing
/// - tier thresholds are strictly increasing and not below the base threshold
/// - assignee ids are not blank and not repeated within a tier
pub fn validate_rule(draft: &RuleDraft) -> Result<()> {
    if draft.name.trim().is_empty() {
        return Err(Error::validation("rule name cannot be empty"));
    }
    validate_tiers(&draft.tiers, draft.threshold_minutes)
}

fn validate_tiers(tiers: &[EscalationTier], base_threshold: u32) -> Result<()> {
    let mut previous: Option<&EscalationTier> = None;

    for tier in tiers {
        if tier.level == 0 {
            return Err(Error::validation("tier levels start at 1"));
        }
        if tier.threshold_minutes < base_threshold {
            return Err(Error::validation(format!(
                "tier {} threshold {}m is below the rule threshold {base_threshold}m",
                tier.level, tier.threshold_minutes
            )));
        }
        if let Some(prev) = previous {
            if tier.level <= prev.level {
                return Err(Error::validation(format!(
                    "tier levels must increase: {} follows {}",
                    tier.level, prev.level
                )));
            }
            if tier.threshold_minutes <= prev.threshold_minutes {
                return Err(Error::validation(format!(
                    "tier thresholds must increase: tier {} at {}m follows tier {} at {}m",
                    tier.level, tier.threshold_minutes, prev.level, prev.threshold_minutes
                )));
            }
        }
        for (i, assignee) in tier.assignees.iter().enumerate() {
            if assignee.trim().is_empty() {
                return Err(Error::validation(format!("tier {} has a blank assignee", tier.level)));
            }
            if tier.assignees[..i].contains(assignee) {
                return Err(Error::validation(format!(
                    "tier {} lists '{assignee}' twice",
                    tier.level
                )));
            }
        }
        previous = Some(tier);
    }
    Ok(())
}

/// Validate a draft and turn it into a rule
pub fn build_rule(id: impl Into<String>, draft: RuleDraft, now: DateTime<Utc>) -> Result<EscalationRule> {
    validate_rule(&draft)?;
    Ok(EscalationRule {
        id: id.into(),
        name: draft.name.trim().to_string(),
        description: draft.description,
        priority: draft.priority,
        threshold_minutes: draft.threshold_minutes,
        tiers: draft.tiers,
        created_at: now,
        updated_at: now,
    })
}

/// Replace every tier of a rule at once
pub fn replace_tiers(
    rule: &EscalationRule,
    tiers: Vec<EscalationTier>,
    now: DateTime<Utc>,
) -> Result<EscalationRule> {
    validate_tiers(&tiers, rule.threshold_minutes)?;
    let mut next = rule.clone();
    next.tiers = tiers;
    next.updated_at = now;
    Ok(next)
}

/// Insert one tier, keeping level order
pub fn add_tier(rule: &EscalationRule, tier: EscalationTier, now: DateTime<Utc>) -> Result<EscalationRule> {
    if rule.tier(tier.level).is_some() {
        return Err(Error::conflict(format!(
            "rule '{}' already has tier {}",
            rule.id, tier.level
        )));
    }
    let mut tiers = rule.tiers.clone();
    let at = tiers.partition_point(|t| t.level < tier.level);
    tiers.insert(at, tier);
    replace_tiers(rule, tiers, now)
}

/// Remove the tier with `level`
pub fn remove_tier(rule: &EscalationRule, level: u32, now: DateTime<Utc>) -> Result<EscalationRule> {
    if rule.tier(level).is_none() {
        return Err(Error::not_found("tier", format!("{}#{level}", rule.id)));
    }
    let tiers = rule.tiers.iter().filter(|t| t.level != level).cloned().collect();
    replace_tiers(rule, tiers, now)
}

// =============================================================================
// LEDGER
// =============================================================================

/// Last tier each ticket was escalated to.
///
/// The engine keeps no state between sweeps; callers hold this ledger and
/// record an action only once it has been applied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EscalationLedger {
    tiers: BTreeMap<String, u32>,
}

impl EscalationLedger {
    /// Empty ledger
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Last tier reached by `ticket_id`
    #[must_use]
    pub fn last_tier(&self, ticket_id: &str) -> Option<u32> {
        self.tiers.get(ticket_id).copied()
    }

    /// Remember an applied action
    pub fn record(&mut self, action: &EscalationAction) {
        self.tiers.insert(action.ticket_id.clone(), action.tier_level);
    }

    /// Drop a ticket's entry
    pub fn forget(&mut self, ticket_id: &str) -> Option<u32> {
        self.tiers.remove(ticket_id)
    }

    /// Keep only entries for which `keep` returns true
    pub fn retain(&mut self, mut keep: impl FnMut(&str) -> bool) {
        self.tiers.retain(|id, _| keep(id));
    }

    /// Number of tracked tickets
    #[must_use]
    pub fn len(&self) -> usize {
        self.tiers.len()
    }

    /// Whether nothing is tracked
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }

    /// Tracked `(ticket_id, tier)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.tiers.iter().map(|(id, tier)| (id.as_str(), *tier))
    }
}

// =============================================================================
// EVALUATION
// =============================================================================

/// Time-threshold rule evaluator
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EscalationEngine {
    reference: ReferenceTime,
}

impl EscalationEngine {
    /// Engine measuring age from `reference`
    #[must_use]
    pub const fn new(reference: ReferenceTime) -> Self {
        Self { reference }
    }

    /// The configured reference
    #[must_use]
    pub const fn reference(&self) -> ReferenceTime {
        self.reference
    }

    /// Whole minutes elapsed since the ticket's reference time
    #[must_use]
    pub fn elapsed_minutes(&self, ticket: &Ticket, now: DateTime<Utc>) -> i64 {
        (now - self.reference.of(ticket)).num_minutes()
    }

    /// Highest-level tier whose threshold has been reached.
    ///
    /// Levels break ties, so the answer is well defined even if a stored
    /// rule has equal thresholds.
    #[must_use]
    pub fn select_tier(rule: &EscalationRule, elapsed_minutes: i64) -> Option<&EscalationTier> {
        rule.tiers
            .iter()
            .filter(|t| i64::from(t.threshold_minutes) <= elapsed_minutes)
            .max_by_key(|t| t.level)
    }

    /// Decide whether one ticket escalates
    ///
    /// Among the rules matching the ticket's priority, the one yielding the
    /// highest tier wins; earlier rules win ties. An action is produced only
    /// when that tier is actionable and differs from the ledger entry.
    #[must_use]
    pub fn evaluate_ticket(
        &self,
        now: DateTime<Utc>,
        ticket: &Ticket,
        rules: &[EscalationRule],
        ledger: &EscalationLedger,
    ) -> Option<EscalationAction> {
        if !ticket.status.is_active() {
            return None;
        }

        let elapsed = self.elapsed_minutes(ticket, now);
        let mut best: Option<(&EscalationRule, &EscalationTier)> = None;
        for rule in rules.iter().filter(|r| r.priority == ticket.priority) {
            if let Some(tier) = Self::select_tier(rule, elapsed) {
                if best.is_none_or(|(_, b)| tier.level > b.level) {
                    best = Some((rule, tier));
                }
            }
        }

        let (rule, tier) = best?;
        if !tier.is_actionable() {
            log::debug!(
                "ticket {} reached tier {} of rule {} but the tier has no assignees",
                ticket.id,
                tier.level,
                rule.id
            );
            return None;
        }
        if ledger.last_tier(&ticket.id) == Some(tier.level) {
            return None;
        }

        Some(EscalationAction {
            ticket_id: ticket.id.clone(),
            rule_id: rule.id.clone(),
            tier_level: tier.level,
            assignees: tier.assignees.clone(),
            elapsed_minutes: elapsed,
        })
    }

    /// Sweep a ticket snapshot
    #[must_use]
    pub fn evaluate(
        &self,
        now: DateTime<Utc>,
        tickets: &[Ticket],
        rules: &[EscalationRule],
        ledger: &EscalationLedger,
    ) -> Vec<EscalationAction> {
        let actions: Vec<EscalationAction> = tickets
            .iter()
            .filter_map(|t| self.evaluate_ticket(now, t, rules, ledger))
            .collect();
        log::debug!(
            "evaluated {} ticket(s) against {} rule(s): {} escalation(s)",
            tickets.len(),
            rules.len(),
            actions.len()
        );
        actions
    }
}
