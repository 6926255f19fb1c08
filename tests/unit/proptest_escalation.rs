//! Property-based tests for the escalation engine
//!
//! Uses proptest to verify properties that should hold for all inputs.

use chrono::Duration;

use crate::common::fixtures::{TicketBuilder, rule, t0};
use helpdesk::core::models::{EscalationRule, EscalationTier, Priority, RuleDraft};
use helpdesk::core::services::{EscalationEngine, EscalationLedger};
use proptest::prelude::*;

/// A valid rule built from positive threshold gaps
fn rule_from_gaps(priority: Priority, gaps: &[u32]) -> EscalationRule {
    let mut threshold = 0u32;
    let tiers = gaps
        .iter()
        .enumerate()
        .map(|(i, gap)| {
            threshold += *gap;
            let level = u32::try_from(i).unwrap() + 1;
            EscalationTier::new(level, threshold, vec![format!("agent-{level}")])
        })
        .collect();
    rule("ESC-P", RuleDraft::new("Generated", priority, tiers))
}

fn priority() -> impl Strategy<Value = Priority> {
    prop_oneof![
        Just(Priority::Low),
        Just(Priority::Medium),
        Just(Priority::High),
        Just(Priority::Urgent),
    ]
}

proptest! {
    /// Later sweeps never select a lower tier
    #[test]
    fn selected_tier_is_monotonic_in_elapsed_time(
        gaps in prop::collection::vec(1u32..600, 1..6),
        a in 0i64..5000,
        b in 0i64..5000,
    ) {
        let r = rule_from_gaps(Priority::High, &gaps);
        let (early, late) = if a <= b { (a, b) } else { (b, a) };

        let first = EscalationEngine::select_tier(&r, early).map(|t| t.level);
        let second = EscalationEngine::select_tier(&r, late).map(|t| t.level);
        if let Some(level) = first {
            prop_assert!(second.is_some_and(|l| l >= level));
        }
    }

    /// The selected tier is the highest one whose threshold has passed
    #[test]
    fn selected_tier_threshold_has_passed(
        gaps in prop::collection::vec(1u32..600, 1..6),
        elapsed in 0i64..5000,
    ) {
        let r = rule_from_gaps(Priority::High, &gaps);
        match EscalationEngine::select_tier(&r, elapsed) {
            Some(tier) => {
                prop_assert!(i64::from(tier.threshold_minutes) <= elapsed);
                let higher_passed = r
                    .tiers()
                    .iter()
                    .any(|t| t.level > tier.level && i64::from(t.threshold_minutes) <= elapsed);
                prop_assert!(!higher_passed);
            },
            None => prop_assert!(r.tiers().iter().all(|t| i64::from(t.threshold_minutes) > elapsed)),
        }
    }

    /// Tickets whose priority no rule targets never escalate
    #[test]
    fn unmatched_priority_never_escalates(
        rule_priority in priority(),
        ticket_priority in priority(),
        gaps in prop::collection::vec(1u32..600, 1..4),
        elapsed in 0i64..10_000,
    ) {
        prop_assume!(rule_priority != ticket_priority);
        let r = rule_from_gaps(rule_priority, &gaps);
        let ticket = TicketBuilder::new().priority(ticket_priority).build();
        let actions = EscalationEngine::default().evaluate(
            t0() + Duration::minutes(elapsed),
            &[ticket],
            &[r],
            &EscalationLedger::new(),
        );
        prop_assert!(actions.is_empty());
    }

    /// Evaluating the same ticket in the same state gives the same answer,
    /// and once recorded the action is not repeated
    #[test]
    fn evaluation_is_idempotent(
        gaps in prop::collection::vec(1u32..600, 1..6),
        elapsed in 0i64..5000,
    ) {
        let engine = EscalationEngine::default();
        let r = [rule_from_gaps(Priority::Urgent, &gaps)];
        let ticket = TicketBuilder::new().priority(Priority::Urgent).build();
        let now = t0() + Duration::minutes(elapsed);
        let mut ledger = EscalationLedger::new();

        let first = engine.evaluate_ticket(now, &ticket, &r, &ledger);
        prop_assert_eq!(&first, &engine.evaluate_ticket(now, &ticket, &r, &ledger));

        if let Some(action) = first {
            ledger.record(&action);
            prop_assert_eq!(engine.evaluate_ticket(now, &ticket, &r, &ledger), None);
        }
    }
}
