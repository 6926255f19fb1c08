//! Tests for escalation rule validation and evaluation

use chrono::Duration;

use crate::common::fixtures::{TicketBuilder, high_rule_draft, rule, t0, tiers};
use helpdesk::Error;
use helpdesk::core::models::{EscalationTier, Priority, RuleDraft, TicketStatus};
use helpdesk::core::services::escalation::{self, validate_rule};
use helpdesk::core::services::{EscalationEngine, EscalationLedger, ReferenceTime, TransitionTable, lifecycle};
use test_case::test_case;

fn tier_at(minutes: i64) -> Option<(u32, Vec<String>)> {
    let ticket = TicketBuilder::new().priority(Priority::High).build();
    EscalationEngine::default()
        .evaluate(
            t0() + Duration::minutes(minutes),
            &[ticket],
            &[rule("ESC-1", high_rule_draft())],
            &EscalationLedger::new(),
        )
        .into_iter()
        .next()
        .map(|a| (a.tier_level, a.assignees))
}

// =============================================================================
// WORKED EXAMPLE
// =============================================================================

#[test]
fn test_high_priority_example() {
    assert_eq!(tier_at(30), None);
    assert_eq!(tier_at(90), Some((1, vec!["agent-a".to_string()])));
    assert_eq!(tier_at(300), Some((2, vec!["agent-b".to_string()])));
}

#[test_case(59, None ; "just before first threshold")]
#[test_case(60, Some(1) ; "exactly at first threshold")]
#[test_case(239, Some(1) ; "just before second threshold")]
#[test_case(240, Some(2) ; "exactly at second threshold")]
#[test_case(100_000, Some(2) ; "long overdue")]
fn test_threshold_boundaries(minutes: i64, expected: Option<u32>) {
    assert_eq!(tier_at(minutes).map(|(level, _)| level), expected);
}

// =============================================================================
// EVALUATION
// =============================================================================

#[test]
fn test_no_rule_for_priority_means_no_action() {
    let engine = EscalationEngine::default();
    let rules = [rule("ESC-1", high_rule_draft())];
    for priority in [Priority::Low, Priority::Medium, Priority::Urgent] {
        let ticket = TicketBuilder::new().priority(priority).build();
        let actions = engine.evaluate(t0() + Duration::days(30), &[ticket], &rules, &EscalationLedger::new());
        assert!(actions.is_empty(), "{priority}");
    }
}

#[test]
fn test_ledger_suppresses_repeat_and_allows_next_tier() {
    let engine = EscalationEngine::default();
    let ticket = TicketBuilder::new().priority(Priority::High).build();
    let rules = [rule("ESC-1", high_rule_draft())];
    let mut ledger = EscalationLedger::new();

    let at_90 = t0() + Duration::minutes(90);
    let action = engine.evaluate_ticket(at_90, &ticket, &rules, &ledger).unwrap();
    ledger.record(&action);
    assert_eq!(engine.evaluate_ticket(at_90, &ticket, &rules, &ledger), None);

    let at_300 = t0() + Duration::minutes(300);
    assert_eq!(engine.evaluate_ticket(at_300, &ticket, &rules, &ledger).unwrap().tier_level, 2);
}

#[test]
fn test_inactive_tickets_are_skipped() {
    let engine = EscalationEngine::default();
    let ticket = TicketBuilder::new().priority(Priority::High).build();
    let ticket = lifecycle::transition(&ticket, TicketStatus::Resolved, TransitionTable::Permissive, t0())
        .unwrap();
    let rules = [rule("ESC-1", high_rule_draft())];
    assert!(engine.evaluate_ticket(t0() + Duration::days(1), &ticket, &rules, &EscalationLedger::new()).is_none());
}

#[test]
fn test_pending_tickets_still_escalate() {
    let engine = EscalationEngine::default();
    let ticket = TicketBuilder::new().priority(Priority::High).build();
    let ticket = lifecycle::transition(&ticket, TicketStatus::Pending, TransitionTable::Permissive, t0())
        .unwrap();
    let rules = [rule("ESC-1", high_rule_draft())];
    assert!(engine.evaluate_ticket(t0() + Duration::hours(2), &ticket, &rules, &EscalationLedger::new()).is_some());
}

#[test]
fn test_status_changed_reference_restarts_the_clock() {
    let ticket = TicketBuilder::new().priority(Priority::High).build();
    let moved = lifecycle::transition(
        &ticket,
        TicketStatus::InProgress,
        TransitionTable::Strict,
        t0() + Duration::minutes(200),
    )
    .unwrap();
    let rules = [rule("ESC-1", high_rule_draft())];
    let now = t0() + Duration::minutes(250);

    let by_created = EscalationEngine::new(ReferenceTime::Created);
    let by_status = EscalationEngine::new(ReferenceTime::StatusChanged);
    assert_eq!(by_created.evaluate_ticket(now, &moved, &rules, &EscalationLedger::new()).unwrap().tier_level, 2);
    assert_eq!(by_status.evaluate_ticket(now, &moved, &rules, &EscalationLedger::new()), None);
    assert_eq!(by_status.elapsed_minutes(&moved, now), 50);
}

#[test]
fn test_highest_tier_across_rules_wins() {
    let slow = rule(
        "ESC-slow",
        RuleDraft::new("Slow", Priority::High, tiers(&[(1, 10, &["agent-a"])])),
    );
    let fast = rule(
        "ESC-fast",
        RuleDraft::new("Fast", Priority::High, tiers(&[(1, 5, &["agent-b"]), (3, 20, &["agent-c"])])),
    );
    let ticket = TicketBuilder::new().priority(Priority::High).build();
    let action = EscalationEngine::default()
        .evaluate_ticket(t0() + Duration::minutes(30), &ticket, &[slow, fast], &EscalationLedger::new())
        .unwrap();
    assert_eq!(action.rule_id, "ESC-fast");
    assert_eq!(action.tier_level, 3);
}

#[test]
fn test_tier_without_assignees_does_nothing() {
    let empty = rule("ESC-1", RuleDraft::new("Empty", Priority::High, tiers(&[(1, 10, &[])])));
    let ticket = TicketBuilder::new().priority(Priority::High).build();
    assert!(
        EscalationEngine::default()
            .evaluate_ticket(t0() + Duration::hours(1), &ticket, &[empty], &EscalationLedger::new())
            .is_none()
    );
}

// =============================================================================
// RULE VALIDATION
// =============================================================================

#[test_case(&[(1, 60, &["a"]), (2, 60, &["b"])] ; "equal thresholds")]
#[test_case(&[(1, 90, &["a"]), (2, 30, &["b"])] ; "decreasing thresholds")]
#[test_case(&[(2, 10, &["a"]), (1, 20, &["b"])] ; "decreasing levels")]
#[test_case(&[(0, 10, &["a"])] ; "zero level")]
#[test_case(&[(1, 10, &["a", "a"])] ; "duplicate assignee")]
#[test_case(&[(1, 10, &[" "])] ; "blank assignee")]
fn test_malformed_tiers_fail_at_authoring(rows: &[(u32, u32, &[&str])]) {
    let draft = RuleDraft::new("Bad", Priority::Low, tiers(rows));
    assert!(matches!(validate_rule(&draft), Err(Error::Validation(_))));
}

#[test]
fn test_tier_below_base_threshold_fails() {
    let mut draft = RuleDraft::new("Base", Priority::Low, tiers(&[(1, 10, &["a"])]));
    draft.threshold_minutes = 30;
    assert!(matches!(validate_rule(&draft), Err(Error::Validation(_))));
}

#[test]
fn test_blank_name_fails() {
    let draft = RuleDraft::new("  ", Priority::Low, Vec::new());
    assert!(matches!(validate_rule(&draft), Err(Error::Validation(_))));
}

#[test]
fn test_add_and_remove_tier() {
    let r = rule("ESC-1", high_rule_draft());
    let r = escalation::add_tier(&r, EscalationTier::new(3, 600, vec!["agent-c".to_string()]), t0()).unwrap();
    assert_eq!(r.tiers().iter().map(|t| t.level).collect::<Vec<_>>(), vec![1, 2, 3]);

    let dup = escalation::add_tier(&r, EscalationTier::new(2, 300, Vec::new()), t0()).unwrap_err();
    assert!(matches!(dup, Error::Conflict(_)));

    let misplaced = escalation::add_tier(&r, EscalationTier::new(4, 100, Vec::new()), t0()).unwrap_err();
    assert!(matches!(misplaced, Error::Validation(_)));

    let r = escalation::remove_tier(&r, 2, t0()).unwrap();
    assert_eq!(r.tiers().iter().map(|t| t.level).collect::<Vec<_>>(), vec![1, 3]);
    assert!(matches!(escalation::remove_tier(&r, 2, t0()), Err(Error::NotFound { .. })));
}
