//! Tests for the verification workflow

use crate::common::fixtures::{TicketBuilder, t0};
use helpdesk::Error;
use helpdesk::core::models::{Ticket, TicketStatus, Verification, VerificationPatch, VerificationStatus};
use helpdesk::core::services::verification::{self, Uniqueness};
use helpdesk::core::services::{TransitionTable, lifecycle};
use test_case::test_case;

fn resolved() -> Ticket {
    lifecycle::transition(&TicketBuilder::new().build(), TicketStatus::Resolved, TransitionTable::Permissive, t0())
        .unwrap()
}

fn pending() -> Verification {
    verification::open("VRF-1", &resolved(), "agent-a", &[], Uniqueness::Any, true, t0()).unwrap()
}

// =============================================================================
// RATINGS
// =============================================================================

#[test_case(0 ; "zero")]
#[test_case(6 ; "six")]
#[test_case(-1 ; "negative")]
#[test_case(i32::MAX ; "huge")]
fn test_accept_rejects_out_of_range_rating(rating: i32) {
    let err = verification::accept(&pending(), rating, None, t0()).unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
}

#[test_case(1 ; "one")]
#[test_case(2 ; "two")]
#[test_case(3 ; "three")]
#[test_case(4 ; "four")]
#[test_case(5 ; "five")]
fn test_accept_takes_ratings_one_to_five(rating: i32) {
    let v = verification::accept(&pending(), rating, None, t0()).unwrap();
    assert_eq!(v.status(), VerificationStatus::Accepted);
    assert_eq!(v.rating().map(i32::from), Some(rating));
    assert_eq!(v.feedback(), None);
}

#[test]
fn test_bad_rating_is_validation_even_when_decided() {
    let decided = verification::accept(&pending(), 4, None, t0()).unwrap();
    assert!(matches!(verification::accept(&decided, 9, None, t0()), Err(Error::Validation(_))));
    assert!(matches!(verification::accept(&decided, 4, None, t0()), Err(Error::Conflict(_))));
}

// =============================================================================
// REJECTION
// =============================================================================

#[test_case("" ; "empty")]
#[test_case("   " ; "spaces")]
#[test_case("\n\t" ; "control whitespace")]
fn test_reject_requires_feedback(feedback: &str) {
    let err = verification::reject(&pending(), feedback, t0()).unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
}

#[test]
fn test_reject_keeps_rating_empty() {
    let v = verification::reject(&pending(), "printer still jams", t0()).unwrap();
    assert_eq!(v.status(), VerificationStatus::Rejected);
    assert_eq!(v.rating(), None);
    assert_eq!(v.feedback(), Some("printer still jams"));
}

// =============================================================================
// UNIQUENESS
// =============================================================================

#[test_case(Uniqueness::Any, VerificationStatus::Pending, false ; "any blocks pending")]
#[test_case(Uniqueness::Any, VerificationStatus::Accepted, false ; "any blocks accepted")]
#[test_case(Uniqueness::Any, VerificationStatus::Rejected, false ; "any blocks rejected")]
#[test_case(Uniqueness::Pending, VerificationStatus::Pending, false ; "pending blocks pending")]
#[test_case(Uniqueness::Pending, VerificationStatus::Accepted, true ; "pending allows after accepted")]
#[test_case(Uniqueness::Pending, VerificationStatus::Rejected, true ; "pending allows after rejected")]
fn test_second_verification(uniqueness: Uniqueness, existing: VerificationStatus, allowed: bool) {
    let first = match existing {
        VerificationStatus::Pending => pending(),
        VerificationStatus::Accepted => verification::accept(&pending(), 5, None, t0()).unwrap(),
        VerificationStatus::Rejected => verification::reject(&pending(), "no", t0()).unwrap(),
    };
    let result = verification::open("VRF-2", &resolved(), "agent-b", &[first], uniqueness, true, t0());
    if allowed {
        assert!(result.is_ok());
    } else {
        assert!(matches!(result, Err(Error::Conflict(_))));
    }
}

// =============================================================================
// ADMINISTRATIVE CORRECTION
// =============================================================================

#[test]
fn test_patch_accepts_with_rating() {
    let patch = VerificationPatch {
        status: Some(VerificationStatus::Accepted),
        rating: Some(4),
        feedback: None,
    };
    let v = verification::apply_patch(&pending(), &patch, t0()).unwrap();
    assert_eq!(v.status(), VerificationStatus::Accepted);
    assert_eq!(v.rating(), Some(4));
}

#[test_case(0 ; "zero")]
#[test_case(6 ; "six")]
fn test_patch_follows_rating_bounds(rating: i32) {
    let patch = VerificationPatch {
        status: Some(VerificationStatus::Accepted),
        rating: Some(rating),
        feedback: None,
    };
    assert!(matches!(verification::apply_patch(&pending(), &patch, t0()), Err(Error::Validation(_))));
}

#[test]
fn test_patch_cannot_flip_a_decision() {
    let accepted = verification::accept(&pending(), 5, None, t0()).unwrap();
    let patch = VerificationPatch {
        status: Some(VerificationStatus::Rejected),
        rating: None,
        feedback: Some("changed my mind".to_string()),
    };
    assert!(matches!(verification::apply_patch(&accepted, &patch, t0()), Err(Error::Conflict(_))));
}

#[test]
fn test_patch_accept_without_rating_fails() {
    let patch = VerificationPatch {
        status: Some(VerificationStatus::Accepted),
        ..VerificationPatch::default()
    };
    assert!(matches!(verification::apply_patch(&pending(), &patch, t0()), Err(Error::Validation(_))));
}
