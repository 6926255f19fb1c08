//! Resolve → verify → accept or reject, end to end

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use crate::common::fixtures::TestDesk;
use helpdesk::adapters::memory::MemoryVerificationRepository;
use helpdesk::config::DeskConfig;
use helpdesk::core::models::{
    Actor, Page, Priority, TicketStatus, Verification, VerificationFilter, VerificationPatch,
    VerificationStatus,
};
use helpdesk::core::ports::VerificationRepository;
use helpdesk::core::services::Uniqueness;
use helpdesk::{Error, Result};

fn resolved_ticket(t: &TestDesk) -> String {
    let id = t.open_ticket(Priority::Medium).id().to_string();
    let root = TestDesk::root();
    t.desk.transition_ticket(&id, TicketStatus::InProgress, &root).unwrap();
    t.desk.transition_ticket(&id, TicketStatus::Resolved, &root).unwrap();
    id
}

#[test]
fn test_accept_closes_the_loop() {
    let t = TestDesk::new();
    let ticket = resolved_ticket(&t);

    let pending = t.desk.open_verification(&ticket, "alice").unwrap();
    assert_eq!(pending.status(), VerificationStatus::Pending);

    t.advance(30);
    let accepted = t.desk.accept_verification(pending.id(), 5, Some("Fast fix")).unwrap();
    assert_eq!(accepted.status(), VerificationStatus::Accepted);
    assert_eq!(accepted.rating(), Some(5));
    assert_eq!(accepted.feedback(), Some("Fast fix"));
    assert_eq!(t.desk.ticket(&ticket).unwrap().status(), TicketStatus::Resolved);

    let again = t.desk.accept_verification(pending.id(), 4, None).unwrap_err();
    assert!(matches!(again, Error::Conflict(_)));
}

#[test]
fn test_reject_reopens_the_ticket() {
    let t = TestDesk::new();
    let ticket = resolved_ticket(&t);
    let pending = t.desk.open_verification(&ticket, "alice").unwrap();

    let rejected = t.desk.reject_verification(pending.id(), "Still broken").unwrap();
    assert_eq!(rejected.status(), VerificationStatus::Rejected);

    let reopened = t.desk.ticket(&ticket).unwrap();
    assert_eq!(reopened.status(), TicketStatus::Open);
    assert_eq!(reopened.version(), 4);
}

#[test]
fn test_reject_after_close_leaves_ticket_closed() {
    let t = TestDesk::new();
    let ticket = resolved_ticket(&t);
    let pending = t.desk.open_verification(&ticket, "alice").unwrap();
    t.desk.transition_ticket(&ticket, TicketStatus::Closed, &TestDesk::root()).unwrap();

    let rejected = t.desk.reject_verification(pending.id(), "Still broken").unwrap();
    assert_eq!(rejected.status(), VerificationStatus::Rejected);
    assert_eq!(rejected.version(), 2);
    assert_eq!(t.desk.ticket(&ticket).unwrap().status(), TicketStatus::Closed);
}

#[test]
fn test_reject_without_reopen_leaves_ticket_resolved() {
    let mut config = DeskConfig::default();
    config.verification.reopen_on_reject = false;
    let t = TestDesk::with_config(config);
    let ticket = resolved_ticket(&t);
    let pending = t.desk.open_verification(&ticket, "alice").unwrap();

    t.desk.reject_verification(pending.id(), "meh").unwrap();
    assert_eq!(t.desk.ticket(&ticket).unwrap().status(), TicketStatus::Resolved);
}

#[test]
fn test_reject_needs_feedback_and_changes_nothing() {
    let t = TestDesk::new();
    let ticket = resolved_ticket(&t);
    let pending = t.desk.open_verification(&ticket, "alice").unwrap();

    let err = t.desk.reject_verification(pending.id(), "  ").unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    assert_eq!(t.desk.ticket(&ticket).unwrap().status(), TicketStatus::Resolved);
    assert_eq!(t.desk.verification(pending.id()).unwrap().status(), VerificationStatus::Pending);
}

#[test]
fn test_unresolved_ticket_cannot_be_verified() {
    let t = TestDesk::new();
    let ticket = t.open_ticket(Priority::Low).id().to_string();
    let err = t.desk.open_verification(&ticket, "alice").unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
}

#[test]
fn test_unknown_ticket_or_user_is_not_found() {
    let t = TestDesk::new();
    let ticket = resolved_ticket(&t);

    assert!(matches!(
        t.desk.open_verification("TKT-99", "alice"),
        Err(Error::NotFound { entity: "ticket", .. })
    ));
    assert!(matches!(
        t.desk.open_verification(&ticket, "mallory"),
        Err(Error::NotFound { entity: "user", .. })
    ));
    assert!(matches!(t.desk.accept_verification("VRF-9", 3, None), Err(Error::NotFound { .. })));
}

#[test]
fn test_one_verification_per_ticket_by_default() {
    let t = TestDesk::new();
    let ticket = resolved_ticket(&t);
    let first = t.desk.open_verification(&ticket, "alice").unwrap();
    t.desk.accept_verification(first.id(), 4, None).unwrap();

    let err = t.desk.open_verification(&ticket, "alice").unwrap_err();
    assert!(matches!(err, Error::Conflict(_)));
}

#[test]
fn test_pending_uniqueness_allows_a_second_round() {
    let mut config = DeskConfig::default();
    config.verification.uniqueness = Uniqueness::Pending;
    config.verification.reopen_on_reject = false;
    let t = TestDesk::with_config(config);
    let ticket = resolved_ticket(&t);

    let first = t.desk.open_verification(&ticket, "alice").unwrap();
    assert!(matches!(t.desk.open_verification(&ticket, "alice"), Err(Error::Conflict(_))));
    t.desk.reject_verification(first.id(), "not yet").unwrap();
    t.desk.open_verification(&ticket, "alice").unwrap();

    let all = t.desk.list_verifications(&VerificationFilter::for_ticket(&ticket), 1, 20).unwrap();
    assert_eq!(all.total, 2);
}

#[test]
fn test_correction_needs_manage_permission() {
    let t = TestDesk::new();
    let ticket = resolved_ticket(&t);
    let pending = t.desk.open_verification(&ticket, "alice").unwrap();
    let patch = VerificationPatch {
        status: Some(VerificationStatus::Accepted),
        rating: Some(3),
        feedback: None,
    };

    let err = t.desk.update_verification(pending.id(), &patch, &Actor::agent("agent-a")).unwrap_err();
    assert!(matches!(err, Error::Forbidden(_)));

    let fixed = t.desk.update_verification(pending.id(), &patch, &TestDesk::root()).unwrap();
    assert_eq!(fixed.status(), VerificationStatus::Accepted);
    assert_eq!(fixed.rating(), Some(3));
}

#[test]
fn test_second_pending_is_found_past_the_first_page() {
    let mut config = DeskConfig::default();
    config.verification.uniqueness = Uniqueness::Pending;
    let t = TestDesk::with_config(config);
    let ticket = resolved_ticket(&t);
    for _ in 0..500 {
        let v = t.desk.open_verification(&ticket, "alice").unwrap();
        t.desk.accept_verification(v.id(), 4, None).unwrap();
    }
    t.advance(5);
    let pending = t.desk.open_verification(&ticket, "alice").unwrap();
    assert_eq!(pending.id(), "VRF-501");

    let err = t.desk.open_verification(&ticket, "alice").unwrap_err();
    assert!(matches!(err, Error::Conflict(_)), "{err}");
}

// =============================================================================
// CONCURRENT DECISIONS
// =============================================================================

/// Verification store that keeps serving the first copy it read of each id
struct StaleReads {
    inner: MemoryVerificationRepository,
    seen: Mutex<HashMap<String, Verification>>,
}

impl VerificationRepository for StaleReads {
    fn next_id(&self) -> Result<String> {
        self.inner.next_id()
    }

    fn find_by_id(&self, id: &str) -> Result<Option<Verification>> {
        let mut seen = self.seen.lock().unwrap();
        if let Some(cached) = seen.get(id) {
            return Ok(Some(cached.clone()));
        }
        let found = self.inner.find_by_id(id)?;
        if let Some(v) = &found {
            seen.insert(id.to_string(), v.clone());
        }
        Ok(found)
    }

    fn find_all(&self, filter: &VerificationFilter, page: usize, limit: usize) -> Result<Page<Verification>> {
        self.inner.find_all(filter, page, limit)
    }

    fn create(&self, verification: &Verification, uniqueness: Uniqueness) -> Result<Verification> {
        self.inner.create(verification, uniqueness)
    }

    fn update(&self, verification: &Verification, expected_version: u64) -> Result<Verification> {
        self.inner.update(verification, expected_version)
    }

    fn delete(&self, id: &str) -> Result<()> {
        self.inner.delete(id)
    }
}

#[test]
fn test_decision_on_a_stale_read_conflicts() {
    let store = Arc::new(StaleReads {
        inner: MemoryVerificationRepository::new(),
        seen: Mutex::new(HashMap::new()),
    });
    let t = TestDesk::with_verifications(DeskConfig::default(), store.clone());
    let ticket = resolved_ticket(&t);
    let pending = t.desk.open_verification(&ticket, "alice").unwrap();

    let accepted = t.desk.accept_verification(pending.id(), 5, None).unwrap();
    assert_eq!(accepted.status(), VerificationStatus::Accepted);

    let err = t.desk.reject_verification(pending.id(), "no").unwrap_err();
    assert!(matches!(err, Error::Conflict(_)), "{err}");

    let stored = store.inner.get(pending.id()).unwrap();
    assert_eq!(stored.status(), VerificationStatus::Accepted);
    assert_eq!(stored.rating(), Some(5));
    assert_eq!(t.desk.ticket(&ticket).unwrap().status(), TicketStatus::Resolved);
}

/// Verification store whose listings take a while, widening the check-then-create window
struct SlowList {
    inner: MemoryVerificationRepository,
}

impl VerificationRepository for SlowList {
    fn next_id(&self) -> Result<String> {
        self.inner.next_id()
    }

    fn find_by_id(&self, id: &str) -> Result<Option<Verification>> {
        self.inner.find_by_id(id)
    }

    fn find_all(&self, filter: &VerificationFilter, page: usize, limit: usize) -> Result<Page<Verification>> {
        let page = self.inner.find_all(filter, page, limit)?;
        thread::sleep(Duration::from_millis(200));
        Ok(page)
    }

    fn create(&self, verification: &Verification, uniqueness: Uniqueness) -> Result<Verification> {
        self.inner.create(verification, uniqueness)
    }

    fn update(&self, verification: &Verification, expected_version: u64) -> Result<Verification> {
        self.inner.update(verification, expected_version)
    }

    fn delete(&self, id: &str) -> Result<()> {
        self.inner.delete(id)
    }
}

#[test]
fn test_concurrent_opens_leave_one_verification() {
    let store = Arc::new(SlowList {
        inner: MemoryVerificationRepository::new(),
    });
    let t = TestDesk::with_verifications(DeskConfig::default(), store.clone());
    let ticket = resolved_ticket(&t);

    let desk = &t.desk;
    let ticket = ticket.as_str();
    let results: Vec<Result<Verification>> = thread::scope(|s| {
        let handles: Vec<_> = (0..2)
            .map(|_| s.spawn(move || desk.open_verification(ticket, "bob")))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results.iter().any(|r| matches!(r, Err(Error::Conflict(_)))));
    assert_eq!(store.inner.for_ticket(ticket).unwrap().len(), 1);
}
