//! In-memory repositories
//!
//! Reference collaborators used by the CLI and the test suite. Each store is
//! a lock-protected map; ids are generated as `PREFIX-N`.

mod roles;
mod rules;
mod tickets;
mod users;
mod verifications;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

pub use roles::MemoryRoleRepository;
pub use rules::MemoryRuleRepository;
pub use tickets::MemoryTicketRepository;
pub use users::{MemoryNotifier, MemoryUserDirectory, Notice};
pub use verifications::MemoryVerificationRepository;

/// `PREFIX-N` id generator
#[derive(Debug)]
struct IdSequence {
    prefix: &'static str,
    next: AtomicU64,
}

impl IdSequence {
    const fn new(prefix: &'static str) -> Self {
        Self {
            prefix,
            next: AtomicU64::new(1),
        }
    }

    fn next_id(&self) -> String {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        format!("{}-{n}", self.prefix)
    }

    /// Make sure ids handed out later never collide with `id`
    fn observe(&self, id: &str) {
        let numeric = id
            .strip_prefix(self.prefix)
            .and_then(|rest| rest.strip_prefix('-'))
            .and_then(|n| n.parse::<u64>().ok());
        if let Some(n) = numeric {
            self.next.fetch_max(n + 1, Ordering::Relaxed);
        }
    }
}

/// Listing key for `PREFIX-N` ids: same-prefix ids order by `N`, so
/// `TKT-2` comes before `TKT-10`. Other ids order by their text.
fn sequence_key(id: &str) -> (&str, Option<u64>, &str) {
    match id.rsplit_once('-').map(|(prefix, n)| (prefix, n.parse::<u64>())) {
        Some((prefix, Ok(n))) => (prefix, Some(n), id),
        _ => (id, None, id),
    }
}

// A panic while holding a store lock leaves the map itself consistent, so
// poisoning is ignored.
fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}
