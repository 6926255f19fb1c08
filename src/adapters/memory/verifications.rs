//! In-memory verification repository with optimistic versioning

use std::collections::HashMap;
use std::sync::RwLock;

use crate::core::error::{Error, Result};
use crate::core::models::{Page, Uniqueness, Verification, VerificationFilter};
use crate::core::ports::VerificationRepository;

use super::{IdSequence, read, sequence_key, write};

/// Verification store backed by a map
#[derive(Debug)]
pub struct MemoryVerificationRepository {
    ids: IdSequence,
    verifications: RwLock<HashMap<String, Verification>>,
}

impl MemoryVerificationRepository {
    /// Empty store
    #[must_use]
    pub fn new() -> Self {
        Self {
            ids: IdSequence::new("VRF"),
            verifications: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryVerificationRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl VerificationRepository for MemoryVerificationRepository {
    fn next_id(&self) -> Result<String> {
        Ok(self.ids.next_id())
    }

    fn find_by_id(&self, id: &str) -> Result<Option<Verification>> {
        Ok(read(&self.verifications).get(id).cloned())
    }

    fn find_all(
        &self,
        filter: &VerificationFilter,
        page: usize,
        limit: usize,
    ) -> Result<Page<Verification>> {
        let mut matching: Vec<Verification> =
            read(&self.verifications).values().filter(|v| filter.matches(v)).cloned().collect();
        matching.sort_by(|a, b| {
            (a.created_at, sequence_key(&a.id)).cmp(&(b.created_at, sequence_key(&b.id)))
        });
        Ok(Page::paginate(matching, page, limit))
    }

    fn create(&self, verification: &Verification, uniqueness: Uniqueness) -> Result<Verification> {
        let mut map = write(&self.verifications);
        if map.contains_key(&verification.id) {
            return Err(Error::conflict(format!(
                "verification '{}' already exists",
                verification.id
            )));
        }
        if let Some(active) = map
            .values()
            .find(|v| v.ticket_id == verification.ticket_id && uniqueness.blocks(v))
        {
            return Err(Error::conflict(format!(
                "ticket '{}' already has verification '{}' ({})",
                verification.ticket_id, active.id, active.status
            )));
        }
        self.ids.observe(&verification.id);
        let mut stored = verification.clone();
        stored.version = 1;
        map.insert(stored.id.clone(), stored.clone());
        Ok(stored)
    }

    fn update(&self, verification: &Verification, expected_version: u64) -> Result<Verification> {
        let mut map = write(&self.verifications);
        let current = map
            .get(&verification.id)
            .ok_or_else(|| Error::not_found("verification", &verification.id))?;
        if current.version != expected_version {
            return Err(Error::conflict(format!(
                "verification '{}' changed concurrently (expected version {expected_version}, found {})",
                verification.id, current.version
            )));
        }
        let mut stored = verification.clone();
        stored.version = expected_version + 1;
        map.insert(stored.id.clone(), stored.clone());
        Ok(stored)
    }

    fn delete(&self, id: &str) -> Result<()> {
        write(&self.verifications)
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| Error::not_found("verification", id))
    }
}
