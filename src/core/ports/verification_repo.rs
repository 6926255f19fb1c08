//! Verification repository port

use crate::core::error::{Error, Result};
use crate::core::models::{MAX_LIMIT, Page, Uniqueness, Verification, VerificationFilter};

/// Repository for verifications
///
/// Both writes are concurrency points. `create` must check `uniqueness`
/// against the ticket's stored verifications in the same critical section
/// as the insert. `update` must fail with [`Error::Conflict`] when the stored
/// version differs from `expected_version`, and must bump the version on success.
pub trait VerificationRepository: Send + Sync {
    /// Reserve a fresh verification id
    fn next_id(&self) -> Result<String>;

    /// Find a verification by id
    fn find_by_id(&self, id: &str) -> Result<Option<Verification>>;

    /// List verifications matching `filter`
    fn find_all(
        &self,
        filter: &VerificationFilter,
        page: usize,
        limit: usize,
    ) -> Result<Page<Verification>>;

    /// Store a new verification at version 1 unless `uniqueness` forbids
    /// another one on its ticket
    fn create(&self, verification: &Verification, uniqueness: Uniqueness) -> Result<Verification>;

    /// Replace a stored verification if its version still equals `expected_version`
    fn update(&self, verification: &Verification, expected_version: u64) -> Result<Verification>;

    /// Remove a verification
    fn delete(&self, id: &str) -> Result<()>;

    /// Find a verification or fail with `NotFound`
    fn get(&self, id: &str) -> Result<Verification> {
        self.find_by_id(id)?.ok_or_else(|| Error::not_found("verification", id))
    }

    /// All verifications attached to one ticket, walking all pages
    fn for_ticket(&self, ticket_id: &str) -> Result<Vec<Verification>> {
        let filter = VerificationFilter::for_ticket(ticket_id);
        let mut out = Vec::new();
        let mut page = 1;
        loop {
            let batch = self.find_all(&filter, page, MAX_LIMIT)?;
            let more = batch.has_next();
            out.extend(batch.items);
            if !more {
                return Ok(out);
            }
            page += 1;
        }
    }
}
