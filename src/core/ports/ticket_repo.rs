//! Ticket repository port
//!
//! Defines the persistence interface the lifecycle operations rely on.

use crate::core::error::{Error, Result};
use crate::core::models::{Page, Ticket, TicketFilter};

/// Repository for tickets
///
/// Implementations own durable storage. `update` is the optimistic
/// concurrency point: it must fail with [`Error::Conflict`] when the stored
/// version differs from `expected_version`, and must bump the version on success.
pub trait TicketRepository: Send + Sync {
    /// Reserve a fresh ticket id
    fn next_id(&self) -> Result<String>;

    /// Find a ticket by id
    fn find_by_id(&self, id: &str) -> Result<Option<Ticket>>;

    /// List tickets matching `filter`, 1-based `page`
    fn find_all(&self, filter: &TicketFilter, page: usize, limit: usize) -> Result<Page<Ticket>>;

    /// Store a new ticket; fails with `Conflict` if the id is taken
    fn create(&self, ticket: &Ticket) -> Result<Ticket>;

    /// Replace a stored ticket if its version still equals `expected_version`
    fn update(&self, ticket: &Ticket, expected_version: u64) -> Result<Ticket>;

    /// Remove a ticket
    fn delete(&self, id: &str) -> Result<()>;

    /// Find a ticket or fail with `NotFound`
    fn get(&self, id: &str) -> Result<Ticket> {
        self.find_by_id(id)?.ok_or_else(|| Error::not_found("ticket", id))
    }

    /// Every ticket matching `filter`, walking all pages
    fn snapshot(&self, filter: &TicketFilter) -> Result<Vec<Ticket>> {
        let mut out = Vec::new();
        let mut page = 1;
        loop {
            let batch = self.find_all(filter, page, crate::core::models::MAX_LIMIT)?;
            let more = batch.has_next();
            out.extend(batch.items);
            if !more {
                return Ok(out);
            }
            page += 1;
        }
    }
}
