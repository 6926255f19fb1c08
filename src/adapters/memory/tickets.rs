//! In-memory ticket repository with optimistic versioning

use std::collections::HashMap;
use std::sync::RwLock;

use crate::core::error::{Error, Result};
use crate::core::models::{Page, Ticket, TicketFilter};
use crate::core::ports::TicketRepository;

use super::{IdSequence, read, sequence_key, write};

/// Ticket store backed by a map
#[derive(Debug)]
pub struct MemoryTicketRepository {
    ids: IdSequence,
    tickets: RwLock<HashMap<String, Ticket>>,
}

impl MemoryTicketRepository {
    /// Empty store
    #[must_use]
    pub fn new() -> Self {
        Self {
            ids: IdSequence::new("TKT"),
            tickets: RwLock::new(HashMap::new()),
        }
    }

    /// Store pre-populated with `tickets`, kept at their stored versions
    #[must_use]
    pub fn with_tickets(tickets: Vec<Ticket>) -> Self {
        let repo = Self::new();
        {
            let mut map = write(&repo.tickets);
            for ticket in tickets {
                repo.ids.observe(&ticket.id);
                map.insert(ticket.id.clone(), ticket);
            }
        }
        repo
    }

    /// Every stored ticket, oldest first
    #[must_use]
    pub fn all(&self) -> Vec<Ticket> {
        let mut all: Vec<Ticket> = read(&self.tickets).values().cloned().collect();
        sort(&mut all);
        all
    }
}

impl Default for MemoryTicketRepository {
    fn default() -> Self {
        Self::new()
    }
}

fn sort(tickets: &mut [Ticket]) {
    tickets.sort_by(|a, b| {
        (a.created_at, sequence_key(&a.id)).cmp(&(b.created_at, sequence_key(&b.id)))
    });
}

impl TicketRepository for MemoryTicketRepository {
    fn next_id(&self) -> Result<String> {
        Ok(self.ids.next_id())
    }

    fn find_by_id(&self, id: &str) -> Result<Option<Ticket>> {
        Ok(read(&self.tickets).get(id).cloned())
    }

    fn find_all(&self, filter: &TicketFilter, page: usize, limit: usize) -> Result<Page<Ticket>> {
        let mut matching: Vec<Ticket> =
            read(&self.tickets).values().filter(|t| filter.matches(t)).cloned().collect();
        sort(&mut matching);
        Ok(Page::paginate(matching, page, limit))
    }

    fn create(&self, ticket: &Ticket) -> Result<Ticket> {
        let mut map = write(&self.tickets);
        if map.contains_key(&ticket.id) {
            return Err(Error::conflict(format!("ticket '{}' already exists", ticket.id)));
        }
        self.ids.observe(&ticket.id);
        let mut stored = ticket.clone();
        stored.version = 1;
        map.insert(stored.id.clone(), stored.clone());
        Ok(stored)
    }

    fn update(&self, ticket: &Ticket, expected_version: u64) -> Result<Ticket> {
        let mut map = write(&self.tickets);
        let current = map.get(&ticket.id).ok_or_else(|| Error::not_found("ticket", &ticket.id))?;
        if current.version != expected_version {
            return Err(Error::conflict(format!(
                "ticket '{}' changed concurrently (expected version {expected_version}, found {})",
                ticket.id, current.version
            )));
        }
        let mut stored = ticket.clone();
        stored.version = expected_version + 1;
        map.insert(stored.id.clone(), stored.clone());
        Ok(stored)
    }

    fn delete(&self, id: &str) -> Result<()> {
        write(&self.tickets)
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| Error::not_found("ticket", id))
    }
}
