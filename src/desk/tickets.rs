//! Ticket operations

use crate::core::error::Result;
use crate::core::models::{Actor, Page, Ticket, TicketDraft, TicketFilter, TicketPatch, TicketStatus};
use crate::core::services::lifecycle;

use super::Helpdesk;

impl Helpdesk {
    /// Open a ticket on behalf of `actor`
    pub fn create_ticket(&self, actor: &Actor, draft: &TicketDraft) -> Result<Ticket> {
        let id = self.collab.tickets.next_id()?;
        let ticket = lifecycle::create(id, draft, actor.user_id.as_str(), self.collab.clock.now())?;
        let stored = self.collab.tickets.create(&ticket)?;
        log::info!(
            "ticket {} opened by {} ({})",
            stored.id(),
            actor.user_id,
            stored.priority()
        );
        Ok(stored)
    }

    /// Fetch a ticket
    pub fn ticket(&self, id: &str) -> Result<Ticket> {
        self.collab.tickets.get(id)
    }

    /// List tickets
    pub fn list_tickets(&self, filter: &TicketFilter, page: usize, limit: usize) -> Result<Page<Ticket>> {
        self.collab.tickets.find_all(filter, page, limit)
    }

    /// Apply a partial update, guarded by the assignment policy
    pub fn update_ticket(&self, id: &str, patch: &TicketPatch, actor: &Actor) -> Result<Ticket> {
        let current = self.collab.tickets.get(id)?;
        let next = lifecycle::update_fields(
            &current,
            patch,
            actor,
            self.config.workflow.transitions,
            self.collab.clock.now(),
        )?;
        let stored = self.commit(&current, &next)?;
        if current.status() != stored.status() {
            log::info!(
                "ticket {} moved {} -> {} by {}",
                id,
                current.status(),
                stored.status(),
                actor.user_id
            );
        }
        Ok(stored)
    }

    /// Change only the status
    pub fn transition_ticket(&self, id: &str, status: TicketStatus, actor: &Actor) -> Result<Ticket> {
        let patch = TicketPatch {
            status: Some(status),
            ..TicketPatch::default()
        };
        self.update_ticket(id, &patch, actor)
    }

    /// Change only the assignee
    pub fn assign_ticket(&self, id: &str, assignee: &str, actor: &Actor) -> Result<Ticket> {
        let patch = TicketPatch {
            assigned_to: Some(assignee.to_string()),
            ..TicketPatch::default()
        };
        self.update_ticket(id, &patch, actor)
    }

    /// Delete a ticket; creator or admin only
    pub fn delete_ticket(&self, id: &str, actor: &Actor) -> Result<()> {
        let current = self.collab.tickets.get(id)?;
        lifecycle::ensure_can_delete(&current, actor)?;
        self.collab.tickets.delete(id)?;
        self.sweep_state().ledger.forget(id);
        log::info!("ticket {id} deleted by {}", actor.user_id);
        Ok(())
    }

    /// Attach a file reference
    pub fn add_attachment(&self, id: &str, reference: &str, actor: &Actor) -> Result<Ticket> {
        let current = self.collab.tickets.get(id)?;
        let next = lifecycle::add_attachment(&current, reference, actor, self.collab.clock.now())?;
        self.commit(&current, &next)
    }

    /// Detach a file reference
    pub fn remove_attachment(&self, id: &str, reference: &str, actor: &Actor) -> Result<Ticket> {
        let current = self.collab.tickets.get(id)?;
        let next = lifecycle::remove_attachment(&current, reference, actor, self.collab.clock.now())?;
        self.commit(&current, &next)
    }
}
