//! Verification operations

use chrono::{DateTime, Utc};

use crate::core::error::{Error, Result};
use crate::core::models::{
    Actor, Page, Ticket, TicketStatus, Verification, VerificationFilter, VerificationPatch,
    permissions,
};
use crate::core::services::{lifecycle, verification};

use super::Helpdesk;

/// Attempts at reopening a ticket that keeps changing underneath
const REOPEN_ATTEMPTS: usize = 3;

impl Helpdesk {
    /// Open a pending verification of `ticket_id` by `user_id`
    pub fn open_verification(&self, ticket_id: &str, user_id: &str) -> Result<Verification> {
        let ticket = self.collab.tickets.get(ticket_id)?;
        if !self.collab.users.exists(user_id)? {
            return Err(Error::not_found("user", user_id));
        }
        let existing = self.collab.verifications.for_ticket(ticket_id)?;

        let id = self.collab.verifications.next_id()?;
        let opened = verification::open(
            id,
            &ticket,
            user_id,
            &existing,
            self.config.verification.uniqueness,
            self.config.verification.require_resolved,
            self.collab.clock.now(),
        )?;
        let stored = self.collab.verifications.create(&opened, self.config.verification.uniqueness)?;
        log::info!("verification {} opened on {ticket_id} for {user_id}", stored.id());
        Ok(stored)
    }

    /// Accept with a 1-5 rating
    pub fn accept_verification(&self, id: &str, rating: i32, feedback: Option<&str>) -> Result<Verification> {
        let current = self.collab.verifications.get(id)?;
        let next = verification::accept(&current, rating, feedback, self.collab.clock.now())?;
        let stored = self.collab.verifications.update(&next, current.version())?;
        log::info!("verification {id} accepted ({rating}/5)");
        Ok(stored)
    }

    /// Reject with feedback.
    ///
    /// The verification is written first, so a rejection that loses a race
    /// leaves the ticket untouched. With `reopen_on_reject` a still resolved
    /// ticket then moves back to open.
    pub fn reject_verification(&self, id: &str, feedback: &str) -> Result<Verification> {
        let now = self.collab.clock.now();
        let current = self.collab.verifications.get(id)?;
        let next = verification::reject(&current, feedback, now)?;
        let stored = self.collab.verifications.update(&next, current.version())?;
        log::info!("verification {id} rejected");

        let reopened = if self.config.verification.reopen_on_reject {
            self.reopen(stored.ticket_id(), now)?
        } else {
            None
        };
        if let Some(ticket) = reopened {
            log::info!("ticket {} reopened after rejected verification {id}", ticket.id());
        }
        Ok(stored)
    }

    /// Move a resolved ticket back to open, re-reading it after each lost race
    fn reopen(&self, ticket_id: &str, now: DateTime<Utc>) -> Result<Option<Ticket>> {
        let mut attempt = 1;
        loop {
            let Some(ticket) = self
                .collab
                .tickets
                .find_by_id(ticket_id)?
                .filter(|t| t.status() == TicketStatus::Resolved)
            else {
                return Ok(None);
            };
            let reopened =
                lifecycle::transition(&ticket, TicketStatus::Open, self.config.workflow.transitions, now)?;
            match self.commit(&ticket, &reopened) {
                Ok(stored) => return Ok(Some(stored)),
                Err(Error::Conflict(reason)) if attempt < REOPEN_ATTEMPTS => {
                    log::debug!("reopening {ticket_id} lost a race, retrying: {reason}");
                    attempt += 1;
                },
                Err(e) => return Err(e),
            }
        }
    }

    /// Administrative correction; needs `verification:manage`
    pub fn update_verification(
        &self,
        id: &str,
        patch: &VerificationPatch,
        actor: &Actor,
    ) -> Result<Verification> {
        self.authority.require(actor, permissions::VERIFICATION_MANAGE)?;
        let current = self.collab.verifications.get(id)?;
        let next = verification::apply_patch(&current, patch, self.collab.clock.now())?;
        let stored = self.collab.verifications.update(&next, current.version())?;
        log::info!("verification {id} corrected by {}", actor.user_id);
        Ok(stored)
    }

    /// Fetch a verification
    pub fn verification(&self, id: &str) -> Result<Verification> {
        self.collab.verifications.get(id)
    }

    /// List verifications
    pub fn list_verifications(
        &self,
        filter: &VerificationFilter,
        page: usize,
        limit: usize,
    ) -> Result<Page<Verification>> {
        self.collab.verifications.find_all(filter, page, limit)
    }
}
