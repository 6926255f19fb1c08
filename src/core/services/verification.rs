//! Verification workflow
//!
//! pending → {accepted, rejected}; both outcomes are final.
//! Reopening the ticket after a rejection is the caller's integration,
//! not a transition of the verification itself.

use chrono::{DateTime, Utc};

use crate::core::error::{Error, Result};
pub use crate::core::models::Uniqueness;
use crate::core::models::{
    MAX_RATING, MIN_RATING, Ticket, TicketStatus, Verification, VerificationPatch,
    VerificationStatus,
};

/// Accept a rating in `MIN_RATING..=MAX_RATING`
pub fn validate_rating(rating: i32) -> Result<u8> {
    if !(MIN_RATING..=MAX_RATING).contains(&rating) {
        return Err(Error::validation(format!(
            "rating must be between {MIN_RATING} and {MAX_RATING}, got {rating}"
        )));
    }
    u8::try_from(rating).map_err(|_| Error::validation(format!("rating {rating} out of range")))
}

fn required_feedback(feedback: &str) -> Result<String> {
    let trimmed = feedback.trim();
    if trimmed.is_empty() {
        return Err(Error::validation("feedback is required when rejecting"));
    }
    Ok(trimmed.to_string())
}

fn ensure_pending(verification: &Verification) -> Result<()> {
    if verification.status.is_terminal() {
        return Err(Error::conflict(format!(
            "verification '{}' is already {}",
            verification.id, verification.status
        )));
    }
    Ok(())
}

/// Open a pending verification of `ticket`'s work by `user_id`.
///
/// `existing` are the verifications already attached to the ticket.
pub fn open(
    id: impl Into<String>,
    ticket: &Ticket,
    user_id: impl Into<String>,
    existing: &[Verification],
    uniqueness: Uniqueness,
    require_resolved: bool,
    now: DateTime<Utc>,
) -> Result<Verification> {
    if let Some(active) = existing.iter().find(|v| uniqueness.blocks(v)) {
        return Err(Error::conflict(format!(
            "ticket '{}' already has verification '{}' ({})",
            ticket.id, active.id, active.status
        )));
    }
    if require_resolved && ticket.status != TicketStatus::Resolved {
        return Err(Error::validation(format!(
            "ticket '{}' is {}, only resolved tickets can be verified",
            ticket.id, ticket.status
        )));
    }

    Ok(Verification {
        id: id.into(),
        ticket_id: ticket.id.clone(),
        user_id: user_id.into(),
        status: VerificationStatus::Pending,
        rating: None,
        feedback: None,
        created_at: now,
        updated_at: now,
        version: 0,
    })
}

/// Accept with a 1-5 rating and optional feedback
pub fn accept(
    verification: &Verification,
    rating: i32,
    feedback: Option<&str>,
    now: DateTime<Utc>,
) -> Result<Verification> {
    let rating = validate_rating(rating)?;
    ensure_pending(verification)?;

    let mut next = verification.clone();
    next.status = VerificationStatus::Accepted;
    next.rating = Some(rating);
    next.feedback = feedback.map(str::trim).filter(|f| !f.is_empty()).map(String::from);
    next.updated_at = now;
    Ok(next)
}

/// Reject with mandatory feedback; the rating stays empty
pub fn reject(verification: &Verification, feedback: &str, now: DateTime<Utc>) -> Result<Verification> {
    let feedback = required_feedback(feedback)?;
    ensure_pending(verification)?;

    let mut next = verification.clone();
    next.status = VerificationStatus::Rejected;
    next.rating = None;
    next.feedback = Some(feedback);
    next.updated_at = now;
    Ok(next)
}

/// Administrative correction
///
/// Same rules as accept/reject: ratings are bounded and only exist on
/// accepted verifications, rejections carry feedback, and nothing returns
/// to pending or leaves a final state.
pub fn apply_patch(
    verification: &Verification,
    patch: &VerificationPatch,
    now: DateTime<Utc>,
) -> Result<Verification> {
    let rating = patch.rating.map(validate_rating).transpose()?;
    let target = patch.status.unwrap_or(verification.status);

    if target == VerificationStatus::Pending && verification.status.is_terminal() {
        return Err(Error::validation("a decided verification cannot return to pending"));
    }
    if target != verification.status {
        ensure_pending(verification)?;
    }

    let mut next = verification.clone();
    next.status = target;
    if let Some(feedback) = &patch.feedback {
        let trimmed = feedback.trim();
        next.feedback = (!trimmed.is_empty()).then(|| trimmed.to_string());
    }

    match target {
        VerificationStatus::Accepted => {
            next.rating = rating.or(verification.rating);
            if next.rating.is_none() {
                return Err(Error::validation("an accepted verification needs a rating"));
            }
        },
        VerificationStatus::Rejected | VerificationStatus::Pending => {
            if rating.is_some() {
                return Err(Error::validation(format!(
                    "a rating can only be set on acceptance, status is {target}"
                )));
            }
            next.rating = None;
        },
    }
    if target == VerificationStatus::Rejected && next.feedback.is_none() {
        return Err(Error::validation("feedback is required when rejecting"));
    }

    next.updated_at = now;
    Ok(next)
}
