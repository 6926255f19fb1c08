//! Role authority and assignment policy
//!
//! [`RoleAuthority`] answers "does role X hold permission Y" from the role
//! repository. [`AssignmentPolicy`] decides who may mutate or delete a ticket.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::core::error::{Error, Result};
use crate::core::models::{Actor, ActorRole, Role, Ticket, User, permissions};
use crate::core::ports::RoleRepository;

/// Built-in roles seeded into a fresh role store
#[must_use]
pub fn default_roles() -> Vec<Role> {
    let mut admin = Role::new(
        "ROLE-admin",
        ActorRole::Admin.as_str(),
        [
            permissions::ESCALATION_MANAGE,
            permissions::ESCALATION_RECEIVE,
            permissions::VERIFICATION_MANAGE,
            permissions::ROLE_MANAGE,
        ],
    );
    admin.description = "Full access".to_string();

    let mut agent =
        Role::new("ROLE-agent", ActorRole::Agent.as_str(), [permissions::ESCALATION_RECEIVE]);
    agent.description = "Works tickets and receives escalations".to_string();

    let mut customer = Role::new("ROLE-customer", ActorRole::Customer.as_str(), Vec::<String>::new());
    customer.description = "Reports tickets".to_string();

    vec![admin, agent, customer]
}

/// Resolves roles to permission sets
#[derive(Clone)]
pub struct RoleAuthority {
    roles: Arc<dyn RoleRepository>,
}

impl std::fmt::Debug for RoleAuthority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoleAuthority").finish_non_exhaustive()
    }
}

impl RoleAuthority {
    /// Authority backed by a role repository
    #[must_use]
    pub fn new(roles: Arc<dyn RoleRepository>) -> Self {
        Self { roles }
    }

    /// Administrators bypass every permission and ownership check
    #[must_use]
    pub const fn is_admin(role: ActorRole) -> bool {
        matches!(role, ActorRole::Admin)
    }

    /// The stored role record for `role`
    pub fn role(&self, role: ActorRole) -> Result<Role> {
        self.roles
            .find_by_name(role.as_str())?
            .ok_or_else(|| Error::not_found("role", role.as_str()))
    }

    /// Permission strings granted to `role`
    pub fn permissions(&self, role: ActorRole) -> Result<BTreeSet<String>> {
        Ok(self.role(role)?.permissions)
    }

    /// Whether `role` holds `permission`
    pub fn holds(&self, role: ActorRole, permission: &str) -> Result<bool> {
        if Self::is_admin(role) {
            return Ok(true);
        }
        Ok(self.role(role)?.grants(permission))
    }

    /// Fail with `Forbidden` unless the actor holds `permission`
    pub fn require(&self, actor: &Actor, permission: &str) -> Result<()> {
        if self.holds(actor.role, permission)? {
            Ok(())
        } else {
            log::debug!("{} ({}) lacks {permission}", actor.user_id, actor.role);
            Err(Error::forbidden(format!(
                "role '{}' does not grant '{permission}'",
                actor.role
            )))
        }
    }

    /// Fail with `Validation` unless `user` may be named as a tier assignee
    pub fn validate_assignee(&self, user: &User) -> Result<()> {
        if self.holds(user.role, permissions::ESCALATION_RECEIVE)? {
            Ok(())
        } else {
            Err(Error::validation(format!(
                "user '{}' with role '{}' cannot receive escalations",
                user.id, user.role
            )))
        }
    }
}

/// Ownership-based mutation guard
///
/// Update is allowed for the creator, the assignee, or an admin.
/// Delete is stricter: creator or admin only.
#[derive(Debug, Clone, Copy, Default)]
pub struct AssignmentPolicy;

impl AssignmentPolicy {
    /// Whether `actor` may update `ticket`
    #[must_use]
    pub fn can_mutate(self, ticket: &Ticket, actor: &Actor) -> bool {
        RoleAuthority::is_admin(actor.role)
            || ticket.is_creator(&actor.user_id)
            || ticket.is_assignee(&actor.user_id)
    }

    /// Whether `actor` may delete `ticket`
    #[must_use]
    pub fn can_delete(self, ticket: &Ticket, actor: &Actor) -> bool {
        RoleAuthority::is_admin(actor.role) || ticket.is_creator(&actor.user_id)
    }

    /// Assignment follows the update rule
    #[must_use]
    pub fn can_assign(self, ticket: &Ticket, actor: &Actor) -> bool {
        self.can_mutate(ticket, actor)
    }

    /// `Forbidden` unless [`Self::can_mutate`]
    pub fn ensure_can_mutate(self, ticket: &Ticket, actor: &Actor) -> Result<()> {
        if self.can_mutate(ticket, actor) {
            Ok(())
        } else {
            Err(Error::forbidden(format!(
                "user '{}' may not modify ticket '{}'",
                actor.user_id,
                ticket.id()
            )))
        }
    }

    /// `Forbidden` unless [`Self::can_delete`]
    pub fn ensure_can_delete(self, ticket: &Ticket, actor: &Actor) -> Result<()> {
        if self.can_delete(ticket, actor) {
            Ok(())
        } else {
            Err(Error::forbidden(format!(
                "user '{}' may not delete ticket '{}'",
                actor.user_id,
                ticket.id()
            )))
        }
    }
}
