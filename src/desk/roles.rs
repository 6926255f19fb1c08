//! Role management

use crate::core::error::{Error, Result};
use crate::core::models::{Actor, ActorRole, Page, Role, permissions};

use super::Helpdesk;

fn required(field: &str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::validation(format!("{field} must not be empty")));
    }
    Ok(trimmed.to_string())
}

impl Helpdesk {
    /// Create a role; names are unique
    pub fn create_role<I, S>(&self, actor: &Actor, name: &str, description: &str, grants: I) -> Result<Role>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.authority.require(actor, permissions::ROLE_MANAGE)?;
        let name = required("role name", name)?;
        let grants = grants
            .into_iter()
            .map(|p| required("permission", p.as_ref()))
            .collect::<Result<Vec<_>>>()?;

        let mut role = Role::new(self.collab.roles.next_id()?, name, grants);
        role.description = description.trim().to_string();
        let stored = self.collab.roles.create(&role)?;
        log::info!("role {} ({}) created by {}", stored.id, stored.name, actor.user_id);
        Ok(stored)
    }

    /// Add `permission` to a role
    pub fn grant_permission(&self, actor: &Actor, role_id: &str, permission: &str) -> Result<Role> {
        self.authority.require(actor, permissions::ROLE_MANAGE)?;
        let permission = required("permission", permission)?;
        let mut role = self.collab.roles.get(role_id)?;
        if !role.permissions.insert(permission.clone()) {
            return Ok(role);
        }
        log::info!("{} granted {permission}", role.name);
        self.collab.roles.update(&role)
    }

    /// Remove `permission` from a role
    pub fn revoke_permission(&self, actor: &Actor, role_id: &str, permission: &str) -> Result<Role> {
        self.authority.require(actor, permissions::ROLE_MANAGE)?;
        let mut role = self.collab.roles.get(role_id)?;
        if !role.permissions.remove(permission.trim()) {
            return Err(Error::not_found("permission", permission.trim()));
        }
        log::info!("{} lost {}", role.name, permission.trim());
        self.collab.roles.update(&role)
    }

    /// Delete a role. The built-in role names cannot be deleted.
    pub fn delete_role(&self, actor: &Actor, role_id: &str) -> Result<()> {
        self.authority.require(actor, permissions::ROLE_MANAGE)?;
        let role = self.collab.roles.get(role_id)?;
        if role.name.parse::<ActorRole>().is_ok_and(|r| r.as_str() == role.name) {
            return Err(Error::conflict(format!("built-in role '{}' cannot be deleted", role.name)));
        }
        self.collab.roles.delete(role_id)
    }

    /// Fetch a role by id
    pub fn role(&self, id: &str) -> Result<Role> {
        self.collab.roles.get(id)
    }

    /// List roles by name
    pub fn list_roles(&self, page: usize, limit: usize) -> Result<Page<Role>> {
        self.collab.roles.find_all(page, limit)
    }
}
