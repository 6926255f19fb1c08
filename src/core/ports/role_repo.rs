//! Role repository port

use crate::core::error::{Error, Result};
use crate::core::models::{Page, Role};

/// Repository for roles
pub trait RoleRepository: Send + Sync {
    /// Reserve a fresh role id
    fn next_id(&self) -> Result<String>;

    /// Find a role by id
    fn find_by_id(&self, id: &str) -> Result<Option<Role>>;

    /// Find a role by its unique name
    fn find_by_name(&self, name: &str) -> Result<Option<Role>>;

    /// List roles
    fn find_all(&self, page: usize, limit: usize) -> Result<Page<Role>>;

    /// Store a new role; fails with `Conflict` on a duplicate name
    fn create(&self, role: &Role) -> Result<Role>;

    /// Replace a stored role
    fn update(&self, role: &Role) -> Result<Role>;

    /// Remove a role
    fn delete(&self, id: &str) -> Result<()>;

    /// Find a role or fail with `NotFound`
    fn get(&self, id: &str) -> Result<Role> {
        self.find_by_id(id)?.ok_or_else(|| Error::not_found("role", id))
    }
}
