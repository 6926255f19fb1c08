//! In-memory role repository with a unique-name index

use std::collections::BTreeMap;
use std::sync::RwLock;

use crate::core::error::{Error, Result};
use crate::core::models::{Page, Role};
use crate::core::ports::RoleRepository;
use crate::core::services::default_roles;

use super::{IdSequence, read, write};

/// Role store backed by a map
#[derive(Debug)]
pub struct MemoryRoleRepository {
    ids: IdSequence,
    roles: RwLock<BTreeMap<String, Role>>,
}

impl MemoryRoleRepository {
    /// Empty store
    #[must_use]
    pub fn new() -> Self {
        Self {
            ids: IdSequence::new("ROLE"),
            roles: RwLock::new(BTreeMap::new()),
        }
    }

    /// Store seeded with the built-in admin, agent and customer roles
    #[must_use]
    pub fn with_default_roles() -> Self {
        Self::with_roles(default_roles())
    }

    /// Store seeded with `roles`; later duplicates by name replace earlier ones
    #[must_use]
    pub fn with_roles(roles: Vec<Role>) -> Self {
        let repo = Self::new();
        {
            let mut map = write(&repo.roles);
            for role in roles {
                map.retain(|_, r: &mut Role| r.name != role.name);
                repo.ids.observe(&role.id);
                map.insert(role.id.clone(), role);
            }
        }
        repo
    }
}

impl Default for MemoryRoleRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl RoleRepository for MemoryRoleRepository {
    fn next_id(&self) -> Result<String> {
        Ok(self.ids.next_id())
    }

    fn find_by_id(&self, id: &str) -> Result<Option<Role>> {
        Ok(read(&self.roles).get(id).cloned())
    }

    fn find_by_name(&self, name: &str) -> Result<Option<Role>> {
        Ok(read(&self.roles).values().find(|r| r.name == name).cloned())
    }

    fn find_all(&self, page: usize, limit: usize) -> Result<Page<Role>> {
        let mut all: Vec<Role> = read(&self.roles).values().cloned().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(Page::paginate(all, page, limit))
    }

    fn create(&self, role: &Role) -> Result<Role> {
        let mut map = write(&self.roles);
        if map.contains_key(&role.id) {
            return Err(Error::conflict(format!("role '{}' already exists", role.id)));
        }
        if map.values().any(|r| r.name == role.name) {
            return Err(Error::conflict(format!("role name '{}' is taken", role.name)));
        }
        self.ids.observe(&role.id);
        map.insert(role.id.clone(), role.clone());
        Ok(role.clone())
    }

    fn update(&self, role: &Role) -> Result<Role> {
        let mut map = write(&self.roles);
        if !map.contains_key(&role.id) {
            return Err(Error::not_found("role", &role.id));
        }
        if map.values().any(|r| r.name == role.name && r.id != role.id) {
            return Err(Error::conflict(format!("role name '{}' is taken", role.name)));
        }
        map.insert(role.id.clone(), role.clone());
        Ok(role.clone())
    }

    fn delete(&self, id: &str) -> Result<()> {
        write(&self.roles)
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| Error::not_found("role", id))
    }
}
