//! Identity context: who is acting, and the roles that grant permissions
//!
//! The core never authenticates anyone. Callers pass an [`Actor`] with every
//! guarded operation.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Permission strings understood by the core
pub mod permissions {
    /// Author and edit escalation rules
    pub const ESCALATION_MANAGE: &str = "escalation:manage";
    /// Be named as an escalation tier assignee
    pub const ESCALATION_RECEIVE: &str = "escalation:receive";
    /// Correct verifications administratively
    pub const VERIFICATION_MANAGE: &str = "verification:manage";
    /// Create roles and change their permissions
    pub const ROLE_MANAGE: &str = "role:manage";
}

/// The role an actor acts under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActorRole {
    /// Reports tickets
    #[default]
    Customer,
    /// Works tickets
    Agent,
    /// Full access
    Admin,
}

impl ActorRole {
    /// Role name as stored in the role repository
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::Agent => "agent",
            Self::Admin => "admin",
        }
    }
}

impl std::fmt::Display for ActorRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ActorRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "customer" | "user" => Ok(Self::Customer),
            "agent" | "support" => Ok(Self::Agent),
            "admin" | "administrator" => Ok(Self::Admin),
            _ => Err(format!("Invalid role: {s}. Use: customer, agent, admin")),
        }
    }
}

/// The acting user of a guarded operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// User id
    pub user_id: String,
    /// Role the user acts under
    pub role: ActorRole,
}

impl Actor {
    /// Create an actor
    #[must_use]
    pub fn new(user_id: impl Into<String>, role: ActorRole) -> Self {
        Self {
            user_id: user_id.into(),
            role,
        }
    }

    /// Shorthand for a customer
    #[must_use]
    pub fn customer(user_id: impl Into<String>) -> Self {
        Self::new(user_id, ActorRole::Customer)
    }

    /// Shorthand for an agent
    #[must_use]
    pub fn agent(user_id: impl Into<String>) -> Self {
        Self::new(user_id, ActorRole::Agent)
    }

    /// Shorthand for an administrator
    #[must_use]
    pub fn admin(user_id: impl Into<String>) -> Self {
        Self::new(user_id, ActorRole::Admin)
    }
}

/// A known user, as resolved by the user directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// User id
    pub id: String,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Role the user holds
    #[serde(default)]
    pub role: ActorRole,
}

impl User {
    /// Create a user
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, role: ActorRole) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            role,
        }
    }
}

/// A named permission set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    /// Role id
    pub id: String,
    /// Unique name
    pub name: String,
    /// What the role is for
    #[serde(default)]
    pub description: String,
    /// Granted permission strings
    #[serde(default)]
    pub permissions: BTreeSet<String>,
}

impl Role {
    /// Create a role
    #[must_use]
    pub fn new<I, S>(id: impl Into<String>, name: impl Into<String>, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            permissions: permissions.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether this role grants `permission`
    #[must_use]
    pub fn grants(&self, permission: &str) -> bool {
        self.permissions.contains(permission)
    }
}
