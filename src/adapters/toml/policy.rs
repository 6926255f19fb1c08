//! Policy validation
//!
//! Turns a parsed [`PolicyFile`] into validated domain records. Every problem
//! is collected rather than stopping at the first, so `rules check` can
//! report them all at once.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::parser::{PolicyFile, load_file};
use crate::adapters::memory::MemoryRoleRepository;
use crate::core::error::Error;
use crate::core::models::{EscalationRule, Role, User};
use crate::core::services::escalation::build_rule;
use crate::core::services::{RoleAuthority, default_roles};

/// One problem found in a policy file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PolicyIssue {
    /// What the problem is attached to (`rule RULE-1`, `user bob`, ...)
    pub subject: String,
    /// Error kind code
    pub code: &'static str,
    /// Human-readable message
    pub message: String,
}

impl PolicyIssue {
    fn new(subject: impl Into<String>, error: &Error) -> Self {
        Self {
            subject: subject.into(),
            code: error.kind().as_str(),
            message: error.to_string(),
        }
    }
}

impl std::fmt::Display for PolicyIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.subject, self.message)
    }
}

/// Validated policy contents
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Policy {
    /// Known users
    pub users: Vec<User>,
    /// Built-in roles, overridden or extended by the file
    pub roles: Vec<Role>,
    /// Valid rules, in file order
    pub rules: Vec<EscalationRule>,
}

impl PolicyFile {
    /// Validate every entry.
    ///
    /// Invalid entries are left out of the returned [`Policy`] and reported
    /// as issues.
    #[must_use]
    pub fn compile(&self, now: DateTime<Utc>) -> (Policy, Vec<PolicyIssue>) {
        let mut issues = Vec::new();
        let roles = self.compile_roles(&mut issues);
        let users = self.compile_users(&mut issues);

        let authority = RoleAuthority::new(Arc::new(MemoryRoleRepository::with_roles(roles.clone())));
        let mut rules: Vec<EscalationRule> = Vec::new();
        for (i, entry) in self.rules.iter().enumerate() {
            let id = entry.id.clone().unwrap_or_else(|| format!("RULE-{}", i + 1));
            let subject = format!("rule {id}");
            if rules.iter().any(|r| r.id() == id) {
                issues.push(PolicyIssue::new(&subject, &Error::conflict(format!("duplicate rule id '{id}'"))));
                continue;
            }

            let rule = match build_rule(id, entry.draft.clone(), now) {
                Ok(rule) => rule,
                Err(e) => {
                    issues.push(PolicyIssue::new(&subject, &e));
                    continue;
                },
            };
            let problems: Vec<Error> = rule
                .tiers()
                .iter()
                .flat_map(|t| &t.assignees)
                .filter_map(|assignee| {
                    let Some(user) = users.iter().find(|u| &u.id == assignee) else {
                        return Some(Error::not_found("user", assignee));
                    };
                    authority.validate_assignee(user).err()
                })
                .collect();
            if problems.is_empty() {
                rules.push(rule);
            } else {
                issues.extend(problems.iter().map(|e| PolicyIssue::new(&subject, e)));
            }
        }

        (Policy { users, roles, rules }, issues)
    }

    fn compile_roles(&self, issues: &mut Vec<PolicyIssue>) -> Vec<Role> {
        let mut roles = default_roles();
        let mut seen = HashSet::new();
        for entry in &self.roles {
            let name = entry.name.trim();
            if name.is_empty() {
                issues.push(PolicyIssue::new("role", &Error::validation("role name must not be empty")));
                continue;
            }
            if !seen.insert(name.to_string()) {
                issues.push(PolicyIssue::new(
                    format!("role {name}"),
                    &Error::conflict(format!("role name '{name}' is declared twice")),
                ));
                continue;
            }
            let id = entry.id.clone().unwrap_or_else(|| format!("ROLE-{name}"));
            let mut role = Role::new(id, name, entry.permissions.iter().map(|p| p.trim()));
            role.description.clone_from(&entry.description);
            roles.retain(|r| r.name != role.name);
            roles.push(role);
        }
        roles
    }

    fn compile_users(&self, issues: &mut Vec<PolicyIssue>) -> Vec<User> {
        let mut users: Vec<User> = Vec::with_capacity(self.users.len());
        for user in &self.users {
            if user.id.trim().is_empty() {
                issues.push(PolicyIssue::new("user", &Error::validation("user id must not be empty")));
            } else if users.iter().any(|u| u.id == user.id) {
                issues.push(PolicyIssue::new(
                    format!("user {}", user.id),
                    &Error::conflict(format!("user '{}' is declared twice", user.id)),
                ));
            } else {
                users.push(user.clone());
            }
        }
        users
    }
}

/// Load and validate a policy file; any issue is an error
pub fn load_policy(path: &Path, now: DateTime<Utc>) -> anyhow::Result<Policy> {
    let (policy, issues) = load_file(path)?.compile(now);
    if let Some(first) = issues.first() {
        anyhow::bail!(
            "policy {} has {} problem(s), first: {first}",
            path.display(),
            issues.len()
        );
    }
    log::debug!(
        "policy {}: {} user(s), {} role(s), {} rule(s)",
        path.display(),
        policy.users.len(),
        policy.roles.len(),
        policy.rules.len()
    );
    Ok(policy)
}
