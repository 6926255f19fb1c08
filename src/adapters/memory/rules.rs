//! In-memory escalation rule repository

use std::collections::HashMap;
use std::sync::RwLock;

use crate::core::error::{Error, Result};
use crate::core::models::{EscalationRule, Page, Priority};
use crate::core::ports::RuleRepository;

use super::{IdSequence, read, sequence_key, write};

/// Rule store backed by a map
#[derive(Debug)]
pub struct MemoryRuleRepository {
    ids: IdSequence,
    rules: RwLock<HashMap<String, EscalationRule>>,
}

impl MemoryRuleRepository {
    /// Empty store
    #[must_use]
    pub fn new() -> Self {
        Self {
            ids: IdSequence::new("ESC"),
            rules: RwLock::new(HashMap::new()),
        }
    }

    /// Store pre-populated with already-validated rules
    #[must_use]
    pub fn with_rules(rules: Vec<EscalationRule>) -> Self {
        let repo = Self::new();
        {
            let mut map = write(&repo.rules);
            for rule in rules {
                repo.ids.observe(&rule.id);
                map.insert(rule.id.clone(), rule);
            }
        }
        repo
    }
}

impl Default for MemoryRuleRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleRepository for MemoryRuleRepository {
    fn next_id(&self) -> Result<String> {
        Ok(self.ids.next_id())
    }

    fn find_by_id(&self, id: &str) -> Result<Option<EscalationRule>> {
        Ok(read(&self.rules).get(id).cloned())
    }

    fn find_all(
        &self,
        priority: Option<Priority>,
        page: usize,
        limit: usize,
    ) -> Result<Page<EscalationRule>> {
        let mut matching: Vec<EscalationRule> = read(&self.rules)
            .values()
            .filter(|r| priority.is_none_or(|p| p == r.priority))
            .cloned()
            .collect();
        matching.sort_by(|a, b| {
            (a.created_at, sequence_key(&a.id)).cmp(&(b.created_at, sequence_key(&b.id)))
        });
        Ok(Page::paginate(matching, page, limit))
    }

    fn create(&self, rule: &EscalationRule) -> Result<EscalationRule> {
        let mut map = write(&self.rules);
        if map.contains_key(&rule.id) {
            return Err(Error::conflict(format!("rule '{}' already exists", rule.id)));
        }
        self.ids.observe(&rule.id);
        map.insert(rule.id.clone(), rule.clone());
        Ok(rule.clone())
    }

    fn update(&self, rule: &EscalationRule) -> Result<EscalationRule> {
        let mut map = write(&self.rules);
        let slot = map.get_mut(&rule.id).ok_or_else(|| Error::not_found("rule", &rule.id))?;
        *slot = rule.clone();
        Ok(rule.clone())
    }

    fn delete(&self, id: &str) -> Result<()> {
        write(&self.rules)
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| Error::not_found("rule", id))
    }
}
