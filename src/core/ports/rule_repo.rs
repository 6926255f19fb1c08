//! Escalation rule repository port

use crate::core::error::{Error, Result};
use crate::core::models::{EscalationRule, MAX_LIMIT, Page, Priority};

/// Repository for escalation rules
pub trait RuleRepository: Send + Sync {
    /// Reserve a fresh rule id
    fn next_id(&self) -> Result<String>;

    /// Find a rule by id
    fn find_by_id(&self, id: &str) -> Result<Option<EscalationRule>>;

    /// List rules, optionally restricted to one priority
    fn find_all(
        &self,
        priority: Option<Priority>,
        page: usize,
        limit: usize,
    ) -> Result<Page<EscalationRule>>;

    /// Store a new rule
    fn create(&self, rule: &EscalationRule) -> Result<EscalationRule>;

    /// Replace a stored rule as a whole
    fn update(&self, rule: &EscalationRule) -> Result<EscalationRule>;

    /// Remove a rule
    fn delete(&self, id: &str) -> Result<()>;

    /// Find a rule or fail with `NotFound`
    fn get(&self, id: &str) -> Result<EscalationRule> {
        self.find_by_id(id)?.ok_or_else(|| Error::not_found("rule", id))
    }

    /// Every stored rule
    fn all(&self) -> Result<Vec<EscalationRule>> {
        let mut out = Vec::new();
        let mut page = 1;
        loop {
            let batch = self.find_all(None, page, MAX_LIMIT)?;
            let more = batch.has_next();
            out.extend(batch.items);
            if !more {
                return Ok(out);
            }
            page += 1;
        }
    }
}
