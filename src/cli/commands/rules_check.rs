//! Validate a policy file

use std::path::Path;

use chrono::Utc;

use helpdesk::adapters::toml::load_file;
use helpdesk::output::{OutputMode, RuleInfo, RulesCheckResult};

/// Check every entry in the policy file at `path`
pub fn rules_check(path: &Path, mode: OutputMode) -> anyhow::Result<()> {
    let (policy, issues) = load_file(path)?.compile(Utc::now());

    let rules = policy
        .rules
        .iter()
        .map(|r| RuleInfo {
            id: r.id().to_string(),
            name: r.name().to_string(),
            priority: r.priority().to_string(),
            tiers: r.tiers().to_vec(),
        })
        .collect();
    let result = RulesCheckResult {
        path: path.display().to_string(),
        valid: issues.is_empty(),
        rules,
        issues,
    };
    result.render(mode);

    if !result.valid {
        anyhow::bail!("{} problem(s) in {}", result.issues.len(), path.display());
    }
    Ok(())
}
