//! Output formatting for human and JSON modes
//!
//! This module provides structured output that can be rendered either as
//! human-readable text or machine-parseable JSON.

use colored::Colorize;
use serde::Serialize;

use crate::adapters::toml::PolicyIssue;
use crate::config::DeskConfig;
use crate::core::models::EscalationTier;
use crate::desk::{SweepOutcome, SweepReport};

/// Output mode for the CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Human-readable output (default)
    #[default]
    Human,
    /// JSON output (machine-readable)
    Json,
}

fn print_json<T: Serialize>(value: &T) {
    println!("{}", serde_json::to_string_pretty(value).unwrap_or_default());
}

/// Result of a sweep command
#[derive(Debug, Serialize)]
pub struct SweepResult {
    /// Whether files were rewritten
    pub applied: bool,
    /// What the sweep did
    #[serde(flatten)]
    pub report: SweepReport,
}

/// Result of a rules check
#[derive(Debug, Serialize)]
pub struct RulesCheckResult {
    /// Policy file checked
    pub path: String,
    /// Whether the whole file is valid
    pub valid: bool,
    /// Rules that passed validation
    pub rules: Vec<RuleInfo>,
    /// Everything that did not
    pub issues: Vec<PolicyIssue>,
}

/// Information about a rule
#[derive(Debug, Serialize)]
pub struct RuleInfo {
    /// Rule ID
    pub id: String,
    /// Rule name
    pub name: String,
    /// Priority the rule applies to
    pub priority: String,
    /// Tiers in level order
    pub tiers: Vec<EscalationTier>,
}

/// Result of a config show
#[derive(Debug, Serialize)]
pub struct ConfigResult {
    /// Where config was read from
    pub path: String,
    /// Whether that file exists
    pub exists: bool,
    /// Effective configuration
    pub config: DeskConfig,
}

/// Generic operation result for simple commands
#[derive(Debug, Serialize)]
pub struct OperationResult {
    /// Whether the operation succeeded
    pub success: bool,
    /// Human-readable message
    pub message: String,
}

impl SweepResult {
    /// Render the result based on output mode
    pub fn render(&self, mode: OutputMode) {
        match mode {
            OutputMode::Human => self.render_human(),
            OutputMode::Json => print_json(self),
        }
    }

    fn render_human(&self) {
        let report = &self.report;
        println!("Sweep at {} over {} active ticket(s)\n", report.now.to_rfc3339(), report.evaluated);

        if report.entries.is_empty() {
            println!("Nothing to escalate.");
            return;
        }

        for e in &report.entries {
            let outcome = match e.outcome {
                SweepOutcome::Assigned => e.outcome.to_string().green(),
                SweepOutcome::Notified => e.outcome.to_string().cyan(),
                SweepOutcome::Conflict => e.outcome.to_string().yellow(),
                SweepOutcome::Skipped => e.outcome.to_string().dimmed(),
            };
            println!("  [{}] {} tier {} ({})", e.ticket_id, e.rule_id, e.tier_level, outcome);
            if let Some(assignee) = &e.assignee {
                println!("          assigned to {assignee}");
            }
            if !e.notified.is_empty() {
                println!("          notified {}", e.notified.join(", "));
            }
            if let Some(detail) = &e.detail {
                println!("          {detail}");
            }
        }

        let applied = report.applied().count();
        println!();
        if self.applied {
            println!("{applied} escalation(s) applied.");
        } else {
            println!("{applied} escalation(s) would apply. Re-run with --apply to write them.");
        }
        if report.cancelled {
            println!("{}", "Sweep was interrupted; remaining tickets wait for the next run.".yellow());
        }
    }
}

impl RulesCheckResult {
    /// Render the result based on output mode
    pub fn render(&self, mode: OutputMode) {
        match mode {
            OutputMode::Human => self.render_human(),
            OutputMode::Json => print_json(self),
        }
    }

    fn render_human(&self) {
        println!("Checking {}...\n", self.path);

        for rule in &self.rules {
            println!("  [{}] {} ({})", rule.id, rule.name, rule.priority);
            for tier in &rule.tiers {
                let who = if tier.assignees.is_empty() {
                    "no assignees".dimmed().to_string()
                } else {
                    tier.assignees.join(", ")
                };
                println!("          tier {} at {}m: {who}", tier.level, tier.threshold_minutes);
            }
        }

        if self.valid {
            println!("\n{} {} rule(s) valid.", "OK:".green().bold(), self.rules.len());
            return;
        }

        println!("\nProblems:");
        for issue in &self.issues {
            println!("  {} {}", format!("[{}]", issue.code).red(), issue);
        }
        println!("\n{} {} problem(s)", "INVALID:".red().bold(), self.issues.len());
    }
}

impl ConfigResult {
    /// Render the result based on output mode
    pub fn render(&self, mode: OutputMode) {
        match mode {
            OutputMode::Human => {
                let origin = if self.exists { "" } else { " (not found, defaults)" };
                println!("# {}{origin}", self.path);
                println!("{}", self.config.to_toml().unwrap_or_default());
            },
            OutputMode::Json => print_json(self),
        }
    }
}

impl OperationResult {
    /// Render the result based on output mode
    pub fn render(&self, mode: OutputMode) {
        match mode {
            OutputMode::Human => println!("{}", self.message),
            OutputMode::Json => print_json(self),
        }
    }
}
