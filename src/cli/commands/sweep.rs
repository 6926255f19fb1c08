//! Run an escalation sweep over a ticket snapshot

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::Args;

use helpdesk::adapters::json;
use helpdesk::adapters::memory::{
    MemoryRoleRepository, MemoryRuleRepository, MemoryTicketRepository, MemoryUserDirectory,
};
use helpdesk::adapters::toml::load_policy;
use helpdesk::config::DeskConfig;
use helpdesk::core::ports::{FixedClock, TicketRepository};
use helpdesk::output::{OutputMode, SweepResult};
use helpdesk::{Collaborators, Helpdesk};

/// Arguments of `helpdesk sweep`
#[derive(Args, Debug)]
pub struct SweepArgs {
    /// Policy file with users, roles and rules (TOML)
    #[arg(short, long)]
    pub policy: PathBuf,

    /// Ticket snapshot (JSON array)
    #[arg(short, long)]
    pub tickets: PathBuf,

    /// Escalation ledger carried between sweeps (JSON)
    #[arg(short, long)]
    pub ledger: Option<PathBuf>,

    /// Evaluate at this instant instead of the current time (RFC 3339)
    #[arg(long)]
    pub now: Option<String>,

    /// Stop after this many escalations; the rest wait for the next sweep
    #[arg(long)]
    pub max: Option<usize>,

    /// Write reassigned tickets and the ledger back to their files
    #[arg(long)]
    pub apply: bool,
}

fn parse_now(raw: Option<&str>) -> anyhow::Result<DateTime<Utc>> {
    raw.map_or_else(
        || Ok(Utc::now()),
        |s| {
            DateTime::parse_from_rfc3339(s)
                .map(|t| t.to_utc())
                .with_context(|| format!("invalid --now '{s}', expected RFC 3339"))
        },
    )
}

/// Sweep the snapshot in `args` under `config`
pub fn sweep(args: &SweepArgs, config: DeskConfig, mode: OutputMode) -> anyhow::Result<()> {
    let now = parse_now(args.now.as_deref())?;
    let policy = load_policy(&args.policy, now)?;
    let tickets = Arc::new(MemoryTicketRepository::with_tickets(json::load_tickets(&args.tickets)?));
    let ticket_store: Arc<dyn TicketRepository> = tickets.clone();

    let collab = Collaborators {
        tickets: ticket_store,
        rules: Arc::new(MemoryRuleRepository::with_rules(policy.rules)),
        roles: Arc::new(MemoryRoleRepository::with_roles(policy.roles)),
        users: Arc::new(MemoryUserDirectory::with_users(policy.users)),
        clock: Arc::new(FixedClock::new(now)),
        ..Collaborators::in_memory()
    };
    let desk = Helpdesk::new(collab, config);
    if let Some(path) = &args.ledger {
        desk.restore_ledger(json::load_ledger(path)?);
    }

    let max = args.max.unwrap_or(usize::MAX);
    let mut started = 0usize;
    let report = desk.sweep_until(|| {
        started += 1;
        started > max
    })?;

    if args.apply {
        json::save_tickets(&args.tickets, &tickets.all())?;
        if let Some(path) = &args.ledger {
            json::save_ledger(path, &desk.ledger())?;
        }
        log::debug!("wrote {} and ledger", args.tickets.display());
    }

    SweepResult {
        applied: args.apply,
        report,
    }
    .render(mode);
    Ok(())
}
