//! JSON snapshot files
//!
//! The CLI works on a ticket snapshot exported by the surrounding service,
//! plus a ledger file carrying escalation state between sweeps.

use std::fs;
use std::path::Path;

use anyhow::Context;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::core::models::Ticket;
use crate::core::services::EscalationLedger;

fn load<T: DeserializeOwned>(path: &Path, what: &str) -> anyhow::Result<T> {
    let content =
        fs::read_to_string(path).with_context(|| format!("reading {what} {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("parsing {what} {}", path.display()))
}

fn save<T: Serialize + ?Sized>(path: &Path, value: &T) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let content = serde_json::to_string_pretty(value)?;
    fs::write(path, content).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

/// Load a ticket snapshot (a JSON array of tickets)
pub fn load_tickets(path: &Path) -> anyhow::Result<Vec<Ticket>> {
    load(path, "tickets")
}

/// Save a ticket snapshot
pub fn save_tickets(path: &Path, tickets: &[Ticket]) -> anyhow::Result<()> {
    save(path, tickets)
}

/// Load an escalation ledger; a missing file is an empty ledger
pub fn load_ledger(path: &Path) -> anyhow::Result<EscalationLedger> {
    if !path.exists() {
        return Ok(EscalationLedger::new());
    }
    load(path, "ledger")
}

/// Save an escalation ledger
pub fn save_ledger(path: &Path, ledger: &EscalationLedger) -> anyhow::Result<()> {
    save(path, ledger)
}
