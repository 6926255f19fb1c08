//! Command implementations

mod config;
mod rules_check;
mod sweep;

pub use config::{config_init, config_show};
pub use rules_check::rules_check;
pub use sweep::{SweepArgs, sweep};
