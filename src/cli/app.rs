//! CLI definitions and entry point

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use super::commands::{self, SweepArgs};
use helpdesk::config::DeskConfig;
use helpdesk::output::OutputMode;

/// helpdesk - Ticket escalation sweeps and policy checks
#[derive(Parser, Debug)]
#[command(
    name = "helpdesk",
    version,
    about = "Ticket escalation sweeps and policy checks",
    long_about = "Evaluate support tickets against tiered escalation rules.\n\n\
                  Policy files declare users, roles and escalation rules.\n\
                  Sweeps reassign overdue tickets and notify tier assignees."
)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output in JSON format (machine-readable)
    #[arg(long, global = true)]
    pub json: bool,

    /// Config file (defaults to $HELPDESK_CONFIG, then the user config dir)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Evaluate a ticket snapshot against a policy and escalate overdue tickets
    Sweep(SweepArgs),

    /// Work with policy files
    Rules {
        #[command(subcommand)]
        action: RulesAction,
    },

    /// Inspect or create the config file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Show version
    Version,
}

#[derive(Subcommand, Debug)]
pub enum RulesAction {
    /// Validate every rule, role and user in a policy file
    Check {
        /// Policy file (TOML)
        file: PathBuf,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the effective configuration
    Show,

    /// Write the default configuration
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}

/// Run the CLI
pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    }

    let output_mode = if cli.json {
        OutputMode::Json
    } else {
        OutputMode::Human
    };
    let config_path = DeskConfig::resolve_path(cli.config.as_deref());

    match cli.command {
        Some(Command::Sweep(args)) => {
            let config = DeskConfig::load(&config_path)?;
            commands::sweep(&args, config, output_mode)
        },
        Some(Command::Rules {
            action: RulesAction::Check { file },
        }) => commands::rules_check(&file, output_mode),
        Some(Command::Config {
            action: ConfigAction::Show,
        }) => commands::config_show(&config_path, output_mode),
        Some(Command::Config {
            action: ConfigAction::Init { force },
        }) => commands::config_init(&config_path, force, output_mode),
        Some(Command::Version) => {
            if output_mode == OutputMode::Json {
                println!(
                    "{}",
                    serde_json::json!({
                        "version": helpdesk::VERSION
                    })
                );
            } else {
                println!("helpdesk v{}", helpdesk::VERSION);
            }
            Ok(())
        },
        None => {
            if output_mode == OutputMode::Json {
                println!(
                    "{}",
                    serde_json::json!({
                        "version": helpdesk::VERSION,
                        "hint": "Use --help for usage"
                    })
                );
            } else {
                println!("helpdesk v{}", helpdesk::VERSION);
                println!("\nRun 'helpdesk --help' for usage");
                println!("Run 'helpdesk rules check <policy.toml>' to validate a policy");
            }
            Ok(())
        },
    }
}
