//! Show or create the config file

use std::path::Path;

use helpdesk::config::DeskConfig;
use helpdesk::output::{ConfigResult, OperationResult, OutputMode};

/// Print the configuration read from `path`
pub fn config_show(path: &Path, mode: OutputMode) -> anyhow::Result<()> {
    let config = DeskConfig::load(path)?;
    ConfigResult {
        path: path.display().to_string(),
        exists: path.exists(),
        config,
    }
    .render(mode);
    Ok(())
}

/// Write the default configuration to `path`
pub fn config_init(path: &Path, force: bool, mode: OutputMode) -> anyhow::Result<()> {
    if path.exists() && !force {
        OperationResult {
            success: false,
            message: format!("{} already exists. Use --force to overwrite.", path.display()),
        }
        .render(mode);
        return Ok(());
    }

    DeskConfig::default().save(path)?;
    OperationResult {
        success: true,
        message: format!("Wrote default config to {}", path.display()),
    }
    .render(mode);
    Ok(())
}
