//! Loading simulation tuning from TOML files.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use skirmish_core::SimulationConfig;

/// Reads tuning from `path`, or the defaults when no file is given.
pub(crate) fn load(path: Option<&Path>) -> Result<SimulationConfig> {
    let Some(path) = path else {
        return Ok(SimulationConfig::default());
    };
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read simulation config at {}", path.display()))?;
    parse(&contents).with_context(|| format!("invalid simulation config at {}", path.display()))
}

fn parse(contents: &str) -> Result<SimulationConfig> {
    let config: SimulationConfig =
        toml::from_str(contents).context("failed to parse simulation config toml contents")?;
    config
        .validate()
        .context("simulation config failed validation")?;
    Ok(config)
}
