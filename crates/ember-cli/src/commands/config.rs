//! Print a resolved configuration

use anyhow::{Context, Result};

pub fn run(preset: &str, path: Option<&str>) -> Result<()> {
    let config = super::load_config(preset, path, None)?;
    let text = config
        .to_toml_string()
        .context("Failed to serialize configuration")?;
    print!("{text}");
    Ok(())
}
