use anyhow::{Context, Result};
use std::path::PathBuf;

pub fn finsta_home() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".finsta"))
}

pub fn default_config_path() -> Result<PathBuf> {
    Ok(finsta_home()?.join("config.toml"))
}
