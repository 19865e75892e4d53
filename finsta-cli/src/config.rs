use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub sheet: SheetSection,
    /// Local CSV sources; when set they replace the sheet ranges
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files: Option<FilesSection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetSection {
    /// Spreadsheet id from the sheet URL
    pub id: String,
    /// Environment variable holding an OAuth bearer token
    pub token_env: String,
    /// Single-column range with the category list (include one empty cell)
    pub categories: String,
    /// Four-column rule table range, header row first
    pub rules: String,
    /// Single-column range with the user's own account numbers
    pub accounts: Option<String>,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for SheetSection {
    fn default() -> Self {
        Self {
            id: String::new(),
            token_env: "FINSTA_SHEETS_TOKEN".to_string(),
            categories: "Config!A1:A50".to_string(),
            rules: "Config!C1:F500".to_string(),
            accounts: Some("Config!H1:H20".to_string()),
            base_url: "https://sheets.googleapis.com".to_string(),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilesSection {
    pub categories: Option<PathBuf>,
    pub rules: Option<PathBuf>,
    pub accounts: Option<PathBuf>,
}

pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no config file, using defaults");
        return Ok(Config::default());
    }
    let s = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    toml::from_str(&s).with_context(|| format!("parse {}", path.display()))
}

pub fn save_config(path: &Path, cfg: &Config) -> Result<()> {
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(path, s).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

/// Write the default config unless one exists. Returns false if it did.
pub fn init_config(path: &Path) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    }
    save_config(path, &Config::default())?;
    Ok(true)
}
