use anyhow::{Context, Result};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

const APP_DIR: &str = "folio";
const STORAGE_FILE: &str = "storage.json";
const LOG_FILE: &str = "folio.log";
const DEFAULT_ASSET_DIR: &str = "assets";
const MUSIC_DIR: &str = "music";

const SERVICE_ID_VAR: &str = "FOLIO_EMAILJS_SERVICE_ID";
const TEMPLATE_ID_VAR: &str = "FOLIO_EMAILJS_TEMPLATE_ID";
const PUBLIC_KEY_VAR: &str = "FOLIO_EMAILJS_PUBLIC_KEY";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayCredentials {
    pub service_id: String,
    pub template_id: String,
    pub public_key: String,
}

pub fn config_root() -> Result<PathBuf> {
    if let Ok(override_dir) = env::var("FOLIO_CONFIG_DIR") {
        return Ok(PathBuf::from(override_dir));
    }

    let home = env::var("HOME")
        .or_else(|_| env::var("USERPROFILE"))
        .context("neither HOME nor USERPROFILE is set")?;
    Ok(PathBuf::from(home).join(".config").join(APP_DIR))
}

pub fn storage_path() -> Result<PathBuf> {
    Ok(config_root()?.join(STORAGE_FILE))
}

pub fn log_path() -> Result<PathBuf> {
    Ok(config_root()?.join(LOG_FILE))
}

pub fn ensure_config_dir() -> Result<PathBuf> {
    let root = config_root()?;
    fs::create_dir_all(&root).with_context(|| format!("failed to create {}", root.display()))?;
    Ok(root)
}

/// Resolves the asset root: explicit CLI value, then `FOLIO_ASSET_DIR`, then `./assets`.
pub fn asset_root(cli_override: Option<&Path>) -> PathBuf {
    if let Some(path) = cli_override {
        return path.to_path_buf();
    }
    if let Ok(dir) = env::var("FOLIO_ASSET_DIR") {
        return PathBuf::from(dir);
    }
    PathBuf::from(DEFAULT_ASSET_DIR)
}

pub fn music_dir(asset_root: &Path) -> PathBuf {
    asset_root.join(MUSIC_DIR)
}

/// Reads the relay credentials. All three variables must be present and non-empty.
pub fn relay_credentials() -> Option<RelayCredentials> {
    relay_credentials_from(|name| env::var(name).ok())
}

fn relay_credentials_from(lookup: impl Fn(&str) -> Option<String>) -> Option<RelayCredentials> {
    let read = |name: &str| {
        lookup(name)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    };

    Some(RelayCredentials {
        service_id: read(SERVICE_ID_VAR)?,
        template_id: read(TEMPLATE_ID_VAR)?,
        public_key: read(PUBLIC_KEY_VAR)?,
    })
}
