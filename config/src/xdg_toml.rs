//! Read the `[client]` table from `<config base>/<app>/config.toml`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::LoadError;

/// Config base directory: `$XDG_CONFIG_HOME` when set and non-empty, else the platform config dir.
pub(crate) fn default_config_base() -> Option<PathBuf> {
    match std::env::var_os("XDG_CONFIG_HOME") {
        Some(dir) if !dir.is_empty() => Some(PathBuf::from(dir)),
        _ => dirs::config_dir(),
    }
}

/// `[client]` table as written by users. Every key is optional.
#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
pub(crate) struct ClientTable {
    pub timeout_secs: Option<u64>,
    pub user_agent: Option<String>,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

#[derive(Deserialize, Default)]
struct ConfigFile {
    #[serde(default)]
    client: ClientTable,
}

/// Returns the `[client]` table. Missing file or missing table returns an empty table.
pub(crate) fn load_client_table(base: &Path, app_name: &str) -> Result<ClientTable, LoadError> {
    let path = base.join(app_name).join("config.toml");
    if !path.is_file() {
        return Ok(ClientTable::default());
    }
    let content = std::fs::read_to_string(&path).map_err(LoadError::XdgRead)?;
    let config: ConfigFile = toml::from_str(&content)?;
    Ok(config.client)
}
