//! Start-up configuration.
//!
//! Values are resolved in this order (highest first):
//! 1. environment: `GRAPH_TENANT_ID`, `GRAPH_CLIENT_ID`, `GRAPH_SCOPES`, `GRAPH_BASE_URL`,
//!    `GRAPH_AUTHORITY`
//! 2. the file passed with `--config`
//! 3. `<config dir>/graphcli/settings.toml`
//!
//! ```toml
//! [settings]
//! tenantId = "contoso.onmicrosoft.com"
//! clientId = "00000000-0000-0000-0000-000000000000"
//! graphUserScopes = ["user.read", "mail.read", "mail.send"]
//!
//! [defaults]
//! folderName = "folder test"
//! ```

use crate::error::{GraphError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_GRAPH_BASE_URL: &str = "https://graph.microsoft.com/v1.0";
pub const LOGIN_AUTHORITY: &str = "https://login.microsoftonline.com";
pub const DEFAULT_TENANT: &str = "common";

const PLACEHOLDER_PREFIX: &str = "YOUR_";
const APP_DIR: &str = "graphcli";
const SETTINGS_FILE: &str = "settings.toml";

pub const DEFAULT_SCOPES: &[&str] = &[
    "offline_access",
    "user.read",
    "user.readbasic.all",
    "mail.read",
    "mail.send",
    "files.readwrite.all",
];

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub tenant_id: String,
    pub client_id: String,
    pub graph_user_scopes: Vec<String>,
    pub graph_base_url: String,
    /// Sign-in host; tenant-specific OAuth endpoints hang off it.
    pub login_authority: String,
    pub cache_tokens: bool,
    pub defaults: MenuDefaults,
}

/// Values offered when the operator leaves an optional prompt empty.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MenuDefaults {
    pub folder_name: String,
    pub subfolder_name: String,
    pub share_role: String,
    pub share_message: String,
    pub link_type: String,
    pub link_scope: String,
}

impl Default for MenuDefaults {
    fn default() -> Self {
        Self {
            folder_name: "folder test".to_string(),
            subfolder_name: "subfolder test".to_string(),
            share_role: "write".to_string(),
            share_message: "Sharing this item with you.".to_string(),
            link_type: "view".to_string(),
            link_scope: "organization".to_string(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsSection {
    tenant_id: Option<String>,
    client_id: Option<String>,
    graph_user_scopes: Option<Vec<String>>,
    graph_base_url: Option<String>,
    login_authority: Option<String>,
    cache_tokens: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
struct SettingsFile {
    #[serde(default)]
    settings: SettingsSection,
    #[serde(default)]
    defaults: MenuDefaults,
}

impl Settings {
    /// Loads settings from the environment and the settings file.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        Self::load_with(config_path, |key| std::env::var(key).ok())
    }

    pub fn load_with<F>(config_path: Option<&Path>, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let file = match config_path {
            Some(path) => read_settings_file(path)?,
            None => read_default_settings_file(default_settings_path())?,
        };
        Self::from_file(file, env)
    }

    fn from_file<F>(file: SettingsFile, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let SettingsFile { settings, defaults } = file;

        let tenant_id = env("GRAPH_TENANT_ID")
            .or(settings.tenant_id)
            .unwrap_or_else(|| DEFAULT_TENANT.to_string());
        let client_id = env("GRAPH_CLIENT_ID").or(settings.client_id).ok_or_else(|| {
            GraphError::Config(
                "missing client id: set GRAPH_CLIENT_ID or clientId in settings.toml".to_string(),
            )
        })?;
        let graph_user_scopes = env("GRAPH_SCOPES")
            .map(|raw| parse_scope_list(&raw))
            .or(settings.graph_user_scopes)
            .unwrap_or_else(|| DEFAULT_SCOPES.iter().map(|s| s.to_string()).collect());
        let graph_base_url = env("GRAPH_BASE_URL")
            .or(settings.graph_base_url)
            .unwrap_or_else(|| DEFAULT_GRAPH_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let login_authority = env("GRAPH_AUTHORITY")
            .or(settings.login_authority)
            .unwrap_or_else(|| LOGIN_AUTHORITY.to_string())
            .trim_end_matches('/')
            .to_string();

        let loaded = Self {
            tenant_id: tenant_id.trim().to_string(),
            client_id: client_id.trim().to_string(),
            graph_user_scopes,
            graph_base_url,
            login_authority,
            cache_tokens: settings.cache_tokens.unwrap_or(true),
            defaults,
        };
        loaded.validate()?;
        Ok(loaded)
    }

    fn validate(&self) -> Result<()> {
        for (name, value) in [("tenantId", &self.tenant_id), ("clientId", &self.client_id)] {
            if value.is_empty() || value.starts_with(PLACEHOLDER_PREFIX) {
                return Err(GraphError::Config(format!(
                    "{} is not configured (got {:?})",
                    name, value
                )));
            }
        }
        if self.graph_user_scopes.is_empty() {
            return Err(GraphError::Config(
                "graphUserScopes must list at least one scope".to_string(),
            ));
        }
        for (name, value) in [
            ("graphBaseUrl", &self.graph_base_url),
            ("loginAuthority", &self.login_authority),
        ] {
            if !value.starts_with("http://") && !value.starts_with("https://") {
                return Err(GraphError::Config(format!(
                    "{} must be an http(s) URL (got {:?})",
                    name, value
                )));
            }
        }
        Ok(())
    }

    pub fn device_code_url(&self) -> String {
        format!("{}/{}/oauth2/v2.0/devicecode", self.login_authority, self.tenant_id)
    }

    pub fn token_url(&self) -> String {
        format!("{}/{}/oauth2/v2.0/token", self.login_authority, self.tenant_id)
    }

    /// Keyring account name for this app registration's token cache.
    pub fn keyring_username(&self) -> String {
        format!("{}:{}", self.tenant_id, self.client_id)
    }
}

/// `None` when the platform has no per-user config directory.
pub fn default_settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(SETTINGS_FILE))
}

// The per-user file is optional, unlike one named with --config
fn read_default_settings_file(path: Option<PathBuf>) -> Result<SettingsFile> {
    match path {
        Some(path) if path.exists() => read_settings_file(&path),
        Some(path) => {
            tracing::debug!("no settings file at {}", path.display());
            Ok(SettingsFile::default())
        }
        None => {
            tracing::debug!("no config directory, using environment only");
            Ok(SettingsFile::default())
        }
    }
}

fn read_settings_file(path: &Path) -> Result<SettingsFile> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        GraphError::Config(format!("cannot read {}: {}", path.display(), e))
    })?;
    let file: SettingsFile = toml::from_str(&content)
        .map_err(|e| GraphError::Config(format!("cannot parse {}: {}", path.display(), e)))?;
    tracing::info!("loaded settings from {}", path.display());
    Ok(file)
}

fn parse_scope_list(raw: &str) -> Vec<String> {
    raw.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
