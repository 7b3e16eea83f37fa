use crate::error::{Pbx2faError, Result};
use directories::ProjectDirs;
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the section holding the PBX settings
pub const SETTINGS_SECTION: &str = "3CXSettings";

/// Default file name looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "appsettings.json";

/// Raw settings as they appear in the configuration file
#[derive(Debug, Deserialize, Default, Clone)]
pub struct Settings {
    #[serde(rename = "FQDN_3CX", default)]
    pub fqdn: Option<String>,

    #[serde(rename = "ApiClientID_3CX", default)]
    pub client_id: Option<String>,

    #[serde(rename = "ApiToken_3CX", default)]
    pub client_secret: Option<String>,

    #[serde(rename = "Enable2FA3CX", default)]
    pub enable_2fa: Option<String>,

    #[serde(rename = "UsersToChange", default)]
    pub users_to_change: Option<String>,
}

#[derive(Deserialize)]
struct SettingsFile {
    #[serde(rename = "3CXSettings")]
    settings: Option<Settings>,
}

impl Settings {
    /// Parse an `appsettings.json` style document
    pub fn from_json(contents: &str) -> Result<Self> {
        let file: SettingsFile = serde_json::from_str(contents)?;
        file.settings.ok_or_else(missing_section)
    }

    /// Parse a TOML document with a `[3CXSettings]` table
    pub fn from_toml(contents: &str) -> Result<Self> {
        let file: SettingsFile = toml::from_str(contents)?;
        file.settings.ok_or_else(missing_section)
    }
}

fn missing_section() -> Pbx2faError {
    Pbx2faError::ConfigError(format!("Section '{}' not found", SETTINGS_SECTION))
}

/// Validated configuration for one run
#[derive(Clone, PartialEq, Eq)]
pub struct Config {
    pub base_address: String,
    pub client_id: String,
    pub client_secret: String,
    pub require_2fa: bool,
    pub user_ids: Vec<u32>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("base_address", &self.base_address)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("require_2fa", &self.require_2fa)
            .field("user_ids", &self.user_ids)
            .finish()
    }
}

impl Config {
    /// Validate raw settings. Nothing here touches the network.
    pub fn from_settings(settings: Settings) -> Result<Self> {
        let base_address = required(settings.fqdn, "FQDN_3CX")?;
        let base_address = base_address
            .strip_suffix('/')
            .unwrap_or(&base_address)
            .to_string();

        let client_id = required(settings.client_id, "ApiClientID_3CX")?;
        let client_secret = required(settings.client_secret, "ApiToken_3CX")?;

        let flag = settings
            .enable_2fa
            .ok_or_else(|| missing_setting("Enable2FA3CX"))?;
        let require_2fa = parse_two_factor_flag(&flag)?;

        let users = required(settings.users_to_change, "UsersToChange")?;
        let user_ids = parse_user_ids(&users)?;

        Ok(Self {
            base_address,
            client_id,
            client_secret,
            require_2fa,
            user_ids,
        })
    }
}

fn required(value: Option<String>, key: &str) -> Result<String> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(missing_setting(key)),
    }
}

fn missing_setting(key: &str) -> Pbx2faError {
    Pbx2faError::ConfigError(format!(
        "Missing setting '{}' in section '{}'",
        key, SETTINGS_SECTION
    ))
}

/// Case-insensitive "true"/"false"; anything else is rejected
pub fn parse_two_factor_flag(value: &str) -> Result<bool> {
    if value.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if value.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err(Pbx2faError::InvalidTwoFactorFlag(value.to_string()))
    }
}

/// Parse a comma-separated id list, keeping order and duplicates.
/// Ids are positive; `0` is rejected.
pub fn parse_user_ids(value: &str) -> Result<Vec<u32>> {
    value
        .split(',')
        .map(|token| {
            let token = token.trim();
            token
                .parse::<u32>()
                .ok()
                .filter(|&id| id > 0)
                .ok_or_else(|| Pbx2faError::InvalidUserId(token.to_string()))
        })
        .collect()
}

/// Locates and reads the settings file
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    explicit_path: Option<PathBuf>,
    search_paths: Vec<PathBuf>,
}

impl ConfigLoader {
    pub fn new(explicit_path: Option<PathBuf>) -> Self {
        let mut search_paths = vec![PathBuf::from(DEFAULT_CONFIG_FILE)];

        if let Some(project_dirs) = ProjectDirs::from("com", "pbx2fa", "pbx2fa") {
            let config_dir = project_dirs.config_dir();
            search_paths.push(config_dir.join(DEFAULT_CONFIG_FILE));
            search_paths.push(config_dir.join("config.toml"));
        }

        Self {
            explicit_path,
            search_paths,
        }
    }

    /// Replace the implicit search list (used when no explicit path is given)
    pub fn with_search_paths(mut self, search_paths: Vec<PathBuf>) -> Self {
        self.search_paths = search_paths;
        self
    }

    pub fn resolve_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.explicit_path {
            if path.exists() {
                return Ok(path.clone());
            }
            return Err(Pbx2faError::ConfigError(format!(
                "Config file not found: {}",
                path.display()
            )));
        }

        self.search_paths
            .iter()
            .find(|p| p.exists())
            .cloned()
            .ok_or_else(|| {
                let searched = self
                    .search_paths
                    .iter()
                    .map(|p| format!("  {}", p.display()))
                    .collect::<Vec<_>>()
                    .join("\n");
                Pbx2faError::ConfigError(format!(
                    "No configuration file found. Searched:\n{}\n\nPass one with --config <PATH>",
                    searched
                ))
            })
    }

    /// Read raw settings without validating them
    pub fn load_settings(&self) -> Result<(PathBuf, Settings)> {
        let path = self.resolve_path()?;
        let settings = read_settings(&path)?;
        tracing::debug!("Loaded settings from {}", path.display());
        Ok((path, settings))
    }

    pub fn load(&self) -> Result<Config> {
        let (_, settings) = self.load_settings()?;
        Config::from_settings(settings)
    }
}

fn read_settings(path: &Path) -> Result<Settings> {
    let contents = fs::read_to_string(path)?;
    let is_toml = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("toml"));

    if is_toml {
        Settings::from_toml(&contents)
    } else {
        Settings::from_json(&contents)
    }
}

/// Safely truncate a string to n characters (not bytes)
pub fn truncate_chars(s: &str, n: usize) -> String {
    s.chars().take(n).collect()
}
