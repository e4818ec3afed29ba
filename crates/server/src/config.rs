use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub const CONFIG_VERSION: u32 = 1;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_TOKEN_TTL_SECS: u64 = 60 * 60 * 24;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub version: u32,
    pub port: u16,
    /// Directory holding `songs.json`, `albums.json` and friends.
    pub data_dir: String,
    /// Served under `/public`; song urls resolve against it.
    pub media_root: String,
    pub admin_username: String,
    /// argon2 PHC string, see the `hash_password` tool.
    pub admin_password_hash: String,
    pub jwt_secret: String,
    pub token_ttl_secs: u64,
    pub cookie_secure: bool,
    pub production: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            port: DEFAULT_PORT,
            data_dir: "db".to_string(),
            media_root: "public".to_string(),
            admin_username: String::new(),
            admin_password_hash: String::new(),
            jwt_secret: String::new(),
            token_ttl_secs: DEFAULT_TOKEN_TTL_SECS,
            cookie_secure: true,
            production: false,
        }
    }
}

impl ServerConfig {
    pub fn admin_configured(&self) -> bool {
        !self.admin_username.trim().is_empty()
            && !self.admin_password_hash.trim().is_empty()
            && !self.jwt_secret.is_empty()
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Yaml(serde_yaml::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(err) => write!(f, "io error: {}", err),
            ConfigError::Yaml(err) => write!(f, "yaml error: {}", err),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::Io(err)
    }
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        ConfigError::Yaml(err)
    }
}

pub fn config_path_from_env() -> PathBuf {
    match env::var("CATALOG_CONFIG") {
        Ok(value) if !value.trim().is_empty() => PathBuf::from(value),
        _ => default_config_path(),
    }
}

fn default_config_path() -> PathBuf {
    match env::current_exe() {
        Ok(exe) => exe
            .parent()
            .map(|dir| dir.join("config.yaml"))
            .unwrap_or_else(|| PathBuf::from("config.yaml")),
        Err(_) => PathBuf::from("config.yaml"),
    }
}

pub fn load_or_create_config(path: &Path) -> Result<(ServerConfig, bool), ConfigError> {
    if path.exists() {
        let contents = fs::read_to_string(path)?;
        let mut config: ServerConfig = if contents.trim().is_empty() {
            ServerConfig::default()
        } else {
            serde_yaml::from_str(&contents)?
        };
        if config.version < CONFIG_VERSION {
            config.version = CONFIG_VERSION;
        }
        if config.port == 0 {
            config.port = DEFAULT_PORT;
        }
        if config.data_dir.trim().is_empty() {
            config.data_dir = "db".to_string();
        }
        if config.media_root.trim().is_empty() {
            config.media_root = "public".to_string();
        }
        if config.token_ttl_secs == 0 {
            config.token_ttl_secs = DEFAULT_TOKEN_TTL_SECS;
        }
        return Ok((config, false));
    }

    let config = ServerConfig::default();
    save_config(path, &config)?;
    Ok((config, true))
}

pub fn save_config(path: &Path, config: &ServerConfig) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let contents = serde_yaml::to_string(config)?;
    fs::write(path, contents)?;
    Ok(())
}

pub fn apply_env_overrides(config: &mut ServerConfig) {
    apply_overrides(config, |key| env::var(key).ok());
}

/// Deployment secrets usually arrive through the environment rather than the
/// config file. Blank values are ignored.
fn apply_overrides(config: &mut ServerConfig, lookup: impl Fn(&str) -> Option<String>) {
    let filled = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
    if let Some(port) = filled("PORT").and_then(|value| value.trim().parse::<u16>().ok()) {
        if port != 0 {
            config.port = port;
        }
    }
    if let Some(username) = filled("ADMIN_USERNAME") {
        config.admin_username = username;
    }
    if let Some(hash) = filled("ADMIN_PASSWORD_HASH") {
        config.admin_password_hash = hash;
    }
    if let Some(secret) = filled("JWT_SECRET") {
        config.jwt_secret = secret;
    }
    if let Some(mode) = filled("CATALOG_ENV") {
        config.production = mode.trim().eq_ignore_ascii_case("production");
    }
}

pub fn resolve_path(config_path: &Path, value: &str) -> PathBuf {
    let raw = PathBuf::from(value);
    if raw.is_absolute() {
        return raw;
    }
    let base = config_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    base.join(raw)
}
