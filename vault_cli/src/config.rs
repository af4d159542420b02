use crate::commands::ConnectionArgs;
use anyhow::{Context, Result};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use vault_client_core::ClientConfig;

/// Environment variable naming an explicit configuration file
pub const CONFIG_PATH_ENV: &str = "VAULT_CONFIG_PATH";

/// Environment variables recognized as connection settings, and the
/// configuration key each one sets
pub const ENV_MAPPINGS: &[(&str, &str)] = &[
    ("VAULT_ADDR", "client.address"),
    ("VAULT_TOKEN", "client.token"),
    ("VAULT_NAMESPACE", "client.namespace"),
    ("VAULT_CLIENT_TIMEOUT", "client.timeout_seconds"),
    ("VAULT_CACERT", "client.tls.ca_cert"),
    ("VAULT_CAPATH", "client.tls.ca_path"),
    ("VAULT_CLIENT_CERT", "client.tls.client_cert"),
    ("VAULT_CLIENT_KEY", "client.tls.client_key"),
    ("VAULT_SKIP_VERIFY", "client.tls.skip_verify"),
];

/// Variables whose value is parsed as a number or flag; every other mapped
/// variable is taken as literal text
const PARSED_ENV_VARS: &[&str] = &["VAULT_CLIENT_TIMEOUT", "VAULT_SKIP_VERIFY"];

#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq, Eq)]
pub struct AppConfig {
    #[serde(default)]
    pub client: ClientConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct OutputConfig {
    pub color_enabled: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            color_enabled: true,
        }
    }
}

impl AppConfig {
    /// Apply CLI argument overrides to the configuration
    ///
    /// Only flags that were given replace the layered value.
    pub fn apply_cli_overrides(&mut self, args: &ConnectionArgs) {
        let client = &mut self.client;
        if let Some(address) = &args.address {
            client.address = address.clone();
        }
        if let Some(token) = &args.token {
            client.token = Some(token.clone());
        }
        if let Some(namespace) = &args.namespace {
            client.namespace = Some(namespace.clone());
        }
        if let Some(ca_cert) = &args.ca_cert {
            client.tls.ca_cert = Some(ca_cert.clone());
        }
        if let Some(ca_path) = &args.ca_path {
            client.tls.ca_path = Some(ca_path.clone());
        }
        if let Some(client_cert) = &args.client_cert {
            client.tls.client_cert = Some(client_cert.clone());
        }
        if let Some(client_key) = &args.client_key {
            client.tls.client_key = Some(client_key.clone());
        }
        if args.tls_skip_verify {
            client.tls.skip_verify = true;
        }
    }
}

/// Configuration manager that handles XDG-compliant paths and layered configuration
pub struct ConfigManager {
    config_path: PathBuf,
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigManager {
    /// Create a new ConfigManager with default XDG-compliant paths
    pub fn new() -> Self {
        Self {
            config_path: Self::default_config_path(),
        }
    }

    /// Create a ConfigManager with a specific path (for testing)
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    /// Get the configuration file path
    pub fn get_config_path(&self) -> PathBuf {
        self.config_path.clone()
    }

    /// Get the default configuration path
    ///
    /// `$VAULT_CONFIG_PATH` wins, then `$XDG_CONFIG_HOME`, then the
    /// platform's configuration directory.
    fn default_config_path() -> PathBuf {
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV)
            && !path.trim().is_empty()
        {
            return PathBuf::from(path);
        }

        #[cfg(not(target_os = "windows"))]
        if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
            return PathBuf::from(xdg_config).join("vault/config.toml");
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("vault")
            .join("config.toml")
    }

    /// Load configuration with layered priority: ENV > File > Defaults
    ///
    /// Flags are applied afterwards by `AppConfig::apply_cli_overrides`.
    pub fn load(&self) -> Result<AppConfig> {
        let mut figment = Figment::new();

        // Layer 1: Defaults
        figment = figment.merge(Serialized::defaults(AppConfig::default()));

        // Layer 2: Config file (if exists)
        if self.config_path.exists() {
            log::debug!("Reading configuration from {}", self.config_path.display());
            figment = figment.merge(Toml::file(&self.config_path));
        }

        // Layer 3: Environment variables
        figment = figment.merge(parsed_env());
        for (path, value) in text_env() {
            figment = figment.merge(Serialized::default(path, value));
        }

        figment.extract().context("Failed to load configuration")
    }
}

fn is_parsed(var: &str) -> bool {
    PARSED_ENV_VARS.contains(&var)
}

/// Environment provider for the numeric and flag variables
fn parsed_env() -> Env {
    Env::raw().filter_map(|key| {
        ENV_MAPPINGS
            .iter()
            .filter(|(var, _)| is_parsed(var))
            .find(|(var, _)| key.as_str().eq_ignore_ascii_case(var))
            .map(|(_, path)| (*path).into())
    })
}

/// Text variables that are set, paired with their configuration key
///
/// Values are kept verbatim: `12345` stays a string and `00123` keeps its
/// leading zeros.
fn text_env() -> Vec<(&'static str, String)> {
    ENV_MAPPINGS
        .iter()
        .filter(|(var, _)| !is_parsed(var))
        .filter_map(|(var, path)| std::env::var(var).ok().map(|value| (*path, value)))
        .collect()
}
