//! Configuration management for foundry-chat
//!
//! Supports environment variables, a config file, and CLI overrides.
//! Every environment variable is also accepted with a `VITE_` prefix so the
//! `.env` of an existing web front end can be reused as is.
//!
//! Config file location: ~/.config/foundry-chat/config.toml

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::error::{ChatError, Result};

const DEFAULT_AUTHORITY_HOST: &str = "https://login.microsoftonline.com";
const DEFAULT_REDIRECT_URI: &str = "http://localhost:5173/";

/// Main configuration for foundry-chat
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Backend API configuration
    pub api: ApiConfig,
    /// Identity provider configuration
    pub auth: AuthConfig,
}

/// Backend API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL prefixed to every API path
    pub base_url: String,
}

/// Identity provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Directory (tenant) the authority is built from
    pub tenant_id: String,
    /// Application (client) id of this client
    pub client_id: String,
    /// Scope requested for backend API tokens
    pub api_scope: String,
    /// Authority host, without the tenant segment
    /// Default: https://login.microsoftonline.com
    #[serde(default = "default_authority_host")]
    pub authority_host: String,
    /// Registered redirect URI; the loopback listener binds to its host and port
    /// Default: http://localhost:5173/
    #[serde(default = "default_redirect_uri")]
    pub redirect_uri: String,
    /// Scopes requested at sign-in
    #[serde(default = "default_login_scopes")]
    pub login_scopes: Vec<String>,
    /// How long to wait for the browser redirect, in seconds
    #[serde(default = "default_callback_timeout")]
    pub callback_timeout_secs: u64,
}

fn default_login_scopes() -> Vec<String> {
    vec![
        "openid".to_string(),
        "profile".to_string(),
        "email".to_string(),
    ]
}

fn default_callback_timeout() -> u64 {
    300
}

fn default_authority_host() -> String {
    DEFAULT_AUTHORITY_HOST.to_string()
}

fn default_redirect_uri() -> String {
    DEFAULT_REDIRECT_URI.to_string()
}

/// Read `name`, falling back to `VITE_<name>`
fn env_var(name: &str) -> Option<String> {
    env::var(name)
        .or_else(|_| env::var(format!("VITE_{}", name)))
        .ok()
        .filter(|v| !v.trim().is_empty())
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: env_var("API_BASE").unwrap_or_default(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            tenant_id: env_var("TENANT_ID").unwrap_or_default(),
            client_id: env_var("SPA_CLIENT_ID").unwrap_or_default(),
            api_scope: env_var("API_SCOPE").unwrap_or_default(),
            authority_host: env_var("AUTHORITY_HOST")
                .unwrap_or_else(|| DEFAULT_AUTHORITY_HOST.to_string()),
            redirect_uri: env_var("REDIRECT_URI")
                .unwrap_or_else(|| DEFAULT_REDIRECT_URI.to_string()),
            login_scopes: default_login_scopes(),
            callback_timeout_secs: default_callback_timeout(),
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("foundry-chat")
    }

    /// Get the config file path
    pub fn config_file() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Load configuration from file, environment, and defaults
    ///
    /// Priority: CLI args > config file > environment > defaults. A config
    /// file replaces the environment as a whole; values are not merged.
    pub fn load() -> Self {
        // Try to load .env file if it exists
        let _ = dotenvy::dotenv();

        let config_path = Self::config_file();
        if !config_path.exists() {
            tracing::debug!("No config file, using environment configuration");
            return Self::default();
        }

        match Self::load_from_path(&config_path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(
                    path = %config_path.display(),
                    "Ignoring config file, using environment configuration: {}",
                    e
                );
                Self::default()
            }
        }
    }

    /// Load configuration from file only
    pub fn load_from_file() -> Result<Self> {
        let config_path = Self::config_file();

        if !config_path.exists() {
            return Err(ChatError::config("Config file not found"));
        }

        Self::load_from_path(&config_path)
    }

    /// Load configuration from a specific TOML file
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| ChatError::config(format!("Failed to read config: {}", e)))?;

        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| ChatError::config(format!("Failed to parse config: {}", e)))
    }

    /// Check that everything needed to sign in and call the backend is set
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("API_BASE", &self.api.base_url),
            ("TENANT_ID", &self.auth.tenant_id),
            ("SPA_CLIENT_ID", &self.auth.client_id),
            ("API_SCOPE", &self.auth.api_scope),
        ];

        let missing: Vec<&str> = required
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| *name)
            .collect();

        if !missing.is_empty() {
            return Err(ChatError::config(format!(
                "Missing required settings: {}",
                missing.join(", ")
            )));
        }

        url::Url::parse(&self.api.base_url)
            .map_err(|e| ChatError::config(format!("Invalid API_BASE: {}", e)))?;
        url::Url::parse(&self.auth.redirect_uri)
            .map_err(|e| ChatError::config(format!("Invalid REDIRECT_URI: {}", e)))?;

        Ok(())
    }

    /// Authority URL for the configured tenant
    pub fn authority(&self) -> String {
        format!(
            "{}/{}",
            self.auth.authority_host.trim_end_matches('/'),
            self.auth.tenant_id
        )
    }

    /// Scopes requested for backend API tokens
    pub fn api_scopes(&self) -> Vec<String> {
        vec![self.auth.api_scope.clone()]
    }

    /// Generate a default config file content for display
    pub fn default_config_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config)
            .unwrap_or_else(|_| String::from("# Error generating config"))
    }
}
