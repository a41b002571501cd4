//! Edge router configuration loaded from environment variables.
//!
//! Configuration is loaded once at startup and validated before the server starts.
//!
//! ## Variables
//!
//! ```bash
//! export LISTEN="0.0.0.0:8787"
//! export UPSTREAM_ORIGIN="https://gh-bot.hacolby.workers.dev"
//! export ASSETS_DIR="dist"
//! ```
//!
//! All variables are optional; the defaults reproduce the production deployment.
//!
//! - `LISTEN` - Bind address (default: `0.0.0.0:8787`)
//! - `UPSTREAM_ORIGIN` - Origin that `/api/*` requests are forwarded to
//!   (default: `https://gh-bot.hacolby.workers.dev`)
//! - `UPSTREAM_TIMEOUT_SECONDS` - Upstream request timeout (default: 30)
//! - `UPSTREAM_USER_AGENT` - Client identifier sent upstream (default: `gh-bot-frontend/1.0.0`)
//! - `ASSETS_DIR` - Directory holding the built single-page app (default: `dist`)
//! - `FALLBACK_DOCUMENT` - SPA shell served for client-side routes (default: `/index.html`)
//! - `MAX_BODY_BYTES` - Largest request body forwarded upstream (default: 10 MiB)
//! - `RUST_LOG` - Log level (default: `info`)
//! - `LOG_FORMAT` - Log format: `text` or `json` (default: `text`)

use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

pub const DEFAULT_UPSTREAM_ORIGIN: &str = "https://gh-bot.hacolby.workers.dev";
pub const DEFAULT_USER_AGENT: &str = "gh-bot-frontend/1.0.0";
pub const DEFAULT_FALLBACK_DOCUMENT: &str = "/index.html";
pub const DEFAULT_MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Service configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub listen_addr: String,
    /// Origin without a trailing slash; stripped API paths are appended verbatim.
    pub upstream_origin: String,
    pub upstream_timeout_seconds: u64,
    pub upstream_user_agent: String,
    pub assets_dir: PathBuf,
    pub fallback_document: String,
    /// Bodies larger than this are answered with 413 and never forwarded.
    pub max_body_bytes: usize,
    pub log_level: String,
    pub log_format: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8787".to_string(),
            upstream_origin: DEFAULT_UPSTREAM_ORIGIN.to_string(),
            upstream_timeout_seconds: 30,
            upstream_user_agent: DEFAULT_USER_AGENT.to_string(),
            assets_dir: PathBuf::from("dist"),
            fallback_document: DEFAULT_FALLBACK_DOCUMENT.to_string(),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            log_level: "info".to_string(),
            log_format: "text".to_string(),
        }
    }
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if `UPSTREAM_TIMEOUT_SECONDS` or `MAX_BODY_BYTES` is set
    /// but not a number.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let listen_addr = env::var("LISTEN").unwrap_or(defaults.listen_addr);
        let upstream_origin = env::var("UPSTREAM_ORIGIN")
            .map(|v| normalize_origin(&v))
            .unwrap_or(defaults.upstream_origin);

        let upstream_timeout_seconds = match env::var("UPSTREAM_TIMEOUT_SECONDS") {
            Ok(v) => v
                .parse()
                .with_context(|| format!("UPSTREAM_TIMEOUT_SECONDS must be a number, got '{v}'"))?,
            Err(_) => defaults.upstream_timeout_seconds,
        };

        let upstream_user_agent =
            env::var("UPSTREAM_USER_AGENT").unwrap_or(defaults.upstream_user_agent);
        let assets_dir = env::var("ASSETS_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.assets_dir);
        let fallback_document =
            env::var("FALLBACK_DOCUMENT").unwrap_or(defaults.fallback_document);
        let max_body_bytes = match env::var("MAX_BODY_BYTES") {
            Ok(v) => v
                .parse()
                .with_context(|| format!("MAX_BODY_BYTES must be a number, got '{v}'"))?,
            Err(_) => defaults.max_body_bytes,
        };
        let log_level = env::var("RUST_LOG").unwrap_or(defaults.log_level);
        let log_format = env::var("LOG_FORMAT").unwrap_or(defaults.log_format);

        Ok(Self {
            listen_addr,
            upstream_origin,
            upstream_timeout_seconds,
            upstream_user_agent,
            assets_dir,
            fallback_document,
            max_body_bytes,
            log_level,
            log_format,
        })
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `upstream_origin` is not an absolute `http`/`https` URL
    /// - `upstream_timeout_seconds` or `max_body_bytes` is zero
    /// - `fallback_document` does not start with `/`
    /// - `log_format` is not `text` or `json`
    /// - `listen_addr` is invalid
    pub fn validate(&self) -> Result<()> {
        let origin = Url::parse(&self.upstream_origin).with_context(|| {
            format!(
                "UPSTREAM_ORIGIN must be an absolute URL, got '{}'",
                self.upstream_origin
            )
        })?;

        if origin.scheme() != "http" && origin.scheme() != "https" {
            anyhow::bail!(
                "UPSTREAM_ORIGIN must use http or https, got '{}'",
                self.upstream_origin
            );
        }

        if origin.query().is_some() || origin.fragment().is_some() {
            anyhow::bail!(
                "UPSTREAM_ORIGIN must not carry a query or fragment, got '{}'",
                self.upstream_origin
            );
        }

        if self.upstream_timeout_seconds == 0 {
            anyhow::bail!("UPSTREAM_TIMEOUT_SECONDS must be greater than 0");
        }

        if self.max_body_bytes == 0 {
            anyhow::bail!("MAX_BODY_BYTES must be greater than 0");
        }

        if self.upstream_user_agent.trim().is_empty() {
            anyhow::bail!("UPSTREAM_USER_AGENT must not be empty");
        }

        if !self.fallback_document.starts_with('/') {
            anyhow::bail!(
                "FALLBACK_DOCUMENT must be an absolute path starting with '/', got '{}'",
                self.fallback_document
            );
        }

        if self.log_format != "text" && self.log_format != "json" {
            anyhow::bail!(
                "LOG_FORMAT must be 'text' or 'json', got '{}'",
                self.log_format
            );
        }

        if !self.listen_addr.contains(':') {
            anyhow::bail!(
                "LISTEN must be in format 'host:port', got '{}'",
                self.listen_addr
            );
        }

        Ok(())
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_seconds)
    }

    /// Prints configuration summary.
    pub fn print_summary(&self) {
        tracing::info!("Configuration loaded:");
        tracing::info!("  Listen address: {}", self.listen_addr);
        tracing::info!("  Upstream origin: {}", self.upstream_origin);
        tracing::info!("  Upstream timeout: {}s", self.upstream_timeout_seconds);
        tracing::info!("  Assets directory: {}", self.assets_dir.display());
        tracing::info!("  Fallback document: {}", self.fallback_document);
        tracing::info!("  Max body size: {} bytes", self.max_body_bytes);
        tracing::info!("  Log level: {}", self.log_level);
        tracing::info!("  Log format: {}", self.log_format);
    }
}

/// Drops trailing slashes so that `origin + "/stats"` never produces `//stats`.
fn normalize_origin(origin: &str) -> String {
    origin.trim().trim_end_matches('/').to_string()
}

/// Loads and validates configuration from environment variables.
///
/// # Errors
///
/// Returns an error if a variable is malformed or validation fails.
///
/// # Note
///
/// This function expects environment variables to be already loaded
/// (e.g., via `dotenvy::dotenv()` in `main.rs`).
pub fn load_from_env() -> Result<Config> {
    let config = Config::from_env()?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_normalize_origin() {
        assert_eq!(
            normalize_origin("https://api.example.com/"),
            "https://api.example.com"
        );
        assert_eq!(
            normalize_origin(" https://api.example.com//"),
            "https://api.example.com"
        );
        assert_eq!(
            normalize_origin("http://localhost:8080"),
            "http://localhost:8080"
        );
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.upstream_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();

        config.upstream_origin = "ftp://files.example.com".to_string();
        assert!(config.validate().is_err());

        config.upstream_origin = "not a url".to_string();
        assert!(config.validate().is_err());

        config.upstream_origin = "https://api.example.com?x=1".to_string();
        assert!(config.validate().is_err());

        config.upstream_origin = "http://127.0.0.1:9000".to_string();
        assert!(config.validate().is_ok());

        config.upstream_timeout_seconds = 0;
        assert!(config.validate().is_err());
        config.upstream_timeout_seconds = 5;

        config.fallback_document = "index.html".to_string();
        assert!(config.validate().is_err());
        config.fallback_document = "/app.html".to_string();
        assert!(config.validate().is_ok());

        config.max_body_bytes = 0;
        assert!(config.validate().is_err());
        config.max_body_bytes = 1024;
        assert!(config.validate().is_ok());

        config.log_format = "invalid".to_string();
        assert!(config.validate().is_err());
        config.log_format = "json".to_string();
        assert!(config.validate().is_ok());

        config.listen_addr = "8787".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    #[serial]
    fn test_from_env_overrides() {
        // SAFETY: Tests are run serially due to #[serial], so no concurrent access
        unsafe {
            env::set_var("UPSTREAM_ORIGIN", "http://backend.internal:9000/");
            env::set_var("UPSTREAM_TIMEOUT_SECONDS", "5");
            env::set_var("ASSETS_DIR", "/srv/dashboard");
            env::set_var("MAX_BODY_BYTES", "65536");
        }

        let config = Config::from_env().unwrap();

        assert_eq!(config.upstream_origin, "http://backend.internal:9000");
        assert_eq!(config.upstream_timeout_seconds, 5);
        assert_eq!(config.assets_dir, PathBuf::from("/srv/dashboard"));
        assert_eq!(config.fallback_document, DEFAULT_FALLBACK_DOCUMENT);
        assert_eq!(config.max_body_bytes, 65536);

        // Cleanup
        unsafe {
            env::remove_var("UPSTREAM_ORIGIN");
            env::remove_var("UPSTREAM_TIMEOUT_SECONDS");
            env::remove_var("ASSETS_DIR");
            env::remove_var("MAX_BODY_BYTES");
        }
    }

    #[test]
    #[serial]
    fn test_from_env_rejects_non_numeric_timeout() {
        // SAFETY: Tests are run serially
        unsafe {
            env::set_var("UPSTREAM_TIMEOUT_SECONDS", "soon");
        }

        assert!(Config::from_env().is_err());

        unsafe {
            env::remove_var("UPSTREAM_TIMEOUT_SECONDS");
        }
    }

    #[test]
    #[serial]
    fn test_from_env_defaults() {
        // SAFETY: Tests are run serially
        unsafe {
            env::remove_var("UPSTREAM_ORIGIN");
            env::remove_var("UPSTREAM_USER_AGENT");
            env::remove_var("MAX_BODY_BYTES");
        }

        let config = Config::from_env().unwrap();
        assert_eq!(config.upstream_origin, DEFAULT_UPSTREAM_ORIGIN);
        assert_eq!(config.upstream_user_agent, DEFAULT_USER_AGENT);
        assert_eq!(config.max_body_bytes, DEFAULT_MAX_BODY_BYTES);
    }
}
