//! Gateway configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `ERP_URL` - Base URL of the ERP server (e.g. https://erp.example.com)
//! - `ERP_DB` - ERP database name
//! - `ERP_USERNAME` - ERP API user login
//! - `ERP_PASSWORD` - ERP API user password
//!
//! ## Optional
//! - `GATEWAY_HOST` - Bind address (default: 127.0.0.1)
//! - `GATEWAY_PORT` - Listen port (default: 8080)
//! - `GATEWAY_AUTO_INVOICE` - Create, post, and email an invoice after each
//!   confirmed order (`true`/`false`, default: false)
//! - `FORMS_WEBHOOK_SECRET` - Shared secret for webhook signature
//!   verification; unsigned deployments leave it unset
//! - `FORMS_CATALOG_PATH` - JSON file overriding the built-in product catalog
//! - `FORMS_PLACEHOLDER_DOMAIN` - Domain for generated placeholder emails
//!   (default: placeholder.invalid)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment tag

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use secrecy::SecretString;
use thiserror::Error;

const MIN_WEBHOOK_SECRET_LENGTH: usize = 16;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Gateway application configuration.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Whether to create and email an invoice after confirming each order
    pub auto_invoice: bool,
    /// ERP connection configuration
    pub erp: ErpConfig,
    /// Inbound form webhook configuration
    pub forms: FormsConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment tag
    pub sentry_environment: Option<String>,
}

/// ERP JSON-RPC connection configuration.
///
/// Implements `Debug` manually to redact the API password.
#[derive(Clone)]
pub struct ErpConfig {
    /// Base URL of the ERP server
    pub url: url::Url,
    /// ERP database name
    pub database: String,
    /// API user login
    pub username: String,
    /// API user password (server-side only)
    pub password: SecretString,
}

impl std::fmt::Debug for ErpConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErpConfig")
            .field("url", &self.url.as_str())
            .field("database", &self.database)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Inbound form webhook configuration.
#[derive(Clone, Default)]
pub struct FormsConfig {
    /// Shared secret for webhook signature verification, if signing is enabled
    pub webhook_secret: Option<SecretString>,
    /// Path to a JSON file overriding the built-in product catalog
    pub catalog_path: Option<PathBuf>,
    /// Domain used for generated placeholder emails
    pub placeholder_domain: String,
}

impl std::fmt::Debug for FormsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormsConfig")
            .field(
                "webhook_secret",
                &self.webhook_secret.as_ref().map(|_| "[REDACTED]"),
            )
            .field("catalog_path", &self.catalog_path)
            .field("placeholder_domain", &self.placeholder_domain)
            .finish()
    }
}

impl GatewayConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid, or
    /// if the webhook secret fails validation.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = get_env_or_default("GATEWAY_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("GATEWAY_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("GATEWAY_PORT", "8080")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("GATEWAY_PORT".to_string(), e.to_string()))?;
        let auto_invoice = parse_bool("GATEWAY_AUTO_INVOICE", false)?;

        let erp = ErpConfig::from_env()?;
        let forms = FormsConfig::from_env()?;
        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");

        Ok(Self {
            host,
            port,
            auto_invoice,
            erp,
            forms,
            sentry_dsn,
            sentry_environment,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl ErpConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let url = get_required_env("ERP_URL")?;
        let url = url::Url::parse(&url)
            .map_err(|e| ConfigError::InvalidEnvVar("ERP_URL".to_string(), e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidEnvVar(
                "ERP_URL".to_string(),
                format!("unsupported scheme '{}'", url.scheme()),
            ));
        }

        Ok(Self {
            url,
            database: get_required_env("ERP_DB")?,
            username: get_required_env("ERP_USERNAME")?,
            password: get_required_secret("ERP_PASSWORD")?,
        })
    }
}

impl FormsConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let webhook_secret = match get_optional_env("FORMS_WEBHOOK_SECRET") {
            Some(value) => {
                validate_webhook_secret(&value, "FORMS_WEBHOOK_SECRET")?;
                Some(SecretString::from(value))
            }
            None => None,
        };

        Ok(Self {
            webhook_secret,
            catalog_path: get_optional_env("FORMS_CATALOG_PATH").map(PathBuf::from),
            placeholder_domain: get_env_or_default(
                "FORMS_PLACEHOLDER_DOMAIN",
                "placeholder.invalid",
            ),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get a required environment variable as a secret.
fn get_required_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    Ok(SecretString::from(value))
}

/// Get an optional environment variable. Empty values count as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse a boolean environment variable.
fn parse_bool(key: &str, default: bool) -> Result<bool, ConfigError> {
    match std::env::var(key) {
        Err(_) => Ok(default),
        Ok(value) => match value.trim().to_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" | "" => Ok(false),
            other => Err(ConfigError::InvalidEnvVar(
                key.to_string(),
                format!("expected a boolean, got '{other}'"),
            )),
        },
    }
}

/// Validate that a webhook secret is not a placeholder and is long enough.
fn validate_webhook_secret(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    if secret.len() < MIN_WEBHOOK_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {} characters (got {})",
                MIN_WEBHOOK_SECRET_LENGTH,
                secret.len()
            ),
        ));
    }

    let lower = secret.to_lowercase();
    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_webhook_secret_too_short() {
        let result = validate_webhook_secret("short", "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_webhook_secret_placeholder() {
        let result = validate_webhook_secret("your-webhook-secret-here", "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_webhook_secret_valid() {
        assert!(validate_webhook_secret("fq2o8urgl4jq0m1xnzke", "TEST_VAR").is_ok());
    }

    #[test]
    fn test_parse_bool_values() {
        // parse_bool reads the environment; exercise only the default path
        // here to keep tests hermetic.
        assert!(!parse_bool("FORMBRIDGE_TEST_UNSET_BOOL", false).unwrap());
        assert!(parse_bool("FORMBRIDGE_TEST_UNSET_BOOL", true).unwrap());
    }

    #[test]
    fn test_erp_config_debug_redacts_password() {
        let config = ErpConfig {
            url: url::Url::parse("https://erp.example.com").unwrap(),
            database: "prod".to_string(),
            username: "api-user".to_string(),
            password: SecretString::from("super-secret-password"),
        };

        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("api-user"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super-secret-password"));
    }

    #[test]
    fn test_socket_addr() {
        let config = GatewayConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 8080,
            auto_invoice: false,
            erp: ErpConfig {
                url: url::Url::parse("https://erp.example.com").unwrap(),
                database: "prod".to_string(),
                username: "api-user".to_string(),
                password: SecretString::from("pw"),
            },
            forms: FormsConfig {
                webhook_secret: None,
                catalog_path: None,
                placeholder_domain: "placeholder.invalid".to_string(),
            },
            sentry_dsn: None,
            sentry_environment: None,
        };

        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 8080);
    }
}
