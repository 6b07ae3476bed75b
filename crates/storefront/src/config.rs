//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOREFRONT_DATABASE_URL` - `PostgreSQL` connection string for the session
//!   store (falls back to `DATABASE_URL`)
//! - `CMS_URL` - Base URL of the Strapi CMS (e.g., `https://cms.example.com`)
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 8000)
//! - `STOREFRONT_BASE_URL` - Public URL (default: `http://localhost:{port}`)
//! - `APP_ENV` - `development`, `production` or `test` (default: development)
//! - `CMS_TOKEN` - Strapi API token, sent as a bearer token
//! - `ALLOWED_ORIGINS` - Comma-separated CORS origins (default: `http://localhost:8000`)
//! - `WHATSAPP_NUMBER` - Store phone number receiving wishlist inquiries
//! - `CATALOG_REFRESH_SECONDS` - Catalog refresh interval (default: 300)
//! - `PRODUCTS_PER_PAGE` - Default page size for product listings (default: 12)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment tag (default: `APP_ENV`)
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate (default: 0.1)

use std::collections::HashMap;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use cozy_furniture_core::catalog::DEFAULT_PER_PAGE;
use secrecy::SecretString;
use thiserror::Error;
use url::Url;

use crate::whatsapp;

const DEFAULT_PORT: &str = "8000";
const DEFAULT_ALLOWED_ORIGIN: &str = "http://localhost:8000";
const DEFAULT_CATALOG_REFRESH_SECONDS: u64 = 300;
const MAX_PRODUCTS_PER_PAGE: usize = 100;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
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

/// Deployment environment, read from `APP_ENV`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Production,
    Test,
}

impl Environment {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
            Self::Test => "test",
        }
    }

    /// Whether internal error details must be hidden from clients.
    #[must_use]
    pub const fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            "test" => Ok(Self::Test),
            other => Err(format!("unknown environment '{other}'")),
        }
    }
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// Deployment environment
    pub environment: Environment,
    /// Origins allowed by CORS
    pub allowed_origins: Vec<String>,
    /// Strapi CMS configuration
    pub cms: CmsConfig,
    /// Interval between background catalog refreshes
    pub catalog_refresh_interval: Duration,
    /// Default page size for product listings
    pub products_per_page: usize,
    /// Normalized store phone number (digits only) for wishlist inquiries
    pub whatsapp_number: Option<String>,
    /// Sentry error tracking configuration
    pub sentry: SentryConfig,
}

/// Strapi CMS configuration.
///
/// Implements `Debug` manually to redact the API token.
#[derive(Clone)]
pub struct CmsConfig {
    /// CMS base URL; requests go to `{base_url}/api/{endpoint}`
    pub base_url: Url,
    /// API token (server-side only)
    pub token: Option<SecretString>,
    /// Cache TTL for product listings and product detail
    pub products_ttl: Duration,
    /// Cache TTL for categories, colors and materials
    pub reference_ttl: Duration,
}

impl fmt::Debug for CmsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CmsConfig")
            .field("base_url", &self.base_url.as_str())
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("products_ttl", &self.products_ttl)
            .field("reference_ttl", &self.reference_ttl)
            .finish()
    }
}

impl CmsConfig {
    /// CMS configuration with the default cache lifetimes.
    #[must_use]
    pub const fn new(base_url: Url, token: Option<SecretString>) -> Self {
        Self {
            base_url,
            token,
            products_ttl: Duration::from_secs(60),
            reference_ttl: Duration::from_secs(3600),
        }
    }
}

/// Sentry error tracking configuration.
#[derive(Debug, Clone)]
pub struct SentryConfig {
    pub dsn: Option<String>,
    pub environment: Option<String>,
    pub sample_rate: f32,
    pub traces_sample_rate: f32,
}

impl Default for SentryConfig {
    fn default() -> Self {
        Self {
            dsn: None,
            environment: None,
            sample_rate: 1.0,
            traces_sample_rate: 0.1,
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if the CMS token fails validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Same as [`StorefrontConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env(&lookup);

        let database_url = env
            .optional("STOREFRONT_DATABASE_URL")
            .or_else(|| env.optional("DATABASE_URL"))
            .map(SecretString::from)
            .ok_or_else(|| ConfigError::MissingEnvVar("STOREFRONT_DATABASE_URL".to_string()))?;
        let host = env.parse::<IpAddr>("STOREFRONT_HOST", "127.0.0.1")?;
        let port = env.parse::<u16>("STOREFRONT_PORT", DEFAULT_PORT)?;
        let base_url = env
            .optional("STOREFRONT_BASE_URL")
            .unwrap_or_else(|| format!("http://localhost:{port}"));
        let environment = env.parse::<Environment>("APP_ENV", Environment::default().as_str())?;

        let allowed_origins = parse_origins(
            &env.optional("ALLOWED_ORIGINS")
                .unwrap_or_else(|| DEFAULT_ALLOWED_ORIGIN.to_string()),
        );

        let cms = CmsConfig::from_env(&env)?;

        let catalog_refresh_interval = Duration::from_secs(env.parse::<u64>(
            "CATALOG_REFRESH_SECONDS",
            &DEFAULT_CATALOG_REFRESH_SECONDS.to_string(),
        )?);
        let products_per_page = env.parse::<usize>("PRODUCTS_PER_PAGE", &DEFAULT_PER_PAGE.to_string())?;
        if products_per_page == 0 || products_per_page > MAX_PRODUCTS_PER_PAGE {
            return Err(ConfigError::InvalidEnvVar(
                "PRODUCTS_PER_PAGE".to_string(),
                format!("must be between 1 and {MAX_PRODUCTS_PER_PAGE}"),
            ));
        }

        let whatsapp_number = env
            .optional("WHATSAPP_NUMBER")
            .map(|raw| {
                whatsapp::normalize_phone_number(&raw).ok_or_else(|| {
                    ConfigError::InvalidEnvVar(
                        "WHATSAPP_NUMBER".to_string(),
                        "must contain 10 to 15 digits".to_string(),
                    )
                })
            })
            .transpose()?;

        let sentry = SentryConfig {
            dsn: env.optional("SENTRY_DSN"),
            environment: env.optional("SENTRY_ENVIRONMENT"),
            sample_rate: env.parse::<f32>("SENTRY_SAMPLE_RATE", "1.0")?,
            traces_sample_rate: env.parse::<f32>("SENTRY_TRACES_SAMPLE_RATE", "0.1")?,
        };

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            environment,
            allowed_origins,
            cms,
            catalog_refresh_interval,
            products_per_page,
            whatsapp_number,
            sentry,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether session cookies must be marked `Secure`.
    #[must_use]
    pub fn uses_https(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

impl CmsConfig {
    fn from_env(env: &Env<'_>) -> Result<Self, ConfigError> {
        let raw = env.required("CMS_URL")?;
        let base_url = Url::parse(raw.trim_end_matches('/'))
            .map_err(|e| ConfigError::InvalidEnvVar("CMS_URL".to_string(), e.to_string()))?;

        let token = match env.optional("CMS_TOKEN") {
            Some(value) => {
                validate_secret_strength(&value, "CMS_TOKEN")?;
                Some(SecretString::from(value))
            }
            None => None,
        };

        Ok(Self::new(base_url, token))
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Variable source used while loading.
struct Env<'a>(&'a dyn Fn(&str) -> Option<String>);

impl Env<'_> {
    /// Get an optional variable; empty values count as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|value| !value.trim().is_empty())
    }

    /// Get a required variable.
    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.optional(key)
            .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
    }

    /// Parse a variable, falling back to `default` when unset.
    fn parse<T>(&self, key: &str, default: &str) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        self.optional(key)
            .unwrap_or_else(|| default.to_string())
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    }
}

/// Split a comma-separated origin list, dropping blanks.
fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    if let Some(pattern) = PLACEHOLDER_PATTERNS.iter().find(|p| lower.contains(*p)) {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!("appears to be a placeholder (contains '{pattern}')"),
        ));
    }

    // Strapi tokens are long random hex strings
    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a generated API token."
            ),
        ));
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::ExposeSecret;

    use super::*;

    const TOKEN: &str = "3f9a1c7e5b2d8046af13ce97b5d2086e1a4f";

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    fn minimal() -> Vec<(&'static str, &'static str)> {
        vec![
            ("STOREFRONT_DATABASE_URL", "postgres://localhost/cozy"),
            ("CMS_URL", "http://localhost:1337/"),
        ]
    }

    #[test]
    fn test_defaults() {
        let config = StorefrontConfig::from_lookup(lookup(&minimal())).unwrap();

        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:8000");
        assert_eq!(config.base_url, "http://localhost:8000");
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.allowed_origins, vec!["http://localhost:8000"]);
        assert_eq!(config.cms.base_url.as_str(), "http://localhost:1337/");
        assert!(config.cms.token.is_none());
        assert_eq!(config.cms.products_ttl, Duration::from_secs(60));
        assert_eq!(config.cms.reference_ttl, Duration::from_secs(3600));
        assert_eq!(config.catalog_refresh_interval, Duration::from_secs(300));
        assert_eq!(config.products_per_page, 12);
        assert!(config.whatsapp_number.is_none());
        assert!(!config.uses_https());
    }

    #[test]
    fn test_missing_cms_url() {
        let vars = [("STOREFRONT_DATABASE_URL", "postgres://localhost/cozy")];
        let err = StorefrontConfig::from_lookup(lookup(&vars)).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref key) if key == "CMS_URL"));
    }

    #[test]
    fn test_database_url_fallback() {
        let vars = [
            ("DATABASE_URL", "postgres://fallback/cozy"),
            ("CMS_URL", "http://localhost:1337"),
        ];
        let config = StorefrontConfig::from_lookup(lookup(&vars)).unwrap();
        assert_eq!(config.database_url.expose_secret(), "postgres://fallback/cozy");
    }

    #[test]
    fn test_missing_database_url() {
        let vars = [("CMS_URL", "http://localhost:1337")];
        let err = StorefrontConfig::from_lookup(lookup(&vars)).unwrap_err();
        assert!(
            matches!(err, ConfigError::MissingEnvVar(ref key) if key == "STOREFRONT_DATABASE_URL")
        );
    }

    #[test]
    fn test_overrides() {
        let mut vars = minimal();
        vars.extend([
            ("STOREFRONT_PORT", "9000"),
            ("APP_ENV", "production"),
            ("ALLOWED_ORIGINS", "https://a.example.com, ,https://b.example.com"),
            ("WHATSAPP_NUMBER", "(555) 123-4567"),
            ("PRODUCTS_PER_PAGE", "24"),
            ("CMS_TOKEN", TOKEN),
        ]);
        let config = StorefrontConfig::from_lookup(lookup(&vars)).unwrap();

        assert_eq!(config.port, 9000);
        assert!(config.environment.is_production());
        assert_eq!(
            config.allowed_origins,
            vec!["https://a.example.com", "https://b.example.com"]
        );
        assert_eq!(config.whatsapp_number.as_deref(), Some("15551234567"));
        assert_eq!(config.products_per_page, 24);
        assert!(config.cms.token.is_some());
    }

    #[test]
    fn test_invalid_port() {
        let mut vars = minimal();
        vars.push(("STOREFRONT_PORT", "eighty"));
        let err = StorefrontConfig::from_lookup(lookup(&vars)).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref key, _) if key == "STOREFRONT_PORT"));
    }

    #[test]
    fn test_invalid_whatsapp_number() {
        let mut vars = minimal();
        vars.push(("WHATSAPP_NUMBER", "12345"));
        let err = StorefrontConfig::from_lookup(lookup(&vars)).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref key, _) if key == "WHATSAPP_NUMBER"));
    }

    #[test]
    fn test_zero_page_size_rejected() {
        let mut vars = minimal();
        vars.push(("PRODUCTS_PER_PAGE", "0"));
        assert!(StorefrontConfig::from_lookup(lookup(&vars)).is_err());
    }

    #[test]
    fn test_placeholder_token_rejected() {
        let mut vars = minimal();
        vars.push(("CMS_TOKEN", "your-strapi-token-here"));
        let err = StorefrontConfig::from_lookup(lookup(&vars)).unwrap_err();
        assert!(matches!(err, ConfigError::InsecureSecret(_, _)));
    }

    #[test]
    fn test_environment_parse() {
        assert_eq!("PRODUCTION".parse::<Environment>(), Ok(Environment::Production));
        assert_eq!("dev".parse::<Environment>(), Ok(Environment::Development));
        assert!("staging".parse::<Environment>().is_err());
    }

    #[test]
    fn test_shannon_entropy() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
        assert!((shannon_entropy("aaaaaaa") - 0.0).abs() < f64::EPSILON);
        assert!((shannon_entropy("ab") - 1.0).abs() < 0.01);
        assert!(shannon_entropy(TOKEN) > MIN_ENTROPY_BITS_PER_CHAR);
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let result = validate_secret_strength("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa", "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_cms_config_debug_redacts_token() {
        let config = CmsConfig::new(
            Url::parse("https://cms.example.com").unwrap(),
            Some(SecretString::from("super_secret_cms_token")),
        );

        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("cms.example.com"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_cms_token"));
    }
}
