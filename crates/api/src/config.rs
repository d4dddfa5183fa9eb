use alms_core::money::{validate_currency, DEFAULT_CURRENCY};

use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// Everything except the secrets has a default suitable for local
/// development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Public site URL, linked from outgoing emails.
    pub site_url: String,
    /// JWT token configuration (secret, expiry durations).
    pub jwt: JwtConfig,
    /// Payment gateway settings.
    pub payment: PaymentConfig,
    /// Object storage settings.
    pub storage: StorageConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `SITE_URL`             | `http://localhost:5173`    |
    ///
    /// See [`JwtConfig::from_env`], [`PaymentConfig::from_env`] and
    /// [`StorageConfig::from_env`] for the remaining variables.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let site_url = std::env::var("SITE_URL")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .trim_end_matches('/')
            .to_string();

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            site_url,
            jwt: JwtConfig::from_env(),
            payment: PaymentConfig::from_env(),
            storage: StorageConfig::from_env(),
        }
    }
}

/// Default gateway API base URL.
const DEFAULT_PAYSTACK_BASE_URL: &str = "https://api.paystack.co";

/// Default page the gateway redirects back to after checkout.
const DEFAULT_CALLBACK_URL: &str = "http://localhost:5173/donate/verify";

/// Default outbound gateway timeout in seconds.
const DEFAULT_GATEWAY_TIMEOUT_SECS: u64 = 15;

/// Payment gateway configuration.
#[derive(Debug, Clone)]
pub struct PaymentConfig {
    /// Secret API key. Also the webhook signing key.
    pub secret_key: String,
    pub base_url: String,
    pub callback_url: String,
    /// Currency used when a checkout does not name one.
    pub default_currency: String,
    pub timeout_secs: u64,
}

impl PaymentConfig {
    /// | Env Var                | Required | Default                               |
    /// |------------------------|----------|---------------------------------------|
    /// | `PAYSTACK_SECRET_KEY`  | **yes**  | --                                    |
    /// | `PAYSTACK_BASE_URL`    | no       | `https://api.paystack.co`             |
    /// | `PAYMENT_CALLBACK_URL` | no       | `http://localhost:5173/donate/verify` |
    /// | `DEFAULT_CURRENCY`     | no       | `NGN`                                 |
    /// | `GATEWAY_TIMEOUT_SECS` | no       | `15`                                  |
    ///
    /// # Panics
    ///
    /// Panics if the secret key is missing or the currency is unsupported.
    pub fn from_env() -> Self {
        let secret_key = std::env::var("PAYSTACK_SECRET_KEY")
            .expect("PAYSTACK_SECRET_KEY must be set in the environment");
        assert!(!secret_key.is_empty(), "PAYSTACK_SECRET_KEY must not be empty");

        let default_currency =
            std::env::var("DEFAULT_CURRENCY").unwrap_or_else(|_| DEFAULT_CURRENCY.into());
        if let Err(e) = validate_currency(&default_currency) {
            panic!("DEFAULT_CURRENCY is invalid: {e}");
        }

        Self {
            secret_key,
            base_url: std::env::var("PAYSTACK_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_PAYSTACK_BASE_URL.into()),
            callback_url: std::env::var("PAYMENT_CALLBACK_URL")
                .unwrap_or_else(|_| DEFAULT_CALLBACK_URL.into()),
            default_currency,
            timeout_secs: std::env::var("GATEWAY_TIMEOUT_SECS")
                .unwrap_or_else(|_| DEFAULT_GATEWAY_TIMEOUT_SECS.to_string())
                .parse()
                .expect("GATEWAY_TIMEOUT_SECS must be a valid u64"),
        }
    }
}

/// Default lifetime of a signed URL in seconds.
const DEFAULT_SIGNED_URL_TTL_SECS: u64 = 3600;

/// Default re-sign margin before expiry in seconds.
const DEFAULT_SIGNED_URL_REFRESH_MARGIN_SECS: u64 = 300;

/// Default outbound storage timeout in seconds.
const DEFAULT_STORAGE_TIMEOUT_SECS: u64 = 10;

/// Object storage configuration.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Storage REST base, e.g. `https://<project>/storage/v1`.
    pub url: String,
    pub service_key: String,
    pub signed_url_ttl_secs: u64,
    pub refresh_margin_secs: u64,
    pub timeout_secs: u64,
}

impl StorageConfig {
    /// | Env Var                          | Required | Default |
    /// |----------------------------------|----------|---------|
    /// | `STORAGE_URL`                    | **yes**  | --      |
    /// | `STORAGE_SERVICE_KEY`            | **yes**  | --      |
    /// | `SIGNED_URL_TTL_SECS`            | no       | `3600`  |
    /// | `SIGNED_URL_REFRESH_MARGIN_SECS` | no       | `300`   |
    /// | `STORAGE_TIMEOUT_SECS`           | no       | `10`    |
    ///
    /// # Panics
    ///
    /// Panics if a required variable is missing or the margin is not
    /// shorter than the ttl.
    pub fn from_env() -> Self {
        let url = std::env::var("STORAGE_URL").expect("STORAGE_URL must be set in the environment");
        let service_key = std::env::var("STORAGE_SERVICE_KEY")
            .expect("STORAGE_SERVICE_KEY must be set in the environment");

        let signed_url_ttl_secs: u64 = std::env::var("SIGNED_URL_TTL_SECS")
            .unwrap_or_else(|_| DEFAULT_SIGNED_URL_TTL_SECS.to_string())
            .parse()
            .expect("SIGNED_URL_TTL_SECS must be a valid u64");

        let refresh_margin_secs: u64 = std::env::var("SIGNED_URL_REFRESH_MARGIN_SECS")
            .unwrap_or_else(|_| DEFAULT_SIGNED_URL_REFRESH_MARGIN_SECS.to_string())
            .parse()
            .expect("SIGNED_URL_REFRESH_MARGIN_SECS must be a valid u64");

        assert!(
            refresh_margin_secs < signed_url_ttl_secs,
            "SIGNED_URL_REFRESH_MARGIN_SECS must be shorter than SIGNED_URL_TTL_SECS"
        );

        Self {
            url,
            service_key,
            signed_url_ttl_secs,
            refresh_margin_secs,
            timeout_secs: std::env::var("STORAGE_TIMEOUT_SECS")
                .unwrap_or_else(|_| DEFAULT_STORAGE_TIMEOUT_SECS.to_string())
                .parse()
                .expect("STORAGE_TIMEOUT_SECS must be a valid u64"),
        }
    }
}
