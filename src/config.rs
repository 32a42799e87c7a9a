use serde::Deserialize;

/// Default Cloudflare Turnstile verification endpoint.
const DEFAULT_TURNSTILE_VERIFY_URL: &str =
    "https://challenges.cloudflare.com/turnstile/v0/siteverify";
const DEFAULT_RESEND_BASE_URL: &str = "https://api.resend.com";
const DEFAULT_SENDGRID_BASE_URL: &str = "https://api.sendgrid.com";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    /// Shared secret protecting the admin listing endpoint.
    pub admin_api_key: String,
    /// Turnstile secret. When absent, human verification is disabled entirely.
    pub turnstile_secret_key: Option<String>,
    pub turnstile_verify_url: String,
    /// Generic webhook-style email relay. Highest-priority notifier.
    pub email_relay_url: Option<String>,
    pub resend_api_key: Option<String>,
    pub resend_base_url: String,
    pub sendgrid_api_key: Option<String>,
    pub sendgrid_base_url: String,
    /// Sender/recipient for the transactional-email notifiers.
    pub notify_email_from: Option<String>,
    pub notify_email_to: Option<String>,
    /// Exact origins allowed by CORS. Empty means permissive (wildcard).
    pub allowed_origins: Vec<String>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            database_url: std::env::var("DB_URL")
                .or_else(|_| std::env::var("DATABASE_URL"))
                .map_err(|_| {
                    anyhow::anyhow!("DB_URL or DATABASE_URL environment variable required")
                })
                .and_then(|url| {
                    if url.trim().is_empty() {
                        anyhow::bail!("DB_URL cannot be empty");
                    }
                    if !url.starts_with("postgresql://") && !url.starts_with("postgres://") {
                        anyhow::bail!("DB_URL must start with postgresql:// or postgres://");
                    }
                    Ok(url)
                })?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
            admin_api_key: std::env::var("ADMIN_API_KEY")
                .map_err(|_| anyhow::anyhow!("ADMIN_API_KEY environment variable required"))
                .and_then(|key| {
                    if key.trim().is_empty() {
                        anyhow::bail!("ADMIN_API_KEY cannot be empty");
                    }
                    Ok(key)
                })?,
            turnstile_secret_key: std::env::var("TURNSTILE_SECRET_KEY")
                .ok()
                .filter(|s| !s.trim().is_empty()),
            turnstile_verify_url: std::env::var("TURNSTILE_VERIFY_URL")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_TURNSTILE_VERIFY_URL.to_string()),
            email_relay_url: std::env::var("EMAIL_RELAY_URL")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .map(|url| {
                    if !url.starts_with("http://") && !url.starts_with("https://") {
                        anyhow::bail!("EMAIL_RELAY_URL must start with http:// or https://");
                    }
                    Ok(url)
                })
                .transpose()?,
            resend_api_key: std::env::var("RESEND_API_KEY")
                .ok()
                .filter(|s| !s.trim().is_empty()),
            resend_base_url: std::env::var("RESEND_BASE_URL")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_RESEND_BASE_URL.to_string()),
            sendgrid_api_key: std::env::var("SENDGRID_API_KEY")
                .ok()
                .filter(|s| !s.trim().is_empty()),
            sendgrid_base_url: std::env::var("SENDGRID_BASE_URL")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_SENDGRID_BASE_URL.to_string()),
            notify_email_from: std::env::var("NOTIFY_EMAIL_FROM")
                .ok()
                .filter(|s| !s.trim().is_empty()),
            notify_email_to: std::env::var("NOTIFY_EMAIL_TO")
                .ok()
                .filter(|s| !s.trim().is_empty()),
            allowed_origins: std::env::var("ALLOWED_ORIGINS")
                .ok()
                .map(|raw| {
                    raw.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
        };

        // The transactional-email notifiers cannot run without addresses.
        if (config.resend_api_key.is_some() || config.sendgrid_api_key.is_some())
            && (config.notify_email_from.is_none() || config.notify_email_to.is_none())
        {
            anyhow::bail!(
                "RESEND_API_KEY/SENDGRID_API_KEY require NOTIFY_EMAIL_FROM and NOTIFY_EMAIL_TO"
            );
        }

        // Log successful configuration load (without sensitive values)
        tracing::info!("Configuration loaded successfully");
        tracing::debug!(
            "Database URL: {}...",
            &config.database_url[..20.min(config.database_url.len())]
        );
        tracing::debug!("Server Port: {}", config.port);
        if config.turnstile_secret_key.is_some() {
            tracing::info!("Turnstile verification enabled");
        } else {
            tracing::warn!("TURNSTILE_SECRET_KEY not set; human verification disabled");
        }
        if !config.allowed_origins.is_empty() {
            tracing::debug!("CORS allowed origins: {:?}", config.allowed_origins);
        }

        Ok(config)
    }
}
