use serde::Deserialize;
use std::time::Duration;

use crate::config::Config;
use crate::errors::AppError;

/// Outcome of a human-verification check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verification {
    /// The verification service confirmed the token.
    Verified,
    /// The verification service explicitly rejected the token.
    Rejected,
    /// No secret configured, or no token supplied by the caller.
    Skipped,
}

/// Client for the Turnstile siteverify endpoint.
///
/// When no secret is configured the client is a pass-through and never
/// touches the network. A configured secret with a missing token is also a
/// pass-through: local and non-production forms submit no token and must
/// keep working.
#[derive(Clone)]
pub struct TurnstileClient {
    client: reqwest::Client,
    verify_url: String,
    secret: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SiteverifyResponse {
    success: bool,
    #[serde(default, rename = "error-codes")]
    error_codes: Vec<String>,
}

impl TurnstileClient {
    pub fn new(config: &Config) -> Result<Self, AppError> {
        Self::with_verify_url(
            config.turnstile_verify_url.clone(),
            config.turnstile_secret_key.clone(),
        )
    }

    /// Constructor taking the endpoint explicitly so tests can point the
    /// client at a mock server.
    pub fn with_verify_url(verify_url: String, secret: Option<String>) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| {
                AppError::ExternalApiError(format!("Failed to create Turnstile client: {}", e))
            })?;

        Ok(Self {
            client,
            verify_url,
            secret,
        })
    }

    /// Redeem a challenge token against the verification service.
    ///
    /// Transport and decode failures are surfaced as `ExternalApiError`, not
    /// as `Rejected`: a verification outage is an upstream fault, not a
    /// verdict on the caller.
    pub async fn verify(
        &self,
        token: Option<&str>,
        remote_ip: Option<&str>,
    ) -> Result<Verification, AppError> {
        let Some(ref secret) = self.secret else {
            return Ok(Verification::Skipped);
        };

        let Some(token) = token else {
            tracing::debug!("No Turnstile token supplied; skipping verification");
            return Ok(Verification::Skipped);
        };

        let mut form = vec![("secret", secret.as_str()), ("response", token)];
        if let Some(ip) = remote_ip {
            form.push(("remoteip", ip));
        }

        let response = self
            .client
            .post(&self.verify_url)
            .form(&form)
            .send()
            .await
            .map_err(|e| {
                AppError::ExternalApiError(format!("Turnstile request failed: {}", e))
            })?;

        let result: SiteverifyResponse = response.json().await.map_err(|e| {
            AppError::ExternalApiError(format!("Failed to parse Turnstile response: {}", e))
        })?;

        if result.success {
            tracing::debug!("Turnstile token verified");
            Ok(Verification::Verified)
        } else {
            tracing::warn!(
                "Turnstile rejected token (error codes: {:?})",
                result.error_codes
            );
            Ok(Verification::Rejected)
        }
    }
}
