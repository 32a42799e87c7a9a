use serde_json::json;
use std::time::Duration;

use crate::config::Config;
use crate::errors::AppError;
use crate::models::Submission;

fn http_client() -> Result<reqwest::Client, AppError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
        .map_err(|e| AppError::ExternalApiError(format!("Failed to create notifier client: {}", e)))
}

fn subject(submission: &Submission) -> String {
    format!("New expression of interest #{}", submission.id)
}

fn body_text(submission: &Submission) -> String {
    format!(
        "New expression of interest received.\n\n\
         Name: {}\n\
         Title: {}\n\
         Email: {}\n\
         Country: {}\n\
         Submitted: {}\n\
         Reference: #{}\n",
        submission.name,
        submission.title.as_deref().unwrap_or("-"),
        submission.email,
        submission.country,
        submission.submitted_at.to_rfc3339(),
        submission.id,
    )
}

/// Generic webhook-style relay: POSTs a JSON summary to a configured URL and
/// leaves formatting/delivery to whatever sits behind it.
#[derive(Clone)]
pub struct RelayNotifier {
    client: reqwest::Client,
    url: String,
}

impl RelayNotifier {
    pub fn new(url: String) -> Result<Self, AppError> {
        Ok(Self {
            client: http_client()?,
            url,
        })
    }

    async fn send(&self, submission: &Submission) -> Result<(), AppError> {
        let response = self
            .client
            .post(&self.url)
            .json(&json!({
                "subject": subject(submission),
                "text": body_text(submission),
                "submission": submission,
            }))
            .send()
            .await
            .map_err(|e| AppError::ExternalApiError(format!("Relay request failed: {}", e)))?;

        ensure_success("Relay", response).await
    }
}

/// Resend transactional-email API (`POST {base}/emails`).
#[derive(Clone)]
pub struct ResendNotifier {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    from: String,
    to: String,
}

impl ResendNotifier {
    pub fn new(
        base_url: String,
        api_key: String,
        from: String,
        to: String,
    ) -> Result<Self, AppError> {
        Ok(Self {
            client: http_client()?,
            base_url,
            api_key,
            from,
            to,
        })
    }

    async fn send(&self, submission: &Submission) -> Result<(), AppError> {
        let url = format!("{}/emails", self.base_url);
        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&json!({
                "from": self.from,
                "to": [self.to],
                "subject": subject(submission),
                "text": body_text(submission),
            }))
            .send()
            .await
            .map_err(|e| AppError::ExternalApiError(format!("Resend request failed: {}", e)))?;

        ensure_success("Resend", response).await
    }
}

/// SendGrid v3 mail-send API (`POST {base}/v3/mail/send`).
#[derive(Clone)]
pub struct SendGridNotifier {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    from: String,
    to: String,
}

impl SendGridNotifier {
    pub fn new(
        base_url: String,
        api_key: String,
        from: String,
        to: String,
    ) -> Result<Self, AppError> {
        Ok(Self {
            client: http_client()?,
            base_url,
            api_key,
            from,
            to,
        })
    }

    async fn send(&self, submission: &Submission) -> Result<(), AppError> {
        let url = format!("{}/v3/mail/send", self.base_url);
        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&json!({
                "personalizations": [{ "to": [{ "email": self.to }] }],
                "from": { "email": self.from },
                "subject": subject(submission),
                "content": [{ "type": "text/plain", "value": body_text(submission) }],
            }))
            .send()
            .await
            .map_err(|e| AppError::ExternalApiError(format!("SendGrid request failed: {}", e)))?;

        ensure_success("SendGrid", response).await
    }
}

async fn ensure_success(provider: &str, response: reqwest::Response) -> Result<(), AppError> {
    if response.status().is_success() {
        return Ok(());
    }

    let status = response.status();
    let error_text = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    Err(AppError::ExternalApiError(format!(
        "{} returned status {}: {}",
        provider, status, error_text
    )))
}

/// The closed set of notification providers. Exactly one is selected at
/// startup from configuration; there is no per-request re-selection and no
/// fallback cascade between providers.
#[derive(Clone)]
pub enum Notifier {
    Relay(RelayNotifier),
    Resend(ResendNotifier),
    SendGrid(SendGridNotifier),
    /// No provider configured: notifications are logged and dropped.
    Disabled,
}

impl Notifier {
    /// Select a provider by configuration priority:
    /// relay URL, else Resend, else SendGrid, else disabled.
    ///
    /// `Config::from_env` guarantees from/to addresses are present whenever a
    /// transactional-email key is set.
    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        if let Some(ref url) = config.email_relay_url {
            tracing::info!("Notifier: email relay at {}", url);
            return Ok(Notifier::Relay(RelayNotifier::new(url.clone())?));
        }

        if let Some(ref key) = config.resend_api_key {
            let (from, to) = notify_addresses(config)?;
            tracing::info!("Notifier: Resend ({} -> {})", from, to);
            return Ok(Notifier::Resend(ResendNotifier::new(
                config.resend_base_url.clone(),
                key.clone(),
                from,
                to,
            )?));
        }

        if let Some(ref key) = config.sendgrid_api_key {
            let (from, to) = notify_addresses(config)?;
            tracing::info!("Notifier: SendGrid ({} -> {})", from, to);
            return Ok(Notifier::SendGrid(SendGridNotifier::new(
                config.sendgrid_base_url.clone(),
                key.clone(),
                from,
                to,
            )?));
        }

        tracing::info!("Notifier: disabled (no provider configured)");
        Ok(Notifier::Disabled)
    }

    /// Deliver a notification for a stored submission through the selected
    /// provider. Callers treat failure as log-and-forget; a notification
    /// error never unwinds the submission itself.
    pub async fn notify(&self, submission: &Submission) -> Result<(), AppError> {
        match self {
            Notifier::Relay(relay) => relay.send(submission).await,
            Notifier::Resend(resend) => resend.send(submission).await,
            Notifier::SendGrid(sendgrid) => sendgrid.send(submission).await,
            Notifier::Disabled => {
                tracing::info!(
                    "Notification skipped (disabled): submission #{} from {}",
                    submission.id,
                    submission.email
                );
                Ok(())
            }
        }
    }
}

fn notify_addresses(config: &Config) -> Result<(String, String), AppError> {
    match (&config.notify_email_from, &config.notify_email_to) {
        (Some(from), Some(to)) => Ok((from.clone(), to.clone())),
        _ => Err(AppError::InternalError(
            "NOTIFY_EMAIL_FROM and NOTIFY_EMAIL_TO must be set for email notifiers".to_string(),
        )),
    }
}
