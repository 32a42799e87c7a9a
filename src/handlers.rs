use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    Json,
};
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;

use crate::config::Config;
use crate::errors::AppError;
use crate::models::{SubmitInterestRequest, SubmitInterestResponse};
use crate::notifier::Notifier;
use crate::repository::SubmissionRepository;
use crate::turnstile::{TurnstileClient, Verification};
use crate::validation;

/// Shared application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: PgPool,
    /// Application configuration.
    pub config: Config,
    /// Human-verification client (pass-through when no secret is set).
    pub turnstile: TurnstileClient,
    /// Notification provider selected at startup.
    pub notifier: Arc<Notifier>,
}

/// Health check endpoint.
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "interest-api",
            "version": env!("CARGO_PKG_VERSION"),
        })),
    )
}

/// POST /api/interest
///
/// Submission pipeline:
/// 1. Validate fields (no store or notifier access on failure).
/// 2. Turnstile check; an explicit rejection stops the request.
/// 3. Insert the row; the store assigns id and timestamp.
/// 4. Dispatch the notification off the request path; failures are logged
///    and swallowed — once inserted, the submission is recorded regardless
///    of notification outcome.
/// 5. Respond with the new identifier.
pub async fn submit_interest(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<SubmitInterestRequest>,
) -> Result<(StatusCode, Json<SubmitInterestResponse>), AppError> {
    // Step 1: field validation
    let new_submission = validation::validate(&payload)?;

    // Step 2: human verification
    let remote_ip = client_ip(&headers);
    let verification = state
        .turnstile
        .verify(payload.turnstile_token.as_deref(), remote_ip.as_deref())
        .await?;
    match verification {
        Verification::Rejected => return Err(AppError::VerificationFailed),
        Verification::Verified | Verification::Skipped => {}
    }

    // Step 3: persist
    let repo = SubmissionRepository::new(state.db.clone());
    let submission = repo.insert(&new_submission).await?;
    tracing::info!(
        "Stored expression of interest #{} from {}",
        submission.id,
        submission.country
    );

    // Step 4: best-effort notification, never blocking the response
    let notifier = state.notifier.clone();
    let stored = submission.clone();
    tokio::spawn(async move {
        if let Err(e) = notifier.notify(&stored).await {
            tracing::warn!("Notification for submission #{} failed: {}", stored.id, e);
        }
    });

    // Step 5: respond
    Ok((
        StatusCode::OK,
        Json(SubmitInterestResponse {
            success: true,
            message: "Thank you for your interest. We'll be in touch.".to_string(),
            id: submission.id,
        }),
    ))
}

/// Caller IP for the Turnstile `remoteip` hint: the CDN-provided header
/// first, else the first entry of X-Forwarded-For.
fn client_ip(headers: &HeaderMap) -> Option<String> {
    headers
        .get("CF-Connecting-IP")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .or_else(|| {
            headers
                .get("X-Forwarded-For")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.split(',').next())
                .map(|s| s.trim().to_string())
        })
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_client_ip_prefers_cf_header() {
        let mut headers = HeaderMap::new();
        headers.insert("CF-Connecting-IP", HeaderValue::from_static("203.0.113.9"));
        headers.insert(
            "X-Forwarded-For",
            HeaderValue::from_static("198.51.100.1, 10.0.0.1"),
        );
        assert_eq!(client_ip(&headers).as_deref(), Some("203.0.113.9"));
    }

    #[test]
    fn test_client_ip_takes_first_forwarded_entry() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "X-Forwarded-For",
            HeaderValue::from_static("198.51.100.1, 10.0.0.1"),
        );
        assert_eq!(client_ip(&headers).as_deref(), Some("198.51.100.1"));
    }

    #[test]
    fn test_client_ip_absent() {
        assert!(client_ip(&HeaderMap::new()).is_none());
    }
}
