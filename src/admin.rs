use axum::{
    extract::{Query, State},
    http::HeaderMap,
    Json,
};
use std::sync::Arc;

use crate::config::Config;
use crate::errors::AppError;
use crate::handlers::AppState;
use crate::models::{AdminListParams, AdminListResponse, FilterOptions, Pagination};
use crate::repository::{clamped_limit, SubmissionRepository};

/// GET /api/admin/submissions
///
/// Paginated, filterable listing of stored submissions. The shared-secret
/// check runs before any store access; on mismatch the store is never
/// touched. The page, count and distinct-countries queries run without a
/// transactional snapshot, which is acceptable for an admin view.
pub async fn list_submissions(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(params): Query<AdminListParams>,
) -> Result<Json<AdminListResponse>, AppError> {
    authorize_admin(&state.config, &headers, params.api_key.as_deref())?;

    let repo = SubmissionRepository::new(state.db.clone());
    let (data, total) = repo.list(&params).await?;
    let countries = repo.distinct_countries().await?;

    Ok(Json(AdminListResponse {
        success: true,
        data,
        pagination: Pagination::new(params.page.max(1), clamped_limit(params.limit), total),
        filters: FilterOptions { countries },
    }))
}

/// Validate the admin shared secret from the X-API-Key header or the
/// api_key query parameter.
fn authorize_admin(
    config: &Config,
    headers: &HeaderMap,
    query_key: Option<&str>,
) -> Result<(), AppError> {
    let provided = headers
        .get("X-API-Key")
        .and_then(|v| v.to_str().ok())
        .or(query_key)
        .ok_or_else(|| {
            AppError::Unauthorized("Missing X-API-Key header or api_key parameter".to_string())
        })?;

    // Constant-time comparison to prevent timing attacks
    if !constant_time_compare(provided, &config.admin_api_key) {
        tracing::warn!("Invalid admin API key received");
        return Err(AppError::Unauthorized("Invalid API key".to_string()));
    }

    Ok(())
}

/// Constant-time string comparison (basic implementation)
/// For production, consider using a crypto library like `subtle`
fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    a.as_bytes()
        .iter()
        .zip(b.as_bytes().iter())
        .fold(0u8, |acc, (x, y)| acc | (x ^ y))
        == 0
}
