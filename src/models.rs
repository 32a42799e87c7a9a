use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One stored expression of interest.
///
/// Rows are insert-only: `id` and `submitted_at` are assigned by the store
/// and never change, and no update or delete path exists.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Submission {
    pub id: i64,
    pub title: Option<String>,
    pub name: String,
    pub email: String,
    pub country: String,
    pub submitted_at: DateTime<Utc>,
}

/// Incoming form payload for `POST /api/interest`.
///
/// Required fields are `Option` so missing and empty values share one
/// validation path instead of failing at deserialization with an opaque 422.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitInterestRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    /// Client-side Turnstile challenge token, absent on localhost/testing.
    #[serde(default, rename = "cf-turnstile-response")]
    pub turnstile_token: Option<String>,
}

/// A submission that passed validation, normalized and ready to insert.
#[derive(Debug, Clone)]
pub struct NewSubmission {
    pub title: Option<String>,
    pub name: String,
    pub email: String,
    pub country: String,
}

#[derive(Debug, Serialize)]
pub struct SubmitInterestResponse {
    pub success: bool,
    pub message: String,
    pub id: i64,
}

/// Query parameters accepted by the admin listing endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct AdminListParams {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
    /// Case-insensitive substring match over name OR email.
    #[serde(default)]
    pub search: Option<String>,
    /// Exact country match.
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default = "default_sort_by", rename = "sortBy")]
    pub sort_by: String,
    #[serde(default = "default_sort_order", rename = "sortOrder")]
    pub sort_order: String,
    /// Alternative to the X-API-Key header.
    #[serde(default)]
    pub api_key: Option<String>,
}

fn default_page() -> i64 {
    1
}

fn default_limit() -> i64 {
    50
}

fn default_sort_by() -> String {
    "submitted_at".to_string()
}

fn default_sort_order() -> String {
    "DESC".to_string()
}

#[derive(Debug, Serialize)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    #[serde(rename = "totalPages")]
    pub total_pages: i64,
}

impl Pagination {
    /// `limit` must be >= 1 (the repository clamps it before queries run).
    pub fn new(page: i64, limit: i64, total: i64) -> Self {
        Self {
            page,
            limit,
            total,
            total_pages: (total + limit - 1) / limit,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct FilterOptions {
    pub countries: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct AdminListResponse {
    pub success: bool,
    pub data: Vec<Submission>,
    pub pagination: Pagination,
    pub filters: FilterOptions,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_submit_request_with_turnstile_token() {
        let json = r#"
        {
            "title": "Dr",
            "name": "Ada Lovelace",
            "email": "ada@example.com",
            "country": "United Kingdom",
            "cf-turnstile-response": "tok_123"
        }
        "#;

        let req: SubmitInterestRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.name.as_deref(), Some("Ada Lovelace"));
        assert_eq!(req.turnstile_token.as_deref(), Some("tok_123"));
    }

    #[test]
    fn test_parse_submit_request_minimal() {
        let json = r#"{"name": "Bob", "email": "bob@example.com", "country": "Ireland"}"#;

        let req: SubmitInterestRequest = serde_json::from_str(json).unwrap();
        assert!(req.title.is_none());
        assert!(req.turnstile_token.is_none());
    }

    #[test]
    fn test_admin_params_defaults() {
        let params: AdminListParams = serde_json::from_str("{}").unwrap();
        assert_eq!(params.page, 1);
        assert_eq!(params.limit, 50);
        assert_eq!(params.sort_by, "submitted_at");
        assert_eq!(params.sort_order, "DESC");
        assert!(params.search.is_none());
        assert!(params.country.is_none());
    }

    #[test]
    fn test_admin_params_renamed_fields() {
        let params: AdminListParams =
            serde_json::from_str(r#"{"sortBy": "name", "sortOrder": "ASC"}"#).unwrap();
        assert_eq!(params.sort_by, "name");
        assert_eq!(params.sort_order, "ASC");
    }

    #[test]
    fn test_pagination_total_pages_rounds_up() {
        assert_eq!(Pagination::new(2, 10, 25).total_pages, 3);
        assert_eq!(Pagination::new(1, 10, 30).total_pages, 3);
        assert_eq!(Pagination::new(1, 50, 0).total_pages, 0);
        assert_eq!(Pagination::new(1, 50, 1).total_pages, 1);
    }
}
