use sqlx::PgPool;

use crate::errors::{AppError, ResultExt};
use crate::models::{AdminListParams, NewSubmission, Submission};

/// Columns a caller may sort the admin listing by. Anything else silently
/// falls back to `submitted_at`; the sort column is the only user-influenced
/// fragment interpolated into query text, so it must come from this set.
const SORTABLE_COLUMNS: [&str; 5] = ["id", "name", "email", "country", "submitted_at"];

/// Upper bound on page size, so one request cannot drag an arbitrary slice
/// of the table through the pool.
const MAX_PAGE_SIZE: i64 = 200;

pub fn sort_column(requested: &str) -> &'static str {
    SORTABLE_COLUMNS
        .iter()
        .find(|col| **col == requested)
        .copied()
        .unwrap_or("submitted_at")
}

pub fn sort_direction(requested: &str) -> &'static str {
    if requested.eq_ignore_ascii_case("ASC") {
        "ASC"
    } else {
        "DESC"
    }
}

pub fn clamped_limit(limit: i64) -> i64 {
    limit.clamp(1, MAX_PAGE_SIZE)
}

pub fn page_offset(page: i64, limit: i64) -> i64 {
    (page.max(1) - 1).saturating_mul(limit)
}

/// Build the page and count statements for a filtered listing.
///
/// Search and country values are bound (`$1`, `$2`, ...); only the
/// allow-listed sort column/direction are interpolated. Returns
/// `(page_sql, count_sql)` with limit/offset as the two trailing binds of
/// the page statement.
fn list_queries(
    has_search: bool,
    has_country: bool,
    sort_by: &str,
    sort_order: &str,
) -> (String, String) {
    let mut conditions: Vec<String> = Vec::new();
    let mut next_bind = 1;

    if has_search {
        conditions.push(format!(
            "(name ILIKE ${i} OR email ILIKE ${i})",
            i = next_bind
        ));
        next_bind += 1;
    }
    if has_country {
        conditions.push(format!("country = ${}", next_bind));
        next_bind += 1;
    }

    let where_sql = if conditions.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", conditions.join(" AND "))
    };

    let page_sql = format!(
        "SELECT id, title, name, email, country, submitted_at \
         FROM expressions_of_interest{} ORDER BY {} {} LIMIT ${} OFFSET ${}",
        where_sql,
        sort_column(sort_by),
        sort_direction(sort_order),
        next_bind,
        next_bind + 1
    );
    let count_sql = format!(
        "SELECT COUNT(*) FROM expressions_of_interest{}",
        where_sql
    );

    (page_sql, count_sql)
}

/// Persistence over the `expressions_of_interest` table.
pub struct SubmissionRepository {
    pool: PgPool,
}

impl SubmissionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert one submission. The store assigns `id` and `submitted_at`.
    ///
    /// The base schema has no uniqueness constraint on `email` — duplicate
    /// submissions are independent rows. If a deployment adds one, the
    /// violation surfaces as `ConstraintViolation` via the `From` impl.
    pub async fn insert(&self, new: &NewSubmission) -> Result<Submission, AppError> {
        let submission = sqlx::query_as::<_, Submission>(
            "INSERT INTO expressions_of_interest (title, name, email, country) \
             VALUES ($1, $2, $3, $4) \
             RETURNING id, title, name, email, country, submitted_at",
        )
        .bind(&new.title)
        .bind(&new.name)
        .bind(&new.email)
        .bind(&new.country)
        .fetch_one(&self.pool)
        .await?;

        Ok(submission)
    }

    /// Fetch one page of submissions plus the total count matching the
    /// filters (pagination ignored), for building page metadata.
    ///
    /// The count and page statements run sequentially without a snapshot;
    /// under concurrent writes they may observe slightly different states,
    /// which is acceptable for an admin view.
    pub async fn list(
        &self,
        params: &AdminListParams,
    ) -> Result<(Vec<Submission>, i64), AppError> {
        let search = params.search.as_deref().filter(|s| !s.is_empty());
        let country = params.country.as_deref().filter(|s| !s.is_empty());

        let limit = clamped_limit(params.limit);
        let offset = page_offset(params.page, limit);

        let (page_sql, count_sql) = list_queries(
            search.is_some(),
            country.is_some(),
            &params.sort_by,
            &params.sort_order,
        );

        let mut page_query = sqlx::query_as::<_, Submission>(&page_sql);
        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);

        if let Some(term) = search {
            let pattern = format!("%{}%", term);
            page_query = page_query.bind(pattern.clone());
            count_query = count_query.bind(pattern);
        }
        if let Some(country) = country {
            page_query = page_query.bind(country.to_string());
            count_query = count_query.bind(country.to_string());
        }

        let rows = page_query
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .context("Failed to fetch submissions page")?;

        let total = count_query
            .fetch_one(&self.pool)
            .await
            .context("Failed to count submissions")?;

        Ok((rows, total))
    }

    /// Distinct non-empty country values, ascending, for the admin filter
    /// widget.
    pub async fn distinct_countries(&self) -> Result<Vec<String>, AppError> {
        let countries = sqlx::query_scalar::<_, String>(
            "SELECT DISTINCT country FROM expressions_of_interest \
             WHERE country <> '' ORDER BY country ASC",
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to fetch distinct countries")?;

        Ok(countries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_column_allow_list() {
        assert_eq!(sort_column("name"), "name");
        assert_eq!(sort_column("id"), "id");
        assert_eq!(sort_column("submitted_at"), "submitted_at");
        // Anything off the allow-list falls back silently
        assert_eq!(sort_column("DROP TABLE"), "submitted_at");
        assert_eq!(sort_column("submitted_at; --"), "submitted_at");
        assert_eq!(sort_column(""), "submitted_at");
    }

    #[test]
    fn test_sort_direction_fallback() {
        assert_eq!(sort_direction("ASC"), "ASC");
        assert_eq!(sort_direction("asc"), "ASC");
        assert_eq!(sort_direction("DESC"), "DESC");
        assert_eq!(sort_direction("sideways"), "DESC");
    }

    #[test]
    fn test_limit_clamped() {
        assert_eq!(clamped_limit(50), 50);
        assert_eq!(clamped_limit(0), 1);
        assert_eq!(clamped_limit(-5), 1);
        assert_eq!(clamped_limit(10_000), 200);
    }

    #[test]
    fn test_page_offset_is_one_based() {
        assert_eq!(page_offset(1, 50), 0);
        assert_eq!(page_offset(2, 10), 10);
        assert_eq!(page_offset(0, 10), 0);
        assert_eq!(page_offset(-3, 10), 0);
    }

    #[test]
    fn test_list_queries_no_filters() {
        let (page_sql, count_sql) = list_queries(false, false, "submitted_at", "DESC");
        assert!(page_sql.contains("ORDER BY submitted_at DESC LIMIT $1 OFFSET $2"));
        assert!(!page_sql.contains("WHERE"));
        assert_eq!(count_sql, "SELECT COUNT(*) FROM expressions_of_interest");
    }

    #[test]
    fn test_list_queries_bind_numbering() {
        let (page_sql, count_sql) = list_queries(true, true, "name", "asc");
        assert!(page_sql.contains("(name ILIKE $1 OR email ILIKE $1)"));
        assert!(page_sql.contains("country = $2"));
        assert!(page_sql.contains("ORDER BY name ASC LIMIT $3 OFFSET $4"));
        assert!(count_sql.contains("(name ILIKE $1 OR email ILIKE $1)"));
        assert!(count_sql.contains("country = $2"));
    }

    #[test]
    fn test_list_queries_injection_attempt_uses_fallback_column() {
        let (page_sql, _) = list_queries(false, false, "id; DROP TABLE students", "DESC");
        assert!(page_sql.contains("ORDER BY submitted_at DESC"));
        assert!(!page_sql.contains("DROP TABLE"));
    }

    #[test]
    fn test_list_queries_country_only_numbering() {
        let (page_sql, _) = list_queries(false, true, "country", "ASC");
        assert!(page_sql.contains("country = $1"));
        assert!(page_sql.contains("LIMIT $2 OFFSET $3"));
    }
}
