use sqlx::{postgres::PgPoolOptions, PgPool};

/// Owns the connection pool for the `expressions_of_interest` table.
/// The schema is applied out of band (see `schema.sql` at the repo root).
pub struct Database {
    pub pool: PgPool,
}

impl Database {
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;

        // Fail fast on an unreachable or misconfigured store
        sqlx::query("SELECT 1").execute(&pool).await?;

        Ok(Self { pool })
    }
}
