use sqlx::{postgres::PgPoolOptions, PgPool};

const SCHEMA_SQL: &str = include_str!("../db/schema.sql");

pub struct Database {
    pub pool: PgPool,
}

impl Database {
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;

        sqlx::query("SELECT 1").execute(&pool).await?;

        Ok(Self { pool })
    }

    /// Applies `db/schema.sql`. Every statement is idempotent.
    pub async fn initialize_schema(&self) -> anyhow::Result<()> {
        sqlx::raw_sql(SCHEMA_SQL).execute(&self.pool).await?;
        tracing::info!("Database schema initialized successfully");
        Ok(())
    }
}
