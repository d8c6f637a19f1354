//! Utility to inspect the database schema and print the service's table structures.

use dotenvy::dotenv;
use sqlx::postgres::PgPoolOptions;
use std::env;

const SERVICE_TABLES: [&str; 3] = ["roi_defaults", "strategic_benefits", "leads"];

/// Main entry point for the schema inspection utility.
///
/// Connects to the database and lists the columns of each service table,
/// flagging tables that have not been created yet.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    let database_url = env::var("DATABASE_URL")
        .or_else(|_| env::var("DB_URL"))
        .map_err(|_| "DATABASE_URL must be set")?;
    let pool = PgPoolOptions::new().connect(&database_url).await?;

    for table in SERVICE_TABLES {
        let columns: Vec<(String, String, String)> = sqlx::query_as(
            "SELECT column_name, data_type, is_nullable FROM information_schema.columns \
             WHERE table_schema = 'public' AND table_name = $1 ORDER BY ordinal_position",
        )
        .bind(table)
        .fetch_all(&pool)
        .await?;

        if columns.is_empty() {
            println!("- {} (missing)", table);
            println!();
            continue;
        }

        let rows: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
            .fetch_one(&pool)
            .await?;

        println!("- {} ({} rows)", table, rows);
        for (col, type_, nullable) in columns {
            let marker = if nullable == "YES" { "" } else { " not null" };
            println!("  - {}: {}{}", col, type_, marker);
        }
        println!();
    }

    Ok(())
}
