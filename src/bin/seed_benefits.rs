//! Seeds the strategic benefits CMS from the built-in narrative lists.

use dotenvy::dotenv;
use sqlx::postgres::PgPoolOptions;
use std::env;

use roi_lead_api::db_storage::StrategicBenefitsStore;
use roi_lead_api::models::NewStrategicBenefit;
use roi_lead_api::roi_calculator::UseCase;

/// Main entry point for the seeding script.
///
/// Use cases that already have rows are skipped, so admin edits are never
/// overwritten and the script can be rerun safely.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();

    tracing_subscriber::fmt::init();

    let database_url = env::var("DATABASE_URL")
        .or_else(|_| env::var("DB_URL"))
        .map_err(|_| "DATABASE_URL must be set")?;
    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&database_url)
        .await?;

    let store = StrategicBenefitsStore::new(pool);
    let mut inserted = 0;

    for use_case in UseCase::ALL {
        let existing = store.count_for(use_case.as_str()).await?;
        if existing > 0 {
            tracing::info!("{}: {} benefits present, skipping", use_case, existing);
            continue;
        }

        for (position, text) in use_case.strategic_roi().strategic.iter().enumerate() {
            let benefit = NewStrategicBenefit {
                use_case: use_case.as_str().to_string(),
                benefit_text: text.to_string(),
                display_order: Some(i32::try_from(position + 1)?),
                is_active: Some(true),
            };
            store.create(&benefit).await?;
            inserted += 1;
        }
        tracing::info!("{}: seeded built-in benefits", use_case);
    }

    tracing::info!("Seeding complete. Inserted {} benefits.", inserted);

    Ok(())
}
