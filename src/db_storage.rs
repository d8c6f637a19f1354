use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde_json::json;
use sqlx::{PgPool, Postgres, QueryBuilder};
use std::str::FromStr;
use uuid::Uuid;

use crate::errors::{AppError, ResultExt};
use crate::form_input::parse_count_str;
use crate::models::{
    ExportFilters, Lead, LeadFilters, LeadPage, LeadStats, LeadStatus, NewLead,
    NewStrategicBenefit, RoiDefaultsRow, StrategicBenefit, StrategicBenefitPatch,
};
use crate::roi_calculator::{get_strategic_roi, RoiConfig};

/// Lead columns with NUMERIC figures cast for `f64` decoding.
const LEAD_COLUMNS: &str = "id, email, first_name, last_name, company_name, phone, \
    company_type, use_case, roi_model, fte_cost::float8 AS fte_cost, backfill_rate_type, \
    monthly_documents, annual_backfill, m_and_a_transactions_per_year, \
    avg_households_per_transaction, historical_households_to_migrate, annual_new_clients, \
    annual_investors_onboarded, monthly_hours_saved::float8 AS monthly_hours_saved, \
    annual_savings::float8 AS annual_savings, backfill_cost_saved::float8 AS backfill_cost_saved, \
    ftes_avoided::float8 AS ftes_avoided, strategic_benefits, utm_source, utm_medium, \
    utm_campaign, ip_address, user_agent, referrer, status, notes, created_at, updated_at, \
    contacted_at";

const SORTABLE_LEAD_COLUMNS: [&str; 5] = [
    "created_at",
    "email",
    "company_name",
    "status",
    "annual_savings",
];

const DEFAULT_PAGE_SIZE: u64 = 50;
const MAX_PAGE_SIZE: u64 = 500;

/// Two-decimal NUMERIC value. Non-finite figures are stored as NULL.
fn to_numeric(value: f64) -> Option<BigDecimal> {
    BigDecimal::from_str(&format!("{:.2}", value)).ok()
}

fn to_db_count(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Parses a `from`/`to` filter: RFC 3339 or a plain `YYYY-MM-DD` (midnight UTC).
pub fn parse_date_bound(raw: &str) -> Result<DateTime<Utc>, AppError> {
    let raw = raw.trim();
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d").map(|d| {
                DateTime::<Utc>::from_naive_utc_and_offset(d.and_time(NaiveTime::MIN), Utc)
            })
        })
        .map_err(|e| {
            AppError::BadRequest(format!(
                "Invalid date '{}': {}. Expected YYYY-MM-DD or RFC 3339",
                raw, e
            ))
        })
}

fn parse_optional_date(raw: &Option<String>) -> Result<Option<DateTime<Utc>>, AppError> {
    non_blank(raw).map(|r| parse_date_bound(&r)).transpose()
}

// ============ ROI defaults ============

/// Reads the singleton ROI defaults row.
#[derive(Clone)]
pub struct RoiDefaultsStore {
    pool: PgPool,
}

impl RoiDefaultsStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Stored defaults, or `None` when the row has not been seeded.
    pub async fn get(&self) -> Result<Option<RoiConfig>, AppError> {
        let row = sqlx::query_as::<_, RoiDefaultsRow>(
            r#"
            SELECT triage_time_per_doc,
                   data_entry_time_per_doc,
                   analyst_hourly_rate::float8 AS analyst_hourly_rate,
                   backfill_hourly_rate::float8 AS backfill_hourly_rate,
                   docs_per_household,
                   docs_per_client,
                   docs_per_investor,
                   data_utilization_baseline::float8 AS data_utilization_baseline,
                   roi_notes
            FROM roi_defaults
            WHERE id = 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await
        .context("loading ROI defaults")?;

        Ok(row.map(RoiConfig::from))
    }

    /// Stored defaults, falling back to the built-in configuration.
    pub async fn get_or_fallback(&self) -> Result<RoiConfig, AppError> {
        match self.get().await? {
            Some(config) => Ok(config),
            None => {
                tracing::warn!("roi_defaults not seeded, using built-in defaults");
                Ok(RoiConfig::default())
            }
        }
    }
}

// ============ Strategic benefits ============

/// CRUD over the admin-curated strategic benefits.
#[derive(Clone)]
pub struct StrategicBenefitsStore {
    pool: PgPool,
}

impl StrategicBenefitsStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Active benefit texts for a use case in display order.
    pub async fn active_texts_for(&self, use_case: &str) -> Result<Vec<String>, AppError> {
        sqlx::query_scalar::<_, String>(
            "SELECT benefit_text FROM strategic_benefits \
             WHERE use_case = $1 AND is_active = true \
             ORDER BY display_order, id",
        )
        .bind(use_case)
        .fetch_all(&self.pool)
        .await
        .with_context(|| format!("loading benefits for {}", use_case))
    }

    /// Curated benefits, or the built-in strategic list when none are active.
    pub async fn benefits_or_fallback(&self, use_case: &str) -> Result<Vec<String>, AppError> {
        let benefits = self.active_texts_for(use_case).await?;
        if !benefits.is_empty() {
            return Ok(benefits);
        }

        tracing::debug!("No curated benefits for {}, using built-in list", use_case);
        Ok(get_strategic_roi(use_case)
            .strategic
            .iter()
            .map(|s| s.to_string())
            .collect())
    }

    pub async fn list_all(&self) -> Result<Vec<StrategicBenefit>, AppError> {
        sqlx::query_as::<_, StrategicBenefit>(
            "SELECT * FROM strategic_benefits ORDER BY use_case, display_order, id",
        )
        .fetch_all(&self.pool)
        .await
        .context("listing strategic benefits")
    }

    pub async fn count_for(&self, use_case: &str) -> Result<i64, AppError> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM strategic_benefits WHERE use_case = $1")
            .bind(use_case)
            .fetch_one(&self.pool)
            .await
            .context("counting strategic benefits")
    }

    pub async fn get(&self, id: i32) -> Result<Option<StrategicBenefit>, AppError> {
        sqlx::query_as::<_, StrategicBenefit>("SELECT * FROM strategic_benefits WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("loading strategic benefit")
    }

    pub async fn create(&self, new: &NewStrategicBenefit) -> Result<StrategicBenefit, AppError> {
        sqlx::query_as::<_, StrategicBenefit>(
            r#"
            INSERT INTO strategic_benefits (use_case, benefit_text, display_order, is_active)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&new.use_case)
        .bind(new.benefit_text.trim())
        .bind(new.display_order.unwrap_or(0))
        .bind(new.is_active.unwrap_or(true))
        .fetch_one(&self.pool)
        .await
        .context("creating strategic benefit")
    }

    /// Applies the non-`None` fields of `patch`.
    pub async fn update(
        &self,
        id: i32,
        patch: &StrategicBenefitPatch,
    ) -> Result<Option<StrategicBenefit>, AppError> {
        sqlx::query_as::<_, StrategicBenefit>(
            r#"
            UPDATE strategic_benefits
            SET benefit_text = COALESCE($1, benefit_text),
                display_order = COALESCE($2, display_order),
                is_active = COALESCE($3, is_active),
                updated_at = NOW()
            WHERE id = $4
            RETURNING *
            "#,
        )
        .bind(patch.benefit_text.as_deref().map(str::trim))
        .bind(patch.display_order)
        .bind(patch.is_active)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("updating strategic benefit")
    }

    /// Returns whether a row was deleted.
    pub async fn delete(&self, id: i32) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM strategic_benefits WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("deleting strategic benefit")?;
        Ok(result.rows_affected() > 0)
    }

    /// Sets display order 1..n following `ordered_ids`. Ids belonging to
    /// another use case are left untouched.
    pub async fn reorder(&self, use_case: &str, ordered_ids: &[i32]) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await.context("starting reorder")?;

        for (position, id) in ordered_ids.iter().enumerate() {
            let display_order = i32::try_from(position + 1).unwrap_or(i32::MAX);
            sqlx::query(
                "UPDATE strategic_benefits SET display_order = $1, updated_at = NOW() \
                 WHERE id = $2 AND use_case = $3",
            )
            .bind(display_order)
            .bind(id)
            .bind(use_case)
            .execute(&mut *tx)
            .await
            .context("reordering strategic benefits")?;
        }

        tx.commit().await.context("committing reorder")?;
        tracing::info!("Reordered {} benefits for {}", ordered_ids.len(), use_case);
        Ok(())
    }
}

// ============ Leads ============

/// Persistence for captured leads.
#[derive(Clone)]
pub struct LeadStore {
    pool: PgPool,
}

impl LeadStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, lead: &NewLead) -> Result<Lead, AppError> {
        let query = format!(
            r#"
            INSERT INTO leads (
                id, email, first_name, last_name, company_name, phone,
                company_type, use_case, roi_model, fte_cost, backfill_rate_type,
                monthly_documents, annual_backfill,
                m_and_a_transactions_per_year, avg_households_per_transaction,
                historical_households_to_migrate, annual_new_clients, annual_investors_onboarded,
                monthly_hours_saved, annual_savings, backfill_cost_saved, ftes_avoided,
                strategic_benefits,
                utm_source, utm_medium, utm_campaign, ip_address, user_agent, referrer
            ) VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15,
                $16, $17, $18, $19, $20, $21, $22, $23, $24, $25, $26, $27, $28, $29
            )
            RETURNING {}
            "#,
            LEAD_COLUMNS
        );

        sqlx::query_as::<_, Lead>(&query)
            .bind(Uuid::new_v4())
            .bind(&lead.email)
            .bind(&lead.first_name)
            .bind(&lead.last_name)
            .bind(&lead.company_name)
            .bind(&lead.phone)
            .bind(&lead.company_type)
            .bind(&lead.use_case)
            .bind(&lead.roi_model)
            .bind(to_numeric(lead.fte_cost))
            .bind(&lead.backfill_rate_type)
            .bind(to_db_count(lead.monthly_documents))
            .bind(to_db_count(lead.annual_backfill))
            .bind(to_db_count(lead.m_and_a_transactions_per_year))
            .bind(to_db_count(lead.avg_households_per_transaction))
            .bind(to_db_count(lead.historical_households_to_migrate))
            .bind(to_db_count(lead.annual_new_clients))
            .bind(to_db_count(lead.annual_investors_onboarded))
            .bind(to_numeric(lead.monthly_hours_saved))
            .bind(to_numeric(lead.annual_savings))
            .bind(to_numeric(lead.backfill_cost_saved))
            .bind(to_numeric(lead.ftes_avoided))
            .bind(json!(lead.strategic_benefits))
            .bind(&lead.utm_source)
            .bind(&lead.utm_medium)
            .bind(&lead.utm_campaign)
            .bind(&lead.ip_address)
            .bind(&lead.user_agent)
            .bind(&lead.referrer)
            .fetch_one(&self.pool)
            .await
            .context("inserting lead")
    }

    /// Filtered, sorted, paginated lead list.
    pub async fn list(&self, filters: &LeadFilters) -> Result<LeadPage, AppError> {
        let bounds = DateBounds {
            from: parse_optional_date(&filters.from)?,
            to: parse_optional_date(&filters.to)?,
        };

        let sort = filters
            .sort
            .as_deref()
            .filter(|c| SORTABLE_LEAD_COLUMNS.contains(c))
            .unwrap_or("created_at");
        let order = if filters.order.as_deref() == Some("asc") {
            "ASC"
        } else {
            "DESC"
        };

        let limit = match filters.limit.as_deref().map(parse_count_str) {
            Some(0) | None => DEFAULT_PAGE_SIZE,
            Some(n) => n.min(MAX_PAGE_SIZE),
        };
        let page = match filters.page.as_deref().map(parse_count_str) {
            Some(0) | None => 1,
            Some(n) => n.min(i64::MAX as u64 / limit),
        };
        let offset = (page - 1) * limit;

        let mut query = QueryBuilder::<Postgres>::new(format!(
            "SELECT {} FROM leads WHERE 1=1",
            LEAD_COLUMNS
        ));
        push_lead_filters(&mut query, filters, &bounds);
        query.push(format!(" ORDER BY {} {}", sort, order));
        query.push(" LIMIT ").push_bind(to_db_count(limit));
        query.push(" OFFSET ").push_bind(to_db_count(offset));

        let leads = query
            .build_query_as::<Lead>()
            .fetch_all(&self.pool)
            .await
            .context("listing leads")?;

        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM leads WHERE 1=1");
        push_lead_filters(&mut count, filters, &bounds);
        let total = count
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .context("counting leads")?;

        let limit = to_db_count(limit);
        Ok(LeadPage {
            leads,
            total,
            page: to_db_count(page),
            pages: (total + limit - 1) / limit,
        })
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<Lead>, AppError> {
        sqlx::query_as::<_, Lead>(&format!("SELECT {} FROM leads WHERE id = $1", LEAD_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("loading lead")
    }

    /// Updates status and/or notes. Moving to `contacted` stamps `contacted_at`.
    pub async fn update(
        &self,
        id: Uuid,
        status: Option<LeadStatus>,
        notes: Option<&str>,
    ) -> Result<Option<Lead>, AppError> {
        let mut query = QueryBuilder::<Postgres>::new("UPDATE leads SET updated_at = NOW()");

        if let Some(status) = status {
            query.push(", status = ").push_bind(status.as_str());
            if status == LeadStatus::Contacted {
                query.push(", contacted_at = NOW()");
            }
        }
        if let Some(notes) = notes {
            query.push(", notes = ").push_bind(notes.to_string());
        }

        query.push(" WHERE id = ").push_bind(id);
        query.push(format!(" RETURNING {}", LEAD_COLUMNS));

        query
            .build_query_as::<Lead>()
            .fetch_optional(&self.pool)
            .await
            .context("updating lead")
    }

    /// Returns whether a row was deleted.
    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM leads WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("deleting lead")?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn stats(&self) -> Result<LeadStats, AppError> {
        let (total_leads, new_leads, this_week, this_month): (i64, i64, i64, i64) =
            sqlx::query_as(
                r#"
                SELECT
                    COUNT(*),
                    COUNT(*) FILTER (WHERE status = 'new'),
                    COUNT(*) FILTER (WHERE created_at >= NOW() - INTERVAL '7 days'),
                    COUNT(*) FILTER (WHERE created_at >= DATE_TRUNC('month', NOW()))
                FROM leads
                "#,
            )
            .fetch_one(&self.pool)
            .await
            .context("counting lead totals")?;

        let by_company_type: Vec<(String, i64)> = sqlx::query_as(
            "SELECT company_type, COUNT(*) FROM leads \
             WHERE company_type IS NOT NULL GROUP BY company_type",
        )
        .fetch_all(&self.pool)
        .await
        .context("counting leads by company type")?;

        let by_use_case: Vec<(String, i64)> = sqlx::query_as(
            "SELECT use_case, COUNT(*) FROM leads WHERE use_case IS NOT NULL GROUP BY use_case",
        )
        .fetch_all(&self.pool)
        .await
        .context("counting leads by use case")?;

        Ok(LeadStats {
            total_leads,
            new_leads,
            this_week,
            this_month,
            by_company_type: by_company_type.into_iter().collect(),
            by_use_case: by_use_case.into_iter().collect(),
        })
    }

    /// Leads for CSV export, newest first.
    pub async fn export_rows(&self, filters: &ExportFilters) -> Result<Vec<Lead>, AppError> {
        let lead_filters = LeadFilters {
            status: filters.status.clone(),
            from: filters.from.clone(),
            to: filters.to.clone(),
            ..Default::default()
        };
        let bounds = DateBounds {
            from: parse_optional_date(&filters.from)?,
            to: parse_optional_date(&filters.to)?,
        };

        let mut query = QueryBuilder::<Postgres>::new(format!(
            "SELECT {} FROM leads WHERE 1=1",
            LEAD_COLUMNS
        ));
        push_lead_filters(&mut query, &lead_filters, &bounds);
        query.push(" ORDER BY created_at DESC");

        query
            .build_query_as::<Lead>()
            .fetch_all(&self.pool)
            .await
            .context("exporting leads")
    }
}

struct DateBounds {
    from: Option<DateTime<Utc>>,
    to: Option<DateTime<Utc>>,
}

fn push_lead_filters(query: &mut QueryBuilder<'_, Postgres>, filters: &LeadFilters, bounds: &DateBounds) {
    if let Some(status) = non_blank(&filters.status) {
        query.push(" AND status = ").push_bind(status);
    }
    if let Some(company_type) = non_blank(&filters.company_type) {
        query.push(" AND company_type = ").push_bind(company_type);
    }
    if let Some(use_case) = non_blank(&filters.use_case) {
        query.push(" AND use_case = ").push_bind(use_case);
    }
    if let Some(search) = non_blank(&filters.search) {
        let pattern = format!("%{}%", search);
        query.push(" AND (email ILIKE ").push_bind(pattern.clone());
        query.push(" OR company_name ILIKE ").push_bind(pattern.clone());
        query.push(" OR first_name ILIKE ").push_bind(pattern.clone());
        query.push(" OR last_name ILIKE ").push_bind(pattern);
        query.push(")");
    }
    if let Some(from) = bounds.from {
        query.push(" AND created_at >= ").push_bind(from);
    }
    if let Some(to) = bounds.to {
        query.push(" AND created_at <= ").push_bind(to);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_to_numeric_two_decimals() {
        assert_eq!(to_numeric(166.666).unwrap().to_string(), "166.67");
        assert_eq!(to_numeric(85000.0).unwrap().to_string(), "85000.00");
        assert!(to_numeric(f64::NAN).is_none());
    }

    #[test]
    fn test_to_db_count_saturates() {
        assert_eq!(to_db_count(42), 42);
        assert_eq!(to_db_count(u64::MAX), i64::MAX);
    }

    #[test]
    fn test_parse_date_bound() {
        assert_eq!(
            parse_date_bound("2026-03-01").unwrap(),
            Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap()
        );
        assert_eq!(
            parse_date_bound("2026-03-01T12:30:00-05:00").unwrap(),
            Utc.with_ymd_and_hms(2026, 3, 1, 17, 30, 0).unwrap()
        );
        assert!(matches!(
            parse_date_bound("last tuesday"),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn test_blank_filters_are_ignored() {
        let filters = LeadFilters {
            status: Some("  ".to_string()),
            search: Some("acme".to_string()),
            ..Default::default()
        };
        let bounds = DateBounds {
            from: None,
            to: None,
        };
        let mut query = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM leads WHERE 1=1");
        push_lead_filters(&mut query, &filters, &bounds);
        let sql = query.sql();
        assert!(!sql.contains("status ="));
        assert!(sql.contains("email ILIKE $1"));
        assert!(sql.contains("last_name ILIKE $4"));
    }
}
