use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::roi_calculator::{RoiConfig, RoiModel};

// ============ Database Models ============

/// Singleton `roi_defaults` row. Rates are selected as `float8`.
#[derive(Debug, Clone, FromRow)]
pub struct RoiDefaultsRow {
    pub triage_time_per_doc: Option<i32>,
    pub data_entry_time_per_doc: Option<i32>,
    pub analyst_hourly_rate: Option<f64>,
    pub backfill_hourly_rate: Option<f64>,
    pub docs_per_household: Option<i32>,
    pub docs_per_client: Option<i32>,
    pub docs_per_investor: Option<i32>,
    pub data_utilization_baseline: Option<f64>,
    pub roi_notes: Option<String>,
}

impl From<RoiDefaultsRow> for RoiConfig {
    /// NULL or negative columns take the built-in fallback values. Rates
    /// must also be non-zero.
    fn from(row: RoiDefaultsRow) -> Self {
        let fallback = RoiConfig::default();
        let count = |value: Option<i32>, default: u32| {
            value.and_then(|v| u32::try_from(v).ok()).unwrap_or(default)
        };
        let rate = |value: Option<f64>, default: f64| {
            value.filter(|r| r.is_finite() && *r > 0.0).unwrap_or(default)
        };

        RoiConfig {
            triage_time_per_doc: count(row.triage_time_per_doc, fallback.triage_time_per_doc),
            data_entry_time_per_doc: count(
                row.data_entry_time_per_doc,
                fallback.data_entry_time_per_doc,
            ),
            analyst_hourly_rate: rate(row.analyst_hourly_rate, fallback.analyst_hourly_rate),
            backfill_hourly_rate: rate(row.backfill_hourly_rate, fallback.backfill_hourly_rate),
            docs_per_household: count(row.docs_per_household, fallback.docs_per_household),
            docs_per_client: count(row.docs_per_client, fallback.docs_per_client),
            docs_per_investor: count(row.docs_per_investor, fallback.docs_per_investor),
            data_utilization_baseline: row.data_utilization_baseline,
            roi_notes: row.roi_notes,
        }
    }
}

/// Admin-curated narrative line for a use case.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct StrategicBenefit {
    pub id: i32,
    pub use_case: String,
    pub benefit_text: String,
    pub display_order: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Triage state of a lead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadStatus {
    New,
    Contacted,
    Qualified,
    Converted,
    Lost,
}

impl LeadStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LeadStatus::New => "new",
            LeadStatus::Contacted => "contacted",
            LeadStatus::Qualified => "qualified",
            LeadStatus::Converted => "converted",
            LeadStatus::Lost => "lost",
        }
    }
}

impl fmt::Display for LeadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LeadStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(LeadStatus::New),
            "contacted" => Ok(LeadStatus::Contacted),
            "qualified" => Ok(LeadStatus::Qualified),
            "converted" => Ok(LeadStatus::Converted),
            "lost" => Ok(LeadStatus::Lost),
            other => Err(format!("Invalid lead status '{}'", other)),
        }
    }
}

/// A persisted lead. Numeric figures are selected as `float8`.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Lead {
    pub id: Uuid,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub company_name: Option<String>,
    pub phone: Option<String>,
    pub company_type: Option<String>,
    pub use_case: Option<String>,
    pub roi_model: Option<String>,
    pub fte_cost: Option<f64>,
    pub backfill_rate_type: Option<String>,
    pub monthly_documents: Option<i64>,
    pub annual_backfill: Option<i64>,
    pub m_and_a_transactions_per_year: Option<i64>,
    pub avg_households_per_transaction: Option<i64>,
    pub historical_households_to_migrate: Option<i64>,
    pub annual_new_clients: Option<i64>,
    pub annual_investors_onboarded: Option<i64>,
    pub monthly_hours_saved: Option<f64>,
    pub annual_savings: Option<f64>,
    pub backfill_cost_saved: Option<f64>,
    pub ftes_avoided: Option<f64>,
    pub strategic_benefits: Option<Value>,
    pub utm_source: Option<String>,
    pub utm_medium: Option<String>,
    pub utm_campaign: Option<String>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub referrer: Option<String>,
    pub status: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub contacted_at: Option<DateTime<Utc>>,
}

/// Everything the calculate flow writes for a new lead.
#[derive(Debug, Clone, Default)]
pub struct NewLead {
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub company_name: Option<String>,
    pub phone: Option<String>,
    pub company_type: Option<String>,
    pub use_case: String,
    pub roi_model: String,
    pub fte_cost: f64,
    pub backfill_rate_type: String,
    pub monthly_documents: u64,
    pub annual_backfill: u64,
    pub m_and_a_transactions_per_year: u64,
    pub avg_households_per_transaction: u64,
    pub historical_households_to_migrate: u64,
    pub annual_new_clients: u64,
    pub annual_investors_onboarded: u64,
    pub monthly_hours_saved: f64,
    pub annual_savings: f64,
    pub backfill_cost_saved: f64,
    pub ftes_avoided: f64,
    pub strategic_benefits: Vec<String>,
    pub utm_source: Option<String>,
    pub utm_medium: Option<String>,
    pub utm_campaign: Option<String>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub referrer: Option<String>,
}

// ============ Public API Models ============

/// Raw calculator form submission. Numeric fields stay loosely typed until
/// [`crate::form_input`] coerces them.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CalculateRequest {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub company_name: Option<String>,
    pub phone: Option<String>,

    pub company_type: Option<String>,
    pub use_case: Option<String>,
    pub roi_model: Option<String>,
    pub backfill_rate_type: Option<String>,
    pub fte_cost: Option<Value>,

    pub monthly_documents: Option<Value>,
    pub annual_backfill: Option<Value>,
    pub m_and_a_transactions_per_year: Option<Value>,
    pub avg_households_per_transaction: Option<Value>,
    pub historical_households_to_migrate: Option<Value>,
    pub annual_new_clients: Option<Value>,
    pub annual_investors_onboarded: Option<Value>,

    /// Per-calculation overrides of the stored ROI defaults.
    pub roi_config: Option<RoiConfigOverrideRequest>,

    pub utm_source: Option<String>,
    pub utm_medium: Option<String>,
    pub utm_campaign: Option<String>,
}

/// Loosely typed ROI config overrides as submitted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RoiConfigOverrideRequest {
    pub triage_time_per_doc: Option<Value>,
    pub data_entry_time_per_doc: Option<Value>,
    pub analyst_hourly_rate: Option<Value>,
    pub backfill_hourly_rate: Option<Value>,
    pub docs_per_household: Option<Value>,
    pub docs_per_client: Option<Value>,
    pub docs_per_investor: Option<Value>,
    pub data_utilization_baseline: Option<Value>,
    pub roi_notes: Option<String>,
}

/// Result payload shown to the prospect. Persistence-only figures such as
/// the derived document counts are deliberately absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicRoiResults {
    pub monthly_hours_saved: f64,
    pub annual_savings: f64,
    pub annual_recurring_savings: f64,
    pub backfill_cost_saved: f64,
    pub ftes_avoided: f64,
    pub hours_per_unit: f64,
    pub unit_label: String,
    pub roi_model: RoiModel,
    pub strategic_benefits: Vec<String>,
    pub use_case_label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_type_label: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CalculateResponse {
    pub success: bool,
    pub results: PublicRoiResults,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BenefitsResponse {
    pub benefits: Vec<String>,
}

// ============ Admin API Models ============

#[derive(Debug, Deserialize)]
pub struct AdminLoginRequest {
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AuthStatusResponse {
    #[serde(rename = "isAuthenticated")]
    pub is_authenticated: bool,
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Query string of the lead list. Paging values are parsed leniently.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LeadFilters {
    pub status: Option<String>,
    pub company_type: Option<String>,
    pub use_case: Option<String>,
    pub search: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub sort: Option<String>,
    pub order: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExportFilters {
    pub status: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LeadPage {
    pub leads: Vec<Lead>,
    pub total: i64,
    pub page: i64,
    pub pages: i64,
}

#[derive(Debug, Deserialize)]
pub struct LeadUpdate {
    pub status: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Default, Serialize)]
pub struct LeadStats {
    pub total_leads: i64,
    pub new_leads: i64,
    pub this_week: i64,
    pub this_month: i64,
    pub by_company_type: BTreeMap<String, i64>,
    pub by_use_case: BTreeMap<String, i64>,
}

#[derive(Debug, Deserialize)]
pub struct NewStrategicBenefit {
    pub use_case: String,
    pub benefit_text: String,
    pub display_order: Option<i32>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
pub struct StrategicBenefitPatch {
    pub benefit_text: Option<String>,
    pub display_order: Option<i32>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct ReorderBenefitsRequest {
    pub use_case: String,
    pub ordered_ids: Vec<i32>,
}
