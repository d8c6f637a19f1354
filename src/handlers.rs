use axum::{
    extract::{ConnectInfo, Path, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde_json::json;
use sqlx::PgPool;
use std::net::SocketAddr;
use std::sync::Arc;

use crate::config::Config;
use crate::db_storage::{LeadStore, RoiDefaultsStore, StrategicBenefitsStore};
use crate::errors::AppError;
use crate::form_input::coerce_tag;
use crate::models::{
    BenefitsResponse, CalculateRequest, CalculateResponse, NewLead, PublicRoiResults,
};
use crate::roi_calculator::{
    calculate_roi, company_type_label, merge_roi_config, RoiConfig, RoiResult, UseCaseTag,
};
use crate::session::SessionStore;
use crate::validation::{is_valid_email, normalize_phone};

/// Application state shared across all handlers.
pub struct AppState {
    /// Database connection pool.
    pub db: PgPool,
    /// Application configuration.
    pub config: Config,
    /// Live admin sessions.
    pub sessions: SessionStore,
}

impl AppState {
    pub fn roi_defaults(&self) -> RoiDefaultsStore {
        RoiDefaultsStore::new(self.db.clone())
    }

    pub fn benefits(&self) -> StrategicBenefitsStore {
        StrategicBenefitsStore::new(self.db.clone())
    }

    pub fn leads(&self) -> LeadStore {
        LeadStore::new(self.db.clone())
    }
}

/// Health check endpoint.
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}

/// GET /api/roi-defaults
///
/// Stored ROI defaults, or the built-in configuration when the row is missing.
pub async fn get_roi_defaults(
    State(state): State<Arc<AppState>>,
) -> Result<Json<RoiConfig>, AppError> {
    let config = state.roi_defaults().get_or_fallback().await?;
    Ok(Json(config))
}

/// GET /api/strategic-benefits/:use_case
pub async fn get_strategic_benefits(
    State(state): State<Arc<AppState>>,
    Path(use_case): Path<String>,
) -> Result<Json<BenefitsResponse>, AppError> {
    let benefits = state.benefits().benefits_or_fallback(&use_case).await?;
    Ok(Json(BenefitsResponse { benefits }))
}

/// POST /api/calculate
///
/// Validates the contact fields, runs the ROI engine against the stored
/// defaults (plus any per-request overrides), records the lead and returns
/// the prospect-facing results.
pub async fn calculate(
    State(state): State<Arc<AppState>>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    Json(request): Json<CalculateRequest>,
) -> Result<Json<CalculateResponse>, AppError> {
    let email = coerce_tag(request.email.as_deref())
        .ok_or_else(|| AppError::BadRequest("Email is required".to_string()))?;
    if !is_valid_email(email) {
        return Err(AppError::BadRequest("Invalid email address".to_string()));
    }
    let use_case = request
        .use_case_tag()
        .ok_or_else(|| AppError::BadRequest("Use case is required".to_string()))?;

    tracing::info!("Calculating ROI for use case {}", use_case.as_str());

    let defaults = state.roi_defaults().get_or_fallback().await?;
    let overrides = request.roi_config.as_ref().map(|r| r.to_override());
    let config = merge_roi_config(&defaults, overrides.as_ref());

    let inputs = request.calculation_inputs();
    let result = calculate_roi(&inputs, &config)
        .ok_or_else(|| AppError::BadRequest("Unable to calculate ROI".to_string()))?;

    if let UseCaseTag::Unknown(raw) = &use_case {
        tracing::warn!("Unknown use case '{}', returning degraded result", raw);
    }

    let strategic_benefits = state.benefits().benefits_or_fallback(use_case.as_str()).await?;

    let peer = connect_info.map(|ConnectInfo(addr)| addr);
    let company_type = coerce_tag(request.company_type.as_deref()).map(str::to_string);

    let new_lead = NewLead {
        email: email.to_string(),
        first_name: trimmed(&request.first_name),
        last_name: trimmed(&request.last_name),
        company_name: trimmed(&request.company_name),
        phone: request.phone.as_deref().and_then(normalize_phone),
        company_type: company_type.clone(),
        use_case: use_case.as_str().to_string(),
        roi_model: result.roi_model.as_str().to_string(),
        fte_cost: result.fte_cost,
        backfill_rate_type: result.backfill_rate_type.as_str().to_string(),
        monthly_documents: result.derived_monthly_documents,
        annual_backfill: result.derived_annual_backfill,
        m_and_a_transactions_per_year: inputs.m_and_a_transactions_per_year,
        avg_households_per_transaction: inputs.avg_households_per_transaction,
        historical_households_to_migrate: inputs.historical_households_to_migrate,
        annual_new_clients: inputs.annual_new_clients,
        annual_investors_onboarded: inputs.annual_investors_onboarded,
        monthly_hours_saved: result.monthly_hours_saved,
        annual_savings: result.annual_savings,
        backfill_cost_saved: result.backfill_cost_saved,
        ftes_avoided: result.ftes_avoided,
        strategic_benefits: strategic_benefits.clone(),
        utm_source: trimmed(&request.utm_source),
        utm_medium: trimmed(&request.utm_medium),
        utm_campaign: trimmed(&request.utm_campaign),
        ip_address: client_ip(&headers, peer),
        user_agent: header_text(&headers, "user-agent"),
        referrer: header_text(&headers, "referer").or_else(|| header_text(&headers, "referrer")),
    };

    let lead = state.leads().create(&new_lead).await?;
    tracing::info!(
        "Lead {} captured: annual savings {:.2}",
        lead.id,
        result.annual_savings
    );

    Ok(Json(CalculateResponse {
        success: true,
        results: public_results(
            &result,
            &use_case,
            company_type.as_deref(),
            strategic_benefits,
        ),
    }))
}

/// Prospect-facing subset of an engine result.
pub fn public_results(
    result: &RoiResult,
    use_case: &UseCaseTag,
    company_type: Option<&str>,
    strategic_benefits: Vec<String>,
) -> PublicRoiResults {
    PublicRoiResults {
        monthly_hours_saved: result.monthly_hours_saved,
        annual_savings: result.annual_savings,
        annual_recurring_savings: result.annual_recurring_savings,
        backfill_cost_saved: result.backfill_cost_saved,
        ftes_avoided: result.ftes_avoided,
        hours_per_unit: result.hours_per_unit,
        unit_label: result.unit_label.to_string(),
        roi_model: result.roi_model,
        strategic_benefits,
        use_case_label: use_case.label().to_string(),
        company_type_label: company_type.map(|c| company_type_label(c).to_string()),
    }
}

fn trimmed(value: &Option<String>) -> Option<String> {
    coerce_tag(value.as_deref()).map(str::to_string)
}

fn header_text(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// First `x-forwarded-for` hop, else the socket peer.
fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> Option<String> {
    header_text(headers, "x-forwarded-for")
        .and_then(|forwarded| {
            forwarded
                .split(',')
                .next()
                .map(str::trim)
                .filter(|ip| !ip.is_empty())
                .map(str::to_string)
        })
        .or_else(|| peer.map(|addr| addr.ip().to_string()))
}
