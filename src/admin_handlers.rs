//! Admin surface: login, lead triage, CSV export and the strategic benefits CMS.

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::csv_export::{export_filename, leads_to_csv};
use crate::errors::AppError;
use crate::handlers::AppState;
use crate::models::{
    AdminLoginRequest, AuthStatusResponse, ExportFilters, Lead, LeadFilters, LeadPage, LeadStats,
    LeadStatus, LeadUpdate, NewStrategicBenefit, ReorderBenefitsRequest, StrategicBenefit,
    StrategicBenefitPatch, SuccessResponse,
};
use crate::roi_calculator::UseCase;
use crate::session::{is_authenticated, password_matches, session_id_from_headers};

// ============ Auth ============

/// POST /api/admin/auth
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AdminLoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let password = request.password.as_deref().unwrap_or_default();

    let authorized = match state.config.admin_password.as_deref() {
        Some(expected) => !password.is_empty() && password_matches(password, expected),
        None => {
            tracing::warn!("Admin login attempted but ADMIN_PASSWORD is not configured");
            false
        }
    };

    if !authorized {
        return Err(AppError::Unauthorized("Invalid password".to_string()));
    }

    let token = state.sessions.create().await;
    Ok((
        [(header::SET_COOKIE, state.sessions.cookie_for(&token))],
        Json(SuccessResponse { success: true }),
    ))
}

/// GET /api/admin/auth/status
pub async fn auth_status(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Json<AuthStatusResponse> {
    Json(AuthStatusResponse {
        is_authenticated: is_authenticated(&state.sessions, &headers).await,
    })
}

/// POST /api/admin/auth/logout
pub async fn logout(State(state): State<Arc<AppState>>, headers: HeaderMap) -> impl IntoResponse {
    if let Some(token) = session_id_from_headers(&headers) {
        state.sessions.invalidate(&token).await;
        tracing::info!("Admin session ended");
    }

    (
        [(header::SET_COOKIE, state.sessions.clear_cookie())],
        Json(SuccessResponse { success: true }),
    )
}

// ============ Leads ============

/// GET /api/admin/stats
pub async fn stats(State(state): State<Arc<AppState>>) -> Result<Json<LeadStats>, AppError> {
    Ok(Json(state.leads().stats().await?))
}

/// GET /api/admin/leads
pub async fn list_leads(
    State(state): State<Arc<AppState>>,
    Query(filters): Query<LeadFilters>,
) -> Result<Json<LeadPage>, AppError> {
    let page = state.leads().list(&filters).await?;
    tracing::debug!(
        "Listed {} of {} leads (page {}/{})",
        page.leads.len(),
        page.total,
        page.page,
        page.pages
    );
    Ok(Json(page))
}

/// GET /api/admin/leads/:id
pub async fn get_lead(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Lead>, AppError> {
    state
        .leads()
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Lead not found".to_string()))
}

/// PUT /api/admin/leads/:id
pub async fn update_lead(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(update): Json<LeadUpdate>,
) -> Result<Json<Lead>, AppError> {
    let status = update
        .status
        .as_deref()
        .map(|s| s.trim().parse::<LeadStatus>())
        .transpose()
        .map_err(AppError::BadRequest)?;

    let lead = state
        .leads()
        .update(id, status, update.notes.as_deref())
        .await?
        .ok_or_else(|| AppError::NotFound("Lead not found".to_string()))?;

    tracing::info!("Lead {} updated (status {})", lead.id, lead.status);
    Ok(Json(lead))
}

/// DELETE /api/admin/leads/:id
pub async fn delete_lead(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<SuccessResponse>, AppError> {
    if !state.leads().delete(id).await? {
        return Err(AppError::NotFound("Lead not found".to_string()));
    }
    tracing::info!("Lead {} deleted", id);
    Ok(Json(SuccessResponse { success: true }))
}

/// GET /api/admin/leads/export
pub async fn export_leads(
    State(state): State<Arc<AppState>>,
    Query(filters): Query<ExportFilters>,
) -> Result<impl IntoResponse, AppError> {
    let leads = state.leads().export_rows(&filters).await?;
    let filename = export_filename(Utc::now());
    let body = leads_to_csv(&leads)?;
    tracing::info!("Exporting {} leads as {}", leads.len(), filename);

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        body,
    ))
}

// ============ Strategic benefits ============

fn parse_use_case(raw: &str) -> Result<UseCase, AppError> {
    raw.trim()
        .parse::<UseCase>()
        .map_err(|_| AppError::BadRequest(format!("Invalid use case '{}'", raw)))
}

/// GET /api/admin/benefits
pub async fn list_benefits(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<StrategicBenefit>>, AppError> {
    Ok(Json(state.benefits().list_all().await?))
}

/// POST /api/admin/benefits
pub async fn create_benefit(
    State(state): State<Arc<AppState>>,
    Json(mut new): Json<NewStrategicBenefit>,
) -> Result<(StatusCode, Json<StrategicBenefit>), AppError> {
    new.use_case = parse_use_case(&new.use_case)?.as_str().to_string();
    if new.benefit_text.trim().is_empty() {
        return Err(AppError::BadRequest("Benefit text is required".to_string()));
    }

    let benefit = state.benefits().create(&new).await?;
    tracing::info!("Created benefit {} for {}", benefit.id, benefit.use_case);
    Ok((StatusCode::CREATED, Json(benefit)))
}

/// PUT /api/admin/benefits/:id
pub async fn update_benefit(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Json(patch): Json<StrategicBenefitPatch>,
) -> Result<Json<StrategicBenefit>, AppError> {
    if matches!(patch.benefit_text.as_deref(), Some(text) if text.trim().is_empty()) {
        return Err(AppError::BadRequest("Benefit text cannot be empty".to_string()));
    }

    state
        .benefits()
        .update(id, &patch)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Benefit not found".to_string()))
}

/// DELETE /api/admin/benefits/:id
pub async fn delete_benefit(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<SuccessResponse>, AppError> {
    if !state.benefits().delete(id).await? {
        return Err(AppError::NotFound("Benefit not found".to_string()));
    }
    Ok(Json(SuccessResponse { success: true }))
}

/// POST /api/admin/benefits/reorder
pub async fn reorder_benefits(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ReorderBenefitsRequest>,
) -> Result<Json<SuccessResponse>, AppError> {
    let use_case = parse_use_case(&request.use_case)?;
    state
        .benefits()
        .reorder(use_case.as_str(), &request.ordered_ids)
        .await?;
    Ok(Json(SuccessResponse { success: true }))
}
