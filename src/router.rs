use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor, GovernorLayer,
};
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};

use crate::admin_handlers;
use crate::handlers::{self, AppState};
use crate::session::require_admin;

/// Calculator payloads are small JSON forms.
const MAX_BODY_BYTES: usize = 64 * 1024;

/// Builds the full HTTP router.
///
/// Everything except `/health` sits behind the per-IP rate limiter and the
/// body size limit. Admin data routes additionally require a live session.
pub fn build_router(state: Arc<AppState>) -> anyhow::Result<Router> {
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(state.config.rate_limit_per_second)
            .burst_size(state.config.rate_limit_burst)
            .key_extractor(SmartIpKeyExtractor)
            .finish()
            .ok_or_else(|| anyhow::anyhow!("invalid rate limit configuration"))?,
    );

    let admin_routes = Router::new()
        .route("/api/admin/stats", get(admin_handlers::stats))
        .route("/api/admin/leads", get(admin_handlers::list_leads))
        .route("/api/admin/leads/export", get(admin_handlers::export_leads))
        .route(
            "/api/admin/leads/:id",
            get(admin_handlers::get_lead)
                .put(admin_handlers::update_lead)
                .delete(admin_handlers::delete_lead),
        )
        .route(
            "/api/admin/benefits",
            get(admin_handlers::list_benefits).post(admin_handlers::create_benefit),
        )
        .route(
            "/api/admin/benefits/reorder",
            post(admin_handlers::reorder_benefits),
        )
        .route(
            "/api/admin/benefits/:id",
            put(admin_handlers::update_benefit).delete(admin_handlers::delete_benefit),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin));

    let protected_routes = Router::new()
        .route("/api/roi-defaults", get(handlers::get_roi_defaults))
        .route(
            "/api/strategic-benefits/:use_case",
            get(handlers::get_strategic_benefits),
        )
        .route("/api/calculate", post(handlers::calculate))
        .route("/api/admin/auth", post(admin_handlers::login))
        .route("/api/admin/auth/status", get(admin_handlers::auth_status))
        .route("/api/admin/auth/logout", post(admin_handlers::logout))
        .merge(admin_routes)
        .layer(
            ServiceBuilder::new()
                .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
                .layer(GovernorLayer {
                    config: governor_conf,
                }),
        );

    // Health check bypasses rate limiting
    let app = Router::new()
        .route("/health", get(handlers::health))
        .merge(protected_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    Ok(app)
}
