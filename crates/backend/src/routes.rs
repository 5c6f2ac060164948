use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};

use crate::shared::state::AppState;
use crate::{api, system};

/// Full route table of the application.
pub fn configure_routes(state: AppState) -> Router {
    let require_auth = middleware::from_fn_with_state(
        state.clone(),
        system::auth::middleware::require_auth,
    );
    let optional_auth = middleware::from_fn_with_state(
        state.clone(),
        system::auth::middleware::optional_auth,
    );

    Router::new()
        .route("/health", get(|| async { "ok" }))
        // ========================================
        // USER / AUTH ROUTES
        // ========================================
        .route("/api/users/register", post(system::handlers::auth::register))
        .route("/api/users/login", post(system::handlers::auth::login))
        .route("/api/users/refresh", post(system::handlers::auth::refresh))
        .route("/api/users/logout", post(system::handlers::auth::logout))
        .route(
            "/api/users/me",
            get(system::handlers::auth::current_user)
                .put(system::handlers::auth::update_profile)
                .layer(require_auth.clone()),
        )
        // ========================================
        // SERVICE LISTING ROUTES
        // ========================================
        .route("/api/services/all", get(api::handlers::services::list_all))
        .route(
            "/api/services/title/:title",
            get(api::handlers::services::search),
        )
        .route("/api/services/nearby", get(api::handlers::services::nearby))
        .route(
            "/api/services/service/:id",
            get(api::handlers::services::get_by_id),
        )
        .route(
            "/api/services/create",
            post(api::handlers::services::create).layer(require_auth.clone()),
        )
        .route(
            "/api/services/update/:id",
            put(api::handlers::services::update).layer(require_auth.clone()),
        )
        .route(
            "/api/services/delete/:id",
            delete(api::handlers::services::delete).layer(require_auth.clone()),
        )
        // ========================================
        // BOOKING ROUTES
        // ========================================
        .route(
            "/api/bookings",
            post(api::handlers::bookings::create).layer(require_auth.clone()),
        )
        .route(
            "/api/bookings/history",
            get(api::handlers::bookings::history).layer(optional_auth.clone()),
        )
        .route(
            "/api/bookings/provider",
            get(api::handlers::bookings::provider_bookings).layer(require_auth.clone()),
        )
        .route(
            "/api/bookings/auto-complete",
            put(api::handlers::bookings::auto_complete).layer(require_auth.clone()),
        )
        .route(
            "/api/bookings/:id",
            get(api::handlers::bookings::get_by_id).layer(require_auth.clone()),
        )
        .route(
            "/api/bookings/:id/status",
            put(api::handlers::bookings::update_status).layer(require_auth.clone()),
        )
        .route(
            "/api/bookings/:id/feedback",
            post(api::handlers::bookings::submit_feedback).layer(require_auth),
        )
        // ========================================
        // AGENT ROUTES
        // ========================================
        .route(
            "/api/agent/detect-intent",
            post(api::handlers::agent::detect_intent),
        )
        .route(
            "/api/agent/handle-intent",
            post(api::handlers::agent::handle_intent).layer(optional_auth),
        )
        .with_state(state)
}
