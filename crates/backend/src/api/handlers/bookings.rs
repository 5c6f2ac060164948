use axum::extract::{Json, Path, Query, State};
use axum::http::StatusCode;
use contracts::domain::booking::{
    Booking, BookingSummary, CreateBookingRequest, FeedbackRequest, PagedBookings,
    UpdateStatusRequest,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::domain::bookings::service::{self, StatusUpdate};
use crate::shared::error::ApiError;
use crate::shared::state::AppState;
use crate::system::auth::extractor::{CurrentUser, MaybeUser};

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub client_email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

/// POST /api/bookings (protected)
pub async fn create(
    State(state): State<AppState>,
    CurrentUser(claims): CurrentUser,
    Json(request): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<Booking>), ApiError> {
    let booking = service::create(&state.db, &claims.sub, request).await?;
    Ok((StatusCode::CREATED, Json(booking)))
}

/// GET /api/bookings/history
///
/// Authenticated callers get their own history; anonymous callers must pass
/// `client_email`.
pub async fn history(
    State(state): State<AppState>,
    MaybeUser(claims): MaybeUser,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<BookingSummary>>, ApiError> {
    let email = query
        .client_email
        .as_deref()
        .map(str::trim)
        .filter(|e| !e.is_empty());

    let summaries = match (&claims, email) {
        (_, Some(email)) => service::list_for_consumer(&state.db, "", Some(email)).await?,
        (Some(claims), None) => service::list_for_consumer(&state.db, &claims.sub, None).await?,
        (None, None) => return Err(ApiError::MissingField("client_email")),
    };
    Ok(Json(summaries))
}

/// GET /api/bookings/provider?page=..&per_page=.. (protected)
pub async fn provider_bookings(
    State(state): State<AppState>,
    CurrentUser(claims): CurrentUser,
    Query(query): Query<PageQuery>,
) -> Result<Json<PagedBookings>, ApiError> {
    let page = query.page.unwrap_or(1);
    let per_page = query.per_page.unwrap_or(10);
    let result = service::list_for_provider(&state.db, &claims.sub, page, per_page).await?;
    Ok(Json(result))
}

/// GET /api/bookings/:id (protected, parties only)
pub async fn get_by_id(
    State(state): State<AppState>,
    CurrentUser(claims): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<Booking>, ApiError> {
    let booking = service::get_by_id(&state.db, &id, &claims.sub).await?;
    Ok(Json(booking))
}

/// PUT /api/bookings/:id/status (protected)
pub async fn update_status(
    State(state): State<AppState>,
    CurrentUser(claims): CurrentUser,
    Path(id): Path<String>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<Value>, ApiError> {
    let status = request.status.ok_or(ApiError::MissingField("status"))?;
    let msg = match service::transition_status(&state.db, &id, &status, &claims.sub).await? {
        StatusUpdate::Updated => "Booking status updated successfully",
        StatusUpdate::NoChange => "No changes made to the booking",
    };
    Ok(Json(json!({ "msg": msg })))
}

/// PUT /api/bookings/auto-complete (protected)
///
/// Manual trigger for the same pass the background sweeper runs.
pub async fn auto_complete(
    State(state): State<AppState>,
    CurrentUser(_claims): CurrentUser,
) -> Result<Json<Value>, ApiError> {
    let updated = service::sweep_once(&state.db).await?;
    Ok(Json(json!({ "updated": updated })))
}

/// POST /api/bookings/:id/feedback (protected, consumer only)
pub async fn submit_feedback(
    State(state): State<AppState>,
    CurrentUser(claims): CurrentUser,
    Path(id): Path<String>,
    Json(request): Json<FeedbackRequest>,
) -> Result<Json<Value>, ApiError> {
    service::add_feedback(&state.db, &id, &claims.sub, request.rating, request.comment).await?;
    Ok(Json(json!({ "msg": "Feedback submitted successfully" })))
}
