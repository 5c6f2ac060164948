use axum::extract::{Json, Path, Query, State};
use axum::http::StatusCode;
use contracts::domain::service_listing::{ServiceListing, ServiceListingDto};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::domain::services::service::{self, UpdateOutcome};
use crate::shared::error::ApiError;
use crate::shared::state::AppState;
use crate::system::auth::extractor::CurrentUser;

#[derive(Debug, Deserialize)]
pub struct NearbyQuery {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub radius: Option<f64>,
}

/// GET /api/services/all
pub async fn list_all(
    State(state): State<AppState>,
) -> Result<Json<Vec<ServiceListing>>, ApiError> {
    Ok(Json(service::list_all(&state.db).await?))
}

/// GET /api/services/title/:title
pub async fn search(
    State(state): State<AppState>,
    Path(title): Path<String>,
) -> Result<Json<Vec<ServiceListing>>, ApiError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(ApiError::MissingField("title"));
    }
    Ok(Json(service::search_by_title(&state.db, title).await?))
}

/// GET /api/services/nearby?lat=..&lng=..&radius=..
pub async fn nearby(
    State(state): State<AppState>,
    Query(query): Query<NearbyQuery>,
) -> Result<Json<Vec<ServiceListing>>, ApiError> {
    let radius_km = query.radius.unwrap_or(5.0);
    let found = service::find_nearby(&state.db, query.lat, query.lng, radius_km).await?;
    Ok(Json(found))
}

/// GET /api/services/service/:id
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ServiceListing>, ApiError> {
    Ok(Json(service::get_by_id(&state.db, &id).await?))
}

/// POST /api/services/create (protected)
pub async fn create(
    State(state): State<AppState>,
    CurrentUser(claims): CurrentUser,
    Json(dto): Json<ServiceListingDto>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let id = service::create(&state.db, &claims.sub, dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "id": id, "msg": "Service created successfully" })),
    ))
}

/// PUT /api/services/update/:id (protected, owner only)
pub async fn update(
    State(state): State<AppState>,
    CurrentUser(claims): CurrentUser,
    Path(id): Path<String>,
    Json(dto): Json<ServiceListingDto>,
) -> Result<Json<Value>, ApiError> {
    let msg = match service::update(&state.db, &claims.sub, &id, dto).await? {
        UpdateOutcome::Updated => "Service updated successfully",
        UpdateOutcome::NoChange => "No changes made to the service",
    };
    Ok(Json(json!({ "msg": msg })))
}

/// DELETE /api/services/delete/:id (protected, owner only)
pub async fn delete(
    State(state): State<AppState>,
    CurrentUser(claims): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    service::delete(&state.db, &claims.sub, &id).await?;
    Ok(Json(json!({ "msg": "Service deleted successfully" })))
}
