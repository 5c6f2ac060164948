use axum::extract::{Json, State};
use contracts::domain::chat::{DetectIntentRequest, DetectIntentResponse, HandleIntentRequest};
use serde_json::Value;

use crate::domain::agent::service;
use crate::shared::error::ApiError;
use crate::shared::state::AppState;
use crate::system::auth::extractor::MaybeUser;

/// POST /api/agent/detect-intent
pub async fn detect_intent(
    State(state): State<AppState>,
    Json(request): Json<DetectIntentRequest>,
) -> Result<Json<DetectIntentResponse>, ApiError> {
    let intent =
        service::detect_intent(state.classifier.as_ref(), request.message.as_deref()).await?;
    Ok(Json(DetectIntentResponse { intent }))
}

/// POST /api/agent/handle-intent
///
/// Auth is optional: some intents work anonymously, others reject the call
/// inside the dispatcher.
pub async fn handle_intent(
    State(state): State<AppState>,
    MaybeUser(claims): MaybeUser,
    Json(request): Json<HandleIntentRequest>,
) -> Result<Json<Value>, ApiError> {
    let principal = claims.as_ref().map(|c| c.sub.as_str());
    let result = service::handle_intent(
        &state.db,
        principal,
        request.intent.as_deref(),
        &request.parameters,
    )
    .await?;
    Ok(Json(result))
}
