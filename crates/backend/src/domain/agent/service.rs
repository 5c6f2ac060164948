use contracts::domain::booking::CreateBookingRequest;
use contracts::domain::chat::Intent;
use sea_orm::DatabaseConnection;
use serde_json::{json, Value};

use crate::domain::{bookings, services};
use crate::shared::error::ApiError;
use crate::shared::llm::IntentClassifier;

/// Classify a free-text message into one of the intent labels.
///
/// Classifier failures degrade to `Other` rather than surfacing an error;
/// the conversational layer should stay usable when the model is down.
pub async fn detect_intent(
    classifier: &dyn IntentClassifier,
    message: Option<&str>,
) -> Result<Intent, ApiError> {
    let message = match message.map(str::trim) {
        Some(m) if !m.is_empty() => m,
        _ => return Err(ApiError::MissingField("message")),
    };

    match classifier.classify(message).await {
        Ok(intent) => Ok(intent),
        Err(e) => {
            tracing::warn!("Intent classification failed, falling back to 'other': {e}");
            Ok(Intent::Other)
        }
    }
}

/// Dispatch a structured `{intent, parameters}` request to the matching
/// service call. Only a subset of the label set is directly executable here;
/// everything else is rejected.
pub async fn handle_intent(
    conn: &DatabaseConnection,
    principal: Option<&str>,
    intent: Option<&str>,
    parameters: &Value,
) -> Result<Value, ApiError> {
    let intent = intent
        .filter(|s| !s.trim().is_empty())
        .ok_or(ApiError::MissingField("intent"))?;
    let intent = Intent::parse(intent)
        .ok_or_else(|| ApiError::InvalidInput("Unknown intent".into()))?;

    match intent {
        Intent::SearchServicesByTitle => {
            let title = str_param(parameters, "title").ok_or(ApiError::MissingField("title"))?;
            let found = services::service::search_by_title(conn, &title).await?;
            Ok(json!({ "services": found }))
        }
        Intent::GetServiceDetails => {
            let service_id =
                str_param(parameters, "service_id").ok_or(ApiError::MissingField("service_id"))?;
            let listing = services::service::get_by_id(conn, &service_id).await?;
            Ok(json!({ "service": listing }))
        }
        Intent::FindNearbyServices => {
            let lat = f64_param(parameters, "lat");
            let lng = f64_param(parameters, "lng");
            let radius = f64_param(parameters, "radius").unwrap_or(5.0);
            let found = services::service::find_nearby(conn, lat, lng, radius).await?;
            Ok(json!({ "services": found }))
        }
        Intent::CreateBooking => {
            let principal = principal.ok_or_else(|| {
                ApiError::Forbidden("Authentication required to create a booking".into())
            })?;
            for field in [
                "service_id",
                "client_name",
                "client_email",
                "booking_date",
                "contact_number",
            ] {
                if str_param(parameters, field).is_none() {
                    return Err(ApiError::InvalidInput(format!(
                        "Missing '{field}' parameter"
                    )));
                }
            }
            let request = CreateBookingRequest {
                service: str_param(parameters, "service_id"),
                client_name: str_param(parameters, "client_name"),
                client_email: str_param(parameters, "client_email"),
                booking_date: str_param(parameters, "booking_date"),
                contact_number: str_param(parameters, "contact_number"),
                special_instructions: str_param(parameters, "special_instructions"),
                notes: None,
            };
            let booking = bookings::service::create(conn, principal, request).await?;
            Ok(json!({ "booking": booking }))
        }
        Intent::GetBookingHistory => {
            let history = match principal {
                Some(user_id) => bookings::service::list_for_consumer(conn, user_id, None).await?,
                None => {
                    let email = str_param(parameters, "client_email")
                        .ok_or(ApiError::MissingField("client_email"))?;
                    bookings::service::list_for_consumer(conn, "", Some(&email)).await?
                }
            };
            Ok(json!({ "bookings": history }))
        }
        Intent::CancelBooking => {
            let principal = principal.ok_or_else(|| {
                ApiError::Forbidden("Authentication required to cancel a booking".into())
            })?;
            let booking_id =
                str_param(parameters, "booking_id").ok_or(ApiError::MissingField("booking_id"))?;
            bookings::service::transition_status(conn, &booking_id, "cancelled", principal)
                .await?;
            Ok(json!({ "booking_id": booking_id, "status": "cancelled" }))
        }
        _ => Err(ApiError::InvalidInput(
            "This intent cannot be handled here".into(),
        )),
    }
}

fn str_param(parameters: &Value, key: &str) -> Option<String> {
    parameters
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Numeric parameter; numeric strings are accepted too since LLM-produced
/// argument objects often quote numbers.
fn f64_param(parameters: &Value, key: &str) -> Option<f64> {
    match parameters.get(key) {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    }
}
