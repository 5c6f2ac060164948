use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::geo::GeoPoint;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Consumer,
    Provider,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Consumer => "consumer",
            UserRole::Provider => "provider",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "consumer" => Some(UserRole::Consumer),
            "provider" => Some(UserRole::Provider),
            _ => None,
        }
    }
}

/// Provider-side profile data.
///
/// `average_rating` and `rating_count` are a materialized view over the
/// provider's completed bookings with feedback; they are recomputed by the
/// booking engine and must never be edited directly.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderDetails {
    pub service_type: Option<String>,
    pub experience: Option<i32>,
    pub hourly_rate: Option<f64>,
    pub location: Option<GeoPoint>,
    pub average_rating: Option<f64>,
    pub rating_count: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: Option<String>,
    pub email: String,
    pub role: UserRole,
    pub contact_no: Option<String>,
    pub address: Option<String>,
    pub provider_details: Option<ProviderDetails>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProfileDto {
    pub name: Option<String>,
    pub contact_no: Option<String>,
    pub address: Option<String>,
    pub service_type: Option<String>,
    pub experience: Option<i32>,
    pub hourly_rate: Option<f64>,
    pub location: Option<GeoPoint>,
}
