use serde::{Deserialize, Serialize};

/// Intent labels the conversational layer can dispatch.
///
/// The classifier is free-text in, one label out; anything the model returns
/// outside this set collapses to `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    RegisterUser,
    LoginUser,
    GetUserProfile,
    UpdateUserProfile,
    CreateService,
    UpdateService,
    ListServices,
    GetServiceDetails,
    SearchServicesByTitle,
    FindNearbyServices,
    CreateBooking,
    GetServiceBookings,
    GetBookingHistory,
    CancelBooking,
    Other,
}

impl Intent {
    pub const ALL: &'static [Intent] = &[
        Intent::RegisterUser,
        Intent::LoginUser,
        Intent::GetUserProfile,
        Intent::UpdateUserProfile,
        Intent::CreateService,
        Intent::UpdateService,
        Intent::ListServices,
        Intent::GetServiceDetails,
        Intent::SearchServicesByTitle,
        Intent::FindNearbyServices,
        Intent::CreateBooking,
        Intent::GetServiceBookings,
        Intent::GetBookingHistory,
        Intent::CancelBooking,
        Intent::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::RegisterUser => "register_user",
            Intent::LoginUser => "login_user",
            Intent::GetUserProfile => "get_user_profile",
            Intent::UpdateUserProfile => "update_user_profile",
            Intent::CreateService => "create_service",
            Intent::UpdateService => "update_service",
            Intent::ListServices => "list_services",
            Intent::GetServiceDetails => "get_service_details",
            Intent::SearchServicesByTitle => "search_services_by_title",
            Intent::FindNearbyServices => "find_nearby_services",
            Intent::CreateBooking => "create_booking",
            Intent::GetServiceBookings => "get_service_bookings",
            Intent::GetBookingHistory => "get_booking_history",
            Intent::CancelBooking => "cancel_booking",
            Intent::Other => "other",
        }
    }

    /// Parse a model-produced label. Whitespace and case are forgiven;
    /// unknown labels map to `None` so the caller can fall back to `Other`.
    pub fn parse(s: &str) -> Option<Self> {
        let normalized = s.trim().to_lowercase();
        Intent::ALL
            .iter()
            .copied()
            .find(|i| i.as_str() == normalized)
    }
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectIntentRequest {
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectIntentResponse {
    pub intent: Intent,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandleIntentRequest {
    pub intent: Option<String>,
    #[serde(default)]
    pub parameters: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_forgiving_about_case_and_whitespace() {
        assert_eq!(Intent::parse(" Create_Booking \n"), Some(Intent::CreateBooking));
        assert_eq!(Intent::parse("find_nearby_services"), Some(Intent::FindNearbyServices));
        assert_eq!(Intent::parse("order_pizza"), None);
    }

    #[test]
    fn labels_round_trip_through_serde() {
        let json = serde_json::to_string(&Intent::GetBookingHistory).unwrap();
        assert_eq!(json, "\"get_booking_history\"");
        let back: Intent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Intent::GetBookingHistory);
    }
}
