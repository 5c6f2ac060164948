use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Booking lifecycle states.
///
/// `completed` and `cancelled` are terminal for automatic processing: the
/// auto-completion sweep never touches them. Providers may still move a
/// booking between any of the four states manually.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Completed => "completed",
            BookingStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(BookingStatus::Pending),
            "confirmed" => Some(BookingStatus::Confirmed),
            "completed" => Some(BookingStatus::Completed),
            "cancelled" => Some(BookingStatus::Cancelled),
            _ => None,
        }
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Consumer feedback attached to a completed booking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingFeedback {
    pub rating: i32,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A booking record.
///
/// `service_title`, `consumer_name`, `consumer_email` and `contact_number`
/// are snapshots taken at creation time; they do not follow later edits of
/// the service or user records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: String,
    pub service_id: String,
    pub service_title: String,
    pub consumer_id: String,
    pub consumer_name: Option<String>,
    pub consumer_email: String,
    pub contact_number: Option<String>,
    pub provider_id: String,
    pub scheduled_at: DateTime<Utc>,
    pub status: BookingStatus,
    pub special_instructions: Option<String>,
    pub notes: Option<String>,
    pub feedback: Option<BookingFeedback>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Booking creation payload as the frontend sends it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateBookingRequest {
    /// Service id.
    pub service: Option<String>,
    pub client_name: Option<String>,
    pub client_email: Option<String>,
    /// RFC3339 datetime of the appointment.
    pub booking_date: Option<String>,
    pub contact_number: Option<String>,
    pub special_instructions: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackRequest {
    pub rating: Option<i32>,
    pub comment: Option<String>,
}

/// Nested service view embedded in consumer history rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceView {
    pub id: String,
    pub title: String,
    pub description: String,
    pub price: f64,
}

/// One row of a consumer's booking history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingSummary {
    pub id: String,
    pub consumer_id: String,
    pub scheduled_at: DateTime<Utc>,
    pub status: BookingStatus,
    pub service: ServiceView,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pagination {
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
    pub pages: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PagedBookings {
    pub bookings: Vec<Booking>,
    pub pagination: Pagination,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parses_canonical_values() {
        for s in ["pending", "confirmed", "completed", "cancelled"] {
            let status = BookingStatus::parse(s).unwrap();
            assert_eq!(status.as_str(), s);
        }
        assert!(BookingStatus::parse("Pending").is_none());
        assert!(BookingStatus::parse("done").is_none());
    }

    #[test]
    fn status_serializes_lowercase() {
        let json = serde_json::to_string(&BookingStatus::Confirmed).unwrap();
        assert_eq!(json, "\"confirmed\"");
        let back: BookingStatus = serde_json::from_str("\"cancelled\"").unwrap();
        assert_eq!(back, BookingStatus::Cancelled);
    }
}
