use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::geo::GeoPoint;

/// A published service offer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceListing {
    pub id: String,
    pub title: String,
    pub description: String,
    pub price: f64,
    pub provider_name: String,
    pub provider_contact: Option<String>,
    pub provider_email: String,
    /// User id of the provider who published the listing.
    pub created_by: String,
    pub location: GeoPoint,
    pub created_at: DateTime<Utc>,
}

/// Create/update payload for a service listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceListingDto {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub provider_name: Option<String>,
    pub provider_contact: Option<String>,
    pub provider_email: Option<String>,
    pub location: Option<GeoPoint>,
}

impl ServiceListingDto {
    /// Field-level validation for creation. Returns the first missing or
    /// invalid field name.
    pub fn validate(&self) -> Result<(), String> {
        if self.title.as_deref().map_or(true, |s| s.trim().is_empty()) {
            return Err("title".into());
        }
        if self
            .description
            .as_deref()
            .map_or(true, |s| s.trim().is_empty())
        {
            return Err("description".into());
        }
        if self.price.is_none() {
            return Err("price".into());
        }
        if self
            .provider_name
            .as_deref()
            .map_or(true, |s| s.trim().is_empty())
        {
            return Err("provider_name".into());
        }
        if self
            .provider_email
            .as_deref()
            .map_or(true, |s| s.trim().is_empty())
        {
            return Err("provider_email".into());
        }
        match self.location {
            None => return Err("location".into()),
            Some(p) if !p.is_valid() => return Err("location".into()),
            Some(_) => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_dto() -> ServiceListingDto {
        ServiceListingDto {
            title: Some("Plumbing".into()),
            description: Some("Pipes and taps".into()),
            price: Some(45.0),
            provider_name: Some("Bob".into()),
            provider_contact: Some("555-0101".into()),
            provider_email: Some("bob@example.com".into()),
            location: Some(GeoPoint::new(51.5, -0.12)),
        }
    }

    #[test]
    fn validate_accepts_complete_dto() {
        assert!(full_dto().validate().is_ok());
    }

    #[test]
    fn validate_reports_first_missing_field() {
        let mut dto = full_dto();
        dto.price = None;
        assert_eq!(dto.validate().unwrap_err(), "price");

        let mut dto = full_dto();
        dto.location = Some(GeoPoint::new(120.0, 0.0));
        assert_eq!(dto.validate().unwrap_err(), "location");
    }
}
