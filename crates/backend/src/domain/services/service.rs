use chrono::Utc;
use contracts::domain::geo::GeoPoint;
use contracts::domain::service_listing::{ServiceListing, ServiceListingDto};
use sea_orm::DatabaseConnection;

use super::repository;
use crate::shared::error::ApiError;

pub enum UpdateOutcome {
    Updated,
    NoChange,
}

pub async fn create(
    conn: &DatabaseConnection,
    created_by: &str,
    dto: ServiceListingDto,
) -> Result<String, ApiError> {
    dto.validate().map_err(|field| {
        // validate() reports the offending field name
        ApiError::InvalidInput(format!("Invalid or missing field: {field}"))
    })?;

    let listing = ServiceListing {
        id: uuid::Uuid::new_v4().to_string(),
        title: dto.title.unwrap_or_default(),
        description: dto.description.unwrap_or_default(),
        price: dto.price.unwrap_or_default(),
        provider_name: dto.provider_name.unwrap_or_default(),
        provider_contact: dto.provider_contact,
        provider_email: dto.provider_email.unwrap_or_default(),
        created_by: created_by.to_string(),
        location: dto.location.unwrap_or(GeoPoint { lat: 0.0, lng: 0.0 }),
        created_at: Utc::now(),
    };

    let id = repository::insert(conn, &listing).await?;
    Ok(id)
}

pub async fn list_all(conn: &DatabaseConnection) -> Result<Vec<ServiceListing>, ApiError> {
    Ok(repository::list_all(conn).await?)
}

pub async fn get_by_id(conn: &DatabaseConnection, id: &str) -> Result<ServiceListing, ApiError> {
    repository::get_by_id(conn, id)
        .await?
        .ok_or(ApiError::NotFound("Service"))
}

pub async fn search_by_title(
    conn: &DatabaseConnection,
    title: &str,
) -> Result<Vec<ServiceListing>, ApiError> {
    Ok(repository::search_by_title(conn, title).await?)
}

/// Geospatial nearby search: bounding-box prefilter in SQL, haversine
/// refinement here, nearest first.
pub async fn find_nearby(
    conn: &DatabaseConnection,
    lat: Option<f64>,
    lng: Option<f64>,
    radius_km: f64,
) -> Result<Vec<ServiceListing>, ApiError> {
    let lat = lat.ok_or(ApiError::MissingField("lat"))?;
    let lng = lng.ok_or(ApiError::MissingField("lng"))?;
    let center = GeoPoint::new(lat, lng);
    if !center.is_valid() {
        return Err(ApiError::InvalidInput(
            "lat/lng out of coordinate range".into(),
        ));
    }
    if !(radius_km > 0.0) {
        return Err(ApiError::InvalidInput("radius must be positive".into()));
    }

    let candidates = repository::find_in_bounding_box(conn, center, radius_km).await?;

    let mut with_distance: Vec<(f64, ServiceListing)> = candidates
        .into_iter()
        .map(|s| (haversine_km(center, s.location), s))
        .filter(|(d, _)| *d <= radius_km)
        .collect();
    with_distance.sort_by(|a, b| a.0.total_cmp(&b.0));

    Ok(with_distance.into_iter().map(|(_, s)| s).collect())
}

/// Update a listing the caller owns.
pub async fn update(
    conn: &DatabaseConnection,
    user_id: &str,
    service_id: &str,
    dto: ServiceListingDto,
) -> Result<UpdateOutcome, ApiError> {
    let stored = owned_listing(conn, user_id, service_id).await?;
    let mut listing = stored.clone();

    if let Some(title) = dto.title {
        listing.title = title;
    }
    if let Some(description) = dto.description {
        listing.description = description;
    }
    if let Some(price) = dto.price {
        listing.price = price;
    }
    if let Some(provider_name) = dto.provider_name {
        listing.provider_name = provider_name;
    }
    if dto.provider_contact.is_some() {
        listing.provider_contact = dto.provider_contact;
    }
    if let Some(provider_email) = dto.provider_email {
        listing.provider_email = provider_email;
    }
    if let Some(location) = dto.location {
        if !location.is_valid() {
            return Err(ApiError::InvalidInput(
                "location must be valid [lat, lng] coordinates".into(),
            ));
        }
        listing.location = location;
    }

    // sqlite reports rows matched, not rows modified, so a value-identical
    // write has to be detected before it happens
    if listing == stored {
        return Ok(UpdateOutcome::NoChange);
    }
    repository::update(conn, &listing).await?;
    Ok(UpdateOutcome::Updated)
}

/// Delete a listing the caller owns.
pub async fn delete(
    conn: &DatabaseConnection,
    user_id: &str,
    service_id: &str,
) -> Result<(), ApiError> {
    owned_listing(conn, user_id, service_id).await?;
    let deleted = repository::delete(conn, service_id).await?;
    if deleted == 0 {
        return Err(ApiError::Internal(anyhow::anyhow!(
            "service {service_id} could not be deleted"
        )));
    }
    Ok(())
}

async fn owned_listing(
    conn: &DatabaseConnection,
    user_id: &str,
    service_id: &str,
) -> Result<ServiceListing, ApiError> {
    let listing = repository::get_by_id(conn, service_id)
        .await?
        .ok_or(ApiError::NotFound("Service"))?;
    if listing.created_by != user_id {
        return Err(ApiError::Forbidden(
            "You don't have permission to modify this service".into(),
        ));
    }
    Ok(listing)
}

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance between two points.
pub fn haversine_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::db::connect_in_memory;

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

    #[tokio::test]
    async fn identical_update_reports_no_change() {
        let conn = connect_in_memory().await.unwrap();
        let id = create(&conn, "provider-1", full_dto()).await.unwrap();

        // nothing supplied, nothing changes
        let outcome = update(&conn, "provider-1", &id, ServiceListingDto::default())
            .await
            .unwrap();
        assert!(matches!(outcome, UpdateOutcome::NoChange));

        // resubmitting the stored values is a no-op too
        let outcome = update(&conn, "provider-1", &id, full_dto()).await.unwrap();
        assert!(matches!(outcome, UpdateOutcome::NoChange));
    }

    #[tokio::test]
    async fn changed_field_reports_updated() {
        let conn = connect_in_memory().await.unwrap();
        let id = create(&conn, "provider-1", full_dto()).await.unwrap();

        let dto = ServiceListingDto {
            price: Some(60.0),
            ..Default::default()
        };
        let outcome = update(&conn, "provider-1", &id, dto).await.unwrap();
        assert!(matches!(outcome, UpdateOutcome::Updated));
        assert_eq!(get_by_id(&conn, &id).await.unwrap().price, 60.0);
    }

    #[test]
    fn haversine_zero_for_identical_points() {
        let p = GeoPoint::new(48.85, 2.35);
        assert!(haversine_km(p, p) < 1e-9);
    }

    #[test]
    fn haversine_known_distance() {
        // Paris <-> London is roughly 344 km
        let paris = GeoPoint::new(48.8566, 2.3522);
        let london = GeoPoint::new(51.5074, -0.1278);
        let d = haversine_km(paris, london);
        assert!((d - 344.0).abs() < 5.0, "got {d}");
    }

    #[test]
    fn haversine_one_degree_latitude() {
        let a = GeoPoint::new(0.0, 0.0);
        let b = GeoPoint::new(1.0, 0.0);
        let d = haversine_km(a, b);
        assert!((d - 111.19).abs() < 0.5, "got {d}");
    }
}
