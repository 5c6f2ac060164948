use contracts::domain::geo::GeoPoint;
use contracts::domain::service_listing::ServiceListing;
use sea_orm::entity::prelude::*;
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "services")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub title: String,
    pub description: String,
    pub price: f64,
    pub provider_name: String,
    pub provider_contact: Option<String>,
    pub provider_email: String,
    pub created_by: String,
    pub location_lat: f64,
    pub location_lng: f64,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for ServiceListing {
    fn from(m: Model) -> Self {
        ServiceListing {
            id: m.id,
            title: m.title,
            description: m.description,
            price: m.price,
            provider_name: m.provider_name,
            provider_contact: m.provider_contact,
            provider_email: m.provider_email,
            created_by: m.created_by,
            location: GeoPoint::new(m.location_lat, m.location_lng),
            created_at: m.created_at,
        }
    }
}

pub async fn list_all(conn: &DatabaseConnection) -> anyhow::Result<Vec<ServiceListing>> {
    let items = Entity::find()
        .order_by_desc(Column::CreatedAt)
        .all(conn)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(items)
}

pub async fn get_by_id(
    conn: &DatabaseConnection,
    id: &str,
) -> anyhow::Result<Option<ServiceListing>> {
    let result = Entity::find_by_id(id.to_string()).one(conn).await?;
    Ok(result.map(Into::into))
}

/// Case-insensitive substring search on the title.
pub async fn search_by_title(
    conn: &DatabaseConnection,
    title: &str,
) -> anyhow::Result<Vec<ServiceListing>> {
    let items = Entity::find()
        .filter(Column::Title.contains(title))
        .order_by_desc(Column::CreatedAt)
        .all(conn)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(items)
}

/// Bounding-box prefilter for the nearby search. The box overshoots the
/// radius on purpose; the service layer refines with real distances.
pub async fn find_in_bounding_box(
    conn: &DatabaseConnection,
    center: GeoPoint,
    radius_km: f64,
) -> anyhow::Result<Vec<ServiceListing>> {
    // One degree of latitude is ~111 km; longitude degrees shrink with cos(lat).
    let lat_delta = radius_km / 111.0;
    let cos_lat = center.lat.to_radians().cos().abs().max(1e-6);
    let lng_delta = radius_km / (111.0 * cos_lat);

    let items = Entity::find()
        .filter(Column::LocationLat.between(center.lat - lat_delta, center.lat + lat_delta))
        .filter(Column::LocationLng.between(center.lng - lng_delta, center.lng + lng_delta))
        .all(conn)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(items)
}

pub async fn insert(conn: &DatabaseConnection, listing: &ServiceListing) -> anyhow::Result<String> {
    let active = ActiveModel {
        id: Set(listing.id.clone()),
        title: Set(listing.title.clone()),
        description: Set(listing.description.clone()),
        price: Set(listing.price),
        provider_name: Set(listing.provider_name.clone()),
        provider_contact: Set(listing.provider_contact.clone()),
        provider_email: Set(listing.provider_email.clone()),
        created_by: Set(listing.created_by.clone()),
        location_lat: Set(listing.location.lat),
        location_lng: Set(listing.location.lng),
        created_at: Set(listing.created_at),
    };
    active.insert(conn).await?;
    Ok(listing.id.clone())
}

/// Update mutable listing fields.
pub async fn update(conn: &DatabaseConnection, listing: &ServiceListing) -> anyhow::Result<()> {
    Entity::update_many()
        .col_expr(Column::Title, Expr::value(listing.title.clone()))
        .col_expr(Column::Description, Expr::value(listing.description.clone()))
        .col_expr(Column::Price, Expr::value(listing.price))
        .col_expr(
            Column::ProviderName,
            Expr::value(listing.provider_name.clone()),
        )
        .col_expr(
            Column::ProviderContact,
            Expr::value(listing.provider_contact.clone()),
        )
        .col_expr(
            Column::ProviderEmail,
            Expr::value(listing.provider_email.clone()),
        )
        .col_expr(Column::LocationLat, Expr::value(listing.location.lat))
        .col_expr(Column::LocationLng, Expr::value(listing.location.lng))
        .filter(Column::Id.eq(listing.id.clone()))
        .exec(conn)
        .await?;
    Ok(())
}

pub async fn delete(conn: &DatabaseConnection, id: &str) -> anyhow::Result<u64> {
    let result = Entity::delete_by_id(id.to_string()).exec(conn).await?;
    Ok(result.rows_affected)
}
