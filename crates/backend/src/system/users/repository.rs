use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use contracts::domain::geo::GeoPoint;
use contracts::system::users::{ProviderDetails, User, UserRole};
use sea_orm::{ConnectionTrait, DatabaseBackend, DatabaseConnection, Statement};

const USER_COLUMNS: &str = "id, name, email, role, contact_no, address, service_type, experience, \
     hourly_rate, location_lat, location_lng, average_rating, rating_count, created_at, updated_at";

fn parse_datetime(s: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(s)
        .with_context(|| format!("invalid stored datetime: {s}"))?
        .with_timezone(&Utc))
}

fn row_to_user(row: &sea_orm::QueryResult) -> Result<User> {
    let role_str: String = row.try_get("", "role")?;
    let role = UserRole::parse(&role_str).unwrap_or(UserRole::Consumer);

    let location = match (
        row.try_get::<Option<f64>>("", "location_lat")?,
        row.try_get::<Option<f64>>("", "location_lng")?,
    ) {
        (Some(lat), Some(lng)) => Some(GeoPoint::new(lat, lng)),
        _ => None,
    };

    let provider_details = if role == UserRole::Provider {
        Some(ProviderDetails {
            service_type: row.try_get("", "service_type")?,
            experience: row.try_get("", "experience")?,
            hourly_rate: row.try_get("", "hourly_rate")?,
            location,
            average_rating: row.try_get("", "average_rating")?,
            rating_count: row.try_get("", "rating_count")?,
        })
    } else {
        None
    };

    let created_at: String = row.try_get("", "created_at")?;
    let updated_at: Option<String> = row.try_get("", "updated_at")?;

    Ok(User {
        id: row.try_get("", "id")?,
        name: row.try_get("", "name")?,
        email: row.try_get("", "email")?,
        role,
        contact_no: row.try_get("", "contact_no")?,
        address: row.try_get("", "address")?,
        provider_details,
        created_at: parse_datetime(&created_at)?,
        updated_at: updated_at.as_deref().map(parse_datetime).transpose()?,
    })
}

/// Insert user with password hash
pub async fn create_with_password(
    conn: &DatabaseConnection,
    user: &User,
    password_hash: &str,
) -> Result<()> {
    let details = user.provider_details.clone().unwrap_or_default();
    conn.execute(Statement::from_sql_and_values(
        DatabaseBackend::Sqlite,
        "INSERT INTO users (id, name, email, password_hash, role, contact_no, address, \
         service_type, experience, hourly_rate, location_lat, location_lng, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        [
            user.id.clone().into(),
            user.name.clone().into(),
            user.email.clone().into(),
            password_hash.to_string().into(),
            user.role.as_str().into(),
            user.contact_no.clone().into(),
            user.address.clone().into(),
            details.service_type.into(),
            details.experience.into(),
            details.hourly_rate.into(),
            details.location.map(|p| p.lat).into(),
            details.location.map(|p| p.lng).into(),
            user.created_at.to_rfc3339().into(),
            user.updated_at.map(|t| t.to_rfc3339()).into(),
        ],
    ))
    .await
    .context("Failed to insert user")?;

    Ok(())
}

/// Get user by ID
pub async fn get_by_id(conn: &DatabaseConnection, id: &str) -> Result<Option<User>> {
    let result = conn
        .query_one(Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"),
            [id.into()],
        ))
        .await?;

    result.as_ref().map(row_to_user).transpose()
}

/// Get user by email
pub async fn get_by_email(conn: &DatabaseConnection, email: &str) -> Result<Option<User>> {
    let result = conn
        .query_one(Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?"),
            [email.into()],
        ))
        .await?;

    result.as_ref().map(row_to_user).transpose()
}

/// Get password hash for user
pub async fn get_password_hash(conn: &DatabaseConnection, user_id: &str) -> Result<Option<String>> {
    let result = conn
        .query_one(Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            "SELECT password_hash FROM users WHERE id = ?",
            [user_id.into()],
        ))
        .await?;

    match result {
        Some(row) => Ok(Some(row.try_get("", "password_hash")?)),
        None => Ok(None),
    }
}

/// Update profile fields
pub async fn update_profile(conn: &DatabaseConnection, user: &User) -> Result<()> {
    let details = user.provider_details.clone().unwrap_or_default();
    conn.execute(Statement::from_sql_and_values(
        DatabaseBackend::Sqlite,
        "UPDATE users SET name = ?, contact_no = ?, address = ?, service_type = ?, \
         experience = ?, hourly_rate = ?, location_lat = ?, location_lng = ?, updated_at = ? \
         WHERE id = ?",
        [
            user.name.clone().into(),
            user.contact_no.clone().into(),
            user.address.clone().into(),
            details.service_type.into(),
            details.experience.into(),
            details.hourly_rate.into(),
            details.location.map(|p| p.lat).into(),
            details.location.map(|p| p.lng).into(),
            Utc::now().to_rfc3339().into(),
            user.id.clone().into(),
        ],
    ))
    .await
    .context("Failed to update user")?;

    Ok(())
}

/// Write the derived rating aggregate onto the provider's record.
pub async fn set_provider_rating(
    conn: &DatabaseConnection,
    provider_id: &str,
    average_rating: f64,
    rating_count: i64,
) -> Result<()> {
    conn.execute(Statement::from_sql_and_values(
        DatabaseBackend::Sqlite,
        "UPDATE users SET average_rating = ?, rating_count = ? WHERE id = ?",
        [
            average_rating.into(),
            rating_count.into(),
            provider_id.to_string().into(),
        ],
    ))
    .await
    .context("Failed to update provider rating")?;

    Ok(())
}
