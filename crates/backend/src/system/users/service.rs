use chrono::Utc;
use contracts::system::auth::RegisterRequest;
use contracts::system::users::{ProviderDetails, UpdateProfileDto, User, UserRole};
use sea_orm::DatabaseConnection;

use super::repository;
use crate::shared::error::ApiError;
use crate::system::auth::password;

fn is_plausible_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
}

/// Register a new user. Default role is consumer.
pub async fn register(conn: &DatabaseConnection, request: RegisterRequest) -> Result<User, ApiError> {
    let email = match request.email.as_deref().map(str::trim) {
        Some(e) if !e.is_empty() => e.to_string(),
        _ => return Err(ApiError::MissingField("email")),
    };
    let password = match request.password.as_deref() {
        Some(p) if !p.is_empty() => p.to_string(),
        _ => return Err(ApiError::MissingField("password")),
    };
    if !is_plausible_email(&email) {
        return Err(ApiError::InvalidInput("email is invalid".into()));
    }
    password::validate_password_strength(&password)
        .map_err(|e| ApiError::InvalidInput(e.to_string()))?;

    if repository::get_by_email(conn, &email).await?.is_some() {
        return Err(ApiError::InvalidInput("User already exists".into()));
    }

    let role = request.role.unwrap_or(UserRole::Consumer);
    let password_hash = password::hash_password(&password)?;

    let user = User {
        id: uuid::Uuid::new_v4().to_string(),
        name: request.name,
        email,
        role,
        contact_no: None,
        address: None,
        provider_details: match role {
            UserRole::Provider => Some(ProviderDetails::default()),
            UserRole::Consumer => None,
        },
        created_at: Utc::now(),
        updated_at: None,
    };

    repository::create_with_password(conn, &user, &password_hash).await?;

    Ok(user)
}

/// Check email/password and return the user on success.
pub async fn verify_credentials(
    conn: &DatabaseConnection,
    email: &str,
    password: &str,
) -> Result<Option<User>, ApiError> {
    let Some(user) = repository::get_by_email(conn, email).await? else {
        return Ok(None);
    };
    let Some(hash) = repository::get_password_hash(conn, &user.id).await? else {
        return Ok(None);
    };
    if password::verify_password(password, &hash)? {
        Ok(Some(user))
    } else {
        Ok(None)
    }
}

pub async fn get_by_id(conn: &DatabaseConnection, id: &str) -> Result<Option<User>, ApiError> {
    Ok(repository::get_by_id(conn, id).await?)
}

/// Update the caller's own profile.
pub async fn update_profile(
    conn: &DatabaseConnection,
    user_id: &str,
    dto: UpdateProfileDto,
) -> Result<User, ApiError> {
    let mut user = repository::get_by_id(conn, user_id)
        .await?
        .ok_or(ApiError::NotFound("User"))?;

    if let Some(location) = dto.location {
        if !location.is_valid() {
            return Err(ApiError::InvalidInput(
                "location must be valid [lat, lng] coordinates".into(),
            ));
        }
    }

    if dto.name.is_some() {
        user.name = dto.name;
    }
    if dto.contact_no.is_some() {
        user.contact_no = dto.contact_no;
    }
    if dto.address.is_some() {
        user.address = dto.address;
    }

    if user.role == UserRole::Provider {
        let mut details = user.provider_details.take().unwrap_or_default();
        if dto.service_type.is_some() {
            details.service_type = dto.service_type;
        }
        if dto.experience.is_some() {
            details.experience = dto.experience;
        }
        if dto.hourly_rate.is_some() {
            details.hourly_rate = dto.hourly_rate;
        }
        if dto.location.is_some() {
            details.location = dto.location;
        }
        user.provider_details = Some(details);
    }

    repository::update_profile(conn, &user).await?;

    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_plausibility() {
        assert!(is_plausible_email("user@example.com"));
        assert!(!is_plausible_email("userexample.com"));
        assert!(!is_plausible_email("user@com"));
        assert!(!is_plausible_email("@example.com"));
    }
}
