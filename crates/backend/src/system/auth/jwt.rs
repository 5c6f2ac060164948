use anyhow::{Context, Result};
use chrono::Utc;
use contracts::system::auth::TokenClaims;
use contracts::system::users::UserRole;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use rand::Rng;

/// Generate JWT access token
pub fn generate_access_token(
    secret: &str,
    user_id: &str,
    email: &str,
    role: UserRole,
    lifetime_hours: i64,
) -> Result<String> {
    let now = Utc::now();
    let exp = (now + chrono::Duration::hours(lifetime_hours)).timestamp() as usize;
    let iat = now.timestamp() as usize;

    let claims = TokenClaims {
        sub: user_id.to_string(),
        email: email.to_string(),
        role,
        exp,
        iat,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .context("Failed to encode JWT token")?;

    Ok(token)
}

/// Validate JWT token and extract claims
pub fn validate_token(secret: &str, token: &str) -> Result<TokenClaims> {
    let token_data = decode::<TokenClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .context("Failed to decode JWT token")?;

    Ok(token_data.claims)
}

/// Generate refresh token (UUID-based)
pub fn generate_refresh_token() -> String {
    uuid::Uuid::new_v4().to_string()
}

const REFRESH_TOKEN_LIFETIME_DAYS: i64 = 30;

pub fn calculate_refresh_token_expiration() -> String {
    (Utc::now() + chrono::Duration::days(REFRESH_TOKEN_LIFETIME_DAYS)).to_rfc3339()
}

/// Generate a cryptographically secure JWT secret (256 bits)
///
/// Used when the config does not pin a secret; tokens then only survive one
/// process lifetime.
pub fn generate_jwt_secret() -> String {
    use base64::{engine::general_purpose, Engine as _};
    let mut rng = rand::thread_rng();
    let random_bytes: Vec<u8> = (0..32).map(|_| rng.gen::<u8>()).collect();
    general_purpose::STANDARD.encode(&random_bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_token_round_trips() {
        let secret = generate_jwt_secret();
        let token =
            generate_access_token(&secret, "user-1", "a@b.com", UserRole::Provider, 24).unwrap();
        let claims = validate_token(&secret, &token).unwrap();
        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.email, "a@b.com");
        assert_eq!(claims.role, UserRole::Provider);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn token_fails_with_wrong_secret() {
        let token = generate_access_token("secret-a", "user-1", "a@b.com", UserRole::Consumer, 1)
            .unwrap();
        assert!(validate_token("secret-b", &token).is_err());
    }
}
