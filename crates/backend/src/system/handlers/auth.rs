use axum::extract::{Json, State};
use axum::http::StatusCode;
use contracts::system::auth::{
    LoginRequest, LoginResponse, RefreshRequest, RefreshResponse, RegisterRequest, UserInfo,
};
use contracts::system::users::{UpdateProfileDto, User};
use sea_orm::{ConnectionTrait, DatabaseBackend, DatabaseConnection, Statement};

use crate::shared::error::ApiError;
use crate::shared::state::AppState;
use crate::system::auth::extractor::CurrentUser;
use crate::system::auth::jwt;
use crate::system::users::service as user_service;

fn user_info(user: &User) -> UserInfo {
    UserInfo {
        id: user.id.clone(),
        email: user.email.clone(),
        name: user.name.clone(),
        role: user.role,
    }
}

/// POST /api/users/register
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<LoginResponse>), ApiError> {
    let user = user_service::register(&state.db, request).await?;

    let access_token = jwt::generate_access_token(
        &state.jwt_secret,
        &user.id,
        &user.email,
        user.role,
        state.config.auth.access_token_lifetime_hours,
    )?;
    let refresh_token = jwt::generate_refresh_token();
    store_refresh_token(&state.db, &user.id, &refresh_token).await?;

    let response = LoginResponse {
        access_token,
        refresh_token,
        user: user_info(&user),
    };
    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /api/users/login
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let user = user_service::verify_credentials(&state.db, &request.email, &request.password)
        .await?
        .ok_or_else(|| ApiError::Forbidden("Invalid email or password".into()))?;

    let access_token = jwt::generate_access_token(
        &state.jwt_secret,
        &user.id,
        &user.email,
        user.role,
        state.config.auth.access_token_lifetime_hours,
    )?;
    let refresh_token = jwt::generate_refresh_token();
    store_refresh_token(&state.db, &user.id, &refresh_token).await?;

    Ok(Json(LoginResponse {
        access_token,
        refresh_token,
        user: user_info(&user),
    }))
}

/// POST /api/users/refresh
pub async fn refresh(
    State(state): State<AppState>,
    Json(request): Json<RefreshRequest>,
) -> Result<Json<RefreshResponse>, ApiError> {
    let user_id = validate_refresh_token(&state.db, &request.refresh_token)
        .await
        .map_err(|_| ApiError::Forbidden("Invalid or expired refresh token".into()))?;

    let user = user_service::get_by_id(&state.db, &user_id)
        .await?
        .ok_or(ApiError::NotFound("User"))?;

    let access_token = jwt::generate_access_token(
        &state.jwt_secret,
        &user.id,
        &user.email,
        user.role,
        state.config.auth.access_token_lifetime_hours,
    )?;

    Ok(Json(RefreshResponse { access_token }))
}

/// POST /api/users/logout
pub async fn logout(
    State(state): State<AppState>,
    Json(request): Json<RefreshRequest>,
) -> Result<StatusCode, ApiError> {
    revoke_refresh_token(&state.db, &request.refresh_token).await?;
    Ok(StatusCode::OK)
}

/// GET /api/users/me (protected)
pub async fn current_user(
    State(state): State<AppState>,
    CurrentUser(claims): CurrentUser,
) -> Result<Json<User>, ApiError> {
    let user = user_service::get_by_id(&state.db, &claims.sub)
        .await?
        .ok_or(ApiError::NotFound("User"))?;
    Ok(Json(user))
}

/// PUT /api/users/me (protected)
pub async fn update_profile(
    State(state): State<AppState>,
    CurrentUser(claims): CurrentUser,
    Json(dto): Json<UpdateProfileDto>,
) -> Result<Json<User>, ApiError> {
    let user = user_service::update_profile(&state.db, &claims.sub, dto).await?;
    Ok(Json(user))
}

async fn store_refresh_token(
    conn: &DatabaseConnection,
    user_id: &str,
    token: &str,
) -> anyhow::Result<()> {
    let token_id = uuid::Uuid::new_v4().to_string();
    let token_hash = hash_token(token);
    let expires_at = jwt::calculate_refresh_token_expiration();
    let created_at = chrono::Utc::now().to_rfc3339();

    conn.execute(Statement::from_sql_and_values(
        DatabaseBackend::Sqlite,
        "INSERT INTO sys_refresh_tokens (id, user_id, token_hash, expires_at, created_at) \
         VALUES (?, ?, ?, ?, ?)",
        [
            token_id.into(),
            user_id.to_string().into(),
            token_hash.into(),
            expires_at.into(),
            created_at.into(),
        ],
    ))
    .await?;

    Ok(())
}

async fn validate_refresh_token(conn: &DatabaseConnection, token: &str) -> anyhow::Result<String> {
    let token_hash = hash_token(token);
    let now = chrono::Utc::now().to_rfc3339();

    let result = conn
        .query_one(Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            "SELECT user_id FROM sys_refresh_tokens \
             WHERE token_hash = ? AND expires_at > ? AND revoked_at IS NULL",
            [token_hash.into(), now.into()],
        ))
        .await?;

    match result {
        Some(row) => {
            let user_id: String = row.try_get("", "user_id")?;
            Ok(user_id)
        }
        None => Err(anyhow::anyhow!("Invalid or expired refresh token")),
    }
}

async fn revoke_refresh_token(conn: &DatabaseConnection, token: &str) -> anyhow::Result<()> {
    let token_hash = hash_token(token);
    let revoked_at = chrono::Utc::now().to_rfc3339();

    conn.execute(Statement::from_sql_and_values(
        DatabaseBackend::Sqlite,
        "UPDATE sys_refresh_tokens SET revoked_at = ? WHERE token_hash = ?",
        [revoked_at.into(), token_hash.into()],
    ))
    .await?;

    Ok(())
}

fn hash_token(token: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}
