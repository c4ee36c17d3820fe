//! Accounts, password hashing and the session cookie.

use anyhow::Context;
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::COOKIE;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::required_field;
use crate::server::AppState;
use crate::user_models::{Session, User, MAX_USERNAME_LEN};
use crate::user_storage::UserStorage;

pub const SESSION_COOKIE: &str = "spark_session";

/// The logged-in user behind the current request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: Uuid,
    pub username: String,
}

impl From<&Session> for CurrentUser {
    fn from(session: &Session) -> Self {
        Self {
            id: session.user_id,
            username: session.username.clone(),
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = session_token(&parts.headers)
            .ok_or_else(|| AppError::Auth("Please log in first".to_string()))?;

        let session = state
            .users
            .find_session(&token)
            .await?
            .ok_or_else(|| AppError::Auth("Your session has expired, please log in again".to_string()))?;

        Ok(CurrentUser::from(&session))
    }
}

/// Pulls the session token out of the `Cookie` header(s).
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

pub fn session_cookie(token: &str) -> String {
    format!("{}={}; Path=/; HttpOnly; SameSite=Lax", SESSION_COOKIE, token)
}

pub fn expired_session_cookie() -> String {
    format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", SESSION_COOKIE)
}

pub async fn hash_password(password: String, cost: u32) -> Result<String, AppError> {
    let hash = tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .context("Password hashing task failed")?
        .context("Failed to hash password")?;
    Ok(hash)
}

pub async fn verify_password(password: String, hash: String) -> Result<bool, AppError> {
    let valid = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .context("Password verification task failed")?
        .context("Failed to verify password")?;
    Ok(valid)
}

/// Creates an account after validating the credentials.
pub async fn register(
    users: &UserStorage,
    username: &str,
    password: &str,
    min_password_len: usize,
    bcrypt_cost: u32,
) -> Result<User, AppError> {
    let username = required_field("Username", username, MAX_USERNAME_LEN)?;
    if password.chars().count() < min_password_len {
        return Err(AppError::Validation(format!(
            "Password must be at least {} characters long",
            min_password_len
        )));
    }
    let taken = || AppError::Conflict(format!("Username '{}' is already taken", username));
    if users.username_taken(&username).await {
        return Err(taken());
    }

    let password_hash = hash_password(password.to_string(), bcrypt_cost).await?;
    let user = users
        .create_user(User::new(username.clone(), password_hash))
        .await?
        .ok_or_else(taken)?;
    tracing::info!(user_id = %user.id, username = %user.username, "registered user");
    Ok(user)
}

/// Checks credentials. Unknown users and wrong passwords look the same.
pub async fn authenticate(users: &UserStorage, username: &str, password: &str) -> Result<User, AppError> {
    let invalid = || AppError::Auth("Invalid username or password".to_string());

    let Some(user) = users.get_user_by_username(username.trim()).await? else {
        tracing::warn!(username = %username.trim(), "login for unknown user");
        return Err(invalid());
    };

    if !verify_password(password.to_string(), user.password_hash.clone()).await? {
        tracing::warn!(username = %user.username, "login with wrong password");
        return Err(invalid());
    }

    Ok(user)
}
