//! Registration, login and logout.

use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::http::HeaderMap;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Form;
use serde::Deserialize;

use crate::auth;
use crate::error::AppError;
use crate::server::AppState;
use crate::user_models::User;
use crate::views;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CredentialsForm {
    pub username: String,
    pub password: String,
}

pub async fn register_form() -> Html<String> {
    Html(views::register_page())
}

pub async fn login_form() -> Html<String> {
    Html(views::login_page())
}

pub async fn register_submit(
    State(state): State<AppState>,
    Form(form): Form<CredentialsForm>,
) -> Result<Response, AppError> {
    let user = auth::register(
        &state.users,
        &form.username,
        &form.password,
        state.min_password_len,
        state.bcrypt_cost,
    )
    .await?;
    logged_in(&state, &user).await
}

pub async fn login_submit(
    State(state): State<AppState>,
    Form(form): Form<CredentialsForm>,
) -> Result<Response, AppError> {
    let user = auth::authenticate(&state.users, &form.username, &form.password).await?;
    tracing::info!(user_id = %user.id, "user logged in");
    logged_in(&state, &user).await
}

async fn logged_in(state: &AppState, user: &User) -> Result<Response, AppError> {
    let session = state.users.start_session(user).await?;
    Ok((
        [(SET_COOKIE, auth::session_cookie(&session.token))],
        Redirect::to("/"),
    )
        .into_response())
}

pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Result<Response, AppError> {
    if let Some(token) = auth::session_token(&headers) {
        state.users.end_session(&token).await?;
    }
    Ok((
        [(SET_COOKIE, auth::expired_session_cookie())],
        Redirect::to("/login"),
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::CurrentUser;
    use crate::handlers::test_support::state;
    use axum::extract::FromRequestParts;
    use axum::http::header::COOKIE;
    use axum::http::{HeaderValue, Request, StatusCode};

    fn credentials(username: &str, password: &str) -> Form<CredentialsForm> {
        Form(CredentialsForm {
            username: username.to_string(),
            password: password.to_string(),
        })
    }

    fn issued_token(response: &Response) -> String {
        let cookie = response
            .headers()
            .get(SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .unwrap();
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_str(cookie.split(';').next().unwrap()).unwrap());
        auth::session_token(&headers).unwrap()
    }

    async fn extract_user(state: &AppState, token: Option<&str>) -> Result<CurrentUser, AppError> {
        let mut builder = Request::builder().uri("/");
        if let Some(token) = token {
            builder = builder.header(COOKIE, format!("spark_session={}", token));
        }
        let (mut parts, _) = builder.body(()).unwrap().into_parts();
        CurrentUser::from_request_parts(&mut parts, state).await
    }

    #[tokio::test]
    async fn test_register_login_logout_cycle() {
        let state = state();

        let response = register_submit(State(state.clone()), credentials("mari", "tidyup"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let token = issued_token(&response);
        let current = extract_user(&state, Some(&token)).await.unwrap();
        assert_eq!(current.username, "mari");

        let response = login_submit(State(state.clone()), credentials("mari", "tidyup"))
            .await
            .unwrap();
        let second = issued_token(&response);
        assert_ne!(token, second);

        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_str(&format!("spark_session={}", token)).unwrap());
        let response = logout(State(state.clone()), headers).await.unwrap();
        assert!(response
            .headers()
            .get(SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .unwrap()
            .contains("Max-Age=0"));

        assert!(matches!(extract_user(&state, Some(&token)).await, Err(AppError::Auth(_))));
        assert!(extract_user(&state, Some(&second)).await.is_ok());
    }

    #[tokio::test]
    async fn test_missing_session_is_auth_error() {
        let state = state();
        assert!(matches!(extract_user(&state, None).await, Err(AppError::Auth(_))));
        assert!(matches!(extract_user(&state, Some("forged")).await, Err(AppError::Auth(_))));
    }

    #[tokio::test]
    async fn test_bad_login_is_rejected() {
        let state = state();
        register_submit(State(state.clone()), credentials("mari", "tidyup"))
            .await
            .unwrap();

        let err = login_submit(State(state), credentials("mari", "messy!"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Auth(_)));
    }
}
