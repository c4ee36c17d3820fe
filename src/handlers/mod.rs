//! Request handlers.

pub mod account;
pub mod history;
pub mod items;
pub mod quest;

use uuid::Uuid;

use crate::error::AppError;

/// Malformed ids can never name an item, so they are simply not found.
pub(crate) fn parse_item_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::NotFound(format!("Item {} not found", raw)))
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use axum::http::header::LOCATION;
    use axum::http::StatusCode;
    use axum::response::{IntoResponse, Response};

    use crate::auth::{self, CurrentUser};
    use crate::config::AppConfig;
    use crate::server::AppState;
    use crate::storage::Storage;
    use crate::user_storage::UserStorage;

    pub fn state() -> AppState {
        let config = AppConfig {
            bcrypt_cost: 4,
            quest_seed: Some(11),
            ..AppConfig::default()
        };
        AppState::new(Arc::new(Storage::in_memory()), Arc::new(UserStorage::in_memory()), &config)
    }

    pub async fn user(state: &AppState, name: &str) -> CurrentUser {
        let user = auth::register(&state.users, name, "password", 6, 4).await.unwrap();
        let session = state.users.start_session(&user).await.unwrap();
        CurrentUser::from(&session)
    }

    /// Location of a 303 redirect.
    pub fn redirect_target(response: impl IntoResponse) -> String {
        let response: Response = response.into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string()
    }
}
