use axum::extract::State;
use axum::response::Html;

use crate::actions;
use crate::auth::CurrentUser;
use crate::error::AppError;
use crate::server::AppState;
use crate::views;

pub async fn history(State(state): State<AppState>, user: CurrentUser) -> Result<Html<String>, AppError> {
    let history = actions::history(state.log.as_ref(), user.id).await?;
    Ok(Html(views::history_page(&user.username, &history)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::test_support::{state, user};
    use crate::models::{ActionKind, ActionLogEntry};

    #[tokio::test]
    async fn test_history_shows_counts_and_only_own_entries() {
        let state = state();
        let mari = user(&state, "mari").await;
        let kon = user(&state, "kon").await;

        for (owner, action, name) in [
            (mari.id, ActionKind::Rate, "Vase"),
            (mari.id, ActionKind::Delete, "Vase"),
            (mari.id, ActionKind::Rate, "Kettle"),
            (kon.id, ActionKind::Delete, "Secret box"),
        ] {
            state
                .log
                .append(ActionLogEntry::new(owner, action, name.into(), "calm".into()))
                .await
                .unwrap();
        }

        let Html(page) = history(State(state), mari).await.unwrap();
        assert!(page.contains("Rated: 2 · Let go: 1"));
        assert!(page.contains("Kettle"));
        assert!(!page.contains("Secret box"));
    }
}
