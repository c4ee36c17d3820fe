use axum::extract::{Path, State};
use axum::response::Redirect;

use crate::auth::CurrentUser;
use crate::error::AppError;
use crate::quest::{resolve_quest, QuestTarget};
use crate::server::AppState;

pub async fn resolve(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(target): Path<String>,
) -> Result<Redirect, AppError> {
    let target: QuestTarget = target.parse()?;
    let route = resolve_quest(state.items.as_ref(), user.id, target, &state.dice).await?;
    Ok(Redirect::to(&route.path()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::test_support::{redirect_target, state, user};
    use crate::models::{Item, SparkScore};

    #[tokio::test]
    async fn test_resolve_redirects() {
        let state = state();
        let user = user(&state, "mari").await;

        let target = redirect_target(
            resolve(State(state.clone()), user.clone(), Path("none".to_string()))
                .await
                .unwrap(),
        );
        assert_eq!(target, "/add");

        let mut sock = Item::new(user.id, "Lone sock".into(), "Clothes".into(), String::new());
        sock.score = Some(SparkScore::new(1).unwrap());
        let sock = state.items.add_item(sock).await.unwrap();

        let target = redirect_target(
            resolve(State(state.clone()), user.clone(), Path(sock.id.to_string()))
                .await
                .unwrap(),
        );
        assert_eq!(target, format!("/delete/{}", sock.id));
    }

    #[tokio::test]
    async fn test_resolve_garbage_target_is_not_found() {
        let state = state();
        let user = user(&state, "mari").await;

        let err = resolve(State(state), user, Path("17".to_string())).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
