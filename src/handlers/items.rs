//! Home page plus the add, rate and delete flows.

use axum::extract::{Path, State};
use axum::response::{Html, Redirect};
use axum::Form;
use serde::Deserialize;

use super::parse_item_id;
use crate::actions;
use crate::auth::CurrentUser;
use crate::error::AppError;
use crate::models::{parse_mood, NewItem, SparkScore};
use crate::server::AppState;
use crate::views;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AddItemForm {
    pub name: String,
    pub category: String,
    pub features: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RateForm {
    pub score: String,
    pub mood: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DeleteForm {
    pub mood: Option<String>,
}

pub async fn home(State(state): State<AppState>, user: CurrentUser) -> Result<Html<String>, AppError> {
    let items = state.items.items_for_owner(user.id).await?;
    let quest = state.dice.select(&items);

    let newest_first: Vec<_> = items.into_iter().rev().collect();
    Ok(Html(views::home_page(&user.username, &newest_first, quest.as_ref())))
}

pub async fn add_form(user: CurrentUser) -> Html<String> {
    Html(views::add_item_page(&user.username))
}

pub async fn add_submit(
    State(state): State<AppState>,
    user: CurrentUser,
    Form(form): Form<AddItemForm>,
) -> Result<Redirect, AppError> {
    let new_item = NewItem::parse(&form.name, &form.category, form.features.as_deref())?;
    actions::add_item(state.items.as_ref(), user.id, new_item).await?;
    Ok(Redirect::to("/"))
}

pub async fn rate_form(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(item_id): Path<String>,
) -> Result<Html<String>, AppError> {
    let item_id = parse_item_id(&item_id)?;
    let item = actions::find_owned(state.items.as_ref(), user.id, item_id).await?;
    Ok(Html(views::rate_page(&user.username, &item)))
}

pub async fn rate_submit(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(item_id): Path<String>,
    Form(form): Form<RateForm>,
) -> Result<Redirect, AppError> {
    let item_id = parse_item_id(&item_id)?;
    let score = SparkScore::parse(&form.score)?;
    let mood = parse_mood(form.mood.as_deref())?;

    actions::rate_item(
        state.items.as_ref(),
        state.log.as_ref(),
        user.id,
        item_id,
        score,
        mood,
    )
    .await?;
    Ok(Redirect::to("/"))
}

pub async fn delete_form(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(item_id): Path<String>,
) -> Result<Html<String>, AppError> {
    let item_id = parse_item_id(&item_id)?;
    let item = actions::find_owned(state.items.as_ref(), user.id, item_id).await?;
    Ok(Html(views::delete_page(&user.username, &item)))
}

pub async fn delete_submit(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(item_id): Path<String>,
    Form(form): Form<DeleteForm>,
) -> Result<Redirect, AppError> {
    let item_id = parse_item_id(&item_id)?;
    let mood = parse_mood(form.mood.as_deref())?;

    actions::dispose_item(state.items.as_ref(), state.log.as_ref(), user.id, item_id, mood).await?;
    Ok(Redirect::to("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::test_support::{redirect_target, state, user};
    use crate::models::DEFAULT_MOOD;

    fn add(name: &str) -> Form<AddItemForm> {
        Form(AddItemForm {
            name: name.to_string(),
            category: "Misc".to_string(),
            features: None,
        })
    }

    #[tokio::test]
    async fn test_add_then_home_shows_rating_quest() {
        let state = state();
        let user = user(&state, "mari").await;

        let redirect = add_submit(State(state.clone()), user.clone(), add("Teapot")).await.unwrap();
        assert_eq!(redirect_target(redirect), "/");

        let Html(page) = home(State(state.clone()), user.clone()).await.unwrap();
        assert!(page.contains("Teapot"));
        assert!(page.contains("class=\"quest\""));
        assert!(page.contains("spark score"));
    }

    #[tokio::test]
    async fn test_empty_home_has_no_quest() {
        let state = state();
        let user = user(&state, "mari").await;

        let Html(page) = home(State(state), user).await.unwrap();
        assert!(!page.contains("class=\"quest\""));
    }

    #[tokio::test]
    async fn test_add_rejects_blank_name() {
        let state = state();
        let user = user(&state, "mari").await;

        let err = add_submit(State(state), user, add("  ")).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_rate_submit_validates_score() {
        let state = state();
        let user = user(&state, "mari").await;
        add_submit(State(state.clone()), user.clone(), add("Rug")).await.unwrap();
        let rug = state.items.items_for_owner(user.id).await.unwrap().remove(0);

        for bad in ["", "abc", "0", "9"] {
            let form = Form(RateForm {
                score: bad.to_string(),
                mood: None,
            });
            let err = rate_submit(State(state.clone()), user.clone(), Path(rug.id.to_string()), form)
                .await
                .unwrap_err();
            assert!(matches!(err, AppError::Validation(_)), "score {:?}", bad);
        }

        let form = Form(RateForm {
            score: "3".to_string(),
            mood: None,
        });
        rate_submit(State(state.clone()), user.clone(), Path(rug.id.to_string()), form)
            .await
            .unwrap();

        let entries = state.log.entries_for_owner(user.id).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].mood, DEFAULT_MOOD);
    }

    #[tokio::test]
    async fn test_other_users_items_are_not_found() {
        let state = state();
        let owner = user(&state, "mari").await;
        let intruder = user(&state, "kon").await;
        add_submit(State(state.clone()), owner.clone(), add("Journal")).await.unwrap();
        let journal = state.items.items_for_owner(owner.id).await.unwrap().remove(0);

        let err = rate_form(State(state.clone()), intruder.clone(), Path(journal.id.to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let form = Form(DeleteForm { mood: None });
        let err = delete_submit(State(state.clone()), intruder, Path(journal.id.to_string()), form)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert_eq!(state.items.items_for_owner(owner.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_malformed_item_id_is_not_found() {
        let state = state();
        let user = user(&state, "mari").await;

        let err = delete_form(State(state), user, Path("42".to_string())).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_submit_removes_item_and_logs() {
        let state = state();
        let user = user(&state, "mari").await;
        add_submit(State(state.clone()), user.clone(), add("Broken clock")).await.unwrap();
        let clock = state.items.items_for_owner(user.id).await.unwrap().remove(0);

        let form = Form(DeleteForm {
            mood: Some("grateful".to_string()),
        });
        let redirect = delete_submit(State(state.clone()), user.clone(), Path(clock.id.to_string()), form)
            .await
            .unwrap();
        assert_eq!(redirect_target(redirect), "/");

        assert!(state.items.items_for_owner(user.id).await.unwrap().is_empty());
        let entries = state.log.entries_for_owner(user.id).await.unwrap();
        assert_eq!(entries[0].item_name, "Broken clock");
        assert_eq!(entries[0].mood, "grateful");
    }
}
