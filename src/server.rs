//! Axum router setup.

use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::AppConfig;
use crate::handlers::{account, history, items, quest};
use crate::quest::QuestDice;
use crate::storage::{ActionLogStore, ItemStore, Storage};
use crate::user_storage::UserStorage;

/// Everything a request handler needs, passed explicitly.
#[derive(Clone)]
pub struct AppState {
    pub items: Arc<dyn ItemStore>,
    pub log: Arc<dyn ActionLogStore>,
    pub users: Arc<UserStorage>,
    pub dice: QuestDice,
    pub min_password_len: usize,
    pub bcrypt_cost: u32,
}

impl AppState {
    pub fn new(storage: Arc<Storage>, users: Arc<UserStorage>, config: &AppConfig) -> Self {
        Self {
            items: storage.clone(),
            log: storage,
            users,
            dice: QuestDice::from_seed_option(config.quest_seed),
            min_password_len: config.min_password_len,
            bcrypt_cost: config.bcrypt_cost,
        }
    }

    /// Opens the on-disk stores under `config.data_dir`.
    pub fn open(config: &AppConfig) -> anyhow::Result<Self> {
        let storage = Arc::new(Storage::open(&config.data_dir)?);
        let users = Arc::new(UserStorage::open(&config.data_dir)?.with_session_ttl(config.session_ttl()));
        Ok(Self::new(storage, users, config))
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(items::home))
        .route("/add", get(items::add_form).post(items::add_submit))
        .route("/rate/:item_id", get(items::rate_form).post(items::rate_submit))
        .route("/delete/:item_id", get(items::delete_form).post(items::delete_submit))
        .route("/history", get(history::history))
        .route("/resolve_quest/:target", get(quest::resolve))
        .route("/register", get(account::register_form).post(account::register_submit))
        .route("/login", get(account::login_form).post(account::login_submit))
        .route("/logout", get(account::logout))
        .route("/health", get(health))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}
