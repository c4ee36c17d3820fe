//! Spark Joy: track your belongings, rate how much each one sparks joy,
//! and follow one small declutter quest at a time.

pub mod actions;
pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod quest;
pub mod server;
pub mod storage;
pub mod user_models;
pub mod user_storage;
pub mod views;

pub use error::AppError;
pub use quest::{select_quest, Quest, QuestDice, QuestKind, QuestRoute, QuestTarget};
