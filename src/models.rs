use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;

pub const MAX_NAME_LEN: usize = 100;
pub const MAX_CATEGORY_LEN: usize = 50;
pub const MAX_FEATURES_LEN: usize = 200;
pub const MAX_MOOD_LEN: usize = 100;

/// Mood recorded when the user leaves the field blank.
pub const DEFAULT_MOOD: &str = "none";

/// How strongly an item sparks joy, always within 1..=5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct SparkScore(u8);

impl SparkScore {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn new(value: i64) -> Result<Self, AppError> {
        if (i64::from(Self::MIN)..=i64::from(Self::MAX)).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(AppError::Validation(format!(
                "Spark score must be between {} and {}, got {}",
                Self::MIN,
                Self::MAX,
                value
            )))
        }
    }

    /// Parses raw form input such as `" 4 "`.
    pub fn parse(raw: &str) -> Result<Self, AppError> {
        let value: i64 = raw
            .trim()
            .parse()
            .map_err(|_| AppError::Validation(format!("Spark score must be an integer, got '{}'", raw)))?;
        Self::new(value)
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for SparkScore {
    type Error = AppError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(i64::from(value))
    }
}

impl From<SparkScore> for u8 {
    fn from(score: SparkScore) -> Self {
        score.0
    }
}

impl fmt::Display for SparkScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub features: String,
    pub score: Option<SparkScore>,
    pub created_at: DateTime<Utc>,
}

impl Item {
    pub fn new(owner_id: Uuid, name: String, category: String, features: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id,
            name,
            category,
            features,
            score: None,
            created_at: Utc::now(),
        }
    }

    pub fn is_unevaluated(&self) -> bool {
        self.score.is_none()
    }
}

/// A validated add-item submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewItem {
    pub name: String,
    pub category: String,
    pub features: String,
}

impl NewItem {
    pub fn parse(name: &str, category: &str, features: Option<&str>) -> Result<Self, AppError> {
        let name = required_field("Name", name, MAX_NAME_LEN)?;
        let category = required_field("Category", category, MAX_CATEGORY_LEN)?;
        let features = features.unwrap_or_default().trim().to_string();
        check_len("Features", &features, MAX_FEATURES_LEN)?;

        Ok(Self {
            name,
            category,
            features,
        })
    }

    pub fn into_item(self, owner_id: Uuid) -> Item {
        Item::new(owner_id, self.name, self.category, self.features)
    }
}

/// Normalizes a mood tag, falling back to [`DEFAULT_MOOD`] when blank.
pub fn parse_mood(raw: Option<&str>) -> Result<String, AppError> {
    let mood = raw.map(str::trim).unwrap_or_default();
    if mood.is_empty() {
        return Ok(DEFAULT_MOOD.to_string());
    }
    check_len("Mood", mood, MAX_MOOD_LEN)?;
    Ok(mood.to_string())
}

pub(crate) fn required_field(label: &str, raw: &str, max: usize) -> Result<String, AppError> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(AppError::Validation(format!("{} cannot be empty", label)));
    }
    check_len(label, value, max)?;
    Ok(value.to_string())
}

fn check_len(label: &str, value: &str, max: usize) -> Result<(), AppError> {
    if value.chars().count() > max {
        return Err(AppError::Validation(format!(
            "{} must be at most {} characters",
            label, max
        )));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Rate,
    Delete,
}

impl ActionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Rate => "rate",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One rate or delete event. `item_name` is a snapshot taken when the
/// action happened, so it outlives the item itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionLogEntry {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub action: ActionKind,
    pub item_name: String,
    pub mood: String,
    pub timestamp: DateTime<Utc>,
}

impl ActionLogEntry {
    pub fn new(owner_id: Uuid, action: ActionKind, item_name: String, mood: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id,
            action,
            item_name,
            mood,
            timestamp: Utc::now(),
        }
    }
}

/// Rate vs delete totals shown on the history page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActionCounts {
    pub rated: usize,
    pub deleted: usize,
}

impl ActionCounts {
    pub fn tally(entries: &[ActionLogEntry]) -> Self {
        entries.iter().fold(Self::default(), |mut counts, entry| {
            match entry.action {
                ActionKind::Rate => counts.rated += 1,
                ActionKind::Delete => counts.deleted += 1,
            }
            counts
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spark_score_bounds() {
        assert!(SparkScore::new(0).is_err());
        assert!(SparkScore::new(6).is_err());
        assert_eq!(SparkScore::new(1).unwrap().value(), 1);
        assert_eq!(SparkScore::new(5).unwrap().value(), 5);
    }

    #[test]
    fn test_spark_score_parse_rejects_non_integers() {
        assert!(matches!(SparkScore::parse("abc"), Err(AppError::Validation(_))));
        assert!(matches!(SparkScore::parse("3.5"), Err(AppError::Validation(_))));
        assert_eq!(SparkScore::parse(" 4 ").unwrap().value(), 4);
    }

    #[test]
    fn test_spark_score_deserialize_out_of_range_fails() {
        assert!(serde_json::from_str::<SparkScore>("0").is_err());
        assert_eq!(serde_json::from_str::<SparkScore>("3").unwrap().value(), 3);
    }

    #[test]
    fn test_new_item_trims_and_validates() {
        let item = NewItem::parse("  Scarf ", "Clothes", Some(" wool ")).unwrap();
        assert_eq!(item.name, "Scarf");
        assert_eq!(item.features, "wool");

        assert!(NewItem::parse("   ", "Clothes", None).is_err());
        assert!(NewItem::parse("Scarf", "", None).is_err());
        assert!(NewItem::parse(&"x".repeat(MAX_NAME_LEN + 1), "Clothes", None).is_err());
    }

    #[test]
    fn test_new_item_starts_unevaluated() {
        let owner = Uuid::new_v4();
        let item = NewItem::parse("Mug", "Kitchen", None).unwrap().into_item(owner);
        assert!(item.is_unevaluated());
        assert_eq!(item.owner_id, owner);
        assert_eq!(item.features, "");
    }

    #[test]
    fn test_parse_mood_defaults_when_blank() {
        assert_eq!(parse_mood(None).unwrap(), DEFAULT_MOOD);
        assert_eq!(parse_mood(Some("  ")).unwrap(), DEFAULT_MOOD);
        assert_eq!(parse_mood(Some("relieved")).unwrap(), "relieved");
        assert!(parse_mood(Some(&"m".repeat(MAX_MOOD_LEN + 1))).is_err());
    }

    #[test]
    fn test_action_counts_tally() {
        let owner = Uuid::new_v4();
        let entries = vec![
            ActionLogEntry::new(owner, ActionKind::Rate, "A".into(), "calm".into()),
            ActionLogEntry::new(owner, ActionKind::Rate, "B".into(), "calm".into()),
            ActionLogEntry::new(owner, ActionKind::Delete, "B".into(), "free".into()),
        ];
        assert_eq!(
            ActionCounts::tally(&entries),
            ActionCounts {
                rated: 2,
                deleted: 1
            }
        );
    }
}
