//! Quest selection and resolution.
//!
//! The selector looks at a user's whole collection and picks the one thing
//! worth doing next: rate something unrated, think about letting go of the
//! lowest-scoring item, or add something new once everything is well loved.
//! The resolver turns an acknowledged quest into the screen that acts on it.

use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::Item;
use crate::storage::ItemStore;

/// URL segment standing for "no specific item".
pub const NEW_ITEM_SENTINEL: &str = "none";

/// Scores at or below this are disposal candidates.
pub const DISPOSE_THRESHOLD: u8 = 2;

/// Scores at or above this count as well curated.
pub const SATISFIED_THRESHOLD: u8 = 3;

pub const DISPOSE_TEMPLATES: [&str; 2] = [
    "It might be time to rethink {name}. Consider adding it to the let go list.",
    "Is {name} still doing its job? Think about letting go of it.",
];

const RATING_TEMPLATE: &str = "How much does {name} spark joy? Give it a spark score.";

const REVIEW_TEMPLATE: &str = "Take a light look at how {name} is doing.";

const SPECIAL_TEXT: &str = "Your things are in great shape! Why not register a new item?";

const DISPOSE_KEYWORDS: [&str; 4] = ["let go", "letting go", "dispose", "discard"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuestTarget {
    Item(Uuid),
    NewItem,
}

impl fmt::Display for QuestTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Item(id) => write!(f, "{}", id),
            Self::NewItem => f.write_str(NEW_ITEM_SENTINEL),
        }
    }
}

impl FromStr for QuestTarget {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == NEW_ITEM_SENTINEL {
            return Ok(Self::NewItem);
        }
        Uuid::parse_str(s)
            .map(Self::Item)
            .map_err(|_| AppError::NotFound(format!("No quest target '{}'", s)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestKind {
    Rating,
    Special,
    Dispose,
    Review,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quest {
    pub target: QuestTarget,
    pub item_name: Option<String>,
    pub text: String,
    pub kind: QuestKind,
}

impl Quest {
    fn for_item(item: &Item, text: String, kind: QuestKind) -> Self {
        Self {
            target: QuestTarget::Item(item.id),
            item_name: Some(item.name.clone()),
            text,
            kind,
        }
    }

    fn special() -> Self {
        Self {
            target: QuestTarget::NewItem,
            item_name: None,
            text: SPECIAL_TEXT.to_string(),
            kind: QuestKind::Special,
        }
    }

    pub fn is_special(&self) -> bool {
        self.kind == QuestKind::Special
    }
}

/// Picks the unfilled template for a single item along with its
/// classification. Templates carry a `{name}` placeholder.
pub fn quest_template_for<R: Rng + ?Sized>(item: &Item, rng: &mut R) -> (&'static str, QuestKind) {
    match item.score {
        None => (RATING_TEMPLATE, QuestKind::Rating),
        Some(score) if score.value() <= DISPOSE_THRESHOLD => {
            let template = DISPOSE_TEMPLATES
                .choose(rng)
                .copied()
                .unwrap_or(DISPOSE_TEMPLATES[0]);
            (template, QuestKind::Dispose)
        }
        Some(_) => (REVIEW_TEMPLATE, QuestKind::Review),
    }
}

/// Renders the quest text for a single item along with its classification.
///
/// Shared by the selector and the resolver so both always agree on what a
/// quest for a given item says.
pub fn quest_text_for<R: Rng + ?Sized>(item: &Item, rng: &mut R) -> (String, QuestKind) {
    let (template, kind) = quest_template_for(item, rng);
    (template.replace("{name}", &item.name), kind)
}

/// Picks the single highest-priority quest for a collection given in
/// insertion order. Returns `None` for an empty collection.
pub fn select_quest<R: Rng + ?Sized>(items: &[Item], rng: &mut R) -> Option<Quest> {
    if let Some(unrated) = items.iter().find(|i| i.is_unevaluated()) {
        let (text, kind) = quest_text_for(unrated, rng);
        return Some(Quest::for_item(unrated, text, kind));
    }

    let all_satisfied = items
        .iter()
        .all(|i| i.score.is_some_and(|s| s.value() >= SATISFIED_THRESHOLD));
    if !items.is_empty() && all_satisfied {
        return Some(Quest::special());
    }

    // min_by_key keeps the first of equal minimums
    let lowest = items
        .iter()
        .filter_map(|i| i.score.map(|s| (i, s)))
        .min_by_key(|(_, s)| *s)
        .map(|(i, _)| i)?;

    let (text, kind) = quest_text_for(lowest, rng);
    Some(Quest::for_item(lowest, text, kind))
}

/// True when a quest template asks the user to part with the item. Only
/// unfilled templates are scanned, so the item name never adds or hides a
/// keyword.
pub fn has_dispose_intent(template: &str) -> bool {
    let body = template.to_lowercase();
    DISPOSE_KEYWORDS.iter().any(|k| body.contains(k))
}

/// Where acknowledging a quest sends the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestRoute {
    AddItem,
    Rate(Uuid),
    Delete(Uuid),
}

impl QuestRoute {
    pub fn path(&self) -> String {
        match self {
            Self::AddItem => "/add".to_string(),
            Self::Rate(id) => format!("/rate/{}", id),
            Self::Delete(id) => format!("/delete/{}", id),
        }
    }
}

/// Routes an acknowledged quest. The item must belong to `owner_id`.
pub async fn resolve_quest<S>(
    store: &S,
    owner_id: Uuid,
    target: QuestTarget,
    dice: &QuestDice,
) -> Result<QuestRoute, AppError>
where
    S: ItemStore + ?Sized,
{
    let item_id = match target {
        QuestTarget::NewItem => return Ok(QuestRoute::AddItem),
        QuestTarget::Item(id) => id,
    };

    let item = store
        .find_item(owner_id, item_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Item {} not found", item_id)))?;

    if item.is_unevaluated() {
        return Ok(QuestRoute::Rate(item.id));
    }

    let (template, _) = dice.roll(|rng| quest_template_for(&item, rng));
    if has_dispose_intent(template) {
        Ok(QuestRoute::Delete(item.id))
    } else {
        Ok(QuestRoute::Rate(item.id))
    }
}

/// Shared, seedable randomness for quest templates.
#[derive(Clone)]
pub struct QuestDice {
    rng: Arc<Mutex<StdRng>>,
}

impl QuestDice {
    pub fn from_entropy() -> Self {
        Self::from_rng(StdRng::from_entropy())
    }

    pub fn seeded(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    pub fn from_seed_option(seed: Option<u64>) -> Self {
        seed.map_or_else(Self::from_entropy, Self::seeded)
    }

    fn from_rng(rng: StdRng) -> Self {
        Self {
            rng: Arc::new(Mutex::new(rng)),
        }
    }

    /// Runs `f` with exclusive access to the generator. Never hold the
    /// result of this across an await.
    pub fn roll<T>(&self, f: impl FnOnce(&mut StdRng) -> T) -> T {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut rng)
    }

    pub fn select(&self, items: &[Item]) -> Option<Quest> {
        self.roll(|rng| select_quest(items, rng))
    }
}
