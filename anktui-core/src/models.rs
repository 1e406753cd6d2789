use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::CoreError;

pub type DeckId = Uuid;
pub type CardId = Uuid;

pub const EF_MIN: f64 = 1.3;
pub const EF_DEFAULT: f64 = 2.5;

/// Interval (in days) from which a reviewed card counts as mature.
pub const MATURE_INTERVAL_DAYS: u32 = 21;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Rating {
    Again,
    Hard,
    Good,
    Easy,
}

impl Rating {
    pub const ALL: [Rating; 4] = [Rating::Again, Rating::Hard, Rating::Good, Rating::Easy];

    pub fn label(&self) -> &'static str {
        match self {
            Rating::Again => "Again",
            Rating::Hard => "Hard",
            Rating::Good => "Good",
            Rating::Easy => "Easy",
        }
    }

    /// 1-based key used by both the CLI prompt and the TUI.
    pub fn key(&self) -> u8 {
        match self {
            Rating::Again => 1,
            Rating::Hard => 2,
            Rating::Good => 3,
            Rating::Easy => 4,
        }
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Rating {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "1" | "a" | "again" => Ok(Rating::Again),
            "2" | "h" | "hard" => Ok(Rating::Hard),
            "3" | "g" | "good" => Ok(Rating::Good),
            "4" | "e" | "easy" => Ok(Rating::Easy),
            other => Err(CoreError::invalid(format!("unknown rating '{other}'"))),
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum StudyMode {
    /// Due cards first, then new cards up to the session limit.
    #[default]
    Review,
    /// Every card in deck order.
    Practice,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Card {
    pub id: CardId,
    pub front: String,
    pub back: String,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,

    pub interval: u32,
    pub repetition: u32,
    pub ease_factor: f64,
    pub next_review: DateTime<Utc>,
    #[serde(
        default,
        deserialize_with = "zero_time_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_review: Option<DateTime<Utc>>,
}

impl Card {
    pub fn new(front: impl Into<String>, back: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            front: front.into(),
            back: back.into(),
            created: now,
            modified: now,
            interval: 1,
            repetition: 0,
            ease_factor: EF_DEFAULT,
            next_review: now,
            last_review: None,
        }
    }

    /// Starting ease for a fresh card; never below [`EF_MIN`].
    pub fn with_ease_factor(mut self, ease_factor: f64) -> Self {
        self.ease_factor = ease_factor.max(EF_MIN);
        self
    }

    pub fn is_new(&self) -> bool {
        self.repetition == 0
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        now >= self.next_review
    }

    pub fn is_mature(&self) -> bool {
        !self.is_new() && self.interval >= MATURE_INTERVAL_DAYS
    }

    pub fn update_content(&mut self, front: impl Into<String>, back: impl Into<String>, now: DateTime<Utc>) {
        self.front = front.into();
        self.back = back.into();
        self.modified = now;
    }
}

/// Per-deck counters shown next to each deck in listings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DeckCounts {
    pub total: usize,
    pub new: usize,
    pub due: usize,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Deck {
    pub id: DeckId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub cards: Vec<Card>,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

impl Deck {
    pub fn new(name: impl Into<String>, description: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: description.into(),
            cards: Vec::new(),
            created: now,
            modified: now,
        }
    }

    pub fn add_card(&mut self, card: Card, now: DateTime<Utc>) -> Result<(), CoreError> {
        if self.cards.iter().any(|c| c.id == card.id) {
            return Err(CoreError::Conflict("card id already exists in deck"));
        }
        self.cards.push(card);
        self.touch(now);
        Ok(())
    }

    pub fn remove_card(&mut self, id: CardId, now: DateTime<Utc>) -> bool {
        let Some(pos) = self.cards.iter().position(|c| c.id == id) else {
            return false;
        };
        self.cards.remove(pos);
        self.touch(now);
        true
    }

    pub fn card(&self, id: CardId) -> Option<&Card> {
        self.cards.iter().find(|c| c.id == id)
    }

    pub fn card_mut(&mut self, id: CardId) -> Option<&mut Card> {
        self.cards.iter_mut().find(|c| c.id == id)
    }

    pub fn update_info(&mut self, name: impl Into<String>, description: impl Into<String>, now: DateTime<Utc>) {
        self.name = name.into();
        self.description = description.into();
        self.touch(now);
    }

    pub fn update_card_content(
        &mut self,
        id: CardId,
        front: &str,
        back: &str,
        now: DateTime<Utc>,
    ) -> Result<(), CoreError> {
        let card = self.card_mut(id).ok_or(CoreError::NotFound("card"))?;
        card.update_content(front, back, now);
        self.touch(now);
        Ok(())
    }

    pub fn due_cards(&self, now: DateTime<Utc>) -> Vec<Card> {
        crate::filters::due_cards(&self.cards, now)
    }

    pub fn new_cards(&self) -> Vec<Card> {
        crate::filters::new_cards(&self.cards)
    }

    pub fn card_counts(&self, now: DateTime<Utc>) -> DeckCounts {
        let mut counts = DeckCounts {
            total: self.cards.len(),
            ..DeckCounts::default()
        };
        for c in &self.cards {
            if c.is_new() {
                counts.new += 1;
            } else if c.is_due(now) {
                counts.due += 1;
            }
        }
        counts
    }

    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.modified = now;
    }
}

// Other writers emit `0001-01-01T00:00:00Z` for a card that was never reviewed.
fn zero_time_as_none<'de, D>(d: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<DateTime<Utc>>::deserialize(d)?;
    Ok(v.filter(|t| t.year() > 1))
}

fn null_as_empty<'de, D>(d: D) -> Result<Vec<Card>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<Card>>::deserialize(d)?.unwrap_or_default())
}
