use crate::Card;
use chrono::{DateTime, Utc};

pub fn due_cards(cards: &[Card], now: DateTime<Utc>) -> Vec<Card> {
    cards.iter().filter(|c| c.is_due(now)).cloned().collect()
}

pub fn new_cards(cards: &[Card]) -> Vec<Card> {
    cards.iter().filter(|c| c.is_new()).cloned().collect()
}

pub fn filter_by_text(cards: &[Card], query: &str) -> Vec<Card> {
    let q = query.trim().to_lowercase();
    if q.is_empty() {
        return cards.to_vec();
    }
    cards
        .iter()
        .filter(|c| c.front.to_lowercase().contains(&q) || c.back.to_lowercase().contains(&q))
        .cloned()
        .collect()
}
