use crate::{apply_review, Card, CardId, CoreError, Deck, DeckId, Rating, StudyMode};
use chrono::{DateTime, Utc};
use std::collections::HashSet;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    /// Question shown, answer hidden.
    Presenting,
    /// Answer shown, waiting for a rating.
    Revealed,
    Complete,
}

/// One sitting over a snapshot of a deck's cards. Never persisted.
#[derive(Clone, Debug)]
pub struct StudySession {
    pub deck_id: DeckId,
    pub deck_name: String,
    pub started_at: DateTime<Utc>,
    pub mode: StudyMode,
    cards: Vec<Card>,
    current_index: usize,
    state: SessionState,
    cards_studied: usize,
}

/// Converts a user-supplied card limit, rejecting negative values.
pub fn session_limit(max_cards: i64) -> Result<usize, CoreError> {
    usize::try_from(max_cards)
        .map_err(|_| CoreError::invalid(format!("session size must not be negative (got {max_cards})")))
}

/// Selects and orders the cards for one sitting.
///
/// Review mode takes every due card in deck order, then fills the remaining
/// budget with new cards that are not already queued. Practice mode takes the
/// whole deck. Both are capped at `max_cards`.
pub fn build_session(deck: &Deck, max_cards: usize, mode: StudyMode, now: DateTime<Utc>) -> StudySession {
    let mut cards = match mode {
        StudyMode::Review => {
            let mut queue = deck.due_cards(now);
            let queued: HashSet<CardId> = queue.iter().map(|c| c.id).collect();
            let fresh: Vec<Card> = deck
                .new_cards()
                .into_iter()
                .filter(|c| !queued.contains(&c.id))
                .collect();
            let budget = max_cards.saturating_sub(queue.len()).min(fresh.len());
            queue.extend(fresh.into_iter().take(budget));
            queue
        }
        StudyMode::Practice => deck.cards.clone(),
    };
    cards.truncate(max_cards);

    let state = if cards.is_empty() {
        SessionState::Complete
    } else {
        SessionState::Presenting
    };

    StudySession {
        deck_id: deck.id,
        deck_name: deck.name.clone(),
        started_at: now,
        mode,
        cards,
        current_index: 0,
        state,
        cards_studied: 0,
    }
}

impl StudySession {
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn showing_answer(&self) -> bool {
        self.state == SessionState::Revealed
    }

    pub fn cards_studied(&self) -> usize {
        self.cards_studied
    }

    pub fn is_finished(&self) -> bool {
        self.state == SessionState::Complete
    }

    pub fn current_card(&self) -> Option<&Card> {
        if self.is_finished() {
            return None;
        }
        self.cards.get(self.current_index)
    }

    pub fn reveal(&mut self) {
        if self.state == SessionState::Presenting {
            self.state = SessionState::Revealed;
        }
    }

    pub fn advance(&mut self) -> Result<SessionState, CoreError> {
        if self.state != SessionState::Revealed {
            return Err(CoreError::invalid("advance requires the answer to be revealed"));
        }
        if self.current_index + 1 < self.cards.len() {
            self.current_index += 1;
            self.cards_studied += 1;
            self.state = SessionState::Presenting;
        } else {
            self.state = SessionState::Complete;
        }
        Ok(self.state)
    }

    /// Rates the current card against its owning deck and refreshes the
    /// session's snapshot so the two cannot drift apart. Does not advance.
    pub fn rate_current(&mut self, deck: &mut Deck, rating: Rating, now: DateTime<Utc>) -> Result<Card, CoreError> {
        if self.state != SessionState::Revealed {
            return Err(CoreError::invalid("rating requires the answer to be revealed"));
        }
        if deck.id != self.deck_id {
            return Err(CoreError::invalid("session belongs to a different deck"));
        }
        let id = self.cards[self.current_index].id;
        let card = deck.card_mut(id).ok_or(CoreError::NotFound("card"))?;
        apply_review(card, rating, now);
        let updated = card.clone();
        deck.touch(now);
        self.cards[self.current_index] = updated.clone();
        Ok(updated)
    }

    /// Rebuilds the session from the deck with the same mode.
    pub fn restart(&mut self, deck: &Deck, max_cards: usize, now: DateTime<Utc>) {
        *self = build_session(deck, max_cards, self.mode, now);
    }

    /// `(position, total)` with a 1-based position.
    pub fn progress(&self) -> (usize, usize) {
        let total = self.cards.len();
        ((self.current_index + 1).min(total), total)
    }

    pub fn remaining(&self) -> usize {
        if self.is_finished() {
            return 0;
        }
        self.cards.len().saturating_sub(self.current_index + 1)
    }

    /// Cards rated so far, including the last one once the session is complete.
    pub fn completed(&self) -> usize {
        if self.is_finished() && !self.cards.is_empty() {
            self.cards_studied + 1
        } else {
            self.cards_studied
        }
    }
}
