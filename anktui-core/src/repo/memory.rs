use crate::{CoreError, Deck, DeckId};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;

#[derive(Default)]
pub struct MemoryStore {
    decks: RwLock<HashMap<DeckId, Deck>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl crate::repo::DeckStore for MemoryStore {
    async fn save_deck(&self, deck: &Deck) -> Result<(), CoreError> {
        self.decks.write().insert(deck.id, deck.clone());
        Ok(())
    }

    async fn load_deck(&self, id: DeckId) -> Result<Deck, CoreError> {
        self.decks
            .read()
            .get(&id)
            .cloned()
            .ok_or(CoreError::NotFound("deck"))
    }

    async fn load_all_decks(&self) -> Result<Vec<Deck>, CoreError> {
        let mut v: Vec<Deck> = self.decks.read().values().cloned().collect();
        v.sort_by_key(|d| d.created);
        Ok(v)
    }

    async fn delete_deck(&self, id: DeckId) -> Result<(), CoreError> {
        self.decks
            .write()
            .remove(&id)
            .map(|_| ())
            .ok_or(CoreError::NotFound("deck"))
    }

    async fn deck_exists(&self, id: DeckId) -> bool {
        self.decks.read().contains_key(&id)
    }

    async fn list_deck_ids(&self) -> Result<Vec<DeckId>, CoreError> {
        Ok(self.decks.read().keys().copied().collect())
    }
}
