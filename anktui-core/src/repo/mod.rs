use crate::{CoreError, Deck, DeckId};
use async_trait::async_trait;

pub mod memory;

pub use memory::MemoryStore;

#[async_trait]
pub trait DeckStore: Send + Sync {
    async fn save_deck(&self, deck: &Deck) -> Result<(), CoreError>;
    async fn load_deck(&self, id: DeckId) -> Result<Deck, CoreError>;
    /// Every readable deck, oldest first. Decks that fail to load are skipped.
    async fn load_all_decks(&self) -> Result<Vec<Deck>, CoreError>;
    async fn delete_deck(&self, id: DeckId) -> Result<(), CoreError>;
    async fn deck_exists(&self, id: DeckId) -> bool;
    async fn list_deck_ids(&self) -> Result<Vec<DeckId>, CoreError>;
}
