use anktui_core::{repo::DeckStore, CoreError, Deck, DeckId};
use async_trait::async_trait;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tokio::task;
use tracing::{debug, info, warn};
use uuid::Uuid;

pub mod paths;

/// Where and how many timestamped copies of each deck to keep.
#[derive(Clone, Debug)]
pub struct BackupPolicy {
    pub dir: PathBuf,
    pub keep: usize,
}

/// Stores each deck as `<deck-id>.json` inside one data directory.
pub struct JsonStore {
    data_dir: PathBuf,
    backups: Option<BackupPolicy>,
}

impl JsonStore {
    pub fn open(data_dir: PathBuf, backups: Option<BackupPolicy>) -> Result<Self, CoreError> {
        ensure_dir(&data_dir)?;
        let backups = match backups {
            Some(b) => {
                ensure_dir(&b.dir)?;
                Some(BackupPolicy { dir: b.dir, keep: b.keep.max(1) })
            }
            None => None,
        };
        info!(data_dir = %data_dir.display(), backups = backups.is_some(), "opened json deck store");
        Ok(Self { data_dir, backups })
    }

    fn deck_path(&self, id: DeckId) -> PathBuf {
        paths::deck_file(&self.data_dir, id)
    }
}

fn ensure_dir(path: &Path) -> Result<(), CoreError> {
    fs::create_dir_all(path).map_err(|e| CoreError::persistence(format!("{}: {e}", path.display())))
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), std::io::Error> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.flush()?;
    tmp.persist(path)?;
    Ok(())
}

fn write_backup(policy: &BackupPolicy, id: DeckId, bytes: &[u8]) -> Result<(), std::io::Error> {
    let ts = chrono::Local::now().format("%Y%m%d-%H%M%S");
    let backup_path = policy.dir.join(format!("{id}-{ts}.json"));
    write_atomic(&backup_path, bytes)?;
    rotate_backups(&policy.dir, id, policy.keep)
}

/// Drops the oldest backups of one deck beyond `keep`. Names sort by timestamp.
fn rotate_backups(dir: &Path, id: DeckId, keep: usize) -> Result<(), std::io::Error> {
    let prefix = format!("{id}-");
    let mut entries: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.extension().and_then(|s| s.to_str()) == Some("json"))
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .map(|n| n.starts_with(&prefix))
                .unwrap_or(false)
        })
        .collect();
    entries.sort();
    if entries.len() > keep {
        for p in &entries[0..entries.len() - keep] {
            if let Err(e) = fs::remove_file(p) {
                warn!(file = %p.display(), error = %e, "could not remove old backup");
            }
        }
    }
    Ok(())
}

fn read_deck(path: &Path) -> Result<Deck, CoreError> {
    let buf = fs::read_to_string(path).map_err(CoreError::persistence)?;
    serde_json::from_str::<Deck>(&buf)
        .map_err(|e| CoreError::persistence(format!("{}: {e}", path.display())))
}

#[async_trait]
impl DeckStore for JsonStore {
    async fn save_deck(&self, deck: &Deck) -> Result<(), CoreError> {
        let json = serde_json::to_vec_pretty(deck).map_err(CoreError::persistence)?;
        let path = self.deck_path(deck.id);
        let backups = self.backups.clone();
        let id = deck.id;

        task::spawn_blocking(move || {
            write_atomic(&path, &json)?;
            if let Some(policy) = backups {
                write_backup(&policy, id, &json)?;
            }
            Ok::<(), std::io::Error>(())
        })
        .await
        .map_err(CoreError::persistence)?
        .map_err(CoreError::persistence)?;

        debug!(deck = %deck.id, cards = deck.cards.len(), "saved deck");
        Ok(())
    }

    async fn load_deck(&self, id: DeckId) -> Result<Deck, CoreError> {
        let path = self.deck_path(id);
        task::spawn_blocking(move || {
            if !path.exists() {
                return Err(CoreError::NotFound("deck"));
            }
            read_deck(&path)
        })
        .await
        .map_err(CoreError::persistence)?
    }

    async fn load_all_decks(&self) -> Result<Vec<Deck>, CoreError> {
        let mut decks = Vec::new();
        for id in self.list_deck_ids().await? {
            match self.load_deck(id).await {
                Ok(d) => decks.push(d),
                Err(e) => warn!(deck = %id, error = %e, "skipping unreadable deck"),
            }
        }
        decks.sort_by_key(|d| d.created);
        Ok(decks)
    }

    async fn delete_deck(&self, id: DeckId) -> Result<(), CoreError> {
        let path = self.deck_path(id);
        task::spawn_blocking(move || {
            if !path.exists() {
                return Err(CoreError::NotFound("deck"));
            }
            fs::remove_file(&path).map_err(CoreError::persistence)
        })
        .await
        .map_err(CoreError::persistence)??;
        info!(deck = %id, "deleted deck");
        Ok(())
    }

    async fn deck_exists(&self, id: DeckId) -> bool {
        let path = self.deck_path(id);
        task::spawn_blocking(move || path.exists()).await.unwrap_or(false)
    }

    async fn list_deck_ids(&self) -> Result<Vec<DeckId>, CoreError> {
        let dir = self.data_dir.clone();
        task::spawn_blocking(move || scan_deck_ids(&dir))
            .await
            .map_err(CoreError::persistence)?
    }
}

/// Deck ids from `<uuid>.json` names in `dir`; other files are skipped.
fn scan_deck_ids(dir: &Path) -> Result<Vec<DeckId>, CoreError> {
    let entries = fs::read_dir(dir).map_err(CoreError::persistence)?;
    let mut ids = Vec::new();
    for e in entries.filter_map(|e| e.ok()) {
        let p = e.path();
        if p.extension().and_then(|s| s.to_str()) != Some("json") {
            continue;
        }
        let Some(stem) = p.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        match Uuid::parse_str(stem) {
            Ok(id) => ids.push(id),
            Err(_) => debug!(file = %p.display(), "ignoring non-deck json file"),
        }
    }
    ids.sort();
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anktui_core::{apply_review, Card, Rating};
    use chrono::{TimeZone, Utc};

    fn sample_deck() -> Deck {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
        let mut deck = Deck::new("Spanish", "basics", now);
        let mut reviewed = Card::new("hola", "hello", now);
        apply_review(&mut reviewed, Rating::Good, now);
        deck.add_card(reviewed, now).unwrap();
        deck.add_card(Card::new("adios", "goodbye", now), now).unwrap();
        deck
    }

    #[tokio::test]
    async fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::open(dir.path().to_path_buf(), None).unwrap();
        let deck = sample_deck();

        store.save_deck(&deck).await.unwrap();
        assert!(dir.path().join(format!("{}.json", deck.id)).exists());
        assert!(store.deck_exists(deck.id).await);

        let loaded = store.load_deck(deck.id).await.unwrap();
        assert_eq!(loaded, deck);
    }

    #[tokio::test]
    async fn missing_deck_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::open(dir.path().to_path_buf(), None).unwrap();
        let id = Uuid::new_v4();
        assert!(matches!(store.load_deck(id).await, Err(CoreError::NotFound(_))));
        assert!(matches!(store.delete_deck(id).await, Err(CoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn load_all_skips_corrupt_and_foreign_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::open(dir.path().to_path_buf(), None).unwrap();
        let deck = sample_deck();
        store.save_deck(&deck).await.unwrap();

        fs::write(dir.path().join(format!("{}.json", Uuid::new_v4())), "{ not json").unwrap();
        fs::write(dir.path().join("notes.json"), "{}").unwrap();
        fs::write(dir.path().join("readme.txt"), "hi").unwrap();

        assert_eq!(store.list_deck_ids().await.unwrap().len(), 2);
        let all = store.load_all_decks().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, deck.id);
    }

    #[tokio::test]
    async fn delete_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::open(dir.path().to_path_buf(), None).unwrap();
        let deck = sample_deck();
        store.save_deck(&deck).await.unwrap();
        store.delete_deck(deck.id).await.unwrap();
        assert!(!store.deck_exists(deck.id).await);
        assert!(store.load_all_decks().await.unwrap().is_empty());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn every_operation_works_on_a_single_threaded_runtime() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::open(dir.path().to_path_buf(), None).unwrap();
        let deck = sample_deck();

        assert!(store.list_deck_ids().await.unwrap().is_empty());
        assert!(!store.deck_exists(deck.id).await);
        store.save_deck(&deck).await.unwrap();

        assert_eq!(store.list_deck_ids().await.unwrap(), vec![deck.id]);
        assert!(store.deck_exists(deck.id).await);
        assert_eq!(store.load_deck(deck.id).await.unwrap(), deck);

        store.delete_deck(deck.id).await.unwrap();
        assert!(!store.deck_exists(deck.id).await);
        assert!(matches!(store.load_deck(deck.id).await, Err(CoreError::NotFound(_))));
        assert!(matches!(store.delete_deck(deck.id).await, Err(CoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn backups_are_written_and_rotated_per_deck() {
        let dir = tempfile::tempdir().unwrap();
        let backups = dir.path().join("backups");
        let store = JsonStore::open(
            dir.path().join("decks"),
            Some(BackupPolicy { dir: backups.clone(), keep: 2 }),
        )
        .unwrap();
        let deck = sample_deck();
        let other = Uuid::new_v4();

        for ts in ["20000101-000000", "20000102-000000", "20000103-000000"] {
            fs::write(backups.join(format!("{}-{ts}.json", deck.id)), "{}").unwrap();
        }
        fs::write(backups.join(format!("{other}-20000101-000000.json")), "{}").unwrap();

        store.save_deck(&deck).await.unwrap();

        let mut names: Vec<String> = fs::read_dir(&backups)
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();

        let own: Vec<&String> = names.iter().filter(|n| n.starts_with(&deck.id.to_string())).collect();
        assert_eq!(own.len(), 2);
        assert!(own[0].ends_with("20000103-000000.json"));
        assert!(names.iter().any(|n| n.starts_with(&other.to_string())));
    }

    #[tokio::test]
    async fn reads_files_with_zero_last_review() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::open(dir.path().to_path_buf(), None).unwrap();
        let id = Uuid::new_v4();
        let raw = format!(
            r#"{{
  "id": "{id}",
  "name": "Imported",
  "description": "",
  "cards": [
    {{
      "id": "{card}",
      "front": "q",
      "back": "a",
      "created": "2024-01-01T00:00:00Z",
      "modified": "2024-01-01T00:00:00Z",
      "interval": 1,
      "repetition": 0,
      "ease_factor": 2.5,
      "next_review": "2024-01-01T00:00:00Z",
      "last_review": "0001-01-01T00:00:00Z"
    }}
  ],
  "created": "2024-01-01T00:00:00Z",
  "modified": "2024-01-01T00:00:00Z"
}}"#,
            card = Uuid::new_v4()
        );
        fs::write(dir.path().join(format!("{id}.json")), raw).unwrap();

        let deck = store.load_deck(id).await.unwrap();
        assert_eq!(deck.cards.len(), 1);
        assert!(deck.cards[0].last_review.is_none());
        assert!(deck.cards[0].is_new());
    }
}
