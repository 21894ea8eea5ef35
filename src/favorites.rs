use crate::models::FavoriteItem;
use crate::notify::Notifier;
use crate::storage::FavoritesSlot;
use anyhow::{Context, Result};
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    AlreadyPresent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    Removed,
    NotPresent,
}

/// The user's saved set of catalog items: insertion-ordered, unique by `id`,
/// flushed to the slot after every effective mutation.
///
/// Views only ever receive snapshots by value; all mutation goes through the
/// operations here. If a flush fails the in-memory change is rolled back, so
/// memory and storage never diverge. Confirmations fire only when the
/// collection actually changed; no-op adds and removes stay silent.
pub struct FavoritesStore {
    items: Vec<FavoriteItem>,
    slot: Box<dyn FavoritesSlot>,
    notifier: Box<dyn Notifier>,
}

impl FavoritesStore {
    /// Hydrates from the slot, once per process lifetime. An absent slot is
    /// an empty collection; malformed contents are discarded with a warning
    /// and never surface to the caller.
    pub fn load(slot: Box<dyn FavoritesSlot>, notifier: Box<dyn Notifier>) -> Self {
        let items = match slot.read() {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<FavoriteItem>>(&raw) {
                Ok(items) => items,
                Err(e) => {
                    warn!("Discarding malformed favorites slot: {}", e);
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!("Failed to read favorites slot, starting empty: {}", e);
                Vec::new()
            }
        };
        Self {
            items,
            slot,
            notifier,
        }
    }

    /// Appends `item` unless an entry with the same id already exists, in
    /// which case the stored attributes keep the first insertion.
    pub fn add(&mut self, item: FavoriteItem) -> Result<AddOutcome> {
        if self.contains(item.id) {
            return Ok(AddOutcome::AlreadyPresent);
        }
        let title = item.title.clone();
        self.items.push(item);
        if let Err(e) = self.persist() {
            self.items.pop();
            return Err(e);
        }
        self.notifier
            .success(&format!("{} added to favorites", title));
        Ok(AddOutcome::Added)
    }

    /// Removes the entry with `id`; a missing id is a silent no-op.
    pub fn remove(&mut self, id: i32) -> Result<RemoveOutcome> {
        let Some(index) = self.items.iter().position(|fav| fav.id == id) else {
            return Ok(RemoveOutcome::NotPresent);
        };
        let removed = self.items.remove(index);
        if let Err(e) = self.persist() {
            self.items.insert(index, removed);
            return Err(e);
        }
        self.notifier.removed("Removed from favorites");
        Ok(RemoveOutcome::Removed)
    }

    /// Empties the collection and deletes the slot.
    pub fn clear(&mut self) -> Result<()> {
        if self.items.is_empty() {
            return Ok(());
        }
        let previous = std::mem::take(&mut self.items);
        if let Err(e) = self.persist() {
            self.items = previous;
            return Err(e);
        }
        Ok(())
    }

    pub fn contains(&self, id: i32) -> bool {
        self.items.iter().any(|fav| fav.id == id)
    }

    pub fn get(&self, id: i32) -> Option<&FavoriteItem> {
        self.items.iter().find(|fav| fav.id == id)
    }

    /// Read snapshot, by value.
    pub fn items(&self) -> Vec<FavoriteItem> {
        self.items.clone()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    // An empty collection is represented by slot absence, never by "[]".
    fn persist(&self) -> Result<()> {
        if self.items.is_empty() {
            return self.slot.delete();
        }
        let encoded = serde_json::to_string(&self.items).context("encoding favorites")?;
        self.slot.write(&encoded)
    }
}
