use crate::store::{KeyValueStore, StoredSlot};
use movie_track_models::WatchedEntry;

/// Slot key for the watched collection.
pub const WATCHED_SLOT: &str = "watched";

/// The user's durable list of rated titles, mirrored to storage on every
/// mutation. Order of insertion is preserved.
pub struct WatchedList {
    slot: StoredSlot<Vec<WatchedEntry>>,
}

impl WatchedList {
    /// Read the watched slot, falling back to an empty list when absent
    /// or unparsable.
    pub fn open(store: Box<dyn KeyValueStore>) -> Self {
        Self {
            slot: StoredSlot::open(store, WATCHED_SLOT, Vec::new()),
        }
    }

    pub fn entries(&self) -> &[WatchedEntry] {
        self.slot.get()
    }

    pub fn len(&self) -> usize {
        self.slot.get().len()
    }

    pub fn is_empty(&self) -> bool {
        self.slot.get().is_empty()
    }

    pub fn contains(&self, imdb_id: &str) -> bool {
        self.find(imdb_id).is_some()
    }

    pub fn find(&self, imdb_id: &str) -> Option<&WatchedEntry> {
        self.slot.get().iter().find(|entry| entry.imdb_id == imdb_id)
    }

    /// Append an entry. The caller guarantees the id is not already
    /// present; if it is, the earlier entry is dropped (last write wins).
    pub fn add(&mut self, entry: WatchedEntry) {
        self.slot.update(|entries| {
            entries.retain(|existing| existing.imdb_id != entry.imdb_id);
            entries.push(entry);
        });
    }

    /// Remove the entry with the given id. Removing an absent id is a
    /// no-op and does not rewrite storage.
    pub fn remove(&mut self, imdb_id: &str) {
        if !self.contains(imdb_id) {
            return;
        }
        self.slot
            .update(|entries| entries.retain(|entry| entry.imdb_id != imdb_id));
    }

    pub fn average_user_rating(&self) -> f64 {
        average(self.slot.get().iter().map(|entry| f64::from(entry.user_rating)))
    }

    pub fn average_imdb_rating(&self) -> f64 {
        average(self.slot.get().iter().map(|entry| entry.imdb_rating))
    }

    pub fn average_runtime_minutes(&self) -> f64 {
        average(self.slot.get().iter().map(|entry| f64::from(entry.runtime_minutes)))
    }
}

/// Arithmetic mean; an empty sequence averages to 0 by convention.
fn average(values: impl Iterator<Item = f64>) -> f64 {
    let (count, sum) = values.fold((0u32, 0.0), |(count, sum), value| (count + 1, sum + value));
    if count == 0 {
        0.0
    } else {
        sum / f64::from(count)
    }
}
