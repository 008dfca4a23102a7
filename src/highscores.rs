//! Best score tracking
//!
//! A single scalar persisted across sessions. It only ever goes up, and it is
//! only written when a run beats it.

use serde::{Deserialize, Serialize};

use crate::persistence::{self, KeyValueStore, StorageError};

/// Persisted best score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct HighScore {
    pub best: u64,
}

impl HighScore {
    /// Storage key
    pub const STORAGE_KEY: &'static str = "dino_runner_high_score";

    pub fn new(best: u64) -> Self {
        Self { best }
    }

    /// Load the stored best score, falling back to 0 on missing or unreadable data
    pub fn load<S: KeyValueStore + ?Sized>(store: &S) -> Self {
        match persistence::load_json::<HighScore, _>(store, Self::STORAGE_KEY) {
            Ok(Some(high_score)) => {
                log::info!("Loaded high score {}", high_score.best);
                high_score
            }
            Ok(None) => {
                log::info!("No high score found, starting fresh");
                Self::default()
            }
            Err(err) => {
                log::warn!("Ignoring stored high score: {}", err);
                Self::default()
            }
        }
    }

    /// Write the current best score
    pub fn save<S: KeyValueStore + ?Sized>(&self, store: &mut S) -> Result<(), StorageError> {
        persistence::save_json(store, Self::STORAGE_KEY, self)?;
        log::info!("High score saved ({})", self.best);
        Ok(())
    }

    /// Check if a score beats the stored best
    pub fn beaten_by(&self, score: u64) -> bool {
        score > self.best
    }

    /// Record a finished run. Returns true if it set a new best.
    pub fn record(&mut self, score: u64) -> bool {
        if self.beaten_by(score) {
            self.best = score;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;

    #[test]
    fn test_defaults_to_zero() {
        let store = MemoryStore::new();
        assert_eq!(HighScore::load(&store).best, 0);
    }

    #[test]
    fn test_record_only_raises() {
        let mut high = HighScore::new(50);
        assert!(!high.record(50));
        assert!(!high.record(10));
        assert_eq!(high.best, 50);
        assert!(high.record(51));
        assert_eq!(high.best, 51);
    }

    #[test]
    fn test_survives_reload() {
        let mut store = MemoryStore::new();
        HighScore::new(120).save(&mut store).unwrap();
        assert_eq!(HighScore::load(&store), HighScore::new(120));
    }

    #[test]
    fn test_corrupt_entry_falls_back_to_zero() {
        let mut store = MemoryStore::new();
        store.set(HighScore::STORAGE_KEY, "garbage").unwrap();
        assert_eq!(HighScore::load(&store).best, 0);
    }
}
