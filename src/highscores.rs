//! High score leaderboard system
//!
//! Tracks the top 10 scores. Persisted as JSON: a file natively (in the
//! directory named by `PIG_PLUNGE_DATA_DIR`, else the working directory),
//! LocalStorage on the web. Storage failures never reach the simulation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 10;

/// Failure while reading or writing persisted data
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("storage unavailable")]
    Unavailable,
}

/// Best-score persistence as seen by the game flow
pub trait ScoreStore {
    fn high_score(&self) -> u64;
    fn set_high_score(&mut self, score: u64);
}

/// A single high score entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    /// Player's score
    pub score: u64,
    /// Coins collected during the run
    pub coins: u32,
    /// Seconds survived
    pub seconds: u32,
}

/// High score leaderboard
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
}

impl HighScores {
    const STORAGE_KEY: &'static str = "pig_plunge_highscores";

    /// Create empty leaderboard
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Slot a score would take. Equal scores stay behind older entries.
    fn insertion_index(&self, score: u64) -> usize {
        self.entries.partition_point(|e| e.score >= score)
    }

    /// Rank (1-based) a score would reach, if it makes the table at all
    pub fn potential_rank(&self, score: u64) -> Option<usize> {
        if score == 0 {
            return None;
        }
        let index = self.insertion_index(score);
        (index < MAX_HIGH_SCORES).then_some(index + 1)
    }

    pub fn qualifies(&self, score: u64) -> bool {
        self.potential_rank(score).is_some()
    }

    /// Record a finished run; returns its rank when it made the table
    pub fn add_score(&mut self, score: u64, coins: u32, seconds: u32) -> Option<usize> {
        let rank = self.potential_rank(score)?;
        self.entries.insert(
            rank - 1,
            HighScoreEntry {
                score,
                coins,
                seconds,
            },
        );
        self.entries.truncate(MAX_HIGH_SCORES);
        Some(rank)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get the top score (if any)
    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }

    fn try_load() -> Result<Option<Self>, StorageError> {
        match read_storage(Self::STORAGE_KEY)? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    /// Load high scores, starting fresh on any failure
    pub fn load() -> Self {
        match Self::try_load() {
            Ok(Some(scores)) => {
                log::info!("Loaded {} high scores", scores.entries.len());
                scores
            }
            Ok(None) => {
                log::info!("No high scores found, starting fresh");
                Self::new()
            }
            Err(e) => {
                log::warn!("Failed to load high scores, starting fresh: {e}");
                Self::new()
            }
        }
    }

    /// Save high scores; failures are logged and otherwise ignored
    pub fn save(&self) {
        let result = serde_json::to_string(self)
            .map_err(StorageError::from)
            .and_then(|json| write_storage(Self::STORAGE_KEY, &json));
        match result {
            Ok(()) => log::info!("High scores saved ({} entries)", self.entries.len()),
            Err(e) => log::warn!("Failed to save high scores: {e}"),
        }
    }
}

impl ScoreStore for HighScores {
    fn high_score(&self) -> u64 {
        self.top_score().unwrap_or(0)
    }

    fn set_high_score(&mut self, score: u64) {
        if self.add_score(score, 0, 0).is_some() {
            self.save();
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn storage_path(key: &str) -> std::path::PathBuf {
    let dir = std::env::var_os("PIG_PLUNGE_DATA_DIR")
        .map(std::path::PathBuf::from)
        .unwrap_or_else(|| std::path::PathBuf::from("."));
    dir.join(format!("{key}.json"))
}

/// Read a stored JSON document. `Ok(None)` when nothing was stored yet.
#[cfg(not(target_arch = "wasm32"))]
pub(crate) fn read_storage(key: &str) -> Result<Option<String>, StorageError> {
    match std::fs::read_to_string(storage_path(key)) {
        Ok(json) => Ok(Some(json)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub(crate) fn write_storage(key: &str, json: &str) -> Result<(), StorageError> {
    std::fs::write(storage_path(key), json)?;
    Ok(())
}

#[cfg(target_arch = "wasm32")]
fn local_storage() -> Result<web_sys::Storage, StorageError> {
    web_sys::window()
        .and_then(|w| w.local_storage().ok())
        .flatten()
        .ok_or(StorageError::Unavailable)
}

#[cfg(target_arch = "wasm32")]
pub(crate) fn read_storage(key: &str) -> Result<Option<String>, StorageError> {
    local_storage()?
        .get_item(key)
        .map_err(|_| StorageError::Unavailable)
}

#[cfg(target_arch = "wasm32")]
pub(crate) fn write_storage(key: &str, json: &str) -> Result<(), StorageError> {
    local_storage()?
        .set_item(key, json)
        .map_err(|_| StorageError::Unavailable)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ranks_sorted_and_trimmed() {
        let mut scores = HighScores::new();
        assert_eq!(scores.add_score(0, 0, 0), None);
        assert_eq!(scores.add_score(100, 1, 10), Some(1));
        assert_eq!(scores.add_score(300, 2, 20), Some(1));
        assert_eq!(scores.add_score(200, 3, 30), Some(2));
        assert_eq!(scores.top_score(), Some(300));

        for i in 0..20 {
            scores.add_score(1000 + i, 0, 0);
        }
        assert_eq!(scores.entries.len(), MAX_HIGH_SCORES);
        assert!(!scores.qualifies(50));
        assert_eq!(scores.potential_rank(5000), Some(1));
        assert!(scores.entries.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn test_ties_rank_behind_older_runs() {
        let mut scores = HighScores::new();
        scores.add_score(500, 1, 60);
        assert_eq!(scores.potential_rank(500), Some(2));
        assert_eq!(scores.add_score(500, 9, 90), Some(2));
        assert_eq!(scores.entries[0].coins, 1);
        assert_eq!(scores.entries[1].seconds, 90);
    }

    #[test]
    fn test_score_store_view() {
        let mut scores = HighScores::new();
        assert_eq!(scores.high_score(), 0);
        scores.add_score(40, 0, 0);
        assert_eq!(scores.high_score(), 40);
    }

    #[test]
    fn test_corrupt_json_reports_error() {
        let err = serde_json::from_str::<HighScores>("[oops").map_err(StorageError::from);
        assert!(matches!(err, Err(StorageError::Json(_))));
    }
}
