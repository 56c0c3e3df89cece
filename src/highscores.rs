//! High score leaderboard system
//!
//! Persisted to LocalStorage, tracks top 10 scores.

use serde::{Deserialize, Serialize};

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 10;

/// A single high score entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    pub score: u64,
    /// Unix timestamp (ms) when achieved
    pub timestamp: f64,
}

/// High score leaderboard, sorted by descending score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
}

impl HighScores {
    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "recycle_rush_highscores";

    pub fn new() -> Self {
        Self::default()
    }

    /// Check if a score qualifies for the leaderboard
    pub fn qualifies(&self, score: u64) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        self.entries.last().is_none_or(|e| score > e.score)
    }

    /// Add a new score to the leaderboard (if it qualifies).
    /// Returns the rank achieved (1-indexed) or None if it didn't qualify.
    pub fn add_score(&mut self, score: u64, timestamp: f64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }

        let entry = HighScoreEntry { score, timestamp };

        // Ties rank below earlier entries
        let pos = self
            .entries
            .iter()
            .position(|e| score > e.score)
            .unwrap_or(self.entries.len());
        self.entries.insert(pos, entry);
        self.entries.truncate(MAX_HIGH_SCORES);

        Some(pos + 1)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Best score so far (shown on the menu and game-over screens)
    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }

    /// Restore ordering and length after loading from storage
    pub fn normalized(mut self) -> Self {
        self.entries.sort_by(|a, b| b.score.cmp(&a.score));
        self.entries.truncate(MAX_HIGH_SCORES);
        self
    }

    /// Load high scores from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match serde_json::from_str::<HighScores>(&json) {
                    Ok(scores) => {
                        log::info!("Loaded {} high scores", scores.entries.len());
                        return scores.normalized();
                    }
                    Err(e) => log::warn!("Discarding unreadable high scores: {e}"),
                }
            }
        }

        log::info!("No high scores found, starting fresh");
        Self::new()
    }

    /// Save high scores to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("High scores saved ({} entries)", self.entries.len());
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::new()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_never_qualifies() {
        let mut hs = HighScores::new();
        assert_eq!(hs.add_score(0, 1.0), None);
        assert!(hs.is_empty());
    }

    #[test]
    fn test_entries_stay_sorted_and_truncated() {
        let mut hs = HighScores::new();
        for (i, score) in [50, 10, 90, 30, 70, 20, 80, 60, 40, 100, 5].into_iter().enumerate() {
            hs.add_score(score, i as f64);
        }
        assert_eq!(hs.entries.len(), MAX_HIGH_SCORES);
        assert_eq!(hs.top_score(), Some(100));
        assert!(hs.entries.windows(2).all(|w| w[0].score >= w[1].score));
        // 5 arrived last and was below every full-board entry
        assert!(hs.entries.iter().all(|e| e.score != 5));
    }

    #[test]
    fn test_rank_reporting() {
        let mut hs = HighScores::new();
        assert_eq!(hs.add_score(100, 0.0), Some(1));
        assert_eq!(hs.add_score(200, 0.0), Some(1));
        assert_eq!(hs.add_score(150, 0.0), Some(2));
        // A tie lands after the existing entry
        assert_eq!(hs.add_score(150, 1.0), Some(3));
    }

    #[test]
    fn test_full_board_rejects_low_score() {
        let mut hs = HighScores::new();
        for s in 1..=10 {
            hs.add_score(s * 10, 0.0);
        }
        assert!(!hs.qualifies(10));
        assert!(hs.qualifies(11));
        assert_eq!(hs.add_score(11, 0.0), Some(10));
        assert_eq!(hs.entries.last().map(|e| e.score), Some(11));
    }

    #[test]
    fn test_normalize_repairs_stored_order() {
        let hs = HighScores {
            entries: (1..=12)
                .map(|s| HighScoreEntry {
                    score: s,
                    timestamp: 0.0,
                })
                .collect(),
        }
        .normalized();
        assert_eq!(hs.entries.len(), MAX_HIGH_SCORES);
        assert_eq!(hs.top_score(), Some(12));
    }
}
