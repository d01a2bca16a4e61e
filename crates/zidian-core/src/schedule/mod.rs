//! Scheduling capability
//!
//! The review transaction never computes stability, difficulty or intervals
//! itself. It asks a [`Scheduler`] for the next snapshot and persists what
//! comes back, so any algorithm variant (or a test stub) can be plugged in.

mod fsrs;

pub use fsrs::{
    FsrsParameters, FsrsScheduler, DEFAULT_RETENTION, DEFAULT_WEIGHTS, MAX_DIFFICULTY,
    MIN_DIFFICULTY, MIN_STABILITY,
};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::card::{Card, CardFields};

/// Recall quality reported by the learner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Rating {
    /// Forgot
    Again = 1,
    Hard = 2,
    Good = 3,
    Easy = 4,
}

impl Rating {
    pub const ALL: [Rating; 4] = [Rating::Again, Rating::Hard, Rating::Good, Rating::Easy];

    pub fn from_i64(value: i64) -> Option<Self> {
        match value {
            1 => Some(Rating::Again),
            2 => Some(Rating::Hard),
            3 => Some(Rating::Good),
            4 => Some(Rating::Easy),
            _ => None,
        }
    }

    /// Numeric grade, 1..=4
    pub fn value(&self) -> u8 {
        *self as u8
    }

    pub fn name(&self) -> &'static str {
        match self {
            Rating::Again => "Again",
            Rating::Hard => "Hard",
            Rating::Good => "Good",
            Rating::Easy => "Easy",
        }
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> Self {
        rating.value()
    }
}

impl TryFrom<u8> for Rating {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Rating::from_i64(value as i64)
            .ok_or_else(|| format!("Rating must be between 1 and 4, got {}", value))
    }
}

/// Computes the post-review scheduling snapshot of a card
pub trait Scheduler: Send + Sync {
    /// Next state of `card` after a review rated `rating` on `today`.
    ///
    /// Must return a complete snapshot; the caller persists it verbatim.
    fn compute_next_state(&self, card: &Card, rating: Rating, today: NaiveDate) -> CardFields;
}
