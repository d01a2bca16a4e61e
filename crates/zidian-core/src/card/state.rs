//! Review State Machine
//!
//! A card moves through `new -> learning -> review <-> relearning`. The
//! graduation decision is made by the scheduler; the store only accepts one
//! of the four literals below and persists it verbatim.

use serde::{Deserialize, Serialize};

/// Lifecycle state of a card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardState {
    /// Created, never reviewed
    #[default]
    New,
    /// Being learned for the first time (short intervals)
    Learning,
    /// Graduated, scheduled in days
    Review,
    /// Lapsed out of review, being relearned
    Relearning,
}

impl CardState {
    /// Every accepted state, in lifecycle order
    pub const ALL: [CardState; 4] = [
        CardState::New,
        CardState::Learning,
        CardState::Review,
        CardState::Relearning,
    ];

    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            CardState::New => "new",
            CardState::Learning => "learning",
            CardState::Review => "review",
            CardState::Relearning => "relearning",
        }
    }

    /// Short-interval states are rescheduled within the same day
    pub fn is_short_term(&self) -> bool {
        matches!(self, CardState::Learning | CardState::Relearning)
    }
}

impl std::fmt::Display for CardState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for CardState {
    type Err = String;

    // Exact match only: "Review" or " new" are not states.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CardState::ALL
            .into_iter()
            .find(|state| state.as_str() == s)
            .ok_or_else(|| format!("Unknown card state: {}", s))
    }
}
