//! Storage Module
//!
//! SQLite-based record store with:
//! - Dictionary tables (entries, definitions, examples)
//! - Card scheduling snapshots with a version column
//! - Append-only review logs
//!
//! The review core talks to cards only through [`CardStore`].

mod migrations;
mod sqlite;

use chrono::{DateTime, NaiveDate, Utc};

pub use migrations::MIGRATIONS;
pub use sqlite::{CardStats, Result, Storage, StorageError, DB_FILE_NAME};

use crate::card::{Card, CardFields, NewCard, ReviewLog};
use crate::schedule::Rating;

/// Result of a conditional full-replace write
#[derive(Debug, Clone, PartialEq)]
pub enum ReplaceOutcome {
    /// Written; the card as stored afterwards
    Replaced(Card),
    /// No card with that id
    Missing,
    /// The card exists but its version differs from the expected one
    VersionMismatch { actual: i64 },
}

/// Access contract the review core needs from a card store.
///
/// Every write is a single-row, single-statement operation; the store's own
/// atomicity for that row is the only transactional guarantee relied upon.
pub trait CardStore {
    /// Insert a card and return it with its assigned id
    fn insert_card(&self, card: &NewCard) -> Result<Card>;

    fn get_card(&self, id: i64) -> Result<Option<Card>>;

    /// Overwrite every scheduling field of card `id` in one statement.
    ///
    /// With `expected_version = None` the last write wins.
    fn replace_card(
        &self,
        id: i64,
        fields: &CardFields,
        expected_version: Option<i64>,
    ) -> Result<ReplaceOutcome>;

    /// Cards with `due <= date`, in store order
    fn cards_due_on_or_before(&self, date: NaiveDate) -> Result<Vec<Card>>;

    fn cards_for_entry(&self, entry_id: i64) -> Result<Vec<Card>>;

    fn entry_exists(&self, entry_id: i64) -> Result<bool>;

    fn append_review_log(
        &self,
        card_id: i64,
        review_time: DateTime<Utc>,
        rating: Rating,
    ) -> Result<ReviewLog>;

    /// Review history of a card, oldest first
    fn review_logs(&self, card_id: i64) -> Result<Vec<ReviewLog>>;
}
