//! Test Database Manager
//!
//! Provides isolated database instances for testing:
//! - Temporary databases that are automatically cleaned up
//! - Pre-seeded databases with dictionary entries and cards
//! - Reopening the same file to check persistence

use std::path::PathBuf;

use chrono::NaiveDate;
use tempfile::TempDir;
use zidian_core::{seed_sample, Card, CardStore, Storage};

use crate::mocks::{CardTemplate, TestDataFactory};

/// Manager for test databases
///
/// Creates isolated database instances for each test to prevent interference.
/// Automatically cleans up temporary databases when dropped.
///
/// # Example
///
/// ```rust,ignore
/// let db = TestDatabaseManager::new_temp();
/// let ids = db.seed_due_cards(day, 3);
/// // Database is automatically deleted when `db` goes out of scope
/// ```
pub struct TestDatabaseManager {
    /// The storage instance
    pub storage: Storage,
    /// Temporary directory (kept alive to prevent premature deletion)
    _temp_dir: Option<TempDir>,
    /// Path to the database file
    db_path: PathBuf,
}

impl TestDatabaseManager {
    /// Create a new test database in a temporary directory
    pub fn new_temp() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let db_path = temp_dir.path().join("test_zidian.db");

        let storage = Storage::new(Some(db_path.clone())).expect("Failed to create test storage");

        Self {
            storage,
            _temp_dir: Some(temp_dir),
            db_path,
        }
    }

    /// Create a test database at a specific path
    ///
    /// The database is NOT automatically deleted.
    pub fn new_at_path(path: PathBuf) -> Self {
        let storage = Storage::new(Some(path.clone())).expect("Failed to create test storage");

        Self {
            storage,
            _temp_dir: None,
            db_path: path,
        }
    }

    pub fn path(&self) -> &PathBuf {
        &self.db_path
    }

    /// No entries and no cards
    pub fn is_empty(&self) -> bool {
        self.entry_count() == 0 && self.card_count() == 0
    }

    pub fn entry_count(&self) -> i64 {
        self.storage.count_entries().unwrap_or(0)
    }

    pub fn card_count(&self) -> i64 {
        self.storage
            .card_stats(NaiveDate::MIN)
            .map(|s| s.total_cards)
            .unwrap_or(0)
    }

    pub fn card(&self, id: i64) -> Card {
        self.storage
            .get_card(id)
            .expect("Failed to read card")
            .expect("Card does not exist")
    }

    // ========================================================================
    // SEEDING METHODS
    // ========================================================================

    /// Insert the sample dictionary entry
    pub fn seed_dictionary(&self) {
        seed_sample(&self.storage).expect("Failed to seed dictionary");
    }

    /// One entry with `count` cards all due on `due`, stability rising with
    /// the index so card 0 is the most urgent
    pub fn seed_due_cards(&self, due: NaiveDate, count: usize) -> Vec<i64> {
        let entry = TestDataFactory::create_entry(&self.storage, "复习", "fùxí");
        (0..count)
            .map(|i| {
                let template = CardTemplate::new(due, 1.0 + i as f64, 5.0);
                TestDataFactory::create_card(&self.storage, entry.id, &template).id
            })
            .collect()
    }

    // ========================================================================
    // LIFECYCLE
    // ========================================================================

    /// Close and reopen the same database file
    pub fn reopen(&mut self) {
        self.storage =
            Storage::new(Some(self.db_path.clone())).expect("Failed to reopen storage");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temp_database_creation() {
        let db = TestDatabaseManager::new_temp();
        assert!(db.is_empty());
        assert!(db.path().exists());
    }

    #[test]
    fn test_seed_due_cards() {
        let db = TestDatabaseManager::new_temp();
        let ids = db.seed_due_cards(TestDataFactory::date(2024, 1, 1), 4);

        assert_eq!(ids.len(), 4);
        assert_eq!(db.card_count(), 4);
        assert_eq!(db.entry_count(), 1);
    }

    #[test]
    fn test_reopen_keeps_data() {
        let mut db = TestDatabaseManager::new_temp();
        db.seed_dictionary();
        db.reopen();
        assert_eq!(db.entry_count(), 1);
    }
}
