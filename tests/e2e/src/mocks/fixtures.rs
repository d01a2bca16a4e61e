//! Test Data Factory
//!
//! Builders for dictionary entries and cards:
//! - Card snapshots with chosen due date, stability and difficulty
//! - Batches of entries for listing tests
//! - A pre-built mixed queue for due-selection scenarios

use chrono::NaiveDate;
use zidian_core::{
    create_card, create_entry, Card, CardFields, CardKind, CardState, Entry, NewCard, NewEntry,
    Storage,
};

/// Scheduling values for one fixture card
#[derive(Debug, Clone, PartialEq)]
pub struct CardTemplate {
    pub due: NaiveDate,
    pub stability: f64,
    pub difficulty: f64,
    pub state: CardState,
}

impl CardTemplate {
    pub fn new(due: NaiveDate, stability: f64, difficulty: f64) -> Self {
        Self {
            due,
            stability,
            difficulty,
            state: CardState::Review,
        }
    }

    pub fn with_state(mut self, state: CardState) -> Self {
        self.state = state;
        self
    }

    pub fn fields(&self) -> CardFields {
        CardFields {
            due: self.due,
            stability: self.stability,
            difficulty: self.difficulty,
            elapsed_days: 0,
            scheduled_days: 0,
            reps: 0,
            lapses: 0,
            state: self.state,
            last_review: None,
        }
    }
}

/// Factory for creating test data
///
/// # Example
///
/// ```rust,ignore
/// let storage = Storage::new(Some(path))?;
/// let entry = TestDataFactory::create_entry(&storage, "你", "nǐ");
/// let card = TestDataFactory::create_card(&storage, entry.id, &CardTemplate::new(day, 1.0, 5.0));
/// ```
pub struct TestDataFactory;

impl TestDataFactory {
    /// Calendar date helper
    pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid fixture date")
    }

    pub fn create_entry(storage: &Storage, word: &str, pinyin: &str) -> Entry {
        create_entry(
            storage,
            &NewEntry {
                word: word.to_string(),
                pinyin: pinyin.to_string(),
            },
        )
        .expect("Failed to create fixture entry")
    }

    pub fn create_card(storage: &Storage, entry_id: i64, template: &CardTemplate) -> Card {
        let new_card = NewCard {
            entry_id,
            kind: CardKind::Word,
            fields: template.fields(),
        };
        create_card(storage, &new_card).expect("Failed to create fixture card")
    }

    /// Entries 词0..词N with placeholder pinyin
    pub fn create_entries(storage: &Storage, count: usize) -> Vec<Entry> {
        (0..count)
            .map(|i| Self::create_entry(storage, &format!("词{}", i), &format!("cí{}", i)))
            .collect()
    }

    /// Five cards on one entry, all due by 2024-01-02 except the last:
    ///
    /// | # | due        | S   | D   |
    /// |---|------------|-----|-----|
    /// | 0 | 2024-01-02 | 1.0 | 5.0 |
    /// | 1 | 2024-01-01 | 8.0 | 5.0 |
    /// | 2 | 2024-01-01 | 3.0 | 4.0 |
    /// | 3 | 2024-01-01 | 3.0 | 7.0 |
    /// | 4 | 2024-02-01 | 0.1 | 9.9 |
    ///
    /// On 2024-01-02 the most urgent card is #3.
    pub fn create_mixed_queue(storage: &Storage) -> Vec<Card> {
        let entry = Self::create_entry(storage, "学习", "xuéxí");
        let d = Self::date;
        [
            CardTemplate::new(d(2024, 1, 2), 1.0, 5.0),
            CardTemplate::new(d(2024, 1, 1), 8.0, 5.0),
            CardTemplate::new(d(2024, 1, 1), 3.0, 4.0),
            CardTemplate::new(d(2024, 1, 1), 3.0, 7.0),
            CardTemplate::new(d(2024, 2, 1), 0.1, 9.9),
        ]
        .iter()
        .map(|template| Self::create_card(storage, entry.id, template))
        .collect()
    }
}
