//! SQLite Storage Implementation
//!
//! Record store for the dictionary, cards and review logs.

use chrono::{DateTime, NaiveDate, Utc};
use directories::ProjectDirs;
use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Mutex;

use super::{CardStore, ReplaceOutcome};
use crate::card::{Card, CardFields, CardKind, CardState, NewCard, ReviewLog};
use crate::dictionary::{Definition, Entry, Example, NewDefinition, NewEntry, NewExample};
use crate::schedule::Rating;

// ============================================================================
// ERROR TYPES
// ============================================================================

/// Storage error type
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Initialization error
    #[error("Initialization error: {0}")]
    Init(String),
}

/// Storage result type
pub type Result<T> = std::result::Result<T, StorageError>;

/// File name of the database inside a data directory
pub const DB_FILE_NAME: &str = "zidian.db";

/// Card counts for the CLI summary
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CardStats {
    pub total_cards: i64,
    pub due_today: i64,
    pub new: i64,
    pub learning: i64,
    pub review: i64,
    pub relearning: i64,
    pub total_reviews: i64,
}

// ============================================================================
// STORAGE
// ============================================================================

/// SQLite record store
///
/// Uses separate reader/writer connections for interior mutability.
/// All methods take `&self`, making Storage `Send + Sync` so the HTTP layer
/// can share an `Arc<Storage>`.
pub struct Storage {
    writer: Mutex<Connection>,
    reader: Mutex<Connection>,
}

impl Storage {
    /// Apply PRAGMAs and optional encryption to a connection
    fn configure_connection(conn: &Connection) -> Result<()> {
        // Apply encryption key if SQLCipher is enabled and key is provided
        #[cfg(feature = "encryption")]
        {
            if let Ok(key) = std::env::var("ZIDIAN_ENCRYPTION_KEY") {
                if !key.is_empty() {
                    conn.pragma_update(None, "key", &key)?;
                }
            }
        }

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA temp_store = MEMORY;
             PRAGMA foreign_keys = ON;
             PRAGMA busy_timeout = 5000;",
        )?;

        Ok(())
    }

    /// Platform data directory used when no path is configured
    pub fn default_data_dir() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("com", "zidian", "zidian").ok_or_else(|| {
            StorageError::Init("Could not determine project directories".to_string())
        })?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }

    /// Create new storage instance
    ///
    /// `db_path` is the database file; `None` uses [`DB_FILE_NAME`] in the
    /// platform data directory.
    pub fn new(db_path: Option<PathBuf>) -> Result<Self> {
        let path = match db_path {
            Some(p) => p,
            None => {
                let data_dir = Self::default_data_dir()?;
                std::fs::create_dir_all(&data_dir)?;
                // Restrict directory permissions to owner-only on Unix
                #[cfg(unix)]
                {
                    use std::os::unix::fs::PermissionsExt;
                    let perms = std::fs::Permissions::from_mode(0o700);
                    let _ = std::fs::set_permissions(&data_dir, perms);
                }
                data_dir.join(DB_FILE_NAME)
            }
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        // Open writer connection
        let writer_conn = Connection::open(&path)?;

        // Restrict database file permissions to owner-only on Unix
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if path.exists() {
                let perms = std::fs::Permissions::from_mode(0o600);
                let _ = std::fs::set_permissions(&path, perms);
            }
        }

        Self::configure_connection(&writer_conn)?;

        // Apply migrations on writer only
        let applied = super::migrations::apply_migrations(&writer_conn)?;
        if applied > 0 {
            tracing::info!(applied, path = %path.display(), "Database schema up to date");
        }

        // Open reader connection to same path
        let reader_conn = Connection::open(&path)?;
        Self::configure_connection(&reader_conn)?;

        Ok(Self {
            writer: Mutex::new(writer_conn),
            reader: Mutex::new(reader_conn),
        })
    }

    fn writer(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.writer
            .lock()
            .map_err(|_| StorageError::Init("Writer lock poisoned".into()))
    }

    fn reader(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.reader
            .lock()
            .map_err(|_| StorageError::Init("Reader lock poisoned".into()))
    }

    // ========================================================================
    // ROW CONVERSION
    // ========================================================================

    fn conversion_error(field_name: &str, value: &str, reason: String) -> rusqlite::Error {
        rusqlite::Error::FromSqlConversionFailure(
            0,
            rusqlite::types::Type::Text,
            Box::new(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("Invalid {} '{}': {}", field_name, value, reason),
            )),
        )
    }

    /// Parse an ISO date column
    fn parse_date(value: &str, field_name: &str) -> rusqlite::Result<NaiveDate> {
        NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .map_err(|e| Self::conversion_error(field_name, value, e.to_string()))
    }

    /// Parse RFC3339 timestamp
    fn parse_timestamp(value: &str, field_name: &str) -> rusqlite::Result<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(value)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| Self::conversion_error(field_name, value, e.to_string()))
    }

    /// Convert a row to Card
    fn row_to_card(row: &rusqlite::Row) -> rusqlite::Result<Card> {
        let due: String = row.get("due")?;
        let last_review: Option<String> = row.get("last_review")?;
        let state: String = row.get("state")?;
        let kind: String = row.get("type")?;

        let state = state
            .parse::<CardState>()
            .map_err(|e| Self::conversion_error("state", &state, e))?;
        let kind = kind
            .parse::<CardKind>()
            .map_err(|e| Self::conversion_error("type", &kind, e))?;
        let last_review = last_review
            .map(|s| Self::parse_date(&s, "last_review"))
            .transpose()?;

        Ok(Card {
            id: row.get("id")?,
            entry_id: row.get("entry_id")?,
            kind,
            due: Self::parse_date(&due, "due")?,
            stability: row.get("stability")?,
            difficulty: row.get("difficulty")?,
            elapsed_days: row.get("elapsed_days")?,
            scheduled_days: row.get("scheduled_days")?,
            reps: row.get("reps")?,
            lapses: row.get("lapses")?,
            state,
            last_review,
            version: row.get("version")?,
        })
    }

    fn row_to_log(row: &rusqlite::Row) -> rusqlite::Result<ReviewLog> {
        let review_time: String = row.get("review_time")?;
        let rating: i64 = row.get("review_rating")?;
        let review_rating = Rating::from_i64(rating).ok_or_else(|| {
            Self::conversion_error("review_rating", &rating.to_string(), "out of range".into())
        })?;

        Ok(ReviewLog {
            id: row.get("id")?,
            card_id: row.get("card_id")?,
            review_time: Self::parse_timestamp(&review_time, "review_time")?,
            review_rating,
        })
    }

    fn row_to_entry(row: &rusqlite::Row) -> rusqlite::Result<Entry> {
        Ok(Entry {
            id: row.get("id")?,
            word: row.get("word")?,
            pinyin: row.get("pinyin")?,
        })
    }

    fn row_to_definition(row: &rusqlite::Row) -> rusqlite::Result<Definition> {
        Ok(Definition {
            id: row.get("id")?,
            entry_id: row.get("entry_id")?,
            part: row.get("part")?,
            definition: row.get("definition")?,
        })
    }

    fn row_to_example(row: &rusqlite::Row) -> rusqlite::Result<Example> {
        Ok(Example {
            id: row.get("id")?,
            definition_id: row.get("definition_id")?,
            sentence: row.get("sentence")?,
        })
    }

    fn query_cards(&self, sql: &str, params: &[&dyn rusqlite::ToSql]) -> Result<Vec<Card>> {
        let reader = self.reader()?;
        let mut stmt = reader.prepare(sql)?;
        let cards = stmt.query_map(params, Self::row_to_card)?;

        let mut result = Vec::new();
        for card in cards {
            result.push(card?);
        }
        Ok(result)
    }

    // ========================================================================
    // DICTIONARY
    // ========================================================================

    pub fn insert_entry(&self, input: &NewEntry) -> Result<Entry> {
        let id = {
            let writer = self.writer()?;
            writer.execute(
                "INSERT INTO entries (word, pinyin) VALUES (?1, ?2)",
                params![input.word, input.pinyin],
            )?;
            writer.last_insert_rowid()
        };

        Ok(Entry {
            id,
            word: input.word.clone(),
            pinyin: input.pinyin.clone(),
        })
    }

    pub fn get_entry(&self, id: i64) -> Result<Option<Entry>> {
        let reader = self.reader()?;
        let entry = reader
            .query_row("SELECT * FROM entries WHERE id = ?1", params![id], |row| {
                Self::row_to_entry(row)
            })
            .optional()?;
        Ok(entry)
    }

    /// Entries whose headword equals `word` exactly
    pub fn entries_by_word(&self, word: &str) -> Result<Vec<Entry>> {
        let reader = self.reader()?;
        let mut stmt = reader.prepare("SELECT * FROM entries WHERE word = ?1 ORDER BY id")?;
        let rows = stmt.query_map(params![word], Self::row_to_entry)?;

        let mut result = Vec::new();
        for row in rows {
            result.push(row?);
        }
        Ok(result)
    }

    pub fn count_entries(&self) -> Result<i64> {
        let reader = self.reader()?;
        Ok(reader.query_row("SELECT COUNT(*) FROM entries", [], |row| row.get(0))?)
    }

    pub fn insert_definition(&self, input: &NewDefinition) -> Result<Definition> {
        let id = {
            let writer = self.writer()?;
            writer.execute(
                "INSERT INTO definitions (entry_id, part, definition) VALUES (?1, ?2, ?3)",
                params![input.entry_id, input.part, input.definition],
            )?;
            writer.last_insert_rowid()
        };

        Ok(Definition {
            id,
            entry_id: input.entry_id,
            part: input.part.clone(),
            definition: input.definition.clone(),
        })
    }

    pub fn get_definition(&self, id: i64) -> Result<Option<Definition>> {
        let reader = self.reader()?;
        let definition = reader
            .query_row(
                "SELECT * FROM definitions WHERE id = ?1",
                params![id],
                |row| Self::row_to_definition(row),
            )
            .optional()?;
        Ok(definition)
    }

    pub fn definitions_by_entry(&self, entry_id: i64) -> Result<Vec<Definition>> {
        let reader = self.reader()?;
        let mut stmt =
            reader.prepare("SELECT * FROM definitions WHERE entry_id = ?1 ORDER BY id")?;
        let rows = stmt.query_map(params![entry_id], Self::row_to_definition)?;

        let mut result = Vec::new();
        for row in rows {
            result.push(row?);
        }
        Ok(result)
    }

    pub fn insert_example(&self, input: &NewExample) -> Result<Example> {
        let id = {
            let writer = self.writer()?;
            writer.execute(
                "INSERT INTO examples (definition_id, sentence) VALUES (?1, ?2)",
                params![input.definition_id, input.sentence],
            )?;
            writer.last_insert_rowid()
        };

        Ok(Example {
            id,
            definition_id: input.definition_id,
            sentence: input.sentence.clone(),
        })
    }

    pub fn examples_by_definition(&self, definition_id: i64) -> Result<Vec<Example>> {
        let reader = self.reader()?;
        let mut stmt =
            reader.prepare("SELECT * FROM examples WHERE definition_id = ?1 ORDER BY id")?;
        let rows = stmt.query_map(params![definition_id], Self::row_to_example)?;

        let mut result = Vec::new();
        for row in rows {
            result.push(row?);
        }
        Ok(result)
    }

    // ========================================================================
    // STATS
    // ========================================================================

    /// Card counts by state plus the number due on `today`
    pub fn card_stats(&self, today: NaiveDate) -> Result<CardStats> {
        let reader = self.reader()?;
        let mut stats = CardStats {
            total_cards: reader.query_row("SELECT COUNT(*) FROM cards", [], |row| row.get(0))?,
            due_today: reader.query_row(
                "SELECT COUNT(*) FROM cards WHERE due <= ?1",
                params![today.to_string()],
                |row| row.get(0),
            )?,
            total_reviews: reader.query_row("SELECT COUNT(*) FROM logs", [], |row| row.get(0))?,
            ..Default::default()
        };

        let mut stmt = reader.prepare("SELECT state, COUNT(*) FROM cards GROUP BY state")?;
        let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))?;
        for row in rows {
            let (state, count) = row?;
            match state.parse::<CardState>() {
                Ok(CardState::New) => stats.new = count,
                Ok(CardState::Learning) => stats.learning = count,
                Ok(CardState::Review) => stats.review = count,
                Ok(CardState::Relearning) => stats.relearning = count,
                Err(e) => tracing::warn!("Skipping unexpected card state in stats: {}", e),
            }
        }

        Ok(stats)
    }
}

// ============================================================================
// CARD STORE
// ============================================================================

impl CardStore for Storage {
    fn insert_card(&self, card: &NewCard) -> Result<Card> {
        let fields = &card.fields;
        let id = {
            let writer = self.writer()?;
            writer.execute(
                "INSERT INTO cards (
                    entry_id, type, due, stability, difficulty, elapsed_days,
                    scheduled_days, reps, lapses, state, last_review, version
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, 1)",
                params![
                    card.entry_id,
                    card.kind.as_str(),
                    fields.due.to_string(),
                    fields.stability,
                    fields.difficulty,
                    fields.elapsed_days,
                    fields.scheduled_days,
                    fields.reps,
                    fields.lapses,
                    fields.state.as_str(),
                    fields.last_review.map(|d| d.to_string()),
                ],
            )?;
            writer.last_insert_rowid()
        };

        Ok(Card {
            id,
            entry_id: card.entry_id,
            kind: card.kind,
            due: fields.due,
            stability: fields.stability,
            difficulty: fields.difficulty,
            elapsed_days: fields.elapsed_days,
            scheduled_days: fields.scheduled_days,
            reps: fields.reps,
            lapses: fields.lapses,
            state: fields.state,
            last_review: fields.last_review,
            version: 1,
        })
    }

    fn get_card(&self, id: i64) -> Result<Option<Card>> {
        let reader = self.reader()?;
        let mut stmt = reader.prepare("SELECT * FROM cards WHERE id = ?1")?;

        let card = stmt
            .query_row(params![id], |row| Self::row_to_card(row))
            .optional()?;
        Ok(card)
    }

    fn replace_card(
        &self,
        id: i64,
        fields: &CardFields,
        expected_version: Option<i64>,
    ) -> Result<ReplaceOutcome> {
        let writer = self.writer()?;

        // Single statement: the row is either fully replaced or untouched.
        let changed = writer.execute(
            "UPDATE cards SET
                due = ?1,
                stability = ?2,
                difficulty = ?3,
                elapsed_days = ?4,
                scheduled_days = ?5,
                reps = ?6,
                lapses = ?7,
                state = ?8,
                last_review = ?9,
                version = version + 1
            WHERE id = ?10 AND (?11 IS NULL OR version = ?11)",
            params![
                fields.due.to_string(),
                fields.stability,
                fields.difficulty,
                fields.elapsed_days,
                fields.scheduled_days,
                fields.reps,
                fields.lapses,
                fields.state.as_str(),
                fields.last_review.map(|d| d.to_string()),
                id,
                expected_version,
            ],
        )?;

        if changed == 0 {
            let actual: Option<i64> = writer
                .query_row("SELECT version FROM cards WHERE id = ?1", params![id], |row| {
                    row.get(0)
                })
                .optional()?;
            return Ok(match actual {
                Some(actual) => ReplaceOutcome::VersionMismatch { actual },
                None => ReplaceOutcome::Missing,
            });
        }

        // Read back on the writer so the caller sees exactly what was committed.
        let card = writer
            .query_row("SELECT * FROM cards WHERE id = ?1", params![id], |row| {
                Self::row_to_card(row)
            })
            .optional()?;
        Ok(card.map_or(ReplaceOutcome::Missing, ReplaceOutcome::Replaced))
    }

    fn cards_due_on_or_before(&self, date: NaiveDate) -> Result<Vec<Card>> {
        self.query_cards(
            "SELECT * FROM cards WHERE due <= ?1",
            &[&date.to_string()],
        )
    }

    fn cards_for_entry(&self, entry_id: i64) -> Result<Vec<Card>> {
        self.query_cards(
            "SELECT * FROM cards WHERE entry_id = ?1 ORDER BY id",
            &[&entry_id],
        )
    }

    fn entry_exists(&self, entry_id: i64) -> Result<bool> {
        let reader = self.reader()?;
        let exists: bool = reader.query_row(
            "SELECT EXISTS(SELECT 1 FROM entries WHERE id = ?1)",
            params![entry_id],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    fn append_review_log(
        &self,
        card_id: i64,
        review_time: DateTime<Utc>,
        rating: Rating,
    ) -> Result<ReviewLog> {
        let id = {
            let writer = self.writer()?;
            writer.execute(
                "INSERT INTO logs (card_id, review_time, review_rating) VALUES (?1, ?2, ?3)",
                params![card_id, review_time.to_rfc3339(), rating.value()],
            )?;
            writer.last_insert_rowid()
        };

        Ok(ReviewLog {
            id,
            card_id,
            review_time,
            review_rating: rating,
        })
    }

    fn review_logs(&self, card_id: i64) -> Result<Vec<ReviewLog>> {
        let reader = self.reader()?;
        let mut stmt = reader.prepare("SELECT * FROM logs WHERE card_id = ?1 ORDER BY id")?;
        let rows = stmt.query_map(params![card_id], Self::row_to_log)?;

        let mut result = Vec::new();
        for row in rows {
            result.push(row?);
        }
        Ok(result)
    }
}

// ============================================================================
// TESTS
// ============================================================================
