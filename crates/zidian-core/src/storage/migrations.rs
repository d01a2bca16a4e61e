//! Database Migrations
//!
//! Schema migration definitions for the storage layer.

/// Migration definitions
pub const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        description: "Dictionary: entries, definitions, examples",
        up: MIGRATION_V1_UP,
    },
    Migration {
        version: 2,
        description: "Spaced repetition: cards and review logs",
        up: MIGRATION_V2_UP,
    },
    Migration {
        version: 3,
        description: "Optimistic concurrency: card version column",
        up: MIGRATION_V3_UP,
    },
];

/// A database migration
#[derive(Debug, Clone)]
pub struct Migration {
    /// Version number
    pub version: u32,
    /// Description
    pub description: &'static str,
    /// SQL to apply
    pub up: &'static str,
}

/// V1: Dictionary schema
const MIGRATION_V1_UP: &str = r#"
CREATE TABLE IF NOT EXISTS entries (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    word TEXT NOT NULL,
    pinyin TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_entries_word ON entries(word);

-- Part-of-speech senses of an entry
CREATE TABLE IF NOT EXISTS definitions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    entry_id INTEGER NOT NULL REFERENCES entries(id) ON DELETE CASCADE,
    part TEXT NOT NULL,
    definition TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_definitions_entry ON definitions(entry_id);

CREATE TABLE IF NOT EXISTS examples (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    definition_id INTEGER NOT NULL REFERENCES definitions(id) ON DELETE CASCADE,
    sentence TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_examples_definition ON examples(definition_id);

-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL
);

INSERT OR IGNORE INTO schema_version (version, applied_at) VALUES (1, datetime('now'));
"#;

/// V2: Cards and review logs
///
/// `due` and `last_review` hold ISO dates (YYYY-MM-DD) so text comparison
/// orders them chronologically.
const MIGRATION_V2_UP: &str = r#"
CREATE TABLE IF NOT EXISTS cards (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    entry_id INTEGER NOT NULL REFERENCES entries(id) ON DELETE CASCADE,
    type TEXT NOT NULL DEFAULT 'word' CHECK (type IN ('word', 'cloze')),

    -- FSRS scheduling snapshot
    due TEXT NOT NULL,
    stability REAL NOT NULL CHECK (stability >= 0),
    difficulty REAL NOT NULL CHECK (difficulty >= 0),
    elapsed_days INTEGER NOT NULL CHECK (elapsed_days >= 0),
    scheduled_days INTEGER NOT NULL CHECK (scheduled_days >= 0),
    reps INTEGER NOT NULL CHECK (reps >= 0),
    lapses INTEGER NOT NULL CHECK (lapses >= 0),
    state TEXT NOT NULL CHECK (state IN ('new', 'learning', 'review', 'relearning')),
    last_review TEXT
);

CREATE INDEX IF NOT EXISTS idx_cards_due ON cards(due);
CREATE INDEX IF NOT EXISTS idx_cards_entry ON cards(entry_id);

-- Append-only review history
CREATE TABLE IF NOT EXISTS logs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    card_id INTEGER NOT NULL REFERENCES cards(id) ON DELETE CASCADE,
    review_time TEXT NOT NULL,
    review_rating INTEGER NOT NULL CHECK (review_rating BETWEEN 1 AND 4)
);

CREATE INDEX IF NOT EXISTS idx_logs_card ON logs(card_id);

INSERT OR IGNORE INTO schema_version (version, applied_at) VALUES (2, datetime('now'));
"#;

/// V3: Version column for compare-and-swap card updates
const MIGRATION_V3_UP: &str = r#"
ALTER TABLE cards ADD COLUMN version INTEGER NOT NULL DEFAULT 1;

INSERT OR IGNORE INTO schema_version (version, applied_at) VALUES (3, datetime('now'));
"#;

/// Get current schema version from database
pub fn get_current_version(conn: &rusqlite::Connection) -> rusqlite::Result<u32> {
    conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    )
    .or(Ok(0))
}

/// Apply pending migrations
pub fn apply_migrations(conn: &rusqlite::Connection) -> rusqlite::Result<u32> {
    let current_version = get_current_version(conn)?;
    let mut applied = 0;

    for migration in MIGRATIONS {
        if migration.version > current_version {
            tracing::info!(
                "Applying migration v{}: {}",
                migration.version,
                migration.description
            );

            // Use execute_batch to handle multi-statement SQL
            conn.execute_batch(migration.up)?;
            applied += 1;
        }
    }

    Ok(applied)
}
