//! # Zidian Core
//!
//! Chinese vocabulary dictionary with spaced-repetition review scheduling.
//!
//! - **Dictionary**: entries (hanzi + pinyin), part-of-speech definitions and
//!   example sentences
//! - **Cards**: one scheduling record per drilled entry, replaced in full on
//!   every review
//! - **Due Selection**: most urgent card by due date, then weakest memory,
//!   then hardest
//! - **FSRS-5 Scheduler**: pluggable behind the [`Scheduler`] trait
//! - **Review Logs**: append-only history of every graded review
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use chrono::Local;
//! use zidian_core::prelude::*;
//!
//! # fn main() -> zidian_core::Result<()> {
//! // Create storage (uses default platform-specific location)
//! let storage = Storage::new(None)?;
//! seed_sample(&storage)?;
//!
//! let entry = storage.entries_by_word("你")?.remove(0);
//! let today = Local::now().date_naive();
//! let card = create_card(&storage, &NewCard::new(entry.id, CardFields::new_on(today)))?;
//!
//! if let Some(next) = select_next_due(&storage, &Local::now())? {
//!     let outcome = review_card(&storage, &FsrsScheduler::default(), next.id, Rating::Good, &Local::now())?;
//!     println!("card {} next due {}", card.id, outcome.card.due);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Feature Flags
//!
//! - `bundled-sqlite` (default): statically linked SQLite
//! - `encryption`: SQLCipher; the key is read from `ZIDIAN_ENCRYPTION_KEY`

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(rustdoc::missing_crate_level_docs)]

// ============================================================================
// MODULES
// ============================================================================

pub mod card;
pub mod dictionary;
pub mod error;
mod input;
pub mod review;
pub mod schedule;
pub mod selection;
pub mod storage;

// ============================================================================
// RE-EXPORTS
// ============================================================================

pub use card::{Card, CardFields, CardKind, CardState, CardUpdate, NewCard, ReviewLog};

pub use dictionary::{
    create_definition, create_entry, create_example, get_entry, seed_sample, Definition, Entry,
    Example, NewDefinition, NewEntry, NewExample,
};

pub use error::{Error, FieldError, Result, ValidationError};

pub use review::{
    apply_review, create_card, find_cards_by_entry, review_card, review_history, ReviewOutcome,
};

pub use schedule::{FsrsParameters, FsrsScheduler, Rating, Scheduler};

pub use selection::{due_order, next_due_on, select_all_due, select_next_due};

pub use storage::{CardStats, CardStore, ReplaceOutcome, Storage, StorageError};

// ============================================================================
// VERSION INFO
// ============================================================================

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// FSRS algorithm version (5 = 19 parameters)
pub const FSRS_VERSION: u8 = 5;

// ============================================================================
// PRELUDE
// ============================================================================

/// Convenient imports for common usage
pub mod prelude {
    pub use crate::{
        apply_review, create_card, review_card, seed_sample, select_all_due, select_next_due,
        Card, CardFields, CardState, CardStore, CardUpdate, Error, FsrsScheduler, NewCard,
        Rating, Result, Scheduler, Storage, StorageError,
    };
}
