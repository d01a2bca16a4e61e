//! Card module - scheduling records for dictionary entries under study
//!
//! A [`Card`] is the persisted row; [`CardFields`] is the complete
//! post-review snapshot a caller supplies on every write (full replace, never
//! a patch).

mod state;

pub use state::CardState;

use std::ops::RangeInclusive;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ValidationError;
use crate::input::FieldReader;
use crate::schedule::Rating;

const STATE_LITERALS: &str = "new, learning, review, relearning";
const KIND_LITERALS: &str = "word, cloze";

/// Years whose dates store as unsigned `YYYY-MM-DD` text, so that text order
/// matches calendar order in the due filter
pub const STORABLE_YEARS: RangeInclusive<i32> = 0..=9999;

pub fn is_storable_date(date: NaiveDate) -> bool {
    STORABLE_YEARS.contains(&date.year())
}

/// Last calendar day a card can be due on
pub fn latest_storable_date() -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(*STORABLE_YEARS.end(), 12, 31)
}

// ============================================================================
// CARD KIND
// ============================================================================

/// What the card drills, fixed at creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardKind {
    /// Recall the word itself
    #[default]
    Word,
    /// Fill the word into an example sentence
    Cloze,
}

impl CardKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CardKind::Word => "word",
            CardKind::Cloze => "cloze",
        }
    }
}

impl std::fmt::Display for CardKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for CardKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "word" => Ok(CardKind::Word),
            "cloze" => Ok(CardKind::Cloze),
            _ => Err(format!("Unknown card type: {}", s)),
        }
    }
}

// ============================================================================
// CARD
// ============================================================================

/// A dictionary entry's spaced-repetition scheduling record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    /// Store-assigned identifier
    pub id: i64,
    /// Dictionary entry this card drills
    pub entry_id: i64,
    #[serde(rename = "type")]
    pub kind: CardKind,
    /// Eligible for review on and after this date
    pub due: NaiveDate,
    pub stability: f64,
    pub difficulty: f64,
    pub elapsed_days: u32,
    pub scheduled_days: u32,
    pub reps: u32,
    pub lapses: u32,
    pub state: CardState,
    pub last_review: Option<NaiveDate>,
    /// Store-assigned, bumped on every successful update
    pub version: i64,
}

impl Card {
    /// The scheduling snapshot of this card
    pub fn fields(&self) -> CardFields {
        CardFields {
            due: self.due,
            stability: self.stability,
            difficulty: self.difficulty,
            elapsed_days: self.elapsed_days,
            scheduled_days: self.scheduled_days,
            reps: self.reps,
            lapses: self.lapses,
            state: self.state,
            last_review: self.last_review,
        }
    }

    /// Due on `today` (date granularity)
    pub fn is_due_on(&self, today: NaiveDate) -> bool {
        self.due <= today
    }
}

// ============================================================================
// CARD FIELDS
// ============================================================================

/// Complete scheduling snapshot written on create and on every review
///
/// Built from request JSON by [`CardFields::from_json`], which reports every
/// bad field at once; there is no `Deserialize` impl.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardFields {
    pub due: NaiveDate,
    pub stability: f64,
    pub difficulty: f64,
    pub elapsed_days: u32,
    pub scheduled_days: u32,
    pub reps: u32,
    pub lapses: u32,
    pub state: CardState,
    pub last_review: Option<NaiveDate>,
}

impl CardFields {
    /// Snapshot for a card that has never been reviewed, due on `today`
    pub fn new_on(today: NaiveDate) -> Self {
        Self {
            due: today,
            stability: 0.0,
            difficulty: 0.0,
            elapsed_days: 0,
            scheduled_days: 0,
            reps: 0,
            lapses: 0,
            state: CardState::New,
            last_review: None,
        }
    }

    /// Range checks the type system cannot express
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = ValidationError::default();
        check_non_negative(&mut errors, "stability", self.stability);
        check_non_negative(&mut errors, "difficulty", self.difficulty);
        check_storable(&mut errors, "due", Some(self.due));
        check_storable(&mut errors, "last_review", self.last_review);
        errors.into_result()
    }

    /// Parse and validate a JSON request body
    pub fn from_json(value: &Value) -> Result<Self, ValidationError> {
        let mut reader = FieldReader::new(value);
        let fields = Self::read(&mut reader);
        reader.finish()?;
        // finish() returned Ok, so every field was read.
        fields.ok_or_else(|| ValidationError::single("body", "is incomplete"))
    }

    fn read(reader: &mut FieldReader<'_>) -> Option<Self> {
        let due = reader.date("due");
        let stability = reader.non_negative_f64("stability");
        let difficulty = reader.non_negative_f64("difficulty");
        let elapsed_days = reader.non_negative_u32("elapsed_days");
        let scheduled_days = reader.non_negative_u32("scheduled_days");
        let reps = reader.non_negative_u32("reps");
        let lapses = reader.non_negative_u32("lapses");
        let state = reader.parsed::<CardState>("state", STATE_LITERALS);
        let last_review = reader.optional_date("last_review");

        Some(Self {
            due: due?,
            stability: stability?,
            difficulty: difficulty?,
            elapsed_days: elapsed_days?,
            scheduled_days: scheduled_days?,
            reps: reps?,
            lapses: lapses?,
            state: state?,
            last_review,
        })
    }
}

fn check_non_negative(errors: &mut ValidationError, field: &str, value: f64) {
    if !value.is_finite() {
        errors.push(field, "must be a finite number");
    } else if value < 0.0 {
        errors.push(field, "must be non-negative");
    }
}

fn check_storable(errors: &mut ValidationError, field: &str, value: Option<NaiveDate>) {
    if value.is_some_and(|date| !is_storable_date(date)) {
        errors.push(field, "must fall between years 0000 and 9999");
    }
}

// ============================================================================
// WRITE INPUTS
// ============================================================================

/// Full-replace update of an existing card
#[derive(Debug, Clone, PartialEq)]
pub struct CardUpdate {
    pub fields: CardFields,
    /// When set, the write is rejected unless the stored version matches
    pub expected_version: Option<i64>,
}

impl CardUpdate {
    pub fn from_json(value: &Value) -> Result<Self, ValidationError> {
        let mut reader = FieldReader::new(value);
        let fields = CardFields::read(&mut reader);
        let expected_version = reader.optional_integer("version");
        reader.finish()?;
        let fields = fields.ok_or_else(|| ValidationError::single("body", "is incomplete"))?;
        Ok(Self {
            fields,
            expected_version,
        })
    }
}

impl From<CardFields> for CardUpdate {
    fn from(fields: CardFields) -> Self {
        Self {
            fields,
            expected_version: None,
        }
    }
}

/// Card creation request
#[derive(Debug, Clone, PartialEq)]
pub struct NewCard {
    pub entry_id: i64,
    pub kind: CardKind,
    pub fields: CardFields,
}

impl NewCard {
    pub fn new(entry_id: i64, fields: CardFields) -> Self {
        Self {
            entry_id,
            kind: CardKind::default(),
            fields,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        self.fields.validate()
    }

    pub fn from_json(value: &Value) -> Result<Self, ValidationError> {
        let mut reader = FieldReader::new(value);
        let entry_id = reader.integer("entry_id");
        let kind = reader.parsed_or("type", KIND_LITERALS, CardKind::default());
        let fields = CardFields::read(&mut reader);
        reader.finish()?;
        match (entry_id, kind, fields) {
            (Some(entry_id), Some(kind), Some(fields)) => Ok(Self {
                entry_id,
                kind,
                fields,
            }),
            _ => Err(ValidationError::single("body", "is incomplete")),
        }
    }
}

// ============================================================================
// REVIEW LOG
// ============================================================================

/// Append-only record of one review event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewLog {
    pub id: i64,
    pub card_id: i64,
    pub review_time: DateTime<Utc>,
    pub review_rating: Rating,
}
