//! Error types shared by the review core and the dictionary.

use std::fmt;

use serde::Serialize;

use crate::storage::StorageError;

/// A single rejected input field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Name of the offending field as it appears on the wire
    pub field: String,
    /// Human-readable reason
    pub message: String,
}

/// One or more input fields failed type, range or enum constraints.
///
/// Collected in full before returning, so a caller sees every failing
/// field at once rather than the first one only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    pub errors: Vec<FieldError>,
}

impl ValidationError {
    /// Error for exactly one field
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut err = Self::default();
        err.push(field, message);
        err
    }

    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(FieldError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Whether `field` is among the rejected fields
    pub fn has_field(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }

    /// Names of the rejected fields, in the order they were checked
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.errors.iter().map(|e| e.field.as_str())
    }

    /// `Ok(())` when nothing was collected
    pub fn into_result(self) -> std::result::Result<(), ValidationError> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Validation failed")?;
        for (i, e) in self.errors.iter().enumerate() {
            let sep = if i == 0 { ": " } else { "; " };
            write!(f, "{}{} {}", sep, e.field, e.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// Core error type
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Rejected input; nothing was written
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// The targeted record does not exist
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: i64 },
    /// The card changed since the caller read it
    #[error("Card {id} was modified concurrently (expected version {expected}, found {actual})")]
    Conflict { id: i64, expected: i64, actual: i64 },
    /// Store I/O failure, propagated as-is
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl Error {
    pub(crate) fn card_not_found(id: i64) -> Self {
        Error::NotFound { kind: "Card", id }
    }

    pub(crate) fn entry_not_found(id: i64) -> Self {
        Error::NotFound { kind: "Entry", id }
    }
}

/// Core result type
pub type Result<T> = std::result::Result<T, Error>;
