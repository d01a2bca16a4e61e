//! Dictionary - entries, part-of-speech definitions and example sentences
//!
//! Thin layer over [`Storage`]: required-field validation and parent checks
//! before insert. Lookups by foreign key are plain [`Storage`] reads.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result, ValidationError};
use crate::input::FieldReader;
use crate::storage::Storage;

/// A headword with its romanisation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub id: i64,
    /// Hanzi form, e.g. 你
    pub word: String,
    /// Tone-marked pinyin, e.g. nǐ
    pub pinyin: String,
}

/// One sense of an entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Definition {
    pub id: i64,
    pub entry_id: i64,
    /// Part of speech label, e.g. 代 (pronoun)
    pub part: String,
    pub definition: String,
}

/// Example sentence illustrating a definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Example {
    pub id: i64,
    pub definition_id: i64,
    pub sentence: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEntry {
    pub word: String,
    pub pinyin: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDefinition {
    pub entry_id: i64,
    pub part: String,
    pub definition: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewExample {
    pub definition_id: i64,
    pub sentence: String,
}

fn require_text(errors: &mut ValidationError, field: &str, value: &str) {
    if value.trim().is_empty() {
        errors.push(field, "must not be empty");
    }
}

impl NewEntry {
    pub fn validate(&self) -> std::result::Result<(), ValidationError> {
        let mut errors = ValidationError::default();
        require_text(&mut errors, "word", &self.word);
        require_text(&mut errors, "pinyin", &self.pinyin);
        errors.into_result()
    }

    pub fn from_json(value: &Value) -> std::result::Result<Self, ValidationError> {
        let mut reader = FieldReader::new(value);
        let word = reader.string("word");
        let pinyin = reader.string("pinyin");
        reader.finish()?;
        match (word, pinyin) {
            (Some(word), Some(pinyin)) => Ok(Self { word, pinyin }),
            _ => Err(ValidationError::single("body", "is incomplete")),
        }
    }
}

impl NewDefinition {
    pub fn validate(&self) -> std::result::Result<(), ValidationError> {
        let mut errors = ValidationError::default();
        require_text(&mut errors, "part", &self.part);
        require_text(&mut errors, "definition", &self.definition);
        errors.into_result()
    }

    pub fn from_json(value: &Value) -> std::result::Result<Self, ValidationError> {
        let mut reader = FieldReader::new(value);
        let entry_id = reader.integer("entry_id");
        let part = reader.string("part");
        let definition = reader.string("definition");
        reader.finish()?;
        match (entry_id, part, definition) {
            (Some(entry_id), Some(part), Some(definition)) => Ok(Self {
                entry_id,
                part,
                definition,
            }),
            _ => Err(ValidationError::single("body", "is incomplete")),
        }
    }
}

impl NewExample {
    pub fn validate(&self) -> std::result::Result<(), ValidationError> {
        let mut errors = ValidationError::default();
        require_text(&mut errors, "sentence", &self.sentence);
        errors.into_result()
    }

    pub fn from_json(value: &Value) -> std::result::Result<Self, ValidationError> {
        let mut reader = FieldReader::new(value);
        let definition_id = reader.integer("definition_id");
        let sentence = reader.string("sentence");
        reader.finish()?;
        match (definition_id, sentence) {
            (Some(definition_id), Some(sentence)) => Ok(Self {
                definition_id,
                sentence,
            }),
            _ => Err(ValidationError::single("body", "is incomplete")),
        }
    }
}

/// Validate and insert an entry
pub fn create_entry(storage: &Storage, input: &NewEntry) -> Result<Entry> {
    input.validate()?;
    let entry = storage.insert_entry(input)?;
    tracing::info!(entry_id = entry.id, word = %entry.word, "Created dictionary entry");
    Ok(entry)
}

/// Validate and insert a definition under an existing entry
pub fn create_definition(storage: &Storage, input: &NewDefinition) -> Result<Definition> {
    input.validate()?;
    if storage.get_entry(input.entry_id)?.is_none() {
        return Err(Error::entry_not_found(input.entry_id));
    }
    Ok(storage.insert_definition(input)?)
}

/// Validate and insert an example under an existing definition
pub fn create_example(storage: &Storage, input: &NewExample) -> Result<Example> {
    input.validate()?;
    if storage.get_definition(input.definition_id)?.is_none() {
        return Err(Error::NotFound {
            kind: "Definition",
            id: input.definition_id,
        });
    }
    Ok(storage.insert_example(input)?)
}

/// Entry by id, `NotFound` when absent
pub fn get_entry(storage: &Storage, id: i64) -> Result<Entry> {
    storage
        .get_entry(id)?
        .ok_or_else(|| Error::entry_not_found(id))
}

/// Insert the sample entry 你 with one definition and one example.
///
/// Does nothing when the dictionary already has entries. Returns whether
/// anything was inserted.
pub fn seed_sample(storage: &Storage) -> Result<bool> {
    if storage.count_entries()? > 0 {
        tracing::info!("Dictionary already populated, skipping seed");
        return Ok(false);
    }

    let entry = create_entry(
        storage,
        &NewEntry {
            word: "你".to_string(),
            pinyin: "nǐ".to_string(),
        },
    )?;
    let definition = create_definition(
        storage,
        &NewDefinition {
            entry_id: entry.id,
            part: "代".to_string(),
            definition: "称对方（一个人）".to_string(),
        },
    )?;
    create_example(
        storage,
        &NewExample {
            definition_id: definition.id,
            sentence: "你好，世界。".to_string(),
        },
    )?;

    Ok(true)
}
