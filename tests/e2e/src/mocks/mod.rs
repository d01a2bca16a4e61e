//! Test data

mod fixtures;

pub use fixtures::{CardTemplate, TestDataFactory};
