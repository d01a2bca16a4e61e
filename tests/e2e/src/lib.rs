//! End-to-end test support for Zidian
//!
//! - [`harness`]: isolated throw-away databases
//! - [`mocks`]: card and dictionary fixtures

pub mod harness;
pub mod mocks;

pub use harness::TestDatabaseManager;
pub use mocks::TestDataFactory;
