#![forbid(unsafe_code)]

//! Core domain model and business logic for the Glow wellness tracker.
//!
//! This crate provides:
//! - Domain types (daily records, typed updates, derived views)
//! - Date keys and an injectable clock
//! - Record persistence (in-memory and file-backed stores)
//! - The record service, weekly rollup and streak engine
//! - Facial exercise catalog and CSV export

pub mod types;
pub mod error;
pub mod date_key;
pub mod clock;
pub mod catalog;
pub mod config;
pub mod logging;
pub mod store;
pub mod service;
pub mod weekly;
pub mod streak;
pub mod export;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use date_key::DateKey;
pub use clock::{Clock, FixedClock, SystemClock};
pub use catalog::{build_default_catalog, get_default_catalog};
pub use config::Config;
pub use store::{FileStore, MemoryStore, RecordStore};
pub use service::DailyRecordService;
pub use weekly::{weekly_progress, weekly_summary};
pub use streak::{compute_streaks, history_summary, streak_state, Milestone};
pub use export::export_csv;
