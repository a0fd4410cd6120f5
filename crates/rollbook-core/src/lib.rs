//! rollbook-core — Record store, persistence, and report engine.
//!
//! This crate owns the student record collection and everything derived
//! from it. Presentation layers (the CLI, the HTML dashboard) call into
//! [`store::RecordStore`] for mutation and queries and into
//! [`statistics`] for chart data.

pub mod config;
pub mod error;
pub mod model;
pub mod preferences;
pub mod statistics;
pub mod storage;
pub mod store;
pub mod thumbnail;
pub mod transfer;
pub mod validation;

pub use error::{ReportError, Result, StorageError, StoreError};
pub use model::{NewRecord, Record, RecordFilter, RecordPatch};
pub use store::RecordStore;
