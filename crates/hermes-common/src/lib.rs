//! hermes-common: Shared types, errors, and storage used across all HERMES crates.

pub mod error;
pub mod columns;
pub mod document;
pub mod store;
pub mod prediction;
pub mod notification;

// Re-export commonly used types
pub use document::{CsvDocument, CsvRow};
pub use error::{HermesError, Result};
pub use notification::{Notification, NotificationLevel};
pub use prediction::{EvaluationSummary, LabelMetrics, PredictionLabel, ShapValues};
pub use store::{CsvStore, MemoryStore};
