//! Stats module - dashboard metrics and preview

mod summary;

pub use summary::{preview, preview_rows, DatasetSummary, DEFAULT_PREVIEW_ROWS};
