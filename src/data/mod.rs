//! Data module - workbook loading, timestamp coercion and deduplication

mod cache;
mod loader;
mod processor;
pub mod schema;

pub use cache::LoadCache;
pub use loader::{DataLoader, LoadedDatasets, LoaderError, RawSheet};
pub use processor::{DataProcessor, ProcessorError};
