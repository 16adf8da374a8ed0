//! ISN Dashboard - sensor communication-loss workbook loader
//!
//! Reads the "Base Refinada" sheet, normalizes its timestamps, labels each event
//! with its opening month and drops repeated events.

pub mod data;
pub mod stats;

pub use data::{DataLoader, LoadCache, LoadedDatasets, LoaderError};
pub use stats::DatasetSummary;
