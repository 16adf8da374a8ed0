//! Workbook Loader Module
//! Reads the "Base Refinada" sheet and produces the full and deduplicated datasets.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use calamine::{open_workbook_auto, Data, Range, Reader};
use polars::prelude::*;
use thiserror::Error;

use super::processor::{DataProcessor, ProcessorError};
use super::schema::{DATA_EXTENSIONS, DEFAULT_SHEET, KEY_COLUMNS};

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Source not found: {}{}", path.display(), CandidateList(candidates))]
    SourceNotFound {
        path: PathBuf,
        candidates: Vec<PathBuf>,
    },
    #[error("Sheet '{sheet}' not found in {} (available: {})", path.display(), available.join(", "))]
    SheetNotFound {
        path: PathBuf,
        sheet: String,
        available: Vec<String>,
    },
    #[error("Malformed source {}: {reason}", path.display())]
    MalformedSource { path: PathBuf, reason: String },
}

/// Renders the diagnostic listing attached to `SourceNotFound`.
struct CandidateList<'a>(&'a [PathBuf]);

impl fmt::Display for CandidateList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, " (no data files next to it)");
        }
        write!(f, "\nData files available in that directory:")?;
        for candidate in self.0 {
            write!(f, "\n  - {}", candidate.display())?;
        }
        Ok(())
    }
}

/// Header row and data rows of one sheet, as read from the workbook.
#[derive(Debug, Clone)]
pub struct RawSheet {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Data>>,
}

/// Result of a successful load: every record plus the first record of each event key.
#[derive(Debug, Clone)]
pub struct LoadedDatasets {
    pub source: PathBuf,
    pub records: DataFrame,
    pub unique_records: DataFrame,
}

impl LoadedDatasets {
    pub fn total_count(&self) -> usize {
        self.records.height()
    }

    pub fn unique_count(&self) -> usize {
        self.unique_records.height()
    }
}

/// Loads communication-loss workbooks.
#[derive(Debug, Clone)]
pub struct DataLoader {
    sheet_name: String,
}

impl Default for DataLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl DataLoader {
    pub fn new() -> Self {
        Self {
            sheet_name: DEFAULT_SHEET.to_string(),
        }
    }

    /// Read a different sheet than "Base Refinada".
    pub fn with_sheet_name(mut self, sheet_name: impl Into<String>) -> Self {
        self.sheet_name = sheet_name.into();
        self
    }

    pub fn sheet_name(&self) -> &str {
        &self.sheet_name
    }

    /// Load the workbook at `path`.
    ///
    /// Returns the normalized dataset and its deduplicated view. Timestamps that
    /// cannot be read become nulls; only a missing file, a missing sheet or an
    /// unreadable workbook is an error.
    pub fn load(&self, path: impl AsRef<Path>) -> Result<LoadedDatasets, LoaderError> {
        let path = path.as_ref();
        tracing::info!(source = %path.display(), sheet = %self.sheet_name, "loading workbook");

        let sheet = self.read_sheet(path)?;
        let malformed = |e: ProcessorError| LoaderError::MalformedSource {
            path: path.to_path_buf(),
            reason: e.to_string(),
        };

        let records = DataProcessor::build_frame(&sheet.headers, &sheet.rows).map_err(malformed)?;
        let unique_records = DataProcessor::drop_duplicates(&records, &KEY_COLUMNS).map_err(malformed)?;

        tracing::info!(
            total = records.height(),
            unique = unique_records.height(),
            "workbook loaded"
        );

        Ok(LoadedDatasets {
            source: path.to_path_buf(),
            records,
            unique_records,
        })
    }

    /// Read the configured sheet without any conversion.
    pub fn read_sheet(&self, path: &Path) -> Result<RawSheet, LoaderError> {
        if !path.is_file() {
            return Err(Self::not_found(path, "source file not found"));
        }
        // A file that exists but cannot be opened counts as missing.
        if let Err(e) = fs::File::open(path) {
            tracing::debug!(error = %e, "source file not readable");
            return Err(Self::not_found(path, "source file not readable"));
        }

        let malformed = |reason: String| LoaderError::MalformedSource {
            path: path.to_path_buf(),
            reason,
        };

        let mut workbook = open_workbook_auto(path).map_err(|e| malformed(e.to_string()))?;

        let available = workbook.sheet_names();
        if !available.iter().any(|name| name == &self.sheet_name) {
            return Err(LoaderError::SheetNotFound {
                path: path.to_path_buf(),
                sheet: self.sheet_name.clone(),
                available,
            });
        }

        let range = workbook
            .worksheet_range(&self.sheet_name)
            .map_err(|e| malformed(e.to_string()))?;

        let mut grid = Self::anchor_at_a1(&range).into_iter();
        let header_row = grid
            .next()
            .ok_or_else(|| malformed(format!("sheet '{}' is empty", self.sheet_name)))?;
        let headers = Self::normalize_headers(&header_row);

        let rows: Vec<Vec<Data>> = grid
            .filter(|row| row.iter().any(|cell| !matches!(cell, Data::Empty)))
            .collect();

        tracing::debug!(columns = headers.len(), rows = rows.len(), "sheet read");
        Ok(RawSheet { headers, rows })
    }

    fn not_found(path: &Path, message: &str) -> LoaderError {
        let candidates = Self::list_candidates(path);
        tracing::warn!(
            source = %path.display(),
            candidates = candidates.len(),
            "{message}"
        );
        LoaderError::SourceNotFound {
            path: path.to_path_buf(),
            candidates,
        }
    }

    /// Rows of `range` laid out from cell A1.
    ///
    /// calamine starts a range at the first used cell; leading blank rows and
    /// columns are put back so the header is always row 1 and column
    /// positions match the sheet.
    fn anchor_at_a1(range: &Range<Data>) -> Vec<Vec<Data>> {
        let Some((first_row, first_col)) = range.start() else {
            return Vec::new();
        };
        let (first_row, first_col) = (first_row as usize, first_col as usize);
        let width = first_col + range.width();

        let mut grid = Vec::with_capacity(first_row + range.height());
        grid.extend((0..first_row).map(|_| vec![Data::Empty; width]));
        grid.extend(range.rows().map(|row| {
            let mut padded = vec![Data::Empty; first_col];
            padded.extend_from_slice(row);
            padded
        }));
        grid
    }

    /// Data-like files sitting next to `path`, sorted by name.
    pub fn list_candidates(path: &Path) -> Vec<PathBuf> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let Ok(entries) = fs::read_dir(dir) else {
            return Vec::new();
        };

        let mut candidates: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|p| p.is_file() && Self::is_data_file(p))
            .collect();
        candidates.sort();
        candidates
    }

    fn is_data_file(path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                DATA_EXTENSIONS
                    .iter()
                    .any(|known| ext.eq_ignore_ascii_case(known))
            })
            .unwrap_or(false)
    }

    /// Header cells as column names: blanks become `Unnamed: <idx>`, repeats get `.1`, `.2`, ...
    fn normalize_headers(row: &[Data]) -> Vec<String> {
        let mut counts: HashMap<String, usize> = HashMap::new();

        row.iter()
            .enumerate()
            .map(|(idx, cell)| {
                let base = cell.to_string().trim().to_string();
                let base = if base.is_empty() {
                    format!("Unnamed: {idx}")
                } else {
                    base
                };

                let seen = counts.entry(base.clone()).or_insert(0);
                let name = if *seen == 0 {
                    base
                } else {
                    format!("{base}.{seen}")
                };
                *seen += 1;
                name
            })
            .collect()
    }
}
