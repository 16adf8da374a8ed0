//! Data Processor Module
//! Turns raw sheet cells into a typed DataFrame (timestamp coercion, period label)
//! and drops repeated events.

use calamine::Data;
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime};
use polars::prelude::*;
use thiserror::Error;

use super::schema::{DATA_ABERTURA, DATETIME_COLUMNS, MES_ANO, REQUIRED_COLUMNS};

#[derive(Error, Debug)]
pub enum ProcessorError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("Missing required column '{0}'")]
    MissingColumn(String),
}

/// Text layouts tried, in order, when a cell holds a date as text.
const DATETIME_FORMATS: [&str; 9] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

const DATE_FORMATS: [&str; 5] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d/%m/%Y", "%d.%m.%Y"];

/// Storage type picked for a non-timestamp column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnKind {
    Int,
    Float,
    Bool,
    DateTime,
    Text,
}

impl ColumnKind {
    fn of(cell: &Data) -> Option<Self> {
        match cell {
            Data::Empty | Data::Error(_) => None,
            Data::Int(_) => Some(ColumnKind::Int),
            Data::Float(_) => Some(ColumnKind::Float),
            Data::Bool(_) => Some(ColumnKind::Bool),
            Data::DateTime(_) | Data::DateTimeIso(_) => Some(ColumnKind::DateTime),
            Data::String(_) | Data::DurationIso(_) => Some(ColumnKind::Text),
        }
    }

    fn merge(self, other: Self) -> Self {
        match (self, other) {
            (a, b) if a == b => a,
            (ColumnKind::Int, ColumnKind::Float) | (ColumnKind::Float, ColumnKind::Int) => {
                ColumnKind::Float
            }
            _ => ColumnKind::Text,
        }
    }
}

/// Handles cell conversion and deduplication.
pub struct DataProcessor;

impl DataProcessor {
    /// Build the normalized dataset from a header row and data rows.
    ///
    /// `time`, `DATA ABERTURA` and `DATA EXECUÇÃO` become millisecond timestamps
    /// (null where a value cannot be read as a date) and `mes_ano` is appended.
    pub fn build_frame(headers: &[String], rows: &[Vec<Data>]) -> Result<DataFrame, ProcessorError> {
        for required in REQUIRED_COLUMNS {
            if !headers.iter().any(|h| h == required) {
                return Err(ProcessorError::MissingColumn(required.to_string()));
            }
        }

        let mut columns = Vec::with_capacity(headers.len() + 1);
        let mut opened_at: Vec<Option<NaiveDateTime>> = Vec::new();

        for (idx, name) in headers.iter().enumerate() {
            let cells = rows.iter().map(|row| row.get(idx).unwrap_or(&Data::Empty));

            if DATETIME_COLUMNS.contains(&name.as_str()) {
                let mut coerced = 0usize;
                let values: Vec<Option<NaiveDateTime>> = cells
                    .map(|cell| {
                        let parsed = Self::parse_datetime(cell);
                        if parsed.is_none() && !matches!(cell, Data::Empty) {
                            coerced += 1;
                        }
                        parsed
                    })
                    .collect();

                if coerced > 0 {
                    tracing::debug!(column = %name, coerced, "unreadable timestamps set to null");
                }

                columns.push(Self::datetime_column(name, &values)?);
                if name == DATA_ABERTURA {
                    opened_at = values;
                }
            } else if name != MES_ANO {
                columns.push(Self::infer_column(name, cells)?);
            }
        }

        let labels: Vec<Option<String>> = opened_at.iter().map(|v| Self::period_label(*v)).collect();
        columns.push(Column::new(MES_ANO.into(), labels));

        Ok(DataFrame::new(columns)?)
    }

    /// Parse one cell as a timestamp. Anything that is not a date yields `None`.
    pub fn parse_datetime(cell: &Data) -> Option<NaiveDateTime> {
        match cell {
            Data::DateTime(dt) => dt.as_datetime(),
            Data::DateTimeIso(s) | Data::String(s) => Self::parse_datetime_str(s),
            Data::Float(f) => Self::from_serial(*f),
            Data::Int(i) => Self::from_serial(*i as f64),
            _ => None,
        }
    }

    /// Parse a textual date or date-time.
    ///
    /// Month-first layouts are tried before day-first ones, so `03/04/2024` is
    /// March 4th while `15/03/2024` still reads as March 15th.
    pub fn parse_datetime_str(raw: &str) -> Option<NaiveDateTime> {
        let s = raw.trim();
        if s.is_empty() {
            return None;
        }

        // Offsets are dropped: the wall-clock time as written is kept.
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Some(dt.naive_local());
        }

        DATETIME_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
            .or_else(|| {
                DATE_FORMATS
                    .iter()
                    .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
            })
    }

    /// Convert a spreadsheet serial number (days since 1899-12-30) to a timestamp.
    pub fn from_serial(serial: f64) -> Option<NaiveDateTime> {
        if !serial.is_finite() {
            return None;
        }
        let millis = (serial * 86_400_000.0).round();
        if millis.abs() > i64::MAX as f64 {
            return None;
        }
        let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
        let offset = Duration::try_milliseconds(millis as i64)?;
        epoch.checked_add_signed(offset)
    }

    /// Year-month label such as `2024-03`.
    pub fn period_label(value: Option<NaiveDateTime>) -> Option<String> {
        value.map(|dt| dt.format("%Y-%m").to_string())
    }

    /// Keep only the first row of every distinct `subset` combination, in source order.
    ///
    /// Null key values compare equal to each other.
    pub fn drop_duplicates(df: &DataFrame, subset: &[&str]) -> Result<DataFrame, ProcessorError> {
        let subset: Vec<String> = subset.iter().map(|name| name.to_string()).collect();
        Ok(df.unique_stable(Some(subset.as_slice()), UniqueKeepStrategy::First, None)?)
    }

    /// Number of distinct non-null values in a column.
    pub fn distinct_count(df: &DataFrame, column: &str) -> Result<usize, ProcessorError> {
        Ok(df.column(column)?.drop_nulls().n_unique()?)
    }

    /// Distinct non-null values of a column as text, in order of first appearance.
    pub fn distinct_values(df: &DataFrame, column: &str) -> Result<Vec<String>, ProcessorError> {
        let unique = df
            .column(column)?
            .drop_nulls()
            .unique_stable()?
            .cast(&DataType::String)?;

        Ok(unique
            .str()?
            .into_iter()
            .flatten()
            .map(|s| s.to_string())
            .collect())
    }

    /// Display text of a value, `None` for nulls. Strings are returned as stored.
    pub fn value_text(value: &AnyValue) -> Option<String> {
        match value {
            AnyValue::Null => None,
            AnyValue::String(s) => Some(s.to_string()),
            AnyValue::StringOwned(s) => Some(s.to_string()),
            other => Some(other.to_string()),
        }
    }

    fn datetime_column(name: &str, values: &[Option<NaiveDateTime>]) -> PolarsResult<Column> {
        let millis: Vec<Option<i64>> = values
            .iter()
            .map(|v| v.map(|dt| dt.and_utc().timestamp_millis()))
            .collect();
        Column::new(name.into(), millis).cast(&DataType::Datetime(TimeUnit::Milliseconds, None))
    }

    fn infer_column<'a>(
        name: &str,
        cells: impl Iterator<Item = &'a Data> + Clone,
    ) -> PolarsResult<Column> {
        let kind = cells
            .clone()
            .filter_map(ColumnKind::of)
            .reduce(ColumnKind::merge)
            .unwrap_or(ColumnKind::Text);

        let column = match kind {
            ColumnKind::Int => {
                let values: Vec<Option<i64>> = cells
                    .map(|c| match c {
                        Data::Int(i) => Some(*i),
                        _ => None,
                    })
                    .collect();
                Column::new(name.into(), values)
            }
            ColumnKind::Float => {
                let values: Vec<Option<f64>> = cells
                    .map(|c| match c {
                        Data::Int(i) => Some(*i as f64),
                        Data::Float(f) => Some(*f),
                        _ => None,
                    })
                    .collect();
                Column::new(name.into(), values)
            }
            ColumnKind::Bool => {
                let values: Vec<Option<bool>> = cells
                    .map(|c| match c {
                        Data::Bool(b) => Some(*b),
                        _ => None,
                    })
                    .collect();
                Column::new(name.into(), values)
            }
            ColumnKind::DateTime => {
                let values: Vec<Option<NaiveDateTime>> = cells.map(Self::parse_datetime).collect();
                return Self::datetime_column(name, &values);
            }
            ColumnKind::Text => {
                let values: Vec<Option<String>> = cells.map(Self::cell_text).collect();
                Column::new(name.into(), values)
            }
        };

        Ok(column)
    }

    fn cell_text(cell: &Data) -> Option<String> {
        match cell {
            Data::Empty | Data::Error(_) => None,
            Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => Some(s.clone()),
            Data::Int(i) => Some(i.to_string()),
            Data::Float(f) => Some(f.to_string()),
            Data::Bool(b) => Some(b.to_string()),
            Data::DateTime(dt) => dt
                .as_datetime()
                .map(|d| d.format("%Y-%m-%d %H:%M:%S").to_string()),
        }
    }
}
