//! Summary Module
//! Headline metrics and preview rows shown for a loaded workbook.

use chrono::DateTime;
use polars::prelude::*;
use serde::Serialize;
use serde_json::{Map, Number, Value};

use crate::data::schema::PLANTA;
use crate::data::{DataProcessor, LoadedDatasets, ProcessorError};

/// Rows shown in the preview unless asked otherwise.
pub const DEFAULT_PREVIEW_ROWS: usize = 5;

/// Counts displayed at the top of the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatasetSummary {
    pub source: String,
    pub total_records: usize,
    pub unique_records: usize,
    pub plant_count: usize,
}

impl DatasetSummary {
    pub fn from_datasets(data: &LoadedDatasets) -> Result<Self, ProcessorError> {
        let plant_count = DataProcessor::distinct_count(&data.records, PLANTA)?;

        Ok(Self {
            source: data.source.display().to_string(),
            total_records: data.total_count(),
            unique_records: data.unique_count(),
            plant_count,
        })
    }
}

/// First `n` rows of a dataset.
pub fn preview(df: &DataFrame, n: usize) -> DataFrame {
    df.head(Some(n))
}

/// First `n` rows as JSON objects keyed by column name.
pub fn preview_rows(df: &DataFrame, n: usize) -> Result<Vec<Value>, ProcessorError> {
    let head = preview(df, n);
    let columns = head.get_columns();
    let mut rows = Vec::with_capacity(head.height());

    for i in 0..head.height() {
        let mut row = Map::new();
        for column in columns {
            row.insert(column.name().to_string(), json_value(&column.get(i)?));
        }
        rows.push(Value::Object(row));
    }

    Ok(rows)
}

fn json_value(value: &AnyValue) -> Value {
    match value {
        AnyValue::Null => Value::Null,
        AnyValue::Boolean(b) => Value::Bool(*b),
        AnyValue::Int64(i) => Value::from(*i),
        AnyValue::Int32(i) => Value::from(*i),
        AnyValue::Float64(f) => Number::from_f64(*f).map(Value::Number).unwrap_or(Value::Null),
        AnyValue::String(s) => Value::String(s.to_string()),
        AnyValue::StringOwned(s) => Value::String(s.to_string()),
        AnyValue::Datetime(ms, TimeUnit::Milliseconds, _) => DateTime::from_timestamp_millis(*ms)
            .map(|dt| Value::String(dt.naive_utc().format("%Y-%m-%d %H:%M:%S").to_string()))
            .unwrap_or(Value::Null),
        other => DataProcessor::value_text(other)
            .map(Value::String)
            .unwrap_or(Value::Null),
    }
}
