//! ISN Dashboard - sensor communication-loss summary
//!
//! Loads the refined ISN workbook and prints record counts plus a preview of the data.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use serde_json::Value;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use isn_dashboard::data::schema::DEFAULT_SHEET;
use isn_dashboard::stats::{preview, preview_rows, DatasetSummary, DEFAULT_PREVIEW_ROWS};
use isn_dashboard::{DataLoader, LoadCache};

#[derive(Parser, Debug)]
#[command(name = "isn_dashboard")]
#[command(about = "Sensor communication-loss workbook summary", long_about = None)]
struct Cli {
    /// Workbook to load
    #[arg(default_value = "Base_ISN_Comm_Loss_Refinada.xlsx")]
    source: PathBuf,

    /// Sheet holding the refined events
    #[arg(long, default_value = DEFAULT_SHEET)]
    sheet: String,

    /// Number of rows shown in the preview
    #[arg(long, default_value_t = DEFAULT_PREVIEW_ROWS)]
    preview_rows: usize,

    /// Print a single JSON document instead of tables
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct Report<'a> {
    summary: &'a DatasetSummary,
    preview: Vec<Value>,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    let mut cache = LoadCache::new(DataLoader::new().with_sheet_name(&cli.sheet));
    let data = match cache.get_or_load(&cli.source) {
        Ok(data) => data,
        Err(e) => {
            // Nothing is rendered once the load fails.
            tracing::error!(error = %e, "failed to load data");
            return Err(e).context(format!(
                "check that the file exists and has a '{}' sheet",
                cli.sheet
            ));
        }
    };

    let summary = DatasetSummary::from_datasets(&data)?;

    if cli.json {
        let report = Report {
            summary: &summary,
            preview: preview_rows(&data.records, cli.preview_rows)?,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!(
        "Data loaded: {} total records, {} unique.",
        summary.total_records, summary.unique_records
    );
    println!();
    println!("Total records   {}", summary.total_records);
    println!("Unique records  {}", summary.unique_records);
    println!("Plants          {}", summary.plant_count);
    println!();
    println!("Data preview");
    println!("{}", preview(&data.records, cli.preview_rows));

    Ok(())
}
