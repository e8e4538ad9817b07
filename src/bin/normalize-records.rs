use anyhow::{Context, Result};
use clap::Parser;
use property_pipeline::config::PipelineConfig;
use property_pipeline::logging;
use property_pipeline::pipeline::parser::record_list;
use property_pipeline::views::{Consumer, ViewProjector};
use property_pipeline::NormalizeUseCase;
use serde_json::Value;
use std::{fs, path::PathBuf};

/// Normalize a file of CMS property records and print the result.
#[derive(Parser, Debug)]
#[command(name = "normalize-records", version, about = "Normalize CMS property records to canonical JSON")]
struct Cli {
    /// JSON file holding an array of records or a `{ "result": [...] }` query response
    path: PathBuf,

    /// Project each property for one renderer (property_card, mobile_card, carousel_item,
    /// property_hero, legacy_listing_card)
    #[arg(long)]
    view: Option<String>,

    /// Pipeline configuration file (defaults to $PROPERTY_PIPELINE_CONFIG or pipeline.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Pretty-print the output
    #[arg(long)]
    pretty: bool,
}

fn load_json(path: &PathBuf) -> Result<Value> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let json: Value = serde_json::from_str(&data)
        .with_context(|| format!("Failed to parse JSON in {}", path.display()))?;
    Ok(json)
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    logging::init_logging();

    let args = Cli::parse();

    let config = match &args.config {
        Some(path) => PipelineConfig::from_path(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => PipelineConfig::load().context("Failed to load pipeline config")?,
    };
    let consumer = args
        .view
        .as_deref()
        .map(str::parse::<Consumer>)
        .transpose()?;

    let payload = load_json(&args.path)?;
    let records = record_list(&payload)
        .with_context(|| format!("No records found in {}", args.path.display()))?;

    let use_case = NormalizeUseCase::from_config(&config);
    let report = use_case.normalize_batch(records);
    for failure in &report.failures {
        eprintln!(
            "skipped #{} ({}): {}",
            failure.index,
            failure.id.as_deref().unwrap_or("no id"),
            failure.error
        );
    }

    let output = match consumer {
        Some(consumer) => {
            let projector = ViewProjector::from_config(&config);
            serde_json::to_value(projector.project_all(consumer.spec(), &report.properties))?
        }
        None => serde_json::to_value(&report.properties)?,
    };

    let rendered = if args.pretty {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    };
    println!("{}", rendered);

    tracing::info!(
        normalized = report.properties.len(),
        skipped = report.failures.len(),
        view = consumer.map(|c| c.as_str()).unwrap_or("canonical"),
        "normalize-records finished"
    );
    Ok(())
}
