use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use hn_summarizer::{
    config, generation,
    ingestion::{IngestionPipeline, IngestionSettings},
    logging, output,
    summary::{PromptTemplate, SummaryProcessor},
};

#[derive(Parser)]
#[command(
    name = "hn-summarizer",
    version,
    about = "Fetch the newest Hacker News stories and summarize each linked article in one sentence"
)]
struct Cli {
    /// Number of newest stories to fetch.
    #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(u8).range(1..=20))]
    last_k: u8,
    /// Model name used for summarization [default: SUMMARY_MODEL or gpt-5.2].
    #[arg(long)]
    model: Option<String>,
    /// Sampling temperature between 0.0 and 1.0 [default: SUMMARY_TEMPERATURE or 0.5].
    #[arg(long, value_parser = parse_temperature)]
    temperature: Option<f32>,
    /// Show skipped articles, errors, and timings.
    #[arg(long)]
    verbose: bool,
    /// Print a JSON array instead of formatted text.
    #[arg(long)]
    json: bool,
}

fn parse_temperature(raw: &str) -> Result<f32, String> {
    let value: f32 = raw
        .parse()
        .map_err(|_| format!("`{raw}` is not a number"))?;
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("{value} is not in 0.0..=1.0"))
    }
}

/// Record the effective configuration; call only once tracing is installed.
fn log_configuration(config: &config::Config) {
    tracing::debug!(
        hn_api_base = %config.hn_api_base,
        provider = ?config.generation_provider,
        model = %config.summary_model,
        temperature = config.summary_temperature,
        has_api_key = config.openai_api_key.is_some(),
        "Loaded configuration"
    );
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = config::init_config().context("Failed to load configuration")?;
    logging::init_tracing(cli.verbose, config.log_file.as_deref());
    log_configuration(config);

    let model = cli.model.unwrap_or_else(|| config.summary_model.clone());
    let temperature = cli.temperature.unwrap_or(config.summary_temperature);
    let limit = usize::from(cli.last_k);
    tracing::info!(last_k = limit, model = %model, temperature, "Starting Hacker News summarizer");

    let template = PromptTemplate::load(config.prompt_template_path.as_deref())
        .context("Failed to load prompt template")?;
    let generator =
        generation::build_text_generator(config).context("Failed to build text generator")?;

    let started = Instant::now();
    let documents = IngestionPipeline::new(IngestionSettings::from_config(config))
        .run(limit)
        .await;
    let results = SummaryProcessor::new(generator, template, model, temperature)
        .run(documents)
        .await;
    tracing::info!(
        elapsed_secs = started.elapsed().as_secs_f64(),
        "Total execution time: {:.2} seconds",
        started.elapsed().as_secs_f64()
    );

    let rows = output::rows(&results);
    if cli.json {
        println!(
            "{}",
            output::render_json(&rows).context("Failed to encode summaries as JSON")?
        );
    } else {
        println!(
            "{}",
            output::render_text(&rows, console::colors_enabled())
        );
    }
    Ok(())
}
