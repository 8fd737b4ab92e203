//! CLI entry point for the kgflow pipeline.
//!
//! With no arguments, runs the built-in example text and query and prints
//! the `result` field as JSON on stdout. Logs go to stderr.

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use kgflow_core::{KgflowConfig, PipelineInput};
use kgflow_extract::{LlmGraphTransformer, OpenAiClient};
use kgflow_graph::{GraphClient, GraphConfig};
use kgflow_pipeline::Pipeline;

const EXAMPLE_TEXT: &str = "
Arjun is an employee who knows Python and works on the Billing System project.
Sneha is skilled in React and works on the UI Team.
";

const EXAMPLE_QUERY: &str = "List all employees";

#[derive(Parser)]
#[command(name = "kgflow")]
#[command(about = "Extract a knowledge graph from text, load it into Neo4j, and query it")]
struct Cli {
    /// Text to extract from (defaults to the built-in example).
    #[arg(short, long, conflicts_with = "text_file")]
    text: Option<String>,

    /// Read the text to extract from a file.
    #[arg(long)]
    text_file: Option<PathBuf>,

    /// Natural-language query (currently answered by a fixed sample query).
    #[arg(short, long, conflicts_with = "no_query")]
    query: Option<String>,

    /// Skip the query step entirely.
    #[arg(long)]
    no_query: bool,

    /// Print the whole pipeline record instead of just the result.
    #[arg(long)]
    full: bool,

    /// Emit logs as JSON.
    #[arg(long)]
    log_json: bool,

    /// Config file prefix (default: kgflow).
    #[arg(short, long, default_value = "kgflow")]
    config: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if cli.log_json {
        fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .json()
            .init();
    } else {
        fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
    }

    let config = KgflowConfig::load(&cli.config)?;
    let input = build_input(&cli)?;

    let llm = OpenAiClient::from_config(&config.llm)?;
    let extractor = LlmGraphTransformer::from_config(llm, &config.extract);

    let graph = GraphClient::connect(&GraphConfig::from(&config.neo4j)).await?;

    let pipeline = Pipeline::new(extractor, graph).with_ingest_config(config.ingest.clone());
    let record = pipeline.run(input).await?;

    let output = if cli.full {
        serde_json::to_string_pretty(&record)?
    } else {
        serde_json::to_string_pretty(&record.result)?
    };
    println!("{output}");

    Ok(())
}

fn build_input(cli: &Cli) -> anyhow::Result<PipelineInput> {
    let text = match (&cli.text, &cli.text_file) {
        (Some(text), _) => text.clone(),
        (None, Some(path)) => std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read {}: {e}", path.display()))?,
        (None, None) => EXAMPLE_TEXT.to_string(),
    };

    let input = PipelineInput::new(text);
    if cli.no_query {
        return Ok(input);
    }
    Ok(input.with_query(cli.query.as_deref().unwrap_or(EXAMPLE_QUERY)))
}
