use std::fs::File;
use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use nlp_dashboard::dashboard::{Dashboard, DashboardConfig, TaskOutput};
use nlp_dashboard::pipelines::annotation::{AnnotationStyle, SpanAnnotator};
use nlp_dashboard::pipelines::keywords_extraction::keywords_to_csv;
use nlp_dashboard::Config;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "nlp-dashboard", version, about = "Open-source NLP dashboard pipelines")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract keywords and print the annotated text as JSON
    Keywords {
        /// Number of keywords to extract (1 to 10), defaults to the configured value
        #[arg(short = 'n', long)]
        max_keywords: Option<usize>,
        /// JSON dashboard configuration
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Also write the keywords to this CSV file
        #[arg(long)]
        csv: Option<PathBuf>,
        /// Text to analyze, read from stdin if `-`, the example text if omitted
        text: Option<String>,
    },
    /// Highlight literal keywords in a text
    Annotate {
        #[arg(short, long = "keyword", required = true)]
        keywords: Vec<String>,
        #[arg(short, long, default_value = "KEY")]
        label: String,
        #[arg(long, default_value = "#26aaef")]
        color: String,
        /// Text to annotate, read from stdin if `-` or omitted
        text: Option<String>,
    },
}

fn read_stdin() -> Result<String> {
    let mut text = String::new();
    io::stdin()
        .read_to_string(&mut text)
        .context("Failed to read text from stdin")?;
    Ok(text)
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Keywords {
            max_keywords,
            config,
            csv,
            text,
        } => {
            let config = match config {
                Some(path) => DashboardConfig::from_file(&path)
                    .with_context(|| format!("Failed to load {}", path.display()))?,
                None => DashboardConfig::default(),
            };
            let text = match text.as_deref() {
                Some("-") => read_stdin()?,
                Some(text) => text.to_string(),
                None => config.example_text.clone(),
            };
            let max_keywords = max_keywords.unwrap_or(config.default_max_keywords);
            debug!(max_keywords, "Extracting keywords");
            let dashboard = Dashboard::new(config)?;
            let output = dashboard.run_keywords(&text, max_keywords)?;
            println!("{}", serde_json::to_string_pretty(&output)?);

            if let (Some(path), TaskOutput::Keywords { keywords, .. }) = (csv, &output) {
                let file = File::create(&path)
                    .with_context(|| format!("Failed to create {}", path.display()))?;
                keywords_to_csv(keywords, file)?;
                info!(path = %path.display(), "Keywords exported");
            }
        }
        Commands::Annotate {
            keywords,
            label,
            color,
            text,
        } => {
            let text = match text {
                Some(text) if text != "-" => text,
                _ => read_stdin()?,
            };
            let annotator = SpanAnnotator::new(AnnotationStyle::new(label, color));
            let annotation = annotator.annotate(&text, &keywords)?;
            println!("{}", serde_json::to_string_pretty(&annotation)?);
        }
    }
    Ok(())
}
