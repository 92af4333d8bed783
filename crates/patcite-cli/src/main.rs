use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;

mod output;
mod pipeline;

use output::{ColorMode, print_document_summary, print_split_chunks};
use patcite_core::LlmClient;
use patcite_core::llm::{DEFAULT_ENDPOINT, DEFAULT_INITIAL_DELAY, DEFAULT_MAX_RETRIES, DEFAULT_MODEL};
use patcite_segment::{DEFAULT_THRESHOLD, ParagraphSplitter, SplitterConfig};
use pipeline::Pipeline;

/// Patent Citation Extractor - extract bibliographic, accession, and
/// standards citations from patent-application XML via a local LLM server
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract citations from a single patent-application XML file
    Extract {
        /// Path to the XML document
        file_path: PathBuf,

        /// Chat-completions endpoint of the LLM server
        #[arg(long)]
        endpoint: Option<String>,

        /// Model name loaded on the LLM server
        #[arg(long)]
        model: Option<String>,

        /// Target maximum chunk size in characters
        #[arg(long)]
        threshold: Option<usize>,

        /// Path for the output catalog (default: Output/<stem>_citations.xml next to the input)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },

    /// Process every XML file in a directory
    Batch {
        /// Directory containing XML documents
        dir_path: PathBuf,

        /// Chat-completions endpoint of the LLM server
        #[arg(long)]
        endpoint: Option<String>,

        /// Model name loaded on the LLM server
        #[arg(long)]
        model: Option<String>,

        /// Target maximum chunk size in characters
        #[arg(long)]
        threshold: Option<usize>,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },

    /// Dry run: print the split chunks for each paragraph without calling the LLM
    Split {
        /// Path to the XML document
        file_path: PathBuf,

        /// Target maximum chunk size in characters
        #[arg(long)]
        threshold: Option<usize>,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Extract {
            file_path,
            endpoint,
            model,
            threshold,
            output,
            no_color,
        } => {
            let settings = resolve_settings(endpoint, model, threshold);
            extract(file_path, settings, output, no_color).await
        }
        Command::Batch {
            dir_path,
            endpoint,
            model,
            threshold,
            no_color,
        } => {
            let settings = resolve_settings(endpoint, model, threshold);
            batch(dir_path, settings, no_color).await
        }
        Command::Split {
            file_path,
            threshold,
            no_color,
        } => {
            let settings = resolve_settings(None, None, threshold);
            split(file_path, settings, no_color)
        }
    }
}

/// Resolved runtime settings: CLI flags > env vars > config file > defaults.
struct Settings {
    endpoint: String,
    model: String,
    max_retries: u32,
    initial_delay: Duration,
    threshold: usize,
}

fn resolve_settings(
    endpoint: Option<String>,
    model: Option<String>,
    threshold: Option<usize>,
) -> Settings {
    let file = patcite_core::config_file::load_config();
    let file_llm = file.llm.unwrap_or_default();
    let file_splitter = file.splitter.unwrap_or_default();

    Settings {
        endpoint: endpoint
            .or_else(|| std::env::var("PATCITE_ENDPOINT").ok())
            .or(file_llm.endpoint)
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
        model: model
            .or_else(|| std::env::var("PATCITE_MODEL").ok())
            .or(file_llm.model)
            .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        max_retries: file_llm.max_retries.unwrap_or(DEFAULT_MAX_RETRIES),
        initial_delay: file_llm
            .initial_delay_secs
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_INITIAL_DELAY),
        threshold: threshold
            .or_else(|| {
                std::env::var("PATCITE_THRESHOLD")
                    .ok()
                    .and_then(|v| v.parse().ok())
            })
            .or(file_splitter.threshold)
            .unwrap_or(DEFAULT_THRESHOLD),
    }
}

fn build_pipeline(settings: &Settings) -> Pipeline {
    let client = LlmClient::new(settings.endpoint.clone(), settings.model.clone())
        .with_retry_policy(settings.max_retries, settings.initial_delay);
    let splitter = ParagraphSplitter::with_config(
        SplitterConfig::builder().threshold(settings.threshold).build(),
    );
    Pipeline::new(client, splitter)
}

async fn check_connection(pipeline: &Pipeline, color: ColorMode) -> anyhow::Result<()> {
    match pipeline.client().healthcheck().await {
        Ok(()) => {
            let msg = format!("Connected to LLM server at {}", pipeline.client().endpoint());
            if color.enabled() {
                println!("{}", msg.green());
            } else {
                println!("{}", msg);
            }
            Ok(())
        }
        Err(error) => {
            anyhow::bail!(
                "could not connect to LLM server at {} ({}). \
                 Ensure the server is running with a model loaded.",
                pipeline.client().endpoint(),
                error
            )
        }
    }
}

async fn extract(
    file_path: PathBuf,
    settings: Settings,
    output: Option<PathBuf>,
    no_color: bool,
) -> anyhow::Result<()> {
    let color = ColorMode(!no_color);
    let pipeline = build_pipeline(&settings);
    check_connection(&pipeline, color).await?;

    let xml = std::fs::read_to_string(&file_path)?;
    let (catalog, stats) = pipeline.process_document(&xml).await?;

    let file_name = file_path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    if catalog.is_empty() {
        println!("No citations were found in {}. No output file generated.", file_name);
        return Ok(());
    }

    let out_path = output.unwrap_or_else(|| default_output_path(&file_path));
    if let Some(parent) = out_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    catalog.save_to_file(&out_path)?;

    let mut stdout = std::io::stdout();
    print_document_summary(&mut stdout, &file_name, &stats, &catalog.summary(), color)?;
    writeln!(stdout, "Citation catalog saved to: {}", out_path.display())?;
    Ok(())
}

async fn batch(dir_path: PathBuf, settings: Settings, no_color: bool) -> anyhow::Result<()> {
    let color = ColorMode(!no_color);
    let pipeline = build_pipeline(&settings);
    check_connection(&pipeline, color).await?;

    let mut files: Vec<PathBuf> = std::fs::read_dir(&dir_path)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("xml"))
        })
        .collect();
    files.sort();

    if files.is_empty() {
        println!("No XML files found in {}.", dir_path.display());
        return Ok(());
    }

    let progress = ProgressBar::new(files.len() as u64);
    progress.set_style(
        ProgressStyle::with_template("[{pos}/{len}] {wide_msg}")
            .expect("progress template is valid"),
    );

    let mut processed = 0usize;
    let mut failed = 0usize;
    for file_path in &files {
        let file_name = file_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        progress.set_message(file_name.clone());

        match process_one(&pipeline, file_path).await {
            Ok(saved) => {
                processed += 1;
                if let Some(out_path) = saved {
                    progress.println(format!("{}: saved {}", file_name, out_path.display()));
                } else {
                    progress.println(format!("{}: no citations found", file_name));
                }
            }
            Err(error) => {
                failed += 1;
                tracing::error!(file = %file_path.display(), %error, "failed to process file");
                progress.println(format!("{}: FAILED ({})", file_name, error));
            }
        }
        progress.inc(1);
    }
    progress.finish_and_clear();

    let summary = format!("Processed {} file(s), {} failed.", processed, failed);
    if color.enabled() && failed > 0 {
        println!("{}", summary.yellow());
    } else {
        println!("{}", summary);
    }
    Ok(())
}

/// Process one file in batch mode. Returns the output path, or `None` when
/// the document produced no citations.
async fn process_one(pipeline: &Pipeline, file_path: &Path) -> anyhow::Result<Option<PathBuf>> {
    let xml = std::fs::read_to_string(file_path)?;
    let (catalog, _stats) = pipeline.process_document(&xml).await?;
    if catalog.is_empty() {
        return Ok(None);
    }
    let out_path = default_output_path(file_path);
    if let Some(parent) = out_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    catalog.save_to_file(&out_path)?;
    Ok(Some(out_path))
}

fn split(file_path: PathBuf, settings: Settings, no_color: bool) -> anyhow::Result<()> {
    let color = ColorMode(!no_color);
    let splitter = ParagraphSplitter::with_config(
        SplitterConfig::builder().threshold(settings.threshold).build(),
    );

    let paragraphs = patcite_ingest::paragraphs_from_file(&file_path)?;
    let mut stdout = std::io::stdout();
    for paragraph in &paragraphs {
        let chunks = splitter.split_and_clean(&paragraph.text);
        if chunks.is_empty() {
            continue;
        }
        print_split_chunks(&mut stdout, &paragraph.num, &chunks, settings.threshold, color)?;
    }
    Ok(())
}

/// `Output/<stem>_citations.<ext>` next to the input file.
fn default_output_path(input: &Path) -> PathBuf {
    let dir = input.parent().unwrap_or_else(|| Path::new(".")).join("Output");
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "document".to_string());
    let ext = input
        .extension()
        .map(|e| e.to_string_lossy().to_string())
        .unwrap_or_else(|| "xml".to_string());
    dir.join(format!("{}_citations.{}", stem, ext))
}
