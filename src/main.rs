use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use scholar_crawler::config::{find_config_file, get_config, load_config, Config, RenderEngine};
use scholar_crawler::crawl::{parse_queries, QueryOrchestrator};
use scholar_crawler::export::{export, OutputFormat};
use scholar_crawler::render::build_renderer;
use scholar_crawler::ui::{self, Status};
use std::future::Future;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{error, info, warn};
use tracing_subscriber::{
    layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry,
};

/// Scholar Crawler - Collect Google Scholar results for a list of queries
#[derive(Parser, Debug)]
#[command(name = "scholar-crawler")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Collect Google Scholar results for a list of queries", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose logging (-v, -vv)
    #[arg(long, short, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Configuration file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Crawl result pages for one or more queries (the default command)
    #[command(alias = "c")]
    Crawl(CrawlArgs),

    /// Write a configuration file with default values
    InitConfig {
        /// Where to write the file
        #[arg(long, default_value = "crawler.toml")]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Args, Debug, Default)]
struct CrawlArgs {
    /// Queries separated by the configured delimiter; prompted for when omitted
    queries: Option<String>,

    /// Output formats to write (repeatable or comma separated)
    #[arg(long, short, value_enum, value_delimiter = ',')]
    format: Vec<FormatArg>,

    /// Directory for output files
    #[arg(long, short)]
    output_dir: Option<PathBuf>,

    /// Maximum result pages per query
    #[arg(long)]
    max_pages: Option<usize>,

    /// Rendering engine
    #[arg(long, value_enum)]
    engine: Option<EngineArg>,
}

/// Output format selector
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum FormatArg {
    Json,
    Csv,
    Xlsx,
    Pdf,
    /// Every format
    All,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum EngineArg {
    /// Headless Chrome
    Browser,
    /// Plain HTTP requests
    Http,
}

impl From<EngineArg> for RenderEngine {
    fn from(engine: EngineArg) -> Self {
        match engine {
            EngineArg::Browser => RenderEngine::Browser,
            EngineArg::Http => RenderEngine::Http,
        }
    }
}

/// Expand the selectors into distinct formats; JSON and CSV when none given
fn resolve_formats(args: &[FormatArg]) -> Vec<OutputFormat> {
    if args.is_empty() {
        return vec![OutputFormat::Json, OutputFormat::Csv];
    }
    if args.contains(&FormatArg::All) {
        return OutputFormat::ALL.to_vec();
    }

    let mut formats = Vec::new();
    for arg in args {
        let format = match arg {
            FormatArg::Json => OutputFormat::Json,
            FormatArg::Csv => OutputFormat::Csv,
            FormatArg::Xlsx => OutputFormat::Xlsx,
            FormatArg::Pdf => OutputFormat::Pdf,
            FormatArg::All => continue,
        };
        if !formats.contains(&format) {
            formats.push(format);
        }
    }
    formats
}

fn load(cli: &Cli) -> Result<(Config, Option<PathBuf>)> {
    if let Some(path) = &cli.config {
        return Ok((load_config(path)?, Some(path.clone())));
    }
    match find_config_file() {
        Some(path) => Ok((load_config(&path)?, Some(path))),
        None => Ok((get_config()?, None)),
    }
}

fn init_tracing(cli: &Cli, config: &Config) -> Result<()> {
    let level = if cli.quiet {
        "error"
    } else {
        match cli.verbose {
            0 => config.logging.level.as_str(),
            1 => "debug",
            _ => "trace",
        }
    };
    let filter = EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| format!("scholar_crawler={}", level)),
    );

    let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = Vec::new();
    let console = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
    if config.logging.is_json() {
        layers.push(console.json().boxed());
    } else {
        layers.push(console.boxed());
    }

    if let Some(path) = config.logging.file_path() {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("cannot open log file {}", path.display()))?;
        let file_layer = tracing_subscriber::fmt::layer()
            .with_writer(Mutex::new(file))
            .with_ansi(false);
        if config.logging.is_json() {
            layers.push(file_layer.json().boxed());
        } else {
            layers.push(file_layer.boxed());
        }
    }

    tracing_subscriber::registry().with(layers).with(filter).init();
    Ok(())
}

/// Ask for queries on stdin
fn prompt_queries() -> Result<String> {
    eprint!("Enter search queries separated by commas: ");
    std::io::stderr().flush()?;

    let mut line = String::new();
    std::io::stdin()
        .read_line(&mut line)
        .context("failed to read queries from stdin")?;
    Ok(line)
}

/// Drive `work` to completion unless `interrupt` fires first. An interrupt
/// source that fails to register is ignored.
async fn until_interrupted<F, I>(work: F, interrupt: I) -> Option<F::Output>
where
    F: Future,
    I: Future<Output = std::io::Result<()>>,
{
    tokio::select! {
        output = work => Some(output),
        Ok(()) = interrupt => None,
    }
}

async fn crawl(cli: &Cli, mut config: Config, args: CrawlArgs) -> Result<()> {
    if let Some(max_pages) = args.max_pages {
        config.crawl.max_pages = max_pages;
    }
    if let Some(engine) = args.engine {
        config.render.engine = engine.into();
    }
    if let Some(dir) = args.output_dir {
        config.output.directory = dir;
    }
    config.validate()?;

    let input = match args.queries {
        Some(queries) => queries,
        None => prompt_queries()?,
    };
    if input.trim().is_empty() {
        anyhow::bail!("no queries supplied");
    }
    let queries = parse_queries(&input, &config.output.query_delimiter);
    let formats = resolve_formats(&args.format);
    info!(
        "Crawling {} quer{} (max {} page(s) each)",
        queries.len(),
        if queries.len() == 1 { "y" } else { "ies" },
        config.crawl.max_pages
    );

    let renderer = build_renderer(&config.render)?;
    let orchestrator = QueryOrchestrator::from_config(&config, renderer)?;

    let progress = ui::QueryProgress::new(queries.len(), !cli.quiet);
    let run = orchestrator.run_with(&queries, |_, query, traversal| {
        progress.complete(query, traversal)
    });
    let Some(result) = until_interrupted(run, tokio::signal::ctrl_c()).await else {
        progress.finish();
        warn!("Interrupted, no output written");
        anyhow::bail!("interrupted");
    };
    progress.finish();

    if !cli.quiet {
        ui::print_run_summary(&result);
    }

    let mut failed = Vec::new();
    for format in formats {
        match export(&result, format, &config.output.directory, &config.output.file_stem) {
            Ok(path) if !cli.quiet => ui::print_saved(&path),
            Ok(_) => {}
            Err(e) => {
                error!(format = %format, "Failed to write {} output: {}", format, e);
                failed.push(format.to_string());
            }
        }
    }

    if !failed.is_empty() {
        anyhow::bail!("failed to write output: {}", failed.join(", "));
    }
    Ok(())
}

fn init_config(path: &Path, force: bool, quiet: bool) -> Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }
    Config::default().save(path)?;
    if !quiet {
        ui::print_status(
            Status::Success,
            &format!("Wrote default configuration to {}", path.display()),
        );
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let mut cli = Cli::parse();

    if let Some(Commands::InitConfig { path, force }) = &cli.command {
        return init_config(path, *force, cli.quiet);
    }

    let (config, config_path) = load(&cli)?;
    init_tracing(&cli, &config)?;
    if let Some(path) = &config_path {
        info!("Using config file: {}", path.display());
    }

    let args = match cli.command.take() {
        Some(Commands::Crawl(args)) => args,
        _ => CrawlArgs::default(),
    };
    crawl(&cli, config, args).await
}
