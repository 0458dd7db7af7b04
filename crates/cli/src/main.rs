mod echo;

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use beanpress_core::{
    ArticleCache, ArticleMetadata, BeanpressError, DEFAULT_COLUMN_CAPACITY, DEFAULT_LISTING_URL, DEFAULT_MIN_LEVEL,
    Document, FetchConfig, HarvestConfig, Harvester, HttpFetcher, OutputFormat, RenderConfig, default_cache_dir,
    extract_article, fetch_file, fetch_stdin, fetch_url, render,
};
use clap::{Args, Parser, Subcommand};
use owo_colors::OwoColorize;
use tracing_subscriber::EnvFilter;

use crate::echo::{
    format_size, print_banner, print_detail, print_harvest_summary, print_info, print_step, print_success,
    print_warning,
};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Turn annotated Chinese reading lessons into a printable study book
#[derive(Parser, Debug)]
#[command(name = "beanpress")]
#[command(author = "Beanpress Contributors")]
#[command(version)]
#[command(about = "Turn annotated Chinese reading lessons into a printable study book", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Harvest every listed lesson and render the study book
    Build(BuildArgs),
    /// Extract the text and vocabulary of a single lesson page
    Article(ArticleArgs),
}

#[derive(Args, Debug)]
struct BuildArgs {
    /// Lesson listing to harvest
    #[arg(long, default_value = DEFAULT_LISTING_URL, value_name = "URL")]
    listing_url: String,

    /// Output file (default: output.<format extension>)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Output format (docx, markdown, text)
    #[arg(short, long, default_value = "docx", value_name = "FORMAT")]
    format: OutputFormat,

    /// Directory holding the metadata and text caches
    #[arg(long, value_name = "DIR")]
    cache_dir: Option<PathBuf>,

    /// Minimum HSK level of vocabulary entries
    #[arg(long, default_value_t = DEFAULT_MIN_LEVEL, value_name = "N")]
    min_level: u32,

    /// Vocabulary entries per column
    #[arg(long, default_value_t = DEFAULT_COLUMN_CAPACITY, value_name = "N")]
    column_capacity: usize,

    /// Lessons fetched at once
    #[arg(long, default_value = "4", value_name = "N")]
    concurrency: usize,

    /// HTTP timeout in seconds
    #[arg(long, default_value = "30", value_name = "SECS")]
    timeout: u64,

    /// Custom User-Agent for HTTP requests
    #[arg(long, value_name = "UA")]
    user_agent: Option<String>,

    /// Ignore existing caches and overwrite them
    #[arg(long)]
    refresh: bool,
}

#[derive(Args, Debug)]
struct ArticleArgs {
    /// URL to fetch, local HTML file, or "-" for stdin
    #[arg(value_name = "INPUT")]
    input: String,

    /// Minimum HSK level of vocabulary entries
    #[arg(long, default_value_t = DEFAULT_MIN_LEVEL, value_name = "N")]
    min_level: u32,

    /// Print the whole collection as JSON
    #[arg(long)]
    json: bool,

    /// HTTP timeout in seconds
    #[arg(long, default_value = "30", value_name = "SECS")]
    timeout: u64,
}

fn init_tracing(verbose: bool) {
    let default_directive = if verbose { "beanpress=debug,beanpress_core=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.verbose {
        print_banner();
        print_info("Debug logging enabled");
        eprintln!();
    }

    match cli.command {
        Command::Build(args) => build(args, cli.verbose).await,
        Command::Article(args) => article(&args, cli.verbose).await,
    }
}

async fn build(args: BuildArgs, verbose: bool) -> anyhow::Result<()> {
    anyhow::ensure!(args.column_capacity > 0, BeanpressError::InvalidCapacity(args.column_capacity));

    let started = Instant::now();
    let cache = ArticleCache::new(args.cache_dir.unwrap_or_else(default_cache_dir));
    let output = args
        .output
        .unwrap_or_else(|| PathBuf::from(format!("output.{}", args.format.extension())));

    let mut builder = HarvestConfig::builder()
        .listing_url(args.listing_url)
        .min_level(args.min_level)
        .concurrency(args.concurrency)
        .timeout(args.timeout);
    if let Some(user_agent) = args.user_agent {
        builder = builder.user_agent(user_agent);
    }
    let config = builder.build();

    if verbose {
        print_step(1, 2, "Harvesting lessons");
        print_detail("Listing", config.listing_url.bright_white().underline());
        print_detail("Cache", cache.dir().display());
        if args.refresh {
            print_detail("Refresh", "Yes");
        }
        eprintln!();
    }

    let fetcher = HttpFetcher::new(config.fetch.clone()).context("Failed to create HTTP client")?;
    let harvester = Harvester::new(fetcher, config);
    let harvest = harvester.run(&cache, args.refresh).await.context("Failed to harvest lessons")?;

    for url in &harvest.failed {
        print_warning(&format!("Skipped {}", url));
    }

    if verbose {
        print_harvest_summary(&harvest, started.elapsed());
        print_step(2, 2, &format!("Rendering {}", args.format));
    }

    let render_config = RenderConfig { column_capacity: args.column_capacity, ..Default::default() };
    let bytes = render(&harvest.collections, args.format, &render_config).context("Failed to render document")?;

    if verbose {
        print_detail("Size", format_size(bytes.len()));
        eprintln!();
    }

    fs::write(&output, &bytes).with_context(|| format!("Failed to write to file: {}", output.display()))?;
    print_success(&format!(
        "{} lessons written to {}",
        harvest.collections.len(),
        output.display().bright_white()
    ));

    Ok(())
}

async fn article(args: &ArticleArgs, verbose: bool) -> anyhow::Result<()> {
    let html = if args.input == "-" {
        if verbose {
            print_step(1, 2, "Reading from stdin");
        }
        fetch_stdin().context("Failed to read from stdin")?
    } else if args.input.starts_with("http://") || args.input.starts_with("https://") {
        if verbose {
            print_step(1, 2, &format!("Fetching from {}", args.input.bright_white().underline()));
        }
        let config = FetchConfig { timeout: args.timeout, ..Default::default() };
        fetch_url(&args.input, &config).await.context("Failed to fetch URL")?
    } else {
        if verbose {
            print_step(1, 2, &format!("Reading from file {}", args.input.bright_white()));
        }
        fetch_file(&args.input).with_context(|| format!("Failed to read file: {}", args.input))?
    };

    if verbose {
        print_detail("Size", format_size(html.len()));
        eprintln!();
        print_step(2, 2, "Extracting lesson");
    }

    let metadata = page_metadata(&Document::parse(&html), &args.input)?;
    let collection = extract_article(metadata, &html, args.min_level).context("Failed to extract lesson")?;

    if verbose {
        print_detail("Paragraphs", collection.main_text.len());
        print_detail("Words", collection.vocabulary.len());
        eprintln!();
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&collection)?);
    } else {
        println!("{}", collection.main_text_joined());
        println!();
        for entry in collection.word_set() {
            println!("{}", entry);
        }
    }

    Ok(())
}

/// Metadata for a lesson read outside the listing: the page title and the
/// traditional heading stand in for the listing card.
fn page_metadata(doc: &Document, input: &str) -> anyhow::Result<ArticleMetadata> {
    let chinese_title = doc
        .select_first("h1 span.tr")?
        .map(|heading| heading.text().trim().to_string())
        .unwrap_or_default();

    Ok(ArticleMetadata {
        title: doc.title().unwrap_or_default(),
        chinese_title,
        url: input.to_string(),
        category_tag: String::new(),
        difficulty_tag: String::new(),
    })
}
