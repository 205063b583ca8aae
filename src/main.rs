use anyhow::{Context, Result};
use clap::Parser;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use feedsift::app::{build_http_client, App, AppEvent};
use feedsift::config::Config;
use feedsift::feed::HttpFeedSource;
use feedsift::filter::{fetch_filtered, KeywordSet, MatchMode};
use feedsift::render::{paginate, render_document, DisplayMode, OutputFormat, Report};
use feedsift::util::validate_url;

/// Largest page size accepted on the command line.
const MAX_PAGE_SIZE: usize = 500;

#[derive(Parser, Debug)]
#[command(
    name = "feedsift",
    version,
    about = "Filter an arXiv RSS feed by keywords and highlight the matches"
)]
struct Args {
    /// Feed to fetch (default: `feed_url` from the config, else arXiv astro-ph.GA)
    #[arg(long, value_name = "URL")]
    url: Option<String>,

    /// Comma-separated keywords, e.g. "galaxy, AGN"
    #[arg(short, long, value_name = "LIST")]
    keywords: Option<String>,

    /// Keep entries matching any keyword or all of them
    #[arg(short, long, value_enum)]
    mode: Option<MatchMode>,

    /// How much of each entry to show
    #[arg(short, long, value_enum)]
    display: Option<DisplayMode>,

    /// Entries per page
    #[arg(long, value_name = "N", value_parser = parse_page_size)]
    page_size: Option<usize>,

    /// Config file (default: ~/.config/feedsift/config.toml)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Print one page of results to stdout instead of starting the UI
    #[arg(long)]
    print: bool,

    /// Output format for --print
    #[arg(long, value_enum, default_value_t = OutputFormat::Markdown, requires = "print")]
    format: OutputFormat,

    /// Page to print (1-based)
    #[arg(long, default_value_t = 1, requires = "print", value_parser = clap::value_parser!(u64).range(1..))]
    page: u64,
}

fn parse_page_size(s: &str) -> Result<usize, String> {
    let n: usize = s.parse().map_err(|_| format!("`{}` is not a number", s))?;
    if (1..=MAX_PAGE_SIZE).contains(&n) {
        Ok(n)
    } else {
        Err(format!("must be between 1 and {}", MAX_PAGE_SIZE))
    }
}

/// Config file merged with command-line overrides.
fn load_config(args: &Args) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => {
            if !path.exists() {
                anyhow::bail!("Config file not found: {}", path.display());
            }
            Config::load(path)
        }
        None => match Config::default_path() {
            Some(path) => Config::load(&path),
            None => Ok(Config::default()),
        },
    }
    .context("Failed to load configuration")?;

    if let Some(url) = &args.url {
        config.feed_url = url.trim().to_string();
    }
    if let Some(keywords) = &args.keywords {
        config.keywords = KeywordSet::parse(keywords).as_slice().to_vec();
    }
    if let Some(mode) = args.mode {
        config.match_mode = mode;
    }
    if let Some(display) = args.display {
        config.display_mode = display;
    }
    if let Some(page_size) = args.page_size {
        config.page_size = page_size;
    }
    Ok(config)
}

/// Print mode: one fetch, one page, written to stdout.
async fn run_print(config: &Config, format: OutputFormat, page: usize) -> Result<ExitCode> {
    let keywords = config.keyword_set();
    if keywords.is_empty() {
        eprintln!("feedsift: no keywords given; pass --keywords \"a, b\" or set `keywords` in the config file");
        return Ok(ExitCode::from(2));
    }

    let source = HttpFeedSource::new(build_http_client()?);
    let feed = fetch_filtered(&source, &config.feed_url, &keywords, config.match_mode)
        .await
        .with_context(|| format!("Fetch failed: {}", config.feed_url))?;

    let report = Report {
        keywords: &keywords,
        mode: config.match_mode,
        fetched: feed.fetched,
        page: paginate(&feed.entries, config.page_size, page)?,
    };
    let document = render_document(format, &report, &config.render_options())?;

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(document.as_bytes())?;
    stdout.flush()?;
    Ok(ExitCode::SUCCESS)
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();

    // Logs share the terminal with the UI, so they stay off there unless
    // RUST_LOG asks for them
    let default_filter = if args.print { "warn" } else { "off" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(&args)?;
    validate_url(&config.feed_url)
        .with_context(|| format!("Refusing to fetch feed URL `{}`", config.feed_url))?;

    if args.print {
        let page = usize::try_from(args.page).context("Page number too large")?;
        return run_print(&config, args.format, page).await;
    }

    let mut app = App::new(&config).context("Failed to create application")?;
    let (event_tx, event_rx) = mpsc::channel::<AppEvent>(32);
    feedsift::ui::run(&mut app, event_tx, event_rx).await?;

    Ok(ExitCode::SUCCESS)
}
