//! Reader and catalog configuration.

use clap::{Args as ClapArgs, Parser, Subcommand};
use std::time::Duration;

use crate::error::{ErrorKind, SourceError, SourceResult};

/// Span used for a range bound that was left open.
pub const DEFAULT_RANGE_SPAN: usize = 10;

/// Upper bound on the number of pages a single range may expand to.
pub const RANGE_EXPANSION_LIMIT: usize = 100;

/// Chapters per series in the synthetic source.
pub const CHAPTER_COUNT: u32 = 10;

/// Pages per chapter in the synthetic source.
pub const CHAPTER_PAGE_COUNT: u32 = 30;

/// Distance (in pages) from a window edge that triggers a prefetch.
pub const DEFAULT_BUFFER_DISTANCE: usize = 3;

/// Pages fetched per prefetch.
pub const DEFAULT_BUFFER_AMOUNT: usize = 10;

/// Maximum number of pages held in the window.
pub const MAX_PAGES: usize = 50;

/// Default catalog service port.
pub const DEFAULT_CATALOG_PORT: u16 = 10080;

/// Command-line arguments.
#[derive(Parser, Debug, Clone)]
#[command(name = "mangaview")]
#[command(about = "Windowed, prefetching manga page reader")]
#[command(version)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Enable debug logging.
    #[arg(long, short = 'd', global = true)]
    pub debug: bool,

    /// Enable silent mode (minimal logging).
    #[arg(long, short = 's', global = true)]
    pub silent: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Simulate a reading session, scrolling through a series.
    Read(ReadArgs),
    /// Serve a synthetic catalog over HTTP.
    Serve(ServeArgs),
    /// List the most popular series of a source.
    List(ListArgs),
}

#[derive(ClapArgs, Debug, Clone)]
pub struct ListArgs {
    /// Base URL of a catalog service; the synthetic source is used when absent.
    #[arg(long)]
    pub remote: Option<String>,

    #[command(flatten)]
    pub synthetic: SyntheticArgs,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct ReadArgs {
    /// Series to read.
    #[arg(long, default_value = "test-series")]
    pub series: String,

    /// Base URL of a catalog service; the synthetic source is used when absent.
    #[arg(long)]
    pub remote: Option<String>,

    /// Chapter to start reading at.
    #[arg(long, default_value_t = 0)]
    pub start_chapter: u32,

    /// Number of pages to scroll through.
    #[arg(long, default_value_t = 60)]
    pub steps: usize,

    /// Delay between scroll steps in milliseconds.
    #[arg(long, default_value_t = 50)]
    pub step_delay_ms: u64,

    /// Scroll backwards instead of forwards.
    #[arg(long)]
    pub reverse: bool,

    #[command(flatten)]
    pub window: WindowArgs,

    #[command(flatten)]
    pub synthetic: SyntheticArgs,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct ServeArgs {
    /// Host address to bind to.
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Port for the catalog service.
    #[arg(long, default_value_t = DEFAULT_CATALOG_PORT)]
    pub port: u16,

    /// Serve page payloads in the obfuscated MRI encoding.
    #[arg(long)]
    pub obfuscate: bool,

    #[command(flatten)]
    pub synthetic: SyntheticArgs,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct WindowArgs {
    /// Pages from a window edge that trigger a prefetch.
    #[arg(long, default_value_t = DEFAULT_BUFFER_DISTANCE)]
    pub buffer_distance: usize,

    /// Pages fetched per prefetch.
    #[arg(long, default_value_t = DEFAULT_BUFFER_AMOUNT)]
    pub buffer_amount: usize,

    /// Maximum pages held in the window.
    #[arg(long, default_value_t = MAX_PAGES)]
    pub max_pages: usize,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct SyntheticArgs {
    /// Chapters per synthetic series.
    #[arg(long, default_value_t = CHAPTER_COUNT)]
    pub chapters: u32,

    /// Pages per synthetic chapter.
    #[arg(long, default_value_t = CHAPTER_PAGE_COUNT)]
    pub chapter_pages: u32,

    /// Simulated latency of synthetic lookups in milliseconds.
    #[arg(long, default_value_t = 0)]
    pub latency_ms: u64,
}

/// Window presenter tunables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowConfig {
    /// Proximity (in pages) to a window edge that triggers a prefetch.
    pub buffer_distance: usize,
    /// How many pages one prefetch requests.
    pub buffer_amount: usize,
    /// Maximum window size.
    pub max_pages: usize,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            buffer_distance: DEFAULT_BUFFER_DISTANCE,
            buffer_amount: DEFAULT_BUFFER_AMOUNT,
            max_pages: MAX_PAGES,
        }
    }
}

impl WindowConfig {
    /// Checks that the tunables describe a window that can hold a viewport
    /// plus one prefetch.
    pub fn validate(&self) -> SourceResult<()> {
        if self.buffer_amount == 0 {
            return Err(SourceError::with_message(
                ErrorKind::Internal,
                "buffer_amount must be at least 1",
            ));
        }
        if self.max_pages < self.buffer_amount {
            return Err(SourceError::with_message(
                ErrorKind::Internal,
                format!(
                    "max_pages ({}) must be at least buffer_amount ({})",
                    self.max_pages, self.buffer_amount
                ),
            ));
        }
        if self.max_pages < 2 * self.buffer_distance + 1 {
            return Err(SourceError::with_message(
                ErrorKind::Internal,
                format!(
                    "max_pages ({}) must exceed twice the buffer distance ({})",
                    self.max_pages, self.buffer_distance
                ),
            ));
        }
        Ok(())
    }
}

impl From<WindowArgs> for WindowConfig {
    fn from(args: WindowArgs) -> Self {
        Self {
            buffer_distance: args.buffer_distance,
            buffer_amount: args.buffer_amount,
            max_pages: args.max_pages,
        }
    }
}

/// Shape of the synthetic series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntheticConfig {
    pub chapter_count: u32,
    pub chapter_page_count: u32,
    /// Simulated latency of every chapter and image lookup.
    pub latency: Duration,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            chapter_count: CHAPTER_COUNT,
            chapter_page_count: CHAPTER_PAGE_COUNT,
            latency: Duration::ZERO,
        }
    }
}

impl From<SyntheticArgs> for SyntheticConfig {
    fn from(args: SyntheticArgs) -> Self {
        Self {
            chapter_count: args.chapters,
            chapter_page_count: args.chapter_pages,
            latency: Duration::from_millis(args.latency_ms),
        }
    }
}

/// Catalog service configuration.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port for the catalog service.
    pub port: u16,
    /// Serve page payloads MRI-encoded.
    pub obfuscate: bool,
    pub synthetic: SyntheticConfig,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_CATALOG_PORT,
            obfuscate: false,
            synthetic: SyntheticConfig::default(),
        }
    }
}

impl From<ServeArgs> for CatalogConfig {
    fn from(args: ServeArgs) -> Self {
        Self {
            host: args.host,
            port: args.port,
            obfuscate: args.obfuscate,
            synthetic: args.synthetic.into(),
        }
    }
}

impl CatalogConfig {
    /// Returns the bind address for the catalog service.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Reading session configuration.
#[derive(Debug, Clone)]
pub struct ReadConfig {
    pub series: String,
    pub remote: Option<String>,
    pub start_chapter: u32,
    pub steps: usize,
    pub step_delay: Duration,
    pub reverse: bool,
    pub window: WindowConfig,
    pub synthetic: SyntheticConfig,
}

impl Default for ReadConfig {
    fn default() -> Self {
        Self {
            series: "test-series".to_string(),
            remote: None,
            start_chapter: 0,
            steps: 60,
            step_delay: Duration::from_millis(50),
            reverse: false,
            window: WindowConfig::default(),
            synthetic: SyntheticConfig::default(),
        }
    }
}

impl From<ReadArgs> for ReadConfig {
    fn from(args: ReadArgs) -> Self {
        Self {
            series: args.series,
            remote: args.remote,
            start_chapter: args.start_chapter,
            steps: args.steps,
            step_delay: Duration::from_millis(args.step_delay_ms),
            reverse: args.reverse,
            window: args.window.into(),
            synthetic: args.synthetic.into(),
        }
    }
}
