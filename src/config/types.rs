use serde::Deserialize;

/// Main configuration structure for quarry
///
/// Every field has a default, so the tool runs without a config file; a
/// TOML file only overrides the pieces it mentions.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub browser: BrowserSettings,
    #[serde(default)]
    pub crawl: CrawlSettings,
    #[serde(default)]
    pub output: OutputSettings,
    /// Optional override of the site's built-in category list.
    #[serde(default)]
    pub category: Vec<CategoryEntry>,
}

/// Browser/rendering configuration
#[derive(Debug, Clone, Deserialize)]
pub struct BrowserSettings {
    /// Run the browser without a visible window
    #[serde(default = "default_headless")]
    pub headless: bool,

    /// Explicit path to the Chromium binary (auto-detected when unset)
    #[serde(rename = "chrome-path", default)]
    pub chrome_path: Option<String>,

    /// Delay after navigation before reading the rendered document (ms)
    #[serde(rename = "settle-delay-ms", default = "default_settle_delay")]
    pub settle_delay_ms: u64,

    /// Delay after a scroll or click before re-reading the document (ms)
    #[serde(rename = "scroll-settle-ms", default = "default_scroll_settle")]
    pub scroll_settle_ms: u64,

    /// Upper bound on a single navigation (ms)
    #[serde(rename = "nav-timeout-ms", default = "default_nav_timeout")]
    pub nav_timeout_ms: u64,
}

/// Crawl behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlSettings {
    /// Attempts per detail page before degrading to a placeholder row
    #[serde(rename = "max-retries", default = "default_max_retries")]
    pub max_retries: u32,

    /// Fixed backoff between retry attempts (ms)
    #[serde(rename = "retry-backoff-ms", default = "default_retry_backoff")]
    pub retry_backoff_ms: u64,

    /// Consecutive load-more failures before a listing is declared done
    #[serde(
        rename = "max-consecutive-failures",
        default = "default_max_consecutive_failures"
    )]
    pub max_consecutive_failures: u32,

    /// Flush the checkpoint after this many newly processed products
    #[serde(rename = "checkpoint-every", default = "default_checkpoint_every")]
    pub checkpoint_every: usize,

    /// Polite pause between products (ms)
    #[serde(rename = "pause-between-products-ms", default = "default_pause")]
    pub pause_between_products_ms: u64,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputSettings {
    /// Directory receiving the results file and the checkpoint file
    #[serde(default = "default_directory")]
    pub directory: String,
}

/// A category override entry: label plus listing-root URL
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryEntry {
    pub label: String,
    pub url: String,
}

fn default_headless() -> bool {
    true
}

fn default_settle_delay() -> u64 {
    3000
}

fn default_scroll_settle() -> u64 {
    2000
}

fn default_nav_timeout() -> u64 {
    30_000
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_backoff() -> u64 {
    2000
}

fn default_max_consecutive_failures() -> u32 {
    3
}

fn default_checkpoint_every() -> usize {
    10
}

fn default_pause() -> u64 {
    500
}

fn default_directory() -> String {
    ".".to_string()
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            headless: default_headless(),
            chrome_path: None,
            settle_delay_ms: default_settle_delay(),
            scroll_settle_ms: default_scroll_settle(),
            nav_timeout_ms: default_nav_timeout(),
        }
    }
}

impl Default for CrawlSettings {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            retry_backoff_ms: default_retry_backoff(),
            max_consecutive_failures: default_max_consecutive_failures(),
            checkpoint_every: default_checkpoint_every(),
            pause_between_products_ms: default_pause(),
        }
    }
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            directory: default_directory(),
        }
    }
}
