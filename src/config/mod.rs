//! Configuration management.
//!
//! Configuration is layered: built-in defaults, then an optional file
//! (`crawler.toml`, or the legacy `config.json`), then environment variables
//! prefixed with `SCHOLAR_CRAWLER_` (sections separated by `__`, e.g.
//! `SCHOLAR_CRAWLER_CRAWL__MAX_PAGES=3`). `CHROME_PATH` overrides the browser
//! executable.
//!
//! # Configuration File Format
//!
//! ```toml
//! [crawl]
//! max_pages = 5
//! max_retries = 3
//! retry_delay_ms = 2000
//! delay_between_requests_ms = 3000
//!
//! [render]
//! engine = "browser"
//! executable_path = "/usr/bin/chromium"
//!
//! [output]
//! directory = "./out"
//! query_delimiter = ","
//!
//! [logging]
//! level = "info"
//! file = "crawler.log"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::crawl::CompiledSelectors;
use crate::utils::RetryPolicy;

/// Environment variable prefix for configuration overrides
pub const ENV_PREFIX: &str = "SCHOLAR_CRAWLER";

/// Environment variable overriding the browser executable
pub const CHROME_PATH_VAR: &str = "CHROME_PATH";

/// File names probed in the working directory when no path is given
const CONFIG_FILE_NAMES: &[&str] = &["crawler.toml", "config.json"];

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Crawl loop settings
    #[serde(default)]
    pub crawl: CrawlConfig,

    /// Page rendering settings
    #[serde(default)]
    pub render: RenderConfig,

    /// CSS selectors used for extraction
    #[serde(default)]
    pub selectors: SelectorConfig,

    /// Export settings
    #[serde(default)]
    pub output: OutputConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,

    // Flat camelCase keys accepted from legacy `config.json` files.
    #[serde(default, rename = "maxPages", alias = "maxpages", skip_serializing)]
    legacy_max_pages: Option<usize>,

    #[serde(default, rename = "maxRetries", alias = "maxretries", skip_serializing)]
    legacy_max_retries: Option<u32>,

    #[serde(default, rename = "retryDelay", alias = "retrydelay", skip_serializing)]
    legacy_retry_delay: Option<u64>,

    #[serde(
        default,
        rename = "delayBetweenRequests",
        alias = "delaybetweenrequests",
        skip_serializing
    )]
    legacy_delay_between_requests: Option<u64>,

    #[serde(default, rename = "chromePath", alias = "chromepath", skip_serializing)]
    legacy_chrome_path: Option<PathBuf>,
}

/// Crawl loop configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlConfig {
    /// Maximum number of result pages fetched per query
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,

    /// Render attempts per page before giving up
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Delay between failed attempts (milliseconds)
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// Multiplier applied to the retry delay after each failure
    #[serde(default = "default_retry_backoff")]
    pub retry_backoff: f64,

    /// Upper bound for the retry delay (milliseconds)
    #[serde(default = "default_max_retry_delay_ms")]
    pub max_retry_delay_ms: u64,

    /// Delay between consecutive pages of one query (milliseconds)
    #[serde(default = "default_delay_between_requests_ms")]
    pub delay_between_requests_ms: u64,

    /// Origin of the search engine; also the base for pagination links
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Interface language passed as `hl`
    #[serde(default)]
    pub language: Option<String>,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            max_pages: default_max_pages(),
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay_ms(),
            retry_backoff: default_retry_backoff(),
            max_retry_delay_ms: default_max_retry_delay_ms(),
            delay_between_requests_ms: default_delay_between_requests_ms(),
            base_url: default_base_url(),
            language: None,
        }
    }
}

impl CrawlConfig {
    /// Delay between pages of one query
    pub fn page_delay(&self) -> Duration {
        Duration::from_millis(self.delay_between_requests_ms)
    }

    /// Retry policy for page fetches
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_retries,
            initial_delay: Duration::from_millis(self.retry_delay_ms),
            max_delay: Duration::from_millis(self.max_retry_delay_ms),
            backoff_multiplier: self.retry_backoff,
        }
    }
}

fn default_max_pages() -> usize {
    5
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    2000
}

fn default_retry_backoff() -> f64 {
    1.0
}

fn default_max_retry_delay_ms() -> u64 {
    60_000
}

fn default_delay_between_requests_ms() -> u64 {
    3000
}

fn default_base_url() -> String {
    "https://scholar.google.com".to_string()
}

/// Rendering engine used to retrieve pages
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderEngine {
    /// Headless Chrome; executes scripts before returning the DOM
    #[default]
    Browser,
    /// Plain HTTP GET
    Http,
}

/// Page rendering configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    #[serde(default)]
    pub engine: RenderEngine,

    /// Browser executable; auto-detected when unset
    #[serde(default)]
    pub executable_path: Option<PathBuf>,

    #[serde(default = "default_true")]
    pub headless: bool,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Per-request / per-navigation timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            engine: RenderEngine::default(),
            executable_path: None,
            headless: true,
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl RenderConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_true() -> bool {
    true
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

/// CSS selectors for the results page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectorConfig {
    /// One search result block
    #[serde(default = "default_result_selector")]
    pub result: String,

    /// Title anchor inside a block (text and href)
    #[serde(default = "default_title_selector")]
    pub title: String,

    /// Author / venue line inside a block
    #[serde(default = "default_authors_selector")]
    pub authors: String,

    /// Abstract snippet inside a block
    #[serde(default = "default_abstract_selector", rename = "abstract")]
    pub abstract_text: String,

    /// Footer links inside a block; the citation count is read from here
    #[serde(default = "default_footer_selector")]
    pub footer_links: String,

    /// Pagination "next" anchor; the last match on the page wins
    #[serde(default = "default_next_page_selector")]
    pub next_page: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            result: default_result_selector(),
            title: default_title_selector(),
            authors: default_authors_selector(),
            abstract_text: default_abstract_selector(),
            footer_links: default_footer_selector(),
            next_page: default_next_page_selector(),
        }
    }
}

fn default_result_selector() -> String {
    ".gs_r.gs_or.gs_scl".to_string()
}

fn default_title_selector() -> String {
    ".gs_rt a".to_string()
}

fn default_authors_selector() -> String {
    ".gs_a".to_string()
}

fn default_abstract_selector() -> String {
    ".gs_rs".to_string()
}

fn default_footer_selector() -> String {
    ".gs_fl a".to_string()
}

fn default_next_page_selector() -> String {
    "td a.gs_nma".to_string()
}

/// Export configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory the export files are written to
    #[serde(default = "default_output_dir")]
    pub directory: PathBuf,

    /// File name without extension, shared by every format
    #[serde(default = "default_file_stem")]
    pub file_stem: String,

    /// Separator between queries in the raw query input
    #[serde(default = "default_query_delimiter")]
    pub query_delimiter: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_dir(),
            file_stem: default_file_stem(),
            query_delimiter: default_query_delimiter(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_file_stem() -> String {
    "articles".to_string()
}

fn default_query_delimiter() -> String {
    ",".to_string()
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file appended to alongside the console; empty disables it
    #[serde(default = "default_log_file")]
    pub file: String,

    /// `"json"` for structured output, anything else for plain text
    #[serde(default)]
    pub format: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
            format: None,
        }
    }
}

impl LoggingConfig {
    /// Log file path, if file logging is enabled
    pub fn file_path(&self) -> Option<&Path> {
        let file = self.file.trim();
        (!file.is_empty()).then(|| Path::new(file))
    }

    pub fn is_json(&self) -> bool {
        self.format.as_deref() == Some("json")
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "crawler.log".to_string()
}

impl Config {
    /// Move legacy flat keys into their sections
    fn fold_legacy_keys(mut self) -> Self {
        if let Some(v) = self.legacy_max_pages.take() {
            self.crawl.max_pages = v;
        }
        if let Some(v) = self.legacy_max_retries.take() {
            self.crawl.max_retries = v;
        }
        if let Some(v) = self.legacy_retry_delay.take() {
            self.crawl.retry_delay_ms = v;
        }
        if let Some(v) = self.legacy_delay_between_requests.take() {
            self.crawl.delay_between_requests_ms = v;
        }
        if let Some(v) = self.legacy_chrome_path.take() {
            self.render.executable_path = Some(v);
        }
        self
    }

    /// Apply `CHROME_PATH`, which takes precedence over every file setting
    fn apply_chrome_path_override(mut self) -> Self {
        if let Ok(path) = std::env::var(CHROME_PATH_VAR) {
            if !path.trim().is_empty() {
                self.render.executable_path = Some(PathBuf::from(path));
            }
        }
        self
    }

    /// Check invariants the crawl loop relies on
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.crawl.max_pages == 0 {
            return Err(ConfigError::Invalid("crawl.max_pages must be at least 1".into()));
        }
        if self.crawl.max_retries == 0 {
            return Err(ConfigError::Invalid(
                "crawl.max_retries must be at least 1".into(),
            ));
        }
        if !(self.crawl.retry_backoff >= 1.0) {
            return Err(ConfigError::Invalid(
                "crawl.retry_backoff must be >= 1.0".into(),
            ));
        }
        if self.output.query_delimiter.is_empty() {
            return Err(ConfigError::Invalid(
                "output.query_delimiter must not be empty".into(),
            ));
        }
        url::Url::parse(&self.crawl.base_url).map_err(|e| {
            ConfigError::Invalid(format!("crawl.base_url {:?}: {}", self.crawl.base_url, e))
        })?;
        CompiledSelectors::compile(&self.selectors)?;
        Ok(())
    }

    /// Write this configuration as TOML
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, content)?;
        Ok(())
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}

fn environment_source() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

/// Load configuration from a file, layered with environment overrides
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let settings = config::Config::builder()
        .add_source(config::File::from(path))
        .add_source(environment_source())
        .build()?;

    finish(settings.try_deserialize()?)
}

/// Get the configuration from environment variables and defaults only
pub fn get_config() -> Result<Config, ConfigError> {
    let settings = config::Config::builder()
        .add_source(environment_source())
        .build()?;

    finish(settings.try_deserialize()?)
}

fn finish(config: Config) -> Result<Config, ConfigError> {
    let config = config.fold_legacy_keys().apply_chrome_path_override();
    config.validate()?;
    Ok(config)
}

/// Locate a configuration file in the working directory or the user config dir
pub fn find_config_file() -> Option<PathBuf> {
    CONFIG_FILE_NAMES
        .iter()
        .map(PathBuf::from)
        .chain(default_config_path())
        .find(|p| p.is_file())
}

/// `<config dir>/scholar-crawler/crawler.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("scholar-crawler").join("crawler.toml"))
}
