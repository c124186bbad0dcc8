use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub browser: BrowserConfig,
    #[serde(default)]
    pub scroll: ScrollConfig,
    #[serde(default)]
    pub detail: DetailSelectors,
    #[serde(default)]
    pub checkpoint: CheckpointConfig,
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("contents.db")
}

/// Headless Chrome configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BrowserConfig {
    /// Chrome/Chromium binary; detected from the usual install paths when unset
    #[serde(default)]
    pub executable: Option<PathBuf>,
    /// DevTools websocket of an already running browser; a browser is
    /// launched when unset
    #[serde(default)]
    pub devtools_url: Option<String>,
    #[serde(default = "default_headless")]
    pub headless: bool,
    /// User agent sent with every page load
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Timeout for a single DevTools request, including page loads (seconds)
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    /// Quiet period after which the network counts as idle (milliseconds)
    #[serde(default = "default_network_idle_ms")]
    pub network_idle_ms: u64,
    /// In-flight requests still tolerated while idle
    #[serde(default = "default_network_idle_connections")]
    pub network_idle_connections: usize,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            executable: None,
            devtools_url: None,
            headless: default_headless(),
            user_agent: default_user_agent(),
            request_timeout_secs: default_request_timeout(),
            network_idle_ms: default_network_idle_ms(),
            network_idle_connections: default_network_idle_connections(),
        }
    }
}

impl BrowserConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn network_idle_window(&self) -> Duration {
        Duration::from_millis(self.network_idle_ms)
    }
}

fn default_headless() -> bool {
    true
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) \
     Chrome/91.0.4472.124 Safari/537.36"
        .to_string()
}

fn default_request_timeout() -> u64 {
    60
}

fn default_network_idle_ms() -> u64 {
    500
}

fn default_network_idle_connections() -> usize {
    2
}

/// Infinite-scroll stabilization timing
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScrollConfig {
    /// Wait after each scroll before measuring (milliseconds)
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,
    /// Extended wait after the final scroll (milliseconds)
    #[serde(default = "default_final_settle_ms")]
    pub final_settle_ms: u64,
    /// Short delay before sampling the control element count (milliseconds)
    #[serde(default = "default_control_check_delay_ms")]
    pub control_check_delay_ms: u64,
    /// Consecutive unchanged-height cycles that end the scroll loop
    #[serde(default = "default_stable_height_cycles")]
    pub stable_height_cycles: u32,
    /// Hard ceiling on scroll cycles
    #[serde(default = "default_max_cycles")]
    pub max_cycles: u32,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            settle_ms: default_settle_ms(),
            final_settle_ms: default_final_settle_ms(),
            control_check_delay_ms: default_control_check_delay_ms(),
            stable_height_cycles: default_stable_height_cycles(),
            max_cycles: default_max_cycles(),
        }
    }
}

impl ScrollConfig {
    /// Zero-wait timing, for tests and scripted documents.
    pub fn immediate() -> Self {
        Self {
            settle_ms: 0,
            final_settle_ms: 0,
            control_check_delay_ms: 0,
            ..Self::default()
        }
    }

    pub fn settle_interval(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    pub fn final_settle_interval(&self) -> Duration {
        Duration::from_millis(self.final_settle_ms)
    }

    pub fn control_check_delay(&self) -> Duration {
        Duration::from_millis(self.control_check_delay_ms)
    }
}

fn default_settle_ms() -> u64 {
    1200
}

fn default_final_settle_ms() -> u64 {
    2000
}

fn default_control_check_delay_ms() -> u64 {
    100
}

fn default_stable_height_cycles() -> u32 {
    3
}

fn default_max_cycles() -> u32 {
    200
}

/// Catalog (feed) page configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CatalogConfig {
    /// Feed page to scroll, e.g. "https://page.kakao.com/landing/genre/11"
    pub root_url: String,
    /// Element counted to decide whether more content loaded
    #[serde(default = "default_control_selector")]
    pub control_selector: String,
    /// Anchors collected once the feed is stable
    #[serde(default = "default_extraction_selector")]
    pub extraction_selector: String,
    /// Title element inside each extracted anchor
    #[serde(default = "default_title_selector")]
    pub title_selector: String,
    /// Entries whose title contains this marker are compilations and skipped
    #[serde(default = "default_omnibus_marker")]
    pub omnibus_marker: String,
    /// URLs never treated as content links
    #[serde(default = "default_excluded_urls")]
    pub excluded_urls: Vec<String>,
}

impl CatalogConfig {
    pub fn new(root_url: impl Into<String>) -> Self {
        Self {
            root_url: root_url.into(),
            control_selector: default_control_selector(),
            extraction_selector: default_extraction_selector(),
            title_selector: default_title_selector(),
            omnibus_marker: default_omnibus_marker(),
            excluded_urls: default_excluded_urls(),
        }
    }
}

fn default_control_selector() -> String {
    r#"a.cursor-pointer:has(img[alt="새 회차 뱃지"])"#.to_string()
}

fn default_extraction_selector() -> String {
    r#"a.cursor-pointer:not(:has(img[alt="19세"]))"#.to_string()
}

fn default_title_selector() -> String {
    "div.font-small1.line-clamp-2.break-all.text-el-60".to_string()
}

fn default_omnibus_marker() -> String {
    "단행".to_string()
}

/// Legal-notice link present in every catalog footer
pub const LEGAL_NOTICE_URL: &str = "https://www.ftc.go.kr/bizCommPop.do?wrkr_no=2208802594";

fn default_excluded_urls() -> Vec<String> {
    vec![LEGAL_NOTICE_URL.to_string()]
}

/// Selectors used on a content detail page
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DetailSelectors {
    #[serde(default = "default_cover")]
    pub cover: String,
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_author")]
    pub author: String,
    /// Span list whose second element is the genre
    #[serde(default = "default_genre")]
    pub genre: String,
    #[serde(default = "default_views")]
    pub views: String,
    #[serde(default = "default_rating")]
    pub rating: String,
    #[serde(default = "default_schedule")]
    pub schedule: String,
    #[serde(default = "default_episode_total")]
    pub episode_total: String,
    /// Date of the first episode in the episode list
    #[serde(default = "default_start_date")]
    pub start_date: String,
}

impl Default for DetailSelectors {
    fn default() -> Self {
        Self {
            cover: default_cover(),
            title: default_title(),
            author: default_author(),
            genre: default_genre(),
            views: default_views(),
            rating: default_rating(),
            schedule: default_schedule(),
            episode_total: default_episode_total(),
            start_date: default_start_date(),
        }
    }
}

fn default_cover() -> String {
    r#"meta[property="og:image"]"#.to_string()
}

fn default_title() -> String {
    r#"meta[property="og:title"]"#.to_string()
}

fn default_author() -> String {
    r#"meta[name="author"]"#.to_string()
}

fn default_genre() -> String {
    "div.line-clamp-1 span.break-all.align-middle".to_string()
}

fn default_views() -> String {
    r#"img[alt="열람자"] + span"#.to_string()
}

fn default_rating() -> String {
    r#"img[alt="별점"] + span"#.to_string()
}

fn default_schedule() -> String {
    r#"div[class^="mt-6pxr"] span"#.to_string()
}

fn default_episode_total() -> String {
    "span.font-small2-bold.text-el-70:last-child".to_string()
}

fn default_start_date() -> String {
    r#"div[data-t-obj*="회차목록"] > ul > li:first-child div.font-x-small1 span.break-all.align-middle"#
        .to_string()
}

/// Where run bookkeeping lives between runs
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CheckpointConfig {
    /// Batch index the next detail run consumes
    #[serde(default = "default_cursor_path")]
    pub cursor_path: PathBuf,
    /// Every detail link ever discovered
    #[serde(default = "default_link_set_path")]
    pub link_set_path: PathBuf,
    /// Directory of `<index>.json` link batches
    #[serde(default = "default_batch_dir")]
    pub batch_dir: PathBuf,
}

impl Default for CheckpointConfig {
    fn default() -> Self {
        Self {
            cursor_path: default_cursor_path(),
            link_set_path: default_link_set_path(),
            batch_dir: default_batch_dir(),
        }
    }
}

fn default_cursor_path() -> PathBuf {
    PathBuf::from("cnt.json")
}

fn default_link_set_path() -> PathBuf {
    PathBuf::from("links.json")
}

fn default_batch_dir() -> PathBuf {
    PathBuf::from("batches")
}
