//! Headless Chrome implementation of the DOM capability, driven over the
//! DevTools protocol.

use std::collections::HashSet;
use std::hash::Hash;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig as LaunchConfig};
use chromiumoxide::cdp::browser_protocol::network::{
    EnableParams, EventLoadingFailed, EventLoadingFinished, EventRequestWillBeSent,
};
use chromiumoxide::Page;
use futures::StreamExt;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{sleep, sleep_until, timeout, Instant};
use tracing::{debug, warn};

use crate::config::BrowserConfig;
use crate::links::CatalogEntry;

use super::{Document, DomError};

const HEIGHT_SCRIPT: &str = "document.body.scrollHeight";

const SCROLL_SCRIPT: &str = "window.scrollTo(0, document.body.scrollHeight)";

/// A page in a headless Chrome instance.
///
/// One instance owns one tab. Navigation returns once the load event fired
/// and no more than `network_idle_connections` requests stayed in flight for
/// `network_idle_ms`, so client-rendered content is present when queried.
#[derive(Debug)]
pub struct ChromeDocument {
    browser: Mutex<Browser>,
    page: Page,
    handler: JoinHandle<()>,
    /// Whether the browser process was started by us and must be shut down.
    launched: bool,
    request_timeout: Duration,
    idle_window: Duration,
    idle_connections: usize,
    closed: AtomicBool,
}

impl ChromeDocument {
    /// Launch a browser (or attach to `devtools_url`) and open a blank tab.
    pub async fn connect(config: &BrowserConfig) -> Result<Self, DomError> {
        let (browser, mut handler, launched) = match &config.devtools_url {
            Some(url) => {
                let (browser, handler) = Browser::connect(url.as_str())
                    .await
                    .map_err(|e| DomError::Session(format!("connect to {}: {}", url, e)))?;
                (browser, handler, false)
            }
            None => {
                let (browser, handler) = Browser::launch(launch_config(config)?)
                    .await
                    .map_err(|e| DomError::Session(format!("launch: {}", e)))?;
                (browser, handler, true)
            }
        };

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("DevTools handler error: {}", e);
                }
            }
        });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                handler.abort();
                return Err(DomError::Session(format!("open tab: {}", e)));
            }
        };
        if let Err(e) = page.execute(EnableParams::default()).await {
            handler.abort();
            return Err(e.into());
        }

        debug!("Browser tab ready (launched: {})", launched);

        Ok(Self {
            browser: Mutex::new(browser),
            page,
            handler,
            launched,
            request_timeout: config.request_timeout(),
            idle_window: config.network_idle_window(),
            idle_connections: config.network_idle_connections,
            closed: AtomicBool::new(false),
        })
    }

    fn ensure_open(&self) -> Result<(), DomError> {
        if self.closed.load(Ordering::SeqCst) {
            Err(DomError::Closed)
        } else {
            Ok(())
        }
    }

    /// Evaluate `expression` and deserialize its value. `null` and
    /// `undefined` deserialize from JSON `null`.
    async fn evaluate<T: DeserializeOwned>(&self, expression: String) -> Result<T, DomError> {
        self.ensure_open()?;
        let result = timeout(self.request_timeout, self.page.evaluate(expression))
            .await
            .map_err(|_| DomError::Script("evaluation timed out".to_string()))??;
        let value = result.value().cloned().unwrap_or(Value::Null);
        serde_json::from_value(value).map_err(|e| DomError::Script(e.to_string()))
    }

    /// Evaluate a selector-based expression, attributing failures to the selector.
    async fn query<T: DeserializeOwned>(
        &self,
        selector: &str,
        expression: String,
    ) -> Result<T, DomError> {
        self.evaluate(expression).await.map_err(|e| match e {
            DomError::Closed => DomError::Closed,
            other => DomError::query(selector, other.to_string()),
        })
    }

    /// Wait until at most `idle_connections` requests stay in flight for one
    /// idle window, or the request timeout passes.
    async fn wait_for_network_idle<S, F, L>(&self, requests: &mut S, finished: &mut F, failed: &mut L)
    where
        S: futures::Stream<Item = std::sync::Arc<EventRequestWillBeSent>> + Unpin,
        F: futures::Stream<Item = std::sync::Arc<EventLoadingFinished>> + Unpin,
        L: futures::Stream<Item = std::sync::Arc<EventLoadingFailed>> + Unpin,
    {
        let deadline = Instant::now() + self.request_timeout;
        let mut in_flight = InFlight::new(self.idle_connections);

        loop {
            tokio::select! {
                Some(event) = requests.next() => in_flight.started(event.request_id.clone()),
                Some(event) = finished.next() => in_flight.ended(&event.request_id),
                Some(event) = failed.next() => in_flight.ended(&event.request_id),
                _ = sleep(self.idle_window), if in_flight.is_idle() => break,
                _ = sleep_until(deadline) => {
                    warn!(
                        "Network did not go idle within {:?} ({} requests in flight)",
                        self.request_timeout,
                        in_flight.len()
                    );
                    break;
                }
            }
        }
    }
}

#[async_trait]
impl Document for ChromeDocument {
    async fn navigate(&self, url: &str) -> Result<(), DomError> {
        self.ensure_open()?;
        let navigation = |e: chromiumoxide::error::CdpError| DomError::navigation(url, e.to_string());

        let mut requests = self
            .page
            .event_listener::<EventRequestWillBeSent>()
            .await
            .map_err(navigation)?;
        let mut finished = self
            .page
            .event_listener::<EventLoadingFinished>()
            .await
            .map_err(navigation)?;
        let mut failed = self
            .page
            .event_listener::<EventLoadingFailed>()
            .await
            .map_err(navigation)?;

        timeout(self.request_timeout, self.page.goto(url))
            .await
            .map_err(|_| DomError::navigation(url, "page load timed out"))?
            .map_err(navigation)?;

        self.wait_for_network_idle(&mut requests, &mut finished, &mut failed)
            .await;
        Ok(())
    }

    async fn scroll_height(&self) -> Result<u64, DomError> {
        let height: f64 = self.evaluate(HEIGHT_SCRIPT.to_string()).await?;
        Ok(height.max(0.0) as u64)
    }

    async fn scroll_to_bottom(&self) -> Result<(), DomError> {
        self.evaluate::<Value>(SCROLL_SCRIPT.to_string()).await?;
        Ok(())
    }

    async fn count(&self, selector: &str) -> Result<usize, DomError> {
        let expression = format!(
            "document.querySelectorAll({}).length",
            js_string(selector)
        );
        self.query(selector, expression).await
    }

    async fn text(&self, selector: &str) -> Result<Option<String>, DomError> {
        let expression = format!(
            "(() => {{ const el = document.querySelector({}); return el ? el.innerText.trim() : null; }})()",
            js_string(selector)
        );
        self.query(selector, expression).await
    }

    async fn texts(&self, selector: &str) -> Result<Vec<String>, DomError> {
        let expression = format!(
            "Array.from(document.querySelectorAll({})).map(el => el.innerText.trim())",
            js_string(selector)
        );
        self.query(selector, expression).await
    }

    async fn attribute(&self, selector: &str, name: &str) -> Result<Option<String>, DomError> {
        let expression = format!(
            "(() => {{ const el = document.querySelector({}); return el ? el.getAttribute({}) : null; }})()",
            js_string(selector),
            js_string(name)
        );
        self.query(selector, expression).await
    }

    async fn links(
        &self,
        anchor_selector: &str,
        title_selector: &str,
    ) -> Result<Vec<CatalogEntry>, DomError> {
        let expression = format!(
            "Array.from(document.querySelectorAll({})).map(anchor => {{ \
                const title = anchor.querySelector({}); \
                return {{ href: anchor.href, title: title ? title.innerText.trim() : null }}; \
            }})",
            js_string(anchor_selector),
            js_string(title_selector)
        );
        self.query(anchor_selector, expression).await
    }

    async fn close(&self) -> Result<(), DomError> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        if let Err(e) = self.page.clone().close().await {
            warn!("Failed to close tab: {}", e);
        }
        if self.launched {
            let mut browser = self.browser.lock().await;
            if let Err(e) = browser.close().await {
                warn!("Failed to shut down browser: {}", e);
            }
            let _ = browser.wait().await;
        }
        self.handler.abort();

        debug!("Browser session closed");
        Ok(())
    }
}

/// Launch options for a crawler browser.
fn launch_config(config: &BrowserConfig) -> Result<LaunchConfig, DomError> {
    let mut builder = LaunchConfig::builder()
        .request_timeout(config.request_timeout())
        .args(launch_args(config));
    if !config.headless {
        builder = builder.with_head();
    }
    if let Some(executable) = &config.executable {
        builder = builder.chrome_executable(executable);
    }
    builder.build().map_err(DomError::Session)
}

fn launch_args(config: &BrowserConfig) -> Vec<String> {
    let mut args = vec![
        format!("--user-agent={}", config.user_agent),
        "--window-size=1400,1200".to_string(),
        "--disable-gpu".to_string(),
        "--disable-dev-shm-usage".to_string(),
    ];
    if !cfg!(target_os = "macos") {
        args.push("--no-sandbox".to_string());
    }
    args
}

/// `text` as a JavaScript string literal.
fn js_string(text: &str) -> String {
    Value::String(text.to_string()).to_string()
}

/// Requests started but not yet finished on the current page.
#[derive(Debug)]
struct InFlight<K> {
    pending: HashSet<K>,
    tolerated: usize,
}

impl<K: Hash + Eq> InFlight<K> {
    fn new(tolerated: usize) -> Self {
        Self {
            pending: HashSet::new(),
            tolerated,
        }
    }

    fn started(&mut self, id: K) {
        self.pending.insert(id);
    }

    fn ended(&mut self, id: &K) {
        self.pending.remove(id);
    }

    fn len(&self) -> usize {
        self.pending.len()
    }

    fn is_idle(&self) -> bool {
        self.pending.len() <= self.tolerated
    }
}
