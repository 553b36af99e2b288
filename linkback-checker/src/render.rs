use std::time::Duration;

use chromiumoxide::Page;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::fetch::{
    ContinueRequestParams, EnableParams, EventRequestPaused, FailRequestParams,
    FulfillRequestParams, RequestPattern,
};
use chromiumoxide::cdp::browser_protocol::network::{ErrorReason, ResourceType};
use futures::StreamExt;
use tokio::sync::{Mutex, OnceCell};
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use url::Url;

use crate::error::{CheckError, Result};

/// 1x1 transparent PNG (base64) served in place of real images. Slow or
/// broken image hosts otherwise keep some friend-link widgets retrying and
/// the page never settles.
const PLACEHOLDER_PNG_BASE64: &str =
    "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAIcAGA60e6kgAAAABJRU5ErkJggg==";

const IDLE_TIMEOUT: Duration = Duration::from_secs(20);
const STABLE_TIMEOUT: Duration = Duration::from_secs(10);
const STABLE_PROBE_INTERVAL: Duration = Duration::from_millis(500);

struct BrowserHandle {
    browser: Mutex<Browser>,
    event_task: JoinHandle<()>,
}

/// Shared headless browser for last-resort rendered fetches.
///
/// The browser is launched at most once per process, on first demand. A
/// failed launch is cached: later calls report unavailability instead of
/// paying for the launch again. Workers share one instance; each rendered
/// fetch gets its own page.
pub struct Renderer {
    handle: OnceCell<Option<BrowserHandle>>,
}

impl Renderer {
    pub fn new() -> Self {
        Self {
            handle: OnceCell::new(),
        }
    }

    /// A renderer that never launches a browser; every rendered fetch
    /// reports unavailability.
    pub fn disabled() -> Self {
        Self {
            handle: OnceCell::new_with(Some(None)),
        }
    }

    async fn browser(&self) -> Option<&BrowserHandle> {
        self.handle
            .get_or_init(|| async {
                match launch_browser().await {
                    Ok(handle) => Some(handle),
                    Err(e) => {
                        warn!("browser launch failed: {e}");
                        None
                    }
                }
            })
            .await
            .as_ref()
    }

    /// Load `url`, execute its scripts, and return the rendered markup.
    ///
    /// Image responses are replaced with a constant placeholder and font
    /// requests are blocked outright; both only slow the page down. The
    /// page is closed before returning, whatever happened.
    pub async fn fetch_rendered(&self, url: &Url) -> Result<String> {
        let handle = self.browser().await.ok_or(CheckError::RenderUnavailable)?;

        let page = {
            let browser = handle.browser.lock().await;
            browser
                .new_page("about:blank")
                .await
                .map_err(|e| CheckError::Render(e.to_string()))?
        };

        let result = render_page(&page, url).await;
        if let Err(e) = page.close().await {
            debug!("failed to close page: {e}");
        }
        result
    }

    /// Close the shared browser, if one was ever launched. Called once at
    /// the end of a run, after all workers have finished.
    pub async fn shutdown(&self) {
        if let Some(Some(handle)) = self.handle.get() {
            let mut browser = handle.browser.lock().await;
            if let Err(e) = browser.close().await {
                warn!("failed to close browser: {e}");
            }
            let _ = browser.wait().await;
            handle.event_task.abort();
        }
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

async fn launch_browser() -> Result<BrowserHandle> {
    let mut builder = BrowserConfig::builder()
        .arg("--disable-gpu")
        .arg("--no-sandbox")
        .arg("--disable-dev-shm-usage")
        .arg("--disable-extensions")
        .arg("--disable-background-networking");

    // SHOW_BROWSER=true launches a visible browser for debugging.
    if std::env::var("SHOW_BROWSER").is_ok_and(|v| v == "true") {
        builder = builder.with_head();
    } else {
        builder = builder.arg("--headless=new");
    }

    let config = builder.build().map_err(CheckError::Render)?;
    let (browser, mut handler) = Browser::launch(config)
        .await
        .map_err(|e| CheckError::Render(e.to_string()))?;

    let event_task = tokio::spawn(async move {
        while let Some(event) = handler.next().await {
            let _ = event;
        }
    });

    Ok(BrowserHandle {
        browser: Mutex::new(browser),
        event_task,
    })
}

async fn render_page(page: &Page, url: &Url) -> Result<String> {
    let interceptor = install_interceptor(page).await?;
    let result = navigate_and_capture(page, url).await;
    interceptor.abort();
    result
}

async fn navigate_and_capture(page: &Page, url: &Url) -> Result<String> {
    let navigation = async {
        page.goto(url.as_str()).await?;
        page.wait_for_navigation().await?;
        Ok::<_, chromiumoxide::error::CdpError>(())
    };

    match tokio::time::timeout(IDLE_TIMEOUT, navigation).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => return Err(CheckError::Render(e.to_string())),
        Err(_) => {
            return Err(CheckError::Render(format!(
                "navigation did not settle within {IDLE_TIMEOUT:?}"
            )));
        }
    }

    wait_for_stable_content(page).await
}

/// Poll the rendered markup until two consecutive snapshots agree. A page
/// still mutating at the deadline yields its last snapshot; best-effort
/// rendering has no business erroring over a busy page.
async fn wait_for_stable_content(page: &Page) -> Result<String> {
    let deadline = tokio::time::Instant::now() + STABLE_TIMEOUT;
    let mut last = page
        .content()
        .await
        .map_err(|e| CheckError::Render(e.to_string()))?;

    while tokio::time::Instant::now() < deadline {
        tokio::time::sleep(STABLE_PROBE_INTERVAL).await;
        let current = page
            .content()
            .await
            .map_err(|e| CheckError::Render(e.to_string()))?;
        if current == last {
            return Ok(current);
        }
        last = current;
    }

    Ok(last)
}

/// Pause every request through the CDP fetch domain: images get the
/// placeholder pixel, fonts are refused, everything else continues.
async fn install_interceptor(page: &Page) -> Result<JoinHandle<()>> {
    let mut events = page
        .event_listener::<EventRequestPaused>()
        .await
        .map_err(|e| CheckError::Render(e.to_string()))?;

    page.execute(EnableParams {
        patterns: Some(vec![RequestPattern {
            url_pattern: Some("*".to_string()),
            resource_type: None,
            request_stage: None,
        }]),
        handle_auth_requests: None,
    })
    .await
    .map_err(|e| CheckError::Render(e.to_string()))?;

    let page = page.clone();
    Ok(tokio::spawn(async move {
        while let Some(event) = events.next().await {
            let request_id = event.request_id.clone();
            let handled = match &event.resource_type {
                ResourceType::Image => page
                    .execute(
                        FulfillRequestParams::builder()
                            .request_id(request_id)
                            .response_code(200)
                            .body(PLACEHOLDER_PNG_BASE64.to_string())
                            .build()
                            .unwrap(),
                    )
                    .await
                    .map(|_| ()),
                ResourceType::Font => page
                    .execute(FailRequestParams::new(
                        request_id,
                        ErrorReason::BlockedByClient,
                    ))
                    .await
                    .map(|_| ()),
                _ => page
                    .execute(ContinueRequestParams::new(request_id))
                    .await
                    .map(|_| ()),
            };
            if let Err(e) = handled {
                debug!("request interception failed: {e}");
            }
        }
    }))
}
