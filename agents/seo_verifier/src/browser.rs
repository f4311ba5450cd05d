//! Chromium session backing [`PageDriver`] over the DevTools protocol.

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::handler::viewport::Viewport;
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::{Handler, Page};
use futures_util::StreamExt;
use shared::VerifierConfig;
use std::path::Path;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::driver::{with_deadline, DriverError, PageDriver, Session};

const HANDLER_SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// One browser process with a single tab.
///
/// Call [`Session::close`] when done. Dropping the session without
/// closing still kills the browser process, but without waiting for it.
pub struct BrowserSession {
    browser: Browser,
    page: Page,
    handler: JoinHandle<()>,
    query_timeout: Duration,
}

impl BrowserSession {
    pub async fn launch(config: &VerifierConfig) -> Result<Self, DriverError> {
        let browser_config = browser_config(config)?;
        let (mut browser, handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| DriverError::Launch(e.to_string()))?;

        // drive the CDP connection in background
        let handler = spawn_handler(handler);

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                if let Err(close_err) = browser.close().await {
                    warn!("Failed to close browser after launch error: {}", close_err);
                }
                handler.abort();
                return Err(DriverError::Launch(format!("could not open a tab: {}", e)));
            }
        };
        info!(
            "Launched {} browser ({}x{})",
            if config.headless { "headless" } else { "headed" },
            config.viewport.width,
            config.viewport.height
        );

        Ok(Self {
            browser,
            page,
            handler,
            query_timeout: config.navigation_timeout(),
        })
    }
}

fn browser_config(config: &VerifierConfig) -> Result<BrowserConfig, DriverError> {
    let mut builder = BrowserConfig::builder()
        .no_sandbox()
        .window_size(config.viewport.width, config.viewport.height)
        .viewport(Viewport {
            width: config.viewport.width,
            height: config.viewport.height,
            ..Viewport::default()
        })
        .request_timeout(config.navigation_timeout());
    if !config.headless {
        builder = builder.with_head();
    }
    if let Some(executable) = &config.chrome_executable {
        builder = builder.chrome_executable(executable);
    }
    builder.build().map_err(DriverError::Launch)
}

fn spawn_handler(mut handler: Handler) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = handler.next().await {
            if let Err(e) = event {
                debug!("chromiumoxide handler event error: {}", e);
            }
        }
    })
}

#[async_trait]
impl PageDriver for BrowserSession {
    async fn goto(&self, url: &str, timeout: Duration) -> Result<(), DriverError> {
        with_deadline(format!("navigating to \"{}\"", url), timeout, async {
            self.page
                .goto(url)
                .await
                .map(|_| ())
                .map_err(|e| DriverError::Navigation {
                    url: url.to_string(),
                    message: e.to_string(),
                })
        })
        .await
    }

    async fn inner_texts(&self, selector: &str) -> Result<Vec<String>, DriverError> {
        let query_err = |e: chromiumoxide::error::CdpError| DriverError::Query {
            selector: selector.to_string(),
            message: e.to_string(),
        };
        with_deadline(format!("querying {}", selector), self.query_timeout, async {
            let elements = self.page.find_elements(selector).await.map_err(query_err)?;
            let mut texts = Vec::with_capacity(elements.len());
            for element in elements {
                let text = element.inner_text().await.map_err(query_err)?;
                texts.push(text.unwrap_or_default());
            }
            Ok(texts)
        })
        .await
    }

    async fn attributes(&self, selector: &str, name: &str) -> Result<Vec<Option<String>>, DriverError> {
        let query_err = |e: chromiumoxide::error::CdpError| DriverError::Query {
            selector: selector.to_string(),
            message: e.to_string(),
        };
        with_deadline(format!("querying {}", selector), self.query_timeout, async {
            let elements = self.page.find_elements(selector).await.map_err(query_err)?;
            let mut values = Vec::with_capacity(elements.len());
            for element in elements {
                values.push(element.attribute(name).await.map_err(query_err)?);
            }
            Ok(values)
        })
        .await
    }

    async fn screenshot(&self, path: &Path) -> Result<(), DriverError> {
        let params = ScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .build();
        with_deadline(
            format!("capturing {}", path.display()),
            self.query_timeout,
            async {
                self.page
                    .save_screenshot(params, path)
                    .await
                    .map(|_| ())
                    .map_err(|e| DriverError::Screenshot {
                        path: path.to_path_buf(),
                        message: e.to_string(),
                    })
            },
        )
        .await
    }
}

#[async_trait]
impl Session for BrowserSession {
    /// Close the browser and wait for the process and the CDP handler to exit.
    async fn close(mut self) -> Result<(), DriverError> {
        let closed = self
            .browser
            .close()
            .await
            .map(|_| ())
            .map_err(|e| DriverError::Shutdown(e.to_string()));
        if closed.is_ok() {
            if let Err(e) = self.browser.wait().await {
                warn!("Failed to reap browser process: {}", e);
            }
        }

        if tokio::time::timeout(HANDLER_SHUTDOWN_GRACE, &mut self.handler)
            .await
            .is_err()
        {
            debug!("CDP handler still running after close; aborting it");
            self.handler.abort();
        }
        info!("Browser closed");
        closed
    }
}
