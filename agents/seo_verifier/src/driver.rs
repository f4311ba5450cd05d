use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

/// Errors raised while driving a browser tab
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    #[error("Browser launch failed: {0}")]
    Launch(String),

    #[error("Timeout {}ms exceeded while {action}", .timeout.as_millis())]
    Timeout { action: String, timeout: Duration },

    #[error("Navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    #[error("Query '{selector}' failed: {message}")]
    Query { selector: String, message: String },

    #[error("Screenshot to {} failed: {message}", .path.display())]
    Screenshot { path: PathBuf, message: String },

    #[error("Browser shutdown failed: {0}")]
    Shutdown(String),
}

impl DriverError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, DriverError::Timeout { .. })
    }
}

/// The operations the checks need from a single browser tab.
///
/// Every query re-resolves its selector against the live document, so
/// results always reflect the page most recently navigated to.
#[async_trait]
pub trait PageDriver: Send + Sync {
    /// Navigate and wait for the load event, failing with
    /// [`DriverError::Timeout`] once `timeout` elapses.
    async fn goto(&self, url: &str, timeout: Duration) -> Result<(), DriverError>;

    /// Rendered text of every element matching `selector`, in document order.
    async fn inner_texts(&self, selector: &str) -> Result<Vec<String>, DriverError>;

    /// Value of attribute `name` on every element matching `selector`, in
    /// document order. `None` marks a matching element without the attribute.
    async fn attributes(&self, selector: &str, name: &str) -> Result<Vec<Option<String>>, DriverError>;

    /// Capture the viewport as PNG into `path`, replacing any existing file.
    async fn screenshot(&self, path: &Path) -> Result<(), DriverError>;
}

/// A page that owns its browser and must be released exactly once.
#[async_trait]
pub trait Session: PageDriver + Sized {
    async fn close(self) -> Result<(), DriverError>;
}

/// Run `fut`, converting an elapsed deadline into [`DriverError::Timeout`].
pub async fn with_deadline<T, F>(action: impl Into<String>, timeout: Duration, fut: F) -> Result<T, DriverError>
where
    F: std::future::Future<Output = Result<T, DriverError>>,
{
    match tokio::time::timeout(timeout, fut).await {
        Ok(result) => result,
        Err(_) => Err(DriverError::Timeout {
            action: action.into(),
            timeout,
        }),
    }
}
