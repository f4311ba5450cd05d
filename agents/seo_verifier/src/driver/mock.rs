//! In-memory page driver for testing

use super::{DriverError, PageDriver, Session};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// A canned document: what each selector resolves to once it is loaded.
#[derive(Debug, Clone, Default)]
pub struct MockDocument {
    texts: HashMap<String, Vec<String>>,
    attributes: HashMap<(String, String), Vec<Option<String>>>,
    broken_selectors: HashSet<String>,
}

impl MockDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an element matching `selector` with the given rendered text.
    pub fn with_text(mut self, selector: &str, text: &str) -> Self {
        self.texts
            .entry(selector.to_string())
            .or_default()
            .push(text.to_string());
        self
    }

    /// Add an element matching `selector` carrying `name`, or lacking it when
    /// `value` is `None`.
    pub fn with_attribute(mut self, selector: &str, name: &str, value: Option<&str>) -> Self {
        self.attributes
            .entry((selector.to_string(), name.to_string()))
            .or_default()
            .push(value.map(str::to_string));
        self
    }

    /// Make every query against `selector` fail.
    pub fn with_broken_selector(mut self, selector: &str) -> Self {
        self.broken_selectors.insert(selector.to_string());
        self
    }
}

/// Mock implementation of [`PageDriver`] serving canned documents by URL
pub struct MockPage {
    documents: HashMap<String, MockDocument>,
    timeouts: HashSet<String>,
    panics: HashSet<String>,
    fail_screenshots: Mutex<bool>,
    current: Mutex<Option<String>>,
    visited: Mutex<Vec<String>>,
    screenshots: Mutex<Vec<PathBuf>>,
    closed: Arc<AtomicBool>,
}

impl MockPage {
    pub fn new() -> Self {
        Self {
            documents: HashMap::new(),
            timeouts: HashSet::new(),
            panics: HashSet::new(),
            fail_screenshots: Mutex::new(false),
            current: Mutex::new(None),
            visited: Mutex::new(Vec::new()),
            screenshots: Mutex::new(Vec::new()),
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn with_document(mut self, url: &str, document: MockDocument) -> Self {
        self.documents.insert(url.to_string(), document);
        self
    }

    /// Navigations to `url` never finish loading.
    pub fn with_timeout(mut self, url: &str) -> Self {
        self.timeouts.insert(url.to_string());
        self
    }

    /// Navigations to `url` panic, standing in for a bug inside a flow.
    pub fn with_panic(mut self, url: &str) -> Self {
        self.panics.insert(url.to_string());
        self
    }

    /// Shared flag flipped when the session is closed; clone it before
    /// handing the page over.
    pub fn closed_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.closed)
    }

    pub fn set_screenshot_failure(&self, fail: bool) {
        *self.fail_screenshots.lock().unwrap() = fail;
    }

    /// URLs passed to `goto`, including ones that failed.
    pub fn visited(&self) -> Vec<String> {
        self.visited.lock().unwrap().clone()
    }

    /// Paths successfully captured by `screenshot`.
    pub fn screenshots(&self) -> Vec<PathBuf> {
        self.screenshots.lock().unwrap().clone()
    }

    fn current_document(&self, selector: &str) -> Result<MockDocument, DriverError> {
        let current = self.current.lock().unwrap();
        let url = current.as_ref().ok_or_else(|| DriverError::Query {
            selector: selector.to_string(),
            message: "no document loaded".to_string(),
        })?;
        let document = self.documents.get(url).cloned().unwrap_or_default();
        if document.broken_selectors.contains(selector) {
            return Err(DriverError::Query {
                selector: selector.to_string(),
                message: "execution context was destroyed".to_string(),
            });
        }
        Ok(document)
    }
}

impl Default for MockPage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PageDriver for MockPage {
    async fn goto(&self, url: &str, timeout: Duration) -> Result<(), DriverError> {
        self.visited.lock().unwrap().push(url.to_string());
        if self.panics.contains(url) {
            panic!("mock page panicked loading {}", url);
        }
        if self.timeouts.contains(url) {
            return Err(DriverError::Timeout {
                action: format!("navigating to \"{}\"", url),
                timeout,
            });
        }
        if !self.documents.contains_key(url) {
            return Err(DriverError::Navigation {
                url: url.to_string(),
                message: "net::ERR_CONNECTION_REFUSED".to_string(),
            });
        }
        *self.current.lock().unwrap() = Some(url.to_string());
        Ok(())
    }

    async fn inner_texts(&self, selector: &str) -> Result<Vec<String>, DriverError> {
        let document = self.current_document(selector)?;
        Ok(document.texts.get(selector).cloned().unwrap_or_default())
    }

    async fn attributes(&self, selector: &str, name: &str) -> Result<Vec<Option<String>>, DriverError> {
        let document = self.current_document(selector)?;
        Ok(document
            .attributes
            .get(&(selector.to_string(), name.to_string()))
            .cloned()
            .unwrap_or_default())
    }

    async fn screenshot(&self, path: &Path) -> Result<(), DriverError> {
        if *self.fail_screenshots.lock().unwrap() {
            return Err(DriverError::Screenshot {
                path: path.to_path_buf(),
                message: "target closed".to_string(),
            });
        }
        self.screenshots.lock().unwrap().push(path.to_path_buf());
        Ok(())
    }
}

#[async_trait]
impl Session for MockPage {
    async fn close(self) -> Result<(), DriverError> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Err(DriverError::Shutdown("already closed".to_string()));
        }
        Ok(())
    }
}
