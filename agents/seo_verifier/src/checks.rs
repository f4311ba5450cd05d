//! The two navigate-and-inspect flows.
//!
//! Each flow prints its findings to `out` as it goes and wraps the whole
//! sequence in a single recovery boundary: whatever goes wrong is printed with
//! a flow-specific prefix and reported as [`FlowStatus::Failed`], never
//! propagated.

use anyhow::{Context, Result};
use serde_json::Value;
use shared::core::constants::{
    CANONICAL_LINK_SELECTOR, HIDDEN_HEADING_SELECTOR, STRUCTURED_DATA_SELECTOR,
};
use shared::VerifierConfig;
use std::fmt;
use std::io::Write;
use tracing::{debug, info, warn};

use crate::driver::PageDriver;
use crate::structured_data;

/// Outcome of one flow
#[derive(Debug, Clone, PartialEq)]
pub enum FlowStatus<T> {
    Completed(T),
    Failed(String),
}

impl<T> FlowStatus<T> {
    pub fn completed(&self) -> Option<&T> {
        match self {
            FlowStatus::Completed(findings) => Some(findings),
            FlowStatus::Failed(_) => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, FlowStatus::Failed(_))
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct HomepageFindings {
    /// Text of the first `h1.sr-only`, if any
    pub hidden_heading: Option<String>,
    /// First JSON-LD object declaring the target type, if any
    pub structured_data: Option<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CanonicalFinding {
    Correct { href: String },
    Incorrect { expected: String, actual: Option<String> },
    Missing,
}

impl CanonicalFinding {
    /// Compare a canonical link's `href` against the expected URL, byte for byte.
    pub fn evaluate(href: Option<String>, expected: &str) -> Self {
        match href {
            Some(href) if href == expected => CanonicalFinding::Correct { href },
            actual => CanonicalFinding::Incorrect {
                expected: expected.to_string(),
                actual,
            },
        }
    }

    pub fn is_correct(&self) -> bool {
        matches!(self, CanonicalFinding::Correct { .. })
    }
}

/// Displays an optional attribute value, `None` when it is absent.
struct Href<'a>(Option<&'a str>);

impl fmt::Display for Href<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.unwrap_or("None"))
    }
}

/// Checks the homepage for the hidden heading and the store JSON-LD block,
/// then screenshots it.
pub async fn run_homepage_check<D, W>(
    driver: &D,
    config: &VerifierConfig,
    out: &mut W,
) -> FlowStatus<HomepageFindings>
where
    D: PageDriver + ?Sized,
    W: Write,
{
    match homepage_flow(driver, config, out).await {
        Ok(findings) => FlowStatus::Completed(findings),
        Err(e) => recover(out, "Homepage", e),
    }
}

/// Checks that the listing page declares the expected canonical URL even when
/// requested with query parameters, then screenshots it.
pub async fn run_products_canonical_check<D, W>(
    driver: &D,
    config: &VerifierConfig,
    out: &mut W,
) -> FlowStatus<CanonicalFinding>
where
    D: PageDriver + ?Sized,
    W: Write,
{
    match products_flow(driver, config, out).await {
        Ok(finding) => FlowStatus::Completed(finding),
        Err(e) => recover(out, "Products", e),
    }
}

fn recover<T, W: Write>(out: &mut W, flow: &str, error: anyhow::Error) -> FlowStatus<T> {
    let message = format!("{:#}", error);
    warn!("{} verification failed: {}", flow, message);
    if let Err(e) = writeln!(out, "{} verification failed: {}", flow, message) {
        warn!("Could not write failure line: {}", e);
    }
    FlowStatus::Failed(message)
}

async fn homepage_flow<D, W>(driver: &D, config: &VerifierConfig, out: &mut W) -> Result<HomepageFindings>
where
    D: PageDriver + ?Sized,
    W: Write,
{
    let url = config.homepage_url();
    info!("Navigating to {}", url);
    driver
        .goto(&url, config.navigation_timeout())
        .await
        .context("Failed to load homepage")?;

    let headings = driver.inner_texts(HIDDEN_HEADING_SELECTOR).await?;
    let hidden_heading = headings.into_iter().next();
    match &hidden_heading {
        Some(text) => writeln!(out, "Found hidden H1: '{}'", text)?,
        None => writeln!(out, "Hidden H1 not found")?,
    }

    let blocks = driver.inner_texts(STRUCTURED_DATA_SELECTOR).await?;
    debug!("Found {} JSON-LD block(s)", blocks.len());
    let structured_data = structured_data::find_by_type(&blocks, &config.target_schema_type);
    match &structured_data {
        Some(data) => {
            writeln!(out, "Found {} JSON-LD", config.target_schema_type)?;
            writeln!(out, "{}", structured_data::pretty(data))?;
        }
        None => writeln!(out, "{} JSON-LD not found", config.target_schema_type)?,
    }

    let path = config.homepage_screenshot_path();
    driver.screenshot(&path).await?;
    info!("Saved screenshot to {}", path.display());

    Ok(HomepageFindings {
        hidden_heading,
        structured_data,
    })
}

async fn products_flow<D, W>(driver: &D, config: &VerifierConfig, out: &mut W) -> Result<CanonicalFinding>
where
    D: PageDriver + ?Sized,
    W: Write,
{
    let url = config.products_url();
    info!("Navigating to {}", url);
    driver
        .goto(&url, config.navigation_timeout())
        .await
        .context("Failed to load products page")?;

    let hrefs = driver.attributes(CANONICAL_LINK_SELECTOR, "href").await?;
    let finding = match hrefs.into_iter().next() {
        Some(href) => {
            writeln!(out, "Found canonical URL: {}", Href(href.as_deref()))?;
            let finding = CanonicalFinding::evaluate(href, &config.expected_canonical_url);
            if finding.is_correct() {
                writeln!(out, "Canonical URL is correct (stripped params)")?;
            } else if let CanonicalFinding::Incorrect { expected, actual } = &finding {
                writeln!(
                    out,
                    "Canonical URL is INCORRECT. Expected {}, got {}",
                    expected,
                    Href(actual.as_deref())
                )?;
            }
            finding
        }
        None => {
            writeln!(out, "Canonical link not found")?;
            CanonicalFinding::Missing
        }
    };

    let path = config.products_screenshot_path();
    driver.screenshot(&path).await?;
    info!("Saved screenshot to {}", path.display());

    Ok(finding)
}
