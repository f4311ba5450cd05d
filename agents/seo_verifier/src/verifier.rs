use anyhow::{Context, Result};
use futures_util::FutureExt;
use shared::VerifierConfig;
use std::io::Write;
use std::panic::AssertUnwindSafe;
use tracing::{info, warn};

use crate::browser::BrowserSession;
use crate::checks::{
    run_homepage_check, run_products_canonical_check, CanonicalFinding, FlowStatus, HomepageFindings,
};
use crate::driver::{PageDriver, Session};

pub const HOMEPAGE_BANNER: &str = "--- Verifying Homepage ---";
pub const PRODUCTS_BANNER: &str = "--- Verifying Products Canonical ---";

/// What both flows found, for logging once the browser is gone.
#[derive(Debug, Clone, PartialEq)]
pub struct VerificationSummary {
    pub homepage: FlowStatus<HomepageFindings>,
    pub products: FlowStatus<CanonicalFinding>,
}

impl VerificationSummary {
    pub fn log(&self) {
        match &self.homepage {
            FlowStatus::Completed(findings) => info!(
                hidden_heading = findings.hidden_heading.is_some(),
                structured_data = findings.structured_data.is_some(),
                "Homepage check completed"
            ),
            FlowStatus::Failed(message) => warn!("Homepage check failed: {}", message),
        }
        match &self.products {
            FlowStatus::Completed(finding) => info!(
                canonical_correct = finding.is_correct(),
                canonical_present = !matches!(finding, CanonicalFinding::Missing),
                "Products check completed"
            ),
            FlowStatus::Failed(message) => warn!("Products check failed: {}", message),
        }
    }
}

/// Run both flows in order against an already open page. Neither flow can
/// prevent the other from running.
pub async fn run_checks<D, W>(driver: &D, config: &VerifierConfig, out: &mut W) -> VerificationSummary
where
    D: PageDriver + ?Sized,
    W: Write,
{
    banner(out, HOMEPAGE_BANNER, false);
    let homepage = run_homepage_check(driver, config, out).await;

    banner(out, PRODUCTS_BANNER, true);
    let products = run_products_canonical_check(driver, config, out).await;

    VerificationSummary { homepage, products }
}

fn banner<W: Write>(out: &mut W, title: &str, leading_blank: bool) {
    let written = if leading_blank {
        writeln!(out, "\n{}", title)
    } else {
        writeln!(out, "{}", title)
    };
    if let Err(e) = written {
        warn!("Could not write banner: {}", e);
    }
}

/// Launch a browser, run both flows, and close the browser on every exit path.
pub async fn run<W: Write>(config: &VerifierConfig, out: &mut W) -> Result<VerificationSummary> {
    shared::init_output_dir(&config.output_dir).with_context(|| {
        format!(
            "Failed to create screenshot directory {}",
            config.output_dir.display()
        )
    })?;

    let session = BrowserSession::launch(config)
        .await
        .context("Failed to launch browser")?;

    Ok(run_in_session(session, config, out).await)
}

/// Run both flows on `session`, then close it. A panic inside a flow is
/// resumed only after the session is closed.
pub async fn run_in_session<S, W>(session: S, config: &VerifierConfig, out: &mut W) -> VerificationSummary
where
    S: Session,
    W: Write,
{
    let outcome = AssertUnwindSafe(run_checks(&session, config, out))
        .catch_unwind()
        .await;

    if let Err(e) = session.close().await {
        warn!("{}", e);
    }

    match outcome {
        Ok(summary) => summary,
        Err(panic) => std::panic::resume_unwind(panic),
    }
}
