//! Headless-browser SEO smoke check for the parts storefront.
//!
//! Drives one Chromium tab through two fixed flows: the homepage (hidden
//! `h1.sr-only` heading and `AutoPartsStore` JSON-LD) and the product listing
//! (canonical link with query parameters stripped). Findings are printed as
//! plain lines and each flow leaves a screenshot behind.

pub mod browser;
pub mod checks;
pub mod driver;
pub mod structured_data;
pub mod verifier;
#[cfg(test)]
mod integration_tests;

// Re-export the public API
pub use browser::BrowserSession;
pub use checks::{
    run_homepage_check, run_products_canonical_check, CanonicalFinding, FlowStatus, HomepageFindings,
};
pub use driver::{DriverError, PageDriver, Session};
pub use verifier::{run, run_checks, run_in_session, VerificationSummary};
