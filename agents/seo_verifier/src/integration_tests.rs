use crate::checks::{CanonicalFinding, FlowStatus};
use crate::driver::mock::{MockDocument, MockPage};
use crate::verifier::{run_checks, run_in_session, HOMEPAGE_BANNER, PRODUCTS_BANNER};
use futures_util::FutureExt;
use shared::core::constants::*;
use shared::VerifierConfig;
use std::panic::AssertUnwindSafe;
use std::path::PathBuf;
use std::sync::atomic::Ordering;

const HOME: &str = "http://localhost:3000/";
const PRODUCTS: &str = "http://localhost:3000/products?category=Engine&make=Toyota";
const CANONICAL: &str = "https://industrial-parts.com/products";

fn storefront() -> MockPage {
    MockPage::new()
        .with_document(
            HOME,
            MockDocument::new()
                .with_text(HIDDEN_HEADING_SELECTOR, "Engine Parts Supplier")
                .with_text(
                    STRUCTURED_DATA_SELECTOR,
                    r#"{"@context": "https://schema.org", "@type": "BreadcrumbList"}"#,
                )
                .with_text(
                    STRUCTURED_DATA_SELECTOR,
                    r#"{"@context": "https://schema.org", "@type": "AutoPartsStore", "name": "Industrial Parts"}"#,
                ),
        )
        .with_document(
            PRODUCTS,
            MockDocument::new().with_attribute(CANONICAL_LINK_SELECTOR, "href", Some(CANONICAL)),
        )
}

#[tokio::test]
async fn full_run_prints_both_sections_in_order() {
    let page = storefront();
    let mut out = Vec::new();

    let summary = run_checks(&page, &VerifierConfig::default(), &mut out).await;

    let expected = format!(
        "{HOMEPAGE_BANNER}\n\
         Found hidden H1: 'Engine Parts Supplier'\n\
         Found AutoPartsStore JSON-LD\n\
         {{\n  \"@context\": \"https://schema.org\",\n  \"@type\": \"AutoPartsStore\",\n  \"name\": \"Industrial Parts\"\n}}\n\
         \n\
         {PRODUCTS_BANNER}\n\
         Found canonical URL: {CANONICAL}\n\
         Canonical URL is correct (stripped params)\n"
    );
    assert_eq!(String::from_utf8(out).unwrap(), expected);
    assert!(summary.products.completed().unwrap().is_correct());
    assert_eq!(page.visited(), vec![HOME.to_string(), PRODUCTS.to_string()]);
}

#[tokio::test]
async fn homepage_timeout_does_not_stop_products_check() {
    let page = MockPage::new().with_timeout(HOME).with_document(
        PRODUCTS,
        MockDocument::new().with_attribute(CANONICAL_LINK_SELECTOR, "href", Some(CANONICAL)),
    );
    let mut out = Vec::new();

    let summary = run_checks(&page, &VerifierConfig::default(), &mut out).await;

    assert!(summary.homepage.is_failed());
    assert_eq!(
        summary.products,
        FlowStatus::Completed(CanonicalFinding::Correct {
            href: CANONICAL.to_string()
        })
    );
    let text = String::from_utf8(out).unwrap();
    let failure = text.find("Homepage verification failed: ").unwrap();
    let products = text.find(PRODUCTS_BANNER).unwrap();
    assert!(failure < products);
    assert!(text.ends_with("Canonical URL is correct (stripped params)\n"));
    assert_eq!(page.screenshots(), vec![PathBuf::from(PRODUCTS_SCREENSHOT)]);
}

#[tokio::test]
async fn screenshots_are_taken_whatever_the_findings() {
    let page = MockPage::new()
        .with_document(HOME, MockDocument::new())
        .with_document(
            PRODUCTS,
            MockDocument::new().with_attribute(
                CANONICAL_LINK_SELECTOR,
                "href",
                Some("https://industrial-parts.com/products?make=Toyota"),
            ),
        );
    let tmp = tempfile::tempdir().unwrap();
    let config = VerifierConfig::default().with_output_dir(tmp.path());
    let mut out = Vec::new();

    let summary = run_checks(&page, &config, &mut out).await;

    assert_eq!(summary.homepage.completed().unwrap().hidden_heading, None);
    assert!(!summary.products.completed().unwrap().is_correct());
    assert_eq!(
        page.screenshots(),
        vec![
            tmp.path().join(HOMEPAGE_SCREENSHOT),
            tmp.path().join(PRODUCTS_SCREENSHOT),
        ]
    );
}

#[tokio::test]
async fn both_flows_failing_still_completes_the_run() {
    let page = MockPage::new();
    let mut out = Vec::new();

    let summary = run_checks(&page, &VerifierConfig::default(), &mut out).await;

    assert!(summary.homepage.is_failed());
    assert!(summary.products.is_failed());
    let text = String::from_utf8(out).unwrap();
    assert_eq!(text.lines().filter(|l| l.contains("verification failed")).count(), 2);
}

#[tokio::test]
async fn session_is_closed_after_run() {
    let page = storefront();
    let closed = page.closed_flag();
    let mut out = Vec::new();

    let summary = run_in_session(page, &VerifierConfig::default(), &mut out).await;

    assert!(closed.load(Ordering::SeqCst));
    assert!(summary.homepage.completed().is_some());
}

#[tokio::test]
async fn session_is_closed_after_failed_flows() {
    let page = MockPage::new().with_timeout(HOME).with_timeout(PRODUCTS);
    let closed = page.closed_flag();
    let mut out = Vec::new();

    let summary = run_in_session(page, &VerifierConfig::default(), &mut out).await;

    assert!(closed.load(Ordering::SeqCst));
    assert!(summary.homepage.is_failed() && summary.products.is_failed());
}

#[tokio::test]
async fn session_is_closed_when_a_flow_panics() {
    let page = storefront().with_panic(PRODUCTS);
    let closed = page.closed_flag();
    let config = VerifierConfig::default();
    let mut out = Vec::new();

    let result = AssertUnwindSafe(run_in_session(page, &config, &mut out))
        .catch_unwind()
        .await;

    assert!(result.is_err());
    assert!(closed.load(Ordering::SeqCst));
}
