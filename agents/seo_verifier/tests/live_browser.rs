//! End-to-end run against a fixture storefront.
//!
//! Needs a local Chrome/Chromium, so it is ignored by default:
//!   cargo test -p seo_verifier --test live_browser -- --ignored

use seo_verifier::{run, CanonicalFinding, FlowStatus};
use shared::VerifierConfig;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

const HOMEPAGE: &str = r#"<!doctype html>
<html>
<head>
  <title>Industrial Parts</title>
  <script type="application/ld+json">{ not json</script>
  <script type="application/ld+json">{"@context": "https://schema.org", "@type": "AutoPartsStore", "name": "Industrial Parts"}</script>
</head>
<body>
  <h1 class="sr-only" style="position:absolute;width:1px;height:1px;overflow:hidden;clip:rect(0,0,0,0)">Engine Parts Supplier</h1>
  <main>Parts</main>
</body>
</html>"#;

const PRODUCTS: &str = r#"<!doctype html>
<html>
<head>
  <title>Products</title>
  <link rel="canonical" href="https://industrial-parts.com/products">
</head>
<body><main>Listing</main></body>
</html>"#;

/// Serve the two fixture pages until the test ends.
async fn serve_fixtures() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        loop {
            let Ok((mut stream, _)) = listener.accept().await else {
                break;
            };
            tokio::spawn(async move {
                let mut buf = [0u8; 4096];
                let n = stream.read(&mut buf).await.unwrap_or(0);
                let request = String::from_utf8_lossy(&buf[..n]);
                let path = request.split_whitespace().nth(1).unwrap_or("/");
                let (status, body) = if path == "/" {
                    ("200 OK", HOMEPAGE)
                } else if path.starts_with("/products") {
                    ("200 OK", PRODUCTS)
                } else {
                    ("404 Not Found", "")
                };
                let response = format!(
                    "HTTP/1.1 {}\r\nContent-Type: text/html; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                let _ = stream.write_all(response.as_bytes()).await;
                let _ = stream.shutdown().await;
            });
        }
    });
    format!("http://{}", addr)
}

#[tokio::test]
#[ignore = "requires a local Chrome/Chromium"]
async fn verifies_fixture_storefront() {
    let base_url = serve_fixtures().await;
    let tmp = tempfile::tempdir().unwrap();
    let config = VerifierConfig::for_base_url(&base_url)
        .unwrap()
        .with_output_dir(tmp.path());
    let mut out = Vec::new();

    let summary = run(&config, &mut out).await.unwrap();

    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("Found hidden H1: 'Engine Parts Supplier'"), "{}", text);
    assert!(text.contains("Found AutoPartsStore JSON-LD"), "{}", text);
    assert!(text.contains("Canonical URL is correct (stripped params)"), "{}", text);
    assert_eq!(
        summary.products,
        FlowStatus::Completed(CanonicalFinding::Correct {
            href: "https://industrial-parts.com/products".to_string()
        })
    );
    assert!(tmp.path().join("verification_homepage.png").is_file());
    assert!(tmp.path().join("verification_products.png").is_file());
}
