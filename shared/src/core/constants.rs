// Default targets for the storefront served by `next dev`
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";
pub const HOMEPAGE_PATH: &str = "/";
pub const PRODUCTS_PATH: &str = "/products?category=Engine&make=Toyota";

/// Canonical URL the listing page must declare, whatever query it was served with.
pub const EXPECTED_CANONICAL_URL: &str = "https://industrial-parts.com/products";

/// Schema.org type the homepage JSON-LD must declare.
pub const TARGET_SCHEMA_TYPE: &str = "AutoPartsStore";

// DOM selectors
pub const HIDDEN_HEADING_SELECTOR: &str = "h1.sr-only";
pub const STRUCTURED_DATA_SELECTOR: &str = r#"script[type="application/ld+json"]"#;
pub const CANONICAL_LINK_SELECTOR: &str = r#"link[rel="canonical"]"#;

// Timeouts
pub const NAVIGATION_TIMEOUT_SECS: u64 = 60;

// Screenshot outputs, written relative to the output directory
pub const HOMEPAGE_SCREENSHOT: &str = "verification_homepage.png";
pub const PRODUCTS_SCREENSHOT: &str = "verification_products.png";

// Browser viewport
pub const VIEWPORT_WIDTH: u32 = 1280;
pub const VIEWPORT_HEIGHT: u32 = 720;
