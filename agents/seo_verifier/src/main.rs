use anyhow::Result;
use shared::VerifierConfig;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging; stdout is reserved for the report
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let config = VerifierConfig::load()?;
    let mut stdout = std::io::stdout();
    let summary = seo_verifier::run(&config, &mut stdout).await?;
    summary.log();

    // Check outcomes are informational; the exit status stays zero.
    Ok(())
}
