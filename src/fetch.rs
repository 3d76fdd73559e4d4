use anyhow::{Context, Result};
use tracing::{info, warn};

/// Env var holding the default CORS-bypass proxy prefix. A `--proxy` flag
/// overrides it; without either the page is fetched directly.
pub const PROXY_ENV: &str = "RECIPE_PROXY_URL";

// Recipe sites routinely 403 the default reqwest UA.
const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";

/// Fetch a page's raw HTML, optionally through a proxy prefix
/// (`{proxy}{url}`). The caller owns retries and cancellation; this seam
/// only surfaces failures with context.
pub async fn fetch_page(url: &str, proxy: Option<&str>) -> Result<String> {
    let proxy = proxy
        .map(str::to_string)
        .or_else(|| std::env::var(PROXY_ENV).ok());
    let target = match &proxy {
        Some(prefix) => format!("{}{}", prefix, url),
        None => url.to_string(),
    };

    info!("Fetching {}", target);
    let client = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .context("Failed to build HTTP client")?;

    let response = client
        .get(&target)
        .send()
        .await
        .with_context(|| format!("Request to {} failed", target))?;

    let status = response.status();
    if !status.is_success() {
        warn!("Fetch of {} returned {}", url, status);
        anyhow::bail!("Fetch of {} failed with status {}", url, status);
    }

    response
        .text()
        .await
        .with_context(|| format!("Failed to read body of {}", url))
}
