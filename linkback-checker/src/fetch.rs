use std::time::Duration;

use reqwest::{Client, StatusCode};
use tracing::debug;
use url::Url;

use crate::error::{CheckError, Result};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

pub fn build_client() -> Client {
    Client::builder()
        .user_agent(concat!("linkback/", env!("CARGO_PKG_VERSION")))
        .timeout(REQUEST_TIMEOUT)
        .connect_timeout(Duration::from_secs(5))
        .redirect(reqwest::redirect::Policy::limited(5))
        .build()
        .expect("Failed to create HTTP client")
}

/// A successfully fetched page body.
#[derive(Debug)]
pub struct FetchedPage {
    /// The URL the response actually came from, after redirects. Relative
    /// links must be resolved against this, not the declared URL.
    pub final_url: Url,
    pub status: StatusCode,
    pub body: String,
}

/// GET a page. Transport failures surface as `CheckError::Transport`,
/// non-2xx responses as `CheckError::HttpStatus`; the caller decides what
/// either means for the site being checked.
pub async fn fetch_page(client: &Client, url: &Url) -> Result<FetchedPage> {
    debug!("fetching {url}");
    let response = client.get(url.clone()).send().await?;

    let status = response.status();
    let final_url = response.url().clone();
    if !status.is_success() {
        return Err(CheckError::HttpStatus(status.as_u16()));
    }

    let body = response
        .text()
        .await
        .map_err(|_| CheckError::Parse("cannot read response body".to_string()))?;

    Ok(FetchedPage {
        final_url,
        status,
        body,
    })
}

/// Lightweight existence probe: HEAD, and anything that settles in
/// 200..400 counts as "there is a page here".
pub async fn probe_exists(client: &Client, url: &Url) -> bool {
    match client.head(url.clone()).send().await {
        Ok(response) => {
            let code = response.status().as_u16();
            (200..400).contains(&code)
        }
        Err(e) => {
            debug!("probe of {url} failed: {e}");
            false
        }
    }
}
