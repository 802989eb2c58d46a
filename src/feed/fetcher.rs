//! HTTP retrieval of raw feed documents.
//!
//! One attempt per call, no retry and no backoff: retries, if any, belong
//! to the caller. Timeouts are configured on the client, not here.

use std::time::Duration;

use super::FeedError;

/// Identifying client header attached to every outgoing request.
pub const USER_AGENT: &str = "podcatch/0.1";

/// Builds the HTTP client used for feed retrieval.
///
/// The timeout lives on the client so that every request through it is
/// bounded; `fetch_feed` itself imposes none.
pub fn feed_client(timeout: Duration) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
}

/// Retrieves the raw feed document for a URL.
///
/// The URL is passed to the transport untouched; no scheme or host checks
/// happen at this layer. A non-success status code becomes
/// `feed retrieval failed (<status>)`; any transport-level failure becomes
/// `feed retrieval failed: <underlying message>`.
pub async fn fetch_feed(client: &reqwest::Client, url: &str) -> Result<String, FeedError> {
    let response = client
        .get(url)
        .header(reqwest::header::USER_AGENT, USER_AGENT)
        .send()
        .await
        .map_err(|e| FeedError::Transport(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        tracing::debug!(url = %url, status = %status, "Feed request returned error status");
        return Err(FeedError::Status(status.as_u16()));
    }

    response
        .text()
        .await
        .map_err(|e| FeedError::Transport(e.to_string()))
}
