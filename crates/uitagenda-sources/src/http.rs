//! Shared HTTP plumbing for the adapters.

use std::time::Duration;

use reqwest::Client;
use uitagenda_core::source::SourceError;

/// Listing sites serve reduced markup to unknown clients.
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                              (KHTML, like Gecko) Chrome/121.0 Safari/537.36";

/// Build the client shared by all adapters.
pub fn client(timeout: Duration) -> Result<Client, SourceError> {
  Client::builder()
    .user_agent(USER_AGENT)
    .timeout(timeout)
    .build()
    .map_err(|e| SourceError::Transport(format!("failed to build HTTP client: {e}")))
}

/// `GET url` and return the body, failing on any non-2xx status.
pub async fn fetch_page(client: &Client, url: &str) -> Result<String, SourceError> {
  let resp = client
    .get(url)
    .send()
    .await
    .map_err(|e| SourceError::Transport(e.to_string()))?;

  let status = resp.status();
  if !status.is_success() {
    return Err(SourceError::Status {
      status: status.as_u16(),
      url:    url.to_owned(),
    });
  }

  resp.text().await.map_err(|e| SourceError::Body(e.to_string()))
}
