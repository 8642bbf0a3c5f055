//! Shared HTTP plumbing for the outbound adapters.

use crate::domain::errors::{LocateError, Result};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Build a client whose requests are bounded by `timeout`.
pub(crate) fn build_client(timeout: Duration) -> anyhow::Result<reqwest::Client> {
    let client = reqwest::Client::builder().timeout(timeout).build()?;
    Ok(client)
}

/// Send a request, racing it against shutdown.
pub(crate) async fn send(
    request: reqwest::RequestBuilder,
    what: &str,
    cancel: &CancellationToken,
) -> Result<reqwest::Response> {
    tokio::select! {
        _ = cancel.cancelled() => Err(LocateError::Cancelled),
        res = request.send() => {
            res.map_err(|e| LocateError::external(format!("{} request failed: {}", what, e)))
        }
    }
}

/// Read the whole response body, racing it against shutdown.
pub(crate) async fn read_body(
    response: reqwest::Response,
    what: &str,
    cancel: &CancellationToken,
) -> Result<Vec<u8>> {
    tokio::select! {
        _ = cancel.cancelled() => Err(LocateError::Cancelled),
        res = response.bytes() => res
            .map(|b| b.to_vec())
            .map_err(|e| LocateError::external(format!("{} body read failed: {}", what, e))),
    }
}

/// Issue a GET-style request and decode a 2xx JSON answer.
///
/// Non-2xx statuses are `ExternalLookup`, bodies of the wrong shape
/// (including empty ones) are `Decode`.
pub(crate) async fn fetch_json<T: DeserializeOwned>(
    request: reqwest::RequestBuilder,
    what: &str,
    cancel: &CancellationToken,
) -> Result<T> {
    let response = send(request, what, cancel).await?;

    let status = response.status();
    if !status.is_success() {
        return Err(LocateError::external(format!(
            "{} returned status {}",
            what, status
        )));
    }

    let body = read_body(response, what, cancel).await?;
    serde_json::from_slice(&body)
        .map_err(|e| LocateError::decode(format!("{} response: {}", what, e)))
}
