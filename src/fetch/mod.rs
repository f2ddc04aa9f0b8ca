mod basic;

pub use basic::BasicClient;

use async_trait::async_trait;
use reqwest::{Method, Request, Response, Url};

use crate::error::FetchError;

/// Executes a prepared request against the backend.
///
/// [`crate::infra::backend::HttpFleetApi`] is generic over this so the
/// transport can be decorated or swapped without touching the endpoints.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, req: Request) -> reqwest::Result<Response>;
}

/// Sends a bodiless request and returns the response body.
///
/// # Errors
///
/// A transport failure maps to [`FetchError::Transient`]; a non-2xx answer
/// maps to [`FetchError::Status`] carrying the (possibly empty) body text.
pub async fn fetch_bytes<C: HttpClient + ?Sized>(
    client: &C,
    method: Method,
    url: Url,
) -> Result<Vec<u8>, FetchError> {
    let req = Request::new(method, url);

    let resp = client.execute(req).await?;
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(FetchError::Status {
            status: status.as_u16(),
            body,
        });
    }

    Ok(resp.bytes().await?.to_vec())
}
