use crate::provider::error::ProviderError;
use std::future::Future;

/// Status and body of one provider response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

/// Issues a GET request with query parameters.
///
/// Implemented by [`ReqwestTransport`] for real traffic. Any other implementation can be
/// passed to [`crate::WwoHist::with_transport`], for instance to replay recorded responses.
pub trait Transport {
    fn get(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> impl Future<Output = Result<RawResponse, ProviderError>> + Send;
}

#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Transport for ReqwestTransport {
    fn get(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> impl Future<Output = Result<RawResponse, ProviderError>> + Send {
        let request = self.client.get(url).query(query);
        let url = url.to_string();
        async move {
            // The query carries the API key, so errors are stripped of the full URL.
            let response = request
                .send()
                .await
                .map_err(|e| ProviderError::NetworkRequest(url.clone(), e.without_url()))?;
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .map_err(|e| ProviderError::BodyRead(url, e.without_url()))?;
            Ok(RawResponse { status, body })
        }
    }
}
