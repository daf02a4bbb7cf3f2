use crate::error::DispatchError;
use crate::sink::LogSink;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::error::Error;

/// HTTP implementation of [`LogSink`]: one bare `POST` per payload.
///
/// No authentication and no timeout are configured. Any 2xx response
/// counts as delivered; the response body is ignored.
#[derive(Clone, Debug)]
pub struct HttpSink {
    client: Client,
    endpoint_url: String,
}

impl HttpSink {
    /// Construct a sink posting to `endpoint_url`.
    ///
    /// An empty or malformed URL is accepted here and fails on each send,
    /// where it is logged like any other transport error.
    pub fn new(endpoint_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), endpoint_url)
    }

    /// Reuse an existing [`Client`] (connection pool, proxy settings).
    pub fn with_client(client: Client, endpoint_url: impl Into<String>) -> Self {
        Self {
            client,
            endpoint_url: endpoint_url.into(),
        }
    }

    pub fn endpoint_url(&self) -> &str {
        &self.endpoint_url
    }
}

#[async_trait]
impl LogSink for HttpSink {
    async fn send(&self, payload: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
        let resp = self
            .client
            .post(&self.endpoint_url)
            .header(CONTENT_TYPE, "application/json")
            .body(payload.to_owned())
            .send()
            .await?;

        if resp.status().is_success() {
            Ok(())
        } else {
            Err(Box::new(DispatchError::Status(resp.status().as_u16())))
        }
    }
}
