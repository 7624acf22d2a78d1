//! Production transport backed by reqwest.

use anyhow::{Context, Result};
use async_trait::async_trait;
use hyper::ext::ReasonPhrase;
use log::debug;
use reqwest::Client;
use reqwest::multipart::{Form, Part};

use super::{Request, RequestBody, Response, Transport};

/// User agent sent by [`HttpTransport::with_user_agent`].
pub const USER_AGENT: &str = concat!("api-connectors/", env!("API_CONNECTORS_VERSION"));

/// Transport that performs real HTTP requests.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Creates a new transport wrapping the given reqwest Client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Returns a reference to the underlying reqwest Client.
    pub fn inner(&self) -> &Client {
        &self.client
    }

    /// Creates a transport with a fresh client sending [`USER_AGENT`].
    pub fn with_user_agent() -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self::new(client))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    #[tracing::instrument(skip(self, request), fields(method = %request.method, url = %request.url))]
    async fn send(&self, request: Request) -> Result<Response> {
        let mut builder = self
            .client
            .request(request.method, &request.url)
            .headers(request.headers);

        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(text) => builder.body(text),
            RequestBody::Multipart { field, data } => {
                builder.multipart(Form::new().part(field, Part::bytes(data)))
            }
        };

        let response = builder.send().await.context("Failed to send request")?;

        let status = response.status();
        let headers = response.headers().clone();
        // Only present when the server sent a non-canonical phrase.
        let reason = response
            .extensions()
            .get::<ReasonPhrase>()
            .map(|reason| String::from_utf8_lossy(reason.as_bytes()).into_owned());
        let body = response
            .bytes()
            .await
            .context("Failed to read response body")?;

        debug!("Received {} ({} bytes)", status, body.len());

        let response = Response::new(status, headers, body.to_vec());
        Ok(match reason {
            Some(reason) => response.with_status_text(reason),
            None => response,
        })
    }
}
