//! Per-verb connectors around an injected transport.
//!
//! A connector performs exactly one request per call and resolves to a
//! [`Payload`] or a [`ConnectorError`]. There is no retry and no state shared
//! between calls besides the immutable [`ConnectorConfig`].
//!
//! # Structure
//!
//! - `builder` - assembles the request (URL, headers, body, timeout)
//! - `query` - bracketed query-string encoding for GET
//! - `classify` - response classification and payload unwrapping

mod builder;
mod classify;
mod query;

use log::{debug, warn};
use reqwest::Method;
use reqwest::header::HeaderMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{ConnectorError, Result};
use crate::http::{Request, RequestBody, Response, Transport};
use crate::payload::Payload;

use builder::build_request;
use classify::into_outcome;

type RouteFn<P> = Box<dyn Fn(&P) -> String + Send + Sync>;
type HeadersFn<P> = Box<dyn Fn(&P) -> HeaderMap + Send + Sync>;

/// Per-call options applied to every invocation of a connector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct CallOptions {
    /// Deadline for the transport call, given in milliseconds when deserialized.
    #[serde(default, deserialize_with = "deserialize_millis")]
    pub timeout: Option<Duration>,
}

impl CallOptions {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

fn deserialize_millis<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<u64>::deserialize(deserializer)?.map(Duration::from_millis))
}

/// Shared configuration of a connector. Immutable once a connector is built.
pub struct ConnectorConfig<P> {
    transport: Arc<dyn Transport>,
    api_url: String,
    route: RouteFn<P>,
    headers: Option<HeadersFn<P>>,
    options: CallOptions,
}

impl<P> ConnectorConfig<P> {
    pub fn new<R>(transport: Arc<dyn Transport>, api_url: impl Into<String>, route: R) -> Self
    where
        R: Fn(&P) -> String + Send + Sync + 'static,
    {
        Self {
            transport,
            api_url: api_url.into(),
            route: Box::new(route),
            headers: None,
            options: CallOptions::default(),
        }
    }

    /// Sets the header generator; its headers are sent as-is.
    pub fn with_headers<H>(mut self, headers: H) -> Self
    where
        H: Fn(&P) -> HeaderMap + Send + Sync + 'static,
    {
        self.headers = Some(Box::new(headers));
        self
    }

    pub fn with_options(mut self, options: CallOptions) -> Self {
        self.options = options;
        self
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    pub fn options(&self) -> &CallOptions {
        &self.options
    }
}

impl<P> fmt::Debug for ConnectorConfig<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectorConfig")
            .field("api_url", &self.api_url)
            .field("headers", &self.headers.is_some())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// A JSON connector bound to one HTTP verb.
pub struct Connector<P> {
    config: Arc<ConnectorConfig<P>>,
    method: Method,
}

impl<P> Clone for Connector<P> {
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
            method: self.method.clone(),
        }
    }
}

impl<P> Connector<P> {
    fn with_method(config: ConnectorConfig<P>, method: Method) -> Self {
        Self {
            config: Arc::new(config),
            method,
        }
    }

    pub fn get(config: ConnectorConfig<P>) -> Self {
        Self::with_method(config, Method::GET)
    }

    pub fn post(config: ConnectorConfig<P>) -> Self {
        Self::with_method(config, Method::POST)
    }

    pub fn put(config: ConnectorConfig<P>) -> Self {
        Self::with_method(config, Method::PUT)
    }

    pub fn patch(config: ConnectorConfig<P>) -> Self {
        Self::with_method(config, Method::PATCH)
    }

    pub fn delete(config: ConnectorConfig<P>) -> Self {
        Self::with_method(config, Method::DELETE)
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn config(&self) -> &ConnectorConfig<P> {
        &self.config
    }

    /// Performs the call without a body or query.
    pub async fn call(&self, params: &P) -> Result<Payload> {
        execute(
            &self.config,
            self.method.clone(),
            params,
            None,
            RequestBody::Empty,
        )
        .await
    }

    /// Performs the call with `input` as the query (GET) or the JSON body (any other verb).
    pub async fn call_with<B>(&self, params: &P, input: &B) -> Result<Payload>
    where
        B: Serialize + ?Sized,
    {
        if self.method == Method::GET {
            let query = serde_json::to_value(input).map_err(ConnectorError::Encode)?;
            execute(
                &self.config,
                Method::GET,
                params,
                Some(&query),
                RequestBody::Empty,
            )
            .await
        } else {
            let body = serde_json::to_string(input).map_err(ConnectorError::Encode)?;
            execute(
                &self.config,
                self.method.clone(),
                params,
                None,
                RequestBody::Json(body),
            )
            .await
        }
    }
}

/// A POST connector that uploads raw bytes as a single multipart form field.
pub struct BinaryConnector<P> {
    config: Arc<ConnectorConfig<P>>,
    field_name: String,
}

impl<P> Clone for BinaryConnector<P> {
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
            field_name: self.field_name.clone(),
        }
    }
}

impl<P> BinaryConnector<P> {
    pub fn new(config: ConnectorConfig<P>, field_name: impl Into<String>) -> Self {
        Self {
            config: Arc::new(config),
            field_name: field_name.into(),
        }
    }

    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    pub fn config(&self) -> &ConnectorConfig<P> {
        &self.config
    }

    pub async fn call(&self, params: &P, data: impl Into<Vec<u8>>) -> Result<Payload> {
        let body = RequestBody::Multipart {
            field: self.field_name.clone(),
            data: data.into(),
        };
        execute(&self.config, Method::POST, params, None, body).await
    }
}

pub fn create_get_connector<P>(config: ConnectorConfig<P>) -> Connector<P> {
    Connector::get(config)
}

pub fn create_post_connector<P>(config: ConnectorConfig<P>) -> Connector<P> {
    Connector::post(config)
}

pub fn create_put_connector<P>(config: ConnectorConfig<P>) -> Connector<P> {
    Connector::put(config)
}

pub fn create_patch_connector<P>(config: ConnectorConfig<P>) -> Connector<P> {
    Connector::patch(config)
}

pub fn create_delete_connector<P>(config: ConnectorConfig<P>) -> Connector<P> {
    Connector::delete(config)
}

pub fn create_post_binary_connector<P>(
    config: ConnectorConfig<P>,
    field_name: impl Into<String>,
) -> BinaryConnector<P> {
    BinaryConnector::new(config, field_name)
}

/// One request-response cycle: build, invoke, classify.
async fn execute<P>(
    config: &ConnectorConfig<P>,
    method: Method,
    params: &P,
    query: Option<&Value>,
    body: RequestBody,
) -> Result<Payload> {
    let request = build_request(config, method, params, query, body);
    debug!("{} {}", request.method, request.url);

    let response = invoke(config.transport.as_ref(), request).await?;
    into_outcome(response)
}

/// Calls the transport once. Any transport error, or the timeout firing,
/// becomes [`ConnectorError::Transport`].
#[tracing::instrument(skip_all, fields(method = %request.method, url = %request.url))]
async fn invoke(transport: &dyn Transport, request: Request) -> Result<Response> {
    let timeout = request.timeout;
    let sent = transport.send(request);

    let result = match timeout {
        Some(timeout) => match tokio::time::timeout(timeout, sent).await {
            Ok(result) => result,
            Err(_) => {
                warn!("Request cancelled after {}ms", timeout.as_millis());
                return Err(ConnectorError::Transport);
            }
        },
        None => sent.await,
    };

    result.map_err(|e| {
        warn!("Transport failed: {:#}", e);
        ConnectorError::Transport
    })
}
