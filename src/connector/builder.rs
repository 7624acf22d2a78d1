use reqwest::Method;
use reqwest::header::{CONTENT_TYPE, HeaderValue};
use serde_json::Value;

use super::ConnectorConfig;
use super::query::encode_query;
use crate::http::{Request, RequestBody};

/// Assembles the request for one call.
///
/// The route is appended to the base address verbatim. Generated headers are
/// never overridden: the JSON content type is only added when absent, and
/// never for multipart bodies.
pub(crate) fn build_request<P>(
    config: &ConnectorConfig<P>,
    method: Method,
    params: &P,
    query: Option<&Value>,
    body: RequestBody,
) -> Request {
    let mut url = format!("{}{}", config.api_url, (config.route)(params));

    if let Some(query) = query {
        let query_string = encode_query(query);
        if !query_string.is_empty() {
            url.push('?');
            url.push_str(&query_string);
        }
    }

    let mut headers = config
        .headers
        .as_ref()
        .map(|generate| generate(params))
        .unwrap_or_default();

    let is_multipart = matches!(body, RequestBody::Multipart { .. });
    if !is_multipart && !headers.contains_key(CONTENT_TYPE) {
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    }

    Request::new(method, url)
        .with_headers(headers)
        .with_body(body)
        .with_timeout(config.options.timeout)
}
