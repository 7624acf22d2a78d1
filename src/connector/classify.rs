//! Turns a raw response into the call outcome.
//!
//! Precedence for failed responses, evaluated once:
//! 1. JSON body whose `error.name` is a known name
//! 2. known status (message from a truthy `error.message`, JSON only, else status text / text body)
//! 3. generic API error with the whole body as payload
//!
//! Text bodies only ever go through 2 and 3.

use log::debug;
use serde_json::Value;

use crate::error::{ConnectorError, ErrorKind, Result};
use crate::http::Response;
use crate::payload::Payload;

/// Resolves a response into its payload or the error it represents.
pub(crate) fn into_outcome(response: Response) -> Result<Payload> {
    if response.is_ok() {
        return unwrap_payload(response);
    }
    Err(classify_error(response))
}

/// Classifies a failed response. Consumes it so the body is read once.
pub(crate) fn classify_error(response: Response) -> ConnectorError {
    let status = response.status().as_u16();
    let status_text = response.status_text().to_string();
    let known = ErrorKind::from_status(status);

    if response.is_json() {
        let body = match response.json() {
            Ok(body) => body,
            Err(e) => return ConnectorError::Decode(e),
        };
        let error = body.get("error");

        if let Some(kind) = error.and_then(error_name).and_then(ErrorKind::from_name) {
            debug!("HTTP {} classified by name as {}", status, kind);
            let message = error
                .and_then(error_message)
                .map(message_text)
                .unwrap_or_default();
            return ConnectorError::http(kind, message);
        }

        return match known {
            Some(kind) => {
                debug!("HTTP {} classified by status as {}", status, kind);
                let message = error
                    .and_then(error_message)
                    .filter(|message| is_truthy(message))
                    .map(message_text)
                    .unwrap_or(status_text);
                ConnectorError::http(kind, message)
            }
            None => ConnectorError::Api {
                status,
                status_text,
                payload: Payload::Json(body),
            },
        };
    }

    let text = response.text();
    match known {
        Some(kind) => {
            debug!("HTTP {} classified by status as {}", status, kind);
            ConnectorError::http(kind, text)
        }
        None => ConnectorError::Api {
            status,
            status_text,
            payload: Payload::Text(text),
        },
    }
}

/// Extracts the payload of a successful response.
///
/// JSON objects unwrap to their `result` field, a bare JSON string is returned
/// as text, anything else is returned verbatim as text.
pub(crate) fn unwrap_payload(response: Response) -> Result<Payload> {
    if !response.is_json() {
        return Ok(Payload::Text(response.text()));
    }

    let payload = match response.json().map_err(ConnectorError::Decode)? {
        Value::String(text) => Payload::Text(text),
        Value::Object(mut object) => Payload::Json(object.remove("result").unwrap_or(Value::Null)),
        _ => Payload::Json(Value::Null),
    };
    Ok(payload)
}

fn error_name(error: &Value) -> Option<&str> {
    error.get("name").and_then(Value::as_str)
}

fn error_message(error: &Value) -> Option<&Value> {
    error.get("message").filter(|message| !message.is_null())
}

/// Strings are used as-is, anything else as its JSON text.
fn message_text(message: &Value) -> String {
    match message {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// `false`, `0` and `""` do not count as a message.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{json_response, text_response};
    use serde_json::json;

    #[test]
    fn test_name_wins_over_status_for_every_kind() {
        for kind in ErrorKind::ALL {
            for status in [400, 418, 500, 503] {
                let response = json_response(
                    status,
                    json!({ "error": { "name": kind.name(), "message": "named" } }),
                );
                let err = classify_error(response);
                assert_eq!(err.kind(), Some(kind), "status {}", status);
                assert_eq!(err.message(), "named");
            }
        }
    }

    #[test]
    fn test_status_lookup_with_error_message() {
        for kind in ErrorKind::ALL {
            let Some(status) = kind.status() else {
                continue;
            };
            let response = json_response(
                status,
                json!({ "status": status, "error": { "message": "Something very bad happened." } }),
            );
            let err = classify_error(response);
            assert_eq!(err.kind(), Some(kind));
            assert_eq!(err.message(), "Something very bad happened.");
        }
    }

    #[test]
    fn test_status_lookup_defaults_to_status_text() {
        for kind in ErrorKind::ALL {
            let Some(status) = kind.status() else {
                continue;
            };
            for body in [
                json!({ "status": status, "error": {} }),
                json!({ "status": status }),
                json!({ "error": { "message": "" } }),
                json!({ "error": { "message": null } }),
            ] {
                let response = json_response(status, body).with_status_text("Server Said So");
                let err = classify_error(response);
                assert_eq!(err.kind(), Some(kind));
                assert_eq!(err.message(), "Server Said So", "status {}", status);
            }
        }
    }

    #[test]
    fn test_status_lookup_stringifies_non_string_message() {
        let response = json_response(400, json!({ "error": { "message": 42 } }));
        assert_eq!(classify_error(response).message(), "42");

        let response = json_response(400, json!({ "error": { "message": ["a", "b"] } }));
        assert_eq!(classify_error(response).message(), r#"["a","b"]"#);

        let response = json_response(400, json!({ "error": { "message": 0 } }));
        assert_eq!(classify_error(response).message(), "Bad Request");

        let response = json_response(400, json!({ "error": { "message": false } }));
        assert_eq!(classify_error(response).message(), "Bad Request");
    }

    #[test]
    fn test_unknown_name_falls_back_to_status() {
        let response = json_response(
            404,
            json!({ "error": { "name": "SOMETHING_ELSE", "message": "gone" } }),
        );
        let err = classify_error(response);
        assert_eq!(err.kind(), Some(ErrorKind::NotFound));
        assert_eq!(err.message(), "gone");
    }

    #[test]
    fn test_name_only_kind() {
        let response = json_response(
            500,
            json!({ "error": { "name": "DATABASE_CONNECTION_ERROR", "message": "db down" } }),
        );
        let err = classify_error(response);
        assert_eq!(err.kind(), Some(ErrorKind::DatabaseConnection));
        assert_eq!(err.message(), "db down");
    }

    #[test]
    fn test_name_match_uses_message_as_is() {
        let response = json_response(409, json!({ "error": { "name": "CONFLICT" } }));
        let err = classify_error(response);
        assert_eq!(err.kind(), Some(ErrorKind::Conflict));
        assert_eq!(err.message(), "");

        let response = json_response(
            409,
            json!({ "error": { "name": "CONFLICT", "message": "" } }),
        );
        assert_eq!(classify_error(response).message(), "");

        let response = json_response(
            418,
            json!({ "error": { "name": "CONFLICT", "message": 42 } }),
        );
        let err = classify_error(response);
        assert_eq!(err.kind(), Some(ErrorKind::Conflict));
        assert_eq!(err.message(), "42");
    }

    #[test]
    fn test_scenario_internal_server_error_by_name() {
        let response = json_response(
            500,
            json!({
                "status": 500,
                "error": { "name": "INTERNAL_SERVER_ERROR", "message": "Something very bad happened." }
            }),
        );
        let err = classify_error(response);
        assert_eq!(err.kind(), Some(ErrorKind::InternalServerError));
        assert_eq!(err.to_string(), "Something very bad happened.");
    }

    #[test]
    fn test_unknown_status_json_is_generic() {
        let response = json_response(418, json!({})).with_status_text("I'm a teapot.");
        match classify_error(response) {
            ConnectorError::Api {
                status,
                status_text,
                payload,
            } => {
                assert_eq!(status, 418);
                assert_eq!(status_text, "I'm a teapot.");
                assert_eq!(payload, Payload::Json(json!({})));
            }
            other => panic!("Expected generic API error, got {:?}", other),
        }
    }

    #[test]
    fn test_text_known_status_uses_body_as_message() {
        for kind in ErrorKind::ALL {
            let Some(status) = kind.status() else {
                continue;
            };
            let response = text_response(status, "error response");
            let err = classify_error(response);
            assert_eq!(err.kind(), Some(kind), "status {}", status);
            assert_eq!(err.message(), "error response");
        }
    }

    #[test]
    fn test_text_unknown_status_is_generic() {
        let response = text_response(418, "error response").with_status_text("I'm a teapot.");
        match classify_error(response) {
            ConnectorError::Api {
                status,
                status_text,
                payload,
            } => {
                assert_eq!(status, 418);
                assert_eq!(status_text, "I'm a teapot.");
                assert_eq!(payload, Payload::Text("error response".to_string()));
            }
            other => panic!("Expected generic API error, got {:?}", other),
        }
    }

    #[test]
    fn test_text_body_never_classified_by_name() {
        let response = text_response(
            404,
            r#"{"error":{"name":"INTERNAL_SERVER_ERROR","message":"x"}}"#,
        );
        let err = classify_error(response);
        assert_eq!(err.kind(), Some(ErrorKind::NotFound));
    }

    #[test]
    fn test_malformed_json_error_body() {
        let response = text_response(500, "{not json");
        assert_eq!(
            classify_error(response).kind(),
            Some(ErrorKind::InternalServerError)
        );

        let response = Response::with_content_type(
            reqwest::StatusCode::INTERNAL_SERVER_ERROR,
            "application/json",
            "{not json",
        );
        assert!(matches!(
            classify_error(response),
            ConnectorError::Decode(_)
        ));
    }

    #[test]
    fn test_unwrap_result_field() {
        let response = json_response(200, json!({ "result": { "mocked": "response" } }));
        assert_eq!(
            into_outcome(response).unwrap(),
            Payload::Json(json!({ "mocked": "response" }))
        );
    }

    #[test]
    fn test_unwrap_bare_json_string() {
        let response = json_response(200, json!("just a string"));
        assert_eq!(
            into_outcome(response).unwrap(),
            Payload::Text("just a string".to_string())
        );
    }

    #[test]
    fn test_unwrap_object_without_result_is_null() {
        let response = json_response(200, json!({ "data": 1 }));
        assert_eq!(into_outcome(response).unwrap(), Payload::Json(Value::Null));

        let response = json_response(200, json!([1, 2, 3]));
        assert_eq!(into_outcome(response).unwrap(), Payload::Json(Value::Null));
    }

    #[test]
    fn test_unwrap_text_verbatim() {
        let response = text_response(200, "  text response\n");
        assert_eq!(
            into_outcome(response).unwrap(),
            Payload::Text("  text response\n".to_string())
        );
    }

    #[test]
    fn test_success_is_never_classified() {
        let response = json_response(
            201,
            json!({ "result": 1, "error": { "name": "NOT_FOUND" } }),
        );
        assert_eq!(into_outcome(response).unwrap(), Payload::Json(json!(1)));
    }
}
