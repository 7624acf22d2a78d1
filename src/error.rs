//! Error taxonomy for connector calls.
//!
//! Every call resolves to exactly one outcome. Failures are one of:
//! - a transport failure (the request never produced a response),
//! - one of the named HTTP error kinds in [`ErrorKind`],
//! - the generic API error carrying status, status text and the raw payload.

use std::fmt;

use crate::payload::Payload;

/// Fixed message for every transport-level failure, timeouts included.
pub const TRANSPORT_ERROR_MESSAGE: &str = "Failed to fetch: CORS error. Please contact support.";

/// Named HTTP error kinds a response can be classified as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// HTTP 400
    Validation,
    /// HTTP 401
    Authentication,
    /// HTTP 403
    Authorization,
    /// HTTP 404
    NotFound,
    /// HTTP 405
    MethodNotAllowed,
    /// HTTP 409
    Conflict,
    /// HTTP 413
    PayloadTooLarge,
    /// HTTP 429
    TooManyRequests,
    /// HTTP 500
    InternalServerError,
    /// Only reachable by name; no status maps to it.
    DatabaseConnection,
    /// HTTP 501
    NotImplemented,
    /// HTTP 502
    BadGateway,
    /// HTTP 503
    ServiceUnavailable,
    /// HTTP 504
    GatewayTimeout,
}

impl ErrorKind {
    pub const ALL: [ErrorKind; 14] = [
        ErrorKind::Validation,
        ErrorKind::Authentication,
        ErrorKind::Authorization,
        ErrorKind::NotFound,
        ErrorKind::MethodNotAllowed,
        ErrorKind::Conflict,
        ErrorKind::PayloadTooLarge,
        ErrorKind::TooManyRequests,
        ErrorKind::InternalServerError,
        ErrorKind::DatabaseConnection,
        ErrorKind::NotImplemented,
        ErrorKind::BadGateway,
        ErrorKind::ServiceUnavailable,
        ErrorKind::GatewayTimeout,
    ];

    /// Looks up a kind by the symbolic name a server sends in `error.name`.
    pub fn from_name(name: &str) -> Option<Self> {
        let kind = match name {
            "VALIDATION_ERROR" => ErrorKind::Validation,
            "AUTHENTICATION_ERROR" => ErrorKind::Authentication,
            "AUTHORIZATION_ERROR" => ErrorKind::Authorization,
            "NOT_FOUND" => ErrorKind::NotFound,
            "METHOD_NOT_ALLOWED" => ErrorKind::MethodNotAllowed,
            "CONFLICT" => ErrorKind::Conflict,
            "PAYLOAD_TOO_LARGE" => ErrorKind::PayloadTooLarge,
            "TOO_MANY_REQUESTS" => ErrorKind::TooManyRequests,
            "INTERNAL_SERVER_ERROR" => ErrorKind::InternalServerError,
            "DATABASE_CONNECTION_ERROR" => ErrorKind::DatabaseConnection,
            "NOT_IMPLEMENTED" => ErrorKind::NotImplemented,
            "BAD_GATEWAY" => ErrorKind::BadGateway,
            "SERVICE_UNAVAILABLE" => ErrorKind::ServiceUnavailable,
            "GATEWAY_TIMEOUT" => ErrorKind::GatewayTimeout,
            _ => return None,
        };
        Some(kind)
    }

    /// Looks up a kind by numeric HTTP status.
    pub fn from_status(status: u16) -> Option<Self> {
        let kind = match status {
            400 => ErrorKind::Validation,
            401 => ErrorKind::Authentication,
            403 => ErrorKind::Authorization,
            404 => ErrorKind::NotFound,
            405 => ErrorKind::MethodNotAllowed,
            409 => ErrorKind::Conflict,
            413 => ErrorKind::PayloadTooLarge,
            429 => ErrorKind::TooManyRequests,
            500 => ErrorKind::InternalServerError,
            501 => ErrorKind::NotImplemented,
            502 => ErrorKind::BadGateway,
            503 => ErrorKind::ServiceUnavailable,
            504 => ErrorKind::GatewayTimeout,
            _ => return None,
        };
        Some(kind)
    }

    pub fn name(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "VALIDATION_ERROR",
            ErrorKind::Authentication => "AUTHENTICATION_ERROR",
            ErrorKind::Authorization => "AUTHORIZATION_ERROR",
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::MethodNotAllowed => "METHOD_NOT_ALLOWED",
            ErrorKind::Conflict => "CONFLICT",
            ErrorKind::PayloadTooLarge => "PAYLOAD_TOO_LARGE",
            ErrorKind::TooManyRequests => "TOO_MANY_REQUESTS",
            ErrorKind::InternalServerError => "INTERNAL_SERVER_ERROR",
            ErrorKind::DatabaseConnection => "DATABASE_CONNECTION_ERROR",
            ErrorKind::NotImplemented => "NOT_IMPLEMENTED",
            ErrorKind::BadGateway => "BAD_GATEWAY",
            ErrorKind::ServiceUnavailable => "SERVICE_UNAVAILABLE",
            ErrorKind::GatewayTimeout => "GATEWAY_TIMEOUT",
        }
    }

    /// The status this kind is keyed by, `None` for name-only kinds.
    pub fn status(&self) -> Option<u16> {
        match self {
            ErrorKind::Validation => Some(400),
            ErrorKind::Authentication => Some(401),
            ErrorKind::Authorization => Some(403),
            ErrorKind::NotFound => Some(404),
            ErrorKind::MethodNotAllowed => Some(405),
            ErrorKind::Conflict => Some(409),
            ErrorKind::PayloadTooLarge => Some(413),
            ErrorKind::TooManyRequests => Some(429),
            ErrorKind::InternalServerError => Some(500),
            ErrorKind::DatabaseConnection => None,
            ErrorKind::NotImplemented => Some(501),
            ErrorKind::BadGateway => Some(502),
            ErrorKind::ServiceUnavailable => Some(503),
            ErrorKind::GatewayTimeout => Some(504),
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The single failure a connector call can reject with.
#[derive(Debug, thiserror::Error)]
pub enum ConnectorError {
    /// The transport threw or was cancelled by the call timeout.
    #[error("{}", TRANSPORT_ERROR_MESSAGE)]
    Transport,

    /// A response classified as one of the named kinds.
    #[error("{message}")]
    Http { kind: ErrorKind, message: String },

    /// A response with a status that is not in the lookup table.
    #[error("API error {status}: {status_text}")]
    Api {
        status: u16,
        status_text: String,
        payload: Payload,
    },

    /// The body or query could not be serialized; the transport was not called.
    #[error("Failed to encode request: {0}")]
    Encode(#[source] serde_json::Error),

    /// The response declared JSON but its body did not parse.
    #[error("Failed to decode JSON response: {0}")]
    Decode(#[source] serde_json::Error),
}

impl ConnectorError {
    pub fn http(kind: ErrorKind, message: impl Into<String>) -> Self {
        ConnectorError::Http {
            kind,
            message: message.into(),
        }
    }

    /// The named kind, if this is a classified HTTP error.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            ConnectorError::Http { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// Status carried by the generic API error.
    pub fn status(&self) -> Option<u16> {
        match self {
            ConnectorError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn message(&self) -> String {
        match self {
            ConnectorError::Http { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    /// Raw response payload carried by the generic API error.
    pub fn payload(&self) -> Option<&Payload> {
        match self {
            ConnectorError::Api { payload, .. } => Some(payload),
            _ => None,
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, ConnectorError::Transport)
    }
}

pub type Result<T, E = ConnectorError> = std::result::Result<T, E>;
