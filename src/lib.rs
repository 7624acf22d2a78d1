//! api-connectors - per-verb HTTP connectors with a fixed error taxonomy.
//!
//! A connector is built once from a [`ConnectorConfig`] (transport, base
//! address, route generator, optional header generator and call options) and
//! performs exactly one request per call. Each call resolves to a [`Payload`]
//! or exactly one [`ConnectorError`].

pub mod connector;
pub mod error;
pub mod http;
pub mod payload;

pub use connector::{
    BinaryConnector, CallOptions, Connector, ConnectorConfig, create_delete_connector,
    create_get_connector, create_patch_connector, create_post_binary_connector,
    create_post_connector, create_put_connector,
};
pub use error::{ConnectorError, ErrorKind, Result, TRANSPORT_ERROR_MESSAGE};
pub use http::{HttpTransport, Request, RequestBody, Response, Transport};
pub use payload::Payload;
