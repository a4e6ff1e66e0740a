//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! Accepted TCP connection
//!     → server.rs (read head bytes, drive the connection state machine)
//!     → parser.rs (request line + control headers)
//!     → body.rs (fixed-length or chunked body)
//!     → [routing layer picks the handler]
//!     → response.rs (serialize)
//!     → Send to client, close
//! ```

pub mod body;
pub mod error;
pub mod parser;
pub mod request;
pub mod response;
pub mod server;

pub use error::HttpError;
pub use request::{Method, Request};
pub use response::Response;
pub use server::{serve_connection, ConnectionOutcome, HttpServer};
