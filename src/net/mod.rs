//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming TCP connection
//!     → listener.rs (bind with reuse + backlog, accept, optional limit)
//!     → connection.rs (id, state machine, live-connection tracking)
//!     → Hand off to HTTP layer
//!
//! Connection States:
//!     Accepted → HeadersRead → (Continue) → BodyReading → Dispatching → ResponseSent → Closed
//! ```
//!
//! # Design Decisions
//! - One task per accepted connection; unbounded unless `max_connections` is set
//! - Each connection tracked so shutdown can drain in-flight work
//! - No keep-alive: a connection carries exactly one request

pub mod connection;
pub mod listener;

pub use connection::{ConnectionId, ConnectionLifecycle, ConnectionState, ConnectionTracker};
pub use listener::{Listener, ListenerError};
