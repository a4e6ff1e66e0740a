//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Parsed request (method token, path, body)
//!     → router.rs (exact path lookup, then method lookup)
//!     → Handler(Request) → Response
//!     → or 404 Not Found / 405 Method Not Allowed
//!
//! Route table (at startup):
//!     register handlers → freeze as Arc<Router> → shared read-only
//! ```

pub mod router;

pub use router::{Handler, Router};
