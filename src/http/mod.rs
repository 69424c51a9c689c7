//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (request id, trace span, timeout)
//!     → security::rate_limit (per-route-group throttle preset)
//!     → public.rs / auth.rs / admin (handlers)
//!     → response.rs, error.rs (429s and JSON errors)
//! ```

pub mod auth;
pub mod error;
pub mod public;
pub mod request;
pub mod response;
pub mod server;

pub use error::ApiError;
pub use request::{MakeRequestUuid, MakeSpanWithRequestId, X_REQUEST_ID};
pub use server::{AppState, HttpServer};
