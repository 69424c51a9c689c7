//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → client_ip.rs (who is asking)
//!     → rate_limit.rs (fixed-window budget per client and path)
//!     → handler
//!         → cors.rs (public widget routes: which origin may read the reply)
//!         → login_guard.rs + credentials.rs (sign-in route)
//! ```
//!
//! # Design Decisions
//! - Throttle and lockout outcomes are values; callers branch on them
//! - Counters live in process memory behind traits, one node's view only
//! - Clients without an address share one "unknown" budget

pub mod client_ip;
pub mod cors;
pub mod credentials;
pub mod login_guard;
pub mod rate_limit;
