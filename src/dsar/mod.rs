//! Data subject access requests.
//!
//! # Data Flow
//! ```text
//! public form → book.rs (validate, stamp created_at/due_date, store)
//! admin read  → book.rs → deadline.rs (is_overdue, days_remaining at read time)
//! ```
//!
//! Deadline state is never stored; it is derived from `due_date`, `status` and
//! the current time whenever a request is displayed.

pub mod book;
pub mod deadline;
pub mod types;

pub use book::{DsarBook, DsarError, DsarSummary, DsarView};
pub use deadline::{calculate_due_date, days_remaining, is_overdue, DeadlineView};
pub use types::{DsarRecord, DsarRequestType, DsarStatus, NewDsar};
