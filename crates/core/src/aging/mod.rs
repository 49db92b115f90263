//! Receivables aging.
//!
//! A read-only, point-in-time view of outstanding invoice balances grouped
//! by customer and bucketed by days past due.

pub mod engine;
pub mod service;
pub mod types;

#[cfg(test)]
mod engine_props;

pub use engine::AgingEngine;
pub use service::AgingService;
pub use types::{AgedInvoice, AgingBucket, AgingBuckets, AgingReport, AgingRow};
