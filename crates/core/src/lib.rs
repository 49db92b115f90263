//! Core business logic for Receiva.
//!
//! This crate holds the accounts receivable posting core with ZERO web or
//! database dependencies. Persistence is reached through the repository
//! traits in [`store`]; an in-memory implementation ships for tests.
//!
//! # Modules
//!
//! - `receivables` - Invoice, credit note, and refund lifecycles
//! - `ledger` - Journal assembly, control accounts, GL posting port
//! - `fiscal` - Accounting period guard
//! - `sequence` - Gap-free document numbering
//! - `aging` - Bucketed outstanding balances
//! - `dimension` - Dimension tags and validation
//! - `workflow` - Document status transitions
//! - `audit` - Transition audit events
//! - `store` - Repository traits and the in-memory store

pub mod aging;
pub mod audit;
pub mod dimension;
pub mod error;
pub mod fiscal;
pub mod ledger;
pub mod receivables;
pub mod sequence;
pub mod store;
pub mod workflow;

pub use aging::{AgingReport, AgingService};
pub use error::{ReceivablesError, ReceivablesResult};
pub use receivables::ReceivablesService;
pub use store::{LedgerDatabase, LedgerTransaction, MemoryLedger};
