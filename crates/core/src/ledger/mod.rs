//! Double-entry journal assembly and general ledger access.
//!
//! This module implements the posting side of the receivables core:
//! - Accounts and normal balances
//! - Control account roles and resolution
//! - Journal domain types (draft and posted)
//! - The journal assembler (balance invariant, reversals)
//! - The general ledger posting port

pub mod account;
pub mod assembler;
pub mod control;
pub mod error;
pub mod general_ledger;
pub mod types;

#[cfg(test)]
mod assembler_props;

pub use account::{Account, AccountType, NormalBalance};
pub use assembler::JournalAssembler;
pub use control::{ControlAccountResolver, ControlAccountRole};
pub use error::JournalError;
pub use general_ledger::{GeneralLedger, StoreGeneralLedger};
pub use types::{
    DraftJournal, JournalEntry, JournalHeader, JournalLine, JournalLineInput, JournalStatus,
    JournalType, PostedJournal, SourceDocument, SourceDocumentType,
};
