//! Tenant-scoped document numbering.
//!
//! The counter row is incremented inside the caller's transaction, so a
//! rolled-back document creation also rolls back its number.

use std::fmt;

use receiva_shared::types::TenantId;
use serde::{Deserialize, Serialize};

use crate::error::ReceivablesError;
use crate::store::SequenceStore;

/// Named per-tenant counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SequenceName {
    /// Customer invoice numbers.
    CustomerInvoice,
    /// Customer credit note numbers.
    CustomerCreditNote,
    /// Customer refund numbers.
    CustomerRefund,
}

impl SequenceName {
    /// Returns the stored counter name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CustomerInvoice => "customer_invoice",
            Self::CustomerCreditNote => "customer_credit_note",
            Self::CustomerRefund => "customer_refund",
        }
    }

    /// Parses a counter name.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "customer_invoice" => Some(Self::CustomerInvoice),
            "customer_credit_note" => Some(Self::CustomerCreditNote),
            "customer_refund" => Some(Self::CustomerRefund),
            _ => None,
        }
    }
}

impl fmt::Display for SequenceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Allocates strictly increasing values per (tenant, name).
pub struct SequenceAllocator;

impl SequenceAllocator {
    /// Returns the next value for `name` as a decimal string.
    pub async fn next<S>(
        store: &S,
        tenant_id: TenantId,
        name: SequenceName,
    ) -> Result<String, ReceivablesError>
    where
        S: SequenceStore + ?Sized,
    {
        let value = store.increment(tenant_id, name).await?;
        Ok(value.to_string())
    }
}
