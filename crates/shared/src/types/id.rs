//! Typed IDs for type-safe entity references.
//!
//! Using typed IDs prevents accidentally passing an `InvoiceId` where a
//! `CreditNoteId` is expected, which matters a lot once every query is also
//! scoped by a `TenantId`.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Macro to generate typed ID wrappers.
macro_rules! typed_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Creates a new random ID using UUID v7 (time-ordered).
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Creates an ID from an existing UUID.
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the inner UUID.
            #[must_use]
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

typed_id!(TenantId, "Unique identifier for a tenant (every query is scoped by it).");
typed_id!(UserId, "Unique identifier for an acting user.");
typed_id!(AccountId, "Unique identifier for a general ledger account.");
typed_id!(PeriodId, "Unique identifier for an accounting period.");
typed_id!(JournalEntryId, "Unique identifier for a journal entry.");
typed_id!(CustomerId, "Unique identifier for a customer.");
typed_id!(InvoiceId, "Unique identifier for a customer invoice.");
typed_id!(CreditNoteId, "Unique identifier for a customer credit note.");
typed_id!(RefundId, "Unique identifier for a customer refund.");
typed_id!(ReceiptId, "Unique identifier for a customer receipt.");
typed_id!(BankAccountId, "Unique identifier for a bank account.");
typed_id!(InvoiceCategoryId, "Unique identifier for an invoice category.");
typed_id!(
    DimensionId,
    "Unique identifier for a dimension entity (project, fund, or department)."
);
