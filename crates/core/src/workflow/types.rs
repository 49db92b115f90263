//! Document status types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Common behaviour of document status enums.
pub trait DocumentStatus: Copy + Eq + fmt::Display + Send + Sync + 'static {
    /// Entity name used in error messages.
    const ENTITY: &'static str;

    /// Every status, in lifecycle order.
    fn all() -> &'static [Self];

    /// The only status from which `self` may be reached by a forward
    /// transition, or `None` for the initial status.
    fn predecessor(self) -> Option<Self>;
}

/// Customer invoice status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvoiceStatus {
    /// Being drafted.
    Draft,
    /// Posted to the ledger (immutable).
    Posted,
}

/// Customer credit note status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CreditNoteStatus {
    /// Being drafted.
    Draft,
    /// Approved, ready to post.
    Approved,
    /// Posted to the ledger.
    Posted,
    /// Voided through a reversing journal.
    Void,
}

/// Customer refund status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RefundStatus {
    /// Being drafted.
    Draft,
    /// Submitted for approval.
    Submitted,
    /// Approved, ready to post.
    Approved,
    /// Posted to the ledger.
    Posted,
    /// Voided through a reversing journal.
    Void,
}

macro_rules! status_strings {
    ($ty:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        impl $ty {
            /// Returns the string representation of the status.
            #[must_use]
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s,)+
                }
            }

            /// Parses a status from a string.
            pub fn parse(s: &str) -> Option<Self> {
                match s.to_uppercase().as_str() {
                    $($s => Some(Self::$variant),)+
                    _ => None,
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

status_strings!(InvoiceStatus { Draft => "DRAFT", Posted => "POSTED" });
status_strings!(CreditNoteStatus {
    Draft => "DRAFT",
    Approved => "APPROVED",
    Posted => "POSTED",
    Void => "VOID",
});
status_strings!(RefundStatus {
    Draft => "DRAFT",
    Submitted => "SUBMITTED",
    Approved => "APPROVED",
    Posted => "POSTED",
    Void => "VOID",
});

impl DocumentStatus for InvoiceStatus {
    const ENTITY: &'static str = "invoice";

    fn all() -> &'static [Self] {
        &[Self::Draft, Self::Posted]
    }

    fn predecessor(self) -> Option<Self> {
        match self {
            Self::Draft => None,
            Self::Posted => Some(Self::Draft),
        }
    }
}

impl DocumentStatus for CreditNoteStatus {
    const ENTITY: &'static str = "credit note";

    fn all() -> &'static [Self] {
        &[Self::Draft, Self::Approved, Self::Posted, Self::Void]
    }

    fn predecessor(self) -> Option<Self> {
        match self {
            Self::Draft => None,
            Self::Approved => Some(Self::Draft),
            Self::Posted => Some(Self::Approved),
            Self::Void => Some(Self::Posted),
        }
    }
}

impl DocumentStatus for RefundStatus {
    const ENTITY: &'static str = "refund";

    fn all() -> &'static [Self] {
        &[Self::Draft, Self::Submitted, Self::Approved, Self::Posted, Self::Void]
    }

    fn predecessor(self) -> Option<Self> {
        match self {
            Self::Draft => None,
            Self::Submitted => Some(Self::Draft),
            Self::Approved => Some(Self::Submitted),
            Self::Posted => Some(Self::Approved),
            Self::Void => Some(Self::Posted),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_round_trip() {
        for s in RefundStatus::all() {
            assert_eq!(RefundStatus::parse(s.as_str()), Some(*s));
        }
        for s in CreditNoteStatus::all() {
            assert_eq!(CreditNoteStatus::parse(s.as_str()), Some(*s));
        }
        assert_eq!(InvoiceStatus::parse("posted"), Some(InvoiceStatus::Posted));
        assert_eq!(InvoiceStatus::parse("VOID"), None);
    }
}
