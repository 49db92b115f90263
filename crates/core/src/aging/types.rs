//! Aging report types.

use std::fmt;

use chrono::NaiveDate;
use receiva_shared::types::{CustomerId, InvoiceId, round_money};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Days-past-due bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AgingBucket {
    /// Not yet due.
    #[serde(rename = "CURRENT")]
    Current,
    /// 0 to 30 days past due.
    #[serde(rename = "0_30")]
    Days0To30,
    /// 31 to 60 days past due.
    #[serde(rename = "31_60")]
    Days31To60,
    /// 61 to 90 days past due.
    #[serde(rename = "61_90")]
    Days61To90,
    /// More than 90 days past due.
    #[serde(rename = "90_PLUS")]
    Days90Plus,
}

impl AgingBucket {
    /// All buckets in column order.
    pub const ALL: [Self; 5] = [
        Self::Current,
        Self::Days0To30,
        Self::Days31To60,
        Self::Days61To90,
        Self::Days90Plus,
    ];

    /// Returns the column label.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Current => "CURRENT",
            Self::Days0To30 => "0_30",
            Self::Days31To60 => "31_60",
            Self::Days61To90 => "61_90",
            Self::Days90Plus => "90_PLUS",
        }
    }
}

impl fmt::Display for AgingBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bucket columns plus their total.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgingBuckets {
    /// Not yet due.
    pub current: Decimal,
    /// 0 to 30 days past due.
    pub days_0_30: Decimal,
    /// 31 to 60 days past due.
    pub days_31_60: Decimal,
    /// 61 to 90 days past due.
    pub days_61_90: Decimal,
    /// More than 90 days past due.
    pub days_90_plus: Decimal,
    /// Sum of all columns.
    pub total: Decimal,
}

impl AgingBuckets {
    /// Adds `amount` to `bucket` and to the total, rounding both.
    pub fn add(&mut self, bucket: AgingBucket, amount: Decimal) {
        let column = self.column_mut(bucket);
        *column = round_money(*column + amount);
        self.total = round_money(self.total + amount);
    }

    /// Adds every column of `other`.
    pub fn merge(&mut self, other: &Self) {
        for bucket in AgingBucket::ALL {
            self.add(bucket, other.get(bucket));
        }
    }

    /// Amount in `bucket`.
    #[must_use]
    pub fn get(&self, bucket: AgingBucket) -> Decimal {
        match bucket {
            AgingBucket::Current => self.current,
            AgingBucket::Days0To30 => self.days_0_30,
            AgingBucket::Days31To60 => self.days_31_60,
            AgingBucket::Days61To90 => self.days_61_90,
            AgingBucket::Days90Plus => self.days_90_plus,
        }
    }

    fn column_mut(&mut self, bucket: AgingBucket) -> &mut Decimal {
        match bucket {
            AgingBucket::Current => &mut self.current,
            AgingBucket::Days0To30 => &mut self.days_0_30,
            AgingBucket::Days31To60 => &mut self.days_31_60,
            AgingBucket::Days61To90 => &mut self.days_61_90,
            AgingBucket::Days90Plus => &mut self.days_90_plus,
        }
    }
}

/// An invoice with a positive outstanding balance, ready to be bucketed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgedInvoice {
    /// Invoice.
    pub invoice_id: InvoiceId,
    /// Customer.
    pub customer_id: CustomerId,
    /// Customer display name, used for ordering.
    pub customer_name: String,
    /// Due date.
    pub due_date: NaiveDate,
    /// Outstanding balance as of the report date.
    pub outstanding: Decimal,
}

/// One customer's aged balances.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgingRow {
    /// Customer.
    pub customer_id: CustomerId,
    /// Customer display name.
    pub customer_name: String,
    /// Bucketed balances.
    pub buckets: AgingBuckets,
}

/// Aging report as of a date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgingReport {
    /// Report date.
    pub as_of: NaiveDate,
    /// Rows sorted by customer name.
    pub rows: Vec<AgingRow>,
    /// Column-wise sum of all rows.
    pub total: AgingBuckets,
}
