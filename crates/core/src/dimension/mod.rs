//! Analytical dimensions (project, fund, department) tagged onto documents
//! and journal lines.

use std::fmt;

use chrono::NaiveDate;
use receiva_shared::types::{DimensionId, TenantId};
use serde::{Deserialize, Serialize};

use crate::error::ReceivablesError;

/// The kind of analytical dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DimensionKind {
    /// Project dimension.
    Project,
    /// Fund dimension.
    Fund,
    /// Department dimension.
    Department,
}

impl DimensionKind {
    /// All dimension kinds in tag order.
    pub const ALL: [Self; 3] = [Self::Project, Self::Fund, Self::Department];

    /// Returns the string representation of the kind.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Project => "PROJECT",
            Self::Fund => "FUND",
            Self::Department => "DEPARTMENT",
        }
    }

    /// Parses a kind from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "PROJECT" => Some(Self::Project),
            "FUND" => Some(Self::Fund),
            "DEPARTMENT" => Some(Self::Department),
            _ => None,
        }
    }
}

impl fmt::Display for DimensionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Optional dimension tags carried by a document or journal line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionTags {
    /// Project tag.
    pub project_id: Option<DimensionId>,
    /// Fund tag.
    pub fund_id: Option<DimensionId>,
    /// Department tag.
    pub department_id: Option<DimensionId>,
}

impl DimensionTags {
    /// Creates an empty tag set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the project tag.
    #[must_use]
    pub const fn with_project(mut self, id: DimensionId) -> Self {
        self.project_id = Some(id);
        self
    }

    /// Sets the fund tag.
    #[must_use]
    pub const fn with_fund(mut self, id: DimensionId) -> Self {
        self.fund_id = Some(id);
        self
    }

    /// Sets the department tag.
    #[must_use]
    pub const fn with_department(mut self, id: DimensionId) -> Self {
        self.department_id = Some(id);
        self
    }

    /// Returns the tag for the given kind.
    #[must_use]
    pub const fn get(&self, kind: DimensionKind) -> Option<DimensionId> {
        match kind {
            DimensionKind::Project => self.project_id,
            DimensionKind::Fund => self.fund_id,
            DimensionKind::Department => self.department_id,
        }
    }

    /// Iterates over the tags that are set.
    pub fn iter(&self) -> impl Iterator<Item = (DimensionKind, DimensionId)> + '_ {
        DimensionKind::ALL
            .into_iter()
            .filter_map(|kind| self.get(kind).map(|id| (kind, id)))
    }

    /// Returns true if no tag is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }
}

/// A dimension master-data record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionRecord {
    /// Unique identifier.
    pub id: DimensionId,
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Which dimension this record belongs to.
    pub kind: DimensionKind,
    /// Short code.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Inactive dimensions cannot be tagged.
    pub is_active: bool,
    /// First day the dimension may be used, if bounded.
    pub effective_from: Option<NaiveDate>,
    /// Last day the dimension may be used, if bounded.
    pub effective_to: Option<NaiveDate>,
}

impl DimensionRecord {
    /// Returns true if the record is active and effective on `date`.
    #[must_use]
    pub fn is_effective_on(&self, date: NaiveDate) -> bool {
        self.is_active
            && self.effective_from.is_none_or(|from| date >= from)
            && self.effective_to.is_none_or(|to| date <= to)
    }
}

/// Validates dimension tags against category requirements and master data.
///
/// `lookup` resolves a tag to its record for the current tenant.
pub fn validate_dimensions<F>(
    tags: &DimensionTags,
    required: &[DimensionKind],
    date: NaiveDate,
    lookup: F,
) -> Result<(), ReceivablesError>
where
    F: Fn(DimensionKind, DimensionId) -> Option<DimensionRecord>,
{
    for kind in required {
        if tags.get(*kind).is_none() {
            return Err(ReceivablesError::ValidationFailed(format!(
                "{kind} dimension is required by the invoice category"
            )));
        }
    }

    for (kind, id) in tags.iter() {
        let record = lookup(kind, id).ok_or(ReceivablesError::NotFound {
            entity: "dimension",
            id: id.into_inner(),
        })?;
        if record.kind != kind {
            return Err(ReceivablesError::ValidationFailed(format!(
                "Dimension {} is a {}, not a {kind}",
                record.code, record.kind
            )));
        }
        if !record.is_effective_on(date) {
            return Err(ReceivablesError::ValidationFailed(format!(
                "{kind} {} is not active on {date}",
                record.code
            )));
        }
    }

    Ok(())
}
