//! General ledger posting port.

use async_trait::async_trait;
use chrono::Utc;
use receiva_shared::types::{JournalEntryId, TenantId, UserId};

use super::error::JournalError;
use super::types::{JournalStatus, PostedJournal};
use crate::error::ReceivablesError;
use crate::store::JournalStore;

/// The posting primitive: accepts a reviewed, balanced journal and marks it
/// POSTED with a poster identity and timestamp.
///
/// The receivables core never sets POSTED on a journal itself.
#[async_trait]
pub trait GeneralLedger: Send + Sync {
    /// Posts the journal `journal_id`, using `journals` (the caller's open
    /// transaction) so the posting commits or rolls back with the document.
    async fn post_journal(
        &self,
        journals: &dyn JournalStore,
        tenant_id: TenantId,
        journal_id: JournalEntryId,
        posted_by: UserId,
    ) -> Result<PostedJournal, ReceivablesError>;
}

/// General ledger adapter backed by the journal store.
#[derive(Debug, Clone, Copy, Default)]
pub struct StoreGeneralLedger;

#[async_trait]
impl GeneralLedger for StoreGeneralLedger {
    async fn post_journal(
        &self,
        journals: &dyn JournalStore,
        tenant_id: TenantId,
        journal_id: JournalEntryId,
        posted_by: UserId,
    ) -> Result<PostedJournal, ReceivablesError> {
        let mut entry = journals
            .find_journal(tenant_id, journal_id)
            .await?
            .ok_or_else(|| ReceivablesError::not_found("journal", journal_id))?;

        if entry.status != JournalStatus::Reviewed {
            return Err(JournalError::UnexpectedStatus {
                id: entry.id,
                status: entry.status,
                expected: JournalStatus::Reviewed,
            }
            .into());
        }
        if !entry.is_balanced() {
            return Err(ReceivablesError::UnbalancedJournal {
                debit: entry.total_debit(),
                credit: entry.total_credit(),
            });
        }

        let posted_at = Utc::now();
        journals
            .mark_journal_posted(tenant_id, journal_id, posted_by, posted_at)
            .await?;

        entry.status = JournalStatus::Posted;
        entry.posted_by = Some(posted_by);
        entry.posted_at = Some(posted_at);

        tracing::debug!(
            tenant_id = %tenant_id,
            journal_id = %journal_id,
            lines = entry.lines.len(),
            "Journal posted"
        );

        Ok(PostedJournal::new(entry))
    }
}
