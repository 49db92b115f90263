//! Journal entries and lines.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use receiva_core::ledger::{JournalEntry, JournalStatus};
use receiva_core::store::{JournalStore, StoreError, StoreResult};
use receiva_shared::types::{JournalEntryId, TenantId, UserId};
use sea_orm::sea_query::Expr;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder};

use super::{SeaLedgerTransaction, convert, db_err};
use crate::entities::{journal_entries, journal_lines};

#[async_trait]
impl JournalStore for SeaLedgerTransaction {
    async fn insert_journal(&self, entry: &JournalEntry) -> StoreResult<()> {
        convert::journal_active_model(entry)
            .insert(self.conn())
            .await
            .map_err(db_err)?;

        let lines = convert::journal_line_active_models(entry)?;
        if !lines.is_empty() {
            journal_lines::Entity::insert_many(lines)
                .exec_without_returning(self.conn())
                .await
                .map_err(db_err)?;
        }
        Ok(())
    }

    async fn find_journal(&self, tenant_id: TenantId, id: JournalEntryId) -> StoreResult<Option<JournalEntry>> {
        let Some(header) = journal_entries::Entity::find_by_id(id.into_inner())
            .filter(journal_entries::Column::TenantId.eq(tenant_id.into_inner()))
            .one(self.conn())
            .await
            .map_err(db_err)?
        else {
            return Ok(None);
        };

        let lines = journal_lines::Entity::find()
            .filter(journal_lines::Column::JournalEntryId.eq(header.id))
            .order_by_asc(journal_lines::Column::LineNumber)
            .all(self.conn())
            .await
            .map_err(db_err)?;
        convert::journal(header, lines).map(Some)
    }

    async fn mark_journal_posted(
        &self,
        tenant_id: TenantId,
        id: JournalEntryId,
        posted_by: UserId,
        posted_at: DateTime<Utc>,
    ) -> StoreResult<()> {
        let result = journal_entries::Entity::update_many()
            .col_expr(
                journal_entries::Column::Status,
                Expr::value(JournalStatus::Posted.as_str()),
            )
            .col_expr(journal_entries::Column::PostedBy, Expr::value(posted_by.into_inner()))
            .col_expr(journal_entries::Column::PostedAt, Expr::value(posted_at))
            .filter(journal_entries::Column::Id.eq(id.into_inner()))
            .filter(journal_entries::Column::TenantId.eq(tenant_id.into_inner()))
            .filter(journal_entries::Column::Status.eq(JournalStatus::Reviewed.as_str()))
            .exec(self.conn())
            .await
            .map_err(db_err)?;

        if result.rows_affected == 0 {
            let current = journal_entries::Entity::find_by_id(id.into_inner())
                .filter(journal_entries::Column::TenantId.eq(tenant_id.into_inner()))
                .one(self.conn())
                .await
                .map_err(db_err)?;
            return match current {
                Some(current) => Err(StoreError::Conflict(format!(
                    "journal {id} is {}",
                    current.status
                ))),
                None => Err(StoreError::NotFound {
                    entity: "journal",
                    id: id.into_inner(),
                }),
            };
        }
        Ok(())
    }
}
