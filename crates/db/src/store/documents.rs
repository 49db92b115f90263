//! Invoices, receipt applications, credit notes, and refunds.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use receiva_core::receivables::{CustomerCreditNote, CustomerInvoice, CustomerRefund};
use receiva_core::store::{
    CreditNoteStore, InvoiceStore, ReceiptStore, RefundStore, StoreError, StoreResult,
};
use receiva_core::workflow::{CreditNoteStatus, InvoiceStatus, RefundStatus};
use receiva_shared::types::{
    CreditNoteId, CustomerId, InvoiceId, JournalEntryId, RefundId, TenantId, UserId, round_money,
};
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseTransaction, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Select,
};

use super::{SeaLedgerTransaction, convert, db_err};
use crate::entities::{
    customer_credit_note_lines, customer_credit_notes, customer_invoices, customer_refunds,
    receipt_applications,
};

/// Sums `column` over the rows `query` selects, rounded to cents.
async fn sum_column<E: EntityTrait>(
    conn: &DatabaseTransaction,
    query: Select<E>,
    column: E::Column,
) -> StoreResult<Decimal> {
    let total: Option<Option<Decimal>> = query
        .select_only()
        .column_as(Expr::col(column).sum(), "total")
        .into_tuple()
        .one(conn)
        .await
        .map_err(db_err)?;
    Ok(round_money(total.flatten().unwrap_or_default()))
}

fn not_found(entity: &'static str, id: impl Into<uuid::Uuid>) -> StoreError {
    StoreError::NotFound {
        entity,
        id: id.into(),
    }
}

// ============================================================================
// Invoices
// ============================================================================

impl SeaLedgerTransaction {
    fn invoice_query(tenant_id: TenantId, id: InvoiceId) -> Select<customer_invoices::Entity> {
        customer_invoices::Entity::find_by_id(id.into_inner())
            .filter(customer_invoices::Column::TenantId.eq(tenant_id.into_inner()))
    }

    fn credit_note_query(
        tenant_id: TenantId,
        id: CreditNoteId,
    ) -> Select<customer_credit_notes::Entity> {
        customer_credit_notes::Entity::find_by_id(id.into_inner())
            .filter(customer_credit_notes::Column::TenantId.eq(tenant_id.into_inner()))
    }

    fn refund_query(tenant_id: TenantId, id: RefundId) -> Select<customer_refunds::Entity> {
        customer_refunds::Entity::find_by_id(id.into_inner())
            .filter(customer_refunds::Column::TenantId.eq(tenant_id.into_inner()))
    }

    async fn credit_note_with_lines(
        &self,
        header: Option<customer_credit_notes::Model>,
    ) -> StoreResult<Option<CustomerCreditNote>> {
        let Some(header) = header else {
            return Ok(None);
        };
        let lines = customer_credit_note_lines::Entity::find()
            .filter(customer_credit_note_lines::Column::CreditNoteId.eq(header.id))
            .order_by_asc(customer_credit_note_lines::Column::LineNumber)
            .all(self.conn())
            .await
            .map_err(db_err)?;
        convert::credit_note(header, lines).map(Some)
    }
}

#[async_trait]
impl InvoiceStore for SeaLedgerTransaction {
    async fn find_invoice(&self, tenant_id: TenantId, id: InvoiceId) -> StoreResult<Option<CustomerInvoice>> {
        Self::invoice_query(tenant_id, id)
            .one(self.conn())
            .await
            .map_err(db_err)?
            .map(convert::invoice)
            .transpose()
    }

    async fn lock_invoice(&self, tenant_id: TenantId, id: InvoiceId) -> StoreResult<Option<CustomerInvoice>> {
        Self::invoice_query(tenant_id, id)
            .lock_exclusive()
            .one(self.conn())
            .await
            .map_err(db_err)?
            .map(convert::invoice)
            .transpose()
    }

    async fn insert_invoice(&self, invoice: &CustomerInvoice) -> StoreResult<()> {
        convert::invoice_active_model(invoice, Utc::now())
            .insert(self.conn())
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn mark_invoice_posted(
        &self,
        tenant_id: TenantId,
        id: InvoiceId,
        journal_entry_id: JournalEntryId,
        posted_by: UserId,
        posted_at: DateTime<Utc>,
    ) -> StoreResult<()> {
        let result = customer_invoices::Entity::update_many()
            .col_expr(
                customer_invoices::Column::Status,
                Expr::value(InvoiceStatus::Posted.as_str()),
            )
            .col_expr(
                customer_invoices::Column::JournalEntryId,
                Expr::value(journal_entry_id.into_inner()),
            )
            .col_expr(customer_invoices::Column::PostedBy, Expr::value(posted_by.into_inner()))
            .col_expr(customer_invoices::Column::PostedAt, Expr::value(posted_at))
            .col_expr(customer_invoices::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(customer_invoices::Column::Id.eq(id.into_inner()))
            .filter(customer_invoices::Column::TenantId.eq(tenant_id.into_inner()))
            .filter(customer_invoices::Column::Status.eq(InvoiceStatus::Draft.as_str()))
            .exec(self.conn())
            .await
            .map_err(db_err)?;

        if result.rows_affected == 0 {
            return match self.find_invoice(tenant_id, id).await? {
                Some(current) => Err(StoreError::Conflict(format!(
                    "invoice {id} is {}",
                    current.status
                ))),
                None => Err(not_found("invoice", id)),
            };
        }
        Ok(())
    }

    async fn list_posted_invoices(
        &self,
        tenant_id: TenantId,
        as_of: NaiveDate,
        customer_id: Option<CustomerId>,
    ) -> StoreResult<Vec<CustomerInvoice>> {
        let mut query = customer_invoices::Entity::find()
            .filter(customer_invoices::Column::TenantId.eq(tenant_id.into_inner()))
            .filter(customer_invoices::Column::Status.eq(InvoiceStatus::Posted.as_str()))
            .filter(customer_invoices::Column::InvoiceDate.lte(as_of));
        if let Some(customer_id) = customer_id {
            query = query.filter(customer_invoices::Column::CustomerId.eq(customer_id.into_inner()));
        }

        query
            .order_by_asc(customer_invoices::Column::InvoiceDate)
            .order_by_asc(customer_invoices::Column::Id)
            .all(self.conn())
            .await
            .map_err(db_err)?
            .into_iter()
            .map(convert::invoice)
            .collect()
    }
}

#[async_trait]
impl ReceiptStore for SeaLedgerTransaction {
    async fn sum_posted_receipts_applied(
        &self,
        tenant_id: TenantId,
        invoice_id: InvoiceId,
        as_of: Option<NaiveDate>,
    ) -> StoreResult<Decimal> {
        let mut query = receipt_applications::Entity::find()
            .filter(receipt_applications::Column::TenantId.eq(tenant_id.into_inner()))
            .filter(receipt_applications::Column::InvoiceId.eq(invoice_id.into_inner()))
            .filter(receipt_applications::Column::IsPosted.eq(true));
        if let Some(as_of) = as_of {
            query = query.filter(receipt_applications::Column::ReceiptDate.lte(as_of));
        }
        sum_column(self.conn(), query, receipt_applications::Column::Amount).await
    }
}

// ============================================================================
// Credit notes
// ============================================================================

#[async_trait]
impl CreditNoteStore for SeaLedgerTransaction {
    async fn find_credit_note(
        &self,
        tenant_id: TenantId,
        id: CreditNoteId,
    ) -> StoreResult<Option<CustomerCreditNote>> {
        let header = Self::credit_note_query(tenant_id, id)
            .one(self.conn())
            .await
            .map_err(db_err)?;
        self.credit_note_with_lines(header).await
    }

    async fn lock_credit_note(
        &self,
        tenant_id: TenantId,
        id: CreditNoteId,
    ) -> StoreResult<Option<CustomerCreditNote>> {
        let header = Self::credit_note_query(tenant_id, id)
            .lock_exclusive()
            .one(self.conn())
            .await
            .map_err(db_err)?;
        self.credit_note_with_lines(header).await
    }

    async fn insert_credit_note(&self, note: &CustomerCreditNote) -> StoreResult<()> {
        convert::credit_note_active_model(note, Utc::now())
            .insert(self.conn())
            .await
            .map_err(db_err)?;

        let lines = convert::credit_note_line_active_models(note)?;
        if !lines.is_empty() {
            customer_credit_note_lines::Entity::insert_many(lines)
                .exec_without_returning(self.conn())
                .await
                .map_err(db_err)?;
        }
        Ok(())
    }

    async fn update_credit_note_status(
        &self,
        note: &CustomerCreditNote,
        expected: CreditNoteStatus,
    ) -> StoreResult<()> {
        let result = customer_credit_notes::Entity::update_many()
            .set(convert::credit_note_status_model(note, Utc::now()))
            .filter(customer_credit_notes::Column::Id.eq(note.id.into_inner()))
            .filter(customer_credit_notes::Column::TenantId.eq(note.tenant_id.into_inner()))
            .filter(customer_credit_notes::Column::Status.eq(expected.as_str()))
            .exec(self.conn())
            .await
            .map_err(db_err)?;

        if result.rows_affected == 0 {
            let current = Self::credit_note_query(note.tenant_id, note.id)
                .one(self.conn())
                .await
                .map_err(db_err)?;
            return match current {
                Some(current) => Err(StoreError::Conflict(format!(
                    "credit note {} is {}, expected {expected}",
                    note.id, current.status
                ))),
                None => Err(not_found("credit note", note.id)),
            };
        }
        Ok(())
    }

    async fn sum_posted_credit_notes_for_invoice(
        &self,
        tenant_id: TenantId,
        invoice_id: InvoiceId,
        as_of: Option<NaiveDate>,
        excluding: Option<CreditNoteId>,
    ) -> StoreResult<Decimal> {
        let mut query = customer_credit_notes::Entity::find()
            .filter(customer_credit_notes::Column::TenantId.eq(tenant_id.into_inner()))
            .filter(customer_credit_notes::Column::InvoiceId.eq(invoice_id.into_inner()))
            .filter(customer_credit_notes::Column::Status.eq(CreditNoteStatus::Posted.as_str()));
        if let Some(as_of) = as_of {
            query = query.filter(customer_credit_notes::Column::CreditNoteDate.lte(as_of));
        }
        if let Some(excluding) = excluding {
            query = query.filter(customer_credit_notes::Column::Id.ne(excluding.into_inner()));
        }
        sum_column(self.conn(), query, customer_credit_notes::Column::TotalAmount).await
    }
}

// ============================================================================
// Refunds
// ============================================================================

#[async_trait]
impl RefundStore for SeaLedgerTransaction {
    async fn find_refund(&self, tenant_id: TenantId, id: RefundId) -> StoreResult<Option<CustomerRefund>> {
        Self::refund_query(tenant_id, id)
            .one(self.conn())
            .await
            .map_err(db_err)?
            .map(convert::refund)
            .transpose()
    }

    async fn lock_refund(&self, tenant_id: TenantId, id: RefundId) -> StoreResult<Option<CustomerRefund>> {
        Self::refund_query(tenant_id, id)
            .lock_exclusive()
            .one(self.conn())
            .await
            .map_err(db_err)?
            .map(convert::refund)
            .transpose()
    }

    async fn insert_refund(&self, refund: &CustomerRefund) -> StoreResult<()> {
        convert::refund_active_model(refund, Utc::now())
            .insert(self.conn())
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn update_refund_status(&self, refund: &CustomerRefund, expected: RefundStatus) -> StoreResult<()> {
        let result = customer_refunds::Entity::update_many()
            .set(convert::refund_status_model(refund, Utc::now()))
            .filter(customer_refunds::Column::Id.eq(refund.id.into_inner()))
            .filter(customer_refunds::Column::TenantId.eq(refund.tenant_id.into_inner()))
            .filter(customer_refunds::Column::Status.eq(expected.as_str()))
            .exec(self.conn())
            .await
            .map_err(db_err)?;

        if result.rows_affected == 0 {
            return match self.find_refund(refund.tenant_id, refund.id).await? {
                Some(current) => Err(StoreError::Conflict(format!(
                    "refund {} is {}, expected {expected}",
                    refund.id, current.status
                ))),
                None => Err(not_found("refund", refund.id)),
            };
        }
        Ok(())
    }

    async fn sum_posted_refunds_for_credit_note(
        &self,
        tenant_id: TenantId,
        credit_note_id: CreditNoteId,
    ) -> StoreResult<Decimal> {
        let query = customer_refunds::Entity::find()
            .filter(customer_refunds::Column::TenantId.eq(tenant_id.into_inner()))
            .filter(customer_refunds::Column::CreditNoteId.eq(credit_note_id.into_inner()))
            .filter(customer_refunds::Column::Status.eq(RefundStatus::Posted.as_str()));
        sum_column(self.conn(), query, customer_refunds::Column::Amount).await
    }
}
