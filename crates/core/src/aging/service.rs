//! Aging over stored documents.

use std::collections::HashMap;

use chrono::NaiveDate;
use receiva_shared::types::{CustomerId, TenantId};
use rust_decimal::Decimal;
use tracing::debug;

use super::engine::AgingEngine;
use super::types::{AgedInvoice, AgingReport};
use crate::error::{ReceivablesError, ReceivablesResult};
use crate::receivables::outstanding::outstanding_for_invoice;
use crate::store::{InvoiceStore, LedgerDatabase, MasterDataStore};

/// Builds aging reports from posted invoices, receipts, and credit notes.
pub struct AgingService<D> {
    db: D,
}

impl<D: LedgerDatabase> AgingService<D> {
    /// Creates an aging service.
    pub fn new(db: D) -> Self {
        Self { db }
    }

    /// Ages every POSTED invoice dated on or before `as_of`, optionally for
    /// one customer. Receipts and credit notes dated after `as_of` are
    /// ignored; fully settled invoices are left out.
    pub async fn age(
        &self,
        tenant_id: TenantId,
        as_of: NaiveDate,
        customer_id: Option<CustomerId>,
    ) -> ReceivablesResult<AgingReport> {
        let tx = self.db.begin().await?;
        let invoices = tx.list_posted_invoices(tenant_id, as_of, customer_id).await?;

        let mut names: HashMap<CustomerId, String> = HashMap::new();
        let mut aged = Vec::with_capacity(invoices.len());
        for invoice in &invoices {
            let outstanding =
                outstanding_for_invoice(&tx, tenant_id, invoice, Some(as_of), None).await?;
            if outstanding <= Decimal::ZERO {
                continue;
            }

            let customer_name = match names.get(&invoice.customer_id) {
                Some(name) => name.clone(),
                None => {
                    let name = tx
                        .find_customer(tenant_id, invoice.customer_id)
                        .await?
                        .ok_or_else(|| {
                            ReceivablesError::not_found("customer", invoice.customer_id)
                        })?
                        .name;
                    names.insert(invoice.customer_id, name.clone());
                    name
                }
            };

            aged.push(AgedInvoice {
                invoice_id: invoice.id,
                customer_id: invoice.customer_id,
                customer_name,
                due_date: invoice.due_date,
                outstanding,
            });
        }

        let report = AgingEngine::build_report(as_of, aged);
        debug!(
            tenant_id = %tenant_id,
            as_of = %as_of,
            invoices = invoices.len(),
            customers = report.rows.len(),
            total = %report.total.total,
            "Aging report built"
        );
        Ok(report)
    }
}
