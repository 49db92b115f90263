//! Accounts, periods, sequences, and master data.

use async_trait::async_trait;
use chrono::NaiveDate;
use receiva_core::dimension::{DimensionKind, DimensionRecord};
use receiva_core::fiscal::AccountingPeriod;
use receiva_core::ledger::{Account, ControlAccountRole};
use receiva_core::receivables::{BankAccount, Customer, InvoiceCategory};
use receiva_core::sequence::SequenceName;
use receiva_core::store::{
    AccountStore, MasterDataStore, PeriodStore, SequenceStore, StoreError, StoreResult,
};
use receiva_shared::types::{
    AccountId, BankAccountId, CustomerId, DimensionId, InvoiceCategoryId, TenantId,
};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DbBackend, EntityTrait, QueryFilter, QueryOrder, Statement,
};

use super::{SeaLedgerTransaction, convert, db_err};
use crate::entities::{
    accounting_periods, accounts, bank_accounts, control_account_settings, customers, dimensions,
    invoice_categories,
};

/// Upserts the counter row and returns the incremented value. The row lock
/// taken by the update serializes concurrent allocations per tenant and name.
const INCREMENT_SEQUENCE_SQL: &str = r"
INSERT INTO document_sequences (tenant_id, name, last_value)
VALUES ($1, $2, 1)
ON CONFLICT (tenant_id, name)
DO UPDATE SET last_value = document_sequences.last_value + 1
RETURNING last_value
";

#[async_trait]
impl AccountStore for SeaLedgerTransaction {
    async fn find_account(&self, tenant_id: TenantId, id: AccountId) -> StoreResult<Option<Account>> {
        accounts::Entity::find_by_id(id.into_inner())
            .filter(accounts::Column::TenantId.eq(tenant_id.into_inner()))
            .one(self.conn())
            .await
            .map_err(db_err)?
            .map(convert::account)
            .transpose()
    }

    async fn control_account_setting(
        &self,
        tenant_id: TenantId,
        role: ControlAccountRole,
    ) -> StoreResult<Option<AccountId>> {
        let setting = control_account_settings::Entity::find()
            .filter(control_account_settings::Column::TenantId.eq(tenant_id.into_inner()))
            .filter(control_account_settings::Column::Role.eq(role.as_str()))
            .one(self.conn())
            .await
            .map_err(db_err)?;
        Ok(setting.map(|s| s.account_id.into()))
    }
}

#[async_trait]
impl PeriodStore for SeaLedgerTransaction {
    async fn find_periods_containing(
        &self,
        tenant_id: TenantId,
        date: NaiveDate,
    ) -> StoreResult<Vec<AccountingPeriod>> {
        accounting_periods::Entity::find()
            .filter(accounting_periods::Column::TenantId.eq(tenant_id.into_inner()))
            .filter(accounting_periods::Column::StartDate.lte(date))
            .filter(accounting_periods::Column::EndDate.gte(date))
            .order_by_asc(accounting_periods::Column::StartDate)
            .all(self.conn())
            .await
            .map_err(db_err)?
            .into_iter()
            .map(convert::period)
            .collect()
    }

    async fn opening_balance_period(&self, tenant_id: TenantId) -> StoreResult<Option<AccountingPeriod>> {
        accounting_periods::Entity::find()
            .filter(accounting_periods::Column::TenantId.eq(tenant_id.into_inner()))
            .filter(accounting_periods::Column::IsOpeningBalance.eq(true))
            .one(self.conn())
            .await
            .map_err(db_err)?
            .map(convert::period)
            .transpose()
    }
}

#[async_trait]
impl SequenceStore for SeaLedgerTransaction {
    async fn increment(&self, tenant_id: TenantId, name: SequenceName) -> StoreResult<i64> {
        let statement = Statement::from_sql_and_values(
            DbBackend::Postgres,
            INCREMENT_SEQUENCE_SQL,
            [tenant_id.into_inner().into(), name.as_str().into()],
        );
        let row = self
            .conn()
            .query_one(statement)
            .await
            .map_err(db_err)?
            .ok_or_else(|| StoreError::Database(format!("Sequence {name} returned no row")))?;
        row.try_get::<i64>("", "last_value").map_err(db_err)
    }
}

#[async_trait]
impl MasterDataStore for SeaLedgerTransaction {
    async fn find_customer(&self, tenant_id: TenantId, id: CustomerId) -> StoreResult<Option<Customer>> {
        let customer = customers::Entity::find_by_id(id.into_inner())
            .filter(customers::Column::TenantId.eq(tenant_id.into_inner()))
            .one(self.conn())
            .await
            .map_err(db_err)?;
        Ok(customer.map(convert::customer))
    }

    async fn find_bank_account(
        &self,
        tenant_id: TenantId,
        id: BankAccountId,
    ) -> StoreResult<Option<BankAccount>> {
        let bank = bank_accounts::Entity::find_by_id(id.into_inner())
            .filter(bank_accounts::Column::TenantId.eq(tenant_id.into_inner()))
            .one(self.conn())
            .await
            .map_err(db_err)?;
        Ok(bank.map(convert::bank_account))
    }

    async fn find_invoice_category(
        &self,
        tenant_id: TenantId,
        id: InvoiceCategoryId,
    ) -> StoreResult<Option<InvoiceCategory>> {
        invoice_categories::Entity::find_by_id(id.into_inner())
            .filter(invoice_categories::Column::TenantId.eq(tenant_id.into_inner()))
            .one(self.conn())
            .await
            .map_err(db_err)?
            .map(convert::invoice_category)
            .transpose()
    }

    async fn find_dimension(
        &self,
        tenant_id: TenantId,
        kind: DimensionKind,
        id: DimensionId,
    ) -> StoreResult<Option<DimensionRecord>> {
        dimensions::Entity::find_by_id(id.into_inner())
            .filter(dimensions::Column::TenantId.eq(tenant_id.into_inner()))
            .filter(dimensions::Column::Kind.eq(kind.as_str()))
            .one(self.conn())
            .await
            .map_err(db_err)?
            .map(convert::dimension)
            .transpose()
    }
}
