//! Control account roles and resolution.
//!
//! Control accounts are tenant-configured, so every posting path resolves
//! and re-validates them on each use instead of trusting earlier setup.

use std::fmt;

use receiva_shared::types::TenantId;
use serde::{Deserialize, Serialize};

use super::account::{Account, AccountType, NormalBalance};
use crate::error::ReceivablesError;
use crate::store::AccountStore;

/// The posting role a configured account plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ControlAccountRole {
    /// Accounts receivable control.
    ArControl,
    /// Accounts payable control.
    ApControl,
    /// Cash clearing, used for cash refunds.
    CashClearing,
    /// Refund clearing, the intermediate leg of every refund.
    BankRefundClearing,
}

impl ControlAccountRole {
    /// Returns the string representation of the role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ArControl => "AR_CONTROL",
            Self::ApControl => "AP_CONTROL",
            Self::CashClearing => "CASH_CLEARING",
            Self::BankRefundClearing => "BANK_REFUND_CLEARING",
        }
    }

    /// Parses a role from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "AR_CONTROL" => Some(Self::ArControl),
            "AP_CONTROL" => Some(Self::ApControl),
            "CASH_CLEARING" => Some(Self::CashClearing),
            "BANK_REFUND_CLEARING" => Some(Self::BankRefundClearing),
            _ => None,
        }
    }

    /// Account type the role requires.
    #[must_use]
    pub const fn required_type(&self) -> AccountType {
        match self {
            Self::ApControl => AccountType::Liability,
            Self::ArControl | Self::CashClearing | Self::BankRefundClearing => AccountType::Asset,
        }
    }

    /// Normal balance the role requires, if constrained.
    #[must_use]
    pub const fn required_normal_balance(&self) -> Option<NormalBalance> {
        match self {
            Self::ArControl => Some(NormalBalance::Debit),
            Self::ApControl => Some(NormalBalance::Credit),
            Self::CashClearing | Self::BankRefundClearing => None,
        }
    }
}

impl fmt::Display for ControlAccountRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolves tenant-configured control accounts.
pub struct ControlAccountResolver;

impl ControlAccountResolver {
    /// Reads the configured account for `role` and validates it.
    pub async fn resolve<S>(
        store: &S,
        tenant_id: TenantId,
        role: ControlAccountRole,
    ) -> Result<Account, ReceivablesError>
    where
        S: AccountStore + ?Sized,
    {
        let account_id = store
            .control_account_setting(tenant_id, role)
            .await?
            .ok_or_else(|| ReceivablesError::ConfigurationMissing(format!("Control account {role}")))?;
        let account = store.find_account(tenant_id, account_id).await?;

        Self::validate(role, account)
    }

    /// Checks that `account` is usable for `role`.
    pub fn validate(
        role: ControlAccountRole,
        account: Option<Account>,
    ) -> Result<Account, ReceivablesError> {
        let invalid = |reason: String| ReceivablesError::ConfigurationInvalid {
            subject: role.to_string(),
            reason,
        };

        let account = account.ok_or_else(|| invalid("configured account does not exist".into()))?;
        if !account.is_active {
            return Err(invalid(format!("account {} is inactive", account.code)));
        }
        if !account.is_posting_allowed {
            return Err(invalid(format!("account {} does not allow posting", account.code)));
        }
        if account.account_type != role.required_type() {
            return Err(invalid(format!(
                "account {} is {}, expected {}",
                account.code,
                account.account_type,
                role.required_type()
            )));
        }
        if let Some(normal) = role.required_normal_balance()
            && account.normal_balance != normal
        {
            return Err(invalid(format!(
                "account {} has {} normal balance, expected {normal}",
                account.code, account.normal_balance
            )));
        }

        Ok(account)
    }
}
