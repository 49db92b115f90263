//! Journal assembler.
//!
//! Turns line inputs into a balanced, REVIEWED journal and builds exact
//! mirror reversals of posted journals. Pure logic: account data comes in
//! through a lookup closure so the caller decides where it is loaded from.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use receiva_shared::types::{AccountId, JournalEntryId, UserId, round_money};
use rust_decimal::Decimal;

use super::account::Account;
use super::error::JournalError;
use super::types::{
    DraftJournal, JournalEntry, JournalHeader, JournalLine, JournalLineInput, JournalStatus,
    JournalType,
};

/// Builds balanced journals.
pub struct JournalAssembler;

impl JournalAssembler {
    /// Assembles a draft journal from line inputs.
    ///
    /// Every amount is rounded half-up to the cent before any check. The
    /// resulting journal has at least two lines, exactly one non-zero side
    /// per line, only active posting accounts, and debits equal to credits.
    pub fn assemble<A>(
        header: JournalHeader,
        lines: Vec<JournalLineInput>,
        account_lookup: A,
        now: DateTime<Utc>,
    ) -> Result<DraftJournal, JournalError>
    where
        A: Fn(AccountId) -> Option<Account>,
    {
        if lines.len() < 2 {
            return Err(JournalError::InsufficientLines(lines.len()));
        }

        let mut resolved = Vec::with_capacity(lines.len());
        for (index, input) in lines.into_iter().enumerate() {
            resolved.push(Self::resolve_line(index + 1, input, &account_lookup)?);
        }

        let debit: Decimal = resolved.iter().map(|l| l.debit).sum();
        let credit: Decimal = resolved.iter().map(|l| l.credit).sum();
        if debit != credit {
            return Err(JournalError::Unbalanced { debit, credit });
        }

        Ok(DraftJournal::new(JournalEntry {
            id: JournalEntryId::new(),
            tenant_id: header.tenant_id,
            entry_date: header.entry_date,
            reference: header.reference,
            memo: header.memo,
            status: JournalStatus::Reviewed,
            journal_type: header.journal_type,
            source: header.source,
            reverses_journal_id: header.reverses_journal_id,
            lines: resolved,
            created_by: header.created_by,
            created_at: now,
            posted_by: None,
            posted_at: None,
        }))
    }

    fn resolve_line<A>(
        line_number: usize,
        input: JournalLineInput,
        account_lookup: &A,
    ) -> Result<JournalLine, JournalError>
    where
        A: Fn(AccountId) -> Option<Account>,
    {
        let debit = round_money(input.debit);
        let credit = round_money(input.credit);

        if debit < Decimal::ZERO || credit < Decimal::ZERO {
            return Err(JournalError::NegativeAmount { line: line_number });
        }
        if debit.is_zero() == credit.is_zero() {
            return Err(JournalError::InvalidLineSides { line: line_number });
        }

        let number = u32::try_from(line_number).map_err(|_| JournalError::TooManyLines(line_number))?;
        let account = account_lookup(input.account_id)
            .ok_or(JournalError::AccountNotFound(input.account_id))?;
        if !account.is_active {
            return Err(JournalError::AccountInactive(account.id));
        }
        if !account.is_posting_allowed {
            return Err(JournalError::AccountNotPostable(account.id));
        }

        Ok(JournalLine {
            line_number: number,
            account_id: input.account_id,
            debit,
            credit,
            description: input.description,
            dimensions: input.dimensions,
        })
    }

    /// Builds the exact mirror of a posted journal, debit and credit swapped
    /// on every line, dated `entry_date`.
    ///
    /// The reversal goes through [`Self::assemble`] so it obeys the same
    /// account rules as a forward posting. Original and reversal together
    /// must net to zero on every account.
    pub fn reverse<A>(
        original: &JournalEntry,
        entry_date: NaiveDate,
        created_by: UserId,
        account_lookup: A,
        now: DateTime<Utc>,
    ) -> Result<DraftJournal, JournalError>
    where
        A: Fn(AccountId) -> Option<Account>,
    {
        if original.status != JournalStatus::Posted {
            return Err(JournalError::UnexpectedStatus {
                id: original.id,
                status: original.status,
                expected: JournalStatus::Posted,
            });
        }

        let header = JournalHeader {
            tenant_id: original.tenant_id,
            entry_date,
            reference: format!("REV-{}", original.reference),
            memo: format!("Reversal: {}", original.memo),
            journal_type: JournalType::Reversing,
            source: original.source,
            reverses_journal_id: Some(original.id),
            created_by,
        };

        let lines = original
            .lines
            .iter()
            .map(|line| JournalLineInput {
                account_id: line.account_id,
                debit: line.credit,
                credit: line.debit,
                description: line.description.clone(),
                dimensions: line.dimensions,
            })
            .collect();

        let draft = Self::assemble(header, lines, &account_lookup, now)?;
        Self::ensure_net_zero(original, draft.entry(), &account_lookup)?;
        Ok(draft)
    }

    fn ensure_net_zero<A>(
        original: &JournalEntry,
        reversal: &JournalEntry,
        account_lookup: &A,
    ) -> Result<(), JournalError>
    where
        A: Fn(AccountId) -> Option<Account>,
    {
        let mut net: HashMap<AccountId, Decimal> = HashMap::new();
        for line in original.lines.iter().chain(&reversal.lines) {
            let account = account_lookup(line.account_id)
                .ok_or(JournalError::AccountNotFound(line.account_id))?;
            *net.entry(line.account_id).or_default() +=
                account.normal_balance.signed(line.debit, line.credit);
        }

        match net.into_iter().find(|(_, amount)| !amount.is_zero()) {
            Some((account, net)) => Err(JournalError::ReversalNotNetZero { account, net }),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::account::{AccountType, NormalBalance};
    use crate::ledger::types::{SourceDocument, SourceDocumentType};
    use receiva_shared::types::{InvoiceId, TenantId};
    use rust_decimal_macros::dec;
    use std::collections::HashMap;

    fn account(is_active: bool, is_posting_allowed: bool) -> Account {
        Account {
            id: AccountId::new(),
            tenant_id: TenantId::new(),
            code: "1100".to_string(),
            name: "Accounts Receivable".to_string(),
            account_type: AccountType::Asset,
            normal_balance: NormalBalance::Debit,
            is_active,
            is_posting_allowed,
        }
    }

    fn header() -> JournalHeader {
        JournalHeader {
            tenant_id: TenantId::new(),
            entry_date: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            reference: "INV-000001".to_string(),
            memo: "Invoice INV-000001".to_string(),
            journal_type: JournalType::Standard,
            source: SourceDocument::new(SourceDocumentType::CustomerInvoice, InvoiceId::new()),
            reverses_journal_id: None,
            created_by: UserId::new(),
        }
    }

    fn lookup(accounts: &[Account]) -> impl Fn(AccountId) -> Option<Account> + '_ {
        let map: HashMap<AccountId, &Account> = accounts.iter().map(|a| (a.id, a)).collect();
        move |id| map.get(&id).map(|a| (*a).clone())
    }

    #[test]
    fn test_assemble_rounds_half_up() {
        let accounts = [account(true, true), account(true, true)];
        let draft = JournalAssembler::assemble(
            header(),
            vec![
                JournalLineInput::debit(accounts[0].id, dec!(10.005)),
                JournalLineInput::credit(accounts[1].id, dec!(10.01)),
            ],
            lookup(&accounts),
            Utc::now(),
        )
        .unwrap();

        assert_eq!(draft.entry().lines[0].debit, dec!(10.01));
        assert_eq!(draft.entry().status, JournalStatus::Reviewed);
        assert_eq!(draft.entry().lines[1].line_number, 2);
    }

    #[test]
    fn test_assemble_rejects_single_line() {
        let accounts = [account(true, true)];
        let result = JournalAssembler::assemble(
            header(),
            vec![JournalLineInput::debit(accounts[0].id, dec!(10))],
            lookup(&accounts),
            Utc::now(),
        );
        assert!(matches!(result, Err(JournalError::InsufficientLines(1))));
    }

    #[test]
    fn test_assemble_rejects_two_sided_line() {
        let accounts = [account(true, true), account(true, true)];
        let mut both = JournalLineInput::debit(accounts[0].id, dec!(10));
        both.credit = dec!(10);
        let result = JournalAssembler::assemble(
            header(),
            vec![both, JournalLineInput::credit(accounts[1].id, dec!(0))],
            lookup(&accounts),
            Utc::now(),
        );
        assert!(matches!(result, Err(JournalError::InvalidLineSides { line: 1 })));
    }

    #[test]
    fn test_assemble_rejects_inactive_and_header_accounts() {
        let accounts = [account(false, true), account(true, false)];
        let result = JournalAssembler::assemble(
            header(),
            vec![
                JournalLineInput::debit(accounts[0].id, dec!(10)),
                JournalLineInput::credit(accounts[1].id, dec!(10)),
            ],
            lookup(&accounts),
            Utc::now(),
        );
        assert!(matches!(result, Err(JournalError::AccountInactive(_))));

        let accounts = [account(true, true), account(true, false)];
        let result = JournalAssembler::assemble(
            header(),
            vec![
                JournalLineInput::debit(accounts[0].id, dec!(10)),
                JournalLineInput::credit(accounts[1].id, dec!(10)),
            ],
            lookup(&accounts),
            Utc::now(),
        );
        assert!(matches!(result, Err(JournalError::AccountNotPostable(_))));
    }

    #[test]
    fn test_assemble_rejects_unbalanced() {
        let accounts = [account(true, true), account(true, true)];
        let result = JournalAssembler::assemble(
            header(),
            vec![
                JournalLineInput::debit(accounts[0].id, dec!(100.00)),
                JournalLineInput::credit(accounts[1].id, dec!(99.99)),
            ],
            lookup(&accounts),
            Utc::now(),
        );
        assert!(matches!(
            result,
            Err(JournalError::Unbalanced { debit, credit }) if debit == dec!(100.00) && credit == dec!(99.99)
        ));
    }

    #[test]
    fn test_reverse_requires_posted_original() {
        let accounts = [account(true, true), account(true, true)];
        let draft = JournalAssembler::assemble(
            header(),
            vec![
                JournalLineInput::debit(accounts[0].id, dec!(50)),
                JournalLineInput::credit(accounts[1].id, dec!(50)),
            ],
            lookup(&accounts),
            Utc::now(),
        )
        .unwrap();

        let result = JournalAssembler::reverse(
            draft.entry(),
            draft.entry().entry_date,
            UserId::new(),
            lookup(&accounts),
            Utc::now(),
        );
        assert!(matches!(result, Err(JournalError::UnexpectedStatus { .. })));
    }

    #[test]
    fn test_reverse_swaps_sides() {
        let accounts = [account(true, true), account(true, true)];
        let mut posted = JournalAssembler::assemble(
            header(),
            vec![
                JournalLineInput::debit(accounts[0].id, dec!(50)),
                JournalLineInput::credit(accounts[1].id, dec!(50)),
            ],
            lookup(&accounts),
            Utc::now(),
        )
        .unwrap()
        .into_entry();
        posted.status = JournalStatus::Posted;

        let reversal = JournalAssembler::reverse(
            &posted,
            posted.entry_date,
            UserId::new(),
            lookup(&accounts),
            Utc::now(),
        )
        .unwrap();
        let reversal = reversal.entry();

        assert_eq!(reversal.journal_type, JournalType::Reversing);
        assert_eq!(reversal.reverses_journal_id, Some(posted.id));
        assert_eq!(reversal.source, posted.source);
        assert!(reversal.memo.starts_with("Reversal: "));
        assert_eq!(reversal.lines[0].credit, dec!(50));
        assert_eq!(reversal.lines[1].debit, dec!(50));
    }

    #[test]
    fn test_reverse_rejects_residual_from_unrounded_original() {
        let accounts = [account(true, true), account(true, true)];
        let mut posted = JournalAssembler::assemble(
            header(),
            vec![
                JournalLineInput::debit(accounts[0].id, dec!(10)),
                JournalLineInput::credit(accounts[1].id, dec!(10)),
            ],
            lookup(&accounts),
            Utc::now(),
        )
        .unwrap()
        .into_entry();
        posted.status = JournalStatus::Posted;
        posted.lines[0].debit = dec!(10.004);
        posted.lines[1].credit = dec!(10.004);

        let result = JournalAssembler::reverse(
            &posted,
            posted.entry_date,
            UserId::new(),
            lookup(&accounts),
            Utc::now(),
        );
        assert!(matches!(
            result,
            Err(JournalError::ReversalNotNetZero { net, .. }) if net.abs() == dec!(0.004)
        ));
    }
}
