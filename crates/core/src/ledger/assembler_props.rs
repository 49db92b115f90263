//! Property-based tests for the journal assembler.

use std::collections::HashMap;

use chrono::{NaiveDate, Utc};
use proptest::prelude::*;
use receiva_shared::types::{AccountId, InvoiceId, TenantId, UserId};
use rust_decimal::Decimal;

use super::account::{Account, AccountType, NormalBalance};
use super::assembler::JournalAssembler;
use super::types::{
    JournalHeader, JournalLineInput, JournalStatus, JournalType, SourceDocument,
    SourceDocumentType,
};

/// Amounts from 0.001 to 100,000.000 so rounding is exercised.
fn sub_cent_amount() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_000i64).prop_map(|mills| Decimal::new(mills, 3))
}

fn postable_accounts(n: usize) -> Vec<Account> {
    (0..n)
        .map(|i| Account {
            id: AccountId::new(),
            tenant_id: TenantId::new(),
            code: format!("{}", 1000 + i),
            name: format!("Account {i}"),
            account_type: AccountType::Asset,
            normal_balance: NormalBalance::Debit,
            is_active: true,
            is_posting_allowed: true,
        })
        .collect()
}

fn header() -> JournalHeader {
    JournalHeader {
        tenant_id: TenantId::new(),
        entry_date: NaiveDate::from_ymd_opt(2026, 5, 1).unwrap_or_default(),
        reference: "CN-000001".to_string(),
        memo: "Credit note CN-000001".to_string(),
        journal_type: JournalType::Standard,
        source: SourceDocument::new(SourceDocumentType::CustomerCreditNote, InvoiceId::new()),
        reverses_journal_id: None,
        created_by: UserId::new(),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Whatever lines go in, an assembled journal always balances to the cent.
    #[test]
    fn prop_assembled_journal_always_balances(
        debits in prop::collection::vec(sub_cent_amount(), 1..6),
        credits in prop::collection::vec(sub_cent_amount(), 1..6),
    ) {
        let accounts = postable_accounts(debits.len() + credits.len());
        let map: HashMap<_, _> = accounts.iter().map(|a| (a.id, a.clone())).collect();

        let mut lines = Vec::new();
        for (i, amount) in debits.iter().enumerate() {
            lines.push(JournalLineInput::debit(accounts[i].id, *amount));
        }
        for (i, amount) in credits.iter().enumerate() {
            lines.push(JournalLineInput::credit(accounts[debits.len() + i].id, *amount));
        }

        if let Ok(draft) = JournalAssembler::assemble(header(), lines, |id| map.get(&id).cloned(), Utc::now()) {
            let entry = draft.entry();
            prop_assert_eq!(entry.total_debit(), entry.total_credit());
            prop_assert!(entry.lines.len() >= 2);
            for line in &entry.lines {
                prop_assert!(line.debit.is_zero() != line.credit.is_zero());
                prop_assert!(line.debit.scale() <= 2 && line.credit.scale() <= 2);
            }
        }
    }

    /// A single amount split into one debit and one credit always assembles.
    #[test]
    fn prop_two_line_posting_assembles(amount in sub_cent_amount()) {
        let accounts = postable_accounts(2);
        let map: HashMap<_, _> = accounts.iter().map(|a| (a.id, a.clone())).collect();

        let result = JournalAssembler::assemble(
            header(),
            vec![
                JournalLineInput::debit(accounts[0].id, amount),
                JournalLineInput::credit(accounts[1].id, amount),
            ],
            |id| map.get(&id).cloned(),
            Utc::now(),
        );
        prop_assert!(result.is_ok(), "{:?}", result);
    }

    /// Original plus reversal nets to zero on every account, line for line.
    #[test]
    fn prop_reversal_mirrors_and_nets_to_zero(
        amounts in prop::collection::vec(sub_cent_amount(), 1..5),
    ) {
        let accounts = postable_accounts(amounts.len() + 1);
        let map: HashMap<_, _> = accounts.iter().map(|a| (a.id, a.clone())).collect();
        let lookup = |id: AccountId| map.get(&id).cloned();

        let total: Decimal = amounts.iter().map(|a| receiva_shared::types::round_money(*a)).sum();
        let mut lines: Vec<_> = amounts
            .iter()
            .enumerate()
            .map(|(i, a)| JournalLineInput::credit(accounts[i + 1].id, *a))
            .collect();
        lines.insert(0, JournalLineInput::debit(accounts[0].id, total));

        let mut original = JournalAssembler::assemble(header(), lines, lookup, Utc::now())
            .map_err(|e| TestCaseError::fail(e.to_string()))?
            .into_entry();
        original.status = JournalStatus::Posted;

        let reversal = JournalAssembler::reverse(&original, original.entry_date, UserId::new(), lookup, Utc::now())
            .map_err(|e| TestCaseError::fail(e.to_string()))?
            .into_entry();

        prop_assert_eq!(reversal.lines.len(), original.lines.len());
        let mut net: HashMap<AccountId, Decimal> = HashMap::new();
        for (orig, rev) in original.lines.iter().zip(&reversal.lines) {
            prop_assert_eq!(orig.account_id, rev.account_id);
            prop_assert_eq!(orig.debit, rev.credit);
            prop_assert_eq!(orig.credit, rev.debit);
            for line in [orig, rev] {
                *net.entry(line.account_id).or_default() +=
                    NormalBalance::Debit.signed(line.debit, line.credit);
            }
        }
        prop_assert!(net.values().all(Decimal::is_zero));
    }
}
