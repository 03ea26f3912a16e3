use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::{Cents, Transaction, TransactionKind};

/// Derived totals for a set of transactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub total_income: Cents,
    pub total_expense: Cents,
    pub balance: Cents,
}

/// Income/expense totals for one calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyFlow {
    /// Short English month label ("Jan", "Feb", ...)
    pub month: String,
    pub income: Cents,
    pub expense: Cents,
}

/// Compute overall totals for a list of transactions.
/// balance = total income - total expense; all zeros for an empty list.
pub fn summarize(txs: &[Transaction]) -> Summary {
    let (total_income, total_expense) =
        txs.iter()
            .fold((0, 0), |(income, expense), tx| match tx.kind {
                TransactionKind::Income => (income + tx.amount_cents, expense),
                TransactionKind::Expense => (income, expense + tx.amount_cents),
            });

    Summary {
        total_income,
        total_expense,
        balance: total_income - total_expense,
    }
}

/// Sum amounts per distinct category, regardless of kind.
/// Callers needing a kind-aware breakdown pre-filter the input.
pub fn totals_by_category(txs: &[Transaction]) -> HashMap<String, Cents> {
    let mut totals: HashMap<String, Cents> = HashMap::new();

    for tx in txs {
        *totals.entry(tx.category.clone()).or_insert(0) += tx.amount_cents;
    }

    totals
}

/// Group transactions by the calendar month of their date and accumulate
/// income/expense per group. Months are emitted in the order they are first
/// encountered while scanning `txs`, so the result is deterministic for a
/// given input ordering.
pub fn monthly_flows(txs: &[Transaction]) -> Vec<MonthlyFlow> {
    let mut flows: Vec<MonthlyFlow> = Vec::new();
    let mut index_by_month: HashMap<String, usize> = HashMap::new();

    for tx in txs {
        let month = tx.date.format("%b").to_string();
        let idx = *index_by_month.entry(month.clone()).or_insert_with(|| {
            flows.push(MonthlyFlow {
                month,
                income: 0,
                expense: 0,
            });
            flows.len() - 1
        });

        match tx.kind {
            TransactionKind::Income => flows[idx].income += tx.amount_cents,
            TransactionKind::Expense => flows[idx].expense += tx.amount_cents,
        }
    }

    flows
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use uuid::Uuid;

    use super::*;

    fn make_tx(amount: Cents, kind: TransactionKind, category: &str, date: &str) -> Transaction {
        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap();
        Transaction::new(Uuid::new_v4(), amount, kind, category.to_string(), date)
    }

    #[test]
    fn test_summarize_empty() {
        let summary = summarize(&[]);
        assert_eq!(summary.total_income, 0);
        assert_eq!(summary.total_expense, 0);
        assert_eq!(summary.balance, 0);
    }

    #[test]
    fn test_summarize_mixed() {
        let txs = vec![
            make_tx(100_000, TransactionKind::Income, "Salary", "2024-01-05"),
            make_tx(20_000, TransactionKind::Expense, "Food", "2024-01-20"),
        ];

        let summary = summarize(&txs);
        assert_eq!(summary.total_income, 100_000);
        assert_eq!(summary.total_expense, 20_000);
        assert_eq!(summary.balance, 80_000);
    }

    #[test]
    fn test_balance_identity() {
        let txs = vec![
            make_tx(123, TransactionKind::Income, "A", "2024-03-01"),
            make_tx(456, TransactionKind::Expense, "B", "2024-03-02"),
            make_tx(789, TransactionKind::Expense, "C", "2024-04-09"),
        ];

        let summary = summarize(&txs);
        assert_eq!(summary.balance, summary.total_income - summary.total_expense);
    }

    #[test]
    fn test_totals_by_category_ignores_kind() {
        let txs = vec![
            make_tx(100_000, TransactionKind::Income, "Salary", "2024-01-05"),
            make_tx(20_000, TransactionKind::Expense, "Food", "2024-01-20"),
            make_tx(5_000, TransactionKind::Expense, "Food", "2024-02-03"),
        ];

        let totals = totals_by_category(&txs);
        assert_eq!(totals.len(), 2);
        assert_eq!(totals.get("Salary"), Some(&100_000));
        assert_eq!(totals.get("Food"), Some(&25_000));
    }

    #[test]
    fn test_monthly_flows_single_month() {
        let txs = vec![
            make_tx(100_000, TransactionKind::Income, "Salary", "2024-01-05"),
            make_tx(20_000, TransactionKind::Expense, "Food", "2024-01-20"),
        ];

        let flows = monthly_flows(&txs);
        assert_eq!(flows.len(), 1);
        assert_eq!(flows[0].month, "Jan");
        assert_eq!(flows[0].income, 100_000);
        assert_eq!(flows[0].expense, 20_000);
    }

    #[test]
    fn test_monthly_flows_first_seen_order() {
        // Months appear in scan order, not calendar order
        let txs = vec![
            make_tx(1_000, TransactionKind::Expense, "Food", "2024-03-10"),
            make_tx(2_000, TransactionKind::Income, "Salary", "2024-01-15"),
            make_tx(3_000, TransactionKind::Expense, "Rent", "2024-03-25"),
        ];

        let flows = monthly_flows(&txs);
        assert_eq!(flows.len(), 2);
        assert_eq!(flows[0].month, "Mar");
        assert_eq!(flows[0].income, 0);
        assert_eq!(flows[0].expense, 4_000);
        assert_eq!(flows[1].month, "Jan");
        assert_eq!(flows[1].income, 2_000);
    }

    #[test]
    fn test_monthly_flows_empty() {
        assert!(monthly_flows(&[]).is_empty());
    }
}
