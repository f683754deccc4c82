use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::categories::Leaf;
use crate::models::{MonthKey, Statement, TransactionRecord};
use crate::partition::partition;
use crate::rules::{evaluate, LeafAmounts, RuleSet};

#[derive(Debug, Clone, PartialEq)]
pub struct AggregateRow {
    pub month: MonthKey,
    pub amounts: LeafAmounts,
    /// Sum of expense leaves.
    pub total_accounted: Decimal,
    /// Balance movement over the month with income removed.
    pub total_actual_change: Decimal,
    /// `total_actual_change - total_accounted`.
    pub unaccounted: Decimal,
}

impl AggregateRow {
    /// Row for a month without records: every leaf and total is zero.
    pub fn no_data(month: MonthKey, rule_set: &RuleSet) -> Self {
        Self {
            month,
            amounts: rule_set.leaves().map(|l| (l, Decimal::ZERO)).collect(),
            total_accounted: Decimal::ZERO,
            total_actual_change: Decimal::ZERO,
            unaccounted: Decimal::ZERO,
        }
    }

    pub fn amount(&self, leaf: Leaf) -> Decimal {
        self.amounts.get(&leaf).copied().unwrap_or_default()
    }

    pub fn income(&self) -> Decimal {
        Leaf::incomes().map(|l| self.amount(l)).sum()
    }

    pub fn is_reconciled(&self) -> bool {
        self.unaccounted == self.total_actual_change - self.total_accounted
    }
}

/// Opening balance: the balance before the oldest record was applied.
///
/// The month's balance change is `newest.balance - opening_balance(oldest)`,
/// not `oldest.balance - newest.balance`. Measuring from the opening balance
/// counts the oldest movement itself, and the outflow comes out negative like
/// the leaf amounts it is compared against.
fn opening_balance(oldest: &TransactionRecord) -> Decimal {
    oldest.running_balance - oldest.amount
}

pub fn aggregate_month(
    month: MonthKey,
    records: &[TransactionRecord],
    rule_set: &RuleSet,
) -> AggregateRow {
    let (Some(newest), Some(oldest)) = (records.first(), records.last()) else {
        return AggregateRow::no_data(month, rule_set);
    };

    let amounts = evaluate(records, rule_set);
    let total_accounted: Decimal = amounts
        .iter()
        .filter(|(leaf, _)| !leaf.is_income())
        .map(|(_, v)| *v)
        .sum();
    let income: Decimal = amounts
        .iter()
        .filter(|(leaf, _)| leaf.is_income())
        .map(|(_, v)| *v)
        .sum();

    let balance_change = newest.running_balance - opening_balance(oldest);
    let total_actual_change = balance_change - income;

    AggregateRow {
        month,
        amounts,
        total_accounted,
        total_actual_change,
        unaccounted: total_actual_change - total_accounted,
    }
}

/// One row per month of the statement, oldest first, gaps filled with
/// no-data rows.
pub fn aggregate_statement(
    statement: &Statement,
    rule_set: &RuleSet,
    warn_threshold: Decimal,
) -> Vec<AggregateRow> {
    partition(statement)
        .map(|p| {
            let row = aggregate_month(p.month, p.records, rule_set);
            debug!(
                month = %row.month,
                records = p.records.len(),
                accounted = %row.total_accounted,
                actual = %row.total_actual_change,
                unaccounted = %row.unaccounted,
                "aggregated month"
            );
            if row.unaccounted.abs() > warn_threshold {
                warn!(month = %row.month, unaccounted = %row.unaccounted, "large unaccounted amount");
            }
            row
        })
        .collect()
}
