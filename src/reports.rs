use rust_decimal::Decimal;

use crate::aggregator::AggregateRow;
use crate::categories::{Leaf, Palette};
use crate::error::{Result, TrackerError};
use crate::history::HistoryTable;
use crate::models::MonthKey;

// ---------------------------------------------------------------------------
// Period selection
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    /// Most recent month in the history.
    Latest,
    Month(MonthKey),
    /// Every month in the history.
    All,
}

pub fn select_rows(table: &HistoryTable, period: Period) -> Result<(String, Vec<&AggregateRow>)> {
    if table.is_empty() {
        return Err(TrackerError::Other(
            "No history yet. Run `spendtrack run` first.".into(),
        ));
    }
    match period {
        Period::Latest => {
            let row = table
                .latest()
                .ok_or_else(|| TrackerError::Other("No history yet.".into()))?;
            Ok((row.month.to_string(), vec![row]))
        }
        Period::Month(month) => {
            let row = table
                .get(month)
                .ok_or_else(|| TrackerError::Other(format!("No history row for {month}")))?;
            Ok((month.to_string(), vec![row]))
        }
        Period::All => {
            let label = match table.month_range() {
                Some((first, last)) if first != last => format!("{first} to {last}"),
                Some((first, _)) => first.to_string(),
                None => String::new(),
            };
            Ok((label, table.rows().collect()))
        }
    }
}

// ---------------------------------------------------------------------------
// Distribution
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SliceKind {
    Leaf(Leaf),
    Unaccounted,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Slice {
    pub kind: SliceKind,
    pub label: String,
    /// Absolute value; slices cannot be negative.
    pub amount: Decimal,
    pub percent: Decimal,
    pub rgb: (u8, u8, u8),
}

#[derive(Debug, Clone, PartialEq)]
pub struct DistributionSnapshot {
    pub period: String,
    pub slices: Vec<Slice>,
    pub total: Decimal,
}

const UNACCOUNTED_RGB: (u8, u8, u8) = (99, 99, 99);

impl DistributionSnapshot {
    /// Expense leaves in schema order, then Unaccounted, summed over `rows`.
    pub fn from_rows(period: impl Into<String>, rows: &[&AggregateRow]) -> Self {
        let mut entries: Vec<(SliceKind, String, Decimal, (u8, u8, u8))> = Leaf::expenses()
            .map(|leaf| {
                let sum: Decimal = rows.iter().map(|r| r.amount(leaf)).sum();
                (SliceKind::Leaf(leaf), leaf.to_string(), sum.abs(), leaf.color().rgb())
            })
            .collect();
        let unaccounted: Decimal = rows.iter().map(|r| r.unaccounted).sum();
        entries.push((
            SliceKind::Unaccounted,
            "Unaccounted".to_string(),
            unaccounted.abs(),
            UNACCOUNTED_RGB,
        ));

        let total: Decimal = entries.iter().map(|e| e.2).sum();
        let slices = entries
            .into_iter()
            .map(|(kind, label, amount, rgb)| Slice {
                kind,
                label,
                amount,
                percent: if total.is_zero() {
                    Decimal::ZERO
                } else {
                    (amount / total * Decimal::ONE_HUNDRED).round_dp(2)
                },
                rgb,
            })
            .collect();

        Self {
            period: period.into(),
            slices,
            total,
        }
    }

    pub fn non_zero(&self) -> impl Iterator<Item = &Slice> {
        self.slices.iter().filter(|s| !s.amount.is_zero())
    }
}

// ---------------------------------------------------------------------------
// Cumulative trend
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct TrendBand {
    pub leaf: Leaf,
    /// Running outflow per month; positive means money spent.
    pub cumulative: Vec<Decimal>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrendSeries {
    pub months: Vec<MonthKey>,
    pub bands: Vec<TrendBand>,
    pub income: Vec<Decimal>,
}

fn running_sum(values: impl Iterator<Item = Decimal>) -> Vec<Decimal> {
    values
        .scan(Decimal::ZERO, |acc, v| {
            *acc += v;
            Some(*acc)
        })
        .collect()
}

impl TrendSeries {
    /// `rows` must be in ascending month order.
    pub fn from_rows(rows: &[&AggregateRow]) -> Self {
        let bands = Leaf::expenses()
            .map(|leaf| TrendBand {
                leaf,
                cumulative: running_sum(rows.iter().map(|r| -r.amount(leaf))),
            })
            .collect();
        Self {
            months: rows.iter().map(|r| r.month).collect(),
            bands,
            income: running_sum(rows.iter().map(|r| r.income())),
        }
    }

    /// Upper edge of each band once stacked in schema order.
    pub fn stacked(&self) -> Vec<Vec<Decimal>> {
        let mut base = vec![Decimal::ZERO; self.months.len()];
        self.bands
            .iter()
            .map(|band| {
                for (b, v) in base.iter_mut().zip(&band.cumulative) {
                    *b += *v;
                }
                base.clone()
            })
            .collect()
    }

    pub fn total_outflow(&self) -> Vec<Decimal> {
        self.stacked().pop().unwrap_or_else(|| vec![Decimal::ZERO; self.months.len()])
    }

    pub fn is_empty(&self) -> bool {
        self.months.is_empty()
    }
}

/// Palette name shown in legends.
pub fn palette_name(palette: Palette) -> &'static str {
    match palette {
        Palette::Oranges => "oranges",
        Palette::Blues => "blues",
        Palette::Reds => "reds",
        Palette::Greens => "greens",
        Palette::Purples => "purples",
        Palette::Greys => "greys",
    }
}
