use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;

use crate::error::{Result, TrackerError};

/// One movement from the bank export. Immutable once parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionRecord {
    pub value_date: NaiveDate,
    pub amount: Decimal,
    pub running_balance: Decimal,
    pub description: String,
    pub subcategory: Option<String>,
}

impl TransactionRecord {
    pub fn month(&self) -> MonthKey {
        MonthKey::of(self.value_date)
    }
}

/// Calendar month used as the partition and history key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

impl MonthKey {
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(TrackerError::InvalidMonth(format!("{year:04}-{month:02}")));
        }
        Ok(Self { year, month })
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn next(self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for MonthKey {
    type Err = TrackerError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || TrackerError::InvalidMonth(s.to_string());
        let (y, m) = s.trim().split_once('-').ok_or_else(invalid)?;
        let year: i32 = y.parse().map_err(|_| invalid())?;
        let month: u32 = m.parse().map_err(|_| invalid())?;
        MonthKey::new(year, month).map_err(|_| invalid())
    }
}

/// A batch of records ordered newest first.
///
/// Construction checks that `value_date` never increases along the batch, so
/// the first record is the most recent and the last is the oldest.
#[derive(Debug, Clone, Default)]
pub struct Statement {
    records: Vec<TransactionRecord>,
}

impl Statement {
    pub fn new(records: Vec<TransactionRecord>) -> Result<Self> {
        for (i, pair) in records.windows(2).enumerate() {
            if pair[1].value_date > pair[0].value_date {
                return Err(TrackerError::UnorderedRecords {
                    index: i + 1,
                    earlier: pair[0].value_date.to_string(),
                    later: pair[1].value_date.to_string(),
                });
            }
        }
        Ok(Self { records })
    }

    pub fn records(&self) -> &[TransactionRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn latest(&self) -> Option<&TransactionRecord> {
        self.records.first()
    }

    pub fn earliest(&self) -> Option<&TransactionRecord> {
        self.records.last()
    }
}

#[cfg(test)]
pub(crate) fn record(
    date: &str,
    amount: Decimal,
    balance: Decimal,
    description: &str,
    subcategory: &str,
) -> TransactionRecord {
    TransactionRecord {
        value_date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
        amount,
        running_balance: balance,
        description: description.to_string(),
        subcategory: if subcategory.is_empty() {
            None
        } else {
            Some(subcategory.to_string())
        },
    }
}
