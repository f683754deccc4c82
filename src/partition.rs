use crate::models::{MonthKey, Statement, TransactionRecord};

#[derive(Debug, Clone, PartialEq)]
pub struct MonthPartition<'a> {
    pub month: MonthKey,
    /// Records of this month, newest first. Empty for months without movements.
    pub records: &'a [TransactionRecord],
}

/// Lazy iterator over every month from the statement's earliest record to its
/// latest, oldest month first.
#[derive(Debug, Clone)]
pub struct MonthPartitions<'a> {
    remaining: &'a [TransactionRecord],
    next: Option<MonthKey>,
    last: Option<MonthKey>,
}

pub fn partition(statement: &Statement) -> MonthPartitions<'_> {
    MonthPartitions {
        remaining: statement.records(),
        next: statement.earliest().map(TransactionRecord::month),
        last: statement.latest().map(TransactionRecord::month),
    }
}

impl<'a> Iterator for MonthPartitions<'a> {
    type Item = MonthPartition<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let month = self.next?;
        let last = self.last?;
        if month > last {
            return None;
        }

        // Newest first, so the current (oldest pending) month sits at the tail.
        let split = self
            .remaining
            .iter()
            .rposition(|r| r.month() != month)
            .map_or(0, |i| i + 1);
        let (rest, records) = self.remaining.split_at(split);
        self.remaining = rest;
        self.next = Some(month.next());

        Some(MonthPartition { month, records })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match (self.next, self.last) {
            (Some(n), Some(l)) if n <= l => {
                let span = (l.year - n.year) * 12 + l.month as i32 - n.month as i32 + 1;
                (span as usize, Some(span as usize))
            }
            _ => (0, Some(0)),
        }
    }
}

impl ExactSizeIterator for MonthPartitions<'_> {}
