//! Persisted monthly history.
//!
//! The table is a CSV file with a two-line header: the first line holds the
//! category of each column, the second its subcategory (`/` when unsplit).
//! Every following line is one month.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::aggregator::AggregateRow;
use crate::categories::{Leaf, NO_SUBCATEGORY};
use crate::error::{Result, TrackerError};
use crate::models::MonthKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    Month,
    Leaf(Leaf),
    Unaccounted,
    TotalSum,
    Balance,
}

impl Column {
    fn schema() -> Vec<Column> {
        let mut cols = vec![Column::Month];
        cols.extend(Leaf::ALL.into_iter().map(Column::Leaf));
        cols.extend([Column::Unaccounted, Column::TotalSum, Column::Balance]);
        cols
    }

    fn labels(&self) -> (&'static str, &'static str) {
        match self {
            Column::Month => ("Month", NO_SUBCATEGORY),
            Column::Leaf(leaf) => (leaf.category(), leaf.subcategory()),
            Column::Unaccounted => ("Unaccounted", NO_SUBCATEGORY),
            Column::TotalSum => ("Total Sum", NO_SUBCATEGORY),
            Column::Balance => ("Balance", NO_SUBCATEGORY),
        }
    }

    fn from_labels(category: &str, subcategory: &str) -> Option<Column> {
        match (category, subcategory) {
            ("Month", NO_SUBCATEGORY) => Some(Column::Month),
            ("Unaccounted", NO_SUBCATEGORY) => Some(Column::Unaccounted),
            ("Total Sum", NO_SUBCATEGORY) => Some(Column::TotalSum),
            ("Balance", NO_SUBCATEGORY) => Some(Column::Balance),
            _ => Leaf::from_labels(category, subcategory).map(Column::Leaf),
        }
    }

    fn value(&self, row: &AggregateRow) -> String {
        match self {
            Column::Month => row.month.to_string(),
            Column::Leaf(leaf) => row.amount(*leaf).to_string(),
            Column::Unaccounted => row.unaccounted.to_string(),
            Column::TotalSum => row.total_accounted.to_string(),
            Column::Balance => row.total_actual_change.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    Appended,
    Replaced,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeSummary {
    pub appended: usize,
    pub replaced: usize,
}

/// Monthly rows keyed by month; at most one row per month.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoryTable {
    rows: BTreeMap<MonthKey, AggregateRow>,
}

impl HistoryTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a month's row, replacing any previous row for the same month.
    pub fn append_or_replace(&mut self, row: AggregateRow) -> MergeOutcome {
        match self.rows.insert(row.month, row) {
            Some(_) => MergeOutcome::Replaced,
            None => MergeOutcome::Appended,
        }
    }

    pub fn merge_rows(&mut self, rows: impl IntoIterator<Item = AggregateRow>) -> MergeSummary {
        let mut summary = MergeSummary::default();
        for row in rows {
            match self.append_or_replace(row) {
                MergeOutcome::Appended => summary.appended += 1,
                MergeOutcome::Replaced => summary.replaced += 1,
            }
        }
        summary
    }

    pub fn rows(&self) -> impl DoubleEndedIterator<Item = &AggregateRow> + ExactSizeIterator {
        self.rows.values()
    }

    pub fn get(&self, month: MonthKey) -> Option<&AggregateRow> {
        self.rows.get(&month)
    }

    pub fn latest(&self) -> Option<&AggregateRow> {
        self.rows.values().next_back()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// (first, last) month in the table.
    pub fn month_range(&self) -> Option<(MonthKey, MonthKey)> {
        let first = *self.rows.keys().next()?;
        let last = *self.rows.keys().next_back()?;
        Some((first, last))
    }
}

pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<HistoryTable> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no history file, starting empty");
            return Ok(HistoryTable::new());
        }
        let file = std::fs::File::open(&self.path)?;
        let table = read_table(std::io::BufReader::new(file))?;
        info!(path = %self.path.display(), rows = table.len(), "loaded history");
        Ok(table)
    }

    pub fn save(&self, table: &HistoryTable) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("csv.tmp");
        {
            let file = std::fs::File::create(&tmp)?;
            write_table(std::io::BufWriter::new(file), table)?;
        }
        std::fs::rename(&tmp, &self.path)?;
        info!(path = %self.path.display(), rows = table.len(), "saved history");
        Ok(())
    }
}

fn write_table<W: std::io::Write>(writer: W, table: &HistoryTable) -> Result<()> {
    let schema = Column::schema();
    let mut wtr = csv::WriterBuilder::new().has_headers(false).from_writer(writer);
    wtr.write_record(schema.iter().map(|c| c.labels().0))?;
    wtr.write_record(schema.iter().map(|c| c.labels().1))?;
    for row in table.rows() {
        wtr.write_record(schema.iter().map(|c| c.value(row)))?;
    }
    wtr.flush()?;
    Ok(())
}

fn history_err(msg: impl Into<String>) -> TrackerError {
    TrackerError::History(msg.into())
}

fn read_table<R: std::io::Read>(reader: R) -> Result<HistoryTable> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_reader(reader);
    let mut records = rdr.records();

    let categories = records
        .next()
        .ok_or_else(|| history_err("missing category header line"))??;
    let subcategories = records
        .next()
        .ok_or_else(|| history_err("missing subcategory header line"))??;

    let mut columns = Vec::with_capacity(categories.len());
    for (cat, sub) in categories.iter().zip(subcategories.iter()) {
        let col = Column::from_labels(cat.trim(), sub.trim())
            .ok_or_else(|| history_err(format!("unknown column ({cat}, {sub})")))?;
        if columns.contains(&col) {
            return Err(history_err(format!("duplicate column ({cat}, {sub})")));
        }
        columns.push(col);
    }
    for col in Column::schema() {
        if !columns.contains(&col) {
            let (cat, sub) = col.labels();
            return Err(history_err(format!("missing column ({cat}, {sub})")));
        }
    }

    let mut table = HistoryTable::new();
    for (i, result) in records.enumerate() {
        let line = i + 3;
        let record = result?;
        let row = parse_row(&columns, &record, line)?;
        if table.get(row.month).is_some() {
            return Err(history_err(format!("line {line}: duplicate month {}", row.month)));
        }
        if !row.is_reconciled() {
            return Err(history_err(format!(
                "line {line}: Unaccounted does not equal Balance minus Total Sum for {}",
                row.month
            )));
        }
        table.append_or_replace(row);
    }
    Ok(table)
}

fn parse_row(columns: &[Column], record: &csv::StringRecord, line: usize) -> Result<AggregateRow> {
    let mut month = None;
    let mut amounts = BTreeMap::new();
    let (mut unaccounted, mut total_sum, mut balance) = (None, None, None);

    for (col, raw) in columns.iter().zip(record.iter()) {
        let raw = raw.trim();
        if let Column::Month = col {
            month = Some(
                MonthKey::from_str(raw)
                    .map_err(|_| history_err(format!("line {line}: invalid month {raw:?}")))?,
            );
            continue;
        }
        let value = Decimal::from_str(raw).map_err(|_| {
            let (cat, sub) = col.labels();
            history_err(format!("line {line}: invalid amount {raw:?} in ({cat}, {sub})"))
        })?;
        match col {
            Column::Leaf(leaf) => {
                amounts.insert(*leaf, value);
            }
            Column::Unaccounted => unaccounted = Some(value),
            Column::TotalSum => total_sum = Some(value),
            Column::Balance => balance = Some(value),
            Column::Month => {}
        }
    }

    let short = || history_err(format!("line {line}: expected {} fields", columns.len()));
    Ok(AggregateRow {
        month: month.ok_or_else(short)?,
        amounts,
        total_accounted: total_sum.ok_or_else(short)?,
        total_actual_change: balance.ok_or_else(short)?,
        unaccounted: unaccounted.ok_or_else(short)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::aggregate_month;
    use crate::categories::Recreational;
    use crate::models::record;
    use crate::rules::RuleSet;
    use rust_decimal_macros::dec;

    fn row_for(year: i32, month: u32, uber_eats: Decimal) -> AggregateRow {
        let date = format!("{year:04}-{month:02}-10");
        let records = vec![record(&date, uber_eats, dec!(500) + uber_eats, "Pago en UBER *EATS", "")];
        aggregate_month(MonthKey::new(year, month).unwrap(), &records, &RuleSet::standard())
    }

    #[test]
    fn test_append_then_replace() {
        let mut table = HistoryTable::new();
        assert_eq!(table.append_or_replace(row_for(2024, 3, dec!(-10))), MergeOutcome::Appended);
        assert_eq!(table.append_or_replace(row_for(2024, 4, dec!(-20))), MergeOutcome::Appended);
        assert_eq!(table.append_or_replace(row_for(2024, 3, dec!(-30))), MergeOutcome::Replaced);
        assert_eq!(table.len(), 2);
        let march = table.get(MonthKey::new(2024, 3).unwrap()).unwrap();
        assert_eq!(march.amount(Leaf::Recreational(Recreational::UberEats)), dec!(-30));
    }

    #[test]
    fn test_rerun_with_extended_input_adds_one_row() {
        let mut table = HistoryTable::new();
        let first = table.merge_rows(vec![row_for(2024, 1, dec!(-1)), row_for(2024, 2, dec!(-2))]);
        assert_eq!(first, MergeSummary { appended: 2, replaced: 0 });
        let second = table.merge_rows(vec![
            row_for(2024, 1, dec!(-1)),
            row_for(2024, 2, dec!(-2)),
            row_for(2024, 3, dec!(-3)),
        ]);
        assert_eq!(second, MergeSummary { appended: 1, replaced: 2 });
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn test_rows_are_ordered_by_month() {
        let mut table = HistoryTable::new();
        table.append_or_replace(row_for(2024, 5, dec!(-1)));
        table.append_or_replace(row_for(2023, 11, dec!(-1)));
        table.append_or_replace(row_for(2024, 1, dec!(-1)));
        let months: Vec<String> = table.rows().map(|r| r.month.to_string()).collect();
        assert_eq!(months, vec!["2023-11", "2024-01", "2024-05"]);
        assert_eq!(table.latest().unwrap().month.to_string(), "2024-05");
        let (first, last) = table.month_range().unwrap();
        assert_eq!((first.to_string(), last.to_string()), ("2023-11".into(), "2024-05".into()));
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = HistoryStore::new(dir.path().join("Output").join("history.csv"));
        let table = store.load().unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = HistoryStore::new(dir.path().join("Output").join("history.csv"));
        let mut table = HistoryTable::new();
        table.merge_rows(vec![row_for(2024, 2, dec!(-12.50)), row_for(2024, 3, dec!(-7.25))]);
        store.save(&table).unwrap();
        let loaded = store.load().unwrap();
        assert_eq!(loaded, table);
        assert!(!dir.path().join("Output").join("history.csv.tmp").exists());
    }

    #[test]
    fn test_written_header_has_two_levels() {
        let mut buf = Vec::new();
        let mut table = HistoryTable::new();
        table.append_or_replace(row_for(2024, 3, dec!(-12.50)));
        write_table(&mut buf, &table).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Month,Savings,Eating Out Work,Uber To Work,Recreational,"));
        assert!(lines[0].ends_with("Unaccounted,Total Sum,Balance"));
        assert!(lines[1].starts_with("/,/,/,/,Uber Eats,Bars And Restaurants,Bizum,Psychologist"));
        assert!(lines[2].starts_with("2024-03,0,0,0,-12.50,"));
    }

    #[test]
    fn test_load_accepts_reordered_columns() {
        let csv = "\
Balance,Month,Unaccounted,Total Sum,Savings,Eating Out Work,Uber To Work,Recreational,Recreational,Recreational,Subscriptions,Subscriptions,Subscriptions,Income,Income
/,/,/,/,/,/,/,Uber Eats,Bars And Restaurants,Bizum,Psychologist,Dystopia,ChatGPT,Salary,Bizum Received
-20.00,2024-03,-7.50,-12.50,0,0,0,-12.50,0,0,0,0,0,0,0
";
        let table = read_table(csv.as_bytes()).unwrap();
        let row = table.get(MonthKey::new(2024, 3).unwrap()).unwrap();
        assert_eq!(row.unaccounted, dec!(-7.50));
        assert_eq!(row.amount(Leaf::Recreational(Recreational::UberEats)), dec!(-12.50));
    }

    #[test]
    fn test_load_rejects_missing_column() {
        let csv = "Month,Savings\n/,/\n2024-03,0\n";
        let msg = read_table(csv.as_bytes()).unwrap_err().to_string();
        assert!(msg.contains("missing column"), "got: {msg}");
    }

    #[test]
    fn test_load_rejects_duplicate_months() {
        let mut table = HistoryTable::new();
        table.append_or_replace(row_for(2024, 3, dec!(-1)));
        let mut buf = Vec::new();
        write_table(&mut buf, &table).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let dup = format!("{text}{}\n", text.lines().nth(2).unwrap());
        let msg = read_table(dup.as_bytes()).unwrap_err().to_string();
        assert!(msg.contains("duplicate month"), "got: {msg}");
    }

    #[test]
    fn test_load_rejects_broken_reconciliation() {
        let mut table = HistoryTable::new();
        table.append_or_replace(row_for(2024, 3, dec!(-1)));
        let mut buf = Vec::new();
        write_table(&mut buf, &table).unwrap();
        let text = String::from_utf8(buf).unwrap();
        // Last column is Balance; corrupt it.
        let mut lines: Vec<String> = text.lines().map(String::from).collect();
        let data = lines[2].rsplit_once(',').unwrap().0.to_string();
        lines[2] = format!("{data},999");
        let msg = read_table(lines.join("\n").as_bytes()).unwrap_err().to_string();
        assert!(msg.contains("Unaccounted does not equal"), "got: {msg}");
    }
}
