use std::path::Path;
use std::str::FromStr;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::error::{Result, TrackerError};
use crate::models::{Statement, TransactionRecord};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Parse a bank-formatted amount: `-1.234,56`, `-1,234.56`, `1234.5 €`, `(50,00)`.
pub fn parse_amount(raw: &str) -> Option<Decimal> {
    let s: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '€' && *c != '$' && *c != '"')
        .collect();
    if s.is_empty() {
        return None;
    }
    if let Some(inner) = s.strip_prefix('(').and_then(|v| v.strip_suffix(')')) {
        return parse_amount(inner).map(|d| -d);
    }

    let normalized = match (s.rfind('.'), s.rfind(',')) {
        // Whichever separator comes last is the decimal point.
        (Some(dot), Some(comma)) if comma > dot => s.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => s.replace(',', ""),
        (None, Some(_)) if thousands_only(&s, ',') => s.replace(',', ""),
        (None, Some(_)) => s.replace(',', "."),
        (Some(_), None) if thousands_only(&s, '.') => s.replace('.', ""),
        _ => s,
    };
    Decimal::from_str(&normalized).ok()
}

static COMMA_THOUSANDS: LazyLock<Option<Regex>> = LazyLock::new(|| thousands_pattern(','));
static DOT_THOUSANDS: LazyLock<Option<Regex>> = LazyLock::new(|| thousands_pattern('.'));

fn thousands_pattern(sep: char) -> Option<Regex> {
    let sep = regex::escape(&sep.to_string());
    Regex::new(&format!(r"^[-+]?\d{{1,3}}({sep}\d{{3}}){{2,}}$")).ok()
}

/// Only thousands groups, e.g. `1.234.567`: at least two full groups after the lead.
fn thousands_only(s: &str, sep: char) -> bool {
    let re = match sep {
        ',' => COMMA_THOUSANDS.as_ref(),
        '.' => DOT_THOUSANDS.as_ref(),
        _ => None,
    };
    re.is_some_and(|re| re.is_match(s))
}

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    ["%d/%m/%Y", "%Y-%m-%d", "%d-%m-%Y", "%d/%m/%y"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
}

#[cfg(any(feature = "xls", test))]
pub fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    // Excel epoch is 1899-12-30 (accounting for the 1900 leap year bug)
    let base = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    base.checked_add_signed(chrono::Duration::days(serial.trunc() as i64))
}

/// Spreadsheet cell reduced to what the parsers need.
#[derive(Debug, Clone, PartialEq)]
enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Date(NaiveDate),
}

impl Cell {
    fn text(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(s) => s.trim().to_string(),
            Cell::Number(n) => n.to_string(),
            Cell::Date(d) => d.format("%d/%m/%Y").to_string(),
        }
    }

    fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

// ---------------------------------------------------------------------------
// Column layout
// ---------------------------------------------------------------------------

const DATE_HEADERS: &[&str] = &["F. VALOR", "FECHA VALOR", "VALUE_DATE"];
const SUBCATEGORY_HEADERS: &[&str] = &["SUBCATEGORÍA", "SUBCATEGORIA", "SUBCATEGORY"];
const DESCRIPTION_HEADERS: &[&str] = &["DESCRIPCIÓN", "DESCRIPCION", "DESCRIPTION"];
const AMOUNT_HEADERS: &[&str] = &["IMPORTE (€)", "IMPORTE", "AMOUNT"];
const BALANCE_HEADERS: &[&str] = &["SALDO (€)", "SALDO", "RUNNING_BALANCE"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ColumnMap {
    date: usize,
    subcategory: usize,
    description: usize,
    amount: usize,
    balance: usize,
}

impl ColumnMap {
    fn from_header(cells: &[String]) -> Result<Self> {
        let find = |names: &[&str]| -> Result<usize> {
            cells
                .iter()
                .position(|c| {
                    let c = c.trim().to_uppercase();
                    names.iter().any(|n| c == *n)
                })
                .ok_or_else(|| TrackerError::MissingColumn(names[0].to_string()))
        };
        Ok(Self {
            date: find(DATE_HEADERS)?,
            subcategory: find(SUBCATEGORY_HEADERS)?,
            description: find(DESCRIPTION_HEADERS)?,
            amount: find(AMOUNT_HEADERS)?,
            balance: find(BALANCE_HEADERS)?,
        })
    }

    fn width(&self) -> usize {
        [self.date, self.subcategory, self.description, self.amount, self.balance]
            .into_iter()
            .max()
            .unwrap_or(0)
            + 1
    }
}

fn malformed(row: usize, column: &str, reason: impl Into<String>) -> TrackerError {
    TrackerError::MalformedInput {
        row,
        column: column.to_string(),
        reason: reason.into(),
    }
}

fn cell_date(cell: &Cell, row: usize) -> Result<NaiveDate> {
    match cell {
        Cell::Date(d) => Ok(*d),
        #[cfg(feature = "xls")]
        Cell::Number(n) => excel_serial_to_date(*n)
            .ok_or_else(|| malformed(row, DATE_HEADERS[0], format!("invalid serial date {n}"))),
        Cell::Text(s) => parse_date(s)
            .ok_or_else(|| malformed(row, DATE_HEADERS[0], format!("invalid date {s:?}"))),
        _ => Err(malformed(row, DATE_HEADERS[0], "missing date")),
    }
}

fn cell_decimal(cell: &Cell, row: usize, column: &str) -> Result<Decimal> {
    match cell {
        Cell::Number(n) => Decimal::try_from(*n)
            .map(|d| d.round_dp(2))
            .map_err(|_| malformed(row, column, format!("invalid number {n}"))),
        Cell::Text(s) => {
            parse_amount(s).ok_or_else(|| malformed(row, column, format!("not a number: {s:?}")))
        }
        Cell::Empty => Err(malformed(row, column, "missing value")),
        Cell::Date(_) => Err(malformed(row, column, "expected a number, found a date")),
    }
}

/// Turn one data row into a record. `row` is the 1-based row in the file.
fn parse_row(cols: &ColumnMap, cells: &[Cell], row: usize) -> Result<TransactionRecord> {
    let get = |i: usize| cells.get(i).unwrap_or(&Cell::Empty);
    let subcategory = get(cols.subcategory).text();
    Ok(TransactionRecord {
        value_date: cell_date(get(cols.date), row)?,
        amount: cell_decimal(get(cols.amount), row, AMOUNT_HEADERS[0])?,
        running_balance: cell_decimal(get(cols.balance), row, BALANCE_HEADERS[0])?,
        description: get(cols.description).text(),
        subcategory: if subcategory.is_empty() { None } else { Some(subcategory) },
    })
}

// ---------------------------------------------------------------------------
// Importer kinds: enum dispatch instead of trait objects
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportOptions {
    pub sheet_name: String,
    /// Zero-based row holding the column headers in spreadsheet exports.
    pub header_row: usize,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            sheet_name: "Movimientos".to_string(),
            header_row: 5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImporterKind {
    #[cfg(feature = "xls")]
    IngSpreadsheet,
    Csv,
}

const ALL_IMPORTERS: &[ImporterKind] = &[
    #[cfg(feature = "xls")]
    ImporterKind::IngSpreadsheet,
    ImporterKind::Csv,
];

impl ImporterKind {
    pub fn key(&self) -> &'static str {
        match self {
            #[cfg(feature = "xls")]
            Self::IngSpreadsheet => "ing_xls",
            Self::Csv => "csv",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            #[cfg(feature = "xls")]
            Self::IngSpreadsheet => "ING movements spreadsheet",
            Self::Csv => "CSV movements export",
        }
    }

    fn extensions(&self) -> &[&str] {
        match self {
            #[cfg(feature = "xls")]
            Self::IngSpreadsheet => &["xls", "xlsx", "ods"],
            Self::Csv => &["csv", "txt"],
        }
    }

    pub fn detect(&self, file_path: &Path) -> bool {
        file_path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| self.extensions().iter().any(|x| ext.eq_ignore_ascii_case(x)))
    }

    pub fn parse(&self, file_path: &Path, options: &ImportOptions) -> Result<Vec<TransactionRecord>> {
        match self {
            #[cfg(feature = "xls")]
            Self::IngSpreadsheet => parse_spreadsheet(file_path, options),
            Self::Csv => parse_csv(file_path),
        }
    }
}

pub fn get_by_key(key: &str) -> Option<ImporterKind> {
    ALL_IMPORTERS.iter().find(|i| i.key() == key).copied()
}

pub fn get_for_file(file_path: &Path) -> Option<ImporterKind> {
    ALL_IMPORTERS.iter().find(|i| i.detect(file_path)).copied()
}

pub fn supported_keys() -> Vec<&'static str> {
    ALL_IMPORTERS.iter().map(|i| i.key()).collect()
}

// ---------------------------------------------------------------------------
// import_file
// ---------------------------------------------------------------------------

pub fn import_file(
    file_path: &Path,
    format_key: Option<&str>,
    options: &ImportOptions,
) -> Result<Statement> {
    let importer = match format_key {
        Some(key) => get_by_key(key).ok_or_else(|| TrackerError::UnknownFormat(key.to_string()))?,
        None => get_for_file(file_path).ok_or_else(|| {
            TrackerError::UnknownFormat(format!(
                "{} (use --format with one of: {})",
                file_path.display(),
                supported_keys().join(", ")
            ))
        })?,
    };
    debug!(importer = importer.name(), path = %file_path.display(), "parsing input");

    let records = importer.parse(file_path, options)?;
    let statement = Statement::new(records)?;
    info!(
        records = statement.len(),
        from = ?statement.earliest().map(|r| r.value_date),
        to = ?statement.latest().map(|r| r.value_date),
        "imported movements"
    );
    Ok(statement)
}

// ---------------------------------------------------------------------------
// ING spreadsheet parser (feature-gated)
// ---------------------------------------------------------------------------

#[cfg(feature = "xls")]
fn to_cell(data: &calamine::Data) -> Cell {
    use calamine::Data;
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Float(f) => Cell::Number(*f),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::DateTime(dt) => excel_serial_to_date(dt.as_f64()).map_or(Cell::Empty, Cell::Date),
        Data::DateTimeIso(s) => Cell::Text(s.chars().take(10).collect()),
        other => Cell::Text(other.to_string()),
    }
}

#[cfg(feature = "xls")]
fn parse_spreadsheet(file_path: &Path, options: &ImportOptions) -> Result<Vec<TransactionRecord>> {
    use calamine::Reader;

    let mut workbook = calamine::open_workbook_auto(file_path)
        .map_err(|e| TrackerError::Spreadsheet(format!("failed to open {}: {e}", file_path.display())))?;
    if !workbook.sheet_names().iter().any(|n| n == &options.sheet_name) {
        return Err(TrackerError::MissingSheet(options.sheet_name.clone()));
    }
    let range = workbook
        .worksheet_range(&options.sheet_name)
        .map_err(|e| TrackerError::Spreadsheet(e.to_string()))?;

    records_from_range(&range, options.header_row)
}

/// `header_row` is a zero-based sheet row. calamine ranges start at the first
/// used cell, so row indices are shifted by the range start.
#[cfg(feature = "xls")]
fn records_from_range(
    range: &calamine::Range<calamine::Data>,
    header_row: usize,
) -> Result<Vec<TransactionRecord>> {
    let first = range.start().map_or(0, |(r, _)| r as usize);
    let mut rows = range
        .rows()
        .enumerate()
        .map(|(i, row)| (first + i, row))
        .skip_while(|(r, _)| *r < header_row);
    let header = match rows.next() {
        Some((r, cells)) if r == header_row => cells,
        _ => return Err(TrackerError::MissingColumn(DATE_HEADERS[0].to_string())),
    };
    let header: Vec<String> = header.iter().map(|d| to_cell(d).text()).collect();
    let cols = ColumnMap::from_header(&header)?;

    let mut records = Vec::new();
    for (r, row) in rows {
        let cells: Vec<Cell> = row.iter().map(to_cell).collect();
        if cells.iter().all(Cell::is_empty) {
            continue;
        }
        records.push(parse_row(&cols, &cells, r + 1)?);
    }
    Ok(records)
}

// ---------------------------------------------------------------------------
// CSV parser
// ---------------------------------------------------------------------------

fn parse_csv(file_path: &Path) -> Result<Vec<TransactionRecord>> {
    let file = std::fs::File::open(file_path)?;
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(std::io::BufReader::new(file));
    let mut records = Vec::new();
    let mut cols: Option<ColumnMap> = None;

    for (i, result) in rdr.records().enumerate() {
        let record = result?;
        let row = record.position().map_or(i + 1, |p| p.line() as usize);
        let Some(map) = cols else {
            // Preamble lines (account name, export date) precede the header.
            let cells: Vec<String> = record.iter().map(String::from).collect();
            if let Ok(map) = ColumnMap::from_header(&cells) {
                cols = Some(map);
            }
            continue;
        };
        if record.iter().all(|f| f.trim().is_empty()) {
            continue;
        }
        if record.len() < map.width() {
            return Err(malformed(row, "row", format!("expected {} fields, found {}", map.width(), record.len())));
        }
        let cells: Vec<Cell> = record.iter().map(|f| Cell::Text(f.to_string())).collect();
        records.push(parse_row(&map, &cells, row)?);
    }

    if cols.is_none() {
        return Err(TrackerError::MissingColumn(DATE_HEADERS[0].to_string()));
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const HEADER: &str = "F. VALOR,CATEGORÍA,SUBCATEGORÍA,DESCRIPCIÓN,COMENTARIO,IMPORTE (€),SALDO (€)";

    fn write_csv(dir: &Path, name: &str, body: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("-12,50"), Some(dec!(-12.50)));
        assert_eq!(parse_amount("-1.234,56"), Some(dec!(-1234.56)));
        assert_eq!(parse_amount("1,234.56"), Some(dec!(1234.56)));
        assert_eq!(parse_amount("1500.00"), Some(dec!(1500.00)));
        assert_eq!(parse_amount(" 487,50 € "), Some(dec!(487.50)));
        assert_eq!(parse_amount("1.234.567"), Some(dec!(1234567)));
        assert_eq!(parse_amount("(50,00)"), Some(dec!(-50.00)));
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("n/a"), None);
    }

    #[test]
    fn test_thousands_only() {
        assert!(thousands_only("1.234.567", '.'));
        assert!(thousands_only("-1,234,567", ','));
        assert!(!thousands_only("1.234", '.'));
        assert!(!thousands_only("1,234,567", '.'));
        assert_eq!(parse_amount("1,234"), Some(dec!(1.234)));
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date("05/03/2024"), NaiveDate::from_ymd_opt(2024, 3, 5));
        assert_eq!(parse_date("2024-03-05"), NaiveDate::from_ymd_opt(2024, 3, 5));
        assert_eq!(parse_date("31/02/2024"), None);
        assert_eq!(parse_date("yesterday"), None);
    }

    #[test]
    fn test_excel_serial_to_date() {
        assert_eq!(excel_serial_to_date(45667.0), NaiveDate::from_ymd_opt(2025, 1, 10));
    }

    #[test]
    fn test_column_map_requires_all_columns() {
        let header: Vec<String> = ["F. VALOR", "DESCRIPCIÓN", "IMPORTE (€)", "SALDO (€)"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let msg = ColumnMap::from_header(&header).unwrap_err().to_string();
        assert!(msg.contains("SUBCATEGORÍA"), "got: {msg}");
    }

    #[test]
    fn test_parse_csv_with_preamble() {
        let dir = tempfile::tempdir().unwrap();
        let body = format!(
            "Número de cuenta: ES00 0000\n\n{HEADER}\n\
05/03/2024,Restauración,,Pago en UBER *EATS,,\"-12,50\",\"487,50\"\n\
01/03/2024,Nómina,Nómina o Pensión,Nomina,,\"1.500,00\",\"500,00\"\n"
        );
        let path = write_csv(dir.path(), "movements.csv", &body);
        let records = ImporterKind::Csv.parse(&path, &ImportOptions::default()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].amount, dec!(-12.50));
        assert_eq!(records[0].running_balance, dec!(487.50));
        assert_eq!(records[0].subcategory, None);
        assert_eq!(records[1].subcategory.as_deref(), Some("Nómina o Pensión"));
        assert_eq!(records[1].amount, dec!(1500.00));
    }

    #[test]
    fn test_parse_csv_rejects_non_numeric_amount() {
        let dir = tempfile::tempdir().unwrap();
        let body = format!("{HEADER}\n05/03/2024,,,Pago,,abc,\"487,50\"\n");
        let path = write_csv(dir.path(), "bad.csv", &body);
        let msg = ImporterKind::Csv
            .parse(&path, &ImportOptions::default())
            .unwrap_err()
            .to_string();
        assert!(msg.contains("row 2"), "got: {msg}");
        assert!(msg.contains("IMPORTE"), "got: {msg}");
    }

    #[test]
    fn test_parse_csv_without_header_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(dir.path(), "nohdr.csv", "05/03/2024,x,-1,2\n");
        let result = ImporterKind::Csv.parse(&path, &ImportOptions::default());
        assert!(matches!(result, Err(TrackerError::MissingColumn(_))));
    }

    #[test]
    fn test_import_file_validates_order() {
        let dir = tempfile::tempdir().unwrap();
        let body = format!(
            "{HEADER}\n01/03/2024,,,A,,-1,10\n05/03/2024,,,B,,-1,9\n"
        );
        let path = write_csv(dir.path(), "unordered.csv", &body);
        let result = import_file(&path, None, &ImportOptions::default());
        assert!(matches!(result, Err(TrackerError::UnorderedRecords { .. })));
    }

    #[test]
    fn test_import_file_detects_format_by_extension() {
        assert_eq!(get_for_file(Path::new("Movements.csv")), Some(ImporterKind::Csv));
        #[cfg(feature = "xls")]
        assert_eq!(get_for_file(Path::new("Movements.xls")), Some(ImporterKind::IngSpreadsheet));
        assert_eq!(get_for_file(Path::new("Movements.pdf")), None);
        assert!(get_by_key("ofx").is_none());
    }
}

#[cfg(all(test, feature = "xls"))]
mod spreadsheet_tests {
    use super::*;
    use calamine::{Data, Range};
    use rust_decimal_macros::dec;
    use rust_xlsxwriter::{Format, Workbook};

    const COLUMNS: [&str; 7] = [
        "F. VALOR",
        "CATEGORÍA",
        "SUBCATEGORÍA",
        "DESCRIPCIÓN",
        "COMENTARIO",
        "IMPORTE (€)",
        "SALDO (€)",
    ];

    fn text(s: &str) -> Data {
        Data::String(s.to_string())
    }

    /// Range whose first used row is sheet row 1, header on sheet row 5.
    fn ing_range() -> Range<Data> {
        let mut range = Range::new((1, 0), (6, 6));
        range.set_value((1, 0), text("Número de cuenta: ES00 0000"));
        range.set_value((3, 0), text("Fecha de exportación: 06/03/2024"));
        for (c, name) in COLUMNS.iter().enumerate() {
            range.set_value((5, c as u32), text(name));
        }
        range.set_value((6, 0), Data::Float(45356.0));
        range.set_value((6, 3), text("Pago en UBER *EATS"));
        range.set_value((6, 5), Data::Float(-12.499999999));
        range.set_value((6, 6), Data::Int(487));
        range
    }

    #[test]
    fn test_header_row_is_absolute_in_sheet() {
        let records = records_from_range(&ing_range(), 5).unwrap();
        assert_eq!(records.len(), 1);
        let rec = &records[0];
        assert_eq!(rec.value_date, NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
        assert_eq!(rec.amount, dec!(-12.50));
        assert_eq!(rec.running_balance, dec!(487));
        assert_eq!(rec.description, "Pago en UBER *EATS");
        assert_eq!(rec.subcategory, None);
    }

    #[test]
    fn test_header_row_above_used_range_is_missing() {
        let result = records_from_range(&ing_range(), 0);
        assert!(matches!(result, Err(TrackerError::MissingColumn(_))));
        let result = records_from_range(&ing_range(), 3);
        assert!(matches!(result, Err(TrackerError::MissingColumn(_))));
    }

    #[test]
    fn test_spreadsheet_row_numbers_are_sheet_rows() {
        let mut range = ing_range();
        range.set_value((6, 5), text("lots"));
        let msg = records_from_range(&range, 5).unwrap_err().to_string();
        assert!(msg.contains("row 7"), "got: {msg}");
    }

    /// ING-style workbook: blank first row, preamble lines, header on row 5.
    fn write_workbook(path: &Path, sheet: &str) {
        let mut workbook = Workbook::new();
        let date_format = Format::new().set_num_format("dd/mm/yyyy");
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(sheet).unwrap();
        worksheet.write_string(1, 0, "Número de cuenta: ES00 0000").unwrap();
        worksheet.write_string(3, 0, "Titular: Ana").unwrap();
        for (c, name) in COLUMNS.iter().enumerate() {
            worksheet.write_string(5, c as u16, *name).unwrap();
        }
        // Formatted date cell, read back as a calamine DateTime.
        worksheet.write_number_with_format(6, 0, 45356.0, &date_format).unwrap();
        worksheet.write_string(6, 1, "Restauración").unwrap();
        worksheet.write_string(6, 3, "Pago en UBER *EATS").unwrap();
        worksheet.write_number(6, 5, -12.5).unwrap();
        worksheet.write_number(6, 6, 487.5).unwrap();
        // Bare serial number in the date column.
        worksheet.write_number(7, 0, 45352.0).unwrap();
        worksheet.write_string(7, 2, "Nómina o Pensión").unwrap();
        worksheet.write_string(7, 3, "NOMINA EMPRESA").unwrap();
        worksheet.write_number(7, 5, 1500.004).unwrap();
        worksheet.write_number(7, 6, 500.0).unwrap();
        workbook.save(path).unwrap();
    }

    #[test]
    fn test_parse_ing_workbook() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Movements.xlsx");
        write_workbook(&path, "Movimientos");

        let records = ImporterKind::IngSpreadsheet
            .parse(&path, &ImportOptions::default())
            .unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].value_date, NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
        assert_eq!(records[0].amount, dec!(-12.50));
        assert_eq!(records[0].running_balance, dec!(487.50));
        assert_eq!(records[1].value_date, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(records[1].amount, dec!(1500.00));
        assert_eq!(records[1].subcategory.as_deref(), Some("Nómina o Pensión"));

        let statement = import_file(&path, None, &ImportOptions::default()).unwrap();
        assert_eq!(statement.len(), 2);
    }

    #[test]
    fn test_parse_workbook_missing_sheet() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Movements.xlsx");
        write_workbook(&path, "Sheet1");

        let result = ImporterKind::IngSpreadsheet.parse(&path, &ImportOptions::default());
        assert!(matches!(result, Err(TrackerError::MissingSheet(ref s)) if s == "Movimientos"));

        let options = ImportOptions {
            sheet_name: "Sheet1".to_string(),
            ..ImportOptions::default()
        };
        let records = ImporterKind::IngSpreadsheet.parse(&path, &options).unwrap();
        assert_eq!(records.len(), 2);
    }
}
