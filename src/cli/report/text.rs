use colored::Colorize;
use comfy_table::{Cell, CellAlignment, Table};
use rust_decimal::Decimal;

use crate::aggregator::AggregateRow;
use crate::categories::Leaf;
use crate::cli::{parse_period, ReportCommands};
use crate::error::Result;
use crate::fmt::{money, percent};
use crate::history::HistoryTable;
use crate::reports::{self, palette_name, DistributionSnapshot, SliceKind, TrendSeries};

pub fn render(cmd: &ReportCommands, table: &HistoryTable) -> Result<String> {
    match cmd {
        ReportCommands::Distribution { month, all, .. } => {
            let period = parse_period(month.as_deref(), *all)?;
            let (label, rows) = reports::select_rows(table, period)?;
            Ok(format_distribution(&DistributionSnapshot::from_rows(label, &rows)))
        }
        ReportCommands::Trend { .. } => {
            let (_, rows) = reports::select_rows(table, reports::Period::All)?;
            Ok(format_trend(&TrendSeries::from_rows(&rows)))
        }
    }
}

fn amount_cell(val: Decimal) -> Cell {
    Cell::new(money(val)).set_alignment(CellAlignment::Right)
}

fn unaccounted_cell(val: Decimal) -> Cell {
    let text = money(val);
    let styled = if val.is_zero() {
        text.as_str().green()
    } else {
        text.as_str().yellow()
    };
    Cell::new(styled).set_alignment(CellAlignment::Right)
}

// ---------------------------------------------------------------------------
// Pure formatting functions (report data → String)
// ---------------------------------------------------------------------------

/// One line per month processed by a run.
pub fn format_summary(rows: &[AggregateRow]) -> String {
    let mut table = Table::new();
    table.set_header(vec!["Month", "Income", "Accounted", "Actual Change", "Unaccounted"]);
    for row in rows {
        table.add_row(vec![
            Cell::new(row.month.to_string()),
            amount_cell(row.income()),
            amount_cell(row.total_accounted),
            amount_cell(row.total_actual_change),
            unaccounted_cell(row.unaccounted),
        ]);
    }
    format!("{}\n{table}", "Monthly Summary".bold())
}

/// The full persisted table, one column per leaf.
pub fn format_history(history: &HistoryTable) -> String {
    if history.is_empty() {
        return "No history yet. Run `spendtrack run` first.".to_string();
    }
    let mut table = Table::new();
    let mut header = vec!["Month".to_string()];
    header.extend(Leaf::ALL.iter().map(|l| l.label().to_string()));
    header.extend(["Unaccounted", "Total Sum", "Balance"].map(String::from));
    table.set_header(header);

    for row in history.rows() {
        let mut cells = vec![Cell::new(row.month.to_string())];
        cells.extend(Leaf::ALL.iter().map(|l| amount_cell(row.amount(*l))));
        cells.push(unaccounted_cell(row.unaccounted));
        cells.push(amount_cell(row.total_accounted));
        cells.push(amount_cell(row.total_actual_change));
        table.add_row(cells);
    }
    format!("{}\n{table}", "Tracked Expenses".bold())
}

pub fn format_distribution(snap: &DistributionSnapshot) -> String {
    let mut table = Table::new();
    table.set_header(vec!["Category", "Amount", "Share"]);
    for slice in &snap.slices {
        let label = match slice.kind {
            SliceKind::Unaccounted => slice.label.as_str().yellow().to_string(),
            SliceKind::Leaf(_) => slice.label.clone(),
        };
        table.add_row(vec![
            Cell::new(label),
            amount_cell(slice.amount),
            Cell::new(percent(slice.percent)).set_alignment(CellAlignment::Right),
        ]);
    }
    table.add_row(vec![
        Cell::new("Total".bold()),
        amount_cell(snap.total),
        Cell::new(""),
    ]);
    let title = format!("Spending Distribution: {}", snap.period);
    format!("{}\n{table}", title.as_str().bold())
}

pub fn format_trend(trend: &TrendSeries) -> String {
    if trend.is_empty() {
        return "No months to chart.".to_string();
    }
    let mut table = Table::new();
    let mut header = vec!["Month".to_string()];
    header.extend(trend.bands.iter().map(|b| b.leaf.label().to_string()));
    header.extend(["Total Spent", "Income"].map(String::from));
    table.set_header(header);

    let totals = trend.total_outflow();
    for (i, month) in trend.months.iter().enumerate() {
        let mut cells = vec![Cell::new(month.to_string())];
        cells.extend(trend.bands.iter().map(|b| amount_cell(b.cumulative[i])));
        cells.push(Cell::new(money(totals[i]).as_str().red()).set_alignment(CellAlignment::Right));
        cells.push(Cell::new(money(trend.income[i]).as_str().green()).set_alignment(CellAlignment::Right));
        table.add_row(cells);
    }

    let legend: Vec<String> = trend
        .bands
        .iter()
        .map(|b| {
            let c = b.leaf.color();
            format!("{} ({} {}/{})", b.leaf, palette_name(c.palette), c.shade + 1, c.shades)
        })
        .collect();
    format!(
        "{}\n{table}\nStacking order: {}",
        "Cumulative Spending".bold(),
        legend.join(", ")
    )
}
