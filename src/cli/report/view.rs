use crossterm::event::KeyCode;
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Bar, BarChart, BarGroup, Block, Chart, Dataset, GraphType, LegendPosition, Paragraph},
    Frame,
};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::cli::{parse_period, ReportCommands};
use crate::error::Result;
use crate::fmt::{money, percent};
use crate::history::HistoryTable;
use crate::models::MonthKey;
use crate::reports::{self, DistributionSnapshot, Period, TrendSeries};
use crate::tui::{
    is_close_key, money_span, rgb_color, run_report_view, ReportView, ReportViewAction,
    FOOTER_STYLE, HEADER_STYLE,
};

/// Dispatch a report command to an interactive ratatui view.
pub fn show(cmd: &ReportCommands, table: &HistoryTable) -> Result<()> {
    match cmd {
        ReportCommands::Distribution { month, all, .. } => {
            let period = parse_period(month.as_deref(), *all)?;
            let mut view = DistributionView::new(table.clone(), period)?;
            run_report_view(&mut view)
        }
        ReportCommands::Trend { .. } => {
            let mut view = TrendView::new(table)?;
            run_report_view(&mut view)
        }
    }
}

fn to_f64(val: Decimal) -> f64 {
    val.to_f64().unwrap_or(0.0)
}

fn title_line(title: String) -> Paragraph<'static> {
    Paragraph::new(Line::from(Span::styled(title, HEADER_STYLE)))
}

// ---------------------------------------------------------------------------
// Distribution: horizontal bar chart, one bar per slice
// ---------------------------------------------------------------------------

pub(crate) struct DistributionView {
    history: HistoryTable,
    months: Vec<MonthKey>,
    /// Selected month, or `None` for the whole history.
    selected: Option<usize>,
    snapshot: DistributionSnapshot,
}

impl DistributionView {
    pub(crate) fn new(history: HistoryTable, period: Period) -> Result<Self> {
        let (label, rows) = reports::select_rows(&history, period)?;
        let snapshot = DistributionSnapshot::from_rows(label, &rows);
        let months: Vec<MonthKey> = history.rows().map(|r| r.month).collect();
        let selected = match period {
            Period::All => None,
            Period::Latest => months.len().checked_sub(1),
            Period::Month(m) => months.iter().position(|x| *x == m),
        };
        Ok(Self {
            history,
            months,
            selected,
            snapshot,
        })
    }

    fn select(&mut self, selected: Option<usize>) {
        let period = match selected {
            Some(i) => match self.months.get(i) {
                Some(m) => Period::Month(*m),
                None => return,
            },
            None => Period::All,
        };
        if let Ok((label, rows)) = reports::select_rows(&self.history, period) {
            self.snapshot = DistributionSnapshot::from_rows(label, &rows);
            self.selected = selected;
        }
    }
}

impl ReportView for DistributionView {
    fn draw(&mut self, frame: &mut Frame) {
        let chunks = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(frame.area());

        frame.render_widget(
            title_line(format!("Spending Distribution: {}", self.snapshot.period)),
            chunks[0],
        );

        let unaccounted = self
            .snapshot
            .slices
            .iter()
            .find(|s| s.kind == reports::SliceKind::Unaccounted)
            .map(|s| s.amount)
            .unwrap_or_default();
        frame.render_widget(
            Paragraph::new(Line::from(vec![
                Span::raw("Total "),
                money_span(-self.snapshot.total),
                Span::raw("   Unaccounted "),
                Span::raw(money(unaccounted)),
            ])),
            chunks[1],
        );

        let bars: Vec<Bar> = self
            .snapshot
            .non_zero()
            .map(|s| {
                let style = Style::new().fg(rgb_color(s.rgb));
                Bar::default()
                    .value(s.amount.round().to_u64().unwrap_or(0))
                    .label(Line::from(s.label.clone()))
                    .text_value(format!("{} ({})", money(s.amount), percent(s.percent)))
                    .style(style)
                    .value_style(style.add_modifier(Modifier::REVERSED))
            })
            .collect();
        let chart = BarChart::default()
            .block(Block::bordered())
            .direction(Direction::Horizontal)
            .bar_width(1)
            .bar_gap(1)
            .data(BarGroup::default().bars(&bars));
        frame.render_widget(chart, chunks[2]);

        frame.render_widget(
            Paragraph::new(Span::styled(
                " \u{2190}/\u{2192} month  a all months  q close",
                FOOTER_STYLE,
            )),
            chunks[3],
        );
    }

    fn handle_key(&mut self, code: KeyCode) -> ReportViewAction {
        if is_close_key(code) {
            return ReportViewAction::Close;
        }
        let last = self.months.len().checked_sub(1);
        match code {
            KeyCode::Left | KeyCode::Char('h') => match self.selected {
                Some(i) if i > 0 => self.select(Some(i - 1)),
                None => self.select(last),
                _ => {}
            },
            KeyCode::Right | KeyCode::Char('l') => match self.selected {
                Some(i) if Some(i) < last => self.select(Some(i + 1)),
                None => self.select(last),
                _ => {}
            },
            KeyCode::Char('a') => match self.selected {
                Some(_) => self.select(None),
                None => self.select(last),
            },
            _ => {}
        }
        ReportViewAction::Continue
    }
}

// ---------------------------------------------------------------------------
// Trend: stacked cumulative outflow lines plus a cumulative income line
// ---------------------------------------------------------------------------

pub(crate) struct TrendView {
    months: Vec<MonthKey>,
    bands: Vec<(String, Style, Vec<(f64, f64)>)>,
    income: Vec<(f64, f64)>,
    y_max: f64,
}

impl TrendView {
    pub(crate) fn new(history: &HistoryTable) -> Result<Self> {
        let (_, rows) = reports::select_rows(history, Period::All)?;
        let trend = TrendSeries::from_rows(&rows);
        let points = |values: &[Decimal]| -> Vec<(f64, f64)> {
            values
                .iter()
                .enumerate()
                .map(|(i, v)| (i as f64, to_f64(*v)))
                .collect()
        };

        let bands = trend
            .bands
            .iter()
            .zip(trend.stacked())
            .map(|(band, top)| {
                let style = Style::new().fg(rgb_color(band.leaf.color().rgb()));
                (band.leaf.label().to_string(), style, points(&top))
            })
            .collect();
        let income = points(&trend.income);

        let peak = trend
            .total_outflow()
            .into_iter()
            .chain(trend.income.iter().copied())
            .max()
            .unwrap_or_default();
        Ok(Self {
            months: trend.months,
            bands,
            income,
            y_max: (to_f64(peak) * 1.05).max(1.0),
        })
    }
}

impl ReportView for TrendView {
    fn draw(&mut self, frame: &mut Frame) {
        let chunks = Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(frame.area());

        frame.render_widget(title_line("Cumulative Spending".to_string()), chunks[0]);

        let mut datasets: Vec<Dataset> = self
            .bands
            .iter()
            .map(|(name, style, data)| {
                Dataset::default()
                    .name(name.clone())
                    .marker(symbols::Marker::Braille)
                    .graph_type(GraphType::Line)
                    .style(*style)
                    .data(data)
            })
            .collect();
        datasets.push(
            Dataset::default()
                .name("Income")
                .marker(symbols::Marker::Dot)
                .graph_type(GraphType::Line)
                .style(Style::new().fg(ratatui::style::Color::White))
                .data(&self.income),
        );

        let last = self.months.len().saturating_sub(1);
        let x_labels: Vec<String> = match (self.months.first(), self.months.last()) {
            (Some(first), Some(end)) if last > 0 => vec![first.to_string(), end.to_string()],
            (Some(first), _) => vec![first.to_string()],
            _ => Vec::new(),
        };
        let y_labels: Vec<String> = [0.0, self.y_max / 2.0, self.y_max]
            .iter()
            .map(|v| money(Decimal::try_from(*v).unwrap_or_default().round()))
            .collect();

        let chart = Chart::new(datasets)
            .block(Block::bordered())
            .legend_position(Some(LegendPosition::TopLeft))
            .x_axis(
                Axis::default()
                    .style(FOOTER_STYLE)
                    .bounds([0.0, last.max(1) as f64])
                    .labels(x_labels),
            )
            .y_axis(
                Axis::default()
                    .style(FOOTER_STYLE)
                    .bounds([0.0, self.y_max])
                    .labels(y_labels),
            );
        frame.render_widget(chart, chunks[1]);

        frame.render_widget(
            Paragraph::new(Span::styled(" q close", FOOTER_STYLE)),
            chunks[2],
        );
    }

    fn handle_key(&mut self, code: KeyCode) -> ReportViewAction {
        if is_close_key(code) {
            ReportViewAction::Close
        } else {
            ReportViewAction::Continue
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::aggregate_month;
    use crate::models::record;
    use crate::rules::RuleSet;
    use rust_decimal_macros::dec;

    fn history() -> HistoryTable {
        let mut table = HistoryTable::new();
        for m in 1..=3 {
            let date = format!("2024-{m:02}-10");
            let records = vec![record(&date, dec!(-10), dec!(90), "Pago en UBER *EATS", "")];
            table.append_or_replace(aggregate_month(
                MonthKey::new(2024, m).unwrap(),
                &records,
                &RuleSet::standard(),
            ));
        }
        table
    }

    #[test]
    fn test_distribution_navigation() {
        let mut view = DistributionView::new(history(), Period::Latest).unwrap();
        assert_eq!(view.snapshot.period, "2024-03");
        view.handle_key(KeyCode::Left);
        assert_eq!(view.snapshot.period, "2024-02");
        view.handle_key(KeyCode::Right);
        view.handle_key(KeyCode::Right);
        assert_eq!(view.snapshot.period, "2024-03");
        view.handle_key(KeyCode::Char('a'));
        assert_eq!(view.snapshot.period, "2024-01 to 2024-03");
        assert_eq!(view.snapshot.total, dec!(30));
        assert!(matches!(view.handle_key(KeyCode::Char('q')), ReportViewAction::Close));
    }

    #[test]
    fn test_trend_view_points() {
        let view = TrendView::new(&history()).unwrap();
        assert_eq!(view.months.len(), 3);
        let (_, _, top) = view.bands.last().unwrap();
        assert_eq!(top, &vec![(0.0, 10.0), (1.0, 20.0), (2.0, 30.0)]);
        assert!(view.y_max >= 30.0);
    }
}
