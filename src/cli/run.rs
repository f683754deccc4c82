use std::path::PathBuf;

use colored::Colorize;
use tracing::info;

use crate::aggregator::aggregate_statement;
use crate::cli::report::{self, text::format_summary};
use crate::cli::ReportCommands;
use crate::error::{Result, TrackerError};
use crate::history::HistoryStore;
use crate::importer::import_file;
use crate::rules::RuleSet;
use crate::settings::{expand_home, load_settings};

pub struct RunArgs {
    pub file: Option<String>,
    pub format: Option<String>,
    pub sheet: Option<String>,
    pub header_row: Option<usize>,
    pub dry_run: bool,
}

pub fn run(args: RunArgs) -> Result<()> {
    let settings = load_settings();
    let input = args
        .file
        .as_deref()
        .map(|f| PathBuf::from(expand_home(f)))
        .unwrap_or_else(|| settings.input_path());
    if !input.exists() {
        return Err(TrackerError::Other(format!(
            "Input file not found: {}",
            input.display()
        )));
    }

    let mut options = settings.import_options();
    if let Some(sheet) = args.sheet {
        options.sheet_name = sheet;
    }
    if let Some(row) = args.header_row {
        options.header_row = row;
    }

    let statement = import_file(&input, args.format.as_deref(), &options)?;
    if statement.is_empty() {
        println!("No movements found in {}", input.display());
        return Ok(());
    }

    let rule_set = RuleSet::standard();
    let rows = aggregate_statement(&statement, &rule_set, settings.warn_threshold());
    info!(months = rows.len(), "aggregated statement");

    let store = HistoryStore::new(settings.history_path());
    let mut table = store.load()?;
    let summary = table.merge_rows(rows.iter().cloned());
    info!(appended = summary.appended, replaced = summary.replaced, "merged into history");

    println!(
        "Imported {} movements from {}",
        statement.len(),
        input.display()
    );
    println!("{}", format_summary(&rows));

    if args.dry_run {
        println!("{}", "History not written (dry run).".yellow());
    } else if !settings.write_history {
        println!("{}", "History not written (write_history is off).".yellow());
    } else {
        store.save(&table)?;
        println!(
            "{} {} new, {} updated months -> {}",
            "History:".green(),
            summary.appended,
            summary.replaced,
            store.path().display()
        );
    }

    if settings.show_distribution {
        report::show(
            &ReportCommands::Distribution {
                month: None,
                all: false,
                text: false,
            },
            &table,
        )?;
    }
    if settings.show_trend {
        report::show(&ReportCommands::Trend { text: false }, &table)?;
    }
    Ok(())
}
