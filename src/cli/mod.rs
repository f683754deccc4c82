pub mod history;
pub mod init;
pub mod report;
pub mod run;
pub mod status;

use std::str::FromStr;

use clap::{Parser, Subcommand};

use crate::error::Result;
use crate::models::MonthKey;
use crate::reports::Period;

pub(crate) fn parse_period(month: Option<&str>, all: bool) -> Result<Period> {
    match (month, all) {
        (_, true) => Ok(Period::All),
        (Some(m), false) => Ok(Period::Month(MonthKey::from_str(m)?)),
        (None, false) => Ok(Period::Latest),
    }
}

#[derive(Parser)]
#[command(
    name = "spendtrack",
    version,
    about = "Track monthly spending from ING bank-account exports."
)]
pub struct Cli {
    /// Log progress to stderr (same as `verbose` in settings)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write settings and create the data directories.
    Init {
        /// Path for spendtrack data (default: ~/Documents/spendtrack)
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
    },
    /// Import a movements export, aggregate it by month and update the history.
    Run {
        /// Movements file (default: the input file from settings)
        file: Option<String>,
        /// Importer format key: ing_xls, csv (default: by file extension)
        #[arg(long)]
        format: Option<String>,
        /// Spreadsheet sheet holding the movements
        #[arg(long)]
        sheet: Option<String>,
        /// Zero-based row of the column headers in the spreadsheet
        #[arg(long = "header-row")]
        header_row: Option<usize>,
        /// Compute and print without writing the history file
        #[arg(long = "dry-run")]
        dry_run: bool,
    },
    /// Print the persisted monthly history.
    History,
    /// Show spending reports from the history.
    Report {
        #[command(subcommand)]
        command: ReportCommands,
    },
    /// Show settings, paths and history summary.
    Status,
}

#[derive(Subcommand, Clone)]
pub enum ReportCommands {
    /// Share of each spending category for one month or the whole history.
    Distribution {
        /// Month: YYYY-MM (default: latest month in the history)
        #[arg(long, conflicts_with = "all")]
        month: Option<String>,
        /// Sum over every month in the history
        #[arg(long)]
        all: bool,
        /// Plain text output even on a terminal
        #[arg(long)]
        text: bool,
    },
    /// Cumulative spending per category against cumulative income.
    Trend {
        /// Plain text output even on a terminal
        #[arg(long)]
        text: bool,
    },
}

impl ReportCommands {
    pub fn text_only(&self) -> bool {
        match self {
            ReportCommands::Distribution { text, .. } | ReportCommands::Trend { text } => *text,
        }
    }
}
