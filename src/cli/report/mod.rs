pub mod text;
pub mod view;

use std::io::IsTerminal;

use crate::error::Result;
use crate::history::{HistoryStore, HistoryTable};
use crate::settings::load_settings;

use super::ReportCommands;

pub fn dispatch(cmd: ReportCommands) -> Result<()> {
    let store = HistoryStore::new(load_settings().history_path());
    let table = store.load()?;
    show(&cmd, &table)
}

/// Interactive view on a terminal, plain text otherwise or with `--text`.
pub(crate) fn show(cmd: &ReportCommands, table: &HistoryTable) -> Result<()> {
    if !cmd.text_only() && std::io::stdout().is_terminal() {
        view::show(cmd, table)
    } else {
        println!("{}", text::render(cmd, table)?);
        Ok(())
    }
}
