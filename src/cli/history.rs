use crate::cli::report::text::format_history;
use crate::error::Result;
use crate::history::HistoryStore;
use crate::settings::load_settings;

pub fn run() -> Result<()> {
    let store = HistoryStore::new(load_settings().history_path());
    let table = store.load()?;
    println!("{}", format_history(&table));
    Ok(())
}
