use crate::error::Result;
use crate::history::HistoryStore;
use crate::settings::{load_settings, settings_file_exists, settings_path};

fn on_off(flag: bool) -> &'static str {
    if flag {
        "on"
    } else {
        "off"
    }
}

pub fn run() -> Result<()> {
    let settings = load_settings();
    let history_path = settings.history_path();
    let input_path = settings.input_path();

    let config = if settings_file_exists() {
        settings_path().display().to_string()
    } else {
        "(defaults, run `spendtrack init`)".to_string()
    };
    println!("Settings:   {config}");
    println!("Data dir:   {}", settings.data_path().display());
    println!(
        "Input:      {}{}",
        input_path.display(),
        if input_path.exists() { "" } else { " (missing)" }
    );
    println!("Sheet:      {} (header row {})", settings.sheet_name, settings.header_row);
    println!("History:    {}", history_path.display());

    println!();
    println!("Write history:      {}", on_off(settings.write_history));
    println!("Show distribution:  {}", on_off(settings.show_distribution));
    println!("Show trend:         {}", on_off(settings.show_trend));
    println!("Warn threshold:     {}", crate::fmt::money(settings.warn_threshold()));

    println!();
    if history_path.exists() {
        let table = HistoryStore::new(&history_path).load()?;
        println!("Months tracked: {}", table.len());
        if let Some((first, last)) = table.month_range() {
            println!("Range:          {first} to {last}");
        }
    } else {
        println!("History not found. Run `spendtrack run` to create it.");
    }

    Ok(())
}
