use std::io::IsTerminal;

use crate::error::Result;
use crate::settings::{
    expand_home, load_settings, save_settings, settings_file_exists, settings_path,
};

pub fn run(data_dir: Option<String>) -> Result<()> {
    let mut settings = load_settings();

    if let Some(dir) = data_dir {
        settings.data_dir = expand_home(&dir);
    } else if !settings_file_exists() && std::io::stdin().is_terminal() {
        // First run: prompt for data dir
        println!("Data directory [{}]: ", settings.data_dir);
        let mut input = String::new();
        std::io::stdin().read_line(&mut input).ok();
        let chosen = input.trim();
        if !chosen.is_empty() {
            settings.data_dir = expand_home(chosen);
        }
    }

    save_settings(&settings)?;

    for path in [settings.input_path(), settings.history_path()] {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
    }

    println!("Initialized spendtrack at {}", settings.data_path().display());
    println!("Settings:   {}", settings_path().display());
    println!("Put the bank export at {}", settings.input_path().display());
    Ok(())
}
