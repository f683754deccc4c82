use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TrackerError};
use crate::importer::ImportOptions;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub data_dir: String,
    /// Bank export to read when `run` is given no file. Derived from
    /// `data_dir` when unset.
    pub input_file: Option<String>,
    /// Persisted history table. Derived from `data_dir` when unset.
    pub history_file: Option<String>,
    pub sheet_name: String,
    pub header_row: usize,
    pub write_history: bool,
    pub show_distribution: bool,
    pub show_trend: bool,
    pub verbose: bool,
    pub unaccounted_warn_threshold: f64,
}

impl Default for Settings {
    fn default() -> Self {
        let import = ImportOptions::default();
        Self {
            data_dir: default_data_dir().to_string_lossy().to_string(),
            input_file: None,
            history_file: None,
            sheet_name: import.sheet_name,
            header_row: import.header_row,
            write_history: true,
            show_distribution: true,
            show_trend: false,
            verbose: false,
            unaccounted_warn_threshold: 100.0,
        }
    }
}

impl Settings {
    pub fn data_path(&self) -> PathBuf {
        PathBuf::from(expand_home(&self.data_dir))
    }

    pub fn input_path(&self) -> PathBuf {
        match &self.input_file {
            Some(f) => PathBuf::from(expand_home(f)),
            None => self
                .data_path()
                .join("Bank_Monthly_Movements")
                .join("Movements.xls"),
        }
    }

    pub fn history_path(&self) -> PathBuf {
        match &self.history_file {
            Some(f) => PathBuf::from(expand_home(f)),
            None => self.data_path().join("Output").join("Tracked_expenses.csv"),
        }
    }

    pub fn import_options(&self) -> ImportOptions {
        ImportOptions {
            sheet_name: self.sheet_name.clone(),
            header_row: self.header_row,
        }
    }

    pub fn warn_threshold(&self) -> Decimal {
        Decimal::try_from(self.unaccounted_warn_threshold)
            .map(|d| d.abs().round_dp(2))
            .unwrap_or(Decimal::ONE_HUNDRED)
    }
}

fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("spendtrack")
}

pub fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("Documents")
        .join("spendtrack")
}

pub fn load_settings() -> Settings {
    load_settings_from(&settings_path())
}

fn load_settings_from(path: &Path) -> Settings {
    if path.exists() {
        let content = std::fs::read_to_string(path).unwrap_or_default();
        serde_json::from_str(&content).unwrap_or_default()
    } else {
        Settings::default()
    }
}

pub fn save_settings(settings: &Settings) -> Result<()> {
    save_settings_to(&settings_path(), settings)
}

fn save_settings_to(path: &Path, settings: &Settings) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| TrackerError::Settings(e.to_string()))?;
    std::fs::write(path, format!("{json}\n"))?;
    Ok(())
}

pub fn settings_file_exists() -> bool {
    settings_path().exists()
}

pub fn expand_home(path: &str) -> String {
    if let Some(rest) = path.strip_prefix('~') {
        if let Some(home) = dirs::home_dir() {
            return format!("{}{rest}", home.to_string_lossy());
        }
    }
    path.to_string()
}
