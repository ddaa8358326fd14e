use crate::config::{JournalSettings, SETTING_KEYS};
use crate::journal::TradeJournal;
use crate::migration::{self, JournalSnapshot, MigrationReport, StoredJournal};
use anyhow::{anyhow, Context, Result};
use chrono::{Local, NaiveDate};
use log::{info, warn};
use std::collections::HashMap;
use std::env;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

pub const JOURNAL_FILE_ENV: &str = "JOURNAL_FILE";
pub const DEFAULT_JOURNAL_FILE: &str = "journal.json";

/// A journal loaded from disk. `file_settings` are the settings stored in the file,
/// before environment overrides, and are what gets written back.
pub struct LoadedJournal {
    pub journal: TradeJournal,
    pub file_settings: HashMap<String, String>,
    pub report: MigrationReport,
}

#[derive(Clone)]
pub struct AppContext {
    journal_path: PathBuf,
    today: NaiveDate,
}

impl AppContext {
    pub fn initialize(journal_path: Option<PathBuf>, today: Option<NaiveDate>) -> Self {
        let journal_path = journal_path
            .or_else(|| env::var(JOURNAL_FILE_ENV).ok().map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_JOURNAL_FILE));
        Self {
            journal_path,
            today: today.unwrap_or_else(|| Local::now().date_naive()),
        }
    }

    pub fn journal_path(&self) -> &Path {
        &self.journal_path
    }

    /// Local calendar date that date-range filters are evaluated against.
    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn load_journal(&self) -> Result<LoadedJournal> {
        let stored = read_stored_journal(&self.journal_path)?;
        let file_settings = stored.settings.clone();
        let settings = merge_env_settings(file_settings.clone());
        let journal_settings = JournalSettings::from_settings_map(&settings)
            .with_context(|| format!("Invalid settings in {}", self.journal_path.display()))?;
        let (journal, report) = migration::ingest(stored, journal_settings)
            .with_context(|| format!("Failed to ingest {}", self.journal_path.display()))?;

        info!(
            "Loaded {} trade(s) and {} setup(s) from {}",
            report.trades_loaded,
            report.setups_loaded,
            self.journal_path.display()
        );
        if report.trades_skipped > 0 {
            warn!(
                "Skipped {} trade(s) without a usable date in {}",
                report.trades_skipped,
                self.journal_path.display()
            );
        }

        Ok(LoadedJournal {
            journal,
            file_settings,
            report,
        })
    }

    pub fn save_journal(&self, loaded: &LoadedJournal) -> Result<()> {
        write_snapshot(&self.journal_path, &loaded.journal, &loaded.file_settings)
    }
}

pub fn read_stored_journal(path: &Path) -> Result<StoredJournal> {
    if fs::metadata(path).is_err() {
        return Err(anyhow!(
            "Journal file not found at {}. Pass --journal or set {}.",
            path.display(),
            JOURNAL_FILE_ENV
        ));
    }
    let file = File::open(path)
        .with_context(|| format!("Failed to open journal file at {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Journal file {} is not valid journal JSON", path.display()))
}

/// Settings stored in the journal, overridden by environment variables of the same name.
pub fn merge_env_settings(mut settings: HashMap<String, String>) -> HashMap<String, String> {
    for key in SETTING_KEYS {
        if let Ok(value) = env::var(key) {
            if !value.trim().is_empty() {
                settings.insert(key.to_string(), value);
            }
        }
    }
    settings
}

/// Writes the current snapshot shape through a temporary file.
pub fn write_snapshot(
    path: &Path,
    journal: &TradeJournal,
    settings: &HashMap<String, String>,
) -> Result<()> {
    let tmp_path = path.with_extension("json.tmp");
    {
        let file = File::create(&tmp_path)
            .with_context(|| format!("Failed to create {}", tmp_path.display()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, &JournalSnapshot::new(journal, settings))
            .context("Journal encode failed")?;
        writer.flush().context("Failed to flush journal file")?;
    }
    fs::rename(&tmp_path, path)
        .with_context(|| format!("Failed to replace journal file at {}", path.display()))?;
    info!(
        "Journal with {} trade(s) written to {}",
        journal.trades().len(),
        path.display()
    );
    Ok(())
}
