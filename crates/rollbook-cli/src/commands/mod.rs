pub mod add;
pub mod delete;
pub mod init;
pub mod list;
pub mod report;
pub mod show;
pub mod stats;
pub mod theme;
pub mod transfer;
pub mod update;

use std::path::Path;

use anyhow::{bail, Context as _, Result};
use chrono::{Local, NaiveDate};
use comfy_table::{Cell, Table};

use rollbook_core::config::{load_config_from, RollbookConfig};
use rollbook_core::model::Record;
use rollbook_core::storage::FileStorage;
use rollbook_core::thumbnail::Thumbnail;
use rollbook_core::validation::{FieldViolation, Validator};
use rollbook_core::RecordStore;

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum ListFormat {
    Table,
    Json,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum StatsFormat {
    Text,
    Json,
}

/// Resolved configuration shared by every command that touches the data directory.
pub struct Context {
    pub config: RollbookConfig,
    pub today: NaiveDate,
}

impl Context {
    pub fn load(config_path: Option<&Path>, data_dir: Option<&Path>) -> Result<Self> {
        let mut config = load_config_from(config_path)?;
        if let Some(dir) = data_dir {
            config.data_dir = dir.to_path_buf();
        }
        tracing::debug!(data_dir = %config.data_dir.display(), "using data directory");
        Ok(Self {
            config,
            today: Local::now().date_naive(),
        })
    }

    pub fn open_store(&self) -> Result<RecordStore<FileStorage>> {
        RecordStore::open(self.config.open_storage()).with_context(|| {
            format!(
                "failed to open records in {}",
                self.config.data_dir.display()
            )
        })
    }

    pub fn validator(&self) -> Validator {
        Validator::new(self.config.courses.clone(), self.today)
    }

    /// Read an image file and encode it within the configured budget.
    pub fn load_photo(&self, path: &Path) -> Result<Thumbnail> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("failed to read photo: {}", path.display()))?;
        Thumbnail::encode(&bytes, self.config.photo_max_bytes)
            .with_context(|| format!("cannot use photo {}", path.display()))
    }
}

/// Map a user-supplied ID to an internal ID. Internal IDs win over student IDs.
pub fn resolve_id(store: &RecordStore<FileStorage>, id: &str) -> Result<String> {
    store
        .get(id)
        .or_else(|| store.get_by_record_id(id))
        .map(|r| r.internal_id.clone())
        .with_context(|| format!("no record with ID {id}"))
}

pub fn reject_violations(violations: Vec<FieldViolation>) -> Result<()> {
    if violations.is_empty() {
        return Ok(());
    }
    let lines: Vec<String> = violations.iter().map(|v| format!("  {v}")).collect();
    bail!("invalid record:\n{}", lines.join("\n"));
}

pub fn records_table(records: &[Record]) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["ID", "Student ID", "Name", "Course", "Year", "GPA"]);
    for r in records {
        table.add_row(vec![
            Cell::new(&r.internal_id),
            Cell::new(&r.record_id),
            Cell::new(&r.name),
            Cell::new(&r.course),
            Cell::new(r.year),
            Cell::new(format!("{:.2}", r.gpa)),
        ]);
    }
    table
}
