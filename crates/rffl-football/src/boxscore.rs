// Persisted box-score rows and CSV reading/writing.

use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::ExportError;
use crate::lineup::CanonicalRow;
use crate::slot::{Slot, SlotType};

/// One row of a validated box-score export: a single player (or
/// placeholder) in one team's lineup for one week, with the team totals
/// repeated on every row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxscoreRow {
    #[serde(default)]
    pub season_year: i32,
    pub week: u32,
    pub matchup: u32,
    /// Older exports name this column `team_abbrev`.
    #[serde(alias = "team_abbrev")]
    pub team_code: String,
    #[serde(rename = "is_co_owned?", default)]
    pub is_co_owned: String,
    #[serde(default)]
    pub team_owner_1: String,
    #[serde(default)]
    pub team_owner_2: String,
    pub team_projected_total: f64,
    pub team_actual_total: f64,
    pub slot_type: SlotType,
    pub slot: Slot,
    #[serde(default)]
    pub player_name: Option<String>,
    #[serde(default)]
    pub nfl_team: Option<String>,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default, with = "yes_no")]
    pub is_placeholder: bool,
    #[serde(default)]
    pub issue_flag: Option<String>,
    pub rs_projected_pf: f64,
    pub rs_actual_pf: f64,
}

impl BoxscoreRow {
    pub fn is_starter(&self) -> bool {
        self.slot_type == SlotType::Starters
    }

    /// The lineup row this export row was written from.
    pub fn to_canonical(&self) -> CanonicalRow {
        CanonicalRow {
            slot: self.slot.clone(),
            slot_type: self.slot_type,
            player_name: self.player_name.clone(),
            nfl_team: self.nfl_team.clone(),
            position: self.position.clone(),
            is_placeholder: self.is_placeholder,
            issue_flag: self.issue_flag.clone(),
            projected_points: self.rs_projected_pf,
            actual_points: self.rs_actual_pf,
        }
    }
}

/// Placeholder markers are written as `Yes` / `No`.
mod yes_no {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(if *value { "Yes" } else { "No" })
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(matches!(
            raw.trim().to_ascii_lowercase().as_str(),
            "yes" | "y" | "true" | "1"
        ))
    }
}

// ---------------------------------------------------------------------------
// CSV I/O
// ---------------------------------------------------------------------------

/// Read headed CSV rows of any record type. Rows that fail to parse are
/// logged and skipped.
pub fn read_rows_from_reader<R: Read, T: DeserializeOwned>(rdr: R) -> Result<Vec<T>, csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut rows = Vec::new();
    for (line, result) in reader.deserialize::<T>().enumerate() {
        match result {
            Ok(row) => rows.push(row),
            Err(e) => {
                // Header is line 1.
                warn!("skipping malformed row {}: {}", line + 2, e);
            }
        }
    }
    Ok(rows)
}

pub fn read_rows<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, ExportError> {
    let file = std::fs::File::open(path).map_err(|e| ExportError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let rows = read_rows_from_reader(file).map_err(|e| ExportError::Csv {
        path: path.to_path_buf(),
        source: e,
    })?;
    debug!("read {} rows from {}", rows.len(), path.display());
    Ok(rows)
}

pub fn read_boxscores_from_reader<R: Read>(rdr: R) -> Result<Vec<BoxscoreRow>, csv::Error> {
    read_rows_from_reader(rdr)
}

/// Read a box-score export. Rows that fail to parse are logged and skipped.
pub fn read_boxscores(path: &Path) -> Result<Vec<BoxscoreRow>, ExportError> {
    read_rows(path)
}

pub fn write_rows_to_writer<W: Write, T: Serialize>(wtr: W, rows: &[T]) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(wtr);
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Write any row type as a headed CSV, creating parent directories as needed.
pub fn write_rows<T: Serialize>(path: &Path, rows: &[T]) -> Result<(), ExportError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| ExportError::Io {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }
    let file = std::fs::File::create(path).map_err(|e| ExportError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    write_rows_to_writer(std::io::BufWriter::new(file), rows).map_err(|e| ExportError::Csv {
        path: path.to_path_buf(),
        source: e,
    })?;
    debug!("wrote {} rows to {}", rows.len(), path.display());
    Ok(())
}

/// Report path next to a CSV: `data/boxscores_2022.csv` with suffix
/// `validation_report` becomes `data/boxscores_2022_validation_report.csv`.
pub fn sidecar_path(csv_path: &Path, suffix: &str) -> PathBuf {
    let stem = csv_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    csv_path.with_file_name(format!("{stem}_{suffix}.csv"))
}
