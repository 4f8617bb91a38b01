// End-of-season rosters for legacy seasons.
//
// League history responses for seasons before 2019 carry only the final
// roster of each team (no weekly lineups), with numeric slot ids.

use rffl_core::espn;
use rffl_core::snapshot::{SeasonSnapshot, SnapshotEntry};
use rffl_core::teams::AliasIndex;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ExportError;

/// First season served by the weekly box-score endpoints.
pub const FIRST_MODERN_SEASON: i32 = 2019;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterRow {
    pub season_year: i32,
    pub week: u32,
    pub matchup: u32,
    pub team_code: String,
    pub slot: String,
    pub player_name: String,
    pub nfl_team: Option<String>,
    pub position: String,
    pub is_starter: bool,
}

/// Bench and IR are the only inactive slots. Entries with no slot id fall
/// back to their slot label.
fn entry_is_starter(entry: &SnapshotEntry) -> bool {
    match entry.lineup_slot_id {
        Some(id) => espn::is_active_slot(id),
        None => !matches!(
            entry.slot_label().map(|s| s.to_uppercase()).as_deref(),
            Some("BENCH" | "BE" | "IR")
        ),
    }
}

/// One row per rostered player per team. `week` defaults to 1.
pub fn export_historical_rosters(
    snapshot: &SeasonSnapshot,
    aliases: &AliasIndex,
    week: Option<u32>,
) -> Result<Vec<RosterRow>, ExportError> {
    let year = snapshot.season_year;
    if year >= FIRST_MODERN_SEASON {
        return Err(ExportError::UnsupportedSeason { year });
    }

    let mut rows = Vec::new();
    for team in &snapshot.teams {
        let team_code = aliases.resolve(&team.code(), Some(year));
        for entry in &team.roster {
            rows.push(RosterRow {
                season_year: year,
                week: week.unwrap_or(1),
                matchup: 1,
                team_code: team_code.clone(),
                slot: entry
                    .slot_label()
                    .unwrap_or_else(|| espn::lineup_slot_label(espn::ESPN_SLOT_QB).to_string()),
                player_name: entry.name.clone().unwrap_or_else(|| espn::UNKNOWN.to_string()),
                nfl_team: entry.pro_team_label(),
                position: entry
                    .position_label()
                    .unwrap_or_else(|| espn::UNKNOWN.to_string()),
                is_starter: entry_is_starter(entry),
            });
        }
    }

    if rows.is_empty() {
        return Err(ExportError::NoRosterData { year });
    }
    info!("exported {} end-of-season roster rows for {}", rows.len(), year);
    Ok(rows)
}

pub fn default_rosters_path(year: i32) -> String {
    format!("end_of_season_roster_{year}.csv")
}
