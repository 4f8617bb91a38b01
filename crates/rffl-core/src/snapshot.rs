// Season snapshot: the JSON document the upstream API client leaves behind.
//
// Everything the exporters need for one season (matchup box scores, team
// rosters, draft picks, transactions) in one file. Field names follow the
// snake_case the client writes; ESPN's camelCase spellings are accepted as
// aliases so raw API fragments can be pasted in.

use std::io::Read;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::espn;
use crate::teams::fallback_abbrev;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("failed to read snapshot {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse snapshot {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

// ---------------------------------------------------------------------------
// Lenient scalar decoding
// ---------------------------------------------------------------------------

/// Coerce a loosely-typed JSON value to a number: numbers pass through,
/// numeric strings are parsed, anything else is treated as absent.
pub fn coerce_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(coerce_f64))
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

// ---------------------------------------------------------------------------
// Snapshot types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct SeasonSnapshot {
    pub season_year: i32,
    #[serde(default)]
    pub teams: Vec<SnapshotTeam>,
    #[serde(default)]
    pub weeks: Vec<SnapshotWeek>,
    #[serde(default)]
    pub draft: Vec<SnapshotPick>,
    #[serde(default)]
    pub transactions: Vec<SnapshotTransaction>,
}

/// A league team as listed in the season's team table. `roster` is the
/// end-of-season roster that legacy league history responses carry.
#[derive(Debug, Clone, Deserialize)]
pub struct SnapshotTeam {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default, alias = "teamAbbrev")]
    pub abbrev: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default)]
    pub roster: Vec<SnapshotEntry>,
}

impl SnapshotTeam {
    /// The team's abbreviation, derived from its name when absent.
    pub fn code(&self) -> String {
        match self.abbrev.as_deref() {
            Some(a) if !a.is_empty() => a.to_string(),
            _ => fallback_abbrev(self.id, self.location.as_deref(), self.nickname.as_deref()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SnapshotWeek {
    pub week: u32,
    #[serde(default)]
    pub matchups: Vec<SnapshotMatchup>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SnapshotMatchup {
    #[serde(default)]
    pub home: Option<MatchupSide>,
    #[serde(default)]
    pub away: Option<MatchupSide>,
}

/// One side of a scheduled matchup: the team, its reported score, and the
/// full roster (starters and bench) for that week.
#[derive(Debug, Clone, Deserialize)]
pub struct MatchupSide {
    #[serde(default, alias = "abbrev")]
    pub team: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub score: Option<f64>,
    #[serde(default)]
    pub lineup: Vec<SnapshotEntry>,
}

/// One rostered player in a team's week, as the upstream API reports it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SnapshotEntry {
    #[serde(default, alias = "slotPosition")]
    pub slot_position: Option<String>,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default, alias = "fullName")]
    pub name: Option<String>,
    #[serde(default, alias = "proTeam")]
    pub pro_team: Option<String>,
    #[serde(default, alias = "projectedPoints", deserialize_with = "lenient_f64")]
    pub projected_points: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub points: Option<f64>,
    #[serde(default, alias = "lineupSlotId")]
    pub lineup_slot_id: Option<u16>,
    #[serde(default, alias = "defaultPositionId")]
    pub default_position_id: Option<u16>,
    #[serde(default, alias = "proTeamId")]
    pub pro_team_id: Option<u16>,
}

impl SnapshotEntry {
    /// Slot label, decoded from the numeric slot id when no label is present.
    pub fn slot_label(&self) -> Option<String> {
        self.slot_position
            .clone()
            .or_else(|| self.lineup_slot_id.map(|id| espn::lineup_slot_label(id).to_string()))
    }

    /// Position label, decoded from the numeric position id when absent.
    pub fn position_label(&self) -> Option<String> {
        self.position
            .clone()
            .or_else(|| self.default_position_id.map(|id| espn::position_label(id).to_string()))
    }

    /// NFL team abbreviation, decoded from the numeric pro team id when absent.
    pub fn pro_team_label(&self) -> Option<String> {
        self.pro_team
            .clone()
            .or_else(|| self.pro_team_id.map(|id| espn::pro_team_abbrev(id).to_string()))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SnapshotPick {
    #[serde(default, alias = "round")]
    pub round_num: Option<u32>,
    #[serde(default)]
    pub round_pick: Option<u32>,
    #[serde(default, alias = "team")]
    pub team_abbrev: Option<String>,
    #[serde(default, alias = "playerId")]
    pub player_id: Option<i64>,
    #[serde(default, alias = "playerName")]
    pub player_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub bid_amount: Option<f64>,
    #[serde(default, alias = "keeper_status")]
    pub keeper: Option<bool>,
    #[serde(default, alias = "nominatingTeam")]
    pub nominating_team: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SnapshotTransaction {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(default, rename = "type")]
    pub txn_type: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, alias = "isPending")]
    pub is_pending: bool,
    #[serde(default)]
    pub rating: Option<i64>,
    #[serde(default, alias = "bidAmount", deserialize_with = "lenient_f64")]
    pub bid_amount: Option<f64>,
    /// Epoch milliseconds.
    #[serde(default)]
    pub date: Option<i64>,
    /// Epoch milliseconds.
    #[serde(default, alias = "effectiveDate")]
    pub effective_date: Option<i64>,
    #[serde(default, alias = "teamId")]
    pub team_id: Option<i64>,
    #[serde(default, alias = "memberId", deserialize_with = "lenient_string")]
    pub member_id: Option<String>,
    #[serde(default)]
    pub items: Vec<SnapshotTransactionItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SnapshotTransactionItem {
    #[serde(default, alias = "playerId")]
    pub player_id: Option<i64>,
    #[serde(default, alias = "playerName")]
    pub player_name: Option<String>,
    #[serde(default, alias = "toTeamId")]
    pub to_team_id: Option<i64>,
    #[serde(default, alias = "fromTeamId")]
    pub from_team_id: Option<i64>,
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

impl SeasonSnapshot {
    pub fn from_reader<R: Read>(rdr: R) -> Result<Self, serde_json::Error> {
        serde_json::from_reader(rdr)
    }

    pub fn load(path: &Path) -> Result<Self, SnapshotError> {
        let file = std::fs::File::open(path).map_err(|e| SnapshotError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let snapshot = Self::from_reader(std::io::BufReader::new(file)).map_err(|e| {
            SnapshotError::Json {
                path: path.to_path_buf(),
                source: e,
            }
        })?;
        debug!(
            "loaded {} snapshot: {} weeks, {} teams, {} picks, {} transactions",
            snapshot.season_year,
            snapshot.weeks.len(),
            snapshot.teams.len(),
            snapshot.draft.len(),
            snapshot.transactions.len()
        );
        Ok(snapshot)
    }

    /// Map from team id to team code, for resolving transaction parties.
    pub fn team_codes(&self) -> std::collections::HashMap<i64, String> {
        self.teams
            .iter()
            .filter_map(|t| t.id.map(|id| (id, t.code())))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn coerce_f64_accepts_numbers_and_numeric_strings() {
        assert_eq!(coerce_f64(&json!(1)), Some(1.0));
        assert_eq!(coerce_f64(&json!(1.25)), Some(1.25));
        assert_eq!(coerce_f64(&json!("3.2")), Some(3.2));
        assert_eq!(coerce_f64(&json!("bad")), None);
        assert_eq!(coerce_f64(&json!(null)), None);
        assert_eq!(coerce_f64(&json!([1])), None);
    }

    #[test]
    fn entry_points_are_lenient() {
        let entry: SnapshotEntry = serde_json::from_value(json!({
            "slot_position": "RB/WR/TE",
            "position": "RB",
            "name": "Some Back",
            "projected_points": "12.5",
            "points": "DNP"
        }))
        .unwrap();
        assert_eq!(entry.projected_points, Some(12.5));
        assert_eq!(entry.points, None);
    }

    #[test]
    fn entry_labels_fall_back_to_numeric_ids() {
        let entry: SnapshotEntry = serde_json::from_value(json!({
            "lineupSlotId": 23,
            "defaultPositionId": 3,
            "proTeamId": 12,
            "fullName": "Legacy Receiver"
        }))
        .unwrap();
        assert_eq!(entry.slot_label().as_deref(), Some("FLEX"));
        assert_eq!(entry.position_label().as_deref(), Some("WR"));
        assert_eq!(entry.pro_team_label().as_deref(), Some("KC"));
        assert_eq!(entry.name.as_deref(), Some("Legacy Receiver"));
    }

    #[test]
    fn string_labels_win_over_ids() {
        let entry: SnapshotEntry = serde_json::from_value(json!({
            "slot_position": "BE",
            "lineup_slot_id": 0
        }))
        .unwrap();
        assert_eq!(entry.slot_label().as_deref(), Some("BE"));
    }

    #[test]
    fn minimal_snapshot_parses() {
        let snap = SeasonSnapshot::from_reader(r#"{"season_year": 2020}"#.as_bytes()).unwrap();
        assert_eq!(snap.season_year, 2020);
        assert!(snap.weeks.is_empty());
        assert!(snap.transactions.is_empty());
    }

    #[test]
    fn transaction_ids_accept_numbers_and_strings() {
        let txn: SnapshotTransaction = serde_json::from_value(json!({
            "id": 42,
            "type": "WAIVER",
            "memberId": "{ABC}",
            "bidAmount": 7
        }))
        .unwrap();
        assert_eq!(txn.id.as_deref(), Some("42"));
        assert_eq!(txn.txn_type.as_deref(), Some("WAIVER"));
        assert_eq!(txn.member_id.as_deref(), Some("{ABC}"));
        assert_eq!(txn.bid_amount, Some(7.0));
        assert!(!txn.is_pending);
    }

    #[test]
    fn team_code_falls_back_to_name() {
        let team: SnapshotTeam = serde_json::from_value(json!({
            "id": 4, "location": "River", "nickname": "Hawks"
        }))
        .unwrap();
        assert_eq!(team.code(), "RIHA");
    }

    #[test]
    fn load_reports_missing_file() {
        let err = SeasonSnapshot::load(Path::new("/nonexistent/rffl/snapshot.json")).unwrap_err();
        assert!(matches!(err, SnapshotError::Io { .. }));
    }
}
