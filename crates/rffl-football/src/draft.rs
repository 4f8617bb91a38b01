// Draft results export.

use rffl_core::espn::UNKNOWN;
use rffl_core::snapshot::SeasonSnapshot;
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftRow {
    pub year: i32,
    pub round: Option<u32>,
    pub round_pick: Option<u32>,
    pub team_abbrev: String,
    pub player_id: Option<i64>,
    pub player_name: String,
    pub bid_amount: Option<f64>,
    pub keeper: Option<bool>,
    pub nominating_team: Option<String>,
}

/// One row per pick, in draft order as the snapshot lists it.
pub fn export_draft(snapshot: &SeasonSnapshot) -> Vec<DraftRow> {
    let rows: Vec<DraftRow> = snapshot
        .draft
        .iter()
        .map(|pick| DraftRow {
            year: snapshot.season_year,
            round: pick.round_num,
            round_pick: pick.round_pick,
            team_abbrev: pick
                .team_abbrev
                .clone()
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| UNKNOWN.to_string()),
            player_id: pick.player_id,
            player_name: pick.player_name.clone().unwrap_or_default(),
            bid_amount: pick.bid_amount,
            keeper: pick.keeper,
            nominating_team: pick.nominating_team.clone().filter(|t| !t.is_empty()),
        })
        .collect();
    info!("exported {} draft picks for {}", rows.len(), snapshot.season_year);
    rows
}

pub fn default_draft_path(year: i32) -> String {
    format!("draft_{year}.csv")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn picks_become_rows() {
        let snapshot: SeasonSnapshot = serde_json::from_value(json!({
            "season_year": 2023,
            "draft": [
                { "round_num": 1, "round_pick": 1, "team_abbrev": "GVRX",
                  "player_id": 4241457, "player_name": "First Pick", "keeper": false },
                { "round": 1, "round_pick": 2, "playerName": "No Team", "bid_amount": "12" }
            ]
        }))
        .unwrap();
        let rows = export_draft(&snapshot);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].year, 2023);
        assert_eq!(rows[0].team_abbrev, "GVRX");
        assert_eq!(rows[0].keeper, Some(false));
        assert_eq!(rows[1].team_abbrev, "Unknown");
        assert_eq!(rows[1].round, Some(1));
        assert_eq!(rows[1].bid_amount, Some(12.0));
        assert_eq!(rows[1].player_id, None);
    }

    #[test]
    fn no_draft_no_rows() {
        let snapshot = SeasonSnapshot::from_reader(r#"{"season_year": 2019}"#.as_bytes()).unwrap();
        assert!(export_draft(&snapshot).is_empty());
    }
}
