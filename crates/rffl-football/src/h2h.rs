// Head-to-head results: one row per matchup from the reported team scores.

use rffl_core::snapshot::{MatchupSide, SeasonSnapshot};
use serde::Serialize;
use tracing::info;

use crate::export::weeks_in_range;
use crate::lineup::{points_or_zero, round2};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct H2hRow {
    pub week: u32,
    pub matchup: u32,
    pub home_team: String,
    pub away_team: String,
    pub home_score: f64,
    pub away_score: f64,
    pub winner: String,
    pub margin: f64,
}

fn side_team(side: Option<&MatchupSide>, fallback: &str) -> String {
    side.and_then(|s| s.team.clone())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

fn side_score(side: Option<&MatchupSide>) -> f64 {
    round2(points_or_zero(side.and_then(|s| s.score)))
}

/// Head-to-head rows for the weeks in `[start_week, end_week]`.
pub fn export_h2h(snapshot: &SeasonSnapshot, start_week: u32, end_week: u32) -> Vec<H2hRow> {
    let mut rows = Vec::new();
    for week in weeks_in_range(snapshot, start_week, end_week) {
        for (i, matchup) in week.matchups.iter().enumerate() {
            let home_team = side_team(matchup.home.as_ref(), "HOME");
            let away_team = side_team(matchup.away.as_ref(), "AWAY");
            let home_score = side_score(matchup.home.as_ref());
            let away_score = side_score(matchup.away.as_ref());

            let winner = if home_score > away_score {
                home_team.clone()
            } else if away_score > home_score {
                away_team.clone()
            } else {
                "TIE".to_string()
            };

            rows.push(H2hRow {
                week: week.week,
                matchup: i as u32 + 1,
                home_team,
                away_team,
                home_score,
                away_score,
                winner,
                margin: round2((home_score - away_score).abs()),
            });
        }
    }
    info!("exported {} head-to-head rows for {}", rows.len(), snapshot.season_year);
    rows
}

pub fn default_h2h_path(year: i32) -> String {
    format!("h2h_{year}.csv")
}
