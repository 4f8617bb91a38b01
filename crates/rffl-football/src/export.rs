// Box-score export: snapshot matchups to validated lineup rows.

use rffl_core::snapshot::{MatchupSide, SeasonSnapshot, SnapshotWeek};
use rffl_core::teams::{AliasIndex, TeamDirectory};
use tracing::{debug, info, warn};

use crate::boxscore::BoxscoreRow;
use crate::error::ExportError;
use crate::lineup::{build_lineup, roster_entries};
use crate::reconcile::reconcile;
use crate::rules::LineupRules;

pub const FIRST_WEEK: u32 = 1;
pub const LAST_WEEK: u32 = 18;

/// Per-run export settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportOptions {
    pub start_week: u32,
    pub end_week: u32,
    pub fill_missing_slots: bool,
    pub require_clean: bool,
    pub tolerance: f64,
}

impl Default for ExportOptions {
    fn default() -> Self {
        ExportOptions {
            start_week: FIRST_WEEK,
            end_week: LAST_WEEK,
            fill_missing_slots: false,
            require_clean: false,
            tolerance: 0.0,
        }
    }
}

/// Team identity lookups used while exporting.
#[derive(Debug, Clone, Copy)]
pub struct TeamContext<'a> {
    pub aliases: &'a AliasIndex,
    pub directory: &'a TeamDirectory,
}

/// Snapshot weeks inside `[start, end]`, in snapshot order.
pub fn weeks_in_range(snapshot: &SeasonSnapshot, start: u32, end: u32) -> impl Iterator<Item = &SnapshotWeek> {
    snapshot
        .weeks
        .iter()
        .filter(move |w| w.week >= start && w.week <= end)
}

/// Build the validated box-score rows for a season.
///
/// Matchups are numbered from 1 within each week and each is emitted home
/// side first. A side with no team is skipped. With `require_clean`, the
/// rows are reconciled in memory and any finding fails the export.
pub fn export_boxscores(
    snapshot: &SeasonSnapshot,
    rules: &LineupRules,
    teams: TeamContext<'_>,
    options: &ExportOptions,
) -> Result<Vec<BoxscoreRow>, ExportError> {
    let year = snapshot.season_year;
    let mut rows = Vec::new();

    for week in weeks_in_range(snapshot, options.start_week, options.end_week) {
        for (i, matchup) in week.matchups.iter().enumerate() {
            let matchup_no = i as u32 + 1;
            for (label, side) in [("home", &matchup.home), ("away", &matchup.away)] {
                let Some(side) = side else {
                    continue;
                };
                match side.team.as_deref().filter(|t| !t.is_empty()) {
                    Some(abbrev) => {
                        rows.extend(side_rows(year, week.week, matchup_no, abbrev, side, rules, teams, options));
                    }
                    None => warn!(
                        "week {} matchup {}: {} side has no team; skipping",
                        week.week, matchup_no, label
                    ),
                }
            }
        }
    }

    info!("exported {} box-score rows for {}", rows.len(), year);

    if options.require_clean {
        let summary = reconcile(&rows, options.tolerance, rules.required_starters())?;
        if !summary.is_clean() {
            return Err(ExportError::NotClean {
                proj: summary.bad_projections,
                act: summary.bad_actuals,
                count: summary.bad_counts,
            });
        }
    }

    Ok(rows)
}

#[allow(clippy::too_many_arguments)]
fn side_rows(
    year: i32,
    week: u32,
    matchup: u32,
    abbrev: &str,
    side: &MatchupSide,
    rules: &LineupRules,
    teams: TeamContext<'_>,
    options: &ExportOptions,
) -> Vec<BoxscoreRow> {
    let team_code = teams.aliases.resolve(abbrev, Some(year));
    let meta = teams.directory.get(year, &team_code).cloned().unwrap_or_default();
    let lineup = build_lineup(&roster_entries(&side.lineup), rules, options.fill_missing_slots);
    debug!(
        "week {} matchup {} {}: {} rows, proj {:.2}, actual {:.2}",
        week,
        matchup,
        team_code,
        lineup.rows.len(),
        lineup.team_projected_total,
        lineup.team_actual_total
    );

    lineup
        .rows
        .into_iter()
        .map(|row| BoxscoreRow {
            season_year: year,
            week,
            matchup,
            team_code: team_code.clone(),
            is_co_owned: meta.is_co_owned.clone(),
            team_owner_1: meta.owner_code_1.clone(),
            team_owner_2: meta.owner_code_2.clone(),
            team_projected_total: lineup.team_projected_total,
            team_actual_total: lineup.team_actual_total,
            slot_type: row.slot_type,
            slot: row.slot,
            player_name: row.player_name,
            nfl_team: row.nfl_team,
            position: row.position,
            is_placeholder: row.is_placeholder,
            issue_flag: row.issue_flag,
            rs_projected_pf: row.projected_points,
            rs_actual_pf: row.actual_points,
        })
        .collect()
}

/// Default output file for a season's box-score export.
pub fn default_boxscores_path(year: i32) -> String {
    format!("validated_boxscores_{year}.csv")
}
