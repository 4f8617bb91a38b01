// Reconciliation: stored team totals vs. the sum of exported starter rows.

use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::boxscore::BoxscoreRow;
use crate::lineup::round2;

#[derive(Debug, Error, PartialEq)]
pub enum ReconcileError {
    #[error("team-week group {key} has no starter rows")]
    EmptyGroup { key: TeamWeekKey },
}

/// Identifies one team's lineup in one week.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TeamWeekKey {
    pub week: u32,
    pub matchup: u32,
    pub team_code: String,
}

impl std::fmt::Display for TeamWeekKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "week {} matchup {} team {}",
            self.week, self.matchup, self.team_code
        )
    }
}

impl TeamWeekKey {
    pub fn of(row: &BoxscoreRow) -> Self {
        TeamWeekKey {
            week: row.week,
            matchup: row.matchup,
            team_code: row.team_code.clone(),
        }
    }
}

/// Aggregates for one team-week's starter rows.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconciliationRow {
    pub key: TeamWeekKey,
    pub team_projected_total: f64,
    pub team_actual_total: f64,
    pub starters_proj_sum: f64,
    pub starters_actual_sum: f64,
    pub starter_count: usize,
    pub proj_diff: f64,
    pub act_diff: f64,
}

impl ReconciliationRow {
    pub fn proj_mismatch(&self, tolerance: f64) -> bool {
        self.proj_diff.abs() > tolerance
    }

    pub fn actual_mismatch(&self, tolerance: f64) -> bool {
        self.act_diff.abs() > tolerance
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconcileIssue {
    ProjMismatch,
    ActualMismatch,
    StarterCount,
}

impl ReconcileIssue {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReconcileIssue::ProjMismatch => "proj_mismatch",
            ReconcileIssue::ActualMismatch => "actual_mismatch",
            ReconcileIssue::StarterCount => "starter_count",
        }
    }
}

/// One flagged team-week, as written to the validation report CSV.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconciliationDetail {
    pub week: u32,
    pub matchup: u32,
    pub team_code: String,
    pub team_projected_total: f64,
    pub team_actual_total: f64,
    pub starters_proj_sum: f64,
    pub starters_actual_sum: f64,
    pub starter_count: usize,
    pub proj_diff: f64,
    pub act_diff: f64,
    pub issue: ReconcileIssue,
}

impl ReconciliationDetail {
    fn new(row: &ReconciliationRow, issue: ReconcileIssue) -> Self {
        ReconciliationDetail {
            week: row.key.week,
            matchup: row.key.matchup,
            team_code: row.key.team_code.clone(),
            team_projected_total: row.team_projected_total,
            team_actual_total: row.team_actual_total,
            starters_proj_sum: row.starters_proj_sum,
            starters_actual_sum: row.starters_actual_sum,
            starter_count: row.starter_count,
            proj_diff: row.proj_diff,
            act_diff: row.act_diff,
            issue,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReconciliationSummary {
    pub team_weeks_checked: usize,
    pub bad_projections: usize,
    pub bad_actuals: usize,
    pub bad_counts: usize,
    /// All projection mismatches, then actual mismatches, then count
    /// mismatches, each in team-week order.
    pub details: Vec<ReconciliationDetail>,
}

impl ReconciliationSummary {
    pub fn is_clean(&self) -> bool {
        self.bad_projections == 0 && self.bad_actuals == 0 && self.bad_counts == 0
    }
}

/// Aggregate one team-week's starter rows.
///
/// Stored totals are taken from the first row; the group is expected to
/// repeat them on every row. An empty group means the caller grouped
/// incorrectly and is an error rather than a zero-row result.
pub fn reconcile_group(key: &TeamWeekKey, starters: &[&BoxscoreRow]) -> Result<ReconciliationRow, ReconcileError> {
    let first = starters
        .first()
        .ok_or_else(|| ReconcileError::EmptyGroup { key: key.clone() })?;

    let starters_proj_sum: f64 = starters.iter().map(|r| r.rs_projected_pf).sum();
    let starters_actual_sum: f64 = starters.iter().map(|r| r.rs_actual_pf).sum();

    Ok(ReconciliationRow {
        key: key.clone(),
        team_projected_total: first.team_projected_total,
        team_actual_total: first.team_actual_total,
        starters_proj_sum,
        starters_actual_sum,
        starter_count: starters.len(),
        proj_diff: round2(starters_proj_sum - first.team_projected_total),
        act_diff: round2(starters_actual_sum - first.team_actual_total),
    })
}

/// Check every team-week in an export: starter sums against stored totals
/// (beyond `tolerance`) and starter counts against `required_starters`.
/// Bench rows are ignored.
pub fn reconcile(
    rows: &[BoxscoreRow],
    tolerance: f64,
    required_starters: usize,
) -> Result<ReconciliationSummary, ReconcileError> {
    let mut groups: BTreeMap<TeamWeekKey, Vec<&BoxscoreRow>> = BTreeMap::new();
    for row in rows.iter().filter(|r| r.is_starter()) {
        groups.entry(TeamWeekKey::of(row)).or_default().push(row);
    }

    let aggregated = groups
        .iter()
        .map(|(key, group)| reconcile_group(key, group))
        .collect::<Result<Vec<_>, _>>()?;

    let bad_proj: Vec<&ReconciliationRow> = aggregated.iter().filter(|r| r.proj_mismatch(tolerance)).collect();
    let bad_act: Vec<&ReconciliationRow> = aggregated.iter().filter(|r| r.actual_mismatch(tolerance)).collect();
    let bad_count: Vec<&ReconciliationRow> = aggregated
        .iter()
        .filter(|r| r.starter_count != required_starters)
        .collect();

    let details = bad_proj
        .iter()
        .map(|r| ReconciliationDetail::new(r, ReconcileIssue::ProjMismatch))
        .chain(bad_act.iter().map(|r| ReconciliationDetail::new(r, ReconcileIssue::ActualMismatch)))
        .chain(bad_count.iter().map(|r| ReconciliationDetail::new(r, ReconcileIssue::StarterCount)))
        .collect();

    let summary = ReconciliationSummary {
        team_weeks_checked: aggregated.len(),
        bad_projections: bad_proj.len(),
        bad_actuals: bad_act.len(),
        bad_counts: bad_count.len(),
        details,
    };
    info!(
        "reconciled {} team-weeks: {} projection, {} actual, {} count mismatches",
        summary.team_weeks_checked, summary.bad_projections, summary.bad_actuals, summary.bad_counts
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slot::{Slot, SlotType};

    fn row(week: u32, team: &str, proj_total: f64, act_total: f64, proj: f64, act: f64) -> BoxscoreRow {
        BoxscoreRow {
            season_year: 2022,
            week,
            matchup: 1,
            team_code: team.into(),
            is_co_owned: String::new(),
            team_owner_1: String::new(),
            team_owner_2: String::new(),
            team_projected_total: proj_total,
            team_actual_total: act_total,
            slot_type: SlotType::Starters,
            slot: Slot::Rb,
            player_name: Some("Player".into()),
            nfl_team: None,
            position: Some("RB".into()),
            is_placeholder: false,
            issue_flag: None,
            rs_projected_pf: proj,
            rs_actual_pf: act,
        }
    }

    /// Nine starters whose points sum exactly to the stored totals.
    fn clean_team(week: u32, team: &str) -> Vec<BoxscoreRow> {
        (0..9).map(|_| row(week, team, 90.0, 45.0, 10.0, 5.0)).collect()
    }

    #[test]
    fn clean_export_has_no_findings() {
        let mut rows = clean_team(1, "AAA");
        rows.extend(clean_team(1, "BBB"));
        let mut bench = row(1, "AAA", 90.0, 45.0, 30.0, 30.0);
        bench.slot_type = SlotType::Bench;
        bench.slot = Slot::Bench;
        rows.push(bench);

        let summary = reconcile(&rows, 0.0, 9).unwrap();
        assert_eq!(summary.team_weeks_checked, 2);
        assert!(summary.is_clean());
        assert!(summary.details.is_empty());
    }

    #[test]
    fn tolerance_boundary() {
        let mut rows: Vec<BoxscoreRow> = (0..8).map(|_| row(2, "AAA", 100.0, 0.0, 10.0, 0.0)).collect();
        rows.push(row(2, "AAA", 100.0, 0.0, 20.01, 0.0));

        let strict = reconcile(&rows, 0.0, 9).unwrap();
        assert_eq!(strict.bad_projections, 1);
        assert_eq!(strict.details[0].proj_diff, 0.01);
        assert_eq!(strict.details[0].issue, ReconcileIssue::ProjMismatch);

        let relaxed = reconcile(&rows, 0.02, 9).unwrap();
        assert!(relaxed.is_clean());
    }

    #[test]
    fn starter_count_mismatch() {
        let mut rows = clean_team(3, "AAA");
        rows.pop();
        let summary = reconcile(&rows, 0.0, 9).unwrap();
        // Dropping a row also breaks both sums.
        assert_eq!(summary.bad_counts, 1);
        assert_eq!(summary.bad_projections, 1);
        assert_eq!(summary.bad_actuals, 1);
        let issues: Vec<_> = summary.details.iter().map(|d| d.issue.as_str()).collect();
        assert_eq!(issues, ["proj_mismatch", "actual_mismatch", "starter_count"]);
        assert_eq!(summary.details[2].starter_count, 8);
    }

    #[test]
    fn groups_come_out_in_key_order() {
        let mut rows = clean_team(5, "ZZZ");
        rows.extend(clean_team(1, "YYY"));
        for r in rows.iter_mut() {
            r.team_actual_total = 0.0;
        }
        let summary = reconcile(&rows, 0.0, 9).unwrap();
        let teams: Vec<_> = summary.details.iter().map(|d| d.team_code.as_str()).collect();
        assert_eq!(teams, ["YYY", "ZZZ"]);
    }

    #[test]
    fn stored_totals_come_from_first_row() {
        let rows = vec![row(1, "AAA", 10.0, 10.0, 5.0, 5.0), row(1, "AAA", 99.0, 99.0, 5.0, 5.0)];
        let refs: Vec<&BoxscoreRow> = rows.iter().collect();
        let agg = reconcile_group(&TeamWeekKey::of(&rows[0]), &refs).unwrap();
        assert_eq!(agg.team_projected_total, 10.0);
        assert_eq!(agg.proj_diff, 0.0);
        assert_eq!(agg.starter_count, 2);
    }

    #[test]
    fn empty_group_fails_fast() {
        let key = TeamWeekKey {
            week: 1,
            matchup: 1,
            team_code: "AAA".into(),
        };
        assert_eq!(
            reconcile_group(&key, &[]),
            Err(ReconcileError::EmptyGroup { key })
        );
    }

    #[test]
    fn empty_export_checks_nothing() {
        let summary = reconcile(&[], 0.0, 9).unwrap();
        assert_eq!(summary.team_weeks_checked, 0);
        assert!(summary.is_clean());
    }
}
