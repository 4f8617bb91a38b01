// Lineup compliance over a persisted box-score export.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::info;

use crate::boxscore::BoxscoreRow;
use crate::lineup::CanonicalRow;
use crate::reconcile::TeamWeekKey;
use crate::rules::LineupRules;
use crate::validate::{validate_lineup, LineupIssue};

/// One issue, flattened for the lineup validation report CSV.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineupIssueRecord {
    pub week: u32,
    pub matchup: u32,
    pub team_code: String,
    pub issue_type: String,
    pub description: String,
    pub slot: Option<String>,
    pub player: Option<String>,
    pub position: Option<String>,
    pub required: Option<usize>,
    pub actual: Option<usize>,
    pub count: Option<usize>,
}

impl LineupIssueRecord {
    fn new(key: &TeamWeekKey, issue: &LineupIssue) -> Self {
        let (required, actual, count) = match issue {
            LineupIssue::CountMismatch {
                required, actual, ..
            } => (Some(*required), Some(*actual), None),
            LineupIssue::DuplicatePlayer { count, .. } => (None, None, Some(*count)),
            _ => (None, None, None),
        };
        LineupIssueRecord {
            week: key.week,
            matchup: key.matchup,
            team_code: key.team_code.clone(),
            issue_type: issue.kind().to_string(),
            description: issue.to_string(),
            slot: issue.slot().map(|s| s.label().to_string()),
            player: issue.player().map(str::to_string),
            position: issue.position().map(str::to_string),
            required,
            actual,
            count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct LineupValidationReport {
    pub total_lineups: usize,
    pub valid_lineups: usize,
    pub records: Vec<LineupIssueRecord>,
}

impl LineupValidationReport {
    pub fn invalid_lineups(&self) -> usize {
        self.total_lineups - self.valid_lineups
    }

    /// Issue counts keyed by issue type.
    pub fn issues_by_type(&self) -> BTreeMap<&str, usize> {
        let mut counts = BTreeMap::new();
        for record in &self.records {
            *counts.entry(record.issue_type.as_str()).or_insert(0) += 1;
        }
        counts
    }
}

/// Validate every team-week's starters in an export, in team-week order.
pub fn validate_lineups(rows: &[BoxscoreRow], rules: &LineupRules) -> LineupValidationReport {
    let mut groups: BTreeMap<TeamWeekKey, Vec<CanonicalRow>> = BTreeMap::new();
    for row in rows.iter().filter(|r| r.is_starter()) {
        groups
            .entry(TeamWeekKey::of(row))
            .or_default()
            .push(row.to_canonical());
    }

    let mut report = LineupValidationReport {
        total_lineups: groups.len(),
        ..Default::default()
    };
    for (key, starters) in &groups {
        let result = validate_lineup(starters, rules);
        if result.is_valid {
            report.valid_lineups += 1;
        }
        report
            .records
            .extend(result.issues.iter().map(|issue| LineupIssueRecord::new(key, issue)));
    }

    info!(
        "validated {} lineups: {} valid, {} issues",
        report.total_lineups,
        report.valid_lineups,
        report.records.len()
    );
    report
}
