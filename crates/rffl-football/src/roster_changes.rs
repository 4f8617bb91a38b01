// Roster movement: which players a team kept, added, or dropped.
//
// Season changes set each team's draft against its end-of-season roster.
// Weekly changes walk a season's box scores week by week, starting from the
// draft. Player names match trimmed and case-insensitively.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use rffl_core::teams::AliasIndex;
use serde::Serialize;
use tracing::{info, warn};

use crate::boxscore::BoxscoreRow;
use crate::draft::DraftRow;
use crate::history::RosterRow;
use crate::slot::SlotType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeType {
    /// Drafted and still on the end-of-season roster.
    Kept,
    /// Drafted and on the roster in the season's first week.
    DraftKept,
    Added,
    Dropped,
}

impl ChangeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeType::Kept => "kept",
            ChangeType::DraftKept => "draft_kept",
            ChangeType::Added => "added",
            ChangeType::Dropped => "dropped",
        }
    }
}

fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Years a file covers, for default output names: `2011-2017` or `2019`.
pub fn year_span(years: impl IntoIterator<Item = i32>) -> Option<String> {
    let years: BTreeSet<i32> = years.into_iter().collect();
    match (years.first(), years.last()) {
        (Some(lo), Some(hi)) if lo == hi => Some(lo.to_string()),
        (Some(lo), Some(hi)) => Some(format!("{lo}-{hi}")),
        _ => None,
    }
}

fn span_path(prefix: &str, years: impl IntoIterator<Item = i32>) -> String {
    match year_span(years) {
        Some(span) => format!("{prefix}_{span}.csv"),
        None => format!("{prefix}.csv"),
    }
}

pub fn default_roster_changes_path(years: impl IntoIterator<Item = i32>) -> String {
    span_path("roster_changes", years)
}

pub fn default_weekly_roster_changes_path(years: impl IntoIterator<Item = i32>) -> String {
    span_path("weekly_roster_changes", years)
}

// ---------------------------------------------------------------------------
// Draft lookups
// ---------------------------------------------------------------------------

/// One season's draft picks resolved to canonical team codes.
struct SeasonDraft<'a> {
    /// First pick of each player, by name key.
    by_player: HashMap<String, &'a DraftRow>,
    /// Picks per canonical team, in draft order.
    by_team: HashMap<String, Vec<&'a DraftRow>>,
}

impl<'a> SeasonDraft<'a> {
    fn build(year: i32, draft: &'a [DraftRow], aliases: &AliasIndex) -> Self {
        let mut by_player = HashMap::new();
        let mut by_team: HashMap<String, Vec<&DraftRow>> = HashMap::new();
        for pick in draft.iter().filter(|p| p.year == year) {
            let key = name_key(&pick.player_name);
            if key.is_empty() {
                continue;
            }
            by_player.entry(key).or_insert(pick);
            let team = aliases.resolve(&pick.team_abbrev, Some(year));
            by_team.entry(team).or_default().push(pick);
        }
        SeasonDraft { by_player, by_team }
    }

    fn team_picks(&self, team: &str) -> &[&'a DraftRow] {
        self.by_team.get(team).map(Vec::as_slice).unwrap_or_default()
    }

    fn pick_of(&self, key: &str) -> (Option<u32>, Option<u32>) {
        self.by_player
            .get(key)
            .map_or((None, None), |p| (p.round, p.round_pick))
    }
}

/// Items with distinct, non-empty name keys, first occurrence kept.
fn distinct_by_name<'a, T>(items: impl IntoIterator<Item = &'a T>, name: impl Fn(&T) -> &str) -> Vec<(String, &'a T)>
where
    T: 'a,
{
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter_map(|item| {
            let key = name_key(name(item));
            (!key.is_empty() && seen.insert(key.clone())).then_some((key, item))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Draft vs. end-of-season roster
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RosterChangeRow {
    pub season_year: i32,
    pub team_code: String,
    /// The abbreviation the team drafted under.
    pub team_draft_code: String,
    pub change_type: ChangeType,
    pub player_name: String,
    pub draft_round: Option<u32>,
    pub draft_pick: Option<u32>,
    pub final_slot: Option<String>,
    pub final_is_starter: Option<bool>,
}

/// Compare each team's draft with its end-of-season roster.
///
/// Draft abbreviations are resolved to canonical codes for the draft's
/// season. For every team on a final roster, roster players come first in
/// roster order (`kept` when the team drafted them, else `added`), followed
/// by its drafted players missing from the roster (`dropped`) in draft
/// order. Seasons with a draft but no roster are skipped.
pub fn season_roster_changes(draft: &[DraftRow], rosters: &[RosterRow], aliases: &AliasIndex) -> Vec<RosterChangeRow> {
    let mut teams: BTreeMap<(i32, &str), Vec<&RosterRow>> = BTreeMap::new();
    for row in rosters {
        teams
            .entry((row.season_year, row.team_code.as_str()))
            .or_default()
            .push(row);
    }

    let roster_years: BTreeSet<i32> = teams.keys().map(|(year, _)| *year).collect();
    for year in draft.iter().map(|p| p.year).collect::<BTreeSet<_>>() {
        if !roster_years.contains(&year) {
            warn!("no end-of-season roster for {}; skipping its draft", year);
        }
    }

    let mut changes = Vec::new();
    for year in roster_years {
        let season = SeasonDraft::build(year, draft, aliases);
        for team in season.by_team.keys() {
            if !teams.contains_key(&(year, team.as_str())) {
                warn!("{}: drafting team {} has no end-of-season roster", year, team);
            }
        }

        for ((_, team_code), roster) in teams.range((year, "")..).take_while(|((y, _), _)| *y == year) {
            let picks = season.team_picks(team_code);
            let draft_code = picks
                .first()
                .map_or_else(|| team_code.to_string(), |p| p.team_abbrev.clone());
            let drafted: HashMap<String, &DraftRow> = distinct_by_name(picks.iter().copied(), |p| p.player_name.as_str())
                .into_iter()
                .collect();

            let change = |change_type, player_name: &str, pick: Option<&DraftRow>, last: Option<&RosterRow>| {
                RosterChangeRow {
                    season_year: year,
                    team_code: team_code.to_string(),
                    team_draft_code: draft_code.clone(),
                    change_type,
                    player_name: player_name.to_string(),
                    draft_round: pick.and_then(|p| p.round),
                    draft_pick: pick.and_then(|p| p.round_pick),
                    final_slot: last.map(|r| r.slot.clone()),
                    final_is_starter: last.map(|r| r.is_starter),
                }
            };

            let kept_or_added = distinct_by_name(roster.iter().copied(), |r| r.player_name.as_str());
            let on_roster: HashSet<&str> = kept_or_added.iter().map(|(key, _)| key.as_str()).collect();
            for (key, row) in &kept_or_added {
                changes.push(match drafted.get(key) {
                    Some(pick) => change(ChangeType::Kept, &row.player_name, Some(*pick), Some(*row)),
                    None => change(ChangeType::Added, &row.player_name, None, Some(*row)),
                });
            }
            for (key, pick) in distinct_by_name(picks.iter().copied(), |p| p.player_name.as_str()) {
                if !on_roster.contains(key.as_str()) {
                    changes.push(change(ChangeType::Dropped, &pick.player_name, Some(pick), None));
                }
            }
        }
    }

    info!("found {} draft-to-final roster changes", changes.len());
    changes
}

// ---------------------------------------------------------------------------
// Week over week
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklyRosterChangeRow {
    pub season_year: i32,
    pub week: u32,
    pub team_code: String,
    pub change_type: ChangeType,
    pub player_name: String,
    /// Week the dropped player was last rostered; 0 for drafted players
    /// missing from the first week.
    pub previous_week: Option<u32>,
    pub draft_round: Option<u32>,
    pub draft_pick: Option<u32>,
    pub slot_type: Option<SlotType>,
    pub is_starter: Option<bool>,
}

/// One team's roster in one week: distinct players in row order.
type WeekRoster<'a> = Vec<(String, &'a BoxscoreRow)>;

/// Track each team's roster week over week from box-score rows.
///
/// The season's first week is compared with the team's draft: drafted
/// players present are `draft_kept`, others present are `added`, drafted
/// players absent are `dropped` with `previous_week` 0. Each later week is
/// compared with the one before it. Draft round and pick are those of the
/// player's pick in that season, by any team. Placeholder rows are not
/// players. Output is ordered by season, team code, and week.
pub fn weekly_roster_changes(
    boxscores: &[BoxscoreRow],
    draft: &[DraftRow],
    aliases: &AliasIndex,
) -> Vec<WeeklyRosterChangeRow> {
    let mut seasons: BTreeMap<i32, BTreeMap<&str, BTreeMap<u32, Vec<&BoxscoreRow>>>> = BTreeMap::new();
    let mut weeks: BTreeMap<i32, BTreeSet<u32>> = BTreeMap::new();
    for row in boxscores {
        weeks.entry(row.season_year).or_default().insert(row.week);
        let team_weeks = seasons
            .entry(row.season_year)
            .or_default()
            .entry(row.team_code.as_str())
            .or_default()
            .entry(row.week)
            .or_default();
        if !row.is_placeholder {
            team_weeks.push(row);
        }
    }

    let mut changes = Vec::new();
    for (year, teams) in &seasons {
        let season = SeasonDraft::build(*year, draft, aliases);
        let season_weeks = weeks.get(year).cloned().unwrap_or_default();

        for (team_code, by_week) in teams {
            let change = |week, change_type, player_name: &str, previous_week, row: Option<&BoxscoreRow>| {
                let (draft_round, draft_pick) = season.pick_of(&name_key(player_name));
                WeeklyRosterChangeRow {
                    season_year: *year,
                    week,
                    team_code: team_code.to_string(),
                    change_type,
                    player_name: player_name.to_string(),
                    previous_week,
                    draft_round,
                    draft_pick,
                    slot_type: row.map(|r| r.slot_type),
                    is_starter: row.map(BoxscoreRow::is_starter),
                }
            };

            let mut previous: Option<(u32, WeekRoster<'_>)> = None;
            for &week in &season_weeks {
                let rows = by_week.get(&week).map(Vec::as_slice).unwrap_or_default();
                let current: WeekRoster<'_> = distinct_by_name(rows.iter().copied(), |r: &BoxscoreRow| {
                    r.player_name.as_deref().unwrap_or_default()
                });
                let current_keys: HashSet<&str> = current.iter().map(|(k, _)| k.as_str()).collect();

                match &previous {
                    None => {
                        let picks = distinct_by_name(season.team_picks(team_code).iter().copied(), |p| p.player_name.as_str());
                        let drafted: HashSet<&str> = picks.iter().map(|(k, _)| k.as_str()).collect();
                        for (key, row) in &current {
                            let kind = if drafted.contains(key.as_str()) {
                                ChangeType::DraftKept
                            } else {
                                ChangeType::Added
                            };
                            changes.push(change(week, kind, display_name(row), None, Some(*row)));
                        }
                        for (key, pick) in &picks {
                            if !current_keys.contains(key.as_str()) {
                                changes.push(change(week, ChangeType::Dropped, &pick.player_name, Some(0), None));
                            }
                        }
                    }
                    Some((last_week, last)) => {
                        let last_keys: HashSet<&str> = last.iter().map(|(k, _)| k.as_str()).collect();
                        for (key, row) in &current {
                            if !last_keys.contains(key.as_str()) {
                                changes.push(change(week, ChangeType::Added, display_name(row), None, Some(*row)));
                            }
                        }
                        for (key, row) in last {
                            if !current_keys.contains(key.as_str()) {
                                changes.push(change(
                                    week,
                                    ChangeType::Dropped,
                                    display_name(row),
                                    Some(*last_week),
                                    None,
                                ));
                            }
                        }
                    }
                }
                previous = Some((week, current));
            }
        }
    }

    info!("found {} weekly roster changes", changes.len());
    changes
}

fn display_name(row: &BoxscoreRow) -> &str {
    row.player_name.as_deref().unwrap_or_default().trim()
}
