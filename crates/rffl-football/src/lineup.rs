// Lineup building: raw roster entries to ordered canonical rows and totals.

use std::collections::VecDeque;

use rffl_core::snapshot::SnapshotEntry;
use serde::Serialize;
use tracing::debug;

use crate::rules::LineupRules;
use crate::slot::{normalize_slot, Slot, SlotType};

/// Prefix of the player name written on placeholder rows.
pub const PLACEHOLDER_PREFIX: &str = "EMPTY SLOT - ";

/// Round to two decimals.
///
/// Rounds the stored value itself, not `x * 100`: 2.675 is held as
/// 2.67499.. and becomes 2.67. Exact ties (0.125) go to even. Negative zero
/// comes back as zero.
pub fn round2(x: f64) -> f64 {
    if !x.is_finite() {
        return x;
    }
    format!("{x:.2}").parse::<f64>().map_or(x, |r| r + 0.0)
}

/// Absent and non-finite point values count as zero.
pub fn points_or_zero(value: Option<f64>) -> f64 {
    value.filter(|v| v.is_finite()).unwrap_or(0.0)
}

// ---------------------------------------------------------------------------
// Input / output rows
// ---------------------------------------------------------------------------

/// One rostered player for one team-week, as reported upstream.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RosterEntry {
    pub slot_label: Option<String>,
    pub position_label: Option<String>,
    pub player_name: Option<String>,
    pub pro_team: Option<String>,
    pub projected_points: Option<f64>,
    pub actual_points: Option<f64>,
    /// Position of the entry in the upstream roster list.
    pub original_index: usize,
}

impl RosterEntry {
    pub fn from_snapshot(original_index: usize, entry: &SnapshotEntry) -> Self {
        RosterEntry {
            slot_label: entry.slot_label(),
            position_label: entry.position_label(),
            player_name: entry.name.clone(),
            pro_team: entry.pro_team_label(),
            projected_points: entry.projected_points,
            actual_points: entry.points,
            original_index,
        }
    }
}

/// Index every entry of an upstream roster list by its position.
pub fn roster_entries(lineup: &[SnapshotEntry]) -> Vec<RosterEntry> {
    lineup
        .iter()
        .enumerate()
        .map(|(i, e)| RosterEntry::from_snapshot(i, e))
        .collect()
}

/// A normalized lineup row. Points are already rounded to two decimals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CanonicalRow {
    pub slot: Slot,
    pub slot_type: SlotType,
    pub player_name: Option<String>,
    pub nfl_team: Option<String>,
    pub position: Option<String>,
    pub is_placeholder: bool,
    pub issue_flag: Option<String>,
    pub projected_points: f64,
    pub actual_points: f64,
}

impl CanonicalRow {
    pub fn is_starter(&self) -> bool {
        self.slot_type == SlotType::Starters
    }

    /// Zero-point row standing in for an unfilled required slot.
    pub fn placeholder(slot: Slot, rules: &LineupRules) -> Self {
        CanonicalRow {
            player_name: Some(format!("{PLACEHOLDER_PREFIX}{}", slot.label())),
            nfl_team: None,
            position: Some(rules.placeholder_position(&slot)),
            is_placeholder: true,
            issue_flag: Some(format!("MISSING_SLOT:{}", slot.label())),
            projected_points: 0.0,
            actual_points: 0.0,
            slot_type: slot.slot_type(),
            slot,
        }
    }
}

/// A team-week's ordered rows plus the totals computed from its starters.
#[derive(Debug, Clone, PartialEq)]
pub struct Lineup {
    pub rows: Vec<CanonicalRow>,
    pub team_projected_total: f64,
    pub team_actual_total: f64,
}

impl Lineup {
    pub fn starters(&self) -> impl Iterator<Item = &CanonicalRow> {
        self.rows.iter().filter(|r| r.is_starter())
    }

    pub fn bench(&self) -> impl Iterator<Item = &CanonicalRow> {
        self.rows.iter().filter(|r| !r.is_starter())
    }
}

// ---------------------------------------------------------------------------
// Building
// ---------------------------------------------------------------------------

/// A row paired with the index it sorts by.
struct Indexed {
    row: CanonicalRow,
    index: usize,
}

fn canonicalize(entry: &RosterEntry, rules: &LineupRules) -> CanonicalRow {
    let slot = normalize_slot(entry.slot_label.as_deref(), entry.position_label.as_deref());
    let issue_flag = if slot == Slot::Flex && !rules.is_flex_eligible(entry.position_label.as_deref()) {
        let pos = entry
            .position_label
            .as_deref()
            .filter(|p| !p.is_empty())
            .map(str::to_uppercase)
            .unwrap_or_else(|| "UNKNOWN".to_string());
        Some(format!("INVALID_FLEX_POSITION:{pos}"))
    } else {
        None
    };

    CanonicalRow {
        slot_type: slot.slot_type(),
        slot,
        player_name: entry.player_name.clone(),
        nfl_team: entry.pro_team.clone(),
        position: entry.position_label.clone(),
        is_placeholder: false,
        issue_flag,
        projected_points: round2(points_or_zero(entry.projected_points)),
        actual_points: round2(points_or_zero(entry.actual_points)),
    }
}

/// Turn one team-week's raw roster entries into its canonical lineup.
///
/// Starters come first, in the rules' starter sequence (for RFFL: QB, RB,
/// RB, WR, WR, TE, FLEX, D/ST, K), each slot taking entries in original
/// index order. Starters the sequence has no room for follow, ordered by
/// slot rank and then index; the bench comes last in index order.
///
/// With `fill_missing_slots`, every required slot that is short gets
/// zero-point placeholder rows up to its count. Team totals are the
/// rounded sums of the rounded starter points, placeholders included.
pub fn build_lineup(entries: &[RosterEntry], rules: &LineupRules, fill_missing_slots: bool) -> Lineup {
    let mut indexed: Vec<Indexed> = entries
        .iter()
        .map(|e| Indexed {
            row: canonicalize(e, rules),
            index: e.original_index,
        })
        .collect();

    if fill_missing_slots {
        // Placeholders sort after every real entry of their slot.
        let mut sentinel = entries
            .iter()
            .map(|e| e.original_index + 1)
            .max()
            .unwrap_or(0);
        for (slot, required) in rules.requirements() {
            let present = indexed.iter().filter(|i| i.row.slot == *slot).count();
            for _ in present..*required {
                indexed.push(Indexed {
                    row: CanonicalRow::placeholder(slot.clone(), rules),
                    index: sentinel,
                });
                sentinel += 1;
            }
        }
    }

    let team_projected_total = round2(
        indexed
            .iter()
            .filter(|i| i.row.is_starter())
            .map(|i| i.row.projected_points)
            .sum(),
    );
    let team_actual_total = round2(
        indexed
            .iter()
            .filter(|i| i.row.is_starter())
            .map(|i| i.row.actual_points)
            .sum(),
    );

    let rows = order_rows(indexed, rules);
    debug!(
        "built lineup: {} rows, proj {:.2}, actual {:.2}",
        rows.len(),
        team_projected_total,
        team_actual_total
    );

    Lineup {
        rows,
        team_projected_total,
        team_actual_total,
    }
}

fn order_rows(indexed: Vec<Indexed>, rules: &LineupRules) -> Vec<CanonicalRow> {
    let (mut starters, mut bench): (Vec<Indexed>, Vec<Indexed>) =
        indexed.into_iter().partition(|i| i.row.is_starter());
    starters.sort_by_key(|i| i.index);
    bench.sort_by_key(|i| i.index);

    // One queue per slot, in first-seen order.
    let mut queues: Vec<(Slot, VecDeque<Indexed>)> = Vec::new();
    for item in starters {
        match queues.iter_mut().find(|(s, _)| *s == item.row.slot) {
            Some((_, q)) => q.push_back(item),
            None => queues.push((item.row.slot.clone(), VecDeque::from([item]))),
        }
    }

    let mut ordered = Vec::new();
    for slot in rules.starter_sequence() {
        if let Some((_, q)) = queues.iter_mut().find(|(s, _)| *s == slot) {
            if let Some(item) = q.pop_front() {
                ordered.push(item.row);
            }
        }
    }

    let mut leftovers: Vec<Indexed> = queues.into_iter().flat_map(|(_, q)| q).collect();
    leftovers.sort_by_key(|i| (rules.slot_rank(&i.row.slot), i.index));
    ordered.extend(leftovers.into_iter().map(|i| i.row));
    ordered.extend(bench.into_iter().map(|i| i.row));
    ordered
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(index: usize, slot: &str, pos: &str, name: &str, proj: f64, pts: f64) -> RosterEntry {
        RosterEntry {
            slot_label: Some(slot.into()),
            position_label: Some(pos.into()),
            player_name: Some(name.into()),
            pro_team: Some("KC".into()),
            projected_points: Some(proj),
            actual_points: Some(pts),
            original_index: index,
        }
    }

    /// A complete RFFL lineup plus two bench players, listed out of order.
    fn full_roster() -> Vec<RosterEntry> {
        vec![
            entry(0, "BE", "WR", "Bench Receiver", 8.0, 4.0),
            entry(1, "K", "K", "Kicker", 8.0, 9.0),
            entry(2, "WR", "WR", "Receiver Two", 11.0, 12.5),
            entry(3, "RB", "RB", "Back Two", 10.0, 3.2),
            entry(4, "QB", "QB", "Passer", 20.111, 24.36),
            entry(5, "RB/WR/TE", "TE", "Flex Tight End", 7.0, 7.0),
            entry(6, "RB", "RB", "Back One", 14.0, 18.1),
            entry(7, "D/ST", "D/ST", "Defense", 6.0, 10.0),
            entry(8, "TE", "TE", "Tight End", 9.0, 5.5),
            entry(9, "WR", "WR", "Receiver One", 13.0, 21.4),
            entry(10, "IR", "RB", "Injured Back", 0.0, 0.0),
        ]
    }

    fn slots(lineup: &Lineup) -> Vec<&str> {
        lineup.rows.iter().map(|r| r.slot.label()).collect()
    }

    #[test]
    fn starters_follow_canonical_order() {
        let lineup = build_lineup(&full_roster(), &LineupRules::rffl(), false);
        assert_eq!(
            slots(&lineup),
            ["QB", "RB", "RB", "WR", "WR", "TE", "FLEX", "D/ST", "K", "Bench", "IR"]
        );
        // Within a slot, original index order wins.
        assert_eq!(lineup.rows[1].player_name.as_deref(), Some("Back Two"));
        assert_eq!(lineup.rows[2].player_name.as_deref(), Some("Back One"));
        assert_eq!(lineup.starters().count(), 9);
        assert_eq!(lineup.bench().count(), 2);
    }

    #[test]
    fn totals_sum_rounded_starter_points() {
        let lineup = build_lineup(&full_roster(), &LineupRules::rffl(), false);
        assert_eq!(lineup.rows[0].projected_points, 20.11);
        // 20.11 + 10 + 14 + 11 + 13 + 9 + 7 + 6 + 8
        assert_eq!(lineup.team_projected_total, 98.11);
        // 24.36 + 3.2 + 18.1 + 12.5 + 21.4 + 5.5 + 7 + 10 + 9
        assert_eq!(lineup.team_actual_total, 111.06);
        let proj_sum: f64 = lineup.starters().map(|r| r.projected_points).sum();
        let actual_sum: f64 = lineup.starters().map(|r| r.actual_points).sum();
        assert_eq!(round2(proj_sum), lineup.team_projected_total);
        assert_eq!(round2(actual_sum), lineup.team_actual_total);
    }

    #[test]
    fn index_order_beats_input_order() {
        let entries = vec![
            entry(3, "RB", "RB", "Later Back", 1.0, 1.0),
            entry(1, "RB", "RB", "Earlier Back", 1.0, 1.0),
        ];
        let lineup = build_lineup(&entries, &LineupRules::rffl(), false);
        assert_eq!(lineup.rows[0].player_name.as_deref(), Some("Earlier Back"));
        assert_eq!(lineup.rows[1].player_name.as_deref(), Some("Later Back"));
    }

    #[test]
    fn bench_only_week_has_zero_totals() {
        let entries = vec![
            entry(0, "BE", "QB", "Backup", 12.0, 30.0),
            entry(1, "Bench", "RB", "Spare", 5.0, 6.0),
        ];
        let lineup = build_lineup(&entries, &LineupRules::rffl(), false);
        assert_eq!(lineup.team_projected_total, 0.0);
        assert_eq!(lineup.team_actual_total, 0.0);
        assert_eq!(lineup.rows.len(), 2);
        assert_eq!(lineup.starters().count(), 0);
    }

    #[test]
    fn empty_roster_with_fill_gets_nine_placeholders() {
        let lineup = build_lineup(&[], &LineupRules::rffl(), true);
        assert_eq!(
            slots(&lineup),
            ["QB", "RB", "RB", "WR", "WR", "TE", "FLEX", "D/ST", "K"]
        );
        assert!(lineup.rows.iter().all(|r| r.is_placeholder));
        assert_eq!(lineup.rows[0].player_name.as_deref(), Some("EMPTY SLOT - QB"));
        assert_eq!(lineup.rows[6].position.as_deref(), Some("WR"));
        assert_eq!(lineup.rows[7].issue_flag.as_deref(), Some("MISSING_SLOT:D/ST"));
        assert_eq!(lineup.team_projected_total, 0.0);
        assert_eq!(lineup.team_actual_total, 0.0);
    }

    #[test]
    fn empty_roster_without_fill_is_empty() {
        let lineup = build_lineup(&[], &LineupRules::rffl(), false);
        assert!(lineup.rows.is_empty());
        assert_eq!(lineup.team_actual_total, 0.0);
    }

    #[test]
    fn fill_only_tops_up_short_slots() {
        let mut roster = full_roster();
        roster.retain(|e| e.player_name.as_deref() != Some("Back Two"));
        let lineup = build_lineup(&roster, &LineupRules::rffl(), true);

        assert_eq!(lineup.starters().count(), 9);
        let rbs: Vec<_> = lineup.rows.iter().filter(|r| r.slot == Slot::Rb).collect();
        assert_eq!(rbs.len(), 2);
        assert_eq!(rbs[0].player_name.as_deref(), Some("Back One"));
        assert!(rbs[1].is_placeholder);
        assert_eq!(rbs[1].issue_flag.as_deref(), Some("MISSING_SLOT:RB"));
        assert_eq!(lineup.rows.iter().filter(|r| r.is_placeholder).count(), 1);
    }

    #[test]
    fn ineligible_flex_is_flagged() {
        let entries = vec![
            entry(0, "FLEX", "qb", "Flex Passer", 1.0, 1.0),
            RosterEntry {
                slot_label: Some("RB/WR/TE".into()),
                position_label: None,
                original_index: 1,
                ..Default::default()
            },
            entry(2, "FLEX", "wr", "Flex Receiver", 1.0, 1.0),
        ];
        let lineup = build_lineup(&entries, &LineupRules::rffl(), false);
        let flags: Vec<_> = lineup.rows.iter().map(|r| r.issue_flag.as_deref()).collect();
        assert_eq!(
            flags,
            [
                Some("INVALID_FLEX_POSITION:QB"),
                Some("INVALID_FLEX_POSITION:UNKNOWN"),
                None
            ]
        );
    }

    #[test]
    fn surplus_starters_follow_sequence() {
        let entries = vec![
            entry(0, "QB", "QB", "Second Passer", 1.0, 1.0),
            entry(1, "K", "K", "Kicker", 1.0, 1.0),
            entry(2, "QB", "QB", "First Passer", 1.0, 1.0),
            entry(3, "BE", "RB", "Spare", 1.0, 1.0),
        ];
        let lineup = build_lineup(&entries, &LineupRules::rffl(), false);
        let names: Vec<_> = lineup
            .rows
            .iter()
            .map(|r| r.player_name.as_deref().unwrap_or_default())
            .collect();
        assert_eq!(names, ["Second Passer", "Kicker", "First Passer", "Spare"]);
        // Surplus starters still count toward the totals.
        assert_eq!(lineup.team_actual_total, 3.0);
    }

    #[test]
    fn missing_and_non_finite_points_are_zero() {
        let entries = vec![
            RosterEntry {
                slot_label: Some("QB".into()),
                position_label: Some("QB".into()),
                projected_points: None,
                actual_points: Some(f64::NAN),
                original_index: 0,
                ..Default::default()
            },
            RosterEntry {
                slot_label: Some("K".into()),
                position_label: Some("K".into()),
                projected_points: Some(f64::INFINITY),
                actual_points: Some(4.004),
                original_index: 1,
                ..Default::default()
            },
        ];
        let lineup = build_lineup(&entries, &LineupRules::rffl(), false);
        assert_eq!(lineup.rows[0].projected_points, 0.0);
        assert_eq!(lineup.rows[0].actual_points, 0.0);
        assert_eq!(lineup.rows[1].projected_points, 0.0);
        assert_eq!(lineup.team_actual_total, 4.0);
    }

    #[test]
    fn round2_is_idempotent() {
        for x in [0.0, 1.005, 2.675, -3.14159, 98.114999, 123456.789] {
            assert_eq!(round2(round2(x)), round2(x));
        }
        assert_eq!(round2(20.111), 20.11);
        assert_eq!(round2(-0.256), -0.26);
    }

    #[test]
    fn round2_rounds_the_stored_value() {
        // Each literal is stored just below the decimal tie.
        assert_eq!(round2(2.675), 2.67);
        assert_eq!(round2(1.115), 1.11);
        assert_eq!(round2(14.385), 14.38);
        // Exact binary ties go to even.
        assert_eq!(round2(0.125), 0.12);
        assert_eq!(round2(0.625), 0.62);
        assert_eq!(round2(0.375), 0.38);
        assert!(round2(-0.001).is_sign_positive());
    }

    #[test]
    fn stored_ties_round_in_lineup_points() {
        let entries = vec![entry(0, "QB", "QB", "Passer", 2.675, 14.385)];
        let lineup = build_lineup(&entries, &LineupRules::rffl(), false);
        assert_eq!(lineup.rows[0].projected_points, 2.67);
        assert_eq!(lineup.rows[0].actual_points, 14.38);
        assert_eq!(lineup.team_projected_total, 2.67);
        assert_eq!(lineup.team_actual_total, 14.38);
    }

    #[test]
    fn snapshot_entries_keep_list_position() {
        let snapshot = vec![
            SnapshotEntry {
                slot_position: Some("QB".into()),
                name: Some("First".into()),
                ..Default::default()
            },
            SnapshotEntry {
                lineup_slot_id: Some(20),
                default_position_id: Some(2),
                name: Some("Second".into()),
                ..Default::default()
            },
        ];
        let entries = roster_entries(&snapshot);
        assert_eq!(entries[1].original_index, 1);
        assert_eq!(entries[1].slot_label.as_deref(), Some("Bench"));
        assert_eq!(entries[1].position_label.as_deref(), Some("RB"));
    }
}
