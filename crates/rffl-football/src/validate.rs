// Starting-lineup compliance checks.

use std::collections::HashMap;
use std::fmt;

use crate::lineup::CanonicalRow;
use crate::rules::LineupRules;
use crate::slot::Slot;

/// Slots that only accept the position of the same name.
const POSITION_LOCKED: [Slot; 3] = [Slot::Qb, Slot::K, Slot::Dst];

/// One rule violation in a team-week's starting lineup.
#[derive(Debug, Clone, PartialEq)]
pub enum LineupIssue {
    /// A required slot holds more or fewer players than the rules call for.
    CountMismatch {
        slot: Slot,
        required: usize,
        actual: usize,
    },
    /// A FLEX starter whose position is not flex-eligible.
    FlexIneligible {
        player: Option<String>,
        position: Option<String>,
    },
    /// The same player name appears more than once among the starters.
    DuplicatePlayer { player: String, count: usize },
    /// A QB, K, or D/ST slot holding a different position.
    InvalidPositionInSlot {
        slot: Slot,
        player: Option<String>,
        position: Option<String>,
    },
}

impl LineupIssue {
    pub fn kind(&self) -> &'static str {
        match self {
            LineupIssue::CountMismatch { .. } => "count_mismatch",
            LineupIssue::FlexIneligible { .. } => "flex_ineligible",
            LineupIssue::DuplicatePlayer { .. } => "duplicate_player",
            LineupIssue::InvalidPositionInSlot { .. } => "invalid_position_in_slot",
        }
    }

    pub fn slot(&self) -> Option<&Slot> {
        match self {
            LineupIssue::CountMismatch { slot, .. } | LineupIssue::InvalidPositionInSlot { slot, .. } => {
                Some(slot)
            }
            LineupIssue::FlexIneligible { .. } => Some(&Slot::Flex),
            LineupIssue::DuplicatePlayer { .. } => None,
        }
    }

    pub fn player(&self) -> Option<&str> {
        match self {
            LineupIssue::FlexIneligible { player, .. } | LineupIssue::InvalidPositionInSlot { player, .. } => {
                player.as_deref()
            }
            LineupIssue::DuplicatePlayer { player, .. } => Some(player),
            LineupIssue::CountMismatch { .. } => None,
        }
    }

    pub fn position(&self) -> Option<&str> {
        match self {
            LineupIssue::FlexIneligible { position, .. }
            | LineupIssue::InvalidPositionInSlot { position, .. } => position.as_deref(),
            _ => None,
        }
    }
}

fn or_unknown(s: &Option<String>) -> &str {
    s.as_deref().unwrap_or("UNKNOWN")
}

impl fmt::Display for LineupIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LineupIssue::CountMismatch {
                slot,
                required,
                actual,
            } => write!(f, "Expected {required} {slot}, found {actual}"),
            LineupIssue::FlexIneligible { player, position } => write!(
                f,
                "FLEX player {} has ineligible position {}",
                or_unknown(player),
                or_unknown(position)
            ),
            LineupIssue::DuplicatePlayer { player, count } => {
                write!(f, "Player {player} appears {count} times in starters")
            }
            LineupIssue::InvalidPositionInSlot {
                slot,
                player,
                position,
            } => write!(
                f,
                "{slot} slot contains {} player {}",
                or_unknown(position),
                or_unknown(player)
            ),
        }
    }
}

/// Outcome of checking one starting lineup.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LineupValidation {
    pub is_valid: bool,
    pub issues: Vec<LineupIssue>,
}

/// Check a team-week's starting rows against the lineup rules.
///
/// Issues come out grouped by check: slot counts (in requirement order),
/// FLEX eligibility (in row order), duplicates (in order of first
/// appearance), then locked-slot positions (in row order). Placeholder rows
/// count toward slot totals but are never duplicates of each other.
pub fn validate_lineup(starters: &[CanonicalRow], rules: &LineupRules) -> LineupValidation {
    let mut issues = Vec::new();

    for (slot, required) in rules.requirements() {
        let actual = starters.iter().filter(|r| r.slot == *slot).count();
        if actual != *required {
            issues.push(LineupIssue::CountMismatch {
                slot: slot.clone(),
                required: *required,
                actual,
            });
        }
    }

    for row in starters {
        if row.slot == Slot::Flex && !rules.is_flex_eligible(row.position.as_deref()) {
            issues.push(LineupIssue::FlexIneligible {
                player: row.player_name.clone(),
                position: row.position.clone(),
            });
        }
    }

    let mut first_seen: Vec<&str> = Vec::new();
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for row in starters.iter().filter(|r| !r.is_placeholder) {
        let Some(name) = row.player_name.as_deref() else {
            continue;
        };
        let count = counts.entry(name).or_insert(0);
        if *count == 0 {
            first_seen.push(name);
        }
        *count += 1;
    }
    for name in first_seen {
        let count = counts.get(name).copied().unwrap_or_default();
        if count > 1 {
            issues.push(LineupIssue::DuplicatePlayer {
                player: name.to_string(),
                count,
            });
        }
    }

    for row in starters {
        if !POSITION_LOCKED.contains(&row.slot) {
            continue;
        }
        let fits = row
            .position
            .as_deref()
            .is_some_and(|p| p.trim().eq_ignore_ascii_case(row.slot.label()));
        if !fits {
            issues.push(LineupIssue::InvalidPositionInSlot {
                slot: row.slot.clone(),
                player: row.player_name.clone(),
                position: row.position.clone(),
            });
        }
    }

    LineupValidation {
        is_valid: issues.is_empty(),
        issues,
    }
}
