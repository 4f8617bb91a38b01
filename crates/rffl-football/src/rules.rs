// Lineup requirements: which starter slots a team must fill, and how many.

use rffl_core::config::LineupConfig;
use thiserror::Error;

use crate::slot::Slot;

#[derive(Debug, Error, PartialEq)]
pub enum RulesError {
    #[error("`{label}` is not a starter slot")]
    NotAStarterSlot { label: String },

    #[error("slot `{label}` requires a count > 0")]
    ZeroCount { label: String },

    #[error("flex-eligible position set is empty")]
    EmptyFlexSet,
}

/// A league's starting-lineup requirements.
///
/// Requirement order is the order starters are emitted in: under RFFL rules
/// QB, RB, RB, WR, WR, TE, FLEX, D/ST, K.
#[derive(Debug, Clone, PartialEq)]
pub struct LineupRules {
    requirements: Vec<(Slot, usize)>,
    flex_eligible: Vec<String>,
}

impl LineupRules {
    /// 1 QB, 2 RB, 2 WR, 1 TE, 1 FLEX (RB/WR/TE), 1 D/ST, 1 K.
    pub fn rffl() -> Self {
        LineupRules {
            requirements: vec![
                (Slot::Qb, 1),
                (Slot::Rb, 2),
                (Slot::Wr, 2),
                (Slot::Te, 1),
                (Slot::Flex, 1),
                (Slot::Dst, 1),
                (Slot::K, 1),
            ],
            flex_eligible: vec!["RB".into(), "WR".into(), "TE".into()],
        }
    }

    /// Build rules from the `[league.lineup]` config table.
    pub fn from_config(config: &LineupConfig) -> Result<Self, RulesError> {
        let mut requirements = Vec::with_capacity(config.slots.len());
        for req in &config.slots {
            let slot = Slot::from_label(&req.slot);
            if matches!(slot, Slot::Other(_)) || !slot.is_starter() {
                return Err(RulesError::NotAStarterSlot {
                    label: req.slot.clone(),
                });
            }
            if req.count == 0 {
                return Err(RulesError::ZeroCount {
                    label: req.slot.clone(),
                });
            }
            requirements.push((slot, req.count));
        }
        if config.flex_eligible.is_empty() {
            return Err(RulesError::EmptyFlexSet);
        }
        let flex_eligible = config
            .flex_eligible
            .iter()
            .map(|p| p.trim().to_uppercase())
            .collect();
        Ok(LineupRules {
            requirements,
            flex_eligible,
        })
    }

    pub fn requirements(&self) -> &[(Slot, usize)] {
        &self.requirements
    }

    /// How many of `slot` a lineup needs; zero for slots with no requirement.
    pub fn required(&self, slot: &Slot) -> usize {
        self.requirements
            .iter()
            .find(|(s, _)| s == slot)
            .map_or(0, |(_, n)| *n)
    }

    /// Total starters in a complete lineup.
    pub fn required_starters(&self) -> usize {
        self.requirements.iter().map(|(_, n)| n).sum()
    }

    /// The starter slots in output order, one entry per required player.
    pub fn starter_sequence(&self) -> Vec<Slot> {
        self.requirements
            .iter()
            .flat_map(|(slot, n)| std::iter::repeat(slot.clone()).take(*n))
            .collect()
    }

    /// Ordering rank for starters left over after the sequence is filled.
    /// Slots without a requirement rank after all of those with one.
    pub fn slot_rank(&self, slot: &Slot) -> usize {
        self.requirements
            .iter()
            .position(|(s, _)| s == slot)
            .unwrap_or(UNRANKED)
    }

    pub fn flex_eligible(&self) -> &[String] {
        &self.flex_eligible
    }

    /// Case-insensitive membership in the flex-eligible position set.
    pub fn is_flex_eligible(&self, position: Option<&str>) -> bool {
        position.is_some_and(|p| {
            let p = p.trim().to_uppercase();
            self.flex_eligible.iter().any(|e| *e == p)
        })
    }

    /// Position written on a placeholder row for `slot`: the slot's own
    /// label, except FLEX, which takes WR when eligible and otherwise the
    /// first eligible position.
    pub fn placeholder_position(&self, slot: &Slot) -> String {
        if *slot != Slot::Flex {
            return slot.label().to_string();
        }
        if self.is_flex_eligible(Some("WR")) {
            return "WR".to_string();
        }
        self.flex_eligible
            .first()
            .cloned()
            .unwrap_or_else(|| "WR".to_string())
    }
}

impl Default for LineupRules {
    fn default() -> Self {
        Self::rffl()
    }
}

const UNRANKED: usize = 99;
