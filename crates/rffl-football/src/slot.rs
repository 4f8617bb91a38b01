// Canonical lineup slots and raw-label normalization.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A canonical roster slot.
///
/// Upstream sources label slots inconsistently across seasons ("RB/WR/TE" vs
/// "FLEX", "DST" vs "D/ST", "BE" vs "Bench"); every raw label pair is folded
/// into one of these. Labels that match nothing known are kept upper-cased in
/// `Other` so the export still shows what the source said.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum Slot {
    Qb,
    Rb,
    Wr,
    Te,
    Flex,
    Dst,
    K,
    Bench,
    Ir,
    Other(String),
}

/// Whether a row counts toward the team's scoring total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotType {
    Starters,
    Bench,
}

impl SlotType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SlotType::Starters => "starters",
            SlotType::Bench => "bench",
        }
    }
}

/// Legacy combined label for the FLEX slot. Never produced by
/// `normalize_slot` from a slot label, but a bare position label can still
/// carry it through the fallback rule.
const LEGACY_FLEX_LABEL: &str = "RB/WR/TE";

impl Slot {
    /// Parse a canonical slot label as written in an export. Matching is
    /// case-insensitive; unrecognized labels are preserved verbatim.
    pub fn from_label(label: &str) -> Self {
        match label.to_uppercase().as_str() {
            "QB" => Slot::Qb,
            "RB" => Slot::Rb,
            "WR" => Slot::Wr,
            "TE" => Slot::Te,
            "FLEX" => Slot::Flex,
            "D/ST" => Slot::Dst,
            "K" => Slot::K,
            "BENCH" => Slot::Bench,
            "IR" => Slot::Ir,
            _ => Slot::Other(label.to_string()),
        }
    }

    /// The slot's label in the export vocabulary.
    pub fn label(&self) -> &str {
        match self {
            Slot::Qb => "QB",
            Slot::Rb => "RB",
            Slot::Wr => "WR",
            Slot::Te => "TE",
            Slot::Flex => "FLEX",
            Slot::Dst => "D/ST",
            Slot::K => "K",
            Slot::Bench => "Bench",
            Slot::Ir => "IR",
            Slot::Other(label) => label,
        }
    }

    /// Whether a player in this slot is in the starting lineup.
    ///
    /// Bench, IR, and unrecognized slots are never starters. The legacy
    /// "RB/WR/TE" label still counts, for rows that reached here without
    /// going through `normalize_slot`'s slot-label rules.
    pub fn is_starter(&self) -> bool {
        match self {
            Slot::Qb | Slot::Rb | Slot::Wr | Slot::Te | Slot::Flex | Slot::Dst | Slot::K => true,
            Slot::Bench | Slot::Ir => false,
            Slot::Other(label) => label.eq_ignore_ascii_case(LEGACY_FLEX_LABEL),
        }
    }

    pub fn slot_type(&self) -> SlotType {
        if self.is_starter() {
            SlotType::Starters
        } else {
            SlotType::Bench
        }
    }

    /// Map a position label to the slot of the same name, for the five
    /// positions whose slot shares their label.
    fn for_position(label: &str) -> Option<Slot> {
        match label {
            "QB" => Some(Slot::Qb),
            "RB" => Some(Slot::Rb),
            "WR" => Some(Slot::Wr),
            "TE" => Some(Slot::Te),
            "K" => Some(Slot::K),
            _ => None,
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<Slot> for String {
    fn from(slot: Slot) -> Self {
        match slot {
            Slot::Other(label) => label,
            known => known.label().to_string(),
        }
    }
}

impl From<String> for Slot {
    fn from(label: String) -> Self {
        Slot::from_label(&label)
    }
}

/// Fold a raw (slot label, position label) pair into a canonical slot.
///
/// Rules are tried in order and the first match wins:
///
/// 1. slot `RB/WR/TE` or `FLEX` -> FLEX
/// 2. slot `DST`, `D/ST`, or `DEFENSE` -> D/ST
/// 3. slot `BE` or `BENCH` -> Bench
/// 4. slot `IR` -> IR
/// 5. slot `QB`, `RB`, `WR`, `TE`, `K` -> that slot
/// 6. position `QB`, `RB`, `WR`, `TE`, `K` -> that slot
/// 7. position `D/ST` or `DST` -> D/ST
/// 8. the slot label if non-empty, else the position label if non-empty,
///    else Bench
///
/// Comparisons are case-insensitive and absent labels are empty. The
/// function is total: every input pair yields a slot.
pub fn normalize_slot(raw_slot: Option<&str>, raw_position: Option<&str>) -> Slot {
    let slot = raw_slot.unwrap_or_default().to_uppercase();
    let pos = raw_position.unwrap_or_default().to_uppercase();

    match slot.as_str() {
        "RB/WR/TE" | "FLEX" => return Slot::Flex,
        "DST" | "D/ST" | "DEFENSE" => return Slot::Dst,
        "BE" | "BENCH" => return Slot::Bench,
        "IR" => return Slot::Ir,
        _ => {}
    }
    if let Some(s) = Slot::for_position(&slot) {
        return s;
    }
    if let Some(s) = Slot::for_position(&pos) {
        return s;
    }
    if matches!(pos.as_str(), "D/ST" | "DST") {
        return Slot::Dst;
    }

    if !slot.is_empty() {
        Slot::from_label(&slot)
    } else if !pos.is_empty() {
        Slot::from_label(&pos)
    } else {
        Slot::Bench
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_label_rules() {
        assert_eq!(normalize_slot(Some("QB"), None), Slot::Qb);
        assert_eq!(normalize_slot(Some("rb/wr/te"), None), Slot::Flex);
        assert_eq!(normalize_slot(Some("Flex"), Some("QB")), Slot::Flex);
        assert_eq!(normalize_slot(Some("dst"), None), Slot::Dst);
        assert_eq!(normalize_slot(Some("Defense"), None), Slot::Dst);
        assert_eq!(normalize_slot(Some("be"), Some("RB")), Slot::Bench);
        assert_eq!(normalize_slot(Some("BENCH"), None), Slot::Bench);
        assert_eq!(normalize_slot(Some("ir"), Some("WR")), Slot::Ir);
        assert_eq!(normalize_slot(Some("k"), Some("QB")), Slot::K);
    }

    #[test]
    fn position_rules_apply_when_slot_is_unrecognized() {
        assert_eq!(normalize_slot(None, Some("WR")), Slot::Wr);
        assert_eq!(normalize_slot(Some(""), Some("te")), Slot::Te);
        assert_eq!(normalize_slot(None, Some("D/ST")), Slot::Dst);
        assert_eq!(normalize_slot(None, Some("dst")), Slot::Dst);
        // Slot rules outrank position rules.
        assert_eq!(normalize_slot(Some("RB"), Some("WR")), Slot::Rb);
        // An unrecognized slot label still defers to a known position.
        assert_eq!(normalize_slot(Some("OP"), Some("QB")), Slot::Qb);
    }

    #[test]
    fn fallback_keeps_unrecognized_labels() {
        assert_eq!(normalize_slot(Some("op"), Some("LB")), Slot::Other("OP".into()));
        assert_eq!(normalize_slot(None, Some("lb")), Slot::Other("LB".into()));
        assert_eq!(normalize_slot(None, None), Slot::Bench);
        assert_eq!(normalize_slot(Some(""), Some("")), Slot::Bench);
    }

    #[test]
    fn normalization_is_total() {
        let labels = [
            None,
            Some(""),
            Some("QB"),
            Some("rb/wr/te"),
            Some("D/ST"),
            Some("be"),
            Some("IR"),
            Some("TQB"),
            Some("???"),
            Some("  "),
        ];
        for slot in labels {
            for pos in labels {
                let normalized = normalize_slot(slot, pos);
                assert!(!normalized.label().is_empty());
            }
        }
    }

    #[test]
    fn starter_membership() {
        for slot in [Slot::Qb, Slot::Rb, Slot::Wr, Slot::Te, Slot::Flex, Slot::Dst, Slot::K] {
            assert!(slot.is_starter(), "{slot} should start");
            assert_eq!(slot.slot_type(), SlotType::Starters);
        }
        assert!(!Slot::Bench.is_starter());
        assert!(!Slot::Ir.is_starter());
        assert!(!Slot::Other("OP".into()).is_starter());
        assert!(Slot::Other("RB/WR/TE".into()).is_starter());
        assert_eq!(Slot::Ir.slot_type(), SlotType::Bench);
    }

    #[test]
    fn legacy_flex_position_label_still_starts() {
        let slot = normalize_slot(None, Some("rb/wr/te"));
        assert_eq!(slot, Slot::Other("RB/WR/TE".into()));
        assert!(slot.is_starter());
    }

    #[test]
    fn labels_round_trip_through_strings() {
        for label in ["QB", "FLEX", "D/ST", "Bench", "IR", "TQB"] {
            assert_eq!(String::from(Slot::from(label.to_string())), label);
        }
        assert_eq!(Slot::from_label("bench"), Slot::Bench);
        assert_eq!(Slot::from_label("d/st"), Slot::Dst);
    }
}
