// ESPN Fantasy Football numeric-id codecs.
//
// Legacy (2011-2018) league history responses carry numeric lineup slot,
// position, and pro team ids instead of labels.

// ---------------------------------------------------------------------------
// Lineup slot IDs (ESPN Fantasy API v3, football)
// ---------------------------------------------------------------------------

pub const ESPN_SLOT_QB: u16 = 0;
pub const ESPN_SLOT_TQB: u16 = 1;
pub const ESPN_SLOT_RB: u16 = 2;
pub const ESPN_SLOT_RB_WR: u16 = 3;
pub const ESPN_SLOT_WR: u16 = 4;
pub const ESPN_SLOT_WR_TE: u16 = 5;
pub const ESPN_SLOT_TE: u16 = 6;
pub const ESPN_SLOT_OP: u16 = 7; // offensive player (superflex)
pub const ESPN_SLOT_DT: u16 = 8;
pub const ESPN_SLOT_DE: u16 = 9;
pub const ESPN_SLOT_LB: u16 = 10;
pub const ESPN_SLOT_DL: u16 = 11;
pub const ESPN_SLOT_CB: u16 = 12;
pub const ESPN_SLOT_S: u16 = 13;
pub const ESPN_SLOT_DB: u16 = 14;
pub const ESPN_SLOT_DP: u16 = 15;
pub const ESPN_SLOT_DST: u16 = 16;
pub const ESPN_SLOT_K: u16 = 17;
pub const ESPN_SLOT_BENCH: u16 = 20;
pub const ESPN_SLOT_IR: u16 = 21;
pub const ESPN_SLOT_FLEX: u16 = 23;

/// Label returned for ids the codecs do not know.
pub const UNKNOWN: &str = "Unknown";

/// Map a lineup slot id to its slot label.
pub fn lineup_slot_label(slot_id: u16) -> &'static str {
    match slot_id {
        ESPN_SLOT_QB => "QB",
        ESPN_SLOT_TQB => "TQB",
        ESPN_SLOT_RB => "RB",
        ESPN_SLOT_RB_WR => "RB/WR",
        ESPN_SLOT_WR => "WR",
        ESPN_SLOT_WR_TE => "WR/TE",
        ESPN_SLOT_TE => "TE",
        ESPN_SLOT_OP => "OP",
        ESPN_SLOT_DT => "DT",
        ESPN_SLOT_DE => "DE",
        ESPN_SLOT_LB => "LB",
        ESPN_SLOT_DL => "DL",
        ESPN_SLOT_CB => "CB",
        ESPN_SLOT_S => "S",
        ESPN_SLOT_DB => "DB",
        ESPN_SLOT_DP => "DP",
        ESPN_SLOT_DST => "D/ST",
        ESPN_SLOT_K => "K",
        ESPN_SLOT_BENCH => "Bench",
        ESPN_SLOT_IR => "IR",
        ESPN_SLOT_FLEX => "FLEX",
        _ => UNKNOWN,
    }
}

/// Whether a lineup slot id is an active (scoring) slot rather than bench/IR.
pub fn is_active_slot(slot_id: u16) -> bool {
    !matches!(slot_id, ESPN_SLOT_BENCH | ESPN_SLOT_IR)
}

/// Map a default position id to its position label.
pub fn position_label(position_id: u16) -> &'static str {
    match position_id {
        1 => "QB",
        2 => "RB",
        3 => "WR",
        4 => "TE",
        5 => "K",
        16 => "D/ST",
        _ => UNKNOWN,
    }
}

/// Map a pro team id to the NFL team abbreviation.
pub fn pro_team_abbrev(team_id: u16) -> &'static str {
    match team_id {
        1 => "ATL",
        2 => "BUF",
        3 => "CHI",
        4 => "CIN",
        5 => "CLE",
        6 => "DAL",
        7 => "DEN",
        8 => "DET",
        9 => "GB",
        10 => "TEN",
        11 => "IND",
        12 => "KC",
        13 => "LV",
        14 => "LAR",
        15 => "MIA",
        16 => "MIN",
        17 => "NE",
        18 => "NO",
        19 => "NYG",
        20 => "NYJ",
        21 => "PHI",
        22 => "ARI",
        23 => "PIT",
        24 => "LAC",
        25 => "SF",
        26 => "SEA",
        27 => "TB",
        28 => "WAS",
        29 => "CAR",
        30 => "JAX",
        33 => "BAL",
        34 => "HOU",
        _ => UNKNOWN,
    }
}
