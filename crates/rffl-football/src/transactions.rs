// Transactions export: one row per player moved, with team ids resolved.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rffl_core::snapshot::{SeasonSnapshot, SnapshotTransaction, SnapshotTransactionItem};
use serde::Serialize;
use tracing::info;

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionRow {
    pub season_year: i32,
    pub bid_amount: Option<f64>,
    pub date: String,
    pub effective_date: Option<String>,
    pub id: Option<String>,
    pub is_pending: bool,
    pub rating: Option<i64>,
    pub status: Option<String>,
    #[serde(rename = "type")]
    pub txn_type: Option<String>,
    pub team_id: Option<i64>,
    pub team_code: Option<String>,
    pub member_id: Option<String>,
    pub player_id: Option<i64>,
    pub player_name: Option<String>,
    pub to_team_id: Option<i64>,
    pub to_team_code: Option<String>,
    pub from_team_id: Option<i64>,
    pub from_team_code: Option<String>,
}

/// Render epoch milliseconds as a UTC timestamp. Values chrono cannot
/// represent are rendered as the raw number.
pub fn format_epoch_ms(ms: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(ms)
        .map(|dt| dt.format(DATE_FORMAT).to_string())
        .unwrap_or_else(|| ms.to_string())
}

/// Zero and absent ids both mean "no team".
fn lookup(codes: &HashMap<i64, String>, id: Option<i64>) -> Option<String> {
    id.filter(|id| *id != 0).and_then(|id| codes.get(&id).cloned())
}

fn row(
    year: i32,
    txn: &SnapshotTransaction,
    item: Option<&SnapshotTransactionItem>,
    codes: &HashMap<i64, String>,
) -> TransactionRow {
    TransactionRow {
        season_year: year,
        bid_amount: txn.bid_amount,
        date: txn
            .date
            .filter(|d| *d != 0)
            .map(format_epoch_ms)
            .unwrap_or_default(),
        effective_date: txn.effective_date.filter(|d| *d != 0).map(format_epoch_ms),
        id: txn.id.clone(),
        is_pending: txn.is_pending,
        rating: txn.rating,
        status: txn.status.clone(),
        txn_type: txn.txn_type.clone(),
        team_id: txn.team_id,
        team_code: lookup(codes, txn.team_id),
        member_id: txn.member_id.clone(),
        player_id: item.and_then(|i| i.player_id),
        player_name: item.map(|i| i.player_name.clone().unwrap_or_default()),
        to_team_id: item.and_then(|i| i.to_team_id),
        to_team_code: lookup(codes, item.and_then(|i| i.to_team_id)),
        from_team_id: item.and_then(|i| i.from_team_id),
        from_team_code: lookup(codes, item.and_then(|i| i.from_team_id)),
    }
}

/// One row per transaction item. A transaction without items still gets a
/// single row with the player columns empty.
pub fn export_transactions(snapshot: &SeasonSnapshot) -> Vec<TransactionRow> {
    let codes = snapshot.team_codes();
    let year = snapshot.season_year;
    let mut rows = Vec::new();
    for txn in &snapshot.transactions {
        if txn.items.is_empty() {
            rows.push(row(year, txn, None, &codes));
        } else {
            rows.extend(txn.items.iter().map(|item| row(year, txn, Some(item), &codes)));
        }
    }
    info!(
        "exported {} transaction rows from {} transactions for {}",
        rows.len(),
        snapshot.transactions.len(),
        year
    );
    rows
}

pub fn default_transactions_path(year: i32) -> String {
    format!("transactions_{year}.csv")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn snapshot() -> SeasonSnapshot {
        serde_json::from_value(json!({
            "season_year": 2024,
            "teams": [
                { "id": 1, "abbrev": "GVRX" },
                { "id": 2, "location": "Pine", "nickname": "Kings" }
            ],
            "transactions": [
                { "id": "t-1", "type": "WAIVER", "status": "EXECUTED", "teamId": 1,
                  "date": 1725148800000i64, "bidAmount": 15,
                  "items": [
                    { "playerId": 10, "playerName": "Added Guy", "toTeamId": 1, "fromTeamId": 0 },
                    { "playerId": 11, "playerName": "Dropped Guy", "toTeamId": 0, "fromTeamId": 1 }
                  ] },
                { "id": 7, "type": "TRADE_PROPOSAL", "teamId": 2, "isPending": true }
            ]
        }))
        .unwrap()
    }

    #[test]
    fn formats_epoch_millis_in_utc() {
        assert_eq!(format_epoch_ms(0), "1970-01-01 00:00:00");
        assert_eq!(format_epoch_ms(1_725_148_800_000), "2024-09-01 00:00:00");
        assert_eq!(format_epoch_ms(i64::MAX), i64::MAX.to_string());
    }

    #[test]
    fn one_row_per_item() {
        let rows = export_transactions(&snapshot());
        assert_eq!(rows.len(), 3);

        let added = &rows[0];
        assert_eq!(added.date, "2024-09-01 00:00:00");
        assert_eq!(added.team_code.as_deref(), Some("GVRX"));
        assert_eq!(added.to_team_code.as_deref(), Some("GVRX"));
        assert_eq!(added.from_team_code, None);
        assert_eq!(added.bid_amount, Some(15.0));

        let dropped = &rows[1];
        assert_eq!(dropped.player_name.as_deref(), Some("Dropped Guy"));
        assert_eq!(dropped.from_team_code.as_deref(), Some("GVRX"));
        assert_eq!(dropped.to_team_code, None);
    }

    #[test]
    fn itemless_transaction_keeps_one_row() {
        let rows = export_transactions(&snapshot());
        let proposal = &rows[2];
        assert_eq!(proposal.id.as_deref(), Some("7"));
        assert!(proposal.is_pending);
        assert_eq!(proposal.team_code.as_deref(), Some("PIKI"));
        assert_eq!(proposal.player_name, None);
        assert_eq!(proposal.date, "");
        assert_eq!(proposal.effective_date, None);
    }
}
