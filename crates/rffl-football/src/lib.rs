// RFFL football engine: lineup normalization, validation, reconciliation,
// and the CSV exports built on them.

pub mod boxscore;
pub mod draft;
pub mod error;
pub mod export;
pub mod h2h;
pub mod history;
pub mod lineup;
pub mod reconcile;
pub mod report;
pub mod roster_changes;
pub mod rules;
pub mod slot;
pub mod transactions;
pub mod validate;
