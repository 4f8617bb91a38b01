// Command-line argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "rffl",
    version,
    about = "RFFL box-score exporter and lineup reconciliation",
    long_about = "Export season snapshots to validated box-score, head-to-head, draft,\n\
                  transaction and roster CSVs, derive roster changes from those exports,\n\
                  and audit exported box scores for lineup compliance and\n\
                  total/starter-sum consistency."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Directory holding config/ (and defaults/ for first-run setup).
    #[arg(long = "base-dir", value_name = "DIR", default_value = ".", global = true)]
    pub base_dir: PathBuf,

    /// Log at debug level (RUST_LOG still wins when set).
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Export validated per-player box scores for a season.
    Export(ExportArgs),

    /// Export head-to-head matchup results.
    H2h(H2hArgs),

    /// Export draft results.
    Draft(SnapshotArgs),

    /// Export league transactions.
    Transactions(SnapshotArgs),

    /// Export end-of-season rosters for pre-2019 seasons.
    HistoricalRosters(HistoricalRostersArgs),

    /// Compare each season's draft with its end-of-season rosters.
    RosterChanges(RosterChangesArgs),

    /// Track week-to-week roster adds and drops from box-score exports.
    WeeklyRosterChanges(WeeklyRosterChangesArgs),

    /// Check an exported box-score CSV: starter sums vs. team totals and
    /// starter counts.
    Validate(ValidateArgs),

    /// Check an exported box-score CSV for lineup compliance.
    ValidateLineup(ValidateLineupArgs),
}

#[derive(Args)]
pub struct SnapshotArgs {
    /// Season snapshot JSON.
    #[arg(long, value_name = "PATH")]
    pub snapshot: PathBuf,

    /// Output CSV (default depends on the command and season).
    #[arg(long, value_name = "PATH")]
    pub out: Option<PathBuf>,
}

#[derive(Args)]
pub struct WeekRange {
    /// First week to export.
    #[arg(long = "start-week", value_name = "WEEK")]
    pub start_week: Option<u32>,

    /// Last week to export.
    #[arg(long = "end-week", value_name = "WEEK")]
    pub end_week: Option<u32>,
}

#[derive(Args)]
pub struct ExportArgs {
    #[command(flatten)]
    pub io: SnapshotArgs,

    #[command(flatten)]
    pub weeks: WeekRange,

    /// Add zero-point placeholder rows for unfilled starter slots.
    #[arg(long = "fill-missing-slots")]
    pub fill_missing_slots: bool,

    /// Refuse to write an export that fails reconciliation.
    #[arg(long = "require-clean")]
    pub require_clean: bool,

    /// Allowed |starter sum - team total| for --require-clean.
    #[arg(long, value_name = "POINTS")]
    pub tolerance: Option<f64>,
}

#[derive(Args)]
pub struct H2hArgs {
    #[command(flatten)]
    pub io: SnapshotArgs,

    #[command(flatten)]
    pub weeks: WeekRange,
}

#[derive(Args)]
pub struct HistoricalRostersArgs {
    #[command(flatten)]
    pub io: SnapshotArgs,

    /// Week number to stamp on the rows (default 1).
    #[arg(long, value_name = "WEEK")]
    pub week: Option<u32>,
}

#[derive(Args)]
pub struct YearRange {
    /// First season to include.
    #[arg(long = "start-year", value_name = "YEAR")]
    pub start_year: Option<i32>,

    /// Last season to include.
    #[arg(long = "end-year", value_name = "YEAR")]
    pub end_year: Option<i32>,
}

#[derive(Args)]
pub struct RosterChangesArgs {
    /// Draft CSV from `draft` (repeat for more seasons).
    #[arg(long = "draft", value_name = "CSV", required = true)]
    pub drafts: Vec<PathBuf>,

    /// Roster CSV from `historical-rosters` (repeat for more seasons).
    #[arg(long = "rosters", value_name = "CSV", required = true)]
    pub rosters: Vec<PathBuf>,

    #[command(flatten)]
    pub years: YearRange,

    /// Output CSV (default: roster_changes_<years>.csv).
    #[arg(long, value_name = "PATH")]
    pub out: Option<PathBuf>,
}

#[derive(Args)]
pub struct WeeklyRosterChangesArgs {
    /// Box-score CSV from `export` (repeat for more seasons).
    #[arg(long = "boxscores", value_name = "CSV", required = true)]
    pub boxscores: Vec<PathBuf>,

    /// Draft CSV from `draft` (repeat for more seasons).
    #[arg(long = "draft", value_name = "CSV")]
    pub drafts: Vec<PathBuf>,

    #[command(flatten)]
    pub years: YearRange,

    /// Output CSV (default: weekly_roster_changes_<years>.csv).
    #[arg(long, value_name = "PATH")]
    pub out: Option<PathBuf>,
}

#[derive(Args)]
pub struct ValidateArgs {
    /// Exported box-score CSV.
    #[arg(value_name = "CSV")]
    pub csv: PathBuf,

    /// Allowed |starter sum - team total|.
    #[arg(long, value_name = "POINTS")]
    pub tolerance: Option<f64>,
}

#[derive(Args)]
pub struct ValidateLineupArgs {
    /// Exported box-score CSV.
    #[arg(value_name = "CSV")]
    pub csv: PathBuf,

    /// Report CSV (default: <CSV stem>_lineup_validation_report.csv).
    #[arg(long, value_name = "PATH")]
    pub out: Option<PathBuf>,
}
