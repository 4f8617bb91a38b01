// Subcommand implementations: load inputs, call the engine, write CSVs.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rffl_core::config::{self, Config};
use rffl_core::snapshot::SeasonSnapshot;
use rffl_core::teams::{AliasIndex, TeamDirectory};
use rffl_football::boxscore::{read_boxscores, read_rows, sidecar_path, write_rows, BoxscoreRow};
use rffl_football::draft::DraftRow;
use rffl_football::error::ExportError;
use rffl_football::export::{self, ExportOptions, TeamContext, FIRST_WEEK, LAST_WEEK};
use rffl_football::reconcile::reconcile;
use rffl_football::report::validate_lineups;
use rffl_football::rules::LineupRules;
use rffl_football::history::RosterRow;
use rffl_football::roster_changes::{self, season_roster_changes, weekly_roster_changes};
use rffl_football::{draft, h2h, history, transactions};
use tracing::info;

use crate::cli::{
    ExportArgs, H2hArgs, HistoricalRostersArgs, RosterChangesArgs, SnapshotArgs, ValidateArgs, ValidateLineupArgs,
    WeekRange, WeeklyRosterChangesArgs, YearRange,
};

/// How many lineup issues `validate-lineup` echoes to the terminal.
const ISSUE_PREVIEW: usize = 5;

/// Configuration and lineup rules shared by every subcommand.
pub struct Session {
    pub config: Config,
    pub rules: LineupRules,
}

impl Session {
    pub fn load(base_dir: &Path) -> Result<Self> {
        let config = config::load_config(base_dir).context("failed to load configuration")?;
        let rules = LineupRules::from_config(&config.league.lineup).context("invalid lineup rules")?;
        info!(
            "config loaded: league={}, {} starters per lineup",
            config.league.name,
            rules.required_starters()
        );
        Ok(Session { config, rules })
    }

    fn load_teams(&self) -> Result<(AliasIndex, TeamDirectory)> {
        let aliases = AliasIndex::load(&self.config.alias_mapping_path()).context("failed to load team aliases")?;
        let directory =
            TeamDirectory::load(&self.config.canonical_teams_path()).context("failed to load canonical teams")?;
        Ok((aliases, directory))
    }
}

fn load_snapshot(path: &Path) -> Result<SeasonSnapshot> {
    SeasonSnapshot::load(path).with_context(|| format!("failed to load snapshot {}", path.display()))
}

fn output_path(out: &Option<PathBuf>, default: String) -> PathBuf {
    out.clone().unwrap_or_else(|| PathBuf::from(default))
}

/// A `--tolerance` flag overrides config but must pass the same check.
fn checked_tolerance(flag: Option<f64>, configured: f64) -> Result<f64> {
    let tol = flag.unwrap_or(configured);
    anyhow::ensure!(tol.is_finite() && tol >= 0.0, "tolerance must be a finite value >= 0, got {tol}");
    Ok(tol)
}

fn week_bounds(weeks: &WeekRange) -> (u32, u32) {
    (
        weeks.start_week.unwrap_or(FIRST_WEEK),
        weeks.end_week.unwrap_or(LAST_WEEK),
    )
}

// ---------------------------------------------------------------------------
// Exports
// ---------------------------------------------------------------------------

pub fn run_export(session: &Session, args: &ExportArgs) -> Result<PathBuf> {
    let snapshot = load_snapshot(&args.io.snapshot)?;
    let (aliases, directory) = session.load_teams()?;
    let (start_week, end_week) = week_bounds(&args.weeks);
    let defaults = &session.config.export;
    let options = ExportOptions {
        start_week,
        end_week,
        fill_missing_slots: args.fill_missing_slots || defaults.fill_missing_slots,
        require_clean: args.require_clean || defaults.require_clean,
        tolerance: checked_tolerance(args.tolerance, defaults.tolerance)?,
    };
    let teams = TeamContext {
        aliases: &aliases,
        directory: &directory,
    };

    let rows = export::export_boxscores(&snapshot, &session.rules, teams, &options)
        .context("box-score export failed")?;
    let out = output_path(&args.io.out, export::default_boxscores_path(snapshot.season_year));
    write_rows(&out, &rows)?;
    Ok(out)
}

pub fn run_h2h(args: &H2hArgs) -> Result<PathBuf> {
    let snapshot = load_snapshot(&args.io.snapshot)?;
    let (start_week, end_week) = week_bounds(&args.weeks);
    let rows = h2h::export_h2h(&snapshot, start_week, end_week);
    let out = output_path(&args.io.out, h2h::default_h2h_path(snapshot.season_year));
    write_rows(&out, &rows)?;
    Ok(out)
}

pub fn run_draft(args: &SnapshotArgs) -> Result<PathBuf> {
    let snapshot = load_snapshot(&args.snapshot)?;
    let rows = draft::export_draft(&snapshot);
    let out = output_path(&args.out, draft::default_draft_path(snapshot.season_year));
    write_rows(&out, &rows)?;
    Ok(out)
}

pub fn run_transactions(args: &SnapshotArgs) -> Result<PathBuf> {
    let snapshot = load_snapshot(&args.snapshot)?;
    let rows = transactions::export_transactions(&snapshot);
    let out = output_path(&args.out, transactions::default_transactions_path(snapshot.season_year));
    write_rows(&out, &rows)?;
    Ok(out)
}

pub fn run_historical_rosters(session: &Session, args: &HistoricalRostersArgs) -> Result<PathBuf> {
    let snapshot = load_snapshot(&args.io.snapshot)?;
    let (aliases, _) = session.load_teams()?;
    let rows = history::export_historical_rosters(&snapshot, &aliases, args.week)
        .context("historical roster export failed")?;
    let out = output_path(&args.io.out, history::default_rosters_path(snapshot.season_year));
    write_rows(&out, &rows)?;
    Ok(out)
}

// ---------------------------------------------------------------------------
// Roster changes
// ---------------------------------------------------------------------------

/// Read every CSV in order and keep the rows whose season is in range.
fn read_each<T>(
    paths: &[PathBuf],
    years: &YearRange,
    season: impl Fn(&T) -> i32,
    read: impl Fn(&Path) -> Result<Vec<T>, ExportError>,
) -> Result<Vec<T>> {
    let mut rows = Vec::new();
    for path in paths {
        let batch = read(path).with_context(|| format!("failed to read {}", path.display()))?;
        rows.extend(batch.into_iter().filter(|row| {
            let year = season(row);
            years.start_year.map_or(true, |start| year >= start) && years.end_year.map_or(true, |end| year <= end)
        }));
    }
    Ok(rows)
}

pub fn run_roster_changes(session: &Session, args: &RosterChangesArgs) -> Result<PathBuf> {
    let draft = read_each(&args.drafts, &args.years, |r: &DraftRow| r.year, read_rows::<DraftRow>)?;
    let rosters = read_each(&args.rosters, &args.years, |r: &RosterRow| r.season_year, read_rows::<RosterRow>)?;
    let (aliases, _) = session.load_teams()?;

    let rows = season_roster_changes(&draft, &rosters, &aliases);
    let default = roster_changes::default_roster_changes_path(rosters.iter().map(|r| r.season_year));
    let out = output_path(&args.out, default);
    write_rows(&out, &rows)?;
    Ok(out)
}

pub fn run_weekly_roster_changes(session: &Session, args: &WeeklyRosterChangesArgs) -> Result<PathBuf> {
    let boxscores = read_each(&args.boxscores, &args.years, |r: &BoxscoreRow| r.season_year, read_boxscores)?;
    let draft = read_each(&args.drafts, &args.years, |r: &DraftRow| r.year, read_rows::<DraftRow>)?;
    let (aliases, _) = session.load_teams()?;

    let rows = weekly_roster_changes(&boxscores, &draft, &aliases);
    let default = roster_changes::default_weekly_roster_changes_path(boxscores.iter().map(|r| r.season_year));
    let out = output_path(&args.out, default);
    write_rows(&out, &rows)?;
    Ok(out)
}

// ---------------------------------------------------------------------------
// Audits
// ---------------------------------------------------------------------------

/// Reconcile an export and print the counts. Findings are reported, not
/// treated as failures.
pub fn run_validate(session: &Session, args: &ValidateArgs) -> Result<()> {
    let rows = read_boxscores(&args.csv)?;
    let tolerance = checked_tolerance(args.tolerance, session.config.export.tolerance)?;
    let required = session.rules.required_starters();
    let summary = reconcile(&rows, tolerance, required).context("reconciliation failed")?;

    println!("Team-weeks: {}", summary.team_weeks_checked);
    println!("proj mismatches > {tolerance}: {}", summary.bad_projections);
    println!("actual mismatches > {tolerance}: {}", summary.bad_actuals);
    println!("starter_count != {required}: {}", summary.bad_counts);

    if summary.is_clean() {
        println!("clean");
    } else {
        let out = sidecar_path(&args.csv, "validation_report");
        write_rows(&out, &summary.details)?;
        println!("wrote detail: {}", out.display());
    }
    Ok(())
}

pub fn run_validate_lineup(session: &Session, args: &ValidateLineupArgs) -> Result<()> {
    let rows = read_boxscores(&args.csv)?;
    let report = validate_lineups(&rows, &session.rules);

    println!("{} Lineup Validation Report", session.config.league.name);
    println!("{}", "=".repeat(50));
    println!("Total lineups checked: {}", report.total_lineups);
    println!("Valid lineups: {}", report.valid_lineups);
    println!("Invalid lineups: {}", report.invalid_lineups());
    println!("Total issues found: {}", report.records.len());

    if report.records.is_empty() {
        println!("\nAll lineups are compliant.");
        return Ok(());
    }

    println!("\nIssues by type:");
    for (issue_type, count) in report.issues_by_type() {
        println!("  {issue_type}: {count}");
    }

    let out = args
        .out
        .clone()
        .unwrap_or_else(|| sidecar_path(&args.csv, "lineup_validation_report"));
    write_rows(&out, &report.records)?;
    println!("\nDetailed report written to: {}", out.display());

    println!("\nFirst {ISSUE_PREVIEW} issues:");
    for (i, rec) in report.records.iter().take(ISSUE_PREVIEW).enumerate() {
        println!(
            "  {}. Week {} Matchup {} {}: {}",
            i + 1,
            rec.week,
            rec.matchup,
            rec.team_code,
            rec.description
        );
    }
    Ok(())
}
