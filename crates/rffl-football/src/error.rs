// Errors shared by the exporters and report passes.

use std::path::PathBuf;

use thiserror::Error;

use crate::reconcile::ReconcileError;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: PathBuf, source: csv::Error },

    #[error("export not clean: proj={proj}, act={act}, bad_count={count}")]
    NotClean {
        proj: usize,
        act: usize,
        count: usize,
    },

    #[error("historical roster export only covers seasons before 2019, got {year}")]
    UnsupportedSeason { year: i32 },

    #[error("no roster data found for {year}")]
    NoRosterData { year: i32 },

    #[error(transparent)]
    Reconcile(#[from] ReconcileError),
}
