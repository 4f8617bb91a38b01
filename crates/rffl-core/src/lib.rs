// Shared infrastructure for the RFFL exporter: configuration, team identity,
// ESPN id codecs, and the season snapshot input model.

pub mod config;
pub mod espn;
pub mod snapshot;
pub mod teams;
