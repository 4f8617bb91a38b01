// Team identity: alias-to-canonical code resolution and per-season metadata.
//
// League teams have been renamed and re-abbreviated over the years, so the
// abbreviation the upstream API reports for a season is mapped to a stable
// canonical team code before anything is exported.

use std::collections::HashMap;
use std::io::Read;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum TeamsError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse alias mapping {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: PathBuf, source: csv::Error },
}

// ---------------------------------------------------------------------------
// Alias mapping
// ---------------------------------------------------------------------------

/// One alias rule from the mapping file. A rule with no year bounds applies
/// to every season; open bounds extend indefinitely.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct AliasRule {
    pub alias: String,
    pub canonical: String,
    #[serde(default)]
    pub start_year: Option<i32>,
    #[serde(default)]
    pub end_year: Option<i32>,
}

impl AliasRule {
    fn covers(&self, year: i32) -> bool {
        self.start_year.map_or(true, |s| year >= s) && self.end_year.map_or(true, |e| year <= e)
    }

    fn is_unbounded(&self) -> bool {
        self.start_year.is_none() && self.end_year.is_none()
    }
}

#[derive(Debug, Deserialize)]
struct AliasFile {
    #[serde(default)]
    aliases: Vec<AliasRule>,
}

/// Rules grouped by alias, in file order.
#[derive(Debug, Clone, Default)]
pub struct AliasIndex {
    rules: HashMap<String, Vec<AliasRule>>,
}

impl AliasIndex {
    pub fn from_rules(rules: impl IntoIterator<Item = AliasRule>) -> Self {
        let mut index: HashMap<String, Vec<AliasRule>> = HashMap::new();
        for rule in rules {
            if rule.alias.is_empty() {
                continue;
            }
            index.entry(rule.alias.clone()).or_default().push(rule);
        }
        AliasIndex { rules: index }
    }

    /// Parse the TOML mapping text.
    pub fn parse(text: &str, path: &Path) -> Result<Self, TeamsError> {
        let file: AliasFile = toml::from_str(text).map_err(|e| TeamsError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(Self::from_rules(file.aliases))
    }

    /// Load the mapping file. A missing file yields an empty index so exports
    /// still run, with abbreviations passed through unchanged.
    pub fn load(path: &Path) -> Result<Self, TeamsError> {
        if !path.exists() {
            warn!(
                "alias mapping {} not found; team codes pass through unchanged",
                path.display()
            );
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path).map_err(|e| TeamsError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let index = Self::parse(&text, path)?;
        debug!("loaded {} team aliases from {}", index.len(), path.display());
        Ok(index)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Resolve an upstream abbreviation to its canonical team code.
    ///
    /// With a season year, the first rule whose range covers that year wins.
    /// Without one, the first unbounded rule wins. Either way the first rule
    /// for the alias is the fallback, and unknown aliases map to themselves.
    pub fn resolve(&self, abbrev: &str, year: Option<i32>) -> String {
        let Some(rules) = self.rules.get(abbrev) else {
            return abbrev.to_string();
        };
        let matched = match year {
            Some(y) => rules.iter().find(|r| r.covers(y)),
            None => rules.iter().find(|r| r.is_unbounded()),
        };
        matched
            .or_else(|| rules.first())
            .map(|r| r.canonical.clone())
            .unwrap_or_else(|| abbrev.to_string())
    }
}

// ---------------------------------------------------------------------------
// Canonical team metadata
// ---------------------------------------------------------------------------

/// Ownership details for one canonical team in one season.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TeamMeta {
    pub team_full_name: String,
    pub is_co_owned: String,
    pub owner_code_1: String,
    pub owner_code_2: String,
}

/// Raw canonical_teams.csv row. Older files use `owner_code` /
/// `co_owner_code` instead of the numbered columns.
#[derive(Debug, Deserialize)]
struct RawTeamMeta {
    #[serde(default)]
    season_year: String,
    #[serde(default)]
    team_code: String,
    #[serde(default)]
    team_full_name: String,
    #[serde(default)]
    is_co_owned: String,
    #[serde(default, alias = "owner_code")]
    owner_code_1: String,
    #[serde(default, alias = "co_owner_code")]
    owner_code_2: String,
}

/// Metadata keyed by `(season_year, team_code)`.
#[derive(Debug, Clone, Default)]
pub struct TeamDirectory {
    entries: HashMap<(i32, String), TeamMeta>,
}

impl TeamDirectory {
    pub fn from_reader<R: Read>(rdr: R) -> Result<Self, csv::Error> {
        let mut reader = csv::Reader::from_reader(rdr);
        let mut entries = HashMap::new();
        for result in reader.deserialize::<RawTeamMeta>() {
            let raw = match result {
                Ok(raw) => raw,
                Err(e) => {
                    warn!("skipping malformed canonical team row: {}", e);
                    continue;
                }
            };
            let Ok(year) = raw.season_year.trim().parse::<i32>() else {
                continue;
            };
            let code = raw.team_code.trim();
            if year == 0 || code.is_empty() {
                continue;
            }
            entries.insert(
                (year, code.to_string()),
                TeamMeta {
                    team_full_name: raw.team_full_name.trim().to_string(),
                    is_co_owned: raw.is_co_owned.trim().to_string(),
                    owner_code_1: raw.owner_code_1.trim().to_string(),
                    owner_code_2: raw.owner_code_2.trim().to_string(),
                },
            );
        }
        Ok(TeamDirectory { entries })
    }

    /// Load the metadata CSV; a missing file yields an empty directory.
    pub fn load(path: &Path) -> Result<Self, TeamsError> {
        if !path.exists() {
            warn!(
                "canonical team metadata {} not found; owner columns will be empty",
                path.display()
            );
            return Ok(Self::default());
        }
        let file = std::fs::File::open(path).map_err(|e| TeamsError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_reader(file).map_err(|e| TeamsError::Csv {
            path: path.to_path_buf(),
            source: e,
        })
    }

    pub fn get(&self, year: i32, team_code: &str) -> Option<&TeamMeta> {
        self.entries.get(&(year, team_code.to_string()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Abbreviation fallback
// ---------------------------------------------------------------------------

/// Derive an abbreviation for a team record that lacks one: the first two
/// letters of location and nickname, else `T<id>`.
pub fn fallback_abbrev(id: Option<i64>, location: Option<&str>, nickname: Option<&str>) -> String {
    match (location, nickname) {
        (Some(loc), Some(nick)) if !loc.is_empty() && !nick.is_empty() => {
            let head = |s: &str| s.chars().take(2).collect::<String>().to_uppercase();
            format!("{}{}", head(loc), head(nick))
        }
        _ => format!("T{}", id.map(|i| i.to_string()).unwrap_or_default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(alias: &str, canonical: &str, start: Option<i32>, end: Option<i32>) -> AliasRule {
        AliasRule {
            alias: alias.into(),
            canonical: canonical.into(),
            start_year: start,
            end_year: end,
        }
    }

    #[test]
    fn unknown_alias_passes_through() {
        let index = AliasIndex::default();
        assert_eq!(index.resolve("XYZ", Some(2020)), "XYZ");
    }

    #[test]
    fn year_range_selects_rule() {
        let index = AliasIndex::from_rules([
            rule("GV", "GVEN", Some(2011), Some(2015)),
            rule("GV", "GVRX", Some(2016), None),
        ]);
        assert_eq!(index.resolve("GV", Some(2012)), "GVEN");
        assert_eq!(index.resolve("GV", Some(2015)), "GVEN");
        assert_eq!(index.resolve("GV", Some(2016)), "GVRX");
        assert_eq!(index.resolve("GV", Some(2030)), "GVRX");
    }

    #[test]
    fn no_covering_rule_falls_back_to_first() {
        let index = AliasIndex::from_rules([
            rule("PK", "PKMC", Some(2015), Some(2016)),
            rule("PK", "PKRS", Some(2017), Some(2018)),
        ]);
        assert_eq!(index.resolve("PK", Some(2011)), "PKMC");
    }

    #[test]
    fn without_year_prefers_unbounded_rule() {
        let index = AliasIndex::from_rules([
            rule("WZ", "WZRD", Some(2011), Some(2013)),
            rule("WZ", "WIZ", None, None),
        ]);
        assert_eq!(index.resolve("WZ", None), "WIZ");

        let bounded_only = AliasIndex::from_rules([rule("WZ", "WZRD", Some(2011), Some(2013))]);
        assert_eq!(bounded_only.resolve("WZ", None), "WZRD");
    }

    #[test]
    fn parse_alias_toml() {
        let text = r#"
[[aliases]]
alias = "LBS"
canonical = "LBI"

[[aliases]]
alias = "MXLB"
canonical = "MXLB"
start_year = 2019
"#;
        let index = AliasIndex::parse(text, Path::new("aliases.toml")).unwrap();
        assert_eq!(index.len(), 2);
        assert_eq!(index.resolve("LBS", Some(2014)), "LBI");
    }

    #[test]
    fn missing_alias_file_is_empty() {
        let index = AliasIndex::load(Path::new("/nonexistent/rffl/aliases.toml")).unwrap();
        assert!(index.is_empty());
    }

    #[test]
    fn team_directory_reads_both_owner_column_styles() {
        let csv_text = "\
season_year,team_code,team_full_name,is_co_owned,owner_code_1,owner_code_2
2022,PKMC,Peacemakers,Yes,OWN1,OWN2
2022,,Missing Code,No,X,
abc,BAD,Bad Year,No,X,
";
        let dir = TeamDirectory::from_reader(csv_text.as_bytes()).unwrap();
        assert_eq!(dir.len(), 1);
        let meta = dir.get(2022, "PKMC").unwrap();
        assert_eq!(meta.is_co_owned, "Yes");
        assert_eq!(meta.owner_code_1, "OWN1");
        assert_eq!(meta.owner_code_2, "OWN2");

        let legacy = "\
season_year,team_code,is_co_owned,owner_code,co_owner_code
2013,GVEN,No,OWN9,
";
        let dir = TeamDirectory::from_reader(legacy.as_bytes()).unwrap();
        assert_eq!(dir.get(2013, "GVEN").unwrap().owner_code_1, "OWN9");
        assert!(dir.get(2014, "GVEN").is_none());
    }

    #[test]
    fn fallback_abbrev_rules() {
        assert_eq!(fallback_abbrev(Some(3), Some("gotham"), Some("knights")), "GOKN");
        assert_eq!(fallback_abbrev(Some(3), Some("gotham"), None), "T3");
        assert_eq!(fallback_abbrev(None, None, None), "T");
    }
}
