//! Compile options. Loaded from JSON and overridden by command line flags.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::OnceLock;

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read options file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed options file: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unknown simulator \"{0}\"")]
    UnknownSimulator(String),
    #[error("unknown navigation object type \"{0}\"")]
    UnknownObjectType(String),
    #[error("invalid path filter \"{pattern}\": {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

// ── SimulatorType ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SimulatorType {
    #[default]
    Fsx,
    FsxSe,
    P3dV3,
    P3dV4,
    P3dV5,
    Msfs,
    Msfs2024,
    Xplane11,
    Xplane12,
}

impl SimulatorType {
    pub fn is_xplane(self) -> bool {
        matches!(self, Self::Xplane11 | Self::Xplane12)
    }

    pub fn is_msfs(self) -> bool {
        matches!(self, Self::Msfs | Self::Msfs2024)
    }

    /// Prepar3D versions that know `add-on.xml` packages.
    pub fn reads_addon_packages(self) -> bool {
        matches!(self, Self::P3dV3 | Self::P3dV4)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Fsx      => "FSX",
            Self::FsxSe    => "FSXSE",
            Self::P3dV3    => "P3DV3",
            Self::P3dV4    => "P3DV4",
            Self::P3dV5    => "P3DV5",
            Self::Msfs     => "MSFS",
            Self::Msfs2024 => "MSFS2024",
            Self::Xplane11 => "XP11",
            Self::Xplane12 => "XP12",
        }
    }
}

impl FromStr for SimulatorType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_uppercase().replace(['-', '_'], "").as_str() {
            "FSX"                  => Self::Fsx,
            "FSXSE"                => Self::FsxSe,
            "P3DV3"                => Self::P3dV3,
            "P3DV4"                => Self::P3dV4,
            "P3DV5"                => Self::P3dV5,
            "MSFS" | "MSFS2020"    => Self::Msfs,
            "MSFS2024"             => Self::Msfs2024,
            "XP11" | "XPLANE11"    => Self::Xplane11,
            "XP12" | "XPLANE12"    => Self::Xplane12,
            _ => return Err(ConfigError::UnknownSimulator(s.to_string())),
        })
    }
}

// ── NavDbObjectType ───────────────────────────────────────────────────────────

/// Object kinds that can be switched off individually.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NavDbObjectType {
    Airport,
    Runway,
    Parking,
    Com,
    Start,
    Helipad,
    Approach,
    Vor,
    Ndb,
    Ils,
    Marker,
    Waypoint,
    Airway,
    Boundary,
    Mora,
    AirportMsa,
}

impl FromStr for NavDbObjectType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_value(serde_json::Value::String(s.trim().to_ascii_uppercase()))
            .map_err(|_| ConfigError::UnknownObjectType(s.to_string()))
    }
}

// ── PathFilter ────────────────────────────────────────────────────────────────

/// Wildcard include/exclude filter for scenery and file paths.
///
/// `*` matches any sequence, `?` a single character. Matching is case
/// insensitive and uses forward slashes.
#[derive(Debug, Clone, Default)]
pub struct PathFilter {
    include: Vec<Regex>,
    exclude: Vec<Regex>,
}

impl PathFilter {
    pub fn new(include: &[String], exclude: &[String]) -> Result<Self, ConfigError> {
        Ok(Self {
            include: include.iter().map(|p| wildcard_regex(p)).collect::<Result<_, _>>()?,
            exclude: exclude.iter().map(|p| wildcard_regex(p)).collect::<Result<_, _>>()?,
        })
    }

    pub fn matches(&self, path: &str) -> bool {
        let path = path.replace('\\', "/");
        let included = self.include.is_empty() || self.include.iter().any(|r| r.is_match(&path));
        included && !self.exclude.iter().any(|r| r.is_match(&path))
    }
}

fn wildcard_regex(pattern: &str) -> Result<Regex, ConfigError> {
    let escaped = regex::escape(&pattern.replace('\\', "/"))
        .replace(r"\*", ".*")
        .replace(r"\?", ".");
    RegexBuilder::new(&format!("^{escaped}$"))
        .case_insensitive(true)
        .build()
        .map_err(|source| ConfigError::InvalidPattern { pattern: pattern.to_string(), source })
}

// ── NavDatabaseOptions ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NavDatabaseOptions {
    pub simulator: SimulatorType,
    /// Simulator installation or X-Plane root directory.
    pub base_path: PathBuf,
    /// `scenery.cfg` for FSX/P3D. Not used for X-Plane.
    pub scenery_file: Option<PathBuf>,
    /// Directories scanned for P3D `add-on.xml` packages.
    pub addon_directories: Vec<PathBuf>,
    pub excluded_objects: HashSet<NavDbObjectType>,

    pub verbose: bool,
    pub read_inactive: bool,
    pub read_addon_xml: bool,
    pub resolve_airways: bool,
    pub deduplicate: bool,
    pub create_route_tables: bool,
    /// Write records that miss a mandatory part, like an ILS without localizer.
    pub write_incomplete: bool,
    pub database_report: bool,
    pub autocommit: bool,

    pub include_paths: Vec<String>,
    pub exclude_paths: Vec<String>,

    #[serde(skip)]
    filter: OnceLock<PathFilter>,
}

impl Default for NavDatabaseOptions {
    fn default() -> Self {
        Self {
            simulator: SimulatorType::default(),
            base_path: PathBuf::new(),
            scenery_file: None,
            addon_directories: Vec::new(),
            excluded_objects: HashSet::new(),
            verbose: false,
            read_inactive: false,
            read_addon_xml: true,
            resolve_airways: true,
            deduplicate: true,
            create_route_tables: false,
            write_incomplete: false,
            database_report: false,
            autocommit: false,
            include_paths: Vec::new(),
            exclude_paths: Vec::new(),
            filter: OnceLock::new(),
        }
    }
}

impl NavDatabaseOptions {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let options: Self = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
        Self::from_json_str(&json)
    }

    /// Compile the path filters once so that pattern errors surface early.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let filter = PathFilter::new(&self.include_paths, &self.exclude_paths)?;
        let _ = self.filter.set(filter);
        Ok(())
    }

    pub fn is_included(&self, object: NavDbObjectType) -> bool {
        !self.excluded_objects.contains(&object)
    }

    pub fn exclude(&mut self, object: NavDbObjectType) {
        self.excluded_objects.insert(object);
    }

    /// Path filter check for a scenery area local path or a file path.
    ///
    /// Patterns that fail to compile were already reported by [`Self::validate`]
    /// and are ignored here.
    pub fn is_included_path(&self, path: &str) -> bool {
        self.filter
            .get_or_init(|| {
                PathFilter::new(&self.include_paths, &self.exclude_paths).unwrap_or_else(|err| {
                    tracing::warn!("ignoring path filters: {err}");
                    PathFilter::default()
                })
            })
            .matches(path)
    }

    pub fn set_path_filters(&mut self, include: Vec<String>, exclude: Vec<String>) -> Result<(), ConfigError> {
        self.include_paths = include;
        self.exclude_paths = exclude;
        self.filter = OnceLock::new();
        self.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_do_not_write_incomplete_records() {
        let options = NavDatabaseOptions::default();
        assert!(!options.write_incomplete);
        assert!(options.resolve_airways);
        assert!(options.deduplicate);
        assert!(!options.create_route_tables);
        assert!(options.is_included(NavDbObjectType::Ils));
    }

    #[test]
    fn json_overrides_selected_fields_only() {
        let options = NavDatabaseOptions::from_json_str(
            r#"{"simulator": "P3D_V4", "write_incomplete": true, "excluded_objects": ["BOUNDARY"]}"#,
        )
        .unwrap();
        assert_eq!(options.simulator, SimulatorType::P3dV4);
        assert!(options.write_incomplete);
        assert!(options.deduplicate);
        assert!(!options.is_included(NavDbObjectType::Boundary));
        assert!(options.is_included(NavDbObjectType::Airport));
    }

    #[test]
    fn simulator_names_parse() {
        assert_eq!("msfs2024".parse::<SimulatorType>().unwrap(), SimulatorType::Msfs2024);
        assert_eq!("P3D-V5".parse::<SimulatorType>().unwrap(), SimulatorType::P3dV5);
        assert_eq!("xp12".parse::<SimulatorType>().unwrap(), SimulatorType::Xplane12);
        assert!("FS2002".parse::<SimulatorType>().is_err());
        assert_eq!("airport_msa".parse::<NavDbObjectType>().unwrap(), NavDbObjectType::AirportMsa);
    }

    #[test]
    fn path_filter_wildcards() {
        let mut options = NavDatabaseOptions::default();
        options
            .set_path_filters(vec!["*scenery*".into()], vec!["*/world/*".into()])
            .unwrap();
        assert!(options.is_included_path(r"C:\FSX\Addon Scenery\KSEA"));
        assert!(!options.is_included_path("C:/FSX/Scenery/World/scenery"));
        assert!(!options.is_included_path("D:/Other/KSEA"));
    }

    #[test]
    fn empty_filter_includes_everything() {
        let options = NavDatabaseOptions::default();
        assert!(options.is_included_path("anything/at/all.bgl"));
    }
}
