//! Shared definitions used by the BGL reader and the navigation database
//! compiler: simulator selection, compile options, scenery areas and the
//! error collection handed back to callers after a compile run.

mod errors;
mod options;

pub use errors::{FileError, NavDatabaseErrors, SceneryErrors};
pub use options::{ConfigError, NavDatabaseOptions, NavDbObjectType, PathFilter, SimulatorType};

use serde::{Deserialize, Serialize};

// ── SceneryArea ───────────────────────────────────────────────────────────────

/// One entry of the simulator scenery library.
///
/// Areas are visited in ascending layer order. Higher layers shadow lower ones
/// at query time; parsing itself does not care about overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneryArea {
    pub area_number: i32,
    pub layer: i32,
    pub title: String,
    pub local_path: String,
    pub remote_path: String,
    pub active: bool,
    pub required: bool,

    // ── MSFS package flavours ─────────────────────────────────────────────────
    /// Navigraph navdata package: only procedures and dummy airports.
    pub msfs_navigraph_navdata: bool,
    /// Any navdata-only package.
    pub navdata: bool,
    pub addon: bool,
}

impl SceneryArea {
    pub fn new(area_number: i32, layer: i32, title: impl Into<String>, local_path: impl Into<String>) -> Self {
        Self {
            area_number,
            layer,
            title: title.into(),
            local_path: local_path.into(),
            active: true,
            ..Self::default()
        }
    }

    /// Short description for log output.
    pub fn describe(&self) -> String {
        format!("#{} layer {} \"{}\" ({})", self.area_number, self.layer, self.title, self.local_path)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_area_is_active() {
        let area = SceneryArea::new(12, 3, "Addon Scenery", "Addon Scenery");
        assert!(area.active);
        assert!(!area.msfs_navigraph_navdata);
        assert_eq!(area.layer, 3);
        assert!(area.describe().contains("Addon Scenery"));
    }

    #[test]
    fn area_serde_round_trip_keeps_flags() {
        let mut area = SceneryArea::new(1, 1, "Navdata", "Community/navigraph-navdata");
        area.msfs_navigraph_navdata = true;
        let json = serde_json::to_string(&area).unwrap();
        let back: SceneryArea = serde_json::from_str(&json).unwrap();
        assert_eq!(back, area);
    }
}
