//! Finds the X-Plane data files and feeds them to the readers.
//!
//! Files in `Custom Data` replace the ones in `Resources/default data`.
//! Airports are read from the custom scenery packs first, then from the
//! global airports and the default `apt.dat`. The first airport with an
//! ident wins.

use std::path::{Path, PathBuf};

use navdata_schema::{FileError, NavDatabaseOptions, SceneryArea, SceneryErrors, SimulatorType};
use rusqlite::Connection;

use super::airport::XpAirportReader;
use super::airspace::XpAirspaceReader;
use super::airway::XpAirwayReader;
use super::cifp::XpCifpReader;
use super::fix::XpFixReader;
use super::mora::XpMoraReader;
use super::msa::XpAirportMsaReader;
use super::nav::XpNavReader;
use super::{read_file, XpFormat, XpReader};
use crate::error::{CompilerError, Result};
use crate::progress::ProgressHandler;
use crate::scripts::run_script;
use crate::writer::ids::Table;
use crate::writer::{meta, WriteContext};

pub const DEFAULT_DATA: &str = "Resources/default data";
pub const CUSTOM_DATA: &str = "Custom Data";
const CUSTOM_SCENERY: &str = "Custom Scenery";
const GLOBAL_AIRPORTS: &str = "Global Airports";
const DEFAULT_APT_DAT: &str = "Resources/default scenery/default apt dat/Earth nav data/apt.dat";
const APT_DAT: &str = "Earth nav data/apt.dat";
const SCENERY_PACKS: &str = "Custom Scenery/scenery_packs.ini";

/// Kinds in read order. Later kinds look up rows written by earlier ones.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum XpFileKind {
    Airport { addon: bool },
    Fix,
    Nav,
    Airway,
    Cifp { airport_ident: String },
    Mora,
    Msa,
    Airspace,
}

impl XpFileKind {
    fn needs_airways(&self) -> bool {
        *self > Self::Airway
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XpFile {
    pub kind: XpFileKind,
    pub path: PathBuf,
}

// ── File discovery ───────────────────────────────────────────────────────────

/// `Custom Data` version of a file if present.
fn data_file(base: &Path, name: &str) -> Option<PathBuf> {
    [CUSTOM_DATA, DEFAULT_DATA].iter().map(|dir| base.join(dir).join(name)).find(|p| p.is_file())
}

/// Directory contents with the extension, sorted by name.
fn files_with_extension(dir: &Path, extension: &str) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut files: Vec<PathBuf> = entries
        .flatten()
        .map(|e| e.path())
        .filter(|p| p.is_file() && p.extension().is_some_and(|e| e.eq_ignore_ascii_case(extension)))
        .collect();
    files.sort();
    files
}

fn data_directory(base: &Path, name: &str) -> Option<PathBuf> {
    [CUSTOM_DATA, DEFAULT_DATA].iter().map(|dir| base.join(dir).join(name)).find(|p| p.is_dir())
}

fn is_global_airports(pack: &str) -> bool {
    pack.contains("*GLOBAL_AIRPORTS*") || pack.trim_end_matches('/').ends_with(GLOBAL_AIRPORTS)
}

/// Scenery pack directories in `scenery_packs.ini` order.
///
/// ```text
/// SCENERY_PACK Custom Scenery/KSEA Demo Area/
/// SCENERY_PACK_DISABLED Custom Scenery/LOWI/
/// ```
pub fn scenery_packs(base: &Path, content: &str, read_inactive: bool) -> Vec<PathBuf> {
    content
        .lines()
        .filter_map(|line| {
            let line = line.trim();
            if let Some(pack) = line.strip_prefix("SCENERY_PACK_DISABLED ") {
                read_inactive.then_some(pack)
            } else {
                line.strip_prefix("SCENERY_PACK ")
            }
        })
        .filter(|pack| !is_global_airports(pack))
        .map(|pack| {
            let path = PathBuf::from(pack.trim());
            if path.is_relative() {
                base.join(path)
            } else {
                path
            }
        })
        .collect()
}

fn custom_scenery_packs(options: &NavDatabaseOptions) -> Vec<PathBuf> {
    let base = &options.base_path;
    match std::fs::read_to_string(base.join(SCENERY_PACKS)) {
        Ok(content) => scenery_packs(base, &content, options.read_inactive),
        Err(_) => {
            let Ok(entries) = std::fs::read_dir(base.join(CUSTOM_SCENERY)) else {
                return Vec::new();
            };
            let mut packs: Vec<PathBuf> = entries
                .flatten()
                .map(|e| e.path())
                .filter(|p| p.is_dir() && !is_global_airports(&p.to_string_lossy()))
                .collect();
            packs.sort();
            packs
        }
    }
}

/// All files to read in read order.
pub fn xplane_files(options: &NavDatabaseOptions) -> Vec<XpFile> {
    let base = &options.base_path;
    let mut files = Vec::new();
    let mut push = |kind: XpFileKind, path: PathBuf| {
        if options.is_included_path(&path.to_string_lossy()) {
            files.push(XpFile { kind, path });
        } else {
            tracing::debug!("Excluded {}", path.display());
        }
    };

    for pack in custom_scenery_packs(options) {
        let apt = pack.join(APT_DAT);
        if apt.is_file() {
            push(XpFileKind::Airport { addon: true }, apt);
        }
    }
    let global = match options.simulator {
        SimulatorType::Xplane11 => Path::new(CUSTOM_SCENERY).join(GLOBAL_AIRPORTS),
        _ => Path::new("Global Scenery").join(GLOBAL_AIRPORTS),
    };
    for apt in [base.join(global).join(APT_DAT), base.join(DEFAULT_APT_DAT)] {
        if apt.is_file() {
            push(XpFileKind::Airport { addon: false }, apt);
        }
    }

    let user_file = |name: &str| Some(base.join(CUSTOM_DATA).join(name)).filter(|p| p.is_file());
    for (kind, path) in [
        (XpFileKind::Fix, data_file(base, "earth_fix.dat")),
        (XpFileKind::Fix, user_file("user_fix.dat")),
        (XpFileKind::Nav, data_file(base, "earth_nav.dat")),
        (XpFileKind::Nav, user_file("user_nav.dat")),
        (XpFileKind::Airway, data_file(base, "earth_awy.dat")),
    ] {
        if let Some(path) = path {
            push(kind, path);
        }
    }

    if let Some(dir) = data_directory(base, "CIFP") {
        for path in files_with_extension(&dir, "dat") {
            let airport_ident = path.file_stem().map(|s| s.to_string_lossy().to_uppercase()).unwrap_or_default();
            push(XpFileKind::Cifp { airport_ident }, path);
        }
    }
    for (kind, name) in [(XpFileKind::Mora, "earth_mora.dat"), (XpFileKind::Msa, "earth_msa.dat")] {
        if let Some(path) = data_file(base, name) {
            push(kind, path);
        }
    }
    if let Some(dir) = data_directory(base, "airspaces") {
        for path in files_with_extension(&dir, "txt") {
            push(XpFileKind::Airspace, path);
        }
    }
    files
}

// ── Compiler ─────────────────────────────────────────────────────────────────

pub struct XpDataCompiler<'a> {
    pub ctx: WriteContext<'a>,
    airac_cycle: Option<String>,
    airways_prepared: bool,
}

impl<'a> XpDataCompiler<'a> {
    pub fn new(conn: &'a Connection, options: &'a NavDatabaseOptions) -> Self {
        Self { ctx: WriteContext::new(conn, options), airac_cycle: None, airways_prepared: false }
    }

    /// Cycle from the header of the navaid or fix files.
    pub fn airac_cycle(&self) -> Option<&str> {
        self.airac_cycle.as_deref()
    }

    pub fn area() -> SceneryArea {
        let mut area = SceneryArea::new(1, 1, "X-Plane", "");
        area.navdata = true;
        area
    }

    /// Reads all files. Returns `true` when aborted.
    pub fn compile(&mut self, progress: &mut ProgressHandler, errors: &mut SceneryErrors) -> Result<bool> {
        let mut area = Self::area();
        area.local_path = self.ctx.options.base_path.display().to_string();
        meta::write_scenery_area(&mut self.ctx, &area)?;
        *errors = SceneryErrors::for_area(&area);

        let files = xplane_files(self.ctx.options);
        tracing::info!("{} X-Plane files in {}", files.len(), area.local_path);
        progress.add_total(files.len());

        for file in &files {
            if file.kind.needs_airways() {
                self.prepare_airways()?;
            }
            let filepath = file.path.display().to_string();
            if progress.report_file(&filepath) {
                return Ok(true);
            }
            let errors_before = self.ctx.counters.errors;
            match self.compile_file(file) {
                Ok(()) => {}
                Err(CompilerError::Io { path, source }) => {
                    tracing::warn!("Cannot read {}: {source}", path.display());
                    self.ctx.counters.errors += 1;
                    errors.file_errors.push(FileError::new(&filepath, source.to_string()));
                }
                Err(other) => return Err(other),
            }
            let line_errors = self.ctx.counters.errors - errors_before;
            if line_errors > 0 && errors.file_errors.last().map(|e| &e.filepath) != Some(&filepath) {
                errors.file_errors.push(FileError::new(&filepath, format!("{line_errors} invalid lines")));
            }
            self.ctx.sync_counters(progress);
        }
        self.prepare_airways()?;
        Ok(false)
    }

    fn compile_file(&mut self, file: &XpFile) -> Result<()> {
        let size = std::fs::metadata(&file.path).map_err(|e| CompilerError::io(&file.path, e))?.len();
        meta::write_bgl_file(&mut self.ctx, &file.path, size as usize, None)?;

        let (format, mut reader): (XpFormat, Box<dyn XpReader>) = match &file.kind {
            XpFileKind::Airport { addon } => (XpFormat::Dat, Box::new(XpAirportReader::new(*addon))),
            XpFileKind::Fix => (XpFormat::Dat, Box::new(XpFixReader)),
            XpFileKind::Nav => (XpFormat::Dat, Box::new(XpNavReader::default())),
            XpFileKind::Airway => (XpFormat::Dat, Box::new(XpAirwayReader)),
            XpFileKind::Cifp { airport_ident } => (XpFormat::Cifp, Box::new(XpCifpReader::new(airport_ident.as_str()))),
            XpFileKind::Mora => (XpFormat::Dat, Box::new(XpMoraReader::default())),
            XpFileKind::Msa => (XpFormat::Dat, Box::new(XpAirportMsaReader)),
            XpFileKind::Airspace => (XpFormat::Text, Box::new(XpAirspaceReader::default())),
        };
        let cycle = read_file(&mut self.ctx, &file.path, format, reader.as_mut())?;
        if matches!(file.kind, XpFileKind::Nav | XpFileKind::Fix) && self.airac_cycle.is_none() {
            self.airac_cycle = cycle;
        }
        Ok(())
    }

    /// Adds waypoints for airway navaids and resolves the segment ends.
    fn prepare_airways(&mut self) -> Result<()> {
        if self.airways_prepared {
            return Ok(());
        }
        self.airways_prepared = true;
        run_script(self.ctx.conn, "xplane/prepare_airway")?;
        let max_id: i64 = self.ctx.conn.query_row("SELECT coalesce(max(waypoint_id), 0) FROM waypoint", [], |r| r.get(0))?;
        self.ctx.ids.skip_to(Table::Waypoint, max_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::testutil::{count, test_context};

    fn write(base: &Path, name: &str, content: &str) {
        let path = base.join(name);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    const APT: &str = "I
1200 Version - data cycle 2310

1 433 1 0 KSEA Seattle Tacoma Intl
100 45.11 1 0 0.25 1 3 0 16L 47.463767 -122.310748 0 0 2 0 0 0 34R 47.431200 -122.310801 0 0 2 0 0 0
99
";

    const NAV: &str = "I
1150 Version - data cycle 2310, build 20231003

3  47.435372222 -122.309616667 356 11680 130 19.000 SEA ENRT K1 SEATTLE VORTAC
99
";

    const AWY: &str = "I
1100 Version - data cycle 2310

SEA K1 3 SUMMA K1 11 N 1 30 180 V4
99
";

    const FIX: &str = "I
1101 Version - data cycle 2310

 47.507500000 -122.201388889 SUMMA ENRT K1 4530263
99
";

    fn xplane_tree(simulator: SimulatorType) -> (tempfile::TempDir, NavDatabaseOptions) {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path();
        write(base, DEFAULT_APT_DAT, APT);
        write(base, &format!("{DEFAULT_DATA}/earth_nav.dat"), NAV);
        write(base, &format!("{DEFAULT_DATA}/earth_fix.dat"), "I\n1101 Version\n99\n");
        write(base, &format!("{CUSTOM_DATA}/earth_fix.dat"), FIX);
        write(base, &format!("{DEFAULT_DATA}/earth_awy.dat"), AWY);
        write(base, &format!("{DEFAULT_DATA}/CIFP/KSEA.dat"), "");
        write(base, "Custom Scenery/Demo/Earth nav data/apt.dat", APT);
        write(base, "Custom Scenery/Disabled/Earth nav data/apt.dat", APT);
        write(
            base,
            SCENERY_PACKS,
            "I\n1000 Version\nSCENERY\n\nSCENERY_PACK Custom Scenery/Demo/\n\
             SCENERY_PACK_DISABLED Custom Scenery/Disabled/\nSCENERY_PACK *GLOBAL_AIRPORTS*\n",
        );

        let mut options = NavDatabaseOptions::default();
        options.simulator = simulator;
        options.base_path = base.to_path_buf();
        (dir, options)
    }

    #[test]
    fn files_are_found_in_read_order() {
        let (_dir, options) = xplane_tree(SimulatorType::Xplane12);
        let files = xplane_files(&options);
        let kinds: Vec<&XpFileKind> = files.iter().map(|f| &f.kind).collect();
        assert_eq!(
            kinds,
            [
                &XpFileKind::Airport { addon: true },
                &XpFileKind::Airport { addon: false },
                &XpFileKind::Fix,
                &XpFileKind::Nav,
                &XpFileKind::Airway,
                &XpFileKind::Cifp { airport_ident: "KSEA".into() },
            ]
        );
        assert!(files[0].path.to_string_lossy().contains("Demo"));
        assert!(files[2].path.to_string_lossy().contains(CUSTOM_DATA));
    }

    #[test]
    fn scenery_packs_respect_disabled_and_global() {
        let base = Path::new("/xp");
        let content = "SCENERY_PACK Custom Scenery/A/\nSCENERY_PACK_DISABLED Custom Scenery/B/\n\
                       SCENERY_PACK Custom Scenery/Global Airports/\n";
        assert_eq!(scenery_packs(base, content, false), [base.join("Custom Scenery/A/")]);
        assert_eq!(scenery_packs(base, content, true).len(), 2);
    }

    #[test]
    fn compile_writes_airports_navaids_and_airway_waypoints() {
        let (_dir, options) = xplane_tree(SimulatorType::Xplane12);
        let (conn, _) = test_context();
        let mut compiler = XpDataCompiler::new(&conn, &options);
        let mut progress = ProgressHandler::silent();
        let mut errors = SceneryErrors::default();

        let aborted = compiler.compile(&mut progress, &mut errors).unwrap();
        assert!(!aborted);
        assert_eq!(compiler.airac_cycle(), Some("2310"));

        // Addon airport wins over the default one
        assert_eq!(count(&conn, "airport"), 1);
        let is_addon: bool = conn.query_row("SELECT is_addon FROM airport", [], |r| r.get(0)).unwrap();
        assert!(is_addon);

        assert_eq!(count(&conn, "vor"), 1);
        // SUMMA and the VOR waypoint
        assert_eq!(count(&conn, "waypoint"), 2);
        let unresolved: i64 = conn
            .query_row(
                "SELECT count(*) FROM tmp_airway WHERE from_waypoint_id IS NULL OR to_waypoint_id IS NULL",
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(unresolved, 0);
        assert_eq!(compiler.ctx.ids.last(Table::Waypoint), 2);
        assert_eq!(progress.counters.files, 6);
    }
}
