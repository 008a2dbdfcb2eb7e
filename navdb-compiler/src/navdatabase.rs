//! Compile pipeline. Creates the schema, writes all scenery areas or the
//! X-Plane files and runs the post processing steps.

use std::path::Path;
use std::time::Instant;

use navdata_schema::{NavDatabaseErrors, NavDatabaseOptions, NavDbObjectType, SceneryErrors, SimulatorType};
use rusqlite::Connection;

use crate::airway_resolver::resolve_airways;
use crate::error::{CompilerError, Result};
use crate::progress::{Outcome, ProgressHandler};
use crate::report::DatabaseReport;
use crate::route_edge::RouteEdgeWriter;
use crate::scenery::{addon, SceneryCfg};
use crate::scripts::run_script;
use crate::writer::{meta, DataWriter};
use crate::xplane::compiler::XpDataCompiler;

/// Progress steps besides scenery areas and files.
const PIPELINE_STEPS: usize = 18;
/// Progress reports of the route edge writer.
const ROUTE_EDGE_STEPS: usize = 10;

// ── Transaction ──────────────────────────────────────────────────────────────

/// One transaction over the whole run so that an abort leaves the database
/// untouched. Nothing is committed before the run completes, not even the
/// schema. Autocommit mode writes without a transaction and cannot roll
/// back.
struct Transaction<'a> {
    conn: &'a Connection,
    autocommit: bool,
}

impl<'a> Transaction<'a> {
    fn begin(conn: &'a Connection, autocommit: bool) -> Result<Self> {
        if !autocommit {
            conn.execute_batch("BEGIN")?;
        }
        Ok(Self { conn, autocommit })
    }

    fn commit(self) -> Result<()> {
        if !self.conn.is_autocommit() {
            self.conn.execute_batch("COMMIT")?;
        }
        Ok(())
    }

    fn rollback(self) -> Result<()> {
        if self.autocommit {
            tracing::warn!("Autocommit enabled, written data is kept");
        } else if !self.conn.is_autocommit() {
            self.conn.execute_batch("ROLLBACK")?;
        }
        Ok(())
    }
}

// ── Validation ───────────────────────────────────────────────────────────────

fn invalid_base_path(path: &Path, reason: impl Into<String>) -> CompilerError {
    CompilerError::InvalidBasePath { path: path.to_path_buf(), reason: reason.into() }
}

fn has_dir_ignore_case(path: &Path, name: &str) -> bool {
    std::fs::read_dir(path).is_ok_and(|entries| {
        entries
            .flatten()
            .any(|e| e.path().is_dir() && e.file_name().to_string_lossy().eq_ignore_ascii_case(name))
    })
}

/// Checks that `path` looks like an installation of `simulator`.
pub fn is_base_path_valid(path: &Path, simulator: SimulatorType) -> Result<()> {
    if !path.exists() {
        return Err(invalid_base_path(path, "directory does not exist"));
    }
    if !path.is_dir() {
        return Err(invalid_base_path(path, "is not a directory"));
    }
    std::fs::read_dir(path).map_err(|e| invalid_base_path(path, format!("directory is not readable: {e}")))?;

    if simulator.is_xplane() {
        if !path.join("Resources").join("default data").is_dir() {
            return Err(invalid_base_path(path, "\"Resources/default data\" not found"));
        }
    } else if simulator.is_msfs() {
        if !has_dir_ignore_case(path, "official") && !has_dir_ignore_case(path, "community") {
            return Err(invalid_base_path(path, "does not contain an \"Official\" or \"Community\" directory"));
        }
    } else if !has_dir_ignore_case(path, "scenery") {
        return Err(invalid_base_path(path, "does not contain a \"Scenery\" directory"));
    }
    Ok(())
}

/// Checks that `path` is a readable `scenery.cfg` with at least one area.
pub fn is_scenery_config_valid(path: &Path) -> Result<()> {
    let invalid = |reason: String| CompilerError::InvalidSceneryConfig { path: path.to_path_buf(), reason };
    if !path.exists() {
        return Err(invalid("file does not exist".to_string()));
    }
    if !path.is_file() {
        return Err(invalid("file is not a regular file".to_string()));
    }
    SceneryCfg::read(path).map_err(|e| invalid(e.to_string()))?;
    Ok(())
}

// ── NavDatabase ──────────────────────────────────────────────────────────────

pub struct NavDatabase<'a> {
    conn: &'a Connection,
    options: &'a NavDatabaseOptions,
}

impl<'a> NavDatabase<'a> {
    pub fn new(conn: &'a Connection, options: &'a NavDatabaseOptions) -> Self {
        Self { conn, options }
    }

    /// Compiles the complete database. Configuration problems fail before
    /// anything is written. Problems in single files are collected in
    /// `errors`.
    pub fn create(&self, progress: &mut ProgressHandler, errors: &mut NavDatabaseErrors) -> Result<Outcome> {
        let start = Instant::now();
        self.options.validate()?;
        is_base_path_valid(&self.options.base_path, self.options.simulator)?;

        let scenery = if self.options.simulator.is_xplane() { None } else { Some(self.scenery_config()?) };
        let num_areas = scenery.as_ref().map_or(1, |cfg| cfg.areas().len());
        progress.set_total(num_areas + PIPELINE_STEPS);

        let tx = Transaction::begin(self.conn, self.options.autocommit)?;
        let outcome = match self.create_internal(scenery.as_ref(), progress, errors) {
            Ok(outcome) => outcome,
            Err(err) => {
                if let Err(rollback) = tx.rollback() {
                    tracing::error!("Rollback failed: {rollback}");
                }
                return Err(err);
            }
        };

        match outcome {
            Outcome::Completed => {
                tx.commit()?;
                progress.report_finish();
                tracing::info!(
                    "Database compiled in {:.1} s with {} errors",
                    start.elapsed().as_secs_f64(),
                    errors.total_errors()
                );
            }
            Outcome::Aborted => {
                tx.rollback()?;
                tracing::info!("Database compilation aborted");
            }
        }
        Ok(outcome)
    }

    fn scenery_config(&self) -> Result<SceneryCfg> {
        let options = self.options;
        let mut cfg = if options.simulator.is_msfs() {
            SceneryCfg::from_msfs_packages(&options.base_path)?
        } else {
            let file = match &options.scenery_file {
                Some(file) => file.clone(),
                None => options.base_path.join("scenery.cfg"),
            };
            is_scenery_config_valid(&file)?;
            SceneryCfg::read(&file)?
        };

        if options.read_addon_xml && options.simulator.reads_addon_packages() {
            addon::add_packages(&mut cfg, options);
        }
        Ok(cfg)
    }

    /// Reports the step and runs it. Returns `true` when aborted.
    fn step(&self, progress: &mut ProgressHandler, message: &str, action: impl FnOnce() -> Result<()>) -> Result<bool> {
        if progress.report_other(message) {
            return Ok(true);
        }
        action()?;
        Ok(false)
    }

    fn script(&self, progress: &mut ProgressHandler, message: &str, name: &str) -> Result<bool> {
        self.step(progress, message, || run_script(self.conn, name))
    }

    fn create_internal(
        &self,
        scenery: Option<&SceneryCfg>,
        progress: &mut ProgressHandler,
        errors: &mut NavDatabaseErrors,
    ) -> Result<Outcome> {
        let conn = self.conn;
        let options = self.options;
        let xplane = options.simulator.is_xplane();

        let aborted = self.step(progress, "Creating database schema", || {
            run_script(conn, "drop_schema")?;
            run_script(conn, "create_schema")?;
            meta::write_metadata(conn, options.simulator.name())
        })?;
        if aborted {
            return Ok(Outcome::Aborted);
        }

        let aborted = match scenery {
            Some(cfg) => self.write_scenery(cfg, progress, errors)?,
            None => self.compile_xplane(progress, errors)?,
        };
        if aborted {
            return Ok(Outcome::Aborted);
        }

        if self.post_process(progress, xplane)? {
            return Ok(Outcome::Aborted);
        }

        if options.database_report {
            if progress.report_other("Creating database report") {
                return Ok(Outcome::Aborted);
            }
            DatabaseReport::create(conn)?.log();
        }
        Ok(Outcome::Completed)
    }

    fn write_scenery(
        &self,
        cfg: &SceneryCfg,
        progress: &mut ProgressHandler,
        errors: &mut NavDatabaseErrors,
    ) -> Result<bool> {
        let mut writer = DataWriter::new(self.conn, self.options);
        for area in cfg.areas() {
            if !area.active && !self.options.read_inactive {
                tracing::debug!("Skipping inactive area {}", area.describe());
                continue;
            }
            if progress.report_scenery_area(area) {
                return Ok(true);
            }
            let mut area_errors = SceneryErrors::for_area(area);
            let aborted = writer.write_scenery_area(area, progress, &mut area_errors)?;
            errors.push_if_any(area_errors);
            if aborted {
                return Ok(true);
            }
        }
        tracing::info!("Counters {:?}", writer.ctx.counters);
        Ok(false)
    }

    fn compile_xplane(&self, progress: &mut ProgressHandler, errors: &mut NavDatabaseErrors) -> Result<bool> {
        let mut compiler = XpDataCompiler::new(self.conn, self.options);
        if progress.report_scenery_area(&XpDataCompiler::area()) {
            return Ok(true);
        }
        let mut area_errors = SceneryErrors::default();
        let aborted = compiler.compile(progress, &mut area_errors)?;
        errors.push_if_any(area_errors);
        if aborted {
            return Ok(true);
        }

        match compiler.airac_cycle() {
            Some(cycle) => meta::update_airac_cycle(self.conn, cycle)?,
            None => tracing::warn!("No AIRAC cycle found in X-Plane navigation data"),
        }
        tracing::info!("Counters {:?}", compiler.ctx.counters);
        Ok(false)
    }

    /// Returns `true` when aborted.
    fn post_process(&self, progress: &mut ProgressHandler, xplane: bool) -> Result<bool> {
        let options = self.options;

        if self.script(progress, "Creating indexes", "create_indexes_post_load")? {
            return Ok(true);
        }
        if options.deduplicate && self.script(progress, "Removing duplicates", "delete_duplicates")? {
            return Ok(true);
        }

        // X-Plane airways only exist after resolving the segments
        if (options.resolve_airways || xplane) && options.is_included(NavDbObjectType::Airway) {
            let aborted = self.step(progress, "Creating airways", || {
                let num = resolve_airways(self.conn)?;
                tracing::info!("{num} airway segments written");
                Ok(())
            })?;
            if aborted {
                return Ok(true);
            }
        }

        if !xplane && self.script(progress, "Merging VOR and TACAN to VORTAC", "update_vor")? {
            return Ok(true);
        }
        if self.script(progress, "Updating waypoints", "update_wp_ids")? {
            return Ok(true);
        }
        if self.script(progress, "Updating approaches", "update_approaches")? {
            return Ok(true);
        }
        if !xplane && self.script(progress, "Updating ILS", "update_ils_ids")? {
            return Ok(true);
        }
        if self.script(progress, "Updating ILS count", "update_num_ils")? {
            return Ok(true);
        }
        if self.script(progress, "Collecting navaids for search", "populate_nav_search")? {
            return Ok(true);
        }
        if self.script(progress, "Populating routing tables", "populate_route_node")? {
            return Ok(true);
        }

        if options.create_route_tables {
            if progress.report_other("Creating route edges for VOR and NDB") {
                return Ok(true);
            }
            if RouteEdgeWriter::new(self.conn, ROUTE_EDGE_STEPS).run(progress)? {
                return Ok(true);
            }
        }

        if self.script(progress, "Creating route edges for waypoints", "populate_route_edge")? {
            return Ok(true);
        }
        self.script(progress, "Creating indexes for search", "finish_schema")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::{ProgressReport, Step};
    use crate::writer::testutil::count;
    use bgl_reader::section::SectionType;
    use bgl_reader::testutil::{AirportBuilder, BglBuilder, IlsVorBuilder, RunwayBuilder};
    use bgl_reader::StructureType;

    const SCENERY_CFG: &str = "\
[General]
Title=FS World

[Area.001]
Title=Default Terrain
Local=Scenery\\World
Layer=1
Active=TRUE
Required=TRUE

[Area.002]
Title=Disabled
Local=Scenery\\Disabled
Layer=2
Active=FALSE
Required=FALSE
";

    /// FSX installation with one area holding an airport and a VOR.
    fn fsx_installation(dir: &Path) -> NavDatabaseOptions {
        let scenery = dir.join("Scenery/World/scenery");
        std::fs::create_dir_all(&scenery).unwrap();
        std::fs::create_dir_all(dir.join("Scenery/Disabled/scenery")).unwrap();
        let data = BglBuilder::new()
            .section(
                SectionType::Airport,
                vec![AirportBuilder::new("KSEA", -122.309, 47.449)
                    .name("Seattle-Tacoma Intl")
                    .runway(RunwayBuilder::new(16, 1, 34, 2).length(3627.0))
                    .parking(12, 8, 4)
                    .build(StructureType::Fsx)],
            )
            .section(SectionType::IlsVor, vec![IlsVorBuilder::new(3, "SEA", 116_800_000, -122.31, 47.43).dme().build()])
            .build();
        std::fs::write(scenery.join("APX47120.bgl"), data).unwrap();
        std::fs::write(dir.join("scenery.cfg"), SCENERY_CFG).unwrap();

        let mut options = NavDatabaseOptions::default();
        options.base_path = dir.to_path_buf();
        options.create_route_tables = true;
        options.database_report = true;
        options
    }

    #[test]
    fn fsx_scenery_is_compiled() {
        let dir = tempfile::tempdir().unwrap();
        let options = fsx_installation(dir.path());
        let conn = Connection::open_in_memory().unwrap();
        let mut progress = ProgressHandler::silent();
        let mut errors = NavDatabaseErrors::default();

        let outcome = NavDatabase::new(&conn, &options).create(&mut progress, &mut errors).unwrap();
        assert_eq!(outcome, Outcome::Completed);
        assert_eq!(errors.total_errors(), 0);
        assert!(conn.is_autocommit());

        assert_eq!(count(&conn, "scenery_area"), 1);
        assert_eq!(count(&conn, "airport"), 1);
        assert_eq!(count(&conn, "runway"), 1);
        assert_eq!(count(&conn, "vor"), 1);
        assert_eq!(progress.counters.files, 1);
        assert_eq!(progress.counters.airports, 1);
        let source: String = conn.query_row("SELECT data_source FROM metadata", [], |r| r.get(0)).unwrap();
        assert_eq!(source, "FSX");
    }

    #[test]
    fn inactive_areas_are_read_on_request() {
        let dir = tempfile::tempdir().unwrap();
        let mut options = fsx_installation(dir.path());
        options.read_inactive = true;
        options.database_report = false;
        let conn = Connection::open_in_memory().unwrap();

        let outcome = NavDatabase::new(&conn, &options)
            .create(&mut ProgressHandler::silent(), &mut NavDatabaseErrors::default())
            .unwrap();
        assert_eq!(outcome, Outcome::Completed);
        assert_eq!(count(&conn, "scenery_area"), 2);
    }

    #[test]
    fn duplicate_airports_fail_the_file_and_the_next_area_is_read() {
        let dir = tempfile::tempdir().unwrap();
        let mut options = fsx_installation(dir.path());
        options.database_report = false;

        let broken = dir.path().join("Scenery/Broken/scenery");
        std::fs::create_dir_all(&broken).unwrap();
        let airport = AirportBuilder::new("KDUP", -100.0, 40.0).build(StructureType::Fsx);
        let data = BglBuilder::new().section(SectionType::Airport, vec![airport; 4]).build();
        std::fs::write(broken.join("BROKEN.bgl"), data).unwrap();
        std::fs::write(
            dir.path().join("scenery.cfg"),
            "\
[General]
Title=FS World

[Area.001]
Title=Broken Addon
Local=Scenery\\Broken
Layer=1
Active=TRUE
Required=FALSE

[Area.002]
Title=Default Terrain
Local=Scenery\\World
Layer=2
Active=TRUE
Required=TRUE
",
        )
        .unwrap();

        let conn = Connection::open_in_memory().unwrap();
        let mut errors = NavDatabaseErrors::default();
        let outcome = NavDatabase::new(&conn, &options).create(&mut ProgressHandler::silent(), &mut errors).unwrap();
        assert_eq!(outcome, Outcome::Completed);

        assert_eq!(errors.scenery_errors.len(), 1);
        let area = &errors.scenery_errors[0];
        assert_eq!(area.scenery.title, "Broken Addon");
        assert_eq!(area.file_errors.len(), 1);
        assert!(area.file_errors[0].filepath.ends_with("BROKEN.bgl"), "{}", area.file_errors[0].filepath);
        assert!(area.file_errors[0].message.contains("KDUP"), "{}", area.file_errors[0].message);

        assert_eq!(count(&conn, "scenery_area"), 2);
        let idents: Vec<String> = conn
            .prepare("SELECT ident FROM airport")
            .unwrap()
            .query_map([], |r| r.get(0))
            .unwrap()
            .map(|r| r.unwrap())
            .collect();
        assert_eq!(idents, ["KSEA"]);
    }

    #[test]
    fn abort_rolls_back() {
        let dir = tempfile::tempdir().unwrap();
        let options = fsx_installation(dir.path());
        let conn = Connection::open_in_memory().unwrap();
        let mut progress = ProgressHandler::new(|r: &ProgressReport| matches!(r.step, Step::File(_)));

        let outcome = NavDatabase::new(&conn, &options).create(&mut progress, &mut NavDatabaseErrors::default()).unwrap();
        assert_eq!(outcome, Outcome::Aborted);
        assert!(conn.is_autocommit());
        let tables: i64 = conn
            .query_row("SELECT count(*) FROM sqlite_master WHERE type = 'table'", [], |r| r.get(0))
            .unwrap();
        assert_eq!(tables, 0);
    }

    #[test]
    fn base_path_checks() {
        let dir = tempfile::tempdir().unwrap();
        let err = is_base_path_valid(dir.path(), SimulatorType::Fsx).unwrap_err();
        assert!(matches!(err, CompilerError::InvalidBasePath { .. }));
        std::fs::create_dir(dir.path().join("SCENERY")).unwrap();
        assert!(is_base_path_valid(dir.path(), SimulatorType::P3dV4).is_ok());

        assert!(is_base_path_valid(dir.path(), SimulatorType::Xplane12).is_err());
        std::fs::create_dir_all(dir.path().join("Resources/default data")).unwrap();
        assert!(is_base_path_valid(dir.path(), SimulatorType::Xplane12).is_ok());

        assert!(is_base_path_valid(&dir.path().join("missing"), SimulatorType::Msfs).is_err());
    }

    #[test]
    fn scenery_config_checks() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("scenery.cfg");
        assert!(is_scenery_config_valid(&file).is_err());
        std::fs::write(&file, "[General]\nTitle=Empty\n").unwrap();
        assert!(matches!(is_scenery_config_valid(&file), Err(CompilerError::InvalidSceneryConfig { .. })));
        std::fs::write(&file, SCENERY_CFG).unwrap();
        assert!(is_scenery_config_valid(&file).is_ok());
    }

    #[test]
    fn missing_scenery_config_fails_before_writing() {
        let dir = tempfile::tempdir().unwrap();
        let mut options = fsx_installation(dir.path());
        options.scenery_file = Some(dir.path().join("nope.cfg"));
        let conn = Connection::open_in_memory().unwrap();
        let result = NavDatabase::new(&conn, &options).create(&mut ProgressHandler::silent(), &mut NavDatabaseErrors::default());
        assert!(matches!(result, Err(CompilerError::InvalidSceneryConfig { .. })));
    }
}
