//! Database writers. One module per entity kind, all sharing a
//! [`WriteContext`] with the connection, id allocator and airport index.

pub mod airport;
pub mod approach;
pub mod boundary;
pub mod ids;
pub mod ils;
pub mod index;
pub mod meta;
pub mod namelist;
pub mod nav;

use std::path::Path;

use bgl_reader::{BglFile, ReadContext, StructureType};
use navdata_schema::{FileError, NavDatabaseOptions, NavDbObjectType, SceneryArea, SceneryErrors};
use rusqlite::Connection;

use crate::error::{CompilerError, Result};
use crate::progress::{Counters, ProgressHandler};
use crate::scenery;
use ids::IdAllocator;
use index::AirportIndex;
use namelist::NamelistLookup;

pub struct WriteContext<'a> {
    pub conn: &'a Connection,
    pub options: &'a NavDatabaseOptions,
    pub ids: IdAllocator,
    pub index: AirportIndex,
    pub counters: Counters,
    pub scenery_area_id: i64,
    pub file_id: i64,
    pub area: SceneryArea,
    /// Path of the file being written, for log output.
    pub filename: String,
}

impl<'a> WriteContext<'a> {
    pub fn new(conn: &'a Connection, options: &'a NavDatabaseOptions) -> Self {
        Self {
            conn,
            options,
            ids: IdAllocator::default(),
            index: AirportIndex::default(),
            counters: Counters::default(),
            scenery_area_id: 0,
            file_id: 0,
            area: SceneryArea::default(),
            filename: String::new(),
        }
    }

    pub fn is_included(&self, object: NavDbObjectType) -> bool {
        self.options.is_included(object)
    }

    /// Copies the object counters into the progress handler. The file count
    /// is owned by the handler.
    pub fn sync_counters(&self, progress: &mut ProgressHandler) {
        progress.counters = Counters { files: progress.counters.files, ..self.counters };
    }
}

// ── BGL scenery ──────────────────────────────────────────────────────────────

/// Writes the BGL files of FSX, P3D and MSFS scenery areas.
pub struct DataWriter<'a> {
    pub ctx: WriteContext<'a>,
    structure: StructureType,
}

impl<'a> DataWriter<'a> {
    pub fn new(conn: &'a Connection, options: &'a NavDatabaseOptions) -> Self {
        Self { ctx: WriteContext::new(conn, options), structure: StructureType::for_simulator(options.simulator) }
    }

    /// Writes all BGL files of one area. Returns `true` when aborted.
    pub fn write_scenery_area(
        &mut self,
        area: &SceneryArea,
        progress: &mut ProgressHandler,
        errors: &mut SceneryErrors,
    ) -> Result<bool> {
        meta::write_scenery_area(&mut self.ctx, area)?;

        let files = match scenery::resolver::bgl_files(self.ctx.options, area) {
            Ok(files) => files,
            Err(err) => {
                tracing::warn!("{}: {err}", area.describe());
                errors.messages.push(err.to_string());
                return Ok(false);
            }
        };

        for path in files {
            let filepath = path.display().to_string();
            if progress.report_file(&filepath) {
                return Ok(true);
            }
            if let Err(err) = self.write_file(&path) {
                match err {
                    CompilerError::Bgl(bgl) => {
                        tracing::warn!("{bgl}");
                        self.ctx.counters.errors += 1;
                        errors.file_errors.push(FileError::new(&filepath, bgl.to_string()));
                    }
                    other => return Err(other),
                }
            }
            self.ctx.sync_counters(progress);
        }
        Ok(false)
    }

    /// Reads one BGL file and writes its content. Read errors are returned
    /// as [`CompilerError::Bgl`].
    pub fn write_file(&mut self, path: &Path) -> Result<()> {
        let read_ctx = ReadContext::new(self.ctx.options, self.structure);
        let file = BglFile::read_file(&read_ctx, path, &self.ctx.area)?;
        if !file.is_valid() || !file.has_content() {
            return Ok(());
        }
        self.write_bgl(&file, path)
    }

    pub fn write_bgl(&mut self, file: &BglFile, path: &Path) -> Result<()> {
        let ctx = &mut self.ctx;
        let create_time = file.header.creation_time.map(|t| t.to_rfc3339());
        meta::write_bgl_file(ctx, path, file.size, create_time.as_deref())?;

        let names = NamelistLookup::from_file(file);

        if ctx.is_included(NavDbObjectType::Airport) {
            for ap in &file.airports {
                airport::write_bgl_airport(ctx, ap, &names)?;
            }
        }
        if ctx.is_included(NavDbObjectType::Vor) {
            for vor in &file.vors {
                nav::write_bgl_vor(ctx, vor)?;
            }
            for tacan in &file.tacans {
                nav::write_bgl_tacan(ctx, tacan)?;
            }
        }
        if ctx.is_included(NavDbObjectType::Ndb) {
            for ndb in &file.ndbs {
                nav::write_bgl_ndb(ctx, ndb)?;
            }
        }
        if ctx.is_included(NavDbObjectType::Marker) {
            for marker in &file.markers {
                nav::write_bgl_marker(ctx, marker)?;
            }
        }
        if ctx.is_included(NavDbObjectType::Waypoint) {
            for wp in &file.waypoints {
                nav::write_bgl_waypoint(ctx, wp, None)?;
            }
        }
        if ctx.is_included(NavDbObjectType::Ils) {
            let magnetic = self.structure.layout().magnetic_localizer;
            for ils in &file.ils {
                ils::write_bgl_ils(ctx, ils, magnetic)?;
            }
        }
        if ctx.is_included(NavDbObjectType::Boundary) {
            for b in &file.boundaries {
                boundary::write_bgl_boundary(ctx, b)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod testutil {
    use navdata_schema::NavDatabaseOptions;
    use rusqlite::Connection;

    use crate::scripts::run_script;

    /// In-memory database with the schema and default options.
    pub fn test_context() -> (Connection, NavDatabaseOptions) {
        let conn = Connection::open_in_memory().unwrap();
        run_script(&conn, "create_schema").unwrap();
        (conn, NavDatabaseOptions::default())
    }

    pub fn count(conn: &Connection, table: &str) -> i64 {
        conn.query_row(&format!("SELECT count(*) FROM {table}"), [], |r| r.get(0)).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::testutil::{count, test_context};
    use super::*;
    use bgl_reader::section::SectionType;
    use bgl_reader::testutil::{AirportBuilder, BglBuilder, IlsVorBuilder, RunwayBuilder, WaypointBuilder};

    #[test]
    fn bgl_file_with_airport_and_navaids() {
        let (conn, options) = test_context();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("APX47120.bgl");
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
            .section(SectionType::Waypoint, vec![WaypointBuilder::new(2, "SUMMA", "K1", -122.2, 47.5).build()])
            .build();
        std::fs::write(&path, data).unwrap();

        let mut writer = DataWriter::new(&conn, &options);
        meta::write_scenery_area(&mut writer.ctx, &SceneryArea::new(1, 1, "Test", "Scenery/Test")).unwrap();
        writer.write_file(&path).unwrap();

        assert_eq!(count(&conn, "bgl_file"), 1);
        assert_eq!(count(&conn, "airport"), 1);
        assert_eq!(count(&conn, "runway"), 1);
        assert_eq!(count(&conn, "runway_end"), 2);
        assert_eq!(count(&conn, "parking"), 1);
        assert_eq!(count(&conn, "vor"), 1);
        assert_eq!(count(&conn, "waypoint"), 1);
        assert_eq!(writer.ctx.counters.airports, 1);
        assert_eq!(writer.ctx.index.airport_id("KSEA"), Some(1));
    }

    #[test]
    fn excluded_objects_are_not_written() {
        let (conn, mut options) = test_context();
        options.exclude(NavDbObjectType::Waypoint);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nav.bgl");
        let data = BglBuilder::new()
            .section(SectionType::Waypoint, vec![WaypointBuilder::new(2, "SUMMA", "K1", -122.2, 47.5).build()])
            .build();
        std::fs::write(&path, data).unwrap();

        let mut writer = DataWriter::new(&conn, &options);
        writer.write_file(&path).unwrap();
        assert_eq!(count(&conn, "waypoint"), 0);
    }
}
