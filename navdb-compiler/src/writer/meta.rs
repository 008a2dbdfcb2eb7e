//! `metadata`, `scenery_area` and `bgl_file` rows.

use std::path::Path;

use navdata_schema::SceneryArea;
use rusqlite::{params, Connection};

use super::ids::Table;
use super::WriteContext;
use crate::error::Result;

pub const DB_VERSION_MAJOR: i32 = 1;
pub const DB_VERSION_MINOR: i32 = 0;

pub fn write_metadata(conn: &Connection, data_source: &str) -> Result<()> {
    conn.execute("DELETE FROM metadata", [])?;
    conn.execute(
        "INSERT INTO metadata (db_version_major, db_version_minor, last_load_timestamp, data_source, compiler_version)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            DB_VERSION_MAJOR,
            DB_VERSION_MINOR,
            chrono::Utc::now().to_rfc3339(),
            data_source,
            env!("CARGO_PKG_VERSION"),
        ],
    )?;
    Ok(())
}

pub fn update_airac_cycle(conn: &Connection, cycle: &str) -> Result<()> {
    conn.execute("UPDATE metadata SET airac_cycle = ?1", [cycle])?;
    Ok(())
}

/// Writes the area row and makes it the current area.
pub fn write_scenery_area(ctx: &mut WriteContext, area: &SceneryArea) -> Result<()> {
    let id = ctx.ids.next(Table::SceneryArea);
    ctx.conn
        .prepare_cached(
            "INSERT INTO scenery_area
             (scenery_area_id, number, layer, title, local_path, active, required, is_navdata, is_addon)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        )?
        .execute(params![
            id,
            area.area_number,
            area.layer,
            area.title,
            area.local_path,
            area.active,
            area.required,
            area.navdata,
            area.addon,
        ])?;
    ctx.scenery_area_id = id;
    ctx.area = area.clone();
    Ok(())
}

/// Writes the file row and makes it the current file.
pub fn write_bgl_file(ctx: &mut WriteContext, path: &Path, size: usize, create_time: Option<&str>) -> Result<()> {
    let id = ctx.ids.next(Table::BglFile);
    let filename = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
    ctx.conn
        .prepare_cached(
            "INSERT INTO bgl_file (bgl_file_id, scenery_area_id, bgl_create_time, filepath, filename, size)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )?
        .execute(params![id, ctx.scenery_area_id, create_time, path.display().to_string(), filename, size as i64])?;
    ctx.file_id = id;
    ctx.filename = path.display().to_string();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::testutil::test_context;

    #[test]
    fn metadata_and_airac_cycle() {
        let (conn, _) = test_context();
        write_metadata(&conn, "XP12").unwrap();
        update_airac_cycle(&conn, "2310").unwrap();
        let (source, cycle): (String, String) = conn
            .query_row("SELECT data_source, airac_cycle FROM metadata", [], |r| Ok((r.get(0)?, r.get(1)?)))
            .unwrap();
        assert_eq!(source, "XP12");
        assert_eq!(cycle, "2310");
    }

    #[test]
    fn file_rows_reference_current_area() {
        let (conn, options) = test_context();
        let mut ctx = WriteContext::new(&conn, &options);
        write_scenery_area(&mut ctx, &SceneryArea::new(3, 7, "Addon", "Addon Scenery")).unwrap();
        write_bgl_file(&mut ctx, Path::new("/fs/Addon Scenery/scenery/AP.bgl"), 1024, None).unwrap();
        let (area_id, filename): (i64, String) = conn
            .query_row("SELECT scenery_area_id, filename FROM bgl_file WHERE bgl_file_id = ?1", [ctx.file_id], |r| {
                Ok((r.get(0)?, r.get(1)?))
            })
            .unwrap();
        assert_eq!(area_id, ctx.scenery_area_id);
        assert_eq!(filename, "AP.bgl");
    }
}
