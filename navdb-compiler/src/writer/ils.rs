//! ILS and localizer rows with the feather geometry drawn on maps.

use bgl_reader::nav::Ils;
use geo::Point;
use rusqlite::params;

use super::ids::Table;
use super::nav::DmeRow;
use super::WriteContext;
use crate::error::Result;
use crate::fsutil;
use crate::geometry::{calculate_ils_geometry, meter_to_feet, meter_to_nm, normalize_course, DEFAULT_FEATHER_LEN_NM};

#[derive(Debug, Clone, Default)]
pub struct LocalizerRow {
    pub airport_ident: Option<String>,
    pub runway_name: Option<String>,
    /// True course.
    pub heading: f64,
    /// Beam width in degrees.
    pub width: f64,
}

#[derive(Debug, Clone, Default)]
pub struct GlideslopeRow {
    pub range: f64,
    pub pitch: f64,
    pub altitude: f64,
    pub position: Point<f64>,
}

#[derive(Debug, Clone, Default)]
pub struct IlsRow {
    pub ident: String,
    pub name: Option<String>,
    pub region: Option<String>,
    /// `ILS`, `LOC`, `LDA`, `SDF`, `IGS`, `GLS`.
    pub ils_type: String,
    /// kHz.
    pub frequency: u32,
    /// Nautical miles.
    pub range: f64,
    pub mag_var: Option<f64>,
    pub has_backcourse: bool,
    pub dme_range: Option<f64>,
    pub dme: Option<DmeRow>,
    pub glideslope: Option<GlideslopeRow>,
    pub localizer: Option<LocalizerRow>,
    pub altitude: f64,
    pub position: Point<f64>,
}

impl IlsRow {
    pub fn is_complete(&self) -> bool {
        self.localizer.is_some()
    }
}

/// Writes an ILS. Records without localizer are dropped unless
/// `write_incomplete` is set. Returns the id if written.
pub fn write_ils(ctx: &mut WriteContext, ils: &IlsRow) -> Result<Option<i64>> {
    if ils.ident.trim().is_empty() {
        tracing::warn!("Skipping ILS without ident at {:?} in {}", ils.position, ctx.filename);
        return Ok(None);
    }
    if !ils.is_complete() && !ctx.options.write_incomplete {
        tracing::debug!("Skipping ILS {} without localizer in {}", ils.ident, ctx.filename);
        return Ok(None);
    }

    let loc = ils.localizer.as_ref();
    let feather = loc.map(|l| calculate_ils_geometry(ils.position, l.heading, l.width, DEFAULT_FEATHER_LEN_NM));
    let runway_end_id = loc.and_then(|l| {
        let airport = l.airport_ident.as_deref()?;
        let runway = l.runway_name.as_deref()?;
        ctx.index.runway_end_best_fit(airport, runway).map(|e| e.id)
    });
    let gs = ils.glideslope.as_ref();
    let dme = ils.dme.as_ref();

    let id = ctx.ids.next(Table::Ils);
    ctx.conn
        .prepare_cached(
            "INSERT INTO ils
             (ils_id, file_id, ident, name, region, type, frequency, range, mag_var, has_backcourse,
              dme_range, dme_altitude, dme_lonx, dme_laty,
              gs_range, gs_pitch, gs_altitude, gs_lonx, gs_laty,
              loc_runway_end_id, loc_airport_ident, loc_runway_name, loc_heading, loc_width,
              end1_lonx, end1_laty, end_mid_lonx, end_mid_laty, end2_lonx, end2_laty,
              altitude, lonx, laty)
             VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13,?14,?15,?16,?17,?18,?19,?20,?21,?22,?23,?24,
                     ?25,?26,?27,?28,?29,?30,?31,?32,?33)",
        )?
        .execute(params![
            id,
            ctx.file_id,
            ils.ident,
            ils.name,
            ils.region,
            ils.ils_type,
            ils.frequency,
            ils.range.round() as i64,
            ils.mag_var,
            ils.has_backcourse,
            ils.dme_range.map(|r| r.round() as i64),
            dme.map(|d| d.altitude.round() as i64),
            dme.map(|d| d.position.x()),
            dme.map(|d| d.position.y()),
            gs.map(|g| g.range.round() as i64),
            gs.map(|g| g.pitch),
            gs.map(|g| g.altitude.round() as i64),
            gs.map(|g| g.position.x()),
            gs.map(|g| g.position.y()),
            runway_end_id,
            loc.and_then(|l| l.airport_ident.as_deref()),
            loc.and_then(|l| l.runway_name.as_deref()),
            loc.map(|l| l.heading),
            loc.map(|l| l.width),
            feather.map(|f| f.p1.x()),
            feather.map(|f| f.p1.y()),
            feather.map(|f| f.pmid.x()),
            feather.map(|f| f.pmid.y()),
            feather.map(|f| f.p2.x()),
            feather.map(|f| f.p2.y()),
            ils.altitude.round() as i64,
            ils.position.x(),
            ils.position.y(),
        ])?;
    ctx.counters.ils += 1;
    Ok(Some(id))
}

fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}

/// `magnetic_localizer` is set for MSFS files, which also often lack the
/// runway number in the localizer record.
pub fn bgl_ils_row(ils: &Ils, magnetic_localizer: bool) -> IlsRow {
    let h = &ils.header;
    let magvar = f64::from(h.magvar);
    let name = non_empty(&ils.name);

    let localizer = ils.localizer.as_ref().map(|loc| {
        let heading = f64::from(loc.heading);
        let heading = if magnetic_localizer || loc.heading_is_magnetic {
            normalize_course(heading + magvar)
        } else {
            heading
        };
        let runway_name = non_empty(&loc.runway_name)
            .or_else(|| name.as_deref().and_then(fsutil::ils_runway_name_from_name));
        LocalizerRow {
            airport_ident: non_empty(&h.airport),
            runway_name,
            heading,
            width: f64::from(loc.width),
        }
    });

    IlsRow {
        ident: h.ident.clone(),
        name,
        region: non_empty(&h.region),
        ils_type: if ils.glideslope.is_some() { "ILS" } else { "LOC" }.to_string(),
        frequency: h.frequency,
        range: meter_to_nm(f64::from(h.range)),
        mag_var: Some(magvar),
        has_backcourse: h.backcourse,
        dme_range: ils.dme.as_ref().map(|d| meter_to_nm(f64::from(d.range))),
        dme: ils.dme.as_ref().map(|d| DmeRow {
            altitude: meter_to_feet(d.position.altitude),
            position: Point::new(d.position.lon, d.position.lat),
        }),
        glideslope: ils.glideslope.as_ref().map(|gs| GlideslopeRow {
            range: meter_to_nm(f64::from(gs.range)),
            pitch: f64::from(gs.pitch),
            altitude: meter_to_feet(gs.position.altitude),
            position: Point::new(gs.position.lon, gs.position.lat),
        }),
        localizer,
        altitude: meter_to_feet(h.position.altitude),
        position: Point::new(h.position.lon, h.position.lat),
    }
}

pub fn write_bgl_ils(ctx: &mut WriteContext, ils: &Ils, magnetic_localizer: bool) -> Result<()> {
    write_ils(ctx, &bgl_ils_row(ils, magnetic_localizer))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::testutil::{count, test_context};
    use bgl_reader::nav::{IlsVorType, Localizer, NavHeader};
    use bgl_reader::BglPosition;

    fn ils(localizer: Option<Localizer>) -> Ils {
        Ils {
            header: NavHeader {
                nav_type: IlsVorType::Ils,
                dme_only: false,
                backcourse: false,
                position: BglPosition::new(-122.31, 47.43, 100.0),
                frequency: 110_300,
                range: 50_000.0,
                magvar: 15.0,
                ident: "ISNQ".into(),
                region: "K1".into(),
                airport: "KSEA".into(),
            },
            name: "ILS RW16R".into(),
            localizer,
            glideslope: None,
            dme: None,
        }
    }

    #[test]
    fn incomplete_ils_is_dropped_by_default() {
        let (conn, mut options) = test_context();
        {
            let mut ctx = WriteContext::new(&conn, &options);
            write_bgl_ils(&mut ctx, &ils(None), false).unwrap();
        }
        assert_eq!(count(&conn, "ils"), 0);

        options.write_incomplete = true;
        let mut ctx = WriteContext::new(&conn, &options);
        write_bgl_ils(&mut ctx, &ils(None), false).unwrap();
        assert_eq!(count(&conn, "ils"), 1);
    }

    #[test]
    fn msfs_localizer_is_converted_to_true_and_named_from_ils_name() {
        let loc = Localizer { runway_name: String::new(), heading: 350.0, width: 5.0, heading_is_magnetic: true };
        let row = bgl_ils_row(&ils(Some(loc)), true);
        let loc = row.localizer.unwrap();
        assert!((loc.heading - 5.0).abs() < 1e-9);
        assert_eq!(loc.runway_name.as_deref(), Some("16R"));
    }

    #[test]
    fn feather_is_written() {
        let (conn, options) = test_context();
        let mut ctx = WriteContext::new(&conn, &options);
        let loc = Localizer { runway_name: "16R".into(), heading: 161.0, width: 5.0, heading_is_magnetic: false };
        write_bgl_ils(&mut ctx, &ils(Some(loc)), false).unwrap();
        let end_mid_laty: f64 = conn.query_row("SELECT end_mid_laty FROM ils", [], |r| r.get(0)).unwrap();
        // feather points north, away from a southbound localizer
        assert!(end_mid_laty > 47.43);
    }

    #[test]
    fn ils_without_ident_is_skipped() {
        let (conn, mut options) = test_context();
        options.write_incomplete = true;
        let mut ctx = WriteContext::new(&conn, &options);
        let loc = Localizer { runway_name: "16R".into(), heading: 161.0, width: 5.0, heading_is_magnetic: false };
        let mut blank = ils(Some(loc));
        blank.header.ident = "  ".into();
        write_bgl_ils(&mut ctx, &blank, false).unwrap();
        assert_eq!(count(&conn, "ils"), 0);

        write_ils(&mut ctx, &IlsRow::default()).unwrap();
        assert_eq!(count(&conn, "ils"), 0);
    }
}
