//! `earth_msa.dat` minimum sector altitudes.
//!
//! ```text
//! 3   BSA DA DAAD M 270 076 25 090 053 25 000 000  0
//! ```
//! Center type, ident, region, airport, `M` or `T` bearings followed by
//! bearing, altitude in hundreds of feet and radius in NM triples. An all
//! zero triple ends the list.
//!
//! Centers are looked up in the rows already written, so this file is read
//! after airports and navaids.

use geo::Point;
use navdata_schema::NavDbObjectType;
use rusqlite::{params, OptionalExtension};
use serde::Serialize;

use super::{invalid_line, XpLine, XpReader};
use crate::error::Result;
use crate::fsutil::{normalize_runway, runway_name_variants};
use crate::geometry::{nm_to_meter, Rect};
use crate::writer::boundary::circle_points;
use crate::writer::ids::Table;
use crate::writer::WriteContext;

const TYPE: usize = 0;
const IDENT: usize = 1;
const REGION: usize = 2;
const AIRPORT_IDENT: usize = 3;
const MAG_TRUE: usize = 4;
const SECTORS: usize = 5;

#[derive(Debug, Clone, Serialize, PartialEq)]
struct Sector {
    bearing: f64,
    altitude: f64,
}

#[derive(Debug, Serialize)]
struct MsaGeometry<'a> {
    sectors: &'a [Sector],
    points: Vec<[f64; 2]>,
}

#[derive(Debug, Default)]
struct Center {
    nav_id: Option<i64>,
    nav_ident: String,
    nav_type: &'static str,
    vor_type: Option<String>,
    vor_dme_only: Option<bool>,
    vor_has_dme: Option<bool>,
    mag_var: Option<f64>,
    position: Option<Point<f64>>,
}

fn query_nav(ctx: &WriteContext, sql: &str, ident: &str, region: &str) -> Result<Option<(i64, Option<f64>, Point<f64>)>> {
    Ok(ctx
        .conn
        .prepare_cached(sql)?
        .query_row(params![ident, region], |r| {
            Ok((r.get(0)?, r.get(1)?, Point::new(r.get(2)?, r.get(3)?)))
        })
        .optional()?)
}

fn airport_mag_var(ctx: &WriteContext, airport_id: i64) -> Result<Option<f64>> {
    Ok(ctx
        .conn
        .prepare_cached("SELECT mag_var FROM airport WHERE airport_id = ?1")?
        .query_row([airport_id], |r| r.get(0))
        .optional()?
        .flatten())
}

fn navaid(ctx: &WriteContext, table: &str, nav_type: &'static str, ident: &str, region: &str) -> Result<Center> {
    let sql = format!("SELECT {table}_id, mag_var, lonx, laty FROM {table} WHERE ident = ?1 AND region = ?2 LIMIT 1");
    let found = query_nav(ctx, &sql, ident, region)?;
    Ok(Center {
        nav_id: found.map(|f| f.0),
        nav_ident: ident.to_string(),
        nav_type,
        mag_var: found.and_then(|f| f.1),
        position: found.map(|f| f.2),
        ..Center::default()
    })
}

fn vor_or_ils(ctx: &WriteContext, ident: &str, region: &str) -> Result<Center> {
    let vor = ctx
        .conn
        .prepare_cached(
            "SELECT vor_id, mag_var, lonx, laty, type, dme_only, dme_lonx IS NOT NULL
             FROM vor WHERE ident = ?1 AND region = ?2 LIMIT 1",
        )?
        .query_row(params![ident, region], |r| {
            Ok(Center {
                nav_id: Some(r.get(0)?),
                nav_ident: ident.to_string(),
                nav_type: "V",
                mag_var: r.get(1)?,
                position: Some(Point::new(r.get(2)?, r.get(3)?)),
                vor_type: r.get(4)?,
                vor_dme_only: Some(r.get(5)?),
                vor_has_dme: Some(r.get(6)?),
            })
        })
        .optional()?;
    match vor {
        Some(center) => Ok(center),
        None => navaid(ctx, "ils", "I", ident, region),
    }
}

fn runway_end(ctx: &WriteContext, airport_ident: &str, ident: &str) -> Center {
    let name = normalize_runway(ident);
    let found = runway_name_variants(&name)
        .into_iter()
        .find_map(|rw| ctx.index.runway_end(airport_ident, &rw).map(|end| (rw, end)));
    match found {
        Some((rw, end)) => Center {
            nav_id: Some(end.id),
            nav_ident: rw,
            nav_type: "R",
            position: Some(end.position),
            ..Center::default()
        },
        None => Center { nav_ident: name, nav_type: "R", ..Center::default() },
    }
}

/// Sectors and the radius in NM. `None` if a sector column is not a number.
fn sectors(ctx: &WriteContext, line: &XpLine, airport_ident: &str) -> Option<(Vec<Sector>, f64)> {
    let mut sectors = Vec::new();
    let mut radius = 0.0;
    let mut i = SECTORS;
    while i + 2 < line.len() {
        let bearing = line.parse::<f64>(i)?;
        let altitude = line.parse::<f64>(i + 1)?;
        let r = line.parse::<f64>(i + 2)?;
        if bearing == 0.0 && altitude == 0.0 && r == 0.0 {
            break;
        }
        sectors.push(Sector { bearing, altitude: altitude * 100.0 });
        if radius <= 0.0 {
            radius = r;
        } else if (r - radius).abs() > f64::EPSILON {
            tracing::warn!("{}:{} {airport_ident} More than one radius found", ctx.filename, line.number);
        }
        i += 3;
    }
    Some((sectors, radius))
}

#[derive(Debug, Default)]
pub struct XpAirportMsaReader;

impl XpReader for XpAirportMsaReader {
    fn read(&mut self, ctx: &mut WriteContext, line: &XpLine) -> Result<()> {
        if !ctx.is_included(NavDbObjectType::AirportMsa) {
            return Ok(());
        }
        let airport_ident = line.at(AIRPORT_IDENT);
        // Missing airports are too common to report
        let Some(airport) = ctx.index.airport(airport_ident) else {
            return Ok(());
        };
        let ident = line.at(IDENT);
        let region = line.at(REGION);

        let center = match line.at(TYPE) {
            "1" => Center {
                nav_id: Some(airport.id),
                nav_ident: airport_ident.to_string(),
                nav_type: "A",
                mag_var: airport_mag_var(ctx, airport.id)?,
                position: Some(airport.position),
                ..Center::default()
            },
            "11" => navaid(ctx, "waypoint", "W", ident, region)?,
            "2" => navaid(ctx, "ndb", "N", ident, region)?,
            "3" => vor_or_ils(ctx, ident, region)?,
            "10" => {
                let mut center = runway_end(ctx, airport_ident, ident);
                center.mag_var = airport_mag_var(ctx, airport.id)?;
                center
            }
            _ => {
                invalid_line(ctx, line, "invalid MSA center type");
                return Ok(());
            }
        };

        let Some(position) = center.position else {
            tracing::warn!(
                "{}:{} {airport_ident} {} {} Invalid MSA center coordinate",
                ctx.filename,
                line.number,
                center.nav_type,
                center.nav_ident
            );
            return Ok(());
        };

        let Some((sectors, radius)) = sectors(ctx, line, airport_ident) else {
            invalid_line(ctx, line, "invalid MSA sector");
            return Ok(());
        };
        if sectors.is_empty() || radius <= 0.0 {
            invalid_line(ctx, line, "invalid MSA geometry");
            return Ok(());
        }

        let radius_m = nm_to_meter(radius);
        let rect = Rect::around(position, radius_m);
        let geometry = MsaGeometry {
            sectors: &sectors,
            points: circle_points(position, radius_m).iter().map(|p| [p.x(), p.y()]).collect(),
        };
        let geometry = serde_json::to_string(&geometry)?;
        let is_vor = center.nav_type == "V";

        ctx.conn
            .prepare_cached(
                "INSERT INTO airport_msa
                 (airport_msa_id, file_id, airport_id, airport_ident, nav_id, nav_ident, nav_type, region,
                  vor_type, vor_dme_only, vor_has_dme, true_bearing, mag_var, radius,
                  left_lonx, top_laty, right_lonx, bottom_laty, lonx, laty, geometry)
                 VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13,?14,?15,?16,?17,?18,?19,?20,?21)",
            )?
            .execute(params![
                ctx.ids.next(Table::AirportMsa),
                ctx.file_id,
                airport.id,
                airport_ident,
                center.nav_id,
                center.nav_ident,
                center.nav_type,
                region,
                center.vor_type.filter(|_| is_vor),
                center.vor_dme_only.filter(|_| is_vor),
                center.vor_has_dme.filter(|_| is_vor),
                line.at(MAG_TRUE) == "T",
                center.mag_var.unwrap_or_default(),
                radius,
                rect.left,
                rect.top,
                rect.right,
                rect.bottom,
                position.x(),
                position.y(),
                geometry,
            ])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::testutil::{count, test_context};
    use crate::xplane::{read_file, testutil::data_file, XpFormat};

    const MSA: &str = "I
1100 Version - data cycle 2101

3   SEA K1 KSEA M 270 076 25 090 053 25 000 000  0
3   ISNQ K1 KSEA M 160 030 25 000 000  0
1   KSEA K1 KSEA T 000 045 30 000 000  0
10  RW17R K1 KSEA M 000 045 25 000 000  0
11  NOPE K1 KSEA M 000 045 25 000 000  0
3   SEA K1 EGLL M 000 045 25 000 000  0
99
";

    #[test]
    fn centers_are_resolved() {
        let (conn, options) = test_context();
        let mut ctx = WriteContext::new(&conn, &options);
        ctx.index.add_airport("KSEA", 1, Point::new(-122.3, 47.45));
        ctx.index.add_runway_end("KSEA", "16R", 7, Point::new(-122.31, 47.46));
        conn.execute_batch(
            "INSERT INTO vor (vor_id, file_id, ident, region, type, mag_var, dme_lonx, dme_laty, lonx, laty)
             VALUES (3, 1, 'SEA', 'K1', 'H', 16.0, -122.3, 47.4, -122.3, 47.4);
             INSERT INTO ils (ils_id, file_id, ident, region, frequency, lonx, laty)
             VALUES (4, 1, 'ISNQ', 'K1', 110300, -122.31, 47.43);",
        )
        .unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = data_file(&dir, "earth_msa.dat", MSA);

        read_file(&mut ctx, &path, XpFormat::Dat, &mut XpAirportMsaReader).unwrap();
        assert_eq!(count(&conn, "airport_msa"), 4);

        let (nav_id, has_dme, mag_var, geometry): (i64, bool, f64, String) = conn
            .query_row(
                "SELECT nav_id, vor_has_dme, mag_var, geometry FROM airport_msa WHERE nav_type = 'V'",
                [],
                |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?)),
            )
            .unwrap();
        assert_eq!(nav_id, 3);
        assert!(has_dme);
        assert_eq!(mag_var, 16.0);
        assert!(geometry.contains("\"altitude\":7600.0"));

        let ils: i64 = conn
            .query_row("SELECT nav_id FROM airport_msa WHERE nav_type = 'I'", [], |r| r.get(0))
            .unwrap();
        assert_eq!(ils, 4);

        // 17R falls back to the neighbour 16R
        let (runway, runway_id): (String, i64) = conn
            .query_row("SELECT nav_ident, nav_id FROM airport_msa WHERE nav_type = 'R'", [], |r| {
                Ok((r.get(0)?, r.get(1)?))
            })
            .unwrap();
        assert_eq!(runway, "16R");
        assert_eq!(runway_id, 7);

        let true_bearing: bool = conn
            .query_row("SELECT true_bearing FROM airport_msa WHERE nav_type = 'A'", [], |r| r.get(0))
            .unwrap();
        assert!(true_bearing);
    }

    #[test]
    fn malformed_sectors_are_reported() {
        let (conn, options) = test_context();
        let mut ctx = WriteContext::new(&conn, &options);
        ctx.index.add_airport("KSEA", 1, Point::new(-122.3, 47.45));
        let dir = tempfile::tempdir().unwrap();
        let path = data_file(
            &dir,
            "earth_msa.dat",
            "I
1100 Version - data cycle 2101

1   KSEA K1 KSEA T 000 0x5 30 000 000  0
99
",
        );

        read_file(&mut ctx, &path, XpFormat::Dat, &mut XpAirportMsaReader).unwrap();
        assert_eq!(count(&conn, "airport_msa"), 0);
        assert_eq!(ctx.counters.errors, 1);
    }
}
