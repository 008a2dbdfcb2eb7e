//! VOR, TACAN, NDB, marker and waypoint rows plus the airway route entries
//! of waypoints.

use bgl_reader::nav::{Marker, Ndb, RouteNeighbor, Tacan, Vor, Waypoint};
use geo::Point;
use rusqlite::params;

use super::ids::Table;
use super::WriteContext;
use crate::error::Result;
use crate::geometry::{meter_to_feet, meter_to_nm};

// ── Rows ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct DmeRow {
    pub altitude: f64,
    pub position: Point<f64>,
}

#[derive(Debug, Clone, Default)]
pub struct VorRow {
    pub ident: String,
    pub name: Option<String>,
    pub region: Option<String>,
    pub airport_ident: Option<String>,
    /// `H`, `L`, `T` or `VOT`.
    pub vor_type: String,
    /// kHz.
    pub frequency: Option<u32>,
    pub channel: Option<String>,
    /// Nautical miles.
    pub range: f64,
    pub mag_var: Option<f64>,
    pub dme_only: bool,
    pub dme: Option<DmeRow>,
    /// Feet.
    pub altitude: f64,
    pub position: Point<f64>,
}

#[derive(Debug, Clone, Default)]
pub struct TacanRow {
    pub ident: String,
    pub name: Option<String>,
    pub region: Option<String>,
    pub airport_ident: Option<String>,
    pub channel: String,
    pub range: f64,
    pub mag_var: Option<f64>,
    pub dme_only: bool,
    pub dme: Option<DmeRow>,
    pub altitude: f64,
    pub position: Point<f64>,
}

#[derive(Debug, Clone, Default)]
pub struct NdbRow {
    pub ident: String,
    pub name: Option<String>,
    pub region: Option<String>,
    pub airport_ident: Option<String>,
    /// `HH`, `H`, `MH` or `CP`.
    pub ndb_type: String,
    /// kHz * 100.
    pub frequency: u32,
    pub range: f64,
    pub mag_var: Option<f64>,
    pub altitude: f64,
    pub position: Point<f64>,
}

#[derive(Debug, Clone, Default)]
pub struct MarkerRow {
    pub ident: Option<String>,
    pub region: Option<String>,
    pub marker_type: String,
    pub heading: Option<f64>,
    pub altitude: f64,
    pub position: Point<f64>,
}

#[derive(Debug, Clone, Default)]
pub struct WaypointRow {
    pub ident: String,
    pub name: Option<String>,
    pub region: Option<String>,
    pub airport_id: Option<i64>,
    pub airport_ident: Option<String>,
    pub waypoint_type: String,
    pub arinc_type: Option<String>,
    pub num_victor_airway: usize,
    pub num_jet_airway: usize,
    pub mag_var: Option<f64>,
    pub position: Point<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AirwayNeighborRow {
    /// `V`, `N` or `W`.
    pub fix_type: String,
    pub ident: String,
    pub region: Option<String>,
    /// Feet.
    pub minimum_altitude: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AirwayPointRow {
    pub name: String,
    /// `V` victor, `J` jet or `B` both.
    pub airway_type: String,
    pub next: Option<AirwayNeighborRow>,
    pub previous: Option<AirwayNeighborRow>,
}

fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}

// ── Inserts ──────────────────────────────────────────────────────────────────

pub fn insert_vor(ctx: &mut WriteContext, vor: &VorRow) -> Result<i64> {
    let id = ctx.ids.next(Table::Vor);
    ctx.conn
        .prepare_cached(
            "INSERT INTO vor
             (vor_id, file_id, ident, name, region, airport_ident, type, frequency, channel, range, mag_var,
              dme_only, dme_altitude, dme_lonx, dme_laty, altitude, lonx, laty)
             VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13,?14,?15,?16,?17,?18)",
        )?
        .execute(params![
            id,
            ctx.file_id,
            vor.ident,
            vor.name,
            vor.region,
            vor.airport_ident,
            vor.vor_type,
            vor.frequency,
            vor.channel,
            vor.range.round() as i64,
            vor.mag_var,
            vor.dme_only,
            vor.dme.as_ref().map(|d| d.altitude.round() as i64),
            vor.dme.as_ref().map(|d| d.position.x()),
            vor.dme.as_ref().map(|d| d.position.y()),
            vor.altitude.round() as i64,
            vor.position.x(),
            vor.position.y(),
        ])?;
    ctx.counters.vors += 1;
    Ok(id)
}

pub fn insert_tacan(ctx: &mut WriteContext, tacan: &TacanRow) -> Result<i64> {
    let id = ctx.ids.next(Table::Tacan);
    ctx.conn
        .prepare_cached(
            "INSERT INTO tacan
             (tacan_id, file_id, ident, name, region, airport_ident, channel, range, mag_var, dme_only,
              dme_altitude, dme_lonx, dme_laty, altitude, lonx, laty)
             VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13,?14,?15,?16)",
        )?
        .execute(params![
            id,
            ctx.file_id,
            tacan.ident,
            tacan.name,
            tacan.region,
            tacan.airport_ident,
            tacan.channel,
            tacan.range.round() as i64,
            tacan.mag_var,
            tacan.dme_only,
            tacan.dme.as_ref().map(|d| d.altitude.round() as i64),
            tacan.dme.as_ref().map(|d| d.position.x()),
            tacan.dme.as_ref().map(|d| d.position.y()),
            tacan.altitude.round() as i64,
            tacan.position.x(),
            tacan.position.y(),
        ])?;
    ctx.counters.vors += 1;
    Ok(id)
}

pub fn insert_ndb(ctx: &mut WriteContext, ndb: &NdbRow) -> Result<i64> {
    let id = ctx.ids.next(Table::Ndb);
    ctx.conn
        .prepare_cached(
            "INSERT INTO ndb
             (ndb_id, file_id, ident, name, region, airport_ident, type, frequency, range, mag_var, altitude, lonx, laty)
             VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13)",
        )?
        .execute(params![
            id,
            ctx.file_id,
            ndb.ident,
            ndb.name,
            ndb.region,
            ndb.airport_ident,
            ndb.ndb_type,
            ndb.frequency,
            ndb.range.round() as i64,
            ndb.mag_var,
            ndb.altitude.round() as i64,
            ndb.position.x(),
            ndb.position.y(),
        ])?;
    ctx.counters.ndbs += 1;
    Ok(id)
}

pub fn insert_marker(ctx: &mut WriteContext, marker: &MarkerRow) -> Result<i64> {
    let id = ctx.ids.next(Table::Marker);
    ctx.conn
        .prepare_cached(
            "INSERT INTO marker (marker_id, file_id, ident, region, type, heading, altitude, lonx, laty)
             VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9)",
        )?
        .execute(params![
            id,
            ctx.file_id,
            marker.ident,
            marker.region,
            marker.marker_type,
            marker.heading,
            marker.altitude.round() as i64,
            marker.position.x(),
            marker.position.y(),
        ])?;
    ctx.counters.markers += 1;
    Ok(id)
}

pub fn insert_waypoint(ctx: &mut WriteContext, wp: &WaypointRow) -> Result<i64> {
    let id = ctx.ids.next(Table::Waypoint);
    ctx.conn
        .prepare_cached(
            "INSERT INTO waypoint
             (waypoint_id, file_id, ident, name, region, airport_id, airport_ident, type, arinc_type,
              num_victor_airway, num_jet_airway, mag_var, lonx, laty)
             VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13,?14)",
        )?
        .execute(params![
            id,
            ctx.file_id,
            wp.ident,
            wp.name,
            wp.region,
            wp.airport_id,
            wp.airport_ident,
            wp.waypoint_type,
            wp.arinc_type,
            wp.num_victor_airway,
            wp.num_jet_airway,
            wp.mag_var,
            wp.position.x(),
            wp.position.y(),
        ])?;
    ctx.counters.waypoints += 1;
    Ok(id)
}

pub fn insert_airway_point(ctx: &mut WriteContext, waypoint_id: i64, point: &AirwayPointRow) -> Result<i64> {
    let id = ctx.ids.next(Table::AirwayPoint);
    let next = point.next.as_ref();
    let prev = point.previous.as_ref();
    ctx.conn
        .prepare_cached(
            "INSERT INTO airway_point
             (airway_point_id, waypoint_id, name, type, next_type, next_ident, next_region, next_minimum_altitude,
              previous_type, previous_ident, previous_region, previous_minimum_altitude)
             VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12)",
        )?
        .execute(params![
            id,
            waypoint_id,
            point.name,
            point.airway_type,
            next.map(|n| n.fix_type.as_str()),
            next.map(|n| n.ident.as_str()),
            next.and_then(|n| n.region.as_deref()),
            next.and_then(|n| n.minimum_altitude).map(|a| a.round() as i64),
            prev.map(|n| n.fix_type.as_str()),
            prev.map(|n| n.ident.as_str()),
            prev.and_then(|n| n.region.as_deref()),
            prev.and_then(|n| n.minimum_altitude).map(|a| a.round() as i64),
        ])?;
    Ok(id)
}

// ── BGL conversion ───────────────────────────────────────────────────────────

fn dme_row(dme: &bgl_reader::nav::Dme) -> DmeRow {
    DmeRow {
        altitude: meter_to_feet(dme.position.altitude),
        position: Point::new(dme.position.lon, dme.position.lat),
    }
}

pub fn write_bgl_vor(ctx: &mut WriteContext, vor: &Vor) -> Result<()> {
    let h = &vor.header;
    if !h.position.is_valid() {
        tracing::warn!("VOR {} has an invalid position in {}", h.ident, ctx.filename);
        return Ok(());
    }
    let row = VorRow {
        ident: h.ident.clone(),
        name: non_empty(&vor.name),
        region: non_empty(&h.region),
        airport_ident: non_empty(&h.airport),
        vor_type: h.nav_type.as_str().to_string(),
        frequency: Some(h.frequency),
        channel: None,
        range: meter_to_nm(f64::from(h.range)),
        mag_var: Some(f64::from(h.magvar)),
        dme_only: h.dme_only,
        dme: vor.dme.as_ref().map(dme_row),
        altitude: meter_to_feet(h.position.altitude),
        position: Point::new(h.position.lon, h.position.lat),
    };
    insert_vor(ctx, &row)?;
    Ok(())
}

pub fn write_bgl_tacan(ctx: &mut WriteContext, tacan: &Tacan) -> Result<()> {
    let row = TacanRow {
        ident: tacan.ident.clone(),
        name: non_empty(&tacan.name),
        region: non_empty(&tacan.region),
        airport_ident: non_empty(&tacan.airport),
        channel: tacan.channel_str(),
        range: meter_to_nm(f64::from(tacan.range)),
        mag_var: Some(f64::from(tacan.magvar)),
        dme_only: tacan.dme_only,
        dme: tacan.dme.as_ref().map(dme_row),
        altitude: meter_to_feet(tacan.position.altitude),
        position: Point::new(tacan.position.lon, tacan.position.lat),
    };
    insert_tacan(ctx, &row)?;
    Ok(())
}

pub fn write_bgl_ndb(ctx: &mut WriteContext, ndb: &Ndb) -> Result<()> {
    let row = NdbRow {
        ident: ndb.ident.clone(),
        name: non_empty(&ndb.name),
        region: non_empty(&ndb.region),
        airport_ident: non_empty(&ndb.airport),
        ndb_type: ndb.type_str().to_string(),
        frequency: ndb.frequency,
        range: meter_to_nm(f64::from(ndb.range)),
        mag_var: Some(f64::from(ndb.magvar)),
        altitude: meter_to_feet(ndb.position.altitude),
        position: Point::new(ndb.position.lon, ndb.position.lat),
    };
    insert_ndb(ctx, &row)?;
    Ok(())
}

pub fn write_bgl_marker(ctx: &mut WriteContext, marker: &Marker) -> Result<()> {
    let row = MarkerRow {
        ident: non_empty(&marker.ident),
        region: non_empty(&marker.region),
        marker_type: marker.type_str().to_string(),
        heading: Some(f64::from(marker.heading)),
        altitude: meter_to_feet(marker.position.altitude),
        position: Point::new(marker.position.lon, marker.position.lat),
    };
    insert_marker(ctx, &row)?;
    Ok(())
}

/// Route neighbours use the fix type codes of procedure legs.
fn neighbor_row(n: &RouteNeighbor) -> AirwayNeighborRow {
    AirwayNeighborRow {
        fix_type: match n.fix_type {
            2 => "V",
            3 => "N",
            _ => "W",
        }
        .to_string(),
        ident: n.ident.clone(),
        region: non_empty(&n.region),
        minimum_altitude: (n.min_altitude > 0.0).then(|| meter_to_feet(f64::from(n.min_altitude))),
    }
}

/// Writes a waypoint and its airway entries. Terminal waypoints pass the
/// id and ident of their airport.
pub fn write_bgl_waypoint(ctx: &mut WriteContext, wp: &Waypoint, airport: Option<(i64, &str)>) -> Result<()> {
    let row = WaypointRow {
        ident: wp.ident.clone(),
        name: None,
        region: non_empty(&wp.region),
        airport_id: airport.map(|a| a.0).or_else(|| ctx.index.airport_id(&wp.airport)),
        airport_ident: airport.map(|a| a.1.to_string()).or_else(|| non_empty(&wp.airport)),
        waypoint_type: wp.type_str().to_string(),
        arinc_type: None,
        num_victor_airway: wp.num_victor_airways(),
        num_jet_airway: wp.num_jet_airways(),
        mag_var: Some(f64::from(wp.magvar)),
        position: Point::new(wp.position.lon, wp.position.lat),
    };
    let waypoint_id = insert_waypoint(ctx, &row)?;

    if ctx.is_included(navdata_schema::NavDbObjectType::Airway) {
        for route in &wp.routes {
            let point = AirwayPointRow {
                name: route.name.clone(),
                airway_type: route.type_str().to_string(),
                next: route.next.as_ref().map(neighbor_row),
                previous: route.previous.as_ref().map(neighbor_row),
            };
            insert_airway_point(ctx, waypoint_id, &point)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::testutil::{count, test_context};
    use bgl_reader::nav::{AirwaySegment, Dme, IlsVorType, NavHeader};
    use bgl_reader::BglPosition;

    #[test]
    fn vor_units() {
        let (conn, options) = test_context();
        let mut ctx = WriteContext::new(&conn, &options);
        let vor = Vor {
            header: NavHeader {
                nav_type: IlsVorType::High,
                dme_only: false,
                backcourse: false,
                position: BglPosition::new(-122.31, 47.43, 100.0),
                frequency: 116_800,
                range: 240_760.0,
                magvar: 16.0,
                ident: "SEA".into(),
                region: "K1".into(),
                airport: String::new(),
            },
            name: "SEATTLE".into(),
            dme: Some(Dme { position: BglPosition::new(-122.31, 47.43, 100.0), range: 0.0 }),
        };
        write_bgl_vor(&mut ctx, &vor).unwrap();
        let (range, altitude, freq, dme_lonx): (i64, i64, i64, Option<f64>) = conn
            .query_row("SELECT range, altitude, frequency, dme_lonx FROM vor", [], |r| {
                Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?))
            })
            .unwrap();
        assert_eq!(range, 130);
        assert_eq!(altitude, 328);
        assert_eq!(freq, 116_800);
        assert!(dme_lonx.is_some());
    }

    #[test]
    fn waypoint_with_airway_entries() {
        let (conn, options) = test_context();
        let mut ctx = WriteContext::new(&conn, &options);
        let wp = Waypoint {
            waypoint_type: 1,
            position: BglPosition::new(-122.2, 47.5, 0.0),
            ident: "SUMMA".into(),
            region: "K1".into(),
            routes: vec![AirwaySegment {
                route_type: 1,
                name: "V4".into(),
                next: Some(RouteNeighbor { fix_type: 2, ident: "SEA".into(), region: "K1".into(), min_altitude: 1524.0 }),
                previous: None,
            }],
            ..Waypoint::default()
        };
        write_bgl_waypoint(&mut ctx, &wp, None).unwrap();
        assert_eq!(count(&conn, "waypoint"), 1);
        let (next_type, min_alt): (String, i64) = conn
            .query_row("SELECT next_type, next_minimum_altitude FROM airway_point", [], |r| Ok((r.get(0)?, r.get(1)?)))
            .unwrap();
        assert_eq!(next_type, "V");
        assert_eq!(min_alt, 5000);
        let victor: i64 = conn.query_row("SELECT num_victor_airway FROM waypoint", [], |r| r.get(0)).unwrap();
        assert_eq!(victor, 1);
    }
}
