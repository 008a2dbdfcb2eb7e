//! Airports with runways, parkings, starts, frequencies and helipads.
//!
//! BGL and apt.dat airports are both converted to [`AirportData`] and
//! written by [`write_airport`], which also computes the summary columns.

use bgl_reader::ap::runway::{surface_to_str, Runway, RunwayEnd, Vasi};
use bgl_reader::ap::Airport;
use geo::Point;
use navdata_schema::NavDbObjectType;
use rusqlite::params;

use super::approach::{bgl_procedures, write_procedure};
use super::ids::Table;
use super::namelist::NamelistLookup;
use super::nav;
use super::WriteContext;
use crate::error::Result;
use crate::fsutil;
use crate::geometry::{endpoint, meter_to_feet, opposed_course, Rect};

// ── Rows ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct AirportRow {
    pub ident: String,
    pub icao: Option<String>,
    pub iata: Option<String>,
    pub faa: Option<String>,
    pub name: String,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub region: Option<String>,
    pub fuel_flags: u32,
    pub has_tower: bool,
    pub is_closed: bool,
    pub is_military: bool,
    pub is_addon: bool,
    pub is_3d: bool,
    pub num_aprons: usize,
    pub num_taxi_paths: usize,
    pub num_jetways: usize,
    pub rating: i32,
    pub mag_var: Option<f64>,
    pub tower_position: Option<Point<f64>>,
    pub tower_altitude: Option<f64>,
    pub transition_altitude: Option<f64>,
    /// Feet.
    pub altitude: f64,
    pub position: Point<f64>,
}

#[derive(Debug, Clone, Default)]
pub struct RunwayEndRow {
    pub name: String,
    /// Feet.
    pub offset_threshold: f64,
    pub blast_pad: f64,
    pub overrun: f64,
    pub left_vasi: Option<(String, f64)>,
    pub right_vasi: Option<(String, f64)>,
    pub app_light_system: Option<String>,
    pub has_end_lights: bool,
    pub has_reils: bool,
    pub has_closed_markings: bool,
    pub has_stol_markings: bool,
    pub is_takeoff: bool,
    pub is_landing: bool,
    /// `L` or `R`.
    pub pattern: Option<String>,
    pub ils_ident: Option<String>,
    pub heading: f64,
    pub position: Point<f64>,
}

#[derive(Debug, Clone, Default)]
pub struct RunwayRow {
    pub surface: String,
    pub length: f64,
    pub width: f64,
    pub heading: f64,
    pub pattern_altitude: Option<f64>,
    pub marking_flags: u16,
    pub edge_light: Option<String>,
    pub center_light: Option<String>,
    pub has_center_red: bool,
    pub altitude: f64,
    pub position: Point<f64>,
    pub primary: RunwayEndRow,
    pub secondary: RunwayEndRow,
}

const HARD_SURFACES: [&str; 7] = ["C", "A", "B", "T", "M", "BR", "TR"];

impl RunwayRow {
    pub fn is_water(&self) -> bool {
        self.surface == "W"
    }

    pub fn is_hard(&self) -> bool {
        HARD_SURFACES.contains(&self.surface.as_str())
    }

    pub fn is_lighted(&self) -> bool {
        self.edge_light.is_some()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ParkingRow {
    pub parking_type: String,
    pub name: Option<String>,
    pub airline_codes: Option<String>,
    pub number: i32,
    pub suffix: Option<String>,
    /// Feet.
    pub radius: Option<f64>,
    pub heading: Option<f64>,
    pub has_jetway: bool,
    pub pushback: Option<String>,
    pub position: Point<f64>,
}

impl ParkingRow {
    /// BGL `GS`, `GM`, `GH` and X-Plane `G`.
    pub fn is_gate(&self) -> bool {
        self.parking_type.starts_with('G') || self.parking_type == "DGA"
    }

    /// BGL `RGA*` and X-Plane tie-downs.
    pub fn is_ramp_ga(&self) -> bool {
        self.parking_type.starts_with("RGA") || self.parking_type == "T"
    }
}

#[derive(Debug, Clone, Default)]
pub struct StartRow {
    pub runway_name: Option<String>,
    pub start_type: String,
    pub heading: Option<f64>,
    pub altitude: Option<f64>,
    pub position: Point<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComRow {
    pub com_type: String,
    /// kHz.
    pub frequency: u32,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct HelipadRow {
    pub surface: Option<String>,
    pub helipad_type: String,
    pub length: Option<f64>,
    pub width: Option<f64>,
    pub heading: Option<f64>,
    pub is_transparent: bool,
    pub is_closed: bool,
    pub altitude: Option<f64>,
    pub position: Point<f64>,
}

#[derive(Debug, Clone, Default)]
pub struct AirportData {
    pub airport: AirportRow,
    pub runways: Vec<RunwayRow>,
    pub parkings: Vec<ParkingRow>,
    pub starts: Vec<StartRow>,
    pub coms: Vec<ComRow>,
    pub helipads: Vec<HelipadRow>,
}

impl AirportData {
    fn rect(&self) -> Rect {
        let mut rect = Rect::from_point(self.airport.position);
        for rw in &self.runways {
            rect.extend(rw.primary.position);
            rect.extend(rw.secondary.position);
        }
        self.parkings.iter().for_each(|p| rect.extend(p.position));
        self.starts.iter().for_each(|s| rect.extend(s.position));
        self.helipads.iter().for_each(|h| rect.extend(h.position));
        rect
    }

    fn largest_parking_gate(&self) -> Option<&str> {
        ["GH", "GM", "GS", "G"]
            .into_iter()
            .find(|t| self.parkings.iter().any(|p| p.parking_type == *t))
    }
}

/// What to do when the airport ident was already written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnDuplicate {
    /// Delete the earlier airport with all its rows.
    Replace,
    /// Keep the earlier airport and drop this one.
    Skip,
}

// ── Writing ──────────────────────────────────────────────────────────────────

/// Writes an airport with its children. Returns `None` when skipped as a
/// duplicate.
pub fn write_airport(ctx: &mut WriteContext, data: &AirportData, on_duplicate: OnDuplicate) -> Result<Option<i64>> {
    let ap = &data.airport;
    if let Some(existing) = ctx.index.airport_id(&ap.ident) {
        match on_duplicate {
            OnDuplicate::Skip => {
                tracing::debug!("Skipping duplicate airport {} in {}", ap.ident, ctx.filename);
                return Ok(None);
            }
            OnDuplicate::Replace => {
                tracing::debug!("Airport {} replaced by {}", ap.ident, ctx.filename);
                delete_airport(ctx, existing)?;
            }
        }
    }

    let airport_id = ctx.ids.next(Table::Airport);
    ctx.index.replace_airport(&ap.ident, airport_id, ap.position);

    let write_runways = ctx.is_included(NavDbObjectType::Runway);
    let write_parkings = ctx.is_included(NavDbObjectType::Parking);
    let write_coms = ctx.is_included(NavDbObjectType::Com);
    let write_starts = ctx.is_included(NavDbObjectType::Start);
    let write_helipads = ctx.is_included(NavDbObjectType::Helipad);

    let runways: &[RunwayRow] = if write_runways { &data.runways } else { &[] };
    let parkings: &[ParkingRow] = if write_parkings { &data.parkings } else { &[] };
    let coms: &[ComRow] = if write_coms { &data.coms } else { &[] };
    let starts: &[StartRow] = if write_starts { &data.starts } else { &[] };
    let helipads: &[HelipadRow] = if write_helipads { &data.helipads } else { &[] };

    let rect = data.rect();
    let longest = runways.iter().max_by(|a, b| a.length.total_cmp(&b.length));
    let num_end_ils = runways
        .iter()
        .flat_map(|rw| [&rw.primary, &rw.secondary])
        .filter(|end| end.ils_ident.is_some())
        .count();

    ctx.conn
        .prepare_cached(
            "INSERT INTO airport
             (airport_id, file_id, ident, icao, iata, faa, name, city, state, country, region,
              fuel_flags, has_tower, is_closed, is_military, is_addon, is_3d,
              num_com, num_parking_gate, num_parking_ga_ramp, num_parking_total,
              num_runway_hard, num_runway_soft, num_runway_water, num_runway_light, num_runway_end_ils,
              num_helipad, num_starts, num_apron, num_taxi_path, num_jetway,
              longest_runway_length, longest_runway_width, longest_runway_heading, longest_runway_surface,
              largest_parking_gate, rating, scenery_local_path, bgl_filename,
              left_lonx, top_laty, right_lonx, bottom_laty, mag_var,
              tower_altitude, tower_lonx, tower_laty, transition_altitude, altitude, lonx, laty)
             VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13,?14,?15,?16,?17,?18,?19,?20,?21,?22,?23,?24,
                     ?25,?26,?27,?28,?29,?30,?31,?32,?33,?34,?35,?36,?37,?38,?39,?40,?41,?42,?43,?44,?45,?46,
                     ?47,?48,?49,?50,?51)",
        )?
        .execute(params![
            airport_id,
            ctx.file_id,
            ap.ident,
            ap.icao,
            ap.iata,
            ap.faa,
            ap.name,
            ap.city,
            ap.state,
            ap.country,
            ap.region,
            ap.fuel_flags,
            ap.has_tower,
            ap.is_closed,
            ap.is_military,
            ap.is_addon,
            ap.is_3d,
            coms.len(),
            parkings.iter().filter(|p| p.is_gate()).count(),
            parkings.iter().filter(|p| p.is_ramp_ga()).count(),
            parkings.len(),
            runways.iter().filter(|r| r.is_hard()).count(),
            runways.iter().filter(|r| !r.is_hard() && !r.is_water()).count(),
            runways.iter().filter(|r| r.is_water()).count(),
            runways.iter().filter(|r| r.is_lighted()).count(),
            num_end_ils,
            helipads.len(),
            starts.len(),
            ap.num_aprons,
            ap.num_taxi_paths,
            ap.num_jetways,
            longest.map_or(0, |r| r.length.round() as i64),
            longest.map_or(0, |r| r.width.round() as i64),
            longest.map(|r| r.heading),
            longest.map(|r| r.surface.as_str()),
            data.largest_parking_gate(),
            ap.rating,
            ctx.area.local_path,
            ctx.filename.rsplit(['/', '\\']).next(),
            rect.left,
            rect.top,
            rect.right,
            rect.bottom,
            ap.mag_var,
            ap.tower_altitude.map(|a| a.round() as i64),
            ap.tower_position.map(|p| p.x()),
            ap.tower_position.map(|p| p.y()),
            ap.transition_altitude.map(|a| a.round() as i64),
            ap.altitude.round() as i64,
            ap.position.x(),
            ap.position.y(),
        ])?;

    for rw in runways {
        write_runway(ctx, airport_id, &ap.ident, rw)?;
    }
    for p in parkings {
        let id = ctx.ids.next(Table::Parking);
        ctx.conn
            .prepare_cached(
                "INSERT INTO parking
                 (parking_id, airport_id, type, name, airline_codes, number, suffix, radius, heading,
                  has_jetway, pushback, lonx, laty)
                 VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13)",
            )?
            .execute(params![
                id,
                airport_id,
                p.parking_type,
                p.name,
                p.airline_codes,
                p.number,
                p.suffix,
                p.radius,
                p.heading,
                p.has_jetway,
                p.pushback,
                p.position.x(),
                p.position.y(),
            ])?;
    }
    for s in starts {
        let id = ctx.ids.next(Table::Start);
        let runway_end_id = s
            .runway_name
            .as_deref()
            .and_then(|rw| ctx.index.runway_end(&ap.ident, rw))
            .map(|e| e.id);
        ctx.conn
            .prepare_cached(
                "INSERT INTO start (start_id, airport_id, runway_end_id, runway_name, type, heading, altitude, lonx, laty)
                 VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9)",
            )?
            .execute(params![
                id,
                airport_id,
                runway_end_id,
                s.runway_name,
                s.start_type,
                s.heading,
                s.altitude.map(|a| a.round() as i64),
                s.position.x(),
                s.position.y(),
            ])?;
    }
    for c in coms {
        let id = ctx.ids.next(Table::Com);
        ctx.conn
            .prepare_cached("INSERT INTO com (com_id, airport_id, type, frequency, name) VALUES (?1,?2,?3,?4,?5)")?
            .execute(params![id, airport_id, c.com_type, c.frequency, c.name])?;
    }
    for h in helipads {
        let id = ctx.ids.next(Table::Helipad);
        ctx.conn
            .prepare_cached(
                "INSERT INTO helipad
                 (helipad_id, airport_id, surface, type, length, width, heading, is_transparent, is_closed,
                  altitude, lonx, laty)
                 VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12)",
            )?
            .execute(params![
                id,
                airport_id,
                h.surface,
                h.helipad_type,
                h.length.map(|v| v.round() as i64),
                h.width.map(|v| v.round() as i64),
                h.heading,
                h.is_transparent,
                h.is_closed,
                h.altitude.map(|a| a.round() as i64),
                h.position.x(),
                h.position.y(),
            ])?;
    }

    ctx.counters.airports += 1;
    Ok(Some(airport_id))
}

fn write_runway_end(ctx: &mut WriteContext, airport_ident: &str, end: &RunwayEndRow, end_type: &str, altitude: f64) -> Result<i64> {
    let id = ctx.ids.next(Table::RunwayEnd);
    ctx.conn
        .prepare_cached(
            "INSERT INTO runway_end
             (runway_end_id, name, end_type, offset_threshold, blast_pad, overrun,
              left_vasi_type, left_vasi_pitch, right_vasi_type, right_vasi_pitch, app_light_system_type,
              has_end_lights, has_reils, has_closed_markings, has_stol_markings, is_takeoff, is_landing,
              is_pattern, ils_ident, heading, altitude, lonx, laty)
             VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13,?14,?15,?16,?17,?18,?19,?20,?21,?22,?23)",
        )?
        .execute(params![
            id,
            end.name,
            end_type,
            end.offset_threshold.round() as i64,
            end.blast_pad.round() as i64,
            end.overrun.round() as i64,
            end.left_vasi.as_ref().map(|v| v.0.as_str()),
            end.left_vasi.as_ref().map(|v| v.1),
            end.right_vasi.as_ref().map(|v| v.0.as_str()),
            end.right_vasi.as_ref().map(|v| v.1),
            end.app_light_system,
            end.has_end_lights,
            end.has_reils,
            end.has_closed_markings,
            end.has_stol_markings,
            end.is_takeoff,
            end.is_landing,
            end.pattern,
            end.ils_ident,
            end.heading,
            altitude.round() as i64,
            end.position.x(),
            end.position.y(),
        ])?;
    ctx.index.add_runway_end(airport_ident, &end.name, id, end.position);
    Ok(id)
}

fn write_runway(ctx: &mut WriteContext, airport_id: i64, airport_ident: &str, rw: &RunwayRow) -> Result<()> {
    let primary_id = write_runway_end(ctx, airport_ident, &rw.primary, "P", rw.altitude)?;
    let secondary_id = write_runway_end(ctx, airport_ident, &rw.secondary, "S", rw.altitude)?;
    let id = ctx.ids.next(Table::Runway);
    ctx.conn
        .prepare_cached(
            "INSERT INTO runway
             (runway_id, airport_id, primary_end_id, secondary_end_id, surface, length, width, heading,
              pattern_altitude, marking_flags, edge_light, center_light, has_center_red,
              primary_lonx, primary_laty, secondary_lonx, secondary_laty, altitude, lonx, laty)
             VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13,?14,?15,?16,?17,?18,?19,?20)",
        )?
        .execute(params![
            id,
            airport_id,
            primary_id,
            secondary_id,
            rw.surface,
            rw.length.round() as i64,
            rw.width.round() as i64,
            rw.heading,
            rw.pattern_altitude.map(|a| a.round() as i64),
            rw.marking_flags,
            rw.edge_light,
            rw.center_light,
            rw.has_center_red,
            rw.primary.position.x(),
            rw.primary.position.y(),
            rw.secondary.position.x(),
            rw.secondary.position.y(),
            rw.altitude.round() as i64,
            rw.position.x(),
            rw.position.y(),
        ])?;
    Ok(())
}

/// Removes an airport with everything that references it.
pub fn delete_airport(ctx: &mut WriteContext, airport_id: i64) -> Result<()> {
    ctx.conn.execute_batch(&format!(
        "DELETE FROM approach_leg WHERE approach_id IN (SELECT approach_id FROM approach WHERE airport_id = {airport_id});
         DELETE FROM transition_leg WHERE transition_id IN
           (SELECT t.transition_id FROM transition t JOIN approach a ON a.approach_id = t.approach_id
            WHERE a.airport_id = {airport_id});
         DELETE FROM transition WHERE approach_id IN (SELECT approach_id FROM approach WHERE airport_id = {airport_id});
         DELETE FROM approach WHERE airport_id = {airport_id};
         DELETE FROM runway_end WHERE runway_end_id IN
           (SELECT primary_end_id FROM runway WHERE airport_id = {airport_id}
            UNION SELECT secondary_end_id FROM runway WHERE airport_id = {airport_id});
         DELETE FROM runway WHERE airport_id = {airport_id};
         DELETE FROM parking WHERE airport_id = {airport_id};
         DELETE FROM start WHERE airport_id = {airport_id};
         DELETE FROM com WHERE airport_id = {airport_id};
         DELETE FROM helipad WHERE airport_id = {airport_id};
         DELETE FROM airport WHERE airport_id = {airport_id};"
    ))?;
    ctx.counters.airports = ctx.counters.airports.saturating_sub(1);
    Ok(())
}

// ── BGL conversion ───────────────────────────────────────────────────────────

pub fn vasi_type_to_str(vasi_type: u16) -> &'static str {
    match vasi_type {
        1  => "VASI21",
        2  => "VASI31",
        3  => "VASI22",
        4  => "VASI32",
        5  => "VASI23",
        6  => "VASI33",
        7  => "PAPI2",
        8  => "PAPI4",
        9  => "TRICOLOR",
        10 => "PVASI",
        11 => "TVASI",
        12 => "BALL",
        13 => "APAP",
        _  => "UNKN",
    }
}

fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}

fn bgl_vasi(vasi: &Option<Vasi>) -> Option<(String, f64)> {
    vasi.as_ref().map(|v| (vasi_type_to_str(v.vasi_type).to_string(), f64::from(v.pitch)))
}

fn bgl_runway_end(end: &RunwayEnd, heading: f64, position: Point<f64>) -> RunwayEndRow {
    RunwayEndRow {
        name: end.name.clone(),
        offset_threshold: meter_to_feet(f64::from(end.offset_threshold)),
        blast_pad: meter_to_feet(f64::from(end.blast_pad)),
        overrun: meter_to_feet(f64::from(end.overrun)),
        left_vasi: bgl_vasi(&end.left_vasi),
        right_vasi: bgl_vasi(&end.right_vasi),
        app_light_system: end.approach_lights.map(str::to_string),
        has_end_lights: end.end_lights,
        has_reils: end.reils,
        has_closed_markings: end.closed_markings,
        has_stol_markings: end.stol_markings,
        is_takeoff: end.takeoff,
        is_landing: end.landing,
        pattern: Some(if end.pattern_right { "R" } else { "L" }.to_string()),
        ils_ident: non_empty(&end.ils_ident),
        heading,
        position,
    }
}

pub fn bgl_runway(rw: &Runway) -> RunwayRow {
    let center = Point::new(rw.position.lon, rw.position.lat);
    let heading = f64::from(rw.heading);
    let half = f64::from(rw.length) / 2.0;
    let primary_pos = endpoint(center, half, opposed_course(heading));
    let secondary_pos = endpoint(center, half, heading);
    RunwayRow {
        surface: surface_to_str(rw.surface).to_string(),
        length: meter_to_feet(f64::from(rw.length)),
        width: meter_to_feet(f64::from(rw.width)),
        heading,
        pattern_altitude: (rw.pattern_altitude > 0.0).then(|| meter_to_feet(f64::from(rw.pattern_altitude))),
        marking_flags: rw.marking_flags,
        edge_light: rw.edge_light.map(str::to_string),
        center_light: rw.center_light.map(str::to_string),
        has_center_red: rw.center_red,
        altitude: meter_to_feet(rw.position.altitude),
        position: center,
        primary: bgl_runway_end(&rw.primary, heading, primary_pos),
        secondary: bgl_runway_end(&rw.secondary, opposed_course(heading), secondary_pos),
    }
}

pub fn bgl_airport_data(ctx: &WriteContext, ap: &Airport, names: &NamelistLookup) -> AirportData {
    let entry = names.get(&ap.ident);
    let name = if ap.name.trim().is_empty() {
        entry.map(|e| e.airport_name.clone()).unwrap_or_default()
    } else {
        ap.name.clone()
    };
    let msfs = ap.structure.is_some_and(|s| s.is_msfs());
    let all_ends_closed = !ap.runways.is_empty()
        && ap.runways.iter().all(|rw| rw.primary.closed_markings && rw.secondary.closed_markings);

    let airport = AirportRow {
        ident: ap.ident.clone(),
        icao: Some(ap.ident.clone()),
        name: name.clone(),
        city: entry.and_then(|e| non_empty(&e.city_name)),
        state: entry.and_then(|e| non_empty(&e.state_name)),
        country: entry.and_then(|e| non_empty(&e.country_name)),
        region: non_empty(&ap.region),
        fuel_flags: ap.fuel_flags,
        has_tower: ap.has_tower(),
        is_closed: fsutil::is_name_closed(&name) || all_ends_closed,
        is_military: fsutil::is_name_military(&name),
        is_addon: ctx.area.addon,
        num_aprons: ap.num_aprons,
        num_taxi_paths: ap.num_taxi_paths,
        num_jetways: ap.num_jetways,
        rating: fsutil::calculate_airport_rating(
            ctx.area.addon,
            ap.has_tower(),
            msfs,
            ap.num_taxi_paths,
            ap.parkings.len(),
            ap.num_aprons,
        ),
        mag_var: Some(f64::from(ap.magvar)),
        tower_position: ap.tower_position.map(|p| Point::new(p.lon, p.lat)),
        tower_altitude: ap.tower_position.map(|p| meter_to_feet(p.altitude)),
        altitude: meter_to_feet(ap.position.altitude),
        position: Point::new(ap.position.lon, ap.position.lat),
        ..AirportRow::default()
    };

    AirportData {
        airport,
        runways: ap.runways.iter().map(bgl_runway).collect(),
        parkings: ap
            .parkings
            .iter()
            .map(|p| ParkingRow {
                parking_type: p.type_str().to_string(),
                name: Some(p.name_str().to_string()),
                airline_codes: (!p.airline_codes.is_empty()).then(|| p.airline_codes.join(",")),
                number: p.number as i32,
                suffix: Some(p.suffix_str()).filter(|s| s != "NONE"),
                radius: Some(meter_to_feet(f64::from(p.radius))),
                heading: Some(f64::from(p.heading)),
                has_jetway: p.jetway,
                pushback: Some(p.push_back_str().to_string()),
                position: Point::new(p.position.lon, p.position.lat),
            })
            .collect(),
        starts: ap
            .starts
            .iter()
            .map(|s| StartRow {
                runway_name: non_empty(&s.runway_name),
                start_type: s.start_type.to_string(),
                heading: Some(f64::from(s.heading)),
                altitude: Some(meter_to_feet(s.position.altitude)),
                position: Point::new(s.position.lon, s.position.lat),
            })
            .collect(),
        coms: ap
            .coms
            .iter()
            .map(|c| ComRow { com_type: c.type_str().to_string(), frequency: c.frequency, name: non_empty(&c.name) })
            .collect(),
        helipads: ap
            .helipads
            .iter()
            .map(|h| HelipadRow {
                surface: Some(surface_to_str(h.surface).to_string()),
                helipad_type: h.type_str().to_string(),
                length: Some(meter_to_feet(f64::from(h.length))),
                width: Some(meter_to_feet(f64::from(h.width))),
                heading: Some(f64::from(h.heading)),
                is_transparent: h.transparent,
                is_closed: h.closed,
                altitude: Some(meter_to_feet(h.position.altitude)),
                position: Point::new(h.position.lon, h.position.lat),
            })
            .collect(),
    }
}

/// Writes a BGL airport with its procedures and terminal waypoints.
/// Airports of higher layers replace earlier ones with the same ident.
pub fn write_bgl_airport(ctx: &mut WriteContext, ap: &Airport, names: &NamelistLookup) -> Result<()> {
    let write_procedures = ctx.is_included(NavDbObjectType::Approach);

    let airport_id = if ap.is_dummy() {
        // Navdata packages only add procedures to airports of the base scenery
        match ctx.index.airport_id(&ap.ident) {
            Some(id) => id,
            None => {
                tracing::debug!("No airport for navdata airport {} in {}", ap.ident, ctx.filename);
                return Ok(());
            }
        }
    } else {
        if !ap.position.is_valid() {
            tracing::warn!("Airport {} has an invalid position in {}", ap.ident, ctx.filename);
            return Ok(());
        }
        let data = bgl_airport_data(ctx, ap, names);
        match write_airport(ctx, &data, OnDuplicate::Replace)? {
            Some(id) => id,
            None => return Ok(()),
        }
    };

    if ap.is_dummy() && write_procedures {
        // Replace procedures of the base airport
        ctx.conn.execute_batch(&format!(
            "DELETE FROM approach_leg WHERE approach_id IN (SELECT approach_id FROM approach WHERE airport_id = {airport_id});
             DELETE FROM transition_leg WHERE transition_id IN
               (SELECT t.transition_id FROM transition t JOIN approach a ON a.approach_id = t.approach_id
                WHERE a.airport_id = {airport_id});
             DELETE FROM transition WHERE approach_id IN (SELECT approach_id FROM approach WHERE airport_id = {airport_id});
             DELETE FROM approach WHERE airport_id = {airport_id};"
        ))?;
    }

    if write_procedures {
        for procedure in bgl_procedures(ap) {
            write_procedure(ctx, airport_id, &ap.ident, &procedure)?;
        }
    }

    if ctx.is_included(NavDbObjectType::Waypoint) {
        for wp in &ap.waypoints {
            nav::write_bgl_waypoint(ctx, wp, Some((airport_id, ap.ident.as_str())))?;
        }
    }
    Ok(())
}
