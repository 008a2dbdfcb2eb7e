//! `apt.dat` airports.
//!
//! An airport starts with a `1`, `16` or `17` header line and collects all
//! following lines until the next header. It is written when complete.
//! Airports already loaded from a file with higher priority are skipped.

use geo::Point;
use navdata_schema::NavDbObjectType;

use super::{invalid_line, non_empty, XpLine, XpReader};
use crate::error::Result;
use crate::fsutil::{calculate_airport_rating_xp, is_name_closed, is_name_military, round_com_frequency};
use crate::geometry::{bearing, distance_meter, endpoint, is_valid_position, meter_to_feet, opposed_course, Rect};
use crate::writer::airport::{
    write_airport, AirportData, AirportRow, ComRow, HelipadRow, OnDuplicate, ParkingRow, RunwayEndRow, RunwayRow, StartRow,
};
use crate::writer::WriteContext;

mod code {
    pub const LAND_AIRPORT: u32 = 1;
    pub const TOWER: u32 = 14;
    pub const STARTUP: u32 = 15;
    pub const SEAPLANE_BASE: u32 = 16;
    pub const HELIPORT: u32 = 17;
    pub const LAND_RUNWAY: u32 = 100;
    pub const WATER_RUNWAY: u32 = 101;
    pub const HELIPAD: u32 = 102;
    pub const PAVEMENT: u32 = 110;
    pub const TAXI_EDGE: u32 = 1202;
    pub const PARKING: u32 = 1300;
    pub const PARKING_OPS: u32 = 1301;
    pub const METADATA: u32 = 1302;
}

fn surface(code: u32) -> &'static str {
    match code {
        1 | 20..=38 => "A",
        2 | 50..=57 => "C",
        3 => "G",
        4 => "D",
        5 => "GR",
        12 => "SA",
        13 => "W",
        14 => "S",
        15 => "TR",
        _ => "UNKNOWN",
    }
}

fn edge_light(code: u32) -> Option<String> {
    match code {
        1 => Some("L"),
        2 => Some("M"),
        3 => Some("H"),
        _ => None,
    }
    .map(str::to_string)
}

fn approach_lights(code: u32) -> Option<&'static str> {
    match code {
        1 => Some("ALSF1"),
        2 => Some("ALSF2"),
        3 => Some("CALVERT"),
        4 => Some("CALVERT2"),
        5 => Some("SSALR"),
        6 => Some("SSALF"),
        7 => Some("SALS"),
        8 => Some("MALSR"),
        9 => Some("MALSF"),
        10 => Some("MALS"),
        11 => Some("ODALS"),
        12 => Some("RAIL"),
        _ => None,
    }
}

fn parking_type(name: &str) -> &'static str {
    match name {
        "gate" => "G",
        "hangar" => "H",
        "tie_down" => "T",
        _ => "M",
    }
}

/// Parking radius in feet from the ICAO aircraft size category.
fn parking_radius(category: &str) -> Option<f64> {
    let wingspan_m = match category {
        "A" => 15.0,
        "B" => 24.0,
        "C" => 36.0,
        "D" => 52.0,
        "E" => 65.0,
        "F" => 80.0,
        _ => return None,
    };
    Some(meter_to_feet(wingspan_m) / 2.0)
}

fn com_type(code: u32) -> &'static str {
    match code {
        50 => "A",
        51 => "U",
        52 => "C",
        53 => "G",
        54 => "T",
        55 => "AP",
        _ => "D",
    }
}

// ── Line decoding ────────────────────────────────────────────────────────────

fn runway_end(line: &XpLine, base: usize, heading: f64, position: Point<f64>) -> Option<RunwayEndRow> {
    Some(RunwayEndRow {
        name: line.at(base).to_string(),
        offset_threshold: meter_to_feet(line.parse(base + 3)?),
        blast_pad: meter_to_feet(line.parse(base + 4)?),
        app_light_system: approach_lights(line.parse(base + 6)?).map(str::to_string),
        has_reils: line.parse::<u32>(base + 8)? > 0,
        is_takeoff: true,
        is_landing: true,
        heading,
        position,
        ..RunwayEndRow::default()
    })
}

/// Runway between two ends with the center and heading computed from the
/// end positions.
fn runway(primary: RunwayEndRow, secondary: RunwayEndRow, width_m: f64, surface: &str, altitude: f64) -> RunwayRow {
    let length_m = distance_meter(primary.position, secondary.position);
    RunwayRow {
        surface: surface.to_string(),
        length: meter_to_feet(length_m),
        width: meter_to_feet(width_m),
        heading: primary.heading,
        altitude,
        position: endpoint(primary.position, length_m / 2.0, primary.heading),
        primary,
        secondary,
        ..RunwayRow::default()
    }
}

// 100 width surface shoulder smoothness centerline edge signs
//     then per end: name lat lon displaced blastpad markings lights tdz reil
fn land_runway(line: &XpLine, altitude: f64) -> Option<RunwayRow> {
    if line.len() < 26 {
        return None;
    }
    let p1 = line.position(9, 10)?;
    let p2 = line.position(18, 19)?;
    let heading = bearing(p1, p2);
    let primary = runway_end(line, 8, heading, p1)?;
    let secondary = runway_end(line, 17, opposed_course(heading), p2)?;
    let mut rw = runway(primary, secondary, line.parse(1)?, surface(line.parse(2)?), altitude);
    rw.center_light = (line.at(5) == "1").then(|| "M".to_string());
    rw.edge_light = edge_light(line.parse(6)?);
    Some(rw)
}

// 101 width buoys name lat lon name lat lon
fn water_runway(line: &XpLine, altitude: f64) -> Option<RunwayRow> {
    let p1 = line.position(4, 5)?;
    let p2 = line.position(7, 8)?;
    let heading = bearing(p1, p2);
    let end = |name: &str, heading, position| RunwayEndRow {
        name: name.to_string(),
        is_takeoff: true,
        is_landing: true,
        heading,
        position,
        ..RunwayEndRow::default()
    };
    let primary = end(line.at(3), heading, p1);
    let secondary = end(line.at(6), opposed_course(heading), p2);
    Some(runway(primary, secondary, line.parse(1)?, "W", altitude))
}

// 102 designator lat lon heading length width surface ...
fn helipad(line: &XpLine, altitude: f64) -> Option<HelipadRow> {
    Some(HelipadRow {
        surface: Some(surface(line.parse(7)?).to_string()),
        helipad_type: "H".to_string(),
        length: line.parse(5).map(meter_to_feet),
        width: line.parse(6).map(meter_to_feet),
        heading: line.parse(4),
        is_transparent: line.at(7) == "15",
        altitude: Some(altitude),
        position: line.position(2, 3)?,
        ..HelipadRow::default()
    })
}

// ── Reader ───────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct PendingAirport {
    data: AirportData,
    is_3d: bool,
    datum_lat: Option<f64>,
    datum_lon: Option<f64>,
}

impl PendingAirport {
    /// Datum from the metadata or the center of all runways, helipads and
    /// parking spots.
    fn position(&self) -> Option<Point<f64>> {
        if let (Some(lon), Some(lat)) = (self.datum_lon, self.datum_lat) {
            if is_valid_position(lon, lat) {
                return Some(Point::new(lon, lat));
            }
        }
        let d = &self.data;
        let points = d
            .runways
            .iter()
            .flat_map(|rw| [rw.primary.position, rw.secondary.position])
            .chain(d.helipads.iter().map(|h| h.position))
            .chain(d.parkings.iter().map(|p| p.position));
        Rect::from_points(points).map(|r| Point::new((r.left + r.right) / 2.0, (r.top + r.bottom) / 2.0))
    }

    fn metadata(&mut self, key: &str, value: String) {
        let ap = &mut self.data.airport;
        match key {
            "city" => ap.city = Some(value),
            "state" => ap.state = Some(value),
            "country" => ap.country = Some(value),
            "region_code" => ap.region = Some(value),
            "icao_code" => ap.icao = Some(value),
            "iata_code" => ap.iata = Some(value),
            "faa_code" => ap.faa = Some(value),
            "transition_alt" => ap.transition_altitude = value.parse().ok(),
            "datum_lat" => self.datum_lat = value.parse().ok(),
            "datum_lon" => self.datum_lon = value.parse().ok(),
            "gui_label" => self.is_3d = value.eq_ignore_ascii_case("3D"),
            _ => {}
        }
    }
}

#[derive(Debug, Default)]
pub struct XpAirportReader {
    /// Airports of custom scenery packs.
    is_addon: bool,
    airport: Option<PendingAirport>,
    /// Ignore lines up to the next header.
    skipping: bool,
}

impl XpAirportReader {
    pub fn new(is_addon: bool) -> Self {
        Self { is_addon, ..Self::default() }
    }

    fn start(&mut self, ctx: &mut WriteContext, line: &XpLine) {
        let ident = line.at(4);
        if ident.is_empty() {
            invalid_line(ctx, line, "airport without ident");
            self.skipping = true;
            return;
        }
        self.skipping = !ctx.is_included(NavDbObjectType::Airport) || ctx.index.airport_id(ident).is_some();
        if self.skipping {
            tracing::debug!("Skipping airport {ident} in {}", ctx.filename);
            return;
        }

        let Some(altitude) = line.parse(1) else {
            invalid_line(ctx, line, "invalid airport elevation");
            self.skipping = true;
            return;
        };
        let name = line.rest(5);
        let airport = AirportRow {
            ident: ident.to_string(),
            has_tower: line.at(2) == "1",
            is_closed: is_name_closed(&name),
            is_military: is_name_military(&name),
            is_addon: self.is_addon,
            altitude,
            name,
            ..AirportRow::default()
        };
        self.airport = Some(PendingAirport { data: AirportData { airport, ..AirportData::default() }, ..PendingAirport::default() });
    }

    fn write_pending(&mut self, ctx: &mut WriteContext) -> Result<()> {
        let Some(mut pending) = self.airport.take() else {
            return Ok(());
        };
        let Some(position) = pending.position() else {
            tracing::warn!("Airport {} without position in {}", pending.data.airport.ident, ctx.filename);
            ctx.counters.errors += 1;
            return Ok(());
        };

        let is_3d = pending.is_3d;
        let data = &mut pending.data;
        data.airport.position = position;
        data.airport.is_3d = is_3d;
        data.airport.rating = calculate_airport_rating_xp(
            data.airport.is_addon,
            is_3d,
            data.airport.has_tower,
            data.airport.num_taxi_paths,
            data.parkings.len(),
            data.airport.num_aprons,
        );

        // Runway ends and helipads are the start positions
        let runway_starts: Vec<StartRow> = data
            .runways
            .iter()
            .flat_map(|rw| [&rw.primary, &rw.secondary])
            .map(|end| StartRow {
                runway_name: Some(end.name.clone()),
                start_type: "R".to_string(),
                heading: Some(end.heading),
                altitude: Some(data.airport.altitude),
                position: end.position,
            })
            .collect();
        let helipad_starts: Vec<StartRow> = data
            .helipads
            .iter()
            .map(|h| StartRow {
                start_type: "H".to_string(),
                heading: h.heading,
                altitude: h.altitude,
                position: h.position,
                ..StartRow::default()
            })
            .collect();
        data.starts.extend(runway_starts);
        data.starts.extend(helipad_starts);

        write_airport(ctx, data, OnDuplicate::Skip)?;
        Ok(())
    }
}

impl XpReader for XpAirportReader {
    fn read(&mut self, ctx: &mut WriteContext, line: &XpLine) -> Result<()> {
        let Some(row_code) = line.parse::<u32>(0) else {
            invalid_line(ctx, line, "invalid row code");
            return Ok(());
        };
        if matches!(row_code, code::LAND_AIRPORT | code::SEAPLANE_BASE | code::HELIPORT) {
            self.write_pending(ctx)?;
            self.start(ctx, line);
            return Ok(());
        }
        if self.skipping {
            return Ok(());
        }
        let Some(pending) = self.airport.as_mut() else {
            return Ok(());
        };
        let altitude = pending.data.airport.altitude;

        match row_code {
            code::LAND_RUNWAY => match land_runway(line, altitude) {
                Some(rw) => pending.data.runways.push(rw),
                None => invalid_line(ctx, line, "invalid runway"),
            },
            code::WATER_RUNWAY => match water_runway(line, altitude) {
                Some(rw) => pending.data.runways.push(rw),
                None => invalid_line(ctx, line, "invalid water runway"),
            },
            code::HELIPAD => match helipad(line, altitude) {
                Some(h) => pending.data.helipads.push(h),
                None => invalid_line(ctx, line, "invalid helipad"),
            },
            code::PARKING | code::STARTUP => {
                // 15 lat lon heading name
                // 1300 lat lon heading type aircraft name
                let (parking_type, name) = if row_code == code::PARKING {
                    (parking_type(line.at(4)), line.rest(6))
                } else {
                    ("M", line.rest(4))
                };
                match line.position(1, 2) {
                    Some(position) => pending.data.parkings.push(ParkingRow {
                        parking_type: parking_type.to_string(),
                        name: non_empty(&name),
                        heading: line.parse(3),
                        position,
                        ..ParkingRow::default()
                    }),
                    None => invalid_line(ctx, line, "invalid parking position"),
                }
            }
            code::PARKING_OPS => {
                if let Some(parking) = pending.data.parkings.last_mut() {
                    parking.radius = parking_radius(line.at(1));
                    parking.airline_codes = non_empty(line.at(3));
                }
            }
            code::TOWER => {
                pending.data.airport.tower_position = line.position(1, 2);
                pending.data.airport.tower_altitude = line.parse::<f64>(3).map(|h| altitude + h);
            }
            code::PAVEMENT => pending.data.airport.num_aprons += 1,
            code::TAXI_EDGE => {
                if line.at(4) != "runway" {
                    pending.data.airport.num_taxi_paths += 1;
                }
            }
            code::METADATA => pending.metadata(line.at(1), line.rest(2)),
            50..=56 | 1050..=1056 => {
                let kind = if row_code >= 1000 { row_code - 1000 } else { row_code };
                // Old style frequencies are given in 10 kHz
                let frequency = line.parse::<u32>(1).and_then(|f| if row_code >= 1000 { Some(f) } else { f.checked_mul(10) });
                match frequency {
                    Some(frequency) => pending.data.coms.push(ComRow {
                        com_type: com_type(kind).to_string(),
                        frequency: round_com_frequency(frequency),
                        name: non_empty(&line.rest(2)),
                    }),
                    None => invalid_line(ctx, line, "invalid frequency"),
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn finish(&mut self, ctx: &mut WriteContext) -> Result<()> {
        self.write_pending(ctx)
    }

    fn reset(&mut self) {
        self.airport = None;
        self.skipping = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::testutil::{count, test_context};
    use crate::xplane::{read_file, testutil::data_file, XpFormat};

    const APT: &str = "I
1100 Generated by WorldEditor

1    433 1 0 KSEA Seattle Tacoma Intl
1302 city Seattle
1302 country United States
1302 datum_lat 47.449888889
1302 datum_lon -122.311777778
1302 icao_code KSEA
1302 gui_label 3D
100 45.72 1 0 0.25 1 2 1 16L 47.46379605 -122.30774943 0.00 0.00 3 12 0 1 34R 47.43110805 -122.30793324 0.00 0.00 3 8 1 0
102 H1 47.4400 -122.3000 90.0 20.0 20.0 1 0 0 0.25 0
110 1 0.25 0.00 Apron
1202 10 11 twoway taxiway_E A
1202 11 12 twoway runway 16L/34R
1300 47.44512 -122.30147 82.5 gate jets A1
1301 D airline UAL,DAL
1053 121700 SEA GND
54 11990 SEA TWR
14 47.445 -122.309 200 0 Tower

16   0 0 0 W55 Kenmore Air Harbor
101 30 1 16 47.7600 -122.2600 34 47.7500 -122.2550
1    100 0 0 KSEA Duplicate
100 45.72 1 0 0.25 1 2 1 16L 47.46 -122.30 0.00 0.00 3 12 0 1 34R 47.43 -122.30 0.00 0.00 3 8 1 0
99
";

    #[test]
    fn airports_with_children_are_written() {
        let (conn, options) = test_context();
        let mut ctx = WriteContext::new(&conn, &options);
        let dir = tempfile::tempdir().unwrap();
        let path = data_file(&dir, "apt.dat", APT);

        read_file(&mut ctx, &path, XpFormat::Dat, &mut XpAirportReader::new(true)).unwrap();

        assert_eq!(count(&conn, "airport"), 2);
        assert_eq!(count(&conn, "runway"), 2);
        assert_eq!(count(&conn, "helipad"), 1);
        assert_eq!(count(&conn, "parking"), 1);
        assert_eq!(count(&conn, "com"), 2);
        // Four runway ends and one helipad
        assert_eq!(count(&conn, "start"), 5);

        let (city, is_3d, aprons, taxi, rating, lonx, longest): (String, bool, i64, i64, i64, f64, i64) = conn
            .query_row(
                "SELECT city, is_3d, num_apron, num_taxi_path, rating, lonx, longest_runway_length
                 FROM airport WHERE ident = 'KSEA'",
                [],
                |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?, r.get(4)?, r.get(5)?, r.get(6)?)),
            )
            .unwrap();
        assert_eq!(city, "Seattle");
        assert!(is_3d);
        assert_eq!(aprons, 1);
        assert_eq!(taxi, 1);
        assert_eq!(rating, 5);
        assert!((lonx + 122.311777778).abs() < 1e-9);
        // 3634 m between the ends
        assert!((longest - 11_923).abs() < 30, "{longest}");

        let (airlines, radius): (String, f64) = conn
            .query_row("SELECT airline_codes, radius FROM parking", [], |r| Ok((r.get(0)?, r.get(1)?)))
            .unwrap();
        assert_eq!(airlines, "UAL,DAL");
        assert!((radius - 85.3).abs() < 0.1);

        let frequencies: Vec<i64> = conn
            .prepare("SELECT frequency FROM com ORDER BY frequency")
            .unwrap()
            .query_map([], |r| r.get(0))
            .unwrap()
            .map(|f| f.unwrap())
            .collect();
        assert_eq!(frequencies, [119_900, 121_700]);

        let water: String = conn
            .query_row("SELECT r.surface FROM runway r JOIN airport a USING (airport_id) WHERE a.ident = 'W55'", [], |r| {
                r.get(0)
            })
            .unwrap();
        assert_eq!(water, "W");
    }

    #[test]
    fn airports_of_earlier_files_win() {
        let (conn, options) = test_context();
        let mut ctx = WriteContext::new(&conn, &options);
        ctx.index.add_airport("KSEA", 99, Point::new(-122.3, 47.4));
        let dir = tempfile::tempdir().unwrap();
        let path = data_file(&dir, "apt.dat", APT);

        read_file(&mut ctx, &path, XpFormat::Dat, &mut XpAirportReader::new(false)).unwrap();
        assert_eq!(count(&conn, "airport"), 1);
        assert_eq!(ctx.index.airport_id("KSEA"), Some(99));
    }

    #[test]
    fn malformed_numbers_are_reported() {
        let (conn, options) = test_context();
        let mut ctx = WriteContext::new(&conn, &options);
        let dir = tempfile::tempdir().unwrap();
        let path = data_file(
            &dir,
            "apt.dat",
            "I
1100 Generated by WorldEditor

1    high 1 0 KBAD Bad Elevation
100 45.72 1 0 0.25 1 2 1 16L 47.46 -122.30 0.00 0.00 3 12 0 1 34R 47.43 -122.30 0.00 0.00 3 8 1 0

1    433 1 0 KSEA Seattle Tacoma Intl
1302 datum_lat 47.449888889
1302 datum_lon -122.311777778
100 45.72 xx 0 0.25 1 2 1 16L 47.46 -122.30 0.00 0.00 3 12 0 1 34R 47.43 -122.30 0.00 0.00 3 8 1 0
100 45.72 1 0 0.25 1 2 1 16R 47.46 -122.31 0.00 0.00 3 12 0 1 34L 47.43 -122.31 0.00 0.00 3 zz 1 0
102 H1 47.4400 -122.3000 90.0 20.0 20.0 asphalt 0 0 0.25 0
99
",
        );

        read_file(&mut ctx, &path, XpFormat::Dat, &mut XpAirportReader::new(false)).unwrap();

        assert_eq!(count(&conn, "airport"), 1);
        assert_eq!(count(&conn, "runway"), 0);
        assert_eq!(count(&conn, "helipad"), 0);
        assert_eq!(ctx.counters.errors, 4);
        assert_eq!(ctx.index.airport_id("KBAD"), None);
    }
}
