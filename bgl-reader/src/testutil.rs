//! Builders for synthetic BGL byte buffers used by tests of this crate and,
//! through the `test-util` feature, by the database compiler tests.

use crate::converter::{icao_to_int, lat_to_raw, lon_to_raw, pack_region_and_airport};
use crate::header::{HEADER_SIZE, MAGIC_NUMBER1, MAGIC_NUMBER2};
use crate::layout::StructureType;
use crate::record::{rec, RECORD_HEADER_LEN};
use crate::section::{SectionType, SECTION_SIZE};

// ── Records ───────────────────────────────────────────────────────────────────

/// Little-endian record body writer. `finish` prepends id and size.
#[derive(Debug, Clone)]
pub struct RecordBuilder {
    id: u16,
    body: Vec<u8>,
}

impl RecordBuilder {
    pub fn new(id: u16) -> Self {
        Self { id, body: Vec::new() }
    }

    pub fn u8(mut self, v: u8) -> Self {
        self.body.push(v);
        self
    }

    pub fn u16(mut self, v: u16) -> Self {
        self.body.extend_from_slice(&v.to_le_bytes());
        self
    }

    pub fn u32(mut self, v: u32) -> Self {
        self.body.extend_from_slice(&v.to_le_bytes());
        self
    }

    pub fn i32(mut self, v: i32) -> Self {
        self.body.extend_from_slice(&v.to_le_bytes());
        self
    }

    pub fn f32(mut self, v: f32) -> Self {
        self.body.extend_from_slice(&v.to_le_bytes());
        self
    }

    pub fn bytes(mut self, v: &[u8]) -> Self {
        self.body.extend_from_slice(v);
        self
    }

    pub fn zeros(self, n: usize) -> Self {
        self.bytes(&vec![0u8; n])
    }

    /// `lon u32, lat u32, alt i32` with altitude in meters.
    pub fn position(self, lon: f64, lat: f64, alt: f64) -> Self {
        self.u32(lon_to_raw(lon)).u32(lat_to_raw(lat)).i32((alt * 1000.0).round() as i32)
    }

    pub fn lonlat(self, lon: f64, lat: f64) -> Self {
        self.u32(lon_to_raw(lon)).u32(lat_to_raw(lat))
    }

    /// Packed ident with the five flag bits empty.
    pub fn ident(self, ident: &str) -> Self {
        self.u32(icao_to_int(ident) << 5)
    }

    pub fn region(self, region: &str, airport: &str) -> Self {
        self.u32(pack_region_and_airport(region, airport))
    }

    pub fn fix(self, fix_type: u32, ident: &str, region: &str, airport: &str) -> Self {
        let packed = if ident.is_empty() { 0 } else { (icao_to_int(ident) << 5) | fix_type };
        self.u32(packed).region(region, airport)
    }

    pub fn text(self, s: &str, len: usize) -> Self {
        let mut b = s.as_bytes().to_vec();
        b.resize(len, 0);
        self.bytes(&b)
    }

    pub fn finish(self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.body.len() + RECORD_HEADER_LEN);
        out.extend_from_slice(&self.id.to_le_bytes());
        out.extend_from_slice(&((self.body.len() + RECORD_HEADER_LEN) as u32).to_le_bytes());
        out.extend(self.body);
        out
    }
}

fn name_record(name: &str) -> Vec<u8> {
    RecordBuilder::new(rec::NAME).bytes(name.as_bytes()).u8(0).finish()
}

/// Approach leg bytes for the given structure type.
pub fn leg_bytes(structure: StructureType, leg_type: u8, fix_ident: &str, fix_type: u32) -> Vec<u8> {
    let mut b = RecordBuilder::new(0)
        .u8(leg_type)
        .u8(1)
        .u8(0)
        .u8(0)
        .fix(fix_type, fix_ident, "K1", "")
        .fix(0, "", "", "")
        .f32(0.0)
        .f32(0.0)
        .f32(163.0)
        .f32(5.0)
        .f32(600.0)
        .f32(0.0);
    if structure.layout().leg_speed_and_angle {
        b = b.f32(210.0).f32(-3.0);
    }
    b.finish()[RECORD_HEADER_LEN..].to_vec()
}

/// Parking bytes without record header.
pub fn parking_bytes(structure: StructureType, flags: u32, codes: &[&str], lon: f64, lat: f64) -> Vec<u8> {
    let layout = structure.layout();
    let mut b = RecordBuilder::new(0).u32(flags).f32(18.5).f32(270.0);
    if layout.parking_tee_offsets {
        b = b.zeros(16);
    }
    b = b.lonlat(lon, lat);
    for c in codes {
        b = b.text(c, 4);
    }
    b = b.zeros(layout.parking_trailing_skip);
    if layout.parking_suffix {
        b = b.u8(0).u8(3).zeros(18);
    }
    b.finish()[RECORD_HEADER_LEN..].to_vec()
}

// ── Runway ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct RunwayBuilder {
    numbers: [u8; 4],
    surface: u16,
    ils: String,
    pattern: u8,
    heading: f32,
    length: f32,
    offset_threshold: Option<f32>,
    approach_lights: Option<u8>,
}

impl RunwayBuilder {
    pub fn new(prim_number: u8, prim_designator: u8, sec_number: u8, sec_designator: u8) -> Self {
        Self {
            numbers: [prim_number, prim_designator, sec_number, sec_designator],
            surface: 4,
            ils: String::new(),
            pattern: 0,
            heading: f32::from(prim_number) * 10.0,
            length: 3000.0,
            offset_threshold: None,
            approach_lights: None,
        }
    }

    pub fn surface(mut self, surface: u16) -> Self {
        self.surface = surface;
        self
    }

    pub fn ils(mut self, ident: &str) -> Self {
        self.ils = ident.to_string();
        self
    }

    pub fn pattern(mut self, pattern: u8) -> Self {
        self.pattern = pattern;
        self
    }

    pub fn length(mut self, meters: f32) -> Self {
        self.length = meters;
        self
    }

    pub fn offset_threshold_primary(mut self, meters: f32) -> Self {
        self.offset_threshold = Some(meters);
        self
    }

    pub fn approach_lights_secondary(mut self, flags: u8) -> Self {
        self.approach_lights = Some(flags);
        self
    }

    pub fn build_at(&self, structure: StructureType, lon: f64, lat: f64) -> Vec<u8> {
        let id = if structure.is_msfs() { rec::RUNWAY_MSFS } else { rec::RUNWAY };
        let ils = if self.ils.is_empty() { 0 } else { icao_to_int(&self.ils) << 5 };
        let mut b = RecordBuilder::new(id)
            .u16(self.surface)
            .bytes(&self.numbers)
            .u32(ils)
            .u32(0)
            .position(lon, lat, 130.0)
            .f32(self.length)
            .f32(45.0)
            .f32(self.heading)
            .f32(300.0)
            .u16(0x7f)
            .u8(0x1 | (0x2 << 2))
            .u8(self.pattern)
            .zeros(structure.layout().runway_extra);
        if let Some(len) = self.offset_threshold {
            b = b.bytes(&RecordBuilder::new(rec::OFFSET_THRESHOLD_PRIM).u16(4).f32(len).f32(45.0).finish());
        }
        if let Some(flags) = self.approach_lights {
            b = b.bytes(&RecordBuilder::new(rec::APP_LIGHTS_SEC).u8(flags).u8(0).finish());
        }
        b.finish()
    }

    pub fn build(&self, structure: StructureType) -> Vec<u8> {
        self.build_at(structure, -122.31, 47.45)
    }
}

// ── Airport ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct AirportBuilder {
    ident: String,
    lon: f64,
    lat: f64,
    name: Option<String>,
    runways: Vec<RunwayBuilder>,
    parkings: Vec<u32>,
    coms: Vec<(u16, u32, String)>,
    extra: Vec<Vec<u8>>,
}

impl AirportBuilder {
    pub fn new(ident: &str, lon: f64, lat: f64) -> Self {
        Self {
            ident: ident.to_string(),
            lon,
            lat,
            name: None,
            runways: Vec::new(),
            parkings: Vec::new(),
            coms: Vec::new(),
            extra: Vec::new(),
        }
    }

    pub fn name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn runway(mut self, runway: RunwayBuilder) -> Self {
        self.runways.push(runway);
        self
    }

    /// Parking with name, type and number.
    pub fn parking(mut self, name: u32, parking_type: u32, number: u32) -> Self {
        self.parkings.push(name | (parking_type << 8) | (number << 12));
        self
    }

    pub fn com(mut self, com_type: u16, frequency_hz: u32, name: &str) -> Self {
        self.coms.push((com_type, frequency_hz, name.to_string()));
        self
    }

    /// Any prebuilt subrecord, like an approach.
    pub fn subrecord(mut self, record: Vec<u8>) -> Self {
        self.extra.push(record);
        self
    }

    pub fn build(&self, structure: StructureType) -> Vec<u8> {
        let id = if structure == StructureType::Fs9 { rec::AIRPORT_FS9 } else { rec::AIRPORT };
        let mut b = RecordBuilder::new(id)
            .u8(self.runways.len() as u8)
            .u8(self.coms.len() as u8)
            .u8(0)
            .u8(0)
            .u8(0)
            .u8(0)
            .position(self.lon, self.lat, 130.0)
            .position(self.lon + 0.001, self.lat + 0.001, 150.0)
            .f32(358.0)
            .ident(&self.ident)
            .u32(icao_to_int("K1"))
            .u32(0)
            .zeros(structure.layout().airport_header_tail);

        if let Some(name) = &self.name {
            b = b.bytes(&name_record(name));
        }
        for rw in &self.runways {
            b = b.bytes(&rw.build_at(structure, self.lon, self.lat));
        }
        if !self.parkings.is_empty() {
            let id = if structure.is_msfs() { rec::PARKING_MSFS } else { rec::PARKING };
            let mut p = RecordBuilder::new(id).u16(self.parkings.len() as u16);
            for flags in &self.parkings {
                p = p.bytes(&parking_bytes(structure, *flags, &[], self.lon, self.lat));
            }
            b = b.bytes(&p.finish());
        }
        for (com_type, freq, name) in &self.coms {
            b = b.bytes(
                &RecordBuilder::new(rec::COM).u16(*com_type).u32(*freq).bytes(name.as_bytes()).u8(0).finish(),
            );
        }
        for extra in &self.extra {
            b = b.bytes(extra);
        }
        b.finish()
    }
}

// ── Navaids ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct IlsVorBuilder {
    nav_type: u8,
    ident: String,
    frequency: u32,
    lon: f64,
    lat: f64,
    dme: bool,
    name: Option<String>,
    localizer: Option<(u8, u8, f32, f32)>,
    glideslope: Option<f32>,
}

impl IlsVorBuilder {
    pub fn new(nav_type: u8, ident: &str, frequency_hz: u32, lon: f64, lat: f64) -> Self {
        Self {
            nav_type,
            ident: ident.to_string(),
            frequency: frequency_hz,
            lon,
            lat,
            dme: false,
            name: None,
            localizer: None,
            glideslope: None,
        }
    }

    pub fn dme(mut self) -> Self {
        self.dme = true;
        self
    }

    pub fn name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn localizer(mut self, number: u8, designator: u8, heading: f32, width: f32) -> Self {
        self.localizer = Some((number, designator, heading, width));
        self
    }

    pub fn glideslope(mut self, pitch: f32) -> Self {
        self.glideslope = Some(pitch);
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut b = RecordBuilder::new(rec::ILS_VOR)
            .u8(self.nav_type)
            .u8(0)
            .position(self.lon, self.lat, 100.0)
            .u32(self.frequency)
            .f32(92_600.0)
            .f32(344.0)
            .ident(&self.ident)
            .region("K1", "");
        if let Some((number, designator, heading, width)) = self.localizer {
            b = b.bytes(
                &RecordBuilder::new(rec::LOCALIZER).u8(number).u8(designator).f32(heading).f32(width).finish(),
            );
        }
        if let Some(pitch) = self.glideslope {
            b = b.bytes(
                &RecordBuilder::new(rec::GLIDESLOPE)
                    .u16(0)
                    .position(self.lon, self.lat, 100.0)
                    .f32(18_520.0)
                    .f32(pitch)
                    .finish(),
            );
        }
        if self.dme {
            b = b.bytes(
                &RecordBuilder::new(rec::DME).u16(0).position(self.lon, self.lat, 100.0).f32(92_600.0).finish(),
            );
        }
        if let Some(name) = &self.name {
            b = b.bytes(&name_record(name));
        }
        b.finish()
    }
}

#[derive(Debug, Clone)]
pub struct WaypointBuilder {
    waypoint_type: u8,
    ident: String,
    region: String,
    lon: f64,
    lat: f64,
    routes: Vec<Vec<u8>>,
}

type Neighbor<'a> = Option<(&'a str, &'a str)>;

impl WaypointBuilder {
    pub fn new(waypoint_type: u8, ident: &str, region: &str, lon: f64, lat: f64) -> Self {
        Self {
            waypoint_type,
            ident: ident.to_string(),
            region: region.to_string(),
            lon,
            lat,
            routes: Vec::new(),
        }
    }

    pub fn route(mut self, route_type: u8, name: &str, next: Neighbor, previous: Neighbor) -> Self {
        let mut b = RecordBuilder::new(0).u8(route_type).text(name, 8);
        for neighbor in [next, previous] {
            b = match neighbor {
                Some((ident, region)) => b.u32((icao_to_int(ident) << 5) | 1).u32(icao_to_int(region)).f32(3048.0),
                None => b.zeros(12),
            };
        }
        self.routes.push(b.finish()[RECORD_HEADER_LEN..].to_vec());
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut b = RecordBuilder::new(rec::WAYPOINT)
            .u8(self.waypoint_type)
            .u8(self.routes.len() as u8)
            .lonlat(self.lon, self.lat)
            .f32(344.0)
            .ident(&self.ident)
            .region(&self.region, "");
        for r in &self.routes {
            b = b.bytes(r);
        }
        b.finish()
    }
}

// ── Boundary ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct BoundaryBuilder {
    boundary_type: u8,
    name: String,
    altitudes: (u8, f64, u8, f64),
    com: Option<(u16, u32, String)>,
    points: Vec<Vec<u8>>,
    first: Option<(f64, f64)>,
}

impl BoundaryBuilder {
    pub fn new(boundary_type: u8, name: &str) -> Self {
        Self {
            boundary_type,
            name: name.to_string(),
            altitudes: (1, 0.0, 1, 3048.0),
            com: None,
            points: Vec::new(),
            first: None,
        }
    }

    pub fn altitudes(mut self, min_type: u8, min: f64, max_type: u8, max: f64) -> Self {
        self.altitudes = (min_type, min, max_type, max);
        self
    }

    pub fn com(mut self, com_type: u16, frequency_hz: u32, name: &str) -> Self {
        self.com = Some((com_type, frequency_hz, name.to_string()));
        self
    }

    fn point(mut self, point_type: u16, lon: f64, lat: f64) -> Self {
        self.first.get_or_insert((lon, lat));
        self.points.push(RecordBuilder::new(0).u16(point_type).lonlat(lon, lat).finish()[RECORD_HEADER_LEN..].to_vec());
        self
    }

    pub fn start(self, lon: f64, lat: f64) -> Self {
        self.point(1, lon, lat)
    }

    pub fn line(self, lon: f64, lat: f64) -> Self {
        self.point(2, lon, lat)
    }

    pub fn origin(self, lon: f64, lat: f64) -> Self {
        self.point(3, lon, lat)
    }

    pub fn circle(mut self, radius: f32) -> Self {
        self.points.push(RecordBuilder::new(0).u16(6).u32(0).f32(radius).finish()[RECORD_HEADER_LEN..].to_vec());
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let (lon, lat) = self.first.unwrap_or((0.0, 0.0));
        let (min_type, min, max_type, max) = self.altitudes;
        let mut b = RecordBuilder::new(rec::BOUNDARY)
            .u8(self.boundary_type)
            .u8(min_type | (max_type << 4))
            .position(lon - 0.5, lat - 0.5, min)
            .position(lon + 0.5, lat + 0.5, max)
            .bytes(&name_record(&self.name));
        if let Some((com_type, freq, name)) = &self.com {
            b = b.bytes(
                &RecordBuilder::new(rec::BOUNDARY_COM).u16(*com_type).u32(*freq).bytes(name.as_bytes()).u8(0).finish(),
            );
        }
        let mut lines = RecordBuilder::new(rec::BOUNDARY_LINES).u16(self.points.len() as u16);
        for p in &self.points {
            lines = lines.bytes(p);
        }
        b.bytes(&lines.finish()).finish()
    }
}

// ── Namelist ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct NamelistBuilder {
    lists: [Vec<String>; 5],
    entries: Vec<(String, [u16; 5])>,
}

impl NamelistBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn list(mut self, idx: usize, values: &[&str]) -> Self {
        self.lists[idx] = values.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn regions(self, v: &[&str]) -> Self {
        self.list(0, v)
    }

    pub fn countries(self, v: &[&str]) -> Self {
        self.list(1, v)
    }

    pub fn states(self, v: &[&str]) -> Self {
        self.list(2, v)
    }

    pub fn cities(self, v: &[&str]) -> Self {
        self.list(3, v)
    }

    pub fn airports(self, v: &[&str]) -> Self {
        self.list(4, v)
    }

    pub fn entry(mut self, ident: &str, region: u16, country: u16, state: u16, city: u16, airport: u16) -> Self {
        self.entries.push((ident.to_string(), [region, country, state, city, airport]));
        self
    }

    pub fn build(&self) -> Vec<u8> {
        const FIXED: usize = RECORD_HEADER_LEN + 6 * 2 + 6 * 4;
        let mut data = Vec::new();
        let mut offsets = Vec::new();
        for list in &self.lists {
            offsets.push((FIXED + data.len()) as u32);
            let mut strings = Vec::new();
            for s in list {
                data.extend_from_slice(&(strings.len() as u32).to_le_bytes());
                strings.extend_from_slice(s.as_bytes());
                strings.push(0);
            }
            data.extend(strings);
        }
        offsets.push((FIXED + data.len()) as u32);
        for (ident, idx) in &self.entries {
            data.push(idx[0] as u8);
            data.push(idx[1] as u8);
            data.extend_from_slice(&(idx[2] << 4).to_le_bytes());
            data.extend_from_slice(&idx[3].to_le_bytes());
            data.extend_from_slice(&idx[4].to_le_bytes());
            data.extend_from_slice(&(icao_to_int(ident) << 5).to_le_bytes());
            data.extend_from_slice(&[0u8; 8]);
        }

        let mut b = RecordBuilder::new(rec::NAMELIST);
        for list in &self.lists {
            b = b.u16(list.len() as u16);
        }
        b = b.u16(self.entries.len() as u16);
        for o in offsets {
            b = b.u32(o);
        }
        b.bytes(&data).finish()
    }
}

// ── File ──────────────────────────────────────────────────────────────────────

/// Assembles header, section table, subsection tables and record data.
#[derive(Debug, Clone, Default)]
pub struct BglBuilder {
    sections: Vec<(SectionType, Vec<Vec<u8>>)>,
    boundaries: Vec<Vec<u8>>,
}

impl BglBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// One section with a single subsection holding `records`.
    pub fn section(mut self, section_type: SectionType, records: Vec<Vec<u8>>) -> Self {
        self.sections.push((section_type, records));
        self
    }

    /// Boundary section. Its records are placed at the end of the file.
    pub fn boundaries(mut self, records: Vec<Vec<u8>>) -> Self {
        self.boundaries = records;
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let has_boundaries = !self.boundaries.is_empty();
        let num_sections = self.sections.len() + usize::from(has_boundaries);
        let table_start = HEADER_SIZE as usize + num_sections * SECTION_SIZE;
        let data_start = table_start + num_sections * 16;

        let mut out = Vec::new();
        for v in [MAGIC_NUMBER1, HEADER_SIZE, 0xd5d8_7000, 0x01c6_0e5a, MAGIC_NUMBER2, num_sections as u32] {
            out.extend_from_slice(&v.to_le_bytes());
        }
        out.resize(HEADER_SIZE as usize, 0);

        let mut data_offset = data_start;
        let mut tables = Vec::new();
        let mut data = Vec::new();
        for (i, (section_type, records)) in self.sections.iter().enumerate() {
            let table_offset = table_start + i * 16;
            for v in [section_type.to_u32(), 0, 1, table_offset as u32, 16] {
                out.extend_from_slice(&v.to_le_bytes());
            }
            let size: usize = records.iter().map(Vec::len).sum();
            for v in [0, records.len() as u32, data_offset as u32, size as u32] {
                tables.extend_from_slice(&v.to_le_bytes());
            }
            records.iter().for_each(|r| data.extend_from_slice(r));
            data_offset += size;
        }
        if has_boundaries {
            let table_offset = table_start + self.sections.len() * 16;
            for v in [SectionType::Boundary.to_u32(), 0, 1, table_offset as u32, 16] {
                out.extend_from_slice(&v.to_le_bytes());
            }
            for v in [data_offset as u32, 0, data_offset as u32, 1] {
                tables.extend_from_slice(&v.to_le_bytes());
            }
            self.boundaries.iter().for_each(|r| data.extend_from_slice(r));
        }
        out.extend(tables);
        out.extend(data);
        out
    }
}
