//! `earth_nav.dat` and `user_nav.dat`.
//!
//! ```text
//! 2  38.087769 -077.324919     0   396  50    0.0 APH  ENRT K6 A P HILL NDB
//! 3  47.435372 -122.309617   350 11680 130   19.0 SEA  ENRT K1 SEATTLE VORTAC
//! 4  47.431472 -122.308053   425 11090  18  180.000 ISNQ KSEA K1 16L ILS-cat-III
//! 6  47.463800 -122.308000   425 11090  10 300180.000 ISNQ KSEA K1 16L GS
//! 12 47.435372 -122.309617   350 11680 130    0.0 SEA  ENRT K1 SEATTLE VORTAC DME
//! ```
//!
//! DME lines are merged into the VOR or ILS with the same ident, so VOR and
//! ILS are collected and written when the file is finished.

use std::collections::HashMap;

use geo::Point;
use navdata_schema::NavDbObjectType;

use super::{invalid_line, non_empty, XpLine, XpReader};
use crate::error::Result;
use crate::geometry::DEFAULT_LOC_WIDTH;
use crate::writer::ils::{write_ils, GlideslopeRow, IlsRow, LocalizerRow};
use crate::writer::nav::{insert_marker, insert_ndb, insert_tacan, insert_vor, DmeRow, MarkerRow, NdbRow, TacanRow, VorRow};
use crate::writer::WriteContext;

const ENROUTE: &str = "ENRT";

/// Row codes of the file.
mod code {
    pub const NDB: u32 = 2;
    pub const VOR: u32 = 3;
    pub const LOC: u32 = 4;
    pub const LOC_ONLY: u32 = 5;
    pub const GS: u32 = 6;
    pub const OM: u32 = 7;
    pub const MM: u32 = 8;
    pub const IM: u32 = 9;
    pub const DME_PAIRED: u32 = 12;
    pub const DME: u32 = 13;
}

fn vor_type(range: f64) -> &'static str {
    if range <= 25.0 {
        "T"
    } else if range <= 40.0 {
        "L"
    } else {
        "H"
    }
}

fn ndb_type(range: f64) -> &'static str {
    if range <= 25.0 {
        "CP"
    } else if range <= 50.0 {
        "MH"
    } else if range <= 75.0 {
        "H"
    } else {
        "HH"
    }
}

/// TACAN channel for a paired VHF frequency in 10 kHz units.
pub fn tacan_channel(frequency: u32) -> Option<String> {
    let (base, first) = match frequency {
        10800..=11225 => (10800, 17),
        11230..=11795 => (11230, 70),
        13330..=13425 => (13330, 60),
        13440..=13595 => (13440, 1),
        _ => return None,
    };
    let offset = frequency - base;
    let suffix = if offset % 10 == 5 { 'Y' } else { 'X' };
    Some(format!("{}{suffix}", first + offset / 10))
}

fn ils_type(type_name: &str, code: u32) -> &'static str {
    let upper = type_name.to_ascii_uppercase();
    if upper.starts_with("LDA") {
        "LDA"
    } else if upper.starts_with("SDF") {
        "SDF"
    } else if upper.starts_with("IGS") {
        "IGS"
    } else if code == code::LOC {
        "ILS"
    } else {
        "LOC"
    }
}

/// Columns shared by all navaid rows.
#[derive(Debug, Clone, Copy)]
struct Navaid {
    altitude: f64,
    range: f64,
}

#[derive(Debug, Default)]
pub struct XpNavReader {
    vors: Vec<VorRow>,
    vor_index: HashMap<(String, String), usize>,
    ils: Vec<IlsRow>,
    ils_index: HashMap<(String, String), usize>,
}

impl XpNavReader {
    fn ils_entry(&mut self, ident: &str, airport: &str, position: Point<f64>) -> &mut IlsRow {
        let key = (ident.to_string(), airport.to_string());
        let index = *self.ils_index.entry(key).or_insert_with(|| {
            self.ils.push(IlsRow { ident: ident.to_string(), position, ..IlsRow::default() });
            self.ils.len() - 1
        });
        &mut self.ils[index]
    }

    fn read_localizer(&mut self, ctx: &mut WriteContext, line: &XpLine, code: u32, position: Point<f64>, navaid: Navaid) {
        let (ident, airport, region) = (line.at(7), line.at(8), line.at(9));
        let Some(heading) = line.parse::<f64>(6) else {
            invalid_line(ctx, line, "invalid localizer heading");
            return;
        };
        let Some(frequency) = line.parse::<u32>(4).and_then(|f| f.checked_mul(10)) else {
            invalid_line(ctx, line, "invalid localizer frequency");
            return;
        };
        let ils_type = ils_type(line.at(11), code);
        let name = non_empty(&line.rest(11));
        let localizer = LocalizerRow {
            airport_ident: non_empty(airport),
            runway_name: non_empty(line.at(10)),
            heading: heading.rem_euclid(360.0),
            width: DEFAULT_LOC_WIDTH,
        };

        let ils = self.ils_entry(ident, airport, position);
        ils.name = name;
        ils.region = non_empty(region);
        ils.ils_type = ils_type.to_string();
        ils.frequency = frequency;
        ils.range = navaid.range;
        ils.localizer = Some(localizer);
        ils.altitude = navaid.altitude;
        ils.position = position;
    }

    fn read_glideslope(&mut self, ctx: &mut WriteContext, line: &XpLine, position: Point<f64>, navaid: Navaid) {
        // Angle times 100000 plus the true course
        let Some(value) = line.parse::<f64>(6) else {
            invalid_line(ctx, line, "invalid glideslope angle");
            return;
        };
        let glideslope = GlideslopeRow {
            range: navaid.range,
            pitch: (value / 1000.0).floor() / 100.0,
            altitude: navaid.altitude,
            position,
        };
        self.ils_entry(line.at(7), line.at(8), position).glideslope = Some(glideslope);
    }

    /// Attaches a DME to the VOR or ILS with the same ident. Returns `false`
    /// if there is none.
    fn attach_dme(&mut self, line: &XpLine, dme: DmeRow) -> bool {
        let (ident, airport, region) = (line.at(7).to_string(), line.at(8).to_string(), line.at(9).to_string());
        if airport != ENROUTE {
            if let Some(&index) = self.ils_index.get(&(ident.clone(), airport)) {
                self.ils[index].dme_range = line.parse(5);
                self.ils[index].dme = Some(dme);
                return true;
            }
        }
        if let Some(&index) = self.vor_index.get(&(ident, region)) {
            self.vors[index].dme = Some(dme);
            return true;
        }
        false
    }

    fn read_dme(&mut self, ctx: &mut WriteContext, line: &XpLine, position: Point<f64>, navaid: Navaid) -> Result<()> {
        let Navaid { altitude, range } = navaid;
        if self.attach_dme(line, DmeRow { altitude, position }) {
            return Ok(());
        }
        let name = line.rest(10);
        let Some(frequency) = line.parse::<u32>(4) else {
            invalid_line(ctx, line, "invalid DME frequency");
            return Ok(());
        };
        let airport = line.at(8);
        let airport_ident = (airport != ENROUTE).then(|| airport.to_string());

        if !ctx.is_included(NavDbObjectType::Vor) {
            return Ok(());
        }
        if name.to_ascii_uppercase().contains("TACAN") {
            let Some(channel) = tacan_channel(frequency) else {
                invalid_line(ctx, line, "TACAN frequency without channel");
                return Ok(());
            };
            let tacan = TacanRow {
                ident: line.at(7).to_string(),
                name: non_empty(&name),
                region: non_empty(line.at(9)),
                airport_ident,
                channel,
                range,
                dme_only: true,
                dme: Some(DmeRow { altitude, position }),
                altitude,
                position,
                ..TacanRow::default()
            };
            insert_tacan(ctx, &tacan)?;
        } else {
            let Some(frequency) = frequency.checked_mul(10) else {
                invalid_line(ctx, line, "invalid DME frequency");
                return Ok(());
            };
            let vor = VorRow {
                ident: line.at(7).to_string(),
                name: non_empty(&name),
                region: non_empty(line.at(9)),
                airport_ident,
                vor_type: vor_type(range).to_string(),
                frequency: Some(frequency),
                range,
                dme_only: true,
                dme: Some(DmeRow { altitude, position }),
                altitude,
                position,
                ..VorRow::default()
            };
            self.push_vor(vor);
        }
        Ok(())
    }

    fn push_vor(&mut self, vor: VorRow) {
        let key = (vor.ident.clone(), vor.region.clone().unwrap_or_default());
        self.vors.push(vor);
        self.vor_index.insert(key, self.vors.len() - 1);
    }
}

impl XpReader for XpNavReader {
    fn read(&mut self, ctx: &mut WriteContext, line: &XpLine) -> Result<()> {
        let Some(row_code) = line.parse::<u32>(0) else {
            invalid_line(ctx, line, "invalid row code");
            return Ok(());
        };
        if line.len() < 10 {
            invalid_line(ctx, line, "navaid line too short");
            return Ok(());
        }
        let Some(position) = line.position(1, 2) else {
            invalid_line(ctx, line, "invalid navaid coordinates");
            return Ok(());
        };
        let (Some(altitude), Some(range)) = (line.parse::<f64>(3), line.parse::<f64>(5)) else {
            invalid_line(ctx, line, "invalid navaid altitude or range");
            return Ok(());
        };
        let navaid = Navaid { altitude, range };
        let airport = line.at(8);
        let airport_ident = (airport != ENROUTE).then(|| airport.to_string());

        match row_code {
            code::NDB if ctx.is_included(NavDbObjectType::Ndb) => {
                let Some(frequency) = line.parse::<f64>(4) else {
                    invalid_line(ctx, line, "invalid NDB frequency");
                    return Ok(());
                };
                let ndb = NdbRow {
                    ident: line.at(7).to_string(),
                    name: non_empty(&line.rest(10)),
                    region: non_empty(line.at(9)),
                    airport_ident,
                    ndb_type: ndb_type(range).to_string(),
                    frequency: (frequency * 100.0).round() as u32,
                    range,
                    altitude,
                    position,
                    ..NdbRow::default()
                };
                insert_ndb(ctx, &ndb)?;
            }
            code::VOR if ctx.is_included(NavDbObjectType::Vor) => {
                let Some(frequency) = line.parse::<u32>(4).and_then(|f| f.checked_mul(10)) else {
                    invalid_line(ctx, line, "invalid VOR frequency");
                    return Ok(());
                };
                let name = line.rest(10);
                let mut vor_type = vor_type(range).to_string();
                if name.to_ascii_uppercase().ends_with("VORTAC") {
                    vor_type.insert_str(0, "VT");
                }
                self.push_vor(VorRow {
                    ident: line.at(7).to_string(),
                    name: non_empty(&name),
                    region: non_empty(line.at(9)),
                    airport_ident,
                    vor_type,
                    frequency: Some(frequency),
                    range,
                    mag_var: line.parse(6),
                    altitude,
                    position,
                    ..VorRow::default()
                });
            }
            code::LOC | code::LOC_ONLY if ctx.is_included(NavDbObjectType::Ils) => {
                self.read_localizer(ctx, line, row_code, position, navaid);
            }
            code::GS if ctx.is_included(NavDbObjectType::Ils) => self.read_glideslope(ctx, line, position, navaid),
            code::OM | code::MM | code::IM if ctx.is_included(NavDbObjectType::Marker) => {
                let marker_type = match row_code {
                    code::OM => "OUTER",
                    code::MM => "MIDDLE",
                    _ => "INNER",
                };
                let ident = line.at(7);
                let marker = MarkerRow {
                    ident: (!ident.starts_with('-')).then(|| ident.to_string()),
                    region: non_empty(line.at(9)),
                    marker_type: marker_type.to_string(),
                    heading: line.parse(6),
                    altitude,
                    position,
                };
                insert_marker(ctx, &marker)?;
            }
            code::DME_PAIRED | code::DME => self.read_dme(ctx, line, position, navaid)?,
            // FPAP, GLS and threshold points (14 to 16) are not used
            _ => {}
        }
        Ok(())
    }

    fn finish(&mut self, ctx: &mut WriteContext) -> Result<()> {
        for vor in &self.vors {
            insert_vor(ctx, vor)?;
        }
        for ils in &mut self.ils {
            if ils.ils_type == "ILS" && ils.glideslope.is_none() {
                ils.ils_type = "LOC".to_string();
            }
            write_ils(ctx, ils)?;
        }
        Ok(())
    }

    fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::testutil::{count, test_context};
    use crate::xplane::{read_file, testutil::data_file, XpFormat};

    const NAV: &str = "I
1100 Version - data cycle 1809, build 20180822, metadata NavXP1100.

2  38.087769444 -077.324919444      0   396  50    0.0 APH  ENRT K6 A P HILL NDB
3  47.435372222 -122.309616667    350 11680 130   19.0 SEA  ENRT K1 SEATTLE VORTAC
12 47.435372222 -122.309616667    350 11680 130    0.0 SEA  ENRT K1 SEATTLE VORTAC DME
4  47.431472222 -122.308052778    425 11090  18  180.000 ISNQ KSEA K1 16L ILS-cat-III
6  47.463800000 -122.308000000    425 11090  10 300180.000 ISNQ KSEA K1 16L GS
12 47.431472222 -122.308052778    425 11090  18    0.0 ISNQ KSEA K1 16L DME-ILS
5  47.500000000 -122.300000000    400 10870  18  360.000 IBFI KBFI K1 14R LOC
7  47.537000000 -122.308000000    425     0   0  180.000 ---- KSEA K1 16L OM
13 47.100000000 -122.500000000    300 11300 130    0.0 GRF  ENRT K1 GRAY TACAN
13 47.200000000 -122.600000000    300 11150  40    0.0 XYZ  ENRT K1 STANDALONE DME
3  95.000000000 -122.309616667    350 11680 130   19.0 BAD  ENRT K1 BAD VOR
99
";

    #[test]
    fn navaids_are_written() {
        let (conn, options) = test_context();
        let mut ctx = WriteContext::new(&conn, &options);
        let dir = tempfile::tempdir().unwrap();
        let path = data_file(&dir, "earth_nav.dat", NAV);

        read_file(&mut ctx, &path, XpFormat::Dat, &mut XpNavReader::default()).unwrap();

        assert_eq!(count(&conn, "ndb"), 1);
        assert_eq!(count(&conn, "vor"), 2);
        assert_eq!(count(&conn, "tacan"), 1);
        assert_eq!(count(&conn, "ils"), 2);
        assert_eq!(count(&conn, "marker"), 1);
        assert_eq!(ctx.counters.errors, 1);

        let (vor_type, frequency, dme_lonx): (String, i64, Option<f64>) = conn
            .query_row("SELECT type, frequency, dme_lonx FROM vor WHERE ident = 'SEA'", [], |r| {
                Ok((r.get(0)?, r.get(1)?, r.get(2)?))
            })
            .unwrap();
        assert_eq!(vor_type, "VTH");
        assert_eq!(frequency, 116_800);
        assert!(dme_lonx.is_some());

        let ndb_freq: i64 = conn.query_row("SELECT frequency FROM ndb", [], |r| r.get(0)).unwrap();
        assert_eq!(ndb_freq, 39_600);

        let (ils_type, pitch, dme_lonx): (String, f64, Option<f64>) = conn
            .query_row("SELECT type, gs_pitch, dme_lonx FROM ils WHERE ident = 'ISNQ'", [], |r| {
                Ok((r.get(0)?, r.get(1)?, r.get(2)?))
            })
            .unwrap();
        assert_eq!(ils_type, "ILS");
        assert!((pitch - 3.0).abs() < 1e-9);
        assert!(dme_lonx.is_some());

        let (loc_type, heading): (String, f64) = conn
            .query_row("SELECT type, loc_heading FROM ils WHERE ident = 'IBFI'", [], |r| Ok((r.get(0)?, r.get(1)?)))
            .unwrap();
        assert_eq!(loc_type, "LOC");
        assert!(heading.abs() < 1e-9);

        let channel: String = conn.query_row("SELECT channel FROM tacan", [], |r| r.get(0)).unwrap();
        assert_eq!(channel, "77X");

        let dme_only: bool = conn
            .query_row("SELECT dme_only FROM vor WHERE ident = 'XYZ'", [], |r| r.get(0))
            .unwrap();
        assert!(dme_only);
    }

    #[test]
    fn malformed_numbers_skip_the_row() {
        let (conn, options) = test_context();
        let mut ctx = WriteContext::new(&conn, &options);
        let dir = tempfile::tempdir().unwrap();
        let path = data_file(
            &dir,
            "earth_nav.dat",
            "I
1100 Version - data cycle 1809

4  47.431472222 -122.308052778    425   bad  18  180.000 ISNQ KSEA K1 16L ILS-cat-III
4  47.431472222 -122.308052778    425 11090  zz  180.000 IBAD KSEA K1 16R ILS-cat-III
4  47.431472222 -122.308052778     xx 11090  18  180.000 IXXX KSEA K1 34L ILS-cat-III
3  47.435372222 -122.309616667    350 9999999999 130 19.0 SEA  ENRT K1 SEATTLE VORTAC
99
",
        );

        read_file(&mut ctx, &path, XpFormat::Dat, &mut XpNavReader::default()).unwrap();

        assert_eq!(count(&conn, "ils"), 0);
        assert_eq!(count(&conn, "vor"), 0);
        assert_eq!(ctx.counters.errors, 4);
    }

    #[test]
    fn tacan_channels() {
        assert_eq!(tacan_channel(10800).as_deref(), Some("17X"));
        assert_eq!(tacan_channel(10805).as_deref(), Some("17Y"));
        assert_eq!(tacan_channel(11795).as_deref(), Some("126Y"));
        assert_eq!(tacan_channel(13440).as_deref(), Some("1X"));
        assert_eq!(tacan_channel(12000), None);
    }
}
