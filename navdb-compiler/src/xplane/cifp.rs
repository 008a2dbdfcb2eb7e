//! CIFP procedure files, one per airport like `CIFP/KSEA.dat`.
//!
//! ```text
//! APPCH:010,A,I16R,BLAKO,BLAKO,K1,P,C,E  A, ,   ,IF, , , , , ,      ,    ,    , , , ,+,02800,     ,18000, , , , ;
//! ```
//! Field 1 is the sequence number followed by the ARINC 424 columns: route
//! type, procedure, transition, fix ident, region, section and subsection,
//! description, turn direction, RNP, leg type, ..., altitude description,
//! altitude 1 and 2, transition altitude, speed limit and vertical angle
//! in hundredths of a degree.
//!
//! All records of a file are collected and grouped into procedures when the
//! file is finished. `RWY` and `PRDAT` records are not used.

use std::collections::HashMap;
use std::sync::LazyLock;

use navdata_schema::NavDbObjectType;
use regex::Regex;

use super::{invalid_line, XpLine, XpReader};
use crate::error::Result;
use crate::fsutil::{has_sid_star_all_runways, normalize_runway, sid_star_multi_runways};
use crate::writer::approach::{write_procedure, FixRow, LegRow, ProcedureRow, ProcedureType, TransitionRow};
use crate::writer::WriteContext;

static APPROACH_IDENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z](\d{2}[LRC]?)-?([A-Z])?$").expect("approach ident regex"));

mod field {
    pub const ROUTE_TYPE: usize = 2;
    pub const PROCEDURE: usize = 3;
    pub const TRANSITION: usize = 4;
    pub const FIX: usize = 5;
    pub const REGION: usize = 6;
    pub const SECTION: usize = 7;
    pub const SUBSECTION: usize = 8;
    pub const DESCRIPTION: usize = 9;
    pub const TURN: usize = 10;
    pub const LEG_TYPE: usize = 12;
    pub const RECOMMENDED: usize = 14;
    pub const RECOMMENDED_REGION: usize = 15;
    pub const THETA: usize = 17;
    pub const RHO: usize = 18;
    pub const COURSE: usize = 19;
    pub const DISTANCE_TIME: usize = 20;
    pub const RECOMMENDED_SECTION: usize = 21;
    pub const RECOMMENDED_SUBSECTION: usize = 22;
    pub const ALT_DESCRIPTOR: usize = 24;
    pub const ALTITUDE1: usize = 25;
    pub const ALTITUDE2: usize = 26;
    pub const SPEED_LIMIT: usize = 29;
    pub const VERTICAL_ANGLE: usize = 30;
}

fn fix_type(section: &str, subsection: &str) -> &'static str {
    match (section, subsection) {
        ("D", "B") => "N",
        ("D", _) => "V",
        ("P", "C") => "TW",
        ("P", "N") => "TN",
        ("P", "G") => "R",
        ("P", "I") => "L",
        ("P", "A") => "A",
        _ => "W",
    }
}

fn approach_type(route_type: &str) -> &'static str {
    match route_type {
        "B" => "LOCB",
        "D" | "S" => "VORDME",
        "G" => "IGS",
        "I" => "ILS",
        "J" => "GLS",
        "L" => "LOC",
        "N" => "NDB",
        "Q" => "NDBDME",
        "R" | "H" => "RNAV",
        "T" => "TACAN",
        "U" => "SDF",
        "V" => "VOR",
        "X" => "LDA",
        _ => "GPS",
    }
}

/// Course, theta, rho and distance in tenths.
fn tenths(value: &str) -> Option<f64> {
    value.trim().trim_end_matches('T').parse::<f64>().ok().map(|v| v / 10.0)
}

/// `18000` or `FL180` in feet.
fn altitude(value: &str) -> Option<f64> {
    let value = value.trim();
    match value.strip_prefix("FL") {
        Some(fl) => fl.parse::<f64>().ok().map(|fl| fl * 100.0),
        None => value.parse().ok(),
    }
}

fn fix(ident: &str, region: &str, section: &str, subsection: &str, airport: &str) -> FixRow {
    let ident = ident.trim();
    if ident.is_empty() {
        return FixRow::default();
    }
    let fix_type = fix_type(section.trim(), subsection.trim());
    let mut row = FixRow::new(fix_type, ident, region.trim());
    if section.trim() == "P" {
        row.airport = airport.to_string();
    }
    row
}

#[derive(Debug, Clone)]
struct CifpRecord {
    procedure_type: ProcedureType,
    route_type: String,
    ident: String,
    transition: String,
    description: String,
    leg: LegRow,
}

impl CifpRecord {
    fn new(procedure_type: ProcedureType, line: &XpLine, airport: &str) -> Self {
        let description = line.at(field::DESCRIPTION).to_string();
        let flyover = description.chars().nth(1).is_some_and(|c| matches!(c, 'Y' | 'B'));
        let alt1 = altitude(line.at(field::ALTITUDE1));
        let alt_descriptor = match line.at(field::ALT_DESCRIPTOR).trim() {
            d @ ("+" | "-" | "B") => d,
            _ if alt1.is_some() => "A",
            _ => "",
        };
        let distance_time = line.at(field::DISTANCE_TIME).trim();
        let (distance, time) = match distance_time.strip_prefix('T') {
            Some(time) => (None, tenths(time)),
            None => (tenths(distance_time), None),
        };

        let leg = LegRow {
            leg_type: line.at(field::LEG_TYPE).trim().to_string(),
            alt_descriptor: alt_descriptor.to_string(),
            turn_direction: line.at(field::TURN).trim().to_string(),
            fix: fix(
                line.at(field::FIX),
                line.at(field::REGION),
                line.at(field::SECTION),
                line.at(field::SUBSECTION),
                airport,
            ),
            recommended: fix(
                line.at(field::RECOMMENDED),
                line.at(field::RECOMMENDED_REGION),
                line.at(field::RECOMMENDED_SECTION),
                line.at(field::RECOMMENDED_SUBSECTION),
                airport,
            ),
            is_missed: false,
            is_flyover: flyover,
            is_true_course: line.at(field::COURSE).trim().ends_with('T'),
            course: tenths(line.at(field::COURSE)),
            distance,
            time,
            theta: tenths(line.at(field::THETA)),
            rho: tenths(line.at(field::RHO)),
            altitude1: alt1,
            altitude2: altitude(line.at(field::ALTITUDE2)),
            speed_limit: line.at(field::SPEED_LIMIT).trim().parse().ok(),
            vertical_angle: line.at(field::VERTICAL_ANGLE).trim().parse::<f64>().ok().map(|a| a / 100.0),
        };
        Self {
            procedure_type,
            route_type: line.at(field::ROUTE_TYPE).trim().to_string(),
            ident: line.at(field::PROCEDURE).trim().to_string(),
            transition: line.at(field::TRANSITION).trim().to_string(),
            description,
            leg,
        }
    }

    /// Fourth description column.
    fn fix_role(&self) -> Option<char> {
        self.description.chars().nth(3)
    }
}

// ── Procedure building ───────────────────────────────────────────────────────

fn transition_row(name: &str, legs: Vec<LegRow>) -> TransitionRow {
    let arc = legs.iter().find(|l| l.leg_type == "AF");
    let first = legs.first();
    TransitionRow {
        transition_type: if arc.is_some() { "D" } else { "F" }.to_string(),
        fix: first.map(|l| l.fix.clone()).filter(|f| !f.is_empty()).unwrap_or_else(|| FixRow::new("W", name, "")),
        altitude: first.and_then(|l| l.altitude1),
        dme: arc.map(|l| l.recommended.clone()),
        dme_radial: arc.and_then(|l| l.theta),
        dme_distance: arc.and_then(|l| l.rho),
        legs,
    }
}

fn approach(ident: &str, records: &[&CifpRecord]) -> ProcedureRow {
    let mut legs = Vec::new();
    let mut transitions: Vec<(String, Vec<LegRow>)> = Vec::new();
    let mut route_type = None;
    let mut missed = false;
    let mut final_fix: Option<&CifpRecord> = None;

    for record in records {
        if record.route_type == "A" {
            match transitions.iter_mut().find(|(name, _)| *name == record.transition) {
                Some((_, legs)) => legs.push(record.leg.clone()),
                None => transitions.push((record.transition.clone(), vec![record.leg.clone()])),
            }
            continue;
        }
        route_type.get_or_insert(record.route_type.as_str());
        legs.push(LegRow { is_missed: missed, ..record.leg.clone() });
        match record.fix_role() {
            Some('E' | 'F') if !missed => final_fix = Some(*record),
            // Legs after the missed approach point
            Some('M') => missed = true,
            _ => {}
        }
    }

    let approach_type = approach_type(route_type.unwrap_or_default());
    let (runway_name, suffix) = match APPROACH_IDENT.captures(ident) {
        Some(caps) => (
            Some(normalize_runway(&caps[1])),
            caps.get(2).map(|m| m.as_str().to_string()).unwrap_or_default(),
        ),
        None => (None, ident.split_once('-').map(|(_, s)| s.to_string()).unwrap_or_default()),
    };
    let final_leg = final_fix.map(|r| &r.leg).or_else(|| legs.iter().rev().find(|l| !l.is_missed));
    let (fix, altitude) = final_leg.map(|l| (l.fix.clone(), l.altitude1)).unwrap_or_default();

    ProcedureRow {
        procedure_type: ProcedureType::Approach,
        approach_type: approach_type.to_string(),
        suffix,
        runway_name,
        arinc_name: ident.to_string(),
        gps_overlay: false,
        fix,
        altitude,
        heading: None,
        missed_altitude: legs.iter().filter(|l| l.is_missed).find_map(|l| l.altitude1),
        legs,
        transitions: transitions.into_iter().map(|(name, legs)| transition_row(&name, legs)).collect(),
    }
}

fn sid_star(ident: &str, procedure_type: ProcedureType, records: &[&CifpRecord], airport_runways: &[String]) -> Vec<ProcedureRow> {
    let mut runway_legs: Vec<(String, Vec<LegRow>)> = Vec::new();
    let mut common = Vec::new();
    let mut enroute: Vec<(String, Vec<LegRow>)> = Vec::new();

    for record in records {
        let leg = record.leg.clone();
        let transition = record.transition.as_str();
        if transition.starts_with("RW") {
            let runways = sid_star_multi_runways(airport_runways, transition).unwrap_or_else(|| vec![normalize_runway(transition)]);
            for runway in runways {
                match runway_legs.iter_mut().find(|(name, _)| *name == runway) {
                    Some((_, legs)) => legs.push(leg.clone()),
                    None => runway_legs.push((runway, vec![leg.clone()])),
                }
            }
        } else if has_sid_star_all_runways(transition) {
            common.push(leg);
        } else {
            match enroute.iter_mut().find(|(name, _)| name == transition) {
                Some((_, legs)) => legs.push(leg),
                None => enroute.push((transition.to_string(), vec![leg])),
            }
        }
    }

    let transitions: Vec<TransitionRow> = enroute
        .into_iter()
        .map(|(name, legs)| TransitionRow {
            transition_type: "F".to_string(),
            fix: FixRow::new("W", &name, ""),
            legs,
            ..TransitionRow::default()
        })
        .collect();

    let is_sid = procedure_type == ProcedureType::Sid;
    let mut runways: Vec<(Option<String>, Vec<LegRow>)> =
        runway_legs.into_iter().map(|(rw, legs)| (Some(rw), legs)).collect();
    if runways.is_empty() {
        runways.push((None, Vec::new()));
    }

    runways
        .into_iter()
        .map(|(runway, rw_legs)| {
            let legs: Vec<LegRow> = if is_sid {
                rw_legs.into_iter().chain(common.iter().cloned()).collect()
            } else {
                common.iter().cloned().chain(rw_legs).collect()
            };
            ProcedureRow {
                procedure_type,
                approach_type: "GPS".to_string(),
                suffix: if is_sid { "D" } else { "A" }.to_string(),
                runway_name: runway,
                arinc_name: ident.to_string(),
                fix: legs.last().map(|l| l.fix.clone()).unwrap_or_default(),
                legs,
                transitions: transitions.clone(),
                ..ProcedureRow::default()
            }
        })
        .collect()
}

// ── Reader ───────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct XpCifpReader {
    airport_ident: String,
    records: Vec<CifpRecord>,
}

impl XpCifpReader {
    pub fn new(airport_ident: impl Into<String>) -> Self {
        Self { airport_ident: airport_ident.into(), records: Vec::new() }
    }

    /// Procedures in file order.
    fn procedures(&self, airport_runways: &[String]) -> Vec<ProcedureRow> {
        let mut groups: Vec<(ProcedureType, &str, Vec<&CifpRecord>)> = Vec::new();
        let mut index: HashMap<(ProcedureType, &str), usize> = HashMap::new();
        for record in &self.records {
            let key = (record.procedure_type, record.ident.as_str());
            let i = *index.entry(key).or_insert_with(|| {
                groups.push((record.procedure_type, record.ident.as_str(), Vec::new()));
                groups.len() - 1
            });
            groups[i].2.push(record);
        }

        let mut procedures = Vec::new();
        for (procedure_type, ident, records) in groups {
            match procedure_type {
                ProcedureType::Approach => procedures.push(approach(ident, &records)),
                ProcedureType::Sid | ProcedureType::Star => {
                    procedures.extend(sid_star(ident, procedure_type, &records, airport_runways))
                }
            }
        }
        procedures
    }
}

impl XpReader for XpCifpReader {
    fn read(&mut self, ctx: &mut WriteContext, line: &XpLine) -> Result<()> {
        let procedure_type = match line.at(0) {
            "APPCH" => ProcedureType::Approach,
            "SID" => ProcedureType::Sid,
            "STAR" => ProcedureType::Star,
            _ => return Ok(()),
        };
        if !ctx.is_included(NavDbObjectType::Approach) {
            return Ok(());
        }
        if line.len() <= field::ALTITUDE2 {
            invalid_line(ctx, line, "procedure line too short");
            return Ok(());
        }
        self.records.push(CifpRecord::new(procedure_type, line, &self.airport_ident));
        Ok(())
    }

    fn finish(&mut self, ctx: &mut WriteContext) -> Result<()> {
        if self.records.is_empty() {
            return Ok(());
        }
        let Some(airport_id) = ctx.index.airport_id(&self.airport_ident) else {
            tracing::warn!("Airport {} of {} not found", self.airport_ident, ctx.filename);
            ctx.counters.errors += 1;
            return Ok(());
        };
        let runways = ctx.index.runway_names(&self.airport_ident).to_vec();
        for procedure in self.procedures(&runways) {
            write_procedure(ctx, airport_id, &self.airport_ident, &procedure)?;
        }
        Ok(())
    }

    fn reset(&mut self) {
        self.records.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::testutil::{count, test_context};
    use crate::xplane::{read_file, testutil::data_file, XpFormat};
    use geo::Point;

    const CIFP: &str = "\
SID:010,1,SUMMA2,RW16L,     ,  , , ,    , ,   ,VA, , , , , ,      ,1630,    , , , ,+,00800,     ,18000, , , , ;
SID:010,1,SUMMA2,RW16R,     ,  , , ,    , ,   ,VA, , , , , ,      ,1630,    , , , ,+,00800,     ,18000, , , , ;
SID:020,2,SUMMA2,ALL,SUMMA,K1,E,A,E   , ,   ,DF, , , , , ,      ,    ,    , , , ,+,05000,     ,18000, , , , ;
SID:030,3,SUMMA2,BTG,BTG,K1,D, ,V   , ,   ,TF, , , , , ,      ,    ,    , , , , ,     ,     ,18000, , , , ;
APPCH:010,A,I16R,BLAKO,BLAKO,K1,P,C,E  A, ,   ,IF, , , , , ,      ,    ,    , , , ,+,02800,     ,18000, , , , ;
APPCH:020,A,I16R,BLAKO,FOURT,K1,P,C,E  B, ,   ,TF, , , , , ,      ,    ,    , , , ,+,02800,     ,18000, , , , ;
APPCH:030,I,I16R, ,FOURT,K1,P,C,E  F, ,   ,IF, , , , , ,      ,    ,    , , , ,+,02800,     ,18000, , , , ;
APPCH:040,I,I16R, ,RW16R,K1,P,G,GY M, ,   ,TF, , , , , ,      ,1630,    , , , ,@,00433,     ,18000, , ,-300, ;
APPCH:050,I,I16R, ,     ,  , , ,    , ,   ,CA, , , , , ,      ,1630,    , , , ,+,01000,     ,18000, , , , ;
APPCH:060,I,I16R, ,SEA,K1,D, ,V  M, ,   ,DF, , , , , ,      ,    ,    , , , ,+,02000,     ,18000, , , , ;
RWY:RW16R,     ,     ,00433,ISNQ,1,   ;N47274218,W122185244,0000;
";

    #[test]
    fn procedures_are_grouped_and_written() {
        let (conn, options) = test_context();
        let mut ctx = WriteContext::new(&conn, &options);
        ctx.index.add_airport("KSEA", 1, Point::new(-122.3, 47.45));
        for (i, rw) in ["16L", "16R", "34L", "34R"].iter().enumerate() {
            ctx.index.add_runway_end("KSEA", rw, i as i64 + 1, Point::new(-122.3, 47.45));
        }
        let dir = tempfile::tempdir().unwrap();
        let path = data_file(&dir, "CIFP/KSEA.dat", CIFP);

        read_file(&mut ctx, &path, XpFormat::Cifp, &mut XpCifpReader::new("KSEA")).unwrap();

        // One SID per runway and the approach
        assert_eq!(count(&conn, "approach"), 3);
        assert_eq!(count(&conn, "transition"), 3);

        let (approach_type, runway, fix, missed_alt): (String, String, String, i64) = conn
            .query_row(
                "SELECT type, runway_name, fix_ident, missed_altitude FROM approach WHERE procedure_type = 'APPROACH'",
                [],
                |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?)),
            )
            .unwrap();
        assert_eq!(approach_type, "ILS");
        assert_eq!(runway, "16R");
        assert_eq!(fix, "FOURT");
        assert_eq!(missed_alt, 1000);

        let missed: i64 = conn
            .query_row("SELECT count(*) FROM approach_leg WHERE is_missed = 1", [], |r| r.get(0))
            .unwrap();
        assert_eq!(missed, 2);

        let (descriptor, alt1, angle): (String, f64, f64) = conn
            .query_row(
                "SELECT alt_descriptor, altitude1, vertical_angle FROM approach_leg WHERE fix_ident = 'RW16R'",
                [],
                |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
            )
            .unwrap();
        assert_eq!(descriptor, "A");
        assert_eq!(alt1, 433.0);
        assert_eq!(angle, -3.0);

        let (descriptor, alt1): (String, f64) = conn
            .query_row(
                "SELECT alt_descriptor, altitude1 FROM approach_leg WHERE fix_ident = 'FOURT'",
                [],
                |r| Ok((r.get(0)?, r.get(1)?)),
            )
            .unwrap();
        assert_eq!(descriptor, "+");
        assert_eq!(alt1, 2800.0);

        let sid_legs: i64 = conn
            .query_row(
                "SELECT count(*) FROM approach_leg l JOIN approach a USING (approach_id)
                 WHERE a.procedure_type = 'SID' AND a.runway_name = '16L'",
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(sid_legs, 2);
    }

    #[test]
    fn procedures_of_unknown_airport_are_skipped() {
        let (conn, options) = test_context();
        let mut ctx = WriteContext::new(&conn, &options);
        let dir = tempfile::tempdir().unwrap();
        let path = data_file(&dir, "CIFP/KXXX.dat", CIFP);

        read_file(&mut ctx, &path, XpFormat::Cifp, &mut XpCifpReader::new("KXXX")).unwrap();
        assert_eq!(count(&conn, "approach"), 0);
        assert_eq!(ctx.counters.errors, 1);
    }

    #[test]
    fn altitudes_and_tenths() {
        assert_eq!(altitude("FL180"), Some(18_000.0));
        assert_eq!(altitude("02800"), Some(2800.0));
        assert_eq!(altitude("     "), None);
        assert_eq!(tenths("1630"), Some(163.0));
        assert_eq!(tenths("1630T"), Some(163.0));
    }
}
