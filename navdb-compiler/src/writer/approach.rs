//! Procedures. BGL approaches, SIDs and STARs and X-Plane CIFP records are
//! converted to [`ProcedureRow`] and written by [`write_procedure`].

use bgl_reader::ap::{Airport, ApproachLeg, FixRef, SidStar};
use rusqlite::params;

use super::ids::Table;
use super::WriteContext;
use crate::error::Result;
use crate::geometry::{meter_to_feet, meter_to_nm};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ProcedureType {
    #[default]
    Approach,
    Sid,
    Star,
}

impl ProcedureType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Approach => "APPROACH",
            Self::Sid      => "SID",
            Self::Star     => "STAR",
        }
    }
}

/// Fix reference with `V`, `N`, `W`, `TN`, `TW`, `R` or `L` type.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FixRow {
    pub fix_type: String,
    pub ident: String,
    pub region: String,
    pub airport: String,
}

fn non_empty(s: &str) -> Option<&str> {
    let s = s.trim();
    (!s.is_empty()).then_some(s)
}

impl FixRow {
    pub fn new(fix_type: &str, ident: &str, region: &str) -> Self {
        Self { fix_type: fix_type.to_string(), ident: ident.to_string(), region: region.to_string(), airport: String::new() }
    }

    pub fn is_empty(&self) -> bool {
        self.ident.trim().is_empty()
    }
}

impl From<&FixRef> for FixRow {
    fn from(fix: &FixRef) -> Self {
        Self {
            fix_type: fix.type_str().to_string(),
            ident: fix.ident.clone(),
            region: fix.region.clone(),
            airport: fix.airport.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LegRow {
    pub leg_type: String,
    pub alt_descriptor: String,
    pub turn_direction: String,
    pub fix: FixRow,
    pub recommended: FixRow,
    pub is_missed: bool,
    pub is_flyover: bool,
    pub is_true_course: bool,
    pub course: Option<f64>,
    /// Nautical miles.
    pub distance: Option<f64>,
    /// Minutes.
    pub time: Option<f64>,
    pub theta: Option<f64>,
    pub rho: Option<f64>,
    /// Feet.
    pub altitude1: Option<f64>,
    pub altitude2: Option<f64>,
    pub speed_limit: Option<f64>,
    pub vertical_angle: Option<f64>,
}

fn non_zero(v: f32) -> Option<f64> {
    (v != 0.0).then_some(f64::from(v))
}

impl From<&ApproachLeg> for LegRow {
    fn from(leg: &ApproachLeg) -> Self {
        let dist_time = non_zero(leg.dist_time);
        Self {
            leg_type: leg.type_str().to_string(),
            alt_descriptor: bgl_reader::ap::approach::alt_descriptor_to_str(leg.alt_descriptor).to_string(),
            turn_direction: bgl_reader::ap::approach::turn_direction_to_str(leg.turn_direction).to_string(),
            fix: FixRow::from(&leg.fix),
            recommended: FixRow::from(&leg.recommended),
            is_missed: leg.missed,
            is_flyover: leg.fly_over,
            is_true_course: leg.true_course,
            course: Some(f64::from(leg.course)),
            distance: if leg.time { None } else { dist_time },
            time: if leg.time { dist_time } else { None },
            theta: Some(f64::from(leg.theta)),
            rho: Some(f64::from(leg.rho)),
            altitude1: non_zero(leg.altitude1).map(meter_to_feet),
            altitude2: non_zero(leg.altitude2).map(meter_to_feet),
            speed_limit: non_zero(leg.speed_limit),
            vertical_angle: non_zero(leg.vertical_angle),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransitionRow {
    /// `F` full or `D` DME arc.
    pub transition_type: String,
    pub fix: FixRow,
    pub altitude: Option<f64>,
    pub dme: Option<FixRow>,
    pub dme_radial: Option<f64>,
    /// Nautical miles.
    pub dme_distance: Option<f64>,
    pub legs: Vec<LegRow>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcedureRow {
    pub procedure_type: ProcedureType,
    pub approach_type: String,
    pub suffix: String,
    pub runway_name: Option<String>,
    pub arinc_name: String,
    pub gps_overlay: bool,
    pub fix: FixRow,
    pub altitude: Option<f64>,
    pub heading: Option<f64>,
    pub missed_altitude: Option<f64>,
    /// Final and missed legs in flying order.
    pub legs: Vec<LegRow>,
    pub transitions: Vec<TransitionRow>,
}

/// ARINC 424 approach name like `I16R` or `R34L-Y`.
pub fn arinc_approach_name(approach_type: &str, runway: Option<&str>, suffix: &str) -> String {
    let code = match approach_type {
        "ILS"    => "I",
        "LOC"    => "L",
        "LOCB"   => "B",
        "VOR"    => "V",
        "VORDME" => "D",
        "NDB"    => "N",
        "NDBDME" => "Q",
        "RNAV"   => "R",
        "SDF"    => "U",
        "LDA"    => "X",
        _        => "P",
    };
    let mut name = format!("{code}{}", runway.unwrap_or(""));
    if !suffix.is_empty() {
        name.push('-');
        name.push_str(suffix);
    }
    name
}

// ── BGL conversion ───────────────────────────────────────────────────────────

fn bgl_legs(legs: &[ApproachLeg]) -> Vec<LegRow> {
    legs.iter().map(LegRow::from).collect()
}

pub fn bgl_sid_star(sid_star: &SidStar) -> Vec<ProcedureRow> {
    let (procedure_type, suffix) = if sid_star.is_sid { (ProcedureType::Sid, "D") } else { (ProcedureType::Star, "A") };
    let transitions: Vec<TransitionRow> = sid_star
        .enroute_transitions
        .iter()
        .map(|(fix, legs)| TransitionRow {
            transition_type: "F".to_string(),
            fix: FixRow::new("W", fix, ""),
            legs: bgl_legs(legs),
            ..TransitionRow::default()
        })
        .collect();

    let mut runways: Vec<Option<&str>> = sid_star
        .runway_transitions
        .keys()
        .map(|rw| (rw != "ALL").then_some(rw.as_str()))
        .collect();
    if runways.is_empty() {
        runways.push(None);
    }

    runways
        .into_iter()
        .map(|runway| {
            let legs = match runway {
                Some(rw) => sid_star.legs_for_runway(rw),
                None => sid_star.legs_for_runway("ALL"),
            };
            ProcedureRow {
                procedure_type,
                approach_type: "GPS".to_string(),
                suffix: suffix.to_string(),
                runway_name: runway.map(str::to_string),
                arinc_name: sid_star.ident.clone(),
                fix: legs.last().map(|l| FixRow::from(&l.fix)).unwrap_or_default(),
                legs: bgl_legs(&legs),
                transitions: transitions.clone(),
                ..ProcedureRow::default()
            }
        })
        .collect()
}

/// Approaches, SIDs and STARs of a BGL airport. Invalid procedures are
/// dropped with a warning.
pub fn bgl_procedures(airport: &Airport) -> Vec<ProcedureRow> {
    let mut procedures = Vec::new();
    for approach in &airport.approaches {
        if !approach.is_valid() {
            tracing::warn!("Skipping invalid approach at {} runway {}", airport.ident, approach.runway_name);
            continue;
        }
        let runway = non_empty(&approach.runway_name);
        procedures.push(ProcedureRow {
            procedure_type: ProcedureType::Approach,
            approach_type: approach.type_str().to_string(),
            suffix: approach.suffix.clone(),
            runway_name: runway.map(str::to_string),
            arinc_name: arinc_approach_name(approach.type_str(), runway, &approach.suffix),
            gps_overlay: approach.gps_overlay,
            fix: FixRow::from(&approach.fix),
            altitude: non_zero(approach.altitude).map(meter_to_feet),
            heading: Some(f64::from(approach.heading)),
            missed_altitude: non_zero(approach.missed_altitude).map(meter_to_feet),
            legs: bgl_legs(&approach.legs).into_iter().chain(bgl_legs(&approach.missed_legs)).collect(),
            transitions: approach
                .transitions
                .iter()
                .map(|t| TransitionRow {
                    transition_type: t.transition_type.to_string(),
                    fix: FixRow::from(&t.fix),
                    altitude: non_zero(t.altitude).map(meter_to_feet),
                    dme: (t.transition_type == "D").then(|| FixRow {
                        fix_type: String::new(),
                        ident: t.dme_ident.clone(),
                        region: t.dme_region.clone(),
                        airport: t.dme_airport.clone(),
                    }),
                    dme_radial: (t.transition_type == "D").then_some(f64::from(t.dme_radial)),
                    dme_distance: (t.transition_type == "D").then(|| meter_to_nm(f64::from(t.dme_distance))),
                    legs: bgl_legs(&t.legs),
                })
                .collect(),
        });
    }

    for sid_star in &airport.sid_stars {
        if sid_star.is_valid() {
            procedures.extend(bgl_sid_star(sid_star));
        } else {
            tracing::warn!("Skipping invalid SID/STAR {} at {}", sid_star.ident, airport.ident);
        }
    }
    procedures
}

// ── Writing ──────────────────────────────────────────────────────────────────

const LEG_COLUMNS: &str = "type, alt_descriptor, turn_direction, fix_type, fix_ident, fix_region, fix_airport_ident, \
     recommended_fix_type, recommended_fix_ident, recommended_fix_region, is_flyover, is_true_course, \
     course, distance, time, theta, rho, altitude1, altitude2, speed_limit, vertical_angle";

const LEG_VALUES: &str = "?4,?5,?6,?7,?8,?9,?10,?11,?12,?13,?14,?15,?16,?17,?18,?19,?20,?21,?22,?23,?24";

fn insert_leg(ctx: &mut WriteContext, table: Table, parent_id: i64, leg: &LegRow) -> Result<()> {
    let id = ctx.ids.next(table);
    // transition legs carry no missed flag, ?3 is bound and ignored
    let sql = if table == Table::ApproachLeg {
        format!("INSERT INTO approach_leg (approach_leg_id, approach_id, is_missed, {LEG_COLUMNS}) VALUES (?1,?2,?3,{LEG_VALUES})")
    } else {
        format!("INSERT INTO transition_leg (transition_leg_id, transition_id, {LEG_COLUMNS}) VALUES (?1,?2,{LEG_VALUES})")
    };
    ctx.conn.prepare_cached(&sql)?.execute(params![
        id,
        parent_id,
        leg.is_missed,
        leg.leg_type,
        non_empty(&leg.alt_descriptor),
        non_empty(&leg.turn_direction),
        non_empty(&leg.fix.fix_type),
        non_empty(&leg.fix.ident),
        non_empty(&leg.fix.region),
        non_empty(&leg.fix.airport),
        non_empty(&leg.recommended.fix_type),
        non_empty(&leg.recommended.ident),
        non_empty(&leg.recommended.region),
        leg.is_flyover,
        leg.is_true_course,
        leg.course,
        leg.distance,
        leg.time,
        leg.theta,
        leg.rho,
        leg.altitude1,
        leg.altitude2,
        leg.speed_limit,
        leg.vertical_angle,
    ])?;
    Ok(())
}

/// Writes one procedure with its legs and transitions and returns the id.
pub fn write_procedure(ctx: &mut WriteContext, airport_id: i64, airport_ident: &str, proc: &ProcedureRow) -> Result<i64> {
    let approach_id = ctx.ids.next(Table::Approach);
    let runway_end_id = proc
        .runway_name
        .as_deref()
        .and_then(|rw| ctx.index.runway_end_best_fit(airport_ident, rw))
        .map(|e| e.id);

    ctx.conn
        .prepare_cached(
            "INSERT INTO approach
             (approach_id, airport_id, runway_end_id, airport_ident, runway_name, arinc_name, procedure_type,
              type, suffix, has_gps_overlay, fix_type, fix_ident, fix_region, fix_airport_ident,
              altitude, heading, missed_altitude)
             VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13,?14,?15,?16,?17)",
        )?
        .execute(params![
            approach_id,
            airport_id,
            runway_end_id,
            airport_ident,
            proc.runway_name,
            non_empty(&proc.arinc_name),
            proc.procedure_type.as_str(),
            proc.approach_type,
            non_empty(&proc.suffix),
            proc.gps_overlay,
            non_empty(&proc.fix.fix_type),
            non_empty(&proc.fix.ident),
            non_empty(&proc.fix.region),
            non_empty(&proc.fix.airport),
            proc.altitude.map(|a| a.round() as i64),
            proc.heading,
            proc.missed_altitude.map(|a| a.round() as i64),
        ])?;

    for leg in &proc.legs {
        insert_leg(ctx, Table::ApproachLeg, approach_id, leg)?;
    }

    for transition in &proc.transitions {
        let transition_id = ctx.ids.next(Table::Transition);
        let dme = transition.dme.as_ref();
        ctx.conn
            .prepare_cached(
                "INSERT INTO transition
                 (transition_id, approach_id, type, fix_type, fix_ident, fix_region, fix_airport_ident, altitude,
                  dme_ident, dme_region, dme_airport_ident, dme_radial, dme_distance)
                 VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13)",
            )?
            .execute(params![
                transition_id,
                approach_id,
                transition.transition_type,
                non_empty(&transition.fix.fix_type),
                transition.fix.ident,
                non_empty(&transition.fix.region),
                non_empty(&transition.fix.airport),
                transition.altitude.map(|a| a.round() as i64),
                dme.and_then(|d| non_empty(&d.ident)),
                dme.and_then(|d| non_empty(&d.region)),
                dme.and_then(|d| non_empty(&d.airport)),
                transition.dme_radial,
                transition.dme_distance,
            ])?;
        for leg in &transition.legs {
            insert_leg(ctx, Table::TransitionLeg, transition_id, leg)?;
        }
    }

    ctx.counters.procedures += 1;
    Ok(approach_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::testutil::test_context;
    use bgl_reader::ap::approach::Approach;
    use std::collections::BTreeMap;

    fn leg(leg_type: u8, ident: &str) -> ApproachLeg {
        ApproachLeg {
            leg_type,
            fix: FixRef { fix_type: 5, ident: ident.into(), region: "K1".into(), airport: String::new() },
            altitude1: 914.4,
            ..ApproachLeg::default()
        }
    }

    #[test]
    fn arinc_names() {
        assert_eq!(arinc_approach_name("ILS", Some("16R"), ""), "I16R");
        assert_eq!(arinc_approach_name("RNAV", Some("34L"), "Y"), "R34L-Y");
        assert_eq!(arinc_approach_name("VOR", None, "A"), "V-A");
    }

    #[test]
    fn sid_becomes_one_procedure_per_runway() {
        let sid = SidStar {
            ident: "SUMMA2".into(),
            is_sid: true,
            common_route_legs: vec![leg(18, "SUMMA")],
            runway_transitions: BTreeMap::from([("16L".into(), vec![leg(2, "")]), ("16R".into(), vec![leg(2, "")])]),
            enroute_transitions: BTreeMap::from([("BTG".into(), vec![leg(18, "BTG")])]),
        };
        let rows = bgl_sid_star(&sid);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].runway_name.as_deref(), Some("16L"));
        assert_eq!(rows[0].procedure_type, ProcedureType::Sid);
        assert_eq!(rows[0].legs[0].leg_type, "CA");
        assert_eq!(rows[0].legs[1].fix.ident, "SUMMA");
        assert_eq!(rows[1].transitions[0].fix.ident, "BTG");
        assert!((rows[0].legs[1].altitude1.unwrap() - 3000.0).abs() < 0.1);
    }

    #[test]
    fn approach_with_missed_legs_and_transition() {
        let (conn, options) = test_context();
        let mut ctx = WriteContext::new(&conn, &options);
        ctx.index.add_airport("KSEA", 1, geo::Point::new(-122.3, 47.45));
        ctx.index.add_runway_end("KSEA", "16R", 7, geo::Point::new(-122.31, 47.46));

        let airport = Airport {
            ident: "KSEA".into(),
            approaches: vec![Approach {
                runway_name: "16R".into(),
                approach_type: 4,
                legs: vec![leg(15, "FOURT"), leg(18, "RW16R")],
                missed_legs: vec![leg(2, "")].into_iter().map(|l| ApproachLeg { missed: true, ..l }).collect(),
                ..Approach::default()
            }],
            ..Airport::default()
        };
        let procedures = bgl_procedures(&airport);
        assert_eq!(procedures.len(), 1);
        let id = write_procedure(&mut ctx, 1, "KSEA", &procedures[0]).unwrap();

        let (arinc, runway_end_id): (String, i64) = conn
            .query_row("SELECT arinc_name, runway_end_id FROM approach WHERE approach_id = ?1", [id], |r| {
                Ok((r.get(0)?, r.get(1)?))
            })
            .unwrap();
        assert_eq!(arinc, "I16R");
        assert_eq!(runway_end_id, 7);
        let missed: i64 = conn
            .query_row("SELECT count(*) FROM approach_leg WHERE is_missed = 1", [], |r| r.get(0))
            .unwrap();
        assert_eq!(missed, 1);
    }
}
