//! Approaches, transitions and their legs.
//!
//! Leg (44 bytes, 52 with speed and vertical angle):
//!
//! ```text
//! type u8 | alt descriptor u8 | turn direction u8 | flags u8
//! fix          : u32 (type low 5 bits, ident above)   fix region/airport : u32
//! recommended  : u32 (type low 5 bits, ident above)   recommended region : u32
//! theta, rho, course, distance/time, altitude1, altitude2 : f32
//! [speed limit, vertical angle : f32]
//! ```

use crate::converter;
use crate::record::{rec, Record, RECORD_HEADER_LEN};
use crate::stream::BinaryStream;
use crate::ReadContext;

pub fn leg_type_to_str(leg_type: u8) -> &'static str {
    const TYPES: [&str; 24] = [
        "", "AF", "CA", "CD", "CF", "CI", "CR", "DF", "FA", "FC", "FD", "FM", "HA", "HF", "HM", "IF",
        "PI", "RF", "TF", "VA", "VD", "VI", "VM", "VR",
    ];
    match TYPES.get(leg_type as usize) {
        Some(s) if !s.is_empty() => s,
        _ => {
            tracing::warn!("Invalid leg type {leg_type}");
            "INVALID"
        }
    }
}

pub fn alt_descriptor_to_str(descriptor: u8) -> &'static str {
    match descriptor {
        0 => "",
        1 => "A",
        2 => "+",
        3 => "-",
        4 => "B",
        _ => {
            tracing::warn!("Invalid altitude descriptor {descriptor}");
            "INVALID"
        }
    }
}

pub fn turn_direction_to_str(turn: u8) -> &'static str {
    match turn {
        0 => "",
        1 => "L",
        2 => "R",
        3 => "B",
        _ => {
            tracing::warn!("Invalid turn direction {turn}");
            "INVALID"
        }
    }
}

pub fn fix_type_to_str(fix_type: u32) -> &'static str {
    match fix_type {
        0  => "",
        2  => "V",
        3  => "N",
        4  => "TN",
        5  => "W",
        6  => "TW",
        9  => "R",
        11 => "L",
        _ => {
            tracing::warn!("Invalid fix type {fix_type}");
            "INVALID"
        }
    }
}

pub fn approach_type_to_str(approach_type: u8) -> &'static str {
    match approach_type {
        1  => "GPS",
        2  => "VOR",
        3  => "NDB",
        4  => "ILS",
        5  => "LOC",
        6  => "SDF",
        7  => "LDA",
        8  => "VORDME",
        9  => "NDBDME",
        10 => "RNAV",
        11 => "LOCB",
        _ => {
            tracing::warn!("Invalid approach type {approach_type}");
            "INVALID"
        }
    }
}

/// Packed fix reference: type in the low five bits, ident above.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FixRef {
    pub fix_type: u32,
    pub ident: String,
    pub region: String,
    pub airport: String,
}

impl FixRef {
    pub fn read(bs: &mut BinaryStream) -> Self {
        let packed = bs.read_u32();
        let (region, airport) = converter::region_and_airport(bs.read_u32());
        Self {
            fix_type: packed & 0x1f,
            ident: converter::int_to_icao(packed, false),
            region,
            airport,
        }
    }

    pub fn type_str(&self) -> &'static str {
        fix_type_to_str(self.fix_type)
    }

    pub fn is_empty(&self) -> bool {
        self.ident.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ApproachLeg {
    pub leg_type: u8,
    pub alt_descriptor: u8,
    pub turn_direction: u8,
    pub true_course: bool,
    pub time: bool,
    pub fly_over: bool,
    pub fix: FixRef,
    pub recommended: FixRef,
    pub theta: f32,
    /// Nautical miles.
    pub rho: f32,
    pub course: f32,
    /// Nautical miles or minutes if `time` is set.
    pub dist_time: f32,
    /// Meters.
    pub altitude1: f32,
    pub altitude2: f32,
    /// Knots, 0 if not restricted.
    pub speed_limit: f32,
    pub vertical_angle: f32,
    pub missed: bool,
}

impl ApproachLeg {
    pub fn read(ctx: &ReadContext, bs: &mut BinaryStream, missed: bool) -> Self {
        let leg_type = bs.read_u8();
        let alt_descriptor = bs.read_u8();
        let turn_direction = bs.read_u8();
        let flags = bs.read_u8();
        let mut leg = ApproachLeg {
            leg_type,
            alt_descriptor,
            turn_direction,
            true_course: flags & 0x1 != 0,
            time: flags & 0x2 != 0,
            fly_over: flags & 0x4 != 0,
            fix: FixRef::read(bs),
            recommended: FixRef::read(bs),
            theta: bs.read_f32(),
            rho: bs.read_f32(),
            course: bs.read_f32(),
            dist_time: bs.read_f32(),
            altitude1: bs.read_f32(),
            altitude2: bs.read_f32(),
            missed,
            ..ApproachLeg::default()
        };
        if ctx.layout().leg_speed_and_angle {
            leg.speed_limit = bs.read_f32();
            leg.vertical_angle = bs.read_f32();
        }
        leg
    }

    pub fn type_str(&self) -> &'static str {
        leg_type_to_str(self.leg_type)
    }

    pub fn is_valid(&self) -> bool {
        self.type_str() != "INVALID"
    }
}

/// Legs subrecord: `count: u16` followed by the legs.
pub fn read_legs(ctx: &ReadContext, bs: &mut BinaryStream, missed: bool) -> Vec<ApproachLeg> {
    let count = bs.read_u16();
    (0..count).map(|_| ApproachLeg::read(ctx, bs, missed)).collect()
}

// ── Transition ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Transition {
    /// `F` full, `D` DME arc.
    pub transition_type: &'static str,
    pub fix: FixRef,
    pub altitude: f32,
    pub dme_ident: String,
    pub dme_region: String,
    pub dme_airport: String,
    pub dme_radial: i32,
    pub dme_distance: f32,
    pub legs: Vec<ApproachLeg>,
}

impl Transition {
    pub fn read(ctx: &ReadContext, bs: &mut BinaryStream) -> Self {
        let record = Record::read(bs);
        let type_byte = bs.read_u8();
        bs.skip(1); // number of legs, repeated in the legs subrecord
        let mut transition = Transition {
            transition_type: match type_byte {
                1 => "F",
                2 => "D",
                other => {
                    tracing::warn!("Invalid transition type {other}");
                    "INVALID"
                }
            },
            fix: FixRef::read(bs),
            altitude: bs.read_f32(),
            ..Transition::default()
        };
        if type_byte == 2 {
            transition.dme_ident = converter::int_to_icao(bs.read_u32(), false);
            let (region, airport) = converter::region_and_airport(bs.read_u32());
            transition.dme_region = region;
            transition.dme_airport = airport;
            transition.dme_radial = bs.read_i32();
            transition.dme_distance = bs.read_f32();
        }

        let cursor = record.subrecords(bs);
        while let Some(sub) = cursor.next(bs) {
            bs.skip(RECORD_HEADER_LEN);
            if sub.id == rec::TRANSITION_LEGS {
                transition.legs = read_legs(ctx, bs, false);
            } else {
                tracing::debug!("Unexpected transition subrecord 0x{:04x}", sub.id);
            }
            sub.seek_to_end(bs);
        }
        record.seek_to_end(bs);
        transition
    }
}

// ── Approach ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Approach {
    pub suffix: String,
    pub runway_name: String,
    pub approach_type: u8,
    pub gps_overlay: bool,
    pub fix: FixRef,
    /// Meters.
    pub altitude: f32,
    pub heading: f32,
    pub missed_altitude: f32,
    pub legs: Vec<ApproachLeg>,
    pub missed_legs: Vec<ApproachLeg>,
    pub transitions: Vec<Transition>,
}

impl Approach {
    /// ```text
    /// suffix u8 | runway number u8 | flags u8 (type low nibble, designator >> 4 & 0x7, 0x80 GPS overlay)
    /// transitions u8 | legs u8 | missed legs u8
    /// fix u32 | fix region/airport u32 | altitude f32 | heading f32 | missed altitude f32
    /// ```
    pub fn read(ctx: &ReadContext, bs: &mut BinaryStream) -> Self {
        let record = Record::read(bs);
        let suffix = bs.read_u8();
        let runway_number = bs.read_u8();
        let flags = bs.read_u8();
        bs.skip(3);

        let mut approach = Approach {
            suffix: if suffix == 0 { String::new() } else { char::from(suffix).to_string() },
            runway_name: if runway_number == 0 {
                String::new()
            } else {
                converter::runway_to_str(runway_number, (flags >> 4) & 0x7)
            },
            approach_type: flags & 0x0f,
            gps_overlay: flags & 0x80 != 0,
            fix: FixRef::read(bs),
            altitude: bs.read_f32(),
            heading: bs.read_f32(),
            missed_altitude: bs.read_f32(),
            ..Approach::default()
        };

        let cursor = record.subrecords(bs);
        while let Some(sub) = cursor.next(bs) {
            match sub.id {
                rec::LEGS => {
                    bs.skip(RECORD_HEADER_LEN);
                    approach.legs = read_legs(ctx, bs, false);
                }
                rec::MISSED_LEGS => {
                    bs.skip(RECORD_HEADER_LEN);
                    approach.missed_legs = read_legs(ctx, bs, true);
                }
                rec::TRANSITION => approach.transitions.push(Transition::read(ctx, bs)),
                other => tracing::debug!("Unexpected approach subrecord 0x{other:04x}"),
            }
            sub.seek_to_end(bs);
        }
        record.seek_to_end(bs);
        approach
    }

    pub fn type_str(&self) -> &'static str {
        approach_type_to_str(self.approach_type)
    }

    /// Approaches need at least one leg of a known type.
    pub fn is_valid(&self) -> bool {
        !self.legs.is_empty() && self.legs.iter().chain(&self.missed_legs).all(ApproachLeg::is_valid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::StructureType;
    use crate::testutil::{leg_bytes, RecordBuilder};
    use navdata_schema::NavDatabaseOptions;

    fn approach_bytes(structure: StructureType) -> Vec<u8> {
        let legs = RecordBuilder::new(rec::LEGS)
            .u16(2)
            .bytes(&leg_bytes(structure, 15, "CF16L", 5))
            .bytes(&leg_bytes(structure, 4, "RW16L", 9))
            .finish();
        let missed = RecordBuilder::new(rec::MISSED_LEGS)
            .u16(1)
            .bytes(&leg_bytes(structure, 19, "", 0))
            .finish();
        let trans_legs = RecordBuilder::new(rec::TRANSITION_LEGS)
            .u16(1)
            .bytes(&leg_bytes(structure, 18, "CF16L", 5))
            .finish();
        let transition = RecordBuilder::new(rec::TRANSITION)
            .u8(1)
            .u8(1)
            .fix(5, "SEA", "K1", "")
            .f32(900.0)
            .bytes(&trans_legs)
            .finish();
        RecordBuilder::new(rec::APPROACH)
            .u8(b'Z')
            .u8(16)
            .u8(4 | (1 << 4))
            .bytes(&[1, 2, 1])
            .fix(9, "RW16L", "K1", "KSEA")
            .f32(600.0)
            .f32(163.0)
            .f32(1200.0)
            .bytes(&legs)
            .bytes(&missed)
            .bytes(&transition)
            .finish()
    }

    #[test]
    fn approach_with_transition() {
        let options = NavDatabaseOptions::default();
        for structure in [StructureType::P3dV4, StructureType::Msfs] {
            let data = approach_bytes(structure);
            let len = data.len();
            let mut bs = BinaryStream::new(data);
            let ap = Approach::read(&ReadContext::new(&options, structure), &mut bs);
            assert_eq!(bs.tell(), len);
            assert_eq!(ap.type_str(), "ILS");
            assert_eq!(ap.runway_name, "16L");
            assert_eq!(ap.suffix, "Z");
            assert_eq!(ap.fix.ident, "RW16L");
            assert_eq!(ap.fix.airport, "KSEA");
            assert_eq!(ap.legs.len(), 2);
            assert_eq!(ap.legs[0].type_str(), "IF");
            assert_eq!(ap.legs[1].fix.type_str(), "R");
            assert_eq!(ap.missed_legs.len(), 1);
            assert!(ap.missed_legs[0].missed);
            assert_eq!(ap.transitions.len(), 1);
            assert_eq!(ap.transitions[0].fix.ident, "SEA");
            assert_eq!(ap.transitions[0].legs[0].type_str(), "TF");
            assert!(ap.is_valid());
        }
    }
}
