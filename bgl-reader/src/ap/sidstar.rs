use std::collections::BTreeMap;

use crate::ap::approach::{read_legs, ApproachLeg};
use crate::converter;
use crate::record::{rec, Record, RECORD_HEADER_LEN};
use crate::stream::{BinaryStream, TextEncoding};
use crate::ReadContext;

/// Departure or arrival procedure.
///
/// ```text
/// runway transitions u8 | enroute transitions u8 | common legs u8 | unused u8
/// ident : 8 bytes
/// subrecords:
///   LEGS                 common route
///   RUNWAY_TRANSITIONS   runway number u8, designator u8, legs
///   ENROUTE_TRANSITIONS  fix ident u32, legs
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SidStar {
    pub ident: String,
    pub is_sid: bool,
    pub common_route_legs: Vec<ApproachLeg>,
    /// Keyed by runway name, `ALL` for procedures valid for every runway.
    pub runway_transitions: BTreeMap<String, Vec<ApproachLeg>>,
    /// Keyed by transition fix ident.
    pub enroute_transitions: BTreeMap<String, Vec<ApproachLeg>>,
}

impl SidStar {
    pub fn read(ctx: &ReadContext, bs: &mut BinaryStream) -> Self {
        let record = Record::read(bs);
        bs.skip(4);
        let mut sid_star = SidStar {
            ident: bs.read_string(8, TextEncoding::Latin1),
            is_sid: record.id == rec::SID,
            ..SidStar::default()
        };

        let cursor = record.subrecords(bs);
        while let Some(sub) = cursor.next(bs) {
            bs.skip(RECORD_HEADER_LEN);
            match sub.id {
                rec::LEGS => sid_star.common_route_legs = read_legs(ctx, bs, false),
                rec::RUNWAY_TRANSITIONS => {
                    let number = bs.read_u8();
                    let designator = bs.read_u8();
                    let name = if number == 0 {
                        "ALL".to_string()
                    } else {
                        converter::runway_to_str(number, designator)
                    };
                    sid_star.runway_transitions.insert(name, read_legs(ctx, bs, false));
                }
                rec::ENROUTE_TRANSITIONS => {
                    let fix = converter::int_to_icao(bs.read_u32(), false);
                    sid_star.enroute_transitions.insert(fix, read_legs(ctx, bs, false));
                }
                other => tracing::debug!("Unexpected SID/STAR subrecord 0x{other:04x}"),
            }
            sub.seek_to_end(bs);
        }
        record.seek_to_end(bs);
        sid_star
    }

    /// All legs need a known type.
    pub fn is_valid(&self) -> bool {
        self.common_route_legs
            .iter()
            .chain(self.runway_transitions.values().flatten())
            .chain(self.enroute_transitions.values().flatten())
            .all(ApproachLeg::is_valid)
    }

    /// Procedure legs for one runway: runway part first for departures,
    /// common route first for arrivals.
    pub fn legs_for_runway(&self, runway: &str) -> Vec<ApproachLeg> {
        let runway_legs = self.runway_transitions.get(runway).cloned().unwrap_or_default();
        if self.is_sid {
            runway_legs.into_iter().chain(self.common_route_legs.iter().cloned()).collect()
        } else {
            self.common_route_legs.iter().cloned().chain(runway_legs).collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::StructureType;
    use crate::testutil::{leg_bytes, RecordBuilder};
    use navdata_schema::NavDatabaseOptions;

    #[test]
    fn departure_orders_runway_part_first() {
        let s = StructureType::Fsx;
        let common = RecordBuilder::new(rec::LEGS).u16(1).bytes(&leg_bytes(s, 18, "BANGR", 5)).finish();
        let runway = RecordBuilder::new(rec::RUNWAY_TRANSITIONS)
            .u8(16)
            .u8(1)
            .u16(1)
            .bytes(&leg_bytes(s, 19, "", 0))
            .finish();
        let enroute = RecordBuilder::new(rec::ENROUTE_TRANSITIONS)
            .u32(converter::icao_to_int("ELN") << 5)
            .u16(1)
            .bytes(&leg_bytes(s, 18, "ELN", 2))
            .finish();
        let mut ident = b"BANGR9".to_vec();
        ident.resize(8, 0);
        let data = RecordBuilder::new(rec::SID)
            .bytes(&[1, 1, 1, 0])
            .bytes(&ident)
            .bytes(&common)
            .bytes(&runway)
            .bytes(&enroute)
            .finish();

        let options = NavDatabaseOptions::default();
        let mut bs = BinaryStream::new(data);
        let sid = SidStar::read(&ReadContext::new(&options, s), &mut bs);
        assert!(sid.is_sid);
        assert_eq!(sid.ident, "BANGR9");
        let legs = sid.legs_for_runway("16L");
        assert_eq!(legs.iter().map(ApproachLeg::type_str).collect::<Vec<_>>(), ["VA", "TF"]);
        assert!(sid.enroute_transitions.contains_key("ELN"));
        assert!(sid.is_valid());
    }
}
