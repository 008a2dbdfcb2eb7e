//! Parking spots and gates.
//!
//! Flags word:
//!
//! ```text
//! bits 0..6    name          (& 0x3f)
//! bits 6..8    push back     (>> 6  & 0x3)
//! bits 8..12   type          (>> 8  & 0xf)
//! bits 12..24  number        (>> 12 & 0xfff)
//! bits 24..32  airline codes (>> 24 & 0xff)
//! ```

use crate::position::BglPosition;
use crate::stream::{bits, BinaryStream, TextEncoding};
use crate::ReadContext;

const TYPES: [&str; 17] = [
    "UNKNOWN", "RGA", "RGAS", "RGAM", "RGAL", "RC", "RMC", "RMCB", "GS", "GM", "GH", "DGA", "FUEL",
    "V", "RE", "GE", "UNKN",
];

const NAMES: [&str; 38] = [
    "NONE", "P", "NP", "NEP", "EP", "SEP", "SP", "SWP", "WP", "NWP", "G", "D", "GA", "GB", "GC", "GD",
    "GE", "GF", "GG", "GH", "GI", "GJ", "GK", "GL", "GM", "GN", "GO", "GP", "GQ", "GR", "GS", "GT",
    "GU", "GV", "GW", "GX", "GY", "GZ",
];

const PUSH_BACK: [&str; 4] = ["NONE", "L", "R", "B"];

fn lookup(table: &[&'static str], value: u32, what: &str) -> &'static str {
    match table.get(value as usize) {
        Some(s) => s,
        None => {
            tracing::warn!("Invalid parking {what} {value}");
            "INVALID"
        }
    }
}

pub fn parking_type_to_str(value: u32) -> &'static str {
    lookup(&TYPES, value, "type")
}

pub fn parking_name_to_str(value: u32) -> &'static str {
    lookup(&NAMES, value, "name")
}

pub fn push_back_to_str(value: u32) -> &'static str {
    lookup(&PUSH_BACK, value, "push back")
}

/// Suffix `0` is none, `1..=26` are `A` to `Z`.
pub fn parking_suffix_to_str(value: u32) -> String {
    match value {
        0 => "NONE".to_string(),
        1..=26 => char::from(b'A' + (value - 1) as u8).to_string(),
        _ => {
            tracing::warn!("Invalid parking suffix {value}");
            "INVALID".to_string()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Parking {
    pub name: u32,
    pub push_back: u32,
    pub parking_type: u32,
    pub number: u32,
    pub suffix: u32,
    pub radius: f32,
    pub heading: f32,
    pub position: BglPosition,
    pub airline_codes: Vec<String>,
    pub jetway: bool,
}

impl Parking {
    pub fn read(ctx: &ReadContext, bs: &mut BinaryStream) -> Self {
        let layout = ctx.layout();
        let flags = bs.read_u32();
        let num_airline_codes = bits(flags, 24, 0xff);

        let mut parking = Parking {
            name: flags & 0x3f,
            push_back: bits(flags, 6, 0x3),
            parking_type: bits(flags, 8, 0xf),
            number: bits(flags, 12, 0xfff),
            radius: bs.read_f32(),
            heading: bs.read_f32(),
            ..Parking::default()
        };

        if layout.parking_tee_offsets {
            bs.skip(16);
        }
        parking.position = BglPosition::read(bs, false);

        for _ in 0..num_airline_codes {
            parking.airline_codes.push(bs.read_string(4, TextEncoding::Latin1));
        }

        bs.skip(layout.parking_trailing_skip);
        if layout.parking_suffix {
            bs.skip(1);
            parking.suffix = u32::from(bs.read_u8());
            bs.skip(18);
        }
        parking
    }

    pub fn type_str(&self) -> &'static str {
        parking_type_to_str(self.parking_type)
    }

    pub fn name_str(&self) -> &'static str {
        parking_name_to_str(self.name)
    }

    pub fn push_back_str(&self) -> &'static str {
        push_back_to_str(self.push_back)
    }

    pub fn suffix_str(&self) -> String {
        parking_suffix_to_str(self.suffix)
    }

    /// Gates, as opposed to ramp and fuel spots.
    pub fn is_gate(&self) -> bool {
        matches!(self.type_str(), "GS" | "GM" | "GH" | "DGA")
    }

    pub fn is_ramp_ga(&self) -> bool {
        self.type_str().starts_with("RGA")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::StructureType;
    use crate::testutil::parking_bytes;
    use navdata_schema::NavDatabaseOptions;

    #[test]
    fn core_fields_identical_for_all_structures() {
        let options = NavDatabaseOptions::default();
        // name GA (12), push back both, gate medium (9), number 42, 2 airline codes
        let flags = 12 | (3 << 6) | (9 << 8) | (42 << 12) | (2 << 24);
        let mut decoded = Vec::new();
        for structure in StructureType::ALL {
            let data = parking_bytes(structure, flags, &["SWR", "DLH"], 8.55, 47.45);
            let len = data.len();
            let mut bs = BinaryStream::new(data);
            let p = Parking::read(&ReadContext::new(&options, structure), &mut bs);
            assert_eq!(bs.tell(), len, "{structure:?}");
            decoded.push(p);
        }
        for p in &decoded {
            assert_eq!((p.name_str(), p.push_back_str(), p.type_str(), p.number), ("GA", "B", "GM", 42));
            assert_eq!(p.airline_codes, ["SWR", "DLH"]);
            assert!((p.position.lat - 47.45).abs() < 1e-6);
            assert_eq!(p.heading, 270.0);
        }
        assert_eq!(decoded[4].suffix_str(), "C");
        assert_eq!(decoded[1].suffix_str(), "NONE");
    }

    #[test]
    fn unknown_values_map_to_invalid() {
        assert_eq!(parking_type_to_str(16), "UNKN");
        assert_eq!(parking_type_to_str(17), "INVALID");
        assert_eq!(parking_name_to_str(63), "INVALID");
        assert_eq!(parking_suffix_to_str(40), "INVALID");
    }
}
