//! Small airport subrecords: frequencies, start positions and helipads.

use crate::converter;
use crate::position::BglPosition;
use crate::record::{Record, RECORD_HEADER_LEN};
use crate::stream::{BinaryStream, TextEncoding};

// ── Com ───────────────────────────────────────────────────────────────────────

pub fn com_type_to_str(com_type: u16) -> &'static str {
    match com_type {
        0x0001 => "A",   // ATIS
        0x0002 => "M",   // multicom
        0x0003 => "U",   // unicom
        0x0004 => "CTAF",
        0x0005 => "G",   // ground
        0x0006 => "T",   // tower
        0x0007 => "C",   // clearance
        0x0008 => "AP",  // approach
        0x0009 => "D",   // departure
        0x000a => "CTR", // center
        0x000b => "FSS",
        0x000c => "AWOS",
        0x000d => "ASOS",
        0x000e => "CPT", // clearance pre-taxi
        0x000f => "GCO", // remote clearance delivery
        _ => {
            tracing::warn!("Invalid com type {com_type}");
            "INVALID"
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Com {
    pub com_type: u16,
    /// Frequency in kHz.
    pub frequency: u32,
    pub name: String,
}

impl Com {
    /// `type: u16, frequency: u32 (Hz), name: rest of record`.
    pub fn read(bs: &mut BinaryStream, encoding: TextEncoding) -> Self {
        let record = Record::read(bs);
        let com_type = bs.read_u16();
        let frequency = bs.read_u32() / 1000;
        let name_len = (record.size as usize).saturating_sub(RECORD_HEADER_LEN + 6);
        let name = bs.read_string(name_len, encoding);
        record.seek_to_end(bs);
        Self { com_type, frequency, name }
    }

    pub fn type_str(&self) -> &'static str {
        com_type_to_str(self.com_type)
    }
}

// ── Start ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Start {
    /// Runway name or helipad number.
    pub runway_name: String,
    /// `R` runway, `W` water, `H` helipad.
    pub start_type: &'static str,
    pub position: BglPosition,
    pub heading: f32,
}

impl Start {
    /// `runway: u8, designator/type: u8 (low nibble designator, high nibble type), position, heading: f32`.
    pub fn read(bs: &mut BinaryStream) -> Self {
        let record = Record::read(bs);
        let number = bs.read_u8();
        let flags = bs.read_u8();
        let start_type = match flags >> 4 {
            1 => "R",
            2 => "W",
            3 => "H",
            other => {
                tracing::warn!("Invalid start type {other}");
                "INVALID"
            }
        };
        let runway_name = if start_type == "H" {
            number.to_string()
        } else {
            converter::runway_to_str(number, flags & 0x0f)
        };
        let start = Self {
            runway_name,
            start_type,
            position: BglPosition::read(bs, true),
            heading: bs.read_f32(),
        };
        record.seek_to_end(bs);
        start
    }
}

// ── Helipad ───────────────────────────────────────────────────────────────────

pub fn helipad_type_to_str(helipad_type: u8) -> &'static str {
    match helipad_type {
        0 => "NONE",
        1 => "H",
        2 => "SQUARE",
        3 => "CIRCLE",
        4 => "MEDICAL",
        _ => {
            tracing::warn!("Invalid helipad type {helipad_type}");
            "INVALID"
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Helipad {
    pub surface: u16,
    pub helipad_type: u8,
    pub closed: bool,
    pub transparent: bool,
    pub position: BglPosition,
    /// Meters.
    pub length: f32,
    pub width: f32,
    pub heading: f32,
}

impl Helipad {
    /// `surface: u8, flags: u8 (type low nibble, 0x10 transparent, 0x20 closed), color: u32, position, length, width, heading`.
    pub fn read(bs: &mut BinaryStream) -> Self {
        let record = Record::read(bs);
        let surface = u16::from(bs.read_u8());
        let flags = bs.read_u8();
        bs.skip(4);
        let helipad = Self {
            surface,
            helipad_type: flags & 0x0f,
            transparent: flags & 0x10 != 0,
            closed: flags & 0x20 != 0,
            position: BglPosition::read(bs, true),
            length: bs.read_f32(),
            width: bs.read_f32(),
            heading: bs.read_f32(),
        };
        record.seek_to_end(bs);
        helipad
    }

    pub fn type_str(&self) -> &'static str {
        helipad_type_to_str(self.helipad_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::rec;
    use crate::testutil::RecordBuilder;

    #[test]
    fn com_frequency_and_name() {
        let data = RecordBuilder::new(rec::COM)
            .u16(0x0006)
            .u32(118_700_000)
            .bytes(b"SEATTLE TOWER\0\0\0")
            .finish();
        let mut bs = BinaryStream::new(data);
        let com = Com::read(&mut bs, TextEncoding::Latin1);
        assert_eq!(com.frequency, 118_700);
        assert_eq!(com.type_str(), "T");
        assert_eq!(com.name, "SEATTLE TOWER");
    }

    #[test]
    fn helipad_start_uses_number() {
        let data = RecordBuilder::new(rec::START)
            .u8(2)
            .u8(0x30)
            .position(-122.0, 47.0, 0.0)
            .f32(90.0)
            .finish();
        let mut bs = BinaryStream::new(data);
        let start = Start::read(&mut bs);
        assert_eq!(start.start_type, "H");
        assert_eq!(start.runway_name, "2");
        assert_eq!(start.heading, 90.0);
    }
}
