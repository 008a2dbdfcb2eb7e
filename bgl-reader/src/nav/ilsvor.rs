//! Shared part of VOR and ILS records.
//!
//! ```text
//! type u8 | flags u8 (0x1 DME only, 0x4 backcourse)
//! position  : lon u32, lat u32, alt i32
//! frequency : u32 Hz
//! range     : f32 meters
//! magvar    : f32
//! ident     : u32 packed
//! region    : u32 region and airport
//! subrecords: localizer, glideslope, DME, name
//! ```

use crate::converter;
use crate::position::BglPosition;
use crate::record::{Record, RECORD_HEADER_LEN};
use crate::stream::{BinaryStream, TextEncoding};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IlsVorType {
    Terminal,
    Low,
    High,
    Ils,
    Vot,
    Unknown(u8),
}

impl IlsVorType {
    pub fn from_u8(v: u8) -> Self {
        match v {
            1 => Self::Terminal,
            2 => Self::Low,
            3 => Self::High,
            4 => Self::Ils,
            5 => Self::Vot,
            other => Self::Unknown(other),
        }
    }

    pub fn is_vor(self) -> bool {
        matches!(self, Self::Terminal | Self::Low | Self::High | Self::Vot)
    }

    /// Range class used in the database.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Terminal   => "T",
            Self::Low        => "L",
            Self::High       => "H",
            Self::Ils        => "ILS",
            Self::Vot        => "VOT",
            Self::Unknown(_) => "INVALID",
        }
    }
}

/// Reads the type byte of an ILS/VOR record and rewinds.
pub fn peek_type(bs: &mut BinaryStream) -> IlsVorType {
    let start = bs.tell();
    bs.skip(RECORD_HEADER_LEN);
    let t = IlsVorType::from_u8(bs.read_u8());
    bs.seek(start);
    t
}

/// Fixed header of an ILS/VOR record after the record header.
#[derive(Debug, Clone, PartialEq)]
pub struct NavHeader {
    pub nav_type: IlsVorType,
    pub dme_only: bool,
    pub backcourse: bool,
    pub position: BglPosition,
    /// kHz.
    pub frequency: u32,
    /// Meters.
    pub range: f32,
    pub magvar: f32,
    pub ident: String,
    pub region: String,
    pub airport: String,
}

impl NavHeader {
    pub fn read(bs: &mut BinaryStream) -> Self {
        let nav_type = IlsVorType::from_u8(bs.read_u8());
        let flags = bs.read_u8();
        let position = BglPosition::read(bs, true);
        let frequency = bs.read_u32() / 1000;
        let range = bs.read_f32();
        let magvar = converter::adjust_magvar(bs.read_f32());
        let ident = converter::int_to_icao(bs.read_u32(), false);
        let (region, airport) = converter::region_and_airport(bs.read_u32());
        Self {
            nav_type,
            dme_only: flags & 0x1 != 0,
            backcourse: flags & 0x4 != 0,
            position,
            frequency,
            range,
            magvar,
            ident,
            region,
            airport,
        }
    }
}

/// DME subrecord: position and range.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dme {
    pub position: BglPosition,
    pub range: f32,
}

impl Dme {
    pub fn read(bs: &mut BinaryStream) -> Self {
        bs.skip(2); // unused
        Self { position: BglPosition::read(bs, true), range: bs.read_f32() }
    }
}

/// Name subrecord, the rest of the record is text.
pub fn read_name(sub: &Record, bs: &mut BinaryStream, encoding: TextEncoding) -> String {
    bs.read_string((sub.size as usize).saturating_sub(RECORD_HEADER_LEN), encoding)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vor_types() {
        assert!(IlsVorType::from_u8(5).is_vor());
        assert!(!IlsVorType::from_u8(4).is_vor());
        assert_eq!(IlsVorType::from_u8(9), IlsVorType::Unknown(9));
        assert_eq!(IlsVorType::High.as_str(), "H");
    }

    #[test]
    fn peek_does_not_move() {
        let mut bs = BinaryStream::new(vec![0x13, 0, 30, 0, 0, 0, 4, 0]);
        assert_eq!(peek_type(&mut bs), IlsVorType::Ils);
        assert_eq!(bs.tell(), 0);
    }
}
