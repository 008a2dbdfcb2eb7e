//! BGL file header.
//!
//! ```text
//! [0..4]    magic1       : u32  = 0x19920201
//! [4..8]    header_size  : u32  = 0x38
//! [8..12]   low_time     : u32  FILETIME low word
//! [12..16]  high_time    : u32  FILETIME high word
//! [16..20]  magic2       : u32  = 0x08051803
//! [20..24]  num_sections : u32
//! [24..56]  QMIDs        : 8 x u32
//! ```

use chrono::{DateTime, Utc};

use crate::converter;
use crate::stream::BinaryStream;

pub const MAGIC_NUMBER1: u32 = 0x1992_0201;
pub const MAGIC_NUMBER2: u32 = 0x0805_1803;
pub const HEADER_SIZE: u32 = 0x38;

#[derive(Debug, Clone, Default)]
pub struct Header {
    pub magic_number1: u32,
    pub header_size: u32,
    pub low_date_time: u32,
    pub high_date_time: u32,
    pub magic_number2: u32,
    pub num_sections: u32,
    pub creation_time: Option<DateTime<Utc>>,
    valid_magic: bool,
    valid_size: bool,
}

impl Header {
    /// Reads the header. Section count and QMIDs are only read when the
    /// magic numbers and size match.
    pub fn read(bs: &mut BinaryStream) -> Self {
        let mut header = Header {
            magic_number1: bs.read_u32(),
            header_size: bs.read_u32(),
            low_date_time: bs.read_u32(),
            high_date_time: bs.read_u32(),
            magic_number2: bs.read_u32(),
            ..Header::default()
        };
        header.valid_magic =
            header.magic_number1 == MAGIC_NUMBER1 && header.magic_number2 == MAGIC_NUMBER2;
        header.valid_size = header.header_size == HEADER_SIZE;

        if !header.valid_magic {
            tracing::warn!(
                "invalid magic number: 0x{:08x}, 0x{:08x}",
                header.magic_number1,
                header.magic_number2
            );
            return header;
        }
        if !header.valid_size {
            tracing::warn!("invalid header size: 0x{:x}", header.header_size);
            return header;
        }

        header.creation_time = converter::filetime(header.low_date_time, header.high_date_time);
        header.num_sections = bs.read_u32();
        bs.skip(4 * 8);
        header
    }

    pub fn is_valid(&self) -> bool {
        self.valid_magic && self.valid_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header_bytes(magic1: u32, size: u32, magic2: u32, sections: u32) -> Vec<u8> {
        let mut v = Vec::new();
        for x in [magic1, size, 0xd5d8_7000, 0x01c6_0e5a, magic2, sections] {
            v.extend_from_slice(&x.to_le_bytes());
        }
        v.resize(HEADER_SIZE as usize, 0);
        v
    }

    #[test]
    fn valid_header() {
        let mut bs = BinaryStream::new(header_bytes(MAGIC_NUMBER1, HEADER_SIZE, MAGIC_NUMBER2, 3));
        let h = Header::read(&mut bs);
        assert!(h.is_valid());
        assert_eq!(h.num_sections, 3);
        assert_eq!(bs.tell(), HEADER_SIZE as usize);
        assert!(h.creation_time.is_some());
    }

    #[test]
    fn swapped_magic_numbers_are_invalid() {
        let mut bs = BinaryStream::new(header_bytes(MAGIC_NUMBER2, HEADER_SIZE, MAGIC_NUMBER1, 3));
        let h = Header::read(&mut bs);
        assert!(!h.is_valid());
        assert_eq!(h.num_sections, 0);
    }

    #[test]
    fn wrong_size_is_invalid() {
        let mut bs = BinaryStream::new(header_bytes(MAGIC_NUMBER1, 0x40, MAGIC_NUMBER2, 3));
        assert!(!Header::read(&mut bs).is_valid());
    }
}
