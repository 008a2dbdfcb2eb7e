//! Generic record framing.
//!
//! Every record starts with a `u16` id and a `u32` size that includes the
//! six header bytes. Decoders may stop reading anywhere inside the record;
//! [`Record::seek_to_end`] always leaves the cursor on the next record.

use crate::stream::BinaryStream;

pub const RECORD_HEADER_LEN: usize = 6;

/// Record ids.
pub mod rec {
    // ── Airport level ─────────────────────────────────────────────────────────
    pub const AIRPORT_FS9: u16 = 0x0003;
    pub const AIRPORT: u16 = 0x003c;
    pub const AIRPORT_P3D: u16 = 0x0056;

    // ── Airport subrecords ────────────────────────────────────────────────────
    pub const NAME: u16 = 0x0019;
    pub const RUNWAY: u16 = 0x0004;
    pub const RUNWAY_MSFS: u16 = 0x00ce;
    pub const PARKING: u16 = 0x003d;
    pub const PARKING_MSFS: u16 = 0x00e7;
    pub const COM: u16 = 0x0012;
    pub const START: u16 = 0x0011;
    pub const HELIPAD: u16 = 0x0026;
    pub const APPROACH: u16 = 0x0024;
    pub const SID: u16 = 0x0042;
    pub const STAR: u16 = 0x0048;
    pub const DELETE_AIRPORT: u16 = 0x0033;
    pub const APRON: u16 = 0x0037;
    pub const APRON_MSFS: u16 = 0x0030;
    pub const TAXI_PATH: u16 = 0x001c;
    pub const JETWAY: u16 = 0x003a;
    pub const TOWER_OBJECT: u16 = 0x0066;

    // ── Runway subrecords ─────────────────────────────────────────────────────
    pub const OFFSET_THRESHOLD_PRIM: u16 = 0x0005;
    pub const OFFSET_THRESHOLD_SEC: u16 = 0x0006;
    pub const BLAST_PAD_PRIM: u16 = 0x0007;
    pub const BLAST_PAD_SEC: u16 = 0x0008;
    pub const OVERRUN_PRIM: u16 = 0x0009;
    pub const OVERRUN_SEC: u16 = 0x000a;
    pub const VASI_PRIM_LEFT: u16 = 0x000b;
    pub const VASI_PRIM_RIGHT: u16 = 0x000c;
    pub const VASI_SEC_LEFT: u16 = 0x000d;
    pub const VASI_SEC_RIGHT: u16 = 0x000e;
    pub const APP_LIGHTS_PRIM: u16 = 0x000f;
    pub const APP_LIGHTS_SEC: u16 = 0x0010;

    // ── Approach subrecords ───────────────────────────────────────────────────
    pub const TRANSITION: u16 = 0x002c;
    pub const LEGS: u16 = 0x002d;
    pub const MISSED_LEGS: u16 = 0x002e;
    pub const TRANSITION_LEGS: u16 = 0x002f;
    pub const RUNWAY_TRANSITIONS: u16 = 0x0046;
    pub const ENROUTE_TRANSITIONS: u16 = 0x0047;

    // ── Navaids ───────────────────────────────────────────────────────────────
    pub const ILS_VOR: u16 = 0x0013;
    pub const LOCALIZER: u16 = 0x0014;
    pub const GLIDESLOPE: u16 = 0x0015;
    pub const DME: u16 = 0x0016;
    pub const NDB: u16 = 0x0017;
    pub const MARKER: u16 = 0x0018;
    pub const WAYPOINT: u16 = 0x0022;
    pub const TACAN: u16 = 0x0040;

    // ── Airspace and names ────────────────────────────────────────────────────
    pub const BOUNDARY: u16 = 0x0020;
    pub const BOUNDARY_LINES: u16 = 0x0021;
    pub const GEOPOL: u16 = 0x0023;
    pub const NAMELIST: u16 = 0x0027;
    pub const BOUNDARY_COM: u16 = 0x0031;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Record {
    pub id: u16,
    /// Declared size including the header.
    pub size: u32,
    /// Offset of the id field.
    pub start: usize,
}

impl Record {
    pub fn read(bs: &mut BinaryStream) -> Self {
        let start = bs.tell();
        let id = bs.read_u16();
        let size = bs.read_u32();
        Self { id, size, start }
    }

    /// Reads the header and rewinds to its start.
    pub fn peek(bs: &mut BinaryStream) -> Self {
        let rec = Self::read(bs);
        bs.seek(rec.start);
        rec
    }

    pub fn end(&self) -> usize {
        self.start + self.size as usize
    }

    /// Declared size must be plausible for the stream the record lives in.
    pub fn is_valid_size(&self, bs: &BinaryStream) -> bool {
        (self.size as usize) >= RECORD_HEADER_LEN && (self.size as usize) < bs.size()
    }

    /// Moves the cursor to the declared end. A size smaller than the header
    /// is logged and the cursor only moves past the header.
    pub fn seek_to_end(&self, bs: &mut BinaryStream) {
        if (self.size as usize) < RECORD_HEADER_LEN {
            tracing::warn!(
                "Invalid record size {} for id 0x{:04x} at offset {}",
                self.size,
                self.id,
                self.start
            );
            bs.seek(self.start + RECORD_HEADER_LEN);
        } else {
            bs.seek(self.end());
        }
    }

    pub fn seek_to_start(&self, bs: &mut BinaryStream) {
        bs.seek(self.start);
    }

    /// Iterates the subrecords between the current position and the end of
    /// this record.
    pub fn subrecords(&self, bs: &BinaryStream) -> SubrecordCursor {
        SubrecordCursor { end: self.end().min(bs.size()) }
    }
}

/// Walks nested records inside a parent record. Callers move past each
/// subrecord with [`Record::seek_to_end`] before asking for the next one.
#[derive(Debug)]
pub struct SubrecordCursor {
    end: usize,
}

impl SubrecordCursor {
    /// Peeks the next subrecord header, or `None` at the end of the parent.
    pub fn next(&self, bs: &mut BinaryStream) -> Option<Record> {
        if bs.tell() + RECORD_HEADER_LEN > self.end {
            return None;
        }
        let rec = Record::peek(bs);
        if (rec.size as usize) < RECORD_HEADER_LEN || rec.end() > self.end {
            tracing::warn!(
                "Invalid subrecord 0x{:04x} size {} at offset {}",
                rec.id,
                rec.size,
                rec.start
            );
            bs.seek(self.end);
            return None;
        }
        Some(rec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: u16, body: &[u8]) -> Vec<u8> {
        let mut v = Vec::new();
        v.extend_from_slice(&id.to_le_bytes());
        v.extend_from_slice(&((body.len() + RECORD_HEADER_LEN) as u32).to_le_bytes());
        v.extend_from_slice(body);
        v
    }

    #[test]
    fn seek_to_end_lands_after_declared_size() {
        for consumed in [0usize, 3, 10] {
            let mut data = record(0x42, &[7u8; 10]);
            data.extend(record(0x43, &[]));
            let mut bs = BinaryStream::new(data);
            let rec = Record::read(&mut bs);
            bs.skip(consumed);
            rec.seek_to_end(&mut bs);
            assert_eq!(bs.tell(), rec.start + rec.size as usize);
            assert_eq!(Record::read(&mut bs).id, 0x43);
        }
    }

    #[test]
    fn oversized_record_is_invalid_but_skippable() {
        let mut data = Vec::new();
        data.extend_from_slice(&0x42u16.to_le_bytes());
        data.extend_from_slice(&1000u32.to_le_bytes());
        data.extend_from_slice(&[0u8; 4]);
        let mut bs = BinaryStream::new(data);
        let rec = Record::read(&mut bs);
        assert!(!rec.is_valid_size(&bs));
        rec.seek_to_end(&mut bs);
        assert_eq!(bs.tell(), 1000);
        assert!(bs.is_eof());
    }

    #[test]
    fn zero_size_record_moves_past_header() {
        let mut data = record(0x42, &[]);
        data[2..6].copy_from_slice(&0u32.to_le_bytes());
        data.extend(record(0x43, &[]));
        let mut bs = BinaryStream::new(data);
        let rec = Record::read(&mut bs);
        rec.seek_to_end(&mut bs);
        assert_eq!(bs.tell(), RECORD_HEADER_LEN);
        assert_eq!(Record::read(&mut bs).id, 0x43);
    }

    #[test]
    fn subrecord_cursor_stops_at_parent_end() {
        let mut inner = record(rec::NAME, b"ab");
        inner.extend(record(rec::COM, &[1, 2, 3]));
        let mut data = record(rec::AIRPORT, &inner);
        data.extend(record(0x99, &[0; 4]));
        let mut bs = BinaryStream::new(data);
        let parent = Record::read(&mut bs);
        let cursor = parent.subrecords(&bs);
        let mut ids = Vec::new();
        while let Some(sub) = cursor.next(&mut bs) {
            ids.push(sub.id);
            sub.seek_to_end(&mut bs);
        }
        assert_eq!(ids, [rec::NAME, rec::COM]);
    }
}
