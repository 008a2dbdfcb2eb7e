//! Positioned little-endian reader over an in-memory BGL file.
//!
//! Reads past the end never panic: missing bytes are returned as zeros and
//! the overrun is remembered. Callers bound their reads with declared record
//! sizes and check [`BinaryStream::overrun`] where it matters.

use std::io;
use std::path::Path;

use encoding_rs::WINDOWS_1252;

/// Single byte text encoding used for strings inside records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    Latin1,
    Utf8,
}

impl TextEncoding {
    pub fn decode(self, bytes: &[u8]) -> String {
        match self {
            Self::Latin1 => WINDOWS_1252.decode_without_bom_handling(bytes).0.into_owned(),
            Self::Utf8   => String::from_utf8_lossy(bytes).into_owned(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct BinaryStream {
    data: Vec<u8>,
    pos: usize,
    overrun: bool,
}

impl BinaryStream {
    pub fn new(data: Vec<u8>) -> Self {
        Self { data, pos: 0, overrun: false }
    }

    pub fn open(path: &Path) -> io::Result<Self> {
        Ok(Self::new(std::fs::read(path)?))
    }

    // ── Positioning ───────────────────────────────────────────────────────────

    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn tell(&self) -> usize {
        self.pos
    }

    /// Positions beyond the end are allowed; subsequent reads return zeros.
    pub fn seek(&mut self, pos: usize) {
        self.pos = pos;
    }

    pub fn skip(&mut self, n: usize) {
        self.pos = self.pos.saturating_add(n);
    }

    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    pub fn is_eof(&self) -> bool {
        self.pos >= self.data.len()
    }

    /// `true` once any read went past the end of the buffer.
    pub fn overrun(&self) -> bool {
        self.overrun
    }

    // ── Numbers ───────────────────────────────────────────────────────────────

    fn take<const N: usize>(&mut self) -> [u8; N] {
        let mut out = [0u8; N];
        let start = self.pos.min(self.data.len());
        let end = self.pos.saturating_add(N).min(self.data.len());
        let avail = end - start;
        out[..avail].copy_from_slice(&self.data[start..end]);
        if avail < N {
            self.overrun = true;
        }
        self.pos = self.pos.saturating_add(N);
        out
    }

    pub fn read_u8(&mut self) -> u8 {
        self.take::<1>()[0]
    }

    pub fn read_i8(&mut self) -> i8 {
        self.read_u8() as i8
    }

    pub fn read_u16(&mut self) -> u16 {
        u16::from_le_bytes(self.take())
    }

    pub fn read_i16(&mut self) -> i16 {
        i16::from_le_bytes(self.take())
    }

    pub fn read_u32(&mut self) -> u32 {
        u32::from_le_bytes(self.take())
    }

    pub fn read_i32(&mut self) -> i32 {
        i32::from_le_bytes(self.take())
    }

    pub fn read_u64(&mut self) -> u64 {
        u64::from_le_bytes(self.take())
    }

    pub fn read_f32(&mut self) -> f32 {
        f32::from_le_bytes(self.take())
    }

    // ── Bytes and text ────────────────────────────────────────────────────────

    pub fn read_bytes(&mut self, len: usize) -> Vec<u8> {
        let start = self.pos.min(self.data.len());
        let end = self.pos.saturating_add(len).min(self.data.len());
        let mut out = self.data[start..end].to_vec();
        if out.len() < len {
            self.overrun = true;
            out.resize(len, 0);
        }
        self.pos = self.pos.saturating_add(len);
        out
    }

    /// Fixed-length string. Stops at the first NUL and trims trailing blanks.
    pub fn read_string(&mut self, len: usize, encoding: TextEncoding) -> String {
        let bytes = self.read_bytes(len);
        let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
        encoding.decode(&bytes[..end]).trim_end().to_string()
    }

    /// NUL-terminated string. Consumes the terminator.
    pub fn read_cstring(&mut self, encoding: TextEncoding) -> String {
        if self.pos >= self.data.len() {
            self.overrun = true;
            self.pos = self.pos.saturating_add(1);
            return String::new();
        }
        let start = self.pos;
        let end = self.data[start..]
            .iter()
            .position(|&b| b == 0)
            .map_or(self.data.len(), |i| start + i);
        let text = encoding.decode(&self.data[start..end]);
        if end >= self.data.len() {
            self.overrun = true;
        }
        self.pos = end + 1;
        text
    }
}

/// Extract `mask` sized bit field starting at `shift`.
pub fn bits(value: u32, shift: u32, mask: u32) -> u32 {
    (value >> shift) & mask
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_little_endian_values() {
        let mut bs = BinaryStream::new(vec![0x34, 0x12, 0x78, 0x56, 0x34, 0x12, 0xff]);
        assert_eq!(bs.read_u16(), 0x1234);
        assert_eq!(bs.read_u32(), 0x1234_5678);
        assert_eq!(bs.read_i8(), -1);
        assert!(bs.is_eof());
        assert!(!bs.overrun());
    }

    #[test]
    fn read_past_end_is_zero_filled() {
        let mut bs = BinaryStream::new(vec![0x01, 0x02]);
        assert_eq!(bs.read_u32(), 0x0201);
        assert!(bs.overrun());
        assert_eq!(bs.tell(), 4);
        assert_eq!(bs.read_f32(), 0.0);
        assert_eq!(bs.remaining(), 0);
    }

    #[test]
    fn seek_beyond_end_does_not_panic() {
        let mut bs = BinaryStream::new(vec![1, 2, 3]);
        bs.seek(100);
        assert_eq!(bs.read_u16(), 0);
        assert_eq!(bs.read_string(4, TextEncoding::Latin1), "");
        assert_eq!(bs.read_cstring(TextEncoding::Utf8), "");
    }

    #[test]
    fn fixed_string_trims_padding_and_nul() {
        let mut bs = BinaryStream::new(b"AB  \0\0CDxyz\0tail".to_vec());
        assert_eq!(bs.read_string(6, TextEncoding::Latin1), "AB");
        assert_eq!(bs.read_string(2, TextEncoding::Latin1), "CD");
        assert_eq!(bs.read_cstring(TextEncoding::Latin1), "xyz");
        assert_eq!(bs.tell(), 12);
    }

    #[test]
    fn latin1_maps_high_bytes() {
        let mut bs = BinaryStream::new(vec![b'M', 0xfc, b'n', 0]);
        assert_eq!(bs.read_cstring(TextEncoding::Latin1), "Mün");
    }

    #[test]
    fn bit_fields() {
        let flags = 0x0312_34c5u32;
        assert_eq!(bits(flags, 0, 0x3f), 0x05);
        assert_eq!(bits(flags, 6, 0x3), 0x3);
        assert_eq!(bits(flags, 24, 0xff), 0x03);
    }
}
