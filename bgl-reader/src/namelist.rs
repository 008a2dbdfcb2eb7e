//! Airport name lists of FSX/P3D files.
//!
//! ```text
//! counts  : regions, countries, states, cities, airports, ICAO entries (u16 each)
//! offsets : six u32, relative to the record start
//! list    : count x u32 string offsets (relative to the end of the offset
//!           array), then NUL terminated Latin-1 strings
//! ICAO entry (20 bytes):
//!   region idx u8 | country idx u8 | state idx u16 (>> 4) | city idx u16
//!   airport name idx u16 | ident u32 packed | 8 bytes unused
//! ```

use crate::converter;
use crate::record::Record;
use crate::stream::{BinaryStream, TextEncoding};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct NamelistEntry {
    pub airport_ident: String,
    pub region_name: String,
    pub country_name: String,
    pub state_name: String,
    pub city_name: String,
    pub airport_name: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Namelist {
    pub entries: Vec<NamelistEntry>,
}

fn read_list(bs: &mut BinaryStream, offset: usize, count: u16) -> Vec<String> {
    bs.seek(offset);
    let offsets: Vec<u32> = (0..count).map(|_| bs.read_u32()).collect();
    let base = bs.tell();
    offsets
        .into_iter()
        .map(|o| {
            bs.seek(base + o as usize);
            bs.read_cstring(TextEncoding::Latin1)
        })
        .collect()
}

fn pick(list: &[String], idx: usize, what: &str) -> String {
    match list.get(idx) {
        Some(s) => s.clone(),
        None => {
            tracing::warn!("Namelist {what} index {idx} out of range");
            String::new()
        }
    }
}

impl Namelist {
    pub fn read(bs: &mut BinaryStream) -> Self {
        let record = Record::read(bs);
        let counts: Vec<u16> = (0..6).map(|_| bs.read_u16()).collect();
        let offsets: Vec<usize> = (0..6).map(|_| record.start + bs.read_u32() as usize).collect();

        let regions = read_list(bs, offsets[0], counts[0]);
        let countries = read_list(bs, offsets[1], counts[1]);
        let states = read_list(bs, offsets[2], counts[2]);
        let cities = read_list(bs, offsets[3], counts[3]);
        let airports = read_list(bs, offsets[4], counts[4]);

        bs.seek(offsets[5]);
        let mut entries = Vec::with_capacity(usize::from(counts[5]));
        for _ in 0..counts[5] {
            let region_idx = usize::from(bs.read_u8());
            let country_idx = usize::from(bs.read_u8());
            let state_idx = usize::from(bs.read_u16() >> 4);
            let city_idx = usize::from(bs.read_u16());
            let airport_idx = usize::from(bs.read_u16());
            let ident = converter::int_to_icao(bs.read_u32(), false);
            bs.skip(8);
            entries.push(NamelistEntry {
                airport_ident: ident,
                region_name: pick(&regions, region_idx, "region"),
                country_name: pick(&countries, country_idx, "country"),
                state_name: pick(&states, state_idx, "state"),
                city_name: pick(&cities, city_idx, "city"),
                airport_name: pick(&airports, airport_idx, "airport"),
            });
        }
        record.seek_to_end(bs);
        Self { entries }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::NamelistBuilder;

    #[test]
    fn entries_resolve_indexes() {
        let data = NamelistBuilder::new()
            .regions(&["North America"])
            .countries(&["United States"])
            .states(&["Washington", "Oregon"])
            .cities(&["Seattle", "Portland"])
            .airports(&["Seattle-Tacoma Intl", "Portland Intl"])
            .entry("KSEA", 0, 0, 0, 0, 0)
            .entry("KPDX", 0, 0, 1, 1, 1)
            .build();
        let mut bs = BinaryStream::new(data);
        let nl = Namelist::read(&mut bs);
        assert_eq!(nl.entries.len(), 2);
        assert_eq!(nl.entries[1].airport_ident, "KPDX");
        assert_eq!(nl.entries[1].state_name, "Oregon");
        assert_eq!(nl.entries[0].city_name, "Seattle");
        assert_eq!(nl.entries[0].airport_name, "Seattle-Tacoma Intl");
    }
}
