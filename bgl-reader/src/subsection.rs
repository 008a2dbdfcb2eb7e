use crate::section::{Section, SectionType};
use crate::stream::BinaryStream;

/// Pointer to a run of same-typed records of one section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subsection {
    pub parent: SectionType,
    pub id: u32,
    pub num_records: u32,
    pub first_record_offset: u32,
    pub data_size: u32,
}

impl Subsection {
    pub fn read(bs: &mut BinaryStream, section: &Section) -> Self {
        let id = bs.read_u32();
        let num_records = bs.read_u32();
        if section.subsection_size == 20 {
            bs.skip(4);
        }
        Self {
            parent: section.section_type,
            id,
            num_records,
            first_record_offset: bs.read_u32(),
            data_size: bs.read_u32(),
        }
    }

    /// Name lists always contain exactly one record.
    pub fn record_count(&self) -> u32 {
        if self.parent == SectionType::NameList {
            1
        } else {
            self.num_records
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section(section_type: SectionType, subsection_size: u32) -> Section {
        Section {
            section_type,
            subsection_size,
            num_subsections: 1,
            first_subsection_offset: 0,
            total_subsection_size: subsection_size,
        }
    }

    #[test]
    fn twenty_byte_entries_skip_extra_word() {
        let mut v = Vec::new();
        for x in [7u32, 3, 0xdead, 0x400, 99] {
            v.extend_from_slice(&x.to_le_bytes());
        }
        let mut bs = BinaryStream::new(v);
        let s = Subsection::read(&mut bs, &section(SectionType::Airport, 20));
        assert_eq!(s.num_records, 3);
        assert_eq!(s.first_record_offset, 0x400);
        assert_eq!(s.data_size, 99);
        assert_eq!(bs.tell(), 20);
    }

    #[test]
    fn name_list_has_one_record() {
        let mut v = Vec::new();
        for x in [1u32, 12, 0x80, 64] {
            v.extend_from_slice(&x.to_le_bytes());
        }
        let mut bs = BinaryStream::new(v);
        let s = Subsection::read(&mut bs, &section(SectionType::NameList, 16));
        assert_eq!(s.num_records, 12);
        assert_eq!(s.record_count(), 1);
    }
}
