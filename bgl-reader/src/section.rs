//! Section descriptors following the header.
//!
//! ```text
//! [0..4]    type                   : u32
//! [4..8]    subsection size flag   : u32  ((flag & 0x10000) | 0x40000) >> 14
//! [8..12]   num_subsections        : u32
//! [12..16]  first_subsection_offset: u32
//! [16..20]  total_subsection_size  : u32
//! ```

use std::fmt;

use crate::stream::BinaryStream;

pub const SECTION_SIZE: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionType {
    None,
    Copyright,
    Guid,
    Airport,
    IlsVor,
    Ndb,
    Marker,
    Boundary,
    Waypoint,
    Geopol,
    SceneryObject,
    NameList,
    VorIlsIcaoIndex,
    NdbIcaoIndex,
    WaypointIcaoIndex,
    ModelData,
    AirportSummary,
    Exclusion,
    Timezone,
    AirportAlt,
    P3dTacan,
    MsfsDeleteAirportNav,
    MsfsDeleteNav,
    IcaoRunway,
    FakeTypes,
    /// Terrain, land class, season and photo sections.
    Terrain(u32),
    Unknown(u32),
}

impl SectionType {
    pub fn from_u32(v: u32) -> Self {
        match v {
            0x0000 => Self::None,
            0x0001 => Self::Copyright,
            0x0002 => Self::Guid,
            0x0003 => Self::Airport,
            0x0013 => Self::IlsVor,
            0x0017 => Self::Ndb,
            0x0018 => Self::Marker,
            0x0020 => Self::Boundary,
            0x0022 => Self::Waypoint,
            0x0023 => Self::Geopol,
            0x0025 => Self::SceneryObject,
            0x0027 => Self::NameList,
            0x0028 => Self::VorIlsIcaoIndex,
            0x0029 => Self::NdbIcaoIndex,
            0x002a => Self::WaypointIcaoIndex,
            0x002b => Self::ModelData,
            0x002c => Self::AirportSummary,
            0x002e => Self::Exclusion,
            0x002f => Self::Timezone,
            0x003c => Self::AirportAlt,
            0x0042 => Self::P3dTacan,
            0x0064 => Self::MsfsDeleteAirportNav,
            0x0066 => Self::MsfsDeleteNav,
            0x00ce => Self::IcaoRunway,
            0x2710 => Self::FakeTypes,
            0x0065..=0x0090 => Self::Terrain(v),
            other => Self::Unknown(other),
        }
    }

    pub fn to_u32(self) -> u32 {
        match self {
            Self::None                 => 0x0000,
            Self::Copyright            => 0x0001,
            Self::Guid                 => 0x0002,
            Self::Airport              => 0x0003,
            Self::IlsVor               => 0x0013,
            Self::Ndb                  => 0x0017,
            Self::Marker               => 0x0018,
            Self::Boundary             => 0x0020,
            Self::Waypoint             => 0x0022,
            Self::Geopol               => 0x0023,
            Self::SceneryObject        => 0x0025,
            Self::NameList             => 0x0027,
            Self::VorIlsIcaoIndex      => 0x0028,
            Self::NdbIcaoIndex         => 0x0029,
            Self::WaypointIcaoIndex    => 0x002a,
            Self::ModelData            => 0x002b,
            Self::AirportSummary       => 0x002c,
            Self::Exclusion            => 0x002e,
            Self::Timezone             => 0x002f,
            Self::AirportAlt           => 0x003c,
            Self::P3dTacan             => 0x0042,
            Self::MsfsDeleteAirportNav => 0x0064,
            Self::MsfsDeleteNav        => 0x0066,
            Self::IcaoRunway           => 0x00ce,
            Self::FakeTypes            => 0x2710,
            Self::Terrain(v) | Self::Unknown(v) => v,
        }
    }
}

impl fmt::Display for SectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Terrain(v) => write!(f, "Terrain(0x{v:x})"),
            Self::Unknown(v) => write!(f, "Unknown(0x{v:x})"),
            other => write!(f, "{other:?}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Section {
    pub section_type: SectionType,
    /// 16 or 20 bytes per subsection entry.
    pub subsection_size: u32,
    pub num_subsections: u32,
    pub first_subsection_offset: u32,
    pub total_subsection_size: u32,
}

impl Section {
    pub fn read(bs: &mut BinaryStream) -> Self {
        let section_type = SectionType::from_u32(bs.read_u32());
        let flag = bs.read_u32();
        Self {
            section_type,
            subsection_size: ((flag & 0x10000) | 0x40000) >> 0xe,
            num_subsections: bs.read_u32(),
            first_subsection_offset: bs.read_u32(),
            total_subsection_size: bs.read_u32(),
        }
    }

    /// Boundary and geopol sections carry a tree index instead of plain
    /// subsection entries.
    pub fn has_plain_subsections(&self) -> bool {
        !matches!(self.section_type, SectionType::Boundary | SectionType::Geopol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subsection_size_from_flag() {
        let mut v = Vec::new();
        for x in [0x0003u32, 0x0001_0001, 2, 0x100, 40] {
            v.extend_from_slice(&x.to_le_bytes());
        }
        for x in [0x0013u32, 0x0000_0001, 1, 0x200, 16] {
            v.extend_from_slice(&x.to_le_bytes());
        }
        let mut bs = BinaryStream::new(v);
        let a = Section::read(&mut bs);
        let b = Section::read(&mut bs);
        assert_eq!(a.section_type, SectionType::Airport);
        assert_eq!(a.subsection_size, 20);
        assert_eq!(a.num_subsections, 2);
        assert_eq!(b.section_type, SectionType::IlsVor);
        assert_eq!(b.subsection_size, 16);
        assert_eq!(bs.tell(), 2 * SECTION_SIZE);
    }

    #[test]
    fn terrain_and_unknown_types_are_preserved() {
        assert_eq!(SectionType::from_u32(0x67), SectionType::Terrain(0x67));
        assert_eq!(SectionType::from_u32(0x4242), SectionType::Unknown(0x4242));
        assert_eq!(SectionType::Unknown(0x4242).to_u32(), 0x4242);
        assert_eq!(SectionType::NameList.to_string(), "NameList");
    }
}
