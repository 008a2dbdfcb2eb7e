//! Per-simulator binary layout differences.
//!
//! Every decoder asks the [`StructureLayout`] of its structure type which
//! optional blocks are present. Supporting another simulator version means
//! adding a row to [`LAYOUTS`].

use navdata_schema::SimulatorType;

use crate::stream::TextEncoding;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StructureType {
    Fs9,
    Fsx,
    P3dV4,
    P3dV5,
    Msfs,
    Msfs2024,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StructureLayout {
    /// Four tee offset floats after the parking heading.
    pub parking_tee_offsets: bool,
    /// Material and runway padding after the airline codes.
    pub parking_trailing_skip: usize,
    /// `skip(1)`, suffix byte, `skip(18)` after the airline codes.
    pub parking_suffix: bool,
    /// Bytes between the fuel flags and the first airport subrecord.
    pub airport_header_tail: usize,
    /// Material GUIDs and flags after the runway lighting fields.
    pub runway_extra: usize,
    /// Speed limit and vertical angle floats at the end of each leg.
    pub leg_speed_and_angle: bool,
    /// Localizer headings are magnetic and need the ILS variation added.
    pub magnetic_localizer: bool,
    pub text_encoding: TextEncoding,
}

const fn row(
    tee: bool,
    parking_skip: usize,
    suffix: bool,
    airport_tail: usize,
    runway_extra: usize,
    msfs: bool,
    encoding: TextEncoding,
) -> StructureLayout {
    StructureLayout {
        parking_tee_offsets: tee,
        parking_trailing_skip: parking_skip,
        parking_suffix: suffix,
        airport_header_tail: airport_tail,
        runway_extra,
        leg_speed_and_angle: msfs,
        magnetic_localizer: msfs,
        text_encoding: encoding,
    }
}

use crate::stream::TextEncoding::{Latin1, Utf8};

/// Indexed by [`StructureType::index`].
pub static LAYOUTS: [StructureLayout; 6] = [
    //   tee    pskip  suffix  ap_tail  rw_extra  msfs   encoding
    row(false, 0,     false,  0,       0,        false, Latin1), // FS9
    row(true,  0,     false,  4,       0,        false, Latin1), // FSX
    row(true,  0,     false,  8,       0,        false, Latin1), // P3D v4
    row(true,  4,     false,  8,       0,        false, Latin1), // P3D v5
    row(true,  0,     true,   16,      16,       true,  Utf8),   // MSFS
    row(false, 0,     false,  20,      20,       true,  Utf8),   // MSFS 2024
];

impl StructureType {
    pub const ALL: [StructureType; 6] =
        [Self::Fs9, Self::Fsx, Self::P3dV4, Self::P3dV5, Self::Msfs, Self::Msfs2024];

    fn index(self) -> usize {
        match self {
            Self::Fs9      => 0,
            Self::Fsx      => 1,
            Self::P3dV4    => 2,
            Self::P3dV5    => 3,
            Self::Msfs     => 4,
            Self::Msfs2024 => 5,
        }
    }

    pub fn layout(self) -> &'static StructureLayout {
        &LAYOUTS[self.index()]
    }

    /// Default structure for files of a simulator. FS9 airports are detected
    /// per record from their record id.
    pub fn for_simulator(sim: SimulatorType) -> Self {
        match sim {
            SimulatorType::Fsx | SimulatorType::FsxSe | SimulatorType::P3dV3 => Self::Fsx,
            SimulatorType::P3dV4 => Self::P3dV4,
            SimulatorType::P3dV5 => Self::P3dV5,
            SimulatorType::Msfs => Self::Msfs,
            SimulatorType::Msfs2024 => Self::Msfs2024,
            // Not used for BGL reading
            SimulatorType::Xplane11 | SimulatorType::Xplane12 => Self::Fsx,
        }
    }

    pub fn is_msfs(self) -> bool {
        matches!(self, Self::Msfs | Self::Msfs2024)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tee_offsets_missing_only_for_fs9_and_msfs2024() {
        let without: Vec<_> = StructureType::ALL
            .iter()
            .filter(|s| !s.layout().parking_tee_offsets)
            .collect();
        assert_eq!(without, [&StructureType::Fs9, &StructureType::Msfs2024]);
    }

    #[test]
    fn suffix_byte_only_for_msfs() {
        for s in StructureType::ALL {
            assert_eq!(s.layout().parking_suffix, s == StructureType::Msfs);
        }
        assert_eq!(StructureType::P3dV5.layout().parking_trailing_skip, 4);
    }

    #[test]
    fn simulator_mapping() {
        assert_eq!(StructureType::for_simulator(SimulatorType::FsxSe), StructureType::Fsx);
        assert_eq!(StructureType::for_simulator(SimulatorType::Msfs2024), StructureType::Msfs2024);
        assert!(StructureType::Msfs.layout().magnetic_localizer);
        assert_eq!(StructureType::Msfs.layout().text_encoding, TextEncoding::Utf8);
    }
}
