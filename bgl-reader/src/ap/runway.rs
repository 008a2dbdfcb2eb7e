//! Runways with their per-end detail subrecords.
//!
//! ```text
//! surface          : u16
//! primary number   : u8    designator : u8
//! secondary number : u8    designator : u8
//! primary ILS      : u32   packed ident
//! secondary ILS    : u32   packed ident
//! position         : lon u32, lat u32, alt i32
//! length, width, heading, pattern altitude : f32 (meters, degrees)
//! marking flags    : u16
//! light flags      : u8
//! pattern flags    : u8
//! extra            : layout.runway_extra bytes
//! subrecords       : offset threshold, blast pad, overrun, VASI, approach lights
//! ```

use crate::converter;
use crate::position::BglPosition;
use crate::record::{rec, Record, RECORD_HEADER_LEN};
use crate::stream::{bits, BinaryStream};
use crate::ReadContext;

pub fn surface_to_str(surface: u16) -> &'static str {
    match surface {
        0    => "C",
        1    => "G",
        2    => "W",
        4    => "A",
        7    => "CE",
        8    => "S",
        9    => "I",
        12   => "D",
        13   => "CR",
        14   => "GR",
        15   => "OT",
        16   => "SM",
        17   => "B",
        18   => "BR",
        19   => "M",
        20   => "PL",
        21   => "SA",
        22   => "SH",
        23   => "T",
        0xfe => "UNKNOWN",
        _ => {
            tracing::warn!("Invalid surface {surface}");
            "INVALID"
        }
    }
}

fn light_to_str(value: u32) -> Option<&'static str> {
    match value {
        1 => Some("L"),
        2 => Some("M"),
        3 => Some("H"),
        _ => None,
    }
}

pub fn approach_lights_to_str(system: u8) -> Option<&'static str> {
    match system {
        0x00 => None,
        0x01 => Some("ODALS"),
        0x02 => Some("MALSF"),
        0x03 => Some("MALSR"),
        0x04 => Some("SSALF"),
        0x05 => Some("SSALR"),
        0x06 => Some("ALSF1"),
        0x07 => Some("ALSF2"),
        0x08 => Some("RAIL"),
        0x09 => Some("CALVERT"),
        0x0a => Some("CALVERT2"),
        0x0b => Some("MALS"),
        0x0c => Some("SALS"),
        0x0d => Some("SALSF"),
        0x0e => Some("SSALS"),
        _ => {
            tracing::warn!("Invalid approach light system {system}");
            None
        }
    }
}

pub mod marking {
    pub const EDGES: u16 = 1 << 0;
    pub const THRESHOLD: u16 = 1 << 1;
    pub const FIXED_DISTANCE: u16 = 1 << 2;
    pub const TOUCHDOWN: u16 = 1 << 3;
    pub const DASHES: u16 = 1 << 4;
    pub const IDENT: u16 = 1 << 5;
    pub const PRECISION: u16 = 1 << 6;
    pub const EDGE_PAVEMENT: u16 = 1 << 7;
    pub const SINGLE_END: u16 = 1 << 8;
    pub const PRIMARY_CLOSED: u16 = 1 << 9;
    pub const SECONDARY_CLOSED: u16 = 1 << 10;
    pub const PRIMARY_STOL: u16 = 1 << 11;
    pub const SECONDARY_STOL: u16 = 1 << 12;
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Vasi {
    pub vasi_type: u16,
    pub pitch: f32,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct RunwayEnd {
    pub name: String,
    /// Ident of the ILS serving this end, empty if none.
    pub ils_ident: String,
    pub offset_threshold: f32,
    pub blast_pad: f32,
    pub overrun: f32,
    pub left_vasi: Option<Vasi>,
    pub right_vasi: Option<Vasi>,
    pub approach_lights: Option<&'static str>,
    pub end_lights: bool,
    pub reils: bool,
    pub closed_markings: bool,
    pub stol_markings: bool,
    pub takeoff: bool,
    pub landing: bool,
    pub pattern_right: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Runway {
    pub surface: u16,
    pub position: BglPosition,
    /// Meters.
    pub length: f32,
    pub width: f32,
    pub heading: f32,
    pub pattern_altitude: f32,
    pub marking_flags: u16,
    pub edge_light: Option<&'static str>,
    pub center_light: Option<&'static str>,
    pub center_red: bool,
    pub primary: RunwayEnd,
    pub secondary: RunwayEnd,
}

impl Runway {
    pub fn read(ctx: &ReadContext, bs: &mut BinaryStream) -> Self {
        let record = Record::read(bs);
        let surface = bs.read_u16();
        let prim_number = bs.read_u8();
        let prim_designator = bs.read_u8();
        let sec_number = bs.read_u8();
        let sec_designator = bs.read_u8();
        let prim_ils = bs.read_u32();
        let sec_ils = bs.read_u32();

        let mut runway = Runway {
            surface,
            position: BglPosition::read(bs, true),
            length: bs.read_f32(),
            width: bs.read_f32(),
            heading: bs.read_f32(),
            pattern_altitude: bs.read_f32(),
            ..Runway::default()
        };
        runway.primary.name = converter::runway_to_str(prim_number, prim_designator);
        runway.secondary.name = converter::runway_to_str(sec_number, sec_designator);
        if prim_ils != 0 {
            runway.primary.ils_ident = converter::int_to_icao(prim_ils, false);
        }
        if sec_ils != 0 {
            runway.secondary.ils_ident = converter::int_to_icao(sec_ils, false);
        }

        runway.marking_flags = bs.read_u16();
        let light = u32::from(bs.read_u8());
        let pattern = u32::from(bs.read_u8());
        bs.skip(ctx.layout().runway_extra);

        runway.edge_light = light_to_str(bits(light, 0, 0x3));
        runway.center_light = light_to_str(bits(light, 2, 0x3));
        runway.center_red = bits(light, 4, 0x1) == 1;

        let m = runway.marking_flags;
        runway.primary.closed_markings = m & marking::PRIMARY_CLOSED != 0;
        runway.secondary.closed_markings = m & marking::SECONDARY_CLOSED != 0;
        runway.primary.stol_markings = m & marking::PRIMARY_STOL != 0;
        runway.secondary.stol_markings = m & marking::SECONDARY_STOL != 0;

        runway.primary.takeoff = pattern & 0x1 == 0;
        runway.primary.landing = pattern & 0x2 == 0;
        runway.primary.pattern_right = pattern & 0x4 != 0;
        runway.secondary.takeoff = pattern & 0x8 == 0;
        runway.secondary.landing = pattern & 0x10 == 0;
        runway.secondary.pattern_right = pattern & 0x20 != 0;

        let cursor = record.subrecords(bs);
        while let Some(sub) = cursor.next(bs) {
            bs.skip(RECORD_HEADER_LEN);
            runway.read_subrecord(sub.id, bs);
            sub.seek_to_end(bs);
        }
        record.seek_to_end(bs);
        runway
    }

    fn read_subrecord(&mut self, id: u16, bs: &mut BinaryStream) {
        match id {
            rec::OFFSET_THRESHOLD_PRIM => self.primary.offset_threshold = read_pavement(bs),
            rec::OFFSET_THRESHOLD_SEC  => self.secondary.offset_threshold = read_pavement(bs),
            rec::BLAST_PAD_PRIM        => self.primary.blast_pad = read_pavement(bs),
            rec::BLAST_PAD_SEC         => self.secondary.blast_pad = read_pavement(bs),
            rec::OVERRUN_PRIM          => self.primary.overrun = read_pavement(bs),
            rec::OVERRUN_SEC           => self.secondary.overrun = read_pavement(bs),
            rec::VASI_PRIM_LEFT        => self.primary.left_vasi = Some(read_vasi(bs)),
            rec::VASI_PRIM_RIGHT       => self.primary.right_vasi = Some(read_vasi(bs)),
            rec::VASI_SEC_LEFT         => self.secondary.left_vasi = Some(read_vasi(bs)),
            rec::VASI_SEC_RIGHT        => self.secondary.right_vasi = Some(read_vasi(bs)),
            rec::APP_LIGHTS_PRIM       => read_approach_lights(&mut self.primary, bs),
            rec::APP_LIGHTS_SEC        => read_approach_lights(&mut self.secondary, bs),
            other => tracing::debug!("Unexpected runway subrecord 0x{other:04x}"),
        }
    }

    pub fn surface_str(&self) -> &'static str {
        surface_to_str(self.surface)
    }

    pub fn is_hard(&self) -> bool {
        matches!(self.surface_str(), "C" | "A" | "B" | "T" | "M" | "BR")
    }

    pub fn is_water(&self) -> bool {
        self.surface == 2
    }

    pub fn is_lighted(&self) -> bool {
        self.edge_light.is_some()
    }
}

/// Surface `u16` followed by length and width. Only the length is kept.
fn read_pavement(bs: &mut BinaryStream) -> f32 {
    bs.skip(2);
    let length = bs.read_f32();
    bs.skip(4);
    length
}

fn read_vasi(bs: &mut BinaryStream) -> Vasi {
    let vasi_type = bs.read_u16();
    bs.skip(12); // bias x, bias z, spacing
    Vasi { vasi_type, pitch: bs.read_f32() }
}

fn read_approach_lights(end: &mut RunwayEnd, bs: &mut BinaryStream) {
    let flags = bs.read_u8();
    end.approach_lights = approach_lights_to_str(flags & 0x1f);
    end.end_lights = flags & 0x20 != 0;
    end.reils = flags & 0xc0 != 0;
    bs.skip(1); // strobes
}
