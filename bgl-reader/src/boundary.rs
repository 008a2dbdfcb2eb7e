//! Airspace boundaries.
//!
//! ```text
//! type u8 | altitude types u8 (min low nibble, max high nibble)
//! min position : lon u32, lat u32, alt i32
//! max position : lon u32, lat u32, alt i32
//! subrecords   : name, com, lines
//! line point   : type u16 | lon u32 | lat u32 (circle: radius f32 meters)
//! ```

use crate::nav::ilsvor::read_name;
use crate::position::BglPosition;
use crate::record::{rec, Record, RECORD_HEADER_LEN};
use crate::stream::BinaryStream;
use crate::ReadContext;

pub fn boundary_type_to_str(boundary_type: u8) -> &'static str {
    const TYPES: [&str; 24] = [
        "NONE", "C", "CA", "CB", "CC", "CD", "CE", "CF", "CG", "T", "CL", "G", "D", "A", "M", "R", "P",
        "W", "AL", "DA", "NP", "MD", "RD", "TR",
    ];
    match TYPES.get(usize::from(boundary_type)) {
        Some(s) => s,
        None => {
            tracing::warn!("Invalid boundary type {boundary_type}");
            "INVALID"
        }
    }
}

pub fn altitude_type_to_str(altitude_type: u8) -> &'static str {
    match altitude_type {
        0 => "UNKNOWN",
        1 => "MSL",
        2 => "AGL",
        3 => "UL",
        _ => {
            tracing::warn!("Invalid boundary altitude type {altitude_type}");
            "INVALID"
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BoundaryPoint {
    Start(BglPosition),
    Line(BglPosition),
    /// Center of the following arcs or circle.
    Origin(BglPosition),
    ArcClockwise(BglPosition),
    ArcCounterClockwise(BglPosition),
    /// Radius in meters around the last origin.
    Circle(f32),
}

impl BoundaryPoint {
    fn read(bs: &mut BinaryStream) -> Option<Self> {
        let point_type = bs.read_u16();
        if point_type == 6 {
            bs.skip(4);
            return Some(Self::Circle(bs.read_f32()));
        }
        let pos = BglPosition::read(bs, false);
        match point_type {
            1 => Some(Self::Start(pos)),
            2 => Some(Self::Line(pos)),
            3 => Some(Self::Origin(pos)),
            4 => Some(Self::ArcClockwise(pos)),
            5 => Some(Self::ArcCounterClockwise(pos)),
            other => {
                tracing::warn!("Invalid boundary point type {other}");
                None
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Boundary {
    pub boundary_type: u8,
    pub min_altitude_type: u8,
    pub max_altitude_type: u8,
    /// Meters.
    pub min_altitude: f64,
    pub max_altitude: f64,
    pub min_position: BglPosition,
    pub max_position: BglPosition,
    pub name: String,
    pub com_type: u16,
    /// kHz.
    pub com_frequency: u32,
    pub com_name: String,
    pub points: Vec<BoundaryPoint>,
}

impl Boundary {
    pub fn read(ctx: &ReadContext, bs: &mut BinaryStream) -> Self {
        let record = Record::read(bs);
        let boundary_type = bs.read_u8();
        let altitude_types = bs.read_u8();
        let min_position = BglPosition::read(bs, true);
        let max_position = BglPosition::read(bs, true);
        let mut boundary = Boundary {
            boundary_type,
            min_altitude_type: altitude_types & 0x0f,
            max_altitude_type: altitude_types >> 4,
            min_altitude: min_position.altitude,
            max_altitude: max_position.altitude,
            min_position,
            max_position,
            ..Boundary::default()
        };

        let cursor = record.subrecords(bs);
        while let Some(sub) = cursor.next(bs) {
            bs.skip(RECORD_HEADER_LEN);
            match sub.id {
                rec::NAME => boundary.name = read_name(&sub, bs, ctx.encoding()),
                rec::BOUNDARY_COM => {
                    boundary.com_type = bs.read_u16();
                    boundary.com_frequency = bs.read_u32() / 1000;
                    let len = (sub.size as usize).saturating_sub(RECORD_HEADER_LEN + 6);
                    boundary.com_name = bs.read_string(len, ctx.encoding());
                }
                rec::BOUNDARY_LINES => {
                    let count = bs.read_u16();
                    boundary.points.extend((0..count).filter_map(|_| BoundaryPoint::read(bs)));
                }
                other => tracing::debug!("Unexpected boundary subrecord 0x{other:04x}"),
            }
            sub.seek_to_end(bs);
        }
        record.seek_to_end(bs);
        boundary
    }

    pub fn type_str(&self) -> &'static str {
        boundary_type_to_str(self.boundary_type)
    }

    pub fn has_com(&self) -> bool {
        self.com_frequency > 0
    }

    /// Lon/lat rectangle from the min and max positions.
    pub fn bounding_rect(&self) -> (f64, f64, f64, f64) {
        (
            self.min_position.lon.min(self.max_position.lon),
            self.min_position.lat.max(self.max_position.lat),
            self.min_position.lon.max(self.max_position.lon),
            self.min_position.lat.min(self.max_position.lat),
        )
    }
}
