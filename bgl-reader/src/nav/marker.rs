use crate::converter;
use crate::position::BglPosition;
use crate::record::Record;
use crate::stream::BinaryStream;

pub fn marker_type_to_str(marker_type: u8) -> &'static str {
    match marker_type {
        0 => "INNER",
        1 => "MIDDLE",
        2 => "OUTER",
        3 => "BACKCOURSE",
        _ => {
            tracing::warn!("Invalid marker type {marker_type}");
            "INVALID"
        }
    }
}

/// `unknown u8 | heading f32 | type u8 | position | ident u32 | region u32`
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Marker {
    pub heading: f32,
    pub marker_type: u8,
    pub position: BglPosition,
    pub ident: String,
    pub region: String,
}

impl Marker {
    pub fn read(bs: &mut BinaryStream) -> Self {
        let record = Record::read(bs);
        bs.skip(1);
        let marker = Marker {
            heading: bs.read_f32(),
            marker_type: bs.read_u8(),
            position: BglPosition::read(bs, true),
            ident: converter::int_to_icao(bs.read_u32(), false),
            region: converter::int_to_icao(bs.read_u32() & 0x7ff, true),
        };
        record.seek_to_end(bs);
        marker
    }

    pub fn type_str(&self) -> &'static str {
        marker_type_to_str(self.marker_type)
    }
}
