use crate::converter;
use crate::nav::ilsvor::{read_name, Dme};
use crate::position::BglPosition;
use crate::record::{rec, Record, RECORD_HEADER_LEN};
use crate::stream::BinaryStream;
use crate::ReadContext;

/// P3D TACAN.
///
/// ```text
/// position | range f32 | magvar f32 | ident u32 | region/airport u32
/// channel u16 | band u8 (0 X, 1 Y) | flags u8 (0x1 DME only)
/// subrecords: DME, name
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Tacan {
    pub position: BglPosition,
    pub range: f32,
    pub magvar: f32,
    pub ident: String,
    pub region: String,
    pub airport: String,
    pub channel: u16,
    pub band_x: bool,
    pub dme_only: bool,
    pub name: String,
    pub dme: Option<Dme>,
}

impl Tacan {
    pub fn read(ctx: &ReadContext, bs: &mut BinaryStream) -> Self {
        let record = Record::read(bs);
        let position = BglPosition::read(bs, true);
        let range = bs.read_f32();
        let magvar = converter::adjust_magvar(bs.read_f32());
        let ident = converter::int_to_icao(bs.read_u32(), false);
        let (region, airport) = converter::region_and_airport(bs.read_u32());
        let mut tacan = Tacan {
            position,
            range,
            magvar,
            ident,
            region,
            airport,
            channel: bs.read_u16(),
            band_x: bs.read_u8() == 0,
            dme_only: bs.read_u8() & 0x1 != 0,
            ..Tacan::default()
        };

        let cursor = record.subrecords(bs);
        while let Some(sub) = cursor.next(bs) {
            bs.skip(RECORD_HEADER_LEN);
            match sub.id {
                rec::DME => tacan.dme = Some(Dme::read(bs)),
                rec::NAME => tacan.name = read_name(&sub, bs, ctx.encoding()),
                other => tracing::debug!("Unexpected TACAN subrecord 0x{other:04x}"),
            }
            sub.seek_to_end(bs);
        }
        record.seek_to_end(bs);
        tacan
    }

    /// Channel with band, like `109X`.
    pub fn channel_str(&self) -> String {
        format!("{}{}", self.channel, if self.band_x { 'X' } else { 'Y' })
    }
}
