use crate::converter;
use crate::nav::ilsvor::read_name;
use crate::position::BglPosition;
use crate::record::{rec, Record, RECORD_HEADER_LEN};
use crate::stream::BinaryStream;
use crate::ReadContext;

pub fn ndb_type_to_str(ndb_type: u16) -> &'static str {
    match ndb_type {
        0 => "CP",
        1 => "MH",
        2 => "H",
        3 => "HH",
        _ => {
            tracing::warn!("Invalid NDB type {ndb_type}");
            "INVALID"
        }
    }
}

/// ```text
/// type u16 | frequency u32 (Hz) | position | range f32 | magvar f32
/// ident u32 | region/airport u32 | name subrecord
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Ndb {
    pub ndb_type: u16,
    /// kHz * 100.
    pub frequency: u32,
    pub position: BglPosition,
    pub range: f32,
    pub magvar: f32,
    pub ident: String,
    pub region: String,
    pub airport: String,
    pub name: String,
}

impl Ndb {
    pub fn read(ctx: &ReadContext, bs: &mut BinaryStream) -> Self {
        let record = Record::read(bs);
        let ndb_type = bs.read_u16();
        let frequency = bs.read_u32() / 10;
        let position = BglPosition::read(bs, true);
        let range = bs.read_f32();
        let magvar = converter::adjust_magvar(bs.read_f32());
        let ident = converter::int_to_icao(bs.read_u32(), false);
        let (region, airport) = converter::region_and_airport(bs.read_u32());
        let mut ndb = Ndb {
            ndb_type,
            frequency,
            position,
            range,
            magvar,
            ident,
            region,
            airport,
            name: String::new(),
        };

        let cursor = record.subrecords(bs);
        while let Some(sub) = cursor.next(bs) {
            if sub.id == rec::NAME {
                bs.skip(RECORD_HEADER_LEN);
                ndb.name = read_name(&sub, bs, ctx.encoding());
            }
            sub.seek_to_end(bs);
        }
        record.seek_to_end(bs);
        ndb
    }

    pub fn type_str(&self) -> &'static str {
        ndb_type_to_str(self.ndb_type)
    }
}
