use crate::converter;
use crate::nav::ilsvor::{read_name, Dme, NavHeader};
use crate::position::BglPosition;
use crate::record::{rec, Record, RECORD_HEADER_LEN};
use crate::stream::BinaryStream;
use crate::ReadContext;

/// `runway number u8 | designator u8 | heading f32 | width f32`
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Localizer {
    /// Empty when the record has no runway number.
    pub runway_name: String,
    pub heading: f32,
    /// Beam width in degrees.
    pub width: f32,
    /// MSFS stores magnetic headings.
    pub heading_is_magnetic: bool,
}

/// `unused u16 | position | range f32 | pitch f32`
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Glideslope {
    pub position: BglPosition,
    pub range: f32,
    pub pitch: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ils {
    pub header: NavHeader,
    pub name: String,
    pub localizer: Option<Localizer>,
    pub glideslope: Option<Glideslope>,
    pub dme: Option<Dme>,
}

impl Ils {
    pub fn read(ctx: &ReadContext, bs: &mut BinaryStream) -> Self {
        let record = Record::read(bs);
        let mut ils = Ils {
            header: NavHeader::read(bs),
            name: String::new(),
            localizer: None,
            glideslope: None,
            dme: None,
        };

        let cursor = record.subrecords(bs);
        while let Some(sub) = cursor.next(bs) {
            bs.skip(RECORD_HEADER_LEN);
            match sub.id {
                rec::LOCALIZER => {
                    let number = bs.read_u8();
                    let designator = bs.read_u8();
                    ils.localizer = Some(Localizer {
                        runway_name: if number == 0 {
                            String::new()
                        } else {
                            converter::runway_to_str(number, designator)
                        },
                        heading: bs.read_f32(),
                        width: bs.read_f32(),
                        heading_is_magnetic: ctx.layout().magnetic_localizer,
                    });
                }
                rec::GLIDESLOPE => {
                    bs.skip(2);
                    ils.glideslope = Some(Glideslope {
                        position: BglPosition::read(bs, true),
                        range: bs.read_f32(),
                        pitch: bs.read_f32(),
                    });
                }
                rec::DME => ils.dme = Some(Dme::read(bs)),
                rec::NAME => ils.name = read_name(&sub, bs, ctx.encoding()),
                other => tracing::debug!("Unexpected ILS subrecord 0x{other:04x}"),
            }
            sub.seek_to_end(bs);
        }
        record.seek_to_end(bs);
        ils
    }

    /// An ILS without localizer cannot be drawn or assigned to a runway.
    pub fn is_complete(&self) -> bool {
        self.localizer.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::StructureType;
    use crate::testutil::IlsVorBuilder;
    use navdata_schema::NavDatabaseOptions;

    #[test]
    fn ils_with_localizer_and_glideslope() {
        let data = IlsVorBuilder::new(4, "ISNQ", 110_300_000, -122.31, 47.46)
            .localizer(16, 3, 161.0, 5.0)
            .glideslope(3.0)
            .name("IGS 16C")
            .build();
        let options = NavDatabaseOptions::default();
        let mut bs = BinaryStream::new(data);
        let ils = Ils::read(&ReadContext::new(&options, StructureType::Msfs), &mut bs);
        let loc = ils.localizer.as_ref().unwrap();
        assert_eq!(loc.runway_name, "16C");
        assert_eq!(loc.width, 5.0);
        assert!(loc.heading_is_magnetic);
        assert_eq!(ils.glideslope.as_ref().unwrap().pitch, 3.0);
        assert!(ils.is_complete());
        assert_eq!(ils.name, "IGS 16C");
    }

    #[test]
    fn ils_without_localizer_is_incomplete() {
        let data = IlsVorBuilder::new(4, "IXYZ", 109_900_000, 10.0, 50.0).build();
        let options = NavDatabaseOptions::default();
        let mut bs = BinaryStream::new(data);
        let ils = Ils::read(&ReadContext::new(&options, StructureType::Fsx), &mut bs);
        assert!(!ils.is_complete());
    }
}
