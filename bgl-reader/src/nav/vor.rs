use crate::nav::ilsvor::{read_name, Dme, NavHeader};
use crate::record::{rec, Record, RECORD_HEADER_LEN};
use crate::stream::BinaryStream;
use crate::ReadContext;

#[derive(Debug, Clone, PartialEq)]
pub struct Vor {
    pub header: NavHeader,
    pub name: String,
    pub dme: Option<Dme>,
}

impl Vor {
    pub fn read(ctx: &ReadContext, bs: &mut BinaryStream) -> Self {
        let record = Record::read(bs);
        let mut vor = Vor { header: NavHeader::read(bs), name: String::new(), dme: None };

        let cursor = record.subrecords(bs);
        while let Some(sub) = cursor.next(bs) {
            bs.skip(RECORD_HEADER_LEN);
            match sub.id {
                rec::DME => vor.dme = Some(Dme::read(bs)),
                rec::NAME => vor.name = read_name(&sub, bs, ctx.encoding()),
                other => tracing::debug!("Unexpected VOR subrecord 0x{other:04x}"),
            }
            sub.seek_to_end(bs);
        }
        record.seek_to_end(bs);
        vor
    }

    /// `VOR`, `VORDME` or `DME`.
    pub fn kind(&self) -> &'static str {
        match (self.header.dme_only, self.dme.is_some()) {
            (true, _)      => "DME",
            (false, true)  => "VORDME",
            (false, false) => "VOR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::StructureType;
    use crate::testutil::IlsVorBuilder;
    use navdata_schema::NavDatabaseOptions;

    #[test]
    fn vor_with_dme() {
        let data = IlsVorBuilder::new(3, "SEA", 116_800_000, -122.31, 47.43)
            .dme()
            .name("SEATTLE")
            .build();
        let mut bs = BinaryStream::new(data);
        let options = NavDatabaseOptions::default();
        let vor = Vor::read(&ReadContext::new(&options, StructureType::Fsx), &mut bs);
        assert_eq!(vor.header.ident, "SEA");
        assert_eq!(vor.header.frequency, 116_800);
        assert_eq!(vor.header.nav_type.as_str(), "H");
        assert_eq!(vor.kind(), "VORDME");
        assert_eq!(vor.name, "SEATTLE");
    }
}
