//! `earth_fix.dat` and `user_fix.dat`.
//!
//! ```text
//! 47.507500000 -122.201388889 SUMMA ENRT K1 4530263 SUMMA
//! ```
//! Latitude, longitude, ident, airport ident or `ENRT`, region, ARINC
//! flags and an optional name.

use navdata_schema::NavDbObjectType;

use super::{invalid_line, non_empty, XpLine, XpReader};
use crate::error::Result;
use crate::fsutil::waypoint_flags_from_xplane;
use crate::writer::nav::{insert_waypoint, WaypointRow};
use crate::writer::WriteContext;

const ENROUTE: &str = "ENRT";

#[derive(Debug, Default)]
pub struct XpFixReader;

impl XpReader for XpFixReader {
    fn read(&mut self, ctx: &mut WriteContext, line: &XpLine) -> Result<()> {
        if !ctx.is_included(NavDbObjectType::Waypoint) {
            return Ok(());
        }
        if line.len() < 5 {
            invalid_line(ctx, line, "fix line too short");
            return Ok(());
        }
        let Some(position) = line.position(0, 1) else {
            invalid_line(ctx, line, "invalid fix coordinates");
            return Ok(());
        };

        let airport = line.at(3);
        let airport_ident = (airport != ENROUTE).then(|| airport.to_string());
        let airport_id = airport_ident.as_deref().and_then(|ident| ctx.index.airport_id(ident));
        let arinc = waypoint_flags_from_xplane(line.at(5), "");

        let row = WaypointRow {
            ident: line.at(2).to_string(),
            name: non_empty(&line.rest(6)),
            region: non_empty(line.at(4)),
            airport_id,
            airport_ident,
            waypoint_type: "WN".to_string(),
            arinc_type: non_empty(&arinc),
            position,
            ..WaypointRow::default()
        };
        insert_waypoint(ctx, &row)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::testutil::{count, test_context};
    use crate::xplane::{read_file, testutil::data_file, XpFormat};

    const FIX: &str = "I
1101 Version - data cycle 2110, build 20211007, metadata FixXP1101.

 47.507500000 -122.201388889 SUMMA ENRT K1 4530263 SUMMA
 47.400000000 -122.300000000 RW16R KSEA K1 5251143
 99.000000000 -122.300000000 BAD   ENRT K1 0
 47.4
99
";

    #[test]
    fn fixes_are_written() {
        let (conn, options) = test_context();
        let mut ctx = WriteContext::new(&conn, &options);
        ctx.index.add_airport("KSEA", 3, geo::Point::new(-122.3, 47.45));
        let dir = tempfile::tempdir().unwrap();
        let path = data_file(&dir, "earth_fix.dat", FIX);

        read_file(&mut ctx, &path, XpFormat::Dat, &mut XpFixReader).unwrap();
        assert_eq!(count(&conn, "waypoint"), 2);
        assert_eq!(ctx.counters.errors, 2);

        let (arinc, airport_id): (String, Option<i64>) = conn
            .query_row("SELECT arinc_type, airport_id FROM waypoint WHERE ident = 'RW16R'", [], |r| {
                Ok((r.get(0)?, r.get(1)?))
            })
            .unwrap();
        assert_eq!(arinc, "G P");
        assert_eq!(airport_id, Some(3));

        let name: Option<String> = conn
            .query_row("SELECT name FROM waypoint WHERE ident = 'SUMMA'", [], |r| r.get(0))
            .unwrap();
        assert_eq!(name.as_deref(), Some("SUMMA"));
    }
}
