//! `earth_awy.dat` segments.
//!
//! ```text
//! ABBOT K5 11 ACORN K5 11 N 1 30 180 V1-V205
//! ```
//! From fix, region and type, to fix, region and type, direction, level,
//! base and top flight level and the airway names joined by `-`.
//!
//! Segments go to `tmp_airway` since waypoint ids are not known before all
//! files are read. `xplane/prepare_airway.sql` resolves them afterwards.

use navdata_schema::NavDbObjectType;
use rusqlite::params;

use super::{invalid_line, XpLine, XpReader};
use crate::error::Result;
use crate::writer::ids::Table;
use crate::writer::WriteContext;

fn fix_type(code: &str) -> Option<&'static str> {
    match code {
        "11" => Some("W"),
        "2" => Some("N"),
        "3" => Some("V"),
        _ => None,
    }
}

#[derive(Debug, Default)]
pub struct XpAirwayReader;

impl XpReader for XpAirwayReader {
    fn read(&mut self, ctx: &mut WriteContext, line: &XpLine) -> Result<()> {
        if !ctx.is_included(NavDbObjectType::Airway) {
            return Ok(());
        }
        if line.len() < 11 {
            invalid_line(ctx, line, "airway line too short");
            return Ok(());
        }
        let (Some(from_type), Some(to_type)) = (fix_type(line.at(2)), fix_type(line.at(5))) else {
            invalid_line(ctx, line, "invalid airway fix type");
            return Ok(());
        };
        let airway_type = match line.at(7) {
            "1" => "V",
            "2" => "J",
            _ => {
                invalid_line(ctx, line, "invalid airway level");
                return Ok(());
            }
        };
        let direction = match line.at(6) {
            d @ ("N" | "F" | "B") => d,
            _ => {
                invalid_line(ctx, line, "invalid airway direction");
                return Ok(());
            }
        };
        let minimum_altitude = line.parse::<i64>(8).map(|fl| fl * 100);
        let maximum_altitude = line.parse::<i64>(9).map(|fl| fl * 100);

        for name in line.at(10).split('-').filter(|n| !n.is_empty()) {
            let id = ctx.ids.next(Table::TmpAirway);
            ctx.conn
                .prepare_cached(
                    "INSERT INTO tmp_airway
                     (tmp_airway_id, airway_name, airway_type, from_ident, from_region, from_type,
                      to_ident, to_region, to_type, direction, minimum_altitude, maximum_altitude)
                     VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12)",
                )?
                .execute(params![
                    id,
                    name,
                    airway_type,
                    line.at(0),
                    line.at(1),
                    from_type,
                    line.at(3),
                    line.at(4),
                    to_type,
                    direction,
                    minimum_altitude,
                    maximum_altitude,
                ])?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::testutil::{count, test_context};
    use crate::xplane::{read_file, testutil::data_file, XpFormat};

    const AWY: &str = "I
1100 Version - data cycle 1809, build 20180822, metadata AwyXP1100.

ABBOT K5 11 ACORN K5 11 N 1 30 180 V1-V205
SEA   K1 3  SUMMA K1 11 F 2 180 450 J5
BAD   K1 7  SUMMA K1 11 F 2 180 450 J5
99
";

    #[test]
    fn segments_are_split_by_airway_name() {
        let (conn, options) = test_context();
        let mut ctx = WriteContext::new(&conn, &options);
        let dir = tempfile::tempdir().unwrap();
        let path = data_file(&dir, "earth_awy.dat", AWY);

        read_file(&mut ctx, &path, XpFormat::Dat, &mut XpAirwayReader).unwrap();
        assert_eq!(count(&conn, "tmp_airway"), 3);
        assert_eq!(ctx.counters.errors, 1);

        let (from_type, direction, min_alt, max_alt): (String, String, i64, i64) = conn
            .query_row(
                "SELECT from_type, direction, minimum_altitude, maximum_altitude FROM tmp_airway WHERE airway_name = 'J5'",
                [],
                |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?)),
            )
            .unwrap();
        assert_eq!(from_type, "V");
        assert_eq!(direction, "F");
        assert_eq!(min_alt, 18_000);
        assert_eq!(max_alt, 45_000);
    }
}
