//! `earth_mora.dat` minimum off-route altitude grid.
//!
//! ```text
//! N47 W130 040 035 UNK 025 ...
//! ```
//! Latitude and longitude of the first one degree cell followed by 30 cells
//! going east. Values are hundreds of feet or `UNK`.

use rusqlite::params;

use super::{invalid_line, XpLine, XpReader};
use crate::error::Result;
use crate::writer::ids::Table;
use crate::writer::WriteContext;

const COLUMNS: usize = 30;
const FIELDS: usize = COLUMNS + 2;
/// Stored for cells without a value.
const UNKNOWN: i64 = -1;

/// `N47`, `S05`, `W130` or a signed number.
fn coordinate(value: &str, positive: char, negative: char) -> Option<i64> {
    let mut chars = value.chars();
    let sign = match chars.next()? {
        c if c == positive => 1,
        c if c == negative => -1,
        _ => return value.parse().ok(),
    };
    chars.as_str().parse::<i64>().ok().map(|v| v * sign)
}

#[derive(Debug, Clone, PartialEq)]
struct MoraRow {
    laty: i64,
    lonx: i64,
    altitudes: Vec<i64>,
}

#[derive(Debug, Default)]
pub struct XpMoraReader {
    rows: Vec<MoraRow>,
}

impl XpReader for XpMoraReader {
    fn read(&mut self, ctx: &mut WriteContext, line: &XpLine) -> Result<()> {
        if line.len() != FIELDS {
            return Ok(());
        }
        let (Some(laty), Some(lonx)) = (coordinate(line.at(0), 'N', 'S'), coordinate(line.at(1), 'E', 'W')) else {
            invalid_line(ctx, line, "invalid MORA grid coordinates");
            return Ok(());
        };
        let altitudes = (2..FIELDS)
            .map(|i| line.parse::<i64>(i).map_or(UNKNOWN, |alt| alt * 100))
            .collect();
        self.rows.push(MoraRow { laty, lonx, altitudes });
        Ok(())
    }

    fn finish(&mut self, ctx: &mut WriteContext) -> Result<()> {
        for row in &self.rows {
            let altitudes: Vec<String> = row.altitudes.iter().map(i64::to_string).collect();
            ctx.conn
                .prepare_cached(
                    "INSERT INTO mora_grid (mora_grid_id, file_id, laty, lonx, columns, altitudes)
                     VALUES (?1,?2,?3,?4,?5,?6)",
                )?
                .execute(params![
                    ctx.ids.next(Table::MoraGrid),
                    ctx.file_id,
                    row.laty,
                    row.lonx,
                    COLUMNS as i64,
                    altitudes.join(","),
                ])?;
        }
        tracing::debug!("{} MORA grid rows from {}", self.rows.len(), ctx.filename);
        Ok(())
    }

    fn reset(&mut self) {
        self.rows.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::testutil::{count, test_context};
    use crate::xplane::{read_file, testutil::data_file, XpFormat};

    fn grid_line(lat: &str, lon: &str) -> String {
        let cells: Vec<&str> = (0..COLUMNS).map(|i| if i == 2 { "UNK" } else { "045" }).collect();
        format!("{lat} {lon} {}", cells.join(" "))
    }

    #[test]
    fn grid_lines_are_written_on_finish() {
        let (conn, options) = test_context();
        let mut ctx = WriteContext::new(&conn, &options);
        let content = format!(
            "I\n1150 Version - data cycle 2101\n{}\n{}\nshort line\n99\n",
            grid_line("N47", "W130"),
            grid_line("S05", "E010"),
        );
        let dir = tempfile::tempdir().unwrap();
        let path = data_file(&dir, "earth_mora.dat", &content);

        read_file(&mut ctx, &path, XpFormat::Dat, &mut XpMoraReader::default()).unwrap();
        assert_eq!(count(&conn, "mora_grid"), 2);

        let (lonx, altitudes): (i64, String) = conn
            .query_row("SELECT lonx, altitudes FROM mora_grid WHERE laty = 47", [], |r| Ok((r.get(0)?, r.get(1)?)))
            .unwrap();
        assert_eq!(lonx, -130);
        assert!(altitudes.starts_with("4500,4500,-1,4500"));
    }

    #[test]
    fn coordinates() {
        assert_eq!(coordinate("N47", 'N', 'S'), Some(47));
        assert_eq!(coordinate("S05", 'N', 'S'), Some(-5));
        assert_eq!(coordinate("W130", 'E', 'W'), Some(-130));
        assert_eq!(coordinate("-12", 'E', 'W'), Some(-12));
        assert_eq!(coordinate("X12", 'E', 'W'), None);
    }
}
