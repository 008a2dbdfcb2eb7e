//! Database report written to the log after a compile run.
//!
//! Row counts of all tables, groups of duplicate objects and objects with
//! coordinates outside of the valid range.

use rusqlite::Connection;

use crate::error::Result;

/// Groups shown per duplicate check.
const MAX_DUPLICATES: usize = 20;

/// Table and the columns that make two rows equal.
const DUPLICATE_CHECKS: &[(&str, &[&str])] = &[
    ("airport",  &["ident"]),
    ("vor",      &["ident", "region", "lonx", "laty"]),
    ("ndb",      &["ident", "region", "lonx", "laty"]),
    ("waypoint", &["ident", "region", "lonx", "laty"]),
    ("ils",      &["ident", "region", "lonx", "laty"]),
    ("marker",   &["ident", "region", "lonx", "laty"]),
    ("helipad",  &["airport_id", "lonx", "laty"]),
    ("parking",  &["airport_id", "name", "number", "lonx", "laty"]),
    ("start",    &["airport_id", "lonx", "laty"]),
    ("runway",   &["airport_id", "heading", "lonx", "laty"]),
    ("bgl_file", &["filename"]),
];

const COORDINATE_CHECKS: &[&str] = &["airport", "vor", "ndb", "marker", "waypoint"];

#[derive(Debug, Clone, PartialEq)]
pub struct DuplicateGroup {
    pub table: &'static str,
    /// Space separated values of the compared columns.
    pub key: String,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CoordinateViolation {
    pub table: &'static str,
    pub id: i64,
    pub ident: Option<String>,
    pub lonx: f64,
    pub laty: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DatabaseReport {
    pub row_counts: Vec<(String, i64)>,
    pub duplicates: Vec<DuplicateGroup>,
    pub coordinate_violations: Vec<CoordinateViolation>,
}

impl DatabaseReport {
    pub fn create(conn: &Connection) -> Result<Self> {
        Ok(Self {
            row_counts: row_counts(conn)?,
            duplicates: duplicates(conn)?,
            coordinate_violations: coordinate_violations(conn)?,
        })
    }

    pub fn log(&self) {
        tracing::info!("Table row counts");
        for (table, count) in &self.row_counts {
            tracing::info!("  {table:<24} {count:>9}");
        }

        if self.duplicates.is_empty() {
            tracing::info!("No duplicates found");
        }
        for dup in &self.duplicates {
            tracing::warn!("Duplicate {} \"{}\" found {} times", dup.table, dup.key, dup.count);
        }

        if self.coordinate_violations.is_empty() {
            tracing::info!("No invalid coordinates found");
        }
        for v in &self.coordinate_violations {
            tracing::warn!(
                "Invalid coordinates in {} id {} ident {}: {:.6} {:.6}",
                v.table,
                v.id,
                v.ident.as_deref().unwrap_or("-"),
                v.lonx,
                v.laty
            );
        }
    }
}

fn row_counts(conn: &Connection) -> Result<Vec<(String, i64)>> {
    let tables: Vec<String> = conn
        .prepare("SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name")?
        .query_map([], |r| r.get(0))?
        .collect::<rusqlite::Result<_>>()?;

    let mut counts = Vec::with_capacity(tables.len());
    for table in tables {
        let count: i64 = conn.query_row(&format!("SELECT count(*) FROM \"{table}\""), [], |r| r.get(0))?;
        counts.push((table, count));
    }
    Ok(counts)
}

fn duplicates(conn: &Connection) -> Result<Vec<DuplicateGroup>> {
    let mut groups = Vec::new();
    for &(table, columns) in DUPLICATE_CHECKS {
        let key = columns.iter().map(|c| format!("ifnull({c}, '')")).collect::<Vec<_>>().join(" || ' ' || ");
        let sql = format!(
            "SELECT {key} AS k, count(*) AS c FROM {table} GROUP BY {} HAVING count(*) > 1
             ORDER BY c DESC, k LIMIT {MAX_DUPLICATES}",
            columns.join(", ")
        );
        let mut stmt = conn.prepare(&sql)?;
        let found = stmt.query_map([], |r| Ok(DuplicateGroup { table, key: r.get(0)?, count: r.get(1)? }))?;
        for group in found {
            groups.push(group?);
        }
    }
    Ok(groups)
}

fn coordinate_violations(conn: &Connection) -> Result<Vec<CoordinateViolation>> {
    let mut violations = Vec::new();
    for &table in COORDINATE_CHECKS {
        let sql = format!(
            "SELECT {table}_id, ident, lonx, laty FROM {table}
             WHERE lonx < -180 OR lonx > 180 OR laty < -90 OR laty > 90 ORDER BY {table}_id"
        );
        let mut stmt = conn.prepare(&sql)?;
        let found = stmt.query_map([], |r| {
            Ok(CoordinateViolation { table, id: r.get(0)?, ident: r.get(1)?, lonx: r.get(2)?, laty: r.get(3)? })
        })?;
        for violation in found {
            violations.push(violation?);
        }
    }
    Ok(violations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::testutil::test_context;

    #[test]
    fn duplicates_and_bad_coordinates_are_found() {
        let (conn, _) = test_context();
        conn.execute_batch(
            "INSERT INTO airport (airport_id, file_id, ident, left_lonx, top_laty, right_lonx, bottom_laty, altitude, lonx, laty)
             VALUES
               (1, 1, 'KSEA', -122.3, 47.4, -122.3, 47.4, 433, -122.3, 47.4),
               (2, 2, 'KSEA', -122.3, 47.4, -122.3, 47.4, 433, -122.3, 47.4),
               (3, 2, 'KBFI', -122.3, 147.5, -122.3, 147.5, 21, -122.3, 147.5);
             INSERT INTO ndb (ndb_id, file_id, ident, region, frequency, lonx, laty) VALUES
               (1, 1, 'BF', 'K1', 36200, -122.3, 47.5),
               (2, 1, 'BF', 'K1', 36200, -122.3, 47.6);",
        )
        .unwrap();

        let report = DatabaseReport::create(&conn).unwrap();
        assert_eq!(report.duplicates, [DuplicateGroup { table: "airport", key: "KSEA".to_string(), count: 2 }]);

        assert_eq!(report.coordinate_violations.len(), 1);
        assert_eq!(report.coordinate_violations[0].table, "airport");
        assert_eq!(report.coordinate_violations[0].ident.as_deref(), Some("KBFI"));

        let airports = report.row_counts.iter().find(|(t, _)| t == "airport").map(|(_, c)| *c);
        assert_eq!(airports, Some(3));
        report.log();
    }
}
