//! Builds the `airway` table from airway segments.
//!
//! BGL waypoints carry their airway neighbours in `airway_point`. The
//! neighbours are resolved by ident, region and type to the nearest matching
//! waypoint. X-Plane segments come resolved from `tmp_airway`. Segments of
//! an airway are joined into fragments of connected waypoints.

use std::collections::{BTreeMap, HashMap, HashSet};

use geo::Point;
use rusqlite::{params, Connection};

use crate::error::Result;
use crate::geometry::{distance_meter, Rect};

#[derive(Debug, Clone, PartialEq)]
struct Segment {
    name: String,
    airway_type: String,
    from: i64,
    to: i64,
    /// `N` none, `F` forward or `B` backward.
    direction: String,
    minimum_altitude: Option<i64>,
    maximum_altitude: Option<i64>,
}

impl Segment {
    fn reversed(mut self) -> Self {
        std::mem::swap(&mut self.from, &mut self.to);
        self.direction = match self.direction.as_str() {
            "F" => "B",
            "B" => "F",
            other => other,
        }
        .to_string();
        self
    }

    fn key(&self) -> (String, i64, i64) {
        (self.name.clone(), self.from.min(self.to), self.from.max(self.to))
    }
}

/// `V`, `N` or `W` for all other waypoint types.
fn fix_class(waypoint_type: &str) -> &'static str {
    match waypoint_type {
        "V" => "V",
        "N" => "N",
        _ => "W",
    }
}

#[derive(Debug, Clone)]
struct WaypointNode {
    id: i64,
    class: &'static str,
    position: Point<f64>,
}

#[derive(Debug, Default)]
struct Waypoints {
    by_ident: HashMap<(String, String), Vec<WaypointNode>>,
    positions: HashMap<i64, Point<f64>>,
}

impl Waypoints {
    fn load(conn: &Connection) -> Result<Self> {
        let mut waypoints = Self::default();
        let mut stmt = conn.prepare("SELECT waypoint_id, ident, coalesce(region, ''), type, lonx, laty FROM waypoint")?;
        let rows = stmt.query_map([], |r| {
            Ok((
                r.get::<_, i64>(0)?,
                r.get::<_, String>(1)?,
                r.get::<_, String>(2)?,
                r.get::<_, String>(3)?,
                Point::new(r.get(4)?, r.get(5)?),
            ))
        })?;
        for row in rows {
            let (id, ident, region, waypoint_type, position) = row?;
            waypoints.positions.insert(id, position);
            waypoints
                .by_ident
                .entry((ident, region))
                .or_default()
                .push(WaypointNode { id, class: fix_class(&waypoint_type), position });
        }
        Ok(waypoints)
    }

    /// Nearest waypoint with the ident and region, same type preferred.
    fn resolve(&self, ident: &str, region: &str, fix_type: &str, near: Point<f64>) -> Option<i64> {
        let candidates = self.by_ident.get(&(ident.to_string(), region.to_string()))?;
        nearest(candidates.iter().filter(|n| n.class == fix_type), near).or_else(|| nearest(candidates.iter(), near))
    }
}

fn nearest<'a>(nodes: impl Iterator<Item = &'a WaypointNode>, near: Point<f64>) -> Option<i64> {
    nodes
        .map(|n| (distance_meter(near, n.position), n.id))
        .min_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, id)| id)
}

fn airway_point_segments(conn: &Connection, waypoints: &Waypoints, unresolved: &mut usize) -> Result<Vec<Segment>> {
    let mut stmt = conn.prepare(
        "SELECT waypoint_id, name, type,
                next_type, next_ident, coalesce(next_region, ''), next_minimum_altitude,
                previous_type, previous_ident, coalesce(previous_region, ''), previous_minimum_altitude
         FROM airway_point ORDER BY airway_point_id",
    )?;
    type Neighbor = (Option<String>, Option<String>, String, Option<i64>);
    let rows = stmt.query_map([], |r| {
        let next: Neighbor = (r.get(3)?, r.get(4)?, r.get(5)?, r.get(6)?);
        let previous: Neighbor = (r.get(7)?, r.get(8)?, r.get(9)?, r.get(10)?);
        Ok((r.get::<_, i64>(0)?, r.get::<_, String>(1)?, r.get::<_, String>(2)?, next, previous))
    })?;

    let mut segments = Vec::new();
    for row in rows {
        let (waypoint_id, name, airway_type, next, previous) = row?;
        let Some(&position) = waypoints.positions.get(&waypoint_id) else {
            continue;
        };
        for (neighbor, is_next) in [(next, true), (previous, false)] {
            let (Some(fix_type), Some(ident), region, minimum_altitude) = neighbor else {
                continue;
            };
            let Some(other) = waypoints.resolve(&ident, &region, &fix_type, position) else {
                tracing::debug!("Airway {name}: waypoint {ident}/{region} not found");
                *unresolved += 1;
                continue;
            };
            let (from, to) = if is_next { (waypoint_id, other) } else { (other, waypoint_id) };
            segments.push(Segment {
                name: name.clone(),
                airway_type: airway_type.clone(),
                from,
                to,
                direction: "N".to_string(),
                minimum_altitude,
                maximum_altitude: None,
            });
        }
    }
    Ok(segments)
}

fn tmp_airway_segments(conn: &Connection, unresolved: &mut usize) -> Result<Vec<Segment>> {
    let mut stmt = conn.prepare(
        "SELECT airway_name, airway_type, from_waypoint_id, to_waypoint_id, direction, minimum_altitude, maximum_altitude
         FROM tmp_airway ORDER BY tmp_airway_id",
    )?;
    let rows = stmt.query_map([], |r| {
        Ok((
            r.get::<_, String>(0)?,
            r.get::<_, String>(1)?,
            r.get::<_, Option<i64>>(2)?,
            r.get::<_, Option<i64>>(3)?,
            r.get::<_, String>(4)?,
            r.get::<_, Option<i64>>(5)?,
            r.get::<_, Option<i64>>(6)?,
        ))
    })?;

    let mut segments = Vec::new();
    for row in rows {
        let (name, airway_type, from, to, direction, minimum_altitude, maximum_altitude) = row?;
        let (Some(from), Some(to)) = (from, to) else {
            tracing::debug!("Airway {name}: segment with unknown waypoint");
            *unresolved += 1;
            continue;
        };
        segments.push(Segment { name, airway_type, from, to, direction, minimum_altitude, maximum_altitude });
    }
    Ok(segments)
}

/// Removes segments repeated by both ends or in both directions.
fn deduplicate(segments: Vec<Segment>) -> Vec<Segment> {
    let mut seen = HashSet::new();
    let mut result = Vec::with_capacity(segments.len());
    for segment in segments {
        if segment.from == segment.to {
            continue;
        }
        if seen.insert(segment.key()) {
            result.push(segment);
        }
    }
    result
}

/// Chains the segments of one airway. Walks start at open ends, what is
/// left over afterwards are loops.
fn fragments(segments: &[Segment]) -> Vec<Vec<Segment>> {
    let mut edges: HashMap<i64, Vec<usize>> = HashMap::new();
    for (i, s) in segments.iter().enumerate() {
        edges.entry(s.from).or_default().push(i);
        edges.entry(s.to).or_default().push(i);
    }
    let mut used = vec![false; segments.len()];
    let open_degree = |node: i64, used: &[bool]| edges[&node].iter().filter(|&&i| !used[i]).count();

    let mut result = Vec::new();
    loop {
        let start = segments
            .iter()
            .enumerate()
            .filter(|(i, _)| !used[*i])
            .flat_map(|(_, s)| [s.from, s.to])
            .find(|&node| open_degree(node, &used) == 1)
            .or_else(|| segments.iter().enumerate().find(|(i, _)| !used[*i]).map(|(_, s)| s.from));
        let Some(mut node) = start else {
            break;
        };

        let mut fragment = Vec::new();
        while let Some(&i) = edges[&node].iter().find(|&&i| !used[i]) {
            used[i] = true;
            let segment = segments[i].clone();
            let segment = if segment.from == node { segment } else { segment.reversed() };
            node = segment.to;
            fragment.push(segment);
        }
        result.push(fragment);
    }
    result
}

/// Resolves all segments and writes the `airway` rows. Returns the number
/// of rows written.
pub fn resolve_airways(conn: &Connection) -> Result<usize> {
    let waypoints = Waypoints::load(conn)?;
    let mut unresolved = 0;
    let mut segments = airway_point_segments(conn, &waypoints, &mut unresolved)?;
    segments.extend(tmp_airway_segments(conn, &mut unresolved)?);
    if unresolved > 0 {
        tracing::warn!("{unresolved} airway segments with unknown waypoints");
    }

    let mut by_name: BTreeMap<(String, String), Vec<Segment>> = BTreeMap::new();
    for segment in deduplicate(segments) {
        by_name.entry((segment.name.clone(), segment.airway_type.clone())).or_default().push(segment);
    }

    let mut id: i64 = conn.query_row("SELECT coalesce(max(airway_id), 0) FROM airway", [], |r| r.get(0))?;
    let mut stmt = conn.prepare_cached(
        "INSERT INTO airway
         (airway_id, airway_name, airway_type, airway_fragment_no, sequence_no, from_waypoint_id, to_waypoint_id,
          direction, minimum_altitude, maximum_altitude, left_lonx, top_laty, right_lonx, bottom_laty,
          from_lonx, from_laty, to_lonx, to_laty)
         VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13,?14,?15,?16,?17,?18)",
    )?;

    let mut written = 0;
    for segments in by_name.values() {
        for (fragment_no, fragment) in fragments(segments).iter().enumerate() {
            for (sequence_no, s) in fragment.iter().enumerate() {
                let (Some(&from), Some(&to)) = (waypoints.positions.get(&s.from), waypoints.positions.get(&s.to)) else {
                    continue;
                };
                let rect = Rect::from_points([from, to]).unwrap_or_else(|| Rect::from_point(from));
                id += 1;
                stmt.execute(params![
                    id,
                    s.name,
                    s.airway_type,
                    fragment_no as i64 + 1,
                    sequence_no as i64 + 1,
                    s.from,
                    s.to,
                    s.direction,
                    s.minimum_altitude,
                    s.maximum_altitude,
                    rect.left,
                    rect.top,
                    rect.right,
                    rect.bottom,
                    from.x(),
                    from.y(),
                    to.x(),
                    to.y(),
                ])?;
                written += 1;
            }
        }
    }
    tracing::info!("{written} airway segments in {} airways", by_name.len());
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::testutil::{count, test_context};

    fn waypoints(conn: &Connection) {
        conn.execute_batch(
            "INSERT INTO waypoint (waypoint_id, file_id, ident, region, type, lonx, laty) VALUES
               (1, 1, 'ALPHA', 'K1', 'WN', -122.0, 47.0),
               (2, 1, 'BRAVO', 'K1', 'WN', -121.0, 47.0),
               (3, 1, 'SEA',   'K1', 'V',  -120.0, 47.0),
               (4, 1, 'SEA',   'K1', 'WN', -100.0, 30.0),
               (5, 1, 'DELTA', 'K1', 'WN', -119.0, 47.0),
               (6, 1, 'ECHO',  'K1', 'WN', -118.0, 47.0);",
        )
        .unwrap();
    }

    fn airway_rows(conn: &Connection) -> Vec<(i64, i64, i64, i64, String)> {
        let mut stmt = conn
            .prepare(
                "SELECT airway_fragment_no, sequence_no, from_waypoint_id, to_waypoint_id, direction
                 FROM airway ORDER BY airway_id",
            )
            .unwrap();
        stmt.query_map([], |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?, r.get(4)?)))
            .unwrap()
            .map(|r| r.unwrap())
            .collect()
    }

    #[test]
    fn airway_points_are_resolved_and_chained() {
        let (conn, _) = test_context();
        waypoints(&conn);
        // Every segment is seen from both ends
        conn.execute_batch(
            "INSERT INTO airway_point (airway_point_id, waypoint_id, name, type, next_type, next_ident, next_region,
                                       next_minimum_altitude, previous_type, previous_ident, previous_region) VALUES
               (1, 1, 'V4', 'V', 'W', 'BRAVO', 'K1', 3000, NULL, NULL, NULL),
               (2, 2, 'V4', 'V', 'V', 'SEA', 'K1', 4000, 'W', 'ALPHA', 'K1'),
               (3, 3, 'V4', 'V', NULL, NULL, NULL, NULL, 'W', 'BRAVO', 'K1'),
               (4, 5, 'V4', 'V', NULL, NULL, NULL, NULL, 'W', 'NOPE', 'K1');",
        )
        .unwrap();

        assert_eq!(resolve_airways(&conn).unwrap(), 2);
        let rows = airway_rows(&conn);
        assert_eq!(rows[0].0, 1);
        assert_eq!((rows[0].1, rows[1].1), (1, 2));
        // VOR SEA preferred over the waypoint SEA
        assert!(rows.iter().any(|r| r.3 == 3 || r.2 == 3));
        assert!(rows.iter().all(|r| r.2 != 4 && r.3 != 4));
    }

    #[test]
    fn tmp_airway_fragments_and_directions() {
        let (conn, _) = test_context();
        waypoints(&conn);
        conn.execute_batch(
            "INSERT INTO tmp_airway (tmp_airway_id, airway_name, airway_type, from_ident, from_type, to_ident, to_type,
                                     direction, from_waypoint_id, to_waypoint_id) VALUES
               (1, 'J5', 'J', 'BRAVO', 'W', 'ALPHA', 'W', 'F', 2, 1),
               (2, 'J5', 'J', 'BRAVO', 'W', 'SEA', 'V', 'N', 2, 3),
               (3, 'J5', 'J', 'DELTA', 'W', 'ECHO', 'W', 'N', 5, 6),
               (4, 'J5', 'J', 'ECHO', 'W', 'DELTA', 'W', 'N', 6, 5),
               (5, 'J5', 'J', 'ECHO', 'W', 'XRAY', 'W', 'N', 6, NULL);",
        )
        .unwrap();

        assert_eq!(resolve_airways(&conn).unwrap(), 3);
        assert_eq!(count(&conn, "airway"), 3);
        let rows = airway_rows(&conn);
        // ALPHA - BRAVO - SEA walked from ALPHA flips the forward segment
        assert_eq!(rows[0], (1, 1, 1, 2, "B".to_string()));
        assert_eq!(rows[1], (1, 2, 2, 3, "N".to_string()));
        assert_eq!((rows[2].0, rows[2].1), (2, 1));
    }

    #[test]
    fn loops_become_one_fragment() {
        let seg = |from, to| Segment {
            name: "A1".into(),
            airway_type: "V".into(),
            from,
            to,
            direction: "N".into(),
            minimum_altitude: None,
            maximum_altitude: None,
        };
        let fragments = fragments(&[seg(1, 2), seg(2, 3), seg(3, 1)]);
        assert_eq!(fragments.len(), 1);
        assert_eq!(fragments[0].len(), 3);
    }
}
