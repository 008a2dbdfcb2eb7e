//! Edges between radio navaids for VOR and NDB routing.
//!
//! Every node of `route_node_radio` is connected to its nearest neighbours
//! inside the navaid range. Edges are directed since ranges differ.

use std::collections::HashMap;

use geo::Point;
use rusqlite::{params, Connection};

use crate::error::Result;
use crate::geometry::{distance_meter, nm_to_meter};
use crate::progress::ProgressHandler;

/// Used for navaids without range.
const DEFAULT_RANGE_NM: f64 = 50.0;
const MIN_RANGE_NM: f64 = 25.0;
const MAX_RANGE_NM: f64 = 200.0;
const MAX_EDGES_PER_NODE: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq)]
struct RadioNode {
    id: i64,
    node_type: i64,
    range_m: f64,
    position: Point<f64>,
}

fn cell(position: Point<f64>) -> (i32, i32) {
    (position.x().floor() as i32, position.y().floor() as i32)
}

/// One degree grid over the nodes.
#[derive(Debug, Default)]
struct NodeGrid {
    cells: HashMap<(i32, i32), Vec<usize>>,
}

impl NodeGrid {
    fn new(nodes: &[RadioNode]) -> Self {
        let mut grid = Self::default();
        for (i, node) in nodes.iter().enumerate() {
            grid.cells.entry(cell(node.position)).or_default().push(i);
        }
        grid
    }

    /// Node indexes in all cells touching the square around `center`.
    fn around(&self, center: Point<f64>, radius_m: f64) -> impl Iterator<Item = usize> + '_ {
        let lat_deg = (radius_m / 111_000.0).ceil() as i32;
        let cos_lat = center.y().to_radians().cos().max(0.01);
        let lon_deg = ((radius_m / (111_000.0 * cos_lat)).ceil() as i32).min(180);
        let (cx, cy) = cell(center);
        (cy - lat_deg..=cy + lat_deg)
            .flat_map(move |y| (cx - lon_deg..=cx + lon_deg).map(move |x| (x, y)))
            .filter_map(|(x, y)| {
                // Wrap around the anti-meridian
                let x = (x + 180).rem_euclid(360) - 180;
                self.cells.get(&(x, y))
            })
            .flatten()
            .copied()
    }
}

pub struct RouteEdgeWriter<'a> {
    conn: &'a Connection,
    /// Progress reports spread over the run.
    steps: usize,
}

impl<'a> RouteEdgeWriter<'a> {
    pub fn new(conn: &'a Connection, steps: usize) -> Self {
        Self { conn, steps }
    }

    fn nodes(&self) -> Result<Vec<RadioNode>> {
        let mut stmt = self.conn.prepare("SELECT node_id, type, range, lonx, laty FROM route_node_radio ORDER BY node_id")?;
        let nodes = stmt
            .query_map([], |r| {
                let range: Option<f64> = r.get(2)?;
                let range_nm = match range {
                    Some(range) if range > 0.0 => range.clamp(MIN_RANGE_NM, MAX_RANGE_NM),
                    _ => DEFAULT_RANGE_NM,
                };
                Ok(RadioNode {
                    id: r.get(0)?,
                    node_type: r.get(1)?,
                    range_m: nm_to_meter(range_nm),
                    position: Point::new(r.get(3)?, r.get(4)?),
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(nodes)
    }

    /// Writes all edges. Returns `true` when aborted.
    pub fn run(&self, progress: &mut ProgressHandler) -> Result<bool> {
        self.conn.execute("DELETE FROM route_edge_radio", [])?;
        let nodes = self.nodes()?;
        let grid = NodeGrid::new(&nodes);
        let report_every = (nodes.len() / self.steps.max(1)).max(1);

        let mut stmt = self.conn.prepare_cached(
            "INSERT INTO route_edge_radio (from_node_id, from_node_type, to_node_id, to_node_type, distance)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )?;
        let mut num_edges = 0;
        for (i, node) in nodes.iter().enumerate() {
            let mut neighbours: Vec<(f64, &RadioNode)> = grid
                .around(node.position, node.range_m)
                .map(|j| &nodes[j])
                .filter(|other| other.id != node.id)
                .map(|other| (distance_meter(node.position, other.position), other))
                .filter(|(distance, _)| *distance <= node.range_m)
                .collect();
            neighbours.sort_by(|a, b| a.0.total_cmp(&b.0));
            neighbours.truncate(MAX_EDGES_PER_NODE);

            for (distance, other) in neighbours {
                stmt.execute(params![node.id, node.node_type, other.id, other.node_type, distance])?;
                num_edges += 1;
            }
            if (i + 1) % report_every == 0 && progress.report_other("Creating route edges for VOR and NDB") {
                return Ok(true);
            }
        }
        tracing::info!("{num_edges} radio navaid route edges for {} nodes", nodes.len());
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::testutil::{count, test_context};

    #[test]
    fn neighbours_inside_range_are_connected() {
        let (conn, _) = test_context();
        conn.execute_batch(
            "INSERT INTO route_node_radio (node_id, nav_id, type, range, lonx, laty) VALUES
               (1, 10, 1, 100, -122.0, 47.0),
               (2, 11, 4, 25,  -121.5, 47.0),
               (3, 12, 2, 100, -120.0, 47.0),
               (4, 13, 1, 130, 179.9, 0.0),
               (5, 14, 1, 130, -179.9, 0.0);",
        )
        .unwrap();

        let aborted = RouteEdgeWriter::new(&conn, 1).run(&mut ProgressHandler::silent()).unwrap();
        assert!(!aborted);

        let edges: Vec<(i64, i64)> = conn
            .prepare("SELECT from_node_id, to_node_id FROM route_edge_radio ORDER BY from_node_id, to_node_id")
            .unwrap()
            .query_map([], |r| Ok((r.get(0)?, r.get(1)?)))
            .unwrap()
            .map(|r| r.unwrap())
            .collect();
        // 2 has 25 NM range and cannot reach 3 at 61 NM. 4 and 5 are across the anti-meridian.
        assert_eq!(edges, [(1, 2), (1, 3), (2, 1), (3, 1), (3, 2), (4, 5), (5, 4)]);
        assert_eq!(count(&conn, "route_edge_radio"), 7);
    }
}
