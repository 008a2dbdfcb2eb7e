//! Airspace boundaries. Arcs and circles are flattened into a line string
//! stored as JSON `[[lon, lat], ...]`.

use bgl_reader::ap::facilities::com_type_to_str;
use bgl_reader::boundary::{altitude_type_to_str, Boundary, BoundaryPoint};
use geo::Point;
use rusqlite::params;

use super::ids::Table;
use super::WriteContext;
use crate::error::Result;
use crate::geometry::{bearing, distance_meter, endpoint, meter_to_feet, Rect};

/// Degrees between interpolated arc points.
const ARC_STEP_DEG: f64 = 10.0;

#[derive(Debug, Clone, Default)]
pub struct BoundaryRow {
    pub boundary_type: String,
    pub name: Option<String>,
    pub com_type: Option<String>,
    pub com_frequency: Option<u32>,
    pub com_name: Option<String>,
    pub min_altitude_type: Option<String>,
    pub max_altitude_type: Option<String>,
    /// Feet.
    pub min_altitude: Option<f64>,
    pub max_altitude: Option<f64>,
    pub points: Vec<Point<f64>>,
}

pub fn write_boundary(ctx: &mut WriteContext, b: &BoundaryRow) -> Result<Option<i64>> {
    let Some(rect) = Rect::from_points(b.points.iter().copied()) else {
        tracing::warn!("Boundary {:?} without points in {}", b.name, ctx.filename);
        return Ok(None);
    };
    let geometry = serde_json::to_string(&b.points.iter().map(|p| [p.x(), p.y()]).collect::<Vec<_>>())?;

    let id = ctx.ids.next(Table::Boundary);
    ctx.conn
        .prepare_cached(
            "INSERT INTO boundary
             (boundary_id, file_id, type, name, com_type, com_frequency, com_name,
              min_altitude_type, max_altitude_type, min_altitude, max_altitude,
              max_lonx, max_laty, min_lonx, min_laty, geometry)
             VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13,?14,?15,?16)",
        )?
        .execute(params![
            id,
            ctx.file_id,
            b.boundary_type,
            b.name,
            b.com_type,
            b.com_frequency,
            b.com_name,
            b.min_altitude_type,
            b.max_altitude_type,
            b.min_altitude.map(|a| a.round() as i64),
            b.max_altitude.map(|a| a.round() as i64),
            rect.right,
            rect.top,
            rect.left,
            rect.bottom,
            geometry,
        ])?;
    ctx.counters.boundaries += 1;
    Ok(Some(id))
}

/// Points from `from` to `to` around `center`, both ends included.
pub fn arc_points(center: Point<f64>, from: Point<f64>, to: Point<f64>, clockwise: bool) -> Vec<Point<f64>> {
    let radius = distance_meter(center, from);
    let start = bearing(center, from);
    let end = bearing(center, to);
    let sweep = if clockwise { (end - start).rem_euclid(360.0) } else { (start - end).rem_euclid(360.0) };
    let steps = (sweep / ARC_STEP_DEG).ceil().max(1.0) as usize;

    let mut points = Vec::with_capacity(steps + 1);
    points.push(from);
    for i in 1..steps {
        let offset = sweep * i as f64 / steps as f64;
        let hdg = if clockwise { start + offset } else { start - offset };
        points.push(endpoint(center, radius, hdg));
    }
    points.push(to);
    points
}

pub fn circle_points(center: Point<f64>, radius_m: f64) -> Vec<Point<f64>> {
    let steps = (360.0 / ARC_STEP_DEG) as usize;
    (0..=steps).map(|i| endpoint(center, radius_m, i as f64 * ARC_STEP_DEG)).collect()
}

fn flatten(points: &[BoundaryPoint]) -> Vec<Point<f64>> {
    let mut line: Vec<Point<f64>> = Vec::new();
    let mut origin = None;
    for p in points {
        match *p {
            BoundaryPoint::Start(pos) | BoundaryPoint::Line(pos) => line.push(Point::new(pos.lon, pos.lat)),
            BoundaryPoint::Origin(pos) => origin = Some(Point::new(pos.lon, pos.lat)),
            BoundaryPoint::ArcClockwise(pos) | BoundaryPoint::ArcCounterClockwise(pos) => {
                let to = Point::new(pos.lon, pos.lat);
                match (origin, line.last().copied()) {
                    (Some(center), Some(from)) => {
                        let clockwise = matches!(p, BoundaryPoint::ArcClockwise(_));
                        line.extend(arc_points(center, from, to, clockwise).into_iter().skip(1));
                    }
                    _ => line.push(to),
                }
            }
            BoundaryPoint::Circle(radius) => match origin {
                Some(center) => line.extend(circle_points(center, f64::from(radius))),
                None => tracing::warn!("Boundary circle without origin"),
            },
        }
    }
    line
}

fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}

pub fn bgl_boundary_row(b: &Boundary) -> BoundaryRow {
    BoundaryRow {
        boundary_type: b.type_str().to_string(),
        name: non_empty(&b.name),
        com_type: b.has_com().then(|| com_type_to_str(b.com_type).to_string()),
        com_frequency: b.has_com().then_some(b.com_frequency),
        com_name: non_empty(&b.com_name),
        min_altitude_type: Some(altitude_type_to_str(b.min_altitude_type).to_string()),
        max_altitude_type: Some(altitude_type_to_str(b.max_altitude_type).to_string()),
        min_altitude: Some(meter_to_feet(b.min_altitude)),
        max_altitude: Some(meter_to_feet(b.max_altitude)),
        points: flatten(&b.points),
    }
}

pub fn write_bgl_boundary(ctx: &mut WriteContext, b: &Boundary) -> Result<()> {
    write_boundary(ctx, &bgl_boundary_row(b))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::testutil::{count, test_context};
    use bgl_reader::BglPosition;

    #[test]
    fn quarter_arc_is_interpolated() {
        let center = Point::new(10.0, 50.0);
        let north = endpoint(center, 10_000.0, 0.0);
        let east = endpoint(center, 10_000.0, 90.0);
        let cw = arc_points(center, north, east, true);
        assert_eq!(cw.len(), 10);
        for p in &cw {
            assert!((distance_meter(center, *p) - 10_000.0).abs() < 1.0);
        }
        // counter clockwise goes the long way round
        assert!(arc_points(center, north, east, false).len() > 25);
    }

    #[test]
    fn circle_boundary_is_written_with_geometry() {
        let (conn, options) = test_context();
        let mut ctx = WriteContext::new(&conn, &options);
        let b = Boundary {
            boundary_type: 1,
            min_altitude_type: 1,
            max_altitude_type: 1,
            max_altitude: 3048.0,
            name: "SEATTLE CLASS C".into(),
            points: vec![
                BoundaryPoint::Origin(BglPosition::new(-122.3, 47.45, 0.0)),
                BoundaryPoint::Circle(18_520.0),
            ],
            ..Boundary::default()
        };
        write_bgl_boundary(&mut ctx, &b).unwrap();
        assert_eq!(count(&conn, "boundary"), 1);

        let (max_alt, geometry): (i64, String) = conn
            .query_row("SELECT max_altitude, geometry FROM boundary", [], |r| Ok((r.get(0)?, r.get(1)?)))
            .unwrap();
        assert_eq!(max_alt, 10_000);
        let points: Vec<[f64; 2]> = serde_json::from_str(&geometry).unwrap();
        assert_eq!(points.len(), 37);
    }

    #[test]
    fn boundary_without_points_is_skipped() {
        let (conn, options) = test_context();
        let mut ctx = WriteContext::new(&conn, &options);
        write_bgl_boundary(&mut ctx, &Boundary::default()).unwrap();
        assert_eq!(count(&conn, "boundary"), 0);
    }
}
