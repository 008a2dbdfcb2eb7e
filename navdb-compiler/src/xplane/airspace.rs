//! OpenAir airspace files from the `airspaces` directories.
//!
//! ```text
//! AC D
//! AN SEATTLE CLASS D
//! AL SFC
//! AH 2500 MSL
//! V X=47:26:59 N 122:18:34 W
//! DC 4.4
//! ```
//! A record starts at `AC` and ends at the next `AC` or at the end of the
//! file. Lines starting with `*` are comments.

use std::sync::LazyLock;

use geo::Point;
use navdata_schema::NavDbObjectType;
use regex::Regex;

use super::{invalid_line, XpLine, XpReader};
use crate::error::Result;
use crate::geometry::{endpoint, nm_to_meter};
use crate::writer::boundary::{arc_points, circle_points, write_boundary, BoundaryRow};
use crate::writer::WriteContext;

static COORDINATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*([\d:.]+)\s*([NS])\s*([\d:.]+)\s*([EW])\s*$").expect("OpenAir coordinate regex")
});
static ALTITUDE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(\d+(?:\.\d+)?)\s*(FT|F|M)?\s*(MSL|AMSL|AGL|AGND|GND|SFC)?$").expect("OpenAir altitude regex"));

/// `47:26:59` or `47:26.98` in degrees.
fn degrees(value: &str) -> Option<f64> {
    let mut parts = value.split(':');
    let deg: f64 = parts.next()?.parse().ok()?;
    let min: f64 = parts.next().map_or(Some(0.0), |m| m.parse().ok())?;
    let sec: f64 = parts.next().map_or(Some(0.0), |s| s.parse().ok())?;
    if parts.next().is_some() || min >= 60.0 || sec >= 60.0 {
        return None;
    }
    Some(deg + min / 60.0 + sec / 3600.0)
}

pub fn parse_coordinate(text: &str) -> Option<Point<f64>> {
    let caps = COORDINATE.captures(text)?;
    let mut lat = degrees(&caps[1])?;
    let mut lon = degrees(&caps[3])?;
    if caps[2].eq_ignore_ascii_case("S") {
        lat = -lat;
    }
    if caps[4].eq_ignore_ascii_case("W") {
        lon = -lon;
    }
    (lat.abs() <= 90.0 && lon.abs() <= 180.0).then(|| Point::new(lon, lat))
}

/// Feet and altitude type. `UNL` has no value.
pub fn parse_altitude(text: &str) -> Option<(Option<f64>, &'static str)> {
    let text = text.trim().to_ascii_uppercase();
    match text.as_str() {
        "SFC" | "GND" => return Some((Some(0.0), "AGL")),
        "UNL" | "UNLTD" | "UNLIM" | "UNLIMITED" => return Some((None, "UL")),
        _ => {}
    }
    if let Some(fl) = text.strip_prefix("FL") {
        return fl.trim().parse::<f64>().ok().map(|fl| (Some(fl * 100.0), "MSL"));
    }
    let caps = ALTITUDE.captures(&text)?;
    let mut value: f64 = caps[1].parse().ok()?;
    if caps.get(2).is_some_and(|u| u.as_str() == "M") {
        value *= 3.280_84;
    }
    let altitude_type = match caps.get(3).map(|r| r.as_str()) {
        Some("AGL" | "AGND" | "GND" | "SFC") => "AGL",
        _ => "MSL",
    };
    Some((Some(value), altitude_type))
}

fn boundary_type(class: &str) -> &'static str {
    match class.trim().to_ascii_uppercase().as_str() {
        "A" => "CA",
        "B" => "CB",
        "C" => "CC",
        "D" => "CD",
        "E" => "CE",
        "F" => "CF",
        "G" => "CG",
        "CTR" => "T",
        "R" => "R",
        "P" => "P",
        "Q" => "D",
        "W" => "W",
        _ => "NONE",
    }
}

#[derive(Debug)]
struct PendingAirspace {
    row: BoundaryRow,
    center: Option<Point<f64>>,
    clockwise: bool,
}

#[derive(Debug, Default)]
pub struct XpAirspaceReader {
    current: Option<PendingAirspace>,
}

impl XpAirspaceReader {
    fn write_current(&mut self, ctx: &mut WriteContext) -> Result<()> {
        if let Some(airspace) = self.current.take() {
            if airspace.row.points.len() < 2 {
                tracing::warn!("{}: airspace {:?} without geometry", ctx.filename, airspace.row.name);
                ctx.counters.errors += 1;
                return Ok(());
            }
            write_boundary(ctx, &airspace.row)?;
        }
        Ok(())
    }
}

impl XpReader for XpAirspaceReader {
    fn read(&mut self, ctx: &mut WriteContext, line: &XpLine) -> Result<()> {
        if !ctx.is_included(NavDbObjectType::Boundary) || line.at(0).starts_with('*') {
            return Ok(());
        }
        let code = line.at(0).to_ascii_uppercase();
        let text = line.rest(1);
        let value = text.split('*').next().unwrap_or_default().trim();

        if code == "AC" {
            self.write_current(ctx)?;
            self.current = Some(PendingAirspace {
                row: BoundaryRow { boundary_type: boundary_type(value).to_string(), ..BoundaryRow::default() },
                center: None,
                clockwise: true,
            });
            return Ok(());
        }
        let Some(airspace) = self.current.as_mut() else {
            return Ok(());
        };

        match code.as_str() {
            "AN" => airspace.row.name = Some(value.to_string()),
            "AL" | "AH" => match parse_altitude(value) {
                Some((altitude, altitude_type)) if code == "AL" => {
                    airspace.row.min_altitude = altitude;
                    airspace.row.min_altitude_type = Some(altitude_type.to_string());
                }
                Some((altitude, altitude_type)) => {
                    airspace.row.max_altitude = altitude;
                    airspace.row.max_altitude_type = Some(altitude_type.to_string());
                }
                None => invalid_line(ctx, line, "invalid airspace altitude"),
            },
            "AF" => airspace.row.com_frequency = value.parse::<f64>().ok().map(|mhz| (mhz * 1000.0).round() as u32),
            "AG" => airspace.row.com_name = Some(value.to_string()),
            "V" => {
                if let Some(center) = value.strip_prefix("X=") {
                    match parse_coordinate(center) {
                        Some(center) => airspace.center = Some(center),
                        None => invalid_line(ctx, line, "invalid airspace center"),
                    }
                } else if let Some(direction) = value.strip_prefix("D=") {
                    airspace.clockwise = direction.trim() != "-";
                }
            }
            "DP" => match parse_coordinate(value) {
                Some(point) => airspace.row.points.push(point),
                None => invalid_line(ctx, line, "invalid airspace point"),
            },
            "DA" => {
                let args: Vec<f64> = value.split(',').filter_map(|v| v.trim().parse().ok()).collect();
                match (airspace.center, args.as_slice()) {
                    (Some(center), [radius, start, end]) => {
                        let radius = nm_to_meter(*radius);
                        let from = endpoint(center, radius, *start);
                        let to = endpoint(center, radius, *end);
                        airspace.row.points.extend(arc_points(center, from, to, airspace.clockwise));
                    }
                    _ => invalid_line(ctx, line, "invalid airspace arc"),
                }
            }
            "DB" => {
                let ends: Vec<Option<Point<f64>>> = value.split(',').map(parse_coordinate).collect();
                match (airspace.center, ends.as_slice()) {
                    (Some(center), [Some(from), Some(to)]) => {
                        airspace.row.points.extend(arc_points(center, *from, *to, airspace.clockwise));
                    }
                    _ => invalid_line(ctx, line, "invalid airspace arc"),
                }
            }
            "DC" => match (airspace.center, value.parse::<f64>()) {
                (Some(center), Ok(radius)) if radius > 0.0 => {
                    airspace.row.points.extend(circle_points(center, nm_to_meter(radius)));
                }
                _ => invalid_line(ctx, line, "invalid airspace circle"),
            },
            // Labels, styles and airspace types not used
            _ => {}
        }
        Ok(())
    }

    fn finish(&mut self, ctx: &mut WriteContext) -> Result<()> {
        self.write_current(ctx)
    }

    fn reset(&mut self) {
        self.current = None;
    }
}
