//! Unit conversions and great circle helpers on top of `geo`.

use geo::{Bearing, Destination, Distance, Geodesic, Haversine, Point};

pub const METER_TO_FEET: f64 = 3.280_84;
pub const NM_TO_METER: f64 = 1852.0;

/// Length of the drawn ILS feather.
pub const DEFAULT_FEATHER_LEN_NM: f64 = 9.0;

/// Localizer width used when the source has none.
pub const DEFAULT_LOC_WIDTH: f64 = 4.0;

pub fn meter_to_feet(m: f64) -> f64 {
    m * METER_TO_FEET
}

pub fn feet_to_meter(ft: f64) -> f64 {
    ft / METER_TO_FEET
}

pub fn meter_to_nm(m: f64) -> f64 {
    m / NM_TO_METER
}

pub fn nm_to_meter(nm: f64) -> f64 {
    nm * NM_TO_METER
}

/// Course in `[0, 360)`.
pub fn normalize_course(course: f64) -> f64 {
    let c = course.rem_euclid(360.0);
    if c >= 360.0 { 0.0 } else { c }
}

pub fn opposed_course(course: f64) -> f64 {
    normalize_course(course + 180.0)
}

pub fn is_valid_position(lon: f64, lat: f64) -> bool {
    lon.is_finite() && lat.is_finite() && (-180.0..=180.0).contains(&lon) && (-90.0..=90.0).contains(&lat)
}

/// Point at `distance_m` along `bearing_deg` (true) from `from`.
pub fn endpoint(from: Point<f64>, distance_m: f64, bearing_deg: f64) -> Point<f64> {
    Geodesic.destination(from, normalize_course(bearing_deg), distance_m)
}

pub fn distance_meter(a: Point<f64>, b: Point<f64>) -> f64 {
    Geodesic.distance(a, b)
}

/// Faster spherical distance for the route network.
pub fn distance_nm_fast(a: Point<f64>, b: Point<f64>) -> f64 {
    meter_to_nm(Haversine.distance(a, b))
}

pub fn bearing(a: Point<f64>, b: Point<f64>) -> f64 {
    normalize_course(Geodesic.bearing(a, b))
}

// ── Rect ─────────────────────────────────────────────────────────────────────

/// Lon/lat bounding rectangle. Does not handle the anti-meridian.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Rect {
    pub fn from_point(p: Point<f64>) -> Self {
        Self { left: p.x(), top: p.y(), right: p.x(), bottom: p.y() }
    }

    pub fn extend(&mut self, p: Point<f64>) {
        self.left = self.left.min(p.x());
        self.right = self.right.max(p.x());
        self.top = self.top.max(p.y());
        self.bottom = self.bottom.min(p.y());
    }

    pub fn from_points<I: IntoIterator<Item = Point<f64>>>(points: I) -> Option<Self> {
        let mut iter = points.into_iter();
        let mut rect = Self::from_point(iter.next()?);
        for p in iter {
            rect.extend(p);
        }
        Some(rect)
    }

    /// Square around a center, `radius_m` in each direction.
    pub fn around(center: Point<f64>, radius_m: f64) -> Self {
        let mut rect = Self::from_point(center);
        for bearing in [0.0, 90.0, 180.0, 270.0] {
            rect.extend(endpoint(center, radius_m, bearing));
        }
        rect
    }
}

// ── ILS feather ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IlsFeather {
    pub p1: Point<f64>,
    pub pmid: Point<f64>,
    pub p2: Point<f64>,
}

/// Feather triangle pointing away from the runway. `heading_true` is the
/// localizer course, `width` the beam width in degrees.
pub fn calculate_ils_geometry(pos: Point<f64>, heading_true: f64, width: f64, feather_len_nm: f64) -> IlsFeather {
    let hdg = opposed_course(heading_true);
    let len = nm_to_meter(feather_len_nm);
    let width = if width.is_finite() && width >= 0.1 { width } else { DEFAULT_LOC_WIDTH };

    let p1 = endpoint(pos, len, hdg - width / 2.0);
    let p2 = endpoint(pos, len, hdg + width / 2.0);
    let pmid = endpoint(pos, len - distance_meter(p1, p2) / 2.0, hdg);
    IlsFeather { p1, pmid, p2 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn course_normalization() {
        assert_eq!(normalize_course(370.0), 10.0);
        assert_eq!(normalize_course(-10.0), 350.0);
        assert_eq!(opposed_course(350.0), 170.0);
    }

    #[test]
    fn feather_points_away_from_heading() {
        let pos = Point::new(-122.31, 47.46);
        // Localizer course north, feather extends south
        let f = calculate_ils_geometry(pos, 0.0, 5.0, DEFAULT_FEATHER_LEN_NM);
        assert!(f.p1.y() < pos.y() && f.p2.y() < pos.y() && f.pmid.y() < pos.y());
        let len = meter_to_nm(distance_meter(pos, f.p1));
        assert!((len - 9.0).abs() < 0.01, "{len}");
        // Midpoint sits between the two ends
        assert!(f.pmid.y() > f.p1.y());
        assert!((f.p1.x() - pos.x()).signum() != (f.p2.x() - pos.x()).signum());
    }

    #[test]
    fn invalid_width_falls_back() {
        let pos = Point::new(8.55, 47.46);
        assert_eq!(
            calculate_ils_geometry(pos, 140.0, 0.0, 9.0),
            calculate_ils_geometry(pos, 140.0, DEFAULT_LOC_WIDTH, 9.0)
        );
    }

    #[test]
    fn rect_from_points() {
        let r = Rect::from_points([Point::new(1.0, 2.0), Point::new(-1.0, 5.0)]).unwrap();
        assert_eq!(r, Rect { left: -1.0, top: 5.0, right: 1.0, bottom: 2.0 });
        assert!(Rect::from_points(Vec::new()).is_none());
    }
}
