use crate::converter;
use crate::stream::BinaryStream;

/// Decoded position. Altitude is in meters, `0` where the record has none.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BglPosition {
    pub lon: f64,
    pub lat: f64,
    pub altitude: f64,
}

impl BglPosition {
    pub fn new(lon: f64, lat: f64, altitude: f64) -> Self {
        Self { lon, lat, altitude }
    }

    /// `lon: u32, lat: u32` and, if `with_altitude`, `alt: i32` millimeters.
    pub fn read(bs: &mut BinaryStream, with_altitude: bool) -> Self {
        let lon = converter::lon_x(bs.read_u32());
        let lat = converter::lat_y(bs.read_u32());
        let altitude = if with_altitude { converter::altitude_meter(bs.read_i32()) } else { 0.0 };
        Self { lon, lat, altitude }
    }

    pub fn is_valid(&self) -> bool {
        (-180.0..=180.0).contains(&self.lon)
            && (-90.0..=90.0).contains(&self.lat)
            && !(self.lon == 0.0 && self.lat == 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_packed_position_with_altitude() {
        let mut v = Vec::new();
        v.extend_from_slice(&converter::lon_to_raw(-122.3).to_le_bytes());
        v.extend_from_slice(&converter::lat_to_raw(47.45).to_le_bytes());
        v.extend_from_slice(&132_500i32.to_le_bytes());
        let mut bs = BinaryStream::new(v);
        let pos = BglPosition::read(&mut bs, true);
        assert!((pos.lon + 122.3).abs() < 1e-6);
        assert!((pos.lat - 47.45).abs() < 1e-6);
        assert_eq!(pos.altitude, 132.5);
        assert!(pos.is_valid());
        assert!(!BglPosition::default().is_valid());
    }
}
