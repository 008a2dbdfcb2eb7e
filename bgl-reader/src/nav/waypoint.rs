//! Enroute and terminal waypoints with their airway route entries.
//!
//! ```text
//! type u8 | routes u8 | lon u32 | lat u32 | magvar f32 | ident u32 | region/airport u32
//! route (33 bytes):
//!   type u8 | name 8 bytes
//!   next:     fix u32 (type low 5 bits) | region u32 | min altitude f32
//!   previous: fix u32 (type low 5 bits) | region u32 | min altitude f32
//! ```

use crate::converter;
use crate::position::BglPosition;
use crate::record::Record;
use crate::stream::{BinaryStream, TextEncoding};
use crate::ReadContext;

pub fn waypoint_type_to_str(waypoint_type: u8) -> &'static str {
    match waypoint_type {
        1 => "WN",
        2 => "WU",
        3 => "V",
        4 => "N",
        5 => "OA",
        6 => "IAF",
        7 => "FAF",
        _ => {
            tracing::warn!("Invalid waypoint type {waypoint_type}");
            "INVALID"
        }
    }
}

pub fn route_type_to_str(route_type: u8) -> &'static str {
    match route_type {
        1 => "V",
        2 => "J",
        3 => "B",
        _ => {
            tracing::warn!("Invalid route type {route_type}");
            "INVALID"
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct RouteNeighbor {
    pub fix_type: u32,
    pub ident: String,
    pub region: String,
    /// Meters.
    pub min_altitude: f32,
}

impl RouteNeighbor {
    fn read(bs: &mut BinaryStream) -> Option<Self> {
        let packed = bs.read_u32();
        let region = converter::int_to_icao(bs.read_u32() & 0x7ff, true);
        let min_altitude = bs.read_f32();
        (packed != 0).then(|| Self {
            fix_type: packed & 0x1f,
            ident: converter::int_to_icao(packed, false),
            region,
            min_altitude,
        })
    }
}

/// One airway passing through a waypoint.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AirwaySegment {
    pub route_type: u8,
    pub name: String,
    pub next: Option<RouteNeighbor>,
    pub previous: Option<RouteNeighbor>,
}

impl AirwaySegment {
    pub fn type_str(&self) -> &'static str {
        route_type_to_str(self.route_type)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Waypoint {
    pub waypoint_type: u8,
    pub position: BglPosition,
    pub magvar: f32,
    pub ident: String,
    pub region: String,
    pub airport: String,
    pub routes: Vec<AirwaySegment>,
}

impl Waypoint {
    pub fn read(ctx: &ReadContext, bs: &mut BinaryStream) -> Self {
        let record = Record::read(bs);
        let waypoint_type = bs.read_u8();
        let num_routes = bs.read_u8();
        let position = BglPosition::read(bs, false);
        let magvar = converter::adjust_magvar(bs.read_f32());
        let ident = converter::int_to_icao(bs.read_u32(), false);
        let (region, airport) = converter::region_and_airport(bs.read_u32());

        let mut routes = Vec::with_capacity(usize::from(num_routes));
        for _ in 0..num_routes {
            let route_type = bs.read_u8();
            let name = bs.read_string(8, TextEncoding::Latin1);
            let next = RouteNeighbor::read(bs);
            let previous = RouteNeighbor::read(bs);
            routes.push(AirwaySegment { route_type, name, next, previous });
        }
        if ctx.verbose() && !routes.is_empty() {
            tracing::debug!("Waypoint {ident} {region} with {} airways", routes.len());
        }
        record.seek_to_end(bs);

        Self { waypoint_type, position, magvar, ident, region, airport, routes }
    }

    pub fn type_str(&self) -> &'static str {
        waypoint_type_to_str(self.waypoint_type)
    }

    pub fn num_victor_airways(&self) -> usize {
        self.routes.iter().filter(|r| matches!(r.route_type, 1 | 3)).count()
    }

    pub fn num_jet_airways(&self) -> usize {
        self.routes.iter().filter(|r| matches!(r.route_type, 2 | 3)).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::StructureType;
    use crate::testutil::WaypointBuilder;
    use navdata_schema::NavDatabaseOptions;

    #[test]
    fn waypoint_with_routes() {
        let data = WaypointBuilder::new(1, "BANGR", "K1", -122.0, 47.5)
            .route(2, "J5", Some(("SEA", "K1")), None)
            .route(1, "V4", Some(("ELN", "K1")), Some(("PAE", "K1")))
            .build();
        let options = NavDatabaseOptions::default();
        let mut bs = BinaryStream::new(data);
        let wp = Waypoint::read(&ReadContext::new(&options, StructureType::Fsx), &mut bs);
        assert_eq!(wp.ident, "BANGR");
        assert_eq!(wp.type_str(), "WN");
        assert_eq!(wp.routes.len(), 2);
        assert_eq!(wp.routes[0].name, "J5");
        assert_eq!(wp.routes[0].next.as_ref().unwrap().ident, "SEA");
        assert!(wp.routes[0].previous.is_none());
        assert_eq!(wp.routes[1].previous.as_ref().unwrap().ident, "PAE");
        assert_eq!(wp.num_jet_airways(), 1);
        assert_eq!(wp.num_victor_airways(), 1);
    }
}
