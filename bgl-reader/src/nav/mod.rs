//! Navaid records.

pub mod ils;
pub mod ilsvor;
pub mod marker;
pub mod ndb;
pub mod tacan;
pub mod vor;
pub mod waypoint;

pub use ils::{Glideslope, Ils, Localizer};
pub use ilsvor::{Dme, IlsVorType, NavHeader};
pub use marker::Marker;
pub use ndb::Ndb;
pub use tacan::Tacan;
pub use vor::Vor;
pub use waypoint::{AirwaySegment, RouteNeighbor, Waypoint};
