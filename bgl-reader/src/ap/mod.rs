//! Airport records and their subrecords.

pub mod airport;
pub mod approach;
pub mod facilities;
pub mod parking;
pub mod runway;
pub mod sidstar;

pub use airport::{Airport, AirportFlags};
pub use approach::{Approach, ApproachLeg, FixRef, Transition};
pub use facilities::{Com, Helipad, Start};
pub use parking::Parking;
pub use runway::{Runway, RunwayEnd};
pub use sidstar::SidStar;
