//! Navigation database compiler.
//!
//! Reads FSX, P3D and MSFS BGL scenery or X-Plane data files and writes a
//! SQLite database. [`NavDatabase`] runs the whole pipeline, the
//! [`writer`] and [`xplane`] modules hold the per entity writers.

pub mod airway_resolver;
pub mod error;
pub mod fsutil;
pub mod geometry;
pub mod navdatabase;
pub mod progress;
pub mod report;
pub mod route_edge;
pub mod scenery;
pub mod scripts;
pub mod writer;
pub mod xplane;

pub use error::{CompilerError, Result};
pub use navdatabase::{is_base_path_valid, is_scenery_config_valid, NavDatabase};
pub use progress::{Counters, Outcome, ProgressHandler, ProgressReport, Step};
