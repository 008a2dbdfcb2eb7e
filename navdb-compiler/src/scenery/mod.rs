//! Scenery library enumeration for FSX, P3D and MSFS.
//!
//! [`cfg::SceneryCfg`] reads `scenery.cfg`, [`addon`] adds P3D `add-on.xml`
//! packages and [`resolver`] lists the BGL files of a single area.

pub mod addon;
pub mod cfg;
pub mod resolver;

use std::path::PathBuf;

use thiserror::Error;

pub use addon::{AddOnComponent, AddOnPackage};
pub use cfg::SceneryCfg;

#[derive(Debug, Error)]
pub enum SceneryError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed scenery configuration {path}: {source}")]
    Ini {
        path: PathBuf,
        #[source]
        source: ini::ParseError,
    },

    #[error("malformed add-on package {path}: {source}")]
    Xml {
        path: PathBuf,
        #[source]
        source: quick_xml::Error,
    },

    #[error("no scenery areas in {0}")]
    NoAreas(PathBuf),

    #[error("scenery directory {0} does not exist")]
    MissingDirectory(PathBuf),
}

impl SceneryError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }
}

/// Converts a Windows style path from a configuration file.
pub(crate) fn native_path(path: &str) -> PathBuf {
    PathBuf::from(path.trim().replace('\\', "/"))
}
