//! Reader for BGL scenery files.
//!
//! A file is a header, an array of section descriptors, subsection tables
//! and the record data they point to. [`file::BglFile`] walks that hierarchy
//! and hands every supported record to the decoders in [`ap`], [`nav`],
//! [`boundary`] and [`namelist`].

pub mod ap;
pub mod boundary;
pub mod converter;
pub mod file;
pub mod header;
pub mod layout;
pub mod namelist;
pub mod nav;
pub mod position;
pub mod record;
pub mod section;
pub mod stream;
pub mod subsection;

#[cfg(any(test, feature = "test-util"))]
pub mod testutil;

pub use file::{BglFile, FileState};
pub use layout::{StructureLayout, StructureType};
pub use position::BglPosition;
pub use stream::{BinaryStream, TextEncoding};

use navdata_schema::NavDatabaseOptions;

/// An airport ident may occur this many times in one file before the file is
/// considered malformed.
pub const DUPLICATE_AIRPORT_TOLERANCE: usize = 3;

#[derive(Debug, thiserror::Error)]
pub enum BglError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("airport {ident} occurs more than {tolerance} times in {path}")]
    DuplicateAirport { ident: String, path: String, tolerance: usize },
}

/// Options and structure type shared by all decoders of one file.
#[derive(Debug, Clone, Copy)]
pub struct ReadContext<'a> {
    pub options: &'a NavDatabaseOptions,
    pub structure: StructureType,
}

impl<'a> ReadContext<'a> {
    pub fn new(options: &'a NavDatabaseOptions, structure: StructureType) -> Self {
        Self { options, structure }
    }

    pub fn with_structure(self, structure: StructureType) -> Self {
        Self { structure, ..self }
    }

    pub fn layout(&self) -> &'static StructureLayout {
        self.structure.layout()
    }

    pub fn encoding(&self) -> TextEncoding {
        self.layout().text_encoding
    }

    pub fn verbose(&self) -> bool {
        self.options.verbose
    }
}
