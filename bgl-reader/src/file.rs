//! Reads one BGL file end to end.
//!
//! `Unopened → HeaderRead → SectionsRead → SubsectionsRead → BoundariesRead →
//! RecordsRead → Closed`. A file that is too small or has an invalid header
//! goes straight to `Closed` with no content.

use std::collections::HashMap;
use std::path::Path;

use navdata_schema::{NavDbObjectType, SceneryArea};

use crate::ap::{Airport, AirportFlags};
use crate::boundary::Boundary;
use crate::header::{Header, HEADER_SIZE};
use crate::layout::StructureType;
use crate::namelist::Namelist;
use crate::nav::ilsvor::{self, IlsVorType};
use crate::nav::{Ils, Marker, Ndb, Tacan, Vor, Waypoint};
use crate::record::{rec, Record};
use crate::section::{Section, SectionType};
use crate::stream::BinaryStream;
use crate::subsection::Subsection;
use crate::{BglError, ReadContext, DUPLICATE_AIRPORT_TOLERANCE};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FileState {
    #[default]
    Unopened,
    HeaderRead,
    SectionsRead,
    SubsectionsRead,
    BoundariesRead,
    RecordsRead,
    Closed,
}

/// Result of dispatching one record of a subsection.
#[derive(Debug)]
pub enum DecodedRecord {
    Airport(Box<Airport>),
    Namelist(Namelist),
    Vor(Vor),
    Ils(Ils),
    Ndb(Ndb),
    Marker(Marker),
    Waypoint(Waypoint),
    Tacan(Tacan),
    /// Excluded by options, not supported or not understood.
    Skipped,
}

#[derive(Debug, Default)]
pub struct BglFile {
    pub filename: String,
    pub size: usize,
    pub header: Header,
    pub sections: Vec<Section>,
    pub subsections: Vec<Subsection>,

    pub airports: Vec<Airport>,
    pub namelists: Vec<Namelist>,
    pub vors: Vec<Vor>,
    pub ils: Vec<Ils>,
    pub ndbs: Vec<Ndb>,
    pub markers: Vec<Marker>,
    pub waypoints: Vec<Waypoint>,
    pub tacans: Vec<Tacan>,
    pub boundaries: Vec<Boundary>,

    state: FileState,
    airport_idents: HashMap<String, usize>,
}

impl BglFile {
    pub fn read_file(ctx: &ReadContext, path: &Path, area: &SceneryArea) -> Result<Self, BglError> {
        let filename = path.display().to_string();
        let mut bs = BinaryStream::open(path).map_err(|source| BglError::Io { path: filename.clone(), source })?;
        Self::read_stream(ctx, &mut bs, filename, area)
    }

    pub fn read_stream(
        ctx: &ReadContext,
        bs: &mut BinaryStream,
        filename: String,
        area: &SceneryArea,
    ) -> Result<Self, BglError> {
        let mut file = BglFile { filename, size: bs.size(), ..BglFile::default() };

        if file.size < HEADER_SIZE as usize {
            tracing::warn!("File is too small: {} bytes, {}", file.size, file.filename);
            file.state = FileState::Closed;
            return Ok(file);
        }

        file.header = Header::read(bs);
        file.state = FileState::HeaderRead;
        if !file.header.is_valid() {
            tracing::debug!("Skipping {}: no valid BGL header", file.filename);
            file.state = FileState::Closed;
            return Ok(file);
        }
        if ctx.verbose() {
            tracing::debug!("{:?}", file.header);
        }

        file.read_sections(bs);

        if ctx.options.is_included(NavDbObjectType::Boundary) && !area.msfs_navigraph_navdata {
            file.read_boundary_records(ctx, bs);
        }
        file.state = FileState::BoundariesRead;

        file.read_records(ctx, bs, area)?;
        file.state = FileState::Closed;
        Ok(file)
    }

    pub fn state(&self) -> FileState {
        self.state
    }

    pub fn is_valid(&self) -> bool {
        self.header.is_valid()
    }

    pub fn has_content(&self) -> bool {
        !(self.airports.is_empty()
            && self.namelists.is_empty()
            && self.vors.is_empty()
            && self.ils.is_empty()
            && self.ndbs.is_empty()
            && self.markers.is_empty()
            && self.waypoints.is_empty()
            && self.tacans.is_empty()
            && self.boundaries.is_empty())
    }

    /// Number of airports with this ident read from the file so far.
    pub fn airport_ident_count(&self, ident: &str) -> usize {
        self.airport_idents.get(ident).copied().unwrap_or(0)
    }

    pub fn num_tracked_airport_idents(&self) -> usize {
        self.airport_idents.len()
    }

    // ── Sections ──────────────────────────────────────────────────────────────

    fn read_sections(&mut self, bs: &mut BinaryStream) {
        for _ in 0..self.header.num_sections {
            let section = Section::read(bs);
            tracing::trace!("Section {} subsections {}", section.section_type, section.num_subsections);
            self.sections.push(section);
        }
        self.state = FileState::SectionsRead;

        for section in &self.sections {
            // Boundary and geopol sections are read by the boundary scan
            if !section.has_plain_subsections() {
                continue;
            }
            bs.seek(section.first_subsection_offset as usize);
            for _ in 0..section.num_subsections {
                self.subsections.push(Subsection::read(bs, section));
            }
        }
        self.state = FileState::SubsectionsRead;
    }

    // ── Boundaries ────────────────────────────────────────────────────────────

    /// The subsection index of a boundary section holds 16 byte entries
    /// `(offset1, _, offset2, tree_flag)`. Boundary records start at the
    /// smallest offset of all flagged entries and run to the end of the file.
    fn read_boundary_records(&mut self, ctx: &ReadContext, bs: &mut BinaryStream) {
        let boundary_sections: Vec<Section> = self
            .sections
            .iter()
            .filter(|s| s.section_type == SectionType::Boundary)
            .copied()
            .collect();

        for section in boundary_sections {
            let start = section.first_subsection_offset as usize;
            let end = start + section.total_subsection_size as usize;
            bs.seek(start);

            let mut min_offset = u32::MAX;
            while bs.tell() < end && !bs.is_eof() {
                let offset1 = bs.read_u32();
                bs.skip(4);
                let offset2 = bs.read_u32();
                let tree_flag = bs.read_u32();
                if tree_flag > 0 {
                    min_offset = min_offset.min(offset1).min(offset2);
                }
            }

            if min_offset == u32::MAX {
                tracing::warn!("Boundary section without tree entries in {}", self.filename);
                continue;
            }
            bs.seek(min_offset as usize);
            self.handle_boundaries(ctx, bs);
        }
    }

    fn handle_boundaries(&mut self, ctx: &ReadContext, bs: &mut BinaryStream) {
        let mut num_records = 0;
        while bs.tell() < bs.size() {
            let record = Record::peek(bs);
            match record.id {
                rec::BOUNDARY => {
                    self.boundaries.push(Boundary::read(ctx, bs));
                    num_records += 1;
                }
                rec::GEOPOL => {}
                other => tracing::warn!(
                    "while reading boundaries: unexpected record 0x{other:x} offset {}",
                    record.start
                ),
            }
            record.seek_to_end(bs);
        }
        if ctx.verbose() {
            tracing::debug!("Num boundary records {num_records}");
        }
    }

    // ── Records ───────────────────────────────────────────────────────────────

    fn read_records(&mut self, ctx: &ReadContext, bs: &mut BinaryStream, area: &SceneryArea) -> Result<(), BglError> {
        let flags = AirportFlags {
            msfs_navigraph_navdata: area.msfs_navigraph_navdata,
            msfs_dummy: area.navdata,
        };

        let subsections = std::mem::take(&mut self.subsections);
        for subsection in &subsections {
            if ctx.verbose() {
                tracing::debug!(
                    "Records of 0x{:x} type {}",
                    subsection.first_record_offset,
                    subsection.parent
                );
            }
            bs.seek(subsection.first_record_offset as usize);

            for _ in 0..subsection.record_count() {
                let record = Record::peek(bs);
                let decoded = self.decode_record(ctx, bs, subsection.parent, flags);
                self.store(decoded)?;

                if (record.size as usize) < bs.size() {
                    record.seek_to_end(bs);
                } else {
                    tracing::warn!(
                        "Invalid record size {} offset {} type 0x{:x}",
                        record.size,
                        bs.tell(),
                        record.id
                    );
                }
            }
        }
        self.subsections = subsections;
        self.state = FileState::RecordsRead;
        Ok(())
    }

    fn decode_record(
        &self,
        ctx: &ReadContext,
        bs: &mut BinaryStream,
        section_type: SectionType,
        flags: AirportFlags,
    ) -> DecodedRecord {
        let options = ctx.options;
        let navigraph = flags.msfs_navigraph_navdata;

        match section_type {
            SectionType::Airport => {
                if options.is_included(NavDbObjectType::Airport) && ctx.structure != StructureType::Msfs2024 {
                    return DecodedRecord::Airport(Box::new(Airport::read(ctx, bs, flags)));
                }
            }
            SectionType::AirportAlt => {
                tracing::warn!("Found alternate airport ID in {}", self.filename);
                if options.is_included(NavDbObjectType::Airport) {
                    return DecodedRecord::Airport(Box::new(Airport::read(ctx, bs, AirportFlags::default())));
                }
            }
            SectionType::NameList => return DecodedRecord::Namelist(Namelist::read(bs)),
            SectionType::P3dTacan => return DecodedRecord::Tacan(Tacan::read(ctx, bs)),
            SectionType::IlsVor if !navigraph => {
                let nav_type = ilsvor::peek_type(bs);
                match nav_type {
                    t if t.is_vor() => {
                        if options.is_included(NavDbObjectType::Vor) {
                            return DecodedRecord::Vor(Vor::read(ctx, bs));
                        }
                    }
                    IlsVorType::Ils => {
                        if options.is_included(NavDbObjectType::Ils) {
                            return DecodedRecord::Ils(Ils::read(ctx, bs));
                        }
                    }
                    other => {
                        if !ctx.structure.is_msfs() {
                            tracing::warn!("Unknown ILS/VOR type {other:?}");
                        }
                    }
                }
            }
            SectionType::Ndb if !navigraph => {
                if options.is_included(NavDbObjectType::Ndb) {
                    return DecodedRecord::Ndb(Ndb::read(ctx, bs));
                }
            }
            SectionType::Marker if !navigraph => {
                if options.is_included(NavDbObjectType::Marker) {
                    return DecodedRecord::Marker(Marker::read(bs));
                }
            }
            SectionType::Waypoint if !navigraph => {
                if options.is_included(NavDbObjectType::Waypoint) {
                    return DecodedRecord::Waypoint(Waypoint::read(ctx, bs));
                }
            }
            // Not of interest here or not understood yet
            SectionType::IlsVor
            | SectionType::Ndb
            | SectionType::Marker
            | SectionType::Waypoint
            | SectionType::MsfsDeleteAirportNav
            | SectionType::MsfsDeleteNav
            | SectionType::Boundary
            | SectionType::Geopol
            | SectionType::None
            | SectionType::Copyright
            | SectionType::Guid
            | SectionType::SceneryObject
            | SectionType::VorIlsIcaoIndex
            | SectionType::NdbIcaoIndex
            | SectionType::WaypointIcaoIndex
            | SectionType::ModelData
            | SectionType::AirportSummary
            | SectionType::Exclusion
            | SectionType::Timezone
            | SectionType::Terrain(_)
            | SectionType::FakeTypes
            | SectionType::IcaoRunway => {}
            SectionType::Unknown(t) => {
                tracing::warn!("Unknown section type at offset {}: 0x{t:x}", bs.tell());
            }
        }
        DecodedRecord::Skipped
    }

    fn store(&mut self, decoded: DecodedRecord) -> Result<(), BglError> {
        match decoded {
            DecodedRecord::Airport(airport) => {
                let count = self.airport_idents.entry(airport.ident.clone()).or_insert(0);
                *count += 1;
                if *count > 1 {
                    tracing::warn!("Duplicate airport ident {} in {}", airport.ident, self.filename);
                }
                if *count > DUPLICATE_AIRPORT_TOLERANCE {
                    return Err(BglError::DuplicateAirport {
                        ident: airport.ident.clone(),
                        path: self.filename.clone(),
                        tolerance: DUPLICATE_AIRPORT_TOLERANCE,
                    });
                }
                self.airports.push(*airport);
            }
            DecodedRecord::Namelist(n) => self.namelists.push(n),
            DecodedRecord::Vor(v) => self.vors.push(v),
            DecodedRecord::Ils(i) => self.ils.push(i),
            DecodedRecord::Ndb(n) => self.ndbs.push(n),
            DecodedRecord::Marker(m) => self.markers.push(m),
            DecodedRecord::Waypoint(w) => self.waypoints.push(w),
            DecodedRecord::Tacan(t) => self.tacans.push(t),
            DecodedRecord::Skipped => {}
        }
        Ok(())
    }
}
