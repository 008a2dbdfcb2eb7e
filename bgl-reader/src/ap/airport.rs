//! Airport record with all of its subrecords.
//!
//! ```text
//! runways u8 | coms u8 | starts u8 | approaches u8 | aprons u8 (0x80 delete) | helipads u8
//! position        : lon u32, lat u32, alt i32
//! tower position  : lon u32, lat u32, alt i32
//! magvar          : f32
//! ident           : u32 packed
//! region          : u32 packed, no shift
//! fuel flags      : u32
//! tail            : layout.airport_header_tail bytes
//! subrecords
//! ```

use crate::ap::approach::Approach;
use crate::ap::facilities::{Com, Helipad, Start};
use crate::ap::parking::Parking;
use crate::ap::runway::Runway;
use crate::ap::sidstar::SidStar;
use crate::converter;
use crate::layout::StructureType;
use crate::nav::waypoint::Waypoint;
use crate::position::BglPosition;
use crate::record::{rec, Record, RECORD_HEADER_LEN};
use crate::stream::BinaryStream;
use crate::ReadContext;

/// How the scenery area provides this airport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AirportFlags {
    /// MSFS navdata package: only procedures are valid, facilities are dummies.
    pub msfs_navigraph_navdata: bool,
    /// MSFS navdata dummy airport without facilities.
    pub msfs_dummy: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Airport {
    pub ident: String,
    pub region: String,
    pub name: String,
    pub structure: Option<StructureType>,
    pub flags: AirportFlags,

    pub position: BglPosition,
    pub tower_position: Option<BglPosition>,
    pub magvar: f32,
    pub fuel_flags: u32,
    /// Set when the airport carries a delete record or the apron count has
    /// the delete bit.
    pub is_delete: bool,
    pub delete_flags: u16,

    pub runways: Vec<Runway>,
    pub parkings: Vec<Parking>,
    pub coms: Vec<Com>,
    pub starts: Vec<Start>,
    pub helipads: Vec<Helipad>,
    pub approaches: Vec<Approach>,
    pub sid_stars: Vec<SidStar>,
    pub waypoints: Vec<Waypoint>,

    pub num_aprons: usize,
    pub num_taxi_paths: usize,
    pub num_jetways: usize,
    pub has_tower_object: bool,
}

impl Airport {
    pub fn read(ctx: &ReadContext, bs: &mut BinaryStream, flags: AirportFlags) -> Self {
        let record = Record::read(bs);
        let ctx = if record.id == rec::AIRPORT_FS9 {
            ctx.with_structure(StructureType::Fs9)
        } else {
            *ctx
        };

        let num_runways = bs.read_u8();
        let num_coms = bs.read_u8();
        let num_starts = bs.read_u8();
        let num_approaches = bs.read_u8();
        let aprons = bs.read_u8();
        let num_helipads = bs.read_u8();

        let position = BglPosition::read(bs, true);
        let tower = BglPosition::read(bs, true);
        let mut airport = Airport {
            structure: Some(ctx.structure),
            flags,
            position,
            tower_position: tower.is_valid().then_some(tower),
            magvar: converter::adjust_magvar(bs.read_f32()),
            ident: converter::int_to_icao(bs.read_u32(), false),
            region: converter::int_to_icao(bs.read_u32(), true),
            fuel_flags: bs.read_u32(),
            is_delete: aprons & 0x80 != 0,
            ..Airport::default()
        };
        bs.skip(ctx.layout().airport_header_tail);

        if ctx.verbose() {
            tracing::debug!(
                "Airport {} runways {num_runways} coms {num_coms} starts {num_starts} approaches {num_approaches} helipads {num_helipads}",
                airport.ident
            );
        }

        let cursor = record.subrecords(bs);
        while let Some(sub) = cursor.next(bs) {
            airport.read_subrecord(&ctx, sub, bs);
            sub.seek_to_end(bs);
        }
        record.seek_to_end(bs);
        airport
    }

    fn read_subrecord(&mut self, ctx: &ReadContext, sub: Record, bs: &mut BinaryStream) {
        match sub.id {
            rec::NAME => {
                bs.skip(RECORD_HEADER_LEN);
                self.name = bs.read_string(sub.size as usize - RECORD_HEADER_LEN, ctx.encoding());
            }
            rec::RUNWAY | rec::RUNWAY_MSFS => self.runways.push(Runway::read(ctx, bs)),
            rec::PARKING | rec::PARKING_MSFS => {
                bs.skip(RECORD_HEADER_LEN);
                let count = bs.read_u16();
                for _ in 0..count {
                    self.parkings.push(Parking::read(ctx, bs));
                }
            }
            rec::COM => self.coms.push(Com::read(bs, ctx.encoding())),
            rec::START => self.starts.push(Start::read(bs)),
            rec::HELIPAD => self.helipads.push(Helipad::read(bs)),
            rec::APPROACH => self.approaches.push(Approach::read(ctx, bs)),
            rec::SID | rec::STAR => self.sid_stars.push(SidStar::read(ctx, bs)),
            rec::WAYPOINT => self.waypoints.push(Waypoint::read(ctx, bs)),
            rec::DELETE_AIRPORT => {
                bs.skip(RECORD_HEADER_LEN);
                self.is_delete = true;
                self.delete_flags = bs.read_u16();
            }
            rec::APRON | rec::APRON_MSFS => self.num_aprons += 1,
            rec::TAXI_PATH => {
                bs.skip(RECORD_HEADER_LEN);
                self.num_taxi_paths += usize::from(bs.read_u16());
            }
            rec::JETWAY => self.num_jetways += 1,
            rec::TOWER_OBJECT => self.has_tower_object = true,
            other => {
                if ctx.verbose() {
                    tracing::debug!("Unhandled airport subrecord 0x{other:04x} at offset {}", sub.start);
                }
            }
        }
    }

    /// MSFS navdata airports only contribute procedures.
    pub fn is_dummy(&self) -> bool {
        self.flags.msfs_dummy || self.flags.msfs_navigraph_navdata
    }

    pub fn has_tower(&self) -> bool {
        self.tower_position.is_some() || self.has_tower_object
    }

    pub fn num_parkings_gate(&self) -> usize {
        self.parkings.iter().filter(|p| p.is_gate()).count()
    }

    pub fn num_parkings_ramp_ga(&self) -> usize {
        self.parkings.iter().filter(|p| p.is_ramp_ga()).count()
    }

    pub fn largest_parking_gate(&self) -> Option<&'static str> {
        ["GH", "GM", "GS"]
            .into_iter()
            .find(|t| self.parkings.iter().any(|p| p.type_str() == *t))
    }

    pub fn longest_runway(&self) -> Option<&Runway> {
        self.runways.iter().max_by(|a, b| a.length.total_cmp(&b.length))
    }
}
