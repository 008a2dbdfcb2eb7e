/// Tables with ids assigned by the compiler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    SceneryArea,
    BglFile,
    Airport,
    Runway,
    RunwayEnd,
    Parking,
    Start,
    Com,
    Helipad,
    Approach,
    Transition,
    ApproachLeg,
    TransitionLeg,
    Vor,
    Tacan,
    Ndb,
    Marker,
    Ils,
    Waypoint,
    AirwayPoint,
    Airway,
    TmpAirway,
    Boundary,
    MoraGrid,
    AirportMsa,
}

const NUM_TABLES: usize = Table::AirportMsa as usize + 1;

/// Monotonic ids per table, starting at 1.
#[derive(Debug, Clone)]
pub struct IdAllocator {
    last: [i64; NUM_TABLES],
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self { last: [0; NUM_TABLES] }
    }
}

impl IdAllocator {
    pub fn next(&mut self, table: Table) -> i64 {
        let slot = &mut self.last[table as usize];
        *slot += 1;
        *slot
    }

    pub fn last(&self, table: Table) -> i64 {
        self.last[table as usize]
    }

    /// Continue after rows inserted without the allocator.
    pub fn skip_to(&mut self, table: Table, id: i64) {
        let slot = &mut self.last[table as usize];
        *slot = (*slot).max(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_per_table() {
        let mut ids = IdAllocator::default();
        assert_eq!(ids.next(Table::Airport), 1);
        assert_eq!(ids.next(Table::Airport), 2);
        assert_eq!(ids.next(Table::Runway), 1);
        ids.skip_to(Table::Waypoint, 10);
        ids.skip_to(Table::Waypoint, 3);
        assert_eq!(ids.next(Table::Waypoint), 11);
        assert_eq!(ids.last(Table::Airport), 2);
    }
}
