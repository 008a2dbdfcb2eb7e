//! Airports and runway ends written so far, for cross references from
//! navaids, procedures and MSA records.

use std::collections::HashMap;

use geo::Point;

use crate::fsutil;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexEntry {
    pub id: i64,
    pub position: Point<f64>,
}

#[derive(Debug, Default)]
pub struct AirportIndex {
    airports: HashMap<String, IndexEntry>,
    runway_ends: HashMap<(String, String), IndexEntry>,
    runway_names: HashMap<String, Vec<String>>,
}

impl AirportIndex {
    /// Returns `false` when the ident is already known. The first airport wins.
    pub fn add_airport(&mut self, ident: &str, id: i64, position: Point<f64>) -> bool {
        if self.airports.contains_key(ident) {
            return false;
        }
        self.airports.insert(ident.to_string(), IndexEntry { id, position });
        true
    }

    /// Replaces an airport and forgets its runway ends.
    pub fn replace_airport(&mut self, ident: &str, id: i64, position: Point<f64>) {
        self.remove_airport(ident);
        self.airports.insert(ident.to_string(), IndexEntry { id, position });
    }

    pub fn remove_airport(&mut self, ident: &str) {
        self.airports.remove(ident);
        if let Some(names) = self.runway_names.remove(ident) {
            for name in names {
                self.runway_ends.remove(&(ident.to_string(), name));
            }
        }
    }

    pub fn airport(&self, ident: &str) -> Option<IndexEntry> {
        self.airports.get(ident).copied()
    }

    pub fn airport_id(&self, ident: &str) -> Option<i64> {
        self.airport(ident).map(|e| e.id)
    }

    pub fn add_runway_end(&mut self, airport_ident: &str, name: &str, id: i64, position: Point<f64>) {
        let name = fsutil::normalize_runway(name);
        self.runway_names.entry(airport_ident.to_string()).or_default().push(name.clone());
        self.runway_ends.insert((airport_ident.to_string(), name), IndexEntry { id, position });
    }

    /// Exact match after normalizing the name.
    pub fn runway_end(&self, airport_ident: &str, name: &str) -> Option<IndexEntry> {
        self.runway_ends
            .get(&(airport_ident.to_string(), fsutil::normalize_runway(name)))
            .copied()
    }

    /// Falls back to the neighbour runway numbers.
    pub fn runway_end_best_fit(&self, airport_ident: &str, name: &str) -> Option<IndexEntry> {
        self.runway_end(airport_ident, name).or_else(|| {
            let names = self.runway_names.get(airport_ident)?;
            let best = fsutil::runway_best_fit(name, names)?;
            self.runway_end(airport_ident, &best)
        })
    }

    pub fn runway_names(&self, airport_ident: &str) -> &[String] {
        self.runway_names.get(airport_ident).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn num_airports(&self) -> usize {
        self.airports.len()
    }
}
