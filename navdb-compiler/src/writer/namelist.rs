use std::collections::HashMap;

use bgl_reader::namelist::NamelistEntry;
use bgl_reader::BglFile;

/// Airport ident to city, state and country names of one BGL file.
#[derive(Debug, Default)]
pub struct NamelistLookup<'a> {
    entries: HashMap<&'a str, &'a NamelistEntry>,
}

impl<'a> NamelistLookup<'a> {
    pub fn from_file(file: &'a BglFile) -> Self {
        let entries = file
            .namelists
            .iter()
            .flat_map(|nl| nl.entries.iter())
            .map(|e| (e.airport_ident.as_str(), e))
            .collect();
        Self { entries }
    }

    pub fn get(&self, ident: &str) -> Option<&'a NamelistEntry> {
        self.entries.get(ident).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bgl_reader::namelist::Namelist;

    #[test]
    fn lookup_by_ident() {
        let mut file = BglFile::default();
        file.namelists.push(Namelist {
            entries: vec![NamelistEntry {
                airport_ident: "KSEA".into(),
                city_name: "Seattle".into(),
                ..NamelistEntry::default()
            }],
        });
        let names = NamelistLookup::from_file(&file);
        assert_eq!(names.get("KSEA").map(|e| e.city_name.as_str()), Some("Seattle"));
        assert!(names.get("KPDX").is_none());
    }
}
