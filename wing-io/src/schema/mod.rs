//! Name↔id schema table
//!
//! Node ids are opaque 32-bit handles assigned by the console; the mapping
//! from full path strings (`/ch/1/fdr`) to ids is stable per firmware
//! version and shipped as generated data in [`table`]. The checked-in
//! table is the empty placeholder; regenerate it against a live console
//! with the schema dump tooling and drop the output in its place.
//!
//! Lookups also accept a path that is just a decimal id (`"1234"`), so
//! tools can address nodes the table does not know about.

use lazy_static::lazy_static;
use std::collections::HashMap;

mod table;

/// Bidirectional name↔id lookup over a fixed entry set
pub struct SchemaTable {
    by_name: HashMap<&'static str, u32>,
    by_id: HashMap<u32, &'static str>,
}

impl SchemaTable {
    /// Build both directions from generated `(path, id)` entries.
    ///
    /// The generated set is bijective; if an id ever appears twice the
    /// first path keeps the reverse mapping.
    pub fn from_entries(entries: &'static [(&'static str, u32)]) -> Self {
        let mut by_name = HashMap::with_capacity(entries.len());
        let mut by_id = HashMap::with_capacity(entries.len());
        for &(name, id) in entries {
            by_name.insert(name, id);
            by_id.entry(id).or_insert(name);
        }
        SchemaTable { by_name, by_id }
    }

    /// Resolve a full path (or decimal id string) to a node id
    pub fn name_to_id(&self, path: &str) -> Option<u32> {
        if let Ok(id) = path.parse::<u32>() {
            return Some(id);
        }
        self.by_name.get(path).copied()
    }

    /// Resolve a node id back to its full path
    pub fn id_to_name(&self, id: u32) -> Option<&'static str> {
        self.by_id.get(&id).copied()
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

lazy_static! {
    /// Process-wide table over the generated entries
    static ref TABLE: SchemaTable = SchemaTable::from_entries(table::ENTRIES);
}

/// Resolve a full path against the shipped table
pub fn name_to_id(path: &str) -> Option<u32> {
    TABLE.name_to_id(path)
}

/// Resolve a node id against the shipped table
pub fn id_to_name(id: u32) -> Option<&'static str> {
    TABLE.id_to_name(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENTRIES: &[(&str, u32)] = &[
        ("/ch/1/fdr", 0x0001_0001),
        ("/ch/1/mute", 0x0001_0002),
        ("/ch/2/fdr", 0x0002_0001),
        ("/main/1/fdr", 0x00A0_0001),
    ];

    #[test]
    fn forward_and_reverse_agree() {
        let table = SchemaTable::from_entries(ENTRIES);
        assert_eq!(table.len(), ENTRIES.len());
        for &(name, id) in ENTRIES {
            assert_eq!(table.name_to_id(name), Some(id));
            assert_eq!(table.id_to_name(id), Some(name));
        }
    }

    #[test]
    fn unknown_lookups_miss() {
        let table = SchemaTable::from_entries(ENTRIES);
        assert_eq!(table.name_to_id("/ch/3/fdr"), None);
        assert_eq!(table.id_to_name(0xDEAD_BEEF), None);
    }

    #[test]
    fn numeric_path_is_a_raw_id() {
        let table = SchemaTable::from_entries(ENTRIES);
        assert_eq!(table.name_to_id("42"), Some(42));
    }

    #[test]
    fn shipped_table_resolves_numeric_ids() {
        // the placeholder table is empty but the numeric fallback works
        assert_eq!(name_to_id("1234"), Some(1234));
    }
}
