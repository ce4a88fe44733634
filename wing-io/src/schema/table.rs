//! Generated name↔id entries
//!
//! Placeholder table. Regenerate against a live console (walk the tree
//! with definition requests and record `(full path, id)` per node), then
//! replace this file with the generated output for the firmware in use.

pub(super) static ENTRIES: &[(&str, u32)] = &[];
