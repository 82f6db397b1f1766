//! Catalog of canonical dynamic markings.
//!
//! The position of an entry in the table is its persisted subtype index,
//! so the table is append-only: never reorder or remove entries, or
//! documents saved by earlier versions will read back as the wrong mark.
//! Glyphs are SMuFL code points (Bravura).
//!
//! Velocities follow the usual MIDI mapping, see
//! <http://en.wikipedia.org/wiki/File:Dynamic's_Note_Velocity.svg>.

use serde::Serialize;

/// Index of the sentinel entry used for free-text dynamics.
pub const OTHER: usize = 0;

/// One canonical dynamic marking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    /// Persisted name, e.g. "mf"
    pub tag: &'static str,
    /// Display text (empty for the sentinel)
    pub glyph: &'static str,
    /// Implied MIDI velocity (0-127), or -1 for none
    pub velocity: i32,
    /// Transient emphasis rather than a sustained level
    pub accent: bool,
}

/// Ordered, read-only table of canonical dynamics.
#[derive(Debug)]
pub struct DynamicCatalog {
    entries: &'static [CatalogEntry],
}

const fn entry(velocity: i32, accent: bool, tag: &'static str, glyph: &'static str) -> CatalogEntry {
    CatalogEntry { tag, glyph, velocity, accent }
}

static ENTRIES: [CatalogEntry; 30] = [
    // dynamics
    entry(-1, true, "other-dynamics", ""),
    entry(1, false, "pppppp", "\u{e4e7}"),
    entry(5, false, "ppppp", "\u{e4e8}"),
    entry(10, false, "pppp", "\u{e4e9}"),
    entry(16, false, "ppp", "\u{e4ea}"),
    entry(33, false, "pp", "\u{e4eb}"),
    entry(49, false, "p", "\u{e4e0}"),
    entry(64, false, "mp", "\u{e4ec}"),
    entry(80, false, "mf", "\u{e4ed}"),
    entry(96, false, "f", "\u{e4e2}"),
    entry(112, false, "ff", "\u{e4ef}"),
    entry(126, false, "fff", "\u{e4f0}"),
    entry(127, false, "ffff", "\u{e4f1}"),
    entry(127, false, "fffff", "\u{e4f2}"),
    entry(127, false, "ffffff", "\u{e4f3}"),
    // accents
    entry(0, true, "fp", "\u{e4f4}"),
    entry(0, true, "sf", "\u{e4f6}"),
    entry(0, true, "sfz", "\u{e4f9}"),
    entry(0, true, "sff", "\u{e4f6}\u{e4e2}"),
    entry(0, true, "sffz", "\u{e4fa}"),
    entry(0, true, "sfp", "\u{e4f7}"),
    entry(0, true, "sfpp", "\u{e4f8}"),
    entry(0, true, "rfz", "\u{e4fc}"),
    entry(0, true, "rf", "\u{e4fb}"),
    entry(0, true, "fz", "\u{e4f5}"),
    entry(0, true, "m", "\u{e4e1}"),
    entry(0, true, "r", "\u{e4e3}"),
    entry(0, true, "s", "\u{e4e4}"),
    entry(0, true, "z", "\u{e4e5}"),
    entry(0, true, "n", "\u{e4e6}"),
];

static STANDARD: DynamicCatalog = DynamicCatalog { entries: &ENTRIES };

impl DynamicCatalog {
    /// The process-wide catalog.
    pub fn standard() -> &'static DynamicCatalog {
        &STANDARD
    }

    /// Entry at a subtype index.
    pub fn entry_at(&self, index: usize) -> Option<&CatalogEntry> {
        self.entries.get(index)
    }

    /// Index of the first entry whose tag matches exactly (case-sensitive).
    pub fn find_by_tag(&self, tag: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.tag == tag)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.iter()
    }

    /// The sentinel entry for free-text dynamics.
    pub fn other(&self) -> &CatalogEntry {
        &self.entries[OTHER]
    }
}
