//! Shared layout constants (distances in spatium units unless noted).

// ── Score geometry ──────────────────────────────────────────────────
pub(crate) const DEFAULT_SPATIUM: f64 = 10.0; // staff space in page units
pub(crate) const NOTEHEAD_WIDTH_SP: f64 = 1.3; // black notehead width
pub(crate) const STAFF_HEIGHT_SP: f64 = 4.0; // 5 lines, 4 spaces
pub(crate) const VOICES: usize = 4; // voice lanes per staff

// ── Anchor centering ────────────────────────────────────────────────
pub(crate) const STEM_DOWN_CENTER: f64 = 0.25; // stem + optical correction
pub(crate) const NOTEHEAD_CENTER: f64 = 0.5;
pub(crate) const REST_CENTER: f64 = 0.5;

// ── Legacy documents ────────────────────────────────────────────────
// Files older than this used wider text bounding boxes.
pub(crate) const LEGACY_BBOX_VERSION: u32 = 118;
pub(crate) const LEGACY_BBOX_SHIFT_SP: f64 = 0.6;

// ── Text ────────────────────────────────────────────────────────────
pub(crate) const GLYPH_ADVANCE_SP: f64 = 1.6; // per-character advance
pub(crate) const TEXT_HEIGHT_SP: f64 = 2.0;

// ── Persisted format ────────────────────────────────────────────────
pub(crate) const CURRENT_MSC_VERSION: u32 = 200;
