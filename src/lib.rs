//! scoredyn: dynamic markings (p, mf, sfz, ...) for a music score model.
//!
//! Resolves dynamic tags against a fixed catalog, places marks against the
//! notes at their time position, handles property editing and dragging,
//! and reads/writes the persisted form from uncompressed (.mscx) and
//! compressed (.mscz) score files.
//!
//! # Example
//! ```
//! use scoredyn::{Dynamic, ElementId, OTHER};
//!
//! let mut d = Dynamic::new(ElementId(1));
//! d.set_dynamic_type("mf");
//! assert_eq!(d.velocity(), 80);
//!
//! d.set_dynamic_type("molto");
//! assert_eq!(d.dynamic_type(), OTHER);
//! assert_eq!(d.text(), "molto");
//! ```

mod constants;

pub mod catalog;
pub mod drag;
pub mod dynamic;
pub mod error;
pub mod layout;
pub mod model;
pub mod mscz;
pub mod property;
pub mod reader;
pub mod score;
pub mod text;
pub mod undo;
pub mod writer;

#[cfg(target_os = "android")]
pub mod android;

use std::path::Path;

pub use catalog::{CatalogEntry, DynamicCatalog, OTHER};
pub use drag::{EditData, KeyboardModifiers};
pub use dynamic::Dynamic;
pub use error::{DynamicError, Result};
pub use layout::{anchor_x_offset, legacy_user_offset};
pub use model::*;
pub use mscz::parse_mscz;
pub use property::{DynamicRange, PropertyId, PropertyValue, TextStyleType};
pub use reader::{parse_dynamics, Diagnostic, DynamicsDocument};
pub use score::ScoreContext;
pub use text::TextBase;
pub use undo::{UndoCommand, UndoStack};
pub use writer::{dynamic_to_xml, dynamics_to_xml};

/// Read the dynamics of a score file.
/// Automatically detects format based on file extension:
/// - `.mscx` or `.xml` → uncompressed score
/// - `.mscz` → compressed score (ZIP archive)
pub fn parse_file<P: AsRef<Path>>(path: P) -> std::result::Result<DynamicsDocument, String> {
    let path = path.as_ref();
    let data = std::fs::read(path)
        .map_err(|e| format!("Failed to read file '{}': {e}", path.display()))?;

    parse_bytes(&data, path.extension().and_then(|e| e.to_str()))
}

/// Read dynamics from raw bytes with an optional format hint.
/// If `extension` is None, tries to auto-detect the format.
pub fn parse_bytes(data: &[u8], extension: Option<&str>) -> std::result::Result<DynamicsDocument, String> {
    let result = match extension {
        Some("mscz") => parse_mscz(data),
        Some("mscx") | Some("xml") => {
            let xml = std::str::from_utf8(data)
                .map_err(|e| format!("Invalid UTF-8 in score file: {e}"))?;
            parse_dynamics(xml)
        }
        _ => match std::str::from_utf8(data) {
            Ok(xml) if xml.trim_start().starts_with('<') => parse_dynamics(xml),
            _ => parse_mscz(data),
        },
    };
    result.map_err(|e| e.to_string())
}

/// Convert read dynamics to a JSON string.
/// Useful for passing data across FFI boundaries.
pub fn dynamics_to_json(doc: &DynamicsDocument) -> std::result::Result<String, String> {
    serde_json::to_string_pretty(doc).map_err(|e| format!("JSON serialization error: {e}"))
}

/// The dynamics catalog as JSON, in persisted index order.
pub fn catalog_to_json() -> std::result::Result<String, String> {
    let entries: Vec<&CatalogEntry> = DynamicCatalog::standard().iter().collect();
    serde_json::to_string_pretty(&entries).map_err(|e| format!("JSON serialization error: {e}"))
}

/// Read score bytes and return the dynamics as JSON.
pub fn read_bytes_to_json(data: &[u8], extension: Option<&str>) -> std::result::Result<String, String> {
    let doc = parse_bytes(data, extension)?;
    dynamics_to_json(&doc)
}

// ═══════════════════════════════════════════════════════════════════════
// C FFI: for iOS (static library) and Android (JNI)
// ═══════════════════════════════════════════════════════════════════════

use std::ffi::{CStr, CString};
use std::os::raw::c_char;

/// Read score bytes and return their dynamics as a JSON C string.
/// The caller must free the returned string with `scoredyn_free_string`.
///
/// # Safety
/// `data` must point to `len` valid bytes. `extension` may be null.
#[no_mangle]
pub unsafe extern "C" fn scoredyn_read_dynamics_json(
    data: *const u8,
    len: usize,
    extension: *const c_char,
) -> *mut c_char {
    if data.is_null() || len == 0 {
        return std::ptr::null_mut();
    }
    let bytes = unsafe { std::slice::from_raw_parts(data, len) };
    let ext = if extension.is_null() {
        None
    } else {
        unsafe { CStr::from_ptr(extension) }.to_str().ok()
    };

    match read_bytes_to_json(bytes, ext) {
        Ok(json) => CString::new(json).unwrap_or_default().into_raw(),
        Err(_) => std::ptr::null_mut(),
    }
}

/// Effective velocity of a dynamic tag, or -1 for tags not in the catalog.
///
/// # Safety
/// `tag` must be a valid null-terminated UTF-8 C string.
#[no_mangle]
pub unsafe extern "C" fn scoredyn_tag_velocity(tag: *const c_char) -> i32 {
    if tag.is_null() {
        return -1;
    }
    let Ok(tag) = unsafe { CStr::from_ptr(tag) }.to_str() else {
        return -1;
    };
    let cat = DynamicCatalog::standard();
    cat.find_by_tag(tag)
        .and_then(|i| cat.entry_at(i))
        .map_or(-1, |e| e.velocity)
}

/// Free a string previously returned by scoredyn functions.
///
/// # Safety
/// `ptr` must be a string previously returned by a scoredyn function, or null.
#[no_mangle]
pub unsafe extern "C" fn scoredyn_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        unsafe {
            let _ = CString::from_raw(ptr);
        }
    }
}
