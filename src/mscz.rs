//! Compressed score handler: reads dynamics from .mscz archives.
//!
//! An .mscz file is a ZIP archive containing:
//!   - META-INF/container.xml : declares the root score file path
//!   - <rootfile>.mscx        : the uncompressed score
//!   - (optional) other files : thumbnails, images, etc.

use std::io::{Cursor, Read};
use zip::ZipArchive;

use crate::error::{DynamicError, Result};
use crate::reader::{self, DynamicsDocument};

/// Read and parse dynamics from .mscz bytes.
pub fn parse_mscz(data: &[u8]) -> Result<DynamicsDocument> {
    let xml = extract_score_from_mscz(data)?;
    reader::parse_dynamics(&xml)
}

/// Extract the root score XML from .mscz bytes.
pub fn extract_score_from_mscz(data: &[u8]) -> Result<String> {
    let mut archive = ZipArchive::new(Cursor::new(data))?;

    let root_file_path = read_container_xml(&mut archive)?;

    let mut root_file = archive.by_name(&root_file_path)?;
    let mut xml = String::new();
    root_file.read_to_string(&mut xml)?;
    Ok(xml)
}

/// Find the root score path: from META-INF/container.xml if present,
/// else the first .mscx entry outside META-INF.
fn read_container_xml(archive: &mut ZipArchive<Cursor<&[u8]>>) -> Result<String> {
    let container_xml = match archive.by_name("META-INF/container.xml") {
        Ok(mut f) => {
            let mut xml = String::new();
            f.read_to_string(&mut xml)?;
            Some(xml)
        }
        Err(_) => None,
    };

    if let Some(xml) = container_xml {
        let doc = roxmltree::Document::parse(&xml)?;
        return doc
            .descendants()
            .filter(|n| n.tag_name().name() == "rootfile")
            .find_map(|n| n.attribute("full-path"))
            .map(str::to_string)
            .ok_or_else(|| DynamicError::Archive("no rootfile in container.xml".to_string()));
    }

    let names: Vec<String> = archive.file_names().map(String::from).collect();
    names
        .iter()
        .find(|n| !n.starts_with("META-INF/") && n.ends_with(".mscx"))
        .cloned()
        .ok_or_else(|| DynamicError::Archive(format!("no score file in archive. Files: {names:?}")))
}
