//! Reader for persisted dynamics: converts `<Dynamic>` elements of a
//! score file into [`Dynamic`]s.

use roxmltree::{Document, Node};
use serde::Serialize;

use crate::constants::CURRENT_MSC_VERSION;
use crate::dynamic::Dynamic;
use crate::error::Result;
use crate::model::{ElementId, Point};
use crate::property::{DynamicRange, TextStyleType};
use crate::text::TextBase;

/// Non-fatal problems met while reading.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Diagnostic {
    /// A child element this reader does not understand (skipped)
    UnknownElement { name: String, line: u32 },
    /// A known element whose content could not be parsed (skipped)
    InvalidValue { name: String, value: String, line: u32 },
}

/// All dynamics found in one document.
#[derive(Debug, Clone, Serialize)]
pub struct DynamicsDocument {
    /// Format version from the root element, e.g. 114 for "1.14"
    pub msc_version: u32,
    pub dynamics: Vec<Dynamic>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Parse a score document and read every `<Dynamic>` element in it.
/// Element ids are assigned in document order starting at 1.
pub fn parse_dynamics(xml: &str) -> Result<DynamicsDocument> {
    let doc = Document::parse(xml)?;
    let root = doc.root_element();

    let msc_version = root
        .attribute("version")
        .and_then(parse_version)
        .unwrap_or(CURRENT_MSC_VERSION);

    let mut diagnostics = Vec::new();
    let dynamics = root
        .descendants()
        .filter(|n| n.is_element() && n.tag_name().name() == "Dynamic")
        .zip(1..)
        .map(|(node, id)| read_dynamic(&node, ElementId(id), &mut diagnostics))
        .collect();

    Ok(DynamicsDocument { msc_version, dynamics, diagnostics })
}

/// Read one `<Dynamic>` element.
pub fn read_dynamic(node: &Node, id: ElementId, diagnostics: &mut Vec<Diagnostic>) -> Dynamic {
    let mut d = Dynamic::new(id);

    for child in node.children().filter(|n| n.is_element()) {
        match child.tag_name().name() {
            "subtype" => d.set_dynamic_type(child.text().unwrap_or("").trim()),
            "velocity" => {
                if let Some(v) = parse_int(&child, diagnostics) {
                    d.set_velocity(v);
                }
            }
            "dynType" => {
                if let Some(v) = parse_int(&child, diagnostics) {
                    match DynamicRange::try_from_int(v) {
                        Some(range) => d.set_dyn_range(range),
                        None => invalid_value(&child, &v.to_string(), diagnostics),
                    }
                }
            }
            _ => {
                if !read_text_property(&child, d.text_base_mut()) {
                    let line = line_of(&child);
                    let name = child.tag_name().name().to_string();
                    log::warn!("Dynamic: unknown element <{name}> at line {line}");
                    diagnostics.push(Diagnostic::UnknownElement { name, line });
                }
            }
        }
    }

    // Older files stored other styles; dynamics always use their own.
    d.text_base_mut().set_text_style(TextStyleType::Dynamics);
    d
}

// ─── Styled-text properties ──────────────────────────────────────────

/// Read a property owned by the text base. Returns false if `node` is
/// not one of them.
fn read_text_property(node: &Node, text: &mut TextBase) -> bool {
    match node.tag_name().name() {
        "text" => {
            // Formatting runs are flattened; any run means local formatting.
            let has_runs = node.children().any(|n| n.is_element());
            let content: String = node
                .descendants()
                .filter(|n| n.is_text())
                .filter_map(|n| n.text())
                .collect();
            text.set_text(content);
            if has_runs {
                text.set_styled(false);
            }
        }
        "offset" => text.set_user_off(parse_point(node)),
        "pos" => {
            let p = parse_point(node);
            text.set_read_pos(if p.is_null() { None } else { Some(p) });
        }
        "visible" => text.set_visible(node.text().map(str::trim) != Some("0")),
        // Superseded by the fixed dynamics style.
        "style" => {}
        _ => return false,
    }
    true
}

// ─── Helpers ─────────────────────────────────────────────────────────

/// "1.14" → 114, "2.06" → 206.
fn parse_version(s: &str) -> Option<u32> {
    let (major, minor) = s.trim().split_once('.')?;
    let major: u32 = major.parse().ok()?;
    let minor: u32 = minor.parse().ok()?;
    Some(major * 100 + minor)
}

fn parse_int(node: &Node, diagnostics: &mut Vec<Diagnostic>) -> Option<i32> {
    let raw = node.text().unwrap_or("").trim();
    match raw.parse::<i32>() {
        Ok(v) => Some(v),
        Err(_) => {
            invalid_value(node, raw, diagnostics);
            None
        }
    }
}

fn invalid_value(node: &Node, raw: &str, diagnostics: &mut Vec<Diagnostic>) {
    let line = line_of(node);
    let name = node.tag_name().name().to_string();
    log::warn!("Dynamic: invalid <{name}> value {raw:?} at line {line}");
    diagnostics.push(Diagnostic::InvalidValue { name, value: raw.to_string(), line });
}

fn parse_point(node: &Node) -> Point {
    let coord = |a: &str| {
        node.attribute(a)
            .and_then(|s| s.trim().parse::<f64>().ok())
            .unwrap_or(0.0)
    };
    Point::new(coord("x"), coord("y"))
}

fn line_of(node: &Node) -> u32 {
    node.document().text_pos_at(node.range().start).row
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::OTHER;
    use pretty_assertions::assert_eq;

    #[test]
    fn version_parsing() {
        assert_eq!(parse_version("1.14"), Some(114));
        assert_eq!(parse_version("2.06"), Some(206));
        assert_eq!(parse_version("3"), None);
        assert_eq!(parse_version("x.y"), None);
    }

    #[test]
    fn reads_canonical_dynamic() {
        let xml = r#"<museScore version="2.06"><Dynamic>
            <subtype>sfz</subtype>
            <velocity>110</velocity>
            <dynType>0</dynType>
        </Dynamic></museScore>"#;
        let doc = parse_dynamics(xml).unwrap();
        assert_eq!(doc.msc_version, 206);
        let d = &doc.dynamics[0];
        assert_eq!(d.dynamic_type(), 17);
        assert_eq!(d.text(), "\u{e4f9}");
        assert_eq!(d.velocity_override(), 110);
        assert_eq!(d.dyn_range(), DynamicRange::Staff);
        assert!(doc.diagnostics.is_empty());
    }

    #[test]
    fn reads_custom_text() {
        let xml = r#"<museScore version="2.00"><Dynamic>
            <subtype>other-dynamics</subtype>
            <text>subito <b>p</b></text>
        </Dynamic></museScore>"#;
        let doc = parse_dynamics(xml).unwrap();
        let d = &doc.dynamics[0];
        assert_eq!(d.dynamic_type(), OTHER);
        assert_eq!(d.text(), "subito p");
        assert!(!d.text_base().styled());
    }

    #[test]
    fn unknown_children_are_reported_and_skipped() {
        let xml = "<museScore version=\"2.00\">\n<Dynamic>\n<subtype>p</subtype>\n<sparkle>1</sparkle>\n<velocity>loud</velocity>\n</Dynamic></museScore>";
        let doc = parse_dynamics(xml).unwrap();
        assert_eq!(doc.dynamics[0].dynamic_type(), 6);
        assert_eq!(doc.dynamics[0].velocity_override(), -1);
        assert_eq!(
            doc.diagnostics,
            vec![
                Diagnostic::UnknownElement { name: "sparkle".into(), line: 4 },
                Diagnostic::InvalidValue { name: "velocity".into(), value: "loud".into(), line: 5 },
            ]
        );
    }

    #[test]
    fn out_of_range_dyn_type_keeps_default() {
        let xml = "<museScore version=\"2.00\">\n<Dynamic>\n<subtype>f</subtype>\n<dynType>7</dynType>\n</Dynamic></museScore>";
        let doc = parse_dynamics(xml).unwrap();
        assert_eq!(doc.dynamics[0].dyn_range(), DynamicRange::Part);
        assert_eq!(
            doc.diagnostics,
            vec![Diagnostic::InvalidValue { name: "dynType".into(), value: "7".into(), line: 4 }]
        );
    }

    #[test]
    fn legacy_position_is_kept_for_layout() {
        let xml = r#"<museScore version="1.14"><Dynamic>
            <subtype>f</subtype>
            <pos x="-1.5" y="4"/>
            <style>Technik</style>
        </Dynamic></museScore>"#;
        let doc = parse_dynamics(xml).unwrap();
        assert_eq!(doc.msc_version, 114);
        let d = &doc.dynamics[0];
        assert_eq!(d.text_base().read_pos(), Some(Point::new(-1.5, 4.0)));
        assert_eq!(d.text_base().text_style(), TextStyleType::Dynamics);
    }

    #[test]
    fn ids_follow_document_order() {
        let xml = "<score><Dynamic><subtype>p</subtype></Dynamic><Measure><Dynamic><subtype>f</subtype></Dynamic></Measure></score>";
        let doc = parse_dynamics(xml).unwrap();
        assert_eq!(doc.msc_version, CURRENT_MSC_VERSION);
        let ids: Vec<_> = doc.dynamics.iter().map(|d| d.id()).collect();
        assert_eq!(ids, vec![ElementId(1), ElementId(2)]);
    }

    #[test]
    fn malformed_xml_is_an_error() {
        assert!(parse_dynamics("<Dynamic><subtype>p</Dynamic>").is_err());
    }
}
