//! Writer for persisted dynamics: accumulates XML lines and produces
//! the final string.

use crate::catalog::OTHER;
use crate::constants::CURRENT_MSC_VERSION;
use crate::dynamic::Dynamic;
use crate::model::Point;
use crate::property::DynamicRange;

pub(crate) struct XmlWriter {
    lines: Vec<String>,
    depth: usize,
}

impl XmlWriter {
    pub(crate) fn new() -> Self {
        Self { lines: Vec::new(), depth: 0 }
    }

    pub(crate) fn build(self) -> String {
        let mut out = self.lines.join("\n");
        out.push('\n');
        out
    }

    fn push(&mut self, line: String) {
        self.lines.push(format!("{}{}", "  ".repeat(self.depth), line));
    }

    pub(crate) fn header(&mut self) {
        self.lines.push(r#"<?xml version="1.0" encoding="UTF-8"?>"#.to_string());
    }

    pub(crate) fn stag(&mut self, name: &str) {
        self.push(format!("<{name}>"));
        self.depth += 1;
    }

    pub(crate) fn stag_attr(&mut self, name: &str, attrs: &[(&str, &str)]) {
        let attrs: String = attrs
            .iter()
            .map(|(k, v)| format!(r#" {k}="{}""#, escape(v)))
            .collect();
        self.push(format!("<{name}{attrs}>"));
        self.depth += 1;
    }

    pub(crate) fn etag(&mut self, name: &str) {
        self.depth = self.depth.saturating_sub(1);
        self.push(format!("</{name}>"));
    }

    pub(crate) fn tag(&mut self, name: &str, value: impl std::fmt::Display) {
        let value = escape(&value.to_string());
        self.push(format!("<{name}>{value}</{name}>"));
    }

    pub(crate) fn tag_point(&mut self, name: &str, p: Point) {
        self.push(format!(r#"<{name} x="{}" y="{}"/>"#, p.x, p.y));
    }
}

/// Escape markup and carriage returns, which readers would otherwise
/// normalize to line feeds. Characters XML 1.0 cannot carry are dropped.
fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\r' => out.push_str("&#13;"),
            c if is_xml_char(c) => out.push(c),
            _ => {}
        }
    }
    out
}

fn is_xml_char(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\r' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}')
}

/// Append one `<Dynamic>` element. Values equal to their defaults are
/// omitted. The text is only written for custom marks; canonical marks
/// get it back from the catalog when read.
pub(crate) fn write_dynamic(xml: &mut XmlWriter, d: &Dynamic) {
    xml.stag("Dynamic");
    xml.tag("subtype", d.dynamic_type_name());
    if d.velocity_override() != -1 {
        xml.tag("velocity", d.velocity_override());
    }
    if d.dyn_range() != DynamicRange::Part {
        xml.tag("dynType", d.dyn_range() as i32);
    }

    let text = d.text_base();
    if !text.visible() {
        xml.tag("visible", 0);
    }
    if d.dynamic_type() == OTHER {
        if !text.text().chars().all(is_xml_char) {
            log::warn!("dynamic {:?}: dropping characters not allowed in XML from text", d.id());
        }
        xml.tag("text", text.text());
    }
    if !text.user_off().is_null() {
        xml.tag_point("offset", text.user_off());
    }
    xml.etag("Dynamic");
}

/// Serialize a single dynamic as an XML fragment.
pub fn dynamic_to_xml(d: &Dynamic) -> String {
    let mut xml = XmlWriter::new();
    write_dynamic(&mut xml, d);
    xml.build()
}

/// Serialize dynamics as a standalone document readable by
/// [`parse_dynamics`](crate::reader::parse_dynamics).
pub fn dynamics_to_xml(dynamics: &[Dynamic]) -> String {
    let version = format!("{}.{:02}", CURRENT_MSC_VERSION / 100, CURRENT_MSC_VERSION % 100);
    let mut xml = XmlWriter::new();
    xml.header();
    xml.stag_attr("museScore", &[("version", version.as_str())]);
    xml.stag("Dynamics");
    for d in dynamics {
        write_dynamic(&mut xml, d);
    }
    xml.etag("Dynamics");
    xml.etag("museScore");
    xml.build()
}
