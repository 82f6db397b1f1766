//! Styled-text base capability shared by text-like score elements.
//!
//! Holds the text, its style, the edit session state and the layout
//! position. Elements compose a `TextBase` and forward any property they
//! don't handle themselves.

use serde::Serialize;

use crate::constants::{GLYPH_ADVANCE_SP, TEXT_HEIGHT_SP};
use crate::error::{DynamicError, Result};
use crate::model::{Point, Rect};
use crate::property::{PropertyId, PropertyValue, TextStyleType};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextBase {
    text: String,
    style: TextStyleType,
    /// Whether the text follows its named style (no local formatting)
    styled: bool,
    visible: bool,
    editing: bool,
    /// Layout position relative to the anchor reference point
    pos: Point,
    /// User adjustment applied on top of `pos`
    user_off: Point,
    /// Position stored in the file, consumed by the first layout
    read_pos: Option<Point>,
    bbox: Rect,
}

impl TextBase {
    pub fn new(style: TextStyleType) -> Self {
        Self {
            text: String::new(),
            style,
            styled: true,
            visible: true,
            editing: false,
            pos: Point::default(),
            user_off: Point::default(),
            read_pos: None,
            bbox: Rect::default(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn text_style(&self) -> TextStyleType {
        self.style
    }

    pub fn set_text_style(&mut self, style: TextStyleType) {
        self.style = style;
    }

    pub fn styled(&self) -> bool {
        self.styled
    }

    pub fn set_styled(&mut self, v: bool) {
        self.styled = v;
    }

    pub fn visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, v: bool) {
        self.visible = v;
    }

    // ── Edit session ─────────────────────────────────────────────────

    pub fn is_editing(&self) -> bool {
        self.editing
    }

    pub fn start_edit(&mut self) {
        self.editing = true;
    }

    pub fn end_edit(&mut self) {
        self.editing = false;
    }

    // ── Position ─────────────────────────────────────────────────────

    pub fn pos(&self) -> Point {
        self.pos
    }

    pub fn translate_x(&mut self, dx: f64) {
        self.pos.x += dx;
    }

    pub fn user_off(&self) -> Point {
        self.user_off
    }

    pub fn set_user_off(&mut self, p: Point) {
        self.user_off = p;
    }

    pub fn set_user_x_offset(&mut self, x: f64) {
        self.user_off.x = x;
    }

    pub fn read_pos(&self) -> Option<Point> {
        self.read_pos
    }

    pub fn set_read_pos(&mut self, p: Option<Point>) {
        self.read_pos = p;
    }

    pub fn bbox(&self) -> Rect {
        self.bbox
    }

    /// Offset of the element from its anchor reference point.
    pub fn canvas_offset(&self) -> Point {
        self.pos + self.user_off
    }

    /// Compute the bounding box and the default position: horizontally
    /// centered on the reference point, baseline below the staff.
    pub fn layout(&mut self, spatium: f64) {
        let chars = self.text.chars().count() as f64;
        let width = chars * GLYPH_ADVANCE_SP * spatium;
        let height = TEXT_HEIGHT_SP * spatium;
        self.bbox = Rect { x: 0.0, y: -height, width, height };
        self.pos = Point::new(-width * 0.5, style_y_offset(self.style) * spatium);
    }

    /// Turn a position stored in the file into a user offset against the
    /// freshly computed layout position. Runs once per stored position.
    pub fn adjust_read_pos(&mut self) {
        if let Some(rp) = self.read_pos.take() {
            self.user_off = rp - self.pos;
        }
    }

    /// Move by `delta` (movement since the previous drag event) and
    /// return the new bounding box relative to the anchor.
    pub fn drag(&mut self, delta: Point) -> Rect {
        self.user_off = self.user_off + delta;
        self.bbox.translated(self.canvas_offset())
    }

    // ── Properties ───────────────────────────────────────────────────

    pub fn get_property(&self, id: PropertyId) -> Result<PropertyValue> {
        match id {
            PropertyId::Text => Ok(PropertyValue::Text(self.text.clone())),
            PropertyId::TextStyle => Ok(PropertyValue::Style(self.style)),
            PropertyId::UserOff => Ok(PropertyValue::Point(self.user_off)),
            PropertyId::Visible => Ok(PropertyValue::Bool(self.visible)),
            _ => Err(DynamicError::UnsupportedProperty(id)),
        }
    }

    pub fn set_property(&mut self, id: PropertyId, v: PropertyValue) -> Result<()> {
        match (id, v) {
            (PropertyId::Text, PropertyValue::Text(t)) => self.text = t,
            (PropertyId::TextStyle, PropertyValue::Style(s)) => self.style = s,
            (PropertyId::UserOff, PropertyValue::Point(p)) => self.user_off = p,
            (PropertyId::Visible, v) => self.visible = v.to_bool(id)?,
            (PropertyId::Text | PropertyId::TextStyle | PropertyId::UserOff, v) => {
                return Err(DynamicError::TypeMismatch { id, found: v.kind() });
            }
            _ => return Err(DynamicError::UnsupportedProperty(id)),
        }
        Ok(())
    }

    pub fn property_default(&self, id: PropertyId) -> Result<PropertyValue> {
        match id {
            PropertyId::Text => Ok(PropertyValue::Text(String::new())),
            PropertyId::TextStyle => Ok(PropertyValue::Style(TextStyleType::Default)),
            PropertyId::UserOff => Ok(PropertyValue::Point(Point::default())),
            PropertyId::Visible => Ok(PropertyValue::Bool(true)),
            _ => Err(DynamicError::UnsupportedProperty(id)),
        }
    }
}

/// Vertical baseline offset of a style, in spatium units.
fn style_y_offset(style: TextStyleType) -> f64 {
    match style {
        TextStyleType::Dynamics => 8.0,
        TextStyleType::Staff | TextStyleType::Tempo => -2.0,
        TextStyleType::Title | TextStyleType::Default => 0.0,
    }
}
