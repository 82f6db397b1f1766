//! Dynamic marking element: a loudness mark (p, mf, sfz, ...) with an
//! optional velocity override, attached to a segment and staff.
//!
//! The element composes a [`TextBase`] for its label and forwards every
//! property it does not own to it.

use serde::Serialize;

use crate::catalog::{CatalogEntry, DynamicCatalog, OTHER};
use crate::error::{DynamicError, Result};
use crate::model::{Anchor, ElementId, Point};
use crate::property::{DynamicRange, PropertyId, PropertyValue, TextStyleType};
use crate::score::ScoreContext;
use crate::text::TextBase;
use crate::undo::UndoCommand;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dynamic {
    id: ElementId,
    /// Catalog index; `OTHER` for free text
    dynamic_type: usize,
    /// Velocity override; values <= 0 mean "use the catalog velocity"
    velocity: i32,
    dyn_range: DynamicRange,
    anchor: Option<Anchor>,
    text: TextBase,
}

impl Dynamic {
    pub fn new(id: ElementId) -> Self {
        Self {
            id,
            dynamic_type: OTHER,
            velocity: -1,
            dyn_range: DynamicRange::Part,
            anchor: None,
            text: TextBase::new(TextStyleType::Dynamics),
        }
    }

    pub fn id(&self) -> ElementId {
        self.id
    }

    // ── Type ─────────────────────────────────────────────────────────

    pub fn dynamic_type(&self) -> usize {
        self.dynamic_type
    }

    /// Catalog entry of the current type.
    pub fn entry(&self) -> &'static CatalogEntry {
        let cat = DynamicCatalog::standard();
        cat.entry_at(self.dynamic_type).unwrap_or_else(|| cat.other())
    }

    /// Persisted name of the current type.
    pub fn dynamic_type_name(&self) -> &'static str {
        self.entry().tag
    }

    /// Resolve `tag` against the catalog. A known tag sets the type and
    /// replaces the text with its glyph; anything else becomes `OTHER`
    /// with the tag kept verbatim as text.
    pub fn set_dynamic_type(&mut self, tag: &str) {
        let cat = DynamicCatalog::standard();
        match cat.find_by_tag(tag).and_then(|i| cat.entry_at(i).map(|e| (i, e))) {
            Some((i, e)) => {
                self.dynamic_type = i;
                self.text.set_text(e.glyph);
            }
            None => {
                log::debug!("dynamic tag {tag:?} not in catalog, using other");
                self.dynamic_type = OTHER;
                self.text.set_text(tag);
            }
        }
    }

    /// Set the type by catalog index, leaving the text alone.
    pub fn set_dynamic_type_index(&mut self, index: i32) -> Result<()> {
        let i = usize::try_from(index).map_err(|_| DynamicError::InvalidSubtype(index))?;
        if DynamicCatalog::standard().entry_at(i).is_none() {
            return Err(DynamicError::InvalidSubtype(index));
        }
        self.dynamic_type = i;
        Ok(())
    }

    // ── Velocity & range ─────────────────────────────────────────────

    /// Effective velocity: the override if set, else the catalog value.
    pub fn velocity(&self) -> i32 {
        if self.velocity <= 0 {
            self.entry().velocity
        } else {
            self.velocity
        }
    }

    /// Raw override as stored (not range checked).
    pub fn velocity_override(&self) -> i32 {
        self.velocity
    }

    pub fn set_velocity(&mut self, v: i32) {
        self.velocity = v;
    }

    pub fn dyn_range(&self) -> DynamicRange {
        self.dyn_range
    }

    pub fn set_dyn_range(&mut self, r: DynamicRange) {
        self.dyn_range = r;
    }

    // ── Anchor & text ────────────────────────────────────────────────

    pub fn anchor(&self) -> Option<Anchor> {
        self.anchor
    }

    pub fn set_anchor(&mut self, anchor: Option<Anchor>) {
        self.anchor = anchor;
    }

    pub fn text(&self) -> &str {
        self.text.text()
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text.set_text(text);
    }

    pub fn text_base(&self) -> &TextBase {
        &self.text
    }

    pub fn text_base_mut(&mut self) -> &mut TextBase {
        &mut self.text
    }

    /// Absolute page position: anchor reference point plus layout
    /// position plus user offset.
    pub fn page_pos(&self, ctx: &ScoreContext) -> Point {
        let origin = self
            .anchor
            .and_then(|a| ctx.anchor_page_pos(a))
            .unwrap_or_default();
        origin + self.text.canvas_offset()
    }

    // ── Editing ──────────────────────────────────────────────────────

    pub fn start_edit(&mut self) {
        self.text.start_edit();
    }

    /// Close the edit session. If the text no longer matches the
    /// catalog glyph, or carries local formatting, the mark becomes
    /// `OTHER`; the text itself is never rewritten.
    pub fn end_edit(&mut self) {
        self.text.end_edit();
        if !self.text.styled() || self.text.text() != self.entry().glyph {
            self.dynamic_type = OTHER;
        }
    }

    // ── Properties ───────────────────────────────────────────────────

    pub fn get_property(&self, id: PropertyId) -> Result<PropertyValue> {
        match id {
            PropertyId::DynamicRange => Ok(PropertyValue::Range(self.dyn_range)),
            PropertyId::Velocity => Ok(PropertyValue::Int(self.velocity())),
            PropertyId::Subtype => Ok(PropertyValue::Int(self.dynamic_type as i32)),
            _ => self.text.get_property(id),
        }
    }

    /// Assign a property. Every successful assignment invalidates the
    /// layout of the whole score.
    pub fn set_property(&mut self, id: PropertyId, v: PropertyValue, ctx: &mut ScoreContext) -> Result<()> {
        match id {
            PropertyId::DynamicRange => self.dyn_range = v.to_range(id)?,
            PropertyId::Velocity => self.velocity = v.to_int(id)?,
            PropertyId::Subtype => self.set_dynamic_type_index(v.to_int(id)?)?,
            _ => self.text.set_property(id, v)?,
        }
        ctx.set_layout_all(true);
        Ok(())
    }

    pub fn property_default(&self, id: PropertyId) -> Result<PropertyValue> {
        match id {
            PropertyId::TextStyle => Ok(PropertyValue::Style(TextStyleType::Dynamics)),
            PropertyId::DynamicRange => Ok(PropertyValue::Range(DynamicRange::Part)),
            PropertyId::Velocity => Ok(PropertyValue::Int(-1)),
            _ => self.text.property_default(id),
        }
    }

    /// Stored value of a property, used as the undo snapshot. Differs
    /// from `get_property` only for `Velocity`, which is stored unresolved.
    fn stored_property(&self, id: PropertyId) -> Result<PropertyValue> {
        match id {
            PropertyId::Velocity => Ok(PropertyValue::Int(self.velocity)),
            _ => self.get_property(id),
        }
    }

    /// Assign a property and record the change in the undo log.
    pub fn undo_change_property(&mut self, id: PropertyId, v: PropertyValue, ctx: &mut ScoreContext) -> Result<()> {
        let old = self.stored_property(id)?;
        self.set_property(id, v.clone(), ctx)?;
        ctx.push_undo(UndoCommand::ChangeProperty { element: self.id, id, old, new: v });
        Ok(())
    }

    pub fn undo_set_dyn_range(&mut self, r: DynamicRange, ctx: &mut ScoreContext) -> Result<()> {
        self.undo_change_property(PropertyId::DynamicRange, PropertyValue::Range(r), ctx)
    }
}
