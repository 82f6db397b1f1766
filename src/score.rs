//! Score context: the slice of the document that dynamics read from and
//! report to: geometry, format version, layout invalidation and undo.

use crate::constants::*;
use crate::dynamic::Dynamic;
use crate::error::Result;
use crate::model::{Anchor, ElementId, Point, Segment, SegmentId, Staff};
use crate::undo::{UndoCommand, UndoStack};

#[derive(Debug, Clone)]
pub struct ScoreContext {
    spatium: f64,
    /// Format version of the document the elements were read from,
    /// e.g. 114 for a "1.14" file
    msc_version: u32,
    /// Set whenever a change requires every position to be recomputed
    layout_all: bool,
    undo: UndoStack,
    segments: Vec<Segment>,
    staves: Vec<Staff>,
    next_id: u32,
}

impl ScoreContext {
    pub fn new() -> Self {
        Self {
            spatium: DEFAULT_SPATIUM,
            msc_version: CURRENT_MSC_VERSION,
            layout_all: false,
            undo: UndoStack::new(),
            segments: Vec::new(),
            staves: Vec::new(),
            next_id: 1,
        }
    }

    pub fn with_version(mut self, msc_version: u32) -> Self {
        self.msc_version = msc_version;
        self
    }

    pub fn with_spatium(mut self, spatium: f64) -> Self {
        self.spatium = spatium;
        self
    }

    pub fn spatium(&self) -> f64 {
        self.spatium
    }

    pub fn msc_version(&self) -> u32 {
        self.msc_version
    }

    /// Width of a normal-size black notehead.
    pub fn note_head_width(&self) -> f64 {
        self.spatium * NOTEHEAD_WIDTH_SP
    }

    pub fn layout_all(&self) -> bool {
        self.layout_all
    }

    pub fn set_layout_all(&mut self, v: bool) {
        self.layout_all = v;
    }

    pub fn undo_stack(&self) -> &UndoStack {
        &self.undo
    }

    pub fn push_undo(&mut self, cmd: UndoCommand) {
        self.undo.push(cmd);
    }

    /// Allocate an id for a new element.
    pub fn next_element_id(&mut self) -> ElementId {
        let id = ElementId(self.next_id);
        self.next_id += 1;
        id
    }

    // ── Geometry ─────────────────────────────────────────────────────

    pub fn add_segment(&mut self, segment: Segment) {
        self.segments.push(segment);
    }

    pub fn segment(&self, id: SegmentId) -> Option<&Segment> {
        self.segments.iter().find(|s| s.id == id)
    }

    pub fn segment_mut(&mut self, id: SegmentId) -> Option<&mut Segment> {
        self.segments.iter_mut().find(|s| s.id == id)
    }

    /// Append a staff and return its index.
    pub fn add_staff(&mut self, y: f64) -> usize {
        self.staves.push(Staff { y, height: self.spatium * STAFF_HEIGHT_SP });
        self.staves.len() - 1
    }

    pub fn staff(&self, idx: usize) -> Option<&Staff> {
        self.staves.get(idx)
    }

    /// Page position of an anchor's reference point: the segment's left
    /// edge on the staff's top line.
    pub fn anchor_page_pos(&self, anchor: Anchor) -> Option<Point> {
        let seg = self.segment(anchor.segment)?;
        let staff = self.staff(anchor.staff_idx)?;
        Some(Point::new(seg.x, staff.y))
    }

    /// Find the segment and staff under a page position.
    ///
    /// The staff is the one vertically closest to `pos`; the segment is
    /// the one containing `pos.x`, or the closest one when `pos.x` falls
    /// between or outside segments.
    pub fn pos_to_anchor(&self, pos: Point) -> Option<Anchor> {
        let staff_idx = self
            .staves
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| {
                band_distance(pos.y, a.y, a.height).total_cmp(&band_distance(pos.y, b.y, b.height))
            })
            .map(|(i, _)| i)?;

        let segment = match self.segments.iter().find(|s| s.contains_x(pos.x)) {
            Some(s) => s,
            None => self.segments.iter().min_by(|a, b| {
                band_distance(pos.x, a.x, a.width).total_cmp(&band_distance(pos.x, b.x, b.width))
            })?,
        };

        Some(Anchor { segment: segment.id, staff_idx })
    }

    /// Revert the newest undo command if it targets `dynamic`.
    /// Returns whether a command was reverted.
    pub fn undo_last(&mut self, dynamic: &mut Dynamic) -> Result<bool> {
        if self.undo.last().map(UndoCommand::element) != Some(dynamic.id()) {
            return Ok(false);
        }
        let Some(cmd) = self.undo.pop() else {
            return Ok(false);
        };
        match cmd {
            UndoCommand::ChangeProperty { id, old, .. } => {
                dynamic.set_property(id, old, self)?;
            }
            UndoCommand::ChangeParent { old_anchor, old_user_off, .. } => {
                dynamic.set_anchor(old_anchor);
                dynamic.text_base_mut().set_user_off(old_user_off);
                self.layout_all = true;
            }
        }
        Ok(true)
    }
}

impl Default for ScoreContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Distance from `v` to the interval `[start, start + len]` (0 inside).
fn band_distance(v: f64, start: f64, len: f64) -> f64 {
    if v < start {
        start - v
    } else if v > start + len {
        v - (start + len)
    } else {
        0.0
    }
}
