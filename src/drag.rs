//! Interactive dragging of dynamics. Dragging a mark over another
//! segment or staff moves its anchor there while keeping the mark where
//! the user sees it.

use crate::dynamic::Dynamic;
use crate::model::{Line, Point, Rect};
use crate::score::ScoreContext;
use crate::undo::UndoCommand;

/// Modifier keys held during a drag, supplied by the input layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyboardModifiers {
    pub shift: bool,
    pub control: bool,
    pub alt: bool,
    pub meta: bool,
}

impl KeyboardModifiers {
    pub const NONE: KeyboardModifiers = KeyboardModifiers { shift: false, control: false, alt: false, meta: false };
    pub const SHIFT_CONTROL: KeyboardModifiers = KeyboardModifiers { shift: true, control: true, alt: false, meta: false };

    /// Exactly Shift+Control: free move without changing the anchor.
    pub fn suppresses_reanchor(&self) -> bool {
        *self == Self::SHIFT_CONTROL
    }
}

/// State of one drag gesture.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EditData {
    /// Pointer position in page coordinates
    pub pos: Point,
    /// Movement since the previous drag event
    pub delta: Point,
    /// Page position the gesture is measured from; reset on reanchor
    pub start_move: Point,
    pub modifiers: KeyboardModifiers,
}

impl Dynamic {
    /// Apply one drag event. Returns the dragged bounding box relative to
    /// the anchor it had when the event arrived.
    pub fn drag(&mut self, ctx: &mut ScoreContext, ed: &mut EditData) -> Rect {
        let r = self.text_base_mut().drag(ed.delta);

        if ed.modifiers.suppresses_reanchor() {
            return r;
        }
        let Some(target) = ctx.pos_to_anchor(ed.pos) else {
            return r;
        };
        if self.anchor() == Some(target) {
            return r;
        }

        let pos1 = self.page_pos(ctx);
        ctx.push_undo(UndoCommand::ChangeParent {
            element: self.id(),
            old_anchor: self.anchor(),
            new_anchor: target,
            old_user_off: self.text_base().user_off(),
        });
        log::trace!("dynamic {:?}: reanchor {:?} -> {:?}", self.id(), self.anchor(), target);

        self.set_anchor(Some(target));
        self.text_base_mut().set_user_off(Point::default());
        self.layout(ctx);
        let pos2 = self.page_pos(ctx);
        self.text_base_mut().set_user_off(pos1 - pos2);
        ed.start_move = pos2;
        r
    }

    /// Line from the anchor reference point to the mark, drawn while
    /// dragging.
    pub fn drag_anchor(&self, ctx: &ScoreContext) -> Option<Line> {
        let from = ctx.anchor_page_pos(self.anchor()?)?;
        Some(Line { from, to: self.page_pos(ctx) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Anchor, Chord, ChordRest, ElementId, Rest, Segment, SegmentId, StemDirection};

    fn score() -> ScoreContext {
        let mut ctx = ScoreContext::new();
        ctx.add_staff(100.0);
        ctx.add_staff(220.0);
        let mut s1 = Segment::new(SegmentId(1), 100.0, 50.0);
        s1.set_element(0, ChordRest::Chord(Chord { stem: Some(StemDirection::Down), mag: 1.0, width: 14.0 }));
        let mut s2 = Segment::new(SegmentId(2), 150.0, 50.0);
        s2.set_element(0, ChordRest::Rest(Rest { width: 11.0 }));
        ctx.add_segment(s1);
        ctx.add_segment(s2);
        ctx
    }

    fn placed(ctx: &mut ScoreContext) -> Dynamic {
        let mut d = Dynamic::new(ctx.next_element_id());
        d.set_dynamic_type("mf");
        d.set_anchor(Some(Anchor { segment: SegmentId(1), staff_idx: 0 }));
        d.layout(ctx);
        d
    }

    fn close(a: Point, b: Point) -> bool {
        (a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9
    }

    #[test]
    fn reanchor_keeps_page_position() {
        let mut ctx = score();
        let mut d = placed(&mut ctx);
        let mut ed = EditData { pos: Point::new(170.0, 110.0), delta: Point::new(3.0, 2.0), ..Default::default() };

        d.drag(&mut ctx, &mut ed);
        let before = d.page_pos(&ctx);
        assert_eq!(d.anchor(), Some(Anchor { segment: SegmentId(2), staff_idx: 0 }));

        d.layout(&ctx);
        assert!(close(before, d.page_pos(&ctx)));
        assert_eq!(ctx.undo_stack().len(), 1);
    }

    #[test]
    fn reanchor_does_not_move_the_mark() {
        let mut ctx = score();
        let mut d = placed(&mut ctx);
        let start = d.page_pos(&ctx);
        let mut ed = EditData { pos: Point::new(160.0, 230.0), ..Default::default() };

        d.drag(&mut ctx, &mut ed);
        assert_eq!(d.anchor(), Some(Anchor { segment: SegmentId(2), staff_idx: 1 }));
        assert!(close(start, d.page_pos(&ctx)));

        let origin = ctx.anchor_page_pos(d.anchor().unwrap()).unwrap();
        assert!(close(ed.start_move, origin + d.text_base().pos()));
    }

    #[test]
    fn shift_control_suppresses_reanchor() {
        let mut ctx = score();
        let mut d = placed(&mut ctx);
        let mut ed = EditData {
            pos: Point::new(170.0, 110.0),
            delta: Point::new(20.0, 0.0),
            modifiers: KeyboardModifiers::SHIFT_CONTROL,
            ..Default::default()
        };
        d.drag(&mut ctx, &mut ed);
        assert_eq!(d.anchor(), Some(Anchor { segment: SegmentId(1), staff_idx: 0 }));
        assert_eq!(d.text_base().user_off(), Point::new(20.0, 0.0));
        assert!(ctx.undo_stack().is_empty());
    }

    #[test]
    fn other_modifiers_still_reanchor() {
        let mut ctx = score();
        let mut d = placed(&mut ctx);
        let mods = KeyboardModifiers { shift: true, control: true, alt: true, meta: false };
        let mut ed = EditData { pos: Point::new(170.0, 110.0), modifiers: mods, ..Default::default() };
        d.drag(&mut ctx, &mut ed);
        assert_eq!(d.anchor().map(|a| a.segment), Some(SegmentId(2)));
    }

    #[test]
    fn same_anchor_only_moves() {
        let mut ctx = score();
        let mut d = placed(&mut ctx);
        let mut ed = EditData { pos: Point::new(120.0, 105.0), delta: Point::new(1.0, 1.0), ..Default::default() };
        d.drag(&mut ctx, &mut ed);
        assert_eq!(d.text_base().user_off(), Point::new(1.0, 1.0));
        assert!(ctx.undo_stack().is_empty());
        assert_eq!(ed.start_move, Point::default());
    }

    #[test]
    fn undo_restores_anchor_and_offset() {
        let mut ctx = score();
        let mut d = placed(&mut ctx);
        let mut ed = EditData { pos: Point::new(170.0, 110.0), delta: Point::new(4.0, 0.0), ..Default::default() };
        d.drag(&mut ctx, &mut ed);

        assert!(ctx.undo_last(&mut d).unwrap());
        assert_eq!(d.anchor(), Some(Anchor { segment: SegmentId(1), staff_idx: 0 }));
        assert_eq!(d.text_base().user_off(), Point::new(4.0, 0.0));
        assert!(ctx.layout_all());
    }

    #[test]
    fn drag_anchor_line_runs_from_reference_point() {
        let mut ctx = score();
        let d = placed(&mut ctx);
        let line = d.drag_anchor(&ctx).unwrap();
        assert_eq!(line.from, Point::new(100.0, 100.0));
        assert_eq!(line.to, d.page_pos(&ctx));

        let free = Dynamic::new(ElementId(42));
        assert!(free.drag_anchor(&ctx).is_none());
    }
}
