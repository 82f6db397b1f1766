//! Horizontal placement of dynamics against the notes or rests at their
//! segment.

use crate::constants::*;
use crate::dynamic::Dynamic;
use crate::model::{ChordRest, Segment, StemDirection};
use crate::score::ScoreContext;

/// Horizontal offset that centers a mark on the content of `segment` at
/// `staff_idx`.
///
/// Voices are scanned in order and the first occupied one decides, so a
/// voice 1 chord never affects a mark whose voice 0 lane is filled.
/// Chords center on the notehead, or slightly left of it when the stem
/// points down; other content centers on its full width.
pub fn anchor_x_offset(segment: Option<&Segment>, staff_idx: usize, note_head_width: f64) -> f64 {
    let Some(segment) = segment else {
        return 0.0;
    };
    let Some(first_track) = staff_idx.checked_mul(VOICES) else {
        return 0.0;
    };
    let last_track = first_track.saturating_add(VOICES);
    let occupant = (first_track..last_track).find_map(|t| segment.element(t));

    match occupant {
        Some(ChordRest::Chord(c)) => {
            let w = note_head_width * c.mag;
            if c.stem == Some(StemDirection::Down) {
                w * STEM_DOWN_CENTER
            } else {
                w * NOTEHEAD_CENTER
            }
        }
        Some(other) => other.width() * REST_CENTER,
        None => 0.0,
    }
}

/// Corrected horizontal user offset for marks read from old files.
///
/// Files before format 118 computed narrower glyph bounding boxes, which
/// left stored marks too far right. Returns `None` when no correction
/// applies: newer files, or no stored position to correct.
pub fn legacy_user_offset(msc_version: u32, has_read_pos: bool, user_x: f64, spatium: f64) -> Option<f64> {
    if has_read_pos && msc_version < LEGACY_BBOX_VERSION {
        Some(user_x - spatium * LEGACY_BBOX_SHIFT_SP)
    } else {
        None
    }
}

impl Dynamic {
    /// Lay out the text, then shift it onto the content at the anchor.
    pub fn layout(&mut self, ctx: &ScoreContext) {
        let text = self.text_base_mut();
        if let Some(x) = legacy_user_offset(ctx.msc_version(), text.read_pos().is_some(), text.user_off().x, ctx.spatium()) {
            text.set_read_pos(None);
            text.set_user_x_offset(x);
        }
        text.layout(ctx.spatium());

        let anchor = self.anchor();
        let segment = anchor.and_then(|a| ctx.segment(a.segment));
        let staff_idx = anchor.map_or(0, |a| a.staff_idx);
        let dx = anchor_x_offset(segment, staff_idx, ctx.note_head_width());
        log::trace!("dynamic {:?}: anchor offset {dx}", self.id());

        let text = self.text_base_mut();
        text.translate_x(dx);
        text.adjust_read_pos();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Anchor, Chord, ElementId, Point, Rest, SegmentId};

    const NHW: f64 = 13.0;

    fn chord(stem: Option<StemDirection>, mag: f64) -> ChordRest {
        ChordRest::Chord(Chord { stem, mag, width: 20.0 })
    }

    fn segment_with(entries: &[(usize, ChordRest)]) -> Segment {
        let mut seg = Segment::new(SegmentId(1), 100.0, 40.0);
        for (track, cr) in entries {
            seg.set_element(*track, cr.clone());
        }
        seg
    }

    #[test]
    fn stem_down_chord_uses_optical_correction() {
        let seg = segment_with(&[(0, chord(Some(StemDirection::Down), 0.7))]);
        let dx = anchor_x_offset(Some(&seg), 0, NHW);
        assert!((dx - 0.25 * NHW * 0.7).abs() < 1e-9);
    }

    #[test]
    fn stem_up_and_stemless_chords_center_on_notehead() {
        let seg = segment_with(&[(0, chord(Some(StemDirection::Up), 1.0))]);
        assert!((anchor_x_offset(Some(&seg), 0, NHW) - 6.5).abs() < 1e-9);

        let seg = segment_with(&[(0, chord(None, 0.5))]);
        assert!((anchor_x_offset(Some(&seg), 0, NHW) - 3.25).abs() < 1e-9);
    }

    #[test]
    fn huge_staff_index_has_no_offset() {
        let seg = segment_with(&[(0, chord(Some(StemDirection::Up), 1.0))]);
        assert_eq!(anchor_x_offset(Some(&seg), usize::MAX, NHW), 0.0);
        assert_eq!(anchor_x_offset(Some(&seg), usize::MAX / VOICES, NHW), 0.0);
    }

    #[test]
    fn rest_centers_on_its_width() {
        let seg = segment_with(&[(4, ChordRest::Rest(Rest { width: 9.0 }))]);
        assert_eq!(anchor_x_offset(Some(&seg), 1, NHW), 4.5);
    }

    #[test]
    fn lowest_voice_wins() {
        let seg = segment_with(&[
            (1, chord(Some(StemDirection::Down), 1.0)),
            (2, ChordRest::Rest(Rest { width: 30.0 })),
        ]);
        assert!((anchor_x_offset(Some(&seg), 0, NHW) - 3.25).abs() < 1e-9);

        let seg = segment_with(&[
            (0, ChordRest::Rest(Rest { width: 30.0 })),
            (1, chord(Some(StemDirection::Down), 1.0)),
        ]);
        assert_eq!(anchor_x_offset(Some(&seg), 0, NHW), 15.0);
    }

    #[test]
    fn other_staves_are_ignored() {
        let seg = segment_with(&[(4, chord(Some(StemDirection::Up), 1.0))]);
        assert_eq!(anchor_x_offset(Some(&seg), 0, NHW), 0.0);
        assert_eq!(anchor_x_offset(Some(&seg), 2, NHW), 0.0);
    }

    #[test]
    fn no_segment_means_no_offset() {
        assert_eq!(anchor_x_offset(None, 0, NHW), 0.0);
    }

    #[test]
    fn legacy_correction_only_for_old_files_with_stored_pos() {
        assert_eq!(legacy_user_offset(114, true, 3.0, 10.0), Some(-3.0));
        assert_eq!(legacy_user_offset(114, false, 3.0, 10.0), None);
        assert_eq!(legacy_user_offset(118, true, 3.0, 10.0), None);
        assert_eq!(legacy_user_offset(200, true, 3.0, 10.0), None);
    }

    fn anchored_dynamic(ctx: &mut ScoreContext) -> Dynamic {
        let staff = ctx.add_staff(100.0);
        let mut seg = Segment::new(SegmentId(7), 200.0, 40.0);
        seg.set_element(0, chord(Some(StemDirection::Up), 1.0));
        ctx.add_segment(seg);
        let mut d = Dynamic::new(ElementId(1));
        d.set_dynamic_type("f");
        d.set_anchor(Some(Anchor { segment: SegmentId(7), staff_idx: staff }));
        d
    }

    #[test]
    fn layout_centers_glyph_under_notehead() {
        let mut ctx = ScoreContext::new();
        let mut d = anchored_dynamic(&mut ctx);
        d.layout(&ctx);
        let glyph_w = d.text_base().bbox().width;
        let expected = -glyph_w / 2.0 + ctx.note_head_width() * 0.5;
        assert!((d.text_base().pos().x - expected).abs() < 1e-9);
    }

    #[test]
    fn legacy_layout_shifts_once() {
        let mut ctx = ScoreContext::new().with_version(114);
        let mut d = anchored_dynamic(&mut ctx);
        d.text_base_mut().set_user_off(Point::new(2.0, 0.0));
        d.text_base_mut().set_read_pos(Some(Point::new(40.0, 40.0)));

        d.layout(&ctx);
        assert!((d.text_base().user_off().x - (2.0 - 6.0)).abs() < 1e-9);
        assert!(d.text_base().read_pos().is_none());

        d.layout(&ctx);
        assert!((d.text_base().user_off().x - (2.0 - 6.0)).abs() < 1e-9);
    }

    #[test]
    fn newer_files_keep_stored_position() {
        let mut ctx = ScoreContext::new().with_version(201);
        let mut d = anchored_dynamic(&mut ctx);
        d.text_base_mut().set_read_pos(Some(Point::new(4.0, 90.0)));
        d.layout(&ctx);
        assert_eq!(d.text_base().canvas_offset(), Point::new(4.0, 90.0));
        assert!(d.text_base().read_pos().is_none());
    }
}
