//! Score model collaborators consumed by dynamics: page geometry,
//! segments (time anchors) and the chords/rests occupying them.

use serde::{Deserialize, Serialize};

use crate::constants::VOICES;

/// A point in page coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_null(&self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }
}

impl std::ops::Add for Point {
    type Output = Point;
    fn add(self, o: Point) -> Point {
        Point::new(self.x + o.x, self.y + o.y)
    }
}

impl std::ops::Sub for Point {
    type Output = Point;
    fn sub(self, o: Point) -> Point {
        Point::new(self.x - o.x, self.y - o.y)
    }
}

/// Axis-aligned rectangle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn translated(&self, p: Point) -> Rect {
        Rect { x: self.x + p.x, y: self.y + p.y, ..*self }
    }
}

/// Line segment, used for the drag anchor indicator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub from: Point,
    pub to: Point,
}

/// Identifier of an element within a score, used by undo commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementId(pub u32);

/// Identifier of a segment (time position) within a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SegmentId(pub u32);

/// Where a dynamic applies: a time position and a staff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Anchor {
    pub segment: SegmentId,
    pub staff_idx: usize,
}

impl Anchor {
    /// First track of the anchor's staff, or None if the staff index is
    /// beyond any addressable track.
    pub fn track(&self) -> Option<usize> {
        self.staff_idx.checked_mul(VOICES)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StemDirection {
    Up,
    Down,
}

/// A played note group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chord {
    /// Rendered stem direction (None for stemless chords, e.g. whole notes)
    pub stem: Option<StemDirection>,
    /// Size scale factor (1.0 = normal, smaller for cue/grace notes)
    pub mag: f64,
    /// Overall width in page units
    pub width: f64,
}

/// A rest (or any other non-chord content in a voice lane).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rest {
    pub width: f64,
}

/// Occupant of one voice lane at a segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ChordRest {
    Chord(Chord),
    Rest(Rest),
}

impl ChordRest {
    pub fn width(&self) -> f64 {
        match self {
            ChordRest::Chord(c) => c.width,
            ChordRest::Rest(r) => r.width,
        }
    }
}

/// A time position shared by all staves and voices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub id: SegmentId,
    /// Left edge in page coordinates
    pub x: f64,
    pub width: f64,
    /// Occupants indexed by track (staff * 4 + voice)
    pub elements: Vec<Option<ChordRest>>,
}

impl Segment {
    pub fn new(id: SegmentId, x: f64, width: f64) -> Self {
        Self { id, x, width, elements: Vec::new() }
    }

    /// Occupant of a track, if any.
    pub fn element(&self, track: usize) -> Option<&ChordRest> {
        self.elements.get(track).and_then(Option::as_ref)
    }

    /// Place an occupant on a track, growing the lane table as needed.
    pub fn set_element(&mut self, track: usize, cr: ChordRest) {
        if self.elements.len() <= track {
            self.elements.resize(track + 1, None);
        }
        self.elements[track] = Some(cr);
    }

    pub fn contains_x(&self, x: f64) -> bool {
        x >= self.x && x < self.x + self.width
    }
}

/// Vertical placement of one staff on the page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Staff {
    /// Top line in page coordinates
    pub y: f64,
    pub height: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segment_lanes_grow_on_demand() {
        let mut seg = Segment::new(SegmentId(1), 0.0, 20.0);
        assert!(seg.element(5).is_none());
        seg.set_element(5, ChordRest::Rest(Rest { width: 8.0 }));
        assert_eq!(seg.elements.len(), 6);
        assert_eq!(seg.element(5).map(ChordRest::width), Some(8.0));
        assert!(seg.element(4).is_none());
    }

    #[test]
    fn anchor_track_is_first_voice_of_staff() {
        let a = Anchor { segment: SegmentId(0), staff_idx: 2 };
        assert_eq!(a.track(), Some(8));

        let far = Anchor { segment: SegmentId(0), staff_idx: usize::MAX };
        assert_eq!(far.track(), None);
    }

    #[test]
    fn point_arithmetic() {
        let p = Point::new(3.0, 4.0) - Point::new(1.0, 1.0);
        assert_eq!(p, Point::new(2.0, 3.0));
        assert!(!p.is_null());
        assert!(Point::default().is_null());
    }
}
