// Copyright 2025 Lars Brubaker
// License: MIT
//
// 24.8 fixed-point coordinates and the primitive shapes built on them.

/// A signed 24.8 fixed-point value.
pub type Fixed = i32;

pub const FRAC_BITS: u32 = 8;
pub const ONE: Fixed = 1 << FRAC_BITS;
pub const FRAC_MASK: Fixed = ONE - 1;

#[inline]
pub fn fixed_from_int(i: i32) -> Fixed {
    i << FRAC_BITS
}

/// Nearest fixed-point value to `d`.
#[inline]
pub fn fixed_from_f64(d: f64) -> Fixed {
    (d * ONE as f64).round() as Fixed
}

#[inline]
pub fn fixed_to_f64(f: Fixed) -> f64 {
    f as f64 / ONE as f64
}

/// Arithmetic shift; rounds toward negative infinity.
#[inline]
pub fn integer_part(f: Fixed) -> i32 {
    f >> FRAC_BITS
}

#[inline]
pub fn fractional_part(f: Fixed) -> Fixed {
    f & FRAC_MASK
}

#[inline]
pub fn fixed_floor(f: Fixed) -> Fixed {
    f & !FRAC_MASK
}

#[inline]
pub fn integer_floor(f: Fixed) -> i32 {
    if f >= 0 {
        f >> FRAC_BITS
    } else {
        -((-f - 1) >> FRAC_BITS) - 1
    }
}

#[inline]
pub fn integer_ceil(f: Fixed) -> i32 {
    if f > 0 {
        ((f - 1) >> FRAC_BITS) + 1
    } else {
        -((-f) >> FRAC_BITS)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: Fixed,
    pub y: Fixed,
}

impl Point {
    pub const fn new(x: Fixed, y: Fixed) -> Self {
        Point { x, y }
    }

    /// Point at integer pixel coordinates.
    pub fn from_int(x: i32, y: i32) -> Self {
        Point::new(fixed_from_int(x), fixed_from_int(y))
    }

    pub fn from_f64(x: f64, y: f64) -> Self {
        Point::new(fixed_from_f64(x), fixed_from_f64(y))
    }
}

/// An infinite line through two points; also the carrier of an edge.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Line {
    pub p1: Point,
    pub p2: Point,
}

impl Line {
    pub const fn new(p1: Point, p2: Point) -> Self {
        Line { p1, p2 }
    }

    #[inline]
    pub fn dx(&self) -> Fixed {
        self.p2.x - self.p1.x
    }

    #[inline]
    pub fn dy(&self) -> Fixed {
        self.p2.y - self.p1.y
    }

    #[inline]
    pub fn is_vertical(&self) -> bool {
        self.p1.x == self.p2.x
    }
}

/// A directed polygon edge: the line it lies on, the y range over which it
/// is valid (possibly narrower than the line's endpoints), and its winding
/// contribution.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Edge {
    pub line: Line,
    pub top: Fixed,
    pub bottom: Fixed,
    pub dir: i32,
}

impl Edge {
    /// Edge spanning the whole of `line`, which must already point downward.
    pub fn new(line: Line, dir: i32) -> Self {
        Edge {
            line,
            top: line.p1.y,
            bottom: line.p2.y,
            dir,
        }
    }
}

/// Axis-aligned box, `p1` top-left and `p2` bottom-right.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct FixedBox {
    pub p1: Point,
    pub p2: Point,
}

impl FixedBox {
    pub const fn new(p1: Point, p2: Point) -> Self {
        FixedBox { p1, p2 }
    }

    pub fn from_int(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        FixedBox::new(Point::from_int(x1, y1), Point::from_int(x2, y2))
    }

    /// Degenerate box at `p`, ready to be grown with `add_point`.
    pub fn at(p: Point) -> Self {
        FixedBox::new(p, p)
    }

    pub fn width(&self) -> Fixed {
        self.p2.x - self.p1.x
    }

    pub fn height(&self) -> Fixed {
        self.p2.y - self.p1.y
    }

    pub fn is_empty(&self) -> bool {
        self.p1.x >= self.p2.x || self.p1.y >= self.p2.y
    }

    pub fn add_point(&mut self, p: Point) {
        self.p1.x = self.p1.x.min(p.x);
        self.p1.y = self.p1.y.min(p.y);
        self.p2.x = self.p2.x.max(p.x);
        self.p2.y = self.p2.y.max(p.y);
    }

    pub fn union(&mut self, other: &FixedBox) {
        self.add_point(other.p1);
        self.add_point(other.p2);
    }

    pub fn contains_point(&self, p: Point) -> bool {
        p.x >= self.p1.x && p.x <= self.p2.x && p.y >= self.p1.y && p.y <= self.p2.y
    }
}
