// Copyright 2025 Lars Brubaker
// License: MIT
//
// Exact-fill output: trapezoids and boxes, and the sink trait the
// trapezoid engines write through.

use crate::error::Result;
use crate::fixed::{fixed_to_f64, Fixed, FixedBox, Line, Point};
use crate::geom::line_x_for_y;

/// A y-range bounded on the left and right by two lines.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Trapezoid {
    pub top: Fixed,
    pub bottom: Fixed,
    pub left: Line,
    pub right: Line,
}

impl Trapezoid {
    /// Area in square pixels.
    pub fn area(&self) -> f64 {
        let width = |y: Fixed| {
            fixed_to_f64(line_x_for_y(&self.right, y)) - fixed_to_f64(line_x_for_y(&self.left, y))
        };
        0.5 * (width(self.top) + width(self.bottom)) * fixed_to_f64(self.bottom - self.top)
    }

    pub fn is_rectilinear(&self) -> bool {
        self.left.is_vertical() && self.right.is_vertical()
    }
}

/// Receiver of the trapezoids produced by a sweep. Implementations may
/// assume `top < bottom`.
pub trait TrapezoidSink {
    fn add_trap(&mut self, top: Fixed, bottom: Fixed, left: &Line, right: &Line) -> Result<()>;
}

/// An ordered collection of trapezoids with strictly positive height.
#[derive(Clone, Debug, Default)]
pub struct Traps {
    traps: Vec<Trapezoid>,
}

impl Traps {
    pub fn new() -> Self {
        Traps { traps: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.traps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.traps.is_empty()
    }

    pub fn clear(&mut self) {
        self.traps.clear();
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Trapezoid> {
        self.traps.iter()
    }

    pub fn as_slice(&self) -> &[Trapezoid] {
        &self.traps
    }

    /// Whether every trapezoid is an axis-aligned rectangle.
    pub fn is_rectilinear(&self) -> bool {
        self.traps.iter().all(Trapezoid::is_rectilinear)
    }

    /// Total area in square pixels.
    pub fn area(&self) -> f64 {
        self.traps.iter().map(Trapezoid::area).sum()
    }

    /// Bounding box of all trapezoids; `None` when empty.
    pub fn extents(&self) -> Option<FixedBox> {
        let mut iter = self.traps.iter();
        let first = iter.next()?;
        let corners = |t: &Trapezoid| {
            [
                Point::new(line_x_for_y(&t.left, t.top), t.top),
                Point::new(line_x_for_y(&t.left, t.bottom), t.bottom),
                Point::new(line_x_for_y(&t.right, t.top), t.top),
                Point::new(line_x_for_y(&t.right, t.bottom), t.bottom),
            ]
        };
        let mut extents = FixedBox::at(corners(first)[0]);
        for t in std::iter::once(first).chain(iter) {
            for p in corners(t) {
                extents.add_point(p);
            }
        }
        Some(extents)
    }
}

impl TrapezoidSink for Traps {
    fn add_trap(&mut self, top: Fixed, bottom: Fixed, left: &Line, right: &Line) -> Result<()> {
        if top >= bottom {
            return Ok(());
        }
        self.traps.try_reserve(1)?;
        self.traps.push(Trapezoid {
            top,
            bottom,
            left: *left,
            right: *right,
        });
        Ok(())
    }
}

impl<'a> IntoIterator for &'a Traps {
    type Item = &'a Trapezoid;
    type IntoIter = std::slice::Iter<'a, Trapezoid>;

    fn into_iter(self) -> Self::IntoIter {
        self.traps.iter()
    }
}

/// An ordered collection of axis-aligned boxes. Fed from the rectilinear
/// sweep, where every bounding line is vertical.
#[derive(Clone, Debug, Default)]
pub struct Boxes {
    boxes: Vec<FixedBox>,
}

impl Boxes {
    pub fn new() -> Self {
        Boxes { boxes: Vec::new() }
    }

    pub fn add(&mut self, b: FixedBox) -> Result<()> {
        if b.is_empty() {
            return Ok(());
        }
        self.boxes.try_reserve(1)?;
        self.boxes.push(b);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    pub fn clear(&mut self) {
        self.boxes.clear();
    }

    pub fn as_slice(&self) -> &[FixedBox] {
        &self.boxes
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FixedBox> {
        self.boxes.iter()
    }

    /// Total area in square pixels.
    pub fn area(&self) -> f64 {
        self.boxes
            .iter()
            .map(|b| fixed_to_f64(b.width()) * fixed_to_f64(b.height()))
            .sum()
    }
}

impl TrapezoidSink for Boxes {
    fn add_trap(&mut self, top: Fixed, bottom: Fixed, left: &Line, right: &Line) -> Result<()> {
        self.add(FixedBox::new(
            Point::new(left.p1.x, top),
            Point::new(right.p1.x, bottom),
        ))
    }
}

impl<'a> IntoIterator for &'a Boxes {
    type Item = &'a FixedBox;
    type IntoIter = std::slice::Iter<'a, FixedBox>;

    fn into_iter(self) -> Self::IntoIter {
        self.boxes.iter()
    }
}
