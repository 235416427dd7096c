// Copyright 2025 Lars Brubaker
// License: MIT
//
// Per-edge state of the coverage sweep.
//
// An edge's x at the current sweep position is kept as an exact rational
// `quo + (rem + dy) / dy` so that stepping down by a sub-row or a whole
// row is a pair of additions and a carry, never a division.

use crate::fixed::{Edge, Fixed, ONE};
use crate::wideint::{floored_divrem, floored_muldivrem, Quorem};

/// Sub-pixel steps per pixel along each axis.
pub const STEP_X: i32 = ONE;
pub const STEP_Y: i32 = ONE;

/// The edge's START has been processed but it has not yet been advanced to
/// the bottom of its first row.
pub const EDGE_START: u8 = 0x1;
/// The edge has left the active list.
pub const EDGE_STOP: u8 = 0x2;

/// A change of an edge's winding sign at a sub-row offset `y` within the
/// current row. Runs form a singly linked list, newest first.
#[derive(Clone, Copy, Debug, Default)]
pub struct Run {
    pub next: Option<u32>,
    pub sign: i32,
    pub y: Fixed,
}

#[derive(Clone, Debug, Default)]
pub struct SweepEdge {
    pub edge: Edge,
    pub dy: Fixed,
    /// x at the current position; `rem` is kept in `[-dy, 0)`.
    pub x: Quorem,
    /// Step for one sub-row.
    pub dxdy: Quorem,
    /// Step for one whole row.
    pub dxdy_full: Quorem,
    pub vertical: bool,
    pub flags: u8,
    /// Sign assigned during the current row, 0 when none.
    pub current_sign: i32,
    /// Head of this edge's run list.
    pub runs: Option<u32>,
}

impl SweepEdge {
    pub fn new(edge: &Edge) -> Self {
        let line = &edge.line;
        let dx = line.dx();
        let dy = line.dy();

        let mut e = SweepEdge {
            edge: *edge,
            dy,
            flags: EDGE_START,
            ..Default::default()
        };

        if dx == 0 {
            e.vertical = true;
            e.x.quo = line.p1.x;
        } else {
            e.dxdy = floored_divrem(dx, dy);
            if edge.top == line.p1.y {
                e.x.quo = line.p1.x;
            } else {
                e.x = floored_muldivrem(edge.top - line.p1.y, dx, dy);
                e.x.quo += line.p1.x;
            }
            // A line shorter than one row is never stepped a whole row.
            if dy >= STEP_Y {
                e.dxdy_full = floored_muldivrem(STEP_Y, dx, dy);
            }
        }
        e.x.rem -= dy;
        e
    }

    #[inline]
    pub fn is_started(&self) -> bool {
        self.flags & EDGE_START != 0
    }

    #[inline]
    pub fn is_stopped(&self) -> bool {
        self.flags & EDGE_STOP != 0
    }

    /// Advance x by one whole row.
    #[inline]
    pub fn full_inc(&mut self) {
        self.x.quo += self.dxdy_full.quo;
        self.x.rem += self.dxdy_full.rem;
        if self.x.rem >= 0 {
            self.x.quo += 1;
            self.x.rem -= self.dy;
        }
    }

    /// Advance x by `height` sub-rows.
    #[inline]
    pub fn sub_inc(&mut self, height: Fixed) {
        if height == 1 {
            self.x.quo += self.dxdy.quo;
            self.x.rem += self.dxdy.rem;
            if self.x.rem >= 0 {
                self.x.quo += 1;
                self.x.rem -= self.dy;
            }
        } else {
            self.x.quo += height * self.dxdy.quo;
            let rem = self.x.rem as i64 + height as i64 * self.dxdy.rem as i64;
            if rem >= 0 {
                let dy = self.dy as i64;
                let carry = rem / dy + 1;
                self.x.quo += carry as i32;
                self.x.rem = (rem - carry * dy) as i32;
            } else {
                self.x.rem = rem as i32;
            }
        }
    }
}
