// Copyright 2025 Lars Brubaker
// License: MIT
//
// Per-row coverage accumulation.
//
// A row's coverage is a list of cells sorted by pixel column, bracketed by
// head and tail sentinels at `i32::MIN` and `i32::MAX`. Each cell records
// the signed height of edge crossings in its column and the area to the
// left of those crossings that is *not* covered; `render_rows` turns the
// running sum into per-pixel alpha. A cursor remembers the last cell
// touched, since consecutive lookups are usually close together.

use crate::bucketalloc::BucketAlloc;
use crate::error::Result;
use crate::fixed::{fractional_part, integer_part, Fixed};
use crate::sweep::STEP_X;
use crate::wideint::floored_divrem;

/// Coverage of one pixel column within the current row.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Cell {
    prev: u32,
    next: u32,
    pub x: i32,
    /// Twice the signed area left of the crossings, in sub-pixel units.
    pub uncovered_area: i32,
    /// Signed sum of crossing heights, in sub-pixel units.
    pub covered_height: i32,
}

const HEAD: u32 = 0;
const TAIL: u32 = 1;

pub struct Coverage {
    cells: BucketAlloc<Cell, 64>,
    cursor: u32,
    count: usize,
}

impl Coverage {
    pub fn new() -> Result<Self> {
        let mut coverage = Coverage {
            cells: BucketAlloc::new(),
            cursor: HEAD,
            count: 0,
        };
        coverage.reset()?;
        Ok(coverage)
    }

    /// Drop every cell, keeping the pool's capacity.
    pub fn reset(&mut self) -> Result<()> {
        self.cells.reset();
        let head = self.cells.alloc(Cell {
            prev: HEAD,
            next: TAIL,
            x: i32::MIN,
            ..Default::default()
        })?;
        let tail = self.cells.alloc(Cell {
            prev: HEAD,
            next: TAIL,
            x: i32::MAX,
            ..Default::default()
        })?;
        debug_assert_eq!((head, tail), (HEAD, TAIL));
        self.count = 0;
        self.rewind();
        Ok(())
    }

    #[inline]
    pub fn rewind(&mut self) {
        self.cursor = HEAD;
    }

    /// Number of cells, sentinels excluded.
    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Cells from left to right.
    pub fn iter(&self) -> impl Iterator<Item = &Cell> + '_ {
        let first = self.cells[HEAD].next;
        std::iter::successors(Some(first), move |&c| Some(self.cells[c].next))
            .take_while(|&c| c != TAIL)
            .map(move |c| &self.cells[c])
    }

    /// Link a fresh cell for column `x` directly before `before`.
    fn insert_before(&mut self, before: u32, x: i32) -> Result<u32> {
        let prev = self.cells[before].prev;
        let cell = self.cells.alloc(Cell {
            prev,
            next: before,
            x,
            uncovered_area: 0,
            covered_height: 0,
        })?;
        self.cells[prev].next = cell;
        self.cells[before].prev = cell;
        self.count += 1;
        Ok(cell)
    }

    /// The cell for column `x`, created if missing. Moves the cursor there.
    fn find(&mut self, x: i32) -> Result<u32> {
        let mut cell = self.cursor;
        if self.cells[cell].x > x {
            loop {
                let prev = self.cells[cell].prev;
                if self.cells[prev].x < x {
                    break;
                }
                cell = prev;
            }
        } else {
            if self.cells[cell].x == x {
                return Ok(cell);
            }
            loop {
                cell = self.cells[cell].next;
                if self.cells[cell].x >= x {
                    break;
                }
            }
        }

        if self.cells[cell].x != x {
            cell = self.insert_before(cell, x)?;
        }
        self.cursor = cell;
        Ok(cell)
    }

    /// The cell following `cell`, which must be for column `x`.
    #[inline]
    fn next_cell(&mut self, cell: u32, x: i32) -> Result<u32> {
        let next = self.cells[cell].next;
        if self.cells[next].x == x {
            Ok(next)
        } else {
            self.insert_before(next, x)
        }
    }

    /// Accumulate a crossing contribution into column `x`.
    pub fn add(&mut self, x: i32, covered_height: i32, uncovered_area: i32) -> Result<()> {
        let cell = self.find(x)?;
        let c = &mut self.cells[cell];
        c.covered_height += covered_height;
        c.uncovered_area += uncovered_area;
        Ok(())
    }

    /// Add the coverage of a segment from `(left, y1)` to `(right, y2)`,
    /// where `y1` and `y2` are sub-row offsets within the row, spread over
    /// every column it crosses. The endpoints must lie in different
    /// columns.
    pub fn render_cells(
        &mut self,
        left: Fixed,
        right: Fixed,
        mut y1: Fixed,
        y2: Fixed,
        mut sign: i32,
    ) -> Result<()> {
        let mut dx = right - left;
        let (mut ix1, fx1, ix2, fx2, dy);

        // Orient the segment left to right.
        if dx >= 0 {
            ix1 = integer_part(left);
            fx1 = fractional_part(left);
            ix2 = integer_part(right);
            fx2 = fractional_part(right);
            dy = y2 - y1;
        } else {
            ix1 = integer_part(right);
            fx1 = fractional_part(right);
            ix2 = integer_part(left);
            fx2 = fractional_part(left);
            dx = -dx;
            sign = -sign;
            dy = y1 - y2;
            y1 = y2 - dy;
        }
        debug_assert!(ix1 != ix2);

        let mut y = floored_divrem((STEP_X - fx1) * dy, dx);

        let mut cell = self.find(ix1)?;
        {
            let c = &mut self.cells[cell];
            c.uncovered_area += sign * y.quo * (STEP_X + fx1);
            c.covered_height += sign * y.quo;
        }
        y.quo += y1;

        ix1 += 1;
        cell = self.next_cell(cell, ix1)?;
        if ix1 < ix2 {
            let dydx_full = floored_divrem(STEP_X * dy, dx);
            loop {
                let mut y_skip = dydx_full.quo;
                y.rem += dydx_full.rem;
                if y.rem >= dx {
                    y_skip += 1;
                    y.rem -= dx;
                }
                y.quo += y_skip;

                y_skip *= sign;
                let c = &mut self.cells[cell];
                c.covered_height += y_skip;
                c.uncovered_area += y_skip * STEP_X;

                ix1 += 1;
                cell = self.next_cell(cell, ix1)?;
                if ix1 == ix2 {
                    break;
                }
            }
        }

        let c = &mut self.cells[cell];
        c.uncovered_area += sign * (y2 - y.quo) * fx2;
        c.covered_height += sign * (y2 - y.quo);
        self.cursor = cell;
        Ok(())
    }
}
