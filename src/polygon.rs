// Copyright 2025 Lars Brubaker
// License: MIT
//
// Edge set builder. Edges are stored pointing downward with their winding
// direction; horizontal edges contribute nothing to either engine and are
// dropped. When limit boxes are set, every edge is clipped against them:
// parts outside a limit's x-range are replaced by the limit's vertical
// sides so winding counts inside the limits are preserved.

use crate::error::Result;
use crate::fixed::{fixed_from_int, Edge, Fixed, FixedBox, Line, Point};
use crate::geom::{line_x_for_y, line_y_for_x};

#[derive(Clone, Debug)]
pub struct Polygon {
    edges: Vec<Edge>,
    extents: FixedBox,
    limits: Vec<FixedBox>,
    limit: FixedBox,
}

const EMPTY_EXTENTS: FixedBox = FixedBox::new(
    Point::new(i32::MAX, i32::MAX),
    Point::new(i32::MIN, i32::MIN),
);

impl Default for Polygon {
    fn default() -> Self {
        Self::new()
    }
}

impl Polygon {
    pub fn new() -> Self {
        Polygon {
            edges: Vec::new(),
            extents: EMPTY_EXTENTS,
            limits: Vec::new(),
            limit: FixedBox::default(),
        }
    }

    /// A polygon whose edges are clipped to the union of `limits`.
    pub fn with_limits(limits: &[FixedBox]) -> Self {
        let mut polygon = Polygon::new();
        polygon.set_limits(limits);
        polygon
    }

    /// Replace the clip limits. Only edges added afterwards are clipped.
    pub fn set_limits(&mut self, limits: &[FixedBox]) {
        self.limits = limits.to_vec();
        if let Some((first, rest)) = limits.split_first() {
            let mut limit = *first;
            for b in rest {
                limit.union(b);
            }
            self.limit = limit;
        }
    }

    /// Two vertical edges per box: the left side winding +1, the right -1.
    pub fn from_boxes(boxes: &[FixedBox]) -> Result<Self> {
        let mut polygon = Polygon::new();
        polygon.edges.try_reserve(2 * boxes.len())?;
        for b in boxes {
            polygon.add_edge(b.p1, Point::new(b.p1.x, b.p2.y), 1)?;
            polygon.add_edge(b.p2, Point::new(b.p2.x, b.p1.y), 1)?;
        }
        Ok(polygon)
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Bounding box of the edges' valid ranges; empty when no edge was added.
    pub fn extents(&self) -> FixedBox {
        if self.edges.is_empty() {
            FixedBox::default()
        } else {
            self.extents
        }
    }

    pub fn limits(&self) -> &[FixedBox] {
        &self.limits
    }

    pub fn is_rectilinear(&self) -> bool {
        self.edges.iter().all(|e| e.line.is_vertical())
    }

    fn push_edge(&mut self, p1: &Point, p2: &Point, top: Fixed, bottom: Fixed, dir: i32) -> Result<()> {
        debug_assert!(top < bottom);
        self.edges.try_reserve(1)?;
        let line = Line::new(*p1, *p2);
        self.edges.push(Edge {
            line,
            top,
            bottom,
            dir,
        });

        self.extents.p1.y = self.extents.p1.y.min(top);
        self.extents.p2.y = self.extents.p2.y.max(bottom);
        let x_top = if top == p1.y { p1.x } else { line_x_for_y(&line, top) };
        let x_bottom = if bottom == p2.y { p2.x } else { line_x_for_y(&line, bottom) };
        for x in [x_top, x_bottom] {
            self.extents.p1.x = self.extents.p1.x.min(x);
            self.extents.p2.x = self.extents.p2.x.max(x);
        }
        Ok(())
    }

    fn add_clipped_edge(&mut self, p1: &Point, p2: &Point, top: Fixed, bottom: Fixed, dir: i32) -> Result<()> {
        for n in 0..self.limits.len() {
            let limits = self.limits[n];
            if top >= limits.p2.y || bottom <= limits.p1.y {
                continue;
            }

            let bot_left = Point::new(limits.p1.x, limits.p2.y);
            let top_right = Point::new(limits.p2.x, limits.p1.y);

            // The useful region
            let mut top_y = top.max(limits.p1.y);
            let mut bot_y = bottom.min(limits.p2.y);

            // Horizontal projection of the edge
            let pleft = p1.x.min(p2.x);
            let pright = p1.x.max(p2.x);

            let line = Line::new(*p1, *p2);

            if limits.p1.x <= pleft && pright <= limits.p2.x {
                self.push_edge(p1, p2, top_y, bot_y, dir)?;
            } else if pright <= limits.p1.x {
                self.push_edge(&limits.p1, &bot_left, top_y, bot_y, dir)?;
            } else if limits.p2.x <= pleft {
                self.push_edge(&top_right, &limits.p2, top_y, bot_y, dir)?;
            } else {
                // The edge crosses a vertical side of the box. Where it runs
                // outside, substitute that side; keep the rest of the edge.
                let top_left_to_bottom_right = (p1.x <= p2.x) == (p1.y <= p2.y);
                if top_left_to_bottom_right {
                    let mut left_y = if pleft >= limits.p1.x {
                        top_y
                    } else {
                        let y = line_y_for_x(p1, p2, limits.p1.x);
                        if line_x_for_y(&line, y) < limits.p1.x {
                            y + 1
                        } else {
                            y
                        }
                    };
                    left_y = left_y.min(bot_y);
                    if top_y < left_y {
                        self.push_edge(&limits.p1, &bot_left, top_y, left_y, dir)?;
                        top_y = left_y;
                    }

                    let mut right_y = if pright <= limits.p2.x {
                        bot_y
                    } else {
                        let y = line_y_for_x(p1, p2, limits.p2.x);
                        if line_x_for_y(&line, y) > limits.p2.x {
                            y - 1
                        } else {
                            y
                        }
                    };
                    right_y = right_y.max(top_y);
                    if bot_y > right_y {
                        self.push_edge(&top_right, &limits.p2, right_y, bot_y, dir)?;
                        bot_y = right_y;
                    }
                } else {
                    let mut right_y = if pright <= limits.p2.x {
                        top_y
                    } else {
                        let y = line_y_for_x(p1, p2, limits.p2.x);
                        if line_x_for_y(&line, y) > limits.p2.x {
                            y + 1
                        } else {
                            y
                        }
                    };
                    right_y = right_y.min(bot_y);
                    if top_y < right_y {
                        self.push_edge(&top_right, &limits.p2, top_y, right_y, dir)?;
                        top_y = right_y;
                    }

                    let mut left_y = if pleft >= limits.p1.x {
                        bot_y
                    } else {
                        let y = line_y_for_x(p1, p2, limits.p1.x);
                        if line_x_for_y(&line, y) < limits.p1.x {
                            y - 1
                        } else {
                            y
                        }
                    };
                    left_y = left_y.max(top_y);
                    if bot_y > left_y {
                        self.push_edge(&limits.p1, &bot_left, left_y, bot_y, dir)?;
                        bot_y = left_y;
                    }
                }

                if top_y != bot_y {
                    self.push_edge(p1, p2, top_y, bot_y, dir)?;
                }
            }
        }
        Ok(())
    }

    fn outside_limit(&self, top: Fixed, bottom: Fixed) -> bool {
        bottom <= self.limit.p1.y || top >= self.limit.p2.y
    }

    /// Add the segment `p1`-`p2`. The stored edge points downward; `dir` is
    /// negated when the points are swapped.
    pub fn add_edge(&mut self, p1: Point, p2: Point, dir: i32) -> Result<()> {
        if p1.y == p2.y {
            return Ok(());
        }
        let (p1, p2, dir) = if p1.y > p2.y { (p2, p1, -dir) } else { (p1, p2, dir) };

        if self.limits.is_empty() {
            self.push_edge(&p1, &p2, p1.y, p2.y, dir)
        } else if self.outside_limit(p1.y, p2.y) {
            Ok(())
        } else {
            self.add_clipped_edge(&p1, &p2, p1.y, p2.y, dir)
        }
    }

    /// Add the part of a downward `line` between `top` and `bottom`.
    pub fn add_line(&mut self, line: &Line, top: Fixed, bottom: Fixed, dir: i32) -> Result<()> {
        if line.p1.y == line.p2.y || bottom <= top {
            return Ok(());
        }
        if self.limits.is_empty() {
            self.push_edge(&line.p1, &line.p2, top, bottom, dir)
        } else if self.outside_limit(line.p1.y, line.p2.y) {
            Ok(())
        } else {
            self.add_clipped_edge(&line.p1, &line.p2, top, bottom, dir)
        }
    }

    /// Add a closed ring through `points`.
    pub fn add_contour(&mut self, points: &[Point], dir: i32) -> Result<()> {
        if points.len() < 2 {
            return Ok(());
        }
        let mut prev = points[points.len() - 1];
        for &p in points {
            self.add_edge(prev, p, dir)?;
            prev = p;
        }
        Ok(())
    }

    /// Move every edge by whole pixels.
    pub fn translate(&mut self, dx: i32, dy: i32) {
        let dx = fixed_from_int(dx);
        let dy = fixed_from_int(dy);
        if !self.edges.is_empty() {
            self.extents.p1.x += dx;
            self.extents.p2.x += dx;
            self.extents.p1.y += dy;
            self.extents.p2.y += dy;
        }
        for e in &mut self.edges {
            e.top += dy;
            e.bottom += dy;
            e.line.p1.x += dx;
            e.line.p2.x += dx;
            e.line.p1.y += dy;
            e.line.p2.y += dy;
        }
    }
}
