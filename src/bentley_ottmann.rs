// Copyright 2025 Lars Brubaker
// License: MIT
//
// Bentley-Ottmann tessellation of an arbitrary polygon into trapezoids.
//
// The sweep visits every distinct event row. START inserts an edge and
// schedules its STOP, STOP removes it, INTERSECTION swaps two neighbours;
// each change of adjacency is tested for a future crossing. Before the sweep
// leaves a row the active list is walked once, and each maximal run of
// "inside" winding between two edges becomes (or extends) a deferred
// trapezoid owned by its left edge. A deferred trapezoid is emitted only
// when its right boundary changes or its left edge stops, so rows with
// the same boundaries merge into one trapezoid.

use log::{debug, trace};
use smallvec::SmallVec;

use crate::dict::ActiveList;
use crate::error::Result;
use crate::fixed::{Edge, Fixed, Point};
use crate::geom::{edge_intersect, line_x_for_y, lines_compare_at_y, lines_equal, slope_compare};
use crate::polygon::Polygon;
use crate::priorityq::{compare_by_point, EdgeIdx, Event, EventKind, PriorityQ};
use crate::traps::{TrapezoidSink, Traps};
use crate::wideint::{det32_64, ordering_sign};
use crate::FillRule;

/// A trapezoid whose top and right boundary are known but whose bottom is
/// not yet.
#[derive(Clone, Copy, Debug)]
pub(crate) struct DeferredTrap {
    pub(crate) right: EdgeIdx,
    pub(crate) top: Fixed,
}

#[derive(Clone, Debug)]
struct BoEdge {
    edge: Edge,
    deferred: Option<DeferredTrap>,
    /// Last collinearity answer, keyed by the other edge.
    colinear: Option<(EdgeIdx, bool)>,
}

/// Whether two edges lie on the same infinite line.
pub(crate) fn lines_colinear(a: &Edge, b: &Edge) -> bool {
    let (a, b) = (&a.line, &b.line);
    if lines_equal(a, b) {
        return true;
    }
    if slope_compare(a, b) != 0 {
        return false;
    }
    if a.p1 == b.p1 || a.p2 == b.p2 {
        return true;
    }
    // Parallel: collinear iff b.p1 lies on a.
    det32_64(b.p1.x - a.p1.x, b.p1.y - a.p1.y, a.dx(), a.dy()) == 0
}

struct SweepLine<'s, S: TrapezoidSink + ?Sized> {
    edges: Vec<BoEdge>,
    queue: PriorityQ,
    active: ActiveList,
    stopped: SmallVec<[EdgeIdx; 16]>,
    current_y: Fixed,
    sink: &'s mut S,
    intersections: usize,
    traps: usize,
}

fn compare_edges(edges: &[BoEdge], a: EdgeIdx, b: EdgeIdx, y: Fixed) -> i32 {
    let ea = &edges[a as usize].edge;
    let eb = &edges[b as usize].edge;
    let cmp = lines_compare_at_y(&ea.line, &eb.line, y);
    if cmp != 0 {
        return cmp;
    }
    // Collinear: the one ending first goes left.
    ordering_sign(eb.bottom.cmp(&ea.bottom))
}

impl<'s, S: TrapezoidSink + ?Sized> SweepLine<'s, S> {
    fn new(polygon: &Polygon, sink: &'s mut S) -> Result<Self> {
        let num_edges = polygon.num_edges();
        let mut edges = Vec::new();
        edges.try_reserve_exact(num_edges)?;
        let mut starts = Vec::new();
        starts.try_reserve_exact(num_edges)?;

        for (i, edge) in polygon.edges().iter().enumerate() {
            let point = Point::new(line_x_for_y(&edge.line, edge.top), edge.top);
            starts.push(Event::new(point, EventKind::Start(i as EdgeIdx)));
            edges.push(BoEdge {
                edge: *edge,
                deferred: None,
                colinear: None,
            });
        }

        Ok(SweepLine {
            edges,
            queue: PriorityQ::new(starts, compare_by_point),
            active: ActiveList::new(num_edges)?,
            stopped: SmallVec::new(),
            current_y: i32::MIN,
            sink,
            intersections: 0,
            traps: 0,
        })
    }

    fn edges_colinear(&mut self, a: EdgeIdx, b: EdgeIdx) -> bool {
        if let Some((other, p)) = self.edges[a as usize].colinear {
            if other == b {
                return p;
            }
        }
        if let Some((other, p)) = self.edges[b as usize].colinear {
            if other == a {
                self.edges[a as usize].colinear = Some((b, p));
                return p;
            }
        }
        let p = lines_colinear(&self.edges[a as usize].edge, &self.edges[b as usize].edge);
        self.edges[a as usize].colinear = Some((b, p));
        p
    }

    /// Emit the deferred trapezoid of `left`, closed at `bot`.
    fn end_trap(&mut self, left: EdgeIdx, bot: Fixed) -> Result<()> {
        if let Some(trap) = self.edges[left as usize].deferred.take() {
            if trap.top < bot {
                let l = self.edges[left as usize].edge.line;
                let r = self.edges[trap.right as usize].edge.line;
                self.sink.add_trap(trap.top, bot, &l, &r)?;
                self.traps += 1;
            }
        }
        Ok(())
    }

    /// Open a trapezoid between `left` and `right` at `top`, unless the one
    /// already deferred on `left` continues with the same right boundary.
    fn start_or_continue_trap(&mut self, left: EdgeIdx, right: EdgeIdx, top: Fixed) -> Result<()> {
        if let Some(deferred) = self.edges[left as usize].deferred {
            if deferred.right == right {
                return Ok(());
            }
            if self.edges_colinear(deferred.right, right) {
                // Continuation on the right: just swap edges.
                self.edges[left as usize].deferred = Some(DeferredTrap {
                    right,
                    top: deferred.top,
                });
                return Ok(());
            }
            self.end_trap(left, top)?;
        }

        if !self.edges_colinear(left, right) {
            self.edges[left as usize].deferred = Some(DeferredTrap { right, top });
        }
        Ok(())
    }

    fn active_edges_to_traps(&mut self, top: Fixed, mask: i32) -> Result<()> {
        let Some(mut left) = self.active.first() else {
            return Ok(());
        };
        let mut in_out = 0;
        let mut pos = Some(left);
        while let Some(p) = pos {
            if p != left && self.edges[p as usize].deferred.is_some() {
                if self.edges[left as usize].deferred.is_none() && self.edges_colinear(left, p) {
                    // Continuation on the left.
                    self.edges[left as usize].deferred = self.edges[p as usize].deferred.take();
                } else {
                    self.end_trap(p, top)?;
                }
            }

            in_out += self.edges[p as usize].edge.dir;
            let next = self.active.next(p);
            if in_out & mask == 0 {
                // Skip collinear edges.
                let colinear_next = match next {
                    Some(n) => self.edges_colinear(p, n),
                    None => false,
                };
                if !colinear_next {
                    self.start_or_continue_trap(left, p, top)?;
                    if let Some(n) = next {
                        left = n;
                    }
                }
            }
            pos = next;
        }
        Ok(())
    }

    fn flush_stopped(&mut self) -> Result<()> {
        let mut stopped = std::mem::take(&mut self.stopped);
        for &e in &stopped {
            let bottom = self.edges[e as usize].edge.bottom;
            self.end_trap(e, bottom)?;
        }
        stopped.clear();
        self.stopped = stopped;
        Ok(())
    }

    /// Queue the crossing of two neighbours if it lies below the sweep.
    fn insert_if_intersect(&mut self, left: EdgeIdx, right: EdgeIdx) -> Result<()> {
        let a = &self.edges[left as usize].edge;
        let b = &self.edges[right as usize].edge;

        if a.line.p1.x.max(a.line.p2.x) <= b.line.p1.x.min(b.line.p2.x) {
            return Ok(());
        }
        if lines_equal(&a.line, &b.line) {
            return Ok(());
        }
        // Already in slope order: any crossing is above the sweep.
        if slope_compare(&a.line, &b.line) <= 0 {
            return Ok(());
        }
        match edge_intersect(a, b) {
            Some(point) => self.queue.push(point, EventKind::Intersection(left, right)),
            None => Ok(()),
        }
    }

    fn start_edge(&mut self, e1: EdgeIdx) -> Result<()> {
        let edges = &self.edges;
        let y = self.current_y;
        self.active.insert(e1, |a, b| compare_edges(edges, a, b, y));

        let edge = self.edges[e1 as usize].edge;
        let stop = Point::new(line_x_for_y(&edge.line, edge.bottom), edge.bottom);
        self.queue.push(stop, EventKind::Stop(e1))?;

        // A collinear edge that just stopped hands over its trapezoid.
        for i in 0..self.stopped.len() {
            let left = self.stopped[i];
            if edge.top <= self.edges[left as usize].edge.bottom && self.edges_colinear(e1, left) {
                self.stopped.remove(i);
                self.edges[e1 as usize].deferred = self.edges[left as usize].deferred.take();
                break;
            }
        }

        if let Some(left) = self.active.prev(e1) {
            self.insert_if_intersect(left, e1)?;
        }
        if let Some(right) = self.active.next(e1) {
            self.insert_if_intersect(e1, right)?;
        }
        Ok(())
    }

    fn stop_edge(&mut self, e1: EdgeIdx) -> Result<()> {
        let left = self.active.prev(e1);
        let right = self.active.next(e1);
        self.active.delete(e1);

        if self.edges[e1 as usize].deferred.is_some() {
            self.stopped.try_reserve(1)?;
            self.stopped.push(e1);
        }

        if let (Some(left), Some(right)) = (left, right) {
            self.insert_if_intersect(left, right)?;
        }
        Ok(())
    }

    fn cross_edges(&mut self, e1: EdgeIdx, e2: EdgeIdx) -> Result<()> {
        // Stale: the pair stopped being neighbours since it was queued.
        if !self.active.contains(e1) || self.active.next(e1) != Some(e2) {
            return Ok(());
        }
        self.intersections += 1;

        let left = self.active.prev(e1);
        let right = self.active.next(e2);
        self.active.swap(e1, e2);

        // e2 is now left of e1.
        if let Some(left) = left {
            self.insert_if_intersect(left, e2)?;
        }
        if let Some(right) = right {
            self.insert_if_intersect(e1, right)?;
        }
        Ok(())
    }

    /// Process one event. Leaving a row first closes out its trapezoids.
    fn step(&mut self, event: &Event, mask: i32) -> Result<()> {
        if event.point.y != self.current_y {
            self.flush_stopped()?;
            self.active_edges_to_traps(self.current_y, mask)?;
            self.current_y = event.point.y;
        }

        trace!(
            "event: {:?} at ({}, {})",
            event.kind,
            event.point.x,
            event.point.y
        );

        match event.kind {
            EventKind::Start(e1) => self.start_edge(e1),
            EventKind::Stop(e1) => self.stop_edge(e1),
            EventKind::Intersection(e1, e2) => self.cross_edges(e1, e2),
        }
    }

    fn run(&mut self, mask: i32) -> Result<()> {
        while let Some(event) = self.queue.pop() {
            self.step(&event, mask)?;
        }
        self.flush_stopped()
    }
}

/// Tessellate `polygon` under `fill_rule`, appending trapezoids to `sink`.
/// Returns the number of edge crossings the sweep processed.
pub fn tessellate_polygon<S>(polygon: &Polygon, fill_rule: FillRule, sink: &mut S) -> Result<usize>
where
    S: TrapezoidSink + ?Sized,
{
    if polygon.is_empty() {
        return Ok(0);
    }

    let mut sweep = SweepLine::new(polygon, sink)?;
    sweep.run(fill_rule.winding_mask())?;

    debug!(
        "bentley-ottmann: {} edges, {} intersections, {} trapezoids",
        sweep.edges.len(),
        sweep.intersections,
        sweep.traps
    );
    Ok(sweep.intersections)
}

/// Replace `traps` with an equivalent non-overlapping set: the trapezoids
/// are turned back into edges (left side +1, right side -1) and swept
/// again under `fill_rule`.
pub fn tessellate_traps(traps: &mut Traps, fill_rule: FillRule) -> Result<()> {
    if traps.is_empty() {
        return Ok(());
    }

    let mut polygon = Polygon::new();
    for t in traps.iter() {
        polygon.add_line(&t.left, t.top, t.bottom, 1)?;
        polygon.add_line(&t.right, t.top, t.bottom, -1)?;
    }

    traps.clear();
    tessellate_polygon(&polygon, fill_rule, traps)?;
    Ok(())
}
