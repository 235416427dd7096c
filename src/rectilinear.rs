// Copyright 2025 Lars Brubaker
// License: MIT
//
// Trapezoid extraction for polygons made only of vertical edges.
//
// Vertical edges never cross, so every event is known up front: START and
// STOP events are sorted once and consumed in order, with no heap and no
// intersection tests. Edges are ordered by their x alone.

use std::cmp::Ordering;

use log::debug;

use crate::bentley_ottmann::DeferredTrap;
use crate::dict::ActiveList;
use crate::error::{Error, Result};
use crate::fixed::{Edge, Fixed, Point};
use crate::polygon::Polygon;
use crate::priorityq::{EdgeIdx, Event, EventKind, PriorityQ};
use crate::traps::{Boxes, TrapezoidSink, Traps};
use crate::wideint::ordering_sign;
use crate::FillRule;

struct RectEdge {
    edge: Edge,
    deferred: Option<DeferredTrap>,
}

/// Point order; at equal points START precedes STOP.
fn compare_events(a: &Event, b: &Event) -> Ordering {
    fn rank(e: &Event) -> u8 {
        match e.kind {
            EventKind::Start(_) => 0,
            _ => 1,
        }
    }
    a.point
        .y
        .cmp(&b.point.y)
        .then(a.point.x.cmp(&b.point.x))
        .then(rank(a).cmp(&rank(b)))
        .then(a.seq.cmp(&b.seq))
}

struct SweepLine<'s, S: TrapezoidSink + ?Sized> {
    edges: Vec<RectEdge>,
    queue: PriorityQ,
    active: ActiveList,
    current_y: Fixed,
    sink: &'s mut S,
    traps: usize,
}

impl<'s, S: TrapezoidSink + ?Sized> SweepLine<'s, S> {
    fn new(polygon: &Polygon, sink: &'s mut S) -> Result<Self> {
        let num_edges = polygon.num_edges();
        let mut edges = Vec::new();
        edges.try_reserve_exact(num_edges)?;
        let mut events = Vec::new();
        events.try_reserve_exact(2 * num_edges)?;

        for (i, edge) in polygon.edges().iter().enumerate() {
            let x = edge.line.p1.x;
            events.push(Event::new(Point::new(x, edge.top), EventKind::Start(i as EdgeIdx)));
            events.push(Event::new(Point::new(x, edge.bottom), EventKind::Stop(i as EdgeIdx)));
            edges.push(RectEdge {
                edge: *edge,
                deferred: None,
            });
        }

        Ok(SweepLine {
            edges,
            queue: PriorityQ::new(events, compare_events),
            active: ActiveList::new(num_edges)?,
            current_y: i32::MIN,
            sink,
            traps: 0,
        })
    }

    #[inline]
    fn x(&self, e: EdgeIdx) -> Fixed {
        self.edges[e as usize].edge.line.p1.x
    }

    #[inline]
    fn colinear(&self, a: EdgeIdx, b: EdgeIdx) -> bool {
        self.x(a) == self.x(b)
    }

    #[inline]
    fn has_trap(&self, e: EdgeIdx) -> bool {
        self.edges[e as usize].deferred.is_some()
    }

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

    /// `right` is `None` when the winding never closed; any deferred
    /// trapezoid on `left` is then ended.
    fn start_or_continue_trap(
        &mut self,
        left: EdgeIdx,
        right: Option<EdgeIdx>,
        top: Fixed,
    ) -> Result<()> {
        match self.edges[left as usize].deferred {
            Some(deferred) => {
                if Some(deferred.right) == right {
                    return Ok(());
                }
                if let Some(r) = right {
                    if self.colinear(deferred.right, r) {
                        self.edges[left as usize].deferred = Some(DeferredTrap {
                            right: r,
                            top: deferred.top,
                        });
                        return Ok(());
                    }
                }
                self.end_trap(left, top)?;
            }
            None if right.is_none() => return Ok(()),
            None => {}
        }

        if let Some(r) = right {
            if !self.colinear(left, r) {
                self.edges[left as usize].deferred = Some(DeferredTrap { right: r, top });
            }
        }
        Ok(())
    }

    fn nonzero_to_traps(&mut self, top: Fixed) -> Result<()> {
        let mut left = self.active.first();
        while let Some(l) = left {
            let mut in_out = self.edges[l as usize].edge.dir;

            // A later edge on the same x may already own a trapezoid.
            if !self.has_trap(l) {
                let mut right = self.active.next(l);
                while let Some(r) = right {
                    if self.has_trap(r) {
                        break;
                    }
                    right = self.active.next(r);
                }
                if let Some(r) = right {
                    if self.colinear(l, r) {
                        self.edges[l as usize].deferred = self.edges[r as usize].deferred.take();
                    }
                }
            }

            // Greedily find the closing edge, ending subsumed traps.
            let mut right = self.active.next(l);
            while let Some(r) = right {
                if self.has_trap(r) {
                    self.end_trap(r, top)?;
                }
                in_out += self.edges[r as usize].edge.dir;
                let next = self.active.next(r);
                if in_out == 0 && next.map_or(true, |n| !self.colinear(r, n)) {
                    break;
                }
                right = next;
            }

            self.start_or_continue_trap(l, right, top)?;
            left = right.and_then(|r| self.active.next(r));
        }
        Ok(())
    }

    fn evenodd_to_traps(&mut self, top: Fixed) -> Result<()> {
        let mut left = self.active.first();
        while let Some(l) = left {
            let mut in_out = 0;
            let mut right = self.active.next(l);
            while let Some(r) = right {
                if self.has_trap(r) {
                    self.end_trap(r, top)?;
                }
                let closing = in_out & 1 == 0;
                in_out += 1;
                let next = self.active.next(r);
                if closing && next.map_or(true, |n| !self.colinear(r, n)) {
                    break;
                }
                right = next;
            }

            self.start_or_continue_trap(l, right, top)?;
            left = right.and_then(|r| self.active.next(r));
        }
        Ok(())
    }

    fn run(&mut self, fill_rule: FillRule) -> Result<()> {
        while let Some(event) = self.queue.pop() {
            if event.point.y != self.current_y {
                match fill_rule {
                    FillRule::NonZero => self.nonzero_to_traps(self.current_y)?,
                    FillRule::EvenOdd => self.evenodd_to_traps(self.current_y)?,
                }
                self.current_y = event.point.y;
            }

            match event.kind {
                EventKind::Start(e) => {
                    let edges = &self.edges;
                    self.active.insert(e, |a, b| {
                        let (ea, eb) = (&edges[a as usize].edge, &edges[b as usize].edge);
                        match ea.line.p1.x.cmp(&eb.line.p1.x) {
                            Ordering::Equal => ordering_sign(eb.bottom.cmp(&ea.bottom)),
                            o => ordering_sign(o),
                        }
                    });
                }
                EventKind::Stop(e) => {
                    self.active.delete(e);
                    self.end_trap(e, self.current_y)?;
                }
                EventKind::Intersection(..) => {
                    unreachable!("vertical edges never queue a crossing")
                }
            }
        }
        Ok(())
    }
}

/// Tessellate a polygon whose edges are all vertical into trapezoids (or
/// boxes, depending on `sink`).
pub fn tessellate_rectilinear_polygon<S>(
    polygon: &Polygon,
    fill_rule: FillRule,
    sink: &mut S,
) -> Result<()>
where
    S: TrapezoidSink + ?Sized,
{
    if !polygon.is_rectilinear() {
        return Err(Error::NotRectilinear);
    }
    if polygon.is_empty() {
        return Ok(());
    }

    let mut sweep = SweepLine::new(polygon, sink)?;
    sweep.run(fill_rule)?;
    debug!(
        "rectilinear: {} edges, {} trapezoids",
        sweep.edges.len(),
        sweep.traps
    );
    Ok(())
}

/// Replace a set of axis-aligned trapezoids with a non-overlapping one.
pub fn tessellate_rectilinear_traps(traps: &mut Traps, fill_rule: FillRule) -> Result<()> {
    if traps.is_empty() {
        return Ok(());
    }
    if !traps.is_rectilinear() {
        return Err(Error::NotRectilinear);
    }

    let mut polygon = Polygon::new();
    for t in traps.iter() {
        polygon.add_line(&t.left, t.top, t.bottom, 1)?;
        polygon.add_line(&t.right, t.top, t.bottom, -1)?;
    }

    traps.clear();
    tessellate_rectilinear_polygon(&polygon, fill_rule, traps)
}

/// Replace a set of boxes with the non-overlapping boxes covering the
/// region selected by `fill_rule`.
pub fn tessellate_rectilinear_boxes(boxes: &mut Boxes, fill_rule: FillRule) -> Result<()> {
    if boxes.is_empty() {
        return Ok(());
    }

    let polygon = Polygon::from_boxes(boxes.as_slice())?;
    boxes.clear();
    tessellate_rectilinear_polygon(&polygon, fill_rule, boxes)
}
