// Copyright 2025 Lars Brubaker
// License: MIT
//
// Event queue for the sweep.
//
// Two sources are merged:
//   - START events, known before the sweep begins, sorted once into a flat
//     array and consumed front to back;
//   - events discovered while sweeping (STOP, INTERSECTION), kept in a
//     binary min-heap.
// Each dequeue takes whichever source has the smaller head, preferring the
// START array on ties.

use std::cmp::Ordering;

use smallvec::SmallVec;

use crate::error::Result;
use crate::fixed::Point;

/// Index of an edge in the engine's edge array.
pub type EdgeIdx = u32;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventKind {
    Stop(EdgeIdx),
    /// Two edges, left then right in the active list at discovery time.
    Intersection(EdgeIdx, EdgeIdx),
    Start(EdgeIdx),
}

impl EventKind {
    /// Processing order of kinds at the same point.
    #[inline]
    fn rank(&self) -> u8 {
        match self {
            EventKind::Stop(_) => 0,
            EventKind::Intersection(..) => 1,
            EventKind::Start(_) => 2,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Event {
    pub point: Point,
    /// Insertion identity, assigned by the queue.
    pub seq: u32,
    pub kind: EventKind,
}

impl Event {
    pub fn new(point: Point, kind: EventKind) -> Self {
        Event {
            point,
            seq: 0,
            kind,
        }
    }
}

pub type EventCompare = fn(&Event, &Event) -> Ordering;

/// Orders by sweep row only.
pub fn compare_by_y(a: &Event, b: &Event) -> Ordering {
    a.point.y.cmp(&b.point.y)
}

/// Orders by point (y then x), then kind, then insertion identity. Gives a
/// total order.
pub fn compare_by_point(a: &Event, b: &Event) -> Ordering {
    a.point
        .y
        .cmp(&b.point.y)
        .then(a.point.x.cmp(&b.point.x))
        .then(a.kind.rank().cmp(&b.kind.rank()))
        .then(a.seq.cmp(&b.seq))
}

/// A binary min-heap of events.
struct Heap {
    elements: SmallVec<[Event; 32]>,
    cmp: EventCompare,
}

impl Heap {
    fn new(cmp: EventCompare) -> Self {
        Heap {
            elements: SmallVec::new(),
            cmp,
        }
    }

    #[inline]
    fn less(&self, i: usize, j: usize) -> bool {
        (self.cmp)(&self.elements[i], &self.elements[j]) == Ordering::Less
    }

    fn float_up(&mut self, mut curr: usize) {
        while curr > 0 {
            let parent = (curr - 1) >> 1;
            if !self.less(curr, parent) {
                break;
            }
            self.elements.swap(curr, parent);
            curr = parent;
        }
    }

    fn float_down(&mut self, mut curr: usize) {
        let size = self.elements.len();
        loop {
            let mut child = 2 * curr + 1;
            if child >= size {
                break;
            }
            if child + 1 < size && self.less(child + 1, child) {
                child += 1;
            }
            if !self.less(child, curr) {
                break;
            }
            self.elements.swap(curr, child);
            curr = child;
        }
    }

    fn push(&mut self, event: Event) -> Result<()> {
        if self.elements.len() == self.elements.capacity() {
            // SmallVec rounds up to the next power of two: capacity doubles.
            self.elements.try_reserve(1)?;
        }
        self.elements.push(event);
        let last = self.elements.len() - 1;
        self.float_up(last);
        Ok(())
    }

    fn pop(&mut self) -> Option<Event> {
        if self.elements.is_empty() {
            return None;
        }
        let min = self.elements.swap_remove(0);
        if !self.elements.is_empty() {
            self.float_down(0);
        }
        Some(min)
    }

    #[inline]
    fn peek(&self) -> Option<&Event> {
        self.elements.first()
    }

    #[inline]
    fn len(&self) -> usize {
        self.elements.len()
    }
}

/// The combined queue (sorted START array + heap).
pub struct PriorityQ {
    heap: Heap,
    starts: Vec<Event>,
    next_start: usize,
    next_seq: u32,
    cmp: EventCompare,
}

impl PriorityQ {
    /// Sort `starts` once and prepare an empty heap.
    pub fn new(mut starts: Vec<Event>, cmp: EventCompare) -> Self {
        for (i, event) in starts.iter_mut().enumerate() {
            event.seq = i as u32;
        }
        starts.sort_unstable_by(cmp);
        let next_seq = starts.len() as u32;
        PriorityQ {
            heap: Heap::new(cmp),
            starts,
            next_start: 0,
            next_seq,
            cmp,
        }
    }

    /// Schedule an event discovered during the sweep.
    pub fn push(&mut self, point: Point, kind: EventKind) -> Result<()> {
        let seq = self.next_seq;
        self.next_seq = self.next_seq.wrapping_add(1);
        self.heap.push(Event { point, seq, kind })
    }

    /// Peek at the next event without removing it.
    pub fn peek(&self) -> Option<&Event> {
        match (self.starts.get(self.next_start), self.heap.peek()) {
            (Some(s), Some(h)) if (self.cmp)(s, h) == Ordering::Greater => Some(h),
            (Some(s), _) => Some(s),
            (None, h) => h,
        }
    }

    /// Remove and return the next event in sweep order.
    pub fn pop(&mut self) -> Option<Event> {
        match (self.starts.get(self.next_start), self.heap.peek()) {
            (Some(s), Some(h)) if (self.cmp)(s, h) == Ordering::Greater => self.heap.pop(),
            (Some(&s), _) => {
                self.next_start += 1;
                Some(s)
            }
            (None, _) => self.heap.pop(),
        }
    }

    pub fn len(&self) -> usize {
        self.starts.len() - self.next_start + self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
