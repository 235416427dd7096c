// Copyright 2025 Lars Brubaker
// License: MIT
//
// The sweep line's active list: edges currently crossing the sweep, kept
// ordered left to right.
//
// Edges are addressed by their index in the engine's edge array; the list
// stores one link record per edge plus a head sentinel, so insertion,
// deletion and adjacent swaps are O(1) once the position is known. An
// insertion cursor remembers the last insertion point because new edges
// tend to start near each other.

use crate::error::Result;
use crate::priorityq::EdgeIdx;

type NodeIdx = u32;

/// Link index of the head sentinel. Edge `e` lives at link `e + 1`.
const LIST_HEAD: NodeIdx = 0;
const UNLINKED: NodeIdx = u32::MAX;

#[derive(Clone, Copy, Debug)]
struct Link {
    next: NodeIdx,
    prev: NodeIdx,
}

const DETACHED: Link = Link {
    next: UNLINKED,
    prev: UNLINKED,
};

pub struct ActiveList {
    links: Vec<Link>,
    cursor: NodeIdx,
    len: usize,
}

#[inline]
fn node_of(edge: EdgeIdx) -> NodeIdx {
    edge + 1
}

#[inline]
fn edge_of(node: NodeIdx) -> Option<EdgeIdx> {
    if node == LIST_HEAD {
        None
    } else {
        Some(node - 1)
    }
}

impl ActiveList {
    /// An empty list able to hold edges `0..num_edges`.
    pub fn new(num_edges: usize) -> Result<Self> {
        let mut links = Vec::new();
        links.try_reserve_exact(num_edges + 1)?;
        links.push(Link {
            next: LIST_HEAD,
            prev: LIST_HEAD,
        });
        links.resize(num_edges + 1, DETACHED);
        Ok(ActiveList {
            links,
            cursor: LIST_HEAD,
            len: 0,
        })
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn first(&self) -> Option<EdgeIdx> {
        edge_of(self.links[LIST_HEAD as usize].next)
    }

    #[inline]
    pub fn last(&self) -> Option<EdgeIdx> {
        edge_of(self.links[LIST_HEAD as usize].prev)
    }

    #[inline]
    pub fn next(&self, edge: EdgeIdx) -> Option<EdgeIdx> {
        edge_of(self.links[node_of(edge) as usize].next)
    }

    #[inline]
    pub fn prev(&self, edge: EdgeIdx) -> Option<EdgeIdx> {
        edge_of(self.links[node_of(edge) as usize].prev)
    }

    /// Whether `edge` is currently in the list.
    #[inline]
    pub fn contains(&self, edge: EdgeIdx) -> bool {
        self.links[node_of(edge) as usize].next != UNLINKED
    }

    /// Edges from left to right.
    pub fn iter(&self) -> impl Iterator<Item = EdgeIdx> + '_ {
        std::iter::successors(self.first(), move |&e| self.next(e))
    }

    fn link_after(&mut self, pos: NodeIdx, node: NodeIdx) {
        let next = self.links[pos as usize].next;
        self.links[node as usize] = Link { next, prev: pos };
        self.links[next as usize].prev = node;
        self.links[pos as usize].next = node;
    }

    /// Insert `edge` in order. `cmp(a, b)` returns the sign of `a - b` at the
    /// current sweep position. The search starts from the cursor; equal
    /// edges are placed after the existing one.
    pub fn insert<F>(&mut self, edge: EdgeIdx, mut cmp: F)
    where
        F: FnMut(EdgeIdx, EdgeIdx) -> i32,
    {
        debug_assert!(!self.contains(edge));
        let mut pos = self.cursor;
        if pos == LIST_HEAD {
            pos = self.links[LIST_HEAD as usize].next;
        }

        if let Some(at) = edge_of(pos) {
            let c = cmp(at, edge);
            if c < 0 {
                loop {
                    let next = self.links[pos as usize].next;
                    match edge_of(next) {
                        Some(n) if cmp(n, edge) < 0 => pos = next,
                        _ => break,
                    }
                }
            } else if c > 0 {
                loop {
                    pos = self.links[pos as usize].prev;
                    match edge_of(pos) {
                        Some(p) if cmp(p, edge) > 0 => {}
                        _ => break,
                    }
                }
            }
        }

        let node = node_of(edge);
        self.link_after(pos, node);
        self.cursor = node;
        self.len += 1;
    }

    /// Link `edge` directly after `pos` (or at the front for `None`) without
    /// comparing.
    pub fn insert_after(&mut self, pos: Option<EdgeIdx>, edge: EdgeIdx) {
        debug_assert!(!self.contains(edge));
        let at = pos.map_or(LIST_HEAD, node_of);
        self.link_after(at, node_of(edge));
        self.len += 1;
    }

    pub fn delete(&mut self, edge: EdgeIdx) {
        let node = node_of(edge);
        let Link { next, prev } = self.links[node as usize];
        debug_assert!(next != UNLINKED, "edge {} is not active", edge);
        if self.cursor == node {
            self.cursor = if prev != LIST_HEAD { prev } else { next };
        }
        self.links[prev as usize].next = next;
        self.links[next as usize].prev = prev;
        self.links[node as usize] = DETACHED;
        self.len -= 1;
    }

    /// Exchange two adjacent edges; `left` must directly precede `right`.
    pub fn swap(&mut self, left: EdgeIdx, right: EdgeIdx) {
        let l = node_of(left);
        let r = node_of(right);
        debug_assert_eq!(self.links[l as usize].next, r);
        let prev = self.links[l as usize].prev;
        let next = self.links[r as usize].next;

        self.links[prev as usize].next = r;
        self.links[r as usize] = Link { next: l, prev };
        self.links[l as usize] = Link { next, prev: r };
        self.links[next as usize].prev = l;
    }
}
