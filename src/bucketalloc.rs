// Copyright 2025 Lars Brubaker
// License: MIT
//
// Fixed-size node pool used for coverage cells and sub-row runs.
//
// Nodes live inline for the first N allocations and spill to the heap
// after that. Individual nodes can be returned to a free list, and the
// whole pool can be emptied at once between rows.

use std::ops::{Index, IndexMut};

use smallvec::SmallVec;

use crate::error::Result;

/// A pool of `T` addressed by `u32` indices.
pub struct BucketAlloc<T, const N: usize = 16> {
    items: SmallVec<[T; N]>,
    free_list: SmallVec<[u32; N]>,
}

impl<T, const N: usize> BucketAlloc<T, N> {
    pub fn new() -> Self {
        Self {
            items: SmallVec::new(),
            free_list: SmallVec::new(),
        }
    }

    /// Store `value`, returning its index.
    pub fn alloc(&mut self, value: T) -> Result<u32> {
        if let Some(idx) = self.free_list.pop() {
            self.items[idx as usize] = value;
            return Ok(idx);
        }
        if self.items.len() == self.items.capacity() {
            self.items.try_reserve(1)?;
        }
        let idx = self.items.len() as u32;
        self.items.push(value);
        Ok(idx)
    }

    /// Return a node to the free list. Its slot keeps the stale value until
    /// reused.
    pub fn free(&mut self, idx: u32) -> Result<()> {
        debug_assert!((idx as usize) < self.items.len());
        if self.free_list.len() == self.free_list.capacity() {
            self.free_list.try_reserve(1)?;
        }
        self.free_list.push(idx);
        Ok(())
    }

    /// Drop every node at once. Capacity is kept for the next row.
    pub fn reset(&mut self) {
        self.items.clear();
        self.free_list.clear();
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.items.len() - self.free_list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the pool has outgrown its inline storage.
    pub fn spilled(&self) -> bool {
        self.items.spilled()
    }
}

impl<T, const N: usize> Default for BucketAlloc<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, const N: usize> Index<u32> for BucketAlloc<T, N> {
    type Output = T;

    #[inline]
    fn index(&self, idx: u32) -> &T {
        &self.items[idx as usize]
    }
}

impl<T, const N: usize> IndexMut<u32> for BucketAlloc<T, N> {
    #[inline]
    fn index_mut(&mut self, idx: u32) -> &mut T {
        &mut self.items[idx as usize]
    }
}
