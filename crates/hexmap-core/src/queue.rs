//! Bucket priority queue over grid cells.
//!
//! Buckets are indexed by priority and chained through each cell's
//! `next_with_same_priority` link, so the queue itself owns no per-cell
//! storage. Priorities are small non-negative integers (hex distances plus a
//! tiny heuristic), which keeps the bucket array short.

use crate::grid::{CellId, HexGrid};

#[derive(Debug, Clone)]
pub struct CellPriorityQueue {
    buckets: Vec<Option<CellId>>,
    minimum: usize,
    count: usize,
}

impl CellPriorityQueue {
    pub fn new() -> Self {
        Self { buckets: Vec::new(), minimum: usize::MAX, count: 0 }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Push `id` at the head of the bucket for its current priority.
    pub fn enqueue(&mut self, grid: &mut HexGrid, id: CellId) {
        self.count += 1;
        let priority = grid.search(id).priority() as usize;
        if priority < self.minimum {
            self.minimum = priority;
        }
        if priority >= self.buckets.len() {
            self.buckets.resize(priority + 1, None);
        }
        grid.search_mut(id).next_with_same_priority = self.buckets[priority];
        self.buckets[priority] = Some(id);
    }

    /// Pop a cell with the lowest priority, most recently enqueued first.
    pub fn dequeue(&mut self, grid: &mut HexGrid) -> Option<CellId> {
        while self.minimum < self.buckets.len() {
            if let Some(id) = self.buckets[self.minimum] {
                self.buckets[self.minimum] = grid.search(id).next_with_same_priority;
                grid.search_mut(id).next_with_same_priority = None;
                self.count -= 1;
                return Some(id);
            }
            self.minimum += 1;
        }
        None
    }

    /// Move `id` from the bucket for `old_priority` to its current priority.
    pub fn change_priority(&mut self, grid: &mut HexGrid, id: CellId, old_priority: u32) {
        let old = old_priority as usize;
        let Some(head) = self.buckets.get(old).copied().flatten() else {
            return;
        };
        if head == id {
            self.buckets[old] = grid.search(id).next_with_same_priority;
        } else {
            let mut current = head;
            loop {
                match grid.search(current).next_with_same_priority {
                    Some(next) if next == id => {
                        let after = grid.search(id).next_with_same_priority;
                        grid.search_mut(current).next_with_same_priority = after;
                        break;
                    }
                    Some(next) => current = next,
                    // Not in this bucket: nothing to unlink.
                    None => return,
                }
            }
        }
        self.enqueue(grid, id);
        self.count -= 1;
    }

    /// Empty the queue, keeping the bucket allocation for reuse.
    pub fn clear(&mut self) {
        self.buckets.clear();
        self.count = 0;
        self.minimum = usize::MAX;
    }
}

impl Default for CellPriorityQueue {
    fn default() -> Self {
        Self::new()
    }
}
