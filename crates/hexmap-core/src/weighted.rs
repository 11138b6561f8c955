//! Weighted random selection.
//!
//! Candidates carry small integer weights. Drawing picks a candidate with
//! probability proportional to its remaining weight and removes one unit of
//! it, so a candidate of weight 3 can be drawn at most three times.

use rand::rngs::StdRng;
use rand::Rng;

use crate::coords::HexDirection;
use crate::grid::CellId;

/// Draw-without-replacement pool of cells backed by a Fenwick tree.
#[derive(Debug, Clone, Default)]
pub struct WeightedPool {
    items: Vec<CellId>,
    weights: Vec<u32>,
    /// 1-based Fenwick tree of `weights`.
    tree: Vec<u64>,
    total: u64,
}

impl WeightedPool {
    /// Build from `(cell, weight)` pairs; zero weights are skipped.
    pub fn from_weights(entries: impl IntoIterator<Item = (CellId, u32)>) -> Self {
        let (items, weights): (Vec<CellId>, Vec<u32>) =
            entries.into_iter().filter(|&(_, w)| w > 0).unzip();
        let n = items.len();
        let mut tree = vec![0u64; n + 1];
        for (i, &w) in weights.iter().enumerate() {
            let i = i + 1;
            tree[i] += w as u64;
            let parent = i + lowbit(i);
            if parent <= n {
                tree[parent] += tree[i];
            }
        }
        let total = weights.iter().map(|&w| w as u64).sum();
        Self { items, weights, tree, total }
    }

    #[inline]
    pub fn total_weight(&self) -> u64 {
        self.total
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Draw one cell and consume one unit of its weight.
    pub fn take(&mut self, rng: &mut StdRng) -> Option<CellId> {
        if self.total == 0 {
            return None;
        }
        let target = rng.gen_range(0..self.total);
        let slot = self.find(target);
        self.weights[slot] -= 1;
        self.total -= 1;
        let mut i = slot + 1;
        while i < self.tree.len() {
            self.tree[i] -= 1;
            i += lowbit(i);
        }
        Some(self.items[slot])
    }

    /// Zero-based slot whose cumulative weight range contains `target`.
    fn find(&self, mut target: u64) -> usize {
        let n = self.tree.len() - 1;
        let mut pos = 0usize;
        let mut step = if n == 0 { 0 } else { 1usize << (usize::BITS - 1 - n.leading_zeros()) };
        while step > 0 {
            let next = pos + step;
            if next <= n && self.tree[next] <= target {
                pos = next;
                target -= self.tree[next];
            }
            step >>= 1;
        }
        pos
    }
}

#[inline]
fn lowbit(i: usize) -> usize {
    i & i.wrapping_neg()
}

/// Pick a direction with probability proportional to `weights[d]`.
pub fn pick_direction(rng: &mut StdRng, weights: &[u32; 6]) -> Option<HexDirection> {
    let total: u32 = weights.iter().sum();
    if total == 0 {
        return None;
    }
    let mut target = rng.gen_range(0..total);
    for d in HexDirection::ALL {
        let w = weights[d.index()];
        if target < w {
            return Some(d);
        }
        target -= w;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn draws_each_cell_exactly_its_weight() {
        let mut rng = StdRng::seed_from_u64(1);
        let weights = [(10, 1), (11, 0), (12, 4), (13, 2), (14, 3)];
        let mut pool = WeightedPool::from_weights(weights);
        assert_eq!(pool.total_weight(), 10);

        let mut seen = std::collections::HashMap::new();
        while let Some(id) = pool.take(&mut rng) {
            *seen.entry(id).or_insert(0u32) += 1;
        }
        assert!(pool.is_empty());
        for (id, w) in weights {
            assert_eq!(seen.get(&id).copied().unwrap_or(0), w, "cell {id}");
        }
    }

    #[test]
    fn heavier_cells_are_drawn_first_more_often() {
        let mut heavy_first = 0;
        for seed in 0..400 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut pool = WeightedPool::from_weights([(0, 1), (1, 3)]);
            if pool.take(&mut rng) == Some(1) {
                heavy_first += 1;
            }
        }
        // Expected 300 of 400.
        assert!((250..=350).contains(&heavy_first), "heavy drawn first {heavy_first}/400");
    }

    #[test]
    fn empty_pool_yields_nothing() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut pool = WeightedPool::from_weights(std::iter::empty());
        assert_eq!(pool.take(&mut rng), None);
    }

    #[test]
    fn pick_direction_skips_zero_weights() {
        let mut rng = StdRng::seed_from_u64(3);
        let weights = [0, 0, 5, 0, 0, 0];
        for _ in 0..20 {
            assert_eq!(pick_direction(&mut rng, &weights), Some(HexDirection::SE));
        }
        assert_eq!(pick_direction(&mut rng, &[0; 6]), None);
    }
}
