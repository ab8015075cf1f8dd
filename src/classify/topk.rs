//! Top-K tracking for ranked matches.

use std::cmp::Ordering;

/// Scored item with its encounter position.
#[derive(Clone, Debug)]
struct Ranked<T> {
    score: f32,
    seq: usize,
    item: T,
}

/// Higher score first; on equal scores the earlier item wins.
fn ranked_cmp_desc<T>(a: &Ranked<T>, b: &Ranked<T>) -> Ordering {
    b.score.total_cmp(&a.score).then_with(|| a.seq.cmp(&b.seq))
}

/// Top-K container with O(k) insertion cost.
pub(crate) struct TopK<T> {
    k: usize,
    seq: usize,
    items: Vec<Ranked<T>>,
}

impl<T> TopK<T> {
    pub(crate) fn new(k: usize) -> Self {
        Self {
            k,
            seq: 0,
            items: Vec::with_capacity(k),
        }
    }

    /// Offers an item, evicting the current worst if at capacity.
    pub(crate) fn push(&mut self, score: f32, item: T) {
        let entry = Ranked {
            score,
            seq: self.seq,
            item,
        };
        self.seq += 1;
        if self.k == 0 {
            return;
        }
        if self.items.len() < self.k {
            self.items.push(entry);
            return;
        }

        let mut worst_idx = 0usize;
        for (idx, ranked) in self.items.iter().enumerate().skip(1) {
            if ranked_cmp_desc(ranked, &self.items[worst_idx]) == Ordering::Greater {
                worst_idx = idx;
            }
        }
        if ranked_cmp_desc(&entry, &self.items[worst_idx]) == Ordering::Less {
            self.items[worst_idx] = entry;
        }
    }

    /// Items sorted best first.
    pub(crate) fn into_sorted_desc(mut self) -> Vec<T> {
        self.items.sort_by(ranked_cmp_desc);
        self.items.into_iter().map(|r| r.item).collect()
    }
}
