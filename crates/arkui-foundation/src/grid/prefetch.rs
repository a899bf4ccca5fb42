//! Items to create ahead of the visible window.
//!
//! After each committed scrollable frame the grid asks for `cachedCount`
//! lines past the window on the side it is scrolling toward.

use std::collections::BTreeSet;

/// How many items beyond the window the host should keep ready.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PrefetchStrategy {
    pub cached_lines: i32,
    pub cross_count: i32,
}

impl PrefetchStrategy {
    pub fn for_grid(cached_lines: i32, cross_count: i32) -> Self {
        Self {
            cached_lines: cached_lines.max(0),
            cross_count: cross_count.max(1),
        }
    }

    pub fn item_count(&self) -> i32 {
        self.cached_lines * self.cross_count
    }
}

#[derive(Debug, Default)]
pub struct PrefetchScheduler {
    pending: Vec<i32>,
    requested: BTreeSet<i32>,
}

impl PrefetchScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues the items next to the window `[start, end]`. `forward` looks
    /// past `end`, otherwise before `start`. Items already handed out are
    /// skipped until they drift away from the window.
    pub fn update(
        &mut self,
        start: i32,
        end: i32,
        children_count: i32,
        forward: bool,
        strategy: PrefetchStrategy,
    ) {
        let count = strategy.item_count();
        let keep = count * 2;
        self.requested
            .retain(|index| *index >= start - keep && *index <= end + keep);

        let range = if forward {
            (end + 1)..(end + 1 + count).min(children_count)
        } else {
            (start - count).max(0)..start
        };
        self.pending = range
            .filter(|index| !self.requested.contains(index))
            .collect();
        if !forward {
            // Nearest first.
            self.pending.reverse();
        }
        log::trace!(
            "grid prefetch window [{start}, {end}] forward={forward}: {:?}",
            self.pending
        );
    }

    pub fn pending(&self) -> &[i32] {
        &self.pending
    }

    pub fn take(&mut self) -> Vec<i32> {
        let taken = std::mem::take(&mut self.pending);
        self.requested.extend(taken.iter().copied());
        taken
    }

    pub fn reset(&mut self) {
        self.pending.clear();
        self.requested.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_scroll_queues_the_next_lines() {
        let mut scheduler = PrefetchScheduler::new();
        scheduler.update(0, 11, 100, true, PrefetchStrategy::for_grid(1, 3));
        assert_eq!(scheduler.pending(), &[12, 13, 14]);
    }

    #[test]
    fn backward_scroll_queues_nearest_first() {
        let mut scheduler = PrefetchScheduler::new();
        scheduler.update(3, 11, 100, false, PrefetchStrategy::for_grid(2, 2));
        assert_eq!(scheduler.take(), vec![2, 1, 0]);
    }

    #[test]
    fn end_of_data_bounds_the_queue() {
        let mut scheduler = PrefetchScheduler::new();
        scheduler.update(90, 99, 100, true, PrefetchStrategy::for_grid(2, 2));
        assert!(scheduler.pending().is_empty());
    }

    #[test]
    fn taken_items_are_not_queued_again_until_they_drift_away() {
        let mut scheduler = PrefetchScheduler::new();
        let strategy = PrefetchStrategy::for_grid(1, 2);
        scheduler.update(0, 5, 100, true, strategy);
        assert_eq!(scheduler.take(), vec![6, 7]);
        scheduler.update(0, 6, 100, true, strategy);
        assert_eq!(scheduler.take(), vec![8]);

        scheduler.update(50, 60, 100, true, strategy);
        scheduler.update(0, 5, 100, true, strategy);
        assert_eq!(scheduler.take(), vec![6, 7]);
    }

    #[test]
    fn zero_cached_count_queues_nothing() {
        let mut scheduler = PrefetchScheduler::new();
        scheduler.update(5, 10, 100, true, PrefetchStrategy::for_grid(0, 4));
        assert!(scheduler.take().is_empty());
    }
}
