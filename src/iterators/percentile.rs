use crate::core::store::CounterStore;
use crate::iterators::{HistogramIterator, PickMetadata, PickyIterator};
use crate::Histogram;

/// An iterator that will yield at percentile steps through the histogram's value range.
pub struct Iter<'a, S: 'a + CounterStore> {
    hist: &'a Histogram<S>,

    ticks_per_half_distance: u32,
    percentile_to_iterate_to: f64,
    reached_end: bool,
    // the 100% step has been yielded
    done: bool,
}

impl<'a, S: 'a + CounterStore> Iter<'a, S> {
    /// Construct a new percentile iterator. See `Histogram::iter_percentiles` for details.
    pub fn new(
        hist: &'a Histogram<S>,
        ticks_per_half_distance: u32,
    ) -> HistogramIterator<'a, S, Iter<'a, S>> {
        assert!(
            ticks_per_half_distance > 0,
            "Ticks per half distance must be > 0"
        );

        HistogramIterator::new(
            hist,
            Iter {
                hist,
                ticks_per_half_distance,
                percentile_to_iterate_to: 0.0,
                reached_end: false,
                done: false,
            },
        )
    }

    /// The level after `level`: a fixed tick size for each half of the remaining distance to 100%.
    fn next_level(&self, level: f64) -> f64 {
        // 0 below 50%, 1 below 75%, 2 below 87.5%, and so on
        let halvings = (100.0 / (100.0 - level)).log2().floor();
        let ticks = f64::from(self.ticks_per_half_distance) * 2_f64.powi(halvings as i32 + 1);
        let next = level + 100.0 / ticks;
        if next <= level || next >= 100.0 || !next.is_finite() {
            100.0
        } else {
            next
        }
    }
}

impl<'a, S: 'a + CounterStore> PickyIterator for Iter<'a, S> {
    fn pick(&mut self, _: usize, running_total: u64, count_at_index: u64) -> Option<PickMetadata> {
        if self.done || count_at_index == 0 {
            return None;
        }

        let current = 100.0 * running_total as f64 / self.hist.len() as f64;
        if current < self.percentile_to_iterate_to {
            return None;
        }

        let metadata = PickMetadata::new(Some(self.percentile_to_iterate_to), None);
        if self.percentile_to_iterate_to < 100.0 {
            self.percentile_to_iterate_to = self.next_level(self.percentile_to_iterate_to);
        } else {
            // only the final step sits at 100%
            self.reached_end = true;
            self.done = true;
        }
        Some(metadata)
    }

    fn more(&mut self, _: usize) -> bool {
        // We want one additional last step to 100%
        if !self.reached_end && !self.hist.is_empty() {
            self.percentile_to_iterate_to = 100.0;
            self.reached_end = true;
            true
        } else {
            false
        }
    }
}
