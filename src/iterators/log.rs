use crate::core::store::CounterStore;
use crate::iterators::{HistogramIterator, PickMetadata, PickyIterator};
use crate::Histogram;

/// An iterator that will yield at geometrically growing steps through the histogram's value
/// range.
///
/// Step `n` ends at `first_step_width * factor^n - 1`. The exact boundary is tracked as a float so
/// that fractional factors accumulate without drift; the reported boundary is its integer part.
pub struct Iter<'a, S: 'a + CounterStore> {
    hist: &'a Histogram<S>,

    // > 1.0
    factor: f64,
    // exclusive upper bound of the current step, before truncation
    step_end: f64,

    // highest value reported for the current step
    reporting_level: u64,
    // lowest value equivalent to `reporting_level`; reaching its slot closes the step
    reporting_slot_floor: u64,
}

impl<'a, S: 'a + CounterStore> Iter<'a, S> {
    /// Construct a new logarithmic iterator. See `Histogram::iter_log` for details.
    pub fn new(
        hist: &'a Histogram<S>,
        first_step_width: u64,
        factor: f64,
    ) -> HistogramIterator<'a, S, Iter<'a, S>> {
        assert!(first_step_width > 0, "first_step_width must be > 0");
        assert!(factor > 1.0, "factor must be > 1.0");

        let mut picker = Iter {
            hist,
            factor,
            step_end: first_step_width as f64,
            reporting_level: 0,
            reporting_slot_floor: 0,
        };
        picker.set_reporting_level(first_step_width - 1);
        HistogramIterator::new(hist, picker)
    }

    fn set_reporting_level(&mut self, level: u64) {
        self.reporting_level = level;
        self.reporting_slot_floor = self.hist.lowest_equivalent(level);
    }
}

impl<'a, S: 'a + CounterStore> PickyIterator for Iter<'a, S> {
    fn pick(&mut self, index: usize, _: u64, _: u64) -> Option<PickMetadata> {
        let at_step_end = self.hist.value_for(index) >= self.reporting_slot_floor;
        if !at_step_end && index != self.hist.last_index() {
            return None;
        }

        let metadata = PickMetadata::new(None, Some(self.reporting_level));
        self.step_end *= self.factor;
        // float to int casts saturate, and step_end only grows from >= 1.0
        self.set_reporting_level((self.step_end as u64).saturating_sub(1));
        Some(metadata)
    }

    fn more(&mut self, index_to_pick: usize) -> bool {
        // keep stepping over the empty tail until the next step would start past the slot we are
        // on, so the step covering the last recorded value is always reported
        !self.hist.is_empty()
            && self.hist.lowest_equivalent(self.step_end as u64)
                < self.hist.value_for(index_to_pick)
    }
}
