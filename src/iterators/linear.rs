use crate::core::store::CounterStore;
use crate::iterators::{HistogramIterator, PickMetadata, PickyIterator};
use crate::Histogram;

/// An iterator that will yield at fixed-size steps through the histogram's value range.
///
/// When `step` is finer than the histogram's resolution, several steps can end inside the same
/// slot. The first of them reports the slot's count and the rest report nothing new.
pub struct Iter<'a, S: 'a + CounterStore> {
    hist: &'a Histogram<S>,

    // > 0
    step: u64,
    // highest value reported for the current step
    reporting_level: u64,
    // lowest value equivalent to `reporting_level`
    reporting_slot_floor: u64,
}

impl<'a, S: 'a + CounterStore> Iter<'a, S> {
    /// Construct a new linear iterator. See `Histogram::iter_linear` for details.
    pub fn new(hist: &'a Histogram<S>, step: u64) -> HistogramIterator<'a, S, Iter<'a, S>> {
        assert!(step > 0, "step must be > 0");

        let mut picker = Iter {
            hist,
            step,
            reporting_level: 0,
            reporting_slot_floor: 0,
        };
        picker.set_reporting_level(step - 1);
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
        self.set_reporting_level(self.reporting_level.saturating_add(self.step));
        Some(metadata)
    }

    fn more(&mut self, index_to_pick: usize) -> bool {
        // the step that ends inside the slot after this one still has to be reported, even though
        // nothing past the last recorded slot has a count
        !self.hist.is_empty() && self.reporting_level < self.hist.value_for(index_to_pick + 1)
    }
}
