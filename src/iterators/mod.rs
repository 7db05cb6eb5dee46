use crate::core::store::CounterStore;
use crate::Histogram;

/// An iterator that iterates over histogram percentile levels.
pub mod percentile;

/// An iterator that iterates linearly over histogram values.
pub mod linear;

/// An iterator that iterates logarithmically over histogram values.
pub mod log;

/// An iterator that iterates over recorded histogram values.
pub mod recorded;

/// An iterator that iterates over histogram values.
pub mod all;

/// Extra information about the picked point in the histogram provided by the picker.
pub struct PickMetadata {
    /// Supply the percentile iterated to in the last `pick()`, if known.
    ///
    /// If this is `None`, the percentile at the current index is used instead.
    percentile_iterated_to: Option<f64>,

    /// Supply the value iterated to in the last `pick()`, if the picker can supply a more useful
    /// value than the highest equivalent value of the current index.
    ///
    /// If this is `None`, the highest equivalent value of the current index is used instead.
    value_iterated_to: Option<u64>,
}

impl PickMetadata {
    fn new(percentile_iterated_to: Option<f64>, value_iterated_to: Option<u64>) -> PickMetadata {
        PickMetadata {
            percentile_iterated_to,
            value_iterated_to,
        }
    }
}

/// A trait for designing an subset iterator over values in a `Histogram`.
pub trait PickyIterator {
    /// Return `Some` if an `IterationValue` should be emitted at this point.
    ///
    /// `index` is a valid index in the relevant histogram.
    ///
    /// This will be called with the same index until it returns `None`. This enables modes of
    /// iteration that pick different values represented by the same bucket, for instance.
    fn pick(
        &mut self,
        index: usize,
        total_count_to_index: u64,
        count_at_index: u64,
    ) -> Option<PickMetadata>;

    /// Should we keep iterating even though the last index with non-zero count has already been
    /// picked at least once?
    ///
    /// This will be called on every iteration once the last index with non-zero count has been
    /// picked, even if the index was not advanced in the last iteration (because `pick()` returned
    /// `Some`).
    fn more(&mut self, index_to_pick: usize) -> bool;
}

/// `HistogramIterator` provides a base iterator for a `Histogram`.
///
/// It will iterate over all discrete values until there are no more recorded values (i.e. *not*
/// necessarily until all bins have been exhausted). To facilitate the development of more
/// sophisticated iterators, a *picker* is also provided, which is allowed to only select some bins
/// that should be yielded. The picker may also extend the iteration to include a suffix of empty
/// bins.
pub struct HistogramIterator<'a, S: 'a + CounterStore, P: PickyIterator> {
    hist: &'a Histogram<S>,
    total_count_to_index: u64,
    count_since_last_iteration: u64,
    current_index: usize,
    last_picked_index: Option<usize>,
    max_value_index: Option<usize>,
    prev_value_iterated_to: u64,
    fresh: bool,
    ended: bool,
    picker: P,
}

/// The value emitted at each step when iterating over a `Histogram`.
#[derive(Debug, PartialEq)]
pub struct IterationValue {
    value_iterated_from: u64,
    value_iterated_to: u64,
    percentile: f64,
    percentile_iterated_to: f64,
    count_at_value: u64,
    count_since_last_iteration: u64,
    total_count_to_this_value: u64,
}

impl IterationValue {
    /// Create a new IterationValue.
    pub fn new(
        value_iterated_from: u64,
        value_iterated_to: u64,
        percentile: f64,
        percentile_iterated_to: f64,
        count_at_value: u64,
        count_since_last_iteration: u64,
        total_count_to_this_value: u64,
    ) -> IterationValue {
        IterationValue {
            value_iterated_from,
            value_iterated_to,
            percentile,
            percentile_iterated_to,
            count_at_value,
            count_since_last_iteration,
            total_count_to_this_value,
        }
    }

    /// The value the previous step iterated to, or 0 for the first step.
    pub fn value_iterated_from(&self) -> u64 {
        self.value_iterated_from
    }

    /// The upper bound of this step's value range.
    ///
    /// For the recorded and all-values iterators this is the highest value equivalent to the
    /// current slot. The linear and logarithmic iterators report their reporting level instead.
    pub fn value_iterated_to(&self) -> u64 {
        self.value_iterated_to
    }

    /// Percentage of recorded samples at or below the current slot, in `[0.0, 100.0]`.
    ///
    /// This is 0.0 for an empty histogram.
    pub fn percentile(&self) -> f64 {
        self.percentile
    }

    /// The percentile level the iterator was aiming for when it picked this step.
    ///
    /// Only the percentile iterator aims for levels; every other iterator reports `percentile()`.
    pub fn percentile_iterated_to(&self) -> f64 {
        self.percentile_iterated_to
    }

    /// Recorded count at the current slot.
    ///
    /// Note that since the picker may yield the same slot more than once, this is not necessarily
    /// the count that was added during this step.
    pub fn count_at_value(&self) -> u64 {
        self.count_at_value
    }

    /// Number of samples added since the previous step.
    pub fn count_since_last_iteration(&self) -> u64 {
        self.count_since_last_iteration
    }

    /// Cumulative count of samples up to and including the current slot.
    pub fn total_count_to_this_value(&self) -> u64 {
        self.total_count_to_this_value
    }
}

impl<'a, S: CounterStore, P: PickyIterator> HistogramIterator<'a, S, P> {
    fn new(h: &'a Histogram<S>, picker: P) -> HistogramIterator<'a, S, P> {
        HistogramIterator {
            hist: h,
            total_count_to_index: 0,
            count_since_last_iteration: 0,
            current_index: 0,
            last_picked_index: None,
            max_value_index: h.last_recorded_index(),
            prev_value_iterated_to: 0,
            picker,
            fresh: true,
            ended: false,
        }
    }

    fn current(&self, count_at_index: u64, metadata: PickMetadata) -> IterationValue {
        let total = self.hist.len();
        let percentile = if total == 0 {
            0.0
        } else {
            100.0 * self.total_count_to_index as f64 / total as f64
        };

        let value_iterated_to = metadata.value_iterated_to.unwrap_or_else(|| {
            self.hist
                .highest_equivalent(self.hist.value_for(self.current_index))
        });

        IterationValue::new(
            self.prev_value_iterated_to,
            value_iterated_to,
            percentile,
            metadata.percentile_iterated_to.unwrap_or(percentile),
            count_at_index,
            self.count_since_last_iteration,
            self.total_count_to_index,
        )
    }
}

impl<'a, S: 'a, P> Iterator for HistogramIterator<'a, S, P>
where
    S: CounterStore,
    P: PickyIterator,
{
    type Item = IterationValue;
    fn next(&mut self) -> Option<Self::Item> {
        // We iterate over all the indices in order. After the last index with a non-zero count has
        // been picked, the picker decides through `more()` whether to keep going over the empty
        // suffix. The index is not advanced after yielding, so the picker gets to see the same
        // index again: that is how the linear and log pickers report several steps inside a
        // single wide slot.
        while !self.ended {
            if self.current_index == self.hist.distinct_values() {
                self.ended = true;
                return None;
            }

            let picked_max = match (self.max_value_index, self.last_picked_index) {
                (None, _) => true,
                (Some(max), Some(last)) => last >= max,
                (Some(_), None) => false,
            };

            if picked_max {
                if !self.picker.more(self.current_index) {
                    self.ended = true;
                    return None;
                }
            }

            let count_at_index = self.hist.counts.count_at(self.current_index);
            if !picked_max && self.fresh {
                // only add the count the first time we see an index
                self.total_count_to_index =
                    self.total_count_to_index.saturating_add(count_at_index);
                self.count_since_last_iteration = self
                    .count_since_last_iteration
                    .saturating_add(count_at_index);
                self.fresh = false;
            }

            if let Some(metadata) =
                self.picker
                    .pick(self.current_index, self.total_count_to_index, count_at_index)
            {
                let value = self.current(count_at_index, metadata);

                self.count_since_last_iteration = 0;
                self.prev_value_iterated_to = value.value_iterated_to;
                self.last_picked_index = Some(self.current_index);
                return Some(value);
            }

            self.current_index += 1;
            self.fresh = true;
        }
        None
    }
}
