//! HdrTally records very large numbers of sampled integer values, like latencies, and answers
//! statistical queries about them (percentiles, mean, counts in a range) with a bounded,
//! configurable relative error. Memory use is fixed at construction and independent of how many
//! values are recorded.
//!
//! # High Dynamic Range histograms
//!
//! A histogram is configured with the highest value it must track and a number of significant
//! decimal digits to preserve. Value precision is expressed as the number of significant digits in
//! the value recording, and provides control over value quantization behavior across the value
//! range and the subsequent value resolution at any given level.
//!
//! For example, a histogram could be configured to track the counts of observed integer values
//! between 0 and 3,600,000,000 while maintaining a value precision of 3 significant digits across
//! that range. Value quantization within the range will thus be no larger than 1/1,000th (or 0.1%)
//! of any value. This example histogram could be used to track and analyze the counts of observed
//! response times ranging between 1 microsecond and 1 hour in magnitude, while maintaining a value
//! resolution of 1 microsecond up to 1 millisecond, a resolution of 1 millisecond (or better) up
//! to one second, and a resolution of 1 second (or better) up to 1,000 seconds. At its maximum
//! tracked value (1 hour), it would still maintain a resolution of 3.6 seconds (or better).
//!
//! The amount of work involved in recording a sample is constant, and directly computes storage
//! index locations such that no iteration or searching is ever involved in recording data values.
//!
//! # Recording samples
//!
//! ```
//! use hdrtally::Histogram;
//! let mut hist: Histogram = Histogram::new_with_max(60 * 60 * 1000, 2).unwrap();
//!
//! // samples can be recorded using .record, which will error if the value is too large
//! hist.record(54321).expect("value 54321 should be in range");
//!
//! // for ergonomics, samples can also be recorded with +=
//! // this call will panic if the value is out of range!
//! hist += 54321;
//!
//! // if the code that generates the values is subject to Coordinated Omission,
//! // the self-correcting record method should be used instead.
//! // for example, if the expected sampling interval is 10 msec:
//! hist.record_correct(54321, 10).expect("value 54321 should be in range");
//! ```
//!
//! # Counter stores
//!
//! The histogram is generic over where its counts live. All stores index slots the same way and
//! give identical answers when no writer is active:
//!
//!  - `Counts<u64>` (the default): wide, single-threaded counts.
//!  - `Counts<u8>`, `Counts<u16>`, `Counts<u32>`: narrow, single-threaded counts that use less
//!    memory but may silently wrap a slot. `Histogram::has_overflowed` detects this afterwards.
//!  - `sync::AtomicHistogram`: atomic slots that any number of threads can record into through a
//!    shared reference.
//!  - `sync::LockedHistogram`: a histogram behind a single mutex, for fully serialized access.
//!
//! ```
//! use hdrtally::{Counts, Histogram};
//! let mut hist = Histogram::<Counts<u16>>::new_with_max(1_000_000, 3).unwrap();
//! hist.record_n(100, 70_000).unwrap();
//! assert!(hist.has_overflowed());
//! assert_eq!(hist.len(), 70_000);
//! ```
//!
//! # Querying samples
//!
//! At any time, the histogram can be queried to return interesting statistical measurements, such
//! as the total number of recorded samples, or the value at a given percentile:
//!
//! ```
//! use hdrtally::Histogram;
//! let hist: Histogram = Histogram::new_with_max(3_600_000_000, 3).unwrap();
//! // ...
//! println!("# of samples: {}", hist.len());
//! println!("99.9'th percentile: {}", hist.value_at_percentile(99.9).unwrap());
//! ```
//!
//! Several useful iterators are also provided for quickly getting an overview of the dataset. The
//! simplest one is `iter_recorded()`, which yields one item for every non-empty sample bin.
//!
//! ```
//! use hdrtally::Histogram;
//! let hist: Histogram = Histogram::new_with_max(3_600_000_000, 3).unwrap();
//! // ...
//! for v in hist.iter_recorded() {
//!     println!("{}'th percentile of data is {} with {} samples",
//!         v.percentile(), v.value_iterated_to(), v.count_at_value());
//! }
//! ```

#![warn(missing_docs, unused_import_braces)]

use std::borrow::Borrow;
use std::ops::AddAssign;

use tracing::{debug, trace, warn};

pub mod config;
pub mod core;
pub mod errors;
pub mod iterators;
#[cfg(feature = "sync")]
pub mod sync;

pub use crate::config::HistogramConfig;
pub use crate::core::counter::Counter;
pub use crate::core::encoding::Encoding;
pub use crate::core::store::{CounterStore, Counts, SharedCounterStore};
pub use crate::errors::*;

/// `Histogram` is the core data structure in HdrTally. It records values, and performs analytics.
///
/// At its heart, it keeps the count for recorded samples in "buckets" of values. The resolution
/// and distribution of these buckets is tuned based on the desired highest trackable value, as
/// well as the user-specified number of significant decimal digits to preserve. The values for the
/// buckets are kept in a way that resembles floats and doubles: there is a mantissa and an
/// exponent, and each bucket represents a different exponent. The "sub-buckets" within a bucket
/// represent different values for the mantissa.
///
/// To a first approximation, the sub-buckets of the first bucket would hold the values `0`, `1`,
/// `2`, `3`, …, the sub-buckets of the second bucket would hold `0`, `2`, `4`, `6`, …, the third
/// would hold `0`, `4`, `8`, and so on. However, the low half of each bucket (except bucket 0) is
/// unnecessary, since those values are already covered by the sub-buckets of all the preceeding
/// buckets. Thus, `Histogram` keeps the top half of every such bucket.
///
/// `S` chooses where the counts are stored; see the crate documentation.
#[derive(Debug, Clone)]
pub struct Histogram<S: CounterStore = Counts<u64>> {
    encoding: Encoding,
    counts: S,
}

// accessors

impl<S: CounterStore> Histogram<S> {
    /// Get the current number of distinct values that can be represented in the histogram.
    pub fn distinct_values(&self) -> usize {
        self.counts.len()
    }

    /// Get the highest trackable value.
    pub fn high(&self) -> u64 {
        self.encoding.highest_trackable_value
    }

    /// Get the number of significant value digits kept by this histogram.
    pub fn sigfig(&self) -> u8 {
        self.encoding.significant_value_digits
    }

    /// Get the range and precision this histogram was created with.
    pub fn config(&self) -> HistogramConfig {
        HistogramConfig::from(&self.encoding)
    }

    /// Get the slot layout this histogram indexes its counts with.
    pub fn encoding(&self) -> &Encoding {
        &self.encoding
    }

    /// Get the total number of samples recorded.
    pub fn len(&self) -> u64 {
        self.counts.total()
    }

    /// Returns true if this histogram has no recorded values.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get the count in the slot at `index`, or `None` if the index is out of range.
    pub fn count_at_index(&self, index: usize) -> Option<u64> {
        if index < self.counts.len() {
            Some(self.counts.count_at(index))
        } else {
            None
        }
    }

    /// Iterate over every slot's count, in index order.
    ///
    /// Together with `config()` and `len()`, this is everything needed to reproduce the histogram
    /// bit for bit.
    pub fn raw_counts(&self) -> impl Iterator<Item = u64> + '_ {
        (0..self.counts.len()).map(move |i| self.counts.count_at(i))
    }

    fn last_index(&self) -> usize {
        self.distinct_values() - 1
    }

    /// Find the index of the last slot with a non-zero count.
    fn last_recorded_index(&self) -> Option<usize> {
        (0..self.counts.len())
            .rev()
            .find(|&i| self.counts.count_at(i) != 0)
    }
}

// Construction

impl<S: CounterStore> Histogram<S> {
    /// Construct a `Histogram` given the highest value to be tracked and a number of significant
    /// decimal digits. The histogram will be constructed to implicitly track (distinguish from 0)
    /// values as low as 1.
    ///
    /// `high` is the highest value to be tracked by the histogram, and must be a positive integer
    /// that is >= 2. `sigfig` specifies the number of significant figures to maintain. This is the
    /// number of significant decimal digits to which the histogram will maintain value resolution
    /// and separation. Must be in the range [0, 5].
    pub fn new_with_max(high: u64, sigfig: u8) -> Result<Histogram<S>, CreationError> {
        let encoding = Encoding::new(high, sigfig)?;

        debug!(
            high,
            sigfig,
            bucket_count = encoding.bucket_count,
            sub_bucket_count = encoding.sub_bucket_count,
            len = encoding.len,
            "created histogram"
        );

        Ok(Histogram {
            encoding,
            counts: S::with_len(encoding.len),
        })
    }

    /// Construct a `Histogram` from a validated-on-the-way configuration.
    pub fn from_config(config: &HistogramConfig) -> Result<Histogram<S>, CreationError> {
        Self::new_with_max(config.highest_trackable_value, config.significant_value_digits)
    }

    /// Construct a `Histogram` with the same range settings as a given source histogram, but
    /// none of its contents.
    pub fn new_from<F: CounterStore>(source: &Histogram<F>) -> Histogram<S> {
        Histogram {
            encoding: source.encoding,
            counts: S::with_len(source.encoding.len),
        }
    }
}

// lookups

impl<S: CounterStore> Histogram<S> {
    /// Find the bucket the given value should be placed in.
    /// Returns `None` if the corresponding index cannot be represented in the counts array.
    fn index_for(&self, value: u64) -> Option<usize> {
        self.encoding.index_for(value)
    }

    /// Get the lowest value that maps to the slot at `index`.
    pub fn value_for(&self, index: usize) -> u64 {
        self.encoding.value_for(index)
    }

    /// Get the size (in value units) of the range of values that are equivalent to the given value
    /// within the histogram's resolution. Where "equivalent" means that value samples recorded for
    /// any two equivalent values are counted in a common total count.
    pub fn equivalent_range(&self, value: u64) -> u64 {
        self.encoding.equivalent_range(value)
    }

    /// Get the lowest value that is equivalent to the given value within the histogram's
    /// resolution. Where "equivalent" means that value samples recorded for any two equivalent
    /// values are counted in a common total count.
    pub fn lowest_equivalent(&self, value: u64) -> u64 {
        self.encoding.lowest_equivalent(value)
    }

    /// Get the highest value that is equivalent to the given value within the histogram's
    /// resolution. Where "equivalent" means that value samples recorded for any two equivalent
    /// values are counted in a common total count.
    pub fn highest_equivalent(&self, value: u64) -> u64 {
        self.encoding.highest_equivalent(value)
    }

    /// Get a value that lies in the middle (rounded up) of the range of values equivalent the given
    /// value. Where "equivalent" means that value samples recorded for any two equivalent values
    /// are counted in a common total count.
    pub fn median_equivalent(&self, value: u64) -> u64 {
        self.encoding.median_equivalent(value)
    }

    /// Get the next value that is not equivalent to the given value within the histogram's
    /// resolution. Where "equivalent" means that value samples recorded for any two equivalent
    /// values are counted in a common total count.
    pub fn next_non_equivalent(&self, value: u64) -> u64 {
        self.encoding.next_non_equivalent(value)
    }

    /// Determine if two values are equivalent with the histogram's resolution. Where "equivalent"
    /// means that value samples recorded for any two equivalent values are counted in a common
    /// total count.
    pub fn equivalent(&self, value1: u64, value2: u64) -> bool {
        self.encoding.equivalent(value1, value2)
    }
}

// recording

impl<S: CounterStore> Histogram<S> {
    /// Record `value` in the histogram.
    ///
    /// Returns an error if `value` exceeds the highest trackable value. The histogram is left
    /// untouched in that case.
    pub fn record(&mut self, value: u64) -> Result<(), RecordError> {
        self.record_n(value, 1)
    }

    /// Record `value` in the histogram, clamped to the range of the histogram.
    ///
    /// This method cannot fail, as any values that are too large to be recorded will be recorded
    /// as the highest trackable value.
    pub fn saturating_record(&mut self, value: u64) {
        self.saturating_record_n(value, 1)
    }

    /// Record multiple samples for a value in the histogram, adding to the value's current count.
    ///
    /// `count` is the number of occurrences of this value to record.
    ///
    /// Returns an error if `value` exceeds the highest trackable value.
    pub fn record_n(&mut self, value: u64, count: u64) -> Result<(), RecordError> {
        let index = self.index_for(value).ok_or(RecordError::ValueOutOfRange)?;
        self.counts.add_at(index, count);
        self.counts.add_total(count);
        Ok(())
    }

    /// Record multiple samples for a value in the histogram, each one clamped to the histogram's
    /// range.
    ///
    /// `count` is the number of occurrences of this value to record.
    pub fn saturating_record_n(&mut self, value: u64, count: u64) {
        let index = self.encoding.index_for_or_last(value);
        self.counts.add_at(index, count);
        self.counts.add_total(count);
    }

    /// Record a value in the histogram while correcting for coordinated omission.
    ///
    /// See `record_n_correct` for further documentation.
    pub fn record_correct(&mut self, value: u64, interval: u64) -> Result<(), RecordError> {
        self.record_n_correct(value, 1, interval)
    }

    /// Record multiple values in the histogram while correcting for coordinated omission.
    ///
    /// To compensate for the loss of sampled values when a recorded value is larger than the
    /// expected interval between value samples, this method will auto-generate and record an
    /// additional series of decreasingly-smaller (down to `interval`) value records.
    ///
    /// Note: This is a at-recording correction method, as opposed to the post-recording correction
    /// method provided by `clone_correct`. The two methods are mutually exclusive, and only one of
    /// the two should be be used on a given data set to correct for the same coordinated omission
    /// issue.
    ///
    /// Returns an error if `value` exceeds the highest trackable value. Nothing is recorded in that
    /// case, not even the synthesized values.
    pub fn record_n_correct(
        &mut self,
        value: u64,
        count: u64,
        interval: u64,
    ) -> Result<(), RecordError> {
        let counts = &mut self.counts;
        self.encoding
            .for_each_corrected_index(value, interval, |index| {
                counts.add_at(index, count);
                counts.add_total(count);
            })
    }
}

// merging

impl<S: CounterStore> Histogram<S> {
    /// Add the contents of another histogram to this one.
    ///
    /// Both histograms must have been created with the same highest trackable value and
    /// precision, so that their slots line up. The other histogram's total is added as is, so an
    /// overflowed addend makes this histogram report `has_overflowed()` too.
    ///
    /// Returns an error, and leaves both histograms untouched, if the configurations differ.
    pub fn add<B: Borrow<Histogram<F>>, F: CounterStore>(
        &mut self,
        source: B,
    ) -> Result<(), AdditionError> {
        let source = source.borrow();

        if !self.encoding.is_compatible_with(&source.encoding) {
            debug!(
                ours = ?self.config(),
                theirs = ?source.config(),
                "refusing to add histogram with a different layout"
            );
            return Err(AdditionError::IncompatibleConfiguration);
        }

        for i in 0..source.distinct_values() {
            let other_count = source.counts.count_at(i);
            if other_count != 0 {
                self.counts.add_at(i, other_count);
            }
        }
        self.counts.add_total(source.len());

        Ok(())
    }

    /// Add the contents of another histogram to this one, while correcting for coordinated
    /// omission.
    ///
    /// To compensate for the loss of sampled values when a recorded value is larger than the
    /// expected interval between value samples, the values added will include an auto-generated
    /// additional series of decreasingly-smaller (down to the given `interval`) value records for
    /// each count found in the current histogram that is larger than `interval`.
    ///
    /// Every recorded slot of `source` is replayed at its highest equivalent value, exactly as
    /// `record_n_correct` would record it.
    ///
    /// Note: This is a post-recording correction method, as opposed to the at-recording correction
    /// method provided by `record_correct`. The two methods are mutually exclusive, and only one of
    /// the two should be be used on a given data set to correct for the same coordinated omission
    /// issue.
    ///
    /// Returns an error, without adding anything, if `source` holds values this histogram cannot
    /// represent.
    pub fn add_correct<B: Borrow<Histogram<F>>, F: CounterStore>(
        &mut self,
        source: B,
        interval: u64,
    ) -> Result<(), AdditionError> {
        let source = source.borrow();

        if self.index_for(source.max()).is_none() {
            return Err(AdditionError::OtherAddendValueExceedsRange);
        }

        for v in source.iter_recorded() {
            self.record_n_correct(v.value_iterated_to(), v.count_at_value(), interval)
                .map_err(|_| AdditionError::OtherAddendValueExceedsRange)?;
        }
        Ok(())
    }

    /// Subtract the contents of another histogram from this one.
    ///
    /// Returns an error, and subtracts nothing, if the configurations differ or if any slot of
    /// `subtrahend` holds more than the corresponding slot here.
    pub fn subtract<B: Borrow<Histogram<F>>, F: CounterStore>(
        &mut self,
        subtrahend: B,
    ) -> Result<(), SubtractionError> {
        let subtrahend = subtrahend.borrow();

        if !self.encoding.is_compatible_with(&subtrahend.encoding) {
            return Err(SubtractionError::IncompatibleConfiguration);
        }

        let fits = (0..subtrahend.distinct_values())
            .all(|i| subtrahend.counts.count_at(i) <= self.counts.count_at(i));
        if !fits {
            return Err(SubtractionError::SubtrahendCountExceedsMinuendCount);
        }

        // take off what the slots actually held, which is less than `subtrahend.len()` once a
        // narrow subtrahend has wrapped
        let mut removed = 0_u64;
        for i in 0..subtrahend.distinct_values() {
            let other_count = subtrahend.counts.count_at(i);
            if other_count != 0 {
                self.counts.sub_at(i, other_count);
                removed = removed.saturating_add(other_count);
            }
        }
        let total = self.counts.total().saturating_sub(removed);
        self.counts.set_total(total);

        Ok(())
    }

    /// Get a copy of this histogram, corrected for coordinated omission.
    ///
    /// The copy starts empty with the same configuration, and then has this histogram's contents
    /// added to it with `add_correct`. See `add_correct` for the details of the correction.
    pub fn clone_correct(&self, interval: u64) -> Histogram<S> {
        trace!(interval, len = self.len(), "post-correcting histogram copy");

        let mut h = Histogram::new_from(self);
        for v in self.iter_recorded() {
            h.record_n_correct(v.value_iterated_to(), v.count_at_value(), interval)
                .expect("Same dimensions; all values should be representable");
        }
        h
    }

    /// Reset the contents of this histogram. The configuration is unchanged.
    pub fn reset(&mut self) {
        self.counts.clear();
    }
}

// administrative

impl<S: CounterStore> Histogram<S> {
    /// Determine whether any slot has wrapped around its storage width.
    ///
    /// This is only possible for narrow stores: it compares the sum of all slots to the separately
    /// kept total, which diverge once a slot wraps.
    pub fn has_overflowed(&self) -> bool {
        let sum = self.raw_counts().fold(0_u64, |t, c| t.saturating_add(c));
        let overflowed = sum != self.counts.total();
        if overflowed {
            warn!(
                sum,
                total = self.counts.total(),
                "histogram counts have overflowed their slot width"
            );
        }
        overflowed
    }

    /// Conservative estimate of the memory this histogram occupies, in bytes.
    ///
    /// Depends only on the configuration and slot width, never on what has been recorded.
    pub fn estimated_footprint(&self) -> usize {
        self.encoding.estimated_footprint(S::SLOT_WIDTH)
    }
}

// ergonomics

impl<S: CounterStore> AddAssign<u64> for Histogram<S> {
    /// Record a value. Panics if the value is out of range.
    fn add_assign(&mut self, value: u64) {
        self.record(value).unwrap();
    }
}

impl<'a, S: CounterStore, F: CounterStore> AddAssign<&'a Histogram<F>> for Histogram<S> {
    /// Add another histogram. Panics if the configurations differ.
    fn add_assign(&mut self, source: &'a Histogram<F>) {
        self.add(source).unwrap();
    }
}

// comparison

/// Histograms compare equal when their configuration, counts-array length and total count match.
///
/// This is deliberately shallow: two histograms with the same total but different distributions
/// compare equal. Compare `raw_counts()` when slot-by-slot equality matters.
impl<S: CounterStore, F: CounterStore> PartialEq<Histogram<F>> for Histogram<S> {
    fn eq(&self, other: &Histogram<F>) -> bool {
        self.high() == other.high()
            && self.sigfig() == other.sigfig()
            && self.distinct_values() == other.distinct_values()
            && self.len() == other.len()
    }
}

// iterators

impl<S: CounterStore> Histogram<S> {
    /// Iterate through histogram values by percentile levels.
    ///
    /// The iteration mechanic for this iterator may appear somewhat confusing, but it yields
    /// fairly pleasing output. The iterator starts with a *percentile step size* of
    /// `100/ticks_per_half_distance`. It will then iterate by yielding value/percentile pairs in
    /// increments of that percentile step size. Once it hits a percentile level that is half-way
    /// to 100%, it halves the step size, and so on, approaching 100% but never quite reaching it,
    /// until all recorded values are exhausted. A final step at exactly 100% is then yielded.
    ///
    /// # Panics
    ///
    /// `ticks_per_half_distance` must be at least 1.
    pub fn iter_percentiles(
        &self,
        ticks_per_half_distance: u32,
    ) -> iterators::HistogramIterator<S, iterators::percentile::Iter<S>> {
        iterators::percentile::Iter::new(self, ticks_per_half_distance)
    }

    /// Iterates through histogram values using linear value steps. The iteration is performed in
    /// steps of size `step`, each one yielding the count for all values in the preceeding value
    /// range of size `step`. The iterator terminates when all recorded histogram values are
    /// exhausted.
    ///
    /// # Panics
    ///
    /// `step` must be at least 1.
    pub fn iter_linear(
        &self,
        step: u64,
    ) -> iterators::HistogramIterator<S, iterators::linear::Iter<S>> {
        iterators::linear::Iter::new(self, step)
    }

    /// Iterates through histogram values at logarithmically increasing levels. The iteration is
    /// performed in steps that start at `start` and increase exponentially according to `exp`. The
    /// iterator terminates when all recorded histogram values are exhausted.
    ///
    /// # Panics
    ///
    /// `start` must be at least 1, and `exp` must be greater than 1.0.
    pub fn iter_log(
        &self,
        start: u64,
        exp: f64,
    ) -> iterators::HistogramIterator<S, iterators::log::Iter<S>> {
        iterators::log::Iter::new(self, start, exp)
    }

    /// Iterates through all recorded histogram values using the finest granularity steps supported
    /// by the underlying representation. The iteration steps through all non-zero recorded value
    /// counts, and terminates when all recorded histogram values are exhausted.
    pub fn iter_recorded(&self) -> iterators::HistogramIterator<S, iterators::recorded::Iter> {
        iterators::recorded::Iter::new(self)
    }

    /// Iterates through all histogram values using the finest granularity steps supported by the
    /// underlying representation. The iteration steps through all possible unit value levels,
    /// regardless of whether or not there were recorded values for that value level, and
    /// terminates when all recorded histogram values are exhausted.
    pub fn iter_all(&self) -> iterators::HistogramIterator<S, iterators::all::Iter> {
        iterators::all::Iter::new(self)
    }
}

// minor data statistics

impl<S: CounterStore> Histogram<S> {
    /// Get the lowest recorded value level in the histogram.
    /// If the histogram has no recorded values, the value returned will be 0.
    pub fn min(&self) -> u64 {
        self.iter_recorded()
            .next()
            .map(|v| self.lowest_equivalent(v.value_iterated_to()))
            .unwrap_or(0)
    }

    /// Get the highest recorded value level in the histogram.
    /// If the histogram has no recorded values, the value returned will be 0.
    pub fn max(&self) -> u64 {
        self.last_recorded_index()
            .map(|i| self.highest_equivalent(self.value_for(i)))
            .unwrap_or(0)
    }

    /// Get the lowest recorded non-zero value level in the histogram.
    /// If the histogram has no recorded values, the value returned is `u64::max_value()`.
    pub fn min_nz(&self) -> u64 {
        self.iter_recorded()
            .map(|v| self.lowest_equivalent(v.value_iterated_to()))
            .find(|&v| v != 0)
            .unwrap_or_else(u64::max_value)
    }

    /// Get the count of recorded values at a specific value (to within the histogram resolution
    /// at the value level).
    ///
    /// The count is computed across values recorded in the histogram that are within the value
    /// range that is `>= lowest_equivalent(value)` and `<= highest_equivalent(value)`.
    ///
    /// If the value is larger than the maximum representable value, it will be clamped to the
    /// max representable value.
    pub fn count_at(&self, value: u64) -> u64 {
        self.counts
            .count_at(self.encoding.index_for_or_last(value))
    }
}

// major data statistics

impl<S: CounterStore> Histogram<S> {
    /// Get the computed mean value of all recorded values in the histogram.
    pub fn mean(&self) -> f64 {
        if self.is_empty() {
            return 0.0;
        }

        let total = self.len() as f64;
        self.iter_recorded().fold(0.0_f64, |sum, v| {
            sum + self.median_equivalent(v.value_iterated_to()) as f64 * v.count_at_value() as f64
                / total
        })
    }

    /// Get the computed standard deviation of all recorded values in the histogram
    pub fn stdev(&self) -> f64 {
        if self.is_empty() {
            return 0.0;
        }

        let mean = self.mean();
        let geom_dev_tot = self.iter_recorded().fold(0.0_f64, |gdt, v| {
            let dev = self.median_equivalent(v.value_iterated_to()) as f64 - mean;
            gdt + (dev * dev) * v.count_at_value() as f64
        });

        (geom_dev_tot / self.len() as f64).sqrt()
    }

    /// Get the value at a given percentile.
    ///
    /// This is simply `value_at_quantile` multiplied by 100.0. For best floating-point precision,
    /// use `value_at_quantile` directly.
    pub fn value_at_percentile(&self, percentile: f64) -> Result<u64, PercentileError> {
        if !(0.0..=100.0).contains(&percentile) {
            return Err(PercentileError::OutOfRange);
        }
        self.value_at_quantile(percentile / 100.0)
    }

    /// Get the value at a given quantile.
    ///
    /// When the given quantile is > 0.0, the value returned is the value that the given
    /// percentage of the overall recorded value entries in the histogram are either smaller than
    /// or equivalent to. When the given quantile is 0.0, the value returned is the value that all
    /// value entries in the histogram are either larger than or equivalent to.
    ///
    /// Two values are considered "equivalent" if `self.equivalent` would return true.
    ///
    /// Returns 0 for an empty histogram, and an error if `quantile` is outside `[0, 1]` or NaN.
    pub fn value_at_quantile(&self, quantile: f64) -> Result<u64, PercentileError> {
        if !(0.0..=1.0).contains(&quantile) {
            return Err(PercentileError::OutOfRange);
        }
        if self.is_empty() {
            return Ok(0);
        }

        // If we're part-way into the next highest int, we should use that as the count
        let fractional_count = quantile * self.len() as f64;
        let mut count_at_quantile = fractional_count.ceil() as u64;

        // Make sure we at least reach the first recorded entry
        if count_at_quantile == 0 {
            count_at_quantile = 1;
        }

        let value = self
            .iter_recorded()
            .find(|v| v.total_count_to_this_value() >= count_at_quantile)
            .map(|v| {
                if quantile == 0.0 {
                    self.lowest_equivalent(v.value_iterated_to())
                } else {
                    v.value_iterated_to()
                }
            });

        // Slots only sum to less than the total once a narrow slot has wrapped; the largest
        // recorded value is still the best answer we have then.
        Ok(value.unwrap_or_else(|| self.max()))
    }

    /// Get the percentile of samples at and below a given value.
    ///
    /// This is simply `quantile_below` multiplied by 100.0. For best floating-point precision, use
    /// `quantile_below` directly.
    pub fn percentile_below(&self, value: u64) -> f64 {
        self.quantile_below(value) * 100.0
    }

    /// Get the quantile of samples at or below a given value.
    ///
    /// The value returned is the quantile of values recorded in the histogram that are smaller
    /// than or equivalent to the given value.
    ///
    /// Two values are considered "equivalent" if `self.equivalent` would return true.
    ///
    /// Returns 1.0 for an empty histogram.
    pub fn quantile_below(&self, value: u64) -> f64 {
        if self.is_empty() {
            return 1.0;
        }

        let highest = self.highest_equivalent(value);
        let count = self
            .iter_recorded()
            .take_while(|v| v.value_iterated_to() <= highest)
            .fold(0_u64, |t, v| t.saturating_add(v.count_at_value()));

        count as f64 / self.len() as f64
    }

    /// Get the count of recorded values within a range of value levels (inclusive to within the
    /// histogram's resolution).
    ///
    /// `low` gives the lower value bound on the range for which to provide the recorded count.
    /// Will be rounded down with `lowest_equivalent`. Similarly, `high` gives the higher value
    /// bound on the range, and will be rounded up with `highest_equivalent`. The function returns
    /// the total count of values recorded in the histogram within the value range that is `>=
    /// lowest_equivalent(low)` and `<= highest_equivalent(high)`.
    pub fn count_between(&self, low: u64, high: u64) -> u64 {
        let lowest = self.lowest_equivalent(low);
        let highest = self.highest_equivalent(high);
        self.iter_recorded()
            .map(|v| (v.value_iterated_to(), v.count_at_value()))
            .skip_while(|&(value, _)| value < lowest)
            .take_while(|&(value, _)| value <= highest)
            .fold(0_u64, |t, (_, count)| t.saturating_add(count))
    }
}

#[cfg(test)]
#[path = "tests/tests.rs"]
mod tests;
