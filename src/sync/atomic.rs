use std::borrow::Borrow;
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicU64, Ordering};

use crossbeam_utils::CachePadded;
use tracing::debug;

use crate::core::store::{CounterStore, Counts, SharedCounterStore};
use crate::errors::{AdditionError, CreationError, RecordError};
use crate::{Histogram, HistogramConfig};

/// Counts kept in atomic 64-bit slots.
///
/// All updates use relaxed ordering: each one is a single read-modify-write, so none are lost,
/// but no ordering between slots is promised. The total sits on its own cache line since every
/// recording touches it.
///
/// Unlike `Counts`, the total wraps rather than saturates at `u64::max_value()`. A wrapped total
/// no longer matches the slot sum, so `Histogram::has_overflowed` reports it.
pub struct AtomicCounts {
    counts: Box<[AtomicU64]>,
    total: CachePadded<AtomicU64>,
}

impl fmt::Debug for AtomicCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AtomicCounts")
            .field("len", &self.counts.len())
            .field("total", &self.total.load(Ordering::Relaxed))
            .finish()
    }
}

impl Clone for AtomicCounts {
    fn clone(&self) -> Self {
        AtomicCounts {
            counts: self
                .counts
                .iter()
                .map(|c| AtomicU64::new(c.load(Ordering::Relaxed)))
                .collect(),
            total: CachePadded::new(AtomicU64::new(self.total.load(Ordering::Relaxed))),
        }
    }
}

impl CounterStore for AtomicCounts {
    const SLOT_WIDTH: usize = 8;

    fn with_len(len: usize) -> Self {
        AtomicCounts {
            counts: (0..len).map(|_| AtomicU64::new(0)).collect(),
            total: CachePadded::new(AtomicU64::new(0)),
        }
    }

    #[inline]
    fn len(&self) -> usize {
        self.counts.len()
    }

    #[inline]
    fn count_at(&self, index: usize) -> u64 {
        self.counts[index].load(Ordering::Relaxed)
    }

    #[inline]
    fn add_at(&mut self, index: usize, count: u64) {
        let c = self.counts[index].get_mut();
        *c = c.wrapping_add(count);
    }

    #[inline]
    fn sub_at(&mut self, index: usize, count: u64) {
        let c = self.counts[index].get_mut();
        *c = c.wrapping_sub(count);
    }

    #[inline]
    fn total(&self) -> u64 {
        self.total.load(Ordering::Relaxed)
    }

    fn set_total(&mut self, total: u64) {
        *self.total.get_mut() = total;
    }

    #[inline]
    fn add_total(&mut self, count: u64) {
        let t = self.total.get_mut();
        *t = t.wrapping_add(count);
    }

    fn clear(&mut self) {
        for c in self.counts.iter_mut() {
            *c.get_mut() = 0;
        }
        *self.total.get_mut() = 0;
    }
}

impl SharedCounterStore for AtomicCounts {
    #[inline]
    fn add_at_shared(&self, index: usize, count: u64) {
        self.counts[index].fetch_add(count, Ordering::Relaxed);
    }

    #[inline]
    fn add_total_shared(&self, count: u64) {
        self.total.fetch_add(count, Ordering::Relaxed);
    }
}

/// A histogram that any number of threads can record into at once through a shared reference.
///
/// Recording never blocks and never loses an increment. Queries are available through `Deref`
/// to the underlying `Histogram`, but while writers are active they may observe some concurrent
/// updates and not others. Take a [`snapshot`](AtomicHistogram::snapshot) or quiesce writers
/// when a consistent view matters.
///
/// ```
/// use hdrtally::sync::AtomicHistogram;
/// use std::sync::Arc;
/// use std::thread;
///
/// let hist = Arc::new(AtomicHistogram::new_with_max(3_600_000_000, 3).unwrap());
/// let handles: Vec<_> = (0..4)
///     .map(|_| {
///         let hist = Arc::clone(&hist);
///         thread::spawn(move || {
///             for v in 1..=1000 {
///                 hist.record(v).unwrap();
///             }
///         })
///     })
///     .collect();
/// for h in handles {
///     h.join().unwrap();
/// }
/// assert_eq!(hist.len(), 4000);
/// ```
#[derive(Debug, Clone)]
pub struct AtomicHistogram {
    inner: Histogram<AtomicCounts>,
}

impl AtomicHistogram {
    /// Construct an atomic histogram. See `Histogram::new_with_max`.
    pub fn new_with_max(high: u64, sigfig: u8) -> Result<AtomicHistogram, CreationError> {
        Histogram::new_with_max(high, sigfig).map(|inner| AtomicHistogram { inner })
    }

    /// Construct an atomic histogram from a configuration.
    pub fn from_config(config: &HistogramConfig) -> Result<AtomicHistogram, CreationError> {
        Histogram::from_config(config).map(|inner| AtomicHistogram { inner })
    }

    /// Construct an empty atomic histogram with the same configuration as `source`.
    pub fn new_from<S: CounterStore>(source: &Histogram<S>) -> AtomicHistogram {
        AtomicHistogram {
            inner: Histogram::new_from(source),
        }
    }

    /// Record `value`. See `Histogram::record`.
    pub fn record(&self, value: u64) -> Result<(), RecordError> {
        self.record_n(value, 1)
    }

    /// Record `count` samples of `value`. See `Histogram::record_n`.
    pub fn record_n(&self, value: u64, count: u64) -> Result<(), RecordError> {
        let index = self
            .inner
            .encoding
            .index_for(value)
            .ok_or(RecordError::ValueOutOfRange)?;
        self.inner.counts.add_at_shared(index, count);
        self.inner.counts.add_total_shared(count);
        Ok(())
    }

    /// Record `value`, clamped to the trackable range.
    pub fn saturating_record(&self, value: u64) {
        self.saturating_record_n(value, 1)
    }

    /// Record `count` samples of `value`, clamped to the trackable range.
    pub fn saturating_record_n(&self, value: u64, count: u64) {
        let index = self.inner.encoding.index_for_or_last(value);
        self.inner.counts.add_at_shared(index, count);
        self.inner.counts.add_total_shared(count);
    }

    /// Record `value` while correcting for coordinated omission. See `Histogram::record_correct`.
    pub fn record_correct(&self, value: u64, interval: u64) -> Result<(), RecordError> {
        self.record_n_correct(value, 1, interval)
    }

    /// Record `count` samples of `value` while correcting for coordinated omission. See
    /// `Histogram::record_n_correct`.
    pub fn record_n_correct(
        &self,
        value: u64,
        count: u64,
        interval: u64,
    ) -> Result<(), RecordError> {
        let counts = &self.inner.counts;
        self.inner
            .encoding
            .for_each_corrected_index(value, interval, |index| {
                counts.add_at_shared(index, count);
                counts.add_total_shared(count);
            })
    }

    /// Add the contents of another histogram, concurrently with other writers.
    pub fn add<B: Borrow<Histogram<S>>, S: CounterStore>(
        &self,
        source: B,
    ) -> Result<(), AdditionError> {
        let source = source.borrow();
        if !self.inner.encoding.is_compatible_with(&source.encoding) {
            debug!(
                ours = ?self.inner.config(),
                theirs = ?source.config(),
                "refusing to add histogram with a different layout"
            );
            return Err(AdditionError::IncompatibleConfiguration);
        }

        for (i, count) in source.raw_counts().enumerate() {
            if count != 0 {
                self.inner.counts.add_at_shared(i, count);
            }
        }
        self.inner.counts.add_total_shared(source.len());
        Ok(())
    }

    /// Copy the current counts into a plain histogram.
    ///
    /// Each slot is read once, so with writers active the copy reflects some interleaving of
    /// their updates. The copy's total is the sum of the copied slots, which keeps it internally
    /// consistent.
    pub fn snapshot(&self) -> Histogram {
        let mut h: Histogram = Histogram::new_from(&self.inner);
        for (i, count) in self.inner.raw_counts().enumerate() {
            if count != 0 {
                h.counts.add_at(i, count);
                h.counts.add_total(count);
            }
        }
        h
    }

    /// Unwrap into the underlying histogram.
    pub fn into_inner(self) -> Histogram<AtomicCounts> {
        self.inner
    }
}

impl Deref for AtomicHistogram {
    type Target = Histogram<AtomicCounts>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for AtomicHistogram {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.inner
    }
}

impl From<Histogram<AtomicCounts>> for AtomicHistogram {
    fn from(inner: Histogram<AtomicCounts>) -> Self {
        AtomicHistogram { inner }
    }
}

impl From<&AtomicHistogram> for Histogram<Counts<u64>> {
    fn from(h: &AtomicHistogram) -> Self {
        h.snapshot()
    }
}
