use std::borrow::Borrow;

use parking_lot::Mutex;

use crate::core::store::{CounterStore, Counts};
use crate::errors::{AdditionError, CreationError, PercentileError, RecordError};
use crate::{Histogram, HistogramConfig};

/// A histogram behind a single mutex.
///
/// Every operation takes the lock, so readers always see a consistent state at the cost of
/// serializing writers. Use [`with`](LockedHistogram::with) to run several operations under one
/// acquisition.
#[derive(Debug)]
pub struct LockedHistogram<S: CounterStore = Counts<u64>> {
    inner: Mutex<Histogram<S>>,
}

impl<S: CounterStore> LockedHistogram<S> {
    /// Construct a locked histogram. See `Histogram::new_with_max`.
    pub fn new_with_max(high: u64, sigfig: u8) -> Result<LockedHistogram<S>, CreationError> {
        Histogram::new_with_max(high, sigfig).map(LockedHistogram::from)
    }

    /// Construct a locked histogram from a configuration.
    pub fn from_config(config: &HistogramConfig) -> Result<LockedHistogram<S>, CreationError> {
        Histogram::from_config(config).map(LockedHistogram::from)
    }

    /// Run `f` with exclusive access to the histogram.
    pub fn with<R, F: FnOnce(&mut Histogram<S>) -> R>(&self, f: F) -> R {
        let mut guard = self.inner.lock();
        f(&mut *guard)
    }

    /// Record `value`. See `Histogram::record`.
    pub fn record(&self, value: u64) -> Result<(), RecordError> {
        self.inner.lock().record(value)
    }

    /// Record `count` samples of `value`. See `Histogram::record_n`.
    pub fn record_n(&self, value: u64, count: u64) -> Result<(), RecordError> {
        self.inner.lock().record_n(value, count)
    }

    /// Record `value` clamped to the trackable range.
    pub fn saturating_record(&self, value: u64) {
        self.inner.lock().saturating_record(value)
    }

    /// Record `value` while correcting for coordinated omission. See `Histogram::record_correct`.
    pub fn record_correct(&self, value: u64, interval: u64) -> Result<(), RecordError> {
        self.inner.lock().record_correct(value, interval)
    }

    /// Record `count` samples of `value` while correcting for coordinated omission.
    pub fn record_n_correct(
        &self,
        value: u64,
        count: u64,
        interval: u64,
    ) -> Result<(), RecordError> {
        self.inner.lock().record_n_correct(value, count, interval)
    }

    /// Add the contents of another histogram. See `Histogram::add`.
    pub fn add<B: Borrow<Histogram<F>>, F: CounterStore>(
        &self,
        source: B,
    ) -> Result<(), AdditionError> {
        self.inner.lock().add(source)
    }

    /// Reset all counts to zero.
    pub fn reset(&self) {
        self.inner.lock().reset()
    }

    /// Total number of recorded samples.
    pub fn len(&self) -> u64 {
        self.inner.lock().len()
    }

    /// Returns true if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// See `Histogram::value_at_percentile`.
    pub fn value_at_percentile(&self, percentile: f64) -> Result<u64, PercentileError> {
        self.inner.lock().value_at_percentile(percentile)
    }

    /// See `Histogram::value_at_quantile`.
    pub fn value_at_quantile(&self, quantile: f64) -> Result<u64, PercentileError> {
        self.inner.lock().value_at_quantile(quantile)
    }

    /// Consume the lock and return the histogram.
    pub fn into_inner(self) -> Histogram<S> {
        self.inner.into_inner()
    }
}

impl<S: CounterStore + Clone> LockedHistogram<S> {
    /// Copy the histogram as it is at this moment.
    pub fn snapshot(&self) -> Histogram<S> {
        self.inner.lock().clone()
    }
}

impl<S: CounterStore> From<Histogram<S>> for LockedHistogram<S> {
    fn from(h: Histogram<S>) -> Self {
        LockedHistogram {
            inner: Mutex::new(h),
        }
    }
}
