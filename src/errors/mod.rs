use thiserror::Error;

/// Errors that can occur when creating a histogram.
#[derive(Debug, Error, Eq, PartialEq, Clone, Copy)]
pub enum CreationError {
    /// Highest trackable value must be >= 2 for the bucket layout to hold at least one full
    /// sub-bucket range.
    #[error("highest trackable value must be >= 2")]
    HighLessThanTwo,
    /// Number of significant digits must be in the range `[0, 5]`. It is capped at 5 because 5
    /// significant digits is already more than almost anyone needs, and memory usage scales
    /// exponentially as this increases.
    #[error("number of significant value digits must be between 0 and 5")]
    SigFigExceedsMax,
    /// The `usize` type is too small to represent the desired configuration. Use fewer significant
    /// figures or a lower max.
    #[error("counts array length does not fit in usize")]
    UsizeTypeTooSmall,
}

/// Errors that can occur while recording a value and its associated count.
#[derive(Debug, Error, Eq, PartialEq, Clone, Copy)]
pub enum RecordError {
    /// The value to record is not representable in this histogram. Configure a higher maximum
    /// value, or use one of the `saturating_record` methods.
    #[error("value is out of the histogram's trackable range")]
    ValueOutOfRange,
}

/// Errors that can occur when adding another histogram.
#[derive(Debug, Error, Eq, PartialEq, Clone, Copy)]
pub enum AdditionError {
    /// The two histograms differ in highest trackable value, significant digits or layout, so
    /// their counts arrays do not line up slot for slot.
    #[error("histograms have incompatible configurations")]
    IncompatibleConfiguration,
    /// The other histogram includes values that do not fit in this histogram's range.
    #[error("the other histogram has values beyond this histogram's range")]
    OtherAddendValueExceedsRange,
}

/// Errors that can occur when subtracting another histogram.
#[derive(Debug, Error, Eq, PartialEq, Clone, Copy)]
pub enum SubtractionError {
    /// The two histograms differ in highest trackable value, significant digits or layout.
    #[error("histograms have incompatible configurations")]
    IncompatibleConfiguration,
    /// The other histogram includes counts that are higher than the current count for a value,
    /// and counts cannot go negative. Nothing is subtracted when this is returned.
    #[error("subtrahend count exceeds minuend count")]
    SubtrahendCountExceedsMinuendCount,
}

/// Errors that can occur when querying by percentile or quantile.
#[derive(Debug, Error, Eq, PartialEq, Clone, Copy)]
pub enum PercentileError {
    /// Percentiles must lie in `[0, 100]` (quantiles in `[0, 1]`), and may not be NaN.
    #[error("percentile must be within [0, 100]")]
    OutOfRange,
}
