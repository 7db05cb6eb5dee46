use crate::errors::{CreationError, RecordError};

/// Maps recorded values to counts-array slots and back.
///
/// An `Encoding` is derived once from a highest trackable value and a number of significant
/// decimal digits, and is immutable afterwards. All of its methods are pure functions of that
/// configuration, so every counter store indexes its slots identically.
///
/// The buckets (each of which has `sub_bucket_count` sub-buckets, here assumed to be 2048 as an
/// example) overlap:
///
/// ```text
/// The 0'th bucket covers 0...2047 in multiples of 1, using all 2048 sub-buckets
/// The 1'th bucket covers 2048..4097 in multiples of 2, using only the top 1024 sub-buckets
/// The 2'th bucket covers 4096..8191 in multiple of 4, using only the top 1024 sub-buckets
/// ...
/// ```
///
/// Bucket 0 is "special" here. It is the only one that has 2048 entries. All the rest have 1024
/// entries (because their bottom half overlaps with and is already covered by the all of the
/// previous buckets put together). In other words, the k'th bucket could represent 0 * 2^k to
/// 2048 * 2^k in 2048 buckets with 2^k precision, but the midpoint of 1024 * 2^k = 2048 *
/// 2^(k-1) = the k-1'th bucket's end, so we would use the previous bucket for those lower values
/// as it has better precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Encoding {
    pub(crate) highest_trackable_value: u64,
    pub(crate) significant_value_digits: u8,

    pub(crate) bucket_count: u8,
    pub(crate) sub_bucket_count: u32,

    // Number of leading zeros in the largest value that can fit in bucket 0.
    pub(crate) leading_zero_count_base: u8,
    pub(crate) sub_bucket_half_count_magnitude: u8,

    pub(crate) sub_bucket_half_count: u32,
    pub(crate) sub_bucket_mask: u64,

    pub(crate) len: usize,
}

impl Encoding {
    /// Derive the slot layout for values in `[0, high]` at `sigfig` significant decimal digits.
    ///
    /// `high` must be >= 2 and `sigfig` must be in `[0, 5]`.
    pub fn new(high: u64, sigfig: u8) -> Result<Encoding, CreationError> {
        if high < 2 {
            return Err(CreationError::HighLessThanTwo);
        }
        if sigfig > 5 {
            return Err(CreationError::SigFigExceedsMax);
        }

        // Given a 3 decimal point accuracy, the expectation is obviously for "+/- 1 unit at 1000".
        // It also means that it's "ok to be +/- 2 units at 2000". The "tricky" thing is that it is
        // NOT ok to be +/- 2 units at 1999. Only starting at 2000. So internally, we need to
        // maintain single unit resolution to 2x 10^decimal_points.
        let largest = 2 * 10_u64.pow(u32::from(sigfig));

        // We need to maintain power-of-two sub_bucket_count (for clean direct indexing) that is
        // large enough to provide unit resolution to at least largest. So figure out largest's
        // nearest power-of-two (rounded up), and use that. `largest` is at least 2, so this is
        // at least 1.
        let sub_bucket_count_magnitude = (64 - (largest - 1).leading_zeros()) as u8;
        let sub_bucket_half_count_magnitude = sub_bucket_count_magnitude - 1;

        let sub_bucket_count = 1_u32 << u32::from(sub_bucket_count_magnitude);

        let mut e = Encoding {
            highest_trackable_value: high,
            significant_value_digits: sigfig,

            bucket_count: 0,
            sub_bucket_count,

            leading_zero_count_base: 64 - sub_bucket_half_count_magnitude - 1,
            sub_bucket_half_count_magnitude,

            sub_bucket_half_count: sub_bucket_count / 2,
            sub_bucket_mask: u64::from(sub_bucket_count) - 1,

            len: 0,
        };

        e.bucket_count = e.buckets_to_cover(high);
        e.len = e
            .num_bins(e.bucket_count)
            .ok_or(CreationError::UsizeTypeTooSmall)?;
        Ok(e)
    }

    /// The highest value this layout was configured to track.
    pub fn highest_trackable_value(&self) -> u64 {
        self.highest_trackable_value
    }

    /// The number of significant decimal digits this layout preserves.
    pub fn significant_value_digits(&self) -> u8 {
        self.significant_value_digits
    }

    /// Number of power-of-two buckets.
    pub fn bucket_count(&self) -> u8 {
        self.bucket_count
    }

    /// Number of linear sub-buckets per bucket.
    pub fn sub_bucket_count(&self) -> u32 {
        self.sub_bucket_count
    }

    /// Half of `sub_bucket_count`.
    pub fn sub_bucket_half_count(&self) -> u32 {
        self.sub_bucket_half_count
    }

    /// `log2(sub_bucket_count) - 1`.
    pub fn sub_bucket_half_count_magnitude(&self) -> u8 {
        self.sub_bucket_half_count_magnitude
    }

    /// `sub_bucket_count - 1`.
    pub fn sub_bucket_mask(&self) -> u64 {
        self.sub_bucket_mask
    }

    /// Length of the counts array for this layout.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether two layouts index their counts arrays identically.
    pub fn is_compatible_with(&self, other: &Encoding) -> bool {
        self.highest_trackable_value == other.highest_trackable_value
            && self.significant_value_digits == other.significant_value_digits
            && self.bucket_count == other.bucket_count
            && self.sub_bucket_count == other.sub_bucket_count
    }

    /// Return the lowest (and therefore highest precision) bucket index that can represent the
    /// value.
    #[inline]
    pub fn bucket_for(&self, value: u64) -> u8 {
        // Calculates the number of powers of two by which the value is greater than the biggest
        // value that fits in bucket 0. This is the bucket index since each successive bucket can
        // hold a value 2x greater. The mask maps small values to bucket 0.
        // Will not underflow because sub_bucket_mask caps the leading zeros to no more than
        // leading_zero_count_base.
        self.leading_zero_count_base - (value | self.sub_bucket_mask).leading_zeros() as u8
    }

    /// Sub-bucket index of `value` within the bucket `bucket_index`.
    #[inline]
    pub fn sub_bucket_for(&self, value: u64, bucket_index: u8) -> u32 {
        // For bucket_index 0, this is just value, so it may be anywhere in 0 to
        // sub_bucket_count. For other bucket_index, this will always end up in the top half of
        // sub_bucket_count: assume that for some bucket k > 0, this calculation will yield a
        // value in the bottom half of 0 to sub_bucket_count. Then, because of how buckets
        // overlap, it would have also been in the top half of bucket k-1, and therefore would
        // have returned k-1 in bucket_for(). Since we would then shift it one fewer bits here, it
        // would be twice as big, and therefore in the top half of sub_bucket_count.
        (value >> u32::from(bucket_index)) as u32
    }

    /// Counts-array position of the slot at `(bucket_index, sub_bucket_index)`.
    ///
    /// The result may lie beyond `len()` for locations past the configured range.
    #[inline]
    pub fn counts_array_index(&self, bucket_index: u8, sub_bucket_index: u32) -> usize {
        debug_assert!(sub_bucket_index < self.sub_bucket_count);
        debug_assert!(bucket_index == 0 || (sub_bucket_index >= self.sub_bucket_half_count));

        // Calculate the index for the first entry that will be used in the bucket (halfway
        // through sub_bucket_count). For bucket_index 0, all sub_bucket_count entries may be
        // used, but bucket_base_index is still set in the middle.
        let bucket_base_index =
            (bucket_index as usize + 1) << self.sub_bucket_half_count_magnitude as usize;

        // Calculate the offset in the bucket. This subtraction is non-negative in all buckets
        // except the 0th one (since a value in that bucket may be less than half the bucket's 0
        // to sub_bucket_count range). Adding the base first keeps it non-negative there too,
        // since bucket 0's base is exactly sub_bucket_half_count.
        bucket_base_index + sub_bucket_index as usize - self.sub_bucket_half_count as usize
    }

    /// Counts-array index for `value`, or `None` if it lies past the end of the array.
    #[inline]
    pub fn index_for(&self, value: u64) -> Option<usize> {
        let bucket_index = self.bucket_for(value);
        let sub_bucket_index = self.sub_bucket_for(value, bucket_index);
        let index = self.counts_array_index(bucket_index, sub_bucket_index);
        if index < self.len {
            Some(index)
        } else {
            None
        }
    }

    /// Like `index_for`, but clamps values past the end of the array to the last index.
    #[inline]
    pub fn index_for_or_last(&self, value: u64) -> usize {
        self.index_for(value).unwrap_or(self.len - 1)
    }

    /// Lowest value that maps to the slot at `index`.
    ///
    /// Works for any index, including ones past the end of the counts array; values that would
    /// not fit in a `u64` saturate to `u64::max_value()`.
    pub fn value_for(&self, index: usize) -> u64 {
        // Dividing by sub bucket half count will yield 1 in top half of first bucket, 2 in
        // in the top half (i.e., the only half that's used) of the 2nd bucket, etc, so subtract 1
        // to get 0-indexed bucket indexes. This will be -1 for the bottom half of the first
        // bucket.
        let mut bucket_index = (index >> self.sub_bucket_half_count_magnitude) as isize - 1;

        // Calculate the remainder of dividing by sub_bucket_half_count, shifted into the top half
        // of the corresponding bucket. This will (temporarily) map indexes in the lower half of
        // first bucket into the top half.
        let mut sub_bucket_index = ((index & (self.sub_bucket_half_count as usize - 1))
            + self.sub_bucket_half_count as usize) as u32;
        if bucket_index < 0 {
            // lower half of first bucket case; move sub bucket index back
            sub_bucket_index -= self.sub_bucket_half_count;
            bucket_index = 0;
        }
        value_from_loc(bucket_index as u32, sub_bucket_index)
    }

    /// Get the size (in value units) of the range of values that are equivalent to the given
    /// value within this layout's resolution.
    pub fn equivalent_range(&self, value: u64) -> u64 {
        let bucket_index = self.bucket_for(value);
        let sub_bucket_index = self.sub_bucket_for(value, bucket_index);
        // calculate distance to next value
        1_u64
            << (if sub_bucket_index >= self.sub_bucket_count {
                bucket_index + 1
            } else {
                bucket_index
            })
    }

    /// Get the lowest value that is equivalent to the given value within this layout's
    /// resolution.
    pub fn lowest_equivalent(&self, value: u64) -> u64 {
        let bucket_index = self.bucket_for(value);
        let sub_bucket_index = self.sub_bucket_for(value, bucket_index);
        value_from_loc(u32::from(bucket_index), sub_bucket_index)
    }

    /// Get the highest value that is equivalent to the given value within this layout's
    /// resolution.
    pub fn highest_equivalent(&self, value: u64) -> u64 {
        if value == u64::max_value() {
            u64::max_value()
        } else {
            self.next_non_equivalent(value) - 1
        }
    }

    /// Get a value that lies in the middle (rounded up) of the range of values equivalent the
    /// given value.
    pub fn median_equivalent(&self, value: u64) -> u64 {
        // adding half of the range to the bottom of the range shouldn't overflow
        self.lowest_equivalent(value)
            .saturating_add(self.equivalent_range(value) >> 1)
    }

    /// Get the next value that is not equivalent to the given value within this layout's
    /// resolution.
    pub fn next_non_equivalent(&self, value: u64) -> u64 {
        self.lowest_equivalent(value)
            .saturating_add(self.equivalent_range(value))
    }

    /// Determine if two values are equivalent with this layout's resolution.
    pub fn equivalent(&self, value1: u64, value2: u64) -> bool {
        self.lowest_equivalent(value1) == self.lowest_equivalent(value2)
    }

    /// Conservative estimate of the memory a counts array of `width`-byte slots occupies,
    /// including a fixed allowance for the histogram object itself.
    ///
    /// ```text
    /// 512 + (width / 2) * (ceil(log2(highest / sub_bucket_count)) + 2) * sub_bucket_count
    /// ```
    pub fn estimated_footprint(&self, width: usize) -> usize {
        let ratio = self.highest_trackable_value / u64::from(self.sub_bucket_count);
        // ceil(log2(ratio)), taking ratios of 0 and 1 as needing no extra doublings
        let doublings = if ratio <= 1 {
            0
        } else {
            64 - (ratio - 1).leading_zeros() as usize
        };
        512 + (width * (doublings + 2) * self.sub_bucket_count as usize) / 2
    }

    /// Visit the slot of `value` and then, if `interval > 0`, the slots of the decreasingly
    /// smaller values (`value - interval`, `value - 2 * interval`, ... down to `interval`) that a
    /// sampler stalled for `value` would have missed.
    ///
    /// Fails before visiting anything if `value` is out of range. Every synthesized value is
    /// smaller than `value`, so once `value` fits, they all do.
    pub(crate) fn for_each_corrected_index<F: FnMut(usize)>(
        &self,
        value: u64,
        interval: u64,
        mut visit: F,
    ) -> Result<(), RecordError> {
        let index = self.index_for(value).ok_or(RecordError::ValueOutOfRange)?;
        visit(index);

        if interval == 0 {
            return Ok(());
        }

        if value > interval {
            // only enter loop when calculations will stay positive
            let mut missing_value = value - interval;
            while missing_value >= interval {
                visit(self.index_for_or_last(missing_value));
                missing_value -= interval;
            }
        }

        Ok(())
    }

    fn buckets_to_cover(&self, value: u64) -> u8 {
        // the k'th bucket can express from 0 * 2^k to sub_bucket_count * 2^k in units of 2^k
        let mut smallest_untrackable_value = u64::from(self.sub_bucket_count);

        // always have at least 1 bucket
        let mut buckets_needed = 1;
        while smallest_untrackable_value <= value {
            if smallest_untrackable_value > u64::max_value() / 2 {
                // next shift will overflow, meaning that bucket could represent values up to ones
                // greater than u64::max_value, so it's the last bucket
                return buckets_needed + 1;
            }
            smallest_untrackable_value <<= 1;
            buckets_needed += 1;
        }
        buckets_needed
    }

    /// If we have N such that sub_bucket_count * 2^N > high, we need storage for N+1 buckets,
    /// each with enough slots to hold the top half of the sub_bucket_count (the lower half is
    /// covered by previous buckets), and the +1 being used for the lower half of the 0'th
    /// bucket. Or, equivalently, we need 1 more bucket to capture the max value if we consider
    /// the sub-bucket length to be halved.
    fn num_bins(&self, number_of_buckets: u8) -> Option<usize> {
        (number_of_buckets as usize + 1).checked_mul(self.sub_bucket_half_count as usize)
    }
}

#[inline]
fn value_from_loc(bucket_index: u32, sub_bucket_index: u32) -> u64 {
    let sub = u64::from(sub_bucket_index);
    // past the top of the u64 domain (only reachable for indices beyond the counts array)
    if bucket_index >= 64 || (bucket_index > 0 && sub.leading_zeros() < bucket_index) {
        return u64::max_value();
    }
    sub << bucket_index
}
