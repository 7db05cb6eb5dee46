use crate::core::counter::Counter;

/// Storage for a histogram's per-slot counts and its running total.
///
/// The total is kept separately from the slots rather than derived from them. For stores whose
/// slots are narrower than the total, a slot that wraps around makes the two diverge, which is
/// how overflow is detected after the fact.
///
/// Slot updates wrap at the slot width. How the total behaves at `u64::max_value()` is up to the
/// store; `Counts` saturates it.
pub trait CounterStore {
    /// Width in bytes of one slot, as used by footprint estimation.
    const SLOT_WIDTH: usize;

    /// Allocate `len` zeroed slots and a zero total.
    fn with_len(len: usize) -> Self
    where
        Self: Sized;

    /// Number of slots.
    fn len(&self) -> usize;

    /// Count in slot `index`. Panics if `index >= len()`.
    fn count_at(&self, index: usize) -> u64;

    /// Add one to slot `index`.
    fn increment_at(&mut self, index: usize) {
        self.add_at(index, 1)
    }

    /// Add `count` to slot `index`, wrapping at the slot width.
    fn add_at(&mut self, index: usize, count: u64);

    /// Subtract `count` from slot `index`, wrapping at the slot width.
    fn sub_at(&mut self, index: usize, count: u64);

    /// Running total of all counts ever added.
    fn total(&self) -> u64;

    /// Overwrite the running total.
    fn set_total(&mut self, total: u64);

    /// Add one to the running total.
    fn increment_total(&mut self) {
        self.add_total(1)
    }

    /// Add `count` to the running total.
    fn add_total(&mut self, count: u64);

    /// Zero every slot and the total.
    fn clear(&mut self);
}

/// A store whose slots and total can be updated through a shared reference, from any number of
/// threads at once.
///
/// Every update is a single atomic read-modify-write, so no increment is ever lost. Readers get
/// no snapshot isolation: a reader walking the slots while writers are active may observe some
/// updates and not others, and may see slots that do not yet sum to the total.
pub trait SharedCounterStore: CounterStore + Sync {
    /// Atomically add `count` to slot `index`.
    fn add_at_shared(&self, index: usize, count: u64);

    /// Atomically add `count` to the running total.
    fn add_total_shared(&self, count: u64);
}

/// Plain, single-threaded counts with a configurable slot width.
///
/// With `u64` slots this is the wide store that cannot realistically overflow. With `u8`, `u16`
/// or `u32` slots it trades memory for the risk of silent per-slot wrap-around, which
/// `Histogram::has_overflowed` can detect afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Counts<C: Counter> {
    counts: Vec<C>,
    total: u64,
}

impl<C: Counter> CounterStore for Counts<C> {
    const SLOT_WIDTH: usize = C::WIDTH;

    fn with_len(len: usize) -> Self {
        Counts {
            counts: vec![C::zero(); len],
            total: 0,
        }
    }

    #[inline]
    fn len(&self) -> usize {
        self.counts.len()
    }

    #[inline]
    fn count_at(&self, index: usize) -> u64 {
        self.counts[index].as_u64()
    }

    #[inline]
    fn add_at(&mut self, index: usize, count: u64) {
        let c = &mut self.counts[index];
        *c = c.wrapping_add(&C::from_u64_wrapping(count));
    }

    #[inline]
    fn sub_at(&mut self, index: usize, count: u64) {
        let c = &mut self.counts[index];
        *c = c.wrapping_sub(&C::from_u64_wrapping(count));
    }

    #[inline]
    fn total(&self) -> u64 {
        self.total
    }

    fn set_total(&mut self, total: u64) {
        self.total = total;
    }

    #[inline]
    fn add_total(&mut self, count: u64) {
        self.total = self.total.saturating_add(count);
    }

    fn clear(&mut self) {
        for c in self.counts.iter_mut() {
            *c = C::zero();
        }
        self.total = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn narrow_slot_wraps_while_total_keeps_counting() {
        let mut c = Counts::<u8>::with_len(4);
        c.add_at(1, 200);
        c.add_total(200);
        c.add_at(1, 100);
        c.add_total(100);

        assert_eq!(44, c.count_at(1));
        assert_eq!(300, c.total());
    }

    #[test]
    fn wide_total_saturates() {
        let mut c = Counts::<u64>::with_len(2);
        c.add_total(u64::max_value());
        c.increment_total();
        assert_eq!(u64::max_value(), c.total());
    }

    #[test]
    fn clear_zeroes_slots_and_total() {
        let mut c = Counts::<u16>::with_len(3);
        c.increment_at(0);
        c.add_at(2, 7);
        c.set_total(8);
        c.clear();

        assert_eq!(0, c.total());
        assert!((0..c.len()).all(|i| c.count_at(i) == 0));
    }

    #[test]
    fn sub_undoes_add() {
        let mut c = Counts::<u32>::with_len(2);
        c.add_at(1, 10);
        c.sub_at(1, 4);
        assert_eq!(6, c.count_at(1));
    }
}
