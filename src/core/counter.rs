use num_traits as num;

/// This trait represents the operations a counts array needs from its per-slot integer type.
///
/// Slots of every width are updated with wrapping arithmetic: a narrow slot that receives more
/// counts than it can hold silently wraps around. The histogram keeps its total separately, so
/// such a wrap can be detected after the fact (see `Histogram::has_overflowed`).
pub trait Counter:
    num::Unsigned + num::WrappingAdd + num::WrappingSub + num::ToPrimitive + Copy + PartialOrd<Self>
{
    /// Width of one slot in bytes.
    const WIDTH: usize;

    /// Counter as a u64.
    fn as_u64(&self) -> u64;
    /// Truncate a u64 to this width, keeping the low bits.
    fn from_u64_wrapping(value: u64) -> Self;
}

macro_rules! counter_impl {
    ($t:ty) => {
        impl Counter for $t {
            const WIDTH: usize = std::mem::size_of::<$t>();

            #[inline]
            fn as_u64(&self) -> u64 {
                *self as u64
            }

            #[inline]
            fn from_u64_wrapping(value: u64) -> Self {
                value as $t
            }
        }
    };
}

counter_impl!(u8);
counter_impl!(u16);
counter_impl!(u32);
counter_impl!(u64);
