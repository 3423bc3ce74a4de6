//! The allocator contract, which every storage policy implements.
//!
//! A container splits its responsibilities with its allocation policy:
//!
//! -   The container decides how many items are live, and constructs, moves, and destroys them.
//! -   The policy decides how many slots are allocated, and obtains, resizes, and releases the backing memory.
//!
//! The policy is type-erased: it sees the items only through their `Layout`, so that a single policy type serves
//! every item type.

use core::{alloc::Layout, fmt, hash::Hash};

use crate::utils::ReserveError;

/// The integer type a policy uses for all the counts of a container: number of items, capacity, number of bits.
///
/// A narrower type makes the container smaller, at the cost of bounding its capacity.
pub trait SizeClass: Copy + fmt::Debug + Default + Eq + Hash + Ord + Send + Sync + 'static {
    /// The zero count.
    const ZERO: Self;

    /// The largest count representable, as a `usize`.
    const MAX: usize;

    /// Converts a count to `Self`.
    ///
    /// #   Panics
    ///
    /// In Debug, if `count` is greater than `Self::MAX`.
    ///
    /// In Release, the result is unspecified in that case.
    fn from_usize(count: usize) -> Self;

    /// Converts `self` to a count.
    ///
    /// #   Panics
    ///
    /// In Debug, if `self` is negative.
    ///
    /// In Release, the result is unspecified in that case.
    fn to_usize(self) -> usize;
}

macro_rules! size_class {
    ($($t:ty),* $(,)?) => {
        $(
            impl SizeClass for $t {
                const ZERO: Self = 0;

                const MAX: usize = {
                    let max = <$t>::MAX as u128;

                    if max > usize::MAX as u128 { usize::MAX } else { max as usize }
                };

                #[inline(always)]
                #[track_caller]
                fn from_usize(count: usize) -> Self {
                    debug_assert!(count <= <Self as SizeClass>::MAX, "count {count} overflows {}", stringify!($t));

                    count as _
                }

                #[inline(always)]
                #[track_caller]
                #[allow(unused_comparisons)]
                fn to_usize(self) -> usize {
                    debug_assert!(self >= 0, "negative count {self}");

                    self as _
                }
            }
        )*
    };
}

size_class!(i32, u32, i64, u64, isize, usize);

/// The allocator contract: a storage policy, owning the backing memory of a container.
///
/// All counts are expressed in items of `item` layout, as passed to each method. A container always passes the layout
/// of its item type, and a given instance is never used with different layouts.
///
/// #   Safety
///
/// -   Allocation: after a successful `try_resize_allocation(_, new_max, item)`, `allocation()` must point to a block
///     of memory valid for reads and writes of `new_max * item.size()` bytes, aligned to `item.align()`; it may be null if
///     that size is zero. The block must remain valid until the next call to `try_resize_allocation`,
///     `move_to_empty`, or until the instance is dropped.
/// -   Preservation: a resize must preserve the first `min(previous_num, new_max) * item.size()` bytes of the block.
/// -   Grow: `calculate_slack_grow(num, ..)` must return at least `num`, unless `num` exceeds `Self::Size::MAX`.
/// -   Shrink: `calculate_slack_shrink(num, max, ..)` must return a value in `[num, max]`.
/// -   Hand-off: if `SUPPORTS_MOVE` is true, `move_to_empty` must hand the block of `other` over to `self`, after which
///     `self.allocation()` is the former `other.allocation()`, and `other` holds no block.
pub unsafe trait ContainerAllocator {
    /// The integer type of all counts of the containers using this policy.
    type Size: SizeClass;

    /// Whether indexing must be range checked by the container, with a precise diagnostic.
    ///
    /// Indexing is memory safe regardless; policies which do not require the check let the containers use the
    /// cheaper bounds checks of slices.
    const REQUIRE_RANGE_CHECK: bool;

    /// Whether the block of one instance may be handed over to another, via `move_to_empty`.
    ///
    /// When false, moving a container's content degrades to relocating its items one block to the other.
    const SUPPORTS_MOVE: bool;

    /// Returns a pointer to the current block, or null if there is none.
    fn allocation(&self) -> *mut u8;

    /// Returns whether the instance currently holds a block.
    #[inline]
    fn has_allocation(&self) -> bool {
        !self.allocation().is_null()
    }

    /// Attempts to resize the block to hold `new_max` items, preserving the first `previous_num` items.
    ///
    /// On error, the block is left unchanged.
    ///
    /// #   Safety
    ///
    /// -   Layout: `item` must be the layout passed to all previous calls on this instance.
    /// -   Preservation: `previous_num` must not exceed the capacity of the current block, in items.
    unsafe fn try_resize_allocation(
        &mut self,
        previous_num: usize,
        new_max: usize,
        item: Layout,
    ) -> Result<(), ReserveError>;

    /// Resizes the block to hold `new_max` items, preserving the first `previous_num` items.
    ///
    /// #   Panics
    ///
    /// On capacity overflow. On allocation failure, see `ReserveError::raise`.
    ///
    /// #   Safety
    ///
    /// See `try_resize_allocation`.
    #[inline]
    #[track_caller]
    unsafe fn resize_allocation(&mut self, previous_num: usize, new_max: usize, item: Layout) {
        //  Safety:
        //  -   Forward pre-conditions.
        let result = unsafe { self.try_resize_allocation(previous_num, new_max, item) };

        if let Err(error) = result {
            error.raise();
        }
    }

    /// Computes the capacity to allocate for `num` items, when the current capacity `max` is insufficient.
    fn calculate_slack_grow(&self, num: usize, max: usize, item: Layout) -> usize;

    /// Computes the capacity to keep for `num` items, when the current capacity is `max`.
    ///
    /// Returns `max` to decline shrinking.
    fn calculate_slack_shrink(&self, num: usize, max: usize, item: Layout) -> usize;

    /// Computes the capacity to allocate when explicitly reserving room for `num` items.
    fn calculate_slack_reserve(&self, num: usize, item: Layout) -> usize;

    /// Returns the number of bytes allocated for a capacity of `max` items.
    fn allocated_size(&self, max: usize, item: Layout) -> usize;

    /// Takes over the block of `other`, releasing the block of `self` if any, and leaving `other` without a block.
    ///
    /// #   Panics
    ///
    /// If `SUPPORTS_MOVE` is false.
    fn move_to_empty(&mut self, other: &mut Self);
}

/// Computes the layout of an array of `n` items of `item` layout.
///
/// Returns an error if the size of the array overflows.
#[inline]
pub fn array_layout(item: Layout, n: usize) -> Result<Layout, ReserveError> {
    let size = item.size().checked_mul(n).ok_or(ReserveError::CapacityOverflow)?;

    Layout::from_size_align(size, item.align()).map_err(|_| ReserveError::CapacityOverflow)
}
