//! Inline allocation policy.

use core::{alloc::Layout, cell::UnsafeCell, fmt, mem::MaybeUninit};

use crate::{
    api::{ContainerAllocator, SizeClass},
    utils::ReserveError,
};

/// The alignment of the inline block.
pub const FIXED_ALIGNMENT: usize = 16;

/// Inline allocation policy, storing up to `BYTES` bytes of items within the container itself.
///
/// -   The capacity is fixed: the whole block is handed out on the first growth, and never shrunk.
/// -   Exceeding the capacity is fatal.
/// -   Indexing is range checked.
/// -   Blocks cannot be handed over, hence moving the content of a container relocates its items.
///
/// Items aligned to more than `FIXED_ALIGNMENT` bytes cannot be stored.
pub struct FixedAllocator<const BYTES: usize> {
    //  Whether the block is in use, that is whether the last resize requested a non-zero capacity.
    in_use: bool,
    block: UnsafeCell<Block<BYTES>>,
}

impl<const BYTES: usize> FixedAllocator<BYTES> {
    /// Returns a new instance, with no block in use.
    pub const fn new() -> Self {
        let block = UnsafeCell::new(Block([MaybeUninit::uninit(); BYTES]));

        Self { in_use: false, block }
    }

    //  Returns the number of items of `item` layout fitting in the block, bounded by the size class.
    #[inline]
    fn fit(item: Layout) -> usize {
        let max = <<Self as ContainerAllocator>::Size as SizeClass>::MAX;

        match BYTES.checked_div(item.size()) {
            Some(fit) => fit.min(max),
            None => max,
        }
    }
}

//  Safety:
//  -   Allocation: the block is `BYTES` bytes, aligned on `FIXED_ALIGNMENT`, and resizes beyond either fail.
//  -   Preservation: the block never moves while `self` doesn't.
//  -   Grow: returns at least `num`, even when it does not fit.
//  -   Shrink: returns `max`.
//  -   Hand-off: `SUPPORTS_MOVE` is false.
unsafe impl<const BYTES: usize> ContainerAllocator for FixedAllocator<BYTES> {
    type Size = u32;

    const REQUIRE_RANGE_CHECK: bool = true;

    const SUPPORTS_MOVE: bool = false;

    #[inline]
    fn allocation(&self) -> *mut u8 {
        if self.in_use {
            self.block.get().cast()
        } else {
            core::ptr::null_mut()
        }
    }

    unsafe fn try_resize_allocation(
        &mut self,
        _previous_num: usize,
        new_max: usize,
        item: Layout,
    ) -> Result<(), ReserveError> {
        if new_max > Self::fit(item) {
            let size = item.size().saturating_mul(new_max);
            let layout = Layout::from_size_align(size, item.align()).map_err(|_| ReserveError::CapacityOverflow)?;

            return Err(ReserveError::AllocError { layout });
        }

        if item.align() > FIXED_ALIGNMENT {
            let layout = Layout::from_size_align(item.size() * new_max, item.align())
                .map_err(|_| ReserveError::CapacityOverflow)?;

            return Err(ReserveError::AllocError { layout });
        }

        self.in_use = new_max != 0;

        Ok(())
    }

    //  Running out of inline bytes is a logic error, not an out-of-memory condition.
    #[inline]
    #[track_caller]
    unsafe fn resize_allocation(&mut self, previous_num: usize, new_max: usize, item: Layout) {
        //  Safety:
        //  -   Forward pre-conditions.
        let result = unsafe { self.try_resize_allocation(previous_num, new_max, item) };

        if let Err(error) = result {
            panic!("{error}");
        }
    }

    #[inline]
    fn calculate_slack_grow(&self, num: usize, _max: usize, item: Layout) -> usize {
        Self::fit(item).max(num)
    }

    #[inline]
    fn calculate_slack_shrink(&self, _num: usize, max: usize, _item: Layout) -> usize {
        max
    }

    #[inline]
    fn calculate_slack_reserve(&self, num: usize, item: Layout) -> usize {
        Self::fit(item).max(num)
    }

    #[inline]
    fn allocated_size(&self, _max: usize, _item: Layout) -> usize {
        0
    }

    #[track_caller]
    fn move_to_empty(&mut self, _other: &mut Self) {
        panic!("FixedAllocator<{BYTES}> cannot hand over its block");
    }
}

impl<const BYTES: usize> Default for FixedAllocator<BYTES> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const BYTES: usize> fmt::Debug for FixedAllocator<BYTES> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        f.debug_struct("FixedAllocator")
            .field("bytes", &BYTES)
            .field("in_use", &self.in_use)
            .finish()
    }
}

//  Safety:
//  -   The block is only ever written through `&mut` access to the container, and thus to `self`.
unsafe impl<const BYTES: usize> Sync for FixedAllocator<BYTES> {}

//
//  Implementation
//

#[repr(C, align(16))]
struct Block<const BYTES: usize>([MaybeUninit<u8>; BYTES]);

const _: () = assert!(core::mem::align_of::<Block<0>>() == FIXED_ALIGNMENT);

#[cfg(test)]
mod tests {
    use super::*;

    const ITEM: Layout = Layout::new::<u64>();

    #[test]
    fn empty() {
        let allocator = FixedAllocator::<64>::new();

        assert!(!allocator.has_allocation());
        assert_eq!(0, allocator.allocated_size(8, ITEM));
    }

    #[test]
    fn grow_hands_out_everything() {
        let allocator = FixedAllocator::<64>::new();

        assert_eq!(8, allocator.calculate_slack_grow(1, 0, ITEM));
        assert_eq!(8, allocator.calculate_slack_reserve(3, ITEM));
        assert_eq!(9, allocator.calculate_slack_grow(9, 8, ITEM));

        assert_eq!(8, allocator.calculate_slack_shrink(0, 8, ITEM));
    }

    #[test]
    fn zero_sized_items() {
        let allocator = FixedAllocator::<0>::new();

        assert_eq!(u32::MAX as usize, allocator.calculate_slack_grow(1, 0, Layout::new::<()>()));
    }

    #[test]
    fn resize() {
        let mut allocator = FixedAllocator::<64>::new();

        //  Safety:
        //  -   `ITEM` is used throughout.
        unsafe { allocator.resize_allocation(0, 8, ITEM) };

        let block = allocator.allocation();

        assert!(!block.is_null());
        assert_eq!(0, block as usize % FIXED_ALIGNMENT);

        //  Safety:
        //  -   `ITEM` is used throughout.
        unsafe { allocator.resize_allocation(8, 2, ITEM) };

        assert_eq!(block, allocator.allocation());

        //  Safety:
        //  -   `ITEM` is used throughout.
        unsafe { allocator.resize_allocation(0, 0, ITEM) };

        assert!(!allocator.has_allocation());
    }

    #[test]
    fn resize_too_large() {
        let mut allocator = FixedAllocator::<64>::new();

        //  Safety:
        //  -   `ITEM` is used throughout.
        let result = unsafe { allocator.try_resize_allocation(0, 9, ITEM) };

        let layout = Layout::from_size_align(72, 8).expect("valid layout");

        assert_eq!(Err(ReserveError::AllocError { layout }), result);
    }

    #[test]
    #[should_panic(expected = "memory allocation of 128 bytes (aligned to 8) failed")]
    fn resize_allocation_too_large() {
        let mut allocator = FixedAllocator::<64>::new();

        //  Safety:
        //  -   `ITEM` is used throughout.
        unsafe { allocator.resize_allocation(0, 16, ITEM) };
    }

    #[test]
    fn resize_over_aligned() {
        #[repr(align(32))]
        struct Wide(#[allow(dead_code)] u8);

        let mut allocator = FixedAllocator::<64>::new();

        //  Safety:
        //  -   `Wide` is used throughout.
        let result = unsafe { allocator.try_resize_allocation(0, 1, Layout::new::<Wide>()) };

        assert!(matches!(result, Err(ReserveError::AllocError { .. })));
    }

    #[test]
    #[should_panic]
    fn move_to_empty() {
        let mut from = FixedAllocator::<64>::new();
        let mut to = FixedAllocator::<64>::new();

        to.move_to_empty(&mut from);
    }

    static_assertions::assert_impl_all!(FixedAllocator<64>: Send, Sync, Default);
}
