//! Test-only policy, counting the resizes of its block.

use core::alloc::Layout;

use crate::{
    allocators::HeapAllocator,
    api::ContainerAllocator,
    utils::ReserveError,
};

//  Counts the resizes of its block.
#[derive(Debug, Default)]
pub(crate) struct CountingAllocator {
    inner: HeapAllocator,
    pub(crate) resizes: usize,
}

//  Safety:
//  -   Forwarded to `HeapAllocator`.
unsafe impl ContainerAllocator for CountingAllocator {
    type Size = i32;

    const REQUIRE_RANGE_CHECK: bool = true;

    const SUPPORTS_MOVE: bool = true;

    fn allocation(&self) -> *mut u8 {
        self.inner.allocation()
    }

    unsafe fn try_resize_allocation(
        &mut self,
        previous_num: usize,
        new_max: usize,
        item: Layout,
    ) -> Result<(), ReserveError> {
        self.resizes += 1;

        //  Safety:
        //  -   Forward pre-conditions.
        unsafe { self.inner.try_resize_allocation(previous_num, new_max, item) }
    }

    fn calculate_slack_grow(&self, num: usize, max: usize, item: Layout) -> usize {
        self.inner.calculate_slack_grow(num, max, item)
    }

    fn calculate_slack_shrink(&self, num: usize, max: usize, item: Layout) -> usize {
        self.inner.calculate_slack_shrink(num, max, item)
    }

    fn calculate_slack_reserve(&self, num: usize, item: Layout) -> usize {
        self.inner.calculate_slack_reserve(num, item)
    }

    fn allocated_size(&self, max: usize, item: Layout) -> usize {
        self.inner.allocated_size(max, item)
    }

    fn move_to_empty(&mut self, other: &mut Self) {
        self.inner.move_to_empty(&mut other.inner);
    }
}
