//! Heap allocation policies.

use core::{alloc::Layout, fmt, mem, ptr::NonNull};

use crate::{
    api::{ContainerAllocator, SizeClass, array_layout},
    utils::{
        ReserveError,
        alloc::{Allocator, Global},
        slack,
    },
};

/// Heap allocation policy.
///
/// -   Growth is geometric, see `utils::slack`.
/// -   Shrinking only occurs when the slack is large.
/// -   Indexing is range checked.
/// -   Blocks are handed over on moves.
pub struct HeapAllocator<A = Global>
where
    A: Allocator,
{
    //  Safety Invariants:
    //  -   Empty Null: if `layout.size()` is 0, then `ptr` is None.
    //  -   Self-Allocated: otherwise, `ptr` was allocated by `allocator`, with `layout`.
    ptr: Option<NonNull<u8>>,
    layout: Layout,
    allocator: A,
}

//
//  Creation
//

impl HeapAllocator<Global> {
    /// Returns a new instance, without any block.
    pub const fn new() -> Self {
        Self::new_in(Global)
    }
}

impl<A> HeapAllocator<A>
where
    A: Allocator,
{
    /// Returns a new instance, without any block, allocating from `allocator`.
    pub const fn new_in(allocator: A) -> Self {
        //  Safety Invariants:
        //  -   Empty Null: create an empty layout, and no pointer.
        let layout = Layout::new::<()>();

        Self {
            ptr: None,
            layout,
            allocator,
        }
    }

    /// Returns a reference to the underlying allocator.
    pub const fn allocator(&self) -> &A {
        &self.allocator
    }
}

//
//  ContainerAllocator
//

//  Safety:
//  -   Allocation: `ptr` is allocated with `array_layout(item, new_max)`.
//  -   Preservation: `grow` and `shrink` preserve the common prefix of the blocks.
//  -   Grow, Shrink: delegated to `utils::slack`.
//  -   Hand-off: `move_to_empty` swaps the blocks, and allocators.
unsafe impl<A> ContainerAllocator for HeapAllocator<A>
where
    A: Allocator,
{
    type Size = i32;

    const REQUIRE_RANGE_CHECK: bool = true;

    const SUPPORTS_MOVE: bool = true;

    #[inline]
    fn allocation(&self) -> *mut u8 {
        self.ptr.map_or(core::ptr::null_mut(), NonNull::as_ptr)
    }

    unsafe fn try_resize_allocation(
        &mut self,
        previous_num: usize,
        new_max: usize,
        item: Layout,
    ) -> Result<(), ReserveError> {
        #[cfg(feature = "tracing")]
        tracing::trace!(previous_num, new_max, item_size = item.size(), "resize allocation");

        #[cfg(not(feature = "tracing"))]
        let _ = previous_num;

        if new_max > <<Self as ContainerAllocator>::Size as SizeClass>::MAX {
            return Err(ReserveError::CapacityOverflow);
        }

        let new_layout = array_layout(item, new_max)?;

        //  Safety:
        //  -   `self.ptr` and `self.layout` satisfy the Safety Invariants.
        let new_ptr = unsafe { Self::reallocate(&self.allocator, self.ptr, self.layout, new_layout)? };

        //  Safety Invariants:
        //  -   Empty Null: `reallocate` returns None for empty layouts.
        //  -   Self-Allocated: `reallocate` allocates with `new_layout`, from `self.allocator`.
        self.ptr = new_ptr;
        self.layout = new_layout;

        Ok(())
    }

    #[inline]
    fn calculate_slack_grow(&self, num: usize, max: usize, _item: Layout) -> usize {
        slack::calculate_slack_grow(num, max, <<Self as ContainerAllocator>::Size as SizeClass>::MAX)
    }

    #[inline]
    fn calculate_slack_shrink(&self, num: usize, max: usize, item: Layout) -> usize {
        slack::calculate_slack_shrink(num, max, item.size())
    }

    #[inline]
    fn calculate_slack_reserve(&self, num: usize, _item: Layout) -> usize {
        slack::calculate_slack_reserve(num)
    }

    #[inline]
    fn allocated_size(&self, max: usize, item: Layout) -> usize {
        max.saturating_mul(item.size())
    }

    fn move_to_empty(&mut self, other: &mut Self) {
        if let Some(ptr) = self.ptr.take() {
            //  Safety:
            //  -   `ptr` was allocated by `self.allocator` with `self.layout`, as per Safety Invariants.
            unsafe { self.allocator.deallocate(ptr, self.layout) };

            self.layout = Layout::new::<()>();
        }

        //  The block of `other` may only be released by the allocator which allocated it.
        mem::swap(&mut self.allocator, &mut other.allocator);

        self.ptr = other.ptr.take();
        self.layout = mem::replace(&mut other.layout, Layout::new::<()>());
    }
}

//
//  Common traits
//

impl<A> Default for HeapAllocator<A>
where
    A: Allocator + Default,
{
    fn default() -> Self {
        Self::new_in(A::default())
    }
}

impl<A> Drop for HeapAllocator<A>
where
    A: Allocator,
{
    fn drop(&mut self) {
        let Some(ptr) = self.ptr else { return };

        //  Safety:
        //  -   `ptr` was allocated by `self.allocator` with `self.layout`, as per Safety Invariants.
        unsafe { self.allocator.deallocate(ptr, self.layout) };
    }
}

impl<A> fmt::Debug for HeapAllocator<A>
where
    A: Allocator,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        f.debug_struct("HeapAllocator")
            .field("ptr", &self.ptr)
            .field("bytes", &self.layout.size())
            .finish()
    }
}

//  Safety:
//  -   Just like a `Vec<u8, A>`.
unsafe impl<A> Send for HeapAllocator<A> where A: Allocator + Send {}

unsafe impl<A> Sync for HeapAllocator<A> where A: Allocator + Sync {}

//
//  Allocation implementation.
//

impl<A> HeapAllocator<A>
where
    A: Allocator,
{
    //  Moves the block `old`, of layout `old_layout`, into a block of layout `new_layout`.
    //
    //  On error, `old` is left untouched.
    //
    //  #   Safety
    //
    //  -   `old` and `old_layout` must satisfy the Safety Invariants, with regard to `allocator`.
    //  -   On success, the result and `new_layout` satisfy the Safety Invariants.
    #[inline(never)]
    unsafe fn reallocate(
        allocator: &A,
        old: Option<NonNull<u8>>,
        old_layout: Layout,
        new_layout: Layout,
    ) -> Result<Option<NonNull<u8>>, ReserveError> {
        let error = ReserveError::AllocError { layout: new_layout };

        let Some(old) = old else {
            if new_layout.size() == 0 {
                return Ok(None);
            }

            let new = allocator.allocate(new_layout).map_err(|_| error)?;

            return Ok(Some(new.cast()));
        };

        if new_layout.size() == 0 {
            //  Safety:
            //  -   `old` was allocated by `allocator` with `old_layout`, as per pre-condition.
            unsafe { allocator.deallocate(old, old_layout) };

            return Ok(None);
        }

        let new = if new_layout.size() >= old_layout.size() {
            //  Safety:
            //  -   Liveness, Selfness, Layout: as per pre-condition.
            //  -   Growth: just checked.
            unsafe { allocator.grow(old, old_layout, new_layout) }
        } else {
            //  Safety:
            //  -   Liveness, Selfness, Layout: as per pre-condition.
            //  -   Shrinkage: just checked.
            unsafe { allocator.shrink(old, old_layout, new_layout) }
        };

        let new = new.map_err(|_| error)?;

        Ok(Some(new.cast()))
    }
}

/// Heap allocation policy, without range checks.
///
/// Identical to `HeapAllocator`, except for `REQUIRE_RANGE_CHECK`.
pub struct UncheckedHeapAllocator<A = Global>(HeapAllocator<A>)
where
    A: Allocator;

impl UncheckedHeapAllocator<Global> {
    /// Returns a new instance, without any block.
    pub const fn new() -> Self {
        Self(HeapAllocator::new())
    }
}

impl<A> UncheckedHeapAllocator<A>
where
    A: Allocator,
{
    /// Returns a new instance, without any block, allocating from `allocator`.
    pub const fn new_in(allocator: A) -> Self {
        Self(HeapAllocator::new_in(allocator))
    }
}

//  Safety:
//  -   Forwarded to `HeapAllocator`.
unsafe impl<A> ContainerAllocator for UncheckedHeapAllocator<A>
where
    A: Allocator,
{
    type Size = <HeapAllocator<A> as ContainerAllocator>::Size;

    const REQUIRE_RANGE_CHECK: bool = false;

    const SUPPORTS_MOVE: bool = <HeapAllocator<A> as ContainerAllocator>::SUPPORTS_MOVE;

    #[inline]
    fn allocation(&self) -> *mut u8 {
        self.0.allocation()
    }

    #[inline]
    unsafe fn try_resize_allocation(
        &mut self,
        previous_num: usize,
        new_max: usize,
        item: Layout,
    ) -> Result<(), ReserveError> {
        //  Safety:
        //  -   Forward pre-conditions.
        unsafe { self.0.try_resize_allocation(previous_num, new_max, item) }
    }

    #[inline]
    fn calculate_slack_grow(&self, num: usize, max: usize, item: Layout) -> usize {
        self.0.calculate_slack_grow(num, max, item)
    }

    #[inline]
    fn calculate_slack_shrink(&self, num: usize, max: usize, item: Layout) -> usize {
        self.0.calculate_slack_shrink(num, max, item)
    }

    #[inline]
    fn calculate_slack_reserve(&self, num: usize, item: Layout) -> usize {
        self.0.calculate_slack_reserve(num, item)
    }

    #[inline]
    fn allocated_size(&self, max: usize, item: Layout) -> usize {
        self.0.allocated_size(max, item)
    }

    #[inline]
    fn move_to_empty(&mut self, other: &mut Self) {
        self.0.move_to_empty(&mut other.0);
    }
}

impl<A> Default for UncheckedHeapAllocator<A>
where
    A: Allocator + Default,
{
    fn default() -> Self {
        Self(HeapAllocator::default())
    }
}

impl<A> fmt::Debug for UncheckedHeapAllocator<A>
where
    A: Allocator,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        f.debug_tuple("UncheckedHeapAllocator").field(&self.0).finish()
    }
}
