//! Shim for unstable allocator API.
//!
//! -   If only `alloc` is used, then duplicates the subset of the allocator API the heap policies rely on.
//! -   If `allocator_api` is used, then forwards the allocator API.

#[cfg(feature = "allocator_api")]
pub use alloc::alloc::{AllocError, Allocator, Global};

#[cfg(not(feature = "allocator_api"))]
pub use shim::{AllocError, Allocator, Global};

#[cfg(not(feature = "allocator_api"))]
pub(super) mod shim {
    use core::{
        alloc::Layout,
        error, fmt,
        ptr::{self, NonNull},
    };

    use alloc::alloc;

    /// The AllocError error indicates an allocation failure that may be due to resource exhaustion or to something
    /// wrong when combining the given input arguments with this allocator.
    #[derive(Copy, Clone, PartialEq, Eq, Debug)]
    pub struct AllocError;

    impl fmt::Display for AllocError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
            f.write_str("memory allocation failed")
        }
    }

    impl error::Error for AllocError {}

    /// An implementation of Allocator can allocate, grow, shrink, and deallocate arbitrary blocks of data described via
    /// Layout.
    ///
    /// #   Safety
    ///
    /// -   Liveness: memory blocks that are currently allocated by an allocator must point to valid memory until either
    ///     they are deallocated or the `Allocator` and all its clones are dropped.
    /// -   Independence: moving an allocator must not invalidate memory blocks returned from it.
    /// -   Shallowness: a copied or cloned allocator must behave like the original allocator.
    pub unsafe trait Allocator {
        /// Attempts to allocate a block of memory.
        fn allocate(&self, layout: Layout) -> Result<NonNull<[u8]>, AllocError>;

        /// Deallocates the memory referenced by ptr.
        ///
        /// #   Safety
        ///
        /// -   Liveness: `ptr` must still be allocated.
        /// -   Selfness: `ptr` must have been allocated by `self`.
        /// -   Layout: `layout` must match the layout passed to `self.allocate(...)` when allocating `ptr`.
        unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout);

        /// Attempts to extend the memory block.
        ///
        /// The first `old_layout.size()` bytes of the new block hold the content of the old block, the remaining
        /// bytes are uninitialized.
        ///
        /// #   Safety
        ///
        /// -   Liveness: `ptr` must still be allocated.
        /// -   Selfness: `ptr` must have been allocated by `self`.
        /// -   Layout: `old_layout` must match the layout passed to `self.allocate(...)` when allocating `ptr`.
        /// -   Growth: `new_layout.size()` must be greater than or equal to `old_layout.size()`.
        unsafe fn grow(
            &self,
            ptr: NonNull<u8>,
            old_layout: Layout,
            new_layout: Layout,
        ) -> Result<NonNull<[u8]>, AllocError> {
            debug_assert!(new_layout.size() >= old_layout.size());

            let new_ptr = self.allocate(new_layout)?;

            //  Safety:
            //  -   `ptr` is valid for `old_layout.size()` reads, as per Liveness & Layout pre-conditions.
            //  -   `new_ptr` is valid for `old_layout.size()` writes, as per Growth pre-condition.
            //  -   `ptr` and `new_ptr` point to non-overlapping blocks, as `new_ptr` is freshly allocated.
            unsafe { ptr::copy_nonoverlapping(ptr.as_ptr(), new_ptr.cast::<u8>().as_ptr(), old_layout.size()) };

            //  Safety:
            //  -   Liveness, Selfness, Layout: as per pre-conditions.
            unsafe { self.deallocate(ptr, old_layout) };

            Ok(new_ptr)
        }

        /// Attempts to shrink the memory block.
        ///
        /// The new block holds the first `new_layout.size()` bytes of the old block.
        ///
        /// #   Safety
        ///
        /// -   Liveness: `ptr` must still be allocated.
        /// -   Selfness: `ptr` must have been allocated by `self`.
        /// -   Layout: `old_layout` must match the layout passed to `self.allocate(...)` when allocating `ptr`.
        /// -   Shrinkage: `new_layout.size()` must be less than or equal to `old_layout.size()`.
        unsafe fn shrink(
            &self,
            ptr: NonNull<u8>,
            old_layout: Layout,
            new_layout: Layout,
        ) -> Result<NonNull<[u8]>, AllocError> {
            debug_assert!(new_layout.size() <= old_layout.size());

            let new_ptr = self.allocate(new_layout)?;

            //  Safety:
            //  -   `ptr` is valid for `new_layout.size()` reads, as per Liveness & Shrinkage pre-conditions.
            //  -   `new_ptr` is valid for `new_layout.size()` writes, as per `allocate` post-conditions.
            //  -   `ptr` and `new_ptr` point to non-overlapping blocks, as `new_ptr` is freshly allocated.
            unsafe { ptr::copy_nonoverlapping(ptr.as_ptr(), new_ptr.cast::<u8>().as_ptr(), new_layout.size()) };

            //  Safety:
            //  -   Liveness, Selfness, Layout: as per pre-conditions.
            unsafe { self.deallocate(ptr, old_layout) };

            Ok(new_ptr)
        }
    }

    /// The global memory allocator.
    #[derive(Copy, Clone, Default, Debug)]
    pub struct Global;

    //  Safety:
    //  -   Liveness, Independence, Shallowness: guaranteed by the global allocator.
    unsafe impl Allocator for Global {
        #[inline]
        fn allocate(&self, layout: Layout) -> Result<NonNull<[u8]>, AllocError> {
            if layout.size() == 0 {
                return Ok(NonNull::slice_from_raw_parts(NonNull::dangling(), 0));
            }

            //  Safety:
            //  -   `layout` has a non-zero size.
            let raw_ptr = unsafe { alloc::alloc(layout) };

            let ptr = NonNull::new(raw_ptr).ok_or(AllocError)?;

            Ok(NonNull::slice_from_raw_parts(ptr, layout.size()))
        }

        #[inline]
        unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
            if layout.size() == 0 {
                return;
            }

            //  Safety:
            //  -   `ptr.as_ptr()` is currently allocated, as per Liveness pre-condition.
            //  -   `ptr.as_ptr()` was allocated by `self`, as per Selfness pre-condition.
            //  -   `layout` matches the layout of `ptr.as_ptr()` as per Layout pre-condition.
            unsafe { alloc::dealloc(ptr.as_ptr(), layout) }
        }

        #[inline]
        unsafe fn grow(
            &self,
            ptr: NonNull<u8>,
            old_layout: Layout,
            new_layout: Layout,
        ) -> Result<NonNull<[u8]>, AllocError> {
            debug_assert!(new_layout.size() >= old_layout.size());

            //  Safety:
            //  -   Forward pre-conditions.
            unsafe { self.realloc_impl(ptr, old_layout, new_layout) }
        }

        #[inline]
        unsafe fn shrink(
            &self,
            ptr: NonNull<u8>,
            old_layout: Layout,
            new_layout: Layout,
        ) -> Result<NonNull<[u8]>, AllocError> {
            debug_assert!(new_layout.size() <= old_layout.size());

            //  Safety:
            //  -   Forward pre-conditions.
            unsafe { self.realloc_impl(ptr, old_layout, new_layout) }
        }
    }

    //
    //  Implementation
    //

    impl Global {
        //  #   Safety
        //
        //  -   Liveness, Selfness, Layout: as per `grow` and `shrink`.
        #[inline]
        unsafe fn realloc_impl(
            &self,
            ptr: NonNull<u8>,
            old_layout: Layout,
            new_layout: Layout,
        ) -> Result<NonNull<[u8]>, AllocError> {
            //  `realloc` cannot change the alignment, nor deal with empty blocks.
            if old_layout.size() == 0 || new_layout.size() == 0 || old_layout.align() != new_layout.align() {
                let new_ptr = self.allocate(new_layout)?;

                let common = core::cmp::min(old_layout.size(), new_layout.size());

                //  Safety:
                //  -   `ptr` is valid for `common` reads, as per Liveness & Layout pre-conditions.
                //  -   `new_ptr` is valid for `common` writes, as per `allocate` post-conditions.
                //  -   `ptr` and `new_ptr` do not overlap, as `new_ptr` is freshly allocated.
                unsafe { ptr::copy_nonoverlapping(ptr.as_ptr(), new_ptr.cast::<u8>().as_ptr(), common) };

                //  Safety:
                //  -   Forward pre-conditions.
                unsafe { self.deallocate(ptr, old_layout) };

                return Ok(new_ptr);
            }

            //  Safety:
            //  -   `ptr` is currently allocated by the global allocator, with `old_layout`, as per pre-conditions.
            //  -   `new_layout.size()` is non-zero, and does not overflow `isize` as it is a valid `Layout`.
            let raw_ptr = unsafe { alloc::realloc(ptr.as_ptr(), old_layout, new_layout.size()) };

            let new_ptr = NonNull::new(raw_ptr).ok_or(AllocError)?;

            Ok(NonNull::slice_from_raw_parts(new_ptr, new_layout.size()))
        }
    }
} // mod shim

#[cfg(all(test, not(feature = "allocator_api")))]
mod shim_tests {
    use core::alloc::Layout;

    use super::*;

    #[test]
    fn grow_preserves_content() {
        let old_layout = Layout::array::<u32>(4).expect("valid layout");
        let new_layout = Layout::array::<u32>(16).expect("valid layout");

        let ptr = Global.allocate(old_layout).expect("allocation").cast::<u32>();

        for i in 0..4 {
            //  Safety:
            //  -   `ptr` is valid for 4 writes.
            unsafe { ptr.add(i).write(i as u32 * 7) };
        }

        //  Safety:
        //  -   `ptr` was just allocated by `Global`, with `old_layout`.
        let ptr = unsafe { Global.grow(ptr.cast(), old_layout, new_layout) }.expect("growth");
        let ptr = ptr.cast::<u32>();

        for i in 0..4 {
            //  Safety:
            //  -   `ptr` is valid for 4 reads, as they were preserved by `grow`.
            assert_eq!(i as u32 * 7, unsafe { ptr.add(i).read() }, "{i}");
        }

        //  Safety:
        //  -   `ptr` was just allocated by `Global`, with `new_layout`.
        unsafe { Global.deallocate(ptr.cast(), new_layout) };
    }

    #[test]
    fn shrink_preserves_prefix() {
        let old_layout = Layout::array::<u64>(8).expect("valid layout");
        let new_layout = Layout::array::<u64>(2).expect("valid layout");

        let ptr = Global.allocate(old_layout).expect("allocation").cast::<u64>();

        for i in 0..8 {
            //  Safety:
            //  -   `ptr` is valid for 8 writes.
            unsafe { ptr.add(i).write(u64::MAX - i as u64) };
        }

        //  Safety:
        //  -   `ptr` was just allocated by `Global`, with `old_layout`.
        let ptr = unsafe { Global.shrink(ptr.cast(), old_layout, new_layout) }.expect("shrinkage");
        let ptr = ptr.cast::<u64>();

        for i in 0..2 {
            //  Safety:
            //  -   `ptr` is valid for 2 reads, as they were preserved by `shrink`.
            assert_eq!(u64::MAX - i as u64, unsafe { ptr.add(i).read() }, "{i}");
        }

        //  Safety:
        //  -   `ptr` was just allocated by `Global`, with `new_layout`.
        unsafe { Global.deallocate(ptr.cast(), new_layout) };
    }

    #[test]
    fn zero_sized() {
        let layout = Layout::array::<u32>(0).expect("valid layout");

        let ptr = Global.allocate(layout).expect("allocation");

        assert_eq!(0, ptr.len());

        //  Safety:
        //  -   Zero-sized blocks are never really deallocated.
        unsafe { Global.deallocate(ptr.cast(), layout) };
    }
}
