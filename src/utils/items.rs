//! Bulk operations on ranges of items.
//!
//! Each operation consults the capabilities of the item type -- see `api::item_traits` -- to pick, at compile time,
//! between a raw memory operation and an item by item loop.

use core::{mem, ptr, slice};

use crate::api::{BitwiseConstructible, ItemTraits, is_bitwise_relocatable, is_trivially_destructible};

/// Constructs `count` items at `dst`, cloning them from `src`.
///
/// If a clone panics, the items already constructed are destroyed, and `dst` is left uninitialized.
///
/// #   Safety
///
/// -   Readable: `src` must be valid for reads of `count` items.
/// -   Writable: `dst` must be valid for writes of `count` items.
/// -   Disjoint: `src` and `dst` must not overlap.
#[inline]
pub unsafe fn construct_items<T>(dst: *mut T, src: *const T, count: usize)
where
    T: Clone + ItemTraits,
{
    if T::IS_BITWISE_CONSTRUCTIBLE {
        //  Safety:
        //  -   `src` is valid for reads of `count` items, as per Readable pre-condition.
        //  -   `dst` is valid for writes of `count` items, as per Writable pre-condition.
        //  -   `src` and `dst` do not overlap, as per Disjoint pre-condition.
        unsafe { ptr::copy_nonoverlapping(src, dst, count) };

        return;
    }

    let mut guard = PartialConstruction { dst, done: 0 };

    while guard.done < count {
        //  Safety:
        //  -   `guard.done < count`, hence in bounds, as per Readable pre-condition.
        let item = unsafe { &*src.add(guard.done) };

        let clone = item.clone();

        //  Safety:
        //  -   `guard.done < count`, hence in bounds, as per Writable pre-condition.
        unsafe { dst.add(guard.done).write(clone) };

        guard.done += 1;
    }

    mem::forget(guard);
}

/// Constructs `count` items at `dst`, copying the bytes of the items at `src`.
///
/// #   Safety
///
/// -   Readable: `src` must be valid for reads of `count` items.
/// -   Writable: `dst` must be valid for writes of `count` items.
/// -   Disjoint: `src` and `dst` must not overlap.
#[inline]
pub unsafe fn construct_items_from<D, S>(dst: *mut D, src: *const S, count: usize)
where
    D: BitwiseConstructible<S>,
{
    const { assert!(mem::size_of::<D>() == mem::size_of::<S>()) };

    //  Safety:
    //  -   `src` is valid for reads of `count` items of `S`, as per Readable pre-condition, and thus of `count` items
    //      of `D`, as they have the same size.
    //  -   `dst` is valid for writes of `count` items, as per Writable pre-condition.
    //  -   `src` and `dst` do not overlap, as per Disjoint pre-condition.
    //  -   The copied bytes form valid `D`, as per `BitwiseConstructible`.
    unsafe { ptr::copy_nonoverlapping(src.cast::<D>(), dst, count) };
}

/// Destroys the `count` items at `items`.
///
/// #   Safety
///
/// -   Live: `items` must point to `count` live items, which are dead afterwards.
#[inline]
pub unsafe fn destruct_items<T>(items: *mut T, count: usize) {
    if is_trivially_destructible::<T>() {
        return;
    }

    let items = ptr::slice_from_raw_parts_mut(items, count);

    //  Safety:
    //  -   `items` points to `count` live items, as per Live pre-condition.
    unsafe { ptr::drop_in_place(items) };
}

/// Relocates the `count` items at `src` to `dst`, the items at `src` being dead afterwards.
///
/// The ranges may overlap.
///
/// #   Safety
///
/// -   Live: `src` must point to `count` live items.
/// -   Writable: `dst` must be valid for writes of `count` items.
#[inline]
pub unsafe fn relocate_items<T>(dst: *mut T, src: *const T, count: usize) {
    const { assert!(is_bitwise_relocatable::<T>()) };

    //  Safety:
    //  -   `src` is valid for reads of `count` items, as per Live pre-condition.
    //  -   `dst` is valid for writes of `count` items, as per Writable pre-condition.
    unsafe { ptr::copy(src, dst, count) };
}

/// Compares the `count` items at `left` and `right`, returning whether they are all equal.
///
/// #   Safety
///
/// -   Live: `left` and `right` must both point to `count` live items.
#[inline]
pub unsafe fn compare_items<T>(left: *const T, right: *const T, count: usize) -> bool
where
    T: PartialEq + ItemTraits,
{
    if T::IS_BYTEWISE_COMPARABLE {
        let bytes = count * mem::size_of::<T>();

        //  Safety:
        //  -   `left` and `right` are valid for reads of `count` items, as per Live pre-condition.
        //  -   The items have no padding, hence all their bytes are initialized, as per `ItemTraits`.
        let (left, right) = unsafe {
            (
                slice::from_raw_parts(left.cast::<u8>(), bytes),
                slice::from_raw_parts(right.cast::<u8>(), bytes),
            )
        };

        return left == right;
    }

    //  Safety:
    //  -   `left` and `right` are valid for reads of `count` items, as per Live pre-condition.
    let (left, right) = unsafe { (slice::from_raw_parts(left, count), slice::from_raw_parts(right, count)) };

    left.iter().zip(right).all(|(l, r)| l == r)
}

//
//  Implementation
//

//  Destroys the first `done` items at `dst` when dropped, unless forgotten.
struct PartialConstruction<T> {
    dst: *mut T,
    done: usize,
}

impl<T> Drop for PartialConstruction<T> {
    fn drop(&mut self) {
        //  Safety:
        //  -   The first `done` items were constructed.
        unsafe { destruct_items(self.dst, self.done) };
    }
}

#[cfg(test)]
mod tests {
    use core::{cell::Cell, mem::MaybeUninit};

    use super::*;

    //  Counts its live instances, and panics on the clone of the given ordinal.
    #[derive(Debug, PartialEq)]
    struct Tracked<'a> {
        live: &'a Cell<usize>,
        panic_on: usize,
        ordinal: usize,
    }

    impl<'a> Tracked<'a> {
        fn new(live: &'a Cell<usize>, ordinal: usize, panic_on: usize) -> Self {
            live.set(live.get() + 1);

            Self { live, panic_on, ordinal }
        }
    }

    impl Clone for Tracked<'_> {
        fn clone(&self) -> Self {
            assert_ne!(self.panic_on, self.ordinal, "boom");

            Self::new(self.live, self.ordinal, self.panic_on)
        }
    }

    impl Drop for Tracked<'_> {
        fn drop(&mut self) {
            self.live.set(self.live.get() - 1);
        }
    }

    //  Safety:
    //  -   The defaults make no claim.
    unsafe impl ItemTraits for Tracked<'_> {}

    #[test]
    fn construct_bitwise() {
        let src = [1u32, 2, 3, 4];
        let mut dst = [MaybeUninit::<u32>::uninit(); 4];

        //  Safety:
        //  -   Both arrays hold 4 items, and are distinct.
        unsafe { construct_items(dst.as_mut_ptr().cast::<u32>(), src.as_ptr(), 4) };

        //  Safety:
        //  -   All 4 items were just constructed.
        let dst = unsafe { mem::transmute::<[MaybeUninit<u32>; 4], [u32; 4]>(dst) };

        assert_eq!(src, dst);
    }

    #[test]
    fn construct_clone() {
        let live = Cell::new(0);

        let src: [_; 3] = core::array::from_fn(|i| Tracked::new(&live, i, usize::MAX));
        let mut dst: [MaybeUninit<Tracked<'_>>; 3] = [const { MaybeUninit::uninit() }; 3];

        //  Safety:
        //  -   Both arrays hold 3 items, and are distinct.
        unsafe { construct_items(dst.as_mut_ptr().cast::<Tracked<'_>>(), src.as_ptr(), 3) };

        assert_eq!(6, live.get());

        //  Safety:
        //  -   All 3 items were just constructed.
        unsafe { destruct_items(dst.as_mut_ptr().cast::<Tracked<'_>>(), 3) };

        assert_eq!(3, live.get());
    }

    #[test]
    fn construct_clone_panic() {
        let live = Cell::new(0);

        let src: [_; 4] = core::array::from_fn(|i| Tracked::new(&live, i, 2));
        let mut dst: [MaybeUninit<Tracked<'_>>; 4] = [const { MaybeUninit::uninit() }; 4];

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            //  Safety:
            //  -   Both arrays hold 4 items, and are distinct.
            unsafe { construct_items(dst.as_mut_ptr().cast::<Tracked<'_>>(), src.as_ptr(), 4) };
        }));

        assert!(result.is_err());

        //  The two clones constructed before the panic were destroyed.
        assert_eq!(4, live.get());
    }

    #[test]
    fn construct_from_signed() {
        let src = [-1i32, 0, 1];
        let mut dst = [0u32; 3];

        //  Safety:
        //  -   Both arrays hold 3 items, and are distinct.
        unsafe { construct_items_from(dst.as_mut_ptr(), src.as_ptr(), 3) };

        assert_eq!([u32::MAX, 0, 1], dst);
    }

    #[test]
    fn destruct_trivial() {
        let mut items = [1u64, 2, 3];

        //  Safety:
        //  -   Trivially destructible items are never dead.
        unsafe { destruct_items(items.as_mut_ptr(), 3) };

        assert_eq!([1, 2, 3], items);
    }

    #[test]
    fn relocate_overlapping() {
        let mut items = [1u8, 2, 3, 4, 5, 0];

        //  Safety:
        //  -   Items `[0, 5)` are live, and items `[1, 6)` are writable.
        unsafe { relocate_items(items.as_mut_ptr().add(1), items.as_ptr(), 5) };

        assert_eq!([1, 1, 2, 3, 4, 5], items);
    }

    #[test]
    fn compare_bytewise() {
        let left = [1u16, 2, 3];
        let right = [1u16, 2, 4];

        //  Safety:
        //  -   Both arrays hold 3 live items.
        unsafe {
            assert!(compare_items(left.as_ptr(), left.as_ptr(), 3));
            assert!(compare_items(left.as_ptr(), right.as_ptr(), 2));
            assert!(!compare_items(left.as_ptr(), right.as_ptr(), 3));
        }
    }

    #[test]
    fn compare_itemwise() {
        let left = [0.0f32, 1.0];
        let right = [-0.0f32, 1.0];
        let nan = [f32::NAN];

        //  Safety:
        //  -   All arrays hold their stated number of live items.
        unsafe {
            assert!(compare_items(left.as_ptr(), right.as_ptr(), 2));
            assert!(!compare_items(nan.as_ptr(), nan.as_ptr(), 1));
        }
    }
}
