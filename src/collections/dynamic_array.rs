//! Growable array of items, generic over its allocation policy.

use core::{
    alloc::Layout,
    fmt,
    hash::{Hash, Hasher},
    iter::FusedIterator,
    marker::PhantomData,
    mem::{self, ManuallyDrop},
    ops::{Deref, DerefMut, Index, IndexMut},
    ptr::NonNull,
    slice,
};

use crate::{
    allocators::DefaultAllocator,
    api::{BitwiseConstructible, ContainerAllocator, ItemTraits, SizeClass},
    utils::{
        ReserveError,
        items::{compare_items, construct_items, construct_items_from, destruct_items, relocate_items},
    },
};

/// Growable array of items, generic over its allocation policy.
///
/// The array owns its items, which are stored contiguously in a block obtained from the allocation policy `A`. The
/// number of live items, `len`, is decoupled from the number of slots in the block, `capacity`, so that the policy
/// decides when, and by how much, the block grows or shrinks.
///
/// Items are constructed, relocated, compared, and destroyed in bulk, using raw memory operations whenever the
/// capabilities of `T` allow it, see `api::ItemTraits`.
///
/// #   Invalidation
///
/// Any operation which may grow or shrink the block moves the items, and thus invalidates all pointers into the array,
/// including those obtained from `as_ptr`. References are protected by the borrow checker.
pub struct DynamicArray<T, A = DefaultAllocator>
where
    A: ContainerAllocator,
{
    //  Safety Invariants:
    //  -   Bounded: `num <= max`, and both are non-negative.
    //  -   Allocated: the block of `allocator` was last resized for `max` items of `T`.
    //  -   Live: the items `[0, num)` of the block are live, the slots `[num, max)` are uninitialized.
    num: A::Size,
    max: A::Size,
    allocator: A,
    _marker: PhantomData<T>,
}

//
//  Creation
//

impl<T, A> DynamicArray<T, A>
where
    A: ContainerAllocator + Default,
{
    /// Creates a new, empty, array.
    ///
    /// Does not allocate.
    #[inline]
    pub fn new() -> Self {
        Self::new_in(A::default())
    }

    /// Creates a new array, holding clones of `items`.
    pub fn from_slice(items: &[T]) -> Self
    where
        T: Clone + ItemTraits,
    {
        let mut result = Self::new();
        result.assign_from_slice(items);

        result
    }

    /// Creates a new array, holding clones of the `count` items at `items`.
    ///
    /// #   Safety
    ///
    /// -   Readable: `items` must be valid for reads of `count` live items.
    pub unsafe fn from_raw(items: *const T, count: usize) -> Self
    where
        T: Clone + ItemTraits,
    {
        let mut result = Self::new();

        //  Safety:
        //  -   `result` has no block, hence `items` cannot point into it.
        //  -   `items` is valid for reads of `count` live items, as per Readable pre-condition.
        unsafe { result.append_raw(items, count) };

        result
    }

    /// Creates a new array, holding bitwise copies of the items of `other`.
    ///
    /// `other` may use a different item type, and a different allocation policy.
    pub fn from_array<U, B>(other: &DynamicArray<U, B>) -> Self
    where
        T: BitwiseConstructible<U>,
        B: ContainerAllocator,
    {
        let count = other.len();

        let mut result = Self::new();
        result.resize_for_copy(count);

        //  Safety:
        //  -   `other` holds `count` live items.
        //  -   `result` has room for `count` items, in a block distinct from that of `other`.
        unsafe { construct_items_from(result.data(), other.data(), count) };

        result.num = A::Size::from_usize(count);

        result
    }

    /// Creates a new array from the items of `other`, reinterpreted as items of `T`.
    ///
    /// The block of `other` is handed over if the allocation policy supports it, otherwise its items are copied.
    pub fn convert_from<U>(mut other: DynamicArray<U, A>) -> Self
    where
        T: BitwiseConstructible<U>,
    {
        const { assert!(mem::align_of::<T>() == mem::align_of::<U>()) };

        if !A::SUPPORTS_MOVE {
            return Self::from_array(&other);
        }

        let mut result = Self::new();
        result.allocator.move_to_empty(&mut other.allocator);

        //  Safety Invariants:
        //  -   Bounded: as per the invariants of `other`.
        //  -   Allocated: the block was resized for `max` items of `U`, of the same layout as `T`.
        //  -   Live: the items of `U` are bitwise copies of items of `T`, as per `BitwiseConstructible`.
        result.num = mem::replace(&mut other.num, A::Size::ZERO);
        result.max = mem::replace(&mut other.max, A::Size::ZERO);

        result
    }
}

impl<T, A> DynamicArray<T, A>
where
    A: ContainerAllocator,
{
    /// Creates a new, empty, array with the given allocation policy.
    ///
    /// Does not allocate.
    #[inline]
    pub const fn new_in(allocator: A) -> Self {
        Self {
            num: A::Size::ZERO,
            max: A::Size::ZERO,
            allocator,
            _marker: PhantomData,
        }
    }

    /// Returns a reference to the allocation policy.
    #[inline]
    pub fn allocator(&self) -> &A {
        &self.allocator
    }
}

//
//  Queries
//

impl<T, A> DynamicArray<T, A>
where
    A: ContainerAllocator,
{
    /// Returns whether the array is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.num == A::Size::ZERO
    }

    /// Returns the number of items in the array.
    #[inline]
    pub fn len(&self) -> usize {
        self.num.to_usize()
    }

    /// Returns the number of items the array can hold without growing.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.max.to_usize()
    }

    /// Returns the number of items which can be added without growing.
    #[inline]
    pub fn slack(&self) -> usize {
        self.capacity() - self.len()
    }

    /// Returns the number of bytes allocated by the policy, as reported by the policy.
    #[inline]
    pub fn allocated_size(&self) -> usize {
        self.allocator.allocated_size(self.capacity(), Self::ITEM)
    }

    /// Returns the size of an item, in bytes.
    #[inline]
    pub const fn type_size(&self) -> usize {
        mem::size_of::<T>()
    }

    /// Returns a pointer to the first item.
    ///
    /// The pointer is dangling if the array has no block, and is invalidated by any operation which may resize the
    /// block.
    #[inline]
    pub fn as_ptr(&self) -> *const T {
        self.data()
    }

    /// Returns a mutable pointer to the first item.
    ///
    /// See `as_ptr`.
    #[inline]
    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.data()
    }

    /// Returns the items, as a slice.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        //  Safety:
        //  -   `self.data()` is non-null and aligned, and points to `self.len()` live items, as per Live invariant.
        unsafe { slice::from_raw_parts(self.data(), self.len()) }
    }

    /// Returns the items, as a mutable slice.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        //  Safety:
        //  -   `self.data()` is non-null and aligned, and points to `self.len()` live items, as per Live invariant.
        unsafe { slice::from_raw_parts_mut(self.data(), self.len()) }
    }

    /// Returns a reference to the item at `index`, if any.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.as_slice().get(index)
    }

    /// Returns a mutable reference to the item at `index`, if any.
    #[inline]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.as_mut_slice().get_mut(index)
    }

    /// Returns a reference to the item at `index`, without any range check.
    ///
    /// #   Safety
    ///
    /// -   InBounds: `index < self.len()`.
    #[inline]
    pub unsafe fn get_unchecked(&self, index: usize) -> &T {
        debug_assert!(index < self.len());

        //  Safety:
        //  -   `index` is in bounds, as per InBounds pre-condition.
        unsafe { &*self.data().add(index) }
    }

    /// Returns a mutable reference to the item at `index`, without any range check.
    ///
    /// #   Safety
    ///
    /// -   InBounds: `index < self.len()`.
    #[inline]
    pub unsafe fn get_unchecked_mut(&mut self, index: usize) -> &mut T {
        debug_assert!(index < self.len());

        //  Safety:
        //  -   `index` is in bounds, as per InBounds pre-condition.
        unsafe { &mut *self.data().add(index) }
    }

    /// Returns whether the array contains an item equal to `item`.
    #[inline]
    pub fn contains(&self, item: &T) -> bool
    where
        T: PartialEq,
    {
        self.as_slice().contains(item)
    }

    /// Returns the index of the first item equal to `item`, if any.
    #[inline]
    pub fn find(&self, item: &T) -> Option<usize>
    where
        T: PartialEq,
    {
        self.as_slice().iter().position(|i| i == item)
    }

    /// Returns the index of the last item equal to `item`, if any.
    #[inline]
    pub fn find_last(&self, item: &T) -> Option<usize>
    where
        T: PartialEq,
    {
        self.as_slice().iter().rposition(|i| i == item)
    }
}

//
//  Addition
//

impl<T, A> DynamicArray<T, A>
where
    A: ContainerAllocator,
{
    /// Appends `item`, returning its index.
    ///
    /// #   Panics
    ///
    /// If the array cannot grow.
    #[inline]
    pub fn add(&mut self, item: T) -> usize {
        let index = self.reserve_uninitialized(1);

        //  Safety:
        //  -   `index` is the first uninitialized slot, within capacity.
        unsafe { self.data().add(index).write(item) };

        self.num = A::Size::from_usize(index + 1);

        index
    }

    /// Appends an item converted from `value`, returning its index.
    ///
    /// #   Panics
    ///
    /// If the array cannot grow.
    #[inline]
    pub fn emplace<V>(&mut self, value: V) -> usize
    where
        V: Into<T>,
    {
        self.add(value.into())
    }

    /// Appends the item produced by `f`, returning its index.
    ///
    /// The array grows, if necessary, before `f` is invoked.
    ///
    /// #   Panics
    ///
    /// If the array cannot grow, or if `f` panics, in which case the array is left unchanged, capacity aside.
    #[inline]
    pub fn emplace_with<F>(&mut self, f: F) -> usize
    where
        F: FnOnce() -> T,
    {
        let index = self.reserve_uninitialized(1);

        let item = f();

        //  Safety:
        //  -   `index` is the first uninitialized slot, within capacity, as `f` cannot access `self`.
        unsafe { self.data().add(index).write(item) };

        self.num = A::Size::from_usize(index + 1);

        index
    }

    /// Inserts `item` at `index`, shifting the items at, and after, `index` one slot up.
    ///
    /// Returns `index`.
    ///
    /// #   Panics
    ///
    /// If `index > self.len()`, or if the array cannot grow.
    #[track_caller]
    pub fn insert(&mut self, item: T, index: usize) -> usize {
        let len = self.len();

        assert!(index <= len, "insertion index {index} out of bounds [0, {len}]");

        self.reserve_uninitialized(1);

        let data = self.data();

        //  Safety:
        //  -   `[index, len)` are live, and `[index + 1, len + 1)` are within capacity.
        //  -   The slot at `index` is then dead, and can be written to.
        unsafe {
            relocate_items(data.add(index + 1), data.add(index), len - index);
            data.add(index).write(item);
        }

        self.num = A::Size::from_usize(len + 1);

        index
    }

    /// Appends clones of `items`.
    ///
    /// #   Panics
    ///
    /// If the array cannot grow, or if a clone panics, in which case the array is left unchanged, capacity aside.
    pub fn append_slice(&mut self, items: &[T])
    where
        T: Clone + ItemTraits,
    {
        //  Safety:
        //  -   `items` is a live slice, which cannot alias `self` as `self` is borrowed mutably.
        unsafe { self.append_raw(items.as_ptr(), items.len()) };
    }

    /// Appends clones of the `count` items at `items`.
    ///
    /// #   Panics
    ///
    /// If the array cannot grow, or if a clone panics, in which case the array is left unchanged, capacity aside.
    ///
    /// In Debug, if `items` points into the block of the array.
    ///
    /// #   Safety
    ///
    /// -   Readable: `items` must be valid for reads of `count` live items.
    /// -   Disjoint: `items` must not point into the block of the array, which may be reallocated.
    #[track_caller]
    pub unsafe fn append_raw(&mut self, items: *const T, count: usize)
    where
        T: Clone + ItemTraits,
    {
        debug_assert!(!self.overlaps(items, count), "cannot append items from the array itself");

        let index = self.reserve_uninitialized(count);

        //  Safety:
        //  -   `items` is valid for reads of `count` items, as per Readable pre-condition.
        //  -   `[index, index + count)` is within capacity.
        //  -   `items` does not point into the block, as per Disjoint pre-condition.
        unsafe { construct_items(self.data().add(index), items, count) };

        self.num = A::Size::from_usize(index + count);
    }
}

//
//  Removal
//

impl<T, A> DynamicArray<T, A>
where
    A: ContainerAllocator,
{
    /// Removes the item at `index`, shifting the following items one slot down, then shrinks the block if the policy
    /// deems the slack excessive.
    ///
    /// #   Panics
    ///
    /// If `index >= self.len()`.
    #[inline]
    #[track_caller]
    pub fn remove_at(&mut self, index: usize) {
        self.remove_at_many(index, 1, true);
    }

    /// Removes the `count` items starting at `index`, shifting the following items `count` slots down.
    ///
    /// If `allow_shrinking`, then shrinks the block if the policy deems the slack excessive.
    ///
    /// #   Panics
    ///
    /// If `[index, index + count)` is not within `[0, self.len())`.
    ///
    /// If the destructor of an item panics, in which case the items following the removed ones are leaked.
    #[track_caller]
    pub fn remove_at_many(&mut self, index: usize, count: usize, allow_shrinking: bool) {
        let len = self.len();

        assert!(
            index <= len && count <= len - index,
            "removal range [{index}, {index} + {count}) out of bounds [0, {len})"
        );

        if count == 0 {
            return;
        }

        let tail = len - index - count;

        //  Leak the tail, rather than double-drop, should a destructor panic.
        self.num = A::Size::from_usize(index);

        let data = self.data();

        //  Safety:
        //  -   `[index, index + count)` are live, and dead afterwards.
        //  -   `[index + count, len)` are live, and relocated to the now dead `[index, index + tail)`.
        unsafe {
            destruct_items(data.add(index), count);
            relocate_items(data.add(index), data.add(index + count), tail);
        }

        self.num = A::Size::from_usize(index + tail);

        if allow_shrinking {
            self.resize_shrink();
        }
    }

    /// Removes the last item, and returns it, if any.
    ///
    /// If `allow_shrinking`, then shrinks the block if the policy deems the slack excessive.
    pub fn pop(&mut self, allow_shrinking: bool) -> Option<T> {
        let last = self.len().checked_sub(1)?;

        self.num = A::Size::from_usize(last);

        //  Safety:
        //  -   The item at `last` was live, and is no longer tracked.
        let item = unsafe { self.data().add(last).read() };

        if allow_shrinking {
            self.resize_shrink();
        }

        Some(item)
    }

    /// Destroys all items, then resizes the block to exactly `slack` items.
    pub fn empty(&mut self, slack: usize) {
        self.destroy_all();

        if slack != self.capacity() {
            self.resize_to(slack);
        }
    }

    /// Destroys all items, keeping the block.
    pub fn reset(&mut self) {
        self.destroy_all();
    }

    /// Destroys all items, keeping the block.
    ///
    /// Alias of `reset`.
    #[inline]
    pub fn clear(&mut self) {
        self.reset();
    }
}

//
//  Capacity
//

impl<T, A> DynamicArray<T, A>
where
    A: ContainerAllocator,
{
    /// Resizes the block to exactly `self.len()` items, if it is not already.
    pub fn shrink(&mut self) {
        if self.num != self.max {
            self.resize_to(self.len());
        }
    }

    /// Ensures the block can hold at least `number` items in total.
    ///
    /// #   Panics
    ///
    /// If the block cannot be grown.
    #[track_caller]
    pub fn reserve(&mut self, number: usize) {
        if number <= self.capacity() {
            return;
        }

        if number > A::Size::MAX {
            ReserveError::CapacityOverflow.raise();
        }

        let new_max = self.allocator.calculate_slack_reserve(number, Self::ITEM);

        self.resize_to(new_max);
    }

    /// Attempts to ensure the block can hold at least `number` items in total.
    ///
    /// On error, the array is left unchanged.
    pub fn try_reserve(&mut self, number: usize) -> Result<(), ReserveError> {
        if number <= self.capacity() {
            return Ok(());
        }

        if number > A::Size::MAX {
            return Err(ReserveError::CapacityOverflow);
        }

        let new_max = self.allocator.calculate_slack_reserve(number, Self::ITEM);

        self.try_resize_to(new_max)
    }
}

//
//  Assignment
//

impl<T, A> DynamicArray<T, A>
where
    A: ContainerAllocator,
{
    /// Replaces the items of `self` by clones of `items`.
    ///
    /// The block is reused if possible.
    pub fn assign_from_slice(&mut self, items: &[T])
    where
        T: Clone + ItemTraits,
    {
        self.destroy_all();
        self.resize_for_copy(items.len());

        //  Safety:
        //  -   `items` is live, and cannot alias `self` as `self` is borrowed mutably.
        //  -   `self` has room for `items.len()` items.
        unsafe { construct_items(self.data(), items.as_ptr(), items.len()) };

        self.num = A::Size::from_usize(items.len());
    }

    /// Replaces the items of `self` by those of `other`, leaving `other` empty.
    ///
    /// The block of `other` is handed over if the allocation policy supports it, in which case `other` is left without
    /// block; otherwise, the items are relocated and `other` keeps its block.
    pub fn move_from(&mut self, other: &mut Self) {
        self.destroy_all();

        if A::SUPPORTS_MOVE {
            self.allocator.move_to_empty(&mut other.allocator);

            self.num = mem::replace(&mut other.num, A::Size::ZERO);
            self.max = mem::replace(&mut other.max, A::Size::ZERO);

            return;
        }

        let count = other.len();

        self.resize_for_copy(count);

        //  Safety:
        //  -   `other` holds `count` live items, which are no longer tracked after this call.
        //  -   `self` has room for `count` items, in a distinct block.
        unsafe { relocate_items(self.data(), other.data(), count) };

        other.num = A::Size::ZERO;
        self.num = A::Size::from_usize(count);
    }

    /// Takes the items of `self`, leaving it empty.
    ///
    /// See `move_from`.
    pub fn take(&mut self) -> Self
    where
        A: Default,
    {
        let mut result = Self::new();
        result.move_from(self);

        result
    }
}

//
//  Common traits
//

impl<T, A> Clone for DynamicArray<T, A>
where
    T: Clone + ItemTraits,
    A: ContainerAllocator + Default,
{
    fn clone(&self) -> Self {
        Self::from_slice(self.as_slice())
    }

    fn clone_from(&mut self, source: &Self) {
        self.assign_from_slice(source.as_slice());
    }
}

impl<T, A> fmt::Debug for DynamicArray<T, A>
where
    T: fmt::Debug,
    A: ContainerAllocator,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        f.debug_list().entries(self.as_slice()).finish()
    }
}

impl<T, A> Default for DynamicArray<T, A>
where
    A: ContainerAllocator + Default,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T, A> Deref for DynamicArray<T, A>
where
    A: ContainerAllocator,
{
    type Target = [T];

    #[inline]
    fn deref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T, A> DerefMut for DynamicArray<T, A>
where
    A: ContainerAllocator,
{
    #[inline]
    fn deref_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T, A> Drop for DynamicArray<T, A>
where
    A: ContainerAllocator,
{
    fn drop(&mut self) {
        self.destroy_all();
    }
}

impl<T, A> Eq for DynamicArray<T, A>
where
    T: Eq + ItemTraits,
    A: ContainerAllocator,
{
}

impl<T, A> Hash for DynamicArray<T, A>
where
    T: Hash,
    A: ContainerAllocator,
{
    fn hash<H>(&self, state: &mut H)
    where
        H: Hasher,
    {
        self.as_slice().hash(state);
    }
}

impl<T, A> Index<usize> for DynamicArray<T, A>
where
    A: ContainerAllocator,
{
    type Output = T;

    #[inline]
    #[track_caller]
    fn index(&self, index: usize) -> &T {
        self.range_check(index);

        &self.as_slice()[index]
    }
}

impl<T, A> IndexMut<usize> for DynamicArray<T, A>
where
    A: ContainerAllocator,
{
    #[inline]
    #[track_caller]
    fn index_mut(&mut self, index: usize) -> &mut T {
        self.range_check(index);

        &mut self.as_mut_slice()[index]
    }
}

impl<T, A, B> PartialEq<DynamicArray<T, B>> for DynamicArray<T, A>
where
    T: PartialEq + ItemTraits,
    A: ContainerAllocator,
    B: ContainerAllocator,
{
    fn eq(&self, other: &DynamicArray<T, B>) -> bool {
        self.eq(other.as_slice())
    }
}

impl<T, A> PartialEq<[T]> for DynamicArray<T, A>
where
    T: PartialEq + ItemTraits,
    A: ContainerAllocator,
{
    fn eq(&self, other: &[T]) -> bool {
        if self.len() != other.len() {
            return false;
        }

        //  Safety:
        //  -   Both point to `self.len()` live items.
        unsafe { compare_items(self.data(), other.as_ptr(), self.len()) }
    }
}

impl<T, A, const N: usize> PartialEq<[T; N]> for DynamicArray<T, A>
where
    T: PartialEq + ItemTraits,
    A: ContainerAllocator,
{
    fn eq(&self, other: &[T; N]) -> bool {
        self.eq(other.as_slice())
    }
}

//
//  Conversion traits
//

impl<T, A> Extend<T> for DynamicArray<T, A>
where
    A: ContainerAllocator,
{
    fn extend<I>(&mut self, iter: I)
    where
        I: IntoIterator<Item = T>,
    {
        let iter = iter.into_iter();

        let (lower, _) = iter.size_hint();

        if lower > self.slack() {
            self.reserve_uninitialized(lower);
        }

        for item in iter {
            self.add(item);
        }
    }
}

impl<T, A, const N: usize> From<[T; N]> for DynamicArray<T, A>
where
    A: ContainerAllocator + Default,
{
    fn from(items: [T; N]) -> Self {
        let items = ManuallyDrop::new(items);

        let mut result = Self::new();
        result.resize_for_copy(N);

        //  Safety:
        //  -   `items` holds `N` live items, which are never dropped as they are wrapped in `ManuallyDrop`.
        //  -   `result` has room for `N` items.
        unsafe { relocate_items(result.data(), items.as_ptr(), N) };

        result.num = A::Size::from_usize(N);

        result
    }
}

impl<T, A> FromIterator<T> for DynamicArray<T, A>
where
    A: ContainerAllocator + Default,
{
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        let mut result = Self::new();
        result.extend(iter);

        result
    }
}

impl<'a, T, A> IntoIterator for &'a DynamicArray<T, A>
where
    A: ContainerAllocator,
{
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.as_slice().iter()
    }
}

impl<'a, T, A> IntoIterator for &'a mut DynamicArray<T, A>
where
    A: ContainerAllocator,
{
    type Item = &'a mut T;
    type IntoIter = slice::IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.as_mut_slice().iter_mut()
    }
}

impl<T, A> IntoIterator for DynamicArray<T, A>
where
    A: ContainerAllocator,
{
    type Item = T;
    type IntoIter = IntoIter<T, A>;

    fn into_iter(mut self) -> Self::IntoIter {
        let back = self.len();

        //  The iterator tracks the live items from now on.
        self.num = A::Size::ZERO;

        IntoIter {
            array: self,
            front: 0,
            back,
        }
    }
}

/// Owning iterator over the items of a `DynamicArray`.
pub struct IntoIter<T, A = DefaultAllocator>
where
    A: ContainerAllocator,
{
    //  Safety Invariants:
    //  -   Untracked: `array.num` is 0, the live items are tracked by `[front, back)` instead.
    array: DynamicArray<T, A>,
    front: usize,
    back: usize,
}

impl<T, A> IntoIter<T, A>
where
    A: ContainerAllocator,
{
    /// Returns the remaining items, as a slice.
    pub fn as_slice(&self) -> &[T] {
        //  Safety:
        //  -   `[front, back)` are live, as per Untracked invariant.
        unsafe { slice::from_raw_parts(self.array.data().add(self.front), self.back - self.front) }
    }
}

impl<T, A> Iterator for IntoIter<T, A>
where
    A: ContainerAllocator,
{
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.front == self.back {
            return None;
        }

        let index = self.front;
        self.front += 1;

        //  Safety:
        //  -   The item at `index` was live, and is no longer tracked.
        Some(unsafe { self.array.data().add(index).read() })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.back - self.front;

        (remaining, Some(remaining))
    }
}

impl<T, A> DoubleEndedIterator for IntoIter<T, A>
where
    A: ContainerAllocator,
{
    fn next_back(&mut self) -> Option<T> {
        if self.front == self.back {
            return None;
        }

        self.back -= 1;

        //  Safety:
        //  -   The item at `back` was live, and is no longer tracked.
        Some(unsafe { self.array.data().add(self.back).read() })
    }
}

impl<T, A> ExactSizeIterator for IntoIter<T, A> where A: ContainerAllocator {}

impl<T, A> FusedIterator for IntoIter<T, A> where A: ContainerAllocator {}

impl<T, A> fmt::Debug for IntoIter<T, A>
where
    T: fmt::Debug,
    A: ContainerAllocator,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        f.debug_tuple("IntoIter").field(&self.as_slice()).finish()
    }
}

impl<T, A> Drop for IntoIter<T, A>
where
    A: ContainerAllocator,
{
    fn drop(&mut self) {
        //  Safety:
        //  -   `[front, back)` are live, as per Untracked invariant, and dead afterwards.
        unsafe { destruct_items(self.array.data().add(self.front), self.back - self.front) };
    }
}

//
//  Implementation
//

impl<T, A> DynamicArray<T, A>
where
    A: ContainerAllocator,
{
    const ITEM: Layout = Layout::new::<T>();

    //  Returns a pointer to the first slot of the block, or a dangling pointer if there is no block.
    #[inline(always)]
    fn data(&self) -> *mut T {
        let allocation = self.allocator.allocation();

        if allocation.is_null() {
            NonNull::dangling().as_ptr()
        } else {
            allocation.cast()
        }
    }

    #[inline(always)]
    fn check_invariants(&self) {
        debug_assert!(self.num >= A::Size::ZERO);
        debug_assert!(self.num <= self.max);
        debug_assert!(self.max == A::Size::ZERO || mem::size_of::<T>() == 0 || self.allocator.has_allocation());
    }

    #[inline(always)]
    #[track_caller]
    fn range_check(&self, index: usize) {
        if A::REQUIRE_RANGE_CHECK {
            let len = self.len();

            assert!(index < len, "index {index} out of bounds [0, {len})");
        }
    }

    //  Returns whether `[items, items + count)` overlaps the block.
    fn overlaps(&self, items: *const T, count: usize) -> bool {
        if !self.allocator.has_allocation() || count == 0 || mem::size_of::<T>() == 0 {
            return false;
        }

        let block = self.data() as usize;
        let block_end = block + self.capacity() * mem::size_of::<T>();

        let start = items as usize;
        let end = start.saturating_add(count * mem::size_of::<T>());

        start < block_end && block < end
    }

    //  Destroys all items, keeping the block.
    fn destroy_all(&mut self) {
        let len = self.len();

        //  Leak, rather than double-drop, should a destructor panic.
        self.num = A::Size::ZERO;

        //  Safety:
        //  -   `[0, len)` are live, and dead afterwards.
        unsafe { destruct_items(self.data(), len) };
    }

    //  Ensures there is room for `count` additional items, returning the index of the first uninitialized slot.
    //
    //  Does not modify `self.num`.
    #[inline]
    #[track_caller]
    fn reserve_uninitialized(&mut self, count: usize) -> usize {
        self.check_invariants();

        let index = self.len();

        let Some(required) = index.checked_add(count).filter(|r| *r <= A::Size::MAX) else {
            ReserveError::CapacityOverflow.raise();
        };

        if required > self.capacity() {
            self.resize_grow(required);
        }

        index
    }

    #[inline(never)]
    #[track_caller]
    fn resize_grow(&mut self, required: usize) {
        let new_max = self.allocator.calculate_slack_grow(required, self.capacity(), Self::ITEM);

        debug_assert!(new_max >= required, "{new_max} < {required}");

        self.resize_to(new_max);
    }

    fn resize_shrink(&mut self) {
        self.resize_shrink_for(self.len());
    }

    //  Sizes the block for a copy of `count` items into `self`, which must be empty.
    fn resize_for_copy(&mut self, count: usize) {
        debug_assert!(self.is_empty());

        if count > self.capacity() {
            if count > A::Size::MAX {
                ReserveError::CapacityOverflow.raise();
            }

            let new_max = self.allocator.calculate_slack_reserve(count, Self::ITEM);

            self.resize_to(new_max);

            return;
        }

        self.resize_shrink_for(count);
    }

    //  Shrinks the block, if the policy deems the slack excessive for `count` items.
    fn resize_shrink_for(&mut self, count: usize) {
        let new_max = self.allocator.calculate_slack_shrink(count, self.capacity(), Self::ITEM);

        debug_assert!(new_max >= count && new_max <= self.capacity());

        if new_max != self.capacity() {
            self.resize_to(new_max);
        }
    }

    #[track_caller]
    fn resize_to(&mut self, new_max: usize) {
        debug_assert!(new_max >= self.len());

        //  Safety:
        //  -   Layout: `Self::ITEM` is used throughout.
        //  -   Preservation: `self.len() <= self.capacity()`, as per Bounded invariant.
        unsafe { self.allocator.resize_allocation(self.len(), new_max, Self::ITEM) };

        self.max = A::Size::from_usize(new_max);

        self.check_invariants();
    }

    fn try_resize_to(&mut self, new_max: usize) -> Result<(), ReserveError> {
        debug_assert!(new_max >= self.len());

        //  Safety:
        //  -   Layout: `Self::ITEM` is used throughout.
        //  -   Preservation: `self.len() <= self.capacity()`, as per Bounded invariant.
        unsafe { self.allocator.try_resize_allocation(self.len(), new_max, Self::ITEM)? };

        self.max = A::Size::from_usize(new_max);

        self.check_invariants();

        Ok(())
    }
}

#[cfg(all(test, feature = "alloc"))]
mod tests {
    use core::cell::Cell;

    use std::rc::Rc;

    use super::*;

    use crate::allocators::{FixedAllocator, UncheckedHeapAllocator, counting::CountingAllocator};

    //  Counts its live instances.
    #[derive(Debug)]
    struct Tracked {
        live: Rc<Cell<usize>>,
        value: u32,
    }

    impl Tracked {
        fn new(live: &Rc<Cell<usize>>, value: u32) -> Self {
            live.set(live.get() + 1);

            Self {
                live: live.clone(),
                value,
            }
        }
    }

    impl Clone for Tracked {
        fn clone(&self) -> Self {
            Self::new(&self.live, self.value)
        }
    }

    impl Drop for Tracked {
        fn drop(&mut self) {
            self.live.set(self.live.get() - 1);
        }
    }

    impl PartialEq for Tracked {
        fn eq(&self, other: &Self) -> bool {
            self.value == other.value
        }
    }

    crate::item_traits!(default: Tracked);

    type Fixed = FixedAllocator<64>;

    #[test]
    fn new() {
        let array = DynamicArray::<u32>::new();

        assert!(array.is_empty());
        assert_eq!(0, array.len());
        assert_eq!(0, array.capacity());
        assert_eq!(0, array.allocated_size());
        assert_eq!(4, array.type_size());
        assert_eq!(&[] as &[u32], array.as_slice());
    }

    #[test]
    fn insert_remove_example() {
        let mut array = DynamicArray::<i32>::from([1, 2, 3]);

        assert_eq!(1, array.insert(99, 1));
        assert_eq!(array, [1, 99, 2, 3]);
        assert_eq!(4, array.len());

        array.remove_at(0);
        assert_eq!(array, [99, 2, 3]);
        assert_eq!(3, array.len());
    }

    #[test]
    fn insert_bounds() {
        let mut array = DynamicArray::<i32>::new();

        assert_eq!(0, array.insert(3, 0));
        assert_eq!(1, array.insert(4, 1));
        assert_eq!(0, array.insert(1, 0));

        assert_eq!(array, [1, 3, 4]);
    }

    #[test]
    #[should_panic(expected = "insertion index 4 out of bounds [0, 3]")]
    fn insert_out_of_bounds() {
        let mut array = DynamicArray::<i32>::from([1, 2, 3]);

        array.insert(4, 4);
    }

    #[test]
    fn add_returns_index() {
        let mut array = DynamicArray::<u8>::new();

        for i in 0..10 {
            assert_eq!(i as usize, array.add(i));
        }

        assert_eq!(10, array.len());
        assert!(array.capacity() >= 10);
    }

    #[test]
    fn emplace() {
        let mut array = DynamicArray::<u64>::new();

        assert_eq!(0, array.emplace(3u8));
        assert_eq!(1, array.emplace(7u32));
        assert_eq!(2, array.emplace_with(|| 11));

        assert_eq!(array, [3, 7, 11]);
    }

    #[test]
    fn emplace_with_panic() {
        let mut array = DynamicArray::<String>::from([String::from("a")]);

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            array.emplace_with(|| panic!("boom"));
        }));

        assert!(result.is_err());
        assert_eq!(1, array.len());
        assert_eq!("a", array[0]);
    }

    #[test]
    fn first_growth() {
        let mut array = DynamicArray::<u32>::new();
        array.add(1);

        assert_eq!(4, array.capacity());
        assert_eq!(3, array.slack());
        assert_eq!(16, array.allocated_size());
    }

    #[test]
    fn growth_is_logarithmic() {
        let mut array = DynamicArray::<u32, CountingAllocator>::new();

        for i in 0..100_000 {
            array.add(i);
        }

        let resizes = array.allocator().resizes;

        assert!(resizes < 40, "{resizes}");
        assert_eq!(100_000, array.len());
    }

    #[test]
    fn extend_growth_is_logarithmic() {
        let mut array = DynamicArray::<u32, CountingAllocator>::new();

        for i in 0..10_000 {
            array.extend([i]);
        }

        for i in 0..3_000 {
            array.extend([i, i + 1, i + 2]);
        }

        let resizes = array.allocator().resizes;

        assert!(resizes < 40, "{resizes}");
        assert_eq!(19_000, array.len());
        assert_eq!(array[9_999], 9_999);
        assert_eq!(array[18_999], 3_001);
    }

    #[test]
    fn remove_at_many() {
        let mut array: DynamicArray<u32> = (0..10).collect();

        array.remove_at_many(2, 3, false);

        assert_eq!(array, [0, 1, 5, 6, 7, 8, 9]);

        array.remove_at_many(7, 0, false);
        array.remove_at_many(4, 3, false);

        assert_eq!(array, [0, 1, 5, 6]);
    }

    #[test]
    #[should_panic(expected = "removal range [2, 2 + 2) out of bounds [0, 3)")]
    fn remove_at_many_out_of_bounds() {
        let mut array = DynamicArray::<i32>::from([1, 2, 3]);

        array.remove_at_many(2, 2, true);
    }

    #[test]
    fn remove_shrinks_large_slack() {
        let mut array: DynamicArray<u64> = (0..1_000).collect();
        let capacity = array.capacity();

        array.remove_at_many(10, 980, false);

        assert_eq!(capacity, array.capacity());

        array.remove_at(0);

        assert_eq!(19, array.len());
        assert_eq!(19, array.capacity());
    }

    #[test]
    fn remove_keeps_small_slack() {
        let mut array: DynamicArray<u64> = (0..100).collect();
        let capacity = array.capacity();

        array.remove_at(50);

        assert_eq!(99, array.len());
        assert_eq!(capacity, array.capacity());
    }

    #[test]
    fn pop() {
        let mut array = DynamicArray::<i32>::from([1, 2]);

        assert_eq!(Some(2), array.pop(false));
        assert_eq!(Some(1), array.pop(false));
        assert_eq!(None, array.pop(false));

        assert_eq!(2, array.capacity());

        array.add(5);

        assert_eq!(Some(5), array.pop(true));
        assert_eq!(0, array.capacity());
    }

    #[test]
    fn shrink_idempotent() {
        let mut array = DynamicArray::<u16, CountingAllocator>::new();

        array.extend(0..10);
        array.shrink();

        assert_eq!(10, array.capacity());

        let resizes = array.allocator().resizes;
        let allocated = array.allocated_size();

        array.shrink();

        assert_eq!(resizes, array.allocator().resizes);
        assert_eq!(allocated, array.allocated_size());
    }

    #[test]
    fn reserve() {
        let mut array = DynamicArray::<u8>::new();

        array.reserve(10);
        assert_eq!(10, array.capacity());

        array.reserve(5);
        assert_eq!(10, array.capacity());

        assert_eq!(Err(ReserveError::CapacityOverflow), array.try_reserve(i32::MAX as usize + 1));
        assert_eq!(10, array.capacity());
    }

    #[test]
    fn empty_and_reset() {
        let live = Rc::new(Cell::new(0));

        let mut array = DynamicArray::<Tracked>::new();

        for i in 0..5 {
            array.add(Tracked::new(&live, i));
        }

        array.reset();

        assert_eq!(0, live.get());
        assert_eq!(0, array.len());
        assert!(array.capacity() >= 5);

        array.add(Tracked::new(&live, 9));
        array.empty(32);

        assert_eq!(0, live.get());
        assert_eq!(32, array.capacity());

        array.empty(0);

        assert_eq!(0, array.capacity());
        assert!(!array.allocator().has_allocation());
    }

    #[test]
    fn drops_exactly_once() {
        let live = Rc::new(Cell::new(0));

        {
            let mut array = DynamicArray::<Tracked>::new();

            for i in 0..20 {
                array.add(Tracked::new(&live, i));
            }

            array.insert(Tracked::new(&live, 100), 3);
            array.remove_at(5);
            array.remove_at_many(0, 4, true);

            let popped = array.pop(true);

            assert_eq!(Some(19), popped.as_ref().map(|t| t.value));

            drop(popped);

            assert_eq!(array.len(), live.get());

            let copy = array.clone();

            assert_eq!(2 * array.len(), live.get());
            assert_eq!(array, copy);
        }

        assert_eq!(0, live.get());
    }

    #[test]
    fn append_slice() {
        let mut array = DynamicArray::<String>::from([String::from("a")]);

        array.append_slice(&[String::from("b"), String::from("c")]);

        assert_eq!(array, [String::from("a"), String::from("b"), String::from("c")]);
    }

    #[test]
    fn append_raw() {
        let source = [1u32, 2, 3];

        let mut array = DynamicArray::<u32>::new();

        //  Safety:
        //  -   `source` holds 3 live items, outside of `array`.
        unsafe { array.append_raw(source.as_ptr(), 3) };

        //  Safety:
        //  -   Same as above.
        let copy = unsafe { DynamicArray::<u32>::from_raw(source.as_ptr(), 2) };

        assert_eq!(array, source);
        assert_eq!(copy, [1, 2]);
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "cannot append items from the array itself")]
    fn append_raw_self() {
        let mut array = DynamicArray::<u32>::from([1, 2, 3]);

        let items = array.as_ptr();

        //  Safety:
        //  -   None, this is caught in Debug.
        unsafe { array.append_raw(items, 3) };
    }

    #[test]
    fn contains_find() {
        let array = DynamicArray::<char>::from(['a', 'b', 'a']);

        assert!(array.contains(&'b'));
        assert!(!array.contains(&'z'));

        assert_eq!(Some(0), array.find(&'a'));
        assert_eq!(Some(2), array.find_last(&'a'));
        assert_eq!(None, array.find(&'z'));
    }

    #[test]
    fn indexing() {
        let mut array = DynamicArray::<i32>::from([1, 2, 3]);

        array[1] = 5;

        assert_eq!(5, array[1]);
        assert_eq!(Some(&3), array.get(2));
        assert_eq!(None, array.get(3));

        //  Safety:
        //  -   0 is in bounds.
        assert_eq!(1, unsafe { *array.get_unchecked(0) });
    }

    #[test]
    #[should_panic(expected = "index 3 out of bounds [0, 3)")]
    fn indexing_checked() {
        let array = DynamicArray::<i32>::from([1, 2, 3]);

        let _ = array[3];
    }

    #[test]
    #[should_panic(expected = "index out of bounds")]
    fn indexing_unchecked_policy() {
        let array = DynamicArray::<i32, UncheckedHeapAllocator>::from([1, 2, 3]);

        let _ = array[3];
    }

    #[test]
    fn clone_from_reuses_block() {
        let source = DynamicArray::<u32>::from([1, 2, 3]);

        let mut target: DynamicArray<u32> = (0..50).collect();
        let capacity = target.capacity();

        target.clone_from(&source);

        assert_eq!(target, source);
        assert_eq!(capacity, target.capacity());

        target.assign_from_slice(&[]);

        assert!(target.is_empty());
        assert_eq!(0, target.capacity());
    }

    #[test]
    fn move_from_hands_over() {
        let mut source = DynamicArray::<u32>::from([1, 2, 3]);
        let block = source.as_ptr();

        let mut target = DynamicArray::<u32>::from([9]);

        target.move_from(&mut source);

        assert_eq!(target, [1, 2, 3]);
        assert_eq!(block, target.as_ptr());

        assert!(source.is_empty());
        assert_eq!(0, source.capacity());

        let taken = target.take();

        assert_eq!(taken, [1, 2, 3]);
        assert!(target.is_empty());
    }

    #[test]
    fn move_from_relocates() {
        let live = Rc::new(Cell::new(0));

        let mut source = DynamicArray::<Tracked, Fixed>::new();
        source.add(Tracked::new(&live, 1));
        source.add(Tracked::new(&live, 2));

        let mut target = DynamicArray::<Tracked, Fixed>::new();
        target.add(Tracked::new(&live, 3));

        target.move_from(&mut source);

        assert_eq!(2, live.get());
        assert_eq!(2, target.len());
        assert_eq!(2, target[1].value);

        assert!(source.is_empty());
        assert_ne!(0, source.capacity());
    }

    #[test]
    fn convert_from() {
        let signed = DynamicArray::<i32>::from([-1, 0, 1]);
        let block = signed.as_ptr() as usize;

        let unsigned = DynamicArray::<u32>::convert_from(signed);

        assert_eq!(unsigned, [u32::MAX, 0, 1]);
        assert_eq!(block, unsigned.as_ptr() as usize);

        let fixed = DynamicArray::<i32, Fixed>::from([-2, 2]);
        let converted = DynamicArray::<u32, Fixed>::convert_from(fixed);

        assert_eq!(converted, [u32::MAX - 1, 2]);
    }

    #[test]
    fn from_array() {
        let source = DynamicArray::<u8, Fixed>::from([1, 2, 255]);

        let copy = DynamicArray::<i8>::from_array(&source);

        assert_eq!(copy, [1, 2, -1]);
        assert_eq!(source, [1, 2, 255]);
    }

    #[test]
    fn equality_across_policies() {
        let heap = DynamicArray::<u32>::from([1, 2, 3]);
        let fixed = DynamicArray::<u32, Fixed>::from([1, 2, 3]);
        let other = DynamicArray::<u32, Fixed>::from([1, 2]);

        assert_eq!(heap, fixed);
        assert_ne!(heap, other);
    }

    #[test]
    fn into_iter() {
        let live = Rc::new(Cell::new(0));

        let array: DynamicArray<Tracked> = (0..6).map(|i| Tracked::new(&live, i)).collect();

        let mut iter = array.into_iter();

        assert_eq!(6, iter.len());
        assert_eq!(Some(0), iter.next().map(|t| t.value));
        assert_eq!(Some(5), iter.next_back().map(|t| t.value));
        assert_eq!(4, iter.as_slice().len());
        assert_eq!(4, live.get());

        drop(iter);

        assert_eq!(0, live.get());
    }

    #[test]
    fn iterate_by_reference() {
        let mut array = DynamicArray::<u32>::from([1, 2, 3]);

        for item in &mut array {
            *item *= 2;
        }

        let sum: u32 = (&array).into_iter().sum();

        assert_eq!(12, sum);
        assert_eq!(vec![2, 4, 6], array.iter().copied().collect::<Vec<_>>());
    }

    #[test]
    fn debug_and_hash() {
        use std::hash::{BuildHasher, RandomState};

        let array = DynamicArray::<u8>::from([1, 2]);

        assert_eq!("[1, 2]", format!("{array:?}"));

        let state = RandomState::new();

        assert_eq!(state.hash_one(&array), state.hash_one([1u8, 2].as_slice()));
    }

    #[test]
    fn zero_sized_items() {
        let mut array = DynamicArray::<()>::new();

        for _ in 0..100 {
            array.add(());
        }

        array.remove_at_many(10, 50, true);

        assert_eq!(50, array.len());
        assert_eq!(0, array.allocated_size());
    }

    #[test]
    fn fixed_policy() {
        let mut array = DynamicArray::<u64, Fixed>::new();

        array.add(1);

        assert_eq!(8, array.capacity());
        assert_eq!(0, array.allocated_size());

        array.extend(2..=8);

        assert_eq!(array, [1, 2, 3, 4, 5, 6, 7, 8]);

        //  Moving the array moves the inline block along.
        let moved = array;

        assert_eq!(moved, [1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    #[should_panic(expected = "memory allocation of 72 bytes (aligned to 8) failed")]
    fn fixed_policy_overflow() {
        let mut array = DynamicArray::<u64, FixedAllocator<64>>::new();

        array.extend(0..9);
    }

    static_assertions::assert_impl_all!(DynamicArray<u32>: Send, Sync, Clone, Default);
    static_assertions::assert_impl_all!(DynamicArray<u32, FixedAllocator<32>>: Send, Sync);
    static_assertions::assert_not_impl_any!(DynamicArray<Rc<u32>>: Send, Sync);
}
