//! Dense array of bits, generic over its allocation policy.

mod bit_ref;
mod iter;

pub use bit_ref::{BitMut, BitRef};
pub use iter::{Iter, IterMut, IterRev};

use core::{
    alloc::Layout,
    fmt,
    hash::{Hash, Hasher},
    ops::Index,
    ptr::{self, NonNull},
    slice,
};

use crate::{
    allocators::DefaultAllocator,
    api::{ContainerAllocator, SizeClass},
    utils::{
        ReserveError,
        word::{self, ALL_ONES, ALL_ZEROS, BITS_PER_WORD, Word},
    },
};

use iter::BitCursor;

/// Dense array of bits, generic over its allocation policy.
///
/// The bits are packed in words of `BITS_PER_WORD` bits, bit `i` being bit `i % BITS_PER_WORD` of word
/// `i / BITS_PER_WORD`. The capacity is always a whole number of words.
///
/// The bits of the last word beyond `len` are unspecified, and never observed by the operations of the array. They
/// are, however, exposed by `words`.
pub struct BitArray<A = DefaultAllocator>
where
    A: ContainerAllocator,
{
    //  Safety Invariants:
    //  -   Bounded: `num_bits <= max_bits`, and `max_bits` is a multiple of `BITS_PER_WORD`.
    //  -   Allocated: the block of `allocator` was last resized for `max_bits / BITS_PER_WORD` words.
    //  -   Initialized: all the words of the block are initialized.
    num_bits: A::Size,
    max_bits: A::Size,
    allocator: A,
}

//
//  Creation
//

impl<A> BitArray<A>
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

    /// Creates a new array of `num_bits` bits, all set to `value`.
    pub fn with_value(value: bool, num_bits: usize) -> Self {
        let mut result = Self::new();
        result.init(value, num_bits);

        result
    }
}

impl<A> BitArray<A>
where
    A: ContainerAllocator,
{
    /// Creates a new, empty, array with the given allocation policy.
    ///
    /// Does not allocate.
    #[inline]
    pub const fn new_in(allocator: A) -> Self {
        Self {
            num_bits: A::Size::ZERO,
            max_bits: A::Size::ZERO,
            allocator,
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

impl<A> BitArray<A>
where
    A: ContainerAllocator,
{
    /// Returns whether the array is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.num_bits == A::Size::ZERO
    }

    /// Returns the number of bits in the array.
    #[inline]
    pub fn len(&self) -> usize {
        self.num_bits.to_usize()
    }

    /// Returns the number of bits the array can hold without growing.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.max_bits.to_usize()
    }

    /// Returns the number of bytes allocated by the policy, as reported by the policy.
    #[inline]
    pub fn allocated_size(&self) -> usize {
        self.allocator.allocated_size(self.max_words(), Self::WORD)
    }

    /// Returns the words spanned by the bits of the array.
    ///
    /// The bits of the last word beyond `self.len()` are unspecified.
    #[inline]
    pub fn words(&self) -> &[Word] {
        //  Safety:
        //  -   `self.data()` is non-null and aligned, and points to `self.max_words()` initialized words.
        //  -   `self.num_words() <= self.max_words()`, as per Bounded invariant.
        unsafe { slice::from_raw_parts(self.data(), self.num_words()) }
    }

    /// Returns the value of the bit at `index`.
    ///
    /// #   Panics
    ///
    /// If `index >= self.len()`, when the policy requires range checks. Otherwise, only if `index` is beyond the last
    /// word, and the result is unspecified for indexes within the last word.
    #[inline]
    #[track_caller]
    pub fn get(&self, index: usize) -> bool {
        self.range_check(index);

        BitCursor::at(index).get(self.words())
    }

    /// Returns a read-only proxy to the bit at `index`.
    ///
    /// #   Panics
    ///
    /// See `get`.
    #[inline]
    #[track_caller]
    pub fn bit(&self, index: usize) -> BitRef<'_> {
        self.range_check(index);

        let (word, mask) = word::split(index);

        BitRef::new(&self.words()[word], mask)
    }

    /// Returns the index of the first bit equal to `value`, if any.
    pub fn find(&self, value: bool) -> Option<usize> {
        //  A word in which no bit matches.
        let test = if value { ALL_ZEROS } else { ALL_ONES };

        let (index, word) = self.words().iter().enumerate().find(|(_, w)| **w != test)?;

        let matches = if value { *word } else { !*word };

        let found = index * BITS_PER_WORD + word::count_trailing_zeros(matches) as usize;

        //  The match may lie in the unspecified bits of the last word.
        (found < self.len()).then_some(found)
    }

    /// Returns the index of the last bit equal to `value`, if any.
    pub fn find_last(&self, value: bool) -> Option<usize> {
        let words = self.words();

        let (last, rest) = words.split_last()?;

        let matches = |word: Word| if value { word } else { !word };

        //  Exclude the unspecified bits of the last word.
        let last = matches(*last) & word::mask_until(self.len());

        if last != ALL_ZEROS {
            return Some(Self::highest_bit(rest.len(), last));
        }

        rest.iter()
            .enumerate()
            .rev()
            .map(|(index, word)| (index, matches(*word)))
            .find(|(_, word)| *word != ALL_ZEROS)
            .map(|(index, word)| Self::highest_bit(index, word))
    }

    /// Returns whether any bit is equal to `value`.
    #[inline]
    pub fn contains(&self, value: bool) -> bool {
        self.find(value).is_some()
    }

    /// Returns the number of bits set.
    pub fn count_set_bits(&self) -> usize {
        let Some((last, rest)) = self.words().split_last() else {
            return 0;
        };

        let last = last & word::mask_until(self.len());

        rest.iter().map(|w| w.count_ones() as usize).sum::<usize>() + last.count_ones() as usize
    }

    /// Returns an iterator over the bits, from first to last.
    #[inline]
    pub fn iter(&self) -> Iter<'_> {
        Iter::new(self.words(), self.len())
    }

    /// Returns an iterator over the bits, from last to first.
    #[inline]
    pub fn iter_rev(&self) -> IterRev<'_> {
        IterRev::new(self.words(), self.len())
    }
}

//
//  Modification
//

impl<A> BitArray<A>
where
    A: ContainerAllocator,
{
    /// Sets the bit at `index` to `value`.
    ///
    /// #   Panics
    ///
    /// See `get`.
    #[inline]
    #[track_caller]
    pub fn set(&mut self, index: usize, value: bool) {
        self.range_check(index);

        BitCursor::at(index).set(self.words_mut(), value);
    }

    /// Returns a read-write proxy to the bit at `index`.
    ///
    /// #   Panics
    ///
    /// See `get`.
    #[inline]
    #[track_caller]
    pub fn bit_mut(&mut self, index: usize) -> BitMut<'_> {
        self.range_check(index);

        let (word, mask) = word::split(index);

        let word = NonNull::from(&mut self.words_mut()[word]);

        //  Safety:
        //  -   Live: `word` is borrowed from `self`, for the lifetime of the proxy.
        //  -   Shared: the proxy is the only access to `word` for its lifetime.
        unsafe { BitMut::from_raw(word, mask) }
    }

    /// Returns an iterator over proxies to the bits, from first to last.
    #[inline]
    pub fn iter_mut(&mut self) -> IterMut<'_> {
        let len = self.len();

        IterMut::new(self.words_mut(), len)
    }

    /// Appends a bit, returning its index.
    ///
    /// #   Panics
    ///
    /// If the array cannot grow.
    #[track_caller]
    pub fn add(&mut self, value: bool) -> usize {
        let index = self.reserve_uninitialized(1);

        self.num_bits = A::Size::from_usize(index + 1);

        BitCursor::at(index).set(self.words_mut(), value);

        index
    }

    /// Appends `count` bits, all set to `value`, returning the index of the first.
    ///
    /// #   Panics
    ///
    /// If the array cannot grow.
    #[track_caller]
    pub fn add_many(&mut self, value: bool, count: usize) -> usize {
        let index = self.reserve_uninitialized(count);

        self.num_bits = A::Size::from_usize(index + count);

        self.set_range(index, count, value);

        index
    }

    /// Sets the `count` bits starting at `index` to `value`.
    ///
    /// Only the words spanned by the range are touched, and the words fully covered are written whole.
    ///
    /// #   Panics
    ///
    /// If `[index, index + count)` is not within `[0, self.len())`.
    #[track_caller]
    pub fn set_range(&mut self, index: usize, count: usize, value: bool) {
        let len = self.len();

        assert!(
            index <= len && count <= len - index,
            "range [{index}, {index} + {count}) out of bounds [0, {len})"
        );

        if count == 0 {
            return;
        }

        let end = index + count;

        let start_word = index / BITS_PER_WORD;
        let end_word = (end - 1) / BITS_PER_WORD;

        let start_mask = word::mask_from(index);
        let end_mask = word::mask_until(end);

        let fill = |word: &mut Word, mask: Word| {
            if value {
                *word |= mask;
            } else {
                *word &= !mask;
            }
        };

        let words = self.words_mut();

        if start_word == end_word {
            fill(&mut words[start_word], start_mask & end_mask);
            return;
        }

        fill(&mut words[start_word], start_mask);

        words[start_word + 1..end_word].fill(if value { ALL_ONES } else { ALL_ZEROS });

        fill(&mut words[end_word], end_mask);
    }

    /// Removes the `count` bits starting at `base`, shifting the following bits `count` positions down.
    ///
    /// The capacity is left unchanged.
    ///
    /// #   Panics
    ///
    /// If `[base, base + count)` is not within `[0, self.len())`.
    #[track_caller]
    pub fn remove_at(&mut self, base: usize, count: usize) {
        let len = self.len();

        assert!(
            base <= len && count <= len - base,
            "range [{base}, {base} + {count}) out of bounds [0, {len})"
        );

        if count == 0 {
            return;
        }

        let words = self.words_mut();

        let mut read = BitCursor::at(base + count);
        let mut write = BitCursor::at(base);

        for _ in base + count..len {
            let bit = read.get(words);
            write.set(words, bit);

            read.forward();
            write.forward();
        }

        self.num_bits = A::Size::from_usize(len - count);
    }

    /// Resizes the array to exactly `num_bits` bits of capacity, rounded up to whole words, then sets them all to
    /// `value`.
    pub fn init(&mut self, value: bool, num_bits: usize) {
        self.empty(num_bits);

        if num_bits == 0 {
            return;
        }

        self.num_bits = A::Size::from_usize(num_bits);

        self.words_mut().fill(if value { ALL_ONES } else { ALL_ZEROS });
    }

    /// Removes all bits, then resizes the block to exactly `expected` bits, rounded up to whole words.
    #[track_caller]
    pub fn empty(&mut self, expected: usize) {
        self.num_bits = A::Size::ZERO;

        let expected_words = word::words_for(expected);

        if expected_words != self.max_words() {
            self.resize_words(Self::checked_words(expected_words));
        }
    }

    /// Removes all bits, keeping the block.
    #[inline]
    pub fn reset(&mut self) {
        self.num_bits = A::Size::ZERO;
    }

    /// Ensures the block can hold at least `number` bits in total.
    ///
    /// #   Panics
    ///
    /// If the block cannot be grown.
    #[track_caller]
    pub fn reserve(&mut self, number: usize) {
        if number <= self.capacity() {
            return;
        }

        let words = self.allocator.calculate_slack_reserve(word::words_for(number), Self::WORD);

        self.resize_words(Self::checked_words(words));
    }

    /// Replaces the bits of `self` by those of `other`, leaving `other` empty.
    ///
    /// The block of `other` is handed over if the allocation policy supports it, in which case `other` is left without
    /// block; otherwise, the words are copied and `other` keeps its block.
    pub fn move_from(&mut self, other: &mut Self) {
        if A::SUPPORTS_MOVE {
            self.allocator.move_to_empty(&mut other.allocator);

            self.num_bits = core::mem::replace(&mut other.num_bits, A::Size::ZERO);
            self.max_bits = core::mem::replace(&mut other.max_bits, A::Size::ZERO);

            return;
        }

        self.assign_from(other);

        other.reset();
    }
}

//
//  Common traits
//

impl<A> Clone for BitArray<A>
where
    A: ContainerAllocator + Default,
{
    fn clone(&self) -> Self {
        let mut result = Self::new();
        result.assign_from(self);

        result
    }

    fn clone_from(&mut self, source: &Self) {
        self.assign_from(source);
    }
}

impl<A> fmt::Debug for BitArray<A>
where
    A: ContainerAllocator,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "BitArray(")?;

        for bit in self.iter() {
            f.write_str(if bit { "1" } else { "0" })?;
        }

        write!(f, ")")
    }
}

impl<A> Default for BitArray<A>
where
    A: ContainerAllocator + Default,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<A> Eq for BitArray<A> where A: ContainerAllocator {}

impl<A> Hash for BitArray<A>
where
    A: ContainerAllocator,
{
    fn hash<H>(&self, state: &mut H)
    where
        H: Hasher,
    {
        self.len().hash(state);

        let Some((last, rest)) = self.words().split_last() else {
            return;
        };

        rest.hash(state);
        (last & word::mask_until(self.len())).hash(state);
    }
}

impl<A> Index<usize> for BitArray<A>
where
    A: ContainerAllocator,
{
    type Output = bool;

    #[inline]
    #[track_caller]
    fn index(&self, index: usize) -> &bool {
        if self.get(index) { &true } else { &false }
    }
}

impl<A, B> PartialEq<BitArray<B>> for BitArray<A>
where
    A: ContainerAllocator,
    B: ContainerAllocator,
{
    fn eq(&self, other: &BitArray<B>) -> bool {
        if self.len() != other.len() {
            return false;
        }

        let (Some((left_last, left)), Some((right_last, right))) =
            (self.words().split_last(), other.words().split_last())
        else {
            return true;
        };

        let mask = word::mask_until(self.len());

        left == right && (left_last & mask) == (right_last & mask)
    }
}

impl<A> Extend<bool> for BitArray<A>
where
    A: ContainerAllocator,
{
    fn extend<I>(&mut self, iter: I)
    where
        I: IntoIterator<Item = bool>,
    {
        let iter = iter.into_iter();

        let (lower, _) = iter.size_hint();

        if lower > self.capacity() - self.len() {
            self.reserve_uninitialized(lower);
        }

        for bit in iter {
            self.add(bit);
        }
    }
}

impl<A> FromIterator<bool> for BitArray<A>
where
    A: ContainerAllocator + Default,
{
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = bool>,
    {
        let mut result = Self::new();
        result.extend(iter);

        result
    }
}

impl<'a, A> IntoIterator for &'a BitArray<A>
where
    A: ContainerAllocator,
{
    type Item = bool;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Iter<'a> {
        self.iter()
    }
}

impl<'a, A> IntoIterator for &'a mut BitArray<A>
where
    A: ContainerAllocator,
{
    type Item = BitMut<'a>;
    type IntoIter = IterMut<'a>;

    fn into_iter(self) -> IterMut<'a> {
        self.iter_mut()
    }
}

//
//  Implementation
//

impl<A> BitArray<A>
where
    A: ContainerAllocator,
{
    const WORD: Layout = Layout::new::<Word>();

    //  Returns a pointer to the first word of the block, or a dangling pointer if there is no block.
    #[inline(always)]
    fn data(&self) -> *mut Word {
        let allocation = self.allocator.allocation();

        if allocation.is_null() {
            NonNull::dangling().as_ptr()
        } else {
            allocation.cast()
        }
    }

    #[inline(always)]
    fn num_words(&self) -> usize {
        word::words_for(self.len())
    }

    #[inline(always)]
    fn max_words(&self) -> usize {
        self.capacity() / BITS_PER_WORD
    }

    #[inline]
    fn words_mut(&mut self) -> &mut [Word] {
        //  Safety:
        //  -   `self.data()` is non-null and aligned, and points to `self.max_words()` initialized words.
        //  -   `self.num_words() <= self.max_words()`, as per Bounded invariant.
        unsafe { slice::from_raw_parts_mut(self.data(), self.num_words()) }
    }

    #[inline(always)]
    fn check_invariants(&self) {
        debug_assert!(self.num_bits >= A::Size::ZERO);
        debug_assert!(self.num_bits <= self.max_bits);
        debug_assert!(self.capacity() % BITS_PER_WORD == 0);
    }

    #[inline(always)]
    #[track_caller]
    fn range_check(&self, index: usize) {
        if A::REQUIRE_RANGE_CHECK {
            let len = self.len();

            assert!(index < len, "index {index} out of bounds [0, {len})");
        }
    }

    //  Returns the index of the highest bit set in `bits`, which must not be empty, of the word at `index`.
    #[inline(always)]
    fn highest_bit(index: usize, bits: Word) -> usize {
        debug_assert_ne!(ALL_ZEROS, bits);

        index * BITS_PER_WORD + (BITS_PER_WORD - 1 - word::count_leading_zeros(bits) as usize)
    }

    //  Returns the largest number of words whose bits can be counted by the size class.
    #[inline(always)]
    fn words_limit() -> usize {
        A::Size::MAX / BITS_PER_WORD
    }

    //  Returns `words`, if within `words_limit`, and raises a capacity overflow otherwise.
    #[inline]
    #[track_caller]
    fn checked_words(words: usize) -> usize {
        if words > Self::words_limit() {
            ReserveError::CapacityOverflow.raise();
        }

        words
    }

    //  Replaces the bits of `self` by those of `other`, reusing the block if possible.
    fn assign_from<B>(&mut self, other: &BitArray<B>)
    where
        B: ContainerAllocator,
    {
        self.reset();
        self.reserve(other.len());

        let source = other.words();

        self.num_bits = A::Size::from_usize(other.len());
        self.words_mut().copy_from_slice(source);
    }

    //  Ensures there is room for `count` additional bits, returning the index of the first new bit.
    //
    //  Does not modify `self.num_bits`.
    #[inline]
    #[track_caller]
    fn reserve_uninitialized(&mut self, count: usize) -> usize {
        self.check_invariants();

        let index = self.len();

        let Some(required) = index.checked_add(count) else {
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
        let required_words = Self::checked_words(word::words_for(required));

        let new_words = self
            .allocator
            .calculate_slack_grow(required_words, self.max_words(), Self::WORD)
            .min(Self::words_limit());

        debug_assert!(new_words >= required_words, "{new_words} < {required_words}");

        self.resize_words(new_words);
    }

    //  Resizes the block to `new_words` words, zeroing the words beyond those in use.
    #[track_caller]
    fn resize_words(&mut self, new_words: usize) {
        let preserved = self.num_words();

        debug_assert!(new_words >= preserved);
        debug_assert!(new_words <= Self::words_limit());

        //  Safety:
        //  -   Layout: `Self::WORD` is used throughout.
        //  -   Preservation: `preserved <= self.max_words()`, as per Bounded invariant.
        unsafe { self.allocator.resize_allocation(preserved, new_words, Self::WORD) };

        //  Safety:
        //  -   The block holds `new_words` words, of which the first `preserved` were preserved.
        unsafe { ptr::write_bytes(self.data().add(preserved), 0, new_words - preserved) };

        self.max_bits = A::Size::from_usize(new_words * BITS_PER_WORD);

        self.check_invariants();
    }
}
