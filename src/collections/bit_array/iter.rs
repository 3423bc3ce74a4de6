//! Iterators over the bits of a `BitArray`.
//!
//! The iterators walk bit by bit with a cursor: a word index, and a single-bit mask rotated at each step, the word index
//! only being adjusted when the mask wraps around.

use core::{iter::FusedIterator, marker::PhantomData, ptr::NonNull};

use crate::{
    collections::bit_array::BitMut,
    utils::word::{self, Word},
};

/// Position of a single bit: a word index, and a single-bit mask within that word.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(super) struct BitCursor {
    pub(super) word: usize,
    pub(super) mask: Word,
}

impl BitCursor {
    //  Creates a cursor pointing to the bit at `index`.
    #[inline(always)]
    pub(super) const fn at(index: usize) -> Self {
        let (word, mask) = word::split(index);

        Self { word, mask }
    }

    //  Moves to the next bit.
    #[inline(always)]
    pub(super) fn forward(&mut self) {
        self.mask = self.mask.rotate_left(1);

        if self.mask == 1 {
            self.word += 1;
        }
    }

    //  Moves to the previous bit.
    //
    //  The word index wraps around when moving before the first bit, and must not be used afterwards.
    #[inline(always)]
    pub(super) fn backward(&mut self) {
        self.mask = self.mask.rotate_right(1);

        if self.mask == 1 << (word::BITS_PER_WORD - 1) {
            self.word = self.word.wrapping_sub(1);
        }
    }

    //  Returns whether the bit is set in `words`.
    #[inline(always)]
    pub(super) fn get(&self, words: &[Word]) -> bool {
        words[self.word] & self.mask != 0
    }

    //  Sets, or clears, the bit in `words`.
    #[inline(always)]
    pub(super) fn set(&self, words: &mut [Word], value: bool) {
        if value {
            words[self.word] |= self.mask;
        } else {
            words[self.word] &= !self.mask;
        }
    }
}

/// Iterator over the bits of a `BitArray`, from first to last.
#[derive(Clone, Debug)]
pub struct Iter<'a> {
    words: &'a [Word],
    cursor: BitCursor,
    remaining: usize,
}

impl<'a> Iter<'a> {
    //  Creates an iterator over the first `len` bits of `words`.
    pub(super) fn new(words: &'a [Word], len: usize) -> Self {
        debug_assert!(len <= words.len() * word::BITS_PER_WORD);

        Self {
            words,
            cursor: BitCursor::at(0),
            remaining: len,
        }
    }
}

impl Iterator for Iter<'_> {
    type Item = bool;

    #[inline]
    fn next(&mut self) -> Option<bool> {
        if self.remaining == 0 {
            return None;
        }

        let bit = self.cursor.get(self.words);

        self.cursor.forward();
        self.remaining -= 1;

        Some(bit)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Iter<'_> {}

impl FusedIterator for Iter<'_> {}

/// Iterator over the bits of a `BitArray`, from last to first.
#[derive(Clone, Debug)]
pub struct IterRev<'a> {
    words: &'a [Word],
    cursor: BitCursor,
    remaining: usize,
}

impl<'a> IterRev<'a> {
    //  Creates an iterator over the first `len` bits of `words`, in reverse.
    pub(super) fn new(words: &'a [Word], len: usize) -> Self {
        debug_assert!(len <= words.len() * word::BITS_PER_WORD);

        Self {
            words,
            cursor: BitCursor::at(len.saturating_sub(1)),
            remaining: len,
        }
    }
}

impl Iterator for IterRev<'_> {
    type Item = bool;

    #[inline]
    fn next(&mut self) -> Option<bool> {
        if self.remaining == 0 {
            return None;
        }

        let bit = self.cursor.get(self.words);

        self.cursor.backward();
        self.remaining -= 1;

        Some(bit)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for IterRev<'_> {}

impl FusedIterator for IterRev<'_> {}

/// Iterator over proxies to the bits of a `BitArray`, from first to last.
pub struct IterMut<'a> {
    //  Safety Invariants:
    //  -   Live: `words` points to at least `words_for(cursor index + remaining)` words, valid for reads and writes,
    //      and exclusively borrowed, for the duration of `'a`.
    words: NonNull<Word>,
    cursor: BitCursor,
    remaining: usize,
    _marker: PhantomData<&'a mut [Word]>,
}

impl<'a> IterMut<'a> {
    //  Creates an iterator over proxies to the first `len` bits of `words`.
    pub(super) fn new(words: &'a mut [Word], len: usize) -> Self {
        debug_assert!(len <= words.len() * word::BITS_PER_WORD);

        Self {
            words: NonNull::from(words).cast(),
            cursor: BitCursor::at(0),
            remaining: len,
            _marker: PhantomData,
        }
    }
}

impl<'a> Iterator for IterMut<'a> {
    type Item = BitMut<'a>;

    #[inline]
    fn next(&mut self) -> Option<BitMut<'a>> {
        if self.remaining == 0 {
            return None;
        }

        //  Safety:
        //  -   `cursor.word` is within the words, as `remaining > 0`, as per Live invariant.
        let word = unsafe { self.words.add(self.cursor.word) };

        //  Safety:
        //  -   Live: the words are exclusively borrowed for `'a`, as per Live invariant.
        //  -   Shared: the words are only accessed through the proxies for `'a`.
        let bit = unsafe { BitMut::from_raw(word, self.cursor.mask) };

        self.cursor.forward();
        self.remaining -= 1;

        Some(bit)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for IterMut<'_> {}

impl FusedIterator for IterMut<'_> {}
