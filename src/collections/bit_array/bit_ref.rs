//! Proxies to a single bit of a `BitArray`.
//!
//! A proxy is a word location paired with a single-bit mask. Its lifetime is tied to a borrow of the array, hence the
//! borrow checker rejects retaining a proxy across any operation which may reallocate the words.

use core::{
    fmt,
    marker::PhantomData,
    ops::{BitAndAssign, BitOrAssign},
    ptr::NonNull,
};

use crate::utils::word::Word;

/// Read-only proxy to a single bit.
#[derive(Clone, Copy)]
pub struct BitRef<'a> {
    word: &'a Word,
    mask: Word,
}

impl<'a> BitRef<'a> {
    //  Creates a proxy to the bit(s) of `mask` within `word`.
    #[inline(always)]
    pub(super) fn new(word: &'a Word, mask: Word) -> Self {
        debug_assert!(mask.is_power_of_two());

        Self { word, mask }
    }

    /// Returns the value of the bit.
    #[inline(always)]
    pub fn get(&self) -> bool {
        *self.word & self.mask != 0
    }
}

impl From<BitRef<'_>> for bool {
    #[inline(always)]
    fn from(bit: BitRef<'_>) -> bool {
        bit.get()
    }
}

impl PartialEq<bool> for BitRef<'_> {
    fn eq(&self, other: &bool) -> bool {
        self.get() == *other
    }
}

impl fmt::Debug for BitRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        f.debug_tuple("BitRef").field(&self.get()).finish()
    }
}

/// Read-write proxy to a single bit.
///
/// Assigning through the proxy sets, or clears, exactly its bit.
pub struct BitMut<'a> {
    //  Safety Invariants:
    //  -   Live: `word` is valid for reads and writes for the duration of `'a`.
    //  -   Shared: `word` is only ever accessed through raw pointers for the duration of `'a`, as several proxies may
    //      point to the same word.
    word: NonNull<Word>,
    mask: Word,
    _marker: PhantomData<&'a mut Word>,
}

impl BitMut<'_> {
    //  Creates a proxy to the bit of `mask` within `word`.
    //
    //  #   Safety
    //
    //  -   Live: `word` must be valid for reads and writes for the duration of `'a`.
    //  -   Shared: `word` must only be accessed through raw pointers for the duration of `'a`.
    #[inline(always)]
    pub(super) unsafe fn from_raw(word: NonNull<Word>, mask: Word) -> Self {
        debug_assert!(mask.is_power_of_two());

        Self {
            word,
            mask,
            _marker: PhantomData,
        }
    }

    /// Returns the value of the bit.
    #[inline(always)]
    pub fn get(&self) -> bool {
        //  Safety:
        //  -   `self.word` is valid for reads, as per Live invariant.
        let word = unsafe { self.word.read() };

        word & self.mask != 0
    }

    /// Sets the value of the bit.
    #[inline(always)]
    pub fn set(&mut self, value: bool) {
        //  Safety:
        //  -   `self.word` is valid for reads and writes, as per Live invariant.
        //  -   No reference to `self.word` exists, as per Shared invariant.
        unsafe {
            let word = self.word.read();

            let word = if value { word | self.mask } else { word & !self.mask };

            self.word.write(word);
        }
    }
}

impl BitOrAssign<bool> for BitMut<'_> {
    #[inline(always)]
    fn bitor_assign(&mut self, value: bool) {
        if value {
            self.set(true);
        }
    }
}

impl BitAndAssign<bool> for BitMut<'_> {
    #[inline(always)]
    fn bitand_assign(&mut self, value: bool) {
        if !value {
            self.set(false);
        }
    }
}

impl From<BitMut<'_>> for bool {
    #[inline(always)]
    fn from(bit: BitMut<'_>) -> bool {
        bit.get()
    }
}

impl PartialEq<bool> for BitMut<'_> {
    fn eq(&self, other: &bool) -> bool {
        self.get() == *other
    }
}

impl fmt::Debug for BitMut<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        f.debug_tuple("BitMut").field(&self.get()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bit_ref() {
        let word: Word = 0b0100;

        assert!(BitRef::new(&word, 0b0100).get());
        assert!(!BitRef::new(&word, 0b0010).get());

        assert_eq!(BitRef::new(&word, 0b0100), true);
        assert!(bool::from(BitRef::new(&word, 0b0100)));
    }

    #[test]
    fn bit_mut() {
        let mut word: Word = 0b0100;
        let ptr = NonNull::from(&mut word);

        {
            //  Safety:
            //  -   `word` is only accessed through `ptr` within this scope.
            let (mut low, mut high) = unsafe { (BitMut::from_raw(ptr, 0b0001), BitMut::from_raw(ptr, 0b0100)) };

            low.set(true);
            high &= false;

            assert_eq!(low, true);
            assert_eq!(high, false);

            high |= true;
            low |= false;

            assert!(low.get());
            assert!(high.get());
        }

        assert_eq!(0b0101, word);
    }
}
