//! Word arithmetic for packed bits.

//  #   Why `u32`?
//
//  The words of a bit array are the unit of every bulk operation: range sets, searches, comparisons, copies. A larger
//  word makes those bulk operations more effective, but also rounds every allocation up to a larger granule, and a
//  `u64` may be emulated on 32-bits platforms.
//
//  `u32` is natively supported everywhere this crate is expected to run, and is the granule the allocation policies
//  are tuned for.
//
//  #   Why free functions?
//
//  The words are stored in a plain `[u32]`, so that they can be handed out as-is. Wrapping each word in a dedicated
//  type would only make this slice harder to hand out.

/// The type of the words in which bits are packed.
pub type Word = u32;

/// Number of bits in a word.
pub const BITS_PER_WORD: usize = Word::BITS as usize;

/// Base 2 logarithm of `BITS_PER_WORD`.
pub const BITS_PER_WORD_LOG_TWO: u32 = BITS_PER_WORD.trailing_zeros();

/// An all-zeros word.
pub const ALL_ZEROS: Word = 0;

/// An all-ones word.
pub const ALL_ONES: Word = !0;

/// Divides `dividend` by `divisor`, rounding up.
///
/// #   Panics
///
/// If `divisor` is 0.
///
/// #   Examples
///
/// ```
/// #   use owned_arrays::utils::word::divide_and_round_up;
/// assert_eq!(0, divide_and_round_up(0, 32));
/// assert_eq!(1, divide_and_round_up(1, 32));
/// assert_eq!(1, divide_and_round_up(32, 32));
/// assert_eq!(2, divide_and_round_up(33, 32));
/// ```
#[inline]
pub const fn divide_and_round_up(dividend: usize, divisor: usize) -> usize {
    //  Does not overflow, unlike `(dividend + divisor - 1) / divisor`.
    dividend / divisor + (dividend % divisor != 0) as usize
}

/// Returns the number of words required to hold `bits` bits.
#[inline]
pub const fn words_for(bits: usize) -> usize {
    divide_and_round_up(bits, BITS_PER_WORD)
}

/// Splits a bit index into a word index and a single-bit mask within that word.
///
/// #   Examples
///
/// ```
/// #   use owned_arrays::utils::word::split;
/// let (word, mask) = split(69);
///
/// assert_eq!(2, word);
/// assert_eq!(1 << 5, mask);
/// ```
#[inline]
pub const fn split(index: usize) -> (usize, Word) {
    //  Compute both / and % close together, so the optimizer fuses both in a single instruction.
    let word = index >> BITS_PER_WORD_LOG_TWO;
    let in_word = index & (BITS_PER_WORD - 1);

    (word, 1 << in_word)
}

/// Fuses a word index and a single-bit mask back into a bit index.
///
/// #   Panics
///
/// In Debug, if `mask` does not have exactly one bit set.
#[inline]
pub const fn fuse(word: usize, mask: Word) -> usize {
    debug_assert!(mask.is_power_of_two());

    (word << BITS_PER_WORD_LOG_TWO) + mask.trailing_zeros() as usize
}

/// Returns a mask of all the bits of a word at, or above, `in_word`.
///
/// `in_word` is taken modulo the number of bits in a word.
#[inline]
pub const fn mask_from(in_word: usize) -> Word {
    ALL_ONES << (in_word % BITS_PER_WORD)
}

/// Returns a mask of all the bits of the last word spanned by the first `bits` bits.
///
/// If `bits` is a multiple of the number of bits in a word, the last word is fully spanned.
#[inline]
pub const fn mask_until(bits: usize) -> Word {
    ALL_ONES >> ((BITS_PER_WORD - bits % BITS_PER_WORD) % BITS_PER_WORD)
}

/// Returns the number of trailing zeros of `word`, that is the index of its lowest set bit.
///
/// Returns `BITS_PER_WORD` for `ALL_ZEROS`.
#[inline]
pub const fn count_trailing_zeros(word: Word) -> u32 {
    word.trailing_zeros()
}

/// Returns the number of leading zeros of `word`, that is `BITS_PER_WORD - 1` minus the index of its highest set bit.
///
/// Returns `BITS_PER_WORD` for `ALL_ZEROS`.
#[inline]
pub const fn count_leading_zeros(word: Word) -> u32 {
    word.leading_zeros()
}
