//! Capabilities of the items stored in a container.
//!
//! Containers move, copy, compare, and destroy items in bulk. For "plain data" items, those bulk operations can be
//! performed on the raw bytes, at the cost of a `memcpy`, `memmove`, or `memcmp`; for other items they must be
//! performed one item at a time.
//!
//! The capabilities are compile-time constants of the item type, so that the choice between both paths is made once
//! per instantiation, and never by the caller.
//!
//! -   Trivially destructible: answered by the language, see `is_trivially_destructible`.
//! -   Bitwise relocatable: always true in Rust, see `is_bitwise_relocatable`.
//! -   Bitwise constructible & bytewise comparable: declared by the item type, see `ItemTraits`.
//! -   Bitwise constructible from another type: declared by the item type, see `BitwiseConstructible`.

use core::mem;

/// Returns whether destroying a `T` is a no-op.
///
/// #   Examples
///
/// ```
/// #   use owned_arrays::api::is_trivially_destructible;
/// assert!(is_trivially_destructible::<u32>());
/// assert!(!is_trivially_destructible::<String>());
/// ```
#[inline(always)]
pub const fn is_trivially_destructible<T>() -> bool {
    !mem::needs_drop::<T>()
}

/// Returns whether a `T` may be relocated -- moved to a new location, the old location being forgotten -- by
/// copying its bytes.
///
/// Every Rust type is bitwise relocatable: a move _is_ a bitwise copy, after which the source is never used again.
#[inline(always)]
pub const fn is_bitwise_relocatable<T>() -> bool {
    true
}

/// Capabilities of an item type, consulted by containers to dispatch their bulk operations.
///
/// The default values are the conservative ones: items are cloned, and compared, one at a time. Implementing this
/// trait with the default values is always sound:
///
/// ```
/// #   use owned_arrays::api::ItemTraits;
/// #[derive(Clone, PartialEq)]
/// struct Name(String);
///
/// //  Safety:
/// //  -   The defaults make no claim.
/// unsafe impl ItemTraits for Name {}
/// ```
///
/// #   Safety
///
/// -   Bitwise Constructible: if `IS_BITWISE_CONSTRUCTIBLE` is true, then copying the bytes of a value must produce a
///     value indistinguishable from calling `Clone::clone` on it. This implies that the type is `Copy`, or could be.
/// -   Bytewise Comparable: if `IS_BYTEWISE_COMPARABLE` is true, then the type must have no padding bytes, and two
///     values must compare equal, according to `PartialEq`, if and only if their bytes are equal.
pub unsafe trait ItemTraits: Sized {
    /// Whether a copy of the bytes of a value is a valid clone of that value.
    const IS_BITWISE_CONSTRUCTIBLE: bool = false;

    /// Whether two values are equal if, and only if, their bytes are equal.
    const IS_BYTEWISE_COMPARABLE: bool = false;
}

/// Declares that a `Self` may be constructed by copying the bytes of a `Source`.
///
/// This enables converting copies, and storage transfers, between containers of different item types.
///
/// #   Safety
///
/// -   Layout: `Self` and `Source` must have the same size and alignment.
/// -   Validity: any bit-pattern valid for `Source` must be valid for `Self`.
/// -   Ownership: copying the bytes of a `Source`, without forgetting it, must be sound; that is `Source` must be `Copy`,
///     or could be.
pub unsafe trait BitwiseConstructible<Source> {}

//  Safety:
//  -   Layout & Validity: trivially, the types are identical.
//  -   Ownership: `T` is `Copy`.
unsafe impl<T> BitwiseConstructible<T> for T where T: Copy {}

macro_rules! bitwise_constructible_pairs {
    ($($a:ty, $b:ty);* $(;)?) => {
        $(
            //  Safety:
            //  -   Layout: integers of identical width, the signed and unsigned flavors.
            //  -   Validity: all bit-patterns are valid integers.
            //  -   Ownership: integers are `Copy`.
            unsafe impl BitwiseConstructible<$a> for $b {}

            //  Safety:
            //  -   Same as above.
            unsafe impl BitwiseConstructible<$b> for $a {}
        )*
    };
}

bitwise_constructible_pairs! {
    u8, i8;
    u16, i16;
    u32, i32;
    u64, i64;
    u128, i128;
    usize, isize;
}

/// Implements `ItemTraits` for user types.
///
/// -   `item_traits!(default: A, B)`: no claim, items are cloned and compared one at a time.
/// -   `item_traits!(copy: A, B)`: bitwise constructible; the types must be `Copy`, which is checked.
/// -   `item_traits!(unsafe plain: A, B)`: bitwise constructible and bytewise comparable; the types must be `Copy`,
///     which is checked, and have no padding with equality being equality of bytes, which is not.
///
/// #   Examples
///
/// ```
/// #   use owned_arrays::{api::ItemTraits, item_traits};
/// #[derive(Clone, Copy, PartialEq)]
/// struct Point { x: i32, y: i32 }
///
/// #[derive(Clone, Copy, PartialEq)]
/// struct Sample { value: f64, tag: u8 }
///
/// //  Safety:
/// //  -   `Point` has no padding, and compares field-wise.
/// item_traits!(unsafe plain: Point);
/// item_traits!(copy: Sample);
///
/// assert!(Point::IS_BYTEWISE_COMPARABLE);
/// assert!(Sample::IS_BITWISE_CONSTRUCTIBLE);
/// assert!(!Sample::IS_BYTEWISE_COMPARABLE);
/// ```
#[macro_export]
macro_rules! item_traits {
    (default: $($t:ty),+ $(,)?) => {
        $(
            //  Safety:
            //  -   The defaults make no claim.
            unsafe impl $crate::api::ItemTraits for $t {}
        )+
    };
    (copy: $($t:ty),+ $(,)?) => {
        $(
            const _: () = {
                const fn require_copy<T: ::core::marker::Copy>() {}

                require_copy::<$t>();
            };

            //  Safety:
            //  -   Bitwise Constructible: `Copy`, as checked above.
            unsafe impl $crate::api::ItemTraits for $t {
                const IS_BITWISE_CONSTRUCTIBLE: bool = true;
            }
        )+
    };
    (unsafe plain: $($t:ty),+ $(,)?) => {
        $(
            const _: () = {
                const fn require_copy<T: ::core::marker::Copy>() {}

                require_copy::<$t>();
            };

            //  Safety:
            //  -   Bitwise Constructible: `Copy`, as checked above.
            //  -   Bytewise Comparable: as per the caller.
            unsafe impl $crate::api::ItemTraits for $t {
                const IS_BITWISE_CONSTRUCTIBLE: bool = true;
                const IS_BYTEWISE_COMPARABLE: bool = true;
            }
        )+
    };
}

//
//  Implementations for the core & alloc types.
//

//  Types without padding, for which equality is equality of bytes.
macro_rules! plain_item_traits {
    ($($t:ty),* $(,)?) => {
        $(
            //  Safety:
            //  -   Bitwise Constructible: `Copy`.
            //  -   Bytewise Comparable: no padding, and equality is bytewise equality.
            unsafe impl ItemTraits for $t {
                const IS_BITWISE_CONSTRUCTIBLE: bool = true;
                const IS_BYTEWISE_COMPARABLE: bool = true;
            }
        )*
    };
}

plain_item_traits!(u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize, bool, char, ());

//  Types which are `Copy`, but for which equality is not equality of bytes.
macro_rules! copy_item_traits {
    ($($t:ty),* $(,)?) => {
        $(
            //  Safety:
            //  -   Bitwise Constructible: `Copy`.
            unsafe impl ItemTraits for $t {
                const IS_BITWISE_CONSTRUCTIBLE: bool = true;
            }
        )*
    };
}

//  `0.0 == -0.0`, and `NaN != NaN`.
copy_item_traits!(f32, f64);

//  Safety:
//  -   Bitwise Constructible: `Copy`.
//  -   Bytewise Comparable: not claimed, as equality compares the pointees.
unsafe impl<T> ItemTraits for &T {
    const IS_BITWISE_CONSTRUCTIBLE: bool = true;
}

//  Safety:
//  -   Bitwise Constructible: `Copy`.
//  -   Bytewise Comparable: not claimed, even if it would hold, as wide pointers compare their metadata.
unsafe impl<T> ItemTraits for *const T {
    const IS_BITWISE_CONSTRUCTIBLE: bool = true;
}

//  Safety:
//  -   Same as `*const T`.
unsafe impl<T> ItemTraits for *mut T {
    const IS_BITWISE_CONSTRUCTIBLE: bool = true;
}

//  Safety:
//  -   Bitwise Constructible: a copy of the bytes of an array is a copy of the bytes of each of its elements.
//  -   Bytewise Comparable: arrays have no padding between elements, and compare element-wise.
unsafe impl<T, const N: usize> ItemTraits for [T; N]
where
    T: ItemTraits,
{
    const IS_BITWISE_CONSTRUCTIBLE: bool = T::IS_BITWISE_CONSTRUCTIBLE;
    const IS_BYTEWISE_COMPARABLE: bool = T::IS_BYTEWISE_COMPARABLE;
}

//  Safety:
//  -   Bitwise Constructible: a copy of the bytes of `Some(t)` is `Some` of a copy of the bytes of `t`.
//  -   Bytewise Comparable: not claimed, `None` may contain arbitrary bytes.
unsafe impl<T> ItemTraits for Option<T>
where
    T: ItemTraits,
{
    const IS_BITWISE_CONSTRUCTIBLE: bool = T::IS_BITWISE_CONSTRUCTIBLE;
}

macro_rules! tuple_item_traits {
    ($($name:ident),+) => {
        //  Safety:
        //  -   Bitwise Constructible: a copy of the bytes of a tuple is a copy of the bytes of each of its fields.
        //  -   Bytewise Comparable: not claimed, tuples may contain padding.
        unsafe impl<$($name),+> ItemTraits for ($($name,)+)
        where
            $($name: ItemTraits),+
        {
            const IS_BITWISE_CONSTRUCTIBLE: bool = true $(&& $name::IS_BITWISE_CONSTRUCTIBLE)+;
        }
    };
}

tuple_item_traits!(A);
tuple_item_traits!(A, B);
tuple_item_traits!(A, B, C);
tuple_item_traits!(A, B, C, D);

#[cfg(feature = "alloc")]
mod alloc_impls {
    use alloc::{boxed::Box, rc::Rc, string::String, sync::Arc, vec::Vec};

    use super::ItemTraits;

    //  Safety:
    //  -   The defaults make no claim.
    unsafe impl ItemTraits for String {}

    //  Safety:
    //  -   The defaults make no claim.
    unsafe impl<T> ItemTraits for Vec<T> {}

    //  Safety:
    //  -   The defaults make no claim.
    unsafe impl<T: ?Sized> ItemTraits for Box<T> {}

    //  Safety:
    //  -   The defaults make no claim.
    unsafe impl<T: ?Sized> ItemTraits for Rc<T> {}

    //  Safety:
    //  -   The defaults make no claim.
    unsafe impl<T: ?Sized> ItemTraits for Arc<T> {}
} // mod alloc_impls

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trivially_destructible() {
        assert!(is_trivially_destructible::<u8>());
        assert!(is_trivially_destructible::<(u32, f64)>());
        assert!(is_trivially_destructible::<[char; 3]>());

        assert!(!is_trivially_destructible::<String>());
        assert!(!is_trivially_destructible::<Option<Box<u8>>>());
    }

    #[test]
    fn plain() {
        assert!(u32::IS_BITWISE_CONSTRUCTIBLE);
        assert!(u32::IS_BYTEWISE_COMPARABLE);

        assert!(<[u16; 4]>::IS_BITWISE_CONSTRUCTIBLE);
        assert!(<[u16; 4]>::IS_BYTEWISE_COMPARABLE);
    }

    #[test]
    fn copy_only() {
        assert!(f32::IS_BITWISE_CONSTRUCTIBLE);
        assert!(!f32::IS_BYTEWISE_COMPARABLE);

        assert!(<(u8, u32)>::IS_BITWISE_CONSTRUCTIBLE);
        assert!(!<(u8, u32)>::IS_BYTEWISE_COMPARABLE);

        assert!(<Option<u64>>::IS_BITWISE_CONSTRUCTIBLE);
        assert!(!<Option<u64>>::IS_BYTEWISE_COMPARABLE);
    }

    #[test]
    fn macro_flavors() {
        #[derive(Clone, Copy, PartialEq)]
        struct Plain(u32);

        #[derive(Clone, Copy, PartialEq)]
        struct Copied(u8, u16);

        #[derive(Clone, PartialEq)]
        struct Defaulted(u8);

        crate::item_traits!(unsafe plain: Plain);
        crate::item_traits!(copy: Copied);
        crate::item_traits!(default: Defaulted);

        assert!(Plain::IS_BITWISE_CONSTRUCTIBLE && Plain::IS_BYTEWISE_COMPARABLE);
        assert!(Copied::IS_BITWISE_CONSTRUCTIBLE && !Copied::IS_BYTEWISE_COMPARABLE);
        assert!(!Defaulted::IS_BITWISE_CONSTRUCTIBLE && !Defaulted::IS_BYTEWISE_COMPARABLE);
    }

    #[cfg(feature = "alloc")]
    #[test]
    fn neither() {
        assert!(!String::IS_BITWISE_CONSTRUCTIBLE);
        assert!(!String::IS_BYTEWISE_COMPARABLE);

        assert!(!<(u8, String)>::IS_BITWISE_CONSTRUCTIBLE);
        assert!(!<[Vec<u8>; 2]>::IS_BITWISE_CONSTRUCTIBLE);
    }
}
