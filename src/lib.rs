//! Owning arrays, generic over their storage policy.
//!
//! #   Organization
//!
//! This crate is composed of multiple top modules:
//!
//! -   The `api` top module contains the vocabulary traits: the allocator contract, and the capabilities of items.
//! -   The `allocators` module contains a selection of storage policies implementing the allocator contract.
//! -   The `collections` module contains the containers: a growable array of items, and a dense array of bits.
//! -   The `utils` module contains a selection of low-level functions upon which the containers, and policies, are
//!     built.
//!
//!
//! #   Storage policies
//!
//! Containers own their items, but not their memory. The block of memory holding the items is owned by a storage
//! policy, which decides how many slots are allocated, when to grow, and when to shrink:
//!
//! ```
//! use owned_arrays::{allocators::FixedAllocator, collections::DynamicArray};
//!
//! //  Heap allocated, with geometric growth.
//! let mut heap = DynamicArray::<u32>::new();
//! heap.extend([1, 2, 3]);
//!
//! //  Stored inline, within the array itself.
//! let mut inline = DynamicArray::<u32, FixedAllocator<64>>::new();
//! inline.extend([1, 2, 3]);
//!
//! assert_eq!(heap, inline);
//! assert_eq!(16, inline.capacity());
//! ```
//!
//!
//! #   Item capabilities
//!
//! Containers construct, relocate, compare, and destroy items in bulk. For items declaring the capability, see
//! `api::ItemTraits`, those bulk operations are performed on the raw bytes.

#![cfg_attr(not(test), no_std)]
//  Features (library)
#![cfg_attr(feature = "allocator_api", feature(allocator_api))]
//  Lints
#![deny(missing_docs)]
//  This author prefers to keep its test modules close to what they are testing.
#![allow(clippy::items_after_test_module)]

#[cfg(feature = "alloc")]
extern crate alloc;

pub mod allocators;
pub mod api;
pub mod collections;
pub mod utils;
