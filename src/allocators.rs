//! Implementations of the allocation policies.
//!
//! -   `HeapAllocator`: heap storage, geometric growth, lazy shrinking.
//! -   `UncheckedHeapAllocator`: as `HeapAllocator`, without precise range checks.
//! -   `FixedAllocator`: inline storage of a fixed number of bytes.

pub mod fixed;

#[cfg(feature = "alloc")]
pub mod heap;

#[cfg(all(test, feature = "alloc"))]
pub(crate) mod counting;

pub use fixed::FixedAllocator;

#[cfg(feature = "alloc")]
pub use heap::{HeapAllocator, UncheckedHeapAllocator};

/// The allocation policy of containers which do not specify one.
#[cfg(feature = "alloc")]
pub type DefaultAllocator = HeapAllocator;

/// The allocation policy of containers which do not specify one.
#[cfg(not(feature = "alloc"))]
pub type DefaultAllocator = FixedAllocator<256>;
