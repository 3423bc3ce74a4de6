//! Implementations of the owning containers.
//!
//! Both containers split their responsibilities with an allocation policy, see `api::ContainerAllocator`: the container
//! owns, and manages, its items while the policy owns, and sizes, the block of memory holding them.

pub mod bit_array;
pub mod dynamic_array;

pub use bit_array::{BitArray, BitMut, BitRef};
pub use dynamic_array::DynamicArray;
