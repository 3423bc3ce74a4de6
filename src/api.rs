//! The vocabulary traits shared by containers and allocation policies.

pub mod allocator;
pub mod item_traits;

pub use allocator::{ContainerAllocator, SizeClass, array_layout};
pub use item_traits::{BitwiseConstructible, ItemTraits, is_bitwise_relocatable, is_trivially_destructible};

pub use crate::utils::ReserveError;
