//! Low-level building blocks of the containers and allocation policies.

mod error;

#[cfg(feature = "alloc")]
pub mod alloc;

pub mod items;
pub mod slack;
pub mod word;

pub use error::ReserveError;
