//  Errors.

use core::{alloc::Layout, error, fmt};

/// An error in reserving capacity for a container.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ReserveError {
    /// The requested capacity exceeds the size class of the allocation policy, or the maximum size of an allocation.
    CapacityOverflow,
    /// The allocation policy failed to provide a block of memory for the given layout.
    AllocError {
        /// The layout of the failed request.
        layout: Layout,
    },
}

impl ReserveError {
    /// Reports the error, never returning.
    ///
    /// A `CapacityOverflow` panics, an `AllocError` is forwarded to `handle_alloc_error` when `alloc` is available, and
    /// panics otherwise.
    #[cold]
    #[inline(never)]
    #[track_caller]
    pub fn raise(self) -> ! {
        match self {
            Self::CapacityOverflow => panic!("capacity overflow"),
            #[cfg(feature = "alloc")]
            Self::AllocError { layout } => alloc::alloc::handle_alloc_error(layout),
            #[cfg(not(feature = "alloc"))]
            Self::AllocError { layout } => panic!("memory allocation of {} bytes failed", layout.size()),
        }
    }
}

impl fmt::Display for ReserveError {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            Self::CapacityOverflow => f.write_str("capacity overflow"),
            Self::AllocError { layout } => write!(
                f,
                "memory allocation of {} bytes (aligned to {}) failed",
                layout.size(),
                layout.align()
            ),
        }
    }
}

impl error::Error for ReserveError {}
