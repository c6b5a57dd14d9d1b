//! Error type for heap operations
//!
//! Every caller-facing failure is reported through [`HeapError`]. Internal
//! consistency violations are not part of this taxonomy; they are checked with
//! debug assertions and by [`DaryHeap::check_invariants`](crate::DaryHeap::check_invariants).

use thiserror::Error;

/// Error type for heap operations
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum HeapError {
    /// The branching factor is outside `2..=max`
    #[error("branching factor must be between 2 and {max}, got {given}")]
    InvalidBranchingFactor {
        /// The rejected branching factor
        given: usize,
        /// The largest supported branching factor
        max: usize,
    },
    /// A read or extraction was attempted on a heap with no elements
    #[error("empty heap")]
    EmptyHeap,
    /// No element with this identity is present in the heap
    #[error("element {0:#018x} not found in identity index")]
    ElementNotFound(u64),
    /// An element with this identity is already present in the heap
    #[error("element {0:#018x} is already present in the heap")]
    DuplicateIdentity(u64),
    /// The priority is NaN and cannot be ordered
    #[error("priority must not be NaN")]
    InvalidPriority,
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, HeapError>;
