//! Indexed d-ary heap for Rust
//!
//! This crate provides [`DaryHeap`], an array-backed priority queue with a
//! configurable branching factor that can also locate its elements by identity.
//!
//! # Features
//!
//! - **Configurable fan-out**: any branching factor from 2 to [`MAX_BRANCHING_FACTOR`]
//! - **Priority updates**: O(log_d n) re-prioritisation of an element already in the heap
//! - **Arbitrary removal**: O(log_d n) removal of any element by identity, not position
//! - **Pluggable ordering**: [`MaxFirst`] or [`MinFirst`], chosen at compile time
//! - **Pluggable locking**: [`Synchronized`] (`parking_lot::RwLock`) or [`Unsynchronized`]
//!
//! # Example
//!
//! ```rust
//! use indexed_dary_heap::{DaryHeap, HeapError, Identity, MaxHeap};
//!
//! let heap: MaxHeap<&str> = DaryHeap::new(4).unwrap();
//! for (name, priority) in [("foo1", 20.0), ("foo2", 2.0), ("foo3", 987.0)] {
//!     heap.insert(name, priority).unwrap();
//! }
//!
//! heap.update_priority("foo3".identity(), -10.0).unwrap();
//! assert_eq!(heap.top(), Ok("foo1"));
//!
//! heap.remove("foo2".identity()).unwrap();
//! assert_eq!(heap.top(), Ok("foo3"));
//! assert_eq!(heap.top(), Err(HeapError::EmptyHeap));
//! ```

pub mod dary;
pub mod error;
pub mod order;
mod store;
pub mod sync;
pub mod traits;

pub use dary::{
    Builder, DaryHeap, LocalMaxHeap, LocalMinHeap, MaxHeap, MinHeap, DEFAULT_BRANCHING_FACTOR,
    MAX_BRANCHING_FACTOR,
};
pub use error::{HeapError, Result};
pub use order::{Comparator, MaxFirst, MinFirst};
pub use sync::{Guard, Locking, Synchronized, Unsynchronized};
pub use traits::{hash_identity, Identity};
