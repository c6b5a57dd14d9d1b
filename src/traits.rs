//! Identity capability for heap values
//!
//! Every value stored in a [`DaryHeap`](crate::DaryHeap) is located later by a
//! stable 64-bit identity rather than by its position. The heap derives that
//! identity exactly once, at insertion, through the [`Identity`] trait and never
//! recomputes it, so the derivation must be deterministic for the lifetime of
//! the heap.
//!
//! # Example
//!
//! ```rust
//! use indexed_dary_heap::{hash_identity, Identity};
//!
//! struct Task {
//!     name: &'static str,
//!     #[allow(dead_code)]
//!     attempt: u32,
//! }
//!
//! impl Identity for Task {
//!     fn identity(&self) -> u64 {
//!         // Retries of the same task share an identity
//!         hash_identity(self.name)
//!     }
//! }
//!
//! let a = Task { name: "compile", attempt: 1 };
//! let b = Task { name: "compile", attempt: 2 };
//! assert_eq!(a.identity(), b.identity());
//! assert_eq!(a.identity(), "compile".identity());
//! ```

use rustc_hash::FxHasher;
use std::hash::{Hash, Hasher};

/// Derivation of a stable 64-bit identity from a value
///
/// Two values that should be treated as the same logical element must return
/// the same identity; distinct elements must return distinct identities.
/// Inserting a second value whose identity is already present is rejected with
/// [`HeapError::DuplicateIdentity`](crate::HeapError::DuplicateIdentity).
pub trait Identity {
    /// Returns this value's identity
    fn identity(&self) -> u64;
}

/// Hashes any `Hash` value with `FxHasher`
///
/// `FxHasher` is unseeded, so the result is the same across runs and processes,
/// which makes it suitable for identities that are computed once and compared
/// later.
pub fn hash_identity<T: Hash + ?Sized>(value: &T) -> u64 {
    let mut hasher = FxHasher::default();
    value.hash(&mut hasher);
    hasher.finish()
}

impl Identity for str {
    fn identity(&self) -> u64 {
        hash_identity(self)
    }
}

impl Identity for String {
    fn identity(&self) -> u64 {
        self.as_str().identity()
    }
}

impl<T: Identity + ?Sized> Identity for &T {
    fn identity(&self) -> u64 {
        (**self).identity()
    }
}

impl<T: Identity + ?Sized> Identity for Box<T> {
    fn identity(&self) -> u64 {
        (**self).identity()
    }
}

macro_rules! impl_hashed_identity {
    ($($t:ty),* $(,)?) => {
        $(
            impl Identity for $t {
                fn identity(&self) -> u64 {
                    hash_identity(self)
                }
            }
        )*
    };
}

impl_hashed_identity!(u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize, char);
