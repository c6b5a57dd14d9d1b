//! Indexed d-ary heap
//!
//! [`DaryHeap`] is a priority queue over `f64` priorities with a configurable
//! branching factor. Besides insertion and extraction of the top element it
//! supports O(log_d n) priority updates and O(log_d n) removal of any element,
//! addressed by the 64-bit identity its value derives through [`Identity`].
//!
//! The ordering ([`MaxFirst`] or [`MinFirst`]) and the concurrency guard
//! ([`Synchronized`] or [`Unsynchronized`]) are type parameters fixed at
//! construction. Every method takes `&self`; mutations run under the guard's
//! exclusive access and reads under its shared access.
//!
//! # Time Complexity
//!
//! | Operation         | Complexity     |
//! |-------------------|----------------|
//! | `insert`          | O(log_d n)     |
//! | `top`             | O(d log_d n)   |
//! | `peek`            | O(1)           |
//! | `contains`        | O(1)           |
//! | `update_priority` | O(d log_d n)   |
//! | `remove`          | O(d log_d n)   |
//! | `build_from`      | O(n)           |
//!
//! # Example
//!
//! ```rust
//! use indexed_dary_heap::{DaryHeap, Identity, MaxHeap};
//!
//! let heap: MaxHeap<&str> = DaryHeap::new(3).unwrap();
//! heap.insert("low", 1.0).unwrap();
//! let id = heap.insert("high", 10.0).unwrap();
//! heap.insert("mid", 5.0).unwrap();
//!
//! assert_eq!(heap.peek(), Ok("high"));
//! heap.update_priority(id, 0.0).unwrap();
//! assert_eq!(heap.top(), Ok("mid"));
//! assert!(heap.contains("low".identity()));
//! ```

use crate::error::{HeapError, Result};
use crate::order::{Comparator, MaxFirst, MinFirst};
use crate::store::{Entry, Store};
use crate::sync::{Guard, Locking, Synchronized, Unsynchronized};
use crate::traits::Identity;
use log::debug;
use std::fmt;
use std::marker::PhantomData;

/// Largest accepted branching factor
///
/// Sift-down scans every child of a node, so very wide nodes turn each level
/// into a linear search.
pub const MAX_BRANCHING_FACTOR: usize = 64;

/// Branching factor used by [`Builder`] when none is given
pub const DEFAULT_BRANCHING_FACTOR: usize = 2;

/// Max-heap shared across threads
pub type MaxHeap<V> = DaryHeap<V, MaxFirst, Synchronized>;

/// Min-heap shared across threads
pub type MinHeap<V> = DaryHeap<V, MinFirst, Synchronized>;

/// Max-heap confined to one thread
pub type LocalMaxHeap<V> = DaryHeap<V, MaxFirst, Unsynchronized>;

/// Min-heap confined to one thread
pub type LocalMinHeap<V> = DaryHeap<V, MinFirst, Unsynchronized>;

fn validate_branching_factor(branching_factor: usize) -> Result<()> {
    if !(2..=MAX_BRANCHING_FACTOR).contains(&branching_factor) {
        debug!("rejected branching factor {branching_factor}");
        return Err(HeapError::InvalidBranchingFactor {
            given: branching_factor,
            max: MAX_BRANCHING_FACTOR,
        });
    }
    Ok(())
}

/// An indexed d-ary heap
///
/// # Type Parameters
/// - `V`: the stored value; its identity is derived once at insertion
/// - `C`: ordering policy, [`MaxFirst`] by default
/// - `L`: locking policy, [`Synchronized`] by default
pub struct DaryHeap<V, C: Comparator = MaxFirst, L: Locking = Synchronized> {
    core: L::Cell<Store<V, C>>,
}

impl<V, C: Comparator, L: Locking> DaryHeap<V, C, L> {
    /// Creates an empty heap with the given branching factor
    ///
    /// # Errors
    /// Returns [`HeapError::InvalidBranchingFactor`] unless
    /// `2 <= branching_factor <= MAX_BRANCHING_FACTOR`.
    pub fn new(branching_factor: usize) -> Result<Self> {
        Self::with_capacity(branching_factor, 0)
    }

    /// Creates an empty heap with room for `capacity` elements
    pub fn with_capacity(branching_factor: usize, capacity: usize) -> Result<Self> {
        validate_branching_factor(branching_factor)?;
        debug!(
            "new {}-heap, branching factor {branching_factor}, locking {}",
            C::NAME,
            L::NAME
        );
        Ok(Self::from_store(Store::new(branching_factor, capacity)))
    }

    fn from_store(store: Store<V, C>) -> Self {
        Self {
            core: <L::Cell<Store<V, C>> as Guard<Store<V, C>>>::new(store),
        }
    }

    /// Returns the branching factor fixed at construction
    pub fn branching_factor(&self) -> usize {
        self.core.read(|s| s.branching_factor())
    }

    /// Returns the number of elements
    pub fn len(&self) -> usize {
        self.core.read(|s| s.len())
    }

    /// Returns true if the heap holds no elements
    pub fn is_empty(&self) -> bool {
        self.core.read(|s| s.is_empty())
    }

    /// Returns true if an element with this identity is present
    pub fn contains(&self, identity: u64) -> bool {
        self.core.read(|s| s.contains(identity))
    }

    /// Returns the current priority of the element with this identity
    ///
    /// # Errors
    /// Returns [`HeapError::ElementNotFound`] if the identity is absent.
    pub fn priority_of(&self, identity: u64) -> Result<f64> {
        self.core.read(|s| s.priority_of(identity))
    }

    /// Runs `f` on the top value and its priority without removing it
    ///
    /// `f` runs under the read guard and must not call back into this heap.
    ///
    /// # Errors
    /// Returns [`HeapError::EmptyHeap`] if the heap is empty.
    pub fn peek_with<R>(&self, f: impl FnOnce(&V, f64) -> R) -> Result<R> {
        self.core.read(|s| {
            s.peek()
                .map(|e| f(&e.value, e.priority))
                .ok_or(HeapError::EmptyHeap)
        })
    }

    /// Returns the priority of the top element
    pub fn peek_priority(&self) -> Result<f64> {
        self.peek_with(|_, priority| priority)
    }

    /// Removes the top element, returning its value
    ///
    /// # Errors
    /// Returns [`HeapError::EmptyHeap`] if the heap is empty.
    pub fn top(&self) -> Result<V> {
        self.top_with_priority().map(|(value, _)| value)
    }

    /// Removes the top element, returning its value and priority
    pub fn top_with_priority(&self) -> Result<(V, f64)> {
        self.core
            .write(|s| s.pop())
            .map(|e| (e.value, e.priority))
            .ok_or(HeapError::EmptyHeap)
    }

    /// Changes the priority of the element with this identity
    ///
    /// # Errors
    /// - [`HeapError::ElementNotFound`] if the identity is absent
    /// - [`HeapError::InvalidPriority`] if `priority` is NaN
    pub fn update_priority(&self, identity: u64, priority: f64) -> Result<()> {
        self.core.write(|s| s.update_priority(identity, priority))
    }

    /// Removes the element with this identity, returning its value
    ///
    /// # Errors
    /// Returns [`HeapError::ElementNotFound`] if the identity is absent.
    pub fn remove(&self, identity: u64) -> Result<V> {
        self.core.write(|s| s.remove(identity)).map(|e| e.value)
    }

    /// Removes every element
    pub fn clear(&self) {
        self.core.write(|s| s.clear());
    }

    /// Checks the heap and identity-index invariants
    ///
    /// Intended for tests; runs in O(n).
    pub fn check_invariants(&self) -> bool {
        self.core.read(|s| s.check_invariants())
    }

    /// Consumes the heap, returning `(value, priority)` pairs in extraction order
    pub fn into_sorted_vec(self) -> Vec<(V, f64)> {
        let mut store = self.core.into_inner();
        let mut out = Vec::with_capacity(store.len());
        while let Some(e) = store.pop() {
            out.push((e.value, e.priority));
        }
        out
    }

    /// Consumes the heap, returning `(value, priority)` pairs in storage order
    pub fn into_vec(self) -> Vec<(V, f64)> {
        self.core
            .into_inner()
            .into_entries()
            .into_iter()
            .map(|e| (e.value, e.priority))
            .collect()
    }
}

impl<V: Identity, C: Comparator, L: Locking> DaryHeap<V, C, L> {
    /// Inserts a value with the given priority, returning its identity
    ///
    /// The identity is computed here, once, and used by every later
    /// identity-keyed operation.
    ///
    /// # Errors
    /// - [`HeapError::DuplicateIdentity`] if an element with the same identity
    ///   is already present; the heap is left unchanged
    /// - [`HeapError::InvalidPriority`] if `priority` is NaN
    pub fn insert(&self, value: V, priority: f64) -> Result<u64> {
        let identity = value.identity();
        self.core
            .write(|s| s.insert(value, identity, priority))
            .map(|()| identity)
    }

    /// Inserts through `&mut self`, skipping the guard
    pub fn insert_mut(&mut self, value: V, priority: f64) -> Result<u64> {
        let identity = value.identity();
        self.core
            .get_mut()
            .insert(value, identity, priority)
            .map(|()| identity)
    }
}

impl<V: Clone, C: Comparator, L: Locking> DaryHeap<V, C, L> {
    /// Returns a clone of the top value without removing it
    ///
    /// # Errors
    /// Returns [`HeapError::EmptyHeap`] if the heap is empty.
    pub fn peek(&self) -> Result<V> {
        self.peek_with(|value, _| value.clone())
    }
}

impl DaryHeap<()> {
    /// Starts configuring a heap; same as [`Builder::new`]
    ///
    /// The value type is chosen when the builder is finished, so the result
    /// of `build` may hold any `V`:
    ///
    /// ```rust
    /// use indexed_dary_heap::{DaryHeap, MaxHeap};
    ///
    /// let heap: MaxHeap<u32> = DaryHeap::builder().branching_factor(4).build().unwrap();
    /// assert_eq!(heap.branching_factor(), 4);
    /// ```
    pub fn builder() -> Builder {
        Builder::new()
    }
}

impl<V, C: Comparator, L: Locking> fmt::Debug for DaryHeap<V, C, L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (len, branching_factor) = self.core.read(|s| (s.len(), s.branching_factor()));
        f.debug_struct("DaryHeap")
            .field("order", &C::NAME)
            .field("locking", &L::NAME)
            .field("branching_factor", &branching_factor)
            .field("len", &len)
            .finish()
    }
}

/// Typestate builder for [`DaryHeap`]
///
/// # Example
///
/// ```rust
/// use indexed_dary_heap::{Builder, LocalMinHeap};
///
/// let heap: LocalMinHeap<u32> = Builder::new()
///     .branching_factor(4)
///     .capacity(128)
///     .min_first()
///     .unsynchronized()
///     .build_from([(3, 3.0), (1, 1.0), (2, 2.0)])
///     .unwrap();
/// assert_eq!(heap.top(), Ok(1));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Builder<C = MaxFirst, L = Synchronized> {
    branching_factor: usize,
    capacity: usize,
    _policy: PhantomData<(C, L)>,
}

impl Builder<MaxFirst, Synchronized> {
    /// Starts configuring a binary max-heap with locking enabled
    pub fn new() -> Self {
        Self {
            branching_factor: DEFAULT_BRANCHING_FACTOR,
            capacity: 0,
            _policy: PhantomData,
        }
    }
}

impl Default for Builder<MaxFirst, Synchronized> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Comparator, L: Locking> Builder<C, L> {
    /// Sets the branching factor; validated by `build`
    pub fn branching_factor(mut self, branching_factor: usize) -> Self {
        self.branching_factor = branching_factor;
        self
    }

    /// Reserves room for `capacity` elements
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    fn retype<C2, L2>(self) -> Builder<C2, L2> {
        Builder {
            branching_factor: self.branching_factor,
            capacity: self.capacity,
            _policy: PhantomData,
        }
    }

    /// Extract the largest priority first
    pub fn max_first(self) -> Builder<MaxFirst, L> {
        self.retype()
    }

    /// Extract the smallest priority first
    pub fn min_first(self) -> Builder<MinFirst, L> {
        self.retype()
    }

    /// Guard the heap with a reader/writer lock
    pub fn synchronized(self) -> Builder<C, Synchronized> {
        self.retype()
    }

    /// Skip locking; the heap cannot be shared between threads
    pub fn unsynchronized(self) -> Builder<C, Unsynchronized> {
        self.retype()
    }

    /// Builds an empty heap
    ///
    /// # Errors
    /// Returns [`HeapError::InvalidBranchingFactor`] if the branching factor
    /// is out of range.
    pub fn build<V>(self) -> Result<DaryHeap<V, C, L>> {
        DaryHeap::with_capacity(self.branching_factor, self.capacity)
    }

    /// Builds a heap from `(value, priority)` pairs in O(n)
    ///
    /// # Errors
    /// - [`HeapError::InvalidBranchingFactor`] if the branching factor is out of range
    /// - [`HeapError::DuplicateIdentity`] if two values share an identity
    /// - [`HeapError::InvalidPriority`] if any priority is NaN
    pub fn build_from<V, I>(self, items: I) -> Result<DaryHeap<V, C, L>>
    where
        V: Identity,
        I: IntoIterator<Item = (V, f64)>,
    {
        validate_branching_factor(self.branching_factor)?;
        let mut entries: Vec<Entry<V>> = Vec::with_capacity(self.capacity);
        entries.extend(items.into_iter().map(|(value, priority)| Entry {
            identity: value.identity(),
            value,
            priority,
        }));
        let store = Store::from_entries(self.branching_factor, entries)?;
        Ok(DaryHeap::from_store(store))
    }
}
