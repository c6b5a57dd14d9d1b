//! Pluggable concurrency guards
//!
//! A heap keeps its element store and identity index in a single core value and
//! wraps that value in exactly one guard, so the two structures are always
//! mutated together. The guard is chosen by a [`Locking`] policy type parameter:
//!
//! - [`Synchronized`]: `parking_lot::RwLock`; shared reads, exclusive writes.
//!   The heap is `Sync` and can be shared across threads behind an `Arc`.
//! - [`Unsynchronized`]: `RefCell`; no locking cost. The heap is `!Sync`, so
//!   the compiler refuses to share it between threads.
//!
//! # Re-entrancy
//!
//! Closures passed to [`Guard::read`] and [`Guard::write`] run while the guard
//! is held. Calling back into the same heap from inside such a closure
//! deadlocks under `Synchronized` and panics under `Unsynchronized`.

use parking_lot::RwLock;
use std::cell::RefCell;
use std::fmt;

/// Interior-mutability wrapper with scoped read and write access
pub trait Guard<T> {
    /// Wraps a value
    fn new(value: T) -> Self;

    /// Runs `f` with shared access to the value
    fn read<R>(&self, f: impl FnOnce(&T) -> R) -> R;

    /// Runs `f` with exclusive access to the value
    fn write<R>(&self, f: impl FnOnce(&mut T) -> R) -> R;

    /// Returns exclusive access without taking the guard
    ///
    /// Statically safe because `&mut self` already proves exclusivity.
    fn get_mut(&mut self) -> &mut T;

    /// Unwraps the value
    fn into_inner(self) -> T;
}

/// Selects the guard used by a heap
pub trait Locking {
    /// Short label used in log output
    const NAME: &'static str;

    /// The guard wrapping a value of type `T`
    type Cell<T>: Guard<T>;
}

/// Reader/writer locking (the default)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Synchronized;

/// No locking; the heap is confined to one thread
///
/// The core sits in a `RefCell`, so each access still pays a borrow-flag
/// check. A re-entrant call from a `peek_with` callback panics instead of
/// corrupting the heap.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Unsynchronized;

impl Locking for Synchronized {
    const NAME: &'static str = "rwlock";
    type Cell<T> = RwGuard<T>;
}

impl Locking for Unsynchronized {
    const NAME: &'static str = "none";
    type Cell<T> = LocalGuard<T>;
}

/// Guard backed by `parking_lot::RwLock`
pub struct RwGuard<T> {
    lock: RwLock<T>,
}

impl<T> Guard<T> for RwGuard<T> {
    fn new(value: T) -> Self {
        Self {
            lock: RwLock::new(value),
        }
    }

    #[inline]
    fn read<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.lock.read())
    }

    #[inline]
    fn write<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        f(&mut self.lock.write())
    }

    #[inline]
    fn get_mut(&mut self) -> &mut T {
        self.lock.get_mut()
    }

    fn into_inner(self) -> T {
        self.lock.into_inner()
    }
}

impl<T: fmt::Debug> fmt::Debug for RwGuard<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RwGuard").field("lock", &self.lock).finish()
    }
}

/// Guard backed by `RefCell`
pub struct LocalGuard<T> {
    cell: RefCell<T>,
}

impl<T> Guard<T> for LocalGuard<T> {
    fn new(value: T) -> Self {
        Self {
            cell: RefCell::new(value),
        }
    }

    #[inline]
    fn read<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.cell.borrow())
    }

    #[inline]
    fn write<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        f(&mut self.cell.borrow_mut())
    }

    #[inline]
    fn get_mut(&mut self) -> &mut T {
        self.cell.get_mut()
    }

    fn into_inner(self) -> T {
        self.cell.into_inner()
    }
}

impl<T: fmt::Debug> fmt::Debug for LocalGuard<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalGuard").field("cell", &self.cell).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exercise<L: Locking>() {
        let mut guard = <L::Cell<Vec<i32>> as Guard<Vec<i32>>>::new(vec![1, 2]);
        guard.write(|v| v.push(3));
        assert_eq!(guard.read(|v| v.len()), 3);
        guard.get_mut().push(4);
        assert_eq!(guard.into_inner(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_synchronized_guard() {
        exercise::<Synchronized>();
    }

    #[test]
    fn test_unsynchronized_guard() {
        exercise::<Unsynchronized>();
    }

    #[test]
    fn test_rw_guard_allows_concurrent_readers() {
        let guard = RwGuard::new(5);
        guard.read(|outer| {
            // A second reader does not block while the first is active
            let inner = guard.read(|v| *v);
            assert_eq!(*outer, inner);
        });
    }
}
