//! Comparator policies
//!
//! The ordering of a heap is chosen once, as a type parameter, and resolved at
//! compile time. A policy answers a single question: should an element with
//! priority `a` sit closer to the root than one with priority `b`?

/// Ordering predicate over `f64` priorities
///
/// `precedes(a, b)` must be a strict ordering: irreflexive and transitive on
/// non-NaN inputs. Ties never precede each other, so equal priorities do not
/// move during sifting.
pub trait Comparator {
    /// Short label used in log output
    const NAME: &'static str;

    /// Returns true if `a` must be closer to the root than `b`
    fn precedes(a: f64, b: f64) -> bool;
}

/// Max-heap policy: larger priorities are extracted first
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MaxFirst;

/// Min-heap policy: smaller priorities are extracted first
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MinFirst;

impl Comparator for MaxFirst {
    const NAME: &'static str = "max";

    #[inline]
    fn precedes(a: f64, b: f64) -> bool {
        a > b
    }
}

impl Comparator for MinFirst {
    const NAME: &'static str = "min";

    #[inline]
    fn precedes(a: f64, b: f64) -> bool {
        a < b
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_first() {
        assert!(MaxFirst::precedes(987.0, 490.0));
        assert!(!MaxFirst::precedes(-2.0, 2.0));
        assert!(!MaxFirst::precedes(1.0, 1.0));
    }

    #[test]
    fn test_min_first() {
        assert!(MinFirst::precedes(-2.0, 2.0));
        assert!(!MinFirst::precedes(987.0, 490.0));
        assert!(!MinFirst::precedes(1.0, 1.0));
    }

    #[test]
    fn test_infinities() {
        assert!(MaxFirst::precedes(f64::INFINITY, f64::MAX));
        assert!(MinFirst::precedes(f64::NEG_INFINITY, f64::MIN));
    }
}
