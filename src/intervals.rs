//! Interval helpers for containment-based deduplication.
//!
//! Repeat and palindrome discovery both follow the same rule: a longer match
//! wins over shorter matches nested inside it. The structures here keep that
//! rule in one place.

/// Inclusive interval, 1-based by convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end);
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start + 1
    }

    /// True if `other` lies entirely inside `self`.
    pub fn contains(&self, other: &Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

impl From<(usize, usize)> for Span {
    fn from((start, end): (usize, usize)) -> Self {
        Span::new(start, end)
    }
}

/// Checks that every span of `inner` lies inside some span of `outer`.
///
/// `outer` must be sorted by start and pairwise disjoint, which makes the only
/// candidate for each inner span the last outer span starting at or before it.
pub fn all_nested(inner: &[Span], outer: &[Span]) -> bool {
    inner.iter().all(|span| {
        let idx = outer.partition_point(|o| o.start <= span.start);
        idx > 0 && outer[idx - 1].contains(span)
    })
}

/// A set of spans in which no span is nested inside another.
///
/// Entries are kept sorted by start. Because nothing is nested, ends are
/// sorted too, so both containment directions resolve with a binary search.
#[derive(Debug, Clone)]
pub struct NestedSpans<T> {
    entries: Vec<(Span, T)>,
}

impl<T> Default for NestedSpans<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<T> NestedSpans<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns true if some stored span contains `span`.
    pub fn is_covered(&self, span: &Span) -> bool {
        let idx = self.entries.partition_point(|(s, _)| s.start <= span.start);
        idx > 0 && self.entries[idx - 1].0.contains(span)
    }

    /// Inserts `span` unless it is covered by a stored span.
    ///
    /// Stored spans nested inside the new one are dropped. Returns whether the
    /// span was inserted.
    pub fn insert(&mut self, span: Span, value: T) -> bool {
        if self.is_covered(&span) {
            return false;
        }
        let first = self.entries.partition_point(|(s, _)| s.start < span.start);
        let last = first
            + self.entries[first..]
                .iter()
                .take_while(|(s, _)| s.end <= span.end)
                .count();
        self.entries.splice(first..last, std::iter::once((span, value)));
        true
    }

    /// Consumes the set, yielding values in start order.
    pub fn into_values(self) -> impl Iterator<Item = T> {
        self.entries.into_iter().map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Span, &T)> {
        self.entries.iter().map(|(s, v)| (s, v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spans(pairs: &[(usize, usize)]) -> Vec<Span> {
        pairs.iter().map(|&p| Span::from(p)).collect()
    }

    #[test]
    fn test_span_contains() {
        let outer = Span::new(3, 10);
        assert!(outer.contains(&Span::new(3, 10)));
        assert!(outer.contains(&Span::new(4, 9)));
        assert!(!outer.contains(&Span::new(2, 5)));
        assert!(!outer.contains(&Span::new(9, 11)));
        assert_eq!(outer.len(), 8);
    }

    #[test]
    fn test_all_nested() {
        let outer = spans(&[(1, 10), (21, 30)]);
        assert!(all_nested(&spans(&[(1, 4), (25, 30)]), &outer));
        assert!(!all_nested(&spans(&[(1, 4), (11, 14)]), &outer));
        assert!(!all_nested(&spans(&[(8, 12)]), &outer));
        assert!(all_nested(&[], &outer));
        assert!(!all_nested(&spans(&[(1, 2)]), &[]));
    }

    #[test]
    fn test_insert_rejects_nested() {
        let mut set = NestedSpans::new();
        assert!(set.insert(Span::new(1, 10), "long"));
        assert!(!set.insert(Span::new(2, 7), "inner"));
        assert!(!set.insert(Span::new(1, 10), "same"));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_insert_removes_nested() {
        let mut set = NestedSpans::new();
        set.insert(Span::new(2, 7), "a");
        set.insert(Span::new(5, 10), "b");
        set.insert(Span::new(20, 25), "c");
        assert!(set.insert(Span::new(1, 12), "wide"));
        let values: Vec<_> = set.into_values().collect();
        assert_eq!(values, vec!["wide", "c"]);
    }

    #[test]
    fn test_overlapping_spans_coexist() {
        let mut set = NestedSpans::new();
        assert!(set.insert(Span::new(1, 6), 1));
        assert!(set.insert(Span::new(4, 9), 2));
        assert!(set.insert(Span::new(2, 8), 3));
        let starts: Vec<_> = set.iter().map(|(s, _)| s.start).collect();
        assert_eq!(starts, vec![1, 2, 4]);
    }
}
