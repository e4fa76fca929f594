use crate::yielder::CooperativeYield;
use std::iter::FusedIterator;
use std::slice;

/// In-order iterator over a chunked container.
///
/// Bounded by the number of elements still owed rather than by raw chunk
/// storage, so it stops after exactly `len` items.
pub struct Iter<'a, T> {
    chunks: slice::Iter<'a, Vec<T>>,
    current: slice::Iter<'a, T>,
    remaining: usize,
}

impl<'a, T> Iter<'a, T> {
    pub(crate) fn new(chunks: &'a [Vec<T>], len: usize) -> Self {
        Self {
            chunks: chunks.iter(),
            current: slice::Iter::default(),
            remaining: len,
        }
    }
}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Self {
            chunks: self.chunks.clone(),
            current: self.current.clone(),
            remaining: self.remaining,
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        loop {
            if self.remaining == 0 {
                return None;
            }
            if let Some(item) = self.current.next() {
                self.remaining -= 1;
                return Some(item);
            }
            let chunk = self.chunks.next()?;
            let emit = chunk.len().min(self.remaining);
            self.current = chunk[..emit].iter();
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> FusedIterator for Iter<'_, T> {}

/// [`Iter`] that hands control to a [`CooperativeYield`] after every
/// `every` elements. Produces exactly the same items.
pub struct YieldingIter<'a, T, Y> {
    inner: Iter<'a, T>,
    every: usize,
    since_yield: usize,
    yielder: Y,
}

impl<'a, T, Y: CooperativeYield> YieldingIter<'a, T, Y> {
    pub(crate) fn new(inner: Iter<'a, T>, every: usize, yielder: Y) -> Self {
        Self {
            inner,
            every: every.max(1),
            since_yield: 0,
            yielder,
        }
    }
}

impl<'a, T, Y: CooperativeYield> Iterator for YieldingIter<'a, T, Y> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        if self.since_yield >= self.every && self.inner.len() > 0 {
            self.yielder.yield_now();
            self.since_yield = 0;
        }
        let item = self.inner.next()?;
        self.since_yield += 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T, Y: CooperativeYield> ExactSizeIterator for YieldingIter<'_, T, Y> {}

impl<T, Y: CooperativeYield> FusedIterator for YieldingIter<'_, T, Y> {}

#[cfg(test)]
mod tests {
    use crate::chunked::ChunkedContainer;
    use std::cell::Cell;

    fn mixed(capacity: usize) -> ChunkedContainer<u32> {
        let mut container = ChunkedContainer::new(capacity);
        container.append_batch((0..5).collect(), None);
        for value in 5..9 {
            container.append_one(value);
        }
        container.append_batch((9..12).collect(), None);
        container
    }

    #[test]
    fn iteration_matches_indexing_for_any_capacity() {
        for capacity in [1, 3, 12, 50] {
            let container = mixed(capacity);
            let iterated: Vec<u32> = container.each().copied().collect();
            let indexed: Vec<u32> = (0..container.len())
                .map(|i| container[i])
                .collect();
            assert_eq!(iterated, (0..12).collect::<Vec<_>>(), "capacity {capacity}");
            assert_eq!(iterated, indexed);
        }
    }

    #[test]
    fn iteration_is_restartable_and_exact() {
        let container = mixed(4);
        let iter = container.each();
        assert_eq!(iter.len(), 12);

        let first: Vec<_> = container.each().take(3).collect();
        let again: Vec<_> = container.each().take(3).collect();
        assert_eq!(first, again);

        let mut iter = container.each();
        iter.by_ref().for_each(drop);
        assert_eq!(iter.next(), None);
    }

    #[test]
    fn yielding_iteration_yields_between_groups() {
        let container = mixed(5);
        let yields = Cell::new(0);

        let items: Vec<u32> = container
            .each_yielding(Some(4), || yields.set(yields.get() + 1))
            .copied()
            .collect();

        assert_eq!(items, (0..12).collect::<Vec<_>>());
        // after items 4 and 8; nothing is owed after item 12
        assert_eq!(yields.get(), 2);
    }

    #[test]
    fn yielding_interval_defaults_and_clamps() {
        let container = mixed(5);
        let yields = Cell::new(0);
        let count = container
            .each_yielding(Some(0), || yields.set(yields.get() + 1))
            .count();
        assert_eq!(count, 12);
        assert_eq!(yields.get(), 11);

        let yields = Cell::new(0);
        container
            .each_yielding(None, || yields.set(yields.get() + 1))
            .for_each(drop);
        assert_eq!(yields.get(), 0);
    }

    #[test]
    fn early_stop_needs_no_cleanup() {
        let container = mixed(2);
        let yields = Cell::new(0);
        let firsts: Vec<u32> = container
            .each_yielding(Some(1), || yields.set(yields.get() + 1))
            .take(2)
            .copied()
            .collect();
        assert_eq!(firsts, vec![0, 1]);
        assert_eq!(yields.get(), 1);
    }
}
