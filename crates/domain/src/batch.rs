//! Fixed-size batching of ordered work items.
//!
//! [`BatchPartitioner::partition`] borrows the input list and yields
//! [`Batch`]es lazily. The iterator holds no state beyond a position in the
//! borrowed slice, so calling `partition` again (or cloning the iterator)
//! restarts the sequence.

use crate::BatchSize;

/// An ordered slice of the input list.
#[derive(Debug, PartialEq, Eq)]
pub struct Batch<'a, T> {
    start_index: usize,
    items: &'a [T],
}

impl<'a, T> Batch<'a, T> {
    /// Index of the first item of this batch in the original list.
    pub fn start_index(&self) -> usize {
        self.start_index
    }

    /// The items in this batch, in input order.
    pub fn items(&self) -> &'a [T] {
        self.items
    }

    /// Number of items in this batch. Never zero.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Always `false`; present for API symmetry with [`Batch::len`].
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T> Clone for Batch<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Batch<'_, T> {}

// ---------------------------------------------------------------------------

/// Splits work lists into batches of a configured size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BatchPartitioner {
    size: BatchSize,
}

impl BatchPartitioner {
    /// Creates a partitioner producing batches of at most `size` items.
    pub fn new(size: BatchSize) -> Self {
        Self { size }
    }

    /// The configured batch size.
    pub fn batch_size(&self) -> BatchSize {
        self.size
    }

    /// Number of batches `item_count` items split into: `ceil(item_count / size)`.
    pub fn batch_count(&self, item_count: usize) -> usize {
        item_count.div_ceil(self.size.get())
    }

    /// Lazily splits `items` into batches. An empty input yields no batches.
    pub fn partition<'a, T>(&self, items: &'a [T]) -> Batches<'a, T> {
        Batches {
            items,
            size: self.size.get(),
            next_start: 0,
        }
    }
}

// ---------------------------------------------------------------------------

/// Iterator over the batches of a borrowed list.
#[derive(Debug)]
pub struct Batches<'a, T> {
    items: &'a [T],
    size: usize,
    next_start: usize,
}

impl<T> Clone for Batches<'_, T> {
    fn clone(&self) -> Self {
        Self {
            items: self.items,
            size: self.size,
            next_start: self.next_start,
        }
    }
}

impl<'a, T> Iterator for Batches<'a, T> {
    type Item = Batch<'a, T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next_start >= self.items.len() {
            return None;
        }
        let start = self.next_start;
        let end = (start + self.size).min(self.items.len());
        self.next_start = end;
        Some(Batch {
            start_index: start,
            items: &self.items[start..end],
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.items.len() - self.next_start).div_ceil(self.size);
        (remaining, Some(remaining))
    }
}

impl<T> ExactSizeIterator for Batches<'_, T> {}

impl<T> std::iter::FusedIterator for Batches<'_, T> {}
