//! Fixed-capacity FIFO ring buffer
//!
//! Shared by both stores. When the buffer is full, the oldest element is
//! evicted to make room. Not synchronized on its own; each store wraps
//! it in a mutex together with whatever else must change atomically.

use std::collections::VecDeque;
use std::num::NonZeroUsize;

#[derive(Debug, Clone)]
pub struct Ring<T> {
    items: VecDeque<T>,
    capacity: NonZeroUsize,
}

impl<T> Ring<T> {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            items: VecDeque::with_capacity(capacity.get()),
            capacity,
        }
    }

    /// Append an item, returning the evicted one if the ring was full
    pub fn push(&mut self, item: T) -> Option<T> {
        let evicted = if self.items.len() == self.capacity.get() {
            self.items.pop_front()
        } else {
            None
        };
        self.items.push_back(item);
        evicted
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }

    pub fn back(&self) -> Option<&T> {
        self.items.back()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> {
        self.items.iter()
    }
}

impl<T: Clone> Ring<T> {
    /// The `limit` most recent items accepted by `keep`, oldest first.
    ///
    /// Filtering happens before the limit is applied, so a filter never
    /// shrinks the window below `limit` while matching items remain.
    pub fn tail_where<F>(&self, limit: Option<usize>, mut keep: F) -> Vec<T>
    where
        F: FnMut(&T) -> bool,
    {
        let limit = limit.unwrap_or(usize::MAX);
        let mut selected: Vec<T> = self
            .items
            .iter()
            .rev()
            .filter(|item| keep(*item))
            .take(limit)
            .cloned()
            .collect();
        selected.reverse();
        selected
    }
}
