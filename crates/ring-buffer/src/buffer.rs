//! Ring Buffer Implementation

use serde::ser::{Serialize, SerializeSeq, Serializer};

/// Bounded FIFO with oldest-first eviction
#[derive(Debug, Clone)]
pub struct RingBuffer<T> {
    /// Storage, grows up to `capacity` then is overwritten in place
    storage: Vec<T>,
    /// Capacity of the buffer
    capacity: usize,
    /// Next write slot once the buffer has filled up
    head: usize,
}

impl<T> RingBuffer<T> {
    /// Create a new ring buffer. A zero capacity is raised to 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            storage: Vec::with_capacity(capacity),
            capacity,
            head: 0,
        }
    }

    /// Push an item, returning the evicted oldest item if the buffer was full
    pub fn push(&mut self, item: T) -> Option<T> {
        let evicted = if self.storage.len() < self.capacity {
            self.storage.push(item);
            None
        } else {
            Some(std::mem::replace(&mut self.storage[self.head], item))
        };
        self.head = (self.head + 1) % self.capacity;
        evicted
    }

    /// Number of items currently held
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.storage.len() == self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Iterate oldest to newest
    pub fn iter(&self) -> Iter<'_, T> {
        // Before the first wrap `head == len`, so `older` is empty.
        let (newer, older) = self.storage.split_at(self.head.min(self.storage.len()));
        Iter {
            inner: older.iter().chain(newer.iter()),
        }
    }

    /// Most recently pushed item
    pub fn latest(&self) -> Option<&T> {
        if self.storage.is_empty() {
            return None;
        }
        let idx = (self.head + self.capacity - 1) % self.capacity;
        self.storage.get(idx)
    }

    /// Oldest item still held
    pub fn oldest(&self) -> Option<&T> {
        self.iter().next()
    }

    /// Drop all items, keeping the capacity
    pub fn clear(&mut self) {
        self.storage.clear();
        self.head = 0;
    }
}

impl<T: Clone> RingBuffer<T> {
    /// Copy of the contents, oldest first
    pub fn to_vec(&self) -> Vec<T> {
        self.iter().cloned().collect()
    }
}

impl<'a, T> IntoIterator for &'a RingBuffer<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Oldest-to-newest iterator over a [`RingBuffer`]
pub struct Iter<'a, T> {
    inner: std::iter::Chain<std::slice::Iter<'a, T>, std::slice::Iter<'a, T>>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> DoubleEndedIterator for Iter<'_, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back()
    }
}

/// Serializes as a sequence, oldest first
impl<T: Serialize> Serialize for RingBuffer<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.len()))?;
        for item in self.iter() {
            seq.serialize_element(item)?;
        }
        seq.end()
    }
}
