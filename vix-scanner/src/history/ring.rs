//! Fixed-capacity FIFO buffer.
//!
//! Pushing into a full buffer evicts the oldest entry, so `len()` never
//! exceeds the capacity given at construction.

use std::collections::VecDeque;

use serde::{Serialize, Serializer};

/// Capacity-capped sequence with oldest-first eviction.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundedBuffer<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T> BoundedBuffer<T> {
    /// Create an empty buffer.
    pub fn new(capacity: usize) -> Self {
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Build a buffer from stored items, keeping only the newest `capacity`.
    ///
    /// Returns the buffer and the number of entries dropped.
    pub fn from_newest<I>(capacity: usize, items: I) -> (Self, usize)
    where
        I: IntoIterator<Item = T>,
    {
        let mut buffer = Self::new(capacity);
        let mut dropped = 0;
        for item in items {
            if buffer.push(item).is_some() {
                dropped += 1;
            }
        }
        (buffer, dropped)
    }

    /// Append an item, returning the evicted oldest entry if the buffer was full.
    pub fn push(&mut self, item: T) -> Option<T> {
        if self.capacity == 0 {
            return Some(item);
        }
        let evicted = if self.items.len() >= self.capacity {
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

    /// Oldest entry.
    pub fn first(&self) -> Option<&T> {
        self.items.front()
    }

    /// Newest entry.
    pub fn last(&self) -> Option<&T> {
        self.items.back()
    }

    /// Iterate oldest to newest.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> + ExactSizeIterator {
        self.items.iter()
    }
}

impl<T: Clone> BoundedBuffer<T> {
    /// Contents oldest to newest.
    pub fn to_vec(&self) -> Vec<T> {
        self.items.iter().cloned().collect()
    }
}

impl<T: Serialize> Serialize for BoundedBuffer<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.items.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evicts_oldest() {
        let mut buffer = BoundedBuffer::new(3);
        assert_eq!(buffer.push(1), None);
        assert_eq!(buffer.push(2), None);
        assert_eq!(buffer.push(3), None);
        assert_eq!(buffer.push(4), Some(1));

        assert_eq!(buffer.to_vec(), vec![2, 3, 4]);
        assert_eq!(buffer.first(), Some(&2));
        assert_eq!(buffer.last(), Some(&4));
    }

    #[test]
    fn test_never_exceeds_capacity() {
        for capacity in [1usize, 3, 5, 7] {
            let mut buffer = BoundedBuffer::new(capacity);
            for i in 0..50 {
                buffer.push(i);
                assert!(buffer.len() <= capacity);
            }
            let expected: Vec<i32> = (50 - capacity as i32..50).collect();
            assert_eq!(buffer.to_vec(), expected);
        }
    }

    #[test]
    fn test_from_newest_truncates() {
        let (buffer, dropped) = BoundedBuffer::from_newest(3, vec![10, 20, 30, 40, 50]);
        assert_eq!(buffer.to_vec(), vec![30, 40, 50]);
        assert_eq!(dropped, 2);

        let (buffer, dropped) = BoundedBuffer::from_newest(5, vec![1, 2]);
        assert_eq!(buffer.to_vec(), vec![1, 2]);
        assert_eq!(dropped, 0);
    }

    #[test]
    fn test_zero_capacity_stays_empty() {
        let mut buffer = BoundedBuffer::new(0);
        assert_eq!(buffer.push(7), Some(7));
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_serializes_as_list() {
        let (buffer, _) = BoundedBuffer::from_newest(2, vec![55u8, 60, 65]);
        assert_eq!(serde_json::to_string(&buffer).unwrap(), "[60,65]");
    }
}
