//! Fixed-capacity rolling window.

use std::collections::VecDeque;

/// A FIFO buffer that keeps only the most recent `capacity` items.
///
/// Pushing into a full window evicts the oldest item first, so the window
/// always holds the last `capacity` pushes in arrival order.
#[derive(Debug, Clone)]
pub struct RollingWindow<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T> RollingWindow<T> {
    /// Create an empty window. A capacity of zero retains nothing.
    pub fn new(capacity: usize) -> Self {
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append an item, evicting the oldest one when the window is full.
    pub fn push(&mut self, item: T) {
        if self.capacity == 0 {
            return;
        }
        if self.items.len() == self.capacity {
            self.items.pop_front();
        }
        self.items.push_back(item);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn latest(&self) -> Option<&T> {
        self.items.back()
    }
}

impl<T: Clone> RollingWindow<T> {
    /// Copy the window contents, oldest first.
    pub fn to_vec(&self) -> Vec<T> {
        self.items.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_below_capacity_keeps_everything() {
        let mut window = RollingWindow::new(4);
        window.push(1);
        window.push(2);
        assert_eq!(window.to_vec(), vec![1, 2]);
        assert_eq!(window.latest(), Some(&2));
    }

    #[test]
    fn test_overflow_keeps_most_recent_in_order() {
        let capacity = 5;
        let mut window = RollingWindow::new(capacity);
        for i in 0..23 {
            window.push(i);
            assert!(window.len() <= capacity);
        }
        assert_eq!(window.to_vec(), vec![18, 19, 20, 21, 22]);
    }

    #[test]
    fn test_every_prefix_holds_last_c_items() {
        let capacity = 7;
        let mut window = RollingWindow::new(capacity);
        for n in 1..=40usize {
            window.push(n);
            let start = n.saturating_sub(capacity) + 1;
            let expected: Vec<usize> = (start..=n).collect();
            assert_eq!(window.to_vec(), expected);
        }
    }

    #[test]
    fn test_zero_capacity_retains_nothing() {
        let mut window = RollingWindow::new(0);
        window.push("a");
        assert!(window.is_empty());
        assert_eq!(window.capacity(), 0);
    }
}
