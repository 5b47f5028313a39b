// Bounded rolling history
use super::telemetry::{LogEntry, MetricSample};
use std::collections::VecDeque;

/// Insertion-ordered buffer that evicts its oldest entries past `capacity`.
#[derive(Debug, Clone)]
pub struct BoundedHistory<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T> BoundedHistory<T> {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, item: T) {
        while self.items.len() >= self.capacity {
            self.items.pop_front();
        }
        self.items.push_back(item);
    }

    pub fn latest(&self) -> Option<&T> {
        self.items.back()
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
}

impl<T: Clone> BoundedHistory<T> {
    pub fn to_vec(&self) -> Vec<T> {
        self.items.iter().cloned().collect()
    }
}

/// Rolling window kept for one service.
#[derive(Debug, Clone)]
pub struct ServiceHistory {
    pub metrics: BoundedHistory<MetricSample>,
    pub logs: BoundedHistory<LogEntry>,
}

impl ServiceHistory {
    pub fn new(metric_capacity: usize, log_capacity: usize) -> Self {
        Self {
            metrics: BoundedHistory::new(metric_capacity),
            logs: BoundedHistory::new(log_capacity),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evicts_oldest_first() {
        let mut history = BoundedHistory::new(5);
        let mut pushed = Vec::new();
        for i in 0..12 {
            history.push(i);
            pushed.push(i);
            assert!(history.len() <= 5);
            let expected: Vec<_> = pushed[pushed.len().saturating_sub(5)..].to_vec();
            assert_eq!(history.to_vec(), expected);
        }
        assert_eq!(history.latest(), Some(&11));
    }

    #[test]
    fn test_zero_capacity_keeps_one() {
        let mut history = BoundedHistory::new(0);
        history.push("a");
        history.push("b");
        assert_eq!(history.capacity(), 1);
        assert_eq!(history.to_vec(), vec!["b"]);
    }
}
