use crate::types::Point3;
use std::collections::VecDeque;

/// Number of trailing positions and stride samples kept by default.
pub const MAX_POSITIONS: usize = 30;

/// Insertion-ordered window holding at most `capacity` recent items.
/// The oldest item is evicted first once the window is full.
#[derive(Debug, Clone)]
pub struct BoundedWindow<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T> BoundedWindow<T> {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, item: T) {
        self.items.push_back(item);
        if self.items.len() > self.capacity {
            self.items.pop_front();
        }
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

    /// Oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    /// The two most recent items as (previous, latest).
    pub fn last_pair(&self) -> Option<(&T, &T)> {
        let n = self.items.len();
        if n < 2 {
            return None;
        }
        Some((&self.items[n - 2], &self.items[n - 1]))
    }
}

impl BoundedWindow<Point3> {
    /// Polyline length through the window, oldest to newest.
    pub fn arc_length(&self) -> f64 {
        arc_length(self.items.iter())
    }
}

/// Sum of distances between consecutive points.
pub fn arc_length<'a>(points: impl IntoIterator<Item = &'a Point3>) -> f64 {
    let mut points = points.into_iter();
    let Some(mut prev) = points.next() else {
        return 0.0;
    };
    let mut length = 0.0;
    for p in points {
        length += prev.distance(p);
        prev = p;
    }
    length
}

/// Fixed-capacity circular buffer of stride lengths.
#[derive(Debug, Clone)]
pub struct StrideRingBuffer {
    slots: Vec<f64>,
    next: usize,
    count: usize,
}

impl StrideRingBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![0.0; capacity.max(1)],
            next: 0,
            count: 0,
        }
    }

    /// Writes `stride` into the next slot, overwriting the oldest once full.
    pub fn push(&mut self, stride: f64) {
        self.slots[self.next] = stride;
        self.next = (self.next + 1) % self.slots.len();
        if self.count < self.slots.len() {
            self.count += 1;
        }
    }

    /// Number of valid samples (at most the capacity).
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Mean over the valid samples, `None` before the first write.
    pub fn average(&self) -> Option<f64> {
        if self.count == 0 {
            return None;
        }
        // Slots fill from index 0, so the first `count` are the valid ones.
        let total: f64 = self.slots[..self.count].iter().sum();
        Some(total / self.count as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_keeps_last_inputs_in_order() {
        let mut window = BoundedWindow::new(MAX_POSITIONS);
        for i in 0..75 {
            window.push(i);
            assert!(window.len() <= MAX_POSITIONS);
        }
        let kept: Vec<i32> = window.iter().copied().collect();
        let expected: Vec<i32> = (45..75).collect();
        assert_eq!(kept, expected);
    }

    #[test]
    fn test_window_last_pair() {
        let mut window = BoundedWindow::new(3);
        window.push(1);
        assert!(window.last_pair().is_none());
        window.push(2);
        window.push(3);
        window.push(4);
        assert_eq!(window.last_pair(), Some((&3, &4)));
    }

    #[test]
    fn test_arc_length_right_angle_path() {
        let mut window = BoundedWindow::new(MAX_POSITIONS);
        window.push(Point3::new(0.0, 0.0, 0.0));
        window.push(Point3::new(3.0, 0.0, 0.0));
        window.push(Point3::new(3.0, 4.0, 0.0));
        // Path length, not the 5.0 endpoint displacement.
        assert!((window.arc_length() - 7.0).abs() < 1e-12);
    }

    #[test]
    fn test_arc_length_degenerate_windows() {
        let empty: BoundedWindow<Point3> = BoundedWindow::new(4);
        assert_eq!(empty.arc_length(), 0.0);

        let mut single = BoundedWindow::new(4);
        single.push(Point3::new(1.0, 1.0, 1.0));
        assert_eq!(single.arc_length(), 0.0);
    }

    #[test]
    fn test_ring_buffer_empty_average() {
        let buffer = StrideRingBuffer::new(MAX_POSITIONS);
        assert!(buffer.is_empty());
        assert_eq!(buffer.average(), None);
    }

    #[test]
    fn test_ring_buffer_partial_average() {
        let mut buffer = StrideRingBuffer::new(MAX_POSITIONS);
        buffer.push(1.0);
        buffer.push(2.0);
        buffer.push(6.0);
        assert_eq!(buffer.len(), 3);
        assert!((buffer.average().unwrap() - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_ring_buffer_overwrites_oldest() {
        let mut buffer = StrideRingBuffer::new(MAX_POSITIONS);
        // First sample is an outlier that the 31st write must evict.
        buffer.push(100.0);
        for _ in 1..MAX_POSITIONS {
            buffer.push(1.0);
        }
        let full = buffer.average().unwrap();
        assert!((full - (100.0 + 29.0) / 30.0).abs() < 1e-12);

        buffer.push(1.0);
        assert_eq!(buffer.len(), MAX_POSITIONS);
        assert!((buffer.average().unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_ring_buffer_matches_last_samples_mean() {
        let mut buffer = StrideRingBuffer::new(MAX_POSITIONS);
        let samples: Vec<f64> = (0..47).map(|i| i as f64 * 0.25).collect();
        for &s in &samples {
            buffer.push(s);
        }
        let tail = &samples[samples.len() - MAX_POSITIONS..];
        let expected = tail.iter().sum::<f64>() / MAX_POSITIONS as f64;
        assert!((buffer.average().unwrap() - expected).abs() < 1e-9);
    }
}
