use crate::types::Point3;
use crate::window::{BoundedWindow, StrideRingBuffer};

/// Stride estimate from the latest step of each foot, averaged over a ring
/// buffer of recent samples.
#[derive(Debug, Clone)]
pub struct StrideTracker {
    left: BoundedWindow<Point3>,
    right: BoundedWindow<Point3>,
    strides: StrideRingBuffer,
}

impl StrideTracker {
    pub fn new(capacity: usize) -> Self {
        Self {
            left: BoundedWindow::new(capacity),
            right: BoundedWindow::new(capacity),
            strides: StrideRingBuffer::new(capacity),
        }
    }

    /// Feed whichever feet are tracked this frame.
    ///
    /// Returns the stride sample written, if both feet have at least two
    /// positions.
    pub fn update(&mut self, left: Option<Point3>, right: Option<Point3>) -> Option<f64> {
        if let Some(p) = left {
            self.left.push(p);
        }
        if let Some(p) = right {
            self.right.push(p);
        }

        let (l_prev, l_last) = self.left.last_pair()?;
        let (r_prev, r_last) = self.right.last_pair()?;
        let stride = (l_prev.distance(l_last) + r_prev.distance(r_last)) / 2.0;
        self.strides.push(stride);
        Some(stride)
    }

    pub fn average(&self) -> Option<f64> {
        self.strides.average()
    }

    pub fn sample_count(&self) -> usize {
        self.strides.len()
    }

    pub fn left_window(&self) -> &BoundedWindow<Point3> {
        &self.left
    }

    pub fn right_window(&self) -> &BoundedWindow<Point3> {
        &self.right
    }
}
