use crate::types::Point3;
use crate::window::BoundedWindow;

/// Arc length of the trailing wrist path, with a per-interval maximum.
#[derive(Debug, Clone)]
pub struct SwingArcTracker {
    window: BoundedWindow<Point3>,
    current: f64,
    interval_max: f64,
}

impl SwingArcTracker {
    pub fn new(capacity: usize) -> Self {
        Self {
            window: BoundedWindow::new(capacity),
            current: 0.0,
            interval_max: 0.0,
        }
    }

    /// Append a tracked wrist position and return the window's arc length.
    pub fn update(&mut self, wrist: Point3) -> f64 {
        self.window.push(wrist);
        self.current = self.window.arc_length();
        if self.current > self.interval_max {
            self.interval_max = self.current;
        }
        self.current
    }

    /// Return the interval maximum and reset it to zero.
    pub fn consume_interval_max(&mut self) -> f64 {
        std::mem::take(&mut self.interval_max)
    }

    pub fn interval_max(&self) -> f64 {
        self.interval_max
    }

    pub fn current_arc_length(&self) -> f64 {
        self.current
    }

    pub fn window(&self) -> &BoundedWindow<Point3> {
        &self.window
    }
}
