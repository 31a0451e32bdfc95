//! Frame-over-frame jitter filters for live gaze and fingertip positions.

use std::collections::VecDeque;

use crate::models::landmarks::Point2;

/// Exponential moving average over a 2D position.
///
/// The filter holds its position between updates, so a caller that skips
/// `update` on dropout frames gets "hold last known position" for free.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmaSmoother {
    alpha: f64,
    x: f64,
    y: f64,
}

impl EmaSmoother {
    /// `alpha` is the weight of the newest target, forced into (0, 1].
    pub fn new(alpha: f64, initial: (f64, f64)) -> Self {
        let alpha = if alpha.is_finite() {
            alpha.clamp(f64::EPSILON, 1.0)
        } else {
            1.0
        };
        Self {
            alpha,
            x: initial.0,
            y: initial.1,
        }
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn update(&mut self, target: (f64, f64)) -> (f64, f64) {
        self.x = self.alpha * target.0 + (1.0 - self.alpha) * self.x;
        self.y = self.alpha * target.1 + (1.0 - self.alpha) * self.y;
        (self.x, self.y)
    }

    pub fn position(&self) -> (f64, f64) {
        (self.x, self.y)
    }

    pub fn reset(&mut self, position: (f64, f64)) {
        self.x = position.0;
        self.y = position.1;
    }
}

/// Sliding mean of the most recent positions.
///
/// Until `window` positions have been seen the latest raw position is
/// returned unchanged.
#[derive(Debug, Clone)]
pub struct MovingAverage {
    history: VecDeque<Point2>,
    capacity: usize,
    window: usize,
}

impl MovingAverage {
    pub fn new(window: usize, capacity: usize) -> Self {
        let window = window.max(1);
        let capacity = capacity.max(window);
        Self {
            history: VecDeque::with_capacity(capacity),
            capacity,
            window,
        }
    }

    pub fn push(&mut self, point: Point2) -> Point2 {
        self.history.push_back(point);
        while self.history.len() > self.capacity {
            self.history.pop_front();
        }

        if self.history.len() < self.window {
            return point;
        }

        let recent = self.history.iter().rev().take(self.window);
        let (sum_x, sum_y) = recent.fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
        Point2::new(sum_x / self.window as f64, sum_y / self.window as f64)
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn clear(&mut self) {
        self.history.clear();
    }
}

impl Default for MovingAverage {
    fn default() -> Self {
        Self::new(3, 5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_step_matches_ema_formula() {
        let mut ema = EmaSmoother::new(0.15, (800.0, 450.0));
        let (x, y) = ema.update((1600.0, 0.0));
        assert!((x - 920.0).abs() < 1e-9);
        assert!((y - 382.5).abs() < 1e-9);
    }

    #[test]
    fn constant_target_converges_geometrically() {
        let alpha = 0.15;
        let initial = (800.0, 450.0);
        let target = (100.0, 700.0);
        let mut ema = EmaSmoother::new(alpha, initial);

        for n in 1..=40 {
            let (x, y) = ema.update(target);
            let decay = (1.0 - alpha).powi(n);
            let expected_x = (initial.0 - target.0).abs() * decay;
            let expected_y = (initial.1 - target.1).abs() * decay;
            assert!(((x - target.0).abs() - expected_x).abs() < 1e-9);
            assert!(((y - target.1).abs() - expected_y).abs() < 1e-9);
        }
    }

    #[test]
    fn alpha_one_jumps_straight_to_target() {
        let mut ema = EmaSmoother::new(1.0, (0.0, 0.0));
        assert_eq!(ema.update((12.0, 34.0)), (12.0, 34.0));
    }

    #[test]
    fn alpha_out_of_range_is_clamped() {
        assert_eq!(EmaSmoother::new(3.0, (0.0, 0.0)).alpha(), 1.0);
        assert!(EmaSmoother::new(0.0, (0.0, 0.0)).alpha() > 0.0);
        assert_eq!(EmaSmoother::new(f64::NAN, (0.0, 0.0)).alpha(), 1.0);
    }

    #[test]
    fn moving_average_returns_raw_until_window_fills() {
        let mut filter = MovingAverage::default();
        assert_eq!(filter.push(Point2::new(10.0, 0.0)), Point2::new(10.0, 0.0));
        assert_eq!(filter.push(Point2::new(20.0, 0.0)), Point2::new(20.0, 0.0));

        let averaged = filter.push(Point2::new(60.0, 3.0));
        assert!((averaged.x - 30.0).abs() < 1e-9);
        assert!((averaged.y - 1.0).abs() < 1e-9);
    }

    #[test]
    fn moving_average_keeps_bounded_history() {
        let mut filter = MovingAverage::new(3, 5);
        for i in 0..20 {
            filter.push(Point2::new(i as f64, 0.0));
        }
        assert_eq!(filter.len(), 5);

        let averaged = filter.push(Point2::new(20.0, 0.0));
        assert!((averaged.x - 19.0).abs() < 1e-9);
    }
}
