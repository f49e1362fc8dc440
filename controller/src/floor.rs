use log::debug;

use crate::constants::FLOOR_BIAS;

/// Discrete storey for a vertical position, counting from 1 at ground level.
///
/// `max(0, floor((y + 0.5) / floor_height) + 1)`. Positions far below ground clamp
/// to 0 rather than going negative.
pub fn floor_index(y: f32, floor_height: f32) -> u32 {
    let band = ((y + FLOOR_BIAS) / floor_height).floor() + 1.0;
    if band.is_nan() || band <= 0.0 {
        0
    } else {
        band as u32
    }
}

/// Edge-triggered floor detection.
#[derive(Clone, Debug)]
pub struct FloorTracker {
    floor_height: f32,
    current: u32,
}

impl FloorTracker {
    /// Seed the tracker at height `y`. Seeding never reports a change.
    pub fn new(floor_height: f32, y: f32) -> Self {
        Self {
            floor_height,
            current: floor_index(y, floor_height),
        }
    }

    #[inline]
    pub fn current(&self) -> u32 {
        self.current
    }

    #[inline]
    pub fn floor_height(&self) -> f32 {
        self.floor_height
    }

    /// Recompute the floor for `y`; returns the new floor only when it changed.
    pub fn update(&mut self, y: f32) -> Option<u32> {
        let floor = floor_index(y, self.floor_height);
        if floor == self.current {
            return None;
        }
        debug!("Floor changed: {} -> {}", self.current, floor);
        self.current = floor;
        Some(floor)
    }

    /// Re-seed after a teleport or building change, optionally with a new storey
    /// height. Reports the new floor if it differs from the previous one.
    pub fn reset(&mut self, floor_height: f32, y: f32) -> Option<u32> {
        self.floor_height = floor_height;
        self.update(y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn floor_bands_for_default_height() {
        assert_eq!(floor_index(0.0, 4.0), 1);
        assert_eq!(floor_index(3.4, 4.0), 1);
        assert_eq!(floor_index(3.5, 4.0), 2);
        assert_eq!(floor_index(4.0, 4.0), 2);
        assert_eq!(floor_index(7.1, 4.0), 2);
        assert_eq!(floor_index(7.6, 4.0), 3);
        assert_eq!(floor_index(25.6, 4.0), 7);
    }

    #[test]
    fn below_ground_clamps_to_zero() {
        assert_eq!(floor_index(-0.6, 4.0), 0);
        assert_eq!(floor_index(-100.0, 4.0), 0);
        assert_eq!(floor_index(f32::NAN, 4.0), 0);
    }

    #[test]
    fn custom_floor_height() {
        assert_eq!(floor_index(5.0, 5.0), 2);
        assert_eq!(floor_index(5.0, 6.0), 1);
    }

    #[test]
    fn tracker_is_edge_triggered() {
        let mut tracker = FloorTracker::new(4.0, 0.0);
        assert_eq!(tracker.current(), 1);

        // Walk up through one boundary in small steps.
        let mut events = Vec::new();
        let mut y = 0.0;
        while y < 6.0 {
            if let Some(floor) = tracker.update(y) {
                events.push(floor);
            }
            y += 0.05;
        }
        assert_eq!(events, vec![2]);

        // Staying on the floor emits nothing.
        assert_eq!(tracker.update(5.0), None);
        assert_eq!(tracker.update(1.0), Some(1));
    }

    #[test]
    fn reset_reports_only_real_changes() {
        let mut tracker = FloorTracker::new(4.0, 0.0);
        assert_eq!(tracker.reset(4.0, 0.2), None);
        assert_eq!(tracker.reset(4.0, 7.1), Some(2));
        assert_eq!(tracker.reset(3.0, 7.1), Some(3));
        assert_eq!(tracker.floor_height(), 3.0);
    }
}
