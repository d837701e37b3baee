// zoom_pan.rs — 缩放级别与平移偏移
//
// 约定：level 越小越放大，越大越缩小；有效范围 [max, min]。
// 缩放到最远 (min) 时视图强制居中 (offset 归零)。

use crate::config::{PanConfig, ZoomConfig};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomState {
    pub level: f32,
    /// Furthest zoom-out.
    pub min: f32,
    /// Closest zoom-in, numerically smaller than `min`.
    pub max: f32,
}

impl ZoomState {
    pub fn contains(&self, level: f32) -> bool {
        level >= self.max && level <= self.min
    }

    pub fn is_fully_out(&self) -> bool {
        self.level == self.min
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PanOffset {
    pub x: f32,
    pub y: f32,
}

impl PanOffset {
    pub const ZERO: PanOffset = PanOffset { x: 0.0, y: 0.0 };
}

#[derive(Debug, Clone)]
pub struct ZoomPanController {
    zoom: ZoomState,
    initial_level: f32,
    offset: PanOffset,
    pan: PanConfig,
}

impl ZoomPanController {
    pub fn new(zoom: &ZoomConfig, pan: &PanConfig) -> Self {
        // an inverted range is taken as the same range the right way round
        let max = zoom.max.min(zoom.min);
        let min = zoom.max.max(zoom.min);
        let level = zoom.initial.clamp(max, min);
        Self {
            zoom: ZoomState { level, min, max },
            initial_level: level,
            offset: PanOffset::ZERO,
            pan: *pan,
        }
    }

    pub fn zoom_state(&self) -> ZoomState {
        self.zoom
    }

    pub fn offset(&self) -> PanOffset {
        self.offset
    }

    /// Drag multiplier; panning is faster when zoomed in close.
    pub fn pan_speed(&self) -> f32 {
        if self.zoom.level < self.pan.zoomed_in_threshold {
            self.pan.zoomed_in_speed
        } else {
            self.pan.base_speed
        }
    }

    pub fn drag(&mut self, movement_x: f32, movement_y: f32) -> PanOffset {
        let speed = self.pan_speed();
        self.offset.x += movement_x * speed;
        self.offset.y += movement_y * speed;
        self.offset
    }

    pub fn zoom(&mut self, delta: f32) -> ZoomState {
        let was_fully_out = self.zoom.is_fully_out();
        let candidate = self.zoom.level + delta;

        if self.zoom.contains(candidate) {
            self.zoom.level = candidate;
            if candidate == self.zoom.min {
                self.offset = PanOffset::ZERO;
            }
        } else if candidate < self.zoom.max {
            log::debug!("zoom {candidate} clamped to max {}", self.zoom.max);
            self.zoom.level = self.zoom.max;
        } else {
            // also taken for NaN deltas
            log::debug!("zoom {candidate} clamped to min {}", self.zoom.min);
            self.zoom.level = self.zoom.min;
            self.offset = PanOffset::ZERO;
        }

        if was_fully_out {
            self.offset = PanOffset::ZERO;
        }

        self.zoom
    }

    /// Back to the configured initial zoom, centred.
    pub fn reset(&mut self) {
        self.zoom.level = self.initial_level;
        self.offset = PanOffset::ZERO;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn controller(level: f32) -> ZoomPanController {
        ZoomPanController::new(
            &ZoomConfig {
                initial: level,
                min: 15.0,
                max: 1.0,
            },
            &PanConfig::default(),
        )
    }

    #[test]
    fn inverted_range_is_reordered() {
        let c = ZoomPanController::new(
            &ZoomConfig {
                initial: 5.0,
                min: 1.0,
                max: 15.0,
            },
            &PanConfig::default(),
        );
        let z = c.zoom_state();
        assert_eq!((z.max, z.min, z.level), (1.0, 15.0, 5.0));
        assert!(z.contains(z.level));
    }

    #[test]
    fn zoom_in_past_max_clamps_and_keeps_offset() {
        let mut c = controller(5.0);
        c.drag(10.0, -4.0);
        let before = c.offset();

        let z = c.zoom(-6.0);
        assert_eq!(z.level, 1.0);
        assert_eq!(c.offset(), before);
    }

    #[test]
    fn zoom_out_past_min_clamps_and_recentres() {
        let mut c = controller(14.0);
        c.drag(3.0, 3.0);

        let z = c.zoom(3.0);
        assert_eq!(z.level, 15.0);
        assert_eq!(c.offset(), PanOffset::ZERO);
    }

    #[test]
    fn landing_exactly_on_min_recentres() {
        let mut c = controller(13.0);
        c.drag(1.0, 1.0);
        c.zoom(2.0);
        assert_eq!(c.zoom_state().level, 15.0);
        assert_eq!(c.offset(), PanOffset::ZERO);
    }

    #[test]
    fn leaving_min_still_recentres_once() {
        let mut c = controller(15.0);
        c.drag(8.0, 2.0);
        let z = c.zoom(-2.0);
        assert_eq!(z.level, 13.0);
        assert_eq!(c.offset(), PanOffset::ZERO);

        c.drag(1.0, 0.0);
        c.zoom(-1.0);
        assert_ne!(c.offset(), PanOffset::ZERO);
    }

    #[test]
    fn in_range_zoom_keeps_offset() {
        let mut c = controller(10.0);
        c.drag(2.0, 2.0);
        let before = c.offset();
        assert_eq!(c.zoom(-1.5).level, 8.5);
        assert_eq!(c.offset(), before);
    }

    #[test]
    fn drag_is_faster_when_zoomed_in() {
        let mut c = controller(3.0);
        let offset = c.drag(4.0, 0.0);
        assert_eq!(offset.x, 12.0);
        assert_eq!(offset.y, 0.0);

        let mut c = controller(5.0);
        let offset = c.drag(4.0, -2.0);
        assert_eq!(offset.x, 10.0);
        assert_eq!(offset.y, -5.0);
    }

    #[test]
    fn nan_delta_lands_fully_out() {
        let mut c = controller(6.0);
        c.drag(1.0, 1.0);
        let z = c.zoom(f32::NAN);
        assert_eq!(z.level, 15.0);
        assert_eq!(c.offset(), PanOffset::ZERO);
    }

    #[test]
    fn reset_restores_initial_level() {
        let mut c = controller(7.0);
        c.zoom(-3.0);
        c.drag(5.0, 5.0);
        c.reset();
        assert_eq!(c.zoom_state().level, 7.0);
        assert_eq!(c.offset(), PanOffset::ZERO);
    }

    proptest! {
        #[test]
        fn level_stays_in_range(
            start in 1.0f32..=15.0,
            deltas in prop::collection::vec(-40.0f32..40.0, 1..32),
        ) {
            let mut c = controller(start);
            for d in deltas {
                let z = c.zoom(d);
                prop_assert!(z.level >= z.max && z.level <= z.min, "level {} out of range", z.level);
            }
        }

        #[test]
        fn fully_out_means_centred(
            start in 1.0f32..=15.0,
            steps in prop::collection::vec((-40.0f32..40.0, -50.0f32..50.0, -50.0f32..50.0), 1..32),
        ) {
            let mut c = controller(start);
            for (delta, dx, dy) in steps {
                c.drag(dx, dy);
                let z = c.zoom(delta);
                if z.level == z.min {
                    prop_assert_eq!(c.offset(), PanOffset::ZERO);
                }
            }
        }
    }
}
