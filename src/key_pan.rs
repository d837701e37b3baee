// key_pan.rs — 方向键平移动画
//
// 按键只修改目标 (CameraTarget)，每帧把当前姿态向目标靠近一定比例；
// 位置与 look_at 都进入容差后直接吸附到目标并回到 Idle。

use std::time::Duration;

use glam::Vec3;

use crate::animation::frame_fraction;
use crate::camera::CameraPose;
use crate::config::KeyPanConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PanDirection {
    Up,
    Down,
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraTarget {
    pub position: Vec3,
    pub look_at: Vec3,
}

#[derive(Debug, Clone)]
pub struct KeyPanAnimator {
    pose: CameraPose,
    target: Option<CameraTarget>,
    config: KeyPanConfig,
}

impl KeyPanAnimator {
    pub fn new(pose: CameraPose, config: &KeyPanConfig) -> Self {
        Self {
            pose,
            target: None,
            config: *config,
        }
    }

    pub fn pose(&self) -> CameraPose {
        self.pose
    }

    pub fn target(&self) -> Option<CameraTarget> {
        self.target
    }

    pub fn is_animating(&self) -> bool {
        self.target.is_some()
    }

    /// Jump to `pose` and drop any pending target.
    pub fn set_pose(&mut self, pose: CameraPose) {
        self.pose = pose;
        self.target = None;
    }

    /// Extend the pending target one step in `direction`, in camera-local axes.
    pub fn press(&mut self, direction: PanDirection) {
        let step = match direction {
            PanDirection::Up => self.pose.local_up(),
            PanDirection::Down => -self.pose.local_up(),
            PanDirection::Left => -self.pose.right(),
            PanDirection::Right => self.pose.right(),
        } * self.config.step;

        let pose = self.pose;
        let target = self.target.get_or_insert_with(|| {
            log::debug!("key pan armed at {:?}", pose.position);
            CameraTarget {
                position: pose.position,
                look_at: pose.look_at,
            }
        });
        target.position += step;
        target.look_at += step;
    }

    /// Advance one frame. No-op once idle.
    pub fn tick(&mut self, dt: Duration) -> CameraPose {
        let Some(target) = self.target else {
            return self.pose;
        };

        let alpha = frame_fraction(self.config.smoothing, dt);
        self.pose.position = self.pose.position.lerp(target.position, alpha);
        self.pose.look_at = self.pose.look_at.lerp(target.look_at, alpha);

        let tolerance = self.config.tolerance;
        if self.pose.position.distance(target.position) < tolerance
            && self.pose.look_at.distance(target.look_at) < tolerance
        {
            self.pose.position = target.position;
            self.pose.look_at = target.look_at;
            self.target = None;
            log::debug!("key pan settled at {:?}", self.pose.position);
        }

        self.pose
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::REFERENCE_FRAME;
    use proptest::prelude::*;

    fn animator() -> KeyPanAnimator {
        KeyPanAnimator::new(CameraPose::default(), &KeyPanConfig::default())
    }

    fn settle(a: &mut KeyPanAnimator) -> usize {
        for frame in 0..1000 {
            if !a.is_animating() {
                return frame;
            }
            a.tick(REFERENCE_FRAME);
        }
        panic!("animation never settled");
    }

    #[test]
    fn starts_idle() {
        let a = animator();
        assert!(!a.is_animating());
        assert_eq!(a.target(), None);
    }

    #[test]
    fn right_press_targets_one_step_right() {
        let mut a = animator();
        a.press(PanDirection::Right);
        let t = a.target().unwrap();
        assert!((t.position - Vec3::new(1.0, 0.0, 10.0)).length() < 1e-6);
        assert!((t.look_at - Vec3::new(1.0, 0.0, 0.0)).length() < 1e-6);
    }

    #[test]
    fn tick_moves_a_tenth_per_frame() {
        let mut a = animator();
        a.press(PanDirection::Up);
        let pose = a.tick(REFERENCE_FRAME);
        assert!((pose.position.y - 0.1).abs() < 1e-3);
        assert!((pose.look_at.y - 0.1).abs() < 1e-3);
        assert!(a.is_animating());
    }

    #[test]
    fn converges_and_snaps_to_target() {
        let mut a = animator();
        a.press(PanDirection::Left);
        a.press(PanDirection::Down);
        let target = a.target().unwrap();
        settle(&mut a);

        assert_eq!(a.pose().position, target.position);
        assert_eq!(a.pose().look_at, target.look_at);
        assert_eq!(a.target(), None);
    }

    #[test]
    fn presses_while_animating_accumulate() {
        let mut a = animator();
        a.press(PanDirection::Right);
        a.tick(REFERENCE_FRAME);
        a.tick(REFERENCE_FRAME);
        a.press(PanDirection::Right);
        let t = a.target().unwrap();
        assert!((t.position.x - 2.0).abs() < 1e-5);

        settle(&mut a);
        assert!((a.pose().position.x - 2.0).abs() < 1e-5);
    }

    #[test]
    fn view_direction_is_preserved() {
        let mut a = animator();
        let before = a.pose().forward();
        a.press(PanDirection::Up);
        a.press(PanDirection::Right);
        settle(&mut a);
        assert!((a.pose().forward() - before).length() < 1e-5);
    }

    #[test]
    fn tick_while_idle_is_a_no_op() {
        let mut a = animator();
        a.press(PanDirection::Down);
        settle(&mut a);
        let settled = a.pose();
        for _ in 0..10 {
            assert_eq!(a.tick(REFERENCE_FRAME), settled);
        }
    }

    #[test]
    fn set_pose_cancels_target() {
        let mut a = animator();
        a.press(PanDirection::Up);
        a.set_pose(CameraPose::default());
        assert!(!a.is_animating());
    }

    fn direction() -> impl Strategy<Value = PanDirection> {
        prop_oneof![
            Just(PanDirection::Up),
            Just(PanDirection::Down),
            Just(PanDirection::Left),
            Just(PanDirection::Right),
        ]
    }

    proptest! {
        #[test]
        fn any_key_sequence_settles_on_its_target(keys in prop::collection::vec(direction(), 1..12)) {
            let mut a = animator();
            for k in keys {
                a.press(k);
            }
            let target = a.target().unwrap();
            settle(&mut a);
            prop_assert_eq!(a.pose().position, target.position);
            prop_assert_eq!(a.pose().look_at, target.look_at);
        }
    }
}
