// camera.rs — 相机姿态与视图合成
//
// 渲染用的眼睛位置 = look_at 沿视线方向后退 zoom level；
// 平移偏移 (像素) 换算成世界单位后整体平移画廊，屏幕 y 向下所以取反。

use glam::{Mat4, Vec2, Vec3};

use crate::scene::Ray;
use crate::zoom_pan::{PanOffset, ZoomState};

/// 竖直视场角 (度)
pub const FOV_Y_DEG: f32 = 50.0;
const Z_NEAR: f32 = 0.1;
const Z_FAR: f32 = 1000.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    pub position: Vec3,
    pub look_at: Vec3,
    pub up: Vec3,
}

impl Default for CameraPose {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 10.0),
            look_at: Vec3::ZERO,
            up: Vec3::Y,
        }
    }
}

impl CameraPose {
    pub fn forward(&self) -> Vec3 {
        (self.look_at - self.position).normalize_or_zero()
    }

    /// Camera-local right axis.
    pub fn right(&self) -> Vec3 {
        self.forward().cross(self.up).normalize_or_zero()
    }

    /// Camera-local up axis, orthogonal to the view direction.
    pub fn local_up(&self) -> Vec3 {
        self.right().cross(self.forward())
    }
}

/// Everything the renderer needs to place the camera for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewState {
    pub pose: CameraPose,
    pub distance: f32,
    /// Gallery translation in world units.
    pub pan: Vec2,
}

impl ViewState {
    pub fn new(pose: CameraPose, zoom: ZoomState, offset: PanOffset, world_units_per_pixel: f32) -> Self {
        Self {
            pose,
            distance: zoom.level,
            pan: Vec2::new(offset.x, -offset.y) * world_units_per_pixel,
        }
    }

    pub fn eye(&self) -> Vec3 {
        let forward = self.pose.forward();
        let forward = if forward == Vec3::ZERO { Vec3::NEG_Z } else { forward };
        self.pose.look_at - forward * self.distance
    }

    pub fn gallery_translation(&self) -> Vec3 {
        self.pan.extend(0.0)
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye(), self.pose.look_at, self.pose.up)
    }

    pub fn projection(aspect: f32) -> Mat4 {
        let aspect = if aspect.is_finite() && aspect > 0.0 { aspect } else { 1.0 };
        Mat4::perspective_rh(FOV_Y_DEG.to_radians(), aspect, Z_NEAR, Z_FAR)
    }

    pub fn view_proj(&self, aspect: f32) -> Mat4 {
        Self::projection(aspect) * self.view()
    }

    /// World-space ray through a cursor position given in physical pixels.
    pub fn screen_ray(&self, cursor: Vec2, viewport: Vec2) -> Option<Ray> {
        if viewport.x <= 0.0 || viewport.y <= 0.0 {
            return None;
        }
        let ndc = Vec2::new(
            2.0 * cursor.x / viewport.x - 1.0,
            1.0 - 2.0 * cursor.y / viewport.y,
        );
        let inv = self.view_proj(viewport.x / viewport.y).inverse();
        let near = inv.project_point3(ndc.extend(0.0));
        let far = inv.project_point3(ndc.extend(1.0));
        let dir = (far - near).normalize_or_zero();
        if dir == Vec3::ZERO {
            return None;
        }
        Some(Ray::new(near, dir))
    }
}
