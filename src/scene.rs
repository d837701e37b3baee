// scene.rs — 面板布局与射线拾取
//
// 每张图片对应一个面向 +Z 的矩形面板，中心在记录的 position。

use glam::{Mat4, Vec2, Vec3};

use crate::catalog::Catalog;
use crate::config::PanelConfig;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub dir: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, dir: Vec3) -> Self {
        Self { origin, dir }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Panel {
    /// Catalog index.
    pub index: usize,
    pub center: Vec3,
    pub size: Vec2,
}

impl Panel {
    /// Model matrix for the unit quad ([-0.5, 0.5] on x/y).
    pub fn model(&self, translation: Vec3) -> Mat4 {
        Mat4::from_translation(self.center + translation) * Mat4::from_scale(self.size.extend(1.0))
    }

    /// Ray parameter of the hit, if the ray crosses the panel in front of its origin.
    pub fn hit(&self, ray: &Ray, translation: Vec3) -> Option<f32> {
        let center = self.center + translation;
        if ray.dir.z.abs() < 1e-6 {
            return None;
        }
        let t = (center.z - ray.origin.z) / ray.dir.z;
        if t < 0.0 {
            return None;
        }
        let p = ray.origin + ray.dir * t;
        let half = self.size * 0.5;
        ((p.x - center.x).abs() <= half.x && (p.y - center.y).abs() <= half.y).then_some(t)
    }
}

pub fn layout(catalog: &Catalog, panel: &PanelConfig) -> Vec<Panel> {
    catalog
        .iter()
        .enumerate()
        .map(|(index, record)| Panel {
            index,
            center: record.position(),
            size: Vec2::new(panel.width, panel.height),
        })
        .collect()
}

/// Closest panel hit by `ray`. Equal distances resolve to the lower catalog index.
pub fn pick(panels: &[Panel], translation: Vec3, ray: &Ray) -> Option<usize> {
    let mut best: Option<(f32, usize)> = None;
    for panel in panels {
        let Some(t) = panel.hit(ray, translation) else {
            continue;
        };
        match best {
            Some((best_t, _)) if best_t <= t => {}
            _ => best = Some((t, panel.index)),
        }
    }
    best.map(|(_, index)| index)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn panels() -> Vec<Panel> {
        layout(&Catalog::demo(), &PanelConfig::default())
    }

    fn down_z(x: f32, y: f32) -> Ray {
        Ray::new(Vec3::new(x, y, 10.0), Vec3::NEG_Z)
    }

    #[test]
    fn picks_panel_under_ray() {
        let panels = panels();
        assert_eq!(pick(&panels, Vec3::ZERO, &down_z(0.0, 1.5)), Some(1));
        assert_eq!(pick(&panels, Vec3::ZERO, &down_z(4.5, -2.0)), Some(5));
    }

    #[test]
    fn gap_between_panels_misses() {
        let panels = panels();
        assert_eq!(pick(&panels, Vec3::ZERO, &down_z(2.0, 1.5)), None);
    }

    #[test]
    fn translation_moves_hit_area() {
        let panels = panels();
        let shift = Vec3::new(4.0, 0.0, 0.0);
        assert_eq!(pick(&panels, shift, &down_z(4.0, 1.5)), Some(1));
    }

    #[test]
    fn nearest_panel_wins_and_ties_go_to_lower_index() {
        let size = Vec2::new(2.0, 2.0);
        let stacked = [
            Panel { index: 0, center: Vec3::new(0.0, 0.0, 0.0), size },
            Panel { index: 1, center: Vec3::new(0.0, 0.0, 1.0), size },
            Panel { index: 2, center: Vec3::new(0.0, 0.0, 1.0), size },
        ];
        assert_eq!(pick(&stacked, Vec3::ZERO, &down_z(0.0, 0.0)), Some(1));
    }

    #[test]
    fn panel_behind_ray_is_ignored() {
        let panels = panels();
        let ray = Ray::new(Vec3::new(0.0, 1.5, 10.0), Vec3::Z);
        assert_eq!(pick(&panels, Vec3::ZERO, &ray), None);
    }
}
