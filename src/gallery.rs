// gallery.rs — 画廊核心：持有目录与三个状态机，处理输入并逐帧推进
//
// 渲染层只通过 snapshot() 读取状态，所有修改都经过这里的方法。

use std::time::Duration;

use glam::Vec2;

use crate::camera::{CameraPose, ViewState};
use crate::catalog::{Catalog, ImageId, ImageRecord};
use crate::config::GalleryConfig;
use crate::input::{GalleryInput, GalleryKey};
use crate::key_pan::{CameraTarget, KeyPanAnimator};
use crate::popup::{PopupController, SelectionState};
use crate::scene::{self, Panel};
use crate::zoom_pan::{PanOffset, ZoomPanController, ZoomState};

/// Read-only view of the gallery for one rendered frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameState {
    pub zoom: ZoomState,
    pub offset: PanOffset,
    pub camera: CameraPose,
    pub camera_target: Option<CameraTarget>,
    pub view: ViewState,
    pub selection: SelectionState,
}

pub struct Gallery {
    catalog: Catalog,
    config: GalleryConfig,
    panels: Vec<Panel>,
    zoom_pan: ZoomPanController,
    key_pan: KeyPanAnimator,
    popup: PopupController,
    viewport: Vec2,
}

impl Gallery {
    pub fn new(catalog: Catalog, config: GalleryConfig) -> Self {
        let panels = scene::layout(&catalog, &config.panel);
        Self {
            zoom_pan: ZoomPanController::new(&config.zoom, &config.pan),
            key_pan: KeyPanAnimator::new(CameraPose::default(), &config.key_pan),
            popup: PopupController::new(&config.popup),
            panels,
            catalog,
            config,
            viewport: Vec2::ZERO,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn config(&self) -> &GalleryConfig {
        &self.config
    }

    pub fn panels(&self) -> &[Panel] {
        &self.panels
    }

    pub fn selected(&self) -> Option<(usize, &ImageRecord)> {
        let index = self.popup.state().selected_index?;
        self.popup.selected(&self.catalog).map(|r| (index, r))
    }

    /// Swap in a new catalog; closes the popup and re-lays the panels.
    pub fn replace_catalog(&mut self, catalog: Catalog) {
        self.popup.close();
        self.panels = scene::layout(&catalog, &self.config.panel);
        self.catalog = catalog;
    }

    pub fn set_viewport(&mut self, width: f32, height: f32) {
        self.viewport = Vec2::new(width, height);
    }

    pub fn handle(&mut self, input: &GalleryInput) {
        match *input {
            GalleryInput::Drag { dx, dy } => {
                self.zoom_pan.drag(dx, dy);
            }
            GalleryInput::Wheel { delta } => {
                self.zoom_pan.zoom(delta);
            }
            GalleryInput::Key(key) => self.key(key),
            GalleryInput::Click { x, y } => self.click(Vec2::new(x, y)),
        }
    }

    fn key(&mut self, key: GalleryKey) {
        if self.popup.is_open() {
            // the popup is modal: arrows page through images instead of panning
            match key {
                GalleryKey::Left => self.previous(),
                GalleryKey::Right => self.next(),
                GalleryKey::Escape => self.close(),
                GalleryKey::Up | GalleryKey::Down => {}
            }
            return;
        }
        if let Some(direction) = key.direction() {
            self.key_pan.press(direction);
        }
    }

    fn click(&mut self, cursor: Vec2) {
        let view = self.view_state();
        let Some(ray) = view.screen_ray(cursor, self.viewport) else {
            return;
        };
        let Some(index) = scene::pick(&self.panels, view.gallery_translation(), &ray) else {
            return;
        };
        if let Some(id) = self.catalog.get(index).map(|r| r.id) {
            self.select(id);
        }
    }

    pub fn select(&mut self, id: ImageId) -> bool {
        self.popup.select(&self.catalog, id)
    }

    pub fn next(&mut self) {
        self.popup.next(self.catalog.len());
    }

    pub fn previous(&mut self) {
        self.popup.previous(self.catalog.len());
    }

    pub fn close(&mut self) {
        self.popup.close();
    }

    pub fn reset_view(&mut self) {
        self.zoom_pan.reset();
        self.key_pan.set_pose(CameraPose::default());
    }

    /// Advance the per-frame animations.
    pub fn tick(&mut self, dt: Duration) -> FrameState {
        self.key_pan.tick(dt);
        self.popup.tick(dt);
        self.snapshot()
    }

    pub fn is_animating(&self) -> bool {
        self.key_pan.is_animating() || self.popup.is_animating()
    }

    pub fn view_state(&self) -> ViewState {
        ViewState::new(
            self.key_pan.pose(),
            self.zoom_pan.zoom_state(),
            self.zoom_pan.offset(),
            self.config.pan.world_units_per_pixel,
        )
    }

    pub fn snapshot(&self) -> FrameState {
        FrameState {
            zoom: self.zoom_pan.zoom_state(),
            offset: self.zoom_pan.offset(),
            camera: self.key_pan.pose(),
            camera_target: self.key_pan.target(),
            view: self.view_state(),
            selection: self.popup.state(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::REFERENCE_FRAME;

    fn gallery() -> Gallery {
        let mut g = Gallery::new(Catalog::demo(), GalleryConfig::default());
        g.set_viewport(800.0, 600.0);
        g
    }

    fn settle(g: &mut Gallery) {
        for _ in 0..1000 {
            if !g.is_animating() {
                return;
            }
            g.tick(REFERENCE_FRAME);
        }
        panic!("gallery never settled");
    }

    #[test]
    fn arrow_keys_pan_when_closed() {
        let mut g = gallery();
        g.handle(&GalleryInput::Key(GalleryKey::Right));
        assert!(g.snapshot().camera_target.is_some());
        settle(&mut g);
        assert!((g.snapshot().camera.position.x - 1.0).abs() < 1e-5);
    }

    #[test]
    fn arrow_keys_page_while_open() {
        let mut g = gallery();
        g.select(2);
        g.handle(&GalleryInput::Key(GalleryKey::Right));
        g.handle(&GalleryInput::Key(GalleryKey::Up));
        let s = g.snapshot();
        assert_eq!(s.selection.selected_index, Some(2));
        assert_eq!(s.camera_target, None);

        g.handle(&GalleryInput::Key(GalleryKey::Left));
        g.handle(&GalleryInput::Key(GalleryKey::Left));
        assert_eq!(g.snapshot().selection.selected_index, Some(0));
    }

    #[test]
    fn escape_closes_popup() {
        let mut g = gallery();
        g.select(4);
        g.handle(&GalleryInput::Key(GalleryKey::Escape));
        assert!(!g.snapshot().selection.popup_visible);
    }

    #[test]
    fn click_on_centre_panel_opens_it() {
        let mut g = gallery();
        // zoom in so the top-centre panel (id 2, centred at y = 1.5) fills the middle
        g.key_pan.set_pose(CameraPose {
            position: glam::Vec3::new(0.0, 1.5, 10.0),
            look_at: glam::Vec3::new(0.0, 1.5, 0.0),
            up: glam::Vec3::Y,
        });
        g.handle(&GalleryInput::Click { x: 400.0, y: 300.0 });
        let s = g.snapshot().selection;
        assert!(s.popup_visible);
        assert_eq!(s.selected_index, Some(1));
        assert_eq!(g.selected().unwrap().1.title, "Ridge Line");
    }

    #[test]
    fn click_on_empty_space_does_nothing() {
        let mut g = gallery();
        g.handle(&GalleryInput::Click { x: 400.0, y: 300.0 });
        assert!(!g.snapshot().selection.popup_visible);
    }

    #[test]
    fn wheel_and_drag_reach_the_controller() {
        let mut g = gallery();
        g.handle(&GalleryInput::Wheel { delta: -7.0 });
        assert_eq!(g.snapshot().zoom.level, 3.0);
        g.handle(&GalleryInput::Drag { dx: 4.0, dy: 0.0 });
        assert_eq!(g.snapshot().offset.x, 12.0);

        g.handle(&GalleryInput::Wheel { delta: 100.0 });
        let s = g.snapshot();
        assert_eq!(s.zoom.level, 15.0);
        assert_eq!(s.offset, PanOffset::ZERO);
    }

    #[test]
    fn replacing_catalog_closes_popup() {
        let mut g = gallery();
        g.select(6);
        g.replace_catalog(Catalog::default());
        assert!(!g.snapshot().selection.popup_visible);
        assert!(g.panels().is_empty());
        g.next();
        assert_eq!(g.snapshot().selection.selected_index, None);
    }

    #[test]
    fn settled_ticks_do_not_change_state() {
        let mut g = gallery();
        g.select(1);
        g.handle(&GalleryInput::Key(GalleryKey::Escape));
        g.handle(&GalleryInput::Key(GalleryKey::Down));
        settle(&mut g);
        let settled = g.snapshot();
        for _ in 0..5 {
            assert_eq!(g.tick(REFERENCE_FRAME), settled);
        }
    }

    #[test]
    fn reset_view_recentres() {
        let mut g = gallery();
        g.handle(&GalleryInput::Wheel { delta: -4.0 });
        g.handle(&GalleryInput::Drag { dx: 30.0, dy: 10.0 });
        g.handle(&GalleryInput::Key(GalleryKey::Up));
        g.reset_view();
        let s = g.snapshot();
        assert_eq!(s.zoom.level, 10.0);
        assert_eq!(s.offset, PanOffset::ZERO);
        assert_eq!(s.camera, CameraPose::default());
        assert_eq!(s.camera_target, None);
    }
}
