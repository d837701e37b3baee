// popup.rs — 选中图片与详情弹窗
//
// Closed: selected_index = None, popup_visible = false
// Open:   selected_index = Some(i), popup_visible = true, popup_scale 从 initial_scale 缓动到 1

use std::time::Duration;

use crate::animation::frame_fraction;
use crate::catalog::{Catalog, ImageId, ImageRecord};
use crate::config::PopupConfig;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionState {
    pub selected_index: Option<usize>,
    pub popup_visible: bool,
    pub popup_scale: f32,
}

#[derive(Debug, Clone)]
pub struct PopupController {
    state: SelectionState,
    animating: bool,
    config: PopupConfig,
}

impl PopupController {
    pub fn new(config: &PopupConfig) -> Self {
        Self {
            state: SelectionState {
                selected_index: None,
                popup_visible: false,
                popup_scale: 1.0,
            },
            animating: false,
            config: *config,
        }
    }

    pub fn state(&self) -> SelectionState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state.popup_visible
    }

    pub fn is_animating(&self) -> bool {
        self.animating
    }

    pub fn selected<'a>(&self, catalog: &'a Catalog) -> Option<&'a ImageRecord> {
        self.state.selected_index.and_then(|i| catalog.get(i))
    }

    /// Open the popup on the record with `id`. Unknown ids leave the state untouched.
    pub fn select(&mut self, catalog: &Catalog, id: ImageId) -> bool {
        let Some(index) = catalog.index_of(id) else {
            log::debug!("select: no image with id {id}");
            return false;
        };
        log::debug!("popup open on #{index} (id {id})");
        self.show(index);
        true
    }

    pub fn close(&mut self) {
        if self.state.popup_visible {
            log::debug!("popup closed");
        }
        self.state.popup_visible = false;
        self.state.selected_index = None;
    }

    /// Wraps to the first image after the last. No-op while closed or on an empty catalog.
    pub fn next(&mut self, len: usize) {
        if let Some(i) = self.open_index(len) {
            let index = (i + 1) % len;
            log::debug!("popup next -> #{index}");
            self.show(index);
        }
    }

    pub fn previous(&mut self, len: usize) {
        if let Some(i) = self.open_index(len) {
            let index = (i + len - 1) % len;
            log::debug!("popup previous -> #{index}");
            self.show(index);
        }
    }

    /// Advance the scale-in animation one frame. No-op once settled.
    pub fn tick(&mut self, dt: Duration) -> SelectionState {
        if !self.animating {
            return self.state;
        }
        let alpha = frame_fraction(self.config.easing, dt);
        let scale = &mut self.state.popup_scale;
        *scale += (1.0 - *scale) * alpha;
        if (1.0 - *scale).abs() <= self.config.tolerance {
            *scale = 1.0;
            self.animating = false;
        }
        self.state
    }

    fn open_index(&self, len: usize) -> Option<usize> {
        if !self.state.popup_visible || len == 0 {
            return None;
        }
        // a catalog swap may have shrunk the list under us
        self.state.selected_index.map(|i| i.min(len - 1))
    }

    fn show(&mut self, index: usize) {
        self.state.selected_index = Some(index);
        self.state.popup_visible = true;
        self.state.popup_scale = self.config.initial_scale;
        self.animating = self.config.initial_scale < 1.0;
    }
}
