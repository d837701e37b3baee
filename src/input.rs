// input.rs — 输入事件路由
//
// winit 原始事件 -> GalleryInput；订阅者通过 InputBus 显式 subscribe / unsubscribe，
// 与窗口或 UI 框架的生命周期解耦。

use glam::Vec2;

use crate::key_pan::PanDirection;

/// Press-release travel below this many pixels counts as a click.
pub const CLICK_SLOP: f32 = 4.0;

/// Zoom delta per wheel line; scrolling up zooms in.
pub const ZOOM_PER_LINE: f32 = 1.0;

/// Pixel wheel deltas are scaled down to line units.
pub const PIXELS_PER_LINE: f32 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GalleryKey {
    Up,
    Down,
    Left,
    Right,
    Escape,
}

impl GalleryKey {
    pub fn from_winit(key: winit::event::VirtualKeyCode) -> Option<Self> {
        use winit::event::VirtualKeyCode as K;
        match key {
            K::Up => Some(GalleryKey::Up),
            K::Down => Some(GalleryKey::Down),
            K::Left => Some(GalleryKey::Left),
            K::Right => Some(GalleryKey::Right),
            K::Escape => Some(GalleryKey::Escape),
            _ => None,
        }
    }

    pub fn direction(self) -> Option<PanDirection> {
        match self {
            GalleryKey::Up => Some(PanDirection::Up),
            GalleryKey::Down => Some(PanDirection::Down),
            GalleryKey::Left => Some(PanDirection::Left),
            GalleryKey::Right => Some(PanDirection::Right),
            GalleryKey::Escape => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GalleryInput {
    Drag { dx: f32, dy: f32 },
    Wheel { delta: f32 },
    Key(GalleryKey),
    /// Cursor position in physical pixels.
    Click { x: f32, y: f32 },
}

/// Zoom delta for a scroll of `lines` (positive = away from the user).
pub fn wheel_delta(lines: f32) -> f32 {
    -lines * ZOOM_PER_LINE
}

/// Wheel travel in lines; trackpad pixel deltas are scaled to match.
pub fn scroll_lines(delta: winit::event::MouseScrollDelta) -> f32 {
    match delta {
        winit::event::MouseScrollDelta::LineDelta(_, y) => y,
        winit::event::MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / PIXELS_PER_LINE,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Handler = Box<dyn FnMut(&GalleryInput)>;

#[derive(Default)]
pub struct InputBus {
    next_id: u64,
    handlers: Vec<(SubscriptionId, Handler)>,
}

impl InputBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, handler: impl FnMut(&GalleryInput) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.handlers.push((id, Box::new(handler)));
        id
    }

    /// Returns false if `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.handlers.len();
        self.handlers.retain(|(h, _)| *h != id);
        self.handlers.len() != before
    }

    /// Deliver to every live subscriber, in subscription order.
    pub fn dispatch(&mut self, input: &GalleryInput) {
        for (_, handler) in &mut self.handlers {
            handler(input);
        }
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

/// Turns primary-button press / move / release into drags and clicks.
#[derive(Debug, Clone, Default)]
pub struct PointerTracker {
    cursor: Option<Vec2>,
    pressed: bool,
    travelled: f32,
}

impl PointerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self) {
        self.pressed = true;
        self.travelled = 0.0;
    }

    /// Emits a drag for movement while the button is held.
    pub fn moved(&mut self, position: Vec2) -> Option<GalleryInput> {
        let last = self.cursor.replace(position);
        if !self.pressed {
            return None;
        }
        let delta = position - last?;
        self.travelled += delta.length();
        Some(GalleryInput::Drag {
            dx: delta.x,
            dy: delta.y,
        })
    }

    /// Emits a click when the press barely moved.
    pub fn release(&mut self) -> Option<GalleryInput> {
        let was_pressed = std::mem::replace(&mut self.pressed, false);
        if !was_pressed || self.travelled >= CLICK_SLOP {
            return None;
        }
        self.cursor.map(|c| GalleryInput::Click { x: c.x, y: c.y })
    }

    /// The release went to the UI; drop the press without emitting anything.
    pub fn cancel(&mut self) {
        self.pressed = false;
    }

    /// Cursor left the window; an in-flight press can no longer become a click.
    pub fn left(&mut self) {
        self.cursor = None;
        self.pressed = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn bus_delivers_in_order_until_unsubscribed() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut bus = InputBus::new();

        let a = {
            let seen = seen.clone();
            bus.subscribe(move |_| seen.borrow_mut().push("a"))
        };
        {
            let seen = seen.clone();
            bus.subscribe(move |_| seen.borrow_mut().push("b"));
        }

        bus.dispatch(&GalleryInput::Wheel { delta: 1.0 });
        assert!(bus.unsubscribe(a));
        assert!(!bus.unsubscribe(a));
        bus.dispatch(&GalleryInput::Wheel { delta: 1.0 });

        assert_eq!(*seen.borrow(), vec!["a", "b", "b"]);
        assert_eq!(bus.len(), 1);
    }

    #[test]
    fn short_press_is_a_click() {
        let mut p = PointerTracker::new();
        p.moved(Vec2::new(100.0, 50.0));
        p.press();
        assert_eq!(
            p.moved(Vec2::new(101.0, 51.0)),
            Some(GalleryInput::Drag { dx: 1.0, dy: 1.0 })
        );
        assert_eq!(p.release(), Some(GalleryInput::Click { x: 101.0, y: 51.0 }));
    }

    #[test]
    fn long_drag_is_not_a_click() {
        let mut p = PointerTracker::new();
        p.moved(Vec2::new(0.0, 0.0));
        p.press();
        p.moved(Vec2::new(10.0, 0.0));
        assert_eq!(p.release(), None);
    }

    #[test]
    fn hover_does_not_drag() {
        let mut p = PointerTracker::new();
        assert_eq!(p.moved(Vec2::new(0.0, 0.0)), None);
        assert_eq!(p.moved(Vec2::new(5.0, 5.0)), None);
        assert_eq!(p.release(), None);
    }

    #[test]
    fn wheel_up_zooms_in() {
        assert!(wheel_delta(1.0) < 0.0);
        assert_eq!(wheel_delta(-2.0), 2.0);
    }

    #[test]
    fn pixel_scroll_is_scaled_to_lines() {
        use winit::dpi::PhysicalPosition;
        use winit::event::MouseScrollDelta;

        assert_eq!(scroll_lines(MouseScrollDelta::LineDelta(0.0, 2.0)), 2.0);
        let pixels = MouseScrollDelta::PixelDelta(PhysicalPosition::new(0.0, 40.0));
        assert_eq!(scroll_lines(pixels), 2.0);
        assert!(wheel_delta(scroll_lines(pixels)) < 0.0);
    }

    #[test]
    fn cancelled_press_stops_dragging() {
        let mut p = PointerTracker::new();
        p.moved(Vec2::new(0.0, 0.0));
        p.press();
        p.cancel();
        assert_eq!(p.moved(Vec2::new(6.0, 0.0)), None);
        assert_eq!(p.release(), None);
    }

    #[test]
    fn only_arrows_map_to_directions() {
        assert_eq!(GalleryKey::Left.direction(), Some(PanDirection::Left));
        assert_eq!(GalleryKey::Escape.direction(), None);
    }
}
