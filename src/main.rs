// main.rs — 3D 图片画廊：事件循环、输入分发与逐帧渲染

#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")] // 在 Release 模式下隐藏控制台窗口

mod animation;
mod camera;
mod catalog;
mod config;
mod error;
mod gallery;
mod i18n;
mod input;
mod key_pan;
mod loader;
mod popup;
mod renderer;
mod scene;
mod ui;
mod zoom_pan;

use catalog::Catalog;
use config::{GalleryConfig, LaunchOptions};
use error::GalleryError;
use gallery::Gallery;
use input::{GalleryInput, GalleryKey, InputBus, PointerTracker};
use loader::TextureLoader;
use renderer::Renderer;
use ui::{UiAction, UiState};

use glam::Vec2;
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Instant;
use winit::{
    dpi::LogicalSize,
    event::*,
    event_loop::{ControlFlow, EventLoop},
    window::{Fullscreen, Window, WindowBuilder},
};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        log::error!("{e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), GalleryError> {
    let options = LaunchOptions::from_env();
    i18n::init(options.lang.clone());

    let config = GalleryConfig::resolve(&options);
    let catalog = Catalog::resolve(&options);

    let event_loop = EventLoop::new();
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(i18n::tr("app.title"))
            .with_inner_size(LogicalSize::new(1280, 720))
            .build(&event_loop)?,
    );

    let mut renderer = pollster::block_on(Renderer::new(window.clone()))?;
    let mut loader = TextureLoader::new(config.placeholder_color);
    let mut ui_state = UiState::new(options.lang.clone(), catalog.len());

    renderer.set_panels(catalog.len(), config.placeholder_color);
    loader.request_catalog(&catalog);

    let gallery = Rc::new(RefCell::new(Gallery::new(catalog, config)));
    gallery
        .borrow_mut()
        .set_viewport(renderer.size.width as f32, renderer.size.height as f32);

    // 画廊状态只通过输入总线修改
    let mut bus = InputBus::new();
    let gallery_sub = {
        let gallery = gallery.clone();
        bus.subscribe(move |input| gallery.borrow_mut().handle(input))
    };
    let trace_sub = bus.subscribe(|input| log::trace!("input {input:?}"));

    let mut pointer = PointerTracker::new();

    // FPS 计算
    let mut last_tick = Instant::now();
    let mut last_fps_time = Instant::now();
    let mut frame_count = 0;

    event_loop.run(move |event, _, control_flow| {
        // 没有动画或加载时等待事件，不空转
        *control_flow = if gallery.borrow().is_animating() || loader.pending() > 0 {
            ControlFlow::Poll
        } else {
            ControlFlow::Wait
        };

        // 取出后台解码完成的图片
        for loaded in loader.poll() {
            if loaded.placeholder {
                log::debug!("panel {} keeps its placeholder", loaded.index);
            } else {
                ui_state.set_image(&renderer.egui_ctx, loaded.index, &loaded.image);
            }
            renderer.upload_panel_image(loaded.index, &loaded.image);
        }

        match event {
            Event::WindowEvent { event, .. } => {
                // 先让 egui 处理事件
                let response = renderer.egui_state.on_event(&renderer.egui_ctx, &event);
                if response.consumed {
                    // 松开落在弹窗上时也要结束拖动
                    if matches!(
                        event,
                        WindowEvent::MouseInput {
                            state: ElementState::Released,
                            button: MouseButton::Left,
                            ..
                        }
                    ) {
                        pointer.cancel();
                    }
                    return;
                }

                match event {
                    WindowEvent::CloseRequested => {
                        *control_flow = ControlFlow::Exit;
                    }

                    WindowEvent::Resized(new_size) => {
                        renderer.resize(new_size);
                        gallery
                            .borrow_mut()
                            .set_viewport(new_size.width as f32, new_size.height as f32);
                    }

                    WindowEvent::KeyboardInput { input, .. } => {
                        if input.state == ElementState::Pressed {
                            match input.virtual_keycode {
                                Some(VirtualKeyCode::F11) => {
                                    toggle_fullscreen(&window, &mut ui_state);
                                }
                                Some(code) => {
                                    if let Some(key) = GalleryKey::from_winit(code) {
                                        bus.dispatch(&GalleryInput::Key(key));
                                    }
                                }
                                None => {}
                            }
                        }
                    }

                    WindowEvent::MouseInput { state, button, .. } => {
                        if button == MouseButton::Left {
                            if state == ElementState::Pressed {
                                pointer.press();
                            } else if let Some(click) = pointer.release() {
                                bus.dispatch(&click);
                            }
                        }
                    }

                    WindowEvent::CursorMoved { position, .. } => {
                        let position = Vec2::new(position.x as f32, position.y as f32);
                        if let Some(drag) = pointer.moved(position) {
                            bus.dispatch(&drag);
                        }
                    }

                    WindowEvent::CursorLeft { .. } => pointer.left(),

                    WindowEvent::MouseWheel { delta, .. } => {
                        bus.dispatch(&GalleryInput::Wheel {
                            delta: input::wheel_delta(input::scroll_lines(delta)),
                        });
                    }

                    _ => {}
                }
            }

            Event::RedrawRequested(_) => {
                let now = Instant::now();
                let dt = now.duration_since(last_tick);
                last_tick = now;

                frame_count += 1;
                let since = now.duration_since(last_fps_time).as_secs_f32();
                if since >= 1.0 {
                    ui_state.fps = frame_count as f32 / since;
                    frame_count = 0;
                    last_fps_time = now;
                }

                let frame = gallery.borrow_mut().tick(dt);
                renderer.update_frame(&frame, gallery.borrow().panels());

                let mut actions = Vec::new();
                let render_result = {
                    let g = gallery.borrow();
                    let pending = loader.pending();
                    renderer.render_with_ui(&window, |ctx| {
                        actions = ui::draw_ui(ctx, &g, &frame, &mut ui_state, pending);
                    })
                };

                for action in actions {
                    apply_action(
                        action,
                        &gallery,
                        &mut renderer,
                        &mut loader,
                        &mut ui_state,
                        &window,
                        control_flow,
                    );
                }

                match render_result {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost) => renderer.resize(renderer.size),
                    Err(wgpu::SurfaceError::OutOfMemory) => *control_flow = ControlFlow::Exit,
                    Err(e) => log::warn!("render error: {e:?}"),
                }
            }

            Event::MainEventsCleared => {
                window.request_redraw();
            }

            Event::LoopDestroyed => {
                bus.unsubscribe(trace_sub);
                bus.unsubscribe(gallery_sub);
                if !bus.is_empty() {
                    log::warn!("{} input subscribers still attached at exit", bus.len());
                }
            }

            _ => {}
        }
    });
}

fn apply_action(
    action: UiAction,
    gallery: &Rc<RefCell<Gallery>>,
    renderer: &mut Renderer,
    loader: &mut TextureLoader,
    ui_state: &mut UiState,
    window: &Window,
    control_flow: &mut ControlFlow,
) {
    match action {
        UiAction::Previous => gallery.borrow_mut().previous(),
        UiAction::Next => gallery.borrow_mut().next(),
        UiAction::Close => gallery.borrow_mut().close(),
        UiAction::ResetView => gallery.borrow_mut().reset_view(),
        UiAction::ToggleFullscreen => toggle_fullscreen(window, ui_state),
        UiAction::OpenCatalog(path) => match Catalog::load(&path) {
            Ok(catalog) => {
                log::info!("loaded {} images from {}", catalog.len(), path.display());
                let placeholder = gallery.borrow().config().placeholder_color;
                renderer.set_panels(catalog.len(), placeholder);
                loader.request_catalog(&catalog);
                ui_state.reset_images(catalog.len());
                ui_state.error = None;
                gallery.borrow_mut().replace_catalog(catalog);
            }
            Err(e) => {
                log::warn!("{e}");
                ui_state.error = Some(i18n::tr_with("error.open_catalog", &[("err", e.to_string())]));
            }
        },
        UiAction::SetLanguage(lang) => {
            i18n::init(lang.clone());
            window.set_title(&i18n::tr("app.title"));
            ui_state.lang = lang;
        }
        UiAction::Exit => *control_flow = ControlFlow::Exit,
    }
}

fn toggle_fullscreen(window: &Window, ui_state: &mut UiState) {
    ui_state.fullscreen = !ui_state.fullscreen;
    if ui_state.fullscreen {
        window.set_fullscreen(Some(Fullscreen::Borderless(None)));
    } else {
        window.set_fullscreen(None);
    }
}
