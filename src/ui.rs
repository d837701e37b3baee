// ui.rs — egui 叠加层：菜单、状态栏与图片详情弹窗
//
// UI 只读取 Gallery / FrameState，用户操作以 UiAction 返回，由 main 在本帧 UI 结束后执行。

use std::path::PathBuf;

use image::RgbaImage;

use crate::gallery::{FrameState, Gallery};
use crate::i18n::{tr, tr_with};

/// 弹窗在 scale = 1 时的尺寸 (逻辑像素)
const POPUP_WIDTH: f32 = 560.0;
const POPUP_IMAGE_MAX_HEIGHT: f32 = 360.0;

/// 弹窗用缩略图的最长边
const THUMBNAIL_MAX: u32 = 1024;

const LANGUAGES: [(&str, &str); 8] = [
    ("en", "English"),
    ("zh-Hans", "简体中文"),
    ("zh-Hant", "繁體中文"),
    ("ja", "日本語"),
    ("ko", "한국어"),
    ("fr", "Français"),
    ("ru", "Русский"),
    ("ar", "العربية"),
];

#[derive(Debug, Clone, PartialEq)]
pub enum UiAction {
    Previous,
    Next,
    Close,
    ResetView,
    ToggleFullscreen,
    OpenCatalog(PathBuf),
    SetLanguage(String),
    Exit,
}

pub struct UiState {
    thumbnails: Vec<Option<egui::TextureHandle>>,
    pub lang: String,
    pub fps: f32,
    pub show_fps: bool,
    pub fullscreen: bool,
    pub error: Option<String>,
}

impl UiState {
    pub fn new(lang: String, image_count: usize) -> Self {
        Self {
            thumbnails: vec![None; image_count],
            lang,
            fps: 0.0,
            show_fps: false,
            fullscreen: false,
            error: None,
        }
    }

    pub fn reset_images(&mut self, image_count: usize) {
        self.thumbnails = vec![None; image_count];
    }

    pub fn set_image(&mut self, ctx: &egui::Context, index: usize, img: &RgbaImage) {
        let Some(slot) = self.thumbnails.get_mut(index) else {
            return;
        };
        let (w, h) = img.dimensions();
        let scale = (THUMBNAIL_MAX as f32 / w.max(h) as f32).min(1.0);
        let thumb = if scale < 1.0 {
            let tw = ((w as f32 * scale) as u32).max(1);
            let th = ((h as f32 * scale) as u32).max(1);
            image::imageops::thumbnail(img, tw, th)
        } else {
            img.clone()
        };
        let (tw, th) = thumb.dimensions();
        let color = egui::ColorImage::from_rgba_unmultiplied([tw as usize, th as usize], thumb.as_raw());
        *slot = Some(ctx.load_texture(format!("popup_{index}"), color, egui::TextureOptions::LINEAR));
    }
}

pub fn draw_ui(
    ctx: &egui::Context,
    gallery: &Gallery,
    frame: &FrameState,
    state: &mut UiState,
    loading: usize,
) -> Vec<UiAction> {
    let mut actions = Vec::new();

    egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
        egui::menu::bar(ui, |ui| {
            ui.menu_button(tr("menu.file"), |ui| {
                if ui.button(tr("menu.open_catalog")).clicked() {
                    ui.close_menu();
                    if let Some(path) = rfd::FileDialog::new()
                        .add_filter(tr("file.filter.catalog"), &["json"])
                        .pick_file()
                    {
                        actions.push(UiAction::OpenCatalog(path));
                    }
                }
                if ui.button(tr("menu.exit")).clicked() {
                    actions.push(UiAction::Exit);
                }
            });

            ui.menu_button(tr("menu.view"), |ui| {
                if ui.button(tr("view.reset")).clicked() {
                    actions.push(UiAction::ResetView);
                    ui.close_menu();
                }
                let fullscreen_label = if state.fullscreen {
                    tr("view.fullscreen.exit")
                } else {
                    tr("view.fullscreen.enter")
                };
                if ui.button(fullscreen_label).clicked() {
                    actions.push(UiAction::ToggleFullscreen);
                    ui.close_menu();
                }
                ui.separator();
                if ui.checkbox(&mut state.show_fps, tr("view.show_fps")).clicked() {
                    ui.close_menu();
                }
            });

            ui.menu_button(tr("menu.language"), |ui| {
                for (code, name) in LANGUAGES {
                    if ui.radio(state.lang == code, name).clicked() {
                        actions.push(UiAction::SetLanguage(code.to_string()));
                        ui.close_menu();
                    }
                }
            });
        });
    });

    egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
        ui.horizontal(|ui| {
            if loading > 0 {
                ui.label(
                    egui::RichText::new(tr_with("status.loading", &[("count", loading.to_string())]))
                        .color(egui::Color32::YELLOW),
                );
                ui.label("|");
            }
            if let Some(err) = &state.error {
                ui.label(egui::RichText::new(err).color(egui::Color32::LIGHT_RED));
                ui.label("|");
            }

            let catalog = gallery.catalog();
            if catalog.is_empty() {
                ui.label(tr("status.empty"));
            } else {
                ui.label(tr_with("status.items", &[("count", catalog.len().to_string())]));
            }
            ui.label("|");
            ui.label(format!("{}: {:.1}", tr("status.zoom"), frame.zoom.level));
            ui.label("|");
            ui.label(format!(
                "{}: ({:.0}, {:.0})",
                tr("status.offset"),
                frame.offset.x,
                frame.offset.y
            ));
            ui.label("|");
            let camera = format!(
                "{}: ({:.2}, {:.2})",
                tr("status.camera"),
                frame.camera.look_at.x,
                frame.camera.look_at.y
            );
            if frame.camera_target.is_some() {
                ui.label(egui::RichText::new(camera).color(egui::Color32::LIGHT_BLUE));
            } else {
                ui.label(camera);
            }

            if state.show_fps {
                ui.label("|");
                ui.label(
                    egui::RichText::new(format!("FPS: {:.1}", state.fps)).color(egui::Color32::GREEN),
                );
            }
        });
    });

    if frame.selection.popup_visible {
        if let Some((index, record)) = gallery.selected() {
            let scale = frame.selection.popup_scale;
            let width = POPUP_WIDTH * scale;

            egui::Window::new(record.title.as_str())
                .id(egui::Id::new("image_popup"))
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                .show(ctx, |ui| {
                    ui.set_width(width);
                    match state.thumbnails.get(index).and_then(Option::as_ref) {
                        Some(handle) => {
                            let [tw, th] = handle.size();
                            let fit = (width / tw as f32)
                                .min(POPUP_IMAGE_MAX_HEIGHT * scale / th as f32);
                            let size = egui::vec2(tw as f32 * fit, th as f32 * fit);
                            ui.vertical_centered(|ui| {
                                ui.image(egui::load::SizedTexture::new(handle.id(), size));
                            });
                        }
                        None => {
                            ui.vertical_centered(|ui| {
                                ui.spinner();
                                ui.label(tr("popup.loading"));
                            });
                        }
                    }

                    ui.add_space(6.0);
                    ui.label(gallery.catalog().description(index));
                    ui.add_space(6.0);
                    ui.separator();

                    ui.horizontal(|ui| {
                        if ui.button(tr("popup.previous")).clicked() {
                            actions.push(UiAction::Previous);
                        }
                        ui.label(tr_with(
                            "popup.counter",
                            &[
                                ("current", (index + 1).to_string()),
                                ("total", gallery.catalog().len().to_string()),
                            ],
                        ));
                        if ui.button(tr("popup.next")).clicked() {
                            actions.push(UiAction::Next);
                        }
                        if ui.button(tr("popup.close")).clicked() {
                            actions.push(UiAction::Close);
                        }
                    });
                });
        }
    }

    actions
}

/// Add a system or bundled font as fallback so non-Latin UI languages render.
/// Looks in assets/fonts first, then common system locations.
pub fn install_fonts(ctx: &egui::Context) {
    let mut candidates: Vec<PathBuf> = Vec::new();

    if let Some(dir) = crate::config::find_asset(std::path::Path::new("fonts")) {
        if let Ok(entries) = std::fs::read_dir(&dir) {
            let mut bundled: Vec<PathBuf> = entries
                .filter_map(Result::ok)
                .map(|e| e.path())
                .filter(|p| {
                    p.extension()
                        .and_then(|e| e.to_str())
                        .is_some_and(|e| e.eq_ignore_ascii_case("ttf") || e.eq_ignore_ascii_case("otf"))
                })
                .collect();
            bundled.sort();
            candidates.extend(bundled);
        }
    }

    if cfg!(windows) {
        let fonts = PathBuf::from(r"C:\Windows\Fonts");
        candidates.push(fonts.join("msyh.ttf"));
        candidates.push(fonts.join("malgun.ttf"));
        candidates.push(fonts.join("meiryo.ttf"));
    } else if cfg!(target_os = "macos") {
        candidates.push(PathBuf::from("/System/Library/Fonts/Supplemental/Arial Unicode.ttf"));
        candidates.push(PathBuf::from("/Library/Fonts/Arial Unicode.ttf"));
    } else {
        candidates.push(PathBuf::from("/usr/share/fonts/truetype/noto/NotoSansCJK-Regular.ttf"));
        candidates.push(PathBuf::from("/usr/share/fonts/opentype/noto/NotoSansCJK-Regular.otf"));
        candidates.push(PathBuf::from("/usr/share/fonts/truetype/droid/DroidSansFallbackFull.ttf"));
    }

    let chosen = candidates.into_iter().find_map(|p| {
        let bytes = std::fs::read(&p).ok()?;
        ab_glyph::FontRef::try_from_slice(&bytes).ok()?;
        Some((p, bytes))
    });

    let Some((path, bytes)) = chosen else {
        log::info!("no fallback UI font found, non-Latin labels may not render");
        return;
    };
    log::info!("using UI fallback font {}", path.display());

    let mut fonts = egui::FontDefinitions::default();
    fonts
        .font_data
        .insert("fallback".to_owned(), egui::FontData::from_owned(bytes));
    for family in [egui::FontFamily::Proportional, egui::FontFamily::Monospace] {
        if let Some(list) = fonts.families.get_mut(&family) {
            list.push("fallback".to_owned());
        }
    }
    ctx.set_fonts(fonts);
}
