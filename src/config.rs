// config.rs — 可调参数、启动参数与资源查找
//
// 所有调参集中在 GalleryConfig，由 main 创建后按需传给各个组件，不使用模块级全局变量。
// 加载顺序：--config <path> -> GALLERY_CONFIG -> assets/gallery.json -> 内置默认值

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::GalleryError;

/// Error path reported for JSON that did not come from a file.
pub const INLINE_SOURCE: &str = "<inline>";

/// Zoom range. Larger level = further out, so `max` (full zoom-in) is
/// numerically smaller than `min` (full zoom-out).
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct ZoomConfig {
    pub initial: f32,
    pub min: f32,
    pub max: f32,
}

impl Default for ZoomConfig {
    fn default() -> Self {
        Self {
            initial: 10.0,
            min: 15.0,
            max: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct PanConfig {
    /// Zoom levels below this use `zoomed_in_speed`.
    pub zoomed_in_threshold: f32,
    pub zoomed_in_speed: f32,
    pub base_speed: f32,
    /// Conversion from accumulated pan offset (pixels) to world units.
    pub world_units_per_pixel: f32,
}

impl Default for PanConfig {
    fn default() -> Self {
        Self {
            zoomed_in_threshold: 5.0,
            zoomed_in_speed: 3.0,
            base_speed: 2.5,
            world_units_per_pixel: 0.01,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct KeyPanConfig {
    /// World distance added to the target per key press.
    pub step: f32,
    /// Fraction of the remaining distance covered per 60 Hz frame.
    pub smoothing: f32,
    pub tolerance: f32,
}

impl Default for KeyPanConfig {
    fn default() -> Self {
        Self {
            step: 1.0,
            smoothing: 0.1,
            tolerance: 0.01,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct PopupConfig {
    pub initial_scale: f32,
    pub easing: f32,
    pub tolerance: f32,
}

impl Default for PopupConfig {
    fn default() -> Self {
        Self {
            initial_scale: 0.7,
            easing: 0.15,
            tolerance: 0.01,
        }
    }
}

/// Panel quad size in world units.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct PanelConfig {
    pub width: f32,
    pub height: f32,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            width: 3.0,
            height: 2.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GalleryConfig {
    pub zoom: ZoomConfig,
    pub pan: PanConfig,
    pub key_pan: KeyPanConfig,
    pub popup: PopupConfig,
    pub panel: PanelConfig,
    /// 贴图加载失败时使用的占位颜色 (RGBA)
    pub placeholder_color: [u8; 4],
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            zoom: ZoomConfig::default(),
            pan: PanConfig::default(),
            key_pan: KeyPanConfig::default(),
            popup: PopupConfig::default(),
            panel: PanelConfig::default(),
            placeholder_color: [72, 72, 84, 255],
        }
    }
}

impl GalleryConfig {
    pub fn from_json(text: &str) -> Result<Self, GalleryError> {
        Self::parse(text, Path::new(INLINE_SOURCE))
    }

    pub fn load(path: &Path) -> Result<Self, GalleryError> {
        let text = std::fs::read_to_string(path).map_err(|e| GalleryError::io(path, e))?;
        Self::parse(&text, path)
    }

    fn parse(text: &str, origin: &Path) -> Result<Self, GalleryError> {
        let config: GalleryConfig =
            serde_json::from_str(text).map_err(|e| GalleryError::json(origin, e))?;
        Ok(config.sanitized())
    }

    /// Pick the first available config source, falling back to defaults.
    pub fn resolve(options: &LaunchOptions) -> Self {
        let path = options
            .config
            .clone()
            .or_else(|| env_path("GALLERY_CONFIG"))
            .or_else(|| find_asset(Path::new("gallery.json")));

        let Some(path) = path else {
            log::info!("no config file found, using defaults");
            return Self::default();
        };

        match Self::load(&path) {
            Ok(config) => {
                log::info!("config loaded from {}", path.display());
                config
            }
            Err(e) => {
                log::warn!("{e}; using default config");
                Self::default()
            }
        }
    }

    /// Repair values that would break the state machines' invariants.
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();

        if self.zoom.max > self.zoom.min {
            log::warn!(
                "zoom.max ({}) is larger than zoom.min ({}), swapping",
                self.zoom.max,
                self.zoom.min
            );
            std::mem::swap(&mut self.zoom.max, &mut self.zoom.min);
        }
        let clamped = self.zoom.initial.clamp(self.zoom.max, self.zoom.min);
        if clamped != self.zoom.initial {
            log::warn!("zoom.initial {} clamped to {}", self.zoom.initial, clamped);
            self.zoom.initial = clamped;
        }

        self.key_pan.smoothing = unit_fraction(self.key_pan.smoothing, defaults.key_pan.smoothing);
        self.key_pan.tolerance = positive(self.key_pan.tolerance, defaults.key_pan.tolerance);

        self.popup.easing = unit_fraction(self.popup.easing, defaults.popup.easing);
        self.popup.tolerance = positive(self.popup.tolerance, defaults.popup.tolerance);
        self.popup.initial_scale = self.popup.initial_scale.clamp(0.05, 1.0);

        self.panel.width = positive(self.panel.width, defaults.panel.width);
        self.panel.height = positive(self.panel.height, defaults.panel.height);

        self
    }
}

fn unit_fraction(value: f32, fallback: f32) -> f32 {
    if value > 0.0 && value <= 1.0 {
        value
    } else {
        fallback
    }
}

fn positive(value: f32, fallback: f32) -> f32 {
    if value > 0.0 {
        value
    } else {
        fallback
    }
}

/// Command line / environment launch options.
///
/// - `--lang <code>` / `GALLERY_LANG`
/// - `--config <path>` / `GALLERY_CONFIG`
/// - `--catalog <path>` / `GALLERY_CATALOG`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LaunchOptions {
    pub lang: String,
    pub config: Option<PathBuf>,
    pub catalog: Option<PathBuf>,
}

impl LaunchOptions {
    pub fn from_env() -> Self {
        let mut options = Self::from_args(std::env::args().skip(1));
        if options.lang.is_empty() {
            options.lang = std::env::var("GALLERY_LANG")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| "en".to_string());
        }
        options
    }

    /// Parses flags only; `lang` stays empty when not given on the command line.
    pub fn from_args(args: impl IntoIterator<Item = String>) -> Self {
        let mut options = Self::default();
        let mut it = args.into_iter();
        while let Some(a) = it.next() {
            match a.as_str() {
                "--lang" => {
                    if let Some(v) = it.next() {
                        options.lang = v;
                    }
                }
                "--config" => options.config = it.next().map(PathBuf::from),
                "--catalog" => options.catalog = it.next().map(PathBuf::from),
                other => log::warn!("ignoring unknown argument {other:?}"),
            }
        }
        options
    }
}

pub fn env_path(var: &str) -> Option<PathBuf> {
    std::env::var(var)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from)
}

/// Find `assets/<relative>` by searching:
/// 1) <exe_dir>/assets/<relative>
/// 2) ./assets/<relative>  (dev working dir)
pub fn find_asset(relative: &Path) -> Option<PathBuf> {
    if let Ok(exe) = std::env::current_exe() {
        if let Some(dir) = exe.parent() {
            let p = dir.join("assets").join(relative);
            if p.exists() {
                return Some(p);
            }
        }
    }

    let p = PathBuf::from("assets").join(relative);
    if p.exists() {
        return Some(p);
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config = GalleryConfig::from_json(r#"{ "zoom": { "min": 20.0 } }"#).unwrap();
        assert_eq!(config.zoom.min, 20.0);
        assert_eq!(config.zoom.max, 1.0);
        assert_eq!(config.popup, PopupConfig::default());
    }

    #[test]
    fn inverted_zoom_range_is_swapped() {
        let config =
            GalleryConfig::from_json(r#"{ "zoom": { "initial": 3.0, "min": 2.0, "max": 8.0 } }"#)
                .unwrap();
        assert_eq!(config.zoom.max, 2.0);
        assert_eq!(config.zoom.min, 8.0);
        assert_eq!(config.zoom.initial, 3.0);
    }

    #[test]
    fn initial_zoom_is_clamped_into_range() {
        let config = GalleryConfig::from_json(r#"{ "zoom": { "initial": 40.0 } }"#).unwrap();
        assert_eq!(config.zoom.initial, 15.0);
    }

    #[test]
    fn bad_fractions_fall_back() {
        let config = GalleryConfig::from_json(
            r#"{ "key_pan": { "smoothing": 0.0, "tolerance": -1.0 }, "popup": { "easing": 2.0 } }"#,
        )
        .unwrap();
        assert_eq!(config.key_pan.smoothing, 0.1);
        assert_eq!(config.key_pan.tolerance, 0.01);
        assert_eq!(config.popup.easing, 0.15);
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(matches!(
            GalleryConfig::from_json("{ zoom"),
            Err(GalleryError::Json { ref path, .. }) if path.as_path() == Path::new(INLINE_SOURCE)
        ));
    }

    #[test]
    fn malformed_file_error_names_the_file() {
        let file = std::env::temp_dir().join(format!("gallery_config_{}.json", std::process::id()));
        std::fs::write(&file, "{ zoom").unwrap();

        let err = GalleryConfig::load(&file).unwrap_err();
        assert!(matches!(err, GalleryError::Json { ref path, .. } if *path == file));
        assert!(err.to_string().contains(&file.display().to_string()));

        std::fs::remove_file(&file).unwrap();
    }

    #[test]
    fn parses_launch_flags() {
        let args = ["--lang", "ja", "--catalog", "shots/catalog.json", "--config", "g.json"]
            .map(String::from);
        let options = LaunchOptions::from_args(args);
        assert_eq!(options.lang, "ja");
        assert_eq!(options.catalog, Some(PathBuf::from("shots/catalog.json")));
        assert_eq!(options.config, Some(PathBuf::from("g.json")));
    }
}
