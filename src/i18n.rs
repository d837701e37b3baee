// i18n.rs
//
// Lightweight runtime i18n:
// - Strings live in either:
//   A) assets/i18n/<lang>.json
//   B) assets/i18n.json (single file, format: { "<lang>": { "key": "value" } })
// - Lookup order: selected lang -> built-in English -> the key itself
// - tr("key") / tr_with("key", &[("name", "...")]) with {name} placeholders
//
// Language selection happens in config::LaunchOptions (--lang / GALLERY_LANG, default en).

use once_cell::sync::OnceCell;
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::RwLock,
};

use crate::config::find_asset;

const BUILTIN_EN: &[(&str, &str)] = &[
    ("app.title", "Image Gallery"),
    ("menu.file", "File"),
    ("menu.open_catalog", "Open catalog…"),
    ("menu.exit", "Exit"),
    ("menu.view", "View"),
    ("menu.language", "Language"),
    ("view.reset", "Reset view"),
    ("view.fullscreen.enter", "Enter fullscreen"),
    ("view.fullscreen.exit", "Exit fullscreen"),
    ("view.show_fps", "Show FPS"),
    ("file.filter.catalog", "Gallery catalog"),
    ("popup.previous", "◀ Previous"),
    ("popup.next", "Next ▶"),
    ("popup.close", "Close"),
    ("popup.counter", "{current} / {total}"),
    ("popup.loading", "Loading image…"),
    ("status.zoom", "Zoom"),
    ("status.offset", "Offset"),
    ("status.camera", "Camera"),
    ("status.items", "{count} images"),
    ("status.loading", "Loading {count} images…"),
    ("status.empty", "The catalog is empty"),
    ("error.open_catalog", "Could not open catalog: {err}"),
];

#[derive(Debug, Clone)]
pub struct I18n {
    map: HashMap<String, String>,
}

static I18N: OnceCell<RwLock<I18n>> = OnceCell::new();

fn load_json_map(path: &Path) -> Option<HashMap<String, String>> {
    let text = std::fs::read_to_string(path).ok()?;
    match serde_json::from_str(&text) {
        Ok(map) => Some(map),
        Err(e) => {
            log::warn!("ignoring {}: {e}", path.display());
            None
        }
    }
}

fn load_multi_lang_json(path: &Path, lang: &str) -> Option<HashMap<String, String>> {
    let text = std::fs::read_to_string(path).ok()?;
    let mut all: HashMap<String, HashMap<String, String>> = serde_json::from_str(&text).ok()?;
    all.remove(lang)
}

fn load_lang(lang: &str) -> HashMap<String, String> {
    let per_lang = PathBuf::from("i18n").join(format!("{lang}.json"));
    if let Some(m) = find_asset(&per_lang).and_then(|p| load_json_map(&p)) {
        return m;
    }

    if let Some(m) = find_asset(Path::new("i18n.json")).and_then(|p| load_multi_lang_json(&p, lang)) {
        return m;
    }

    if lang != "en" {
        log::info!("no strings for language {lang:?}, using English");
    }
    HashMap::new()
}

/// Initialize global i18n. Safe to call multiple times; later calls replace the current language.
pub fn init(lang: impl Into<String>) {
    let lang = lang.into();
    let i = I18n {
        map: load_lang(&lang),
    };

    if let Some(lock) = I18N.get() {
        if let Ok(mut w) = lock.write() {
            *w = i;
        }
    } else {
        let _ = I18N.set(RwLock::new(i));
    }
}

fn builtin(key: &str) -> Option<&'static str> {
    BUILTIN_EN.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
}

/// Get localized text by key. If key missing everywhere, returns key itself.
pub fn tr(key: &str) -> String {
    let loaded = I18N
        .get()
        .and_then(|l| l.read().ok())
        .and_then(|i| i.map.get(key).cloned());

    loaded
        .or_else(|| builtin(key).map(str::to_string))
        .unwrap_or_else(|| key.to_string())
}

/// Get localized text and substitute `{name}` placeholders.
/// Any placeholder not provided is kept as-is.
pub fn tr_with(key: &str, args: &[(&str, String)]) -> String {
    let mut s = tr(key);
    for (k, v) in args {
        let placeholder = format!("{{{}}}", k);
        s = s.replace(&placeholder, v);
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falls_back_to_builtin_then_key() {
        assert_eq!(tr("popup.close"), "Close");
        assert_eq!(tr("no.such.key"), "no.such.key");
    }

    #[test]
    fn substitutes_placeholders() {
        let s = tr_with(
            "popup.counter",
            &[("current", "2".to_string()), ("total", "6".to_string())],
        );
        assert_eq!(s, "2 / 6");
        assert_eq!(tr_with("status.items", &[]), "{count} images");
    }
}
