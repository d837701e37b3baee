// catalog.rs — 图片目录（只读）
//
// 目录文件格式（JSON 数组）：
// [ { "id": 1, "path": "images/a.jpg", "position": [0, 0, 0], "title": "...", "description": "..." } ]
// 相对路径以目录文件所在文件夹为基准。

use glam::Vec3;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::config::{env_path, find_asset, LaunchOptions, INLINE_SOURCE};
use crate::error::GalleryError;

pub type ImageId = u32;

/// Shown in the popup when a record carries no description.
pub const NO_DESCRIPTION: &str = "No description available.";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ImageRecord {
    pub id: ImageId,
    pub path: PathBuf,
    pub position: [f32; 3],
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl ImageRecord {
    pub fn position(&self) -> Vec3 {
        Vec3::from_array(self.position)
    }
}

/// Ordered, immutable list of image records.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    records: Vec<ImageRecord>,
}

impl Catalog {
    pub fn new(records: Vec<ImageRecord>) -> Result<Self, GalleryError> {
        let mut seen = HashSet::with_capacity(records.len());
        for r in &records {
            if !seen.insert(r.id) {
                return Err(GalleryError::DuplicateId(r.id));
            }
            if r.path.as_os_str().is_empty() {
                return Err(GalleryError::EmptyPath(r.id));
            }
        }
        Ok(Self { records })
    }

    pub fn from_json(text: &str) -> Result<Self, GalleryError> {
        Self::parse(text, Path::new(INLINE_SOURCE))
    }

    fn parse(text: &str, origin: &Path) -> Result<Self, GalleryError> {
        let records: Vec<ImageRecord> =
            serde_json::from_str(text).map_err(|e| GalleryError::json(origin, e))?;
        Self::new(records)
    }

    pub fn load(path: &Path) -> Result<Self, GalleryError> {
        let text = std::fs::read_to_string(path).map_err(|e| GalleryError::io(path, e))?;
        let mut catalog = Self::parse(&text, path)?;
        if let Some(base) = path.parent() {
            for r in &mut catalog.records {
                if r.path.is_relative() {
                    r.path = base.join(&r.path);
                }
            }
        }
        Ok(catalog)
    }

    /// Pick the first available catalog source, falling back to the demo set.
    pub fn resolve(options: &LaunchOptions) -> Self {
        let path = options
            .catalog
            .clone()
            .or_else(|| env_path("GALLERY_CATALOG"))
            .or_else(|| find_asset(Path::new("catalog.json")));

        let Some(path) = path else {
            log::info!("no catalog file found, using demo catalog");
            return Self::demo();
        };

        match Self::load(&path) {
            Ok(catalog) => {
                log::info!("loaded {} images from {}", catalog.len(), path.display());
                catalog
            }
            Err(e) => {
                log::warn!("{e}; using demo catalog");
                Self::demo()
            }
        }
    }

    /// Six panels on a 3x2 wall. Image files are looked up under `assets/images`;
    /// missing ones render as placeholders.
    pub fn demo() -> Self {
        let entries: [(&str, [f32; 3], &str, Option<&str>); 6] = [
            (
                "harbor.jpg",
                [-4.0, 1.5, 0.0],
                "Harbor at Dawn",
                Some("Fishing boats waiting for the tide, shot from the old pier."),
            ),
            (
                "ridge.jpg",
                [0.0, 1.5, 0.0],
                "Ridge Line",
                Some("Late snow on the northern ridge after a three day storm."),
            ),
            (
                "market.jpg",
                [4.0, 1.5, 0.0],
                "Night Market",
                Some("Lanterns and steam over the food stalls on a Friday night."),
            ),
            ("station.jpg", [-4.0, -1.5, 0.0], "Station Hall", None),
            (
                "orchard.jpg",
                [0.0, -1.5, 0.0],
                "Orchard",
                Some("Apple blossom in the last week of April."),
            ),
            (
                "lighthouse.jpg",
                [4.0, -1.5, 0.0],
                "Lighthouse",
                Some("The keeper's house has been empty since 1962."),
            ),
        ];

        let base = find_asset(Path::new("images")).unwrap_or_else(|| PathBuf::from("assets/images"));
        let records = entries
            .into_iter()
            .zip(1..)
            .map(|((file, position, title, description), id)| ImageRecord {
                id,
                path: base.join(file),
                position,
                title: title.to_string(),
                description: description.map(str::to_string),
            })
            .collect();

        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ImageRecord> {
        self.records.get(index)
    }

    pub fn index_of(&self, id: ImageId) -> Option<usize> {
        self.records.iter().position(|r| r.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ImageRecord> {
        self.records.iter()
    }

    /// Description text for the popup, or [`NO_DESCRIPTION`].
    pub fn description(&self, index: usize) -> &str {
        self.records
            .get(index)
            .and_then(|r| r.description.as_deref())
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .unwrap_or(NO_DESCRIPTION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"[
        { "id": 7, "path": "a.png", "position": [0, 0, 0], "title": "A", "description": "first" },
        { "id": 3, "path": "b.png", "position": [1, 2, 3], "title": "B" },
        { "id": 9, "path": "c.png", "position": [2, 0, -1], "title": "C", "description": "   " }
    ]"#;

    #[test]
    fn parses_records_in_order() {
        let catalog = Catalog::from_json(SAMPLE).unwrap();
        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.get(1).unwrap().title, "B");
        assert_eq!(catalog.get(1).unwrap().position(), Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(catalog.index_of(9), Some(2));
        assert_eq!(catalog.index_of(4), None);
    }

    #[test]
    fn description_falls_back_when_missing_or_blank() {
        let catalog = Catalog::from_json(SAMPLE).unwrap();
        assert_eq!(catalog.description(0), "first");
        assert_eq!(catalog.description(1), NO_DESCRIPTION);
        assert_eq!(catalog.description(2), NO_DESCRIPTION);
        assert_eq!(catalog.description(42), NO_DESCRIPTION);
    }

    #[test]
    fn rejects_duplicate_ids() {
        let text = r#"[
            { "id": 1, "path": "a.png", "position": [0, 0, 0], "title": "A" },
            { "id": 1, "path": "b.png", "position": [0, 0, 0], "title": "B" }
        ]"#;
        assert!(matches!(Catalog::from_json(text), Err(GalleryError::DuplicateId(1))));
    }

    #[test]
    fn rejects_empty_path() {
        let text = r#"[ { "id": 5, "path": "", "position": [0, 0, 0], "title": "A" } ]"#;
        assert!(matches!(Catalog::from_json(text), Err(GalleryError::EmptyPath(5))));
    }

    #[test]
    fn load_resolves_paths_against_catalog_dir() {
        let dir = std::env::temp_dir().join(format!("gallery_catalog_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let file = dir.join("catalog.json");
        std::fs::write(&file, SAMPLE).unwrap();

        let catalog = Catalog::load(&file).unwrap();
        assert_eq!(catalog.get(0).unwrap().path, dir.join("a.png"));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn load_reports_missing_file() {
        let err = Catalog::load(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, GalleryError::Io { .. }));
    }

    #[test]
    fn load_reports_which_file_is_malformed() {
        let file = std::env::temp_dir().join(format!("gallery_bad_catalog_{}.json", std::process::id()));
        std::fs::write(&file, "[ { \"id\": 1, ").unwrap();

        let err = Catalog::load(&file).unwrap_err();
        assert!(matches!(err, GalleryError::Json { ref path, .. } if *path == file));

        std::fs::remove_file(&file).unwrap();
    }

    #[test]
    fn demo_catalog_is_valid() {
        let demo = Catalog::demo();
        assert_eq!(demo.len(), 6);
        assert!(Catalog::new(demo.iter().cloned().collect()).is_ok());
        assert_eq!(demo.description(3), NO_DESCRIPTION);
    }
}
