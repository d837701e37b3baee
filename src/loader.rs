// loader.rs — 后台解码面板图片
//
// 每张图片一个后台线程解码，结果经 mpsc 通道回到主线程，每帧非阻塞地取出。
// 解码失败不会中断程序：记录警告并以占位色贴图代替。

use image::io::Reader as ImageReader;
use image::{GenericImageView, Rgba, RgbaImage};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::thread;

use crate::catalog::Catalog;
use crate::error::GalleryError;

const PLACEHOLDER_SIZE: u32 = 4;

#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub index: usize,
    pub image: RgbaImage,
    pub placeholder: bool,
}

struct Message {
    generation: u64,
    loaded: LoadedImage,
}

pub struct TextureLoader {
    tx: Sender<Message>,
    rx: Receiver<Message>,
    generation: u64,
    pending: usize,
    placeholder_color: [u8; 4],
}

impl TextureLoader {
    pub fn new(placeholder_color: [u8; 4]) -> Self {
        let (tx, rx) = channel();
        Self {
            tx,
            rx,
            generation: 0,
            pending: 0,
            placeholder_color,
        }
    }

    /// Number of requested images not yet delivered.
    pub fn pending(&self) -> usize {
        self.pending
    }

    /// Queue every record of `catalog`. Results of earlier requests are discarded.
    pub fn request_catalog(&mut self, catalog: &Catalog) {
        self.generation += 1;
        self.pending = 0;
        for (index, record) in catalog.iter().enumerate() {
            self.request(index, record.path.clone());
        }
    }

    pub fn request(&mut self, index: usize, path: PathBuf) {
        let tx = self.tx.clone();
        let generation = self.generation;
        let color = self.placeholder_color;
        self.pending += 1;

        thread::spawn(move || {
            log::debug!("loading {:?} in background", path);
            let loaded = match decode_image(&path) {
                Ok(image) => {
                    let (w, h) = image.dimensions();
                    log::info!("loaded {} ({w}x{h})", path.display());
                    LoadedImage {
                        index,
                        image,
                        placeholder: false,
                    }
                }
                Err(e) => {
                    log::warn!("{e}; using placeholder");
                    LoadedImage {
                        index,
                        image: placeholder(color),
                        placeholder: true,
                    }
                }
            };
            if tx.send(Message { generation, loaded }).is_err() {
                log::debug!("loader dropped before {:?} finished", path);
            }
        });
    }

    /// Drain finished loads without blocking.
    pub fn poll(&mut self) -> Vec<LoadedImage> {
        let mut out = Vec::new();
        while let Ok(msg) = self.rx.try_recv() {
            if msg.generation != self.generation {
                continue;
            }
            self.pending = self.pending.saturating_sub(1);
            out.push(msg.loaded);
        }
        out
    }
}

pub fn decode_image(path: &Path) -> Result<RgbaImage, GalleryError> {
    let file = File::open(path).map_err(|e| GalleryError::io(path, e))?;
    let reader = BufReader::new(file);

    let img = ImageReader::new(reader)
        .with_guessed_format()
        .map_err(image::ImageError::IoError)
        .and_then(|mut r| {
            r.no_limits();
            r.decode()
        })
        .map_err(|source| GalleryError::Decode {
            path: path.to_path_buf(),
            source,
        })?;

    let (w, h) = img.dimensions();
    log::debug!("decoded {} as {w}x{h}", path.display());
    Ok(img.to_rgba8())
}

/// Small solid texture standing in for an image that failed to load.
pub fn placeholder(color: [u8; 4]) -> RgbaImage {
    RgbaImage::from_pixel(PLACEHOLDER_SIZE, PLACEHOLDER_SIZE, Rgba(color))
}
