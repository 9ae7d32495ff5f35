use std::path::{Path, PathBuf};

use image::RgbaImage;
use serde::Serialize;

use crate::codec::ImageCodec;
use crate::error::{PackError, Result};
use crate::ident::image_id;
use crate::model::{ImageKind, ManifestFrame, Rect};

/// Top-left corner of an image's pixel content inside the atlas.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct Placement {
    pub x: u32,
    pub y: u32,
}

/// Per-input metadata: decoded size, identifier and, once packed, placement.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ImageInfo {
    pub id: String,
    pub width: u32,
    pub height: u32,
    pub padding: u32,
    /// `None` until the packing tree accepted this image.
    pub placement: Option<Placement>,
    /// Logical name, used as the manifest key.
    pub name: String,
    pub source: PathBuf,
    pub format: ImageKind,
}

/// A descriptor together with the pixels it was decoded from.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub info: ImageInfo,
    pub pixels: RgbaImage,
}

impl ImageInfo {
    /// Decodes `path` through `codec` and builds its descriptor.
    pub fn load<C: ImageCodec + ?Sized>(
        codec: &C,
        path: &Path,
        name: &str,
        padding: u32,
    ) -> Result<LoadedImage> {
        let format = ImageKind::from_path(path).ok_or_else(|| {
            PackError::decode(
                path,
                format!(
                    "unsupported format: {:?}",
                    path.extension().unwrap_or_default()
                ),
            )
        })?;
        // any codec failure only costs this one input
        let pixels = codec.decode(path).map_err(|e| match e {
            e @ PackError::Decode { .. } => e,
            other => PackError::decode(path, other),
        })?;
        let (width, height) = pixels.dimensions();
        if width == 0 || height == 0 {
            return Err(PackError::decode(path, "decoded image is empty"));
        }
        let info = ImageInfo {
            id: image_id(path),
            width,
            height,
            padding,
            placement: None,
            name: name.to_string(),
            source: path.to_path_buf(),
            format,
        };
        Ok(LoadedImage { info, pixels })
    }

    pub fn padded_width(&self) -> u32 {
        self.width + self.padding * 2
    }

    pub fn padded_height(&self) -> u32 {
        self.height + self.padding * 2
    }

    /// Records the slot returned by the packing tree. Content is drawn inset by
    /// `padding` from the slot's corner.
    pub fn place(&mut self, slot: Rect) {
        debug_assert!(self.placement.is_none(), "{} placed twice", self.name);
        self.placement = Some(Placement {
            x: slot.left + self.padding,
            y: slot.top + self.padding,
        });
    }

    /// Pixel-content rectangle inside the atlas, once placed.
    pub fn content_rect(&self) -> Option<Rect> {
        self.placement
            .map(|p| Rect::from_size(p.x, p.y, self.width, self.height))
    }

    pub fn to_frame(&self) -> Option<ManifestFrame> {
        self.placement.map(|p| ManifestFrame {
            id: self.id.clone(),
            width: self.width,
            height: self.height,
            x: p.x,
            y: p.y,
            name: self.name.clone(),
        })
    }
}
