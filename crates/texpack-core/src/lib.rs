//! Core library for texpack: composite a set of images into one fixed-size
//! atlas and describe where each one landed.
//!
//! - Packing: a binary-tree splitter (`packer::btree`), inputs processed in
//!   sorted path order so layouts are reproducible
//! - Pipeline: `pack_images` decodes through an [`ImageCodec`], places and
//!   composites; `pack_to_file` also encodes the canvas
//! - Manifest: serde types plus `build_manifest` / `write_manifest`
//!
//! Quick example:
//! ```ignore
//! use texpack_core::{FileCodec, PackerConfig, pack_to_file, write_manifest};
//! # fn main() -> anyhow::Result<()> {
//! let cfg = PackerConfig::builder()
//!     .with_dimensions(512, 512)
//!     .output_image_path("atlas.png")
//!     .build();
//! let inputs = vec![("icons/a.png", "icons/a.png"), ("icons/b.png", "icons/b.png")];
//! let out = pack_to_file(inputs, &cfg, &FileCodec)?;
//! write_manifest(&out, &cfg)?;
//! println!("{}", out.stats().summary());
//! # Ok(()) }
//! ```

pub mod codec;
pub mod compositing;
pub mod config;
pub mod error;
pub mod export;
pub mod ident;
pub mod image_info;
pub mod model;
pub mod packer;
pub mod pipeline;

pub use codec::*;
pub use config::*;
pub use error::*;
pub use export::*;
pub use ident::image_id;
pub use image_info::*;
pub use model::*;
pub use packer::*;
pub use pipeline::*;

/// Convenience prelude for common types and functions.
/// Importing `texpack_core::prelude::*` brings the primary APIs into scope.
pub mod prelude {
    pub use crate::codec::{FileCodec, ImageCodec, MemoryCodec};
    pub use crate::config::{OversizePolicy, PackerConfig, PackerConfigBuilder, SchemaFormat};
    pub use crate::image_info::{ImageInfo, Placement};
    pub use crate::model::{ItemOutcome, Manifest, ManifestFrame, PackStats, Rect};
    pub use crate::packer::{Packer, btree::BTreePacker};
    pub use crate::{
        PackOutput, build_manifest, pack_images, pack_images_with, pack_to_file, write_manifest,
    };
}
