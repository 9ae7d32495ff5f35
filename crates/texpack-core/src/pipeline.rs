use std::path::PathBuf;

use image::RgbaImage;
use tracing::{debug, info, instrument, warn};

use crate::codec::ImageCodec;
use crate::compositing::blit_rgba;
use crate::config::{OversizePolicy, PackerConfig};
use crate::error::{PackError, Result};
use crate::image_info::{ImageInfo, LoadedImage};
use crate::model::{ItemOutcome, PackStats};
use crate::packer::{Packer, btree::BTreePacker};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Result of a packing run: the composited canvas and what went into it.
pub struct PackOutput {
    pub canvas: RgbaImage,
    /// Placed descriptors, in placement order.
    pub placed: Vec<ImageInfo>,
    /// One entry per distinct input, in processing order.
    pub outcomes: Vec<ItemOutcome>,
}

impl PackOutput {
    pub fn stats(&self) -> PackStats {
        let (w, h) = self.canvas.dimensions();
        PackStats::from_outcomes(&self.outcomes, w, h)
    }
}

/// Packs `inputs` (source path -> logical name) into one canvas.
///
/// Paths are processed in ascending byte order regardless of the order they
/// arrive in; that order alone decides the layout. Nothing is written to disk.
pub fn pack_images<I, P, S, C>(inputs: I, cfg: &PackerConfig, codec: &C) -> Result<PackOutput>
where
    I: IntoIterator<Item = (P, S)>,
    P: Into<PathBuf>,
    S: Into<String>,
    C: ImageCodec + ?Sized,
{
    pack_images_with(inputs, cfg, codec, |_| {})
}

/// Like [`pack_images`], reporting every per-input outcome to `on_item` as it
/// happens (progress bars, logs).
#[instrument(skip_all)]
pub fn pack_images_with<I, P, S, C, F>(
    inputs: I,
    cfg: &PackerConfig,
    codec: &C,
    mut on_item: F,
) -> Result<PackOutput>
where
    I: IntoIterator<Item = (P, S)>,
    P: Into<PathBuf>,
    S: Into<String>,
    C: ImageCodec + ?Sized,
    F: FnMut(&ItemOutcome),
{
    cfg.validate()?;

    let sorted = sorted_inputs(inputs);
    if sorted.is_empty() {
        return Err(PackError::Empty);
    }
    if !cfg.is_power_of_two() {
        warn!(width = cfg.width, height = cfg.height, "output size is not a power of two");
    }

    let mut canvas = RgbaImage::new(cfg.width, cfg.height);
    let mut tree = BTreePacker::new(cfg.width, cfg.height);
    let mut placed = Vec::new();
    let mut outcomes = Vec::with_capacity(sorted.len());

    let mut prefetched = prefetch(&sorted, cfg, codec).map(Vec::into_iter);

    for (path, name) in &sorted {
        let loaded = match prefetched.as_mut().and_then(Iterator::next) {
            Some(r) => r,
            None => ImageInfo::load(codec, path, name, cfg.padding),
        };
        let outcome = match loaded {
            Ok(loaded) => place_one(loaded, cfg, &mut tree, &mut canvas, &mut placed)?,
            Err(PackError::Decode { path, reason }) => {
                warn!(path = %path.display(), %reason, "skip undecodable image");
                ItemOutcome::DecodeFailed { path, reason }
            }
            Err(e) => return Err(e),
        };
        on_item(&outcome);
        outcomes.push(outcome);
    }

    if !outcomes.iter().any(|o| !matches!(o, ItemOutcome::DecodeFailed { .. })) {
        return Err(PackError::Scan("no usable input images".into()));
    }

    let out = PackOutput {
        canvas,
        placed,
        outcomes,
    };
    info!(summary = %out.stats().summary(), "packing done");
    Ok(out)
}

/// Packs and encodes the canvas to `cfg.output_image_path`.
pub fn pack_to_file<I, P, S, C>(inputs: I, cfg: &PackerConfig, codec: &C) -> Result<PackOutput>
where
    I: IntoIterator<Item = (P, S)>,
    P: Into<PathBuf>,
    S: Into<String>,
    C: ImageCodec + ?Sized,
{
    pack_to_file_with(inputs, cfg, codec, |_| {})
}

pub fn pack_to_file_with<I, P, S, C, F>(
    inputs: I,
    cfg: &PackerConfig,
    codec: &C,
    on_item: F,
) -> Result<PackOutput>
where
    I: IntoIterator<Item = (P, S)>,
    P: Into<PathBuf>,
    S: Into<String>,
    C: ImageCodec + ?Sized,
    F: FnMut(&ItemOutcome),
{
    let out = pack_images_with(inputs, cfg, codec, on_item)?;
    codec.encode(&out.canvas, &cfg.output_image_path, cfg.quality)?;
    info!(path = %cfg.output_image_path.display(), "atlas written");
    Ok(out)
}

fn place_one(
    mut loaded: LoadedImage,
    cfg: &PackerConfig,
    tree: &mut BTreePacker,
    canvas: &mut RgbaImage,
    placed: &mut Vec<ImageInfo>,
) -> Result<ItemOutcome> {
    let (w, h) = (loaded.info.padded_width(), loaded.info.padded_height());
    match tree.pack(w, h) {
        Some(slot) => {
            loaded.info.place(slot);
            blit_rgba(
                &loaded.pixels,
                canvas,
                slot.left + cfg.padding,
                slot.top + cfg.padding,
            );
            debug!(name = %loaded.info.name, id = %loaded.info.id, ?slot, "packed");
            let outcome = ItemOutcome::Placed {
                path: loaded.info.source.clone(),
                id: loaded.info.id.clone(),
                slot,
            };
            placed.push(loaded.info);
            Ok(outcome)
        }
        None => match cfg.oversize {
            OversizePolicy::Drop => {
                warn!(path = %loaded.info.source.display(), width = w, height = h, "ignore oversize image");
                Ok(ItemOutcome::Dropped {
                    path: loaded.info.source,
                    width: w,
                    height: h,
                })
            }
            OversizePolicy::Abort => Err(PackError::NoFit {
                path: loaded.info.source,
                width: w,
                height: h,
            }),
        },
    }
}

/// Sorts by the raw path bytes (plain string order, not per-component) and
/// keeps the first name given for a repeated path.
fn sorted_inputs<I, P, S>(inputs: I) -> Vec<(PathBuf, String)>
where
    I: IntoIterator<Item = (P, S)>,
    P: Into<PathBuf>,
    S: Into<String>,
{
    let mut list: Vec<(PathBuf, String)> = inputs
        .into_iter()
        .map(|(p, n)| (p.into(), n.into()))
        .collect();
    list.sort_by(|a, b| {
        a.0.as_os_str()
            .as_encoded_bytes()
            .cmp(b.0.as_os_str().as_encoded_bytes())
    });
    list.dedup_by(|b, a| a.0 == b.0);
    list
}

#[cfg(feature = "parallel")]
fn prefetch<C: ImageCodec + ?Sized>(
    sorted: &[(PathBuf, String)],
    cfg: &PackerConfig,
    codec: &C,
) -> Option<Vec<Result<LoadedImage>>> {
    if !cfg.parallel {
        return None;
    }
    debug!(count = sorted.len(), "decoding inputs in parallel");
    Some(
        sorted
            .par_iter()
            .map(|(path, name)| ImageInfo::load(codec, path, name, cfg.padding))
            .collect(),
    )
}

#[cfg(not(feature = "parallel"))]
fn prefetch<C: ImageCodec + ?Sized>(
    _sorted: &[(PathBuf, String)],
    cfg: &PackerConfig,
    _codec: &C,
) -> Option<Vec<Result<LoadedImage>>> {
    if cfg.parallel {
        debug!("parallel decode requested but the `parallel` feature is off");
    }
    None
}
