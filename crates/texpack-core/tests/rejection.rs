use image::RgbaImage;
use std::path::{Path, PathBuf};
use texpack_core::prelude::*;
use texpack_core::PackError;

fn two_squares() -> (MemoryCodec, Vec<(&'static str, &'static str)>) {
    let codec = MemoryCodec::new()
        .with("/in/a.png", RgbaImage::new(60, 60))
        .with("/in/b.png", RgbaImage::new(60, 60));
    (codec, vec![("/in/b.png", "b"), ("/in/a.png", "a")])
}

fn cfg(drop: bool) -> PackerConfig {
    PackerConfig::builder()
        .with_dimensions(100, 100)
        .padding(0)
        .ignore_large_image(drop)
        .build()
}

#[test]
fn drop_policy_keeps_going_without_the_second_square() {
    let (codec, inputs) = two_squares();
    let out = pack_images(inputs, &cfg(true), &codec).expect("pack");
    assert_eq!(out.placed.len(), 1);
    assert_eq!(out.placed[0].name, "a");
    assert_eq!(
        out.outcomes[1],
        ItemOutcome::Dropped {
            path: "/in/b.png".into(),
            width: 60,
            height: 60
        }
    );
    let stats = out.stats();
    assert_eq!((stats.placed, stats.dropped), (1, 1));
}

#[test]
fn abort_policy_fails_on_the_second_square() {
    let (codec, inputs) = two_squares();
    match pack_images(inputs, &cfg(false), &codec) {
        Err(PackError::NoFit {
            path,
            width,
            height,
        }) => {
            assert_eq!(path, Path::new("/in/b.png"));
            assert_eq!((width, height), (60, 60));
        }
        Err(e) => panic!("unexpected error: {e}"),
        Ok(_) => panic!("expected NoFit"),
    }
}

// B is smaller than the canvas; it only misses because A fragmented the free
// space. Dropping it here means the drop policy covers every placement
// failure, not just images larger than the whole atlas.
#[test]
fn drop_policy_covers_fragmentation_as_well_as_oversize() {
    let (codec, _) = two_squares();
    let codec = codec.with("/in/c.png", RgbaImage::new(101, 1));
    let inputs = vec![("/in/a.png", "a"), ("/in/b.png", "b"), ("/in/c.png", "c")];
    let out = pack_images(inputs, &cfg(true), &codec).expect("pack");
    let dropped: Vec<_> = out
        .outcomes
        .iter()
        .filter(|o| matches!(o, ItemOutcome::Dropped { .. }))
        .map(|o| o.path().to_path_buf())
        .collect();
    assert_eq!(
        dropped,
        vec![PathBuf::from("/in/b.png"), PathBuf::from("/in/c.png")]
    );
}

#[test]
fn padding_counts_towards_the_fit() {
    let codec = MemoryCodec::new().with("/in/a.png", RgbaImage::new(100, 100));
    let cfg = PackerConfig::builder()
        .with_dimensions(100, 100)
        .padding(1)
        .build();
    assert!(matches!(
        pack_images(vec![("/in/a.png", "a")], &cfg, &codec),
        Err(PackError::NoFit { width: 102, height: 102, .. })
    ));
}

#[test]
fn undecodable_inputs_are_skipped() {
    let codec = MemoryCodec::new().with("/in/ok.png", RgbaImage::new(4, 4));
    let inputs = vec![("/in/missing.png", "missing"), ("/in/ok.png", "ok"), ("/in/x.tga", "x")];
    let out = pack_images(inputs, &cfg(false), &codec).expect("pack");
    assert_eq!(out.placed.len(), 1);
    let stats = out.stats();
    assert_eq!((stats.placed, stats.decode_failed), (1, 2));
}

#[test]
fn empty_and_fully_undecodable_runs_fail() {
    let codec = MemoryCodec::new();
    let none: Vec<(&str, &str)> = Vec::new();
    assert!(matches!(pack_images(none, &cfg(false), &codec), Err(PackError::Empty)));
    assert!(matches!(
        pack_images(vec![("/in/gone.png", "gone")], &cfg(false), &codec),
        Err(PackError::Scan(_))
    ));
}

/// Serves `/in/ok.png` and fails every other path with an I/O error.
struct FlakyDisk {
    ok: RgbaImage,
}

impl ImageCodec for FlakyDisk {
    fn decode(&self, path: &Path) -> texpack_core::Result<RgbaImage> {
        if path == Path::new("/in/ok.png") {
            return Ok(self.ok.clone());
        }
        Err(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read refused").into())
    }

    fn encode(&self, _: &RgbaImage, _: &Path, _: u8) -> texpack_core::Result<()> {
        Ok(())
    }
}

#[test]
fn any_codec_error_is_recorded_as_undecodable() {
    let codec = FlakyDisk {
        ok: RgbaImage::new(4, 4),
    };
    let inputs = vec![("/in/locked.png", "locked"), ("/in/ok.png", "ok")];
    let out = pack_images(inputs, &cfg(false), &codec).expect("pack");
    assert_eq!(out.placed.len(), 1);
    match &out.outcomes[0] {
        ItemOutcome::DecodeFailed { path, reason } => {
            assert_eq!(path, Path::new("/in/locked.png"));
            assert!(reason.contains("read refused"), "{reason}");
        }
        other => panic!("unexpected outcome {other:?}"),
    }
}
