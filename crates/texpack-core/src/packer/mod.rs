use crate::model::Rect;

pub mod btree;

/// A packer places padded rectangles into a fixed-size canvas.
///
/// Implementations must never hand out overlapping slots, and every slot must
/// lie inside the canvas. `pack` returns `None` when there is no room; that is
/// a normal answer, not an error.
pub trait Packer {
    fn can_pack(&self, w: u32, h: u32) -> bool;
    fn pack(&mut self, w: u32, h: u32) -> Option<Rect>;
}
