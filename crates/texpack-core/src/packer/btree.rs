//! Binary space-partition packer.
//!
//! Every leaf is a free rectangle. Placing an image at a leaf's top-left corner
//! shrinks the leaf to the image and hangs two children below it: the strip to
//! the right of the image (image height) and the strip below it (full width of
//! the old leaf). Searches always try `right` before `down`, which together
//! with a fixed input order makes layouts reproducible.

use super::Packer;
use crate::model::Rect;

/// Index of a node in the packer's arena.
pub type NodeId = usize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub rect: Rect,
    pub used: bool,
    /// `(right, down)`; either both present or neither.
    pub children: Option<(NodeId, NodeId)>,
}

impl Node {
    fn leaf(rect: Rect) -> Self {
        Self {
            rect,
            used: false,
            children: None,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }
}

/// Arena-backed packing tree for one run. Dropping it frees every node at once.
#[derive(Debug, Clone)]
pub struct BTreePacker {
    nodes: Vec<Node>,
}

impl BTreePacker {
    pub const ROOT: NodeId = 0;

    pub fn new(width: u32, height: u32) -> Self {
        Self {
            nodes: vec![Node::leaf(Rect::new(0, 0, width, height))],
        }
    }

    pub fn root(&self) -> &Node {
        &self.nodes[Self::ROOT]
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Slots handed out so far, in arena order.
    pub fn placements(&self) -> impl Iterator<Item = Rect> + '_ {
        self.nodes.iter().filter(|n| n.used).map(|n| n.rect)
    }

    /// Places a `w`x`h` box (padding already included) and returns its slot.
    pub fn insert(&mut self, w: u32, h: u32) -> Option<Rect> {
        let id = self.find(w, h)?;
        Some(self.occupy(id, w, h))
    }

    /// Finds the first free leaf able to hold `w`x`h`, walking right before down.
    ///
    /// Depth-first with an explicit stack; `down` is pushed first so `right` is
    /// popped first, giving the same visiting order as the recursive walk.
    fn find(&self, w: u32, h: u32) -> Option<NodeId> {
        let mut stack = vec![Self::ROOT];
        while let Some(id) = stack.pop() {
            let node = &self.nodes[id];
            match node.children {
                Some((right, down)) => {
                    stack.push(down);
                    stack.push(right);
                }
                None => {
                    if !node.used && node.rect.fits(w, h) {
                        return Some(id);
                    }
                }
            }
        }
        None
    }

    fn occupy(&mut self, id: NodeId, w: u32, h: u32) -> Rect {
        let rect = self.nodes[id].rect;
        self.nodes[id].used = true;
        if rect.width() == w && rect.height() == h {
            // exact fit stays a leaf
            return rect;
        }

        let placed = Rect::from_size(rect.left, rect.top, w, h);
        let right = Rect::new(placed.right, rect.top, rect.right, placed.bottom);
        let down = Rect::new(rect.left, placed.bottom, rect.right, rect.bottom);

        let right_id = self.nodes.len();
        self.nodes.push(Node::leaf(right));
        self.nodes.push(Node::leaf(down));

        let node = &mut self.nodes[id];
        node.rect = placed;
        node.children = Some((right_id, right_id + 1));
        placed
    }
}

impl Packer for BTreePacker {
    fn can_pack(&self, w: u32, h: u32) -> bool {
        self.find(w, h).is_some()
    }

    fn pack(&mut self, w: u32, h: u32) -> Option<Rect> {
        self.insert(w, h)
    }
}
