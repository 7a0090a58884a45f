//! Read-only drawing derivations
//!
//! Everything here is recomputed from the document on each pass and
//! holds no state of its own, so the view can never drift from the
//! graph.

use crate::map::graph::MindMap;
use crate::types::{ColorTag, Point, Tier};

/// One drawable node box (top-left corner plus tier footprint)
#[derive(Debug, Clone, PartialEq)]
pub struct NodeBox {
    pub key: String,
    pub position: Point,
    pub width: f64,
    pub height: f64,
    pub color: ColorTag,
    pub tier: Tier,
}

impl NodeBox {
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.position.x
            && p.x < self.position.x + self.width
            && p.y >= self.position.y
            && p.y < self.position.y + self.height
    }

    /// Box center, the edge anchor for this tier
    pub fn anchor(&self) -> Point {
        let (ax, ay) = self.tier.anchor();
        Point::new(self.position.x + ax, self.position.y + ay)
    }
}

/// One parent→child connector between two box centers
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeLine {
    pub from: Point,
    pub to: Point,
}

/// Node boxes in insertion order (root first)
pub fn node_boxes(map: &MindMap) -> Vec<NodeBox> {
    map.nodes()
        .map(|node| {
            let (width, height) = node.tier().footprint();
            NodeBox {
                key: node.key.clone(),
                position: node.position,
                width,
                height,
                color: node.color,
                tier: node.tier(),
            }
        })
        .collect()
}

/// One edge per node whose parent is present, anchored at the
/// tier-dependent box centers of both endpoints
pub fn edge_lines(map: &MindMap) -> Vec<EdgeLine> {
    map.nodes()
        .filter_map(|node| {
            let parent = map.get(node.parent_key.as_deref()?)?;
            let (pax, pay) = parent.tier().anchor();
            let (cax, cay) = node.tier().anchor();
            Some(EdgeLine {
                from: Point::new(parent.position.x + pax, parent.position.y + pay),
                to: Point::new(node.position.x + cax, node.position.y + cay),
            })
        })
        .collect()
}

/// Topmost node under a canvas point: later insertions draw on top
pub fn hit_test(map: &MindMap, p: Point) -> Option<String> {
    node_boxes(map)
        .into_iter()
        .rev()
        .find(|b| b.contains(p))
        .map(|b| b.key)
}

/// Shortens long labels to fit a node box
pub fn truncate_label(label: &str, max_chars: usize) -> String {
    if label.chars().count() <= max_chars {
        return label.to_string();
    }
    let head: String = label.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{}...", head)
}
