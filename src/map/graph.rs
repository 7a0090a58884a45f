//! The mind map document
//!
//! A `MindMap` owns the node tree: an insertion-ordered table of nodes
//! keyed by canonical label, plus the canvas the map was laid out for.
//! All mutation goes through the operations here, which maintain the
//! tree invariants (single root, parent/child back-links, canonical key
//! uniqueness, positions inside the canvas).

use crate::map::ai::MapOutline;
use crate::map::layout;
use crate::types::{Canvas, ColorTag, NodeId, Point, Tier};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Trim and case-fold a label into the key used for identity and dedup
pub fn canonical_key(label: &str) -> String {
    label.trim().to_uppercase()
}

#[derive(Debug, Error)]
pub enum GraphError {
    #[error("a map needs exactly one root, found {0}")]
    RootCount(usize),
    #[error("node \"{child}\" references missing parent \"{parent}\"")]
    MissingParent { child: String, parent: String },
    #[error("node \"{0}\" is not reachable from the root")]
    Unreachable(String),
    #[error("\"{parent}\" and \"{child}\" disagree about their link")]
    ChildMismatch { parent: String, child: String },
    #[error("node label is empty")]
    EmptyKey,
    #[error("map file did not parse: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A single concept in the map. The only entity type.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub key: String,
    pub id: NodeId,
    pub position: Point,
    pub color: ColorTag,
    pub parent_key: Option<String>,
    #[serde(default)]
    pub child_keys: Vec<String>,
}

impl Node {
    pub fn tier(&self) -> Tier {
        if self.parent_key.is_none() {
            Tier::Root
        } else {
            Tier::Concept
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MindMap {
    name: String,
    root_key: String,
    canvas: Canvas,
    nodes: IndexMap<String, Node>,
    next_id: u64,
    palette_cursor: usize,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MindMap {
    /// Fresh document holding only a root, centered on the canvas.
    /// The root draws the first palette color (pink).
    pub fn new(root_label: &str, canvas: Canvas) -> Self {
        let root_key = canonical_key(root_label);
        let now = Utc::now();
        let mut map = Self {
            name: format!("{} - MIND MAP", root_key),
            root_key: root_key.clone(),
            canvas,
            nodes: IndexMap::new(),
            next_id: 0,
            palette_cursor: 0,
            created_at: now,
            updated_at: now,
        };
        let color = map.next_color();
        let node = Node {
            key: root_key.clone(),
            id: map.take_id(),
            position: layout::center_root(&canvas),
            color,
            parent_key: None,
            child_keys: Vec::new(),
        };
        map.nodes.insert(root_key, node);
        map
    }

    /// The starter map shown before any topic has been generated
    pub fn seed(canvas: Canvas) -> Self {
        let mut map = Self::new("MINDSCAPE", canvas);
        let root_pos = map.root().position;
        let starters = ["CREATE A TOPIC", "TO START", "GENERATING"];
        let ring = layout::place_main_concepts(&canvas, root_pos, starters.len());
        for (label, pos) in starters.iter().zip(ring) {
            let color = map.next_color();
            let _ = map.upsert(label, Some("MINDSCAPE"), pos, color);
        }
        map
    }

    /// Builds a complete document from a generated outline: root in the
    /// center, main concepts ringed around it, sub-concepts fanned out
    /// along each main's angle. Duplicate concept names collapse onto
    /// their first occurrence.
    pub fn from_outline(topic: &str, outline: &MapOutline, canvas: Canvas) -> Self {
        let mut map = Self::new(topic, canvas);
        let root_key = map.root_key.clone();
        let root_pos = map.root().position;
        let n = outline.main_concepts.len();
        let ring = layout::place_main_concepts(&canvas, root_pos, n);
        for (i, (main, main_pos)) in outline.main_concepts.iter().zip(ring).enumerate() {
            let color = map.next_color();
            if !map.upsert(main, Some(&root_key), main_pos, color).unwrap_or(false) {
                continue;
            }
            let subs = match outline.sub_concepts.get(main) {
                Some(subs) if !subs.is_empty() => subs,
                _ => continue,
            };
            let angle = layout::main_angle(i, n);
            let fan = layout::place_sub_concepts(&canvas, main_pos, angle, subs.len());
            for (sub, sub_pos) in subs.iter().zip(fan) {
                let _ = map.upsert(sub, Some(main), sub_pos, ColorTag::Gray);
            }
        }
        map
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn root_key(&self) -> &str {
        &self.root_key
    }

    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn root(&self) -> &Node {
        // the constructor inserts the root before anything else can run
        &self.nodes[&self.root_key]
    }

    pub fn get(&self, key: &str) -> Option<&Node> {
        self.nodes.get(&canonical_key(key))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.nodes.contains_key(&canonical_key(key))
    }

    /// Nodes in insertion order (root first)
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    fn take_id(&mut self) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Next color in the round-robin cycle
    pub fn next_color(&mut self) -> ColorTag {
        let color = ColorTag::PALETTE[self.palette_cursor % ColorTag::PALETTE.len()];
        self.palette_cursor += 1;
        color
    }

    /// Inserts a node under `parent`. The label is canonicalized first;
    /// if that key already exists the call is a skip, never an overwrite
    /// (`Ok(false)`). The position is clamped into the canvas.
    pub fn upsert(
        &mut self,
        label: &str,
        parent: Option<&str>,
        position: Point,
        color: ColorTag,
    ) -> Result<bool, GraphError> {
        let key = canonical_key(label);
        if key.is_empty() {
            return Err(GraphError::EmptyKey);
        }
        if self.nodes.contains_key(&key) {
            return Ok(false);
        }
        let parent_key = match parent {
            Some(p) => {
                let p = canonical_key(p);
                if !self.nodes.contains_key(&p) {
                    return Err(GraphError::MissingParent {
                        child: key,
                        parent: p,
                    });
                }
                Some(p)
            }
            None => return Err(GraphError::RootCount(2)),
        };
        let tier = Tier::Concept;
        let node = Node {
            key: key.clone(),
            id: self.take_id(),
            position: layout::clamp_position(&self.canvas, tier, position),
            color,
            parent_key: parent_key.clone(),
            child_keys: Vec::new(),
        };
        self.nodes.insert(key.clone(), node);
        if let Some(p) = parent_key {
            if let Some(parent_node) = self.nodes.get_mut(&p) {
                parent_node.child_keys.push(key);
            }
        }
        self.touch();
        Ok(true)
    }

    /// Removes a node and its whole subtree. Deleting the root (or a key
    /// that isn't present) is a guarded no-op. Returns how many nodes
    /// were removed.
    pub fn delete_subtree(&mut self, key: &str) -> usize {
        let key = canonical_key(key);
        if key == self.root_key || !self.nodes.contains_key(&key) {
            return 0;
        }
        if let Some(parent_key) = self.nodes.get(&key).and_then(|n| n.parent_key.clone()) {
            if let Some(parent) = self.nodes.get_mut(&parent_key) {
                parent.child_keys.retain(|c| c != &key);
            }
        }
        // iterative walk, no recursion on deep chains
        let mut removed = 0;
        let mut stack = vec![key];
        while let Some(next) = stack.pop() {
            if let Some(node) = self.nodes.shift_remove(&next) {
                removed += 1;
                stack.extend(node.child_keys);
            }
        }
        self.touch();
        removed
    }

    /// Swaps in a whole replacement document after validating it.
    /// On error the current document is untouched.
    pub fn replace_all(&mut self, replacement: MindMap) -> Result<(), GraphError> {
        replacement.validate()?;
        *self = replacement;
        Ok(())
    }

    /// Drag write path: moves one node, clamped by its tier's footprint
    pub fn move_node(&mut self, key: &str, to: Point) {
        let canvas = self.canvas;
        if let Some(node) = self.nodes.get_mut(&canonical_key(key)) {
            node.position = layout::clamp_position(&canvas, node.tier(), to);
            self.touch();
        }
    }

    /// Merges an expansion batch under `parent`: canonicalizes, drops
    /// empties, duplicates and keys already in the map, then places and
    /// inserts the remainder in one pass. Returns how many were added.
    pub fn merge_expansion(&mut self, parent: &str, concepts: &[String], base_angle: f64) -> usize {
        let parent_key = canonical_key(parent);
        let parent_pos = match self.nodes.get(&parent_key) {
            Some(node) => node.position,
            None => return 0,
        };
        let mut fresh: Vec<String> = Vec::new();
        for concept in concepts {
            let key = canonical_key(concept);
            if key.is_empty() || self.nodes.contains_key(&key) || fresh.contains(&key) {
                continue;
            }
            fresh.push(key);
        }
        if fresh.is_empty() {
            return 0;
        }
        let spots = layout::place_expansion(&self.canvas, parent_pos, fresh.len(), base_angle);
        let mut added = 0;
        for (key, pos) in fresh.iter().zip(spots) {
            let color = self.next_color();
            if self.upsert(key, Some(&parent_key), pos, color).unwrap_or(false) {
                added += 1;
            }
        }
        added
    }

    /// Checks every tree invariant; used on `replace_all` and after load
    pub fn validate(&self) -> Result<(), GraphError> {
        let roots: Vec<&Node> = self.nodes.values().filter(|n| n.parent_key.is_none()).collect();
        if roots.len() != 1 || roots[0].key != self.root_key {
            return Err(GraphError::RootCount(roots.len()));
        }
        for (key, node) in &self.nodes {
            if *key != node.key || canonical_key(key) != *key {
                return Err(GraphError::ChildMismatch {
                    parent: key.clone(),
                    child: node.key.clone(),
                });
            }
            if let Some(parent) = &node.parent_key {
                let parent_node = self.nodes.get(parent).ok_or_else(|| GraphError::MissingParent {
                    child: key.clone(),
                    parent: parent.clone(),
                })?;
                if !parent_node.child_keys.contains(key) {
                    return Err(GraphError::ChildMismatch {
                        parent: parent.clone(),
                        child: key.clone(),
                    });
                }
            }
            for child in &node.child_keys {
                let child_node = self.nodes.get(child).ok_or_else(|| GraphError::ChildMismatch {
                    parent: key.clone(),
                    child: child.clone(),
                })?;
                if child_node.parent_key.as_deref() != Some(key) {
                    return Err(GraphError::ChildMismatch {
                        parent: key.clone(),
                        child: child.clone(),
                    });
                }
            }
        }
        // every node reachable from the root exactly once
        let mut seen = vec![self.root_key.clone()];
        let mut stack = vec![self.root_key.clone()];
        while let Some(next) = stack.pop() {
            if let Some(node) = self.nodes.get(&next) {
                for child in &node.child_keys {
                    if seen.contains(child) {
                        return Err(GraphError::Unreachable(child.clone()));
                    }
                    seen.push(child.clone());
                    stack.push(child.clone());
                }
            }
        }
        if seen.len() != self.nodes.len() {
            let orphan = self
                .nodes
                .keys()
                .find(|k| !seen.contains(k))
                .cloned()
                .unwrap_or_default();
            return Err(GraphError::Unreachable(orphan));
        }
        Ok(())
    }

    pub fn to_json(&self) -> Result<String, GraphError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parses a saved document, re-floors its canvas, re-clamps every
    /// position and validates the tree before handing it back.
    pub fn from_json(text: &str) -> Result<Self, GraphError> {
        let mut map: MindMap = serde_json::from_str(text)?;
        map.canvas = Canvas::new(map.canvas.width, map.canvas.height);
        let canvas = map.canvas;
        for node in map.nodes.values_mut() {
            node.position = layout::clamp_position(&canvas, node.tier(), node.position);
        }
        map.validate()?;
        Ok(map)
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn robotics_outline() -> MapOutline {
        let mains = ["SENSORS", "ACTUATORS", "CONTROL", "KINEMATICS"];
        let mut subs = HashMap::new();
        for main in mains {
            subs.insert(
                main.to_string(),
                (1..=3).map(|i| format!("{} {}", main, i)).collect(),
            );
        }
        MapOutline {
            main_concepts: mains.iter().map(|s| s.to_string()).collect(),
            sub_concepts: subs,
        }
    }

    #[test]
    fn test_seed_map_shape() {
        let map = MindMap::seed(Canvas::default());
        assert_eq!(map.len(), 4);
        assert_eq!(map.root_key(), "MINDSCAPE");
        assert_eq!(map.name(), "MINDSCAPE - MIND MAP");
        let root = map.get("MINDSCAPE").unwrap();
        assert_eq!(root.color, ColorTag::Pink);
        assert_eq!(root.child_keys.len(), 3);
        for child in &root.child_keys {
            assert_eq!(map.get(child).unwrap().parent_key.as_deref(), Some("MINDSCAPE"));
        }
        map.validate().unwrap();
    }

    #[test]
    fn test_canonical_key_folds_case_and_whitespace() {
        assert_eq!(canonical_key("  machine learning "), "MACHINE LEARNING");
        assert_eq!(canonical_key("Ai"), "AI");
    }

    #[test]
    fn test_upsert_skips_existing_canonical_key() {
        let mut map = MindMap::seed(Canvas::default());
        let added = map
            .upsert("AI", Some("MINDSCAPE"), Point::new(100.0, 100.0), ColorTag::Blue)
            .unwrap();
        assert!(added);
        let before = map.len();
        let again = map
            .upsert("Ai", Some("MINDSCAPE"), Point::new(500.0, 500.0), ColorTag::Red)
            .unwrap();
        assert!(!again);
        assert_eq!(map.len(), before);
        // identity untouched by the second insert
        let node = map.get("ai").unwrap();
        assert_eq!(node.color, ColorTag::Blue);
        assert_eq!(map.get("MINDSCAPE").unwrap().child_keys.iter().filter(|k| *k == "AI").count(), 1);
    }

    #[test]
    fn test_upsert_requires_existing_parent() {
        let mut map = MindMap::seed(Canvas::default());
        let err = map
            .upsert("ORPHAN", Some("NOWHERE"), Point::default(), ColorTag::Red)
            .unwrap_err();
        assert!(matches!(err, GraphError::MissingParent { .. }));
        assert!(map.get("ORPHAN").is_none());
    }

    #[test]
    fn test_generated_outline_builds_full_tree() {
        let map = MindMap::from_outline("Robotics", &robotics_outline(), Canvas::default());
        assert_eq!(map.len(), 17);
        assert_eq!(map.name(), "ROBOTICS - MIND MAP");
        assert_eq!(map.root_key(), "ROBOTICS");
        let root = map.get("ROBOTICS").unwrap();
        assert_eq!(root.color, ColorTag::Pink);
        assert_eq!(root.child_keys.len(), 4);
        let sub = map.get("SENSORS 2").unwrap();
        assert_eq!(sub.color, ColorTag::Gray);
        assert_eq!(sub.parent_key.as_deref(), Some("SENSORS"));
        map.validate().unwrap();
    }

    #[test]
    fn test_delete_subtree_removes_exactly_the_descendants() {
        let mut map = MindMap::from_outline("Robotics", &robotics_outline(), Canvas::default());
        let removed = map.delete_subtree("sensors");
        assert_eq!(removed, 4);
        assert_eq!(map.len(), 13);
        assert!(map.get("SENSORS").is_none());
        assert!(map.get("SENSORS 1").is_none());
        assert!(!map.get("ROBOTICS").unwrap().child_keys.contains(&"SENSORS".to_string()));
        map.validate().unwrap();
    }

    #[test]
    fn test_delete_root_is_a_noop() {
        let mut map = MindMap::seed(Canvas::default());
        let before = map.len();
        assert_eq!(map.delete_subtree("MINDSCAPE"), 0);
        assert_eq!(map.len(), before);
        assert!(map.get("MINDSCAPE").is_some());
    }

    #[test]
    fn test_delete_missing_key_is_a_noop() {
        let mut map = MindMap::seed(Canvas::default());
        assert_eq!(map.delete_subtree("NOT HERE"), 0);
        assert_eq!(map.len(), 4);
    }

    #[test]
    fn test_merge_expansion_adds_parented_children() {
        let mut map = MindMap::seed(Canvas::default());
        let concepts: Vec<String> = ["ALPHA", "BETA", "GAMMA"].iter().map(|s| s.to_string()).collect();
        let added = map.merge_expansion("TO START", &concepts, 0.3);
        assert_eq!(added, 3);
        let parent = map.get("TO START").unwrap();
        for key in ["ALPHA", "BETA", "GAMMA"] {
            assert!(parent.child_keys.contains(&key.to_string()));
            assert_eq!(map.get(key).unwrap().parent_key.as_deref(), Some("TO START"));
        }
        map.validate().unwrap();
    }

    #[test]
    fn test_merge_expansion_dedups_against_graph_and_itself() {
        let mut map = MindMap::seed(Canvas::default());
        let concepts: Vec<String> = ["Mindscape", "NEW ONE", "new one", "  "]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let added = map.merge_expansion("TO START", &concepts, 0.0);
        assert_eq!(added, 1);
        assert_eq!(map.len(), 5);
    }

    #[test]
    fn test_merge_expansion_for_missing_parent_is_a_noop() {
        let mut map = MindMap::seed(Canvas::default());
        let added = map.merge_expansion("GONE", &["A".to_string()], 0.0);
        assert_eq!(added, 0);
        assert_eq!(map.len(), 4);
    }

    #[test]
    fn test_move_node_clamps_and_touches_only_target() {
        let mut map = MindMap::seed(Canvas::default());
        let canvas = map.canvas();
        let before: Vec<Point> = map.nodes().map(|n| n.position).collect();
        map.move_node("TO START", Point::new(-400.0, canvas.height * 2.0));
        let node = map.get("TO START").unwrap();
        let (_, h) = node.tier().footprint();
        assert_eq!(node.position.x, layout::MIN_MARGIN);
        assert_eq!(node.position.y, canvas.height - h - layout::MIN_MARGIN);
        let after: Vec<Point> = map.nodes().map(|n| n.position).collect();
        let moved = before.iter().zip(&after).filter(|(a, b)| a != b).count();
        assert_eq!(moved, 1);
    }

    #[test]
    fn test_replace_all_rejects_invalid_batch() {
        let mut map = MindMap::seed(Canvas::default());
        let mut bad = MindMap::new("TOPIC", Canvas::default());
        bad.nodes.insert(
            "STRAY".to_string(),
            Node {
                key: "STRAY".to_string(),
                id: NodeId(99),
                position: Point::new(100.0, 100.0),
                color: ColorTag::Blue,
                parent_key: Some("TOPIC".to_string()),
                child_keys: Vec::new(),
            },
        );
        // parent never learned about the child
        assert!(map.replace_all(bad).is_err());
        assert_eq!(map.root_key(), "MINDSCAPE");

        let good = MindMap::from_outline("Oceans", &robotics_outline(), Canvas::default());
        map.replace_all(good).unwrap();
        assert_eq!(map.root_key(), "OCEANS");
    }

    #[test]
    fn test_json_round_trip() {
        let map = MindMap::from_outline("Robotics", &robotics_outline(), Canvas::default());
        let text = map.to_json().unwrap();
        let back = MindMap::from_json(&text).unwrap();
        assert_eq!(back.len(), map.len());
        assert_eq!(back.root_key(), "ROBOTICS");
        assert_eq!(back.get("SENSORS 1").unwrap().color, ColorTag::Gray);
    }

    #[test]
    fn test_from_json_rejects_broken_links() {
        let map = MindMap::seed(Canvas::default());
        let text = map.to_json().unwrap();
        // root key renamed without renaming the node: no longer a valid tree
        let broken = text.replace("\"rootKey\": \"MINDSCAPE\"", "\"rootKey\": \"ELSEWHERE\"");
        assert_ne!(text, broken);
        assert!(MindMap::from_json(&broken).is_err());
        assert!(MindMap::from_json("not json").is_err());
    }

    #[test]
    fn test_round_robin_palette_cycles() {
        let mut map = MindMap::new("HUB", Canvas::default());
        // root consumed pink; the next twelve wrap back around to pink
        let first = map.next_color();
        assert_eq!(first, ColorTag::PALETTE[1]);
        for _ in 0..10 {
            map.next_color();
        }
        assert_eq!(map.next_color(), ColorTag::PALETTE[0]);
    }
}
