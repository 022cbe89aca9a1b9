//! Canvas geometry store.
//!
//! The canvas is the single source of truth for where every node sits on
//! screen.  Containment questions ("which firewall encloses this server?")
//! are answered against the rectangles stored here at the moment the
//! question is asked, so dragging a node immediately changes the answer.

use std::collections::HashMap;
use std::sync::Mutex;

use fyre_core::{NodeId, Rect};

use crate::application::platform::BoundsProvider;

/// Thread-safe table of node rectangles.
///
/// Shared as `Arc<CanvasStore>`: the platform reads it through the
/// [`BoundsProvider`] trait while the UI bridge writes to it when nodes
/// are created or dragged.
pub struct CanvasStore {
    rects: Mutex<HashMap<NodeId, Rect>>,
}

impl CanvasStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            rects: Mutex::new(HashMap::new()),
        }
    }

    /// Places (or replaces) a node's rectangle.
    pub fn place(&self, node: NodeId, rect: Rect) {
        self.rects.lock().expect("lock poisoned").insert(node, rect);
    }

    /// Moves a node to a new top-left corner, keeping its size.
    ///
    /// Returns `false` when the node has never been placed.
    pub fn move_to(&self, node: NodeId, x: i32, y: i32) -> bool {
        let mut rects = self.rects.lock().expect("lock poisoned");
        match rects.get_mut(&node) {
            Some(rect) => {
                rect.x = x;
                rect.y = y;
                true
            }
            None => false,
        }
    }

    /// Returns a node's current rectangle, if it has been placed.
    pub fn rect_of(&self, node: NodeId) -> Option<Rect> {
        self.rects.lock().expect("lock poisoned").get(&node).cloned()
    }
}

impl Default for CanvasStore {
    fn default() -> Self {
        Self::new()
    }
}

impl BoundsProvider for CanvasStore {
    fn bounds_of(&self, node: NodeId) -> Option<Rect> {
        self.rect_of(node)
    }
}
