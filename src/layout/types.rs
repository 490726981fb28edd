use serde::{Deserialize, Serialize};

use crate::ir::{Direction, Edge, Node};

use super::weights::EdgeClass;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeLayout {
    pub node: Node,
    pub rank: usize,
    /// Solver center, in layout-box space.
    pub center: Point,
    /// Top-left draw coordinate derived from the visual box.
    pub position: Point,
    pub layout_box: Size,
    pub visual_box: Size,
}

impl NodeLayout {
    pub fn id(&self) -> &str {
        &self.node.id
    }

    pub fn bottom(&self) -> f32 {
        self.position.y + self.visual_box.height
    }

    pub fn right(&self) -> f32 {
        self.position.x + self.visual_box.width
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EdgeLayout {
    pub edge: Edge,
    pub class: EdgeClass,
    pub weight: f32,
    /// Set when the edge closes a cycle and was laid out reversed.
    pub back_edge: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub direction: Direction,
    pub nodes: Vec<NodeLayout>,
    pub edges: Vec<EdgeLayout>,
    pub width: f32,
    pub height: f32,
}

impl Layout {
    pub fn node(&self, id: &str) -> Option<&NodeLayout> {
        self.nodes.iter().find(|node| node.node.id == id)
    }

    pub fn position(&self, id: &str) -> Option<Point> {
        self.node(id).map(|node| node.position)
    }

    pub fn edge(&self, id: &str) -> Option<&EdgeLayout> {
        self.edges.iter().find(|edge| edge.edge.id == id)
    }
}
