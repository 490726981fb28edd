use crate::ir::Direction;

use super::types::NodeLayout;

/// Pushes every terminal node past the far edge of the rest of the drawing.
///
/// Terminals share one band, `spacing` beyond the furthest non-terminal edge
/// along the flow axis; their cross coordinate is kept. Terminals are visited
/// in (rank, declaration) order and one that would overlap an already placed
/// terminal moves further along by that terminal's extent plus `spacing`.
/// Returns the number of terminals moved.
pub(super) fn place_terminals(nodes: &mut [NodeLayout], direction: Direction, spacing: f32) -> usize {
    let flow = Axis::for_direction(direction);

    let far_edge = nodes
        .iter()
        .filter(|node| !node.node.kind.is_terminal())
        .map(|node| flow.along_end(node))
        .fold(f32::NEG_INFINITY, f32::max);
    if !far_edge.is_finite() {
        return 0;
    }

    let mut terminals: Vec<usize> = nodes
        .iter()
        .enumerate()
        .filter(|(_, node)| node.node.kind.is_terminal())
        .map(|(idx, _)| idx)
        .collect();
    terminals.sort_by_key(|&idx| (nodes[idx].rank, idx));

    let band = far_edge + spacing;
    let mut placed: Vec<usize> = Vec::with_capacity(terminals.len());
    for &idx in &terminals {
        flow.set_along(&mut nodes[idx], band);
        loop {
            let blocker = placed
                .iter()
                .copied()
                .find(|&other| boxes_overlap(&nodes[idx], &nodes[other]));
            let Some(other) = blocker else {
                break;
            };
            let next = flow.along_end(&nodes[other]) + spacing;
            flow.set_along(&mut nodes[idx], next);
        }
        tracing::trace!(node = %nodes[idx].node.id, along = flow.along(&nodes[idx]), "terminal placed");
        placed.push(idx);
    }
    placed.len()
}

#[derive(Debug, Clone, Copy)]
enum Axis {
    Vertical,
    Horizontal,
}

impl Axis {
    fn for_direction(direction: Direction) -> Self {
        match direction {
            Direction::TopBottom => Self::Vertical,
            Direction::LeftRight => Self::Horizontal,
        }
    }

    fn along(self, node: &NodeLayout) -> f32 {
        match self {
            Self::Vertical => node.position.y,
            Self::Horizontal => node.position.x,
        }
    }

    fn along_end(self, node: &NodeLayout) -> f32 {
        match self {
            Self::Vertical => node.bottom(),
            Self::Horizontal => node.right(),
        }
    }

    fn set_along(self, node: &mut NodeLayout, value: f32) {
        match self {
            Self::Vertical => {
                node.position.y = value;
                node.center.y = value + node.visual_box.height / 2.0;
            }
            Self::Horizontal => {
                node.position.x = value;
                node.center.x = value + node.visual_box.width / 2.0;
            }
        }
    }
}

fn boxes_overlap(a: &NodeLayout, b: &NodeLayout) -> bool {
    a.position.x < b.right()
        && b.position.x < a.right()
        && a.position.y < b.bottom()
        && b.position.y < a.bottom()
}
