//! Flowchart layout: size normalization, layered rank/order/position solving
//! and terminal placement.
//!
//! [`compute_layout`] is a pure function of its inputs; calling it twice with
//! the same nodes, edges, direction and config yields identical output.

mod error;
mod ordering;
mod position;
mod ranking;
mod sizing;
mod terminal;
mod types;
mod weights;

use std::collections::HashMap;

use crate::config::LayoutConfig;
use crate::ir::{Analysis, Direction, Edge, Node};

pub use error::{EdgeEnd, LayoutError};
pub use sizing::{layout_box, visual_box};
pub use types::{EdgeLayout, Layout, NodeLayout, Point, Size};
pub use weights::{EdgeClass, classify_edge, is_negative_label};

use ordering::{LayerGraph, order_layers};
use position::{Spacing, place};
use ranking::{Link, assign_ranks};
use terminal::place_terminals;

pub fn compute_layout(
    nodes: &[Node],
    edges: &[Edge],
    direction: Direction,
    config: &LayoutConfig,
) -> Result<Layout, LayoutError> {
    let index = index_nodes(nodes)?;

    let mut links: Vec<Link> = Vec::new();
    let mut link_of_pair: HashMap<(usize, usize), usize> = HashMap::new();
    let mut edge_links: Vec<Option<usize>> = Vec::with_capacity(edges.len());
    let mut classes: Vec<EdgeClass> = Vec::with_capacity(edges.len());

    for edge in edges {
        let source = resolve(&index, edge, EdgeEnd::Source)?;
        let target = resolve(&index, edge, EdgeEnd::Target)?;
        let class = classify_edge(edge, &config.weights);
        classes.push(class);
        if source == target {
            edge_links.push(None);
            continue;
        }
        let weight = class.weight(&config.weights);
        let link_idx = *link_of_pair.entry((source, target)).or_insert_with(|| {
            links.push(Link {
                source,
                target,
                weight,
            });
            links.len() - 1
        });
        links[link_idx].weight = links[link_idx].weight.max(weight);
        edge_links.push(Some(link_idx));
    }

    let layout_boxes: Vec<Size> = nodes
        .iter()
        .map(|node| layout_box(&node.kind, &config.sizing))
        .collect();
    let visual_boxes: Vec<Size> = nodes
        .iter()
        .map(|node| visual_box(&node.kind, &config.sizing))
        .collect();

    let (extents, spacing): (Vec<(f32, f32)>, Spacing) = match direction {
        Direction::TopBottom => (
            layout_boxes.iter().map(|b| (b.width, b.height)).collect(),
            Spacing::new(config, config.margin_x, config.margin_y),
        ),
        Direction::LeftRight => (
            layout_boxes.iter().map(|b| (b.height, b.width)).collect(),
            Spacing::new(config, config.margin_y, config.margin_x),
        ),
    };

    let ranking = assign_ranks(nodes.len(), &links);
    let mut graph = LayerGraph::build(&ranking, &links, &extents);
    order_layers(&mut graph, config.order_passes);
    let placement = place(&graph, spacing, config.balance_passes);

    tracing::debug!(
        nodes = nodes.len(),
        edges = edges.len(),
        max_rank = ranking.max_rank(),
        virtual_vertices = graph.vertices.len() - nodes.len(),
        back_edges = ranking.reversed.iter().filter(|r| **r).count(),
        "layout solved"
    );

    let mut laid: Vec<NodeLayout> = nodes
        .iter()
        .enumerate()
        .map(|(idx, node)| {
            let (cross, along) = (placement.cross[idx], placement.along[idx]);
            let center = match direction {
                Direction::TopBottom => Point::new(cross, along),
                Direction::LeftRight => Point::new(along, cross),
            };
            let visual = visual_boxes[idx];
            NodeLayout {
                node: node.clone(),
                rank: ranking.ranks[idx],
                center,
                position: Point::new(
                    center.x - visual.width / 2.0,
                    center.y - visual.height / 2.0,
                ),
                layout_box: layout_boxes[idx],
                visual_box: visual,
            }
        })
        .collect();

    let moved = place_terminals(&mut laid, direction, config.terminal_spacing);
    if moved > 0 {
        tracing::debug!(terminals = moved, "terminal nodes moved past the last step");
    }

    let edges: Vec<EdgeLayout> = edges
        .iter()
        .zip(classes)
        .zip(edge_links)
        .map(|((edge, class), link)| EdgeLayout {
            edge: edge.clone(),
            class,
            weight: class.weight(&config.weights),
            back_edge: link.is_some_and(|idx| ranking.reversed[idx]),
        })
        .collect();

    let width = laid
        .iter()
        .map(NodeLayout::right)
        .fold(0.0f32, f32::max)
        + config.margin_x;
    let height = laid
        .iter()
        .map(NodeLayout::bottom)
        .fold(0.0f32, f32::max)
        + config.margin_y;

    Ok(Layout {
        direction,
        nodes: laid,
        edges,
        width: width.max(config.margin_x * 2.0),
        height: height.max(config.margin_y * 2.0),
    })
}

/// Lays out the graph half of an oracle result; warnings are not consulted.
pub fn layout_analysis(
    analysis: &Analysis,
    direction: Direction,
    config: &LayoutConfig,
) -> Result<Layout, LayoutError> {
    compute_layout(&analysis.nodes, &analysis.edges, direction, config)
}

fn index_nodes(nodes: &[Node]) -> Result<HashMap<&str, usize>, LayoutError> {
    let mut index = HashMap::with_capacity(nodes.len());
    for (idx, node) in nodes.iter().enumerate() {
        if index.insert(node.id.as_str(), idx).is_some() {
            return Err(LayoutError::DuplicateNode {
                id: node.id.clone(),
            });
        }
    }
    Ok(index)
}

fn resolve(index: &HashMap<&str, usize>, edge: &Edge, end: EdgeEnd) -> Result<usize, LayoutError> {
    let id = match end {
        EdgeEnd::Source => &edge.source,
        EdgeEnd::Target => &edge.target,
    };
    index
        .get(id.as_str())
        .copied()
        .ok_or_else(|| LayoutError::MissingEndpoint {
            edge: edge.id.clone(),
            end,
            node: id.clone(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::NodeKind;

    fn node(id: &str, kind: NodeKind) -> Node {
        Node::new(id, kind, id.to_uppercase())
    }

    fn edge(id: &str, source: &str, target: &str) -> Edge {
        Edge::new(id, source, target)
    }

    fn branch_graph() -> (Vec<Node>, Vec<Edge>) {
        let nodes = vec![
            node("s", NodeKind::Start),
            node("d", NodeKind::Decision),
            node("a", NodeKind::Action),
            node("b", NodeKind::Action),
            node("e", NodeKind::End),
        ];
        let edges = vec![
            edge("e1", "s", "d"),
            edge("e2", "d", "a").with_label("True"),
            edge("e3", "d", "b").with_label("False"),
            edge("e4", "a", "e"),
            edge("e5", "b", "e"),
        ];
        (nodes, edges)
    }

    #[test]
    fn decision_branch_scenario() {
        let (nodes, edges) = branch_graph();
        let layout =
            compute_layout(&nodes, &edges, Direction::TopBottom, &LayoutConfig::default()).unwrap();

        let get = |id: &str| layout.node(id).unwrap();
        assert_eq!(get("s").rank, 0);
        assert_eq!(get("d").rank, 1);
        assert_eq!(get("a").rank, 2);
        assert_eq!(get("b").rank, 2);

        // spine stays on one axis, the False branch steps aside
        assert_eq!(get("s").center.x, 200.0);
        assert_eq!(get("d").center.x, 200.0);
        assert_eq!(get("a").center.x, 200.0);
        assert_eq!(get("e").center.x, 200.0);
        assert_eq!(get("b").center.x, 640.0);

        assert_eq!(get("s").position, Point::new(130.0, 65.0));
        assert_eq!(get("d").position, Point::new(60.0, 230.0));
        assert_eq!(get("a").position, Point::new(80.0, 530.0));
        assert_eq!(get("b").position, Point::new(520.0, 530.0));
        assert_eq!(get("e").position, Point::new(130.0, 730.0));

        assert_eq!(layout.width, 810.0);
        assert_eq!(layout.height, 830.0);
    }

    #[test]
    fn edges_carry_weights_and_metadata() {
        let (nodes, mut edges) = branch_graph();
        edges[0].animated = Some(true);
        let layout =
            compute_layout(&nodes, &edges, Direction::TopBottom, &LayoutConfig::default()).unwrap();
        assert_eq!(layout.edges.len(), 5);
        assert_eq!(layout.edges[0].edge, edges[0]);
        assert_eq!(layout.edges[0].weight, 5.0);
        assert_eq!(layout.edge("e2").unwrap().class, EdgeClass::MainPath);
        assert_eq!(layout.edge("e3").unwrap().class, EdgeClass::NegativeBranch);
        assert_eq!(layout.edge("e3").unwrap().weight, 1.0);
        assert!(layout.edges.iter().all(|e| !e.back_edge));
    }

    #[test]
    fn missing_target_is_rejected() {
        let nodes = vec![node("a", NodeKind::Action)];
        let edges = vec![edge("e1", "a", "ghost")];
        let err = compute_layout(&nodes, &edges, Direction::TopBottom, &LayoutConfig::default())
            .unwrap_err();
        assert_eq!(
            err,
            LayoutError::MissingEndpoint {
                edge: "e1".to_string(),
                end: EdgeEnd::Target,
                node: "ghost".to_string(),
            }
        );
        assert_eq!(
            err.to_string(),
            "edge `e1` references missing target node `ghost`"
        );
    }

    #[test]
    fn missing_source_is_rejected() {
        let nodes = vec![node("a", NodeKind::Action)];
        let edges = vec![edge("e1", "ghost", "a")];
        let err = compute_layout(&nodes, &edges, Direction::TopBottom, &LayoutConfig::default())
            .unwrap_err();
        assert!(matches!(
            err,
            LayoutError::MissingEndpoint {
                end: EdgeEnd::Source,
                ..
            }
        ));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let nodes = vec![node("a", NodeKind::Action), node("a", NodeKind::End)];
        let err =
            compute_layout(&nodes, &[], Direction::TopBottom, &LayoutConfig::default()).unwrap_err();
        assert_eq!(
            err,
            LayoutError::DuplicateNode {
                id: "a".to_string()
            }
        );
    }

    #[test]
    fn single_self_loop() {
        let nodes = vec![node("x", NodeKind::Loop)];
        let edges = vec![edge("e1", "x", "x")];
        let layout =
            compute_layout(&nodes, &edges, Direction::TopBottom, &LayoutConfig::default()).unwrap();
        assert_eq!(layout.nodes.len(), 1);
        assert_eq!(layout.nodes[0].rank, 0);
        assert_eq!(layout.nodes[0].position, Point::new(80.0, 50.0));
        assert!(layout.nodes[0].position.x.is_finite());
        assert_eq!(layout.edges[0].class, EdgeClass::SelfLoop);
        assert!(!layout.edges[0].back_edge);
    }

    #[test]
    fn self_loop_does_not_change_ranks() {
        let (nodes, edges) = branch_graph();
        let config = LayoutConfig::default();
        let plain = compute_layout(&nodes, &edges, Direction::TopBottom, &config).unwrap();

        let mut looped = edges.clone();
        looped.push(edge("loop", "a", "a"));
        looped.push(edge("loop2", "d", "d").with_label("again"));
        let with_loops = compute_layout(&nodes, &looped, Direction::TopBottom, &config).unwrap();

        for (a, b) in plain.nodes.iter().zip(&with_loops.nodes) {
            assert_eq!(a.rank, b.rank, "{}", a.node.id);
            assert_eq!(a.position, b.position, "{}", a.node.id);
        }
    }

    #[test]
    fn empty_graph_is_not_an_error() {
        let layout =
            compute_layout(&[], &[], Direction::TopBottom, &LayoutConfig::default()).unwrap();
        assert!(layout.nodes.is_empty());
        assert!(layout.edges.is_empty());
        assert_eq!(layout.width, 100.0);
        assert_eq!(layout.height, 100.0);
    }

    #[test]
    fn loop_back_is_marked_and_ranked_below_the_loop_head() {
        let nodes = vec![
            node("s", NodeKind::Start),
            node("l", NodeKind::Loop),
            node("p", NodeKind::Action),
            node("n", NodeKind::Mutation),
            node("e", NodeKind::End),
        ];
        let edges = vec![
            edge("e1", "s", "l"),
            edge("e2", "l", "p").with_label("Yes"),
            edge("e3", "p", "l"),
            edge("e4", "l", "n").with_label("No"),
            edge("e5", "n", "e"),
        ];
        let layout =
            compute_layout(&nodes, &edges, Direction::TopBottom, &LayoutConfig::default()).unwrap();
        assert!(layout.edge("e3").unwrap().back_edge);
        assert_eq!(layout.edges.iter().filter(|e| e.back_edge).count(), 1);
        let get = |id: &str| layout.node(id).unwrap();
        assert_eq!(get("l").rank, 1);
        assert_eq!(get("p").rank, 2);
        assert_eq!(get("n").rank, 2);
        assert_eq!(get("l").center.x, get("p").center.x);
        assert_ne!(get("n").center.x, get("l").center.x);
    }

    #[test]
    fn parallel_edges_share_one_link() {
        let nodes = vec![node("a", NodeKind::Action), node("b", NodeKind::Action)];
        let edges = vec![
            edge("e1", "a", "b").with_label("No"),
            edge("e2", "a", "b"),
        ];
        let layout =
            compute_layout(&nodes, &edges, Direction::TopBottom, &LayoutConfig::default()).unwrap();
        assert_eq!(layout.edges[0].weight, 1.0);
        assert_eq!(layout.edges[1].weight, 5.0);
        assert_eq!(layout.node("b").unwrap().rank, 1);
        assert_eq!(
            layout.node("a").unwrap().center.x,
            layout.node("b").unwrap().center.x
        );
    }

    #[test]
    fn left_to_right_swaps_axes() {
        let nodes = vec![
            node("s", NodeKind::Start),
            node("a", NodeKind::Action),
            node("e", NodeKind::End),
        ];
        let edges = vec![edge("e1", "s", "a"), edge("e2", "a", "e")];
        let layout =
            compute_layout(&nodes, &edges, Direction::LeftRight, &LayoutConfig::default()).unwrap();
        let get = |id: &str| layout.node(id).unwrap();
        assert_eq!(get("s").center, Point::new(200.0, 90.0));
        assert_eq!(get("a").center, Point::new(620.0, 90.0));
        assert_eq!(get("e").position.x, 860.0);
        assert_eq!(get("e").center.y, 90.0);
    }
}
