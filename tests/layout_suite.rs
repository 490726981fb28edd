use std::path::Path;

use flowspine::layout::Layout;
use flowspine::oracle::parse_payload;
use flowspine::parser::parse_flow_rules;
use flowspine::{Analysis, Direction, LayoutConfig, NodeKind, layout_analysis};

fn load_fixture(rel: &str) -> Analysis {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(rel);
    let input = std::fs::read_to_string(&path).expect("fixture read failed");
    if rel.starts_with("payload/") {
        parse_payload(&input).expect("payload parse failed")
    } else {
        parse_flow_rules(&input).expect("rules parse failed")
    }
}

fn lay_out(analysis: &Analysis, direction: Direction) -> Layout {
    layout_analysis(analysis, direction, &LayoutConfig::default()).expect("layout failed")
}

// Keep this list explicit so new fixtures must be added intentionally.
const FIXTURES: [&str; 5] = [
    "payload/opportunity_trigger.json",
    "payload/fenced_batch.json5",
    "rules/decision.flow",
    "rules/loop.flow",
    "rules/multi_end.flow",
];

const DIRECTIONS: [Direction; 2] = [Direction::TopBottom, Direction::LeftRight];

#[test]
fn every_node_gets_exactly_one_position() {
    for rel in FIXTURES {
        let analysis = load_fixture(rel);
        for direction in DIRECTIONS {
            let layout = lay_out(&analysis, direction);
            assert_eq!(layout.nodes.len(), analysis.nodes.len(), "{rel}");
            for (laid, node) in layout.nodes.iter().zip(&analysis.nodes) {
                assert_eq!(&laid.node, node, "{rel}");
                assert!(laid.position.x.is_finite() && laid.position.y.is_finite(), "{rel}");
                assert!(laid.position.x >= 0.0 && laid.position.y >= 0.0, "{rel}");
                assert!(laid.right() <= layout.width, "{rel}: {}", laid.id());
                assert!(laid.bottom() <= layout.height, "{rel}: {}", laid.id());
            }
            assert_eq!(layout.edges.len(), analysis.edges.len(), "{rel}");
            for (laid, edge) in layout.edges.iter().zip(&analysis.edges) {
                assert_eq!(&laid.edge, edge, "{rel}");
            }
        }
    }
}

#[test]
fn terminals_sit_past_everything_else() {
    for rel in FIXTURES {
        let analysis = load_fixture(rel);
        for direction in DIRECTIONS {
            let layout = lay_out(&analysis, direction);
            let (terminals, others): (Vec<_>, Vec<_>) = layout
                .nodes
                .iter()
                .partition(|node| node.node.kind.is_terminal());
            for terminal in &terminals {
                for other in &others {
                    match direction {
                        Direction::TopBottom => assert!(
                            terminal.position.y > other.bottom(),
                            "{rel}: {} not below {}",
                            terminal.id(),
                            other.id()
                        ),
                        Direction::LeftRight => assert!(
                            terminal.position.x > other.right(),
                            "{rel}: {} not right of {}",
                            terminal.id(),
                            other.id()
                        ),
                    }
                }
            }
            for (i, a) in terminals.iter().enumerate() {
                for b in &terminals[i + 1..] {
                    let overlap = a.position.x < b.right()
                        && b.position.x < a.right()
                        && a.position.y < b.bottom()
                        && b.position.y < a.bottom();
                    assert!(!overlap, "{rel}: {} overlaps {}", a.id(), b.id());
                }
            }
        }
    }
}

#[test]
fn forward_edges_point_down_the_ranks() {
    for rel in FIXTURES {
        let analysis = load_fixture(rel);
        let layout = lay_out(&analysis, Direction::TopBottom);
        for edge in &layout.edges {
            if edge.back_edge || edge.edge.is_self_loop() {
                continue;
            }
            let source = layout.node(&edge.edge.source).unwrap();
            let target = layout.node(&edge.edge.target).unwrap();
            assert!(
                target.rank > source.rank,
                "{rel}: edge {} goes from rank {} to {}",
                edge.edge.id,
                source.rank,
                target.rank
            );
        }
    }
}

#[test]
fn layout_is_idempotent() {
    for rel in FIXTURES {
        let analysis = load_fixture(rel);
        for direction in DIRECTIONS {
            assert_eq!(
                lay_out(&analysis, direction),
                lay_out(&analysis, direction),
                "{rel}"
            );
        }
    }
}

#[test]
fn true_branch_stays_on_the_spine() {
    let analysis = load_fixture("rules/decision.flow");
    let layout = lay_out(&analysis, Direction::TopBottom);
    let center_x = |id: &str| layout.node(id).unwrap().center.x;

    assert_eq!(center_x("s"), center_x("d"));
    assert_eq!(center_x("d"), center_x("a"));
    assert!((center_x("b") - center_x("a")).abs() >= 300.0 + 140.0);

    let node = |id: &str| layout.node(id).unwrap();
    assert_eq!(node("a").rank, node("b").rank);
    assert!(node("e").position.y > node("a").bottom());
    assert!(node("e").position.y > node("b").bottom());
}

#[test]
fn loop_body_returns_through_a_back_edge() {
    let analysis = load_fixture("rules/loop.flow");
    assert_eq!(analysis.warnings.len(), 2);
    let layout = lay_out(&analysis, Direction::TopBottom);

    let back: Vec<&str> = layout
        .edges
        .iter()
        .filter(|edge| edge.back_edge)
        .map(|edge| edge.edge.id.as_str())
        .collect();
    assert_eq!(back, ["e3"]);
    assert_eq!(layout.edge("e3").unwrap().edge.animated, Some(true));
}

#[test]
fn payload_fixture_keeps_oracle_metadata() {
    let analysis = load_fixture("payload/opportunity_trigger.json");
    assert_eq!(analysis.nodes[2].kind, NodeKind::Query);
    assert_eq!(analysis.nodes[5].kind, NodeKind::Mutation);
    assert_eq!(analysis.warnings.len(), 2);

    let layout = lay_out(&analysis, Direction::TopBottom);
    assert!(layout.edge("e5-4").unwrap().back_edge);
    let end = layout.node("7").unwrap();
    let deepest = layout
        .nodes
        .iter()
        .filter(|node| !node.node.kind.is_terminal())
        .map(|node| node.bottom())
        .fold(0.0f32, f32::max);
    assert_eq!(end.position.y, deepest + 120.0);
}

#[test]
fn json5_fixture_matches_its_strict_shape() {
    let analysis = load_fixture("payload/fenced_batch.json5");
    assert_eq!(analysis.nodes.len(), 6);
    assert_eq!(analysis.edges.len(), 7);
    assert!(analysis.warnings.is_empty());
    assert_eq!(analysis.nodes[4].kind, NodeKind::Error);
}
