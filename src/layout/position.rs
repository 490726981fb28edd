use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::config::LayoutConfig;

use super::ordering::LayerGraph;

/// Centers of every vertex: `cross` runs across the flow, `along` with it.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct Placement {
    pub cross: Vec<f32>,
    pub along: Vec<f32>,
}

/// Margins and gaps already oriented for the flow direction.
#[derive(Debug, Clone, Copy)]
pub(super) struct Spacing {
    pub node: f32,
    pub edge: f32,
    pub rank: f32,
    pub cross_margin: f32,
    pub along_margin: f32,
}

impl Spacing {
    pub fn new(config: &LayoutConfig, cross_margin: f32, along_margin: f32) -> Self {
        Self {
            node: config.node_spacing,
            edge: config.edge_spacing,
            rank: config.rank_spacing,
            cross_margin,
            along_margin,
        }
    }
}

pub(super) fn place(graph: &LayerGraph, spacing: Spacing, balance_passes: usize) -> Placement {
    let blocks = align_blocks(graph);
    let mut block_x = compact_blocks(graph, &blocks, spacing);
    balance_blocks(graph, &blocks, &mut block_x, spacing, balance_passes);

    let mut cross: Vec<f32> = (0..graph.vertices.len())
        .map(|v| block_x[blocks.block_of[v]])
        .collect();

    let left = graph
        .vertices
        .iter()
        .enumerate()
        .map(|(v, vertex)| cross[v] - vertex.breadth / 2.0)
        .fold(f32::INFINITY, f32::min);
    if left.is_finite() {
        let shift = spacing.cross_margin - left;
        for x in &mut cross {
            *x += shift;
        }
    }

    Placement {
        cross,
        along: rank_centers(graph, spacing),
    }
}

/// Rank bands are as deep as their deepest vertex and separated by the rank gap.
fn rank_centers(graph: &LayerGraph, spacing: Spacing) -> Vec<f32> {
    let depths: Vec<f32> = graph
        .layers
        .iter()
        .map(|layer| {
            layer
                .iter()
                .map(|&v| graph.vertices[v].depth)
                .fold(0.0f32, f32::max)
        })
        .collect();

    let mut centers = Vec::with_capacity(depths.len());
    let mut cursor = spacing.along_margin;
    for depth in &depths {
        centers.push(cursor + depth / 2.0);
        cursor += depth + spacing.rank;
    }

    graph
        .vertices
        .iter()
        .map(|vertex| centers[vertex.rank])
        .collect()
}

#[derive(Debug, Clone)]
struct Blocks {
    block_of: Vec<usize>,
    members: Vec<Vec<usize>>,
    /// Sum of the segment weights holding each block together.
    weight: Vec<f32>,
}

/// Groups vertices into vertical blocks that share one cross coordinate.
///
/// Between each pair of adjacent layers, segments are taken greedily by the
/// heaviest weighted path reaching them from the top, so the main path claims
/// its vertices before branches do. A vertex joins at most one upper and one
/// lower partner and accepted pairs never cross.
fn align_blocks(graph: &LayerGraph) -> Blocks {
    let count = graph.vertices.len();
    let positions = graph.positions();

    let mut heavy = vec![0.0f32; count];
    for layer in &graph.layers {
        for &v in layer {
            heavy[v] = graph.up[v]
                .iter()
                .map(|&seg| heavy[graph.segments[seg].upper] + graph.segments[seg].weight)
                .fold(0.0f32, f32::max);
        }
    }

    let mut align_up: Vec<Option<usize>> = vec![None; count];
    let mut align_down: Vec<Option<usize>> = vec![None; count];
    let mut glue = vec![0.0f32; count];

    for layer in graph.layers.iter().skip(1) {
        let mut candidates: Vec<usize> = layer
            .iter()
            .flat_map(|&v| graph.up[v].iter().copied())
            .collect();
        candidates.sort_by(|&a, &b| {
            let sa = &graph.segments[a];
            let sb = &graph.segments[b];
            let virtual_count = |upper: usize, lower: usize| {
                graph.vertices[upper].is_virtual() as u8 + graph.vertices[lower].is_virtual() as u8
            };
            (heavy[sb.upper] + sb.weight)
                .total_cmp(&(heavy[sa.upper] + sa.weight))
                .then_with(|| {
                    virtual_count(sb.upper, sb.lower).cmp(&virtual_count(sa.upper, sa.lower))
                })
                .then_with(|| positions[sa.upper].cmp(&positions[sb.upper]))
                .then_with(|| positions[sa.lower].cmp(&positions[sb.lower]))
        });

        let mut accepted: Vec<(usize, usize)> = Vec::new();
        for seg in candidates {
            let segment = &graph.segments[seg];
            let (upper, lower) = (segment.upper, segment.lower);
            if align_down[upper].is_some() || align_up[lower].is_some() {
                continue;
            }
            let crosses = accepted.iter().any(|&(u, l)| {
                (positions[upper] < positions[u]) != (positions[lower] < positions[l])
            });
            if crosses {
                continue;
            }
            accepted.push((upper, lower));
            align_down[upper] = Some(lower);
            align_up[lower] = Some(upper);
            glue[lower] = segment.weight;
        }
    }

    let mut block_of = vec![usize::MAX; count];
    let mut members: Vec<Vec<usize>> = Vec::new();
    let mut weight: Vec<f32> = Vec::new();
    for layer in &graph.layers {
        for &v in layer {
            match align_up[v] {
                Some(upper) => {
                    let block = block_of[upper];
                    block_of[v] = block;
                    members[block].push(v);
                    weight[block] += glue[v];
                }
                None => {
                    block_of[v] = members.len();
                    members.push(vec![v]);
                    weight.push(0.0);
                }
            }
        }
    }

    Blocks {
        block_of,
        members,
        weight,
    }
}

fn separation(graph: &LayerGraph, left: usize, right: usize, spacing: Spacing) -> f32 {
    let gap = |v: usize| {
        if graph.vertices[v].is_virtual() {
            spacing.edge
        } else {
            spacing.node
        }
    };
    graph.vertices[left].breadth / 2.0
        + gap(left) / 2.0
        + gap(right) / 2.0
        + graph.vertices[right].breadth / 2.0
}

/// Packs blocks as far left as their in-layer neighbours allow.
fn compact_blocks(graph: &LayerGraph, blocks: &Blocks, spacing: Spacing) -> Vec<f32> {
    let block_count = blocks.members.len();
    let mut successors: Vec<Vec<(usize, f32)>> = vec![Vec::new(); block_count];
    let mut indeg = vec![0usize; block_count];
    for layer in &graph.layers {
        for pair in layer.windows(2) {
            let from = blocks.block_of[pair[0]];
            let to = blocks.block_of[pair[1]];
            successors[from].push((to, separation(graph, pair[0], pair[1], spacing)));
            indeg[to] += 1;
        }
    }

    let mut x = vec![0.0f32; block_count];
    let mut done = vec![false; block_count];
    let mut ready: BinaryHeap<Reverse<usize>> = (0..block_count)
        .filter(|&b| indeg[b] == 0)
        .map(Reverse)
        .collect();
    let mut processed = 0usize;
    loop {
        while let Some(Reverse(block)) = ready.pop() {
            if done[block] {
                continue;
            }
            done[block] = true;
            processed += 1;
            for &(next, sep) in &successors[block] {
                x[next] = x[next].max(x[block] + sep);
                indeg[next] = indeg[next].saturating_sub(1);
                if indeg[next] == 0 {
                    ready.push(Reverse(next));
                }
            }
        }
        if processed >= block_count {
            break;
        }
        // Alignments never cross, so this only guards against a malformed order.
        match (0..block_count).find(|&b| !done[b]) {
            Some(block) => ready.push(Reverse(block)),
            None => break,
        }
    }
    x
}

/// Moves each block toward the weighted mean of its neighbours, lightest
/// blocks first, without breaking in-layer separation. Whole blocks move, so
/// aligned segments stay straight.
fn balance_blocks(
    graph: &LayerGraph,
    blocks: &Blocks,
    block_x: &mut [f32],
    spacing: Spacing,
    passes: usize,
) {
    let positions = graph.positions();
    let mut sequence: Vec<usize> = (0..blocks.members.len()).collect();
    sequence.sort_by(|&a, &b| {
        blocks.weight[a]
            .total_cmp(&blocks.weight[b])
            .then_with(|| a.cmp(&b))
    });

    for _ in 0..passes {
        let mut moved = false;
        for &block in &sequence {
            let mut sum = 0.0f32;
            let mut total = 0.0f32;
            let mut low = f32::NEG_INFINITY;
            let mut high = f32::INFINITY;
            for &v in &blocks.members[block] {
                for &seg in graph.up[v].iter().chain(graph.down[v].iter()) {
                    let other = graph.other_end(seg, v);
                    let other_block = blocks.block_of[other];
                    if other_block == block {
                        continue;
                    }
                    let weight = graph.segments[seg].weight;
                    sum += block_x[other_block] * weight;
                    total += weight;
                }
                let layer = &graph.layers[graph.vertices[v].rank];
                let idx = positions[v];
                if idx > 0 {
                    let left = layer[idx - 1];
                    low = low.max(block_x[blocks.block_of[left]] + separation(graph, left, v, spacing));
                }
                if let Some(&right) = layer.get(idx + 1) {
                    high = high.min(block_x[blocks.block_of[right]] - separation(graph, v, right, spacing));
                }
            }
            if total <= 0.0 || low > high {
                continue;
            }
            let target = (sum / total).max(low).min(high);
            if (target - block_x[block]).abs() > 1e-3 {
                block_x[block] = target;
                moved = true;
            }
        }
        if !moved {
            break;
        }
    }
}
