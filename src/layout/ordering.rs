use std::cmp::Ordering;
use std::collections::HashMap;

use super::ranking::{Link, Ranking};

/// A vertex of the layered graph: a real node, or a virtual vertex standing in
/// for a long edge on an intermediate rank.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct Vertex {
    pub node: Option<usize>,
    pub rank: usize,
    /// Extent across the flow axis.
    pub breadth: f32,
    /// Extent along the flow axis.
    pub depth: f32,
}

impl Vertex {
    pub fn is_virtual(&self) -> bool {
        self.node.is_none()
    }
}

/// Edge piece between two adjacent ranks, always pointing downwards.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct Segment {
    pub upper: usize,
    pub lower: usize,
    pub weight: f32,
}

#[derive(Debug, Clone)]
pub(super) struct LayerGraph {
    pub vertices: Vec<Vertex>,
    pub segments: Vec<Segment>,
    pub layers: Vec<Vec<usize>>,
    /// Segment indices whose lower end is the vertex.
    pub up: Vec<Vec<usize>>,
    /// Segment indices whose upper end is the vertex.
    pub down: Vec<Vec<usize>>,
}

impl LayerGraph {
    /// Splits every link into unit segments, inserting virtual vertices on the
    /// ranks a long link crosses. Reversed links are laid out upside down and
    /// links between nodes of the same rank are left to the router.
    pub fn build(ranking: &Ranking, links: &[Link], extents: &[(f32, f32)]) -> Self {
        let mut vertices: Vec<Vertex> = extents
            .iter()
            .enumerate()
            .map(|(node, &(breadth, depth))| Vertex {
                node: Some(node),
                rank: ranking.ranks[node],
                breadth,
                depth,
            })
            .collect();
        let mut segments: Vec<Segment> = Vec::new();
        let mut unit_segments: HashMap<(usize, usize), usize> = HashMap::new();

        for (idx, link) in links.iter().enumerate() {
            let (upper, lower) = if ranking.reversed[idx] {
                (link.target, link.source)
            } else {
                (link.source, link.target)
            };
            let upper_rank = ranking.ranks[upper];
            let lower_rank = ranking.ranks[lower];
            if lower_rank <= upper_rank {
                continue;
            }
            if lower_rank == upper_rank + 1 {
                if let Some(&existing) = unit_segments.get(&(upper, lower)) {
                    segments[existing].weight += link.weight;
                } else {
                    unit_segments.insert((upper, lower), segments.len());
                    segments.push(Segment {
                        upper,
                        lower,
                        weight: link.weight,
                    });
                }
                continue;
            }
            let mut previous = upper;
            for rank in upper_rank + 1..lower_rank {
                let id = vertices.len();
                vertices.push(Vertex {
                    node: None,
                    rank,
                    breadth: 0.0,
                    depth: 0.0,
                });
                segments.push(Segment {
                    upper: previous,
                    lower: id,
                    weight: link.weight,
                });
                previous = id;
            }
            segments.push(Segment {
                upper: previous,
                lower,
                weight: link.weight,
            });
        }

        let mut up = vec![Vec::new(); vertices.len()];
        let mut down = vec![Vec::new(); vertices.len()];
        for (idx, segment) in segments.iter().enumerate() {
            down[segment.upper].push(idx);
            up[segment.lower].push(idx);
        }

        let layer_count = vertices.iter().map(|v| v.rank + 1).max().unwrap_or(0);
        let mut graph = Self {
            vertices,
            segments,
            layers: vec![Vec::new(); layer_count],
            up,
            down,
        };
        graph.init_order(extents.len());
        graph
    }

    /// Depth-first placement from the real vertices in (rank, declaration)
    /// order, following outgoing segments in edge order. Keeps a branch's
    /// descendants next to each other before any sweep runs.
    fn init_order(&mut self, real_count: usize) {
        let mut starts: Vec<usize> = (0..real_count).collect();
        starts.sort_by_key(|&v| (self.vertices[v].rank, v));

        let mut visited = vec![false; self.vertices.len()];
        let mut stack: Vec<usize> = Vec::new();
        for start in starts {
            if visited[start] {
                continue;
            }
            stack.push(start);
            while let Some(v) = stack.pop() {
                if visited[v] {
                    continue;
                }
                visited[v] = true;
                self.layers[self.vertices[v].rank].push(v);
                for &seg in self.down[v].iter().rev() {
                    let next = self.segments[seg].lower;
                    if !visited[next] {
                        stack.push(next);
                    }
                }
            }
        }
    }

    pub fn positions(&self) -> Vec<usize> {
        let mut positions = vec![0usize; self.vertices.len()];
        for layer in &self.layers {
            for (idx, &v) in layer.iter().enumerate() {
                positions[v] = idx;
            }
        }
        positions
    }

    pub fn other_end(&self, segment: usize, vertex: usize) -> usize {
        let segment = &self.segments[segment];
        if segment.upper == vertex {
            segment.lower
        } else {
            segment.upper
        }
    }

    /// Weighted crossings between every pair of adjacent layers.
    pub fn crossings(&self) -> f32 {
        let positions = self.positions();
        let mut total = 0.0;
        for layer in &self.layers {
            let segs: Vec<usize> = layer
                .iter()
                .flat_map(|&v| self.down[v].iter().copied())
                .collect();
            for (i, &a) in segs.iter().enumerate() {
                for &b in &segs[i + 1..] {
                    let sa = &self.segments[a];
                    let sb = &self.segments[b];
                    let du = positions[sa.upper] as i64 - positions[sb.upper] as i64;
                    let dl = positions[sa.lower] as i64 - positions[sb.lower] as i64;
                    if du * dl < 0 {
                        total += sa.weight * sb.weight;
                    }
                }
            }
        }
        total
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Sweep {
    Down,
    Up,
}

/// Alternating down/up sweeps sorting each layer by the weighted barycenter of
/// its neighbours in the fixed layer. The layering with the fewest weighted
/// crossings seen is kept.
pub(super) fn order_layers(graph: &mut LayerGraph, passes: usize) {
    if graph.layers.len() <= 1 {
        return;
    }
    let mut best = graph.layers.clone();
    let mut best_crossings = graph.crossings();

    for pass in 0..passes.max(1) {
        if best_crossings <= 0.0 {
            break;
        }
        for rank in 1..graph.layers.len() {
            sort_layer(graph, rank, Sweep::Down);
        }
        for rank in (0..graph.layers.len() - 1).rev() {
            sort_layer(graph, rank, Sweep::Up);
        }
        let crossings = graph.crossings();
        tracing::trace!(pass, crossings, "ordering sweep");
        if crossings < best_crossings {
            best_crossings = crossings;
            best = graph.layers.clone();
        }
    }

    graph.layers = best;
}

fn sort_layer(graph: &mut LayerGraph, rank: usize, sweep: Sweep) {
    if graph.layers[rank].len() <= 1 {
        return;
    }
    let positions = graph.positions();
    let mut keyed: Vec<(f32, usize, usize)> = graph.layers[rank]
        .iter()
        .enumerate()
        .map(|(current, &v)| {
            let neighbors = match sweep {
                Sweep::Down => &graph.up[v],
                Sweep::Up => &graph.down[v],
            };
            let key = barycenter(graph, v, neighbors, &positions).unwrap_or(current as f32);
            (key, current, v)
        })
        .collect();

    keyed.sort_by(|a, b| match a.0.partial_cmp(&b.0) {
        Some(Ordering::Equal) | None => a.1.cmp(&b.1).then_with(|| a.2.cmp(&b.2)),
        Some(ordering) => ordering,
    });

    graph.layers[rank] = keyed.into_iter().map(|(_, _, v)| v).collect();
}

fn barycenter(graph: &LayerGraph, vertex: usize, segments: &[usize], positions: &[usize]) -> Option<f32> {
    let mut sum = 0.0f32;
    let mut total = 0.0f32;
    for &seg in segments {
        let weight = graph.segments[seg].weight;
        let other = graph.other_end(seg, vertex);
        sum += positions[other] as f32 * weight;
        total += weight;
    }
    if total > 0.0 { Some(sum / total) } else { None }
}
