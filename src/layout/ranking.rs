use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

/// A non-self-loop edge between two node indices. Parallel edges are folded
/// into one link carrying the heaviest weight.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct Link {
    pub source: usize,
    pub target: usize,
    pub weight: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub(super) struct Ranking {
    pub ranks: Vec<usize>,
    /// Per link: true when the link closes a cycle and is laid out reversed.
    pub reversed: Vec<bool>,
}

impl Ranking {
    pub fn max_rank(&self) -> usize {
        self.ranks.iter().copied().max().unwrap_or(0)
    }
}

/// Longest-path ranking over a topological walk in declaration order.
///
/// When the walk is blocked by a cycle, one blocked node is released: among
/// nodes that already have a placed predecessor, the one whose still-blocking
/// incoming links weigh least, then the earliest declared. Links that point
/// back to an earlier node of the walk become reversed links.
pub(super) fn assign_ranks(node_count: usize, links: &[Link]) -> Ranking {
    let mut outgoing: Vec<Vec<usize>> = vec![Vec::new(); node_count];
    let mut incoming: Vec<Vec<usize>> = vec![Vec::new(); node_count];
    for (idx, link) in links.iter().enumerate() {
        outgoing[link.source].push(idx);
        incoming[link.target].push(idx);
    }

    let mut indeg: Vec<usize> = incoming.iter().map(Vec::len).collect();
    let mut placed = vec![false; node_count];
    let mut sequence = vec![usize::MAX; node_count];
    let mut order: Vec<usize> = Vec::with_capacity(node_count);

    let mut ready: BinaryHeap<Reverse<usize>> = (0..node_count)
        .filter(|&node| indeg[node] == 0)
        .map(Reverse)
        .collect();

    loop {
        while let Some(Reverse(node)) = ready.pop() {
            if placed[node] {
                continue;
            }
            placed[node] = true;
            sequence[node] = order.len();
            order.push(node);
            for &link_idx in &outgoing[node] {
                let next = links[link_idx].target;
                if placed[next] {
                    continue;
                }
                indeg[next] = indeg[next].saturating_sub(1);
                if indeg[next] == 0 {
                    ready.push(Reverse(next));
                }
            }
        }

        if order.len() >= node_count {
            break;
        }

        match release_blocked_node(links, &incoming, &placed) {
            Some(node) => {
                tracing::trace!(node, "cycle: releasing blocked node");
                ready.push(Reverse(node));
            }
            None => break,
        }
    }

    let mut ranks = vec![0usize; node_count];
    let mut reversed = vec![false; links.len()];
    for &node in &order {
        let rank = ranks[node];
        for &link_idx in &outgoing[node] {
            let next = links[link_idx].target;
            if sequence[next] <= sequence[node] {
                reversed[link_idx] = true;
                continue;
            }
            ranks[next] = ranks[next].max(rank + 1);
        }
    }

    Ranking { ranks, reversed }
}

fn release_blocked_node(links: &[Link], incoming: &[Vec<usize>], placed: &[bool]) -> Option<usize> {
    // (no placed predecessor, blocking weight, declaration index)
    let mut best: Option<(bool, f32, usize)> = None;
    for node in 0..placed.len() {
        if placed[node] {
            continue;
        }
        let mut has_placed_pred = false;
        let mut blocking = 0.0f32;
        for &link_idx in &incoming[node] {
            let link = &links[link_idx];
            if placed[link.source] {
                has_placed_pred = true;
            } else {
                blocking += link.weight;
            }
        }
        let candidate = (!has_placed_pred, blocking, node);
        let better = match best {
            None => true,
            Some(current) => {
                candidate
                    .0
                    .cmp(&current.0)
                    .then_with(|| candidate.1.total_cmp(&current.1))
                    .then_with(|| candidate.2.cmp(&current.2))
                    == Ordering::Less
            }
        };
        if better {
            best = Some(candidate);
        }
    }
    best.map(|(_, _, node)| node)
}
