use std::collections::{HashMap, HashSet};
use serde::Serialize;

use super::snapshot::GraphSnapshot;

/// Region pairs joined by this many cross edges or fewer are reported as fragile.
pub const FRAGILE_MAX_CROSS_EDGES: usize = 2;

/// A node whose removal would disconnect the graph.
#[derive(Debug, Clone, Serialize)]
pub struct ArticulationPoint {
    pub id: String,
    pub title: String,
    /// Number of distinct neighbours, used as a disruption estimate. This is
    /// not a recount of components after removal, despite the name.
    pub components_if_removed: usize,
}

/// An edge whose removal would disconnect the graph.
/// Endpoints are in DFS order (tree parent first), not original edge direction.
#[derive(Debug, Clone, Serialize)]
pub struct BridgeEdge {
    pub source_id: String,
    pub target_id: String,
    pub source_title: String,
    pub target_title: String,
}

/// Two regions connected by very few edges.
#[derive(Debug, Clone, Serialize)]
pub struct FragileConnection {
    pub region_a: String,
    pub region_b: String,
    pub cross_edges: usize,
}

/// Bridge analysis report.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BridgeReport {
    pub articulation_points: Vec<ArticulationPoint>,
    pub bridge_edges: Vec<BridgeEdge>,
    pub fragile_connections: Vec<FragileConnection>,
    pub ap_count: usize,
    pub bridge_count: usize,
}

/// DFS stack frame: the node being expanded, its tree parent, and the position
/// of the next neighbour to look at.
struct Frame {
    node: usize,
    parent: Option<usize>,
    next: usize,
}

/// Compute bridges, articulation points, and fragile inter-region connections.
///
/// Uses iterative Tarjan's algorithm to avoid stack overflow on large graphs.
pub fn compute_bridges(snapshot: &GraphSnapshot) -> BridgeReport {
    if snapshot.nodes().is_empty() {
        return BridgeReport::default();
    }

    // Sorted IDs give every run the same DFS order
    let node_ids = snapshot.node_ids();
    let id_to_idx: HashMap<&str, usize> = node_ids
        .iter()
        .enumerate()
        .map(|(i, id)| (*id, i))
        .collect();
    let n = node_ids.len();

    // Build deduplicated undirected adjacency (as indices). Self-loops never
    // affect connectivity, so they are dropped here.
    let mut adj_idx: Vec<Vec<usize>> = vec![vec![]; n];
    let mut seen_edges: HashSet<(usize, usize)> = HashSet::new();
    for e in snapshot.edges() {
        if let (Some(&u), Some(&v)) = (id_to_idx.get(e.source.as_str()), id_to_idx.get(e.target.as_str())) {
            if u == v {
                continue;
            }
            let key = if u < v { (u, v) } else { (v, u) };
            if seen_edges.insert(key) {
                adj_idx[u].push(v);
                adj_idx[v].push(u);
            }
        }
    }

    // disc == 0 means unvisited; counters start at 1
    let mut disc = vec![0u32; n];
    let mut low = vec![0u32; n];
    let mut counter: u32 = 1;

    let mut is_ap = vec![false; n];
    let mut bridge_pairs: Vec<(usize, usize)> = Vec::new();
    let mut stack: Vec<Frame> = Vec::new();

    for start in 0..n {
        if disc[start] != 0 {
            continue;
        }

        disc[start] = counter;
        low[start] = counter;
        counter += 1;
        stack.push(Frame { node: start, parent: None, next: 0 });

        let mut root_children: usize = 0;

        while let Some(frame) = stack.last_mut() {
            let node = frame.node;

            if frame.next < adj_idx[node].len() {
                let child = adj_idx[node][frame.next];
                frame.next += 1;

                if Some(child) == frame.parent {
                    continue;
                }

                if disc[child] != 0 {
                    // Back edge
                    low[node] = low[node].min(disc[child]);
                } else {
                    // Tree edge
                    disc[child] = counter;
                    low[child] = counter;
                    counter += 1;

                    if node == start {
                        root_children += 1;
                    }

                    stack.push(Frame { node: child, parent: Some(node), next: 0 });
                }
            } else {
                // All neighbours done: pop and propagate low to the tree parent
                stack.pop();

                if let Some(parent_frame) = stack.last() {
                    let pn = parent_frame.node;
                    low[pn] = low[pn].min(low[node]);

                    if low[node] > disc[pn] {
                        bridge_pairs.push((pn, node));
                    }

                    if pn != start && low[node] >= disc[pn] {
                        is_ap[pn] = true;
                    }
                }
            }
        }

        if root_children >= 2 {
            is_ap[start] = true;
        }
    }

    let title_of = |id: &str| snapshot.node(id).map(|n| n.title.clone()).unwrap_or_default();

    let articulation_points: Vec<ArticulationPoint> = (0..n)
        .filter(|&i| is_ap[i])
        .map(|i| ArticulationPoint {
            id: node_ids[i].to_string(),
            title: title_of(node_ids[i]),
            components_if_removed: adj_idx[i].len(),
        })
        .collect();

    let bridge_edges: Vec<BridgeEdge> = bridge_pairs
        .iter()
        .map(|&(u, v)| BridgeEdge {
            source_id: node_ids[u].to_string(),
            target_id: node_ids[v].to_string(),
            source_title: title_of(node_ids[u]),
            target_title: title_of(node_ids[v]),
        })
        .collect();

    let fragile_connections = fragile_connections(snapshot);

    BridgeReport {
        ap_count: articulation_points.len(),
        bridge_count: bridge_edges.len(),
        articulation_points,
        bridge_edges,
        fragile_connections,
    }
}

/// Count cross-region edges per unordered region pair and keep the sparse ones,
/// most fragile first.
fn fragile_connections(snapshot: &GraphSnapshot) -> Vec<FragileConnection> {
    let mut region_pairs: HashMap<(&str, &str), usize> = HashMap::new();
    for e in snapshot.edges() {
        if !snapshot.is_valid_edge(e) {
            continue;
        }
        let ra = snapshot.region(&e.source);
        let rb = snapshot.region(&e.target);
        if ra == rb {
            continue;
        }
        // Canonical order so (A,B) == (B,A)
        let key = if ra < rb { (ra, rb) } else { (rb, ra) };
        *region_pairs.entry(key).or_insert(0) += 1;
    }

    let mut fragile: Vec<FragileConnection> = region_pairs
        .into_iter()
        .filter(|(_, count)| *count <= FRAGILE_MAX_CROSS_EDGES)
        .map(|((a, b), count)| FragileConnection {
            region_a: a.to_string(),
            region_b: b.to_string(),
            cross_edges: count,
        })
        .collect();

    fragile.sort_by(|a, b| {
        a.cross_edges
            .cmp(&b.cross_edges)
            .then_with(|| a.region_a.cmp(&b.region_a))
            .then_with(|| a.region_b.cmp(&b.region_b))
    });
    fragile
}
