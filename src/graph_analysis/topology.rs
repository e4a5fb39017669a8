use serde::Serialize;

use super::snapshot::GraphSnapshot;
use super::union_find::UnionFind;

/// Degree histogram buckets: 0, 1, 2-3, 4-7, 8-15, 16-31, 32+
pub const DEGREE_BUCKETS: [&str; 7] = ["0", "1", "2-3", "4-7", "8-15", "16-31", "32+"];

/// A node with high connectivity.
#[derive(Debug, Clone, Serialize)]
pub struct HubNode {
    pub id: String,
    pub title: String,
    /// Distinct neighbours, ignoring direction.
    pub degree: usize,
    pub in_degree: usize,
    pub out_degree: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DegreeBucket {
    pub label: String,
    pub count: usize,
}

/// Full topology report: components, orphans, degree distribution, hubs.
#[derive(Debug, Clone, Serialize)]
pub struct TopologyReport {
    pub total_nodes: usize,
    /// Every supplied edge, dangling ones included. This holds for an empty
    /// node set too, so a graph of only dangling edges reports a nonzero count.
    pub total_edges: usize,
    pub num_components: usize,
    pub largest_component: usize,
    pub smallest_component: usize,
    pub orphan_count: usize,
    /// Sorted by ID, capped at `top_n`.
    pub orphan_ids: Vec<String>,
    pub degree_histogram: Vec<DegreeBucket>,
    pub hubs: Vec<HubNode>,
}

impl TopologyReport {
    fn empty(total_edges: usize) -> Self {
        TopologyReport {
            total_nodes: 0,
            total_edges,
            num_components: 0,
            largest_component: 0,
            smallest_component: 0,
            orphan_count: 0,
            orphan_ids: vec![],
            degree_histogram: histogram_from_counts([0; 7]),
            hubs: vec![],
        }
    }
}

/// Compute topology metrics for the graph.
///
/// - `hub_threshold`: a node is a hub when its degree is strictly greater
/// - `top_n`: max number of orphans/hubs to return
pub fn compute_topology(snapshot: &GraphSnapshot, hub_threshold: usize, top_n: usize) -> TopologyReport {
    let total_nodes = snapshot.nodes().len();
    let total_edges = snapshot.edges().len();

    if total_nodes == 0 {
        return TopologyReport::empty(total_edges);
    }

    let node_ids = snapshot.node_ids();

    // Connected components via UnionFind
    let mut uf = UnionFind::new(&node_ids);
    for edge in snapshot.edges() {
        if snapshot.is_valid_edge(edge) {
            uf.union(&edge.source, &edge.target);
        }
    }

    let sizes = uf.component_sizes();
    let num_components = sizes.len();
    let largest_component = sizes.iter().copied().max().unwrap_or(0);
    let smallest_component = sizes.iter().copied().min().unwrap_or(0);

    let mut buckets = [0usize; 7];
    let mut orphans: Vec<String> = Vec::new();
    let mut hubs: Vec<HubNode> = Vec::new();

    // node_ids is sorted, so orphans come out in ID order and hub ties stay ID-ordered
    for id in &node_ids {
        let degree = snapshot.degree(id);
        buckets[degree_bucket(degree)] += 1;

        if degree == 0 {
            orphans.push(id.to_string());
        }

        if degree > hub_threshold {
            hubs.push(HubNode {
                id: id.to_string(),
                title: snapshot.node(id).map(|n| n.title.clone()).unwrap_or_default(),
                degree,
                in_degree: snapshot.in_degree(id),
                out_degree: snapshot.out_degree(id),
            });
        }
    }

    let orphan_count = orphans.len();
    orphans.truncate(top_n);

    hubs.sort_by(|a, b| b.degree.cmp(&a.degree));
    hubs.truncate(top_n);

    TopologyReport {
        total_nodes,
        total_edges,
        num_components,
        largest_component,
        smallest_component,
        orphan_count,
        orphan_ids: orphans,
        degree_histogram: histogram_from_counts(buckets),
        hubs,
    }
}

fn histogram_from_counts(counts: [usize; 7]) -> Vec<DegreeBucket> {
    DEGREE_BUCKETS
        .iter()
        .zip(counts)
        .map(|(label, count)| DegreeBucket { label: label.to_string(), count })
        .collect()
}

fn degree_bucket(degree: usize) -> usize {
    match degree {
        0 => 0,
        1 => 1,
        2..=3 => 2,
        4..=7 => 3,
        8..=15 => 4,
        16..=31 => 5,
        _ => 6,
    }
}
