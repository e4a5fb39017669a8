//! Immutable, adjacency-indexed view of the graph used by every analyzer.

use std::collections::{HashMap, HashSet};
use tracing::{debug, info};

use crate::db::{Database, Edge, EdgeType, Node};
use crate::error::LoadError;

/// Region label for nodes the clustering step never placed.
pub const UNASSIGNED_REGION: &str = "unassigned";

/// Lightweight node info decoupled from DB types.
#[derive(Debug, Clone)]
pub struct NodeInfo {
    pub id: String,
    pub title: String,
    pub node_type: String,
    pub created_at: i64,
    pub updated_at: i64,
    pub parent_id: Option<String>,
    pub depth: i32,
    pub is_item: bool,
}

/// Lightweight edge info decoupled from DB types.
#[derive(Debug, Clone)]
pub struct EdgeInfo {
    pub id: String,
    pub source: String,
    pub target: String,
    pub edge_type: EdgeType,
    pub created_at: i64,
    pub updated_at: Option<i64>,
}

impl From<Node> for NodeInfo {
    fn from(n: Node) -> Self {
        NodeInfo {
            id: n.id,
            title: n.title,
            node_type: n.node_type,
            created_at: n.created_at,
            updated_at: n.updated_at,
            parent_id: n.parent_id,
            depth: n.depth,
            is_item: n.is_item,
        }
    }
}

impl From<Edge> for EdgeInfo {
    fn from(e: Edge) -> Self {
        EdgeInfo {
            id: e.id,
            source: e.source,
            target: e.target,
            edge_type: e.edge_type,
            created_at: e.created_at,
            updated_at: e.updated_at,
        }
    }
}

/// Immutable snapshot of the graph with precomputed adjacency and region maps.
///
/// Built once per analysis. Edges whose endpoints are missing from the node set
/// are kept in `edges()` (they still count toward totals) but never enter any
/// adjacency structure.
#[derive(Debug, Clone)]
pub struct GraphSnapshot {
    nodes: HashMap<String, NodeInfo>,
    edges: Vec<EdgeInfo>,
    /// Undirected adjacency: node_id -> set of distinct neighbor ids
    adj: HashMap<String, HashSet<String>>,
    /// Directed outgoing: source -> targets, one entry per edge
    out_adj: HashMap<String, Vec<String>>,
    /// Directed incoming: target -> sources, one entry per edge
    in_adj: HashMap<String, Vec<String>>,
    /// target -> indices into `edges` of valid edges pointing at it
    in_edges: HashMap<String, Vec<usize>>,
    regions: HashMap<String, String>,
}

impl GraphSnapshot {
    /// Build a snapshot from raw node/edge records and an upstream region map.
    /// Nodes absent from `regions` are labelled [`UNASSIGNED_REGION`].
    pub fn new(nodes: Vec<NodeInfo>, edges: Vec<EdgeInfo>, regions: HashMap<String, String>) -> Self {
        let node_map: HashMap<String, NodeInfo> = nodes
            .into_iter()
            .map(|n| (n.id.clone(), n))
            .collect();

        let mut adj: HashMap<String, HashSet<String>> = HashMap::with_capacity(node_map.len());
        let mut out_adj: HashMap<String, Vec<String>> = HashMap::with_capacity(node_map.len());
        let mut in_adj: HashMap<String, Vec<String>> = HashMap::with_capacity(node_map.len());
        let mut in_edges: HashMap<String, Vec<usize>> = HashMap::new();

        // Ensure every node has an entry even if it has no edges
        for id in node_map.keys() {
            adj.insert(id.clone(), HashSet::new());
            out_adj.insert(id.clone(), Vec::new());
            in_adj.insert(id.clone(), Vec::new());
        }

        let mut dropped = 0usize;
        for (i, e) in edges.iter().enumerate() {
            if !(node_map.contains_key(&e.source) && node_map.contains_key(&e.target)) {
                dropped += 1;
                continue;
            }
            adj.entry(e.source.clone()).or_default().insert(e.target.clone());
            adj.entry(e.target.clone()).or_default().insert(e.source.clone());
            out_adj.entry(e.source.clone()).or_default().push(e.target.clone());
            in_adj.entry(e.target.clone()).or_default().push(e.source.clone());
            in_edges.entry(e.target.clone()).or_default().push(i);
        }

        if dropped > 0 {
            debug!(dropped, "edges reference nodes outside the snapshot; excluded from adjacency");
        }

        let regions = node_map
            .keys()
            .map(|id| {
                let label = regions
                    .get(id)
                    .cloned()
                    .unwrap_or_else(|| UNASSIGNED_REGION.to_string());
                (id.clone(), label)
            })
            .collect();

        GraphSnapshot {
            nodes: node_map,
            edges,
            adj,
            out_adj,
            in_adj,
            in_edges,
            regions,
        }
    }

    /// Build a snapshot whose regions are derived from the node hierarchy
    /// (see [`hierarchy_regions`]).
    pub fn with_hierarchy_regions(nodes: Vec<NodeInfo>, edges: Vec<EdgeInfo>) -> Self {
        let regions = hierarchy_regions(&nodes);
        Self::new(nodes, edges, regions)
    }

    /// Load a snapshot directly from the database. Any storage error aborts the
    /// load; there is no partial snapshot.
    pub fn from_db(db: &Database) -> Result<Self, LoadError> {
        let nodes: Vec<NodeInfo> = db.get_all_nodes()?.into_iter().map(NodeInfo::from).collect();
        let edges: Vec<EdgeInfo> = db.get_all_edges()?.into_iter().map(EdgeInfo::from).collect();

        info!(nodes = nodes.len(), edges = edges.len(), db = db.get_path(), "loaded graph snapshot");

        let unknown_types = count_unknown_edge_types(&edges);
        if unknown_types > 0 {
            debug!(unknown_types, "edges carry tags outside the known vocabulary");
        }

        Ok(Self::with_hierarchy_regions(nodes, edges))
    }

    /// Return a new snapshot restricted to `region_node_id` and its descendants.
    /// Only edges with both endpoints inside are kept; region labels carry over.
    pub fn filter_to_region(&self, region_node_id: &str) -> GraphSnapshot {
        let mut memo: HashMap<&str, bool> = HashMap::new();
        let kept: HashSet<&str> = self
            .nodes
            .keys()
            .map(|id| id.as_str())
            .filter(|id| self.descends_from(id, region_node_id, &mut memo))
            .collect();

        let nodes: Vec<NodeInfo> = self
            .nodes
            .values()
            .filter(|n| kept.contains(n.id.as_str()))
            .cloned()
            .collect();

        let edges: Vec<EdgeInfo> = self
            .edges
            .iter()
            .filter(|e| kept.contains(e.source.as_str()) && kept.contains(e.target.as_str()))
            .cloned()
            .collect();

        let regions: HashMap<String, String> = kept
            .iter()
            .filter_map(|id| self.regions.get(*id).map(|r| (id.to_string(), r.clone())))
            .collect();

        GraphSnapshot::new(nodes, edges, regions)
    }

    /// Walk the parent chain from `node_id`. Cycle-safe; results are memoized
    /// for every node on the walked path.
    fn descends_from<'a>(
        &'a self,
        node_id: &'a str,
        ancestor_id: &str,
        memo: &mut HashMap<&'a str, bool>,
    ) -> bool {
        let mut path: Vec<&'a str> = Vec::new();
        let mut seen: HashSet<&'a str> = HashSet::new();
        let mut current = node_id;

        let result = loop {
            if current == ancestor_id {
                break true;
            }
            if let Some(&cached) = memo.get(current) {
                break cached;
            }
            if !seen.insert(current) {
                break false;
            }
            path.push(current);
            match self.nodes.get(current).and_then(|n| n.parent_id.as_deref()) {
                Some(parent) => current = parent,
                None => break false,
            }
        };

        for id in path {
            memo.insert(id, result);
        }
        result
    }

    pub fn nodes(&self) -> &HashMap<String, NodeInfo> {
        &self.nodes
    }

    pub fn node(&self, id: &str) -> Option<&NodeInfo> {
        self.nodes.get(id)
    }

    /// All edges as supplied, including ones that reference missing nodes.
    pub fn edges(&self) -> &[EdgeInfo] {
        &self.edges
    }

    /// Whether both endpoints of `edge` exist in this snapshot.
    pub fn is_valid_edge(&self, edge: &EdgeInfo) -> bool {
        self.nodes.contains_key(&edge.source) && self.nodes.contains_key(&edge.target)
    }

    /// Node IDs in lexicographic order.
    pub fn node_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.nodes.keys().map(|s| s.as_str()).collect();
        ids.sort_unstable();
        ids
    }

    /// Distinct neighbours ignoring direction.
    pub fn neighbors(&self, id: &str) -> Option<&HashSet<String>> {
        self.adj.get(id)
    }

    /// Undirected degree: number of distinct neighbours.
    pub fn degree(&self, id: &str) -> usize {
        self.adj.get(id).map(|s| s.len()).unwrap_or(0)
    }

    /// Directed in-degree, counting parallel edges separately.
    pub fn in_degree(&self, id: &str) -> usize {
        self.in_adj.get(id).map(|v| v.len()).unwrap_or(0)
    }

    /// Directed out-degree, counting parallel edges separately.
    pub fn out_degree(&self, id: &str) -> usize {
        self.out_adj.get(id).map(|v| v.len()).unwrap_or(0)
    }

    /// Valid edges whose target is `id`.
    pub fn incoming_edges<'a>(&'a self, id: &str) -> impl Iterator<Item = &'a EdgeInfo> + 'a {
        self.in_edges
            .get(id)
            .into_iter()
            .flatten()
            .map(move |&i| &self.edges[i])
    }

    pub fn region(&self, id: &str) -> &str {
        self.regions.get(id).map(|s| s.as_str()).unwrap_or(UNASSIGNED_REGION)
    }

    pub fn regions(&self) -> &HashMap<String, String> {
        &self.regions
    }
}

/// Edges whose type tag is not one of the known variants.
fn count_unknown_edge_types(edges: &[EdgeInfo]) -> usize {
    edges.iter().filter(|e| !e.edge_type.is_known()).count()
}

/// Compute the depth-1 ancestor for each node. Nodes at depth 0 or 1 are their
/// own region; a broken parent chain or a parent cycle yields "unassigned".
pub fn hierarchy_regions(nodes: &[NodeInfo]) -> HashMap<String, String> {
    let by_id: HashMap<&str, &NodeInfo> = nodes.iter().map(|n| (n.id.as_str(), n)).collect();

    nodes
        .iter()
        .map(|n| {
            let region = if n.depth <= 1 {
                n.id.clone()
            } else {
                find_depth1_ancestor(&n.id, &by_id)
            };
            (n.id.clone(), region)
        })
        .collect()
}

/// Walk parent_id chain to find the depth-1 ancestor.
fn find_depth1_ancestor(node_id: &str, nodes: &HashMap<&str, &NodeInfo>) -> String {
    let mut current = node_id;
    let mut visited: HashSet<&str> = HashSet::new();

    loop {
        if !visited.insert(current) {
            return UNASSIGNED_REGION.to_string();
        }
        match nodes.get(current) {
            Some(n) if n.depth <= 1 => return current.to_string(),
            Some(n) => match n.parent_id.as_deref() {
                Some(pid) => current = pid,
                None => return UNASSIGNED_REGION.to_string(),
            },
            None => return UNASSIGNED_REGION.to_string(),
        }
    }
}
