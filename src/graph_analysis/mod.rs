//! Pure computation engine for graph structural analysis.
//!
//! Provides topology metrics, staleness detection, bridge/articulation-point analysis,
//! and a composite health score. All functions are pure: they take a `GraphSnapshot`
//! and return report structs. No I/O, no println. A snapshot is immutable once
//! built, so any number of analyses may share one across threads.
//!
//! ## Usage
//!
//! ```ignore
//! let snapshot = GraphSnapshot::from_db(&db)?;
//! let report = analyze(&snapshot, &AnalyzerConfig::default());
//! ```

mod bridges;
mod health;
mod snapshot;
mod staleness;
mod topology;
mod union_find;

pub use bridges::{
    compute_bridges, ArticulationPoint, BridgeEdge, BridgeReport, FragileConnection,
    FRAGILE_MAX_CROSS_EDGES,
};
pub use health::{analyze, analyze_at, AnalysisReport, AnalyzerConfig, HealthBreakdown};
pub use snapshot::{hierarchy_regions, EdgeInfo, GraphSnapshot, NodeInfo, UNASSIGNED_REGION};
pub use staleness::{
    compute_staleness, compute_staleness_at, StaleNode, StaleSummary, StalenessReport,
    RECENT_WINDOW_MS,
};
pub use topology::{compute_topology, DegreeBucket, HubNode, TopologyReport, DEGREE_BUCKETS};
pub use union_find::UnionFind;
