use serde::Serialize;

use super::snapshot::GraphSnapshot;
use crate::db::EdgeType;
use crate::utils::{now_millis, MS_PER_DAY};

/// Incoming edges created within this window count as recent references.
pub const RECENT_WINDOW_MS: i64 = 7 * MS_PER_DAY;

/// A node that hasn't been updated recently but is still being linked to.
#[derive(Debug, Clone, Serialize)]
pub struct StaleNode {
    pub id: String,
    pub title: String,
    pub days_since_update: i64,
    pub recent_reference_count: usize,
}

/// A summary node whose subject changed after the summary was last written.
#[derive(Debug, Clone, Serialize)]
pub struct StaleSummary {
    pub summary_node_id: String,
    pub summary_title: String,
    pub target_node_id: String,
    pub target_title: String,
    pub drift_days: i64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct StalenessReport {
    pub stale_nodes: Vec<StaleNode>,
    pub stale_summaries: Vec<StaleSummary>,
    pub stale_node_count: usize,
    pub stale_summary_count: usize,
}

/// Compute staleness against the current wall clock.
pub fn compute_staleness(snapshot: &GraphSnapshot, stale_days: i64) -> StalenessReport {
    compute_staleness_at(snapshot, stale_days, now_millis())
}

/// Compute staleness as of `now_ms` (Unix epoch milliseconds).
///
/// - `stale_days`: minimum age since last update, exclusive
pub fn compute_staleness_at(snapshot: &GraphSnapshot, stale_days: i64, now_ms: i64) -> StalenessReport {
    let stale_threshold_ms = stale_days.saturating_mul(MS_PER_DAY);

    // Stale nodes: old update + recent incoming references
    let mut stale_nodes: Vec<StaleNode> = Vec::new();
    for id in snapshot.node_ids() {
        let Some(node) = snapshot.node(id) else { continue };
        let age_ms = now_ms.saturating_sub(node.updated_at);
        if age_ms <= stale_threshold_ms {
            continue;
        }

        let recent_count = snapshot
            .incoming_edges(id)
            .filter(|e| e.source != e.target)
            .filter(|e| now_ms.saturating_sub(e.created_at) < RECENT_WINDOW_MS)
            .count();

        if recent_count > 0 {
            stale_nodes.push(StaleNode {
                id: id.to_string(),
                title: node.title.clone(),
                days_since_update: age_ms / MS_PER_DAY,
                recent_reference_count: recent_count,
            });
        }
    }

    // Stable sort keeps ID order among equal counts
    stale_nodes.sort_by(|a, b| b.recent_reference_count.cmp(&a.recent_reference_count));

    // Stale summaries: "summarizes" edges where target was updated after source
    let mut stale_summaries: Vec<StaleSummary> = Vec::new();
    for e in snapshot.edges() {
        if e.edge_type != EdgeType::Summarizes {
            continue;
        }
        let (Some(summary), Some(target)) = (snapshot.node(&e.source), snapshot.node(&e.target)) else {
            continue;
        };

        if target.updated_at > summary.updated_at {
            stale_summaries.push(StaleSummary {
                summary_node_id: summary.id.clone(),
                summary_title: summary.title.clone(),
                target_node_id: target.id.clone(),
                target_title: target.title.clone(),
                drift_days: target.updated_at.saturating_sub(summary.updated_at) / MS_PER_DAY,
            });
        }
    }

    stale_summaries.sort_by(|a, b| {
        b.drift_days
            .cmp(&a.drift_days)
            .then_with(|| a.summary_node_id.cmp(&b.summary_node_id))
            .then_with(|| a.target_node_id.cmp(&b.target_node_id))
    });

    StalenessReport {
        stale_node_count: stale_nodes.len(),
        stale_summary_count: stale_summaries.len(),
        stale_nodes,
        stale_summaries,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph_analysis::snapshot::test_support::*;
    use std::collections::HashMap;

    #[test]
    fn test_staleness_detection() {
        let snap = GraphSnapshot::new(
            vec![
                node("old", days_ago(90), None, 0),
                node("fresh", NOW, None, 0),
            ],
            vec![edge(0, "fresh", "old", "related", days_ago(1))],
            HashMap::new(),
        );

        let report = compute_staleness_at(&snap, 30, NOW);
        assert_eq!(report.stale_node_count, 1);
        assert_eq!(report.stale_nodes[0].id, "old");
        assert_eq!(report.stale_nodes[0].days_since_update, 90);
        assert_eq!(report.stale_nodes[0].recent_reference_count, 1);
    }

    #[test]
    fn test_stale_without_recent_reference_excluded() {
        let snap = GraphSnapshot::new(
            vec![
                node("old", days_ago(90), None, 0),
                node("other", NOW, None, 0),
            ],
            vec![edge(0, "other", "old", "related", days_ago(8))],
            HashMap::new(),
        );
        assert_eq!(compute_staleness_at(&snap, 30, NOW).stale_node_count, 0);
    }

    #[test]
    fn test_outgoing_edges_do_not_count() {
        let snap = GraphSnapshot::new(
            vec![
                node("old", days_ago(90), None, 0),
                node("other", NOW, None, 0),
            ],
            vec![edge(0, "old", "other", "related", days_ago(1))],
            HashMap::new(),
        );
        assert_eq!(compute_staleness_at(&snap, 30, NOW).stale_node_count, 0);
    }

    #[test]
    fn test_self_loop_not_a_reference() {
        let snap = GraphSnapshot::new(
            vec![node("old", days_ago(90), None, 0)],
            vec![edge(0, "old", "old", "related", days_ago(1))],
            HashMap::new(),
        );
        assert_eq!(compute_staleness_at(&snap, 30, NOW).stale_node_count, 0);
    }

    #[test]
    fn test_age_threshold_is_exclusive() {
        let snap = GraphSnapshot::new(
            vec![
                node("edge", days_ago(30), None, 0),
                node("src", NOW, None, 0),
            ],
            vec![edge(0, "src", "edge", "related", days_ago(1))],
            HashMap::new(),
        );
        assert_eq!(compute_staleness_at(&snap, 30, NOW).stale_node_count, 0);
        assert_eq!(compute_staleness_at(&snap, 29, NOW).stale_node_count, 1);
    }

    #[test]
    fn test_stale_nodes_sorted_by_reference_count() {
        let snap = GraphSnapshot::new(
            vec![
                node("a", days_ago(60), None, 0),
                node("b", days_ago(60), None, 0),
                node("x", NOW, None, 0),
                node("y", NOW, None, 0),
                node("z", NOW, None, 0),
            ],
            vec![
                edge(0, "x", "a", "related", days_ago(2)),
                edge(1, "x", "b", "related", days_ago(2)),
                edge(2, "y", "b", "related", days_ago(3)),
                edge(3, "z", "b", "related", days_ago(4)),
                // dangling, ignored
                edge(4, "ghost", "a", "related", days_ago(1)),
            ],
            HashMap::new(),
        );
        let report = compute_staleness_at(&snap, 30, NOW);
        let counts: Vec<(&str, usize)> = report
            .stale_nodes
            .iter()
            .map(|s| (s.id.as_str(), s.recent_reference_count))
            .collect();
        assert_eq!(counts, vec![("b", 3), ("a", 1)]);
    }

    #[test]
    fn test_stale_summary() {
        // Summary written 10 days ago, target updated 5 days ago
        let snap = GraphSnapshot::new(
            vec![
                node("summary", days_ago(10), None, 0),
                node("target", days_ago(5), None, 0),
            ],
            vec![edge(0, "summary", "target", "summarizes", days_ago(10))],
            HashMap::new(),
        );

        let report = compute_staleness_at(&snap, 30, NOW);
        assert_eq!(report.stale_summary_count, 1);
        let s = &report.stale_summaries[0];
        assert_eq!(s.summary_node_id, "summary");
        assert_eq!(s.target_node_id, "target");
        assert_eq!(s.drift_days, 5);
    }

    #[test]
    fn test_summary_reversed_or_equal_not_flagged() {
        let snap = GraphSnapshot::new(
            vec![
                node("newer_summary", days_ago(1), None, 0),
                node("older_target", days_ago(6), None, 0),
                node("same_a", days_ago(3), None, 0),
                node("same_b", days_ago(3), None, 0),
            ],
            vec![
                edge(0, "newer_summary", "older_target", "summarizes", days_ago(1)),
                edge(1, "same_a", "same_b", "summarizes", days_ago(3)),
            ],
            HashMap::new(),
        );
        assert_eq!(compute_staleness_at(&snap, 30, NOW).stale_summary_count, 0);
    }

    #[test]
    fn test_only_summarizes_edges_checked() {
        let snap = GraphSnapshot::new(
            vec![
                node("s", days_ago(10), None, 0),
                node("t", days_ago(1), None, 0),
            ],
            vec![
                edge(0, "s", "t", "related", days_ago(10)),
                edge(1, "s", "t", "Summarizes", days_ago(10)),
                edge(2, "s", "missing", "summarizes", days_ago(10)),
            ],
            HashMap::new(),
        );
        let report = compute_staleness_at(&snap, 30, NOW);
        assert_eq!(report.stale_summary_count, 1);
        assert_eq!(report.stale_summaries[0].drift_days, 9);
    }

    #[test]
    fn test_extreme_timestamps_saturate() {
        let snap = GraphSnapshot::new(
            vec![
                node("ancient", i64::MIN, None, 0),
                node("src", NOW, None, 0),
                node("future", i64::MAX, None, 0),
            ],
            vec![
                edge(0, "src", "ancient", "related", days_ago(1)),
                edge(1, "ancient", "future", "summarizes", i64::MIN),
                edge(2, "src", "future", "related", i64::MIN),
            ],
            HashMap::new(),
        );
        let report = compute_staleness_at(&snap, 30, NOW);
        assert_eq!(report.stale_node_count, 1);
        assert_eq!(report.stale_nodes[0].id, "ancient");
        assert_eq!(report.stale_nodes[0].days_since_update, i64::MAX / MS_PER_DAY);
        assert_eq!(report.stale_summary_count, 1);
        assert_eq!(report.stale_summaries[0].drift_days, i64::MAX / MS_PER_DAY);
    }

    #[test]
    fn test_stale_summaries_sorted_by_drift() {
        let snap = GraphSnapshot::new(
            vec![
                node("s1", days_ago(20), None, 0),
                node("s2", days_ago(20), None, 0),
                node("t1", days_ago(18), None, 0),
                node("t2", days_ago(2), None, 0),
            ],
            vec![
                edge(0, "s1", "t1", "summarizes", days_ago(20)),
                edge(1, "s2", "t2", "summarizes", days_ago(20)),
            ],
            HashMap::new(),
        );
        let report = compute_staleness_at(&snap, 30, NOW);
        let drifts: Vec<i64> = report.stale_summaries.iter().map(|s| s.drift_days).collect();
        assert_eq!(drifts, vec![18, 2]);
    }
}
