use serde::{Deserialize, Serialize};
use tracing::debug;

use super::bridges::{compute_bridges, BridgeReport};
use super::snapshot::GraphSnapshot;
use super::staleness::{compute_staleness_at, StalenessReport};
use super::topology::{compute_topology, TopologyReport};
use crate::utils::now_millis;

const CONNECTIVITY_WEIGHT: f64 = 0.30;
const COMPONENTS_WEIGHT: f64 = 0.25;
const STALENESS_WEIGHT: f64 = 0.25;
const FRAGILITY_WEIGHT: f64 = 0.20;

/// Health sub-scores, each in [0, 1].
#[derive(Debug, Clone, Default, Serialize)]
pub struct HealthBreakdown {
    pub connectivity: f64,
    pub components: f64,
    pub staleness: f64,
    pub fragility: f64,
}

/// Full analysis report combining topology, staleness, bridges, and health.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub health_score: f64,
    pub health_breakdown: HealthBreakdown,
    pub topology: TopologyReport,
    pub staleness: StalenessReport,
    pub bridges: BridgeReport,
}

/// Configuration for the analyzer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    pub hub_threshold: usize,
    pub top_n: usize,
    pub stale_days: i64,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        AnalyzerConfig {
            hub_threshold: 10,
            top_n: 50,
            stale_days: 30,
        }
    }
}

/// Run all analyses and produce a combined report with health score.
pub fn analyze(snapshot: &GraphSnapshot, config: &AnalyzerConfig) -> AnalysisReport {
    analyze_at(snapshot, config, now_millis())
}

/// Same as [`analyze`], with staleness measured as of `now_ms`.
pub fn analyze_at(snapshot: &GraphSnapshot, config: &AnalyzerConfig, now_ms: i64) -> AnalysisReport {
    let topology = compute_topology(snapshot, config.hub_threshold, config.top_n);
    let staleness = compute_staleness_at(snapshot, config.stale_days, now_ms);
    let bridges = compute_bridges(snapshot);

    let health_breakdown = score(&topology, &staleness, &bridges);
    let health_score = CONNECTIVITY_WEIGHT * health_breakdown.connectivity
        + COMPONENTS_WEIGHT * health_breakdown.components
        + STALENESS_WEIGHT * health_breakdown.staleness
        + FRAGILITY_WEIGHT * health_breakdown.fragility;

    debug!(
        health_score,
        connectivity = health_breakdown.connectivity,
        components = health_breakdown.components,
        staleness = health_breakdown.staleness,
        fragility = health_breakdown.fragility,
        "graph analysis complete"
    );

    AnalysisReport {
        health_score,
        health_breakdown,
        topology,
        staleness,
        bridges,
    }
}

fn score(topology: &TopologyReport, staleness: &StalenessReport, bridges: &BridgeReport) -> HealthBreakdown {
    let total = topology.total_nodes as f64;
    if topology.total_nodes == 0 {
        return HealthBreakdown::default();
    }

    // Connectivity: penalize orphan ratio, capped at 20%
    let connectivity = 1.0 - (topology.orphan_count as f64 / total).min(0.2) * 5.0;

    // Components: ideal is 1 component
    let components = if topology.num_components > 0 {
        1.0 / topology.num_components as f64
    } else {
        0.0
    };

    // Staleness: penalize stale ratio, capped at 10%
    let stale = 1.0 - (staleness.stale_node_count as f64 / total).min(0.1) * 10.0;

    // Fragility: penalize articulation point ratio, capped at 5%
    let fragility = 1.0 - (bridges.ap_count as f64 / total).min(0.05) * 20.0;

    HealthBreakdown {
        connectivity: connectivity.clamp(0.0, 1.0),
        components: components.clamp(0.0, 1.0),
        staleness: stale.clamp(0.0, 1.0),
        fragility: fragility.clamp(0.0, 1.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph_analysis::snapshot::test_support::*;
    use std::collections::HashMap;

    #[test]
    fn test_health_empty_graph() {
        let report = analyze_at(&quick_snapshot(&[], &[]), &AnalyzerConfig::default(), NOW);
        assert_eq!(report.health_score, 0.0);
        assert_eq!(report.health_breakdown.connectivity, 0.0);
        assert_eq!(report.health_breakdown.components, 0.0);
        assert_eq!(report.health_breakdown.staleness, 0.0);
        assert_eq!(report.health_breakdown.fragility, 0.0);
    }

    #[test]
    fn test_health_perfect_triangle() {
        let snap = quick_snapshot(&["A", "B", "C"], &[("A", "B"), ("B", "C"), ("C", "A")]);
        let report = analyze_at(&snap, &AnalyzerConfig::default(), NOW);
        assert!((report.health_score - 1.0).abs() < 1e-9, "got {}", report.health_score);
    }

    #[test]
    fn test_health_score_range() {
        let snap = quick_snapshot(
            &["A", "B", "C", "D", "E"],
            &[("A", "B"), ("B", "C")],
        );
        let report = analyze_at(&snap, &AnalyzerConfig::default(), NOW);
        assert!(report.health_score >= 0.0 && report.health_score <= 1.0);

        let b = &report.health_breakdown;
        for sub in [b.connectivity, b.components, b.staleness, b.fragility] {
            assert!((0.0..=1.0).contains(&sub));
        }
        // 2 orphans of 5 saturates the penalty
        assert_eq!(b.connectivity, 0.0);
        // {A,B,C} {D} {E}
        assert!((b.components - 1.0 / 3.0).abs() < 1e-9);
        // B is 1 of 5 articulation points, past the 5% cap
        assert_eq!(b.fragility, 0.0);
    }

    #[test]
    fn test_health_weights() {
        // 20 nodes in a ring plus 1 orphan: ring has no articulation points
        let ids: Vec<String> = (0..20).map(|i| format!("r{:02}", i)).collect();
        let mut refs: Vec<&str> = ids.iter().map(|s| s.as_str()).collect();
        let edges: Vec<(&str, &str)> = (0..20).map(|i| (refs[i], refs[(i + 1) % 20])).collect();
        refs.push("solo");
        let snap = quick_snapshot(&refs, &edges);

        let report = analyze_at(&snap, &AnalyzerConfig::default(), NOW);
        let b = &report.health_breakdown;
        let orphan_ratio = 1.0 / 21.0;
        assert!((b.connectivity - (1.0 - orphan_ratio * 5.0)).abs() < 1e-9);
        assert!((b.components - 0.5).abs() < 1e-9);
        assert_eq!(b.staleness, 1.0);
        assert_eq!(b.fragility, 1.0);

        let expected = 0.30 * b.connectivity + 0.25 * 0.5 + 0.25 + 0.20;
        assert!((report.health_score - expected).abs() < 1e-9);
    }

    #[test]
    fn test_staleness_feeds_health() {
        let snap = GraphSnapshot::new(
            vec![
                node("old", days_ago(90), None, 0),
                node("fresh", NOW, None, 0),
            ],
            vec![edge(0, "fresh", "old", "related", days_ago(1))],
            HashMap::new(),
        );
        let report = analyze_at(&snap, &AnalyzerConfig::default(), NOW);
        assert_eq!(report.staleness.stale_node_count, 1);
        assert_eq!(report.health_breakdown.staleness, 0.0);
    }

    #[test]
    fn test_config_top_n_limits_lists() {
        let ids: Vec<String> = (0..10).map(|i| format!("n{}", i)).collect();
        let refs: Vec<&str> = ids.iter().map(|s| s.as_str()).collect();
        let snap = quick_snapshot(&refs, &[]);
        let config = AnalyzerConfig { top_n: 3, ..AnalyzerConfig::default() };
        let report = analyze_at(&snap, &config, NOW);
        assert_eq!(report.topology.orphan_count, 10);
        assert_eq!(report.topology.orphan_ids.len(), 3);
    }

    #[test]
    fn test_config_defaults_and_partial_json() {
        let config: AnalyzerConfig = serde_json::from_str(r#"{"stale_days": 90}"#).unwrap();
        assert_eq!(config.stale_days, 90);
        assert_eq!(config.hub_threshold, 10);
        assert_eq!(config.top_n, 50);
    }

    #[test]
    fn test_concurrent_analyze_shares_snapshot() {
        let snap = quick_snapshot(
            &["A", "B", "C", "D"],
            &[("A", "B"), ("B", "C"), ("C", "D")],
        );
        let config = AnalyzerConfig::default();
        let expected = analyze_at(&snap, &config, NOW).health_score;

        let scores: Vec<f64> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..4)
                .map(|_| s.spawn(|| analyze_at(&snap, &config, NOW).health_score))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        assert!(scores.iter().all(|&s| s == expected));
    }

    #[test]
    fn test_report_serializes() {
        let snap = quick_snapshot(&["A", "B"], &[("A", "B")]);
        let report = analyze_at(&snap, &AnalyzerConfig::default(), NOW);
        let json = serde_json::to_value(&report).unwrap();
        assert!(json["health_score"].is_number());
        assert!(json["topology"]["degree_histogram"].is_array());
        assert!(json["bridges"]["bridge_edges"].is_array());
        assert!(json["staleness"]["stale_nodes"].is_array());
    }
}
