use mycelica_graph::db::Database;
use mycelica_graph::error::LoadError;
use mycelica_graph::graph_analysis::{
    analyze, AnalysisReport, AnalyzerConfig, BridgeReport, GraphSnapshot, HealthBreakdown,
    StalenessReport, TopologyReport,
};
use mycelica_graph::utils::{truncate_id, truncate_title};

/// Rows shown per list in the text report; `--json` carries everything.
const LIST_LIMIT: usize = 10;
const ORPHAN_LIMIT: usize = 5;
const BAR_WIDTH: usize = 20;
const RULE: &str = "────────────────────────────────────────";

pub(crate) fn handle_analyze(
    db: &Database,
    json: bool,
    region: Option<&str>,
    config: &AnalyzerConfig,
) -> Result<(), LoadError> {
    print!("{}", analyze_output(db, json, region, config)?);
    Ok(())
}

/// Load, optionally scope, analyze, and format. Nothing is printed here.
pub(crate) fn analyze_output(
    db: &Database,
    json: bool,
    region: Option<&str>,
    config: &AnalyzerConfig,
) -> Result<String, LoadError> {
    let mut snapshot = GraphSnapshot::from_db(db)?;
    if let Some(region_id) = region {
        snapshot = snapshot.filter_to_region(region_id);
    }

    let report = analyze(&snapshot, config);

    if json {
        return Ok(format!("{}\n", serde_json::to_string_pretty(&report)?));
    }

    let title_of = |id: &str| snapshot.node(id).map(|n| n.title.clone()).unwrap_or_else(|| id.to_string());
    Ok(render_report(&report, &title_of))
}

fn render_report(report: &AnalysisReport, title_of: &dyn Fn(&str) -> String) -> String {
    let mut lines = vec![String::new()];
    lines.extend(render_health(report.health_score, &report.health_breakdown));
    lines.push(String::new());
    lines.extend(render_topology(&report.topology, title_of));
    lines.extend(render_staleness(&report.staleness));
    lines.extend(render_fragility(&report.bridges, title_of));
    lines.push(String::new());
    lines.join("\n") + "\n"
}

fn section(name: &str) -> Vec<String> {
    vec![format!("  {}", name), format!("  {}", RULE)]
}

fn health_bar(score: f64) -> String {
    let filled = ((score * BAR_WIDTH as f64) as usize).min(BAR_WIDTH);
    format!("{}{}", "█".repeat(filled), "░".repeat(BAR_WIDTH - filled))
}

fn render_health(score: f64, b: &HealthBreakdown) -> Vec<String> {
    vec![
        format!("  Graph Health: {:.0}%  [{}]", score * 100.0, health_bar(score)),
        format!(
            "  connectivity {:.2} | components {:.2} | staleness {:.2} | fragility {:.2}",
            b.connectivity, b.components, b.staleness, b.fragility
        ),
    ]
}

fn render_topology(t: &TopologyReport, title_of: &dyn Fn(&str) -> String) -> Vec<String> {
    let mut out = section("TOPOLOGY");
    out.push(format!(
        "  {} nodes, {} edges, {} component{} (largest {}, smallest {})",
        t.total_nodes,
        t.total_edges,
        t.num_components,
        plural(t.num_components),
        t.largest_component,
        t.smallest_component,
    ));

    if t.orphan_count > 0 {
        out.push(format!("  Orphans: {}", t.orphan_count));
        let shown = t.orphan_ids.len().min(ORPHAN_LIMIT);
        for id in &t.orphan_ids[..shown] {
            out.push(format!("    - {}  {}", truncate_id(id), truncate_title(&title_of(id), 50)));
        }
        if t.orphan_count > shown {
            out.push(format!("    ... and {} more", t.orphan_count - shown));
        }
    }

    out.push(String::new());
    out.push("  Degree distribution:".to_string());
    for bucket in t.degree_histogram.iter().filter(|b| b.count > 0) {
        // Bar width grows with log2 of the count
        let width = (bucket.count as f64).log2().ceil() as usize + 1;
        out.push(format!("    {:>5} | {:>5} {}", bucket.label, bucket.count, "=".repeat(width)));
    }

    if !t.hubs.is_empty() {
        out.push(String::new());
        out.push("  Hubs:".to_string());
        for hub in &t.hubs {
            out.push(format!(
                "    {}  deg {:>3}  in {:>3}  out {:>3}  {}",
                truncate_id(&hub.id),
                hub.degree,
                hub.in_degree,
                hub.out_degree,
                truncate_title(&hub.title, 40),
            ));
        }
    }
    out
}

fn render_staleness(s: &StalenessReport) -> Vec<String> {
    if s.stale_node_count == 0 && s.stale_summary_count == 0 {
        return Vec::new();
    }

    let mut out = vec![String::new()];
    out.extend(section("STALENESS"));

    if s.stale_node_count > 0 {
        out.push(format!("  Stale but still referenced: {}", s.stale_node_count));
        out.extend(s.stale_nodes.iter().take(LIST_LIMIT).map(|n| {
            format!(
                "    {}  {:>4}d since update, {} new ref{}  {}",
                truncate_id(&n.id),
                n.days_since_update,
                n.recent_reference_count,
                plural(n.recent_reference_count),
                truncate_title(&n.title, 40),
            )
        }));
    }

    if s.stale_summary_count > 0 {
        out.push(format!("  Summaries behind their subject: {}", s.stale_summary_count));
        out.extend(s.stale_summaries.iter().take(LIST_LIMIT).map(|ss| {
            format!(
                "    {:>4}d  {} summarizes {}",
                ss.drift_days,
                truncate_title(&ss.summary_title, 25),
                truncate_title(&ss.target_title, 25),
            )
        }));
    }
    out
}

fn render_fragility(b: &BridgeReport, title_of: &dyn Fn(&str) -> String) -> Vec<String> {
    if b.ap_count == 0 && b.bridge_count == 0 && b.fragile_connections.is_empty() {
        return Vec::new();
    }

    let mut out = vec![String::new()];
    out.extend(section("STRUCTURAL FRAGILITY"));

    if b.ap_count > 0 {
        out.push(format!("  Articulation points: {}", b.ap_count));
        out.extend(b.articulation_points.iter().take(LIST_LIMIT).map(|ap| {
            format!(
                "    {}  {} neighbour{}  {}",
                truncate_id(&ap.id),
                ap.components_if_removed,
                plural(ap.components_if_removed),
                truncate_title(&ap.title, 40),
            )
        }));
    }

    if b.bridge_count > 0 {
        out.push(format!("  Bridge edges: {}", b.bridge_count));
        out.extend(b.bridge_edges.iter().take(LIST_LIMIT).map(|be| {
            format!(
                "    {} -- {}",
                truncate_title(&be.source_title, 30),
                truncate_title(&be.target_title, 30),
            )
        }));
    }

    if !b.fragile_connections.is_empty() {
        out.push(format!("  Thinly linked regions: {}", b.fragile_connections.len()));
        out.extend(b.fragile_connections.iter().take(LIST_LIMIT).map(|fc| {
            format!(
                "    {} <-> {}  {} edge{}",
                truncate_title(&title_of(&fc.region_a), 25),
                truncate_title(&title_of(&fc.region_b), 25),
                fc.cross_edges,
                plural(fc.cross_edges),
            )
        }));
    }
    out
}

fn plural(n: usize) -> &'static str {
    if n == 1 { "" } else { "s" }
}
