// Crawl summary for the terminal

use crate::crawl::TraversalOutcome;
use crate::graph::FoafGraph;
use petgraph::algo::tarjan_scc;

/// Structural figures for a FOAF graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphSummary {
    pub keys: usize,
    pub vertices: usize,
    pub edges: usize,
    pub leaves: usize,
    /// Strongly connected components with more than one member.
    pub cliques: usize,
    pub largest_component: usize,
}

pub fn summarize(graph: &FoafGraph) -> GraphSummary {
    let pg = graph.to_petgraph();
    let components = tarjan_scc(&pg);

    GraphSummary {
        keys: graph.len(),
        vertices: pg.node_count(),
        edges: pg.edge_count(),
        leaves: graph.leaves().len(),
        cliques: components.iter().filter(|c| c.len() > 1).count(),
        largest_component: components.iter().map(Vec::len).max().unwrap_or(0),
    }
}

/// Generate a crawl report from a traversal outcome
pub fn generate_foaf_report(outcome: &TraversalOutcome) -> String {
    let summary = summarize(&outcome.graph);

    let mut report = String::new();
    report.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\n");
    report.push_str("# Summary:\n");
    report.push_str(&format!("  Vertices: {}\n", summary.vertices));
    report.push_str(&format!("  Expanded vertices: {}\n", summary.keys));
    report.push_str(&format!("  Friendships: {}\n", summary.edges));
    report.push_str(&format!("  Vertices without friends: {}\n", summary.leaves));
    report.push_str(&format!("  Mutual circles: {}\n", summary.cliques));
    report.push_str(&format!(
        "  Largest mutual circle: {}\n",
        summary.largest_component
    ));

    report.push_str("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\n");

    let mut busiest: Vec<(&str, usize)> = outcome
        .graph
        .iter()
        .map(|(name, friends)| (name, friends.len()))
        .filter(|(_, count)| *count > 0)
        .collect();
    // stable sort keeps graph order among equal counts
    busiest.sort_by(|a, b| b.1.cmp(&a.1));

    if !busiest.is_empty() {
        report.push_str("## Most connected\n");
        for (name, count) in busiest.iter().take(10) {
            report.push_str(&format!("  {:>4}  {}\n", count, name));
        }
        report.push('\n');
    }

    if !outcome.unresolved.is_empty() {
        report.push_str("## Unresolved logins\n");
        for login in &outcome.unresolved {
            report.push_str(&format!("  {}\n", login));
        }
        report.push('\n');
    }

    if outcome.is_partial() {
        report.push_str("## Partial results\n");
        for failure in &outcome.failures {
            let marker = if failure.timed_out { " (timeout)" } else { "" };
            report.push_str(&format!(
                "  \x1b[33m{}\x1b[0m{}: {}\n",
                failure.vertex, marker, failure.error
            ));
        }
        report.push('\n');
    }

    report
}
