use std::collections::HashMap;

use tracing::{debug, warn};

use crate::config::FoldConfig;
use crate::ir::{Diagnostic, FlowEdge, FlowGraph, Position};

const STAGE: &str = "fold";
const OTHERS_SUFFIX: &str = "_others";

pub fn others_key(source: &str) -> String {
    format!("{source}{OTHERS_SUFFIX}")
}

/// "Ministry of Home Affairs" -> "MOHA (Others)".
pub fn others_label(source_label: &str) -> String {
    let acronym: String = source_label
        .split_whitespace()
        .filter_map(|word| word.chars().next())
        .collect();
    format!("{} (Others)", acronym.to_uppercase())
}

#[derive(Debug)]
struct Aggregate {
    label: String,
    value: f64,
    color: Option<String>,
    position: Option<Position>,
    node_color: Option<String>,
}

/// Collapses every edge with `value < threshold` into one `{source}_others`
/// edge per source. The aggregate node borrows the position and color of the
/// first folded target.
pub fn fold_edges(graph: FlowGraph, config: &FoldConfig) -> FlowGraph {
    let threshold = config.threshold;
    let FlowGraph {
        root,
        mut labels,
        mut positions,
        edges,
        mut node_colors,
        mut diagnostics,
    } = graph;

    let mut kept = Vec::with_capacity(edges.len());
    let mut order: Vec<String> = Vec::new();
    let mut aggregates: HashMap<String, Aggregate> = HashMap::new();
    let mut folded = 0usize;

    for edge in edges {
        if edge.value >= threshold {
            kept.push(edge);
            continue;
        }
        if !aggregates.contains_key(&edge.source) {
            let Some(source_label) = labels.get(&edge.source) else {
                warn!(source = %edge.source, target = %edge.target, "fold candidate has no source label");
                diagnostics.push(Diagnostic::new(
                    STAGE,
                    format!(
                        "skipped folding `{}` -> `{}`: source has no label",
                        edge.source, edge.target
                    ),
                ));
                kept.push(edge);
                continue;
            };
            order.push(edge.source.clone());
            aggregates.insert(
                edge.source.clone(),
                Aggregate {
                    label: others_label(source_label),
                    value: 0.0,
                    color: edge.color.clone(),
                    position: positions.get(&edge.target).copied(),
                    node_color: node_colors
                        .get(&edge.target)
                        .or_else(|| node_colors.get(&edge.source))
                        .cloned(),
                },
            );
        }
        if let Some(aggregate) = aggregates.get_mut(&edge.source) {
            aggregate.value += edge.value;
            folded += 1;
        }
    }

    for source in order {
        let Some(aggregate) = aggregates.remove(&source) else {
            continue;
        };
        if config.drop_small_aggregates && aggregate.value <= threshold {
            debug!(source = %source, value = aggregate.value, "dropping small aggregate");
            continue;
        }
        let key = others_key(&source);
        labels.insert(key.clone(), aggregate.label);
        if let Some(position) = aggregate.position {
            positions.insert(key.clone(), position);
        }
        if let Some(color) = aggregate.node_color {
            node_colors.insert(key.clone(), color);
        }
        kept.push(FlowEdge {
            source,
            target: key,
            value: aggregate.value,
            color: aggregate.color,
        });
    }

    debug!(folded, remaining = kept.len(), threshold, "folded small edges");
    let mut graph = FlowGraph {
        root,
        labels,
        positions,
        edges: kept,
        node_colors,
        diagnostics,
    };
    graph.prune_unconnected();
    graph
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ministries() -> FlowGraph {
        let mut graph = FlowGraph::new("G");
        graph.add_node("G", "Government of India");
        for (key, value) in [("M1", 500.0), ("M2", 8.0), ("M3", 2.0), ("M4", 10.0)] {
            graph.add_node(key, key);
            graph.add_edge("G", key, value);
            graph
                .positions
                .insert(key.to_string(), Position { x: 0.5, y: value / 1000.0 });
        }
        graph
    }

    fn config(threshold: f64) -> FoldConfig {
        FoldConfig {
            threshold,
            drop_small_aggregates: false,
        }
    }

    #[test]
    fn small_edges_collapse_into_others() {
        let folded = fold_edges(ministries(), &config(10.0));

        let targets: Vec<&str> = folded.edges.iter().map(|e| e.target.as_str()).collect();
        assert_eq!(targets, vec!["M1", "M4", "G_others"]);
        assert_eq!(folded.edges[2].value, 10.0);
        assert_eq!(folded.label("G_others"), Some("GOI (Others)"));
        assert_eq!(folded.positions.get("G_others"), Some(&Position { x: 0.5, y: 0.008 }));
        // Folded targets lost their only edge.
        assert!(folded.label("M2").is_none());
        assert!(folded.label("M3").is_none());
    }

    #[test]
    fn threshold_is_strict() {
        let folded = fold_edges(ministries(), &config(10.0));
        assert!(folded.edges.iter().any(|e| e.target == "M4" && e.value == 10.0));
    }

    #[test]
    fn folding_conserves_outflow() {
        let graph = ministries();
        let before = graph.outgoing_total("G");
        let folded = fold_edges(graph, &config(100.0));
        assert!((folded.outgoing_total("G") - before).abs() < 1e-9);
    }

    #[test]
    fn small_aggregates_can_be_dropped() {
        let folded = fold_edges(
            ministries(),
            &FoldConfig {
                threshold: 20.0,
                drop_small_aggregates: true,
            },
        );
        assert!(folded.label("G_others").is_none());
        assert_eq!(folded.edges.len(), 1);
    }

    #[test]
    fn unlabeled_source_is_skipped_and_reported() {
        let mut graph = ministries();
        graph.add_node("M1x", "Scheme");
        graph.add_edge("ghost", "M1x", 1.0);
        let folded = fold_edges(graph, &config(10.0));

        assert!(folded.edges.iter().any(|e| e.source == "ghost" && e.target == "M1x"));
        assert!(folded.label("ghost_others").is_none());
        assert_eq!(folded.diagnostics.len(), 1);
        // Other sources still fold.
        assert_eq!(folded.label("G_others"), Some("GOI (Others)"));
    }

    #[test]
    fn acronym_uses_word_initials() {
        assert_eq!(others_label("Gov"), "G (Others)");
        assert_eq!(others_label("ministry of  home affairs"), "MOHA (Others)");
    }
}
