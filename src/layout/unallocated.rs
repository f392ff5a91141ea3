use std::collections::HashMap;

use tracing::{debug, warn};

use crate::ir::{Diagnostic, EdgeValue, FlowEdge, FlowGraph, SectionGraph};

const STAGE: &str = "unallocated";

/// Net flow per node over known edges: inflow minus outflow.
pub fn node_balances<'a, I>(edges: I) -> HashMap<&'a str, f64>
where
    I: IntoIterator<Item = (&'a str, &'a str, Option<f64>)>,
{
    let mut balance: HashMap<&str, f64> = HashMap::new();
    for (source, target, value) in edges {
        let Some(value) = value else {
            continue;
        };
        *balance.entry(source).or_default() -= value;
        *balance.entry(target).or_default() += value;
    }
    balance
}

/// Replaces every unknown edge value with the residual balance of its source
/// after one pass over all known edges.
///
/// Each source may carry at most one unknown edge. With more, every unknown
/// edge at that source receives the same full residual; this is reported as
/// a diagnostic, not rejected.
pub fn resolve_unknown(merged: SectionGraph, root: &str) -> FlowGraph {
    let mut diagnostics = Vec::new();
    let values: Vec<f64> = {
        let balance = node_balances(
            merged
                .edges
                .iter()
                .map(|edge| (edge.source.as_str(), edge.target.as_str(), edge.value.known())),
        );

        let mut unknown_per_source: HashMap<&str, usize> = HashMap::new();
        for edge in merged.edges.iter().filter(|edge| edge.value.is_unknown()) {
            *unknown_per_source.entry(edge.source.as_str()).or_default() += 1;
        }
        let mut crowded: Vec<(&str, usize)> = unknown_per_source
            .into_iter()
            .filter(|(_, count)| *count > 1)
            .collect();
        crowded.sort();
        for (source, count) in crowded {
            warn!(source, count, "multiple unknown edges share one source");
            diagnostics.push(Diagnostic::new(
                STAGE,
                format!("{count} unknown edges leave `{source}`; each receives the full residual"),
            ));
        }

        merged
            .edges
            .iter()
            .map(|edge| match edge.value {
                EdgeValue::Known(value) => value,
                EdgeValue::Unknown => {
                    let residual = balance.get(edge.source.as_str()).copied().unwrap_or(0.0);
                    if residual < 0.0 {
                        warn!(source = %edge.source, residual, "negative residual clamped to zero");
                        diagnostics.push(Diagnostic::new(
                            STAGE,
                            format!(
                                "`{}` -> `{}` resolved to negative residual {residual}; using 0",
                                edge.source, edge.target
                            ),
                        ));
                        0.0
                    } else {
                        residual
                    }
                }
            })
            .collect()
    };

    let resolved = merged.edges.iter().filter(|edge| edge.value.is_unknown()).count();
    debug!(resolved, "resolved unknown edge values");

    let edges = merged
        .edges
        .into_iter()
        .zip(values)
        .map(|(edge, value)| FlowEdge::new(edge.source, edge.target, value))
        .collect();

    FlowGraph {
        root: root.to_string(),
        labels: merged.labels,
        positions: merged.positions,
        edges,
        node_colors: Default::default(),
        diagnostics,
    }
}
