use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};

use crate::ir::{Diagnostic, FlowEdge, FlowGraph};

const STAGE: &str = "sequence";

/// Edge indices in depth-first order from `root`, heaviest branch first.
///
/// Each node is expanded once; all of its outgoing edges are emitted when it
/// is, but only unvisited targets are descended into.
pub fn depth_first_order(root: &str, edges: &[FlowEdge]) -> Vec<usize> {
    let mut outgoing: HashMap<&str, Vec<usize>> = HashMap::new();
    for (idx, edge) in edges.iter().enumerate() {
        outgoing.entry(edge.source.as_str()).or_default().push(idx);
    }
    for list in outgoing.values_mut() {
        // Stable, so equal values keep their merged order.
        list.sort_by(|a, b| edges[*b].value.total_cmp(&edges[*a].value));
    }

    let mut order = Vec::with_capacity(edges.len());
    let mut visited: HashSet<&str> = HashSet::from([root]);
    let mut stack = Vec::new();
    if let Some(first) = outgoing.get(root) {
        stack.push(first.iter());
    }
    while let Some(frame) = stack.last_mut() {
        let Some(&idx) = frame.next() else {
            stack.pop();
            continue;
        };
        order.push(idx);
        let target = edges[idx].target.as_str();
        if visited.insert(target) {
            if let Some(next) = outgoing.get(target) {
                stack.push(next.iter());
            }
        }
    }
    order
}

/// Reorders edges for rendering. Edges unreachable from the root are
/// dropped and reported.
pub fn sequence_edges(mut graph: FlowGraph) -> FlowGraph {
    let order = depth_first_order(&graph.root, &graph.edges);
    let unreachable = graph.edges.len() - order.len();
    if unreachable > 0 {
        warn!(unreachable, root = %graph.root, "dropping edges unreachable from root");
        graph.diagnostics.push(Diagnostic::new(
            STAGE,
            format!("{unreachable} edges are unreachable from `{}` and were dropped", graph.root),
        ));
    }

    let mut slots: Vec<Option<FlowEdge>> = graph.edges.drain(..).map(Some).collect();
    graph.edges = order
        .into_iter()
        .filter_map(|idx| slots[idx].take())
        .collect();
    graph.prune_unconnected();
    debug!(edges = graph.edges.len(), "sequenced edges");
    graph
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(graph: &FlowGraph) -> Vec<(String, String)> {
        graph
            .edges
            .iter()
            .map(|e| (e.source.clone(), e.target.clone()))
            .collect()
    }

    fn sample() -> FlowGraph {
        let mut graph = FlowGraph::new("G");
        for key in ["G", "A", "B", "A1", "A2", "B1"] {
            graph.add_node(key, key);
        }
        graph.add_edge("A", "A1", 5.0);
        graph.add_edge("G", "B", 30.0);
        graph.add_edge("B", "B1", 30.0);
        graph.add_edge("G", "A", 70.0);
        graph.add_edge("A", "A2", 65.0);
        graph
    }

    #[test]
    fn heavier_branches_come_first() {
        let sequenced = sequence_edges(sample());
        let expected = [("G", "A"), ("A", "A2"), ("A", "A1"), ("G", "B"), ("B", "B1")];
        let expected: Vec<(String, String)> = expected
            .iter()
            .map(|(s, t)| (s.to_string(), t.to_string()))
            .collect();
        assert_eq!(pairs(&sequenced), expected);
    }

    #[test]
    fn order_is_deterministic() {
        let first = sequence_edges(sample());
        let second = sequence_edges(sample());
        assert_eq!(first.edges, second.edges);
        assert_eq!(sequence_edges(first.clone()).edges, first.edges);
    }

    #[test]
    fn shared_targets_keep_every_edge() {
        let mut graph = sample();
        graph.add_node("grp", "Group");
        graph.add_edge("A2", "grp", 65.0);
        graph.add_edge("B1", "grp", 30.0);
        let sequenced = sequence_edges(graph);
        assert_eq!(sequenced.edges.len(), 7);
        assert!(sequenced.diagnostics.is_empty());
    }

    #[test]
    fn cycles_and_unreachable_edges() {
        let mut graph = sample();
        graph.add_edge("A1", "G", 1.0);
        graph.add_node("X", "X");
        graph.add_node("Y", "Y");
        graph.add_edge("X", "Y", 9.0);
        let sequenced = sequence_edges(graph);

        assert_eq!(sequenced.edges.len(), 6);
        assert!(sequenced.label("X").is_none());
        assert_eq!(sequenced.diagnostics.len(), 1);
    }
}
