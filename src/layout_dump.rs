use crate::ir::FlowGraph;
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct GraphDump {
    pub root: String,
    pub nodes: Vec<NodeDump>,
    pub edges: Vec<EdgeDump>,
    pub diagnostics: Vec<DiagnosticDump>,
}

#[derive(Debug, Serialize)]
pub struct NodeDump {
    pub id: String,
    pub label: String,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub color: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct EdgeDump {
    pub source: String,
    pub target: String,
    pub value: f64,
    pub color: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DiagnosticDump {
    pub stage: String,
    pub message: String,
}

impl GraphDump {
    pub fn from_graph(graph: &FlowGraph) -> Self {
        let nodes = graph
            .labels
            .iter()
            .map(|(id, label)| {
                let position = graph.positions.get(id);
                NodeDump {
                    id: id.clone(),
                    label: label.clone(),
                    x: position.map(|pos| pos.x),
                    y: position.map(|pos| pos.y),
                    color: graph.node_colors.get(id).cloned(),
                }
            })
            .collect();

        let edges = graph
            .edges
            .iter()
            .map(|edge| EdgeDump {
                source: edge.source.clone(),
                target: edge.target.clone(),
                value: edge.value,
                color: edge.color.clone(),
            })
            .collect();

        let diagnostics = graph
            .diagnostics
            .iter()
            .map(|diag| DiagnosticDump {
                stage: diag.stage.to_string(),
                message: diag.message.clone(),
            })
            .collect();

        GraphDump {
            root: graph.root.clone(),
            nodes,
            edges,
            diagnostics,
        }
    }
}

pub fn write_graph_dump(path: &Path, graph: &FlowGraph) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let dump = GraphDump::from_graph(graph);
    serde_json::to_writer_pretty(writer, &dump)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dump_lists_nodes_in_key_order() {
        let mut graph = FlowGraph::new("G");
        graph.add_node("G", "Gov");
        graph.add_node("A", "Agency");
        graph.add_edge("G", "A", 3.0);
        let dump = GraphDump::from_graph(&graph);
        let ids: Vec<&str> = dump.nodes.iter().map(|node| node.id.as_str()).collect();
        assert_eq!(ids, vec!["A", "G"]);
        assert_eq!(dump.nodes[0].x, None);
        assert_eq!(dump.edges[0].value, 3.0);
    }
}
