use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::config::{ColorConfig, HoverConfig, PipelineConfig, TraceConfig};
use crate::ir::FlowGraph;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinkData {
    pub source: Vec<usize>,
    pub target: Vec<usize>,
    pub value: Vec<f64>,
    pub color: Vec<String>,
    pub customdata: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeData {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub color: Vec<String>,
    pub customdata: Vec<String>,
}

/// Parallel arrays for a Sankey widget. `node.*[i]` and `label[i]` describe
/// the same node; `link.source`/`link.target` index into them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlotData {
    pub label: Vec<String>,
    pub link: LinkData,
    pub node: NodeData,
}

impl PlotData {
    pub fn node_index(&self, label: &str) -> Option<usize> {
        self.label.iter().position(|candidate| candidate == label)
    }

    /// Wraps the arrays in a Plotly `sankey` trace.
    pub fn to_trace(&self, config: &TraceConfig) -> serde_json::Value {
        json!({
            "type": "sankey",
            "orientation": "h",
            "arrangement": "snap",
            "node": {
                "pad": config.node_pad,
                "thickness": config.node_thickness,
                "line": {
                    "color": config.node_line_color,
                    "width": config.node_line_width,
                },
                "label": self.label,
                "x": self.node.x,
                "y": self.node.y,
                "color": self.node.color,
                "customdata": self.node.customdata,
                "hovertemplate": "%{customdata}<extra></extra>",
            },
            "link": {
                "source": self.link.source,
                "target": self.link.target,
                "value": self.link.value,
                "color": self.link.color,
                "customdata": self.link.customdata,
                "hovertemplate": "%{customdata}<extra></extra>",
            },
        })
    }
}

fn group_thousands(value: f64, decimals: usize) -> String {
    let formatted = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (formatted.as_str(), None),
    };
    let mut grouped = String::with_capacity(formatted.len() + int_part.len() / 3);
    for (idx, ch) in int_part.chars().enumerate() {
        if idx > 0 && (int_part.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if let Some(frac_part) = frac_part {
        grouped.push('.');
        grouped.push_str(frac_part);
    }
    if value < 0.0 && grouped.chars().any(|ch| ch.is_ascii_digit() && ch != '0') {
        grouped.insert(0, '-');
    }
    grouped
}

/// `₹1.23 Lakh Crore / $14.8B` for an amount in input units.
pub fn format_amount(value: f64, hover: &HoverConfig) -> String {
    let rupees = value * hover.rupees_per_unit;
    let large = rupees / hover.large_unit_rupees;
    let usd_billions = rupees / hover.inr_per_usd / 1e9;
    format!(
        "{}{} {} / {}{}B",
        hover.primary_symbol,
        group_thousands(large, 2),
        hover.large_unit_label,
        hover.secondary_symbol,
        group_thousands(usd_billions, 1)
    )
}

/// Linearizes a sequenced graph. Node indices follow first appearance among
/// the edges, so this must run on the sequencer's output.
pub fn assemble_plot_data(graph: &FlowGraph, config: &PipelineConfig) -> PlotData {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut keys: Vec<&str> = Vec::new();
    let mut inflow: HashMap<&str, f64> = HashMap::new();
    let mut outflow: HashMap<&str, f64> = HashMap::new();
    for edge in &graph.edges {
        for key in [edge.source.as_str(), edge.target.as_str()] {
            index.entry(key).or_insert_with(|| {
                keys.push(key);
                keys.len() - 1
            });
        }
        *outflow.entry(edge.source.as_str()).or_default() += edge.value;
        *inflow.entry(edge.target.as_str()).or_default() += edge.value;
    }

    let label_of = |key: &str| graph.label(key).unwrap_or(key).to_string();
    let ColorConfig {
        default_node_color,
        default_edge_color,
        ..
    } = &config.colors;

    let mut plot = PlotData {
        label: keys.iter().map(|&key| label_of(key)).collect(),
        ..PlotData::default()
    };

    for &key in &keys {
        let position = graph.positions.get(key).copied().unwrap_or_default();
        plot.node.x.push(position.x);
        plot.node.y.push(position.y);
        plot.node.color.push(
            graph
                .node_colors
                .get(key)
                .cloned()
                .unwrap_or_else(|| default_node_color.clone()),
        );
        let throughput = inflow
            .get(key)
            .copied()
            .unwrap_or(0.0)
            .max(outflow.get(key).copied().unwrap_or(0.0));
        plot.node.customdata.push(format!(
            "{}<br>{}",
            label_of(key),
            format_amount(throughput, &config.hover)
        ));
    }

    for edge in &graph.edges {
        plot.link.source.push(index[edge.source.as_str()]);
        plot.link.target.push(index[edge.target.as_str()]);
        plot.link.value.push(edge.value);
        plot.link
            .color
            .push(edge.color.clone().unwrap_or_else(|| default_edge_color.clone()));
        plot.link.customdata.push(format!(
            "{} → {}<br>{}",
            label_of(&edge.source),
            label_of(&edge.target),
            format_amount(edge.value, &config.hover)
        ));
    }
    plot
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::Position;

    fn sequenced() -> FlowGraph {
        let mut graph = FlowGraph::new("G");
        graph.add_node("G", "Gov");
        graph.add_node("A", "Agency A");
        graph.add_node("B", "Agency B");
        graph.add_edge("G", "B", 83000.0);
        graph.add_edge("G", "A", 100.0);
        graph.positions.insert("A".into(), Position { x: 0.5, y: 0.25 });
        graph.node_colors.insert("G".into(), "#123456".into());
        graph.edges[0].color = Some("rgba(1, 2, 3, 0.5)".into());
        graph
    }

    #[test]
    fn indices_follow_edge_order() {
        let plot = assemble_plot_data(&sequenced(), &PipelineConfig::default());
        assert_eq!(plot.label, vec!["Gov", "Agency B", "Agency A"]);
        assert_eq!(plot.link.source, vec![0, 0]);
        assert_eq!(plot.link.target, vec![1, 2]);
        assert_eq!(plot.link.value, vec![83000.0, 100.0]);
    }

    #[test]
    fn missing_positions_and_colors_fall_back() {
        let config = PipelineConfig::default();
        let plot = assemble_plot_data(&sequenced(), &config);
        assert_eq!(plot.node.x, vec![0.0, 0.0, 0.5]);
        assert_eq!(plot.node.y, vec![0.0, 0.0, 0.25]);
        assert_eq!(plot.node.color[0], "#123456");
        assert_eq!(plot.node.color[1], config.colors.default_node_color);
        assert_eq!(plot.link.color[0], "rgba(1, 2, 3, 0.5)");
        assert_eq!(plot.link.color[1], config.colors.default_edge_color);
    }

    #[test]
    fn hover_text_uses_both_currencies() {
        let plot = assemble_plot_data(&sequenced(), &PipelineConfig::default());
        assert_eq!(plot.node.customdata[0], "Gov<br>₹0.83 Lakh Crore / $10.0B");
        assert_eq!(plot.link.customdata[0], "Gov → Agency B<br>₹0.83 Lakh Crore / $10.0B");
    }

    #[test]
    fn groups_thousands() {
        assert_eq!(group_thousands(1234567.891, 1), "1,234,567.9");
        assert_eq!(group_thousands(999.0, 0), "999");
        assert_eq!(group_thousands(-1000.0, 0), "-1,000");
        assert_eq!(group_thousands(-0.01, 1), "0.0");
    }

    #[test]
    fn trace_wraps_arrays() {
        let plot = assemble_plot_data(&sequenced(), &PipelineConfig::default());
        let trace = plot.to_trace(&TraceConfig::default());
        assert_eq!(trace["type"], "sankey");
        assert_eq!(trace["node"]["label"][2], "Agency A");
        assert_eq!(trace["link"]["target"][1], 2);
    }
}
