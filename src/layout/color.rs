use std::collections::{BTreeMap, HashMap};

use tracing::{debug, warn};

use crate::config::ColorConfig;
use crate::ir::{Diagnostic, FlowGraph};
use crate::theme::{Palette, edge_tone};

const STAGE: &str = "color";

/// Depth of each node reachable from the root, first visit wins.
#[derive(Debug, Clone, Default)]
pub struct NodeLevels<'a> {
    pub level_of: HashMap<&'a str, usize>,
    /// Nodes per level, in depth-first visiting order.
    pub by_level: BTreeMap<usize, Vec<&'a str>>,
}

pub(crate) fn adjacency(graph: &FlowGraph) -> HashMap<&str, Vec<&str>> {
    let mut children: HashMap<&str, Vec<&str>> = HashMap::new();
    for edge in &graph.edges {
        children
            .entry(edge.source.as_str())
            .or_default()
            .push(edge.target.as_str());
    }
    children
}

pub fn node_levels<'a>(root: &'a str, children: &HashMap<&'a str, Vec<&'a str>>) -> NodeLevels<'a> {
    let mut levels = NodeLevels::default();
    let mut stack = vec![(root, 0usize)];
    while let Some((node, level)) = stack.pop() {
        if levels.level_of.contains_key(node) {
            continue;
        }
        levels.level_of.insert(node, level);
        levels.by_level.entry(level).or_default().push(node);
        if let Some(next) = children.get(node) {
            // Reversed so the first child is expanded first.
            for &child in next.iter().rev() {
                if !levels.level_of.contains_key(child) {
                    stack.push((child, level + 1));
                }
            }
        }
    }
    levels
}

#[derive(Debug, Clone, Default)]
pub struct Coloring {
    pub node_colors: BTreeMap<String, String>,
    /// Parallel to the graph's edges.
    pub edge_colors: Vec<String>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Coloring {
    pub fn apply(self, mut graph: FlowGraph) -> FlowGraph {
        for (edge, color) in graph.edges.iter_mut().zip(self.edge_colors) {
            edge.color = Some(color);
        }
        graph.node_colors = self.node_colors;
        graph.diagnostics.extend(self.diagnostics);
        graph
    }
}

/// Assigns palette colors by depth.
///
/// The root always takes `palette[0]`. Levels 0 and 2 get no fresh colors:
/// every other level hands each of its nodes the next palette entry, which
/// the node's direct children inherit. Level-2 nodes therefore share the hue
/// of their level-1 parent.
pub fn compute_coloring(graph: &FlowGraph, config: &ColorConfig) -> Coloring {
    let palette = Palette::from_config(config);
    let children = adjacency(graph);
    let levels = node_levels(graph.root.as_str(), &children);
    let mut coloring = Coloring::default();

    let mut node_colors: HashMap<&str, &str> = HashMap::new();
    node_colors.insert(graph.root.as_str(), palette.get(0));
    let mut color_idx = 1;
    for (level, nodes) in &levels.by_level {
        if *level == 0 || *level == 2 {
            continue;
        }
        for &node in nodes {
            let color = palette.get(color_idx);
            node_colors.insert(node, color);
            for &child in children.get(node).into_iter().flatten() {
                node_colors.insert(child, color);
            }
            color_idx += 1;
        }
    }
    node_colors.insert(graph.root.as_str(), palette.get(0));

    if color_idx > palette.len() {
        warn!(needed = color_idx, available = palette.len(), "palette exhausted");
        coloring.diagnostics.push(Diagnostic::new(
            STAGE,
            format!(
                "{color_idx} colors needed but the palette holds {}; colors repeat",
                palette.len()
            ),
        ));
    }

    let toned = |node: &str| {
        node_colors
            .get(node)
            .and_then(|color| edge_tone(color, &config.edge_tone))
            .unwrap_or_else(|| config.default_edge_color.clone())
    };
    coloring.edge_colors = graph
        .edges
        .iter()
        .map(|edge| match levels.level_of.get(edge.source.as_str()) {
            Some(&level) if level <= 1 => toned(&edge.source),
            Some(&2) => toned(&edge.target),
            _ => config.default_edge_color.clone(),
        })
        .collect();

    coloring.node_colors = node_colors
        .into_iter()
        .map(|(node, color)| (node.to_string(), color.to_string()))
        .collect();
    debug!(
        colored = coloring.node_colors.len(),
        fresh = color_idx - 1,
        "colored nodes"
    );
    coloring
}

pub fn color_graph(graph: FlowGraph, config: &ColorConfig) -> FlowGraph {
    compute_coloring(&graph, config).apply(graph)
}
