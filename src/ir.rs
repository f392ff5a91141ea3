use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// A layout coordinate expressed as keys into the metadata `xpos`/`ypos`
/// dictionaries, e.g. `{ "x": "l1", "y": "r0" }`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SymbolicPosition {
    pub x: String,
    pub y: String,
}

impl SymbolicPosition {
    pub fn new(x: impl Into<String>, y: impl Into<String>) -> Self {
        Self {
            x: x.into(),
            y: y.into(),
        }
    }
}

/// Canvas coordinate in the unit square the diagram widget expects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// Flow carried by a section edge before conservation has been applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EdgeValue {
    Known(f64),
    Unknown,
}

impl EdgeValue {
    pub fn known(self) -> Option<f64> {
        match self {
            EdgeValue::Known(value) => Some(value),
            EdgeValue::Unknown => None,
        }
    }

    pub fn is_unknown(self) -> bool {
        matches!(self, EdgeValue::Unknown)
    }
}

impl From<f64> for EdgeValue {
    fn from(value: f64) -> Self {
        EdgeValue::Known(value)
    }
}

/// Anything with a source and target node key.
pub trait Endpoints {
    fn source(&self) -> &str;
    fn target(&self) -> &str;
}

#[derive(Debug, Clone, PartialEq)]
pub struct SectionEdge {
    pub source: String,
    pub target: String,
    pub value: EdgeValue,
}

impl SectionEdge {
    pub fn new(source: impl Into<String>, target: impl Into<String>, value: EdgeValue) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            value,
        }
    }
}

impl Endpoints for SectionEdge {
    fn source(&self) -> &str {
        &self.source
    }

    fn target(&self) -> &str {
        &self.target
    }
}

/// Edge of a graph whose values have all been resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowEdge {
    pub source: String,
    pub target: String,
    pub value: f64,
    pub color: Option<String>,
}

impl FlowEdge {
    pub fn new(source: impl Into<String>, target: impl Into<String>, value: f64) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            value,
            color: None,
        }
    }
}

impl Endpoints for FlowEdge {
    fn source(&self) -> &str {
        &self.source
    }

    fn target(&self) -> &str {
        &self.target
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    pub id: String,
    pub name: String,
    pub display: bool,
    /// Falls back to the column after the section's own column.
    pub pos: Option<SymbolicPosition>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Section {
    pub id: Option<String>,
    pub desc: Option<String>,
    pub nodes: BTreeMap<String, String>,
    pub edges: Vec<SectionEdge>,
    pub pos: Option<SymbolicPosition>,
    pub group: Option<Group>,
}

/// Run-wide context shared by every section.
#[derive(Debug, Clone, PartialEq)]
pub struct Metadata {
    pub root: String,
    pub position: SymbolicPosition,
    pub xpos: BTreeMap<String, f64>,
    pub ypos: BTreeMap<String, f64>,
    pub active: Vec<String>,
}

impl Metadata {
    pub fn is_active(&self, section_id: &str) -> bool {
        self.active.iter().any(|id| id == section_id)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SankeyInput {
    pub metadata: Metadata,
    pub sections: Vec<Section>,
}

/// Nodes, positions and unresolved edges. Produced per section and by the
/// merger.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SectionGraph {
    pub labels: BTreeMap<String, String>,
    pub positions: BTreeMap<String, Position>,
    pub edges: Vec<SectionEdge>,
}

impl SectionGraph {
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty() && self.positions.is_empty() && self.edges.is_empty()
    }

    pub fn prune_unconnected(&mut self) {
        retain_connected(&mut self.labels, &mut self.positions, &self.edges);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub stage: &'static str,
    pub message: String,
}

impl Diagnostic {
    pub fn new(stage: &'static str, message: impl Into<String>) -> Self {
        Self {
            stage,
            message: message.into(),
        }
    }
}

/// Graph with every edge value resolved; the shape colored, folded,
/// sequenced and assembled by the later stages.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowGraph {
    pub root: String,
    pub labels: BTreeMap<String, String>,
    pub positions: BTreeMap<String, Position>,
    pub edges: Vec<FlowEdge>,
    pub node_colors: BTreeMap<String, String>,
    pub diagnostics: Vec<Diagnostic>,
}

impl FlowGraph {
    pub fn new(root: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            labels: BTreeMap::new(),
            positions: BTreeMap::new(),
            edges: Vec::new(),
            node_colors: BTreeMap::new(),
            diagnostics: Vec::new(),
        }
    }

    pub fn add_node(&mut self, key: &str, label: &str) {
        self.labels.insert(key.to_string(), label.to_string());
    }

    pub fn add_edge(&mut self, source: &str, target: &str, value: f64) {
        self.edges.push(FlowEdge::new(source, target, value));
    }

    pub fn label(&self, key: &str) -> Option<&str> {
        self.labels.get(key).map(String::as_str)
    }

    pub fn outgoing_total(&self, key: &str) -> f64 {
        self.edges
            .iter()
            .filter(|edge| edge.source == key)
            .map(|edge| edge.value)
            .sum()
    }

    pub fn prune_unconnected(&mut self) {
        retain_connected(&mut self.labels, &mut self.positions, &self.edges);
        let live = connected_keys(&self.edges);
        self.node_colors.retain(|key, _| live.contains(key.as_str()));
    }
}

fn connected_keys<E: Endpoints>(edges: &[E]) -> BTreeSet<&str> {
    edges
        .iter()
        .flat_map(|edge| [edge.source(), edge.target()])
        .collect()
}

/// Drops labels and positions of nodes no edge touches.
pub fn retain_connected<E: Endpoints>(
    labels: &mut BTreeMap<String, String>,
    positions: &mut BTreeMap<String, Position>,
    edges: &[E],
) {
    let live = connected_keys(edges);
    labels.retain(|key, _| live.contains(key.as_str()));
    positions.retain(|key, _| live.contains(key.as_str()));
}
