//! Flow-graph pipeline: sections are merged, unknown values resolved, nodes
//! colored, small edges folded and the result sequenced for rendering.

mod color;
mod fold;
mod merge;
mod plot;
mod position;
mod section;
mod sequence;
mod unallocated;

pub use color::{Coloring, NodeLevels, color_graph, compute_coloring, node_levels};
pub use fold::{fold_edges, others_key, others_label};
pub use merge::merge_sections;
pub use plot::{LinkData, NodeData, PlotData, assemble_plot_data, format_amount};
pub use position::{next_column, resolve_position};
pub use section::process_section;
pub use sequence::{depth_first_order, sequence_edges};
pub use unallocated::{node_balances, resolve_unknown};

use tracing::debug;

use crate::config::PipelineConfig;
use crate::error::{Error, Result};
use crate::ir::{FlowGraph, SankeyInput};

/// Runs every stage up to and including sequencing.
pub fn compute_flow_graph(input: &SankeyInput, config: &PipelineConfig) -> Result<FlowGraph> {
    let threshold = config.fold.threshold;
    if !threshold.is_finite() {
        return Err(Error::InvalidThreshold { value: threshold });
    }
    let metadata = &input.metadata;
    let merged = merge_sections(&input.sections, metadata)?;
    let resolved = resolve_unknown(merged, &metadata.root);
    let colored = color_graph(resolved, &config.colors);
    let folded = fold_edges(colored, &config.fold);
    let sequenced = sequence_edges(folded);
    debug!(
        nodes = sequenced.labels.len(),
        edges = sequenced.edges.len(),
        diagnostics = sequenced.diagnostics.len(),
        "flow graph ready"
    );
    Ok(sequenced)
}

pub fn compute_plot_data(input: &SankeyInput, config: &PipelineConfig) -> Result<PlotData> {
    let graph = compute_flow_graph(input, config)?;
    Ok(assemble_plot_data(&graph, config))
}
