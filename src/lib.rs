#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod ir;
pub mod layout;
pub mod layout_dump;
pub mod parser;
pub mod theme;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{PipelineConfig, load_config};
pub use error::{Error, Result};
pub use ir::{FlowGraph, SankeyInput};
pub use layout::{PlotData, compute_flow_graph, compute_plot_data};
pub use parser::{parse_input, parse_metadata, parse_section, parse_sections};

/// Batch document in, PlotData JSON out.
pub fn render_plot_json(input_json: &str, config: &PipelineConfig) -> Result<String> {
    let input = parse_input(input_json)?;
    let plot = compute_plot_data(&input, config)?;
    Ok(serde_json::to_string(&plot)?)
}
