use crate::config::load_config;
use crate::ir::SankeyInput;
use crate::layout::{assemble_plot_data, compute_flow_graph};
use crate::layout_dump::write_graph_dump;
use crate::parser::{parse_input, read_documents, read_input_dir, read_input_file};
use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "budget-sankey",
    version,
    about = "Build Sankey plot data from sectioned budget allocation files"
)]
pub struct Args {
    /// Batch input file ({"metadata", "data"}) or '-' for stdin
    #[arg(short = 'i', long = "input", conflicts_with_all = ["dir", "metadata"])]
    pub input: Option<PathBuf>,

    /// Directory holding metadata.json plus one file per section
    #[arg(short = 'd', long = "dir", conflicts_with = "metadata")]
    pub dir: Option<PathBuf>,

    /// Metadata file; section files follow as arguments
    #[arg(short = 'm', long = "metadata")]
    pub metadata: Option<PathBuf>,

    /// Section files, merged in the order given
    #[arg(requires = "metadata")]
    pub sections: Vec<PathBuf>,

    /// Output file. Defaults to stdout if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Pipeline config file (JSON or JSON5)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Fold threshold, overrides the config file
    #[arg(short = 't', long = "threshold")]
    pub threshold: Option<f64>,

    /// Comma-separated section ids, replaces the metadata allow-list
    #[arg(long = "active", value_delimiter = ',')]
    pub active: Vec<String>,

    /// Emit a complete Plotly sankey trace instead of bare plot data
    #[arg(long = "trace")]
    pub trace: bool,

    /// Write the sequenced graph as JSON for debugging
    #[arg(long = "dump-graph")]
    pub dump_graph: Option<PathBuf>,

    /// More log output (-v debug, -vv trace)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let mut config = load_config(args.config.as_deref())?;
    if let Some(threshold) = args.threshold {
        config.fold.threshold = threshold;
    }

    let mut input = read_input(&args)?;
    if !args.active.is_empty() {
        input.metadata.active = args.active.clone();
    }

    let graph = compute_flow_graph(&input, &config)?;
    if let Some(path) = args.dump_graph.as_deref() {
        write_graph_dump(path, &graph)
            .with_context(|| format!("failed to write graph dump to {}", path.display()))?;
    }

    let plot = assemble_plot_data(&graph, &config);
    let json = if args.trace {
        serde_json::to_string_pretty(&plot.to_trace(&config.trace))?
    } else {
        serde_json::to_string_pretty(&plot)?
    };
    write_output(&json, args.output.as_deref())
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn read_input(args: &Args) -> Result<SankeyInput> {
    if let Some(dir) = args.dir.as_deref() {
        return Ok(read_input_dir(dir)?);
    }
    if let Some(metadata) = args.metadata.as_deref() {
        return Ok(read_documents(metadata, &args.sections)?);
    }
    match args.input.as_deref() {
        Some(path) if path != Path::new("-") => Ok(read_input_file(path)?),
        _ => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            Ok(parse_input(&buf)?)
        }
    }
}

fn write_output(json: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => std::fs::write(path, json)
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(json.as_bytes())?;
            stdout.write_all(b"\n")?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_fan_out_arguments() {
        let args = Args::try_parse_from([
            "budget-sankey",
            "-m",
            "metadata.json",
            "goi.json",
            "g2_mod.json",
            "--active",
            "goi,g2_mod",
            "-t",
            "500",
        ])
        .expect("arguments should parse");
        assert_eq!(args.sections.len(), 2);
        assert_eq!(args.active, vec!["goi", "g2_mod"]);
        assert_eq!(args.threshold, Some(500.0));
    }

    #[test]
    fn input_and_dir_conflict() {
        assert!(Args::try_parse_from(["budget-sankey", "-i", "a.json", "-d", "sections"]).is_err());
        assert!(Args::try_parse_from(["budget-sankey", "goi.json"]).is_err());
    }
}
