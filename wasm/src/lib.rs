use budget_sankey::ir::SankeyInput;
use budget_sankey::{PipelineConfig, compute_plot_data, parse_input, parse_metadata, parse_sections};
use serde::Deserialize;
use wasm_bindgen::prelude::*;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SankeyPlotOptions {
    threshold: Option<f64>,
    active: Option<Vec<String>>,
    trace: Option<bool>,
}

fn parse_options(options_json: Option<String>) -> Result<SankeyPlotOptions, JsValue> {
    match options_json {
        Some(raw) => serde_json::from_str(&raw).map_err(|error| JsValue::from_str(&error.to_string())),
        None => Ok(SankeyPlotOptions::default()),
    }
}

fn build_plot(mut input: SankeyInput, options: SankeyPlotOptions) -> Result<String, budget_sankey::Error> {
    let mut config = PipelineConfig::default();
    if let Some(threshold) = options.threshold {
        config.fold.threshold = threshold;
    }
    if let Some(active) = options.active {
        input.metadata.active = active;
    }

    let plot = compute_plot_data(&input, &config)?;
    let json = if options.trace.unwrap_or(false) {
        serde_json::to_string(&plot.to_trace(&config.trace))?
    } else {
        serde_json::to_string(&plot)?
    };
    Ok(json)
}

/// Builds PlotData JSON from a `{ "metadata", "data" }` batch document.
#[wasm_bindgen]
pub fn build_sankey_plot(batch_json: &str, options_json: Option<String>) -> Result<String, JsValue> {
    let options = parse_options(options_json)?;
    let input = parse_input(batch_json).map_err(|error| JsValue::from_str(&error.to_string()))?;
    build_plot(input, options).map_err(|error| JsValue::from_str(&error.to_string()))
}

/// Same as [`build_sankey_plot`] for the fan-out layout: one metadata
/// document plus a JSON array of section documents.
#[wasm_bindgen]
pub fn build_sankey_plot_from_documents(
    metadata_json: &str,
    sections_json: &str,
    options_json: Option<String>,
) -> Result<String, JsValue> {
    let options = parse_options(options_json)?;
    let input = parse_metadata(metadata_json)
        .and_then(|metadata| {
            Ok(SankeyInput {
                metadata,
                sections: parse_sections(sections_json)?,
            })
        })
        .map_err(|error| JsValue::from_str(&error.to_string()))?;
    build_plot(input, options).map_err(|error| JsValue::from_str(&error.to_string()))
}

#[cfg(test)]
mod tests {
    use budget_sankey::{parse_metadata, parse_sections};

    use crate::{SankeyPlotOptions, build_plot};

    const METADATA: &str = r#"{
        "root": "G",
        "position": { "x": "l0", "y": "r0" },
        "xpos": { "l0": 0, "l1": 1 },
        "ypos": { "r0": 0, "r1": 1 },
        "active": ["s1"]
    }"#;

    const SECTIONS: &str = r#"[{
        "id": "s1",
        "nodes": { "G": "Gov", "A": "Agency A", "B": "Agency B" },
        "edges": [["G", "A", 100], ["G", "B", 5]],
        "pos": { "x": "l1", "y": "r0" }
    }]"#;

    #[test]
    fn builds_plot_from_fan_out_documents() {
        let input = budget_sankey::ir::SankeyInput {
            metadata: parse_metadata(METADATA).expect("metadata should parse"),
            sections: parse_sections(SECTIONS).expect("sections should parse"),
        };
        let options = SankeyPlotOptions {
            threshold: Some(10.0),
            ..SankeyPlotOptions::default()
        };

        let json = build_plot(input, options).expect("plot should build");

        assert!(json.contains("\"G (Others)\""));
        assert!(json.contains("\"Agency A\""));
        assert!(!json.contains("\"Agency B\""));
    }
}
