use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FoldConfig {
    /// Edges strictly below this value are folded into "Others".
    pub threshold: f64,
    /// Drop "Others" aggregates that do not themselves exceed `threshold`.
    /// Loses their flow from the diagram.
    pub drop_small_aggregates: bool,
}

impl Default for FoldConfig {
    fn default() -> Self {
        Self {
            threshold: 10_000.0,
            drop_small_aggregates: false,
        }
    }
}

/// Brighten, then desaturate, then apply alpha.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgeToneConfig {
    /// Lightness points added (0-100 scale).
    pub brighten: f64,
    /// Saturation points removed (0-100 scale).
    pub desaturate: f64,
    pub alpha: f64,
}

impl Default for EdgeToneConfig {
    fn default() -> Self {
        Self {
            brighten: 18.0,
            desaturate: 20.0,
            alpha: 0.5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorConfig {
    pub palette_size: usize,
    /// Explicit palette; generated when absent.
    pub palette: Option<Vec<String>>,
    pub default_node_color: String,
    pub default_edge_color: String,
    pub edge_tone: EdgeToneConfig,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            palette_size: 40,
            palette: None,
            default_node_color: "#cccccc".to_string(),
            default_edge_color: "#abcdef".to_string(),
            edge_tone: EdgeToneConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HoverConfig {
    /// Rupees per input unit; budget sections are authored in crores.
    pub rupees_per_unit: f64,
    pub inr_per_usd: f64,
    pub primary_symbol: String,
    pub large_unit_label: String,
    /// Rupees in one `large_unit_label`.
    pub large_unit_rupees: f64,
    pub secondary_symbol: String,
}

impl Default for HoverConfig {
    fn default() -> Self {
        Self {
            rupees_per_unit: 1e7,
            inr_per_usd: 83.0,
            primary_symbol: "₹".to_string(),
            large_unit_label: "Lakh Crore".to_string(),
            large_unit_rupees: 1e12,
            secondary_symbol: "$".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TraceConfig {
    pub node_pad: f64,
    pub node_thickness: f64,
    pub node_line_color: String,
    pub node_line_width: f64,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            node_pad: 15.0,
            node_thickness: 30.0,
            node_line_color: "black".to_string(),
            node_line_width: 0.5,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub fold: FoldConfig,
    pub colors: ColorConfig,
    pub hover: HoverConfig,
    pub trace: TraceConfig,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<PipelineConfig> {
    let Some(path) = path else {
        return Ok(PipelineConfig::default());
    };

    let contents = std::fs::read_to_string(path)?;
    let config = match serde_json::from_str::<PipelineConfig>(&contents) {
        Ok(config) => config,
        Err(json_err) => json5::from_str::<PipelineConfig>(&contents).map_err(|_| json_err)?,
    };
    Ok(config)
}
