//! Decoding of metadata and section documents.
//!
//! Sections arrive either as one batch document
//! (`{ "metadata": {...}, "data": [...] }`) or as separately stored files, one
//! per section plus a `metadata.json`. Both forms decode to the same
//! [`SankeyInput`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::ir::{EdgeValue, Group, Metadata, SankeyInput, Section, SectionEdge, SymbolicPosition};

/// Value older section files use in place of an unknown flow.
const LEGACY_UNKNOWN_SENTINEL: f64 = -1.0;

pub const METADATA_FILE: &str = "metadata.json";

#[derive(Debug, Deserialize)]
struct RawInput {
    metadata: RawMetadata,
    #[serde(default)]
    data: Vec<RawSection>,
}

#[derive(Debug, Deserialize)]
struct RawMetadata {
    root: String,
    position: SymbolicPosition,
    #[serde(default)]
    xpos: BTreeMap<String, f64>,
    #[serde(default)]
    ypos: BTreeMap<String, f64>,
    #[serde(default)]
    active: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawSection {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    desc: Option<String>,
    #[serde(default)]
    nodes: BTreeMap<String, String>,
    #[serde(default)]
    edges: Vec<RawEdge>,
    #[serde(default)]
    pos: Option<SymbolicPosition>,
    #[serde(default)]
    group: Option<RawGroup>,
}

#[derive(Debug, Deserialize)]
struct RawGroup {
    id: String,
    name: String,
    #[serde(default)]
    display: bool,
    #[serde(default)]
    pos: Option<SymbolicPosition>,
}

#[derive(Debug, Deserialize)]
struct RawEdge(String, String, Option<RawValue>);

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawValue {
    Amount(f64),
    Marker(UnknownMarker),
}

#[derive(Debug, Deserialize)]
enum UnknownMarker {
    #[serde(rename = "unknown")]
    Unknown,
}

fn edge_value(raw: Option<RawValue>) -> Result<EdgeValue> {
    match raw {
        None | Some(RawValue::Marker(UnknownMarker::Unknown)) => Ok(EdgeValue::Unknown),
        Some(RawValue::Amount(value)) if value == LEGACY_UNKNOWN_SENTINEL => Ok(EdgeValue::Unknown),
        Some(RawValue::Amount(value)) if !value.is_finite() || value < 0.0 => {
            Err(Error::InvalidEdgeValue { value })
        }
        Some(RawValue::Amount(value)) => Ok(EdgeValue::Known(value)),
    }
}

impl From<RawMetadata> for Metadata {
    fn from(raw: RawMetadata) -> Self {
        Metadata {
            root: raw.root,
            position: raw.position,
            xpos: raw.xpos,
            ypos: raw.ypos,
            active: raw.active,
        }
    }
}

impl TryFrom<RawSection> for Section {
    type Error = Error;

    fn try_from(raw: RawSection) -> Result<Self> {
        let edges = raw
            .edges
            .into_iter()
            .map(|RawEdge(source, target, value)| {
                Ok(SectionEdge::new(source, target, edge_value(value)?))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Section {
            id: raw.id,
            desc: raw.desc,
            nodes: raw.nodes,
            edges,
            pos: raw.pos,
            group: raw.group.map(|group| Group {
                id: group.id,
                name: group.name,
                display: group.display,
                pos: group.pos,
            }),
        })
    }
}

pub fn parse_input(json: &str) -> Result<SankeyInput> {
    let raw: RawInput = serde_json::from_str(json)?;
    let sections = raw
        .data
        .into_iter()
        .map(Section::try_from)
        .collect::<Result<Vec<_>>>()?;
    Ok(SankeyInput {
        metadata: raw.metadata.into(),
        sections,
    })
}

pub fn parse_metadata(json: &str) -> Result<Metadata> {
    let raw: RawMetadata = serde_json::from_str(json)?;
    Ok(raw.into())
}

pub fn parse_section(json: &str) -> Result<Section> {
    let raw: RawSection = serde_json::from_str(json)?;
    Section::try_from(raw)
}

/// Decodes a JSON array of section documents.
pub fn parse_sections(json: &str) -> Result<Vec<Section>> {
    let raw: Vec<RawSection> = serde_json::from_str(json)?;
    raw.into_iter().map(Section::try_from).collect()
}

fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })
}

pub fn read_input_file(path: &Path) -> Result<SankeyInput> {
    parse_input(&read_file(path)?)
}

/// Loads a metadata document and the given section documents, keeping the
/// section order as given.
pub fn read_documents(metadata: &Path, sections: &[PathBuf]) -> Result<SankeyInput> {
    let metadata = parse_metadata(&read_file(metadata)?)?;
    let sections = sections
        .iter()
        .map(|path| parse_section(&read_file(path)?))
        .collect::<Result<Vec<_>>>()?;
    Ok(SankeyInput { metadata, sections })
}

/// Loads `metadata.json` from `dir` plus every other `*.json` file in
/// file-name order.
pub fn read_input_dir(dir: &Path) -> Result<SankeyInput> {
    let io_err = |source| Error::Io {
        path: dir.to_path_buf(),
        source,
    };
    let mut sections = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);
        let is_metadata = path
            .file_name()
            .and_then(|name| name.to_str())
            .map(|name| name == METADATA_FILE)
            .unwrap_or(false);
        if is_json && !is_metadata && path.is_file() {
            sections.push(path);
        }
    }
    sections.sort();
    read_documents(&dir.join(METADATA_FILE), &sections)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_batch_document() {
        let input = parse_input(
            r#"{
                "metadata": {
                    "root": "G",
                    "position": {"x": "l0", "y": "r0"},
                    "xpos": {"l0": 0.0, "l1": 1.0},
                    "ypos": {"r0": 0.0},
                    "active": ["s1"],
                    "levels": [1, 2]
                },
                "data": [{
                    "id": "s1",
                    "desc": "first",
                    "nodes": {"G": "Gov", "A": "Agency A"},
                    "edges": [["G", "A", 100]],
                    "pos": {"x": "l1", "y": "r0"},
                    "group": {"id": "grp", "name": "Group", "display": true}
                }]
            }"#,
        )
        .expect("batch should decode");

        assert_eq!(input.metadata.root, "G");
        assert!(input.metadata.is_active("s1"));
        assert_eq!(input.sections.len(), 1);
        let section = &input.sections[0];
        assert_eq!(section.desc.as_deref(), Some("first"));
        assert_eq!(section.edges[0].value, EdgeValue::Known(100.0));
        let group = section.group.as_ref().expect("group");
        assert!(group.display);
        assert!(group.pos.is_none());
    }

    #[test]
    fn unknown_markers_decode_to_tagged_variant() {
        let section = parse_section(
            r#"{"edges": [["A", "B", -1], ["A", "C", null], ["A", "D", "unknown"], ["A", "E", 0]]}"#,
        )
        .expect("section should decode");
        let values: Vec<EdgeValue> = section.edges.iter().map(|edge| edge.value).collect();
        assert_eq!(
            values,
            vec![
                EdgeValue::Unknown,
                EdgeValue::Unknown,
                EdgeValue::Unknown,
                EdgeValue::Known(0.0)
            ]
        );
        assert!(section.id.is_none());
    }

    #[test]
    fn rejects_other_negative_values() {
        let err = parse_section(r#"{"edges": [["A", "B", -5]]}"#).unwrap_err();
        assert!(matches!(err, Error::InvalidEdgeValue { value } if value == -5.0));
    }

    #[test]
    fn rejects_malformed_documents() {
        assert!(matches!(parse_metadata("{\"root\": 1}"), Err(Error::Json(_))));
        assert!(parse_section(r#"{"edges": [["A", "B", "lots"]]}"#).is_err());
    }
}
