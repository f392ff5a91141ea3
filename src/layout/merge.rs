use tracing::debug;

use crate::error::{Error, Result};
use crate::ir::{Metadata, Section, SectionGraph};

use super::position::resolve_position;
use super::section::process_section;

/// Folds every section, in input order, into one graph seeded with the root.
///
/// Labels and positions are last-write-wins across sections, except the root
/// position, which only the metadata sets. Edges always append.
pub fn merge_sections(sections: &[Section], metadata: &Metadata) -> Result<SectionGraph> {
    let root = metadata.root.as_str();
    let mut merged = SectionGraph::default();
    merged.positions.insert(
        root.to_string(),
        resolve_position(&metadata.position, metadata, root)?,
    );

    for section in sections {
        let partial = process_section(section, metadata)?;
        merged.labels.extend(partial.labels);
        for (key, pos) in partial.positions {
            if key == root {
                debug!(section = ?section.id, "ignoring section position for root");
                continue;
            }
            merged.positions.insert(key, pos);
        }
        merged.edges.extend(partial.edges);
    }

    check_endpoints(&merged, root)?;
    debug!(
        nodes = merged.labels.len(),
        edges = merged.edges.len(),
        "merged sections"
    );
    Ok(merged)
}

fn check_endpoints(graph: &SectionGraph, root: &str) -> Result<()> {
    if !graph.edges.is_empty() && !graph.labels.contains_key(root) {
        return Err(Error::MissingRoot {
            root: root.to_string(),
        });
    }
    for edge in &graph.edges {
        for key in [&edge.source, &edge.target] {
            if !graph.labels.contains_key(key) {
                return Err(Error::UnresolvedNode {
                    key: key.clone(),
                    source_key: edge.source.clone(),
                    target: edge.target.clone(),
                });
            }
        }
    }
    Ok(())
}
