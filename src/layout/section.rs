use tracing::debug;

use crate::error::Result;
use crate::ir::{Metadata, Section, SectionEdge, SectionGraph};

use super::position::{next_column, resolve_position};

/// Turns one section into a partial graph. Sections missing from the
/// metadata allow-list contribute nothing.
pub fn process_section(section: &Section, metadata: &Metadata) -> Result<SectionGraph> {
    let Some(section_id) = section.id.as_deref().filter(|id| metadata.is_active(id)) else {
        debug!(section = ?section.id, "skipping inactive section");
        return Ok(SectionGraph::default());
    };

    let mut graph = SectionGraph {
        labels: section.nodes.clone(),
        positions: Default::default(),
        edges: section.edges.clone(),
    };

    // Every node a section points at sits in the section's column.
    if let (Some(pos), Some(first)) = (&section.pos, section.edges.first()) {
        let resolved = resolve_position(pos, metadata, &first.target)?;
        for edge in &section.edges {
            graph.positions.insert(edge.target.clone(), resolved);
        }
    }

    graph.prune_unconnected();

    if let Some(group) = section.group.as_ref().filter(|group| group.display) {
        let group_pos = match &group.pos {
            Some(pos) => Some(pos.clone()),
            None => section.pos.as_ref().map(next_column).transpose()?,
        };
        if let Some(pos) = group_pos {
            let resolved = resolve_position(&pos, metadata, &group.id)?;
            graph.positions.insert(group.id.clone(), resolved);
        }
        graph.labels.insert(group.id.clone(), group.name.clone());
        graph.edges.extend(
            section
                .edges
                .iter()
                .map(|edge| SectionEdge::new(edge.target.clone(), group.id.clone(), edge.value)),
        );
    }

    debug!(
        section = section_id,
        desc = section.desc.as_deref().unwrap_or(""),
        nodes = graph.labels.len(),
        edges = graph.edges.len(),
        "processed section"
    );
    Ok(graph)
}
