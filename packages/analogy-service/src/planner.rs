use std::collections::BTreeSet;

use analogy_domain::query::{QueryGraph, Triplet};

use crate::{Error, PathPlanner, Result};

/// Walks a chain-shaped query graph outward from its pinned node.
///
/// The pinned node is the first node carrying identifiers, or the subject of the first edge when
/// no node does. Each step takes the lowest-id unused edge touching the current node; the triplet
/// keeps the edge's own subject to object orientation.
pub struct ChainPathPlanner;
impl PathPlanner for ChainPathPlanner {
	fn plan(&self, graph: &QueryGraph) -> Result<Vec<Triplet>> {
		let (first_edge_id, first_edge) = graph.first_edge()?;
		let mut current = graph
			.nodes
			.iter()
			.find(|(_, node)| node.ids.as_ref().is_some_and(|ids| !ids.is_empty()))
			.map(|(id, _)| id.as_str())
			.unwrap_or(first_edge.subject.as_str());
		let mut used = BTreeSet::new();
		let mut triplets = Vec::with_capacity(graph.edges.len());

		while used.len() < graph.edges.len() {
			let Some((edge_id, edge)) = graph.edges.iter().find(|(id, edge)| {
				!used.contains(id.as_str()) && (edge.subject == current || edge.object == current)
			}) else {
				return Err(Error::InvalidQuery {
					message: format!(
						"Query graph is not a chain reachable from node {current:?} (first edge {first_edge_id:?})."
					),
				});
			};

			triplets.push(Triplet::from_edge(graph, edge_id)?);
			used.insert(edge_id.as_str());

			current = if edge.subject == current { edge.object.as_str() } else { edge.subject.as_str() };
		}

		Ok(triplets)
	}
}
