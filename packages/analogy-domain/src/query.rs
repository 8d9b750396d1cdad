use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::knowledge::KnowledgeMode;

const FILL_OPERATION: &str = "fill";

#[derive(Debug, thiserror::Error)]
pub enum QueryError {
	#[error("Request body has no message.query_graph.")]
	MissingQueryGraph,
	#[error("Query graph is malformed: {0}")]
	Malformed(#[from] serde_json::Error),
	#[error("Query graph has no edges.")]
	MissingEdges,
	#[error("Edge {edge:?} references unknown node {node:?}.")]
	UnknownNode { edge: String, node: String },
	#[error("Node {node:?} declares no categories.")]
	MissingCategories { node: String },
	#[error("Edge {edge:?} declares no predicates.")]
	MissingPredicates { edge: String },
	#[error("Query graph edge {edge:?} is not known.")]
	UnknownEdge { edge: String },
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct QueryNode {
	#[serde(default)]
	pub categories: Vec<String>,
	#[serde(default)]
	pub ids: Option<Vec<String>>,
	#[serde(default)]
	pub constraints: Option<Vec<Value>>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct QueryEdge {
	pub subject: String,
	pub object: String,
	#[serde(default)]
	pub predicates: Vec<String>,
	#[serde(default)]
	pub knowledge_type: Option<String>,
	#[serde(default)]
	pub attribute_constraints: Option<Vec<Value>>,
	#[serde(default)]
	pub qualifier_constraints: Option<Vec<Value>>,
}
impl QueryEdge {
	pub fn knowledge_mode(&self) -> KnowledgeMode {
		KnowledgeMode::from_edge_value(self.knowledge_type.as_deref())
	}
}

/// Nodes and edges keyed by their query graph identifiers. Iteration order is identifier order.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct QueryGraph {
	#[serde(default)]
	pub nodes: BTreeMap<String, QueryNode>,
	#[serde(default)]
	pub edges: BTreeMap<String, QueryEdge>,
}
impl QueryGraph {
	pub fn is_one_hop(&self) -> bool {
		self.nodes.len() == 2 && self.edges.len() == 1
	}

	pub fn first_edge(&self) -> Result<(&str, &QueryEdge), QueryError> {
		self.edges
			.iter()
			.next()
			.map(|(id, edge)| (id.as_str(), edge))
			.ok_or(QueryError::MissingEdges)
	}

	pub fn node(&self, edge_id: &str, node_id: &str) -> Result<&QueryNode, QueryError> {
		self.nodes.get(node_id).ok_or_else(|| QueryError::UnknownNode {
			edge: edge_id.to_string(),
			node: node_id.to_string(),
		})
	}
}

/// Restricts which knowledge providers may supply a solution's primary path.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(tag = "kind", content = "providers", rename_all = "snake_case")]
pub enum ProviderFilter {
	#[default]
	Unrestricted,
	Allow(Vec<String>),
	Deny(Vec<String>),
}
impl ProviderFilter {
	/// Builds a filter from optional lists. A non-empty allow-list wins over a deny-list.
	pub fn from_lists(allow: Option<Vec<String>>, deny: Option<Vec<String>>) -> Self {
		match (allow, deny) {
			(Some(allow), _) if !allow.is_empty() => Self::Allow(allow),
			(_, Some(deny)) if !deny.is_empty() => Self::Deny(deny),
			_ => Self::Unrestricted,
		}
	}

	pub fn admits(&self, provider: &str) -> bool {
		match self {
			Self::Unrestricted => true,
			Self::Allow(list) => list.iter().any(|name| name == provider),
			Self::Deny(list) => !list.iter().any(|name| name == provider),
		}
	}

	pub fn label(&self) -> &'static str {
		match self {
			Self::Unrestricted => "none",
			Self::Allow(_) => "allow",
			Self::Deny(_) => "deny",
		}
	}

	pub fn providers(&self) -> &[String] {
		match self {
			Self::Unrestricted => &[],
			Self::Allow(list) | Self::Deny(list) => list,
		}
	}
}

#[derive(Debug, Deserialize)]
struct WorkflowOperation {
	id: String,
	#[serde(default)]
	parameters: Option<FillParameters>,
}

#[derive(Debug, Default, Deserialize)]
struct FillParameters {
	#[serde(default)]
	allowlist: Option<Vec<String>>,
	#[serde(default)]
	denylist: Option<Vec<String>>,
}

/// Request state extracted once per query and read-only afterwards.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct QueryContext {
	pub graph: QueryGraph,
	pub primary_edge_id: String,
	pub subject_categories: Vec<String>,
	pub object_categories: Vec<String>,
	pub predicates: Vec<String>,
	pub subject_ids: Option<Vec<String>>,
	pub object_ids: Option<Vec<String>>,
	pub subject_constraints: Option<Vec<Value>>,
	pub object_constraints: Option<Vec<Value>>,
	pub attribute_constraints: Option<Vec<Value>>,
	pub qualifier_constraints: Option<Vec<Value>>,
	pub knowledge_mode: KnowledgeMode,
	pub provider_filter: ProviderFilter,
	pub is_one_hop: bool,
}
impl QueryContext {
	/// Extracts query metadata from a request body shaped like
	/// `{"message": {"query_graph": {...}}, "workflow": [...]}`.
	pub fn from_request(body: &Value) -> Result<Self, QueryError> {
		let raw_graph = body
			.get("message")
			.and_then(|message| message.get("query_graph"))
			.filter(|graph| !graph.is_null())
			.ok_or(QueryError::MissingQueryGraph)?;
		let graph: QueryGraph = serde_json::from_value(raw_graph.clone())?;
		let provider_filter = match body.get("workflow") {
			Some(workflow) if !workflow.is_null() => provider_filter_from_workflow(workflow)?,
			_ => ProviderFilter::Unrestricted,
		};

		Self::from_graph(graph, provider_filter)
	}

	pub fn from_graph(graph: QueryGraph, provider_filter: ProviderFilter) -> Result<Self, QueryError> {
		let (edge_id, edge) = graph.first_edge()?;
		let subject = graph.node(edge_id, &edge.subject)?;
		let object = graph.node(edge_id, &edge.object)?;

		if subject.categories.is_empty() {
			return Err(QueryError::MissingCategories { node: edge.subject.clone() });
		}
		if object.categories.is_empty() {
			return Err(QueryError::MissingCategories { node: edge.object.clone() });
		}
		if edge.predicates.is_empty() {
			return Err(QueryError::MissingPredicates { edge: edge_id.to_string() });
		}

		Ok(Self {
			primary_edge_id: edge_id.to_string(),
			subject_categories: subject.categories.clone(),
			object_categories: object.categories.clone(),
			predicates: edge.predicates.clone(),
			subject_ids: subject.ids.clone(),
			object_ids: object.ids.clone(),
			subject_constraints: subject.constraints.clone(),
			object_constraints: object.constraints.clone(),
			attribute_constraints: edge.attribute_constraints.clone(),
			qualifier_constraints: edge.qualifier_constraints.clone(),
			knowledge_mode: edge.knowledge_mode(),
			provider_filter,
			is_one_hop: graph.is_one_hop(),
			graph,
		})
	}

	/// True when any edge of the graph requests creative knowledge.
	pub fn has_creative_edge(&self) -> bool {
		self.graph.edges.values().any(|edge| edge.knowledge_mode() == KnowledgeMode::Creative)
	}
}

/// The last `fill` operation of the workflow decides the provider filter.
fn provider_filter_from_workflow(workflow: &Value) -> Result<ProviderFilter, QueryError> {
	let operations: Vec<WorkflowOperation> = serde_json::from_value(workflow.clone())?;
	let mut filter = ProviderFilter::Unrestricted;

	for operation in operations {
		if operation.id != FILL_OPERATION {
			continue;
		}

		let parameters = operation.parameters.unwrap_or_default();

		filter = ProviderFilter::from_lists(parameters.allowlist, parameters.denylist);
	}

	Ok(filter)
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TripletNode {
	pub id: String,
	pub node: QueryNode,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TripletEdge {
	pub id: String,
	pub edge: QueryEdge,
}

/// One (source, predicate, target) hop of a decomposed query graph.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Triplet {
	pub source: TripletNode,
	pub predicate: TripletEdge,
	pub target: TripletNode,
}
impl Triplet {
	/// Builds the triplet for `edge_id`, oriented from the edge's subject to its object.
	pub fn from_edge(graph: &QueryGraph, edge_id: &str) -> Result<Self, QueryError> {
		let edge = graph
			.edges
			.get(edge_id)
			.ok_or_else(|| QueryError::UnknownEdge { edge: edge_id.to_string() })?;
		let source = graph.node(edge_id, &edge.subject)?;
		let target = graph.node(edge_id, &edge.object)?;

		Ok(Self {
			source: TripletNode { id: edge.subject.clone(), node: source.clone() },
			predicate: TripletEdge { id: edge_id.to_string(), edge: edge.clone() },
			target: TripletNode { id: edge.object.clone(), node: target.clone() },
		})
	}

	pub fn source_category(&self) -> Result<&str, QueryError> {
		self.source
			.node
			.categories
			.first()
			.map(String::as_str)
			.ok_or_else(|| QueryError::MissingCategories { node: self.source.id.clone() })
	}

	pub fn target_category(&self) -> Result<&str, QueryError> {
		self.target
			.node
			.categories
			.first()
			.map(String::as_str)
			.ok_or_else(|| QueryError::MissingCategories { node: self.target.id.clone() })
	}

	pub fn primary_predicate(&self) -> Result<&str, QueryError> {
		self.predicate
			.edge
			.predicates
			.first()
			.map(String::as_str)
			.ok_or_else(|| QueryError::MissingPredicates { edge: self.predicate.id.clone() })
	}

	pub fn knowledge_mode(&self) -> KnowledgeMode {
		self.predicate.edge.knowledge_mode()
	}

	/// Fails when the triplet lacks a category on either end or a predicate.
	pub fn validate(&self) -> Result<(), QueryError> {
		self.source_category()?;
		self.target_category()?;
		self.primary_predicate()?;

		Ok(())
	}
}
impl fmt::Display for Triplet {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}-[{}]->{}", self.source.id, self.predicate.id, self.target.id)
	}
}
