use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::{knowledge::KnowledgeMode, query::Triplet};

#[derive(Debug, thiserror::Error)]
pub enum SolutionError {
	#[error(
		"Solution {solution_id} names a second-path provider but lacks its categories or predicate."
	)]
	IncompleteSecondPath { solution_id: i64 },
}

/// One provider hop of a stored solution.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct PathSegment {
	pub subject_category: String,
	pub object_category: String,
	pub predicate: String,
	pub provider: String,
}

/// Nullable second-path columns as stored.
#[derive(Clone, Debug, Default)]
pub struct SecondPathColumns {
	pub provider: Option<String>,
	pub subject_category: Option<String>,
	pub object_category: Option<String>,
	pub predicate: Option<String>,
}

/// A raw solution row attached to a case.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct SolutionRecord {
	pub solution_id: i64,
	pub case_id: String,
	pub primary: PathSegment,
	pub secondary: Option<PathSegment>,
	/// Provider priority of the primary path. Lower ranks first; unknown providers are 0.
	pub priority: i32,
}
impl SolutionRecord {
	/// The second-path provider column alone decides whether the record has a second path.
	pub fn from_columns(
		solution_id: i64,
		case_id: String,
		primary: PathSegment,
		second: SecondPathColumns,
		priority: i32,
	) -> Result<Self, SolutionError> {
		let secondary = match second {
			SecondPathColumns { provider: None, .. } => None,
			SecondPathColumns {
				provider: Some(provider),
				subject_category: Some(subject_category),
				object_category: Some(object_category),
				predicate: Some(predicate),
			} => Some(PathSegment { subject_category, object_category, predicate, provider }),
			_ => return Err(SolutionError::IncompleteSecondPath { solution_id }),
		};

		Ok(Self { solution_id, case_id, primary, secondary, priority })
	}

	pub fn path_count(&self) -> usize {
		if self.secondary.is_some() { 2 } else { 1 }
	}

	pub fn is_single_path(&self) -> bool {
		self.secondary.is_none()
	}

	pub fn segments(&self) -> impl Iterator<Item = &PathSegment> {
		std::iter::once(&self.primary).chain(self.secondary.as_ref())
	}
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct KnowledgeProvider {
	pub name: String,
	/// `None` when no URL is configured at the current or any more mature environment level.
	pub url: Option<String>,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct SolutionPath {
	pub subject_category: String,
	pub predicate: String,
	pub object_category: String,
	pub provider: KnowledgeProvider,
}

/// A concrete one- or two-provider realization of a case's answer to one triplet.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Solution {
	pub dispatch_id: Uuid,
	pub description: String,
	pub solution_id: i64,
	pub case_id: String,
	pub subject_node_id: String,
	pub object_node_id: String,
	pub predicate_edge_id: String,
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
	paths: Vec<SolutionPath>,
}
impl Solution {
	/// Materializes `record` for `triplet`. `resolve_url` maps a provider name to its endpoint.
	pub fn build<F>(
		triplet: &Triplet,
		record: &SolutionRecord,
		dispatch_id: Uuid,
		resolve_url: F,
	) -> Self
	where
		F: Fn(&str) -> Option<String>,
	{
		let paths = record
			.segments()
			.map(|segment| SolutionPath {
				subject_category: segment.subject_category.clone(),
				predicate: segment.predicate.clone(),
				object_category: segment.object_category.clone(),
				provider: KnowledgeProvider {
					name: segment.provider.clone(),
					url: resolve_url(&segment.provider),
				},
			})
			.collect::<Vec<_>>();
		let source = &triplet.source.node;
		let target = &triplet.target.node;
		let edge = &triplet.predicate.edge;

		Self {
			dispatch_id,
			description: format!("Solution {} for Case {}", record.solution_id, record.case_id),
			solution_id: record.solution_id,
			case_id: record.case_id.clone(),
			subject_node_id: triplet.source.id.clone(),
			object_node_id: triplet.target.id.clone(),
			predicate_edge_id: triplet.predicate.id.clone(),
			subject_categories: source.categories.clone(),
			object_categories: target.categories.clone(),
			predicates: edge.predicates.clone(),
			subject_ids: source.ids.clone(),
			object_ids: target.ids.clone(),
			subject_constraints: source.constraints.clone(),
			object_constraints: target.constraints.clone(),
			attribute_constraints: edge.attribute_constraints.clone(),
			qualifier_constraints: edge.qualifier_constraints.clone(),
			knowledge_mode: edge.knowledge_mode(),
			paths,
		}
	}

	pub fn paths(&self) -> &[SolutionPath] {
		&self.paths
	}

	/// Provider names in path order.
	pub fn providers(&self) -> impl Iterator<Item = &str> {
		self.paths.iter().map(|path| path.provider.name.as_str())
	}
}
impl fmt::Display for Solution {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "Solution {} (case {}) via ", self.solution_id, self.case_id)?;

		for (idx, provider) in self.providers().enumerate() {
			if idx > 0 {
				f.write_str(" -> ")?;
			}

			f.write_str(provider)?;
		}

		Ok(())
	}
}
