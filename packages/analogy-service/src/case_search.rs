//! Per-triplet similar-case search with the creative-mode fallback to direct-provider cases.
//!
//! A creative edge first searches derived and direct-provider cases. When that finds nothing the
//! edge is searched again over direct-provider cases only, below a similarity ceiling so that
//! identical cases are excluded. When the caller forces it, every edge skips the first search and
//! goes straight to that direct-provider search. Either way the query as a whole is marked as
//! having fallen back.

use serde::Serialize;

use analogy_domain::{
	knowledge::{KnowledgeMode, Provenance},
	log::LogChannel,
	query::Triplet,
};

use crate::{CaseSearchBackend, Result};

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ScoredCase {
	pub case_id: String,
	pub similarity: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CaseSearchRequest<'a> {
	pub subject_category: &'a str,
	pub object_category: &'a str,
	pub predicate: &'a str,
	pub provenance: &'a [Provenance],
	pub mode: KnowledgeMode,
	/// Exclusive upper bound on similarity; `None` searches without a ceiling.
	pub similarity_below: Option<f64>,
	pub limit: u32,
}

#[derive(Clone, Copy, Debug)]
pub struct SearchPolicy {
	/// Skip the first search of every triplet and go straight to the direct-provider fallback.
	pub force_direct: bool,
	pub fallback_ceiling: f64,
	pub case_limit: u32,
}
impl SearchPolicy {
	pub fn from_config(cfg: &analogy_config::Search, force_direct: bool) -> Self {
		Self {
			force_direct,
			fallback_ceiling: cfg.fallback_similarity_ceiling,
			case_limit: cfg.case_limit,
		}
	}
}

#[derive(Debug, Default)]
pub struct CaseSearchOutcome {
	/// Candidate case ids per triplet, most similar first.
	pub case_ids: Vec<Vec<String>>,
	/// Scored cases per triplet as returned by the backend.
	pub scored: Vec<Vec<ScoredCase>>,
	pub fell_back: bool,
	pub logs: LogChannel,
}

pub fn hop_identifier(index: usize, total: usize, triplet: &Triplet) -> String {
	format!("Hop {} of {total} - {triplet}", index + 1)
}

pub async fn find_similar_cases(
	backend: &dyn CaseSearchBackend,
	triplets: &[Triplet],
	policy: &SearchPolicy,
) -> Result<CaseSearchOutcome> {
	let mut outcome = CaseSearchOutcome::default();

	for (idx, triplet) in triplets.iter().enumerate() {
		let identifier = hop_identifier(idx, triplets.len(), triplet);
		let mode = triplet.knowledge_mode();
		let mut request = CaseSearchRequest {
			subject_category: triplet.source_category()?,
			object_category: triplet.target_category()?,
			predicate: triplet.primary_predicate()?,
			provenance: mode.provenance(),
			mode,
			similarity_below: None,
			limit: policy.case_limit,
		};
		let creative = mode == KnowledgeMode::Creative;
		let mut scored = Vec::new();

		if !policy.force_direct {
			outcome.logs.debug(
				identifier.as_str(),
				format!(
					"Searching for cases in '{mode}' mode. Searching for {} cases.",
					provenance_label(request.provenance)
				),
			);

			scored = backend.search(&request).await?;
		}
		if policy.force_direct || (creative && scored.is_empty()) {
			request.provenance = KnowledgeMode::Lookup.provenance();
			request.mode = KnowledgeMode::Lookup;
			request.similarity_below = Some(policy.fallback_ceiling);

			let message = if policy.force_direct {
				format!("Searching using {} cases.", provenance_label(request.provenance))
			} else {
				format!("No cases found, switching to {} cases.", provenance_label(request.provenance))
			};

			outcome.logs.debug(identifier.as_str(), message);
			tracing::debug!(
				hop = %identifier,
				forced = policy.force_direct,
				ceiling = policy.fallback_ceiling,
				"Falling back to direct-provider case search."
			);

			scored = backend.search(&request).await?;
			outcome.fell_back = true;
		}

		outcome.logs.debug(
			identifier.as_str(),
			format!("Identified {} Case Problems: (Case ID, Similarity) {}", scored.len(), describe(&scored)),
		);
		tracing::debug!(hop = %identifier, cases = scored.len(), "Identified similar cases.");

		outcome.case_ids.push(scored.iter().map(|case| case.case_id.clone()).collect());
		outcome.scored.push(scored);
	}

	Ok(outcome)
}

fn provenance_label(provenance: &[Provenance]) -> String {
	let labels = provenance.iter().map(|item| item.as_str()).collect::<Vec<_>>();

	format!("[{}]", labels.join(", "))
}

fn describe(scored: &[ScoredCase]) -> String {
	let pairs = scored
		.iter()
		.map(|case| format!("({}, {:.4})", case.case_id, case.similarity))
		.collect::<Vec<_>>();

	format!("[{}]", pairs.join(", "))
}
