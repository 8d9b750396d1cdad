//! Batch solution retrieval, conflation dedup, and per-triplet solution construction.

use std::collections::{BTreeSet, HashMap};

use uuid::Uuid;

use analogy_domain::{
	conflation::{ConflationRules, dedup_conflated},
	log::LogChannel,
	plan::derive_dispatch_id,
	query::{ProviderFilter, Triplet},
	solution::{Solution, SolutionRecord},
};

use crate::{
	CaseStore, Error, Result, SolutionRanker, case_search::hop_identifier,
	url_resolver::ProviderUrls,
};

const LOADER_IDENTIFIER: &str = "Case Solution Manager";
const NO_CASE_SOLUTIONS: &str = "NoCaseSolutions";

pub struct SolutionSources<'a> {
	pub store: &'a dyn CaseStore,
	pub ranker: &'a dyn SolutionRanker,
	pub urls: &'a ProviderUrls,
	pub rules: &'a ConflationRules,
}

#[derive(Debug, Default)]
pub struct SolutionLoadOutcome {
	/// Solutions per triplet, in candidate case order and rank order within a case.
	pub per_triplet: Vec<Vec<Solution>>,
	/// Solution ids removed as conflated duplicates, ascending.
	pub conflated: Vec<i64>,
	pub logs: LogChannel,
}

pub async fn load_solutions(
	sources: &SolutionSources<'_>,
	triplets: &[Triplet],
	case_ids: &[Vec<String>],
	filter: &ProviderFilter,
	parent: Uuid,
) -> Result<SolutionLoadOutcome> {
	if triplets.len() != case_ids.len() {
		return Err(Error::Invariant {
			message: format!(
				"Got candidate cases for {} triplets but {} triplets were planned.",
				case_ids.len(),
				triplets.len()
			),
		});
	}

	let mut logs = LogChannel::new();
	let all_case_ids = case_ids
		.iter()
		.flatten()
		.cloned()
		.collect::<BTreeSet<_>>()
		.into_iter()
		.collect::<Vec<_>>();
	let mut records = sources.store.case_solutions(&all_case_ids, filter).await?;
	let matched = records.len();

	records.retain(|record| filter.admits(&record.primary.provider));

	if records.len() != matched {
		tracing::warn!(
			dropped = matched - records.len(),
			filter = filter.label(),
			"Case store returned solutions outside the provider filter."
		);
	}

	logs.debug(
		LOADER_IDENTIFIER,
		format!(
			"Matched {} Case Solutions with {} list: {:?}",
			records.len(),
			filter.label(),
			filter.providers()
		),
	);

	let dedup = dedup_conflated(records, sources.rules);

	logs.debug(
		LOADER_IDENTIFIER,
		format!(
			"Filtered {} conflated Case Solutions: {:?}",
			dedup.discarded.len(),
			dedup.discarded
		),
	);

	let mut by_case: HashMap<String, Vec<SolutionRecord>> = HashMap::new();

	for record in dedup.kept {
		by_case.entry(record.case_id.clone()).or_default().push(record);
	}

	let mut per_triplet = Vec::with_capacity(triplets.len());
	let mut ordinal = 0_usize;

	for (idx, (triplet, candidates)) in triplets.iter().zip(case_ids).enumerate() {
		let identifier = hop_identifier(idx, triplets.len(), triplet);
		let mut solutions = Vec::new();

		for case_id in candidates {
			let Some(case_records) = by_case.get(case_id).filter(|records| !records.is_empty())
			else {
				logs.error(
					identifier.as_str(),
					NO_CASE_SOLUTIONS,
					format!("No case solutions retrieved for Case ID '{case_id}'."),
				);
				tracing::error!(hop = %identifier, case_id = %case_id, "No case solutions retrieved.");

				continue;
			};
			let expected = case_records.len();
			let ranked = sources.ranker.rank(case_records.clone()).await?;

			if ranked.len() != expected {
				return Err(Error::Ranking {
					message: format!(
						"Ranker returned {} records for case {case_id:?}; expected {expected}.",
						ranked.len()
					),
				});
			}

			for record in &ranked {
				let dispatch_id = derive_dispatch_id(parent, "solution", ordinal);

				solutions.push(Solution::build(triplet, record, dispatch_id, |provider| {
					sources.urls.get(provider).map(str::to_string)
				}));

				ordinal += 1;
			}
		}

		logs.debug(identifier.as_str(), format!("Identified {} Case Solutions.", solutions.len()));
		tracing::debug!(hop = %identifier, solutions = solutions.len(), "Built case solutions.");

		per_triplet.push(solutions);
	}

	Ok(SolutionLoadOutcome { per_triplet, conflated: dedup.discarded, logs })
}
