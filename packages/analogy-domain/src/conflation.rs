//! Removal of redundant single-provider solutions whose categories are conflated.
//!
//! Two single-path solutions served by the same provider are redundant when one of their node
//! categories is conflatable (e.g. `Gene` and `Protein`). Of each redundant group only the most
//! specific solution, according to the configured priority tiers, survives.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use crate::solution::SolutionRecord;

#[derive(Clone, Debug, Default)]
pub struct ConflationRules {
	map: BTreeMap<String, BTreeSet<String>>,
	priority_tiers: Vec<Vec<String>>,
}
impl ConflationRules {
	pub fn new(map: BTreeMap<String, BTreeSet<String>>, priority_tiers: Vec<Vec<String>>) -> Self {
		Self { map, priority_tiers }
	}

	pub fn from_config(cfg: &analogy_config::Conflation) -> Self {
		Self::new(cfg.map.clone(), cfg.priority_tiers.clone())
	}

	pub fn is_conflatable(&self, category: &str) -> bool {
		self.map.contains_key(category)
	}

	pub fn conflated_with(&self, category: &str) -> Option<&BTreeSet<String>> {
		self.map.get(category)
	}

	/// Position of `category` inside the first tier listing it. Lower is more specific.
	pub fn tier_index(&self, category: &str) -> Option<usize> {
		self.priority_tiers
			.iter()
			.find_map(|tier| tier.iter().position(|candidate| candidate == category))
	}

	fn participates(&self, record: &SolutionRecord) -> bool {
		record.is_single_path()
			&& (self.is_conflatable(&record.primary.subject_category)
				|| self.is_conflatable(&record.primary.object_category))
	}
}

#[derive(Debug, Default)]
pub struct DedupOutcome {
	/// Surviving records in their original order.
	pub kept: Vec<SolutionRecord>,
	/// Solution ids of discarded records, ascending.
	pub discarded: Vec<i64>,
}

pub fn dedup_conflated(records: Vec<SolutionRecord>, rules: &ConflationRules) -> DedupOutcome {
	let mut groups: BTreeMap<&str, Vec<usize>> = BTreeMap::new();

	for (idx, record) in records.iter().enumerate() {
		if rules.participates(record) {
			groups.entry(record.primary.provider.as_str()).or_default().push(idx);
		}
	}

	let mut excluded = HashSet::new();

	for members in groups.values().filter(|members| members.len() > 1) {
		let keeper = select_keeper(&records, members, rules);

		excluded.extend(members.iter().copied().filter(|idx| *idx != keeper));
	}

	let mut kept = Vec::with_capacity(records.len() - excluded.len());
	let mut discarded = Vec::with_capacity(excluded.len());

	for (idx, record) in records.into_iter().enumerate() {
		if excluded.contains(&idx) {
			discarded.push(record.solution_id);
		} else {
			kept.push(record);
		}
	}

	discarded.sort_unstable();

	DedupOutcome { kept, discarded }
}

/// Subject tiers decide first, object tiers second; ties and misses keep the earliest record.
fn select_keeper(records: &[SolutionRecord], members: &[usize], rules: &ConflationRules) -> usize {
	let by_subject = members
		.iter()
		.filter_map(|idx| {
			rules.tier_index(&records[*idx].primary.subject_category).map(|rank| (rank, *idx))
		})
		.min_by_key(|(rank, _)| *rank);

	if let Some((_, idx)) = by_subject {
		return idx;
	}

	let by_object = members
		.iter()
		.filter_map(|idx| {
			rules.tier_index(&records[*idx].primary.object_category).map(|rank| (rank, *idx))
		})
		.min_by_key(|(rank, _)| *rank);

	by_object.map(|(_, idx)| idx).unwrap_or(members[0])
}
