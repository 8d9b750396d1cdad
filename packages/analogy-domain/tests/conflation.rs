use std::collections::{BTreeMap, BTreeSet};

use analogy_domain::{
	conflation::{ConflationRules, dedup_conflated},
	solution::{PathSegment, SolutionRecord},
};

fn rules() -> ConflationRules {
	let cfg = analogy_config::Conflation::default();

	ConflationRules::from_config(&cfg)
}

fn segment(subject: &str, object: &str, provider: &str) -> PathSegment {
	PathSegment {
		subject_category: subject.to_string(),
		object_category: object.to_string(),
		predicate: "biolink:related_to".to_string(),
		provider: provider.to_string(),
	}
}

fn single(solution_id: i64, case_id: &str, subject: &str, object: &str, provider: &str) -> SolutionRecord {
	SolutionRecord {
		solution_id,
		case_id: case_id.to_string(),
		primary: segment(subject, object, provider),
		secondary: None,
		priority: 0,
	}
}

fn double(solution_id: i64, case_id: &str, subject: &str, object: &str, provider: &str) -> SolutionRecord {
	SolutionRecord {
		solution_id,
		case_id: case_id.to_string(),
		primary: segment(subject, object, provider),
		secondary: Some(segment(object, "biolink:Disease", "kp-second")),
		priority: 0,
	}
}

fn ids(records: &[SolutionRecord]) -> Vec<i64> {
	records.iter().map(|record| record.solution_id).collect()
}

#[test]
fn keeps_most_specific_subject_category() {
	let records = vec![
		single(1, "c1", "biolink:Gene", "biolink:Disease", "kp-a"),
		single(2, "c1", "biolink:Protein", "biolink:Disease", "kp-a"),
	];
	let outcome = dedup_conflated(records, &rules());

	assert_eq!(ids(&outcome.kept), [2]);
	assert_eq!(outcome.discarded, [1]);
}

#[test]
fn falls_back_to_object_category_when_no_subject_matches() {
	let records = vec![
		single(1, "c1", "biolink:Disease", "biolink:ChemicalEntity", "kp-a"),
		single(2, "c1", "biolink:Disease", "biolink:SmallMolecule", "kp-a"),
	];
	let outcome = dedup_conflated(records, &rules());

	assert_eq!(ids(&outcome.kept), [2]);
	assert_eq!(outcome.discarded, [1]);
}

#[test]
fn keeps_first_record_when_no_tier_matches() {
	let map = BTreeMap::from([
		("biolink:Gene".to_string(), BTreeSet::from(["biolink:Protein".to_string()])),
		("biolink:Protein".to_string(), BTreeSet::from(["biolink:Gene".to_string()])),
	]);
	let rules = ConflationRules::new(map, Vec::new());
	let records = vec![
		single(7, "c1", "biolink:Gene", "biolink:Disease", "kp-a"),
		single(3, "c2", "biolink:Protein", "biolink:Disease", "kp-a"),
		single(5, "c2", "biolink:Gene", "biolink:Pathway", "kp-a"),
	];
	let outcome = dedup_conflated(records, &rules);

	assert_eq!(ids(&outcome.kept), [7]);
	assert_eq!(outcome.discarded, [3, 5]);
}

#[test]
fn groups_only_by_shared_provider() {
	let records = vec![
		single(1, "c1", "biolink:Gene", "biolink:Disease", "kp-a"),
		single(2, "c1", "biolink:Protein", "biolink:Disease", "kp-b"),
	];
	let outcome = dedup_conflated(records, &rules());

	assert_eq!(ids(&outcome.kept), [1, 2]);
	assert!(outcome.discarded.is_empty());
}

#[test]
fn never_removes_two_path_solutions() {
	let records = vec![
		double(1, "c1", "biolink:Gene", "biolink:Disease", "kp-a"),
		double(2, "c1", "biolink:Protein", "biolink:Disease", "kp-a"),
		single(3, "c1", "biolink:Protein", "biolink:Disease", "kp-a"),
	];
	let outcome = dedup_conflated(records, &rules());

	assert_eq!(ids(&outcome.kept), [1, 2, 3]);
	assert!(outcome.discarded.is_empty());
}

#[test]
fn never_removes_records_without_conflatable_categories() {
	let records = vec![
		single(1, "c1", "biolink:Disease", "biolink:Phenotype", "kp-a"),
		single(2, "c1", "biolink:Disease", "biolink:Phenotype", "kp-a"),
		single(3, "c1", "biolink:Gene", "biolink:Disease", "kp-a"),
	];
	let outcome = dedup_conflated(records, &rules());

	assert_eq!(ids(&outcome.kept), [1, 2, 3]);
}

#[test]
fn groups_across_cases() {
	let records = vec![
		single(10, "c1", "biolink:Gene", "biolink:Disease", "kp-a"),
		single(20, "c2", "biolink:Protein", "biolink:Disease", "kp-a"),
	];
	let outcome = dedup_conflated(records, &rules());

	assert_eq!(ids(&outcome.kept), [20]);
	assert_eq!(outcome.discarded, [10]);
}

#[test]
fn dedup_is_idempotent() {
	let records = vec![
		single(1, "c1", "biolink:Gene", "biolink:Disease", "kp-a"),
		single(2, "c1", "biolink:Protein", "biolink:Disease", "kp-a"),
		single(3, "c2", "biolink:ChemicalEntity", "biolink:Gene", "kp-b"),
		single(4, "c2", "biolink:SmallMolecule", "biolink:Gene", "kp-b"),
		double(5, "c2", "biolink:Gene", "biolink:Disease", "kp-a"),
		single(6, "c3", "biolink:Disease", "biolink:Phenotype", "kp-c"),
	];
	let first = dedup_conflated(records, &rules());
	let first_kept = first.kept.clone();
	let second = dedup_conflated(first.kept, &rules());

	assert_eq!(second.kept, first_kept);
	assert!(second.discarded.is_empty());
}
