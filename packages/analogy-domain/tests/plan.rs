use serde_json::json;
use uuid::Uuid;

use analogy_domain::{
	plan::{aligned_len, assemble_rank_aligned, derive_dispatch_id, plan_dispatch_id},
	query::{QueryContext, Triplet},
	solution::{PathSegment, Solution, SolutionRecord},
};

fn two_hop_context() -> QueryContext {
	let body = json!({
		"message": {
			"query_graph": {
				"nodes": {
					"n0": { "categories": ["biolink:SmallMolecule"], "ids": ["CHEBI:6801"] },
					"n1": { "categories": ["biolink:Gene"] },
					"n2": { "categories": ["biolink:Disease"] }
				},
				"edges": {
					"e0": { "subject": "n0", "object": "n1", "predicates": ["biolink:affects"] },
					"e1": { "subject": "n1", "object": "n2", "predicates": ["biolink:related_to"] }
				}
			}
		}
	});

	QueryContext::from_request(&body).expect("Query must be valid.")
}

fn solutions_for(triplet: &Triplet, case_id: &str, count: usize) -> Vec<Solution> {
	(0..count)
		.map(|idx| {
			let record = SolutionRecord {
				solution_id: idx as i64,
				case_id: case_id.to_string(),
				primary: PathSegment {
					subject_category: triplet.source.node.categories[0].clone(),
					object_category: triplet.target.node.categories[0].clone(),
					predicate: triplet.predicate.edge.predicates[0].clone(),
					provider: format!("kp-{idx}"),
				},
				secondary: None,
				priority: idx as i32,
			};

			Solution::build(triplet, &record, Uuid::new_v4(), |_| None)
		})
		.collect()
}

fn triplets() -> (Triplet, Triplet) {
	let context = two_hop_context();
	let first = Triplet::from_edge(&context.graph, "e0").expect("e0 must exist.");
	let second = Triplet::from_edge(&context.graph, "e1").expect("e1 must exist.");

	(first, second)
}

#[test]
fn plan_count_is_minimum_list_length_and_every_plan_spans_all_triplets() {
	let (first, second) = triplets();
	let per_triplet = vec![solutions_for(&first, "c1", 5), solutions_for(&second, "c2", 3)];

	assert_eq!(aligned_len(&per_triplet), 3);

	let plans = assemble_rank_aligned(Uuid::new_v4(), per_triplet);

	assert_eq!(plans.len(), 3);

	for plan in &plans {
		assert_eq!(plan.hop_count(), 2);
	}
}

/// Plans are a positional zip over ranks, never a cartesian product over triplets.
#[test]
fn rank_aligned_zip_takes_the_same_index_from_every_triplet() {
	let (first, second) = triplets();
	let first_list = solutions_for(&first, "c1", 5);
	let second_list = solutions_for(&second, "c2", 3);
	let plans =
		assemble_rank_aligned(Uuid::new_v4(), vec![first_list.clone(), second_list.clone()]);

	assert_ne!(plans.len(), first_list.len() * second_list.len());

	for (rank, plan) in plans.iter().enumerate() {
		assert_eq!(plan.solutions()[0], first_list[rank]);
		assert_eq!(plan.solutions()[1], second_list[rank]);
		assert_eq!(plan.solutions()[0].predicate_edge_id, "e0");
		assert_eq!(plan.solutions()[1].predicate_edge_id, "e1");
	}
}

#[test]
fn empty_triplet_list_yields_no_plans() {
	let (first, _) = triplets();
	let plans =
		assemble_rank_aligned(Uuid::new_v4(), vec![solutions_for(&first, "c1", 4), Vec::new()]);

	assert!(plans.is_empty());
}

#[test]
fn no_triplets_yield_no_plans() {
	assert!(assemble_rank_aligned(Uuid::new_v4(), Vec::new()).is_empty());
}

#[test]
fn plan_dispatch_ids_are_deterministic_and_distinct() {
	let (first, second) = triplets();
	let parent = Uuid::new_v4();
	let other_parent = Uuid::new_v4();
	let plans = assemble_rank_aligned(parent, vec![
		solutions_for(&first, "c1", 3),
		solutions_for(&second, "c2", 3),
	]);

	for (rank, plan) in plans.iter().enumerate() {
		assert_eq!(plan.dispatch_id, plan_dispatch_id(parent, rank));
		assert_ne!(plan.dispatch_id, plan_dispatch_id(other_parent, rank));
	}

	assert_ne!(plans[0].dispatch_id, plans[1].dispatch_id);
	assert_ne!(derive_dispatch_id(parent, "plan", 0), derive_dispatch_id(parent, "solution", 0));
}
