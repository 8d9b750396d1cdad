use analogy_domain::solution::SolutionRecord;

use crate::{BoxFuture, Result, SolutionRanker};

/// Lower provider priority first, then ascending solution id.
pub struct PriorityRanker;
impl SolutionRanker for PriorityRanker {
	fn rank<'a>(&'a self, mut records: Vec<SolutionRecord>) -> BoxFuture<'a, Result<Vec<SolutionRecord>>> {
		records.sort_by_key(|record| (record.priority, record.solution_id));

		Box::pin(async move { Ok(records) })
	}
}

#[cfg(test)]
mod tests {
	use analogy_domain::solution::{PathSegment, SolutionRecord};

	use crate::{SolutionRanker, ranker::PriorityRanker};

	fn record(solution_id: i64, priority: i32) -> SolutionRecord {
		SolutionRecord {
			solution_id,
			case_id: "c1".to_string(),
			primary: PathSegment {
				subject_category: "biolink:Gene".to_string(),
				object_category: "biolink:Disease".to_string(),
				predicate: "biolink:related_to".to_string(),
				provider: format!("kp-{solution_id}"),
			},
			secondary: None,
			priority,
		}
	}

	#[tokio::test]
	async fn orders_by_priority_then_solution_id() {
		let ranked = PriorityRanker
			.rank(vec![record(4, 2), record(9, 0), record(1, 2), record(7, 0)])
			.await
			.expect("Ranking must succeed.");

		assert_eq!(ranked.iter().map(|record| record.solution_id).collect::<Vec<_>>(), [7, 9, 1, 4]);
	}
}
