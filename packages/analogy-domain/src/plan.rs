//! Rank-aligned multi-hop plan assembly.
//!
//! Plan `k` takes the solution at index `k` from every triplet's ranked list. Solutions of equal
//! rank are assumed compatible across hops, so lists are zipped positionally and never combined
//! as a cartesian product.

use serde::Serialize;
use uuid::Uuid;

use crate::solution::Solution;

/// One solution per triplet, in triplet order.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MultiHopPlan {
	pub dispatch_id: Uuid,
	pub description: String,
	solutions: Vec<Solution>,
}
impl MultiHopPlan {
	pub fn new(dispatch_id: Uuid, description: String, solutions: Vec<Solution>) -> Self {
		Self { dispatch_id, description, solutions }
	}

	pub fn solutions(&self) -> &[Solution] {
		&self.solutions
	}

	pub fn hop_count(&self) -> usize {
		self.solutions.len()
	}
}

/// Child dispatch id of `parent`. Distinct `(kind, ordinal)` pairs never share an id, and
/// children of different parents never collide.
pub fn derive_dispatch_id(parent: Uuid, kind: &str, ordinal: usize) -> Uuid {
	Uuid::new_v5(&parent, format!("{kind}:{ordinal}").as_bytes())
}

pub fn plan_dispatch_id(parent: Uuid, rank: usize) -> Uuid {
	derive_dispatch_id(parent, "plan", rank)
}

/// Length every per-triplet list is truncated to. Zero when there are no triplets.
pub fn aligned_len(per_triplet: &[Vec<Solution>]) -> usize {
	per_triplet.iter().map(Vec::len).min().unwrap_or(0)
}

/// Zips the per-triplet ranked solution lists into plans, one per shared rank.
pub fn assemble_rank_aligned(parent: Uuid, per_triplet: Vec<Vec<Solution>>) -> Vec<MultiHopPlan> {
	let len = aligned_len(&per_triplet);
	let hop_count = per_triplet.len();
	let mut columns = per_triplet
		.into_iter()
		.map(|mut solutions| {
			solutions.truncate(len);

			solutions.into_iter()
		})
		.collect::<Vec<_>>();
	let mut plans = Vec::with_capacity(len);

	for rank in 0..len {
		let solutions = columns.iter_mut().filter_map(|column| column.next()).collect::<Vec<_>>();

		debug_assert_eq!(solutions.len(), hop_count);

		plans.push(MultiHopPlan::new(
			plan_dispatch_id(parent, rank),
			format!("Multi-hop plan {} of {len} ({hop_count} hops)", rank + 1),
			solutions,
		));
	}

	plans
}
