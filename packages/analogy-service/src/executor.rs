use analogy_domain::{log::LogChannel, plan::MultiHopPlan};

use crate::{BoxFuture, ExecutionReport, PlanExecutor, Result};

/// Records what each plan would send to its providers without performing any network calls.
pub struct DryRunExecutor;
impl PlanExecutor for DryRunExecutor {
	fn execute<'a>(&'a self, plan: &'a MultiHopPlan) -> BoxFuture<'a, Result<ExecutionReport>> {
		let mut logs = LogChannel::new();

		for (hop, solution) in plan.solutions().iter().enumerate() {
			logs.debug(
				format!("{} - Hop {}", plan.description, hop + 1),
				format!("Dry run: {solution} for edge {}.", solution.predicate_edge_id),
			);
		}

		Box::pin(async move { Ok(ExecutionReport { result_count: 0, logs: logs.into_events() }) })
	}
}
