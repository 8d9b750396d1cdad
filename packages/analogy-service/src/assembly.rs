//! End-to-end planning of one query: triplets, similar cases, solutions, plans, dispatch tree.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use analogy_domain::{
	conflation::ConflationRules,
	log::{LogChannel, LogEvent},
	plan::{MultiHopPlan, aligned_len, assemble_rank_aligned, derive_dispatch_id},
	query::QueryContext,
};

use crate::{
	AnalogyService, Result, ScoredCase,
	case_search::{self, SearchPolicy},
	dispatch::{DispatchContext, DispatchNode, DispatchOutcome, DispatchUnit},
	solutions::{self, SolutionSources},
	url_resolver,
};

const ASSEMBLER_IDENTIFIER: &str = "Plan Assembler";

#[derive(Clone, Debug)]
pub struct PlanRequest {
	pub query: Value,
	pub dispatch_id: Uuid,
	/// Search creative edges over direct-provider cases only.
	pub force_direct: bool,
}
impl PlanRequest {
	pub fn new(query: Value) -> Self {
		Self { query, dispatch_id: Uuid::new_v4(), force_direct: false }
	}
}

#[derive(Serialize)]
pub struct PlanReport {
	pub dispatch_id: Uuid,
	pub is_one_hop: bool,
	pub has_creative_edge: bool,
	pub forced_direct: bool,
	/// True when any creative edge was searched over direct-provider cases.
	pub fell_back: bool,
	pub triplets: Vec<String>,
	pub candidate_cases: Vec<Vec<ScoredCase>>,
	pub conflated_solutions: Vec<i64>,
	pub plans: Vec<Arc<MultiHopPlan>>,
	pub logs: Vec<LogEvent>,
	#[serde(skip)]
	pub node: DispatchNode,
}

#[derive(Serialize)]
pub struct Attempt {
	pub plan: PlanReport,
	pub outcome: DispatchOutcome,
}

#[derive(Serialize)]
pub struct AnswerReport {
	pub attempts: Vec<Attempt>,
}
impl AnswerReport {
	pub fn retried(&self) -> bool {
		self.attempts.len() > 1
	}

	pub fn total_results(&self) -> usize {
		self.attempts.iter().map(|attempt| attempt.outcome.total_results()).sum()
	}
}

impl AnalogyService {
	/// Plans `req` into rank-aligned multi-hop plans installed under one parallel dispatch node.
	///
	/// Queries without analogous cases succeed with an absent child list; the audit log says why.
	pub async fn plan_query(&self, req: &PlanRequest) -> Result<PlanReport> {
		let context = QueryContext::from_request(&req.query)?;
		let triplets = self.collaborators.planner.plan(&context.graph)?;

		for triplet in &triplets {
			triplet.validate()?;
		}

		let urls = url_resolver::resolve_provider_urls(
			self.collaborators.store.as_ref(),
			&self.cfg.environment,
		)
		.await?;
		let policy = SearchPolicy::from_config(&self.cfg.search, req.force_direct);
		let search =
			case_search::find_similar_cases(self.collaborators.search.as_ref(), &triplets, &policy)
				.await?;
		let rules = ConflationRules::from_config(&self.cfg.conflation);
		let sources = SolutionSources {
			store: self.collaborators.store.as_ref(),
			ranker: self.collaborators.ranker.as_ref(),
			urls: &urls,
			rules: &rules,
		};
		let loaded = solutions::load_solutions(
			&sources,
			&triplets,
			&search.case_ids,
			&context.provider_filter,
			req.dispatch_id,
		)
		.await?;
		let mut logs = LogChannel::new();

		logs.extend(search.logs.into_events());
		logs.extend(loaded.logs.into_events());

		let aligned = aligned_len(&loaded.per_triplet);

		logs.debug(
			ASSEMBLER_IDENTIFIER,
			format!("Reducing triplet solutions length to {aligned} across {} triplets.", triplets.len()),
		);

		let plans = assemble_rank_aligned(req.dispatch_id, loaded.per_triplet)
			.into_iter()
			.map(Arc::new)
			.collect::<Vec<_>>();
		let node = DispatchNode::new(
			req.dispatch_id,
			format!("Analogy plans for edge {}", context.primary_edge_id),
		);

		node.install_plans(&plans).await;

		tracing::info!(
			dispatch_id = %req.dispatch_id,
			triplets = triplets.len(),
			plans = plans.len(),
			fell_back = search.fell_back,
			"Assembled analogy plans."
		);

		Ok(PlanReport {
			dispatch_id: req.dispatch_id,
			is_one_hop: context.is_one_hop,
			has_creative_edge: context.has_creative_edge(),
			forced_direct: req.force_direct,
			fell_back: search.fell_back,
			triplets: triplets.iter().map(ToString::to_string).collect(),
			candidate_cases: search.scored,
			conflated_solutions: loaded.conflated,
			plans,
			logs: logs.into_events(),
			node,
		})
	}

	pub async fn dispatch(&self, report: &PlanReport) -> Result<DispatchOutcome> {
		let ctx = DispatchContext::new(
			self.collaborators.executor.clone(),
			self.cfg.dispatch.max_concurrency as usize,
		);

		report.node.run(&ctx).await
	}

	/// Plans and dispatches `req`.
	///
	/// A creative query that produced no results without having fallen back is planned and
	/// dispatched once more with direct-provider search forced.
	pub async fn answer(&self, req: &PlanRequest) -> Result<AnswerReport> {
		let plan = self.plan_query(req).await?;
		let outcome = self.dispatch(&plan).await?;
		let retry = plan.has_creative_edge
			&& !plan.fell_back
			&& !req.force_direct
			&& outcome.total_results() == 0;
		let mut attempts = vec![Attempt { plan, outcome }];

		if retry {
			let retry_req = PlanRequest {
				query: req.query.clone(),
				dispatch_id: derive_dispatch_id(req.dispatch_id, "retry", 1),
				force_direct: true,
			};

			tracing::info!(
				dispatch_id = %req.dispatch_id,
				retry_dispatch_id = %retry_req.dispatch_id,
				"Creative query returned no results; retrying with direct-provider cases."
			);

			let plan = self.plan_query(&retry_req).await?;
			let outcome = self.dispatch(&plan).await?;

			attempts.push(Attempt { plan, outcome });
		}

		Ok(AnswerReport { attempts })
	}
}
