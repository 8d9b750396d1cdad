pub mod assembly;
pub mod case_search;
pub mod dispatch;
pub mod executor;
pub mod pg;
pub mod planner;
pub mod ranker;
pub mod solutions;
pub mod url_resolver;

mod error;

pub use assembly::{AnswerReport, PlanReport, PlanRequest};
pub use case_search::{CaseSearchRequest, ScoredCase};
pub use error::{Error, Result};

use std::{future::Future, pin::Pin, sync::Arc};

use analogy_config::Config;
use analogy_domain::{
	log::LogEvent,
	plan::MultiHopPlan,
	query::{ProviderFilter, QueryGraph, Triplet},
	solution::SolutionRecord,
};
use analogy_storage::db::Db;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Decomposes a query graph into ordered triplets. Triplet order is hop order.
pub trait PathPlanner
where
	Self: Send + Sync,
{
	fn plan(&self, graph: &QueryGraph) -> Result<Vec<Triplet>>;
}

/// Finds stored cases similar to one triplet, most similar first.
pub trait CaseSearchBackend
where
	Self: Send + Sync,
{
	fn search<'a>(&'a self, request: &'a CaseSearchRequest<'a>) -> BoxFuture<'a, Result<Vec<ScoredCase>>>;
}

pub trait CaseStore
where
	Self: Send + Sync,
{
	/// `(provider, url)` pairs where the URL is the first non-empty one among `url_columns`.
	fn provider_urls<'a>(
		&'a self,
		url_columns: &'a [String],
	) -> BoxFuture<'a, Result<Vec<(String, Option<String>)>>>;

	/// All solution records of `case_ids` whose primary provider passes `filter`.
	fn case_solutions<'a>(
		&'a self,
		case_ids: &'a [String],
		filter: &'a ProviderFilter,
	) -> BoxFuture<'a, Result<Vec<SolutionRecord>>>;
}

/// Orders the records of one case; the first record is served first.
pub trait SolutionRanker
where
	Self: Send + Sync,
{
	fn rank<'a>(&'a self, records: Vec<SolutionRecord>) -> BoxFuture<'a, Result<Vec<SolutionRecord>>>;
}

/// Runs one assembled plan against its knowledge providers.
pub trait PlanExecutor
where
	Self: Send + Sync,
{
	fn execute<'a>(&'a self, plan: &'a MultiHopPlan) -> BoxFuture<'a, Result<ExecutionReport>>;
}

#[derive(Debug, Default)]
pub struct ExecutionReport {
	pub result_count: usize,
	pub logs: Vec<LogEvent>,
}

#[derive(Clone)]
pub struct Collaborators {
	pub planner: Arc<dyn PathPlanner>,
	pub search: Arc<dyn CaseSearchBackend>,
	pub store: Arc<dyn CaseStore>,
	pub ranker: Arc<dyn SolutionRanker>,
	pub executor: Arc<dyn PlanExecutor>,
}
impl Collaborators {
	pub fn new(
		planner: Arc<dyn PathPlanner>,
		search: Arc<dyn CaseSearchBackend>,
		store: Arc<dyn CaseStore>,
		ranker: Arc<dyn SolutionRanker>,
		executor: Arc<dyn PlanExecutor>,
	) -> Self {
		Self { planner, search, store, ranker, executor }
	}

	/// Postgres-backed search and storage; plans are dry-run rather than sent to providers.
	pub fn postgres(db: Arc<Db>) -> Self {
		Self {
			planner: Arc::new(planner::ChainPathPlanner),
			search: Arc::new(pg::PgCaseSearch::new(db.clone())),
			store: Arc::new(pg::PgCaseStore::new(db)),
			ranker: Arc::new(ranker::PriorityRanker),
			executor: Arc::new(executor::DryRunExecutor),
		}
	}
}

pub struct AnalogyService {
	pub cfg: Config,
	pub collaborators: Collaborators,
}
impl AnalogyService {
	pub fn new(cfg: Config, db: Db) -> Self {
		Self { cfg, collaborators: Collaborators::postgres(Arc::new(db)) }
	}

	pub fn with_collaborators(cfg: Config, collaborators: Collaborators) -> Self {
		Self { cfg, collaborators }
	}
}
