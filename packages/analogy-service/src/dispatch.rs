//! Parallel dispatch tree.
//!
//! A [`DispatchNode`] owns an ordered child list and fans its children out onto tokio tasks when
//! run. Child outcomes are returned in child order regardless of completion order. Structural
//! changes to a child list happen under the node's [`DispatchLock`], which nested nodes share with
//! their parent; running children never take it.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{Mutex, RwLock, Semaphore};
use uuid::Uuid;

use analogy_domain::{log::LogEvent, plan::MultiHopPlan};

use crate::{BoxFuture, Error, PlanExecutor, Result};

pub type DispatchLock = Arc<Mutex<()>>;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchMode {
	#[default]
	Parallel,
	Sequential,
}

/// A node's children. `Absent` means "nothing to run", distinct from `Pending` (not yet computed).
#[derive(Clone, Default)]
pub enum ChildList {
	#[default]
	Pending,
	Absent,
	Ready(Vec<Arc<dyn DispatchUnit>>),
}
impl ChildList {
	pub fn is_absent(&self) -> bool {
		matches!(self, Self::Absent)
	}

	pub fn len(&self) -> usize {
		match self {
			Self::Ready(children) => children.len(),
			Self::Pending | Self::Absent => 0,
		}
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchStatus {
	Completed,
	Failed,
}

#[derive(Clone, Debug, Serialize)]
pub struct DispatchOutcome {
	pub dispatch_id: Uuid,
	pub description: String,
	pub status: DispatchStatus,
	pub result_count: usize,
	pub error: Option<String>,
	pub logs: Vec<LogEvent>,
	pub children: Vec<DispatchOutcome>,
}
impl DispatchOutcome {
	fn failed(dispatch_id: Uuid, description: String, err: &Error) -> Self {
		Self {
			dispatch_id,
			description,
			status: DispatchStatus::Failed,
			result_count: 0,
			error: Some(err.to_string()),
			logs: Vec::new(),
			children: Vec::new(),
		}
	}

	/// Results of this unit and all of its descendants.
	pub fn total_results(&self) -> usize {
		self.result_count + self.children.iter().map(Self::total_results).sum::<usize>()
	}
}

/// Shared by every unit of one dispatch run.
#[derive(Clone)]
pub struct DispatchContext {
	pub executor: Arc<dyn PlanExecutor>,
	permits: Arc<Semaphore>,
}
impl DispatchContext {
	/// At most `max_concurrency` plans execute at once.
	pub fn new(executor: Arc<dyn PlanExecutor>, max_concurrency: usize) -> Self {
		Self { executor, permits: Arc::new(Semaphore::new(max_concurrency.max(1))) }
	}
}

pub trait DispatchUnit
where
	Self: Send + Sync,
{
	fn dispatch_id(&self) -> Uuid;

	fn description(&self) -> &str;

	fn run<'a>(&'a self, ctx: &'a DispatchContext) -> BoxFuture<'a, Result<DispatchOutcome>>;
}

impl DispatchUnit for MultiHopPlan {
	fn dispatch_id(&self) -> Uuid {
		self.dispatch_id
	}

	fn description(&self) -> &str {
		&self.description
	}

	fn run<'a>(&'a self, ctx: &'a DispatchContext) -> BoxFuture<'a, Result<DispatchOutcome>> {
		Box::pin(async move {
			let _permit = ctx.permits.acquire().await.map_err(|err| Error::Dispatch {
				message: format!("Dispatch permits are closed: {err}."),
			})?;
			let report = ctx.executor.execute(self).await?;

			Ok(DispatchOutcome {
				dispatch_id: self.dispatch_id,
				description: self.description.clone(),
				status: DispatchStatus::Completed,
				result_count: report.result_count,
				error: None,
				logs: report.logs,
				children: Vec::new(),
			})
		})
	}
}

pub struct DispatchNode {
	dispatch_id: Uuid,
	description: String,
	lock: DispatchLock,
	state: RwLock<NodeState>,
}

#[derive(Default)]
struct NodeState {
	mode: DispatchMode,
	children: ChildList,
}

impl DispatchNode {
	pub fn new(dispatch_id: Uuid, description: impl Into<String>) -> Self {
		Self::with_lock(dispatch_id, description, Arc::new(Mutex::new(())))
	}

	/// A node that shares this node's lock, for use as one of its children.
	pub fn child(&self, dispatch_id: Uuid, description: impl Into<String>) -> Self {
		Self::with_lock(dispatch_id, description, self.lock.clone())
	}

	fn with_lock(dispatch_id: Uuid, description: impl Into<String>, lock: DispatchLock) -> Self {
		Self {
			dispatch_id,
			description: description.into(),
			lock,
			state: RwLock::new(NodeState::default()),
		}
	}

	pub fn lock(&self) -> &DispatchLock {
		&self.lock
	}

	pub fn shares_lock_with(&self, other: &Self) -> bool {
		Arc::ptr_eq(&self.lock, &other.lock)
	}

	pub async fn mode(&self) -> DispatchMode {
		self.state.read().await.mode
	}

	pub async fn children(&self) -> ChildList {
		self.state.read().await.children.clone()
	}

	/// Replaces the child list. An empty list is stored as [`ChildList::Absent`].
	pub async fn install_children(&self, children: Vec<Arc<dyn DispatchUnit>>, mode: DispatchMode) {
		let _guard = self.lock.lock().await;
		let mut state = self.state.write().await;

		state.mode = mode;
		state.children =
			if children.is_empty() { ChildList::Absent } else { ChildList::Ready(children) };
	}

	pub async fn install_plans(&self, plans: &[Arc<MultiHopPlan>]) {
		let children =
			plans.iter().map(|plan| plan.clone() as Arc<dyn DispatchUnit>).collect();

		self.install_children(children, DispatchMode::Parallel).await;
	}

	async fn run_children(&self, ctx: &DispatchContext) -> Result<DispatchOutcome> {
		let (mode, children) = {
			let _guard = self.lock.lock().await;
			let state = self.state.read().await;

			(state.mode, state.children.clone())
		};
		let children = match children {
			ChildList::Ready(children) => children,
			ChildList::Absent => {
				tracing::debug!(dispatch_id = %self.dispatch_id, "No plans to dispatch.");

				Vec::new()
			},
			ChildList::Pending =>
				return Err(Error::Dispatch {
					message: format!("Children of {} have not been computed.", self.dispatch_id),
				}),
		};
		let outcomes = match mode {
			DispatchMode::Parallel => run_parallel(children, ctx).await,
			DispatchMode::Sequential => run_sequential(children, ctx).await,
		};
		let status = if outcomes.iter().all(|outcome| outcome.status == DispatchStatus::Completed) {
			DispatchStatus::Completed
		} else {
			DispatchStatus::Failed
		};

		Ok(DispatchOutcome {
			dispatch_id: self.dispatch_id,
			description: self.description.clone(),
			status,
			result_count: 0,
			error: None,
			logs: Vec::new(),
			children: outcomes,
		})
	}
}
impl DispatchUnit for DispatchNode {
	fn dispatch_id(&self) -> Uuid {
		self.dispatch_id
	}

	fn description(&self) -> &str {
		&self.description
	}

	fn run<'a>(&'a self, ctx: &'a DispatchContext) -> BoxFuture<'a, Result<DispatchOutcome>> {
		Box::pin(self.run_children(ctx))
	}
}

/// Runs `unit`, turning its error into a failed outcome so siblings are unaffected.
async fn run_unit(unit: Arc<dyn DispatchUnit>, ctx: DispatchContext) -> DispatchOutcome {
	match unit.run(&ctx).await {
		Ok(outcome) => outcome,
		Err(err) => {
			tracing::warn!(
				error = %err,
				dispatch_id = %unit.dispatch_id(),
				"Dispatch unit failed."
			);

			DispatchOutcome::failed(unit.dispatch_id(), unit.description().to_string(), &err)
		},
	}
}

/// Spawns every child, then awaits all of them in child order. A child task that panics becomes a
/// failed outcome; no handle is dropped before it completes.
async fn run_parallel(
	children: Vec<Arc<dyn DispatchUnit>>,
	ctx: &DispatchContext,
) -> Vec<DispatchOutcome> {
	let handles = children
		.into_iter()
		.map(|child| {
			let dispatch_id = child.dispatch_id();
			let description = child.description().to_string();

			(dispatch_id, description, tokio::spawn(run_unit(child, ctx.clone())))
		})
		.collect::<Vec<_>>();
	let mut outcomes = Vec::with_capacity(handles.len());

	for (dispatch_id, description, handle) in handles {
		let outcome = match handle.await {
			Ok(outcome) => outcome,
			Err(err) => {
				let err = Error::Dispatch {
					message: format!("Dispatch task did not complete: {err}."),
				};

				tracing::warn!(error = %err, dispatch_id = %dispatch_id, "Dispatch task aborted.");

				DispatchOutcome::failed(dispatch_id, description, &err)
			},
		};

		outcomes.push(outcome);
	}

	outcomes
}

async fn run_sequential(
	children: Vec<Arc<dyn DispatchUnit>>,
	ctx: &DispatchContext,
) -> Vec<DispatchOutcome> {
	let mut outcomes = Vec::with_capacity(children.len());

	for child in children {
		outcomes.push(run_unit(child, ctx.clone()).await);
	}

	outcomes
}
