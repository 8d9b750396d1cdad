//! Postgres-backed case search and solution storage.

use std::sync::Arc;

use analogy_domain::{
	query::ProviderFilter,
	solution::{PathSegment, SecondPathColumns, SolutionRecord},
};
use analogy_storage::{
	db::Db,
	models::CaseSolutionRow,
	queries::{self, ProviderListFilter, SimilarCaseQuery},
};

use crate::{
	BoxFuture, CaseSearchBackend, CaseSearchRequest, CaseStore, Error, Result, ScoredCase,
};

pub struct PgCaseSearch {
	db: Arc<Db>,
}
impl PgCaseSearch {
	pub fn new(db: Arc<Db>) -> Self {
		Self { db }
	}

	async fn search_inner(&self, request: &CaseSearchRequest<'_>) -> Result<Vec<ScoredCase>> {
		let subjects = [request.subject_category.to_string()];
		let objects = [request.object_category.to_string()];
		let predicates = [request.predicate.to_string()];
		let origins = request.provenance.iter().map(|item| item.as_str().to_string()).collect::<Vec<_>>();
		let query = SimilarCaseQuery {
			subject_categories: &subjects,
			object_categories: &objects,
			predicates: &predicates,
			origins: &origins,
			ceiling: request.similarity_below,
			limit: i64::from(request.limit),
		};
		let rows = queries::search_similar_cases(&self.db, &query).await?;

		Ok(rows
			.into_iter()
			.map(|row| ScoredCase { case_id: row.case_id, similarity: row.similarity })
			.collect())
	}
}
impl CaseSearchBackend for PgCaseSearch {
	fn search<'a>(
		&'a self,
		request: &'a CaseSearchRequest<'a>,
	) -> BoxFuture<'a, Result<Vec<ScoredCase>>> {
		Box::pin(self.search_inner(request))
	}
}

pub struct PgCaseStore {
	db: Arc<Db>,
}
impl PgCaseStore {
	pub fn new(db: Arc<Db>) -> Self {
		Self { db }
	}

	async fn provider_urls_inner(&self, url_columns: &[String]) -> Result<Vec<(String, Option<String>)>> {
		let rows = queries::fetch_provider_urls(&self.db, url_columns).await?;

		Ok(rows.into_iter().map(|row| (row.provider_name, row.url)).collect())
	}

	async fn case_solutions_inner(
		&self,
		case_ids: &[String],
		filter: &ProviderFilter,
	) -> Result<Vec<SolutionRecord>> {
		let list_filter = match filter {
			ProviderFilter::Unrestricted => ProviderListFilter::All,
			ProviderFilter::Allow(providers) => ProviderListFilter::Allow(providers),
			ProviderFilter::Deny(providers) => ProviderListFilter::Deny(providers),
		};
		let rows = queries::fetch_case_solutions(&self.db, case_ids, list_filter).await?;
		let mut records = Vec::with_capacity(rows.len());

		for row in rows {
			records.push(record_from_row(row)?);
		}

		Ok(records)
	}
}
impl CaseStore for PgCaseStore {
	fn provider_urls<'a>(
		&'a self,
		url_columns: &'a [String],
	) -> BoxFuture<'a, Result<Vec<(String, Option<String>)>>> {
		Box::pin(self.provider_urls_inner(url_columns))
	}

	fn case_solutions<'a>(
		&'a self,
		case_ids: &'a [String],
		filter: &'a ProviderFilter,
	) -> BoxFuture<'a, Result<Vec<SolutionRecord>>> {
		Box::pin(self.case_solutions_inner(case_ids, filter))
	}
}

fn record_from_row(row: CaseSolutionRow) -> Result<SolutionRecord> {
	let primary = PathSegment {
		subject_category: row.path1_subject_category,
		object_category: row.path1_object_category,
		predicate: row.path1_predicate,
		provider: row.path1_provider,
	};
	let second = SecondPathColumns {
		provider: row.path2_provider,
		subject_category: row.path2_subject_category,
		object_category: row.path2_object_category,
		predicate: row.path2_predicate,
	};

	SolutionRecord::from_columns(row.solution_id, row.case_id, primary, second, row.priority)
		.map_err(Error::from)
}
