use sqlx::{Postgres, QueryBuilder};

use crate::{
	Error, Result,
	db::Db,
	models::{CaseSolutionRow, GlobalSimilarity, ProviderInfo, ProviderUrlRow, SimilarCaseRow},
};

const CASE_SOLUTION_COLUMNS: &str = "\
SELECT
	s.solution_id,
	s.case_id,
	s.path1_provider,
	s.path1_subject_category,
	s.path1_object_category,
	s.path1_predicate,
	s.path2_provider,
	s.path2_subject_category,
	s.path2_object_category,
	s.path2_predicate,
	COALESCE(p.priority, 0) AS priority
FROM case_solutions s
LEFT OUTER JOIN provider_info p ON s.path1_provider = p.provider_name
WHERE s.case_id = ANY(";

/// Restriction on the first-path provider of retrieved solutions.
#[derive(Clone, Copy, Debug, Default)]
pub enum ProviderListFilter<'a> {
	#[default]
	All,
	Allow(&'a [String]),
	Deny(&'a [String]),
}

#[derive(Debug)]
pub struct SimilarCaseQuery<'a> {
	pub subject_categories: &'a [String],
	pub object_categories: &'a [String],
	pub predicates: &'a [String],
	pub origins: &'a [String],
	/// Exclusive upper bound on the similarity score.
	pub ceiling: Option<f64>,
	pub limit: i64,
}

/// Builds the query returning, per provider, the first non-empty URL among `url_columns`.
pub fn render_provider_url_query(url_columns: &[String]) -> Result<String> {
	if url_columns.is_empty() {
		return Err(Error::InvalidArgument("At least one URL column is required.".to_string()));
	}

	let mut coalesced = Vec::with_capacity(url_columns.len());

	for column in url_columns {
		ensure_column_name(column)?;

		coalesced.push(format!("NULLIF(\"{column}\", '')"));
	}

	Ok(format!(
		"\
SELECT
	provider_name,
	COALESCE({}) AS url
FROM provider_info
ORDER BY provider_name",
		coalesced.join(", ")
	))
}

pub async fn fetch_provider_urls(db: &Db, url_columns: &[String]) -> Result<Vec<ProviderUrlRow>> {
	let sql = render_provider_url_query(url_columns)?;
	let rows = sqlx::query_as::<_, ProviderUrlRow>(&sql).fetch_all(&db.pool).await?;

	Ok(rows)
}

/// Fetches every solution of `case_ids` in one round trip, ordered by case then solution id.
pub async fn fetch_case_solutions(
	db: &Db,
	case_ids: &[String],
	filter: ProviderListFilter<'_>,
) -> Result<Vec<CaseSolutionRow>> {
	let mut builder = QueryBuilder::<Postgres>::new(CASE_SOLUTION_COLUMNS);

	builder.push_bind(case_ids.to_vec()).push(")");

	match filter {
		ProviderListFilter::All => {},
		ProviderListFilter::Allow(providers) => {
			builder.push(" AND s.path1_provider = ANY(").push_bind(providers.to_vec()).push(")");
		},
		ProviderListFilter::Deny(providers) => {
			builder
				.push(" AND NOT (s.path1_provider = ANY(")
				.push_bind(providers.to_vec())
				.push("))");
		},
	}

	builder.push(" ORDER BY s.case_id, s.solution_id");

	let rows = builder.build_query_as::<CaseSolutionRow>().fetch_all(&db.pool).await?;

	Ok(rows)
}

/// Distinct case ids matching the triplet, most similar first, ties by ascending case id.
pub async fn search_similar_cases(
	db: &Db,
	query: &SimilarCaseQuery<'_>,
) -> Result<Vec<SimilarCaseRow>> {
	if query.limit <= 0 {
		return Err(Error::InvalidArgument("Case search limit must be positive.".to_string()));
	}

	let rows = sqlx::query_as::<_, SimilarCaseRow>(
		"\
SELECT
	case_id,
	MAX(case_value) AS similarity
FROM global_similarity
WHERE subject = ANY($1)
	AND object = ANY($2)
	AND predicate = ANY($3)
	AND origin = ANY($4)
	AND case_value > 0
	AND ($5::float8 IS NULL OR case_value < $5)
GROUP BY case_id
ORDER BY similarity DESC, case_id ASC
LIMIT $6",
	)
	.bind(query.subject_categories)
	.bind(query.object_categories)
	.bind(query.predicates)
	.bind(query.origins)
	.bind(query.ceiling)
	.bind(query.limit)
	.fetch_all(&db.pool)
	.await?;

	Ok(rows)
}

pub async fn upsert_provider_info(db: &Db, info: &ProviderInfo) -> Result<()> {
	sqlx::query(
		"\
INSERT INTO provider_info (provider_name, priority)
VALUES ($1, $2)
ON CONFLICT (provider_name) DO UPDATE SET priority = EXCLUDED.priority",
	)
	.bind(info.provider_name.as_str())
	.bind(info.priority)
	.execute(&db.pool)
	.await?;

	for (column, url) in &info.urls {
		ensure_column_name(column)?;

		let sql = format!("UPDATE provider_info SET \"{column}\" = $1 WHERE provider_name = $2");

		sqlx::query(&sql)
			.bind(url.as_str())
			.bind(info.provider_name.as_str())
			.execute(&db.pool)
			.await?;
	}

	Ok(())
}

pub async fn insert_case_solution(db: &Db, row: &CaseSolutionRow) -> Result<()> {
	sqlx::query(
		"\
INSERT INTO case_solutions (
	solution_id,
	case_id,
	path1_provider,
	path1_subject_category,
	path1_object_category,
	path1_predicate,
	path2_provider,
	path2_subject_category,
	path2_object_category,
	path2_predicate
)
VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
	)
	.bind(row.solution_id)
	.bind(row.case_id.as_str())
	.bind(row.path1_provider.as_str())
	.bind(row.path1_subject_category.as_str())
	.bind(row.path1_object_category.as_str())
	.bind(row.path1_predicate.as_str())
	.bind(row.path2_provider.as_deref())
	.bind(row.path2_subject_category.as_deref())
	.bind(row.path2_object_category.as_deref())
	.bind(row.path2_predicate.as_deref())
	.execute(&db.pool)
	.await?;

	Ok(())
}

pub async fn insert_global_similarity(db: &Db, row: &GlobalSimilarity) -> Result<()> {
	sqlx::query(
		"\
INSERT INTO global_similarity (case_id, subject, object, predicate, origin, case_value)
VALUES ($1, $2, $3, $4, $5, $6)",
	)
	.bind(row.case_id.as_str())
	.bind(row.subject.as_str())
	.bind(row.object.as_str())
	.bind(row.predicate.as_str())
	.bind(row.origin.as_str())
	.bind(row.case_value)
	.execute(&db.pool)
	.await?;

	Ok(())
}

/// URL column names are interpolated into SQL, so only `[A-Za-z0-9_]` is accepted.
fn ensure_column_name(column: &str) -> Result<()> {
	if column.is_empty() || !column.chars().all(|ch| ch.is_ascii_alphanumeric() || ch == '_') {
		return Err(Error::InvalidArgument(format!("Invalid URL column {column:?}.")));
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	use crate::queries::render_provider_url_query;

	#[test]
	fn provider_url_query_coalesces_columns_in_order() {
		let sql = render_provider_url_query(&["url_staging".to_string(), "url_prod".to_string()])
			.expect("Columns must be valid.");

		assert!(sql.contains("COALESCE(NULLIF(\"url_staging\", ''), NULLIF(\"url_prod\", ''))"));
	}

	#[test]
	fn provider_url_query_rejects_unsafe_columns() {
		assert!(render_provider_url_query(&["url; DROP TABLE x".to_string()]).is_err());
		assert!(render_provider_url_query(&[]).is_err());
	}
}
