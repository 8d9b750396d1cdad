#[derive(Debug, sqlx::FromRow)]
pub struct ProviderUrlRow {
	pub provider_name: String,
	/// First non-empty URL in fallback order, if any.
	pub url: Option<String>,
}

#[derive(Debug, sqlx::FromRow)]
pub struct CaseSolutionRow {
	pub solution_id: i64,
	pub case_id: String,
	pub path1_provider: String,
	pub path1_subject_category: String,
	pub path1_object_category: String,
	pub path1_predicate: String,
	pub path2_provider: Option<String>,
	pub path2_subject_category: Option<String>,
	pub path2_object_category: Option<String>,
	pub path2_predicate: Option<String>,
	/// Provider priority, `0` when the provider has no registry row.
	pub priority: i32,
}

#[derive(Debug, sqlx::FromRow)]
pub struct SimilarCaseRow {
	pub case_id: String,
	pub similarity: f64,
}

#[derive(Debug)]
pub struct ProviderInfo {
	pub provider_name: String,
	pub priority: Option<i32>,
	/// `(url column, url)` pairs.
	pub urls: Vec<(String, String)>,
}

#[derive(Debug)]
pub struct GlobalSimilarity {
	pub case_id: String,
	pub subject: String,
	pub object: String,
	pub predicate: String,
	pub origin: String,
	pub case_value: f64,
}
