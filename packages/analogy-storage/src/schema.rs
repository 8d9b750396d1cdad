pub fn render_schema() -> String {
	expand_includes(include_str!("../../../sql/init.sql"))
}

fn expand_includes(sql: &str) -> String {
	let mut out = String::new();

	for line in sql.lines() {
		let trimmed = line.trim();

		if let Some(path) = trimmed.strip_prefix("\\ir ") {
			match path.trim() {
				"00_extensions.sql" => out.push_str(include_str!("../../../sql/00_extensions.sql")),
				"tables/001_provider_info.sql" =>
					out.push_str(include_str!("../../../sql/tables/001_provider_info.sql")),
				"tables/002_case_solutions.sql" =>
					out.push_str(include_str!("../../../sql/tables/002_case_solutions.sql")),
				"tables/003_global_similarity.sql" =>
					out.push_str(include_str!("../../../sql/tables/003_global_similarity.sql")),
				_ => out.push_str(line),
			}
		} else {
			out.push_str(line);
		}

		out.push('\n');
	}

	out
}

#[cfg(test)]
mod tests {
	use crate::schema::render_schema;

	#[test]
	fn includes_are_expanded() {
		let sql = render_schema();

		assert!(!sql.contains("\\ir "));
		assert!(sql.contains("CREATE TABLE IF NOT EXISTS provider_info"));
		assert!(sql.contains("CREATE TABLE IF NOT EXISTS case_solutions"));
		assert!(sql.contains("CREATE TABLE IF NOT EXISTS global_similarity"));
	}
}
