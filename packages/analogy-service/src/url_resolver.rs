//! Provider URL resolution with fallback to more mature environments.

use std::collections::HashMap;

use analogy_config::{Environment, EnvironmentLevel};

use crate::{CaseStore, Result};

/// URL columns consulted for `current`, from its own level through the most mature one.
///
/// An unknown environment is treated as the most mature level.
pub fn fallback_columns(maturity: &[EnvironmentLevel], current: &str) -> Vec<String> {
	let start = maturity
		.iter()
		.position(|level| level.label == current)
		.unwrap_or_else(|| maturity.len().saturating_sub(1));

	maturity[start..].iter().map(|level| level.url_column.clone()).collect()
}

#[derive(Clone, Debug, Default)]
pub struct ProviderUrls {
	urls: HashMap<String, Option<String>>,
}
impl ProviderUrls {
	pub fn from_pairs(pairs: impl IntoIterator<Item = (String, Option<String>)>) -> Self {
		Self { urls: pairs.into_iter().collect() }
	}

	/// `None` for unknown providers and for providers with no URL at any eligible level.
	pub fn get(&self, provider: &str) -> Option<&str> {
		self.urls.get(provider).and_then(|url| url.as_deref())
	}

	pub fn len(&self) -> usize {
		self.urls.len()
	}

	pub fn is_empty(&self) -> bool {
		self.urls.is_empty()
	}
}

pub async fn resolve_provider_urls(store: &dyn CaseStore, env: &Environment) -> Result<ProviderUrls> {
	let columns = fallback_columns(&env.maturity, &env.current);

	if columns.is_empty() {
		return Ok(ProviderUrls::default());
	}

	let pairs = store.provider_urls(&columns).await?;

	tracing::debug!(
		environment = %env.current,
		columns = ?columns,
		providers = pairs.len(),
		"Resolved provider URLs."
	);

	Ok(ProviderUrls::from_pairs(pairs))
}

#[cfg(test)]
mod tests {
	use analogy_config::EnvironmentLevel;

	use crate::url_resolver::{ProviderUrls, fallback_columns};

	fn maturity() -> Vec<EnvironmentLevel> {
		["dev", "staging", "test", "prod"]
			.into_iter()
			.map(|label| EnvironmentLevel {
				label: label.to_string(),
				url_column: format!("url_{label}"),
			})
			.collect()
	}

	#[test]
	fn current_level_and_more_mature_levels_are_consulted() {
		assert_eq!(fallback_columns(&maturity(), "staging"), ["url_staging", "url_test", "url_prod"]);
		assert_eq!(fallback_columns(&maturity(), "dev").len(), 4);
	}

	#[test]
	fn unknown_environment_uses_most_mature_level() {
		assert_eq!(fallback_columns(&maturity(), "qa"), ["url_prod"]);
	}

	#[test]
	fn empty_maturity_list_yields_no_columns() {
		assert!(fallback_columns(&[], "prod").is_empty());
	}

	#[test]
	fn unknown_and_unconfigured_providers_have_no_url() {
		let urls = ProviderUrls::from_pairs([
			("kp-a".to_string(), Some("https://kp-a.example".to_string())),
			("kp-b".to_string(), None),
		]);

		assert_eq!(urls.get("kp-a"), Some("https://kp-a.example"));
		assert_eq!(urls.get("kp-b"), None);
		assert_eq!(urls.get("kp-z"), None);
	}
}
