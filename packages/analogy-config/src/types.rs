use std::collections::{BTreeMap, BTreeSet};

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	pub environment: Environment,
	#[serde(default)]
	pub search: Search,
	#[serde(default)]
	pub conflation: Conflation,
	#[serde(default)]
	pub dispatch: Dispatch,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub log_level: String,
}

#[derive(Debug, Deserialize)]
pub struct Storage {
	pub postgres: Postgres,
}

#[derive(Debug, Deserialize)]
pub struct Postgres {
	pub dsn: String,
	pub pool_max_conns: u32,
}

/// Deployment maturity ladder used to pick knowledge provider URLs.
#[derive(Debug, Deserialize)]
pub struct Environment {
	/// Label of the environment this process runs in. Unknown labels resolve as the most mature.
	pub current: String,
	/// Ordered from least mature to most mature.
	pub maturity: Vec<EnvironmentLevel>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct EnvironmentLevel {
	pub label: String,
	/// Column of the provider info table holding this level's URL.
	pub url_column: String,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Search {
	/// Maximum number of candidate cases kept per triplet.
	pub case_limit: u32,
	/// Exclusive upper bound on similarity used by the direct-provider fallback search.
	pub fallback_similarity_ceiling: f64,
}
impl Default for Search {
	fn default() -> Self {
		Self { case_limit: 2, fallback_similarity_ceiling: 1.0 }
	}
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Conflation {
	/// Category to the categories it may be confused with. Made symmetric on load.
	pub map: BTreeMap<String, BTreeSet<String>>,
	/// Each tier lists categories from most to least specific.
	pub priority_tiers: Vec<Vec<String>>,
}
impl Default for Conflation {
	fn default() -> Self {
		let pairs = [
			("biolink:Gene", "biolink:Protein"),
			("biolink:ChemicalEntity", "biolink:SmallMolecule"),
		];
		let mut map: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();

		for (left, right) in pairs {
			map.entry(left.to_string()).or_default().insert(right.to_string());
			map.entry(right.to_string()).or_default().insert(left.to_string());
		}

		Self {
			map,
			priority_tiers: vec![
				vec!["biolink:SmallMolecule".to_string(), "biolink:ChemicalEntity".to_string()],
				vec!["biolink:Protein".to_string(), "biolink:Gene".to_string()],
			],
		}
	}
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Dispatch {
	pub max_concurrency: u32,
}
impl Default for Dispatch {
	fn default() -> Self {
		Self { max_concurrency: 8 }
	}
}
