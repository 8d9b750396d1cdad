mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Config, Conflation, Dispatch, Environment, EnvironmentLevel, Postgres, Search, Service, Storage,
};

use std::{collections::HashSet, fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.log_level.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.log_level must be non-empty.".to_string(),
		});
	}
	if cfg.storage.postgres.dsn.trim().is_empty() {
		return Err(Error::Validation {
			message: "storage.postgres.dsn must be non-empty.".to_string(),
		});
	}
	if cfg.storage.postgres.pool_max_conns == 0 {
		return Err(Error::Validation {
			message: "storage.postgres.pool_max_conns must be greater than zero.".to_string(),
		});
	}
	if cfg.environment.maturity.is_empty() {
		return Err(Error::Validation {
			message: "environment.maturity must be non-empty.".to_string(),
		});
	}

	let mut labels = HashSet::new();

	for level in &cfg.environment.maturity {
		if level.label.trim().is_empty() {
			return Err(Error::Validation {
				message: "environment.maturity.label must be non-empty.".to_string(),
			});
		}
		if !labels.insert(level.label.as_str()) {
			return Err(Error::Validation {
				message: format!("environment.maturity.label {:?} is duplicated.", level.label),
			});
		}
		if !is_sql_identifier(&level.url_column) {
			return Err(Error::Validation {
				message: format!(
					"environment.maturity.url_column {:?} must contain only ASCII letters, digits, or underscores.",
					level.url_column
				),
			});
		}
	}

	if cfg.environment.current.trim().is_empty() {
		return Err(Error::Validation {
			message: "environment.current must be non-empty.".to_string(),
		});
	}
	if cfg.search.case_limit == 0 {
		return Err(Error::Validation {
			message: "search.case_limit must be greater than zero.".to_string(),
		});
	}

	let ceiling = cfg.search.fallback_similarity_ceiling;

	if !ceiling.is_finite() {
		return Err(Error::Validation {
			message: "search.fallback_similarity_ceiling must be a finite number.".to_string(),
		});
	}
	if ceiling <= 0.0 || ceiling > 1.0 {
		return Err(Error::Validation {
			message: "search.fallback_similarity_ceiling must be in the range (0.0, 1.0]."
				.to_string(),
		});
	}

	for tier in &cfg.conflation.priority_tiers {
		if tier.is_empty() {
			return Err(Error::Validation {
				message: "conflation.priority_tiers must not contain empty tiers.".to_string(),
			});
		}
	}

	if cfg.dispatch.max_concurrency == 0 {
		return Err(Error::Validation {
			message: "dispatch.max_concurrency must be greater than zero.".to_string(),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	cfg.environment.current = cfg.environment.current.trim().to_string();

	for level in &mut cfg.environment.maturity {
		level.label = level.label.trim().to_string();
		level.url_column = level.url_column.trim().to_string();
	}

	let pairs = cfg
		.conflation
		.map
		.iter()
		.flat_map(|(category, related)| {
			related.iter().map(move |other| (other.clone(), category.clone()))
		})
		.collect::<Vec<_>>();

	for (category, other) in pairs {
		if category != other {
			cfg.conflation.map.entry(category).or_default().insert(other);
		}
	}
	for (category, related) in cfg.conflation.map.iter_mut() {
		related.remove(category);
	}

	cfg.conflation.map.retain(|_, related| !related.is_empty());
}

fn is_sql_identifier(value: &str) -> bool {
	!value.is_empty() && value.chars().all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
}
