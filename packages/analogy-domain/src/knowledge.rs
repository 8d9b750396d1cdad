use std::fmt;

use serde::{Deserialize, Serialize};

/// Knowledge acquisition mode declared on a query edge.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum KnowledgeMode {
	#[default]
	Lookup,
	#[serde(rename = "inferred", alias = "creative")]
	Creative,
}
impl KnowledgeMode {
	/// Parses the edge's `knowledge_type`. Absent or unrecognised values mean lookup.
	pub fn from_edge_value(value: Option<&str>) -> Self {
		match value.map(str::trim) {
			Some(raw) if raw.eq_ignore_ascii_case("inferred") || raw.eq_ignore_ascii_case("creative") =>
				Self::Creative,
			_ => Self::Lookup,
		}
	}

	/// Case provenances eligible under this mode, in search order.
	pub fn provenance(self) -> &'static [Provenance] {
		match self {
			Self::Lookup => &[Provenance::FromKp],
			Self::Creative => &[Provenance::Derived, Provenance::FromKp],
		}
	}

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Lookup => "lookup",
			Self::Creative => "inferred",
		}
	}
}
impl fmt::Display for KnowledgeMode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Where a case came from.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Provenance {
	/// Taken directly from a knowledge provider's data.
	#[serde(rename = "fromKP")]
	FromKp,
	/// Inferred from other cases.
	#[serde(rename = "derived")]
	Derived,
}
impl Provenance {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::FromKp => "fromKP",
			Self::Derived => "derived",
		}
	}
}
impl fmt::Display for Provenance {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

#[cfg(test)]
mod tests {
	use crate::knowledge::{KnowledgeMode, Provenance};

	#[test]
	fn lookup_only_admits_direct_provider_cases() {
		assert_eq!(KnowledgeMode::Lookup.provenance(), &[Provenance::FromKp]);
	}

	#[test]
	fn creative_admits_derived_and_direct_provider_cases() {
		assert_eq!(KnowledgeMode::Creative.provenance(), &[Provenance::Derived, Provenance::FromKp]);
	}

	#[test]
	fn edge_values_map_to_modes() {
		assert_eq!(KnowledgeMode::from_edge_value(None), KnowledgeMode::Lookup);
		assert_eq!(KnowledgeMode::from_edge_value(Some("lookup")), KnowledgeMode::Lookup);
		assert_eq!(KnowledgeMode::from_edge_value(Some("inferred")), KnowledgeMode::Creative);
		assert_eq!(KnowledgeMode::from_edge_value(Some(" Creative ")), KnowledgeMode::Creative);
		assert_eq!(KnowledgeMode::from_edge_value(Some("unknown")), KnowledgeMode::Lookup);
	}
}
