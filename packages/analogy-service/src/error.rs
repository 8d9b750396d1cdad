use analogy_domain::{query::QueryError, solution::SolutionError};

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid query: {message}")]
	InvalidQuery { message: String },
	#[error("Storage error: {message}")]
	Storage { message: String },
	#[error("Case search error: {message}")]
	Search { message: String },
	#[error("Ranking error: {message}")]
	Ranking { message: String },
	#[error("Invariant violated: {message}")]
	Invariant { message: String },
	#[error("Dispatch error: {message}")]
	Dispatch { message: String },
}
impl From<analogy_storage::Error> for Error {
	fn from(err: analogy_storage::Error) -> Self {
		match err {
			analogy_storage::Error::Sqlx(inner) => Self::Storage { message: inner.to_string() },
			analogy_storage::Error::InvalidArgument(message) => Self::Storage { message },
		}
	}
}

impl From<QueryError> for Error {
	fn from(err: QueryError) -> Self {
		Self::InvalidQuery { message: err.to_string() }
	}
}

impl From<SolutionError> for Error {
	fn from(err: SolutionError) -> Self {
		Self::Invariant { message: err.to_string() }
	}
}
