use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogLevel {
	Debug,
	Info,
	Warning,
	Error,
}

/// One audit entry describing a retrieval, fallback, or filter decision.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct LogEvent {
	#[serde(with = "crate::time_serde")]
	pub timestamp: OffsetDateTime,
	pub identifier: String,
	pub level: LogLevel,
	pub code: Option<String>,
	pub message: String,
}

/// Append-only audit log owned by one unit of work.
///
/// Channels are never shared; callers merge them with [`LogChannel::extend`] once a unit finishes.
#[derive(Debug, Default)]
pub struct LogChannel {
	events: Vec<LogEvent>,
}
impl LogChannel {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn push(
		&mut self,
		identifier: impl Into<String>,
		level: LogLevel,
		code: Option<&str>,
		message: impl Into<String>,
	) {
		self.events.push(LogEvent {
			timestamp: OffsetDateTime::now_utc(),
			identifier: identifier.into(),
			level,
			code: code.map(str::to_string),
			message: message.into(),
		});
	}

	pub fn debug(&mut self, identifier: impl Into<String>, message: impl Into<String>) {
		self.push(identifier, LogLevel::Debug, None, message);
	}

	pub fn error(
		&mut self,
		identifier: impl Into<String>,
		code: &str,
		message: impl Into<String>,
	) {
		self.push(identifier, LogLevel::Error, Some(code), message);
	}

	pub fn extend(&mut self, events: impl IntoIterator<Item = LogEvent>) {
		self.events.extend(events);
	}

	pub fn events(&self) -> &[LogEvent] {
		&self.events
	}

	pub fn len(&self) -> usize {
		self.events.len()
	}

	pub fn is_empty(&self) -> bool {
		self.events.is_empty()
	}

	pub fn into_events(self) -> Vec<LogEvent> {
		self.events
	}
}
