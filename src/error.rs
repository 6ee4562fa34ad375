//! Error taxonomy shared by the fetchers, the expander and the path client.

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, WikiGraphError>;

/// Everything that can go wrong while talking to the wiki API or building graphs.
#[derive(Debug, Error)]
pub enum WikiGraphError {
	/// The HTTP request did not complete (connection refused, aborted, DNS...).
	#[error("network error: {reason}")]
	Network {
		/// Transport error text.
		reason: String,
	},

	/// The server has no data for the requested page or file (HTTP 404).
	#[error("not found: {what}")]
	NotFound {
		/// The page or file asked for.
		what: String,
	},

	/// Any other non-2xx response. `message` is the body text, or the status
	/// reason when the body was empty.
	#[error("request failed with status {status}: {message}")]
	Status {
		/// HTTP status code.
		status: u16,
		/// Body text or status reason.
		message: String,
	},

	/// Missing or invalid client/server configuration.
	#[error("configuration error: {0}")]
	Configuration(String),

	/// A complete stream line that is not a valid progress record.
	#[error("malformed stream record on line {line}: {reason}")]
	MalformedRecord {
		/// 1-based line number within the stream.
		line: usize,
		/// Parser error text.
		reason: String,
	},

	/// The path stream closed without a single valid record.
	#[error("response stream was empty")]
	EmptyStream,

	/// The operation was superseded or its owner was torn down.
	#[error("operation cancelled")]
	Cancelled,

	/// The GraphML document could not be parsed.
	#[error("graphml: {0}")]
	GraphMl(String),

	/// A node key that is not part of the graph.
	#[error("unknown node {0:?}")]
	UnknownNode(String),

	/// Rejected render settings.
	#[error("invalid render settings: {0}")]
	InvalidSettings(String),

	/// A response body that could not be decoded into the expected shape.
	#[error("decode error: {0}")]
	Decode(String),
}

impl WikiGraphError {
	/// True for the "no data" case that traversals treat as zero neighbours.
	pub fn is_not_found(&self) -> bool {
		matches!(self, WikiGraphError::NotFound { .. })
	}
}

impl From<reqwest::Error> for WikiGraphError {
	fn from(e: reqwest::Error) -> Self {
		if e.is_decode() {
			WikiGraphError::Decode(e.to_string())
		} else {
			WikiGraphError::Network {
				reason: e.to_string(),
			}
		}
	}
}

impl From<serde_json::Error> for WikiGraphError {
	fn from(e: serde_json::Error) -> Self {
		WikiGraphError::Decode(e.to_string())
	}
}

impl From<quick_xml::Error> for WikiGraphError {
	fn from(e: quick_xml::Error) -> Self {
		WikiGraphError::GraphMl(e.to_string())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn not_found_is_recognised() {
		let e = WikiGraphError::NotFound {
			what: "page Foo".into(),
		};
		assert!(e.is_not_found());
		assert!(!WikiGraphError::EmptyStream.is_not_found());
	}

	#[test]
	fn status_error_renders_message() {
		let e = WikiGraphError::Status {
			status: 502,
			message: "Can't reach backend server".into(),
		};
		assert_eq!(
			e.to_string(),
			"request failed with status 502: Can't reach backend server"
		);
	}
}
