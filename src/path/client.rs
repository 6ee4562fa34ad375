//! Client of the streaming shortest-path route.

use std::sync::{Mutex, PoisonError};

use futures::future::{AbortHandle, Abortable, Aborted};
use log::{debug, info};
use reqwest::{StatusCode, Url};

use super::decoder::{StreamData, consume_stream};
use crate::api::{WikiApi, error_body};
use crate::config::ExecutionEnv;
use crate::error::{Result, WikiGraphError};

/// At most one running operation. Starting another aborts the previous one,
/// whose caller then sees [`WikiGraphError::Cancelled`].
#[derive(Debug, Default)]
pub struct InFlight {
	current: Mutex<Option<AbortHandle>>,
}

impl InFlight {
	/// Nothing running.
	pub fn new() -> Self {
		Self::default()
	}

	/// Runs `fut`, aborting whatever ran before it.
	pub async fn run<T>(&self, fut: impl Future<Output = Result<T>>) -> Result<T> {
		let (handle, registration) = AbortHandle::new_pair();
		if let Some(previous) = self.slot().replace(handle) {
			debug!("wiki-graph: superseding in-flight request");
			previous.abort();
		}
		match Abortable::new(fut, registration).await {
			Ok(result) => result,
			Err(Aborted) => Err(WikiGraphError::Cancelled),
		}
	}

	/// Aborts the running operation, if any.
	pub fn cancel(&self) {
		if let Some(handle) = self.slot().take() {
			handle.abort();
		}
	}

	fn slot(&self) -> std::sync::MutexGuard<'_, Option<AbortHandle>> {
		self.current.lock().unwrap_or_else(PoisonError::into_inner)
	}
}

/// Error of a failed `sp` request: the response text, or the status reason
/// when the body is empty.
pub fn path_status_error(status: StatusCode, body: String) -> WikiGraphError {
	let message = if body.trim().is_empty() {
		status.canonical_reason().unwrap_or("unknown error").to_string()
	} else {
		body
	};
	WikiGraphError::Status {
		status: status.as_u16(),
		message,
	}
}

/// Streams shortest-path progress for one view. A new search cancels the
/// previous one.
#[derive(Debug)]
pub struct PathClient {
	api: WikiApi,
	env: ExecutionEnv,
	in_flight: InFlight,
}

impl PathClient {
	/// Client for `api`. In [`ExecutionEnv::Server`] no request is ever sent.
	pub fn new(api: WikiApi, env: ExecutionEnv) -> Self {
		Self {
			api,
			env,
			in_flight: InFlight::new(),
		}
	}

	/// URL of the streaming `sp` route.
	pub fn url(&self, wiki: &str, start: &str, end: &str) -> Result<Url> {
		let mut url = self.api.config().endpoint(&["api", wiki, "sp"])?;
		url.query_pairs_mut()
			.append_pair("start", start)
			.append_pair("end", end)
			.append_pair("stream", "true");
		Ok(url)
	}

	/// Searches a path from `start` to `end`, reporting every progress record
	/// to `on_update`, and returns the final record. During server rendering
	/// this returns an empty record without any I/O.
	pub async fn run(
		&self,
		wiki: &str,
		start: &str,
		end: &str,
		on_update: impl FnMut(&StreamData),
	) -> Result<StreamData> {
		if self.env.is_server() {
			return Ok(StreamData::default());
		}
		let url = self.url(wiki, start, end)?;
		self.in_flight
			.run(async move {
				debug!("wiki-graph: GET {url}");
				let resp = self.api.http().get(url).send().await?;
				let status = resp.status();
				if !status.is_success() {
					let body = error_body(resp.text().await, "path search");
					return Err(path_status_error(status, body));
				}
				let last = consume_stream(resp.bytes_stream(), on_update).await?;
				info!(
					"wiki-graph: path search {start:?} -> {end:?} done, {} pages visited in {}ms",
					last.visited, last.elapsed_ms
				);
				Ok(last)
			})
			.await
	}

	/// Aborts the running search, if any.
	pub fn cancel(&self) {
		self.in_flight.cancel();
	}
}
