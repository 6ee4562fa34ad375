//! REST client for the wiki link API.
//!
//! Routes, relative to the configured base URL:
//! - `GET /api/{wiki}/{page}/neighbours?limit=N&sort=num_links|times_linked`
//! - `GET /api/{wiki}/{page}/links?num=true|false&page=N`
//! - `GET /api/{wiki}/{page}/linked?num=true|false&page=N`
//! - `GET /api/{wiki}/graphml`
//!
//! The shortest-path stream lives in [`crate::path`].

use std::fmt::Display;

use log::{debug, warn};
use reqwest::{Response, StatusCode, Url};

use crate::config::ApiConfig;
use crate::error::{Result, WikiGraphError};
use crate::graph::{GraphStore, parse_graphml};

pub mod types;

pub use types::{LinkDirection, LinkEntry, LinkQuery, NeighbourSort, PageLink, StatusBody};

/// Rows per page of the `links`/`linked` routes.
pub const PAGINATION_SIZE: usize = 50;

/// Pages needed to list `total` rows; at least one.
pub fn page_count(total: u64) -> u32 {
	let pages = total.div_ceil(PAGINATION_SIZE as u64).max(1);
	u32::try_from(pages).unwrap_or(u32::MAX)
}

/// Body of an error response. A failed read is logged and treated as empty,
/// so the caller falls back to the status reason.
pub(crate) fn error_body<E: Display>(body: std::result::Result<String, E>, what: &str) -> String {
	match body {
		Ok(text) => text,
		Err(e) => {
			warn!("wiki-graph: reading error body of {what} failed: {e}");
			String::new()
		}
	}
}

/// Memoisation key used by response caches in front of the API:
/// `{operation}:{wiki}:{page}[:{param}...]`.
pub fn cache_key(operation: &str, wiki: &str, page: &str, params: &[&str]) -> String {
	let mut key = format!("{operation}:{wiki}:{page}");
	for p in params {
		key.push(':');
		key.push_str(p);
	}
	key
}

/// Article URL on the public wiki, e.g. `dewiki` + `Berlin` ->
/// `https://de.wikipedia.org/wiki/Berlin`.
pub fn wiki_article_url(wiki: &str, title: &str) -> Result<Url> {
	const PROJECTS: [&str; 9] = [
		"wiki",
		"wiktionary",
		"wikinews",
		"wikisource",
		"wikiquote",
		"wikivoyage",
		"wikibooks",
		"wikiversity",
		"wikimedia",
	];
	let (lang, project) = PROJECTS
		.iter()
		.find_map(|p| wiki.strip_suffix(p).map(|lang| (lang, *p)))
		.filter(|(lang, _)| !lang.is_empty())
		.ok_or_else(|| WikiGraphError::Configuration(format!("invalid wiki name {wiki:?}")))?;
	let domain = if project == "wiki" { "wikipedia" } else { project };
	let mut url = Url::parse(&format!("https://{lang}.{domain}.org/wiki/"))
		.map_err(|e| WikiGraphError::Configuration(e.to_string()))?;
	url.path_segments_mut()
		.map_err(|_| WikiGraphError::Configuration(format!("invalid wiki name {wiki:?}")))?
		.pop_if_empty()
		.push(&title.replace(' ', "_"));
	Ok(url)
}

/// Maps a non-2xx status to an error. `body` is the response text.
pub fn status_error(status: StatusCode, body: String, what: &str) -> WikiGraphError {
	if status == StatusCode::NOT_FOUND {
		return WikiGraphError::NotFound {
			what: what.to_string(),
		};
	}
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

/// Status mapping of the `graphml` route, whose error bodies are
/// `{"statusText": ...}` JSON.
pub fn graphml_status_error(status: StatusCode, body: &str, wiki: &str) -> WikiGraphError {
	let text = serde_json::from_str::<StatusBody>(body)
		.map(|b| b.status_text)
		.unwrap_or_default();
	match status {
		StatusCode::NOT_FOUND => WikiGraphError::NotFound {
			what: if text.is_empty() {
				format!("graphml file for wiki {wiki}")
			} else {
				text
			},
		},
		StatusCode::INTERNAL_SERVER_ERROR => WikiGraphError::Configuration(if text.is_empty() {
			"graph server is misconfigured".into()
		} else {
			text
		}),
		_ => status_error(status, body.to_string(), "graphml"),
	}
}

async fn checked(resp: Response, what: &str) -> Result<Response> {
	let status = resp.status();
	if status.is_success() {
		return Ok(resp);
	}
	let body = error_body(resp.text().await, what);
	Err(status_error(status, body, what))
}

/// Client for the wiki link API.
#[derive(Clone, Debug)]
pub struct WikiApi {
	http: reqwest::Client,
	config: ApiConfig,
}

impl WikiApi {
	/// Client with a default `reqwest` connection pool.
	pub fn new(config: ApiConfig) -> Self {
		Self::with_client(reqwest::Client::new(), config)
	}

	/// Client sharing an existing `reqwest` pool.
	pub fn with_client(http: reqwest::Client, config: ApiConfig) -> Self {
		Self { http, config }
	}

	/// Where the API lives.
	pub fn config(&self) -> &ApiConfig {
		&self.config
	}

	pub(crate) fn http(&self) -> &reqwest::Client {
		&self.http
	}

	/// URL of the `neighbours` route. `limit: None` asks for every neighbour.
	pub fn neighbours_url(
		&self,
		wiki: &str,
		page: &str,
		limit: Option<usize>,
		sort: NeighbourSort,
	) -> Result<Url> {
		let mut url = self.config.endpoint(&["api", wiki, page, "neighbours"])?;
		{
			let mut query = url.query_pairs_mut();
			if let Some(limit) = limit {
				query.append_pair("limit", &limit.to_string());
			}
			query.append_pair("sort", sort.as_str());
		}
		Ok(url)
	}

	fn counter_url(&self, route: &str, wiki: &str, page: &str, num: bool, page_no: u32) -> Result<Url> {
		let mut url = self.config.endpoint(&["api", wiki, page, route])?;
		url.query_pairs_mut()
			.append_pair("num", if num { "true" } else { "false" })
			.append_pair("page", &page_no.max(1).to_string());
		Ok(url)
	}

	/// Outbound links of `page`, most popular first, at most `limit` of them.
	pub async fn neighbours(
		&self,
		wiki: &str,
		page: &str,
		limit: Option<usize>,
		sort: NeighbourSort,
	) -> Result<Vec<PageLink>> {
		let url = self.neighbours_url(wiki, page, limit, sort)?;
		debug!("wiki-graph: GET {url}");
		let resp = checked(self.http.get(url).send().await?, &format!("page {page:?}")).await?;
		Ok(resp.json().await?)
	}

	/// Number of pages `page` links to.
	pub async fn link_count(&self, wiki: &str, page: &str) -> Result<u64> {
		let url = self.counter_url("links", wiki, page, true, 1)?;
		let resp = checked(self.http.get(url).send().await?, &format!("page {page:?}")).await?;
		Ok(resp.json().await?)
	}

	/// Number of pages linking to `page`.
	pub async fn linked_count(&self, wiki: &str, page: &str) -> Result<u64> {
		let url = self.counter_url("linked", wiki, page, true, 1)?;
		let resp = checked(self.http.get(url).send().await?, &format!("page {page:?}")).await?;
		Ok(resp.json().await?)
	}

	/// One page (1-based, [`PAGINATION_SIZE`] rows) of outbound links.
	pub async fn links(&self, wiki: &str, page: &str, page_no: u32) -> Result<Vec<LinkEntry>> {
		let url = self.counter_url("links", wiki, page, false, page_no)?;
		let resp = checked(self.http.get(url).send().await?, &format!("page {page:?}")).await?;
		Ok(resp.json().await?)
	}

	/// One page (1-based, [`PAGINATION_SIZE`] rows) of inbound links.
	pub async fn linked(&self, wiki: &str, page: &str, page_no: u32) -> Result<Vec<LinkEntry>> {
		let url = self.counter_url("linked", wiki, page, false, page_no)?;
		let resp = checked(self.http.get(url).send().await?, &format!("page {page:?}")).await?;
		Ok(resp.json().await?)
	}

	/// Link total of `page` in one direction.
	pub async fn count(&self, wiki: &str, page: &str, direction: LinkDirection) -> Result<u64> {
		match direction {
			LinkDirection::Outbound => self.link_count(wiki, page).await,
			LinkDirection::Inbound => self.linked_count(wiki, page).await,
		}
	}

	/// One page of link rows of `page` in one direction.
	pub async fn entries(
		&self,
		wiki: &str,
		page: &str,
		direction: LinkDirection,
		page_no: u32,
	) -> Result<Vec<LinkEntry>> {
		match direction {
			LinkDirection::Outbound => self.links(wiki, page, page_no).await,
			LinkDirection::Inbound => self.linked(wiki, page, page_no).await,
		}
	}

	/// Downloads and parses the precomputed top-pages subgraph of `wiki`.
	pub async fn graphml(&self, wiki: &str) -> Result<GraphStore> {
		let url = self.config.endpoint(&["api", wiki, "graphml"])?;
		debug!("wiki-graph: GET {url}");
		let resp = self.http.get(url).send().await?;
		let status = resp.status();
		if !status.is_success() {
			let body = error_body(resp.text().await, "graphml");
			return Err(graphml_status_error(status, &body, wiki));
		}
		parse_graphml(&resp.text().await?)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn api() -> WikiApi {
		WikiApi::new(ApiConfig::new("http://localhost:4321").unwrap())
	}

	#[test]
	fn neighbours_url_carries_limit_and_sort() {
		let url = api()
			.neighbours_url("dewiki", "Albert Einstein", Some(10), NeighbourSort::NumLinks)
			.unwrap();
		assert_eq!(
			url.as_str(),
			"http://localhost:4321/api/dewiki/Albert%20Einstein/neighbours?limit=10&sort=num_links"
		);
		let uncapped = api()
			.neighbours_url("dewiki", "Berlin", None, NeighbourSort::TimesLinked)
			.unwrap();
		assert_eq!(uncapped.query(), Some("sort=times_linked"));
	}

	#[test]
	fn counter_urls_are_one_based() {
		let url = api().counter_url("linked", "enwiki", "Rust", false, 0).unwrap();
		assert_eq!(url.query(), Some("num=false&page=1"));
	}

	#[test]
	fn status_mapping() {
		assert!(status_error(StatusCode::NOT_FOUND, String::new(), "page X").is_not_found());
		match status_error(StatusCode::BAD_GATEWAY, String::new(), "x") {
			WikiGraphError::Status { status, message } => {
				assert_eq!(status, 502);
				assert_eq!(message, "Bad Gateway");
			}
			other => panic!("unexpected {other:?}"),
		}
		match status_error(StatusCode::BAD_REQUEST, "missing start".into(), "x") {
			WikiGraphError::Status { message, .. } => assert_eq!(message, "missing start"),
			other => panic!("unexpected {other:?}"),
		}
	}

	#[test]
	fn unreadable_error_body_falls_back_to_reason() {
		let body = error_body(Err("connection closed mid-body"), "page \"Berlin\"");
		assert!(body.is_empty());
		match status_error(StatusCode::GATEWAY_TIMEOUT, body, "x") {
			WikiGraphError::Status { message, .. } => assert_eq!(message, "Gateway Timeout"),
			other => panic!("unexpected {other:?}"),
		}
		assert_eq!(error_body::<&str>(Ok("quota".into()), "x"), "quota");
	}

	#[test]
	fn link_lists_page_by_fifty() {
		assert_eq!(page_count(0), 1);
		assert_eq!(page_count(50), 1);
		assert_eq!(page_count(51), 2);
		assert_eq!(page_count(1234), 25);
	}

	#[test]
	fn graphml_errors_read_status_text() {
		let e = graphml_status_error(
			StatusCode::NOT_FOUND,
			r#"{"statusText": "Graphml file for wiki xxwiki was not found"}"#,
			"xxwiki",
		);
		assert!(matches!(e, WikiGraphError::NotFound { what } if what.contains("xxwiki")));
		let e = graphml_status_error(StatusCode::INTERNAL_SERVER_ERROR, "", "dewiki");
		assert!(matches!(e, WikiGraphError::Configuration(_)));
	}

	#[test]
	fn article_urls() {
		assert_eq!(
			wiki_article_url("dewiki", "Albert Einstein").unwrap().as_str(),
			"https://de.wikipedia.org/wiki/Albert_Einstein"
		);
		assert_eq!(
			wiki_article_url("enwiktionary", "go").unwrap().as_str(),
			"https://en.wiktionary.org/wiki/go"
		);
		assert!(wiki_article_url("wiki", "x").is_err());
	}

	#[test]
	fn cache_keys() {
		assert_eq!(cache_key("neighbours", "dewiki", "Berlin", &["num_links", "10"]), "neighbours:dewiki:Berlin:num_links:10");
		assert_eq!(cache_key("links", "dewiki", "Berlin", &[]), "links:dewiki:Berlin");
	}
}
