//! Application configuration.
//!
//! The host page embeds a JSON object in `<script id="wiki-graph-config">`;
//! every field is optional. The API base URL defaults to the page origin.

use reqwest::Url;
use serde::Deserialize;

use crate::components::graph_view::ThemeMode;
use crate::error::{Result, WikiGraphError};
use crate::settings::RenderSettings;

/// Where a piece of code is running. Passed explicitly instead of probing
/// globals, because server rendering must never touch the network or the DOM.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ExecutionEnv {
	#[default]
	/// Client-side rendering; network and DOM available.
	Browser,
	/// Server-side rendering; no I/O.
	Server,
}

impl ExecutionEnv {
	/// True while rendering on the server.
	pub fn is_server(self) -> bool {
		self == ExecutionEnv::Server
	}
}

/// Which graph the view shows.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
	/// Interactive expansion around `page_title`.
	#[default]
	Neighbours,
	/// Precomputed most-popular subgraph, loaded from GraphML.
	Top,
}

/// Location of the wiki link API.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiConfig {
	base_url: Url,
}

impl ApiConfig {
	/// Accepts absolute `http`/`https` URLs only.
	pub fn new(base_url: &str) -> Result<Self> {
		if base_url.trim().is_empty() {
			return Err(WikiGraphError::Configuration("API base URL is not set".into()));
		}
		let base_url = Url::parse(base_url.trim())
			.map_err(|e| WikiGraphError::Configuration(format!("invalid API base URL {base_url:?}: {e}")))?;
		if !matches!(base_url.scheme(), "http" | "https") {
			return Err(WikiGraphError::Configuration(format!(
				"unsupported API scheme {:?}",
				base_url.scheme()
			)));
		}
		Ok(Self { base_url })
	}

	/// The validated base URL.
	pub fn base_url(&self) -> &Url {
		&self.base_url
	}

	/// Base URL with `segments` appended as individually escaped path segments.
	pub fn endpoint(&self, segments: &[&str]) -> Result<Url> {
		let mut url = self.base_url.clone();
		url.path_segments_mut()
			.map_err(|_| WikiGraphError::Configuration(format!("{} cannot be a base URL", self.base_url)))?
			.pop_if_empty()
			.extend(segments);
		Ok(url)
	}
}

/// Top-level configuration of the browser app.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct AppConfig {
	/// Wiki database name, e.g. `dewiki`.
	pub wiki_name: String,
	/// Root page of the neighbour view.
	pub page_title: Option<String>,
	/// Counters of the root page, when the host page knows them.
	pub num_links: Option<u64>,
	/// Inbound counter of the root page.
	pub times_linked: Option<u64>,
	/// Which graph to show.
	pub mode: ViewMode,
	/// API location; the page origin when absent.
	pub base_url: Option<String>,
	/// Initial render settings.
	pub render: RenderSettings,
	/// Initial color scheme.
	pub theme: ThemeMode,
	/// Show the community panel.
	pub show_clusters: bool,
}

impl Default for AppConfig {
	fn default() -> Self {
		Self {
			wiki_name: "dewiki".into(),
			page_title: None,
			num_links: None,
			times_linked: None,
			mode: ViewMode::default(),
			base_url: None,
			render: RenderSettings::default(),
			theme: ThemeMode::default(),
			show_clusters: false,
		}
	}
}

impl AppConfig {
	/// Parses and validates the embedded JSON.
	pub fn from_json(text: &str) -> Result<Self> {
		let config: AppConfig = serde_json::from_str(text)?;
		config.validate()?;
		Ok(config)
	}

	/// Rejects an empty wiki name, a neighbour view without a page, and invalid render settings.
	pub fn validate(&self) -> Result<()> {
		if self.wiki_name.trim().is_empty() {
			return Err(WikiGraphError::Configuration("wiki_name is empty".into()));
		}
		if self.mode == ViewMode::Neighbours && self.page_title.as_deref().is_none_or(str::is_empty) {
			return Err(WikiGraphError::Configuration(
				"neighbour view needs a page_title".into(),
			));
		}
		self.render.validate()
	}

	/// Resolves the API location, preferring the configured base URL.
	pub fn api(&self, origin: Option<&str>) -> Result<ApiConfig> {
		match (self.base_url.as_deref(), origin) {
			(Some(url), _) => ApiConfig::new(url),
			(None, Some(origin)) => ApiConfig::new(origin),
			(None, None) => Err(WikiGraphError::Configuration("API base URL is not set".into())),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn endpoint_escapes_titles() {
		let api = ApiConfig::new("https://example.org/app/").unwrap();
		let url = api.endpoint(&["api", "dewiki", "AC/DC", "neighbours"]).unwrap();
		assert_eq!(url.as_str(), "https://example.org/app/api/dewiki/AC%2FDC/neighbours");
	}

	#[test]
	fn base_url_must_be_absolute_http() {
		assert!(matches!(ApiConfig::new(""), Err(WikiGraphError::Configuration(_))));
		assert!(ApiConfig::new("/api").is_err());
		assert!(ApiConfig::new("ftp://example.org").is_err());
		assert!(ApiConfig::new("http://localhost:4321").is_ok());
	}

	#[test]
	fn app_config_fills_defaults() {
		let config = AppConfig::from_json(r#"{"page_title": "Berlin", "render": {"depth": 1}}"#).unwrap();
		assert_eq!(config.wiki_name, "dewiki");
		assert_eq!(config.mode, ViewMode::Neighbours);
		assert_eq!(config.render.depth, 1);
		assert_eq!(config.render.neighbors, 10);
		let api = config.api(Some("http://localhost:4321")).unwrap();
		assert_eq!(api.base_url().as_str(), "http://localhost:4321/");
	}

	#[test]
	fn app_config_rejects_missing_root() {
		assert!(AppConfig::from_json(r#"{"mode": "neighbours"}"#).is_err());
		assert!(AppConfig::from_json(r#"{"mode": "top"}"#).is_ok());
		assert!(AppConfig::default().api(None).is_err());
	}
}
