//! wiki-graph: Interactive explorer for Wikipedia link graphs.
//!
//! This crate grows a page's link neighbourhood by bounded depth-first
//! expansion against the wiki link API, renders it as a force-directed graph
//! with selection, search and community filters, and streams shortest-path
//! searches between two pages.

use std::sync::{Arc, Mutex};

use leptos::prelude::*;
use leptos_meta::*;
use log::{Level, debug, info, warn};
use wasm_bindgen::JsCast;
use web_sys::{HtmlScriptElement, Window};

pub mod api;
pub mod components;
pub mod config;
pub mod error;
pub mod explore;
pub mod graph;
pub mod path;
pub mod selection;
pub mod settings;

pub use error::{Result, WikiGraphError};

use api::WikiApi;
use components::{
	ClusterPanel, Exploration, GraphCanvas, PathSearch, SearchPanel, SelectionInfo, SettingsPanel, ThemeMode,
	load_top_graph,
};
use config::{AppConfig, ExecutionEnv, ViewMode};
use explore::{RootNode, SharedGraph, apply_effect};
use graph::{Cluster, GraphStore};
use path::PathClient;
use selection::SelectionState;
use settings::{RenderSettings, SettingsChange};

/// Id of the script element carrying the JSON [`AppConfig`].
pub const CONFIG_ELEMENT_ID: &str = "wiki-graph-config";

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("wiki-graph: logging initialized");
}

fn config_text() -> Option<String> {
	let window: Window = web_sys::window()?;
	let document = window.document()?;
	let element = document.get_element_by_id(CONFIG_ELEMENT_ID)?;
	let script: HtmlScriptElement = element.dyn_into().ok()?;
	script.text().ok()
}

/// Load the app configuration from a script element with id="wiki-graph-config".
fn load_config() -> AppConfig {
	let Some(text) = config_text() else {
		warn!("wiki-graph: no #{CONFIG_ELEMENT_ID} element, using defaults");
		return AppConfig::default();
	};
	match AppConfig::from_json(&text) {
		Ok(config) => {
			info!(
				"wiki-graph: {} {:?} view of {:?}",
				config.wiki_name, config.mode, config.page_title
			);
			config
		}
		Err(e) => {
			warn!("wiki-graph: failed to parse config: {e}");
			AppConfig::default()
		}
	}
}

/// Graph, panels and path search for one configured view.
#[component]
fn Explorer(config: AppConfig, api: WikiApi, theme: RwSignal<ThemeMode>) -> impl IntoView {
	let selection = RwSignal::new(SelectionState::new());
	let communities = RwSignal::new(Vec::<Cluster>::new());
	let wiki = config.wiki_name.clone();

	let (graph, settings, status, on_change, expandable, heading) = match config.mode {
		ViewMode::Neighbours => {
			let title = config.page_title.clone().unwrap_or_default();
			let root = match (config.num_links, config.times_linked) {
				(None, None) => RootNode::new(title.clone()),
				(num_links, times_linked) => RootNode::page(title.clone(), num_links, times_linked),
			};
			let graph: SharedGraph = Arc::new(Mutex::new(GraphStore::directed()));
			let exploration = Exploration::new(
				graph.clone(),
				api.clone(),
				wiki.clone(),
				root,
				config.render.clone(),
				selection,
			);
			exploration.start();
			let (settings, status) = (exploration.settings, exploration.status);
			let on_change = Callback::new(move |change: SettingsChange| exploration.change(change));
			(graph, settings, status, on_change, true, title)
		}
		ViewMode::Top => {
			let graph: SharedGraph = Arc::new(Mutex::new(GraphStore::undirected()));
			let settings = RwSignal::new(config.render.clone());
			let status = RwSignal::new(None::<String>);
			load_top_graph(api.clone(), wiki.clone(), graph.clone(), settings, communities, status);
			let graph_change = graph.clone();
			let on_change = Callback::new(move |change: SettingsChange| {
				let mut next: RenderSettings = settings.get_untracked();
				match next.apply(change) {
					Ok(effect) => {
						if apply_effect(&graph_change, &next, effect) {
							debug!("wiki-graph: bulk-loaded graph does not expand");
						}
						settings.set(next);
					}
					Err(e) => status.set(Some(e.to_string())),
				}
			});
			(graph, settings, status, on_change, false, format!("Top pages of {wiki}"))
		}
	};

	let links_api = api.clone();
	let client = Arc::new(PathClient::new(api, ExecutionEnv::Browser));
	let show_clusters = config.show_clusters;

	view! {
		<div class="fullscreen-graph">
			<GraphCanvas graph=graph.clone() selection theme=theme wiki=wiki.clone() fullscreen=true />
			<div class="graph-overlay">
				<h1>{heading}</h1>
				<p class="subtitle">
					"Click a page to focus its links. Ctrl-click opens the article. Scroll to zoom."
				</p>
				<button
					class="theme-toggle"
					on:click=move |_| theme.update(|t| *t = t.toggled())
				>
					{move || match theme.get() {
						ThemeMode::Dark => "Light theme",
						ThemeMode::Light => "Dark theme",
					}}
				</button>
				<SearchPanel graph=graph.clone() selection />
				<SelectionInfo graph=graph.clone() selection api=links_api wiki=wiki.clone() />
				<SettingsPanel settings on_change expandable />
				<Show when=move || show_clusters>
					<ClusterPanel clusters=communities selection />
				</Show>
				<Show when=move || status.with(Option::is_some)>
					<p class="status">{move || status.get().unwrap_or_default()}</p>
				</Show>
			</div>
			<div class="path-overlay">
				<PathSearch client wiki=wiki.clone() />
			</div>
		</div>
	}
}

/// Main application component.
/// Loads the configuration from the DOM and renders the configured view.
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	let config = load_config();
	let theme = RwSignal::new(config.theme);
	let title = format!("{} link graph", config.wiki_name);
	let origin = web_sys::window().and_then(|w| w.location().origin().ok());
	let explorer = config
		.validate()
		.and_then(|()| config.api(origin.as_deref()))
		.map(|api_config| {
			let api = WikiApi::new(api_config);
			view! { <Explorer config api theme /> }
		});

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme=move || theme.get().as_str() />
		<Title text=title />
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Cannot show the graph"</h1>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>{explorer}</ErrorBoundary>
	}
}
