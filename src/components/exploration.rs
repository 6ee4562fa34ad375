//! Glue between the reactive UI and the graph-building side.
//!
//! Expansions and bulk loads run on the browser task queue and write into the
//! shared store; the canvas picks the changes up on its next frame.

use std::sync::{Arc, Mutex, PoisonError};

use leptos::prelude::*;
use leptos::task::spawn_local;
use log::{debug, info, warn};

use crate::api::WikiApi;
use crate::explore::{
	ExpandSettings, Expander, ExpansionReport, ExpansionSessions, RootNode, SharedGraph, apply_effect,
	lock_graph,
};
use crate::graph::{Cluster, clusters};
use crate::selection::SelectionState;
use crate::settings::{
	RenderSettings, SettingsChange, SettingsEffect, available_size_options, resize_nodes,
};

/// One-line summary of an expansion for the status bar; `None` when clean.
fn report_status(report: &ExpansionReport) -> Option<String> {
	match report.failures.as_slice() {
		[] => None,
		[(page, reason)] => Some(format!("could not load links of {page}: {reason}")),
		failures => Some(format!("could not load links of {} pages", failures.len())),
	}
}

/// Neighbour view of one root page: owns the expansion lifecycle and applies
/// settings edits to the shared graph.
#[derive(Clone)]
pub struct Exploration {
	/// Graph grown by the expansion.
	pub graph: SharedGraph,
	/// Source of neighbour lists.
	pub api: WikiApi,
	/// Wiki database name, e.g. `dewiki`.
	pub wiki: String,
	/// Page the expansion starts from.
	pub root: RootNode,
	/// Current settings; written after every accepted edit.
	pub settings: RwSignal<RenderSettings>,
	/// Cleared whenever the graph is reset.
	pub selection: RwSignal<SelectionState>,
	/// Last user-facing problem, if any.
	pub status: RwSignal<Option<String>>,
	sessions: Arc<Mutex<ExpansionSessions>>,
}

impl Exploration {
	/// Wires a view to `graph`. Nothing is fetched until [`Exploration::start`].
	pub fn new(
		graph: SharedGraph,
		api: WikiApi,
		wiki: impl Into<String>,
		root: RootNode,
		settings: RenderSettings,
		selection: RwSignal<SelectionState>,
	) -> Self {
		Self {
			graph,
			api,
			wiki: wiki.into(),
			root,
			settings: RwSignal::new(settings),
			selection,
			status: RwSignal::new(None),
			sessions: Arc::new(Mutex::new(ExpansionSessions::new())),
		}
	}

	/// Expands from the root with the current settings, superseding any
	/// expansion still running.
	pub fn start(&self) {
		let token = self
			.sessions
			.lock()
			.unwrap_or_else(PoisonError::into_inner)
			.begin();
		let this = self.clone();
		spawn_local(async move {
			let settings = this.settings.get_untracked();
			let report = Expander::new(&this.graph, &this.api, &this.wiki, ExpandSettings::from(&settings))
				.with_cancel(token)
				.run(&this.root)
				.await;
			if report.cancelled {
				debug!("wiki-graph: expansion of {:?} superseded", this.root.title);
				return;
			}
			resize_nodes(&mut lock_graph(&this.graph), &settings);
			info!(
				"wiki-graph: expanded {:?}: +{} nodes, +{} edges in {} fetches",
				this.root.title, report.nodes_added, report.edges_added, report.fetches
			);
			this.status.set(report_status(&report));
		});
	}

	/// Applies a settings edit. Invalid edits are reported and change nothing.
	pub fn change(&self, change: SettingsChange) {
		let mut settings = self.settings.get_untracked();
		let effect = match settings.apply(change) {
			Ok(SettingsEffect::Unchanged) => return,
			Ok(effect) => effect,
			Err(e) => {
				warn!("wiki-graph: {e}");
				self.status.set(Some(e.to_string()));
				return;
			}
		};
		if effect == SettingsEffect::ResetAndExpand {
			self.sessions
				.lock()
				.unwrap_or_else(PoisonError::into_inner)
				.cancel();
		}
		let expand = apply_effect(&self.graph, &settings, effect);
		if effect == SettingsEffect::ResetAndExpand {
			let mut selection = self.selection.get_untracked();
			selection.deselect(&lock_graph(&self.graph));
			self.selection.set(selection);
		}
		self.settings.set(settings);
		self.status.set(None);
		if expand {
			self.start();
		}
	}
}

/// Replaces the shared graph with the precomputed GraphML export of `wiki`,
/// then derives sizes, size options and communities from it.
pub fn load_top_graph(
	api: WikiApi,
	wiki: String,
	graph: SharedGraph,
	settings: RwSignal<RenderSettings>,
	communities: RwSignal<Vec<Cluster>>,
	status: RwSignal<Option<String>>,
) {
	spawn_local(async move {
		let loaded = match api.graphml(&wiki).await {
			Ok(loaded) => loaded,
			Err(e) => {
				warn!("wiki-graph: loading graph of {wiki} failed: {e}");
				status.set(Some(e.to_string()));
				return;
			}
		};
		let options = available_size_options(&loaded);
		settings.update(|s| {
			if !options.contains_key(&s.size_by) {
				if let Some(&first) = options.keys().next() {
					s.size_by = first;
				}
			}
			s.possible_size_options = options;
		});

		let found: Vec<Cluster> = {
			let mut store = lock_graph(&graph);
			store.replace(loaded);
			resize_nodes(&mut store, &settings.get_untracked());
			info!(
				"wiki-graph: loaded {} nodes, {} edges",
				store.node_count(),
				store.edge_count()
			);
			clusters(&store).into_values().collect()
		};
		communities.set(found);
	});
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn status_summarises_failures() {
		let mut report = ExpansionReport::default();
		assert_eq!(report_status(&report), None);
		report.failures.push(("Berlin".into(), "timeout".into()));
		assert_eq!(
			report_status(&report).as_deref(),
			Some("could not load links of Berlin: timeout")
		);
		report.failures.push(("Bonn".into(), "timeout".into()));
		assert_eq!(report_status(&report).as_deref(), Some("could not load links of 2 pages"));
	}
}
