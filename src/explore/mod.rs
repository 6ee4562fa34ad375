//! Interactive graph exploration: fetching neighbours and growing the graph.

use std::sync::Mutex;

use crate::graph::GraphStore;
use crate::settings::{RenderSettings, SettingsEffect, resize_nodes};

pub mod expand;
pub mod fetcher;

pub use expand::{
	CancelToken, ExpandSettings, Expander, ExpansionReport, LEVEL_COLORS, RootNode, SharedGraph, default_node_size,
	expand, level_color, lock_graph,
};
pub use fetcher::NeighborFetcher;

/// Owns the cancellation token of the expansion currently driving a graph.
/// Starting a new session cancels the previous one, so a stale run can never
/// write into a graph that has been reset under it.
#[derive(Debug, Default)]
pub struct ExpansionSessions {
	current: Option<CancelToken>,
}

impl ExpansionSessions {
	/// No session running.
	pub fn new() -> Self {
		Self::default()
	}

	/// Cancels the running session, if any, and returns the token of a new one.
	pub fn begin(&mut self) -> CancelToken {
		self.cancel();
		let token = CancelToken::new();
		self.current = Some(token.clone());
		token
	}

	/// Cancels the running session without starting another.
	pub fn cancel(&mut self) {
		if let Some(token) = self.current.take() {
			token.cancel();
		}
	}
}

/// Performs the synchronous part of a settings change on `graph`. Returns
/// `true` when an expansion from the root has to follow.
pub fn apply_effect(graph: &Mutex<GraphStore>, settings: &RenderSettings, effect: SettingsEffect) -> bool {
	match effect {
		SettingsEffect::Unchanged => false,
		SettingsEffect::Resize => {
			resize_nodes(&mut lock_graph(graph), settings);
			false
		}
		SettingsEffect::Expand => true,
		SettingsEffect::ResetAndExpand => {
			if let Some(root) = lock_graph(graph).reset_to_root() {
				log::debug!("wiki-graph: graph reset to root {root:?}");
			}
			true
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::graph::{EdgeAttrs, NodeAttrs};

	#[test]
	fn new_session_cancels_previous() {
		let mut sessions = ExpansionSessions::new();
		let first = sessions.begin();
		let second = sessions.begin();
		assert!(first.is_cancelled());
		assert!(!second.is_cancelled());
		sessions.cancel();
		assert!(second.is_cancelled());
	}

	#[test]
	fn reset_effect_keeps_only_root() {
		let mut g = GraphStore::directed();
		g.add_node("A", NodeAttrs::default());
		g.add_node("B", NodeAttrs::default());
		g.add_edge("A", "B", EdgeAttrs::default()).unwrap();
		let graph = Mutex::new(g);

		assert!(!apply_effect(&graph, &RenderSettings::default(), SettingsEffect::Unchanged));
		assert_eq!(lock_graph(&graph).node_count(), 2);
		assert!(apply_effect(&graph, &RenderSettings::default(), SettingsEffect::ResetAndExpand));
		let g = lock_graph(&graph);
		assert_eq!(g.node_count(), 1);
		assert_eq!(g.edge_count(), 0);
		assert_eq!(g.root(), Some("A"));
	}
}
