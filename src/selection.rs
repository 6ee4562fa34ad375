//! Selection, cluster focus and label search over a displayed graph.
//!
//! The state here never mutates the graph. Rendering asks
//! [`SelectionState::node_display`] and [`SelectionState::edge_display`] how
//! each element should look, and selection changes report the subset of the
//! graph whose appearance changed so a renderer can refresh only that part.

use std::collections::BTreeSet;

use crate::error::{Result, WikiGraphError};
use crate::graph::{Edge, EdgeId, GraphStore, NodeAttrs};

/// Maximum number of search suggestions.
pub const MAX_SUGGESTIONS: usize = 20;

/// How a node is drawn under the current selection.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeDisplay {
	/// Label text; empty for hidden nodes.
	pub label: String,
	/// Fill color.
	pub color: String,
	/// Node size before zoom scaling.
	pub size: f64,
	/// Not drawn at all.
	pub hidden: bool,
	/// Matched by the last search; drawn with a ring.
	pub highlighted: bool,
	/// Label drawn regardless of node size.
	pub force_label: bool,
}

/// How an edge is drawn under the current selection.
#[derive(Clone, Debug, PartialEq)]
pub struct EdgeDisplay {
	/// Stroke color.
	pub color: String,
	/// Stroke width before zoom scaling.
	pub size: f64,
	/// Not drawn at all.
	pub hidden: bool,
}

/// Elements whose appearance changed with a selection change.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PartialRefresh {
	/// Node keys, in store order.
	pub nodes: Vec<String>,
	/// Edges touching one of `nodes`.
	pub edges: Vec<EdgeId>,
}

/// Node selection, community focus and label search of one view.
///
/// The neighbour set is captured when a node is selected. Nodes and edges
/// added to the graph later stay outside the selection until it is made again.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SelectionState {
	/// Key of the clicked node.
	pub selected_node: Option<String>,
	/// Neighbours of `selected_node`, in either direction.
	pub selected_neighbors: Option<BTreeSet<String>>,
	/// Text of the search box.
	pub search_query: String,
	/// Label emphasised by the last submitted search.
	pub searched_node: Option<String>,
	/// Labels matching `search_query`, see [`suggestions`].
	pub suggestions: Vec<String>,
	/// The last submitted query matched no suggestion exactly.
	pub not_found: bool,
	/// Focused community id.
	pub selected_cluster: Option<String>,
}

impl SelectionState {
	/// Nothing selected, empty search.
	pub fn new() -> Self {
		Self::default()
	}

	/// Click on `node`: selects it, or clears the selection when it is already selected.
	pub fn toggle(&mut self, graph: &GraphStore, node: &str) -> Result<PartialRefresh> {
		if self.selected_node.as_deref() == Some(node) {
			Ok(self.deselect(graph))
		} else {
			self.select(graph, node)
		}
	}

	/// Selects `node` and captures its current neighbours. Fails for unknown nodes.
	pub fn select(&mut self, graph: &GraphStore, node: &str) -> Result<PartialRefresh> {
		if !graph.has_node(node) {
			return Err(WikiGraphError::UnknownNode(node.to_string()));
		}
		self.selected_node = Some(node.to_string());
		self.selected_neighbors = Some(graph.neighbors(node));
		Ok(self.outside_selection(graph))
	}

	/// Clears the selection. The refreshed subset is the one that was hidden.
	pub fn deselect(&mut self, graph: &GraphStore) -> PartialRefresh {
		let refresh = self.outside_selection(graph);
		self.selected_node = None;
		self.selected_neighbors = None;
		refresh
	}

	/// Nodes that are neither selected nor neighbours of the selection, plus
	/// every edge touching one of them.
	fn outside_selection(&self, graph: &GraphStore) -> PartialRefresh {
		let nodes: Vec<String> = graph
			.nodes()
			.map(|(key, _)| key)
			.filter(|key| !self.in_selection(key))
			.map(str::to_string)
			.collect();
		let index: BTreeSet<&str> = nodes.iter().map(String::as_str).collect();
		let edges = graph
			.edges()
			.filter(|e| index.contains(e.source.as_str()) || index.contains(e.target.as_str()))
			.map(|e| e.id)
			.collect();
		PartialRefresh { nodes, edges }
	}

	fn in_selection(&self, key: &str) -> bool {
		self.selected_node.as_deref() == Some(key)
			|| self
				.selected_neighbors
				.as_ref()
				.is_some_and(|n| n.contains(key))
	}

	/// Focuses a community; choosing the focused one again, or `None`, clears it.
	pub fn select_cluster(&mut self, cluster: Option<&str>) {
		self.selected_cluster = match cluster {
			Some(id) if self.selected_cluster.as_deref() != Some(id) => Some(id.to_string()),
			_ => None,
		};
	}

	/// Updates the query and its suggestions.
	pub fn set_query(&mut self, graph: &GraphStore, query: &str) -> &[String] {
		self.search_query = query.to_string();
		self.not_found = false;
		self.suggestions = suggestions(graph, query, MAX_SUGGESTIONS);
		&self.suggestions
	}

	/// Submits the current query. Returns `false` when it matches no
	/// suggestion exactly; the query is emphasised either way.
	pub fn submit_search(&mut self) -> bool {
		if self.search_query.is_empty() {
			return true;
		}
		self.not_found = !self.suggestions.contains(&self.search_query);
		self.searched_node = Some(self.search_query.clone());
		!self.not_found
	}

	/// How `key` is drawn: hidden outside the selection or the focused community, highlighted when searched.
	pub fn node_display(&self, key: &str, attrs: &NodeAttrs) -> NodeDisplay {
		let mut display = NodeDisplay {
			label: attrs.label.clone(),
			color: attrs.color.clone(),
			size: attrs.size,
			hidden: false,
			highlighted: false,
			force_label: attrs.force_label,
		};

		if self.selected_neighbors.is_some() && !self.in_selection(key) {
			display.label.clear();
			display.hidden = true;
		}
		if let Some(cluster) = &self.selected_cluster {
			if attrs.comm.as_ref() != Some(cluster) {
				display.hidden = true;
			}
		}
		if self.searched_node.as_deref().is_some_and(|s| s == display.label) {
			display.highlighted = true;
			display.force_label = true;
		}
		display
	}

	/// How `edge` is drawn: hidden unless it touches the selected node.
	pub fn edge_display(&self, edge: &Edge) -> EdgeDisplay {
		EdgeDisplay {
			color: edge.attrs.color.clone(),
			size: edge.attrs.size,
			hidden: self
				.selected_node
				.as_deref()
				.is_some_and(|n| !edge.has_extremity(n)),
		}
	}
}

/// Node labels matching `query`, case-insensitively. Prefix matches come
/// before infix matches, alphabetical within each group.
pub fn suggestions(graph: &GraphStore, query: &str, max: usize) -> Vec<String> {
	let needle = query.trim().to_lowercase();
	if needle.is_empty() {
		return Vec::new();
	}
	let mut matches: Vec<(bool, &str)> = graph
		.nodes()
		.filter_map(|(_, attrs)| {
			let label = attrs.label.to_lowercase();
			let pos = label.find(&needle)?;
			Some((pos != 0, attrs.label.as_str()))
		})
		.collect();
	matches.sort_unstable();
	matches.dedup();
	matches
		.into_iter()
		.take(max)
		.map(|(_, label)| label.to_string())
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::graph::EdgeAttrs;

	fn graph() -> GraphStore {
		let mut g = GraphStore::directed();
		for (key, comm) in [("Berlin", "0"), ("Paris", "0"), ("Hamburg", "1"), ("Rom", "1")] {
			g.add_node(key, NodeAttrs {
				label: key.into(),
				color: "#fff".into(),
				size: 3.0,
				comm: Some(comm.into()),
				..NodeAttrs::default()
			});
		}
		g.add_edge("Berlin", "Paris", EdgeAttrs::default()).unwrap();
		g.add_edge("Hamburg", "Berlin", EdgeAttrs::default()).unwrap();
		g.add_edge("Paris", "Rom", EdgeAttrs::default()).unwrap();
		g
	}

	#[test]
	fn selecting_hides_non_neighbours() {
		let g = graph();
		let mut s = SelectionState::new();
		let refresh = s.toggle(&g, "Berlin").unwrap();
		assert_eq!(refresh.nodes, vec!["Rom".to_string()]);
		assert_eq!(refresh.edges, vec![EdgeId(2)]);

		let rom = s.node_display("Rom", g.node("Rom").unwrap());
		assert!(rom.hidden);
		assert!(rom.label.is_empty());
		assert!(!s.node_display("Hamburg", g.node("Hamburg").unwrap()).hidden);

		let hidden: Vec<bool> = g.edges().map(|e| s.edge_display(e).hidden).collect();
		assert_eq!(hidden, vec![false, false, true]);
	}

	#[test]
	fn clicking_the_selection_again_clears_it() {
		let g = graph();
		let mut s = SelectionState::new();
		s.toggle(&g, "Berlin").unwrap();
		let refresh = s.toggle(&g, "Berlin").unwrap();
		assert_eq!(refresh.nodes, vec!["Rom".to_string()]);
		assert_eq!(s.selected_node, None);
		assert!(g.nodes().all(|(k, a)| !s.node_display(k, a).hidden));
		assert!(s.toggle(&g, "Madrid").is_err());
	}

	#[test]
	fn neighbours_are_fixed_when_the_selection_is_made() {
		let mut g = graph();
		let mut s = SelectionState::new();
		s.select(&g, "Berlin").unwrap();
		let before = s.selected_neighbors.clone();

		g.add_node("Spree", NodeAttrs {
			label: "Spree".into(),
			..NodeAttrs::default()
		});
		g.add_edge("Berlin", "Spree", EdgeAttrs::default()).unwrap();
		g.add_edge("Rom", "Berlin", EdgeAttrs::default()).unwrap();

		assert_eq!(s.selected_neighbors, before);
		assert!(!before.as_ref().unwrap().contains("Spree"));
		assert!(s.node_display("Spree", g.node("Spree").unwrap()).hidden);
		assert!(s.node_display("Rom", g.node("Rom").unwrap()).hidden);

		s.deselect(&g);
		s.select(&g, "Berlin").unwrap();
		assert!(s.selected_neighbors.as_ref().unwrap().contains("Spree"));
	}

	#[test]
	fn cluster_focus_toggles() {
		let g = graph();
		let mut s = SelectionState::new();
		s.select_cluster(Some("1"));
		assert!(s.node_display("Berlin", g.node("Berlin").unwrap()).hidden);
		assert!(!s.node_display("Rom", g.node("Rom").unwrap()).hidden);
		s.select_cluster(Some("1"));
		assert_eq!(s.selected_cluster, None);
	}

	#[test]
	fn suggestions_prefer_prefixes() {
		let mut g = graph();
		g.add_node("Amberg", NodeAttrs {
			label: "Amberg".into(),
			..NodeAttrs::default()
		});
		assert_eq!(suggestions(&g, "BERG", 20), vec!["Amberg"]);
		assert_eq!(suggestions(&g, "b", 20), vec!["Berlin", "Amberg", "Hamburg"]);
		assert_eq!(suggestions(&g, "b", 2), vec!["Berlin", "Amberg"]);
		assert!(suggestions(&g, "  ", 20).is_empty());
	}

	#[test]
	fn search_highlights_and_flags_misses() {
		let g = graph();
		let mut s = SelectionState::new();
		s.set_query(&g, "Paris");
		assert!(s.submit_search());
		let paris = s.node_display("Paris", g.node("Paris").unwrap());
		assert!(paris.highlighted && paris.force_label);

		s.set_query(&g, "Pari");
		assert!(!s.submit_search());
		assert!(s.not_found);
	}
}
