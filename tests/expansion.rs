//! End-to-end expansion runs against an in-memory link table.

// Test crates reuse lib deps, silence noisy lint.
#![allow(unused_crate_dependencies)]

use std::collections::{BTreeSet, HashMap};
use std::sync::Mutex;

use futures::executor::block_on;
use wiki_graph::api::PageLink;
use wiki_graph::explore::{ExpandSettings, NeighborFetcher, RootNode, apply_effect, expand, lock_graph};
use wiki_graph::graph::GraphStore;
use wiki_graph::settings::{RenderSettings, SettingsChange, SettingsEffect};
use wiki_graph::{Result, WikiGraphError};

/// Outbound links per page; unknown pages answer 404, pages listed in
/// `broken` fail with a network error.
#[derive(Default)]
struct LinkTable {
	links: HashMap<&'static str, Vec<&'static str>>,
	broken: Vec<&'static str>,
}

impl LinkTable {
	fn page(mut self, page: &'static str, targets: &[&'static str]) -> Self {
		self.links.insert(page, targets.to_vec());
		self
	}
}

impl NeighborFetcher for LinkTable {
	async fn fetch(&self, _wiki: &str, page: &str, limit: Option<usize>) -> Result<Vec<PageLink>> {
		if self.broken.contains(&page) {
			return Err(WikiGraphError::Network {
				reason: format!("timeout fetching {page}"),
			});
		}
		let targets = self.links.get(page).ok_or_else(|| WikiGraphError::NotFound {
			what: page.to_string(),
		})?;
		Ok(targets
			.iter()
			.take(limit.unwrap_or(usize::MAX))
			.map(|t| PageLink::new(*t).with_counts(3, 1))
			.collect())
	}
}

fn berlin_table() -> LinkTable {
	LinkTable::default()
		.page("Berlin", &["Spree", "Brandenburg", "Potsdam"])
		.page("Spree", &["Brandenburg", "Havel"])
		.page("Brandenburg", &["Potsdam", "Berlin"])
		.page("Potsdam", &["Havel", "Sanssouci"])
		.page("Havel", &["Elbe"])
}

fn settings(max_depth: u32, limit: usize) -> ExpandSettings {
	ExpandSettings {
		max_depth,
		neighbor_limit: Some(limit),
		..ExpandSettings::default()
	}
}

fn snapshot(graph: &Mutex<GraphStore>) -> (BTreeSet<String>, BTreeSet<(String, String)>) {
	let g = lock_graph(graph);
	(
		g.nodes().map(|(k, _)| k.to_string()).collect(),
		g.edges()
			.map(|e| (e.source.clone(), e.target.clone()))
			.collect(),
	)
}

#[test]
fn every_node_and_edge_appears_once() {
	let graph = Mutex::new(GraphStore::directed());
	let report = block_on(expand(
		&graph,
		&RootNode::new("Berlin"),
		&berlin_table(),
		"dewiki",
		settings(3, 10),
	));

	let g = lock_graph(&graph);
	let keys: Vec<&str> = g.nodes().map(|(k, _)| k).collect();
	let unique: BTreeSet<&str> = keys.iter().copied().collect();
	assert_eq!(keys.len(), unique.len());
	let pairs: Vec<(&str, &str)> = g.edges().map(|e| (e.source.as_str(), e.target.as_str())).collect();
	let unique_pairs: BTreeSet<(&str, &str)> = pairs.iter().copied().collect();
	assert_eq!(pairs.len(), unique_pairs.len());
	assert_eq!(report.nodes_added, g.node_count());
	assert_eq!(report.edges_added, g.edge_count());
	assert!(g.has_edge("Brandenburg", "Berlin"));
}

#[test]
fn depth_bounds_the_traversal() {
	let graph = Mutex::new(GraphStore::directed());
	block_on(expand(
		&graph,
		&RootNode::new("Berlin"),
		&berlin_table(),
		"dewiki",
		settings(2, 10),
	));

	let g = lock_graph(&graph);
	assert!(g.has_node("Havel"));
	assert!(g.has_node("Sanssouci"));
	// Three hops away.
	assert!(!g.has_node("Elbe"));
}

#[test]
fn reset_and_expand_rebuilds_the_same_graph() {
	let graph = Mutex::new(GraphStore::directed());
	let table = berlin_table();
	let root = RootNode::page("Berlin", Some(120), Some(4000));
	block_on(expand(&graph, &root, &table, "dewiki", settings(2, 10)));
	let before = snapshot(&graph);

	let mut render = RenderSettings {
		neighbors: 10,
		depth: 2,
		..RenderSettings::default()
	};
	let effect = render.apply(SettingsChange::Depth(3)).unwrap();
	assert_eq!(effect, SettingsEffect::ResetAndExpand);
	render.apply(SettingsChange::Depth(2)).unwrap();
	assert!(apply_effect(&graph, &render, effect));
	assert_eq!(lock_graph(&graph).node_count(), 1);

	block_on(expand(&graph, &root, &table, "dewiki", ExpandSettings::from(&render)));
	assert_eq!(snapshot(&graph), before);
	let g = lock_graph(&graph);
	let root_attrs = g.node("Berlin").unwrap();
	assert_eq!(root_attrs.color, "red");
	assert_eq!(root_attrs.num_links, Some(120));
}

#[test]
fn more_neighbours_grow_the_graph_in_place() {
	let graph = Mutex::new(GraphStore::directed());
	let table = berlin_table();
	let root = RootNode::new("Berlin");
	let mut render = RenderSettings {
		neighbors: 1,
		depth: 2,
		..RenderSettings::default()
	};
	block_on(expand(&graph, &root, &table, "dewiki", ExpandSettings::from(&render)));
	let (nodes_before, edges_before) = snapshot(&graph);
	assert_eq!(nodes_before.len(), 3);
	let generation = lock_graph(&graph).generation();

	let effect = render.apply(SettingsChange::Neighbors(3)).unwrap();
	assert_eq!(effect, SettingsEffect::Expand);
	assert!(apply_effect(&graph, &render, effect));
	assert_eq!(snapshot(&graph), (nodes_before.clone(), edges_before.clone()));

	let report = block_on(expand(&graph, &root, &table, "dewiki", ExpandSettings::from(&render)));
	let (nodes_after, edges_after) = snapshot(&graph);
	assert!(nodes_after.is_superset(&nodes_before));
	assert!(edges_after.is_superset(&edges_before));
	assert_eq!(report.nodes_added, nodes_after.len() - nodes_before.len());
	let g = lock_graph(&graph);
	assert_eq!(g.generation(), generation);
	assert!(g.has_edge("Berlin", "Potsdam"));
	assert!(g.has_node("Sanssouci"));
	assert_eq!(g.node("Berlin").unwrap().color, "gray");
}

#[test]
fn missing_and_failing_pages_do_not_stop_siblings() {
	let mut table = berlin_table();
	table.links.remove("Spree");
	table.broken.push("Brandenburg");

	let graph = Mutex::new(GraphStore::directed());
	let report = block_on(expand(
		&graph,
		&RootNode::new("Berlin"),
		&table,
		"dewiki",
		settings(2, 10),
	));

	assert_eq!(report.not_found, vec!["Spree".to_string()]);
	assert_eq!(report.failures.len(), 1);
	assert_eq!(report.failures[0].0, "Brandenburg");
	let g = lock_graph(&graph);
	assert!(g.has_node("Sanssouci"));
	assert!(g.neighbors("Spree").contains("Berlin"));
	assert!(!g.has_edge("Brandenburg", "Potsdam"));
}
