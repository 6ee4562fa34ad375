//! In-memory link graph with attribute maps on nodes and edges.
//!
//! Node keys are page titles and are unique. Insertions are guarded rather
//! than upserted: [`GraphStore::add_node`] and [`GraphStore::add_edge`] are
//! no-ops for keys/pairs that already exist, so traversals decide whether to
//! recurse by checking [`GraphStore::has_node`] first.
//!
//! Two counters let consumers mirror the store cheaply: `revision` increases on
//! every mutation, `generation` only when the store is cleared.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::error::{Result, WikiGraphError};

/// Edge semantics of a graph.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GraphKind {
	/// `(u, v)` and `(v, u)` are different edges.
	#[default]
	Directed,
	/// Any order of the endpoints names the same edge.
	Undirected,
}

/// A loosely typed attribute value, as found in GraphML files.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
	/// GraphML `boolean`.
	Bool(bool),
	/// GraphML `int` or `long`.
	Int(i64),
	/// GraphML `float` or `double`.
	Float(f64),
	/// Anything else.
	Str(String),
}

impl AttrValue {
	/// Numeric view; strings are parsed.
	pub fn as_f64(&self) -> Option<f64> {
		match self {
			AttrValue::Int(v) => Some(*v as f64),
			AttrValue::Float(v) => Some(*v),
			AttrValue::Str(s) => s.trim().parse().ok(),
			AttrValue::Bool(_) => None,
		}
	}

	/// Non-negative integer view, used for link counters.
	pub fn as_count(&self) -> Option<u64> {
		let v = self.as_f64()?;
		(v.is_finite() && v >= 0.0).then_some(v as u64)
	}

	/// Boolean view; accepts `true`/`false` strings.
	pub fn as_bool(&self) -> Option<bool> {
		match self {
			AttrValue::Bool(b) => Some(*b),
			AttrValue::Str(s) => s.trim().parse().ok(),
			_ => None,
		}
	}

	/// String view of any value.
	pub fn to_text(&self) -> String {
		match self {
			AttrValue::Bool(b) => b.to_string(),
			AttrValue::Int(v) => v.to_string(),
			AttrValue::Float(v) => v.to_string(),
			AttrValue::Str(s) => s.clone(),
		}
	}
}

/// Attributes carried by every node.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NodeAttrs {
	/// Display label, usually the page title.
	pub label: String,
	/// Rendered size, derived from a metric.
	pub size: f64,
	/// CSS color, depth- or role-derived.
	pub color: String,
	/// Layout hint.
	pub x: f64,
	/// Layout hint.
	pub y: f64,
	/// Number of outbound links of the page.
	pub num_links: Option<u64>,
	/// Number of pages linking to this page.
	pub times_linked: Option<u64>,
	/// Outbound links inside a precomputed subgraph.
	pub outgoing: Option<u64>,
	/// Always draw the label.
	pub force_label: bool,
	/// Precomputed community id.
	pub comm: Option<String>,
	/// Attributes without a dedicated field.
	pub extra: BTreeMap<String, AttrValue>,
}

impl NodeAttrs {
	/// Numeric attribute by name, covering dedicated and extra attributes.
	pub fn numeric(&self, name: &str) -> Option<f64> {
		match name {
			"size" => Some(self.size),
			"x" => Some(self.x),
			"y" => Some(self.y),
			"num_links" => self.num_links.map(|v| v as f64),
			"times_linked" => self.times_linked.map(|v| v as f64),
			"outgoing" => self.outgoing.map(|v| v as f64),
			_ => self.extra.get(name).and_then(AttrValue::as_f64),
		}
	}

	/// Sets an attribute by name. Values that do not fit the dedicated field's
	/// type are kept in `extra` under the same name.
	pub fn set(&mut self, name: &str, value: AttrValue) {
		let stored = match name {
			"label" => {
				self.label = value.to_text();
				true
			}
			"color" => {
				self.color = value.to_text();
				true
			}
			"comm" => {
				self.comm = Some(value.to_text());
				true
			}
			"size" => value.as_f64().map(|v| self.size = v).is_some(),
			"x" => value.as_f64().map(|v| self.x = v).is_some(),
			"y" => value.as_f64().map(|v| self.y = v).is_some(),
			"num_links" => value.as_count().map(|v| self.num_links = Some(v)).is_some(),
			"times_linked" => value
				.as_count()
				.map(|v| self.times_linked = Some(v))
				.is_some(),
			"outgoing" => value.as_count().map(|v| self.outgoing = Some(v)).is_some(),
			"forceLabel" | "force_label" => value.as_bool().map(|v| self.force_label = v).is_some(),
			_ => false,
		};
		if !stored {
			self.extra.insert(name.to_string(), value);
		}
	}
}

/// Attributes carried by every edge.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EdgeAttrs {
	/// Constant weight.
	pub size: f64,
	/// CSS color, inherited from the source depth band.
	pub color: String,
	/// Attributes without a dedicated field.
	pub extra: BTreeMap<String, AttrValue>,
}

/// Stable edge handle. Edges are only ever removed all at once, so indices stay valid
/// until the next [`GraphStore::clear`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeId(pub usize);

/// A stored edge.
#[derive(Clone, Debug, PartialEq)]
pub struct Edge {
	/// Insertion index.
	pub id: EdgeId,
	/// Key of the source node.
	pub source: String,
	/// Key of the target node.
	pub target: String,
	/// Styling and extra attributes.
	pub attrs: EdgeAttrs,
}

impl Edge {
	/// True when `node` is one of the two endpoints.
	pub fn has_extremity(&self, node: &str) -> bool {
		self.source == node || self.target == node
	}
}

/// Mutable node/edge store owned by a single view session.
#[derive(Clone, Debug, Default)]
pub struct GraphStore {
	kind: GraphKind,
	order: Vec<String>,
	nodes: HashMap<String, NodeAttrs>,
	edges: Vec<Edge>,
	edge_index: HashMap<(String, String), EdgeId>,
	adjacency: HashMap<String, BTreeSet<String>>,
	revision: u64,
	generation: u64,
}

impl GraphStore {
	/// Empty store of the given kind.
	pub fn new(kind: GraphKind) -> Self {
		Self {
			kind,
			..Self::default()
		}
	}

	/// Empty directed store.
	pub fn directed() -> Self {
		Self::new(GraphKind::Directed)
	}

	/// Empty undirected store.
	pub fn undirected() -> Self {
		Self::new(GraphKind::Undirected)
	}

	/// Whether edge direction matters.
	pub fn kind(&self) -> GraphKind {
		self.kind
	}

	/// Increases on every mutation.
	pub fn revision(&self) -> u64 {
		self.revision
	}

	/// Increases on every [`GraphStore::clear`].
	pub fn generation(&self) -> u64 {
		self.generation
	}

	/// Number of nodes.
	pub fn node_count(&self) -> usize {
		self.order.len()
	}

	/// Number of edges.
	pub fn edge_count(&self) -> usize {
		self.edges.len()
	}

	/// True without nodes.
	pub fn is_empty(&self) -> bool {
		self.order.is_empty()
	}

	/// True when `key` is a node.
	pub fn has_node(&self, key: &str) -> bool {
		self.nodes.contains_key(key)
	}

	/// The first node ever inserted since the last clear; the traversal root.
	pub fn root(&self) -> Option<&str> {
		self.order.first().map(String::as_str)
	}

	/// Attributes of `key`.
	pub fn node(&self, key: &str) -> Option<&NodeAttrs> {
		self.nodes.get(key)
	}

	/// Inserts a node. Returns `false` and leaves the store untouched when the
	/// key already exists.
	pub fn add_node(&mut self, key: impl Into<String>, attrs: NodeAttrs) -> bool {
		let key = key.into();
		if self.nodes.contains_key(&key) {
			return false;
		}
		self.order.push(key.clone());
		self.nodes.insert(key, attrs);
		self.revision += 1;
		true
	}

	fn edge_key(&self, u: &str, v: &str) -> (String, String) {
		match self.kind {
			GraphKind::Directed => (u.to_string(), v.to_string()),
			GraphKind::Undirected if u <= v => (u.to_string(), v.to_string()),
			GraphKind::Undirected => (v.to_string(), u.to_string()),
		}
	}

	/// Edge existence; ordered for directed graphs, unordered otherwise.
	pub fn has_edge(&self, u: &str, v: &str) -> bool {
		self.edge_index.contains_key(&self.edge_key(u, v))
	}

	/// Inserts an edge between two existing nodes. Returns `Ok(false)` when the
	/// pair is already connected.
	pub fn add_edge(&mut self, u: &str, v: &str, attrs: EdgeAttrs) -> Result<bool> {
		for key in [u, v] {
			if !self.has_node(key) {
				return Err(WikiGraphError::UnknownNode(key.to_string()));
			}
		}
		let index_key = self.edge_key(u, v);
		if self.edge_index.contains_key(&index_key) {
			return Ok(false);
		}

		let id = EdgeId(self.edges.len());
		self.edges.push(Edge {
			id,
			source: u.to_string(),
			target: v.to_string(),
			attrs,
		});
		self.edge_index.insert(index_key, id);
		self.adjacency
			.entry(u.to_string())
			.or_default()
			.insert(v.to_string());
		self.adjacency
			.entry(v.to_string())
			.or_default()
			.insert(u.to_string());
		self.revision += 1;
		Ok(true)
	}

	/// Edge by handle.
	pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
		self.edges.get(id.0)
	}

	/// All nodes connected to `key` in either direction. Unknown keys have none.
	pub fn neighbors(&self, key: &str) -> BTreeSet<String> {
		self.adjacency.get(key).cloned().unwrap_or_default()
	}

	/// Nodes in insertion order.
	pub fn nodes(&self) -> impl Iterator<Item = (&str, &NodeAttrs)> {
		self.order
			.iter()
			.filter_map(|k| self.nodes.get(k).map(|a| (k.as_str(), a)))
	}

	/// Edges in insertion order.
	pub fn edges(&self) -> impl Iterator<Item = &Edge> {
		self.edges.iter()
	}

	/// Sets one node attribute by name.
	pub fn set_node_attribute(&mut self, key: &str, name: &str, value: AttrValue) -> Result<()> {
		let attrs = self
			.nodes
			.get_mut(key)
			.ok_or_else(|| WikiGraphError::UnknownNode(key.to_string()))?;
		attrs.set(name, value);
		self.revision += 1;
		Ok(())
	}

	/// Mutates every node in insertion order.
	pub fn visit_nodes_mut(&mut self, mut f: impl FnMut(&str, &mut NodeAttrs)) {
		for key in &self.order {
			if let Some(attrs) = self.nodes.get_mut(key) {
				f(key, attrs);
			}
		}
		self.revision += 1;
	}

	/// Removes every node and edge.
	pub fn clear(&mut self) {
		self.order.clear();
		self.nodes.clear();
		self.edges.clear();
		self.edge_index.clear();
		self.adjacency.clear();
		self.revision += 1;
		self.generation += 1;
	}

	/// Swaps in the contents of `other`, a freshly loaded graph. Counts as a
	/// clear for anyone tracking [`GraphStore::generation`].
	pub fn replace(&mut self, other: GraphStore) {
		let revision = self.revision.max(other.revision) + 1;
		let generation = self.generation.max(other.generation) + 1;
		*self = other;
		self.revision = revision;
		self.generation = generation;
	}

	/// Clears the store but keeps the root node with its attributes. Returns the
	/// root key, or `None` when the store was empty.
	pub fn reset_to_root(&mut self) -> Option<String> {
		let root = self.root()?.to_string();
		let attrs = self.nodes.get(&root).cloned().unwrap_or_default();
		self.clear();
		self.add_node(root.clone(), attrs);
		Some(root)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn attrs(label: &str) -> NodeAttrs {
		NodeAttrs {
			label: label.into(),
			size: 1.0,
			..NodeAttrs::default()
		}
	}

	#[test]
	fn add_node_is_not_an_upsert() {
		let mut g = GraphStore::directed();
		assert!(g.add_node("A", attrs("A")));
		assert!(!g.add_node("A", attrs("other")));
		assert_eq!(g.node_count(), 1);
		assert_eq!(g.node("A").map(|a| a.label.as_str()), Some("A"));
	}

	#[test]
	fn directed_edges_are_ordered() {
		let mut g = GraphStore::directed();
		g.add_node("A", attrs("A"));
		g.add_node("B", attrs("B"));
		assert!(g.add_edge("A", "B", EdgeAttrs::default()).unwrap());
		assert!(!g.add_edge("A", "B", EdgeAttrs::default()).unwrap());
		assert!(g.add_edge("B", "A", EdgeAttrs::default()).unwrap());
		assert_eq!(g.edge_count(), 2);
		assert_eq!(g.neighbors("A"), BTreeSet::from(["B".to_string()]));
	}

	#[test]
	fn undirected_edges_ignore_order() {
		let mut g = GraphStore::undirected();
		g.add_node("A", attrs("A"));
		g.add_node("B", attrs("B"));
		assert!(g.add_edge("B", "A", EdgeAttrs::default()).unwrap());
		assert!(g.has_edge("A", "B"));
		assert!(!g.add_edge("A", "B", EdgeAttrs::default()).unwrap());
		assert_eq!(g.edge_count(), 1);
	}

	#[test]
	fn edge_to_missing_node_fails() {
		let mut g = GraphStore::directed();
		g.add_node("A", attrs("A"));
		let err = g.add_edge("A", "Z", EdgeAttrs::default()).unwrap_err();
		assert!(matches!(err, WikiGraphError::UnknownNode(k) if k == "Z"));
	}

	#[test]
	fn reset_keeps_root_attributes() {
		let mut g = GraphStore::directed();
		let mut root = attrs("Root");
		root.color = "red".into();
		root.num_links = Some(3);
		g.add_node("Root", root.clone());
		g.add_node("B", attrs("B"));
		g.add_edge("Root", "B", EdgeAttrs::default()).unwrap();
		let generation = g.generation();

		assert_eq!(g.reset_to_root().as_deref(), Some("Root"));
		assert_eq!(g.node_count(), 1);
		assert_eq!(g.edge_count(), 0);
		assert_eq!(g.node("Root"), Some(&root));
		assert_eq!(g.generation(), generation + 1);
		assert!(g.neighbors("Root").is_empty());
	}

	#[test]
	fn set_attribute_routes_by_name() {
		let mut g = GraphStore::directed();
		g.add_node("A", attrs("A"));
		g.set_node_attribute("A", "num_links", AttrValue::Float(12.0)).unwrap();
		g.set_node_attribute("A", "comm", AttrValue::Int(4)).unwrap();
		g.set_node_attribute("A", "forceLabel", AttrValue::Str("true".into())).unwrap();
		g.set_node_attribute("A", "pagerank", AttrValue::Float(0.5)).unwrap();

		let a = g.node("A").unwrap();
		assert_eq!(a.num_links, Some(12));
		assert_eq!(a.comm.as_deref(), Some("4"));
		assert!(a.force_label);
		assert_eq!(a.numeric("pagerank"), Some(0.5));
		assert!(g.set_node_attribute("missing", "size", AttrValue::Int(1)).is_err());
	}

	#[test]
	fn replace_starts_a_new_generation() {
		let mut g = GraphStore::directed();
		g.add_node("A", attrs("A"));
		let (revision, generation) = (g.revision(), g.generation());

		let mut loaded = GraphStore::undirected();
		loaded.add_node("X", attrs("X"));
		loaded.add_node("Y", attrs("Y"));
		loaded.add_edge("X", "Y", EdgeAttrs::default()).unwrap();
		g.replace(loaded);

		assert_eq!(g.kind(), GraphKind::Undirected);
		assert_eq!(g.root(), Some("X"));
		assert!(!g.has_node("A"));
		assert!(g.revision() > revision);
		assert!(g.generation() > generation);
	}

	#[test]
	fn revision_tracks_mutations() {
		let mut g = GraphStore::directed();
		let r0 = g.revision();
		g.add_node("A", attrs("A"));
		assert!(g.revision() > r0);
		let r1 = g.revision();
		g.add_node("A", attrs("A"));
		assert_eq!(g.revision(), r1);
	}
}
