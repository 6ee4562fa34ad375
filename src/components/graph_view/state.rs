//! Simulation state mirroring a [`GraphStore`].
//!
//! The store is the source of truth; this side only owns what the canvas
//! needs on top of it (physics positions, view transform, pointer state).
//! [`GraphViewState::sync`] catches up with the store using its revision and
//! generation counters: new nodes and edges are appended to the running
//! simulation, and a cleared store rebuilds it.

use std::collections::{HashMap, HashSet};

use force_graph::{DefaultNodeIdx, EdgeData, ForceGraph, NodeData, SimulationParameters};

use super::scale::{ScaleConfig, ScaledValues};
use crate::graph::{Edge, GraphKind, GraphStore};

/// Per-node payload in the simulation: the store key.
#[derive(Clone, Debug, Default)]
pub struct NodeInfo {
	/// Key of the node in the [`GraphStore`].
	pub key: String,
}

/// Pan and zoom transform applied to the entire graph view.
#[derive(Clone, Debug, Default)]
pub struct ViewTransform {
	/// Horizontal translation in screen pixels.
	pub x: f64,
	/// Vertical translation in screen pixels.
	pub y: f64,
	/// Zoom factor, clamped to the configured bounds.
	pub k: f64,
}

/// Tracks an in-progress node drag operation.
#[derive(Clone, Debug, Default)]
pub struct DragState {
	/// A node is being dragged.
	pub active: bool,
	/// The pointer moved while pressed; the release is not a click.
	pub moved: bool,
	/// Node under the pointer when the drag started.
	pub node_idx: Option<DefaultNodeIdx>,
	/// Pointer position at press, screen pixels.
	pub start_x: f64,
	/// See `start_x`.
	pub start_y: f64,
	/// Node position at press, world units.
	pub node_start_x: f32,
	/// See `node_start_x`.
	pub node_start_y: f32,
}

/// Tracks an in-progress canvas pan operation.
#[derive(Clone, Debug, Default)]
pub struct PanState {
	/// The canvas is being panned.
	pub active: bool,
	/// Pointer position at press, screen pixels.
	pub start_x: f64,
	/// See `start_x`.
	pub start_y: f64,
	/// Translation at press.
	pub transform_start_x: f64,
	/// See `transform_start_x`.
	pub transform_start_y: f64,
}

fn simulation() -> ForceGraph<NodeInfo, ()> {
	ForceGraph::new(SimulationParameters {
		force_charge: 150.0,
		force_spring: 0.05,
		force_max: 100.0,
		node_speed: 3000.0,
		damping_factor: 0.9,
	})
}

/// Screen-ready geometry of one store edge, in world coordinates.
pub struct EdgeSegment<'a> {
	/// The store edge drawn.
	pub edge: &'a Edge,
	/// Position of `edge.source`.
	pub from: (f64, f64),
	/// Position of `edge.target`.
	pub to: (f64, f64),
}

/// Everything the canvas keeps between frames.
pub struct GraphViewState {
	/// Force simulation mirroring the store.
	pub graph: ForceGraph<NodeInfo, ()>,
	/// Current pan and zoom.
	pub transform: ViewTransform,
	/// Node drag in progress.
	pub drag: DragState,
	/// Canvas pan in progress.
	pub pan: PanState,
	/// Node under the pointer.
	pub hovered: Option<DefaultNodeIdx>,
	/// Canvas size in CSS pixels.
	pub width: f64,
	/// See `width`.
	pub height: f64,
	/// The simulation still moves; keeps the frame loop alive.
	pub animation_running: bool,
	/// Draw arrow heads.
	pub directed: bool,
	index: HashMap<String, DefaultNodeIdx>,
	/// Node pairs joined by a spring, smaller index first. Two-way links share one.
	springs: HashSet<(DefaultNodeIdx, DefaultNodeIdx)>,
	synced_revision: Option<u64>,
	synced_generation: u64,
	synced_edges: usize,
}

impl GraphViewState {
	/// Empty view centred in a `width` x `height` canvas.
	pub fn new(width: f64, height: f64) -> Self {
		Self {
			graph: simulation(),
			transform: ViewTransform {
				x: width / 2.0,
				y: height / 2.0,
				k: 1.0,
			},
			drag: DragState::default(),
			pan: PanState::default(),
			hovered: None,
			width,
			height,
			animation_running: true,
			directed: true,
			index: HashMap::new(),
			springs: HashSet::new(),
			synced_revision: None,
			synced_generation: 0,
			synced_edges: 0,
		}
	}

	/// Brings the simulation up to date with `store`. Returns whether anything changed.
	pub fn sync(&mut self, store: &GraphStore, config: &ScaleConfig) -> bool {
		if store.generation() != self.synced_generation {
			self.graph = simulation();
			self.index.clear();
			self.springs.clear();
			self.synced_edges = 0;
			self.synced_revision = None;
			self.synced_generation = store.generation();
			self.hovered = None;
			self.drag = DragState::default();
		}
		if self.synced_revision == Some(store.revision()) {
			return false;
		}
		self.directed = store.kind() == GraphKind::Directed;

		for (key, attrs) in store.nodes() {
			if self.index.contains_key(key) {
				continue;
			}
			let idx = self.graph.add_node(NodeData {
				x: ((attrs.x - 25.0) * config.layout_spread) as f32,
				y: ((attrs.y - 10.0) * config.layout_spread) as f32,
				mass: 10.0,
				is_anchor: false,
				user_data: NodeInfo { key: key.to_string() },
			});
			self.index.insert(key.to_string(), idx);
		}

		for edge in store.edges().skip(self.synced_edges) {
			let (Some(src), Some(tgt)) = (self.node_index(&edge.source), self.node_index(&edge.target)) else {
				continue;
			};
			let pair = if src <= tgt { (src, tgt) } else { (tgt, src) };
			if src != tgt && self.springs.insert(pair) {
				self.graph.add_edge(src, tgt, EdgeData::default());
			}
		}
		self.synced_edges = store.edge_count();
		self.synced_revision = Some(store.revision());
		self.animation_running = true;
		true
	}

	/// Simulation index of the store node `key`.
	pub fn node_index(&self, key: &str) -> Option<DefaultNodeIdx> {
		self.index.get(key).copied()
	}

	/// Number of distinct node pairs held together by the simulation.
	pub fn spring_count(&self) -> usize {
		self.springs.len()
	}

	/// Current endpoints of every store edge, oriented source to target. Both
	/// directions of a two-way link are returned.
	pub fn edge_segments<'a>(&self, store: &'a GraphStore) -> Vec<EdgeSegment<'a>> {
		let mut positions = HashMap::with_capacity(self.index.len());
		self.graph.visit_nodes(|node| {
			positions.insert(node.index(), (node.x() as f64, node.y() as f64));
		});
		store
			.edges()
			.filter_map(|edge| {
				let from = positions.get(&self.node_index(&edge.source)?)?;
				let to = positions.get(&self.node_index(&edge.target)?)?;
				Some(EdgeSegment {
					edge,
					from: *from,
					to: *to,
				})
			})
			.collect()
	}

	/// Converts canvas coordinates to world coordinates.
	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	/// Topmost node under a screen position, sized as `store` currently says.
	pub fn node_at_position(
		&self,
		sx: f64,
		sy: f64,
		store: &GraphStore,
		config: &ScaleConfig,
	) -> Option<(DefaultNodeIdx, String)> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		let scale = ScaledValues::new(config, self.transform.k);
		let mut found = None;
		self.graph.visit_nodes(|node| {
			let Some(attrs) = store.node(&node.data.user_data.key) else {
				return;
			};
			let (dx, dy) = (node.x() as f64 - gx, node.y() as f64 - gy);
			if (dx * dx + dy * dy).sqrt() < scale.node_radius(attrs.size) + scale.hit_slop {
				found = Some((node.index(), node.data.user_data.key.clone()));
			}
		});
		found
	}

	/// Advances the simulation by `dt` seconds.
	pub fn tick(&mut self, dt: f32) {
		self.graph.update(dt);
	}

	/// Records a new canvas size.
	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}

	/// Zooms by `factor` around a screen position.
	pub fn zoom_at(&mut self, x: f64, y: f64, factor: f64, config: &ScaleConfig) {
		let new_k = (self.transform.k * factor).clamp(config.min_k, config.max_k);
		let ratio = new_k / self.transform.k;
		self.transform.x = x - (x - self.transform.x) * ratio;
		self.transform.y = y - (y - self.transform.y) * ratio;
		self.transform.k = new_k;
	}

	/// Recenters the view at zoom 1.
	pub fn reset_view(&mut self) {
		self.transform = ViewTransform {
			x: self.width / 2.0,
			y: self.height / 2.0,
			k: 1.0,
		};
	}
}
