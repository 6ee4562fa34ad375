//! Depth-bounded neighbour expansion.
//!
//! Starting at a root page, every fetched neighbour that is new to the graph is
//! added with a depth-derived color and, while the depth limit allows, expanded
//! in turn. Sibling subtrees are expanded concurrently: the children of one
//! node are driven together with `join_all`, so their fetches overlap.
//!
//! All graph mutation for one parent (node existence checks, node inserts and
//! edge inserts) happens in a single critical section that never spans an
//! await point, so two branches discovering the same page cannot both insert it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::future::{FutureExt, LocalBoxFuture, join_all};
use log::{debug, info, warn};

use super::fetcher::NeighborFetcher;
use crate::api::PageLink;
use crate::graph::{EdgeAttrs, GraphStore, NodeAttrs, scatter};
use crate::settings::{RenderSettings, clamp};

/// Depth-indexed node colors, root band first.
// https://www.learnui.design/tools/data-color-picker.html
/// See [`level_color`].
pub const LEVEL_COLORS: [&str; 7] = [
	"#003f5c", "#374c80", "#7a5195", "#bc5090", "#ef5675", "#ff764a", "#ffa600",
];

/// Palette entry for `depth`; depths past the palette reuse the last color.
pub fn level_color(depth: usize) -> &'static str {
	LEVEL_COLORS[depth.min(LEVEL_COLORS.len() - 1)]
}

/// Default size of a freshly discovered node: its link count clamped into `[2, 20]`.
pub fn default_node_size(link: &PageLink) -> f64 {
	clamp(link.num_links.map_or(f64::NAN, |v| v as f64), 2.0, 20.0)
}

/// A graph shared between the view and its expansion tasks.
pub type SharedGraph = Arc<Mutex<GraphStore>>;

/// Locks a graph, recovering the data if a previous holder panicked.
pub fn lock_graph(graph: &Mutex<GraphStore>) -> MutexGuard<'_, GraphStore> {
	graph.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Cooperative cancellation flag shared by an expansion session and its owner.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
	/// A token that is not cancelled.
	pub fn new() -> Self {
		Self::default()
	}

	/// Cancels every clone of this token.
	pub fn cancel(&self) {
		self.0.store(true, Ordering::SeqCst);
	}

	/// True once any clone was cancelled.
	pub fn is_cancelled(&self) -> bool {
		self.0.load(Ordering::SeqCst)
	}
}

/// Parameters of one expansion run.
#[derive(Clone, Copy, Debug)]
pub struct ExpandSettings {
	/// Nodes at this depth are added but not expanded.
	pub max_depth: u32,
	/// Neighbours fetched per node; `None` fetches all of them.
	pub neighbor_limit: Option<usize>,
	/// Initial size of a new node.
	pub calc_size: fn(&PageLink) -> f64,
}

impl Default for ExpandSettings {
	fn default() -> Self {
		Self {
			max_depth: 1,
			neighbor_limit: None,
			calc_size: default_node_size,
		}
	}
}

impl From<&RenderSettings> for ExpandSettings {
	fn from(s: &RenderSettings) -> Self {
		Self {
			max_depth: s.depth,
			neighbor_limit: Some(s.neighbors),
			..Self::default()
		}
	}
}

/// The page an expansion starts from.
#[derive(Clone, Debug, PartialEq)]
pub struct RootNode {
	/// Page title; also the node key.
	pub title: String,
	/// Fill of the root node.
	pub color: String,
	/// Outbound link count, if known.
	pub num_links: Option<u64>,
	/// Inbound link count, if known.
	pub times_linked: Option<u64>,
}

impl RootNode {
	/// Neutral root of the standalone neighbour view.
	pub fn new(title: impl Into<String>) -> Self {
		Self {
			title: title.into(),
			color: "gray".into(),
			num_links: None,
			times_linked: None,
		}
	}

	/// Highlighted root of a page's detail view, carrying its counters.
	pub fn page(title: impl Into<String>, num_links: Option<u64>, times_linked: Option<u64>) -> Self {
		Self {
			title: title.into(),
			color: "red".into(),
			num_links,
			times_linked,
		}
	}

	fn attrs(&self) -> NodeAttrs {
		let (x, y) = scatter(&self.title);
		NodeAttrs {
			label: self.title.clone(),
			size: 10.0,
			color: self.color.clone(),
			x,
			y,
			num_links: self.num_links,
			times_linked: self.times_linked,
			..NodeAttrs::default()
		}
	}
}

/// Outcome of an expansion. Failures of single branches are collected here
/// instead of aborting the run.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExpansionReport {
	/// Nodes inserted by this run, root included when it was new.
	pub nodes_added: usize,
	/// Edges inserted by this run.
	pub edges_added: usize,
	/// Neighbour requests started.
	pub fetches: usize,
	/// Pages without link data.
	pub not_found: Vec<String>,
	/// Pages whose fetch failed, with the error text.
	pub failures: Vec<(String, String)>,
	/// The run stopped early because its token was cancelled.
	pub cancelled: bool,
}

/// Expands one graph from a root page through a [`NeighborFetcher`].
pub struct Expander<'a, F: ?Sized> {
	graph: &'a Mutex<GraphStore>,
	fetcher: &'a F,
	wiki: &'a str,
	settings: ExpandSettings,
	cancel: CancelToken,
	report: Mutex<ExpansionReport>,
}

impl<'a, F: NeighborFetcher + ?Sized> Expander<'a, F> {
	/// Expander writing into `graph` with a token nobody else holds.
	pub fn new(graph: &'a Mutex<GraphStore>, fetcher: &'a F, wiki: &'a str, settings: ExpandSettings) -> Self {
		Self {
			graph,
			fetcher,
			wiki,
			settings,
			cancel: CancelToken::new(),
			report: Mutex::new(ExpansionReport::default()),
		}
	}

	/// Ties the run to `token`; once cancelled, no further fetch is started and
	/// the graph is not mutated again.
	pub fn with_cancel(mut self, token: CancelToken) -> Self {
		self.cancel = token;
		self
	}

	/// Adds `root` if the graph does not have it yet, then expands from it.
	pub async fn run(self, root: &RootNode) -> ExpansionReport {
		{
			let mut graph = lock_graph(self.graph);
			if self.cancel.is_cancelled() {
				return ExpansionReport {
					cancelled: true,
					..ExpansionReport::default()
				};
			}
			if graph.add_node(root.title.clone(), root.attrs()) {
				self.report_mut().nodes_added += 1;
			}
		}

		self.expand_from(root.title.clone(), 1).await;

		let report = self.report.into_inner().unwrap_or_else(PoisonError::into_inner);
		info!(
			"wiki-graph: expanded {:?} ({} nodes, {} edges, {} fetches, {} failed)",
			root.title,
			report.nodes_added,
			report.edges_added,
			report.fetches,
			report.failures.len()
		);
		report
	}

	fn report_mut(&self) -> MutexGuard<'_, ExpansionReport> {
		self.report.lock().unwrap_or_else(PoisonError::into_inner)
	}

	fn expand_from(&self, parent: String, depth: u32) -> LocalBoxFuture<'_, ()> {
		async move {
			if self.cancel.is_cancelled() {
				self.report_mut().cancelled = true;
				return;
			}
			self.report_mut().fetches += 1;

			let links = match self
				.fetcher
				.fetch(self.wiki, &parent, self.settings.neighbor_limit)
				.await
			{
				Ok(links) => links,
				Err(e) if e.is_not_found() => {
					debug!("wiki-graph: no link data for {parent:?}");
					self.report_mut().not_found.push(parent);
					return;
				}
				Err(e) => {
					warn!("wiki-graph: fetching neighbours of {parent:?} failed: {e}");
					self.report_mut().failures.push((parent, e.to_string()));
					return;
				}
			};

			let Some(children) = self.attach(&parent, depth, links) else {
				self.report_mut().cancelled = true;
				return;
			};

			join_all(
				children
					.into_iter()
					.map(|child| self.expand_from(child, depth + 1)),
			)
			.await;
		}
		.boxed_local()
	}

	/// Inserts the fetched neighbours of `parent` and returns those to expand
	/// next. `None` when the run was cancelled while the fetch was in flight.
	fn attach(&self, parent: &str, depth: u32, links: Vec<PageLink>) -> Option<Vec<String>> {
		let mut graph = lock_graph(self.graph);
		if self.cancel.is_cancelled() {
			return None;
		}
		let mut report = self.report_mut();
		let mut children = Vec::new();

		for link in links {
			let title = link.page_title.clone();
			if !graph.has_node(&title) {
				let (x, y) = scatter(&title);
				graph.add_node(
					title.clone(),
					NodeAttrs {
						label: title.clone(),
						size: (self.settings.calc_size)(&link),
						color: level_color(depth as usize).to_string(),
						x,
						y,
						num_links: link.num_links,
						times_linked: link.times_linked,
						..NodeAttrs::default()
					},
				);
				report.nodes_added += 1;
				if depth < self.settings.max_depth {
					children.push(title.clone());
				}
			}

			let edge = EdgeAttrs {
				size: 1.0,
				color: level_color(depth.saturating_sub(1) as usize).to_string(),
				..EdgeAttrs::default()
			};
			match graph.add_edge(parent, &title, edge) {
				Ok(true) => report.edges_added += 1,
				Ok(false) => {}
				Err(e) => warn!("wiki-graph: dropping edge {parent:?} -> {title:?}: {e}"),
			}
		}
		Some(children)
	}
}

/// Expands `graph` around `root` with a fresh, uncancellable session.
pub async fn expand<F: NeighborFetcher + ?Sized>(
	graph: &Mutex<GraphStore>,
	root: &RootNode,
	fetcher: &F,
	wiki: &str,
	settings: ExpandSettings,
) -> ExpansionReport {
	Expander::new(graph, fetcher, wiki, settings).run(root).await
}
