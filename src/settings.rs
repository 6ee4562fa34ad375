//! Render settings for the neighbour view and the metric-to-size mapping.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, WikiGraphError};
use crate::graph::GraphStore;

/// Node metric that drives the rendered node size.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SizeOption {
	/// Outbound link count.
	NumLinks,
	/// Inbound link count.
	TimesLinked,
	/// Outbound edges in a bulk-loaded graph.
	Outgoing,
}

impl SizeOption {
	/// Every option, in selector order.
	pub const ALL: [SizeOption; 3] = [
		SizeOption::NumLinks,
		SizeOption::TimesLinked,
		SizeOption::Outgoing,
	];

	/// Node attribute holding the metric.
	pub fn attr_name(self) -> &'static str {
		match self {
			SizeOption::NumLinks => "num_links",
			SizeOption::TimesLinked => "times_linked",
			SizeOption::Outgoing => "outgoing",
		}
	}

	/// Human readable name for the size selector.
	pub fn label(self) -> &'static str {
		match self {
			SizeOption::NumLinks => "Links",
			SizeOption::TimesLinked => "Times linked",
			SizeOption::Outgoing => "Outgoing",
		}
	}
}

impl fmt::Display for SizeOption {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.attr_name())
	}
}

impl FromStr for SizeOption {
	type Err = WikiGraphError;

	fn from_str(s: &str) -> Result<Self> {
		SizeOption::ALL
			.into_iter()
			.find(|o| o.attr_name() == s)
			.ok_or_else(|| WikiGraphError::InvalidSettings(format!("unknown size option {s:?}")))
	}
}

/// Parameters of the neighbour expansion and of node sizing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
	/// Neighbours fetched per node.
	pub neighbors: usize,
	/// Maximum link-hops from the root.
	pub depth: u32,
	/// Rendered size of the smallest metric value.
	pub min_size: f64,
	/// Rendered size of the largest metric value.
	pub max_size: f64,
	/// Metric mapped onto `[min_size, max_size]`.
	pub size_by: SizeOption,
	/// Size options offered by the settings panel.
	pub possible_size_options: BTreeMap<SizeOption, String>,
}

impl Default for RenderSettings {
	fn default() -> Self {
		Self {
			neighbors: 10,
			depth: 2,
			min_size: 5.0,
			max_size: 25.0,
			size_by: SizeOption::NumLinks,
			possible_size_options: [SizeOption::NumLinks, SizeOption::TimesLinked]
				.into_iter()
				.map(|o| (o, o.label().to_string()))
				.collect(),
		}
	}
}

/// A single edit coming from the settings panel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SettingsChange {
	/// New neighbours-per-node limit; must be positive.
	Neighbors(usize),
	/// New depth limit; at least one.
	Depth(u32),
	/// New smallest node size.
	MinSize(f64),
	/// New largest node size.
	MaxSize(f64),
	/// New size metric.
	SizeBy(SizeOption),
}

/// What the view has to do after a settings change.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SettingsEffect {
	/// Nothing to do.
	Unchanged,
	/// Re-run the size mapping only.
	Resize,
	/// Expand the existing graph further.
	Expand,
	/// Clear the graph down to its root, then expand again. A DFS-expanded graph
	/// cannot be shrunk in place.
	ResetAndExpand,
}

impl RenderSettings {
	/// Rejects zero neighbours or depth and inverted size bounds.
	pub fn validate(&self) -> Result<()> {
		if self.neighbors == 0 {
			return Err(WikiGraphError::InvalidSettings("neighbors must be > 0".into()));
		}
		if self.depth == 0 {
			return Err(WikiGraphError::InvalidSettings("depth must be >= 1".into()));
		}
		check_bounds(self.min_size, self.max_size)
	}

	/// Applies one change and reports the work it requires. Rejected changes
	/// leave the settings untouched.
	pub fn apply(&mut self, change: SettingsChange) -> Result<SettingsEffect> {
		let effect = match change {
			SettingsChange::Neighbors(0) => {
				return Err(WikiGraphError::InvalidSettings("neighbors must be > 0".into()));
			}
			SettingsChange::Neighbors(n) if n == self.neighbors => SettingsEffect::Unchanged,
			SettingsChange::Neighbors(n) => {
				let effect = if n < self.neighbors {
					SettingsEffect::ResetAndExpand
				} else {
					SettingsEffect::Expand
				};
				self.neighbors = n;
				effect
			}
			SettingsChange::Depth(0) => {
				return Err(WikiGraphError::InvalidSettings("depth must be >= 1".into()));
			}
			SettingsChange::Depth(d) if d == self.depth => SettingsEffect::Unchanged,
			SettingsChange::Depth(d) => {
				self.depth = d;
				SettingsEffect::ResetAndExpand
			}
			SettingsChange::MinSize(v) => {
				check_bounds(v, self.max_size)?;
				let changed = v != self.min_size;
				self.min_size = v;
				resize_if(changed)
			}
			SettingsChange::MaxSize(v) => {
				check_bounds(self.min_size, v)?;
				let changed = v != self.max_size;
				self.max_size = v;
				resize_if(changed)
			}
			SettingsChange::SizeBy(option) => {
				if !self.possible_size_options.contains_key(&option) {
					return Err(WikiGraphError::InvalidSettings(format!(
						"graph has no {option} attribute"
					)));
				}
				let changed = option != self.size_by;
				self.size_by = option;
				resize_if(changed)
			}
		};
		Ok(effect)
	}
}

fn resize_if(changed: bool) -> SettingsEffect {
	if changed {
		SettingsEffect::Resize
	} else {
		SettingsEffect::Unchanged
	}
}

fn check_bounds(min: f64, max: f64) -> Result<()> {
	if !min.is_finite() || !max.is_finite() || min > max {
		return Err(WikiGraphError::InvalidSettings(format!(
			"size bounds {min}..{max} are invalid"
		)));
	}
	Ok(())
}

/// Clamps `value` into `[min, max]`; NaN maps to `min`.
pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
	if value.is_nan() {
		return min;
	}
	value.min(max).max(min)
}

/// Linear interpolation from `x` (`a = 0`) to `y` (`a = 1`).
pub fn lerp(x: f64, y: f64, a: f64) -> f64 {
	x * (1.0 - a) + y * a
}

/// Position of `a` between `x` and `y`, clamped to `[0, 1]`.
pub fn invlerp(x: f64, y: f64, a: f64) -> f64 {
	clamp((a - x) / (y - x), 0.0, 1.0)
}

/// Linearly maps `a` from `[source_min, source_max]` onto `[target_min, target_max]`,
/// clamping at both ends. A degenerate source range maps everything to `target_min`.
pub fn range(source_min: f64, source_max: f64, target_min: f64, target_max: f64, a: f64) -> f64 {
	if source_min == source_max {
		return target_min;
	}
	lerp(target_min, target_max, invlerp(source_min, source_max, a))
}

/// Minimum and maximum of a metric over all nodes that carry it.
pub fn metric_bounds(graph: &GraphStore, size_by: SizeOption) -> Option<(f64, f64)> {
	graph
		.nodes()
		.filter_map(|(_, attrs)| attrs.numeric(size_by.attr_name()))
		.fold(None, |acc, v| match acc {
			None => Some((v, v)),
			Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
		})
}

/// Rescales every node's size from its `size_by` metric into the configured
/// bounds. Nodes without the metric get `min_size`.
pub fn resize_nodes(graph: &mut GraphStore, settings: &RenderSettings) {
	let bounds = metric_bounds(graph, settings.size_by);
	let attr = settings.size_by.attr_name();
	graph.visit_nodes_mut(|_, attrs| {
		attrs.size = match (bounds, attrs.numeric(attr)) {
			(Some((lo, hi)), Some(v)) => range(lo, hi, settings.min_size, settings.max_size, v),
			_ => settings.min_size,
		};
	});
}

/// Size options backed by at least one node of `graph`.
pub fn available_size_options(graph: &GraphStore) -> BTreeMap<SizeOption, String> {
	SizeOption::ALL
		.into_iter()
		.filter(|o| graph.nodes().any(|(_, a)| a.numeric(o.attr_name()).is_some()))
		.map(|o| (o, o.label().to_string()))
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::graph::NodeAttrs;

	#[test]
	fn range_hits_both_targets() {
		assert_eq!(range(10.0, 110.0, 5.0, 25.0, 10.0), 5.0);
		assert_eq!(range(10.0, 110.0, 5.0, 25.0, 110.0), 25.0);
		assert_eq!(range(10.0, 110.0, 5.0, 25.0, 60.0), 15.0);
	}

	#[test]
	fn range_clamps_outside_source() {
		assert_eq!(range(0.0, 10.0, 1.0, 2.0, -5.0), 1.0);
		assert_eq!(range(0.0, 10.0, 1.0, 2.0, 50.0), 2.0);
		assert_eq!(range(0.0, 10.0, 1.0, 2.0, f64::NAN), 1.0);
	}

	#[test]
	fn degenerate_source_maps_to_target_min() {
		for a in [-1.0, 3.0, 3.5, 1e9] {
			assert_eq!(range(3.0, 3.0, 5.0, 25.0, a), 5.0);
		}
	}

	#[test]
	fn clamp_handles_nan() {
		assert_eq!(clamp(f64::NAN, 2.0, 20.0), 2.0);
		assert_eq!(clamp(50.0, 2.0, 20.0), 20.0);
		assert_eq!(clamp(7.0, 2.0, 20.0), 7.0);
	}

	#[test]
	fn neighbour_changes_pick_the_right_effect() {
		let mut s = RenderSettings::default();
		assert_eq!(s.apply(SettingsChange::Neighbors(10)).unwrap(), SettingsEffect::Unchanged);
		assert_eq!(s.apply(SettingsChange::Neighbors(20)).unwrap(), SettingsEffect::Expand);
		assert_eq!(
			s.apply(SettingsChange::Neighbors(5)).unwrap(),
			SettingsEffect::ResetAndExpand
		);
		assert_eq!(s.neighbors, 5);
		assert!(s.apply(SettingsChange::Neighbors(0)).is_err());
		assert_eq!(s.neighbors, 5);
	}

	#[test]
	fn depth_change_always_resets() {
		let mut s = RenderSettings::default();
		assert_eq!(s.apply(SettingsChange::Depth(3)).unwrap(), SettingsEffect::ResetAndExpand);
		assert_eq!(s.apply(SettingsChange::Depth(1)).unwrap(), SettingsEffect::ResetAndExpand);
		assert_eq!(s.apply(SettingsChange::Depth(1)).unwrap(), SettingsEffect::Unchanged);
		assert!(s.apply(SettingsChange::Depth(0)).is_err());
	}

	#[test]
	fn size_bounds_stay_ordered() {
		let mut s = RenderSettings::default();
		assert!(s.apply(SettingsChange::MinSize(30.0)).is_err());
		assert_eq!(s.min_size, 5.0);
		assert_eq!(s.apply(SettingsChange::MaxSize(40.0)).unwrap(), SettingsEffect::Resize);
		assert_eq!(s.apply(SettingsChange::MinSize(30.0)).unwrap(), SettingsEffect::Resize);
		assert!(s.validate().is_ok());
	}

	#[test]
	fn size_by_must_be_offered() {
		let mut s = RenderSettings::default();
		assert!(s.apply(SettingsChange::SizeBy(SizeOption::Outgoing)).is_err());
		assert_eq!(
			s.apply(SettingsChange::SizeBy(SizeOption::TimesLinked)).unwrap(),
			SettingsEffect::Resize
		);
	}

	#[test]
	fn resize_maps_metric_into_bounds() {
		let mut g = GraphStore::directed();
		for (key, links) in [("a", Some(10)), ("b", Some(30)), ("c", None)] {
			g.add_node(
				key,
				NodeAttrs {
					num_links: links,
					..NodeAttrs::default()
				},
			);
		}
		let settings = RenderSettings::default();
		resize_nodes(&mut g, &settings);
		assert_eq!(g.node("a").unwrap().size, 5.0);
		assert_eq!(g.node("b").unwrap().size, 25.0);
		assert_eq!(g.node("c").unwrap().size, 5.0);
	}

	#[test]
	fn size_options_follow_graph_attributes() {
		let mut g = GraphStore::directed();
		g.add_node(
			"a",
			NodeAttrs {
				outgoing: Some(2),
				..NodeAttrs::default()
			},
		);
		let opts = available_size_options(&g);
		assert_eq!(opts.keys().copied().collect::<Vec<_>>(), vec![SizeOption::Outgoing]);
	}

	#[test]
	fn settings_deserialize_with_defaults() {
		let s: RenderSettings = serde_json::from_str(r#"{"depth": 3, "size_by": "times_linked"}"#).unwrap();
		assert_eq!(s.depth, 3);
		assert_eq!(s.neighbors, 10);
		assert_eq!(s.size_by, SizeOption::TimesLinked);
		assert_eq!("outgoing".parse::<SizeOption>().unwrap(), SizeOption::Outgoing);
	}
}
