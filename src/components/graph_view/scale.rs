//! Zoom-dependent scaling of graph visuals.
//!
//! Node sizes stored in the graph are screen pixels at zoom 1. Everything is
//! converted to world units here, once per frame, before drawing under the
//! canvas transform.

/// How a visual property scales with zoom level.
#[derive(Clone, Debug)]
pub enum ScaleBehavior {
	/// Constant screen-space size (pixels). Unaffected by zoom.
	Screen,
	/// World-space scaling, clamped to min/max screen-space bounds.
	Clamped { min_screen: f64, max_screen: f64 },
}

impl ScaleBehavior {
	/// World-space value for `base` at zoom `k`.
	pub fn apply(&self, base: f64, k: f64) -> f64 {
		match self {
			ScaleBehavior::Screen => base / k,
			ScaleBehavior::Clamped {
				min_screen,
				max_screen,
			} => base.clamp(min_screen / k, max_screen / k),
		}
	}
}

/// Complete scale configuration for all graph elements.
#[derive(Clone, Debug)]
pub struct ScaleConfig {
	/// World units per unit of node `size`.
	pub node_unit: f64,
	/// How node radii follow the zoom.
	pub node_behavior: ScaleBehavior,
	/// Extra pick radius around nodes, in screen pixels.
	pub hit_slop: f64,
	/// Label font size in screen pixels.
	pub label_size: f64,
	/// Labels of nodes rendered smaller than this (screen pixels) are skipped
	/// unless forced.
	pub label_threshold: f64,
	/// Line width per unit of edge `size`, in screen pixels.
	pub edge_width: f64,
	/// Arrow head length in screen pixels; directed graphs only.
	pub arrow_size: f64,
	/// Below this zoom level arrows are dropped.
	pub arrow_min_k: f64,
	/// Hover ring stroke width in screen pixels.
	pub ring_width: f64,
	/// Hover ring distance from the node edge in screen pixels.
	pub ring_offset: f64,
	/// Lower zoom bound.
	pub min_k: f64,
	/// Upper zoom bound.
	pub max_k: f64,
	/// Graph layout coordinates are multiplied by this when a node enters the
	/// simulation.
	pub layout_spread: f64,
}

impl Default for ScaleConfig {
	fn default() -> Self {
		Self {
			node_unit: 1.0,
			node_behavior: ScaleBehavior::Clamped {
				min_screen: 2.0,
				max_screen: 60.0,
			},
			hit_slop: 3.0,
			label_size: 12.0,
			label_threshold: 6.0,
			edge_width: 1.0,
			arrow_size: 6.0,
			arrow_min_k: 0.4,
			ring_width: 1.5,
			ring_offset: 2.0,
			min_k: 0.05,
			max_k: 10.0,
			layout_spread: 8.0,
		}
	}
}

/// Pre-computed scale values for a specific zoom level.
///
/// Create this once per frame and pass it to rendering functions.
/// All sizes are in world-space (ready to use after canvas transform).
#[derive(Clone, Debug)]
pub struct ScaledValues {
	/// Zoom level these values were computed for.
	pub k: f64,
	node_unit: f64,
	node_behavior: ScaleBehavior,
	/// Extra pick radius, in world units.
	pub hit_slop: f64,
	/// Canvas `font` string, sized for this zoom.
	pub label_font: String,
	label_threshold: f64,
	/// Edge line width per unit of edge `size`.
	pub edge_width: f64,
	/// Zero when arrows are culled at this zoom.
	pub arrow_size: f64,
	/// Hover ring stroke width.
	pub ring_width: f64,
	/// Hover ring distance from the node edge.
	pub ring_offset: f64,
}

impl ScaledValues {
	/// Resolves `config` at zoom `k`.
	pub fn new(config: &ScaleConfig, k: f64) -> Self {
		Self {
			k,
			node_unit: config.node_unit,
			node_behavior: config.node_behavior.clone(),
			hit_slop: ScaleBehavior::Screen.apply(config.hit_slop, k),
			label_font: format!("{}px sans-serif", config.label_size / k),
			label_threshold: config.label_threshold,
			edge_width: ScaleBehavior::Screen.apply(config.edge_width, k),
			arrow_size: if k < config.arrow_min_k {
				0.0
			} else {
				ScaleBehavior::Screen.apply(config.arrow_size, k)
			},
			ring_width: ScaleBehavior::Screen.apply(config.ring_width, k),
			ring_offset: ScaleBehavior::Screen.apply(config.ring_offset, k),
		}
	}

	/// World-space radius of a node of the given `size`.
	pub fn node_radius(&self, size: f64) -> f64 {
		self.node_behavior.apply(size.max(0.0) * self.node_unit, self.k)
	}

	/// Whether a node of world radius `radius` is large enough on screen to be labeled.
	pub fn shows_label(&self, radius: f64) -> bool {
		radius * self.k >= self.label_threshold
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn node_radius_is_clamped_on_screen() {
		let config = ScaleConfig::default();
		let far = ScaledValues::new(&config, 0.1);
		assert_eq!(far.node_radius(5.0), 20.0);
		let near = ScaledValues::new(&config, 1.0);
		assert_eq!(near.node_radius(5.0), 5.0);
		assert_eq!(near.node_radius(100.0), 60.0);
	}

	#[test]
	fn arrows_drop_when_zoomed_out() {
		let config = ScaleConfig::default();
		assert_eq!(ScaledValues::new(&config, 0.2).arrow_size, 0.0);
		assert_eq!(ScaledValues::new(&config, 2.0).arrow_size, 3.0);
	}

	#[test]
	fn labels_follow_rendered_size() {
		let s = ScaledValues::new(&ScaleConfig::default(), 0.5);
		assert!(!s.shows_label(10.0));
		assert!(s.shows_label(12.0));
	}
}
