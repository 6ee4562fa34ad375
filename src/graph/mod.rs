//! Link graph data model: the mutable store, community aggregation and the
//! GraphML bulk format.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

pub mod cluster;
pub mod graphml;
pub mod store;

pub use cluster::{Cluster, clusters};
pub use graphml::parse_graphml;
pub use store::{AttrValue, Edge, EdgeAttrs, EdgeId, GraphKind, GraphStore, NodeAttrs};

/// Simple pseudo-random function (deterministic)
fn pseudo_random(seed: f64) -> f64 {
	let x = (seed * 12.9898 + seed * 78.233).sin() * 43758.5453;
	x - x.floor()
}

/// Initial layout hint for a node: a point in `[0, 50) x [0, 20)` derived from
/// the key, so repeated expansions place the same page at the same spot.
pub fn scatter(key: &str) -> (f64, f64) {
	let mut hasher = DefaultHasher::new();
	key.hash(&mut hasher);
	let seed = (hasher.finish() % 100_000) as f64 + 1.0;
	(pseudo_random(seed * 1.1) * 50.0, pseudo_random(seed * 2.3) * 20.0)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn scatter_is_stable_and_bounded() {
		let a = scatter("Berlin");
		assert_eq!(a, scatter("Berlin"));
		assert!((0.0..50.0).contains(&a.0));
		assert!((0.0..20.0).contains(&a.1));
		assert_ne!(a, scatter("Paris"));
	}
}
