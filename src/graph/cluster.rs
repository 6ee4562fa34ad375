//! Community aggregation over the `comm` node attribute.

use std::collections::BTreeMap;

use super::store::GraphStore;

/// One precomputed community, as listed in the cluster panel.
#[derive(Clone, Debug, PartialEq)]
pub struct Cluster {
	/// Value of the `comm` attribute.
	pub id: String,
	/// Color of the first node seen in this community.
	pub color: String,
	/// Nodes in the community.
	pub num_nodes: usize,
}

/// Counts the nodes of every community with one scan over the graph.
///
/// Nodes without a `comm` attribute belong to no cluster. Recompute whenever
/// the store is replaced or bulk-loaded; expansion does not maintain it.
pub fn clusters(graph: &GraphStore) -> BTreeMap<String, Cluster> {
	let mut out: BTreeMap<String, Cluster> = BTreeMap::new();
	for (_, attrs) in graph.nodes() {
		let Some(comm) = &attrs.comm else {
			continue;
		};
		out.entry(comm.clone())
			.and_modify(|c| c.num_nodes += 1)
			.or_insert_with(|| Cluster {
				id: comm.clone(),
				color: attrs.color.clone(),
				num_nodes: 1,
			});
	}
	out
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::graph::store::NodeAttrs;

	fn node(comm: Option<&str>, color: &str) -> NodeAttrs {
		NodeAttrs {
			comm: comm.map(str::to_string),
			color: color.into(),
			..NodeAttrs::default()
		}
	}

	#[test]
	fn counts_members_and_keeps_first_color() {
		let mut g = GraphStore::undirected();
		g.add_node("a", node(Some("1"), "#111111"));
		g.add_node("b", node(Some("1"), "#222222"));
		g.add_node("c", node(Some("2"), "#333333"));
		g.add_node("d", node(None, "#444444"));

		let cs = clusters(&g);
		assert_eq!(cs.len(), 2);
		assert_eq!(cs["1"].num_nodes, 2);
		assert_eq!(cs["1"].color, "#111111");
		assert_eq!(cs["2"].num_nodes, 1);
	}

	#[test]
	fn empty_graph_has_no_clusters() {
		assert!(clusters(&GraphStore::directed()).is_empty());
	}
}
