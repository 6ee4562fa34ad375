//! GraphML reader for the precomputed "top pages" subgraphs.
//!
//! Supports the subset written by common graph tools: `<key>` declarations
//! with `attr.name`/`attr.type` and optional `<default>`, one `<graph>` with
//! `edgedefault`, and `<node>`/`<edge>` elements carrying `<data>` children.

use std::collections::HashMap;

use log::debug;
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use super::scatter;
use super::store::{AttrValue, EdgeAttrs, GraphKind, GraphStore, NodeAttrs};
use crate::error::{Result, WikiGraphError};

#[derive(Clone, Copy, Debug, PartialEq)]
enum Domain {
	Node,
	Edge,
	All,
}

#[derive(Clone, Copy, Debug)]
enum ValueType {
	Bool,
	Int,
	Float,
	Text,
}

#[derive(Clone, Debug)]
struct KeyDef {
	name: String,
	domain: Domain,
	ty: ValueType,
	default: Option<String>,
}

impl KeyDef {
	fn applies_to(&self, domain: Domain) -> bool {
		self.domain == domain || self.domain == Domain::All
	}

	fn convert(&self, raw: &str) -> AttrValue {
		let raw = raw.trim();
		let parsed = match self.ty {
			ValueType::Bool => raw.parse().ok().map(AttrValue::Bool),
			ValueType::Int => raw.parse().ok().map(AttrValue::Int),
			ValueType::Float => raw.parse().ok().map(AttrValue::Float),
			ValueType::Text => None,
		};
		parsed.unwrap_or_else(|| AttrValue::Str(raw.to_string()))
	}
}

/// Element currently being filled.
enum Open {
	None,
	Key(String),
	Node(String, HashMap<String, String>),
	Edge(String, String, HashMap<String, String>),
}

struct PendingEdge {
	source: String,
	target: String,
	data: HashMap<String, String>,
}

fn attribute(e: &BytesStart, name: &[u8]) -> Result<Option<String>> {
	for attr in e.attributes() {
		let attr = attr.map_err(quick_xml::Error::from)?;
		if attr.key.as_ref() == name {
			return Ok(Some(attr.unescape_value()?.into_owned()));
		}
	}
	Ok(None)
}

fn required(e: &BytesStart, name: &[u8]) -> Result<String> {
	attribute(e, name)?.ok_or_else(|| {
		WikiGraphError::GraphMl(format!(
			"<{}> without {} attribute",
			String::from_utf8_lossy(e.local_name().as_ref()),
			String::from_utf8_lossy(name)
		))
	})
}

/// Parses a complete GraphML document into a fresh [`GraphStore`].
pub fn parse_graphml(text: &str) -> Result<GraphStore> {
	let mut reader = Reader::from_str(text);
	reader.config_mut().trim_text(true);

	let mut keys: HashMap<String, KeyDef> = HashMap::new();
	// Declaration order; on an `attr.name` clash the later key wins.
	let mut key_order: Vec<String> = Vec::new();
	let mut kind = GraphKind::Directed;
	let mut nodes: Vec<(String, HashMap<String, String>)> = Vec::new();
	let mut edges: Vec<PendingEdge> = Vec::new();

	let mut open = Open::None;
	let mut data_key: Option<String> = None;
	let mut in_default = false;
	let mut text_buf = String::new();

	loop {
		let event = reader.read_event()?;
		let (start, empty) = match &event {
			Event::Start(e) => (Some(e.clone()), false),
			Event::Empty(e) => (Some(e.clone()), true),
			_ => (None, false),
		};

		if let Some(e) = start {
			match e.local_name().as_ref() {
				b"key" => {
					let id = required(&e, b"id")?;
					let domain = match attribute(&e, b"for")?.as_deref() {
						Some("node") => Domain::Node,
						Some("edge") => Domain::Edge,
						_ => Domain::All,
					};
					let ty = match attribute(&e, b"attr.type")?.as_deref() {
						Some("boolean") => ValueType::Bool,
						Some("int") | Some("long") => ValueType::Int,
						Some("float") | Some("double") => ValueType::Float,
						_ => ValueType::Text,
					};
					let name = attribute(&e, b"attr.name")?.unwrap_or_else(|| id.clone());
					let def = KeyDef {
						name,
						domain,
						ty,
						default: None,
					};
					if keys.insert(id.clone(), def).is_none() {
						key_order.push(id.clone());
					}
					if !empty {
						open = Open::Key(id);
					}
				}
				b"default" => {
					in_default = !empty;
					text_buf.clear();
				}
				b"graph" => {
					if attribute(&e, b"edgedefault")?.as_deref() == Some("undirected") {
						kind = GraphKind::Undirected;
					}
				}
				b"node" => {
					let id = required(&e, b"id")?;
					if empty {
						nodes.push((id, HashMap::new()));
					} else {
						open = Open::Node(id, HashMap::new());
					}
				}
				b"edge" => {
					let source = required(&e, b"source")?;
					let target = required(&e, b"target")?;
					if empty {
						edges.push(PendingEdge {
							source,
							target,
							data: HashMap::new(),
						});
					} else {
						open = Open::Edge(source, target, HashMap::new());
					}
				}
				b"data" => {
					if !empty {
						data_key = Some(required(&e, b"key")?);
						text_buf.clear();
					}
				}
				_ => {}
			}
			continue;
		}

		match event {
			Event::Text(t) => {
				if data_key.is_some() || in_default {
					text_buf.push_str(&t.unescape()?);
				}
			}
			Event::CData(c) => {
				if data_key.is_some() || in_default {
					text_buf.push_str(&String::from_utf8_lossy(&c.into_inner()));
				}
			}
			Event::End(e) => match e.local_name().as_ref() {
				b"default" => {
					in_default = false;
					if let Open::Key(id) = &open {
						if let Some(def) = keys.get_mut(id) {
							def.default = Some(std::mem::take(&mut text_buf));
						}
					}
				}
				b"key" => open = Open::None,
				b"data" => {
					if let Some(key) = data_key.take() {
						let value = std::mem::take(&mut text_buf);
						match &mut open {
							Open::Node(_, data) | Open::Edge(_, _, data) => {
								data.insert(key, value);
							}
							_ => {}
						}
					}
				}
				b"node" => {
					if let Open::Node(id, data) = std::mem::replace(&mut open, Open::None) {
						nodes.push((id, data));
					}
				}
				b"edge" => {
					if let Open::Edge(source, target, data) = std::mem::replace(&mut open, Open::None) {
						edges.push(PendingEdge {
							source,
							target,
							data,
						});
					}
				}
				_ => {}
			},
			Event::Eof => break,
			_ => {}
		}
	}

	let ordered: Vec<(&String, &KeyDef)> = key_order
		.iter()
		.filter_map(|id| keys.get(id).map(|def| (id, def)))
		.collect();

	let mut graph = GraphStore::new(kind);
	for (id, data) in nodes {
		let (x, y) = scatter(&id);
		let mut attrs = NodeAttrs {
			label: id.clone(),
			size: 1.0,
			color: "gray".into(),
			x,
			y,
			..NodeAttrs::default()
		};
		for &(key_id, def) in &ordered {
			if !def.applies_to(Domain::Node) {
				continue;
			}
			if let Some(raw) = data.get(key_id).or(def.default.as_ref()) {
				attrs.set(&def.name, def.convert(raw));
			}
		}
		if !graph.add_node(id.clone(), attrs) {
			debug!("wiki-graph: duplicate graphml node {id:?} ignored");
		}
	}

	for edge in edges {
		let mut attrs = EdgeAttrs {
			size: 1.0,
			..EdgeAttrs::default()
		};
		for &(key_id, def) in &ordered {
			if !def.applies_to(Domain::Edge) {
				continue;
			}
			let Some(raw) = edge.data.get(key_id).or(def.default.as_ref()) else {
				continue;
			};
			let value = def.convert(raw);
			match def.name.as_str() {
				"size" | "weight" if value.as_f64().is_some() => {
					attrs.size = value.as_f64().unwrap_or(1.0);
				}
				"color" => attrs.color = value.to_text(),
				name => {
					attrs.extra.insert(name.to_string(), value);
				}
			}
		}
		graph.add_edge(&edge.source, &edge.target, attrs)?;
	}

	Ok(graph)
}

#[cfg(test)]
mod tests {
	use super::*;

	const SAMPLE: &str = r##"<?xml version="1.0" encoding="UTF-8"?>
<graphml xmlns="http://graphml.graphdrawing.org/xmlns">
  <key id="d0" for="node" attr.name="label" attr.type="string"/>
  <key id="d1" for="node" attr.name="num_links" attr.type="long"/>
  <key id="d2" for="node" attr.name="comm" attr.type="string"/>
  <key id="d3" for="node" attr.name="color" attr.type="string">
    <default>#cccccc</default>
  </key>
  <key id="d4" for="edge" attr.name="weight" attr.type="double"/>
  <graph id="G" edgedefault="undirected">
    <node id="Berlin">
      <data key="d0">Berlin</data>
      <data key="d1">420</data>
      <data key="d2">1</data>
    </node>
    <node id="Paris">
      <data key="d1">380</data>
      <data key="d2">1</data>
      <data key="d3">#ff0000</data>
    </node>
    <node id="Rom &amp; Co"/>
    <edge source="Berlin" target="Paris">
      <data key="d4">2.5</data>
    </edge>
    <edge source="Paris" target="Rom &amp; Co"/>
  </graph>
</graphml>"##;

	#[test]
	fn parses_nodes_edges_and_defaults() {
		let g = parse_graphml(SAMPLE).unwrap();
		assert_eq!(g.kind(), GraphKind::Undirected);
		assert_eq!(g.node_count(), 3);
		assert_eq!(g.edge_count(), 2);

		let berlin = g.node("Berlin").unwrap();
		assert_eq!(berlin.num_links, Some(420));
		assert_eq!(berlin.comm.as_deref(), Some("1"));
		assert_eq!(berlin.color, "#cccccc");

		let paris = g.node("Paris").unwrap();
		assert_eq!(paris.label, "Paris");
		assert_eq!(paris.color, "#ff0000");

		assert!(g.has_node("Rom & Co"));
		assert!(g.has_edge("Paris", "Berlin"));
		let weight = g.edges().next().map(|e| e.attrs.size);
		assert_eq!(weight, Some(2.5));
	}

	#[test]
	fn edge_to_undeclared_node_is_rejected() {
		let doc = r#"<graphml><graph edgedefault="directed">
			<node id="a"/><edge source="a" target="b"/>
		</graph></graphml>"#;
		assert!(matches!(parse_graphml(doc), Err(WikiGraphError::UnknownNode(_))));
	}

	#[test]
	fn broken_xml_is_an_error() {
		assert!(parse_graphml("<graphml><graph><node id=\"a\"></graph>").is_err());
	}

	#[test]
	fn clashing_attribute_names_resolve_in_declaration_order() {
		let doc = r##"<graphml>
			<key id="z" for="node" attr.name="color"><default>#111111</default></key>
			<key id="a" for="node" attr.name="color"><default>#222222</default></key>
			<key id="m" for="edge" attr.name="color"><default>#333333</default></key>
			<key id="b" for="edge" attr.name="color"><default>#444444</default></key>
			<graph edgedefault="directed">
				<node id="x"><data key="a">#abcdef</data></node>
				<node id="y"><data key="z">#fedcba</data></node>
				<edge source="x" target="y"/>
			</graph>
		</graphml>"##;
		for _ in 0..8 {
			let g = parse_graphml(doc).unwrap();
			assert_eq!(g.node("x").unwrap().color, "#abcdef");
			assert_eq!(g.node("y").unwrap().color, "#222222");
			assert_eq!(g.edges().next().unwrap().attrs.color, "#444444");
		}
	}
}
