//! Wire types of the wiki link API.

use serde::{Deserialize, Serialize};

/// One outbound link of a page as returned by the `neighbours` route, annotated
/// with the target's own link counters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PageLink {
	/// Page id of the link target.
	#[serde(default)]
	pub page_link: Option<u64>,
	#[serde(rename = "pageTitle")]
	/// Title of the link target.
	pub page_title: String,
	#[serde(default)]
	/// Outbound links of the target.
	pub num_links: Option<u64>,
	#[serde(default)]
	/// Pages linking to the target.
	pub times_linked: Option<u64>,
}

impl PageLink {
	/// A link known only by its title.
	pub fn new(page_title: impl Into<String>) -> Self {
		Self {
			page_link: None,
			page_title: page_title.into(),
			num_links: None,
			times_linked: None,
		}
	}

	/// Attaches the target's link counters.
	pub fn with_counts(mut self, num_links: u64, times_linked: u64) -> Self {
		self.num_links = Some(num_links);
		self.times_linked = Some(times_linked);
		self
	}
}

/// One row of the paginated `links`/`linked` routes. The title is `None` when
/// the server could not resolve the page id.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkEntry {
	#[serde(default)]
	/// Id of the page the list belongs to.
	pub page_id: Option<u64>,
	#[serde(default)]
	/// Id of the page at the other end.
	pub page_link: Option<u64>,
	#[serde(default)]
	/// Title of the page at the other end.
	pub page_title: Option<String>,
}

impl LinkEntry {
	/// Title to show, degrading to the page id of the other end.
	pub fn display_title(&self, outbound: bool) -> String {
		if let Some(title) = &self.page_title {
			return title.clone();
		}
		let id = if outbound { self.page_link } else { self.page_id };
		match id {
			Some(id) => format!("#{id}"),
			None => "(unknown page)".to_string(),
		}
	}
}

/// Which side of a page's links a list shows.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum LinkDirection {
	/// Pages this page links to.
	#[default]
	Outbound,
	/// Pages linking to this page.
	Inbound,
}

impl LinkDirection {
	/// True for [`LinkDirection::Outbound`].
	pub fn is_outbound(self) -> bool {
		self == LinkDirection::Outbound
	}

	/// Tab caption.
	pub fn label(self) -> &'static str {
		match self {
			LinkDirection::Outbound => "Links",
			LinkDirection::Inbound => "Linked from",
		}
	}
}

/// One page of a selected page's link list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LinkQuery {
	/// Page title as the API expects it.
	pub page: String,
	/// Which side of the links.
	pub direction: LinkDirection,
	/// 1-based.
	pub page_no: u32,
}

impl LinkQuery {
	/// First page of `page`'s links in `direction`.
	pub fn new(page: impl Into<String>, direction: LinkDirection) -> Self {
		Self {
			page: page.into(),
			direction,
			page_no: 1,
		}
	}

	/// Same page, other direction, back on the first page.
	pub fn turned(&self, direction: LinkDirection) -> Self {
		Self::new(self.page.clone(), direction)
	}

	/// Following page, if `total` rows leave one.
	pub fn next(&self, total: u64) -> Option<Self> {
		(self.page_no < super::page_count(total)).then(|| Self {
			page_no: self.page_no + 1,
			..self.clone()
		})
	}

	/// Preceding page, unless this is the first.
	pub fn previous(&self) -> Option<Self> {
		(self.page_no > 1).then(|| Self {
			page_no: self.page_no - 1,
			..self.clone()
		})
	}
}

/// Error payload of the `graphml` route.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct StatusBody {
	#[serde(rename = "statusText", default)]
	/// Human readable failure reason.
	pub status_text: String,
}

/// Ordering requested from the `neighbours` route.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NeighbourSort {
	#[default]
	/// Most outbound links first.
	NumLinks,
	/// Most inbound links first.
	TimesLinked,
}

impl NeighbourSort {
	/// Value of the `sort` query parameter.
	pub fn as_str(self) -> &'static str {
		match self {
			NeighbourSort::NumLinks => "num_links",
			NeighbourSort::TimesLinked => "times_linked",
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn page_link_reads_server_shape() {
		let json = r#"[{"page_link": 17, "num_links": 120, "times_linked": 4000, "pageTitle": "Berlin"},
			{"page_link": 18, "pageTitle": "Paris"}]"#;
		let links: Vec<PageLink> = serde_json::from_str(json).unwrap();
		assert_eq!(links[0], PageLink {
			page_link: Some(17),
			page_title: "Berlin".into(),
			num_links: Some(120),
			times_linked: Some(4000),
		});
		assert_eq!(links[1].num_links, None);
	}

	#[test]
	fn link_entry_degrades_without_title() {
		let rows: Vec<LinkEntry> =
			serde_json::from_str(r#"[{"pageId": 1, "pageLink": 99, "pageTitle": null}]"#).unwrap();
		assert_eq!(rows[0].display_title(true), "#99");
		assert_eq!(rows[0].display_title(false), "#1");
	}

	#[test]
	fn link_query_pages_within_the_total() {
		let first = LinkQuery::new("Berlin", LinkDirection::Inbound);
		assert_eq!(first.previous(), None);
		let second = first.next(120).unwrap();
		assert_eq!(second.page_no, 2);
		let third = second.next(120).unwrap();
		assert_eq!(third.next(120), None);
		assert_eq!(third.previous(), Some(second));

		let turned = third.turned(LinkDirection::Outbound);
		assert_eq!(turned, LinkQuery::new("Berlin", LinkDirection::Outbound));
		assert_eq!(first.next(0), None);
	}
}
