//! Leptos UI: the graph canvas and the panels around it.

use leptos::prelude::*;

use crate::api::wiki_article_url;

pub mod exploration;
pub mod graph_view;
pub mod panels;
pub mod path_search;

pub use exploration::{Exploration, load_top_graph};
pub use graph_view::{GraphCanvas, ThemeMode};
pub use panels::{ClusterPanel, SearchPanel, SelectionInfo, SettingsPanel};
pub use path_search::PathSearch;

/// Link to the article, or plain text when no URL can be built for it.
pub(crate) fn article_link(wiki: &str, title: &str) -> AnyView {
	match wiki_article_url(wiki, title) {
		Ok(url) => view! {
			<a href=url.to_string() target="_blank" rel="noopener">{title.to_string()}</a>
		}
		.into_any(),
		Err(_) => view! { <span>{title.to_string()}</span> }.into_any(),
	}
}
