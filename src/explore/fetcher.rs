//! Neighbour data sources for graph expansion.

use crate::api::{NeighbourSort, PageLink, WikiApi};
use crate::error::Result;

/// Source of a page's outbound links, most popular first.
///
/// Implementations return [`crate::WikiGraphError::NotFound`] when the page
/// has no link data; expansion treats that as zero neighbours.
#[allow(async_fn_in_trait)]
pub trait NeighborFetcher {
	/// Fetches at most `limit` outbound links of `page` (all of them when `None`).
	async fn fetch(&self, wiki: &str, page: &str, limit: Option<usize>) -> Result<Vec<PageLink>>;
}

impl NeighborFetcher for WikiApi {
	async fn fetch(&self, wiki: &str, page: &str, limit: Option<usize>) -> Result<Vec<PageLink>> {
		self.neighbours(wiki, page, limit, NeighbourSort::NumLinks).await
	}
}

impl<T: NeighborFetcher + ?Sized> NeighborFetcher for &T {
	async fn fetch(&self, wiki: &str, page: &str, limit: Option<usize>) -> Result<Vec<PageLink>> {
		(**self).fetch(wiki, page, limit).await
	}
}
