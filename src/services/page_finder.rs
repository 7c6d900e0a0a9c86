use log::{debug, info, warn};
use rand::Rng;
use crate::errors::WikiError;
use crate::services::PageStore;
use crate::types::Page;

/// Service for listing, searching and sampling stored pages.
///
/// Every call re-reads the pages directory; there is no index.
#[derive(Clone)]
pub struct PageFinder {
    store: PageStore,
}

impl PageFinder {
    /// Create a new page finder
    pub fn new(store: PageStore) -> Self {
        Self { store }
    }

    /// All page titles in byte-wise lexicographic order.
    pub fn list(&self) -> Result<Vec<String>, WikiError> {
        let mut titles = self.store.raw_titles()?;
        titles.sort_unstable();
        debug!("Listed {} pages", titles.len());
        Ok(titles)
    }

    /// First title, in [`PageFinder::list`] order, containing `query`.
    ///
    /// Matching is case-sensitive. An empty query matches nothing.
    pub fn search(&self, query: &str) -> Result<Option<String>, WikiError> {
        if query.is_empty() {
            debug!("Empty search query received");
            return Ok(None);
        }

        let hit = self.list()?.into_iter().find(|title| title.contains(query));
        match &hit {
            Some(title) => info!("Search for '{}' matched page '{}'", query, title),
            None => info!("Search for '{}' matched nothing", query),
        }
        Ok(hit)
    }

    /// A uniformly chosen title.
    pub fn random_title(&self) -> Result<String, WikiError> {
        let mut titles = self.list()?;
        if titles.is_empty() {
            warn!("Random page requested but the store is empty");
            return Err(WikiError::EmptyCollection);
        }
        let pick = rand::rng().random_range(0..titles.len());
        Ok(titles.swap_remove(pick))
    }

    /// Load a uniformly chosen page.
    pub fn random_page(&self) -> Result<Page, WikiError> {
        let title = self.random_title()?;
        debug!("Random pick: '{}'", title);
        self.store.load(&title)
    }
}
