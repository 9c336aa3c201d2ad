//! Feed model, fetching and parsing.
//!
//! - [`parser`] - Namespace-aware RSS/Atom parsing into a flat article list
//! - [`fetcher`] - Single-shot HTTP retrieval of feed documents
//!
//! A [`Feed`] ties the two together: it owns the configured source, the last
//! fetched document and the articles derived from it. Refreshing replaces all
//! three wholesale.

mod fetcher;
mod parser;

pub use fetcher::{FetchError, Fetcher};
pub use parser::{parse_feed, ParseError, ParsedArticle, ParsedFeed};

use crate::config::FeedSource;
use thiserror::Error;

/// Errors from fetching or parsing one feed, tagged with the feed's name.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("Failed to fetch feed '{name}': {source}")]
    Fetch {
        name: String,
        #[source]
        source: FetchError,
    },
    #[error("Failed to parse feed '{name}': {source}")]
    Parse {
        name: String,
        #[source]
        source: ParseError,
    },
}

/// Row index of a feed in the feed list.
///
/// Articles refer back to their feed through this instead of a reference,
/// so feeds can swap out their article vectors freely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FeedId(pub usize);

/// A single article shown in the article list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    pub feed: FeedId,
    pub title: String,
    /// May be empty when the source element had neither `href` nor text.
    pub link: String,
}

/// A configured feed and the articles from its most recent fetch.
#[derive(Debug, Clone)]
pub struct Feed {
    pub id: FeedId,
    pub name: String,
    pub url: Option<String>,
    document: Vec<u8>,
    namespace: String,
    articles: Vec<Article>,
}

impl Feed {
    /// An unfetched feed with no articles.
    pub fn new(id: FeedId, source: &FeedSource) -> Self {
        Self {
            id,
            name: source.name.clone(),
            url: source.url.clone(),
            document: Vec::new(),
            namespace: String::new(),
            articles: Vec::new(),
        }
    }

    /// Build a feed from its config section and fetch it immediately.
    pub async fn fetch(
        id: FeedId,
        source: &FeedSource,
        fetcher: &Fetcher,
    ) -> Result<Self, FeedError> {
        let mut feed = Self::new(id, source);
        feed.refresh(fetcher).await?;
        Ok(feed)
    }

    /// Re-fetch the document and replace the namespace and articles.
    ///
    /// On error the previous state is left untouched.
    pub async fn refresh(&mut self, fetcher: &Fetcher) -> Result<(), FeedError> {
        let document =
            fetcher
                .fetch(self.url.as_deref())
                .await
                .map_err(|source| FeedError::Fetch {
                    name: self.name.clone(),
                    source,
                })?;
        self.load(document)
    }

    /// Replace the feed's state with a parsed copy of `document`.
    pub fn load(&mut self, document: Vec<u8>) -> Result<(), FeedError> {
        let parsed = parse_feed(&document).map_err(|source| FeedError::Parse {
            name: self.name.clone(),
            source,
        })?;

        let id = self.id;
        self.articles = parsed
            .articles
            .into_iter()
            .map(|a| Article {
                feed: id,
                title: a.title,
                link: a.link,
            })
            .collect();
        self.namespace = parsed.namespace;
        self.document = document;

        tracing::info!(
            feed = %self.name,
            articles = self.articles.len(),
            namespace = %self.namespace,
            "Feed loaded"
        );
        Ok(())
    }

    /// Move the feed to another row, re-tagging its articles.
    pub fn reassign(&mut self, id: FeedId) {
        self.id = id;
        for article in &mut self.articles {
            article.feed = id;
        }
    }

    pub fn articles(&self) -> &[Article] {
        &self.articles
    }

    /// `{uri}` prefix derived from the document root, or empty.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// The raw document of the last successful fetch.
    pub fn document(&self) -> &[u8] {
        &self.document
    }
}
