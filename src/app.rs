use crate::browser::BrowserCommand;
use crate::config::{Config, FeedSource};
use crate::feed::{Article, Feed, FeedError, FeedId, Fetcher};
use anyhow::{Context, Result};
use tokio::time::{Duration, Instant};

/// How long a status message stays on screen.
const STATUS_TTL: Duration = Duration::from_secs(3);

// ============================================================================
// Messages
// ============================================================================

/// One message per kind of event the application reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Message {
    /// The cursor in the feed pane moved to this row.
    SelectFeed(usize),
    /// An article row was activated (Enter).
    ActivateArticle(usize),
    /// The refresh timer fired.
    Tick,
    /// The user asked to leave.
    Quit,
}

/// Result of dispatching a message.
///
/// Tells the event loop whether to keep running or terminate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Continue the event loop and process more events.
    Continue,
    /// Exit the application and restore the terminal.
    Quit,
}

/// Which pane has focus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Feeds,
    Articles,
}

// ============================================================================
// Feed List
// ============================================================================

/// Every configured feed, one row each, in config order.
#[derive(Debug, Default)]
pub struct FeedList {
    feeds: Vec<Feed>,
}

impl FeedList {
    /// Fetch every feed up front.
    ///
    /// Feeds are fetched one after another. The first failure aborts the
    /// whole list.
    pub async fn load(sources: &[FeedSource], fetcher: &Fetcher) -> Result<Self, FeedError> {
        let mut feeds = Vec::with_capacity(sources.len());
        for (i, source) in sources.iter().enumerate() {
            tracing::info!(feed = %source.name, "Fetching feed");
            feeds.push(Feed::fetch(FeedId(i), source, fetcher).await?);
        }
        Ok(Self { feeds })
    }

    /// Build a list from already loaded feeds.
    ///
    /// Feed ids are reassigned to match row positions.
    pub fn from_feeds(feeds: Vec<Feed>) -> Self {
        let feeds = feeds
            .into_iter()
            .enumerate()
            .map(|(i, mut feed)| {
                feed.reassign(FeedId(i));
                feed
            })
            .collect();
        Self { feeds }
    }

    pub fn len(&self) -> usize {
        self.feeds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.feeds.is_empty()
    }

    pub fn get(&self, id: FeedId) -> Option<&Feed> {
        self.feeds.get(id.0)
    }

    pub fn get_mut(&mut self, id: FeedId) -> Option<&mut Feed> {
        self.feeds.get_mut(id.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Feed> {
        self.feeds.iter()
    }

    /// Row labels in display order.
    pub fn names(&self) -> Vec<&str> {
        self.feeds.iter().map(|f| f.name.as_str()).collect()
    }
}

// ============================================================================
// Article List
// ============================================================================

/// The articles of the feed currently on display.
#[derive(Debug, Default)]
pub struct ArticleList {
    feed: Option<FeedId>,
    rows: Vec<Article>,
}

impl ArticleList {
    /// Replace every row with the articles of `feed`.
    pub fn update(&mut self, feed: &Feed) {
        self.feed = Some(feed.id);
        self.rows = feed.articles().to_vec();
    }

    /// Feed whose articles are shown, if any has been selected yet.
    pub fn displayed_feed(&self) -> Option<FeedId> {
        self.feed
    }

    pub fn rows(&self) -> &[Article] {
        &self.rows
    }

    pub fn get(&self, index: usize) -> Option<&Article> {
        self.rows.get(index)
    }

    pub fn titles(&self) -> Vec<&str> {
        self.rows.iter().map(|a| a.title.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// ============================================================================
// Application State
// ============================================================================

pub struct App {
    pub feed_list: FeedList,
    pub article_list: ArticleList,
    pub focus: Focus,
    /// Cursor row in the feed pane.
    pub selected_feed: Option<usize>,
    /// Cursor row in the article pane.
    pub selected_article: Option<usize>,
    pub status_message: Option<(String, Instant)>,
    pub needs_redraw: bool,
    fetcher: Fetcher,
    browser: BrowserCommand,
}

impl App {
    pub fn new(feed_list: FeedList, fetcher: Fetcher, browser: BrowserCommand) -> Self {
        Self {
            feed_list,
            article_list: ArticleList::default(),
            focus: Focus::Feeds,
            selected_feed: None,
            selected_article: None,
            status_message: None,
            needs_redraw: true,
            fetcher,
            browser,
        }
    }

    /// Build the application from configuration, fetching every feed.
    pub async fn load(config: &Config) -> Result<Self> {
        let browser =
            BrowserCommand::parse(&config.browser).context("Invalid browser command")?;
        let fetcher = Fetcher::new(config.timeout).context("Failed to create HTTP client")?;
        let feed_list = FeedList::load(&config.feeds, &fetcher)
            .await
            .context("Failed to load feeds")?;
        Ok(Self::new(feed_list, fetcher, browser))
    }

    /// Handle one message.
    pub async fn dispatch(&mut self, message: Message) -> Result<Action> {
        self.needs_redraw = true;
        match message {
            Message::SelectFeed(index) => self.select_feed(index),
            Message::ActivateArticle(index) => self.activate_article(index)?,
            Message::Tick => self.refresh_displayed().await?,
            Message::Quit => return Ok(Action::Quit),
        }
        Ok(Action::Continue)
    }

    fn select_feed(&mut self, index: usize) {
        let Some(feed) = self.feed_list.get(FeedId(index)) else {
            return;
        };
        self.selected_feed = Some(index);
        self.article_list.update(feed);
        self.selected_article = None;
        tracing::debug!(feed = %feed.name, articles = feed.articles().len(), "Feed selected");
    }

    fn activate_article(&mut self, index: usize) -> Result<()> {
        let Some(article) = self.article_list.get(index) else {
            return Ok(());
        };
        if article.link.is_empty() {
            tracing::warn!(title = %article.title, "Article has no link, not launching browser");
            let msg = format!("No link for \"{}\"", article.title);
            self.set_status(msg);
            return Ok(());
        }
        self.browser
            .launch(&article.link)
            .context("Failed to open article")?;
        Ok(())
    }

    /// Re-fetch the feed on display and show its new articles.
    async fn refresh_displayed(&mut self) -> Result<()> {
        let Some(id) = self.article_list.displayed_feed() else {
            tracing::debug!("Refresh tick with no feed displayed");
            return Ok(());
        };
        let Some(feed) = self.feed_list.get_mut(id) else {
            return Ok(());
        };

        tracing::info!(feed = %feed.name, "Refreshing displayed feed");
        feed.refresh(&self.fetcher)
            .await
            .context("Periodic refresh failed")?;

        if self.article_list.displayed_feed() == Some(id) {
            self.article_list.update(feed);
            self.selected_article = match self.article_list.len() {
                0 => None,
                len => self.selected_article.map(|i| i.min(len - 1)),
            };
        }
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Cursor movement
    // ------------------------------------------------------------------------

    /// Move the cursor in the focused pane by `delta` rows.
    ///
    /// Returns the message to dispatch when the feed cursor lands on a new row.
    pub fn move_cursor(&mut self, delta: isize) -> Option<Message> {
        match self.focus {
            Focus::Feeds => {
                let next = step(self.selected_feed, self.feed_list.len(), delta)?;
                (Some(next) != self.selected_feed).then_some(Message::SelectFeed(next))
            }
            Focus::Articles => {
                self.selected_article =
                    step(self.selected_article, self.article_list.len(), delta);
                None
            }
        }
    }

    /// Jump to the first (`to_end == false`) or last row of the focused pane.
    pub fn jump_cursor(&mut self, to_end: bool) -> Option<Message> {
        let delta = if to_end { isize::MAX } else { isize::MIN };
        self.move_cursor(delta)
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Feeds => Focus::Articles,
            Focus::Articles => Focus::Feeds,
        };
    }

    pub fn set_focus(&mut self, focus: Focus) {
        self.focus = focus;
    }

    // ------------------------------------------------------------------------
    // Status line
    // ------------------------------------------------------------------------

    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = Some((msg.into(), Instant::now()));
    }

    /// Drop the status message once it has been shown long enough.
    ///
    /// Returns true if a message was cleared.
    pub fn clear_expired_status(&mut self) -> bool {
        match &self.status_message {
            Some((_, set_at)) if set_at.elapsed() >= STATUS_TTL => {
                self.status_message = None;
                true
            }
            _ => false,
        }
    }
}

/// Cursor arithmetic clamped to `0..len`. An unset cursor lands on row 0.
fn step(current: Option<usize>, len: usize, delta: isize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    let Some(current) = current else {
        return Some(if delta == isize::MAX { len - 1 } else { 0 });
    };
    let next = if delta < 0 {
        current.saturating_sub(delta.unsigned_abs())
    } else {
        current.saturating_add(delta as usize)
    };
    Some(next.min(len - 1))
}
