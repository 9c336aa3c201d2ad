//! Configuration file parser for `~/.config/grs`.
//!
//! The file is INI-style. Section `*` carries global options, every other
//! section names a feed and should carry a `url` key:
//!
//! ```text
//! [*]
//! browser = firefox --new-tab
//! timer = 600
//!
//! [Planet Rust]
//! url = https://planet.rust-lang.org/rss20.xml
//! ```
//!
//! Keys in a `[DEFAULT]` section apply to every other section that does not
//! set them itself; `DEFAULT` is never a feed.
//!
//! The config file is optional. A missing file yields `Config::default()`,
//! which has no feeds at all.
use ini::{Ini, ParseOption, Properties};
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Name of the section holding global options.
pub const GLOBAL_SECTION: &str = "*";

/// Name of the section whose keys every other section inherits.
pub const DEFAULT_SECTION: &str = "DEFAULT";

/// Browser launched when `[*] browser` is not set.
pub const DEFAULT_BROWSER: &str = "firefox";

/// Refresh period when `[*] timer` is not set.
pub const DEFAULT_TIMER_SECS: u64 = 300;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid INI in config file: {0}")]
    Parse(#[from] ini::ParseError),

    #[error("Invalid value for '{key}' in section [{section}]: {reason}")]
    InvalidValue {
        section: String,
        key: &'static str,
        reason: String,
    },

    #[error("Section [{0}] appears more than once")]
    Duplicate(String),

    #[error("Key '{key}' appears more than once in section [{section}]")]
    DuplicateKey { section: String, key: String },
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// One feed section of the config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedSource {
    /// Section name, shown as the feed's row label.
    pub name: String,
    /// Feed URL. A section without one fails when the feed is fetched.
    pub url: Option<String>,
}

/// Top-level application configuration.
///
/// Built once at startup and handed to the components that need it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Browser command line; the article link is appended as the last argument.
    pub browser: String,

    /// Period of the background refresh of the displayed feed.
    pub timer: Duration,

    /// Per-request timeout. `None` waits as long as the server takes.
    pub timeout: Option<Duration>,

    /// Feed sections in file order.
    pub feeds: Vec<FeedSource>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            browser: DEFAULT_BROWSER.to_string(),
            timer: Duration::from_secs(DEFAULT_TIMER_SECS),
            timeout: None,
            feeds: Vec::new(),
        }
    }
}

impl Config {
    /// Load configuration from an INI file.
    ///
    /// - Missing file → `Ok(Config::default())`
    /// - Empty file → `Ok(Config::default())`
    /// - Malformed INI → `Err(ConfigError::Parse)` with line info
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        let config = Self::parse(&content)?;
        tracing::info!(
            path = %path.display(),
            feeds = config.feeds.len(),
            "Loaded configuration"
        );
        Ok(config)
    }

    /// Parse configuration from INI text.
    ///
    /// Keys are matched case-insensitively and may appear once per section.
    /// Values are taken verbatim apart from surrounding whitespace: no quote
    /// or backslash processing, since URLs and shell-ish browser commands are
    /// the usual values.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let opt = ParseOption {
            enabled_quote: false,
            enabled_escape: false,
            ..ParseOption::default()
        };
        let ini = Ini::load_from_str_opt(content, opt)?;

        let mut seen = HashSet::new();
        let mut defaults = None;
        let mut sections = Vec::new();

        for (section, props) in ini.iter() {
            let Some(name) = section else {
                if props.iter().next().is_some() {
                    tracing::warn!("Keys outside of any section are ignored");
                }
                continue;
            };

            if !seen.insert(name) {
                return Err(ConfigError::Duplicate(name.to_string()));
            }
            check_unique_keys(name, props)?;

            if name == DEFAULT_SECTION {
                defaults = Some(props);
            } else {
                sections.push((name, props));
            }
        }

        let mut config = Self::default();

        for (name, props) in sections {
            let get = |key: &str| {
                lookup(props, key).or_else(|| defaults.and_then(|d| lookup(d, key)))
            };

            if name == GLOBAL_SECTION {
                if let Some(browser) = get("browser") {
                    config.browser = browser.to_string();
                }
                if let Some(timer) = get("timer") {
                    let secs = parse_secs(name, "timer", timer)?;
                    if secs == 0 {
                        return Err(ConfigError::InvalidValue {
                            section: name.to_string(),
                            key: "timer",
                            reason: "must be at least 1 second".to_string(),
                        });
                    }
                    config.timer = Duration::from_secs(secs);
                }
                if let Some(timeout) = get("timeout") {
                    config.timeout = Some(Duration::from_secs(parse_secs(
                        name, "timeout", timeout,
                    )?));
                }
                continue;
            }

            let url = get("url").map(str::to_string);
            if url.is_none() {
                tracing::warn!(feed = %name, "Feed section has no url key");
            }
            config.feeds.push(FeedSource {
                name: name.to_string(),
                url,
            });
        }

        Ok(config)
    }
}

fn lookup<'a>(props: &'a Properties, key: &str) -> Option<&'a str> {
    props
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(key))
        .map(|(_, v)| v)
}

fn check_unique_keys(section: &str, props: &Properties) -> Result<(), ConfigError> {
    let mut keys = HashSet::new();
    for (key, _) in props.iter() {
        if !keys.insert(key.to_ascii_lowercase()) {
            return Err(ConfigError::DuplicateKey {
                section: section.to_string(),
                key: key.to_string(),
            });
        }
    }
    Ok(())
}

fn parse_secs(section: &str, key: &'static str, value: &str) -> Result<u64, ConfigError> {
    value
        .trim()
        .parse::<u64>()
        .map_err(|e| ConfigError::InvalidValue {
            section: section.to_string(),
            key,
            reason: format!("'{}' is not a whole number of seconds ({})", value, e),
        })
}

// ============================================================================
// Tests
// ============================================================================
