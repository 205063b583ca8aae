use crate::config::Config;
use crate::feed::FeedEntry;
use crate::filter::{FilteredFeed, KeywordMatchers, KeywordSet, MatchMode};
use crate::keybindings::KeybindingRegistry;
use crate::render::{page_count, paginate, DisplayMode, Page, RenderOptions};
use crate::theme::{StyleMap, ThemeVariant};
use crate::util::MAX_KEYWORD_INPUT_LENGTH;
use anyhow::Result;
use ratatui::style::Style;
use reqwest::redirect::Policy;
use std::borrow::Cow;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// How long a status message stays visible.
const STATUS_TTL: Duration = Duration::from_secs(3);

// ============================================================================
// HTTP Client Configuration
// ============================================================================

/// Create a custom redirect policy with loop detection and limited hops.
///
/// - Limits redirects to 3 hops maximum
/// - Detects redirect loops (same URL appearing twice in chain)
/// - Logs redirect chain for debugging
fn create_redirect_policy() -> Policy {
    Policy::custom(|attempt| {
        if attempt.previous().len() >= 3 {
            return attempt.error("Too many redirects (max 3)");
        }

        let url = attempt.url();
        if attempt.previous().iter().any(|prev| prev.as_str() == url.as_str()) {
            return attempt.error("Redirect loop detected");
        }

        tracing::debug!(
            from = %attempt.previous().last().map(|u| u.as_str()).unwrap_or("initial"),
            to = %url,
            hop = attempt.previous().len() + 1,
            "Following redirect"
        );

        attempt.follow()
    })
}

/// HTTP client shared by the TUI and print mode.
pub fn build_http_client() -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .redirect(create_redirect_policy())
        .user_agent(concat!("feedsift/", env!("CARGO_PKG_VERSION")))
        .pool_max_idle_per_host(4)
        .pool_idle_timeout(Duration::from_secs(30))
        .tcp_keepalive(Duration::from_secs(60))
        .timeout(Duration::from_secs(30))
        .build()?;
    Ok(client)
}

// ============================================================================
// Fetch State and Events
// ============================================================================

/// Result of the last completed fetch.
///
/// A failed fetch and a feed where nothing matched are different states and
/// are shown differently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Failed(String),
    Loaded {
        /// Entries in the feed before filtering.
        fetched: usize,
        matches: Vec<FeedEntry>,
    },
}

/// Messages from background tasks to the event loop.
#[derive(Debug)]
pub enum AppEvent {
    /// A fetch-and-filter task finished.
    ///
    /// `generation` is the value of [`App::fetch_generation`] when the task
    /// was spawned; results from a superseded fetch are dropped.
    FetchCompleted {
        generation: u64,
        result: Result<FilteredFeed, String>,
    },
    /// The feed server asked us to slow down; a retry follows after the delay.
    FeedRateLimited { delay_secs: u64 },
    /// A background task panicked.
    TaskPanicked { task: &'static str, error: String },
}

/// A fetch the UI has committed to: what to fetch and how to filter it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub generation: u64,
    pub url: String,
    pub keywords: KeywordSet,
    pub mode: MatchMode,
}

// ============================================================================
// Application State
// ============================================================================

pub struct App {
    pub http_client: reqwest::Client,
    pub feed_url: String,

    pub theme_variant: ThemeVariant,
    pub theme: StyleMap,
    /// Highlight color token from the configuration, re-applied when the
    /// theme changes.
    highlight_color: String,
    pub keybindings: KeybindingRegistry,

    // -- Keyword field --
    /// Raw text of the keyword field.
    pub keyword_input: String,
    /// True while the keyword field has focus.
    pub editing: bool,
    /// Field contents when editing started, restored on cancel.
    saved_input: Option<String>,

    // -- Selectors --
    pub match_mode: MatchMode,
    pub render_options: RenderOptions,
    pub page_size: usize,

    // -- Results --
    /// Keywords of the fetch whose results are on screen. Highlighting uses
    /// these, not whatever is currently typed in the field.
    pub active_keywords: KeywordSet,
    pub active_matchers: KeywordMatchers,
    /// Mode of the fetch whose results are on screen.
    pub active_mode: MatchMode,
    pub outcome: Option<FetchOutcome>,
    pub loading: bool,
    /// Current page, 1-based.
    pub page: usize,
    /// Selected entry, as an index into the current page.
    pub selected: usize,

    // -- Background fetch --
    pub fetch_generation: u64,
    pub fetch_handle: Option<JoinHandle<()>>,
    pub spinner_frame: usize,

    // -- Chrome --
    pub status_message: Option<(Cow<'static, str>, Instant)>,
    /// Whether the UI needs to be redrawn on the next loop iteration.
    pub needs_redraw: bool,
    pub show_help: bool,
    pub help_scroll_offset: usize,
}

impl App {
    pub fn new(config: &Config) -> Result<Self> {
        let http_client = build_http_client()?;

        let theme_variant = ThemeVariant::from_str_name(&config.theme).unwrap_or_else(|| {
            tracing::warn!(theme = %config.theme, "Unknown theme, using dark");
            ThemeVariant::Dark
        });

        let mut keybindings = KeybindingRegistry::new();
        let warnings = keybindings.apply_overrides(&config.keybindings);

        let mut app = Self {
            http_client,
            feed_url: config.feed_url.clone(),
            theme_variant,
            theme: StyleMap::from_palette(
                &theme_variant.palette().with_highlight_color(&config.highlight_color),
            ),
            highlight_color: config.highlight_color.clone(),
            keybindings,
            keyword_input: config.keyword_set().to_string(),
            editing: false,
            saved_input: None,
            match_mode: config.match_mode,
            render_options: config.render_options(),
            page_size: config.page_size.max(1),
            active_keywords: KeywordSet::default(),
            active_matchers: KeywordMatchers::default(),
            active_mode: config.match_mode,
            outcome: None,
            loading: false,
            page: 1,
            selected: 0,
            fetch_generation: 0,
            fetch_handle: None,
            spinner_frame: 0,
            status_message: None,
            needs_redraw: true,
            show_help: false,
            help_scroll_offset: 0,
        };

        if let Some(first) = warnings.first() {
            app.set_status(format!("Keybinding config: {}", first));
        }

        Ok(app)
    }

    /// Resolve a semantic role name to its `Style`.
    pub fn style(&self, role: &str) -> Style {
        self.theme.resolve(role)
    }

    pub fn set_theme(&mut self, variant: ThemeVariant) {
        self.theme_variant = variant;
        self.theme =
            StyleMap::from_palette(&variant.palette().with_highlight_color(&self.highlight_color));
        self.needs_redraw = true;
    }

    /// Cycle to the next theme variant and return its name.
    pub fn cycle_theme(&mut self) -> &'static str {
        let next = self.theme_variant.next();
        self.set_theme(next);
        next.name()
    }

    pub fn set_status(&mut self, msg: impl Into<Cow<'static, str>>) {
        self.status_message = Some((msg.into(), Instant::now()));
    }

    /// Clear the status message once it is 3 seconds old.
    /// Returns true if a message was actually cleared.
    pub fn clear_expired_status(&mut self) -> bool {
        if let Some((_, time)) = &self.status_message {
            if time.elapsed() >= STATUS_TTL {
                self.status_message = None;
                return true;
            }
        }
        false
    }

    // ------------------------------------------------------------------------
    // Keyword field
    // ------------------------------------------------------------------------

    /// Keywords as currently typed in the field.
    pub fn parsed_keywords(&self) -> KeywordSet {
        KeywordSet::parse(&self.keyword_input)
    }

    pub fn begin_edit(&mut self) {
        if !self.editing {
            self.saved_input = Some(self.keyword_input.clone());
            self.editing = true;
        }
    }

    /// Leave the field, restoring what it held before editing started.
    pub fn cancel_edit(&mut self) {
        if let Some(saved) = self.saved_input.take() {
            self.keyword_input = saved;
        }
        self.editing = false;
    }

    /// Leave the field, keeping its contents.
    pub fn commit_edit(&mut self) {
        self.saved_input = None;
        self.editing = false;
    }

    /// Append a typed character. Refused once the field is at its length cap.
    pub fn push_input(&mut self, c: char) -> bool {
        if self.keyword_input.len() + c.len_utf8() > MAX_KEYWORD_INPUT_LENGTH {
            self.set_status(format!(
                "Keyword field at max length ({} bytes)",
                MAX_KEYWORD_INPUT_LENGTH
            ));
            return false;
        }
        self.keyword_input.push(c);
        true
    }

    pub fn pop_input(&mut self) {
        self.keyword_input.pop();
    }

    pub fn clear_input(&mut self) {
        self.keyword_input.clear();
    }

    // ------------------------------------------------------------------------
    // Selectors
    // ------------------------------------------------------------------------

    /// Flip ANY/ALL. Takes effect on the next fetch.
    pub fn toggle_match_mode(&mut self) -> MatchMode {
        self.match_mode = self.match_mode.toggle();
        self.match_mode
    }

    /// Card → Title only → Full. Applies to the results on screen at once.
    pub fn cycle_display_mode(&mut self) -> DisplayMode {
        self.render_options.display = self.render_options.display.cycle();
        self.render_options.display
    }

    // ------------------------------------------------------------------------
    // Fetching
    // ------------------------------------------------------------------------

    /// Start a fetch with the keywords in the field.
    ///
    /// Returns `None` (and sets a warning) when the field holds no keywords;
    /// nothing is fetched in that case. Otherwise bumps the generation so
    /// any fetch still in flight is treated as stale.
    pub fn begin_fetch(&mut self) -> Option<FetchRequest> {
        let keywords = self.parsed_keywords();
        if keywords.is_empty() {
            self.set_status("Enter at least one keyword before fetching");
            return None;
        }

        self.fetch_generation = self.fetch_generation.wrapping_add(1);
        self.loading = true;
        self.spinner_frame = 0;
        self.active_matchers = KeywordMatchers::new(&keywords);
        self.active_keywords = keywords.clone();
        self.active_mode = self.match_mode;

        Some(FetchRequest {
            generation: self.fetch_generation,
            url: self.feed_url.clone(),
            keywords,
            mode: self.match_mode,
        })
    }

    /// Store the result of a fetch. Returns false if `generation` is stale.
    pub fn finish_fetch(&mut self, generation: u64, result: Result<FilteredFeed, String>) -> bool {
        if generation != self.fetch_generation {
            tracing::debug!(
                expected = self.fetch_generation,
                got = generation,
                "Ignoring stale fetch result (generation mismatch)"
            );
            return false;
        }

        self.loading = false;
        self.fetch_handle = None;
        self.page = 1;
        self.selected = 0;
        self.outcome = Some(match result {
            Ok(feed) => FetchOutcome::Loaded {
                fetched: feed.fetched,
                matches: feed.entries,
            },
            Err(e) => FetchOutcome::Failed(e),
        });
        true
    }

    /// Entries that passed the last successful fetch.
    pub fn matches(&self) -> &[FeedEntry] {
        match &self.outcome {
            Some(FetchOutcome::Loaded { matches, .. }) => matches,
            _ => &[],
        }
    }

    pub fn total_pages(&self) -> usize {
        page_count(self.matches().len(), self.page_size)
    }

    /// The page on screen, or `None` before the first successful fetch.
    pub fn current_page(&self) -> Option<Page<'_>> {
        match &self.outcome {
            Some(FetchOutcome::Loaded { matches, .. }) => {
                paginate(matches, self.page_size, self.page.clamp(1, self.total_pages())).ok()
            }
            _ => None,
        }
    }

    pub fn selected_entry(&self) -> Option<&FeedEntry> {
        self.current_page()?.entries.get(self.selected)
    }

    // ------------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------------

    pub fn next_page(&mut self) -> bool {
        if self.page < self.total_pages() {
            self.page += 1;
            self.selected = 0;
            true
        } else {
            false
        }
    }

    pub fn prev_page(&mut self) -> bool {
        if self.page > 1 {
            self.page -= 1;
            self.selected = 0;
            true
        } else {
            false
        }
    }

    pub fn nav_down(&mut self) {
        let len = self.current_page().map_or(0, |p| p.entries.len());
        if self.selected + 1 < len {
            self.selected += 1;
        }
    }

    pub fn nav_up(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }
}
