use ratatui::widgets::ListState;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::constants::constants;
use crate::context::Context;
use crate::download::{self, DownloadOutcome};
use crate::error::{AppError, validate_link};
use crate::history::History;
use crate::i18n::{Language, Strings};
use crate::model::{MediaKind, TrendingVideo, VideoInfo};
use crate::notice;
use crate::progress::ProgressSimulator;
use crate::theme::{THEMES, Theme, theme_index};
use crate::trending::resolve_trending;

// --- Types ---

pub type ResolveResult = Result<VideoInfo, AppError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
  Input,
  Trending,
  History,
}

impl Focus {
  pub fn next(self) -> Self {
    match self {
      Focus::Input => Focus::Trending,
      Focus::Trending => Focus::History,
      Focus::History => Focus::Input,
    }
  }
}

/// A resolved record held at 100 % for a moment before it is shown.
struct PendingReveal {
  info: VideoInfo,
  from_list: bool,
  at: Instant,
}

/// In-flight async task receivers.
#[derive(Default)]
pub(crate) struct AsyncTasks {
  pub(crate) resolve_rx: Option<oneshot::Receiver<ResolveResult>>,
  pub(crate) resolve_from_list: bool,
  pub(crate) trending_rx: Option<oneshot::Receiver<Vec<TrendingVideo>>>,
  pub(crate) download_rx: Option<oneshot::Receiver<DownloadOutcome>>,
}

pub struct App {
  pub input: String,
  pub cursor_position: usize,
  pub input_scroll: usize,
  pub focus: Focus,
  pub language: Language,
  pub theme_index: usize,
  pub result: Option<VideoInfo>,
  pub history: History,
  pub history_state: ListState,
  pub trending: Vec<TrendingVideo>,
  pub trending_state: ListState,
  pub progress: ProgressSimulator,
  /// True from the moment a resolution starts until its outcome is shown.
  pub loading: bool,
  pub downloading: Option<MediaKind>,
  pub last_error: Option<String>,
  pub status_message: Option<String>,
  /// Informational message, shown when there is no status or error.
  pub info_message: Option<String>,
  pub show_notice: bool,
  pub should_quit: bool,
  ctx: Arc<Context>,
  pub(crate) tasks: AsyncTasks,
  pending_reveal: Option<PendingReveal>,
  reveal_delay: Duration,
  /// When the last error was set, for auto-dismiss after 5 seconds.
  error_time: Option<Instant>,
}

impl App {
  pub fn new(ctx: Arc<Context>, config: &Config) -> Self {
    let language = ctx.settings.language;
    let history = History::load(&ctx.store);
    let show_notice = notice::should_show_now(&ctx.store);

    Self {
      input: String::new(),
      cursor_position: 0,
      input_scroll: 0,
      focus: Focus::Input,
      language,
      theme_index: theme_index(config.theme_name.as_deref()),
      result: None,
      history,
      history_state: ListState::default(),
      trending: Vec::new(),
      trending_state: ListState::default(),
      progress: ProgressSimulator::from_constants(language.strings().stages.len()),
      loading: false,
      downloading: None,
      last_error: None,
      status_message: None,
      info_message: None,
      show_notice,
      should_quit: false,
      ctx,
      tasks: AsyncTasks::default(),
      pending_reveal: None,
      reveal_delay: Duration::from_millis(constants().reveal_delay_ms),
      error_time: None,
    }
  }

  pub fn theme(&self) -> &'static Theme {
    // Safety: theme_index is always bounded by modular arithmetic in next_theme()
    // and by theme_index() on initialization.
    &THEMES[self.theme_index]
  }

  pub fn strings(&self) -> &'static Strings {
    self.language.strings()
  }

  /// Set an error message with auto-dismiss tracking.
  pub fn set_error(&mut self, msg: String) {
    self.last_error = Some(msg);
    self.error_time = Some(Instant::now());
  }

  /// Clear the current error message and its expiry timer.
  pub fn clear_error(&mut self) {
    self.last_error = None;
    self.error_time = None;
  }

  /// Clear stale error messages after 5 seconds.
  pub fn expire_error(&mut self) {
    if let Some(t) = self.error_time
      && t.elapsed() >= Duration::from_secs(5)
    {
      self.last_error = None;
      self.error_time = None;
    }
  }

  fn save_config(&self) {
    let mut config = Config::load();
    config.theme_name = Some(self.theme().name.to_string());
    config.language = Some(self.language.code().to_string());
    config.save();
  }

  pub fn next_theme(&mut self) {
    self.theme_index = (self.theme_index + 1) % THEMES.len();
    self.save_config();
  }

  pub fn next_language(&mut self) {
    self.language = self.language.next();
    self.progress.set_stage_count(self.strings().stages.len());
    debug!(language = self.language.code(), "language switched");
    self.save_config();
  }

  pub fn dismiss_notice(&mut self, snooze: bool) {
    if snooze {
      notice::snooze(&self.ctx.store);
    }
    self.show_notice = false;
  }

  // --- Trending ---

  /// Fetch the trending list once in the background.
  pub fn trigger_trending(&mut self) {
    let ai = self.ctx.ai.clone();
    let (tx, rx) = oneshot::channel();
    tokio::spawn(async move {
      let _ = tx.send(resolve_trending(ai.as_deref()).await);
    });
    self.tasks.trending_rx = Some(rx);
  }

  // --- Resolution ---

  /// Resolve the typed link, or `custom` when re-entering from a list.
  ///
  /// The link is validated first; an invalid link never reaches the network.
  /// A resolution already in flight is superseded.
  pub fn trigger_resolve(&mut self, custom: Option<String>) {
    let from_list = custom.is_some();
    let raw = custom.unwrap_or_else(|| self.input.clone());
    if raw.trim().is_empty() {
      return;
    }
    let link = match validate_link(&raw, self.strings()) {
      Ok(link) => link.to_string(),
      Err(e) => {
        self.set_error(e.to_string());
        return;
      }
    };

    info!(url = %link, from_list, "resolve triggered");
    self.clear_error();
    self.info_message = None;
    self.result = None;
    self.pending_reveal = None;
    self.loading = true;
    self.progress.start();

    let resolver = Arc::clone(&self.ctx.resolver);
    let lang = self.language;
    let (tx, rx) = oneshot::channel();
    tokio::spawn(async move {
      let _ = tx.send(resolver.resolve(&link, lang).await);
    });
    self.tasks.resolve_rx = Some(rx);
    self.tasks.resolve_from_list = from_list;
  }

  fn on_resolved(&mut self, result: ResolveResult) {
    match result {
      Ok(info) => {
        self.progress.complete();
        self.history.record(&self.ctx.store, info.clone());
        self.history_state.select(None);
        self.pending_reveal =
          Some(PendingReveal { info, from_list: self.tasks.resolve_from_list, at: Instant::now() + self.reveal_delay });
      }
      Err(e) => {
        warn!(err = %e, "resolve failed");
        self.progress.stop();
        self.loading = false;
        self.set_error(e.to_string());
      }
    }
  }

  fn reveal_if_due(&mut self) {
    let due = self.pending_reveal.as_ref().is_some_and(|p| Instant::now() >= p.at);
    if !due {
      return;
    }
    if let Some(pending) = self.pending_reveal.take() {
      self.result = Some(pending.info);
      self.loading = false;
      if !pending.from_list {
        self.input.clear();
        self.cursor_position = 0;
        self.input_scroll = 0;
      }
      self.info_message = Some(self.strings().done.to_string());
    }
  }

  // --- Downloads ---

  pub fn trigger_download(&mut self, kind: MediaKind) {
    let Some(info) = self.result.clone() else { return };
    if self.downloading.is_some() {
      return;
    }
    if info.media_url(kind).is_none() {
      self.set_error(format!("No {} link for this video.", kind.label().to_lowercase()));
      return;
    }
    let client = self.ctx.http.clone();
    let dir = self.ctx.settings.download_dir.clone();
    self.downloading = Some(kind);
    self.status_message = Some(format!("Downloading {}…", kind.label().to_lowercase()));

    let (tx, rx) = oneshot::channel();
    tokio::spawn(async move {
      let _ = tx.send(download::download(&client, &info, kind, &dir).await);
    });
    self.tasks.download_rx = Some(rx);
  }

  fn on_downloaded(&mut self, outcome: DownloadOutcome) {
    self.downloading = None;
    self.status_message = None;
    match outcome {
      DownloadOutcome::Saved(path) => self.info_message = Some(format!("Saved {}", path.display())),
      DownloadOutcome::OpenedExternally(_) => {
        self.info_message = Some("Opened the media link in your browser.".to_string());
      }
      DownloadOutcome::Unavailable => self.set_error("Nothing to download.".to_string()),
    }
  }

  // --- Clipboard ---

  /// Replace the input with the clipboard text.
  pub fn paste_clipboard(&mut self) {
    match arboard::Clipboard::new().and_then(|mut cb| cb.get_text()) {
      Ok(text) => {
        let text = text.trim().to_string();
        if !text.is_empty() {
          self.cursor_position = text.chars().count();
          self.input = text;
          self.input_scroll = 0;
          self.focus = Focus::Input;
          self.clear_error();
        }
      }
      Err(arboard::Error::ContentNotAvailable) => {}
      Err(e) => {
        warn!(err = %e, "clipboard read failed");
        self.set_error(AppError::Permission(self.strings().permission_denied.to_string()).to_string());
      }
    }
  }

  /// Copy the result's direct video link, or its original link when there is none.
  pub fn copy_link(&mut self) {
    let Some(info) = &self.result else { return };
    let text = info.video_url.clone().unwrap_or_else(|| info.url.clone());
    match arboard::Clipboard::new().and_then(|mut cb| cb.set_text(text)) {
      Ok(()) => self.info_message = Some(self.strings().copied.to_string()),
      Err(e) => {
        warn!(err = %e, "clipboard write failed");
        self.set_error(AppError::Permission(self.strings().permission_denied.to_string()).to_string());
      }
    }
  }

  // --- Lists ---

  pub fn clear_history(&mut self) {
    self.history.clear(&self.ctx.store);
    self.history_state.select(None);
  }

  /// Link of the selected entry in the focused list.
  pub fn selected_link(&self) -> Option<String> {
    match self.focus {
      Focus::Trending => self.trending_state.selected().and_then(|i| self.trending.get(i)).map(|t| t.url.clone()),
      Focus::History => {
        self.history_state.selected().and_then(|i| self.history.entries().get(i)).map(|h| h.url.clone())
      }
      Focus::Input => None,
    }
  }

  pub fn list_len(&self) -> usize {
    match self.focus {
      Focus::Trending => self.trending.len(),
      Focus::History => self.history.len(),
      Focus::Input => 0,
    }
  }

  pub fn list_state_mut(&mut self) -> Option<&mut ListState> {
    match self.focus {
      Focus::Trending => Some(&mut self.trending_state),
      Focus::History => Some(&mut self.history_state),
      Focus::Input => None,
    }
  }

  pub fn cycle_focus(&mut self) {
    self.focus = self.focus.next();
    let len = self.list_len();
    if let Some(state) = self.list_state_mut()
      && state.selected().is_none()
      && len > 0
    {
      state.select(Some(0));
    }
  }

  // --- Polling ---

  pub fn check_pending(&mut self) {
    if let Some(mut rx) = self.tasks.resolve_rx.take() {
      match rx.try_recv() {
        Ok(result) => self.on_resolved(result),
        Err(oneshot::error::TryRecvError::Empty) => {
          self.tasks.resolve_rx = Some(rx);
        }
        Err(oneshot::error::TryRecvError::Closed) => {
          self.progress.stop();
          self.loading = false;
          self.set_error(self.strings().fetch_failed.to_string());
        }
      }
    }

    self.reveal_if_due();

    if let Some(mut rx) = self.tasks.trending_rx.take() {
      match rx.try_recv() {
        Ok(list) => {
          self.trending = list;
        }
        Err(oneshot::error::TryRecvError::Empty) => {
          self.tasks.trending_rx = Some(rx);
        }
        Err(oneshot::error::TryRecvError::Closed) => {}
      }
    }

    if let Some(mut rx) = self.tasks.download_rx.take() {
      match rx.try_recv() {
        Ok(outcome) => self.on_downloaded(outcome),
        Err(oneshot::error::TryRecvError::Empty) => {
          self.tasks.download_rx = Some(rx);
        }
        Err(oneshot::error::TryRecvError::Closed) => {
          self.downloading = None;
          self.status_message = None;
          self.set_error("Download task failed.".to_string());
        }
      }
    }
  }
}

#[cfg(test)]
impl App {
  /// An app over an in-memory store with no reveal hold.
  pub(crate) fn for_tests(resolver: crate::resolver::Resolver) -> Self {
    let settings = crate::config::Settings {
      language: Language::En,
      ai_credential: None,
      ai_model: "test".to_string(),
      download_dir: std::path::PathBuf::from("."),
      data_dir: None,
    };
    let ctx = Context::from_parts(settings, resolver, None);
    let mut app = App::new(Arc::new(ctx), &Config::default());
    app.reveal_delay = Duration::ZERO;
    app.show_notice = false;
    app
  }
}
