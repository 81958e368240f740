mod ai;
mod app;
mod config;
mod constants;
mod context;
mod download;
mod error;
mod history;
mod i18n;
mod input;
mod logging;
mod model;
mod notice;
mod progress;
mod resolver;
mod storage;
mod theme;
mod trending;
mod ui;

use anyhow::{Context as _, Result, bail};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use ratatui::{
  DefaultTerminal,
  crossterm::event::{self, Event, KeyEventKind},
};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use app::App;
use config::{CliOverrides, Config, Settings};
use context::Context;
use download::DownloadOutcome;
use error::validate_link;
use history::History;
use i18n::Language;
use model::{MediaKind, VideoInfo};
use progress::ProgressSimulator;

// --- CLI ---

#[derive(Parser, Debug)]
#[command(author, version = env!("CARGO_PKG_VERSION"), about, long_about = None)]
struct Args {
  /// Interface language (default: from prefs, else en)
  #[arg(short, long, global = true)]
  lang: Option<Language>,

  /// AI credential for this run; overrides the environment and prefs
  #[arg(long, global = true)]
  api_key: Option<String>,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Resolve a video link to its metadata
  Resolve {
    url: String,
    /// Print the record as JSON
    #[arg(long)]
    json: bool,
  },
  /// Show the trending list
  Trending {
    #[arg(long)]
    json: bool,
  },
  /// Show or clear recent resolutions
  History {
    #[arg(long)]
    clear: bool,
    #[arg(long)]
    json: bool,
  },
  /// Resolve a link and save its video or audio
  Download {
    url: String,
    /// Save the audio track instead of the video
    #[arg(long)]
    audio: bool,
    /// Target directory (default: from prefs, else the Downloads folder)
    #[arg(short, long)]
    out: Option<PathBuf>,
  },
  /// Print a shell completion script
  Completions { shell: Shell },
}

// --- Main ---

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();

  if let Some(Command::Completions { shell }) = args.command {
    let bin_name = constants::constants().app_name.clone();
    clap_complete::generate(shell, &mut Args::command(), bin_name, &mut std::io::stdout());
    return Ok(());
  }

  let config = Config::load();
  let settings = Settings::resolve(&config, CliOverrides { language: args.lang, api_key: args.api_key });
  let _log_guard = logging::init(settings.data_dir.as_deref());
  info!(version = env!("CARGO_PKG_VERSION"), command = ?args.command, "starting");

  let ctx = Arc::new(Context::build(settings)?);

  match args.command {
    None => run_tui(ctx, &config),
    Some(Command::Resolve { url, json }) => cmd_resolve(&ctx, &url, json).await,
    Some(Command::Trending { json }) => cmd_trending(&ctx, json).await,
    Some(Command::History { clear, json }) => cmd_history(&ctx, clear, json),
    Some(Command::Download { url, audio, out }) => {
      cmd_download(&ctx, &url, if audio { MediaKind::Audio } else { MediaKind::Video }, out).await
    }
    Some(Command::Completions { .. }) => Ok(()),
  }
}

// --- Commands ---

/// Resolve with the stage animation on stderr and record the result in History.
async fn resolve_with_progress(ctx: &Context, url: &str) -> Result<VideoInfo> {
  let lang = ctx.settings.language;
  let strings = lang.strings();
  let link = validate_link(url, strings)?;

  let mut progress = ProgressSimulator::from_constants(strings.stages.len());
  progress.start();
  let mut stderr = std::io::stderr();
  let mut redraw = tokio::time::interval(Duration::from_millis(100));

  let resolving = ctx.resolver.resolve(link, lang);
  tokio::pin!(resolving);
  let outcome = loop {
    tokio::select! {
      result = &mut resolving => break result,
      _ = redraw.tick(), if progress.is_running() => {
        let p = progress.snapshot();
        let _ = write!(stderr, "\r\x1b[2K{} {:>3.0}%", strings.stages[p.stage], p.value.floor());
        let _ = stderr.flush();
      }
    }
  };

  match outcome {
    Ok(info) => {
      progress.complete();
      let last = strings.stages[strings.stages.len() - 1];
      let _ = writeln!(stderr, "\r\x1b[2K{} 100%", last);
      let mut history = History::load(&ctx.store);
      history.record(&ctx.store, info.clone());
      Ok(info)
    }
    Err(e) => {
      progress.stop();
      let _ = writeln!(stderr, "\r\x1b[2K");
      Err(e.into())
    }
  }
}

fn print_record(info: &VideoInfo) {
  println!("{}", info.title);
  println!("  author    {}", info.author);
  println!("  sound     {}", info.music_title);
  println!("  duration  {}", info.duration);
  println!("  id        {}", info.id);
  println!("  cover     {}", info.cover);
  println!("  video     {}", info.video_url.as_deref().unwrap_or("-"));
  println!("  audio     {}", info.audio_url.as_deref().unwrap_or("-"));
}

async fn cmd_resolve(ctx: &Context, url: &str, json: bool) -> Result<()> {
  let info = resolve_with_progress(ctx, url).await?;
  if json {
    println!("{}", serde_json::to_string_pretty(&info)?);
  } else {
    print_record(&info);
  }
  Ok(())
}

async fn cmd_trending(ctx: &Context, json: bool) -> Result<()> {
  let list = trending::resolve_trending(ctx.ai.as_deref()).await;
  if json {
    println!("{}", serde_json::to_string_pretty(&list)?);
    return Ok(());
  }
  println!("{}", ctx.settings.language.strings().trending);
  for (i, t) in list.iter().enumerate() {
    println!("{:>2}. {}  {}  {}", i + 1, t.title, t.author, t.views);
    println!("    {}", t.url);
  }
  Ok(())
}

fn cmd_history(ctx: &Context, clear: bool, json: bool) -> Result<()> {
  let mut history = History::load(&ctx.store);
  if clear {
    history.clear(&ctx.store);
    return Ok(());
  }
  if json {
    println!("{}", serde_json::to_string_pretty(history.entries())?);
    return Ok(());
  }
  if history.is_empty() {
    println!("{}: -", ctx.settings.language.strings().history);
    return Ok(());
  }
  for (i, h) in history.entries().iter().enumerate() {
    println!("{:>2}. {}  {}  {}", i + 1, h.title, h.author, h.duration);
    println!("    {}", h.url);
  }
  Ok(())
}

async fn cmd_download(ctx: &Context, url: &str, kind: MediaKind, out: Option<PathBuf>) -> Result<()> {
  let info = resolve_with_progress(ctx, url).await?;
  let dir = out.unwrap_or_else(|| ctx.settings.download_dir.clone());
  tokio::fs::create_dir_all(&dir).await.with_context(|| format!("Failed to create {}", dir.display()))?;

  match download::download(&ctx.http, &info, kind, &dir).await {
    DownloadOutcome::Saved(path) => println!("{}", path.display()),
    DownloadOutcome::OpenedExternally(link) => println!("Opened {} in the browser", link),
    DownloadOutcome::Unavailable => bail!("No {} link for this video", kind.label().to_lowercase()),
  }
  Ok(())
}

// --- TUI ---

fn run_tui(ctx: Arc<Context>, config: &Config) -> Result<()> {
  let default_hook = std::panic::take_hook();
  std::panic::set_hook(Box::new(move |info| {
    ratatui::restore();
    default_hook(info);
  }));

  let mut terminal = ratatui::init();
  let result = run(&mut terminal, ctx, config);
  ratatui::restore();
  result
}

fn run(terminal: &mut DefaultTerminal, ctx: Arc<Context>, config: &Config) -> Result<()> {
  let mut app = App::new(ctx, config);
  app.trigger_trending();

  loop {
    app.check_pending();
    app.expire_error();

    terminal.draw(|frame| ui::ui(frame, &mut app))?;

    if event::poll(Duration::from_millis(100))? {
      match event::read()? {
        Event::Key(key) if key.kind == KeyEventKind::Press => {
          input::handle_key_event(&mut app, key);
        }
        _ => {}
      }
    }

    if app.should_quit {
      break;
    }
  }

  info!("exiting");
  Ok(())
}
