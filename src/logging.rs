use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Route `tracing` output to `neontok.log` in `dir`.
///
/// Stdout belongs to the TUI, so nothing is written to the terminal. The
/// returned guard flushes the writer on drop and must outlive the program.
/// Filter comes from `RUST_LOG`, default `neontok=info`.
pub fn init(dir: Option<&Path>) -> Option<WorkerGuard> {
  let dir = dir?;
  if std::fs::create_dir_all(dir).is_err() {
    return None;
  }
  let appender = tracing_appender::rolling::never(dir, "neontok.log");
  let (writer, guard) = tracing_appender::non_blocking(appender);
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("neontok=info"));
  let installed = tracing_subscriber::fmt().with_env_filter(filter).with_writer(writer).with_ansi(false).try_init();
  installed.ok().map(|_| guard)
}
