use anyhow::{Context, Result, anyhow};
use futures::StreamExt;
use reqwest::Client;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::constants::constants;
use crate::model::{MediaKind, VideoInfo};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
  Saved(PathBuf),
  /// The fetch failed; the remote URL was handed to the system opener instead.
  OpenedExternally(String),
  /// The record carries no URL for the requested kind.
  Unavailable,
}

/// `<prefix>_<id>_<Video|Audio>.<ext>`
pub fn media_file_name(info: &VideoInfo, kind: MediaKind) -> String {
  let id: String = info.id.chars().map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' }).collect();
  format!("{}_{}_{}.{}", constants().file_prefix, id, kind.label(), kind.extension())
}

async fn fetch_to_file(client: &Client, media_url: &str, dest: &Path) -> Result<()> {
  let response = client.get(media_url).send().await.context("Media request failed")?;
  if !response.status().is_success() {
    return Err(anyhow!("Media server returned {}", response.status()));
  }

  if let Some(parent) = dest.parent() {
    tokio::fs::create_dir_all(parent).await.context("Failed to create download directory")?;
  }

  // Write to a temp file, then rename
  let tmp_path = dest.with_extension("part");
  let mut file = tokio::fs::File::create(&tmp_path).await.context("Failed to create media file")?;
  let mut stream = response.bytes_stream();
  let mut written: u64 = 0;
  while let Some(chunk) = stream.next().await {
    let chunk = chunk.context("Error downloading media chunk")?;
    tokio::io::AsyncWriteExt::write_all(&mut file, &chunk).await.context("Error writing media file")?;
    written += chunk.len() as u64;
  }
  tokio::io::AsyncWriteExt::flush(&mut file).await.context("Error flushing media file")?;
  drop(file);

  tokio::fs::rename(&tmp_path, dest).await.context("Failed to finalize media file")?;
  info!(path = %dest.display(), bytes = written, "download: saved");
  Ok(())
}

/// Hand a URL to the platform's default opener.
pub fn open_external(url: &str) -> Result<()> {
  #[cfg(target_os = "macos")]
  let cmd = "open";
  #[cfg(not(target_os = "macos"))]
  let cmd = "xdg-open";
  let mut child = std::process::Command::new(cmd)
    .arg(url)
    .stdin(std::process::Stdio::null())
    .stdout(std::process::Stdio::null())
    .stderr(std::process::Stdio::null())
    .spawn()
    .with_context(|| format!("Failed to run {}", cmd))?;
  // Reap the child in a background thread to avoid zombie processes.
  std::thread::spawn(move || {
    let _ = child.wait();
  });
  Ok(())
}

/// Save the requested media of `info` into `dir`.
///
/// Fetch failures are not errors: the remote URL is opened externally instead.
pub async fn download(client: &Client, info: &VideoInfo, kind: MediaKind, dir: &Path) -> DownloadOutcome {
  download_with(client, info, kind, dir, open_external).await
}

async fn download_with(
  client: &Client,
  info: &VideoInfo,
  kind: MediaKind,
  dir: &Path,
  opener: impl Fn(&str) -> Result<()>,
) -> DownloadOutcome {
  let Some(media_url) = info.media_url(kind) else {
    return DownloadOutcome::Unavailable;
  };
  let dest = dir.join(media_file_name(info, kind));

  match fetch_to_file(client, media_url, &dest).await {
    Ok(()) => DownloadOutcome::Saved(dest),
    Err(e) => {
      warn!(url = %media_url, err = %format!("{:#}", e), "download: fetch failed, opening remote URL");
      let _ = tokio::fs::remove_file(dest.with_extension("part")).await;
      if let Err(e) = opener(media_url) {
        warn!(err = %format!("{:#}", e), "download: failed to open remote URL");
      }
      DownloadOutcome::OpenedExternally(media_url.to_string())
    }
  }
}
