use serde::{Deserialize, Serialize};

use crate::constants::constants;

pub const DEFAULT_ID: &str = "unknown";
pub const DEFAULT_TITLE: &str = "TikTok Video";
pub const DEFAULT_AUTHOR: &str = "@user";
pub const DEFAULT_MUSIC_TITLE: &str = "Original Sound";
pub const DEFAULT_DURATION: &str = "00:00";

/// Seed used for the placeholder avatar when a source gives no author identity.
pub const DEFAULT_AVATAR_SEED: &str = "user";

/// Resolved metadata for one source video.
///
/// Serialized with camelCase keys; this is also the on-disk shape of History.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoInfo {
  pub id: String,
  /// The link the user supplied, echoed back verbatim.
  pub url: String,
  pub title: String,
  pub author: String,
  pub avatar: String,
  pub cover: String,
  pub music_title: String,
  /// `MM:SS`
  pub duration: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub video_url: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub audio_url: Option<String>,
  /// Milliseconds since the Unix epoch, set once at resolution.
  pub timestamp: i64,
}

impl VideoInfo {
  /// A record made only of defaults, used when no data source could be reached.
  pub fn placeholder(url: &str) -> Self {
    Self {
      id: DEFAULT_ID.to_string(),
      url: url.to_string(),
      title: DEFAULT_TITLE.to_string(),
      author: DEFAULT_AUTHOR.to_string(),
      avatar: avatar_url(DEFAULT_AVATAR_SEED),
      cover: cover_url(url),
      music_title: DEFAULT_MUSIC_TITLE.to_string(),
      duration: DEFAULT_DURATION.to_string(),
      video_url: None,
      audio_url: None,
      timestamp: now_millis(),
    }
  }

  pub fn media_url(&self, kind: MediaKind) -> Option<&str> {
    match kind {
      MediaKind::Video => self.video_url.as_deref(),
      MediaKind::Audio => self.audio_url.as_deref(),
    }
  }
}

/// Lightweight promotional entry shown in the trending list. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendingVideo {
  pub title: String,
  pub author: String,
  pub url: String,
  pub views: String,
  pub cover: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
  Video,
  Audio,
}

impl MediaKind {
  pub fn extension(self) -> &'static str {
    match self {
      MediaKind::Video => "mp4",
      MediaKind::Audio => "mp3",
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      MediaKind::Video => "Video",
      MediaKind::Audio => "Audio",
    }
  }
}

/// Format a length in seconds as `MM:SS`. Absent, zero or non-finite input gives `00:00`.
pub fn format_duration(seconds: Option<f64>) -> String {
  let secs = match seconds {
    Some(s) if s.is_finite() && s > 0.0 => s.floor() as u64,
    _ => return DEFAULT_DURATION.to_string(),
  };
  format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Normalize a free-form duration string into `MM:SS`.
///
/// Accepts `M:SS`/`MM:SS`, `H:MM:SS` (folded into minutes) or a bare number of seconds.
/// Anything else yields `00:00`.
pub fn normalize_duration(raw: &str) -> String {
  let raw = raw.trim();
  if let Ok(secs) = raw.parse::<f64>() {
    return format_duration(Some(secs));
  }
  let parts: Option<Vec<u64>> = raw.split(':').map(|p| p.trim().parse::<u64>().ok()).collect();
  match parts.as_deref() {
    Some([m, s]) if *s < 60 => format!("{:02}:{:02}", m, s),
    Some([h, m, s]) if *m < 60 && *s < 60 => format!("{:02}:{:02}", h * 60 + m, s),
    _ => DEFAULT_DURATION.to_string(),
  }
}

fn fill_template(template: &str, seed: &str) -> String {
  template.replace("{seed}", &urlencoding::encode(seed))
}

/// Deterministic placeholder avatar seeded by author identity.
pub fn avatar_url(seed: &str) -> String {
  fill_template(&constants().avatar_template, seed)
}

/// Deterministic placeholder cover seeded by the input link.
pub fn cover_url(source_url: &str) -> String {
  fill_template(&constants().cover_template, source_url)
}

/// Deterministic trending cover; the index keeps repeated authors distinct.
pub fn trending_cover_url(index: usize, author: &str) -> String {
  let seed = format!("trend_{}_{}", index, urlencoding::encode(author));
  constants().trending_cover_template.replace("{seed}", &seed)
}

/// Fixed cover for the literal fallback entries.
pub fn named_cover_url(name: &str) -> String {
  constants().trending_cover_template.replace("{seed}", name)
}

pub fn now_millis() -> i64 {
  chrono::Utc::now().timestamp_millis()
}

/// Returns `Some(trimmed)` for a non-blank string.
pub fn non_blank(s: Option<&str>) -> Option<String> {
  s.map(str::trim).filter(|s| !s.is_empty()).map(|s| s.to_string())
}
