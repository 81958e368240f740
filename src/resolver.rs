//! Metadata resolution: an ordered chain of sources tried until one yields a record.
//!
//! Default order: no-auth scraper, then the AI source when a credential is
//! configured, otherwise an offline record made of defaults. A fault in any
//! source but the last falls through to the next one; a fault in the last one
//! becomes [`AppError::Extraction`].

use anyhow::{Context, Result, anyhow};
use futures::future::BoxFuture;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::ai::{StructuredGenerator, parse_generated, string_object_schema};
use crate::constants::constants;
use crate::error::AppError;
use crate::i18n::Language;
use crate::model::{
  DEFAULT_AUTHOR, DEFAULT_AVATAR_SEED, DEFAULT_ID, DEFAULT_MUSIC_TITLE, DEFAULT_TITLE, VideoInfo, avatar_url,
  cover_url, format_duration, non_blank, normalize_duration, now_millis,
};

/// One source in the resolution chain.
pub trait MetadataStrategy: Send + Sync {
  fn name(&self) -> &'static str;
  fn resolve<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<VideoInfo>>;
}

pub struct Resolver {
  strategies: Vec<Box<dyn MetadataStrategy>>,
}

impl Resolver {
  /// Build the standard chain. `ai` is `None` when no credential is configured.
  pub fn new(http: Client, ai: Option<Arc<dyn StructuredGenerator>>) -> Self {
    let mut strategies: Vec<Box<dyn MetadataStrategy>> = vec![Box::new(ScraperSource::new(http))];
    match ai {
      Some(generator) => strategies.push(Box::new(AiMetadataSource::new(generator))),
      None => strategies.push(Box::new(OfflineFallback)),
    }
    Self { strategies }
  }

  pub fn with_strategies(strategies: Vec<Box<dyn MetadataStrategy>>) -> Self {
    Self { strategies }
  }

  pub fn strategy_names(&self) -> Vec<&'static str> {
    self.strategies.iter().map(|s| s.name()).collect()
  }

  pub async fn resolve(&self, url: &str, lang: Language) -> Result<VideoInfo, AppError> {
    let extraction =
      |source: anyhow::Error| AppError::Extraction { message: lang.strings().extraction_failed.to_string(), source };

    let last = self.strategies.len().saturating_sub(1);
    for (i, strategy) in self.strategies.iter().enumerate() {
      match strategy.resolve(url).await {
        Ok(info) => {
          info!(source = strategy.name(), id = %info.id, "resolve: resolved");
          return Ok(info);
        }
        Err(e) if i < last => {
          warn!(source = strategy.name(), err = %format!("{:#}", e), "resolve: source failed, falling through");
        }
        Err(e) => {
          warn!(source = strategy.name(), err = %format!("{:#}", e), "resolve: last source failed");
          return Err(extraction(e));
        }
      }
    }
    Err(extraction(anyhow!("no metadata source configured")))
  }
}

// --- Scraper ---

/// The no-credential scraping endpoint.
pub struct ScraperSource {
  http: Client,
  endpoint: String,
}

impl ScraperSource {
  pub fn new(http: Client) -> Self {
    Self { http, endpoint: constants().scraper_endpoint.clone() }
  }

  fn request_url(&self, url: &str) -> String {
    format!("{}?url={}", self.endpoint, urlencoding::encode(url))
  }

  async fn fetch(&self, url: &str) -> Result<VideoInfo> {
    let response = self
      .http
      .get(self.request_url(url))
      .timeout(Duration::from_secs(constants().request_timeout_secs))
      .send()
      .await
      .context("Scraper request failed")?;
    let body: Value = response.json().await.context("Scraper response was not JSON")?;
    scraper_record(url, body)
  }
}

impl MetadataStrategy for ScraperSource {
  fn name(&self) -> &'static str {
    "scraper"
  }

  fn resolve<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<VideoInfo>> {
    Box::pin(self.fetch(url))
  }
}

#[derive(Debug, Deserialize)]
struct ScraperResponse {
  code: Option<i64>,
  data: Option<ScraperData>,
}

#[derive(Debug, Deserialize)]
struct ScraperData {
  id: Option<Value>,
  title: Option<String>,
  author: Option<ScraperAuthor>,
  cover: Option<String>,
  origin_cover: Option<String>,
  music_info: Option<ScraperMusic>,
  duration: Option<f64>,
  play: Option<String>,
  music: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ScraperAuthor {
  id: Option<Value>,
  nickname: Option<String>,
  avatar: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ScraperMusic {
  title: Option<String>,
}

/// Identifiers arrive as either strings or numbers.
fn value_to_id(v: Option<&Value>) -> Option<String> {
  match v? {
    Value::String(s) => non_blank(Some(s.as_str())),
    Value::Number(n) => Some(n.to_string()),
    _ => None,
  }
}

/// Map a scraper response body into a record. Any shape other than
/// `{code: 0, data: {...}}` is an error so the chain falls through.
fn scraper_record(url: &str, body: Value) -> Result<VideoInfo> {
  let parsed: ScraperResponse = serde_json::from_value(body).context("Unexpected scraper response shape")?;
  let data = match (parsed.code, parsed.data) {
    (Some(0), Some(data)) => data,
    (code, _) => return Err(anyhow!("Scraper reported no data (code {:?})", code)),
  };

  let author = data.author.as_ref();
  let avatar_seed = value_to_id(author.and_then(|a| a.id.as_ref())).unwrap_or_else(|| DEFAULT_AVATAR_SEED.to_string());

  Ok(VideoInfo {
    id: value_to_id(data.id.as_ref()).unwrap_or_else(|| DEFAULT_ID.to_string()),
    url: url.to_string(),
    title: non_blank(data.title.as_deref()).unwrap_or_else(|| DEFAULT_TITLE.to_string()),
    author: non_blank(author.and_then(|a| a.nickname.as_deref())).unwrap_or_else(|| DEFAULT_AUTHOR.to_string()),
    avatar: non_blank(author.and_then(|a| a.avatar.as_deref())).unwrap_or_else(|| avatar_url(&avatar_seed)),
    cover: non_blank(data.cover.as_deref())
      .or_else(|| non_blank(data.origin_cover.as_deref()))
      .unwrap_or_else(|| cover_url(url)),
    music_title: non_blank(data.music_info.as_ref().and_then(|m| m.title.as_deref()))
      .unwrap_or_else(|| DEFAULT_MUSIC_TITLE.to_string()),
    duration: format_duration(data.duration),
    video_url: non_blank(data.play.as_deref()),
    audio_url: non_blank(data.music.as_deref()),
    timestamp: now_millis(),
  })
}

// --- AI ---

const METADATA_FIELDS: [&str; 5] = ["id", "title", "author", "musicTitle", "duration"];

/// Asks the generative service for metadata in a fixed schema.
pub struct AiMetadataSource {
  generator: Arc<dyn StructuredGenerator>,
  schema: Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AiMetadata {
  id: String,
  title: String,
  author: String,
  music_title: String,
  duration: String,
}

impl AiMetadataSource {
  pub fn new(generator: Arc<dyn StructuredGenerator>) -> Self {
    Self { generator, schema: string_object_schema(&METADATA_FIELDS) }
  }

  async fn ask(&self, url: &str) -> Result<VideoInfo> {
    let prompt = format!("Analyze this TikTok link and return its real metadata: {}.", url);
    let text = self.generator.generate(&prompt, &self.schema).await?;
    let meta: AiMetadata = parse_generated(&text)?;
    Ok(ai_record(url, meta))
  }
}

fn ai_record(url: &str, meta: AiMetadata) -> VideoInfo {
  let author = non_blank(Some(meta.author.as_str())).unwrap_or_else(|| DEFAULT_AUTHOR.to_string());
  VideoInfo {
    id: non_blank(Some(meta.id.as_str())).unwrap_or_else(|| DEFAULT_ID.to_string()),
    url: url.to_string(),
    title: non_blank(Some(meta.title.as_str())).unwrap_or_else(|| DEFAULT_TITLE.to_string()),
    avatar: avatar_url(&author),
    author,
    cover: cover_url(url),
    music_title: non_blank(Some(meta.music_title.as_str())).unwrap_or_else(|| DEFAULT_MUSIC_TITLE.to_string()),
    duration: normalize_duration(&meta.duration),
    video_url: None,
    audio_url: None,
    timestamp: now_millis(),
  }
}

impl MetadataStrategy for AiMetadataSource {
  fn name(&self) -> &'static str {
    "ai"
  }

  fn resolve<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<VideoInfo>> {
    Box::pin(self.ask(url))
  }
}

// --- Offline ---

/// Terminal source used when no credential is configured: never fails.
pub struct OfflineFallback;

impl MetadataStrategy for OfflineFallback {
  fn name(&self) -> &'static str {
    "offline"
  }

  fn resolve<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<VideoInfo>> {
    Box::pin(async move { Ok(VideoInfo::placeholder(url)) })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;
  use std::sync::atomic::{AtomicUsize, Ordering};

  const LINK: &str = "https://www.tiktok.com/@user/video/123";

  /// Strategy that always fails and counts calls.
  struct Failing(Arc<AtomicUsize>);

  impl MetadataStrategy for Failing {
    fn name(&self) -> &'static str {
      "failing"
    }
    fn resolve<'a>(&'a self, _url: &'a str) -> BoxFuture<'a, Result<VideoInfo>> {
      self.0.fetch_add(1, Ordering::SeqCst);
      Box::pin(async { Err(anyhow!("connection refused")) })
    }
  }

  struct Fixed(&'static str);

  impl MetadataStrategy for Fixed {
    fn name(&self) -> &'static str {
      "fixed"
    }
    fn resolve<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<VideoInfo>> {
      let mut info = VideoInfo::placeholder(url);
      info.id = self.0.to_string();
      Box::pin(async move { Ok(info) })
    }
  }

  struct FakeGenerator(Result<String, &'static str>);

  impl StructuredGenerator for FakeGenerator {
    fn generate<'a>(&'a self, _prompt: &'a str, _schema: &'a Value) -> BoxFuture<'a, Result<String>> {
      let out = self.0.clone().map_err(|e| anyhow!(e));
      Box::pin(async move { out })
    }
  }

  fn counter() -> Arc<AtomicUsize> {
    Arc::new(AtomicUsize::new(0))
  }

  // --- scraper mapping ---

  #[test]
  fn scraper_record_end_to_end_example() {
    let body = json!({
      "code": 0,
      "data": {
        "id": "123", "title": "Hello", "author": { "nickname": "@user" },
        "cover": "c.jpg", "duration": 65, "play": "v.mp4", "music": "a.mp3"
      }
    });
    let info = scraper_record(LINK, body).unwrap();
    assert_eq!(info.id, "123");
    assert_eq!(info.title, "Hello");
    assert_eq!(info.author, "@user");
    assert_eq!(info.cover, "c.jpg");
    assert_eq!(info.duration, "01:05");
    assert_eq!(info.video_url.as_deref(), Some("v.mp4"));
    assert_eq!(info.audio_url.as_deref(), Some("a.mp3"));
    assert_eq!(info.url, LINK);
    assert_eq!(info.music_title, "Original Sound");
    assert_eq!(info.avatar, avatar_url("user"));
  }

  #[test]
  fn scraper_record_keeps_input_url() {
    let body = json!({ "code": 0, "data": { "id": 9, "url": "https://elsewhere.example/x" } });
    let info = scraper_record("https://vm.tiktok.com/ZMabc/", body).unwrap();
    assert_eq!(info.url, "https://vm.tiktok.com/ZMabc/");
    assert_eq!(info.id, "9");
  }

  #[test]
  fn scraper_record_defaults() {
    let body = json!({ "code": 0, "data": { "origin_cover": "o.jpg", "author": { "id": 77, "nickname": "" } } });
    let info = scraper_record(LINK, body).unwrap();
    assert_eq!(info.id, "unknown");
    assert_eq!(info.title, "TikTok Video");
    assert_eq!(info.author, "@user");
    assert_eq!(info.avatar, avatar_url("77"));
    assert_eq!(info.cover, "o.jpg");
    assert_eq!(info.duration, "00:00");
    assert!(info.video_url.is_none());
    assert!(info.audio_url.is_none());
  }

  #[test]
  fn scraper_record_cover_placeholder_when_missing() {
    let info = scraper_record(LINK, json!({ "code": 0, "data": {} })).unwrap();
    assert_eq!(info.cover, cover_url(LINK));
  }

  #[test]
  fn scraper_record_rejects_non_success() {
    assert!(scraper_record(LINK, json!({ "code": -1, "msg": "Url parsing is failed!" })).is_err());
    assert!(scraper_record(LINK, json!({ "code": 0 })).is_err());
    assert!(scraper_record(LINK, json!({ "code": 0, "data": null })).is_err());
    assert!(scraper_record(LINK, json!([1, 2, 3])).is_err());
    assert!(scraper_record(LINK, json!({ "code": 0, "data": { "duration": "long" } })).is_err());
  }

  #[test]
  fn scraper_request_url_is_percent_encoded() {
    let source = ScraperSource { http: Client::new(), endpoint: "https://scraper.test/api/".to_string() };
    assert_eq!(
      source.request_url(LINK),
      "https://scraper.test/api/?url=https%3A%2F%2Fwww.tiktok.com%2F%40user%2Fvideo%2F123"
    );
  }

  // --- AI mapping ---

  #[test]
  fn ai_record_computes_seeded_fields() {
    let meta = AiMetadata {
      id: "55".to_string(),
      title: "Dance".to_string(),
      author: "@dancer pro".to_string(),
      music_title: "Beat".to_string(),
      duration: "0:42".to_string(),
    };
    let info = ai_record(LINK, meta);
    assert_eq!(info.avatar, avatar_url("@dancer pro"));
    assert!(info.avatar.ends_with("seed=%40dancer%20pro"));
    assert_eq!(info.cover, cover_url(LINK));
    assert_eq!(info.duration, "00:42");
    assert_eq!(info.url, LINK);
    assert!(info.video_url.is_none());
  }

  #[tokio::test]
  async fn ai_source_rejects_schema_violation() {
    let source = AiMetadataSource::new(Arc::new(FakeGenerator(Ok(r#"{"id":"1","title":"t"}"#.to_string()))));
    assert!(source.resolve(LINK).await.is_err());
  }

  #[tokio::test]
  async fn ai_source_parses_valid_output() {
    let text = r#"{"id":"1","title":"t","author":"@a","musicTitle":"m","duration":"75"}"#;
    let source = AiMetadataSource::new(Arc::new(FakeGenerator(Ok(text.to_string()))));
    let info = source.resolve(LINK).await.unwrap();
    assert_eq!(info.id, "1");
    assert_eq!(info.music_title, "m");
    assert_eq!(info.duration, "01:15");
  }

  // --- chain ---

  #[tokio::test]
  async fn first_success_wins() {
    let calls = counter();
    let resolver = Resolver::with_strategies(vec![Box::new(Fixed("first")), Box::new(Failing(calls.clone()))]);
    let info = resolver.resolve(LINK, Language::En).await.unwrap();
    assert_eq!(info.id, "first");
    assert_eq!(calls.load(Ordering::SeqCst), 0);
  }

  #[tokio::test]
  async fn unreachable_scraper_without_credential_gives_placeholder() {
    let calls = counter();
    let resolver = Resolver::with_strategies(vec![Box::new(Failing(calls.clone())), Box::new(OfflineFallback)]);
    let info = resolver.resolve(LINK, Language::En).await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(info.id, "unknown");
    assert!(info.video_url.is_none());
    assert!(info.audio_url.is_none());
    assert_eq!(info.url, LINK);
  }

  #[tokio::test]
  async fn scraper_and_ai_faults_give_extraction_error() {
    let calls = counter();
    let ai = AiMetadataSource::new(Arc::new(FakeGenerator(Err("quota exceeded"))));
    let resolver = Resolver::with_strategies(vec![Box::new(Failing(calls.clone())), Box::new(ai)]);
    let err = resolver.resolve(LINK, Language::Vi).await.unwrap_err();
    match err {
      AppError::Extraction { ref message, .. } => {
        assert_eq!(message, Language::Vi.strings().extraction_failed);
        assert!(!message.is_empty());
      }
      other => panic!("expected extraction error, got {:?}", other),
    }
  }

  #[tokio::test]
  async fn malformed_ai_json_gives_extraction_error() {
    let calls = counter();
    let ai = AiMetadataSource::new(Arc::new(FakeGenerator(Ok("<html>".to_string()))));
    let resolver = Resolver::with_strategies(vec![Box::new(Failing(calls)), Box::new(ai)]);
    assert!(matches!(resolver.resolve(LINK, Language::En).await, Err(AppError::Extraction { .. })));
  }

  #[tokio::test]
  async fn empty_chain_is_extraction_error() {
    let resolver = Resolver::with_strategies(Vec::new());
    assert!(matches!(resolver.resolve(LINK, Language::En).await, Err(AppError::Extraction { .. })));
  }

  #[test]
  fn standard_chain_order() {
    let without = Resolver::new(Client::new(), None);
    assert_eq!(without.strategy_names(), vec!["scraper", "offline"]);
    let with = Resolver::new(Client::new(), Some(Arc::new(FakeGenerator(Ok(String::new())))));
    assert_eq!(with.strategy_names(), vec!["scraper", "ai"]);
  }
}
