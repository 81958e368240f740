use anyhow::{Result, anyhow};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{info, warn};

use crate::ai::{StructuredGenerator, parse_generated, string_object_schema};
use crate::constants::constants;
use crate::model::{TrendingVideo, named_cover_url, trending_cover_url};

#[derive(Debug, Deserialize)]
struct TrendingItem {
  title: String,
  author: String,
  url: String,
  views: String,
}

/// The literal list shown when no AI source is configured or it fails.
pub fn fallback_trending() -> Vec<TrendingVideo> {
  [
    ("#ViralDance2024", "@dancer_pro", "https://www.tiktok.com/@dancer_pro/video/1", "12M", "dance"),
    ("Tech Gadgets You Need", "@techreview", "https://www.tiktok.com/@techreview/video/2", "8.5M", "tech"),
    ("ASMR Cooking", "@chef_asmr", "https://www.tiktok.com/@chef_asmr/video/3", "4.1M", "food"),
    ("Gaming Setup 2024", "@gamer_neon", "https://www.tiktok.com/@gamer_neon/video/4", "15M", "gaming"),
  ]
  .into_iter()
  .map(|(title, author, url, views, seed)| TrendingVideo {
    title: title.to_string(),
    author: author.to_string(),
    url: url.to_string(),
    views: views.to_string(),
    cover: named_cover_url(seed),
  })
  .collect()
}

fn trending_schema() -> Value {
  json!({
    "type": "ARRAY",
    "items": string_object_schema(&["title", "author", "url", "views"]),
  })
}

async fn ask_trending(generator: &dyn StructuredGenerator) -> Result<Vec<TrendingVideo>> {
  let count = constants().trending_count;
  let prompt = format!(
    "Search for current viral TikTok trends, hashtags, and popular video topics today. \
     Provide a list of {} trending items with realistic titles, mock views, and associated popular authors.",
    count
  );
  let schema = trending_schema();
  let text = generator.generate(&prompt, &schema).await?;
  let items: Vec<TrendingItem> = parse_generated(&text)?;
  if items.is_empty() {
    return Err(anyhow!("AI returned an empty trending list"));
  }
  Ok(
    items
      .into_iter()
      .take(count)
      .enumerate()
      .map(|(i, item)| TrendingVideo {
        cover: trending_cover_url(i, &item.author),
        title: item.title,
        author: item.author,
        url: item.url,
        views: item.views,
      })
      .collect(),
  )
}

/// Produce the trending list. Never fails: any fault yields [`fallback_trending`].
pub async fn resolve_trending(generator: Option<&dyn StructuredGenerator>) -> Vec<TrendingVideo> {
  let Some(generator) = generator else {
    return fallback_trending();
  };
  match ask_trending(generator).await {
    Ok(list) => {
      info!(count = list.len(), "trending: fetched from AI source");
      list
    }
    Err(e) => {
      warn!(err = %format!("{:#}", e), "trending: AI source failed, using fallback list");
      fallback_trending()
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use futures::future::BoxFuture;

  struct FakeGenerator(Result<String, &'static str>);

  impl StructuredGenerator for FakeGenerator {
    fn generate<'a>(&'a self, _prompt: &'a str, _schema: &'a Value) -> BoxFuture<'a, Result<String>> {
      let out = self.0.clone().map_err(|e| anyhow!(e));
      Box::pin(async move { out })
    }
  }

  #[tokio::test]
  async fn no_generator_returns_literal_fallback() {
    let list = resolve_trending(None).await;
    assert_eq!(list, fallback_trending());
    assert_eq!(list.len(), 4);
    assert_eq!(list[0].title, "#ViralDance2024");
    assert_eq!(list[0].cover, "https://picsum.photos/seed/dance/600/900");
    assert_eq!(list[3].views, "15M");
  }

  #[tokio::test]
  async fn generator_fault_returns_fallback() {
    let generator = FakeGenerator(Err("network down"));
    assert_eq!(resolve_trending(Some(&generator)).await, fallback_trending());
  }

  #[tokio::test]
  async fn malformed_output_returns_fallback() {
    let generator = FakeGenerator(Ok(r#"[{"title":"x"}]"#.to_string()));
    assert_eq!(resolve_trending(Some(&generator)).await, fallback_trending());
    let generator = FakeGenerator(Ok("[]".to_string()));
    assert_eq!(resolve_trending(Some(&generator)).await, fallback_trending());
  }

  #[tokio::test]
  async fn generated_items_get_distinct_covers() {
    let text = r#"[
      {"title":"A","author":"@same","url":"https://www.tiktok.com/@same/video/1","views":"1M"},
      {"title":"B","author":"@same","url":"https://www.tiktok.com/@same/video/2","views":"2M"}
    ]"#;
    let generator = FakeGenerator(Ok(text.to_string()));
    let list = resolve_trending(Some(&generator)).await;
    assert_eq!(list.len(), 2);
    assert_eq!(list[1].title, "B");
    assert_ne!(list[0].cover, list[1].cover);
    assert_eq!(list[0].cover, trending_cover_url(0, "@same"));
  }

  #[test]
  fn schema_is_array_of_objects() {
    let schema = trending_schema();
    assert_eq!(schema["type"], "ARRAY");
    assert_eq!(schema["items"]["required"], json!(["title", "author", "url", "views"]));
  }
}
