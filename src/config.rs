use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::warn;

use crate::constants::constants;
use crate::i18n::Language;

/// Environment variables checked for the AI credential, in priority order.
pub const CREDENTIAL_ENV_VARS: [&str; 2] = ["NEONTOK_AI_KEY", "GEMINI_API_KEY"];

/// User preferences stored in `prefs.toml`.
#[derive(Serialize, Deserialize, Default, Debug, Clone, PartialEq)]
pub struct Config {
  pub theme_name: Option<String>,
  pub language: Option<String>,
  pub ai_api_key: Option<String>,
  pub ai_model: Option<String>,
  pub download_dir: Option<PathBuf>,
}

pub fn project_dirs() -> Option<ProjectDirs> {
  ProjectDirs::from("", "", &constants().app_name)
}

impl Config {
  pub fn load() -> Self {
    if let Some(proj_dirs) = project_dirs() {
      let config_file = proj_dirs.config_dir().join("prefs.toml");
      if let Ok(content) = std::fs::read_to_string(config_file) {
        match toml::from_str(&content) {
          Ok(config) => return config,
          Err(e) => warn!(err = %e, "config: prefs.toml is invalid, using defaults"),
        }
      }
    }
    Self::default()
  }

  pub fn save(&self) {
    if let Some(proj_dirs) = project_dirs() {
      let config_dir = proj_dirs.config_dir();
      if std::fs::create_dir_all(config_dir).is_ok() {
        let config_file = config_dir.join("prefs.toml");
        if let Ok(content) = toml::to_string(self) {
          let _ = std::fs::write(config_file, content);
        }
      }
    }
  }
}

/// Runtime configuration resolved once at start-up.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
  pub language: Language,
  /// `None` means no AI source; the resolver then ends in the offline record.
  pub ai_credential: Option<String>,
  pub ai_model: String,
  pub download_dir: PathBuf,
  /// Where History and other persisted state live; `None` keeps it in memory.
  pub data_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
  pub language: Option<Language>,
  pub api_key: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
  value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl Settings {
  pub fn resolve(config: &Config, overrides: CliOverrides) -> Self {
    let dirs = project_dirs();
    let data_dir = dirs.as_ref().map(|d| d.data_dir().to_path_buf());
    let fallback_download = directories::UserDirs::new()
      .and_then(|u| u.download_dir().map(|p| p.to_path_buf()))
      .unwrap_or_else(|| PathBuf::from("."));
    Self::build(config, overrides, |k| std::env::var(k).ok(), data_dir, fallback_download)
  }

  fn build(
    config: &Config,
    overrides: CliOverrides,
    env_lookup: impl Fn(&str) -> Option<String>,
    data_dir: Option<PathBuf>,
    fallback_download: PathBuf,
  ) -> Self {
    let ai_credential = non_blank(overrides.api_key)
      .or_else(|| CREDENTIAL_ENV_VARS.iter().find_map(|k| non_blank(env_lookup(k))))
      .or_else(|| non_blank(config.ai_api_key.clone()));
    let language = overrides
      .language
      .or_else(|| config.language.as_deref().map(Language::from_config))
      .unwrap_or(Language::En);
    let ai_model = non_blank(config.ai_model.clone()).unwrap_or_else(|| constants().ai_default_model.clone());
    let download_dir = config.download_dir.clone().unwrap_or(fallback_download);

    Self { language, ai_credential, ai_model, download_dir, data_dir }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::HashMap;

  fn build(config: &Config, overrides: CliOverrides, env: &[(&str, &str)]) -> Settings {
    let env: HashMap<String, String> = env.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
    Settings::build(config, overrides, |k| env.get(k).cloned(), None, PathBuf::from("/tmp/dl"))
  }

  #[test]
  fn credential_absent_everywhere() {
    let settings = build(&Config::default(), CliOverrides::default(), &[]);
    assert_eq!(settings.ai_credential, None);
    assert_eq!(settings.language, Language::En);
    assert_eq!(settings.ai_model, constants().ai_default_model);
    assert_eq!(settings.download_dir, PathBuf::from("/tmp/dl"));
  }

  #[test]
  fn credential_priority() {
    let config = Config { ai_api_key: Some("from-file".to_string()), ..Config::default() };
    assert_eq!(build(&config, CliOverrides::default(), &[]).ai_credential.as_deref(), Some("from-file"));
    assert_eq!(
      build(&config, CliOverrides::default(), &[("GEMINI_API_KEY", "gemini")]).ai_credential.as_deref(),
      Some("gemini")
    );
    assert_eq!(
      build(&config, CliOverrides::default(), &[("GEMINI_API_KEY", "gemini"), ("NEONTOK_AI_KEY", "own")])
        .ai_credential
        .as_deref(),
      Some("own")
    );
    let cli = CliOverrides { api_key: Some("flag".to_string()), ..CliOverrides::default() };
    assert_eq!(build(&config, cli, &[("NEONTOK_AI_KEY", "own")]).ai_credential.as_deref(), Some("flag"));
  }

  #[test]
  fn blank_credentials_count_as_absent() {
    let config = Config { ai_api_key: Some("   ".to_string()), ..Config::default() };
    let cli = CliOverrides { api_key: Some(String::new()), ..CliOverrides::default() };
    assert_eq!(build(&config, cli, &[("NEONTOK_AI_KEY", "")]).ai_credential, None);
  }

  #[test]
  fn language_from_flag_then_file() {
    let config = Config { language: Some("ja".to_string()), ..Config::default() };
    assert_eq!(build(&config, CliOverrides::default(), &[]).language, Language::Ja);
    let cli = CliOverrides { language: Some(Language::Vi), ..CliOverrides::default() };
    assert_eq!(build(&config, cli, &[]).language, Language::Vi);
  }

  #[test]
  fn config_parses_from_toml() {
    let config: Config = toml::from_str(
      r#"
        theme_name = "Neon"
        language = "vi"
        ai_model = "gemini-2.5-flash"
        download_dir = "/data/videos"
      "#,
    )
    .unwrap();
    assert_eq!(config.theme_name.as_deref(), Some("Neon"));
    let settings = build(&config, CliOverrides::default(), &[]);
    assert_eq!(settings.ai_model, "gemini-2.5-flash");
    assert_eq!(settings.download_dir, PathBuf::from("/data/videos"));
    assert_eq!(settings.language, Language::Vi);
  }
}
