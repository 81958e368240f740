use thiserror::Error;

use crate::constants::constants;
use crate::i18n::Strings;

/// Faults the user sees. Messages are already localized.
#[derive(Error, Debug)]
pub enum AppError {
  /// The link failed the cheap format check; no request was made.
  #[error("{0}")]
  InvalidInput(String),

  /// Every resolution-path fault collapses into this one kind.
  #[error("{message}")]
  Extraction {
    message: String,
    #[source]
    source: anyhow::Error,
  },

  /// Clipboard access was refused.
  #[error("{0}")]
  Permission(String),
}

/// Check that `input` looks like a link to the supported platform.
///
/// Returns the trimmed link. Runs before any network call.
pub fn validate_link<'a>(input: &'a str, strings: &Strings) -> Result<&'a str, AppError> {
  let link = input.trim();
  if link.is_empty() || !link.contains(constants().source_domain.as_str()) {
    return Err(AppError::InvalidInput(strings.invalid_url.to_string()));
  }
  Ok(link)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::i18n::Language;

  #[test]
  fn validate_accepts_platform_links() {
    let t = Language::En.strings();
    assert_eq!(
      validate_link("  https://www.tiktok.com/@user/video/123 ", t).unwrap(),
      "https://www.tiktok.com/@user/video/123"
    );
    assert!(validate_link("https://vm.tiktok.com/ZMabc/", t).is_ok());
  }

  #[test]
  fn validate_rejects_other_links() {
    let t = Language::En.strings();
    let err = validate_link("https://youtube.com/watch?v=1", t).unwrap_err();
    assert!(matches!(err, AppError::InvalidInput(_)));
    assert_eq!(err.to_string(), t.invalid_url);
  }

  #[test]
  fn validate_rejects_blank() {
    let t = Language::Vi.strings();
    assert!(matches!(validate_link("   ", t), Err(AppError::InvalidInput(_))));
  }
}
