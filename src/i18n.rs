//! User-facing strings for the supported interface languages.

use clap::ValueEnum;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Language {
  En,
  Vi,
  Ja,
}

impl Language {
  pub const ALL: [Language; 3] = [Language::En, Language::Vi, Language::Ja];

  pub fn code(self) -> &'static str {
    match self {
      Language::En => "en",
      Language::Vi => "vi",
      Language::Ja => "ja",
    }
  }

  pub fn from_config(s: &str) -> Self {
    match s.to_lowercase().as_str() {
      "vi" => Language::Vi,
      "ja" => Language::Ja,
      _ => Language::En,
    }
  }

  pub fn next(self) -> Self {
    let idx = Self::ALL.iter().position(|l| *l == self).unwrap_or(0);
    Self::ALL[(idx + 1) % Self::ALL.len()]
  }

  pub fn strings(self) -> &'static Strings {
    match self {
      Language::En => &EN,
      Language::Vi => &VI,
      Language::Ja => &JA,
    }
  }
}

pub struct Strings {
  pub placeholder: &'static str,
  pub extract: &'static str,
  pub video: &'static str,
  pub audio: &'static str,
  pub processing: &'static str,
  pub done: &'static str,
  pub copied: &'static str,
  pub history: &'static str,
  pub trending: &'static str,
  pub audio_note: &'static str,
  pub steps_title: &'static str,
  pub steps: [&'static str; 3],
  /// Ordered labels for the progress animation; the last one is shown on completion.
  pub stages: [&'static str; 5],
  pub invalid_url: &'static str,
  pub fetch_failed: &'static str,
  pub permission_denied: &'static str,
  pub extraction_failed: &'static str,
  pub disclaimer: &'static str,
}

static EN: Strings = Strings {
  placeholder: "Paste TikTok link here...",
  extract: "EXTRACT",
  video: "Video (MP4)",
  audio: "Audio (MP3)",
  processing: "Decrypting link...",
  done: "Ready to extract!",
  copied: "Copied!",
  history: "History",
  trending: "Trending Now",
  audio_note: "Note: If the MP3 is only 60s, it is a TikTok copyright restriction. To get the full audio, please download the Video (MP4) and extract the sound.",
  steps_title: "Operational Guide",
  steps: ["Copy TikTok URL", "Paste into Neon Engine", "Extract & Download"],
  stages: ["Initializing Core", "AI Scraping", "WM Bypassing", "Optimization", "Finalizing"],
  invalid_url: "Error: Invalid link.",
  fetch_failed: "Error: Server busy.",
  permission_denied: "Error: Permission denied.",
  extraction_failed: "Could not extract data. Please check the link again.",
  disclaimer: "Personal use only. Not affiliated with TikTok.",
};

static VI: Strings = Strings {
  placeholder: "Dán link TikTok tại đây...",
  extract: "TRÍCH XUẤT",
  video: "Tải Video (MP4)",
  audio: "Tải Nhạc (MP3)",
  processing: "Đang giải mã liên kết...",
  done: "Hệ thống đã sẵn sàng!",
  copied: "Đã chép!",
  history: "Lịch sử tải",
  trending: "Xu hướng thịnh hành",
  audio_note: "Mẹo: Nếu nhạc MP3 bị ngắn (60s), đó là do giới hạn bản quyền TikTok. Bạn nên tải Video (MP4) để có bản nhạc đầy đủ nhất đi kèm video.",
  steps_title: "Hướng Dẫn Sử Dụng",
  steps: ["Sao chép link video TikTok", "Dán vào hệ thống NeonTok", "Chọn định dạng và tải về"],
  stages: ["Khởi tạo nhân hệ thống", "Đang quét dữ liệu AI", "Đang xóa dấu Watermark", "Tối ưu hóa tệp tin", "Hoàn tất trích xuất"],
  invalid_url: "Lỗi: Link không hợp lệ.",
  fetch_failed: "Lỗi: Máy chủ đang bận.",
  permission_denied: "Lỗi: Không có quyền truy cập Clipboard.",
  extraction_failed: "Không thể trích xuất dữ liệu. Vui lòng kiểm tra lại link.",
  disclaimer: "Chỉ sử dụng cho mục đích cá nhân. Không lưu trữ nội dung trái phép.",
};

static JA: Strings = Strings {
  placeholder: "リンクを貼り付けてください...",
  extract: "抽出",
  video: "ビデオ (MP4)",
  audio: "オーディオ (MP3)",
  processing: "解析中...",
  done: "完了！",
  copied: "コピー完了",
  history: "抽出履歴",
  trending: "トレンド",
  audio_note: "注意：MP3が60秒のみの場合、TikTokの著作権制限によるものです。フルバージョンが必要な場合はビデオをダウンロードしてください。",
  steps_title: "使用方法",
  steps: ["URLをコピー", "貼り付け", "ダウンロード"],
  stages: ["初期化中", "スクレイピング中", "透かし除去中", "最適化中", "完了"],
  invalid_url: "エラー: 無効なリンク。",
  fetch_failed: "エラー: サーバーがビジーです。",
  permission_denied: "エラー: クリップボードへのアクセスが拒否されました。",
  extraction_failed: "データを抽出できませんでした。リンクを確認してください。",
  disclaimer: "個人利用のみ。著作権を尊重してください。",
};

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn language_from_config() {
    assert_eq!(Language::from_config("vi"), Language::Vi);
    assert_eq!(Language::from_config("JA"), Language::Ja);
    assert_eq!(Language::from_config("en"), Language::En);
    assert_eq!(Language::from_config("fr"), Language::En);
  }

  #[test]
  fn language_cycles_through_all() {
    let mut lang = Language::En;
    for _ in 0..Language::ALL.len() {
      lang = lang.next();
    }
    assert_eq!(lang, Language::En);
    assert_eq!(Language::En.next(), Language::Vi);
  }

  #[test]
  fn every_language_has_nonempty_error_texts() {
    for lang in Language::ALL {
      let t = lang.strings();
      assert!(!t.extraction_failed.is_empty());
      assert!(!t.invalid_url.is_empty());
      assert!(!t.permission_denied.is_empty());
      assert!(t.stages.iter().all(|s| !s.is_empty()));
    }
  }
}
