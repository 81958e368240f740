use ratatui::style::Color;

pub struct Theme {
  pub name: &'static str,
  pub bg: Color,
  pub fg: Color,
  pub muted: Color,
  pub accent: Color,
  /// Second accent, used for audio and the progress gauge.
  pub accent_alt: Color,
  pub border: Color,
  pub highlight_fg: Color,
  pub highlight_bg: Color,
  pub stripe_bg: Color,
  pub status: Color,
  pub error: Color,
  pub key_fg: Color,
  pub key_bg: Color,
}

pub static THEMES: [Theme; 3] = [
  Theme {
    name: "Neon",
    bg: Color::Rgb(2, 6, 23),
    fg: Color::Rgb(241, 245, 249),
    muted: Color::Rgb(100, 116, 139),
    accent: Color::Rgb(34, 211, 238),
    accent_alt: Color::Rgb(236, 72, 153),
    border: Color::Rgb(30, 41, 59),
    highlight_fg: Color::Rgb(2, 6, 23),
    highlight_bg: Color::Rgb(34, 211, 238),
    stripe_bg: Color::Rgb(8, 14, 34),
    status: Color::Rgb(167, 139, 250),
    error: Color::Rgb(248, 113, 113),
    key_fg: Color::Rgb(2, 6, 23),
    key_bg: Color::Rgb(100, 116, 139),
  },
  Theme {
    name: "Daylight",
    bg: Color::Rgb(248, 250, 252),
    fg: Color::Rgb(15, 23, 42),
    muted: Color::Rgb(100, 116, 139),
    accent: Color::Rgb(8, 145, 178),
    accent_alt: Color::Rgb(219, 39, 119),
    border: Color::Rgb(203, 213, 225),
    highlight_fg: Color::Rgb(248, 250, 252),
    highlight_bg: Color::Rgb(8, 145, 178),
    stripe_bg: Color::Rgb(241, 245, 249),
    status: Color::Rgb(109, 40, 217),
    error: Color::Rgb(220, 38, 38),
    key_fg: Color::Rgb(248, 250, 252),
    key_bg: Color::Rgb(71, 85, 105),
  },
  Theme {
    name: "Mono",
    bg: Color::Reset,
    fg: Color::Reset,
    muted: Color::DarkGray,
    accent: Color::White,
    accent_alt: Color::Gray,
    border: Color::DarkGray,
    highlight_fg: Color::Black,
    highlight_bg: Color::White,
    stripe_bg: Color::Reset,
    status: Color::Gray,
    error: Color::Red,
    key_fg: Color::Black,
    key_bg: Color::Gray,
  },
];

pub fn theme_index(name: Option<&str>) -> usize {
  name.and_then(|n| THEMES.iter().position(|t| t.name.eq_ignore_ascii_case(n))).unwrap_or(0)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn theme_lookup() {
    assert_eq!(theme_index(Some("Daylight")), 1);
    assert_eq!(theme_index(Some("mono")), 2);
    assert_eq!(theme_index(Some("missing")), 0);
    assert_eq!(theme_index(None), 0);
  }
}
