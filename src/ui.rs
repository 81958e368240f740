use ratatui::{
  Frame,
  layout::{Alignment, Constraint, Layout, Rect},
  style::{Modifier, Style, Stylize},
  text::{Line, Span},
  widgets::{Block, BorderType, Clear, Gauge, List, ListItem, ListState, Padding, Paragraph, Wrap},
};

use crate::app::{App, Focus};
use crate::model::MediaKind;
use crate::theme::Theme;

// --- Helpers ---

/// Compute the display width of the first `n` chars (accounting for double-width CJK).
pub fn display_width(s: &str, n: usize) -> usize {
  use unicode_width::UnicodeWidthChar;
  s.chars().take(n).map(|c| c.width().unwrap_or(0)).sum()
}

/// Truncate a string to `max_width` characters, appending "…" if truncated.
fn truncate_str(s: &str, max_width: usize) -> String {
  if s.chars().count() <= max_width {
    s.to_string()
  } else {
    let truncated: String = s.chars().take(max_width.saturating_sub(1)).collect();
    format!("{}…", truncated)
  }
}

fn panel(theme: &Theme, title: &str, focused: bool) -> Block<'static> {
  let color = if focused { theme.accent } else { theme.border };
  Block::bordered()
    .title(format!(" {} ", title))
    .title_style(Style::default().fg(if focused { theme.accent } else { theme.muted }).add_modifier(Modifier::BOLD))
    .border_type(BorderType::Rounded)
    .border_style(Style::default().fg(color))
}

/// A rectangle of at most `width` x `height` centered in `area`.
fn centered(area: Rect, width: u16, height: u16) -> Rect {
  let w = width.min(area.width);
  let h = height.min(area.height);
  Rect { x: area.x + (area.width - w) / 2, y: area.y + (area.height - h) / 2, width: w, height: h }
}

// --- UI Rendering ---

pub fn ui(frame: &mut Frame, app: &mut App) {
  let theme = app.theme();

  frame.render_widget(Block::default().style(Style::default().bg(theme.bg)), frame.area());

  let [header_area, body_area, status_area, input_area, footer_area] = Layout::vertical([
    Constraint::Length(1),
    Constraint::Min(8),
    Constraint::Length(1),
    Constraint::Length(3),
    Constraint::Length(1),
  ])
  .areas(frame.area());

  let [main_area, side_area] = Layout::horizontal([Constraint::Min(30), Constraint::Length(40)]).areas(body_area);
  let [trending_area, history_area] =
    Layout::vertical([Constraint::Percentage(50), Constraint::Percentage(50)]).areas(side_area);

  render_header(frame, app, header_area);
  render_main(frame, app, main_area);
  render_trending(frame, app, trending_area);
  render_history(frame, app, history_area);
  render_status(frame, app, status_area);
  render_input(frame, app, input_area);
  render_footer(frame, app, footer_area);

  if app.show_notice {
    render_notice(frame, app);
  }
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
  let theme = app.theme();
  let left = Line::from(vec![
    Span::styled(" ◆ NEON", Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)),
    Span::styled("TOK ", Style::default().fg(theme.accent_alt).add_modifier(Modifier::BOLD)),
  ]);
  frame.render_widget(left, area);

  let right_text = format!("{}  v{} ", app.language.code().to_uppercase(), env!("CARGO_PKG_VERSION"));
  let right = Line::from(Span::styled(&right_text, Style::default().fg(theme.muted)));
  let right_area =
    Rect { x: area.x + area.width.saturating_sub(right_text.len() as u16), width: right_text.len() as u16, ..area };
  frame.render_widget(right, right_area);
}

fn render_main(frame: &mut Frame, app: &App, area: Rect) {
  if app.loading {
    render_progress(frame, app, area);
  } else if app.result.is_some() {
    render_result(frame, app, area);
  } else {
    render_welcome(frame, app, area);
  }
}

fn render_welcome(frame: &mut Frame, app: &App, area: Rect) {
  let theme = app.theme();
  let s = app.strings();
  let mut text = vec![
    Line::from(""),
    Line::from(Span::styled("◆  NeonTok", Style::default().fg(theme.accent).add_modifier(Modifier::BOLD))),
    Line::from(""),
    Line::from(Span::styled(s.steps_title, Style::default().fg(theme.fg).add_modifier(Modifier::BOLD))),
  ];
  for (i, step) in s.steps.iter().enumerate() {
    text.push(Line::from(vec![
      Span::styled(format!("{}. ", i + 1), Style::default().fg(theme.accent_alt)),
      Span::styled(*step, Style::default().fg(theme.fg)),
    ]));
  }
  text.push(Line::from(""));
  text.push(Line::from(Span::styled(s.disclaimer, Style::default().fg(theme.muted))));

  let paragraph = Paragraph::new(text)
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true })
    .block(panel(theme, s.extract, false));
  frame.render_widget(paragraph, area);
}

fn render_progress(frame: &mut Frame, app: &App, area: Rect) {
  let theme = app.theme();
  let s = app.strings();
  let progress = app.progress.snapshot();
  let stage = s.stages.get(progress.stage).copied().unwrap_or(s.processing);

  let block = panel(theme, s.processing, false).padding(Padding::horizontal(2));
  let inner = block.inner(area);
  frame.render_widget(block, area);

  let [_, label_area, gauge_area, _] =
    Layout::vertical([Constraint::Fill(1), Constraint::Length(2), Constraint::Length(1), Constraint::Fill(1)])
      .areas(inner);

  let label = Paragraph::new(Line::from(Span::styled(
    stage.to_uppercase(),
    Style::default().fg(theme.accent).add_modifier(Modifier::BOLD),
  )))
  .alignment(Alignment::Center);
  frame.render_widget(label, label_area);

  let gauge = Gauge::default()
    .gauge_style(Style::default().fg(theme.accent_alt).bg(theme.stripe_bg))
    .ratio((progress.value / 100.0).clamp(0.0, 1.0))
    .label(format!("{:.0}%", progress.value.floor()));
  frame.render_widget(gauge, gauge_area);
}

fn render_result(frame: &mut Frame, app: &App, area: Rect) {
  let Some(info) = &app.result else { return };
  let theme = app.theme();
  let s = app.strings();
  let inner_w = area.width.saturating_sub(4) as usize;

  let field = |label: &'static str, value: &str| {
    let value_w = inner_w.saturating_sub(label.chars().count());
    Line::from(vec![
      Span::styled(label, Style::default().fg(theme.muted)),
      Span::styled(truncate_str(value, value_w), Style::default().fg(theme.fg)),
    ])
  };
  let availability = |kind: MediaKind, label: &'static str| {
    let (mark, color) = if info.media_url(kind).is_some() { ("●", theme.accent) } else { ("○", theme.muted) };
    vec![
      Span::styled(format!("{} ", mark), Style::default().fg(color)),
      Span::styled(label, Style::default().fg(theme.fg)),
    ]
  };

  let mut lines = vec![
    Line::from(""),
    Line::from(Span::styled(
      truncate_str(&info.title, inner_w),
      Style::default().fg(theme.fg).add_modifier(Modifier::BOLD),
    )),
    Line::from(""),
    field("Author    ", &info.author),
    field("Sound     ", &info.music_title),
    field("Duration  ", &info.duration),
    field("ID        ", &info.id),
    Line::from(""),
  ];
  let mut media = availability(MediaKind::Video, s.video);
  media.push(Span::raw("    "));
  media.extend(availability(MediaKind::Audio, s.audio));
  lines.push(Line::from(media));
  lines.push(Line::from(""));
  lines.push(Line::from(Span::styled(
    truncate_str(&info.url, inner_w),
    Style::default().fg(theme.accent).add_modifier(Modifier::UNDERLINED),
  )));
  lines.push(Line::from(""));
  lines.push(Line::from(Span::styled(s.audio_note, Style::default().fg(theme.muted))));

  let block = panel(theme, s.done, false).padding(Padding::horizontal(1));
  frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }).block(block), area);
}

/// Render one side list with striped rows and a right-aligned meta column.
fn render_side_list(
  frame: &mut Frame,
  theme: &Theme,
  area: Rect,
  title: &str,
  focused: bool,
  rows: Vec<(String, String)>,
  state: &mut ListState,
) {
  // Inner width: area minus 2 borders minus 2 chars for highlight symbol ("▶ ")
  let inner_w = area.width.saturating_sub(4) as usize;
  let items: Vec<ListItem> = rows
    .into_iter()
    .enumerate()
    .map(|(i, (name, meta))| {
      let is_selected = focused && Some(i) == state.selected();
      let fg = if is_selected { theme.highlight_fg } else { theme.fg };
      let bg = if is_selected {
        theme.highlight_bg
      } else if i % 2 == 1 {
        theme.stripe_bg
      } else {
        theme.bg
      };
      let meta_w = meta.chars().count();
      let name = truncate_str(&name, inner_w.saturating_sub(meta_w + 1));
      let gap = inner_w.saturating_sub(name.chars().count() + meta_w);
      let line = Line::from(vec![
        Span::styled(name, Style::default().fg(fg)),
        Span::raw(" ".repeat(gap)),
        Span::styled(meta, Style::default().fg(theme.muted)),
      ]);
      ListItem::new(line).bg(bg)
    })
    .collect();

  let list = List::new(items)
    .block(panel(theme, title, focused))
    .highlight_symbol(if focused { "▶ " } else { "  " })
    .highlight_style(if focused {
      Style::default().fg(theme.highlight_fg).bg(theme.highlight_bg).add_modifier(Modifier::BOLD)
    } else {
      Style::default()
    });
  frame.render_stateful_widget(list, area, state);
}

fn render_trending(frame: &mut Frame, app: &mut App, area: Rect) {
  let theme = app.theme();
  let rows = app.trending.iter().map(|t| (t.title.clone(), t.views.clone())).collect();
  let focused = app.focus == Focus::Trending;
  let title = app.strings().trending;
  render_side_list(frame, theme, area, title, focused, rows, &mut app.trending_state);
}

fn render_history(frame: &mut Frame, app: &mut App, area: Rect) {
  let theme = app.theme();
  let rows = app.history.entries().iter().map(|h| (h.title.clone(), h.author.clone())).collect();
  let focused = app.focus == Focus::History;
  let title = app.strings().history;
  render_side_list(frame, theme, area, title, focused, rows, &mut app.history_state);
}

fn render_status(frame: &mut Frame, app: &App, area: Rect) {
  let theme = app.theme();
  let (text, style) = if let Some(msg) = &app.status_message {
    (format!(" ⏳ {}", msg), Style::default().fg(theme.status))
  } else if let Some(err) = &app.last_error {
    (format!(" ⚠  {}", err), Style::default().fg(theme.error))
  } else if let Some(info) = &app.info_message {
    (format!(" ✓ {}", info), Style::default().fg(theme.status))
  } else {
    (" Ready".to_string(), Style::default().fg(theme.muted))
  };
  frame.render_widget(Paragraph::new(text).style(style), area);
}

fn render_input(frame: &mut Frame, app: &mut App, area: Rect) {
  let theme = app.theme();
  let focused = app.focus == Focus::Input && !app.show_notice;
  let border_color = if focused { theme.accent } else { theme.border };
  let input_block = Block::bordered()
    .title(format!(" {} ", app.strings().extract))
    .title_style(Style::default().fg(border_color))
    .border_type(BorderType::Rounded)
    .border_style(Style::default().fg(border_color))
    .padding(Padding::horizontal(1));

  let inner_w = area.width.saturating_sub(4) as usize;
  let cursor_col = display_width(&app.input, app.cursor_position);

  if cursor_col < app.input_scroll {
    app.input_scroll = cursor_col;
  } else if cursor_col >= app.input_scroll + inner_w {
    app.input_scroll = cursor_col.saturating_sub(inner_w) + 1;
  }

  let paragraph = if app.input.is_empty() {
    Paragraph::new(app.strings().placeholder).style(Style::default().fg(theme.muted))
  } else {
    let visible: String = app
      .input
      .chars()
      .scan(0usize, |col, c| {
        let w = unicode_width::UnicodeWidthChar::width(c).unwrap_or(0);
        let start = *col;
        *col += w;
        Some((start, *col, c))
      })
      .skip_while(|(_, end, _)| *end <= app.input_scroll)
      .take_while(|(start, _, _)| *start < app.input_scroll + inner_w)
      .map(|(_, _, c)| c)
      .collect();
    Paragraph::new(visible).style(Style::default().fg(theme.fg))
  };
  frame.render_widget(paragraph.block(input_block), area);

  if focused {
    let cursor_x = area.x + 2 + (cursor_col - app.input_scroll) as u16;
    frame.set_cursor_position((cursor_x, area.y + 1));
  }
}

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
  let theme = app.theme();
  let keys: Vec<(&str, &str)> = if app.show_notice {
    vec![("Enter", "Close"), ("^n", "Hide 2h")]
  } else {
    let mut k = match app.focus {
      Focus::Input => vec![("Enter", "Extract"), ("^v", "Paste")],
      Focus::Trending => vec![("Enter", "Open"), ("j/k", "Navigate")],
      Focus::History => vec![("Enter", "Open"), ("j/k", "Navigate"), ("c", "Clear")],
    };
    if app.result.is_some() {
      k.push(("^d", "Video"));
      k.push(("^u", "Audio"));
      k.push(("^y", "Copy"));
    }
    k.push(("Tab", "Focus"));
    k.push(("^t", "Theme"));
    k.push(("^l", "Lang"));
    k
  };

  let spans: Vec<Span> = keys
    .iter()
    .enumerate()
    .flat_map(|(i, (key, action))| {
      let mut s = vec![
        Span::styled(format!(" {} ", key), Style::default().fg(theme.key_fg).bg(theme.key_bg)),
        Span::styled(format!(" {} ", action), Style::default().fg(theme.muted)),
      ];
      if i < keys.len() - 1 {
        s.push(Span::raw(" "));
      }
      s
    })
    .collect();

  frame.render_widget(Line::from(spans), area);

  let theme_label = format!("{} ", theme.name);
  let right = Line::from(Span::styled(&theme_label, Style::default().fg(theme.muted)));
  let right_area =
    Rect { x: area.x + area.width.saturating_sub(theme_label.len() as u16), width: theme_label.len() as u16, ..area };
  frame.render_widget(right, right_area);
}

fn render_notice(frame: &mut Frame, app: &App) {
  let theme = app.theme();
  let s = app.strings();
  let area = centered(frame.area(), 64, 14);

  let mut lines = vec![Line::from("")];
  for (i, step) in s.steps.iter().enumerate() {
    lines.push(Line::from(vec![
      Span::styled(format!(" {} ", i + 1), Style::default().fg(theme.key_fg).bg(theme.accent_alt)),
      Span::styled(format!("  {}", step), Style::default().fg(theme.fg)),
    ]));
  }
  lines.push(Line::from(""));
  lines.push(Line::from(Span::styled(s.audio_note, Style::default().fg(theme.muted))));

  let block = panel(theme, s.steps_title, true).padding(Padding::horizontal(2)).style(Style::default().bg(theme.bg));
  frame.render_widget(Clear, area);
  frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }).block(block), area);
}
