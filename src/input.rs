use ratatui::crossterm::event::{self, KeyCode, KeyModifiers};

use crate::app::{App, Focus};
use crate::model::MediaKind;

// --- Helpers ---

/// Convert a char index to a byte offset within the string.
pub fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
  s.char_indices().nth(char_idx).map_or(s.len(), |(i, _)| i)
}

// --- Event Handling ---

pub fn handle_key_event(app: &mut App, key: event::KeyEvent) {
  if key.modifiers.contains(KeyModifiers::CONTROL) {
    match key.code {
      KeyCode::Char('c') => app.should_quit = true,
      KeyCode::Char('t') => app.next_theme(),
      KeyCode::Char('l') => app.next_language(),
      KeyCode::Char('v') => app.paste_clipboard(),
      KeyCode::Char('y') => app.copy_link(),
      KeyCode::Char('d') => app.trigger_download(MediaKind::Video),
      KeyCode::Char('u') => app.trigger_download(MediaKind::Audio),
      KeyCode::Char('n') if app.show_notice => app.dismiss_notice(true),
      _ => {}
    }
    return;
  }

  if app.show_notice {
    if matches!(key.code, KeyCode::Esc | KeyCode::Enter) {
      app.dismiss_notice(false);
    }
    return;
  }

  if key.code == KeyCode::Tab {
    app.cycle_focus();
    return;
  }

  match app.focus {
    Focus::Input => handle_input_key(app, key),
    Focus::Trending | Focus::History => handle_list_key(app, key),
  }
}

fn handle_input_key(app: &mut App, key: event::KeyEvent) {
  app.clear_error();
  match key.code {
    KeyCode::Enter => {
      app.trigger_resolve(None);
    }
    KeyCode::Char(c) => {
      let byte_idx = char_to_byte_index(&app.input, app.cursor_position);
      app.input.insert(byte_idx, c);
      app.cursor_position += 1;
    }
    KeyCode::Backspace => {
      if app.cursor_position > 0 {
        app.cursor_position -= 1;
        let byte_idx = char_to_byte_index(&app.input, app.cursor_position);
        app.input.remove(byte_idx);
      }
    }
    KeyCode::Delete => {
      if app.cursor_position < app.input.chars().count() {
        let byte_idx = char_to_byte_index(&app.input, app.cursor_position);
        app.input.remove(byte_idx);
      }
    }
    KeyCode::Left => {
      app.cursor_position = app.cursor_position.saturating_sub(1);
    }
    KeyCode::Right => {
      if app.cursor_position < app.input.chars().count() {
        app.cursor_position += 1;
      }
    }
    KeyCode::Home => {
      app.cursor_position = 0;
    }
    KeyCode::End => {
      app.cursor_position = app.input.chars().count();
    }
    KeyCode::Esc => {
      if !app.input.is_empty() {
        app.input.clear();
        app.cursor_position = 0;
        app.input_scroll = 0;
      } else {
        app.should_quit = true;
      }
    }
    _ => {}
  }
}

fn handle_list_key(app: &mut App, key: event::KeyEvent) {
  let count = app.list_len();
  match key.code {
    KeyCode::Enter => {
      if let Some(link) = app.selected_link() {
        app.trigger_resolve(Some(link));
      }
    }
    KeyCode::Down | KeyCode::Char('j') => {
      if count > 0
        && let Some(state) = app.list_state_mut()
      {
        let i = state.selected().map_or(0, |i| (i + 1) % count);
        state.select(Some(i));
      }
    }
    KeyCode::Up | KeyCode::Char('k') => {
      if count > 0
        && let Some(state) = app.list_state_mut()
      {
        let i = state.selected().map_or(0, |i| if i == 0 { count.saturating_sub(1) } else { i.saturating_sub(1) });
        state.select(Some(i));
      }
    }
    KeyCode::Char('c') if app.focus == Focus::History => {
      app.clear_history();
    }
    KeyCode::Esc => {
      app.focus = Focus::Input;
    }
    _ => {}
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::resolver::{OfflineFallback, Resolver};
  use event::KeyEvent;

  fn app() -> App {
    App::for_tests(Resolver::with_strategies(vec![Box::new(OfflineFallback)]))
  }

  fn press(app: &mut App, code: KeyCode) {
    handle_key_event(app, KeyEvent::new(code, KeyModifiers::NONE));
  }

  // --- key handling ---

  #[test]
  fn typing_edits_at_cursor() {
    let mut app = app();
    for c in "tiktk".chars() {
      press(&mut app, KeyCode::Char(c));
    }
    press(&mut app, KeyCode::Left);
    press(&mut app, KeyCode::Char('o'));
    assert_eq!(app.input, "tiktok");
    assert_eq!(app.cursor_position, 5);
    press(&mut app, KeyCode::Home);
    press(&mut app, KeyCode::Delete);
    assert_eq!(app.input, "iktok");
    press(&mut app, KeyCode::End);
    press(&mut app, KeyCode::Backspace);
    assert_eq!(app.input, "ikto");
  }

  #[test]
  fn esc_clears_then_quits() {
    let mut app = app();
    press(&mut app, KeyCode::Char('x'));
    press(&mut app, KeyCode::Esc);
    assert!(app.input.is_empty());
    assert!(!app.should_quit);
    press(&mut app, KeyCode::Esc);
    assert!(app.should_quit);
  }

  #[test]
  fn notice_swallows_keys_until_dismissed() {
    let mut app = app();
    app.show_notice = true;
    press(&mut app, KeyCode::Char('a'));
    assert!(app.input.is_empty());
    press(&mut app, KeyCode::Enter);
    assert!(!app.show_notice);
    press(&mut app, KeyCode::Char('a'));
    assert_eq!(app.input, "a");
  }

  #[test]
  fn list_navigation_wraps() {
    let mut app = app();
    app.trending = crate::trending::fallback_trending();
    press(&mut app, KeyCode::Tab);
    assert_eq!(app.focus, Focus::Trending);
    assert_eq!(app.trending_state.selected(), Some(0));
    press(&mut app, KeyCode::Up);
    assert_eq!(app.trending_state.selected(), Some(3));
    press(&mut app, KeyCode::Char('j'));
    assert_eq!(app.trending_state.selected(), Some(0));
    press(&mut app, KeyCode::Esc);
    assert_eq!(app.focus, Focus::Input);
  }

  #[test]
  fn ctrl_c_quits() {
    let mut app = app();
    handle_key_event(&mut app, KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
    assert!(app.should_quit);
  }

  // --- char_to_byte_index ---

  #[test]
  fn char_to_byte_ascii() {
    assert_eq!(char_to_byte_index("hello", 0), 0);
    assert_eq!(char_to_byte_index("hello", 3), 3);
    assert_eq!(char_to_byte_index("hello", 5), 5); // past end
  }

  #[test]
  fn char_to_byte_multibyte() {
    let s = "aé日"; // a=1 byte, é=2 bytes, 日=3 bytes
    assert_eq!(char_to_byte_index(s, 0), 0);
    assert_eq!(char_to_byte_index(s, 1), 1);
    assert_eq!(char_to_byte_index(s, 2), 3);
    assert_eq!(char_to_byte_index(s, 3), 6); // past end
  }

  #[test]
  fn char_to_byte_empty() {
    assert_eq!(char_to_byte_index("", 0), 0);
    assert_eq!(char_to_byte_index("", 5), 0);
  }
}
