use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::prelude::*;
use std::io;
use std::time::Instant;

use super::app::{App, Focus};
use super::ui;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum KeyResult {
    Continue,
    Quit,
}

/// Event loop: apply settled filters, paint a chunk, draw, wait for input.
///
/// While a render is in progress the loop does not block on input, so each
/// chunk gets its own frame and keys are still handled between chunks.
pub fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    loop {
        app.tick(Instant::now());
        terminal.draw(|f| ui::draw(f, app))?;

        if !event::poll(app.next_wakeup(Instant::now()))? {
            continue;
        }

        if let Event::Key(key) = event::read()? {
            // Only process key press events (Windows reports Press + Release)
            if key.kind != KeyEventKind::Press {
                continue;
            }
            if handle_key(app, key, Instant::now()) == KeyResult::Quit {
                return Ok(());
            }
        }
    }
}

pub(crate) fn handle_key(app: &mut App, key: KeyEvent, now: Instant) -> KeyResult {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return KeyResult::Quit;
    }

    // Help modal takes over input
    if app.help_modal {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?') => app.close_help_modal(),
            KeyCode::Down => app.scroll_help_by(1),
            KeyCode::Up => app.scroll_help_by(-1),
            KeyCode::PageDown => app.scroll_help_by(12),
            KeyCode::PageUp => app.scroll_help_by(-12),
            _ => {}
        }
        return KeyResult::Continue;
    }

    // Date field takes over input while editing
    if app.editing_date {
        match key.code {
            KeyCode::Enter => app.commit_date(now),
            KeyCode::Esc => app.cancel_date_edit(),
            KeyCode::Backspace => {
                app.date_input.pop();
            }
            KeyCode::Char(c) => app.date_input.push(c),
            _ => {}
        }
        return KeyResult::Continue;
    }

    let page = app.visible_rows.max(1) as isize;
    match key.code {
        KeyCode::Char('q') => return KeyResult::Quit,
        KeyCode::Char('?') => app.open_help_modal(),
        KeyCode::Tab => app.focus = app.focus.next(),
        KeyCode::BackTab => app.focus = app.focus.prev(),
        KeyCode::Left => match app.focus {
            Focus::Driver => app.cycle_driver(-1, now),
            Focus::Receiver => app.cycle_receiver(-1, now),
            _ => {}
        },
        KeyCode::Right => match app.focus {
            Focus::Driver => app.cycle_driver(1, now),
            Focus::Receiver => app.cycle_receiver(1, now),
            _ => {}
        },
        KeyCode::Enter if app.focus == Focus::Date => app.begin_date_edit(),
        KeyCode::Char('c') => app.clear_filters(),
        KeyCode::Char('x') => app.export(),
        KeyCode::Char('d') => app.download_source(),
        KeyCode::Char('r') => app.reload(),
        KeyCode::Up => app.scroll_by(-1),
        KeyCode::Down => app.scroll_by(1),
        KeyCode::PageUp => app.scroll_by(-page),
        KeyCode::PageDown => app.scroll_by(page),
        KeyCode::Home => app.scroll_to_top(),
        KeyCode::End => app.scroll_to_end(),
        _ => {}
    }
    KeyResult::Continue
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use destajo_core::{DataSource, Record, SourceChain};
    use destajo_engine::engine::{FIELD_DATE, FIELD_DRIVER};

    struct Rows;

    impl DataSource for Rows {
        fn name(&self) -> &str {
            "rows"
        }

        fn fetch(&self) -> destajo_core::Result<Vec<Record>> {
            Ok(vec![
                Record::new().with(FIELD_DRIVER, "A").with(FIELD_DATE, "2024-01-01"),
                Record::new().with(FIELD_DRIVER, "B").with(FIELD_DATE, "2024-01-02"),
            ])
        }
    }

    fn app() -> App {
        let mut app = App::new(&Config::default(), SourceChain::new(None, Box::new(Rows)));
        app.reload();
        app
    }

    fn press(app: &mut App, code: KeyCode) -> KeyResult {
        handle_key(app, KeyEvent::new(code, KeyModifiers::NONE), Instant::now())
    }

    #[test]
    fn quit_keys() {
        let mut app = app();
        assert_eq!(press(&mut app, KeyCode::Char('q')), KeyResult::Quit);
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(handle_key(&mut app, ctrl_c, Instant::now()), KeyResult::Quit);
    }

    #[test]
    fn arrows_cycle_focused_picker() {
        let mut app = app();
        press(&mut app, KeyCode::Right);
        assert_eq!(app.selected_driver(), Some("A"));

        press(&mut app, KeyCode::Tab);
        assert_eq!(app.focus, Focus::Receiver);
        press(&mut app, KeyCode::BackTab);
        assert_eq!(app.focus, Focus::Driver);
    }

    #[test]
    fn typing_a_date() {
        let mut app = app();
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.focus, Focus::Date);
        press(&mut app, KeyCode::Enter);
        assert!(app.editing_date);

        for c in "2/1/20244".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        press(&mut app, KeyCode::Backspace);
        // 'q' is text while editing, not quit
        assert_eq!(press(&mut app, KeyCode::Char('q')), KeyResult::Continue);
        press(&mut app, KeyCode::Backspace);
        press(&mut app, KeyCode::Enter);

        assert!(!app.editing_date);
        assert_eq!(app.session.pending_filter().date.as_deref(), Some("2024-01-02"));
    }

    #[test]
    fn help_modal_swallows_keys() {
        let mut app = app();
        press(&mut app, KeyCode::Char('?'));
        assert!(app.help_modal);
        press(&mut app, KeyCode::Char('c'));
        assert_eq!(app.status_message, "Cargados 2 registros desde rows");
        press(&mut app, KeyCode::Esc);
        assert!(!app.help_modal);
    }

    #[test]
    fn clear_key_resets_filters() {
        let mut app = app();
        press(&mut app, KeyCode::Right);
        press(&mut app, KeyCode::Char('c'));
        assert_eq!(app.selected_driver(), None);
        assert_eq!(app.status_message, "Filtros borrados");
    }
}
