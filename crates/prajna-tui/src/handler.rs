use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use prajna_core::SUGGESTIONS;
use crate::app::{point_in_rect, App, FocusPane, InputMode, Screen, MENU_LINKS};
use crate::tui::AppEvent;

const WHEEL_STEP: i32 = 3;

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

pub fn handle_event(app: &mut App, event: AppEvent) {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize(width, height) => app.resize(width, height),
        AppEvent::Tick => app.tick(),
        AppEvent::Session(event) => app.on_session_event(event),
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    match app.screen {
        Screen::Landing => handle_landing(app, key),
        Screen::Chat => {
            // Popups take every key while shown
            if app.pending_delete.is_some() {
                handle_delete_popup(app, key);
                return;
            }
            if app.rename.is_some() {
                handle_rename_popup(app, key);
                return;
            }
            if key.code == KeyCode::Char('n') && key.modifiers.contains(KeyModifiers::CONTROL) {
                app.new_chat();
                return;
            }
            match app.input_mode {
                InputMode::Normal => handle_chat_normal(app, key),
                InputMode::Editing => handle_chat_editing(app, key),
            }
        }
    }
}

fn handle_landing(app: &mut App, key: KeyEvent) {
    if key.code == KeyCode::Char('q') {
        app.should_quit = true;
        return;
    }

    if app.landing_view.splash_visible {
        app.dismiss_splash();
        return;
    }

    if app.landing_view.menu_open {
        match key.code {
            KeyCode::Esc | KeyCode::Char('m') => app.toggle_menu(),
            KeyCode::Char('j') | KeyCode::Down => {
                app.menu_index = (app.menu_index + 1).min(MENU_LINKS.len() - 1);
            }
            KeyCode::Char('k') | KeyCode::Up => {
                app.menu_index = app.menu_index.saturating_sub(1);
            }
            KeyCode::Enter => app.activate_menu_link(app.menu_index),
            KeyCode::Char(c @ '1'..='5') => app.activate_menu_link(c as usize - '1' as usize),
            _ => {}
        }
        return;
    }

    match key.code {
        KeyCode::Char('m') => app.toggle_menu(),
        KeyCode::Char('j') | KeyCode::Down => app.landing_scroll_by(1),
        KeyCode::Char('k') | KeyCode::Up => app.landing_scroll_by(-1),
        KeyCode::PageDown | KeyCode::Char(' ') => {
            app.landing_scroll_by(app.landing_viewport_height as i32 / 2)
        }
        KeyCode::PageUp => app.landing_scroll_by(-(app.landing_viewport_height as i32 / 2)),
        KeyCode::Char('g') => app.follow_link("#home"),
        KeyCode::Char(c @ '1'..='5') => app.follow_link(MENU_LINKS[c as usize - '1' as usize].1),
        KeyCode::Enter | KeyCode::Char('c') => app.open_chat(),
        _ => {}
    }
}

fn handle_chat_normal(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,

        // Back to the landing page
        KeyCode::Char('l') => app.open_landing(),

        KeyCode::Char('i') => {
            app.focus = FocusPane::Input;
            app.input_mode = InputMode::Editing;
        }

        KeyCode::Esc => app.session.close_sidebar(),

        KeyCode::Tab => {
            app.focus = match app.focus {
                FocusPane::Sidebar => FocusPane::Transcript,
                FocusPane::Transcript => FocusPane::Input,
                FocusPane::Input if app.session.sidebar_open() => FocusPane::Sidebar,
                FocusPane::Input => FocusPane::Transcript,
            };
            if app.focus == FocusPane::Input {
                app.input_mode = InputMode::Editing;
            }
        }

        KeyCode::Char('b') => {
            app.session.toggle_sidebar();
            app.focus = if app.session.sidebar_open() {
                FocusPane::Sidebar
            } else {
                FocusPane::Transcript
            };
        }

        KeyCode::Char('n') => app.new_chat(),

        KeyCode::Char(c @ '1'..='4') if app.session.welcome_visible() => {
            let index = c as usize - '1' as usize;
            if index < SUGGESTIONS.len() {
                app.ask_suggestion(index);
            }
        }

        KeyCode::Char('j') | KeyCode::Down => match app.focus {
            FocusPane::Sidebar => app.sidebar_nav_down(),
            _ => app.scroll_transcript(1),
        },
        KeyCode::Char('k') | KeyCode::Up => match app.focus {
            FocusPane::Sidebar => app.sidebar_nav_up(),
            _ => app.scroll_transcript(-1),
        },
        KeyCode::Char('G') | KeyCode::End => app.follow_transcript = true,

        KeyCode::Enter if app.focus == FocusPane::Sidebar => app.load_selected(),
        KeyCode::Char('d') if app.focus == FocusPane::Sidebar => app.delete_selected(),
        KeyCode::Char('r') if app.focus == FocusPane::Sidebar => app.begin_rename(),
        KeyCode::Char('R') => {
            let effects = app.session.refresh_sidebar();
            app.dispatch(effects);
        }
        _ => {}
    }
}

fn handle_chat_editing(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
            app.focus = FocusPane::Transcript;
        }
        KeyCode::Enter => app.submit_input(),
        KeyCode::Backspace => {
            if app.input_cursor > 0 {
                app.input_cursor -= 1;
                let byte_pos = char_to_byte_index(&app.chat_input, app.input_cursor);
                app.chat_input.remove(byte_pos);
            }
        }
        KeyCode::Delete => {
            let char_count = app.chat_input.chars().count();
            if app.input_cursor < char_count {
                let byte_pos = char_to_byte_index(&app.chat_input, app.input_cursor);
                app.chat_input.remove(byte_pos);
            }
        }
        KeyCode::Left => {
            app.input_cursor = app.input_cursor.saturating_sub(1);
        }
        KeyCode::Right => {
            let char_count = app.chat_input.chars().count();
            app.input_cursor = (app.input_cursor + 1).min(char_count);
        }
        KeyCode::Home => {
            app.input_cursor = 0;
        }
        KeyCode::End => {
            app.input_cursor = app.chat_input.chars().count();
        }
        KeyCode::Char(c) => {
            let byte_pos = char_to_byte_index(&app.chat_input, app.input_cursor);
            app.chat_input.insert(byte_pos, c);
            app.input_cursor += 1;
        }
        _ => {}
    }
}

fn handle_delete_popup(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => app.answer_delete(true),
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => app.answer_delete(false),
        _ => {}
    }
}

fn handle_rename_popup(app: &mut App, key: KeyEvent) {
    let Some(rename) = app.rename.as_mut() else {
        return;
    };
    match key.code {
        KeyCode::Esc => app.rename = None,
        KeyCode::Enter => app.commit_rename(),
        KeyCode::Backspace => {
            rename.input.pop();
        }
        KeyCode::Char(c) => rename.input.push(c),
        _ => {}
    }
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    let x = mouse.column;
    let y = mouse.row;

    match app.screen {
        Screen::Landing => match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) if app.landing_view.splash_visible => app.dismiss_splash(),
            MouseEventKind::Moved | MouseEventKind::Drag(_) => app.pointer_moved(x, y),
            MouseEventKind::ScrollDown => app.landing_scroll_by(WHEEL_STEP),
            MouseEventKind::ScrollUp => app.landing_scroll_by(-WHEEL_STEP),
            _ => {}
        },
        Screen::Chat => {
            // Determine which area the mouse is in (position-based scrolling)
            let in_sidebar = app.sidebar_area.map(|r| point_in_rect(x, y, r)).unwrap_or(false);
            let in_transcript = app.transcript_area.map(|r| point_in_rect(x, y, r)).unwrap_or(false);
            match mouse.kind {
                MouseEventKind::ScrollDown if in_sidebar => app.sidebar_nav_down(),
                MouseEventKind::ScrollUp if in_sidebar => app.sidebar_nav_up(),
                MouseEventKind::ScrollDown if in_transcript => app.scroll_transcript(WHEEL_STEP),
                MouseEventKind::ScrollUp if in_transcript => app.scroll_transcript(-WHEEL_STEP),
                _ => {}
            }
        }
    }
}
