mod chat;
mod landing;
pub mod markdown;

use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};
use crate::app::{App, FocusPane, InputMode, Screen};

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, body, footer
    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);

    match app.screen {
        Screen::Landing => landing::render_landing(app, frame, body_area),
        Screen::Chat => chat::render_chat(app, frame, body_area),
    }

    render_footer(app, frame, footer_area);

    // Render popups (in order of priority)
    if app.screen == Screen::Landing && app.landing_view.splash_visible {
        landing::render_splash(app, frame, area);
    } else if app.screen == Screen::Landing && app.landing_view.menu_open {
        landing::render_menu(app, frame, area);
    } else if app.pending_delete.is_some() {
        render_delete_confirm(frame, area);
    } else if app.rename.is_some() {
        render_rename(app, frame, area);
    }
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let status = match app.screen {
        Screen::Landing => String::new(),
        Screen::Chat if app.session.is_sending() => " [waiting for reply]".to_string(),
        Screen::Chat => String::new(),
    };

    let title = Line::from(vec![
        Span::styled(" Prajna ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(status, Style::default().fg(Color::Yellow)),
        Span::raw(" "),
        Span::styled(
            format!("v{} · {}", env!("CARGO_PKG_VERSION"), app.backend_url()),
            Style::default().fg(Color::Gray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let mode_style = match app.input_mode {
        InputMode::Normal => Style::default().bg(Color::Blue).fg(Color::White),
        InputMode::Editing => Style::default().bg(Color::Yellow).fg(Color::Black),
    };

    let mode_text = match app.screen {
        Screen::Landing => " HOME ",
        Screen::Chat => " CHAT ",
    };

    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);
    let hint = |key: &'static str, label: &'static str| {
        [Span::styled(key, key_style), Span::styled(label, label_style)]
    };

    let hints: Vec<Span> = match (app.screen, app.input_mode) {
        (Screen::Landing, _) if app.landing_view.splash_visible => hint(" any key ", " skip ").to_vec(),
        (Screen::Landing, _) if app.landing_view.menu_open => [
            hint(" j/k ", " nav "),
            hint(" Enter ", " go "),
            hint(" m ", " close "),
        ]
        .concat(),
        (Screen::Landing, _) => [
            hint(" j/k ", " scroll "),
            hint(" 1-5 ", " jump "),
            hint(" m ", " menu "),
            hint(" c ", " chat "),
            hint(" q ", " quit "),
        ]
        .concat(),
        (Screen::Chat, InputMode::Editing) => [
            hint(" Enter ", " send "),
            hint(" Esc ", " stop typing "),
            hint(" ^N ", " new chat "),
        ]
        .concat(),
        (Screen::Chat, InputMode::Normal) => {
            let mut hints = hint(" Tab ", " focus ").to_vec();
            if app.focus == FocusPane::Sidebar {
                hints.extend([hint(" Enter ", " open "), hint(" d ", " delete "), hint(" r ", " rename ")].concat());
            } else if app.session.welcome_visible() {
                hints.extend(hint(" 1-4 ", " suggestion "));
            } else {
                hints.extend(hint(" j/k ", " scroll "));
            }
            hints.extend(
                [
                    hint(" i ", " type "),
                    hint(" b ", " history "),
                    hint(" n ", " new "),
                    hint(" l ", " home "),
                    hint(" q ", " quit "),
                ]
                .concat(),
            );
            hints
        }
    };

    let footer_content = Line::from(
        vec![
            Span::styled(mode_text, mode_style),
            Span::styled(" ", label_style),
        ]
        .into_iter()
        .chain(hints)
        .collect::<Vec<_>>(),
    );

    let footer = Paragraph::new(footer_content).style(Style::default().bg(Color::Black));
    frame.render_widget(footer, area);
}

/// Centered popup area of the given size, clamped to `area`.
fn popup_area(area: Rect, width: u16, height: u16) -> Rect {
    let popup_width = width.min(area.width.saturating_sub(4));
    let popup_height = height.min(area.height.saturating_sub(4));
    let popup_x = area.x + (area.width.saturating_sub(popup_width)) / 2;
    let popup_y = area.y + (area.height.saturating_sub(popup_height)) / 2;
    Rect::new(popup_x, popup_y, popup_width, popup_height)
}

fn render_delete_confirm(frame: &mut Frame, area: Rect) {
    let popup = popup_area(area, 44, 5);
    frame.render_widget(Clear, popup);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red))
        .title(" Delete chat ");

    let text = vec![
        Line::from("Are you sure you want to delete this chat?"),
        Line::from(vec![
            Span::styled(" y ", Style::default().bg(Color::DarkGray).fg(Color::White)),
            Span::raw(" delete   "),
            Span::styled(" n ", Style::default().bg(Color::DarkGray).fg(Color::White)),
            Span::raw(" keep"),
        ]),
    ];

    let paragraph = Paragraph::new(text).block(block).wrap(Wrap { trim: true });
    frame.render_widget(paragraph, popup);
}

fn render_rename(app: &App, frame: &mut Frame, area: Rect) {
    let Some(rename) = app.rename.as_ref() else {
        return;
    };
    let popup = popup_area(area, 50, 3);
    frame.render_widget(Clear, popup);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Rename chat (Enter to save, Esc to cancel) ");

    // Show the tail of long titles so the cursor stays visible
    let inner_width = popup.width.saturating_sub(2) as usize;
    let char_count = rename.input.chars().count();
    let skip = char_count.saturating_sub(inner_width.saturating_sub(1));
    let visible: String = rename.input.chars().skip(skip).collect();
    let cursor_x = (char_count - skip) as u16;

    frame.render_widget(Paragraph::new(visible).block(block), popup);
    frame.set_cursor_position((popup.x + 1 + cursor_x, popup.y + 1));
}
