use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
};
use prajna_core::markup::{Citation, REFERENCES_LABEL};
use prajna_core::{Role, SidebarView, TranscriptItem, SUGGESTIONS};
use crate::app::{App, FocusPane, InputMode};
use super::markdown::markdown_lines;

const SIDEBAR_WIDTH: u16 = 32;

pub fn render_chat(app: &mut App, frame: &mut Frame, area: Rect) {
    // Narrow terminals overlay the sidebar instead of splitting
    let sidebar_open = app.session.sidebar_open();
    let (sidebar_area, main_area) = if !sidebar_open {
        (None, area)
    } else if app.session.is_narrow() {
        (Some(area), area)
    } else {
        let [sidebar, main] =
            Layout::horizontal([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(0)]).areas(area);
        (Some(sidebar), main)
    };

    let [title_area, transcript_area, input_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(3),
    ])
    .areas(main_area);

    // Store areas for mouse hit-testing
    app.sidebar_area = sidebar_area;
    app.transcript_area = Some(transcript_area);

    let title = Line::from(vec![
        Span::styled(if sidebar_open { " ◀ " } else { " ☰ " }, Style::default().fg(Color::Cyan)),
        Span::styled(app.session.title().to_string(), Style::default().bold()),
    ]);
    frame.render_widget(Paragraph::new(title), title_area);

    if app.session.welcome_visible() {
        render_welcome(app, frame, transcript_area);
    } else {
        render_transcript(app, frame, transcript_area);
    }
    render_input(app, frame, input_area);

    if let Some(sidebar) = sidebar_area {
        if app.session.is_narrow() {
            frame.render_widget(ratatui::widgets::Clear, sidebar);
        }
        render_sidebar(app, frame, sidebar);
    }
}

fn render_welcome(app: &App, frame: &mut Frame, area: Rect) {
    let focused = app.focus == FocusPane::Transcript;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if focused { Color::Cyan } else { Color::DarkGray }));

    let mut lines = vec![
        Line::default(),
        Line::from(Span::styled("Welcome", Style::default().fg(Color::Yellow).bold())).alignment(Alignment::Center),
        Line::from("Ask anything about the teachings. Or try one of these:").alignment(Alignment::Center),
        Line::default(),
    ];
    for (i, question) in SUGGESTIONS.iter().enumerate() {
        lines.push(Line::from(vec![
            Span::styled(format!(" {} ", i + 1), Style::default().bg(Color::DarkGray).fg(Color::White)),
            Span::raw(format!(" {}", question)),
        ]));
    }

    frame.render_widget(Paragraph::new(lines).block(block).wrap(Wrap { trim: true }), area);
}

fn transcript_lines(app: &App) -> Vec<Line<'static>> {
    let mut lines: Vec<Line<'static>> = Vec::new();

    for item in app.session.transcript().items() {
        match item {
            TranscriptItem::Message(msg) => match msg.role {
                Role::User => {
                    lines.push(Line::from(Span::styled(
                        "You:",
                        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                    )));
                    // User text is shown exactly as typed
                    lines.extend(msg.content.lines().map(|l| Line::from(l.to_string())));
                    lines.push(Line::default());
                }
                Role::Assistant => {
                    lines.push(Line::from(Span::styled(
                        "Prajna:",
                        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                    )));
                    lines.extend(markdown_lines(&msg.content));
                    if !msg.sources.is_empty() {
                        lines.push(Line::from(Span::styled(
                            REFERENCES_LABEL,
                            Style::default().add_modifier(Modifier::BOLD),
                        )));
                        for source in &msg.sources {
                            let citation = Citation::parse(source);
                            lines.push(Line::from(vec![
                                Span::raw("  "),
                                Span::styled(citation.title.clone(), Style::default().fg(Color::Blue)),
                                Span::styled(format!(" {}", citation.href()), Style::default().fg(Color::DarkGray)),
                            ]));
                        }
                    }
                    lines.push(Line::default());
                }
            },
            TranscriptItem::Typing => {
                lines.push(Line::from(Span::styled(
                    "Prajna:",
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                )));
                // Animated ellipsis: cycles through ".", "..", "..."
                let dots = ".".repeat((app.animation_frame as usize / 4) % 3 + 1);
                lines.push(Line::from(Span::styled(
                    format!("Thinking{}", dots),
                    Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
                )));
            }
        }
    }

    lines
}

fn render_transcript(app: &mut App, frame: &mut Frame, area: Rect) {
    let focused = app.focus == FocusPane::Transcript;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if focused { Color::Cyan } else { Color::DarkGray }));

    // Rows are counted with the same word wrapping the widget draws with
    let transcript = Paragraph::new(Text::from(transcript_lines(app))).wrap(Wrap { trim: false });
    let inner_width = area.width.saturating_sub(2);
    let inner_height = area.height.saturating_sub(2);
    let max_scroll = rendered_rows(&transcript, inner_width).saturating_sub(inner_height);

    if app.follow_transcript {
        app.transcript_scroll = max_scroll;
    } else {
        app.transcript_scroll = app.transcript_scroll.min(max_scroll);
        if app.transcript_scroll == max_scroll {
            app.follow_transcript = true;
        }
    }

    let transcript = transcript.block(block).scroll((app.transcript_scroll, 0));
    frame.render_widget(transcript, area);
}

fn rendered_rows(paragraph: &Paragraph, width: u16) -> u16 {
    if width == 0 {
        return 0;
    }
    paragraph.line_count(width).min(u16::MAX as usize) as u16
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let editing = app.input_mode == InputMode::Editing;
    let border_color = if editing || app.focus == FocusPane::Input { Color::Yellow } else { Color::DarkGray };
    let title = if app.session.is_sending() { " Waiting for a reply... " } else { " Ask about the teachings " };

    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(title);

    // Calculate visible portion of input with horizontal scrolling
    let inner_width = area.width.saturating_sub(2) as usize;
    let cursor_pos = app.input_cursor;
    let scroll_offset = if inner_width == 0 {
        0
    } else if cursor_pos >= inner_width {
        cursor_pos - inner_width + 1
    } else {
        0
    };

    let visible_text: String = app.chat_input.chars().skip(scroll_offset).take(inner_width).collect();
    let input = Paragraph::new(visible_text)
        .style(Style::default().fg(Color::Cyan))
        .block(input_block);
    frame.render_widget(input, area);

    // Show cursor when editing
    if editing && app.pending_delete.is_none() && app.rename.is_none() {
        let cursor_x = (cursor_pos - scroll_offset) as u16;
        frame.set_cursor_position((area.x + cursor_x + 1, area.y + 1));
    }
}

fn render_sidebar(app: &mut App, frame: &mut Frame, area: Rect) {
    let focused = app.focus == FocusPane::Sidebar;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if focused { Color::Cyan } else { Color::DarkGray }))
        .title(" Conversations ");

    let items: Vec<ListItem> = match app.session.sidebar() {
        SidebarView::Loading => {
            frame.render_widget(
                Paragraph::new(Span::styled("Loading...", Style::default().fg(Color::DarkGray))).block(block),
                area,
            );
            return;
        }
        SidebarView::Empty(message) => {
            let lines: Vec<Line> = message
                .lines()
                .map(|l| Line::from(Span::styled(l, Style::default().fg(Color::DarkGray))))
                .collect();
            frame.render_widget(Paragraph::new(lines).block(block), area);
            return;
        }
        SidebarView::Entries(entries) => entries
            .into_iter()
            .map(|entry| {
                let style = if entry.active {
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                };
                ListItem::new(format!(" {} ", entry.chat.title)).style(style)
            })
            .collect(),
    };

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, area, &mut app.sidebar_state);
}

#[cfg(test)]
mod tests {
    use super::*;
    use prajna_core::{ChatDetail, ChatId, HttpBackend, LandingSettings, Message, SessionEvent};
    use ratatui::backend::TestBackend;
    use ratatui::buffer::Buffer;
    use ratatui::Terminal;
    use tokio::sync::mpsc;
    use crate::app::AppOptions;

    fn rows(buffer: &Buffer) -> Vec<String> {
        buffer
            .content
            .chunks(buffer.area.width as usize)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect())
            .collect()
    }

    fn app_with(messages: Vec<Message>) -> App {
        let (tx, _rx) = mpsc::unbounded_channel();
        let options = AppOptions {
            start_on_chat: true,
            skip_splash: true,
            landing_settings: LandingSettings::default(),
            narrow_width: 20,
        };
        let mut app = App::new(options, HttpBackend::new("http://127.0.0.1:9"), tx);
        // Effects are not dispatched, so nothing reaches the network.
        let _ = app.session.handle(SessionEvent::ChatLoaded {
            id: ChatId::Number(1),
            result: Ok(ChatDetail {
                id: ChatId::Number(1),
                title: "Fear".into(),
                messages,
            }),
        });
        app
    }

    #[test]
    fn word_wrapped_rows_are_counted() {
        let paragraph = Paragraph::new(Line::from("aaaaaa bbbbbb cccccc")).wrap(Wrap { trim: false });
        assert_eq!(rendered_rows(&paragraph, 10), 3);
        assert_eq!(rendered_rows(&paragraph, 0), 0);

        let mut terminal = Terminal::new(TestBackend::new(10, 2)).unwrap();
        let scroll = rendered_rows(&paragraph, 10) - 2;
        terminal
            .draw(|frame| frame.render_widget(paragraph.clone().scroll((scroll, 0)), frame.area()))
            .unwrap();
        assert_eq!(rows(terminal.backend().buffer()), vec!["bbbbbb    ", "cccccc    "]);
    }

    #[test]
    fn following_transcript_shows_the_end_of_a_wrapped_answer() {
        // Nine-letter words wrap two to a row at this width
        let answer = (0..20).map(|i| format!("word{:05}", i)).collect::<Vec<_>>().join(" ");
        let mut app = app_with(vec![
            Message::user("Why fear?"),
            Message::assistant(&answer, vec!["Talk Z: https://z".to_string()]),
        ]);

        let mut terminal = Terminal::new(TestBackend::new(30, 12)).unwrap();
        terminal
            .draw(|frame| render_chat(&mut app, frame, frame.area()))
            .unwrap();

        let screen = rows(terminal.backend().buffer()).join("\n");
        assert!(screen.contains("Talk Z"), "{}", screen);
        assert!(screen.contains("word00019"), "{}", screen);
        assert!(app.transcript_scroll > 0);
    }

    #[test]
    fn manual_scroll_can_reach_the_last_row() {
        let answer = (0..20).map(|i| format!("word{:05}", i)).collect::<Vec<_>>().join(" ");
        let mut app = app_with(vec![Message::assistant(&answer, vec!["Talk Z: https://z".to_string()])]);
        app.scroll_transcript(1000);

        let mut terminal = Terminal::new(TestBackend::new(30, 12)).unwrap();
        terminal
            .draw(|frame| render_chat(&mut app, frame, frame.area()))
            .unwrap();

        let screen = rows(terminal.backend().buffer()).join("\n");
        assert!(screen.contains("Talk Z"), "{}", screen);
        assert!(app.follow_transcript);
    }
}
