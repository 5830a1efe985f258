use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
};
use crate::app::{App, Section, GALLERY, MENU_LINKS, PANELS, QUOTE, SECTIONS};

const HIDDEN: Style = Style::new().fg(Color::Black);

pub fn render_landing(app: &mut App, frame: &mut Frame, area: Rect) {
    let [nav_area, page_area] = Layout::vertical([Constraint::Length(1), Constraint::Min(0)]).areas(area);

    render_navbar(app, frame, nav_area);

    app.gallery_areas.clear();
    app.panel_areas.clear();

    let scroll = app.landing_scroll as i32;
    let mut top = 0i32;
    for section in SECTIONS.iter() {
        let section_y = top - scroll;
        top += section.height as i32;

        // Rows of this section inside the viewport
        let start = section_y.max(0);
        let end = (section_y + section.height as i32).min(page_area.height as i32);
        if end <= start {
            continue;
        }
        let visible = Rect::new(page_area.x, page_area.y + start as u16, page_area.width, (end - start) as u16);
        let clip_top = (start - section_y) as u16;
        render_section(app, frame, section, visible, clip_top);
    }
}

fn render_navbar(app: &App, frame: &mut Frame, area: Rect) {
    let style = if app.landing_view.navbar_scrolled {
        Style::default().bg(Color::Black).fg(Color::White).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Gray)
    };
    let links: Vec<Span> = MENU_LINKS
        .iter()
        .enumerate()
        .flat_map(|(i, (label, _))| {
            [
                Span::styled(format!(" {}", i + 1), Style::default().fg(Color::Cyan)),
                Span::raw(format!(" {} ", label)),
            ]
        })
        .collect();
    let line = Line::from(
        vec![Span::styled(" ☸ Prajna ", Style::default().fg(Color::Yellow).bold()), Span::raw("│")]
            .into_iter()
            .chain(links)
            .chain([Span::styled("  m ☰", Style::default().fg(Color::Cyan))])
            .collect::<Vec<_>>(),
    );
    frame.render_widget(Paragraph::new(line).style(style), area);
}

fn revealed(app: &App, section: &Section) -> bool {
    section
        .reveal
        .map(|index| app.landing_view.revealed.get(index).copied().unwrap_or(true))
        .unwrap_or(true)
}

fn heading(section: &Section) -> Line<'static> {
    Line::from(Span::styled(
        section.title.to_uppercase(),
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
    ))
    .alignment(Alignment::Center)
}

fn render_section(app: &mut App, frame: &mut Frame, section: &Section, area: Rect, clip_top: u16) {
    let shown = revealed(app, section);
    match section.id {
        "home" => render_hero(app, frame, section, area, clip_top),
        "teachings" => render_marquee(app, frame, section, area, clip_top, shown),
        "gallery" => render_gallery(app, frame, section, area, clip_top, shown),
        "paths" => render_panels(app, frame, section, area, clip_top, shown),
        "quote" => render_quote(app, frame, area, clip_top),
        "chat" => {
            let lines = vec![
                heading(section),
                Line::default(),
                Line::from("Questions about fear, attention, freedom and daily life.").alignment(Alignment::Center),
                Line::default(),
                Line::from(Span::styled(
                    " Press c or Enter to start a conversation ",
                    Style::default().bg(Color::Yellow).fg(Color::Black).add_modifier(Modifier::BOLD),
                ))
                .alignment(Alignment::Center),
            ];
            render_lines(frame, lines, area, clip_top, shown);
        }
        _ => {
            let lines = vec![
                heading(section),
                Line::default(),
                Line::from("Prajna is a quiet place to ask about the teachings of Jiddu Krishnamurti.")
                    .alignment(Alignment::Center),
                Line::from("Every answer is drawn from the talks and points back to where it came from.")
                    .alignment(Alignment::Center),
                Line::default(),
                Line::from(Span::styled("Scroll on, or press c to begin.", Style::default().fg(Color::DarkGray)))
                    .alignment(Alignment::Center),
            ];
            render_lines(frame, lines, area, clip_top, shown);
        }
    }
}

fn render_lines(frame: &mut Frame, lines: Vec<Line<'static>>, area: Rect, clip_top: u16, shown: bool) {
    let mut paragraph = Paragraph::new(lines).wrap(Wrap { trim: true }).scroll((clip_top, 0));
    if !shown {
        paragraph = paragraph.style(HIDDEN);
    }
    frame.render_widget(paragraph, area);
}

fn render_hero(app: &App, frame: &mut Frame, section: &Section, area: Rect, clip_top: u16) {
    let mut lines: Vec<Line> = vec![Line::default(); section.height as usize];
    lines[3] = Line::from(Span::styled("P R A J N A", Style::default().fg(Color::Yellow).bold()))
        .alignment(Alignment::Center);
    lines[5] = Line::from("Wisdom from the teachings of J. Krishnamurti").alignment(Alignment::Center);
    lines[8] = Line::from(Span::styled("↓ scroll", Style::default().fg(Color::DarkGray))).alignment(Alignment::Center);
    frame.render_widget(Paragraph::new(lines).scroll((clip_top, 0)), area);

    // The glow follows the pointer, offset from the hero's center
    let (dx, dy) = app.landing_view.glow;
    let glow_x = area.x as i32 + area.width as i32 / 2 + dx.round() as i32 * 2;
    let glow_y = area.y as i32 - clip_top as i32 + section.height as i32 / 2 + dy.round() as i32;
    if glow_x >= area.x as i32
        && glow_x < (area.x + area.width) as i32
        && glow_y >= area.y as i32
        && glow_y < (area.y + area.height) as i32
    {
        let glow = Paragraph::new(Span::styled("✺", Style::default().fg(Color::Rgb(255, 196, 80))));
        frame.render_widget(glow, Rect::new(glow_x as u16, glow_y as u16, 1, 1));
    }
}

fn render_marquee(app: &App, frame: &mut Frame, section: &Section, area: Rect, clip_top: u16, shown: bool) {
    let width = area.width as usize;
    let band: String = app
        .landing_view
        .marquee
        .chars()
        .cycle()
        .skip(app.marquee_offset)
        .take(width)
        .collect();
    let lines = vec![
        heading(section),
        Line::default(),
        Line::from(Span::styled(band, Style::default().fg(Color::Cyan).add_modifier(Modifier::ITALIC))),
    ];
    render_lines(frame, lines, area, clip_top, shown);
}

fn render_gallery(app: &mut App, frame: &mut Frame, section: &Section, area: Rect, clip_top: u16, shown: bool) {
    let [title_area, tiles_area] = split_heading(area, clip_top);
    if title_area.height > 0 {
        render_lines(frame, vec![heading(section)], title_area, clip_top, shown);
    }
    let tiles = Layout::horizontal(vec![Constraint::Ratio(1, GALLERY.len() as u32); GALLERY.len()]).split(tiles_area);
    let tile_clip = clip_top.saturating_sub(2);
    for (index, ((title, text), tile)) in GALLERY.iter().zip(tiles.iter()).enumerate() {
        app.gallery_areas.push(*tile);
        let opacity = app.landing_view.gallery_opacity.get(index).copied().unwrap_or(1.0);
        let style = if !shown {
            HIDDEN
        } else if opacity < 1.0 {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default().fg(Color::White)
        };
        let lines = vec![
            Line::from(Span::styled(title.to_string(), style.add_modifier(Modifier::BOLD))),
            Line::default(),
            Line::from(Span::styled(text.to_string(), style)),
        ];
        let block = Block::default().borders(Borders::ALL).border_style(style);
        let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: true }).scroll((tile_clip, 0));
        frame.render_widget(paragraph, *tile);
    }
}

fn render_panels(app: &mut App, frame: &mut Frame, section: &Section, area: Rect, clip_top: u16, shown: bool) {
    let [title_area, panels_area] = split_heading(area, clip_top);
    if title_area.height > 0 {
        render_lines(frame, vec![heading(section)], title_area, clip_top, shown);
    }
    let weights: Vec<Constraint> = app
        .landing_view
        .panel_flex
        .iter()
        .map(|flex| Constraint::Fill((flex * 10.0).round() as u16))
        .collect();
    let panels = Layout::horizontal(weights).split(panels_area);
    let panel_clip = clip_top.saturating_sub(2);
    for (index, ((title, text), panel)) in PANELS.iter().zip(panels.iter()).enumerate() {
        app.panel_areas.push(*panel);
        let grown = app.landing_view.panel_flex.get(index).copied().unwrap_or(1.0) > 1.0;
        let border = if !shown {
            HIDDEN
        } else if grown {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let block = Block::default().borders(Borders::ALL).border_style(border).title(format!(" {} ", title));
        let body = Paragraph::new(text.to_string())
            .block(block)
            .style(if shown { Style::default() } else { HIDDEN })
            .wrap(Wrap { trim: true })
            .scroll((panel_clip, 0));
        frame.render_widget(body, *panel);
    }
}

/// Heading (plus a spacer row) above the body of a section, minus rows scrolled away.
fn split_heading(area: Rect, clip_top: u16) -> [Rect; 2] {
    let heading_rows = 2u16.saturating_sub(clip_top).min(area.height);
    Layout::vertical([Constraint::Length(heading_rows), Constraint::Min(0)]).areas(area)
}

fn render_quote(app: &App, frame: &mut Frame, area: Rect, clip_top: u16) {
    let pulse_on = app.landing_view.quote_pulsing && (app.animation_frame / 8) % 2 == 0;
    let style = if pulse_on {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White).add_modifier(Modifier::ITALIC)
    };
    let lines = vec![
        Line::default(),
        Line::default(),
        Line::from(Span::styled(QUOTE, style)).alignment(Alignment::Center),
        Line::from(Span::styled("~ J. Krishnamurti", Style::default().fg(Color::DarkGray))).alignment(Alignment::Center),
    ];
    frame.render_widget(Paragraph::new(lines).scroll((clip_top, 0)), area);
}

pub fn render_splash(app: &App, frame: &mut Frame, area: Rect) {
    frame.render_widget(Clear, area);
    let dots = ".".repeat((app.animation_frame as usize / 4) % 3 + 1);
    let mut lines = vec![Line::default(); (area.height / 2).saturating_sub(2) as usize];
    lines.push(Line::from(Span::styled("☸", Style::default().fg(Color::Yellow).bold())).alignment(Alignment::Center));
    lines.push(Line::default());
    lines.push(Line::from(Span::styled("P R A J N A", Style::default().fg(Color::Yellow).bold())).alignment(Alignment::Center));
    lines.push(Line::from(Span::styled(format!("opening{}", dots), Style::default().fg(Color::DarkGray)))
        .alignment(Alignment::Center));
    frame.render_widget(Paragraph::new(lines).style(Style::default().bg(Color::Black)), area);
}

pub fn render_menu(app: &App, frame: &mut Frame, area: Rect) {
    let width = 32.min(area.width.saturating_sub(4));
    let height = (MENU_LINKS.len() as u16 + 2).min(area.height.saturating_sub(2));
    let popup = Rect::new(area.x + area.width.saturating_sub(width + 2), area.y + 2, width, height);
    frame.render_widget(Clear, popup);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Menu (Enter to go, m to close) ");

    let items: Vec<ListItem> = MENU_LINKS
        .iter()
        .enumerate()
        .map(|(i, (label, _))| ListItem::new(format!(" {}  {} ", i + 1, label)))
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    let mut state = ListState::default().with_selected(Some(app.menu_index));
    frame.render_stateful_widget(list, popup, &mut state);
}
