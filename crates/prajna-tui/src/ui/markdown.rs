//! Assistant replies are markdown; this turns them into styled terminal lines.
//!
//! Raw HTML is shown as the literal text it was written as, and link targets
//! pass through the same scheme filter the HTML renderer uses.

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd};
use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};
use prajna_core::markup::safe_href;

struct LineBuilder {
    lines: Vec<Line<'static>>,
    current: Vec<Span<'static>>,
    styles: Vec<Style>,
    list_stack: Vec<Option<u64>>,
    link_targets: Vec<String>,
    in_code_block: bool,
}

impl LineBuilder {
    fn new() -> Self {
        Self {
            lines: Vec::new(),
            current: Vec::new(),
            styles: vec![Style::default()],
            list_stack: Vec::new(),
            link_targets: Vec::new(),
            in_code_block: false,
        }
    }

    fn style(&self) -> Style {
        self.styles.last().copied().unwrap_or_default()
    }

    fn push_style(&mut self, patch: Style) {
        let style = self.style().patch(patch);
        self.styles.push(style);
    }

    fn pop_style(&mut self) {
        if self.styles.len() > 1 {
            self.styles.pop();
        }
    }

    fn text(&mut self, text: &str) {
        let style = self.style();
        self.current.push(Span::styled(text.to_string(), style));
    }

    fn flush(&mut self) {
        if !self.current.is_empty() {
            self.lines.push(Line::from(std::mem::take(&mut self.current)));
        }
    }

    fn blank(&mut self) {
        self.flush();
        if self.lines.last().map(|l| l.width() > 0).unwrap_or(false) {
            self.lines.push(Line::default());
        }
    }

    fn finish(mut self) -> Vec<Line<'static>> {
        self.flush();
        while self.lines.last().map(|l| l.width() == 0).unwrap_or(false) {
            self.lines.pop();
        }
        self.lines
    }
}

pub fn markdown_lines(markdown: &str) -> Vec<Line<'static>> {
    let mut builder = LineBuilder::new();
    let parser = Parser::new_ext(markdown, Options::ENABLE_STRIKETHROUGH);

    for event in parser {
        match event {
            Event::Start(tag) => match tag {
                Tag::Paragraph => {}
                Tag::Heading { .. } => {
                    builder.blank();
                    builder.push_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));
                }
                Tag::Strong => builder.push_style(Style::default().add_modifier(Modifier::BOLD)),
                Tag::Emphasis => builder.push_style(Style::default().add_modifier(Modifier::ITALIC)),
                Tag::Strikethrough => builder.push_style(Style::default().add_modifier(Modifier::CROSSED_OUT)),
                Tag::CodeBlock(kind) => {
                    builder.blank();
                    builder.in_code_block = true;
                    if let CodeBlockKind::Fenced(lang) = kind {
                        if !lang.is_empty() {
                            builder.lines.push(Line::from(Span::styled(
                                format!("┌ {}", lang),
                                Style::default().fg(Color::DarkGray),
                            )));
                        }
                    }
                    builder.push_style(Style::default().fg(Color::Green));
                }
                Tag::List(start) => {
                    builder.flush();
                    builder.list_stack.push(start);
                }
                Tag::Item => {
                    builder.flush();
                    let depth = builder.list_stack.len().saturating_sub(1);
                    let marker = match builder.list_stack.last_mut() {
                        Some(Some(n)) => {
                            let marker = format!("{}. ", n);
                            *n += 1;
                            marker
                        }
                        _ => "• ".to_string(),
                    };
                    builder.current.push(Span::raw(format!("{}{}", "  ".repeat(depth), marker)));
                }
                Tag::Link { dest_url, .. } | Tag::Image { dest_url, .. } => {
                    builder.link_targets.push(safe_href(&dest_url).to_string());
                    builder.push_style(Style::default().fg(Color::Blue).add_modifier(Modifier::UNDERLINED));
                }
                _ => {}
            },
            Event::End(tag) => match tag {
                TagEnd::Paragraph => builder.blank(),
                TagEnd::Heading(_) => {
                    builder.pop_style();
                    builder.blank();
                }
                TagEnd::Strong | TagEnd::Emphasis | TagEnd::Strikethrough => builder.pop_style(),
                TagEnd::CodeBlock => {
                    builder.pop_style();
                    builder.in_code_block = false;
                    builder.blank();
                }
                TagEnd::List(_) => {
                    builder.list_stack.pop();
                    if builder.list_stack.is_empty() {
                        builder.blank();
                    }
                }
                TagEnd::Item => builder.flush(),
                TagEnd::Link | TagEnd::Image => {
                    builder.pop_style();
                    if let Some(target) = builder.link_targets.pop() {
                        builder.current.push(Span::styled(
                            format!(" ({})", target),
                            Style::default().fg(Color::DarkGray),
                        ));
                    }
                }
                _ => {}
            },
            Event::Text(text) if builder.in_code_block => {
                for (i, line) in text.split('\n').enumerate() {
                    if i > 0 {
                        builder.flush();
                    }
                    if !line.is_empty() {
                        builder.text(line);
                    }
                }
            }
            Event::Text(text) => builder.text(&text),
            Event::Code(code) => {
                builder.current.push(Span::styled(code.to_string(), Style::default().fg(Color::Green)));
            }
            // Markup the author typed is displayed, never interpreted.
            Event::Html(html) | Event::InlineHtml(html) => {
                for (i, line) in html.split('\n').enumerate() {
                    if i > 0 {
                        builder.flush();
                    }
                    if !line.is_empty() {
                        builder.text(line);
                    }
                }
            }
            Event::SoftBreak => builder.text(" "),
            Event::HardBreak => builder.flush(),
            Event::Rule => {
                builder.blank();
                builder.lines.push(Line::from(Span::styled("─".repeat(24), Style::default().fg(Color::DarkGray))));
                builder.blank();
            }
            Event::TaskListMarker(done) => builder.text(if done { "[x] " } else { "[ ] " }),
            _ => {}
        }
    }

    builder.finish()
}
