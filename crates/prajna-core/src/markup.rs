//! Turning transcript and sidebar data into markup.
//!
//! Two paths only: assistant answers go through the markdown renderer with raw
//! HTML neutralised, everything else (user text, chat titles, citation parts) is
//! escaped and never interpreted.

use pulldown_cmark::{html, CowStr, Event, Options, Parser, Tag};

use crate::api::{ChatSummary, Message, Role};

/// Link target used when a citation carries no URL, or an unsafe one.
pub const PLACEHOLDER_HREF: &str = "#";

pub const REFERENCES_LABEL: &str = "📚 References:";

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Inverse of [`escape_html`]; reads escaped markup back as display text.
pub fn unescape_html(text: &str) -> String {
    const ENTITIES: [(&str, char); 6] = [
        ("&amp;", '&'),
        ("&lt;", '<'),
        ("&gt;", '>'),
        ("&quot;", '"'),
        ("&#39;", '\''),
        ("&#x27;", '\''),
    ];

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    'outer: while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];
        for (entity, c) in ENTITIES {
            if let Some(after) = rest.strip_prefix(entity) {
                out.push(c);
                rest = after;
                continue 'outer;
            }
        }
        out.push('&');
        rest = &rest[1..];
    }
    out.push_str(rest);
    out
}

/// Replace script-capable link targets with the placeholder.
pub fn safe_href(url: &str) -> &str {
    let lowered = url.trim_start().to_ascii_lowercase();
    let blocked = ["javascript:", "vbscript:", "data:"];
    if blocked.iter().any(|scheme| lowered.starts_with(scheme)) {
        PLACEHOLDER_HREF
    } else {
        url
    }
}

fn markdown_options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options
}

/// Render assistant markdown to HTML. Embedded HTML is emitted as escaped text.
pub fn render_markdown(markdown: &str) -> String {
    let parser = Parser::new_ext(markdown, markdown_options()).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        Event::Start(Tag::Link { link_type, dest_url, title, id }) => Event::Start(Tag::Link {
            link_type,
            dest_url: sanitize_dest(dest_url),
            title,
            id,
        }),
        Event::Start(Tag::Image { link_type, dest_url, title, id }) => Event::Start(Tag::Image {
            link_type,
            dest_url: sanitize_dest(dest_url),
            title,
            id,
        }),
        other => other,
    });

    let mut output = String::new();
    html::push_html(&mut output, parser);
    output
}

fn sanitize_dest(dest: CowStr<'_>) -> CowStr<'_> {
    if safe_href(&dest) == PLACEHOLDER_HREF && &*dest != PLACEHOLDER_HREF {
        CowStr::Borrowed(PLACEHOLDER_HREF)
    } else {
        dest
    }
}

/// A `"<title>: <url>"` source attached to an assistant answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Citation {
    pub title: String,
    pub url: Option<String>,
}

impl Citation {
    /// Split on the first `": "`; anything after it is the URL.
    pub fn parse(source: &str) -> Self {
        match source.split_once(": ") {
            Some((title, url)) if !url.trim().is_empty() => Self {
                title: title.to_string(),
                url: Some(url.trim().to_string()),
            },
            Some((title, _)) => Self {
                title: title.to_string(),
                url: None,
            },
            None => Self {
                title: source.to_string(),
                url: None,
            },
        }
    }

    pub fn href(&self) -> &str {
        self.url.as_deref().map(safe_href).unwrap_or(PLACEHOLDER_HREF)
    }

    pub fn to_html(&self) -> String {
        format!(
            r#"<a href="{}" target="_blank" rel="noopener">{}</a>"#,
            escape_html(self.href()),
            escape_html(&self.title)
        )
    }
}

/// The references block under an answer, or an empty string when there are none.
pub fn render_sources_html(sources: &[String]) -> String {
    if sources.is_empty() {
        return String::new();
    }
    let links: Vec<String> = sources.iter().map(|s| Citation::parse(s).to_html()).collect();
    format!(
        r#"<div class="message-sources"><strong>{}</strong><br>{}</div>"#,
        REFERENCES_LABEL,
        links.join("<br>")
    )
}

pub fn render_message_html(message: &Message) -> String {
    let content = match message.role {
        Role::Assistant => render_markdown(&message.content),
        Role::User => escape_html(&message.content),
    };
    format!(
        r#"<div class="message {}"><div class="message-content">{}{}</div></div>"#,
        message.role.as_str(),
        content,
        render_sources_html(&message.sources)
    )
}

pub fn render_sidebar_item_html(chat: &ChatSummary, active: bool) -> String {
    let class = if active { "chat-history-item active" } else { "chat-history-item" };
    format!(
        r#"<div class="{}" data-id="{}"><span class="chat-history-title">{}</span><button class="chat-delete-btn" data-id="{}" title="Delete chat">✕</button></div>"#,
        class,
        escape_html(&chat.id.to_string()),
        escape_html(&chat.title),
        escape_html(&chat.id.to_string())
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Text a browser would display for a fragment with no live markup.
    fn visible_text(html: &str) -> String {
        let mut text = String::new();
        let mut in_tag = false;
        for c in html.chars() {
            match c {
                '<' => in_tag = true,
                '>' => in_tag = false,
                _ if !in_tag => text.push(c),
                _ => {}
            }
        }
        unescape_html(&text)
    }

    #[test]
    fn escaping_is_lossless_for_display() {
        let samples = [
            "plain",
            "<script>alert('x')</script>",
            "Tom & Jerry \"quoted\"",
            "&amp; already escaped",
            "ünïcødé <b>",
        ];
        for sample in samples {
            let escaped = escape_html(sample);
            assert!(!escaped.contains('<'));
            assert_eq!(unescape_html(&escaped), sample);
        }
    }

    #[test]
    fn user_message_is_never_interpreted() {
        let html = render_message_html(&Message::user("<img src=x onerror=alert(1)> **hi**"));
        assert!(html.contains("&lt;img"));
        assert!(!html.contains("<img"));
        assert!(!html.contains("<strong>hi"));
        assert_eq!(visible_text(&html), "<img src=x onerror=alert(1)> **hi**");
    }

    #[test]
    fn assistant_markdown_is_rendered_but_raw_html_is_not() {
        let html = render_markdown("**Be** still.\n\n<script>alert(1)</script>\n");
        assert!(html.contains("<strong>Be</strong>"));
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn script_links_are_neutralised() {
        let html = render_markdown("[click](javascript:alert(1)) and [ok](https://example.org)");
        assert!(html.contains(r##"href="#""##));
        assert!(html.contains(r#"href="https://example.org""#));
    }

    #[test]
    fn citation_splits_on_first_separator() {
        assert_eq!(
            Citation::parse("Talk A: https://x"),
            Citation { title: "Talk A".into(), url: Some("https://x".into()) }
        );
        let nested = Citation::parse("Q&A: Fear: https://y/z");
        assert_eq!(nested.title, "Q&A");
        assert_eq!(nested.url.as_deref(), Some("Fear: https://y/z"));

        let bare = Citation::parse("Untitled note");
        assert_eq!(bare.title, "Untitled note");
        assert_eq!(bare.href(), PLACEHOLDER_HREF);
    }

    #[test]
    fn sources_render_as_new_tab_links() {
        let html = render_sources_html(&["Talk A: https://x".into(), "No link".into()]);
        assert!(html.contains(r#"<a href="https://x" target="_blank" rel="noopener">Talk A</a>"#));
        assert!(html.contains(r##"<a href="#" target="_blank" rel="noopener">No link</a>"##));
        assert!(html.contains("</a><br><a"));
        assert_eq!(render_sources_html(&[]), "");
    }

    #[test]
    fn sidebar_titles_are_escaped() {
        let chat = ChatSummary::new(5, "<b>bold</b> & brave");
        let html = render_sidebar_item_html(&chat, true);
        assert!(html.contains("chat-history-item active"));
        assert!(html.contains("&lt;b&gt;bold&lt;/b&gt; &amp; brave"));
        assert_eq!(visible_text(&html), "<b>bold</b> & brave✕");
    }
}
