use std::time::{Duration, Instant};
use ratatui::layout::Rect;
use ratatui::widgets::ListState;
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;
use prajna_core::{
    perform, ChatId, ChatSession, Effect, HttpBackend, LandingController, LandingEffect,
    LandingLayout, LandingSettings, ScrollSnapshot, SessionEvent, SidebarView,
};
use crate::tui::AppEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Landing,
    Chat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusPane {
    Sidebar,
    Transcript,
    Input,
}

/// One block of the landing page, in document order.
#[derive(Debug, Clone, Copy)]
pub struct Section {
    pub id: &'static str,
    pub title: &'static str,
    pub height: u16,
    pub reveal: Option<usize>,
}

pub const SECTIONS: [Section; 7] = [
    Section { id: "home", title: "Prajna", height: 12, reveal: None },
    Section { id: "about", title: "About", height: 9, reveal: Some(0) },
    Section { id: "teachings", title: "Teachings", height: 6, reveal: Some(1) },
    Section { id: "gallery", title: "Gallery", height: 9, reveal: Some(2) },
    Section { id: "paths", title: "Two Ways In", height: 9, reveal: Some(3) },
    Section { id: "quote", title: "", height: 7, reveal: None },
    Section { id: "chat", title: "Begin", height: 8, reveal: Some(4) },
];

/// Overlay menu entries: label and link target.
pub const MENU_LINKS: [(&str, &str); 5] = [
    ("Home", "#home"),
    ("About", "#about"),
    ("Teachings", "#teachings"),
    ("Gallery", "#gallery"),
    ("Start a conversation", "/chat"),
];

pub const GALLERY: [(&str, &str); 4] = [
    ("Silence", "Sit with the question before reaching for an answer."),
    ("Inquiry", "Who is the one that is afraid?"),
    ("Courage", "Act rightly even when the mind trembles."),
    ("Compassion", "See the other as yourself."),
];

pub const PANELS: [(&str, &str); 2] = [
    ("Ask", "Bring a real question from your life. Answers cite the talks they draw from."),
    ("Reflect", "Return to past conversations in the sidebar and continue where you left off."),
];

pub const MARQUEE: &str = "  Self-knowledge ✦ Fearlessness ✦ Clarity ✦ Freedom ✦ Love ✦ Truth ✦ Simplicity ✦ Attention ✦";

pub const QUOTE: &str = "\"The one who knows himself has nothing left to fear.\"";

const SMOOTH_SCROLL_DIVISOR: u16 = 3;

/// What the landing page currently looks like, built up from controller effects.
#[derive(Debug, Clone, PartialEq)]
pub struct LandingView {
    pub splash_visible: bool,
    pub scroll_locked: bool,
    pub navbar_scrolled: bool,
    pub menu_open: bool,
    pub revealed: Vec<bool>,
    pub glow: (f32, f32),
    pub gallery_opacity: Vec<f32>,
    pub panel_flex: Vec<f32>,
    pub quote_pulsing: bool,
    pub marquee: String,
}

impl LandingView {
    fn new(layout: &LandingLayout) -> Self {
        Self {
            splash_visible: layout.has_splash,
            scroll_locked: false,
            navbar_scrolled: false,
            menu_open: false,
            revealed: vec![false; layout.reveal_elements],
            glow: (0.0, 0.0),
            gallery_opacity: vec![1.0; layout.gallery_items],
            panel_flex: vec![1.0; layout.split_panels],
            quote_pulsing: false,
            marquee: MARQUEE.to_string(),
        }
    }
}

/// Pending rename of a sidebar chat.
#[derive(Debug, Clone, PartialEq)]
pub struct RenameState {
    pub id: ChatId,
    pub input: String,
}

pub struct AppOptions {
    pub start_on_chat: bool,
    pub skip_splash: bool,
    pub landing_settings: LandingSettings,
    pub narrow_width: u16,
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub screen: Screen,
    pub input_mode: InputMode,
    pub focus: FocusPane,
    pub terminal_size: (u16, u16),

    // Landing page
    pub landing: LandingController,
    pub landing_view: LandingView,
    pub landing_scroll: u16,
    pub landing_viewport_height: u16,
    pub scroll_target: Option<u16>,
    pub menu_index: usize,
    pub hovered_gallery: Option<usize>,
    pub hovered_panel: Option<usize>,
    pub marquee_offset: usize,

    // Areas for mouse hit-testing (updated during render)
    pub gallery_areas: Vec<Rect>,
    pub panel_areas: Vec<Rect>,
    pub sidebar_area: Option<Rect>,
    pub transcript_area: Option<Rect>,

    // Chat page
    pub session: ChatSession,
    pub chat_input: String,
    pub input_cursor: usize, // cursor position in chat_input, in chars
    pub transcript_scroll: u16,
    pub follow_transcript: bool,
    pub sidebar_state: ListState,
    pub pending_delete: Option<ChatId>,
    pub rename: Option<RenameState>,

    // Animation state
    pub animation_frame: u8,
    last_tick: Instant,

    backend: HttpBackend,
    events: UnboundedSender<AppEvent>,
    start_on_chat: bool,
}

impl App {
    pub fn new(options: AppOptions, backend: HttpBackend, events: UnboundedSender<AppEvent>) -> Self {
        let layout = LandingLayout {
            has_splash: !options.skip_splash && !options.start_on_chat,
            reveal_elements: SECTIONS.iter().filter(|s| s.reveal.is_some()).count(),
            gallery_items: GALLERY.len(),
            split_panels: PANELS.len(),
            has_marquee: true,
            has_glow: true,
            has_quote: true,
        };

        Self {
            should_quit: false,
            screen: Screen::Landing,
            input_mode: InputMode::Normal,
            focus: FocusPane::Input,
            terminal_size: (0, 0),

            landing_view: LandingView::new(&layout),
            landing: LandingController::new(options.landing_settings, layout),
            landing_scroll: 0,
            landing_viewport_height: 0,
            scroll_target: None,
            menu_index: 0,
            hovered_gallery: None,
            hovered_panel: None,
            marquee_offset: 0,

            gallery_areas: Vec::new(),
            panel_areas: Vec::new(),
            sidebar_area: None,
            transcript_area: None,

            session: ChatSession::new(options.narrow_width),
            chat_input: String::new(),
            input_cursor: 0,
            transcript_scroll: 0,
            follow_transcript: true,
            sidebar_state: ListState::default(),
            pending_delete: None,
            rename: None,

            animation_frame: 0,
            last_tick: Instant::now(),

            backend,
            events,
            start_on_chat: options.start_on_chat,
        }
    }

    /// Page load for both pages.
    pub fn start(&mut self, width: u16, height: u16) {
        self.resize(width, height);
        let snapshot = self.scroll_snapshot();
        let effects = self.landing.init(&snapshot);
        self.apply_landing(effects);
        if self.start_on_chat {
            self.open_chat();
        }
    }

    pub fn backend_url(&self) -> &str {
        self.backend.base_url()
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.terminal_size = (width, height);
        // Header and footer take a row each, the navbar another.
        self.landing_viewport_height = height.saturating_sub(3);
        self.session.set_viewport_width(width);
        self.landing_scroll = self.landing_scroll.min(self.max_landing_scroll());
    }

    // ---- landing page ----

    pub fn document_height() -> u16 {
        SECTIONS.iter().map(|s| s.height).sum()
    }

    pub fn section_top(id: &str) -> Option<u16> {
        let mut top = 0;
        for section in SECTIONS.iter() {
            if section.id == id {
                return Some(top);
            }
            top += section.height;
        }
        None
    }

    pub fn max_landing_scroll(&self) -> u16 {
        Self::document_height().saturating_sub(self.landing_viewport_height)
    }

    pub fn scroll_snapshot(&self) -> ScrollSnapshot {
        let mut element_tops = Vec::new();
        let mut top = 0u16;
        for section in SECTIONS.iter() {
            if section.reveal.is_some() {
                element_tops.push(top as f32 - self.landing_scroll as f32);
            }
            top += section.height;
        }
        ScrollSnapshot {
            offset: self.landing_scroll as f32,
            viewport_height: self.landing_viewport_height as f32,
            element_tops,
        }
    }

    /// Fraction of the quote section inside the viewport.
    pub fn quote_visibility(&self) -> f32 {
        let (Some(top), Some(section)) = (Self::section_top("quote"), SECTIONS.iter().find(|s| s.id == "quote")) else {
            return 0.0;
        };
        let view_start = self.landing_scroll;
        let view_end = self.landing_scroll + self.landing_viewport_height;
        let start = top.max(view_start);
        let end = (top + section.height).min(view_end);
        if end <= start {
            0.0
        } else {
            (end - start) as f32 / section.height as f32
        }
    }

    pub fn landing_scroll_by(&mut self, delta: i32) {
        if self.landing_view.scroll_locked {
            return;
        }
        self.scroll_target = None;
        let next = (self.landing_scroll as i32 + delta).clamp(0, self.max_landing_scroll() as i32) as u16;
        if next != self.landing_scroll {
            self.landing_scroll = next;
            self.after_landing_scroll();
        }
    }

    fn after_landing_scroll(&mut self) {
        let snapshot = self.scroll_snapshot();
        let mut effects = self.landing.scrolled(&snapshot);
        effects.extend(self.landing.quote_visibility(self.quote_visibility()));
        self.apply_landing(effects);
    }

    pub fn apply_landing(&mut self, effects: Vec<LandingEffect>) {
        for effect in effects {
            match effect {
                LandingEffect::HideSplash => self.landing_view.splash_visible = false,
                LandingEffect::ScrollLock(locked) => self.landing_view.scroll_locked = locked,
                LandingEffect::NavbarScrolled(scrolled) => self.landing_view.navbar_scrolled = scrolled,
                LandingEffect::MenuOpen(open) => {
                    self.landing_view.menu_open = open;
                    self.menu_index = 0;
                }
                LandingEffect::Reveal(index) => {
                    if let Some(revealed) = self.landing_view.revealed.get_mut(index) {
                        *revealed = true;
                    }
                }
                LandingEffect::SmoothScrollTo(id) => match Self::section_top(&id) {
                    Some(top) => self.scroll_target = Some(top.min(self.max_landing_scroll())),
                    None => debug!(anchor = %id, "no such section"),
                },
                LandingEffect::MoveGlow { dx, dy } => self.landing_view.glow = (dx, dy),
                LandingEffect::GalleryOpacity { index, opacity } => {
                    if let Some(slot) = self.landing_view.gallery_opacity.get_mut(index) {
                        *slot = opacity;
                    }
                }
                LandingEffect::PanelFlex { index, flex } => {
                    if let Some(slot) = self.landing_view.panel_flex.get_mut(index) {
                        *slot = flex;
                    }
                }
                LandingEffect::StartQuotePulse => self.landing_view.quote_pulsing = true,
                LandingEffect::DuplicateMarquee => {
                    self.landing_view.marquee = format!("{}{}", MARQUEE, MARQUEE);
                }
                LandingEffect::Prefetch(target) => {
                    // The chat page's only data is the sidebar listing; warm it.
                    debug!(%target, "prefetching chat page");
                    let effects = self.session.refresh_sidebar();
                    self.dispatch(effects);
                }
            }
        }
    }

    pub fn dismiss_splash(&mut self) {
        let effects = self.landing.splash_clicked();
        self.apply_landing(effects);
    }

    pub fn toggle_menu(&mut self) {
        let effects = self.landing.menu_toggled();
        self.apply_landing(effects);
    }

    pub fn activate_menu_link(&mut self, index: usize) {
        let Some((_, href)) = MENU_LINKS.get(index) else {
            return;
        };
        let effects = self.landing.menu_link_activated();
        self.apply_landing(effects);
        self.follow_link(href);
    }

    pub fn follow_link(&mut self, href: &str) {
        if href.starts_with('#') {
            let effects = self.landing.anchor_activated(href);
            self.apply_landing(effects);
        } else {
            self.open_chat();
        }
    }

    pub fn pointer_moved(&mut self, column: u16, row: u16) {
        let (width, height) = self.terminal_size;
        let effects = self.landing.pointer_moved(column as f32, row as f32, width as f32, height as f32);
        self.apply_landing(effects);

        let gallery = self.gallery_areas.iter().position(|r| point_in_rect(column, row, *r));
        if gallery != self.hovered_gallery {
            let mut effects = self.landing.gallery_leave();
            if let Some(index) = gallery {
                effects.extend(self.landing.gallery_enter(index));
            }
            self.hovered_gallery = gallery;
            self.apply_landing(effects);
        }

        let panel = self.panel_areas.iter().position(|r| point_in_rect(column, row, *r));
        if panel != self.hovered_panel {
            let mut effects = Vec::new();
            if let Some(previous) = self.hovered_panel {
                effects.extend(self.landing.panel_leave(previous));
            }
            if let Some(index) = panel {
                effects.extend(self.landing.panel_enter(index));
            }
            self.hovered_panel = panel;
            self.apply_landing(effects);
        }
    }

    /// Called on every tick event.
    pub fn tick(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_tick);
        self.last_tick = now;
        self.advance(elapsed);
    }

    pub fn advance(&mut self, elapsed: Duration) {
        let effects = self.landing.tick(elapsed);
        self.apply_landing(effects);
        self.smooth_scroll_step();

        self.animation_frame = self.animation_frame.wrapping_add(1);
        if self.landing_view.marquee != MARQUEE {
            self.marquee_offset = (self.marquee_offset + 1) % MARQUEE.chars().count();
        }
    }

    fn smooth_scroll_step(&mut self) {
        let Some(target) = self.scroll_target else {
            return;
        };
        let current = self.landing_scroll;
        let distance = current.abs_diff(target);
        let step = (distance / SMOOTH_SCROLL_DIVISOR).max(1);
        self.landing_scroll = if target > current {
            current + step.min(distance)
        } else {
            current - step.min(distance)
        };
        if self.landing_scroll == target {
            self.scroll_target = None;
        }
        self.after_landing_scroll();
    }

    // ---- chat page ----

    pub fn open_chat(&mut self) {
        self.screen = Screen::Chat;
        self.focus = FocusPane::Input;
        self.input_mode = InputMode::Editing;
    }

    pub fn open_landing(&mut self) {
        self.screen = Screen::Landing;
        self.input_mode = InputMode::Normal;
    }

    /// Carry out session effects. Requests run on their own task and come back
    /// through the event channel.
    pub fn dispatch(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Request { generation, request } => {
                    let backend = self.backend.clone();
                    let events = self.events.clone();
                    tokio::spawn(async move {
                        let event = perform(&backend, generation, request).await;
                        let _ = events.send(AppEvent::Session(event));
                    });
                }
                Effect::ConfirmDelete(id) => self.pending_delete = Some(id),
                Effect::ScrollToEnd => self.follow_transcript = true,
                Effect::FocusInput => {
                    self.focus = FocusPane::Input;
                    self.input_mode = InputMode::Editing;
                }
            }
        }
    }

    pub fn on_session_event(&mut self, event: SessionEvent) {
        let effects = self.session.handle(event);
        self.dispatch(effects);
        self.clamp_sidebar_selection();
    }

    pub fn submit_input(&mut self) {
        let effects = self.session.submit_message(&self.chat_input);
        if effects.is_empty() {
            return;
        }
        self.chat_input.clear();
        self.input_cursor = 0;
        self.dispatch(effects);
    }

    pub fn ask_suggestion(&mut self, index: usize) {
        let effects = self.session.ask_suggestion(index);
        self.dispatch(effects);
    }

    pub fn new_chat(&mut self) {
        let effects = self.session.start_new_chat();
        self.transcript_scroll = 0;
        self.dispatch(effects);
    }

    pub fn sidebar_ids(&self) -> Vec<ChatId> {
        match self.session.sidebar() {
            SidebarView::Entries(entries) => entries.into_iter().map(|e| e.chat.id.clone()).collect(),
            _ => Vec::new(),
        }
    }

    pub fn selected_chat(&self) -> Option<ChatId> {
        let index = self.sidebar_state.selected()?;
        self.sidebar_ids().into_iter().nth(index)
    }

    fn clamp_sidebar_selection(&mut self) {
        let len = self.sidebar_ids().len();
        match self.sidebar_state.selected() {
            _ if len == 0 => self.sidebar_state.select(None),
            Some(i) if i >= len => self.sidebar_state.select(Some(len - 1)),
            None => self.sidebar_state.select(Some(0)),
            _ => {}
        }
    }

    pub fn sidebar_nav_down(&mut self) {
        let len = self.sidebar_ids().len();
        if len > 0 {
            let i = self.sidebar_state.selected().unwrap_or(0);
            self.sidebar_state.select(Some((i + 1).min(len - 1)));
        }
    }

    pub fn sidebar_nav_up(&mut self) {
        let i = self.sidebar_state.selected().unwrap_or(0);
        self.sidebar_state.select(Some(i.saturating_sub(1)));
    }

    pub fn load_selected(&mut self) {
        if let Some(id) = self.selected_chat() {
            let effects = self.session.load_chat(id);
            self.dispatch(effects);
        }
    }

    pub fn delete_selected(&mut self) {
        if let Some(id) = self.selected_chat() {
            let effects = self.session.request_delete(id);
            self.dispatch(effects);
        }
    }

    pub fn answer_delete(&mut self, confirmed: bool) {
        if let Some(id) = self.pending_delete.take() {
            if confirmed {
                let effects = self.session.confirm_delete(id);
                self.dispatch(effects);
            }
        }
    }

    pub fn begin_rename(&mut self) {
        let Some(id) = self.selected_chat() else {
            return;
        };
        let current = match self.session.sidebar() {
            SidebarView::Entries(entries) => entries
                .into_iter()
                .find(|e| e.chat.id == id)
                .map(|e| e.chat.title.clone())
                .unwrap_or_default(),
            _ => String::new(),
        };
        self.rename = Some(RenameState { id, input: current });
    }

    pub fn commit_rename(&mut self) {
        if let Some(RenameState { id, input }) = self.rename.take() {
            let effects = self.session.rename_chat(id, &input);
            self.dispatch(effects);
        }
    }

    pub fn scroll_transcript(&mut self, delta: i32) {
        self.follow_transcript = false;
        self.transcript_scroll = (self.transcript_scroll as i32 + delta).max(0) as u16;
    }
}

/// Check if a point is within a rectangle
pub fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}
