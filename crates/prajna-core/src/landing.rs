//! Landing page effects as a state machine.
//!
//! The host feeds in what happened (a click, a scroll position, a pointer move, a
//! timer tick) and applies the returned [`LandingEffect`]s to whatever it draws
//! with. Nothing here fails and nothing survives a reload.

use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub struct LandingSettings {
    pub splash_duration: Duration,
    /// Scroll offset past which the navbar switches to its scrolled look.
    pub navbar_threshold: f32,
    /// Distance from the viewport bottom an element's top must cross to reveal.
    pub reveal_point: f32,
    pub glow_divisor: f32,
    pub gallery_dim_opacity: f32,
    pub panel_hover_flex: f32,
    /// Fraction of the quote that must be visible to start its pulse.
    pub quote_trigger_ratio: f32,
    pub prefetch_target: String,
}

impl Default for LandingSettings {
    fn default() -> Self {
        Self {
            splash_duration: Duration::from_secs(3),
            navbar_threshold: 50.0,
            reveal_point: 150.0,
            glow_divisor: 50.0,
            gallery_dim_opacity: 0.5,
            panel_hover_flex: 1.2,
            quote_trigger_ratio: 0.5,
            prefetch_target: "/chat".to_string(),
        }
    }
}

/// Which decorative elements the page actually has.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LandingLayout {
    pub has_splash: bool,
    pub reveal_elements: usize,
    pub gallery_items: usize,
    pub split_panels: usize,
    pub has_marquee: bool,
    pub has_glow: bool,
    pub has_quote: bool,
}

/// Scroll position plus the viewport-relative top of every reveal element.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScrollSnapshot {
    pub offset: f32,
    pub viewport_height: f32,
    pub element_tops: Vec<f32>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LandingEffect {
    HideSplash,
    /// `true` suppresses page scrolling, `false` restores it.
    ScrollLock(bool),
    NavbarScrolled(bool),
    MenuOpen(bool),
    Reveal(usize),
    SmoothScrollTo(String),
    MoveGlow { dx: f32, dy: f32 },
    GalleryOpacity { index: usize, opacity: f32 },
    PanelFlex { index: usize, flex: f32 },
    StartQuotePulse,
    DuplicateMarquee,
    Prefetch(String),
}

#[derive(Debug, Clone)]
pub struct LandingController {
    settings: LandingSettings,
    layout: LandingLayout,
    splash_visible: bool,
    splash_elapsed: Duration,
    navbar_scrolled: bool,
    menu_open: bool,
    revealed: Vec<bool>,
    glow: (f32, f32),
    hovered_gallery: Option<usize>,
    panel_flex: Vec<f32>,
    quote_pulsing: bool,
    marquee_duplicated: bool,
    initialized: bool,
}

impl LandingController {
    pub fn new(settings: LandingSettings, layout: LandingLayout) -> Self {
        Self {
            splash_visible: layout.has_splash,
            splash_elapsed: Duration::ZERO,
            navbar_scrolled: false,
            menu_open: false,
            revealed: vec![false; layout.reveal_elements],
            glow: (0.0, 0.0),
            hovered_gallery: None,
            panel_flex: vec![1.0; layout.split_panels],
            quote_pulsing: false,
            marquee_duplicated: false,
            initialized: false,
            settings,
            layout,
        }
    }

    pub fn settings(&self) -> &LandingSettings {
        &self.settings
    }

    pub fn splash_visible(&self) -> bool {
        self.splash_visible
    }

    pub fn scroll_locked(&self) -> bool {
        self.splash_visible || self.menu_open
    }

    pub fn navbar_scrolled(&self) -> bool {
        self.navbar_scrolled
    }

    pub fn menu_open(&self) -> bool {
        self.menu_open
    }

    pub fn is_revealed(&self, index: usize) -> bool {
        self.revealed.get(index).copied().unwrap_or(false)
    }

    pub fn glow_offset(&self) -> (f32, f32) {
        self.glow
    }

    pub fn gallery_opacity(&self, index: usize) -> f32 {
        match self.hovered_gallery {
            Some(hovered) if hovered != index => self.settings.gallery_dim_opacity,
            _ => 1.0,
        }
    }

    pub fn panel_flex(&self, index: usize) -> f32 {
        self.panel_flex.get(index).copied().unwrap_or(1.0)
    }

    pub fn quote_pulsing(&self) -> bool {
        self.quote_pulsing
    }

    pub fn marquee_duplicated(&self) -> bool {
        self.marquee_duplicated
    }

    /// Page load: lock scrolling behind the splash, double the marquee, run the
    /// first reveal pass and ask for the chat page to be prefetched.
    pub fn init(&mut self, scroll: &ScrollSnapshot) -> Vec<LandingEffect> {
        if self.initialized {
            return Vec::new();
        }
        self.initialized = true;

        let mut effects = Vec::new();
        if self.splash_visible {
            effects.push(LandingEffect::ScrollLock(true));
        }
        if self.layout.has_marquee && !self.marquee_duplicated {
            self.marquee_duplicated = true;
            effects.push(LandingEffect::DuplicateMarquee);
        }
        effects.extend(self.update_navbar(scroll.offset));
        effects.extend(self.reveal_pass(scroll));
        effects.push(LandingEffect::Prefetch(self.settings.prefetch_target.clone()));
        effects
    }

    pub fn splash_clicked(&mut self) -> Vec<LandingEffect> {
        self.hide_splash()
    }

    /// Advance the splash timer.
    pub fn tick(&mut self, elapsed: Duration) -> Vec<LandingEffect> {
        if !self.splash_visible {
            return Vec::new();
        }
        self.splash_elapsed += elapsed;
        if self.splash_elapsed >= self.settings.splash_duration {
            self.hide_splash()
        } else {
            Vec::new()
        }
    }

    fn hide_splash(&mut self) -> Vec<LandingEffect> {
        if !self.splash_visible {
            return Vec::new();
        }
        let was_locked = self.scroll_locked();
        self.splash_visible = false;

        let mut effects = vec![LandingEffect::HideSplash];
        if was_locked && !self.scroll_locked() {
            effects.push(LandingEffect::ScrollLock(false));
        }
        effects
    }

    pub fn scrolled(&mut self, scroll: &ScrollSnapshot) -> Vec<LandingEffect> {
        let mut effects = self.update_navbar(scroll.offset);
        effects.extend(self.reveal_pass(scroll));
        effects
    }

    fn update_navbar(&mut self, offset: f32) -> Vec<LandingEffect> {
        let scrolled = offset > self.settings.navbar_threshold;
        if scrolled == self.navbar_scrolled {
            return Vec::new();
        }
        self.navbar_scrolled = scrolled;
        vec![LandingEffect::NavbarScrolled(scrolled)]
    }

    // One-way: elements never hide again once revealed.
    fn reveal_pass(&mut self, scroll: &ScrollSnapshot) -> Vec<LandingEffect> {
        let line = scroll.viewport_height - self.settings.reveal_point;
        let mut effects = Vec::new();
        for (index, top) in scroll.element_tops.iter().enumerate() {
            let Some(revealed) = self.revealed.get_mut(index) else {
                break;
            };
            if !*revealed && *top < line {
                *revealed = true;
                effects.push(LandingEffect::Reveal(index));
            }
        }
        effects
    }

    pub fn menu_toggled(&mut self) -> Vec<LandingEffect> {
        self.set_menu(!self.menu_open)
    }

    pub fn menu_link_activated(&mut self) -> Vec<LandingEffect> {
        self.set_menu(false)
    }

    fn set_menu(&mut self, open: bool) -> Vec<LandingEffect> {
        if open == self.menu_open {
            return Vec::new();
        }
        let was_locked = self.scroll_locked();
        self.menu_open = open;

        let mut effects = vec![LandingEffect::MenuOpen(open)];
        if was_locked != self.scroll_locked() {
            effects.push(LandingEffect::ScrollLock(self.scroll_locked()));
        }
        effects
    }

    /// An in-page `#anchor` link was activated.
    pub fn anchor_activated(&mut self, href: &str) -> Vec<LandingEffect> {
        let target = href.trim_start_matches('#');
        if target.is_empty() {
            return Vec::new();
        }
        vec![LandingEffect::SmoothScrollTo(target.to_string())]
    }

    pub fn pointer_moved(&mut self, x: f32, y: f32, viewport_width: f32, viewport_height: f32) -> Vec<LandingEffect> {
        if !self.layout.has_glow {
            return Vec::new();
        }
        let divisor = self.settings.glow_divisor;
        let dx = (x - viewport_width / 2.0) / divisor;
        let dy = (y - viewport_height / 2.0) / divisor;
        self.glow = (dx, dy);
        vec![LandingEffect::MoveGlow { dx, dy }]
    }

    pub fn gallery_enter(&mut self, index: usize) -> Vec<LandingEffect> {
        if index >= self.layout.gallery_items || self.hovered_gallery == Some(index) {
            return Vec::new();
        }
        self.hovered_gallery = Some(index);
        self.gallery_opacities()
    }

    pub fn gallery_leave(&mut self) -> Vec<LandingEffect> {
        if self.hovered_gallery.take().is_none() {
            return Vec::new();
        }
        self.gallery_opacities()
    }

    fn gallery_opacities(&self) -> Vec<LandingEffect> {
        (0..self.layout.gallery_items)
            .map(|index| LandingEffect::GalleryOpacity {
                index,
                opacity: self.gallery_opacity(index),
            })
            .collect()
    }

    pub fn panel_enter(&mut self, index: usize) -> Vec<LandingEffect> {
        self.set_panel_flex(index, self.settings.panel_hover_flex)
    }

    pub fn panel_leave(&mut self, index: usize) -> Vec<LandingEffect> {
        self.set_panel_flex(index, 1.0)
    }

    fn set_panel_flex(&mut self, index: usize, flex: f32) -> Vec<LandingEffect> {
        match self.panel_flex.get_mut(index) {
            Some(current) if *current != flex => {
                *current = flex;
                vec![LandingEffect::PanelFlex { index, flex }]
            }
            _ => Vec::new(),
        }
    }

    /// Visible fraction of the highlighted quote changed. Fires once.
    pub fn quote_visibility(&mut self, ratio: f32) -> Vec<LandingEffect> {
        if !self.layout.has_quote || self.quote_pulsing {
            return Vec::new();
        }
        if ratio > 0.0 && ratio >= self.settings.quote_trigger_ratio {
            self.quote_pulsing = true;
            return vec![LandingEffect::StartQuotePulse];
        }
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> LandingLayout {
        LandingLayout {
            has_splash: true,
            reveal_elements: 3,
            gallery_items: 4,
            split_panels: 2,
            has_marquee: true,
            has_glow: true,
            has_quote: true,
        }
    }

    fn controller() -> LandingController {
        LandingController::new(LandingSettings::default(), layout())
    }

    fn snapshot(offset: f32, tops: &[f32]) -> ScrollSnapshot {
        ScrollSnapshot {
            offset,
            viewport_height: 800.0,
            element_tops: tops.to_vec(),
        }
    }

    #[test]
    fn init_locks_scroll_doubles_marquee_and_prefetches() {
        let mut landing = controller();
        let effects = landing.init(&snapshot(0.0, &[300.0, 700.0, 1600.0]));

        assert_eq!(
            effects,
            vec![
                LandingEffect::ScrollLock(true),
                LandingEffect::DuplicateMarquee,
                LandingEffect::Reveal(0),
                LandingEffect::Prefetch("/chat".into()),
            ]
        );
        assert!(landing.marquee_duplicated());
        assert!(landing.init(&snapshot(0.0, &[])).is_empty());
    }

    #[test]
    fn splash_hides_after_three_seconds() {
        let mut landing = controller();
        landing.init(&snapshot(0.0, &[]));

        assert!(landing.tick(Duration::from_millis(2900)).is_empty());
        assert!(landing.splash_visible());
        assert_eq!(
            landing.tick(Duration::from_millis(100)),
            vec![LandingEffect::HideSplash, LandingEffect::ScrollLock(false)]
        );
        assert!(!landing.scroll_locked());
        assert!(landing.tick(Duration::from_secs(5)).is_empty());
    }

    #[test]
    fn splash_click_beats_the_timer_and_unlocks_once() {
        let mut landing = controller();
        landing.init(&snapshot(0.0, &[]));

        assert_eq!(
            landing.splash_clicked(),
            vec![LandingEffect::HideSplash, LandingEffect::ScrollLock(false)]
        );
        assert!(landing.splash_clicked().is_empty());
        assert!(landing.tick(Duration::from_secs(3)).is_empty());
    }

    #[test]
    fn navbar_follows_threshold_both_ways() {
        let mut landing = controller();
        assert!(landing.scrolled(&snapshot(50.0, &[])).is_empty());
        assert_eq!(landing.scrolled(&snapshot(51.0, &[])), vec![LandingEffect::NavbarScrolled(true)]);
        assert!(landing.scrolled(&snapshot(400.0, &[])).is_empty());
        assert_eq!(landing.scrolled(&snapshot(10.0, &[])), vec![LandingEffect::NavbarScrolled(false)]);
    }

    #[test]
    fn reveal_is_monotonic() {
        let mut landing = controller();
        // 800 - 150 = 650 is the reveal line.
        assert_eq!(landing.scrolled(&snapshot(0.0, &[649.0, 650.0, 900.0])), vec![LandingEffect::Reveal(0)]);
        assert_eq!(
            landing.scrolled(&snapshot(300.0, &[349.0, 350.0, 600.0])),
            vec![LandingEffect::Reveal(1), LandingEffect::Reveal(2)]
        );
        // Scrolling back up never hides anything.
        assert!(landing.scrolled(&snapshot(0.0, &[649.0, 650.0, 900.0])).is_empty());
        assert!((0..3).all(|i| landing.is_revealed(i)));
    }

    #[test]
    fn menu_toggle_and_link_close() {
        let mut landing = controller();
        landing.splash_clicked();

        assert_eq!(
            landing.menu_toggled(),
            vec![LandingEffect::MenuOpen(true), LandingEffect::ScrollLock(true)]
        );
        assert_eq!(
            landing.menu_link_activated(),
            vec![LandingEffect::MenuOpen(false), LandingEffect::ScrollLock(false)]
        );
        assert!(landing.menu_link_activated().is_empty());
    }

    #[test]
    fn splash_timer_keeps_scroll_locked_while_menu_is_open() {
        let mut landing = controller();
        assert_eq!(landing.menu_toggled(), vec![LandingEffect::MenuOpen(true)]);
        assert_eq!(landing.tick(Duration::from_secs(3)), vec![LandingEffect::HideSplash]);
        assert!(landing.scroll_locked());
    }

    #[test]
    fn anchors_scroll_smoothly() {
        let mut landing = controller();
        assert_eq!(landing.anchor_activated("#about"), vec![LandingEffect::SmoothScrollTo("about".into())]);
        assert!(landing.anchor_activated("#").is_empty());
    }

    #[test]
    fn glow_offsets_from_viewport_centre() {
        let mut landing = controller();
        assert_eq!(
            landing.pointer_moved(600.0, 300.0, 1000.0, 800.0),
            vec![LandingEffect::MoveGlow { dx: 2.0, dy: -2.0 }]
        );
        assert_eq!(landing.glow_offset(), (2.0, -2.0));

        let mut bare = LandingController::new(LandingSettings::default(), LandingLayout::default());
        assert!(bare.pointer_moved(0.0, 0.0, 100.0, 100.0).is_empty());
    }

    #[test]
    fn gallery_hover_dims_siblings_and_leave_restores() {
        let mut landing = controller();
        let effects = landing.gallery_enter(1);
        assert_eq!(effects.len(), 4);
        assert_eq!(effects[0], LandingEffect::GalleryOpacity { index: 0, opacity: 0.5 });
        assert_eq!(effects[1], LandingEffect::GalleryOpacity { index: 1, opacity: 1.0 });

        let restored = landing.gallery_leave();
        assert!(restored
            .iter()
            .all(|e| matches!(e, LandingEffect::GalleryOpacity { opacity, .. } if *opacity == 1.0)));
        assert!(landing.gallery_leave().is_empty());
        assert!(landing.gallery_enter(9).is_empty());
    }

    #[test]
    fn panel_hover_grows_and_restores() {
        let mut landing = controller();
        assert_eq!(landing.panel_enter(0), vec![LandingEffect::PanelFlex { index: 0, flex: 1.2 }]);
        assert!(landing.panel_enter(0).is_empty());
        assert_eq!(landing.panel_leave(0), vec![LandingEffect::PanelFlex { index: 0, flex: 1.0 }]);
        assert!(landing.panel_enter(5).is_empty());
    }

    #[test]
    fn quote_pulse_is_one_shot() {
        let mut landing = controller();
        assert!(landing.quote_visibility(0.2).is_empty());
        assert_eq!(landing.quote_visibility(0.6), vec![LandingEffect::StartQuotePulse]);
        assert!(landing.quote_visibility(0.0).is_empty());
        assert!(landing.quote_visibility(1.0).is_empty());
        assert!(landing.quote_pulsing());
    }
}
