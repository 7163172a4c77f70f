use crate::config::HeaderConfig;
use crate::dom::{Dom, NodeId};
use crate::events::{EventKind, EventTarget, ListenerId, ListenerStore};
use crate::{Action, Result};

/// Keeps the header's "scrolled" class in sync with the window offset.
/// Pages without a hero section always show the scrolled style.
#[derive(Debug, Clone)]
pub struct HeaderScrollState {
    header: NodeId,
    has_hero: bool,
    threshold_px: f64,
    scrolled_class: String,
    listeners: Vec<ListenerId>,
}

impl HeaderScrollState {
    pub fn mount(
        dom: &mut Dom,
        header: Option<NodeId>,
        has_hero: bool,
        config: &HeaderConfig,
        listeners: &mut ListenerStore<Action>,
        scroll_y: f64,
    ) -> Result<Option<Self>> {
        let Some(header) = header else {
            return Ok(None);
        };

        let mut state = Self {
            header,
            has_hero,
            threshold_px: config.threshold_px,
            scrolled_class: config.scrolled_class.clone(),
            listeners: Vec::new(),
        };
        for event in [EventKind::Scroll, EventKind::Load] {
            state
                .listeners
                .push(listeners.add(EventTarget::Window, event, Action::HeaderRefresh));
        }

        // The page may load already scrolled, e.g. via an anchor.
        state.refresh(dom, scroll_y)?;
        Ok(Some(state))
    }

    pub fn header(&self) -> NodeId {
        self.header
    }

    pub fn has_hero(&self) -> bool {
        self.has_hero
    }

    pub fn should_be_scrolled(&self, scroll_y: f64) -> bool {
        !self.has_hero || scroll_y > self.threshold_px
    }

    /// Recomputes the class from scratch and returns whether it is now set.
    pub fn refresh(&self, dom: &mut Dom, scroll_y: f64) -> Result<bool> {
        let scrolled = self.should_be_scrolled(scroll_y);
        dom.class_set(self.header, &self.scrolled_class, scrolled)?;
        Ok(scrolled)
    }

    pub fn dispose(&mut self, listeners: &mut ListenerStore<Action>) {
        for id in self.listeners.drain(..) {
            listeners.remove(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::html::parse_html;

    fn mount(html: &str, scroll_y: f64) -> Result<(Dom, ListenerStore<Action>, Option<HeaderScrollState>)> {
        let mut dom = parse_html(html)?;
        let header = dom.query_selector(".site-header")?;
        let has_hero = dom.query_selector(".hero-section")?.is_some();
        let mut listeners = ListenerStore::default();
        let state = HeaderScrollState::mount(
            &mut dom,
            header,
            has_hero,
            &HeaderConfig::default(),
            &mut listeners,
            scroll_y,
        )?;
        Ok((dom, listeners, state))
    }

    #[test]
    fn static_page_is_scrolled_at_setup() -> Result<()> {
        let (dom, listeners, state) = mount(r#"<header class="site-header"></header>"#, 0.0)?;
        let state = state.expect("mounted");
        assert!(dom.class_contains(state.header(), "scrolled")?);
        assert_eq!(
            listeners.get(EventTarget::Window, EventKind::Scroll),
            vec![Action::HeaderRefresh]
        );
        assert_eq!(
            listeners.get(EventTarget::Window, EventKind::Load),
            vec![Action::HeaderRefresh]
        );
        Ok(())
    }

    #[test]
    fn hero_page_follows_threshold() -> Result<()> {
        let (mut dom, _, state) = mount(
            r#"<header class="site-header"></header><section class="hero-section"></section>"#,
            0.0,
        )?;
        let state = state.expect("mounted");
        assert!(!dom.class_contains(state.header(), "scrolled")?);

        assert!(!state.refresh(&mut dom, 40.0)?);
        assert!(state.refresh(&mut dom, 41.0)?);
        assert!(dom.class_contains(state.header(), "scrolled")?);
        assert!(state.refresh(&mut dom, 41.0)?);
        assert_eq!(dom.attr(state.header(), "class").as_deref(), Some("site-header scrolled"));
        assert!(!state.refresh(&mut dom, 0.0)?);
        assert!(!dom.class_contains(state.header(), "scrolled")?);
        Ok(())
    }

    #[test]
    fn setup_applies_initial_offset() -> Result<()> {
        let (dom, _, state) = mount(
            r#"<header class="site-header"></header><section class="hero-section"></section>"#,
            300.0,
        )?;
        assert!(dom.class_contains(state.expect("mounted").header(), "scrolled")?);
        Ok(())
    }

    #[test]
    fn missing_header_disables_feature() -> Result<()> {
        let (_, listeners, state) = mount(r#"<section class="hero-section"></section>"#, 0.0)?;
        assert!(state.is_none());
        assert!(listeners.is_empty());
        Ok(())
    }

    #[test]
    fn dispose_releases_window_listeners() -> Result<()> {
        let (_, mut listeners, state) = mount(r#"<header class="site-header"></header>"#, 0.0)?;
        state.expect("mounted").dispose(&mut listeners);
        assert!(listeners.is_empty());
        Ok(())
    }
}
