use std::collections::VecDeque;

use crate::alerts::AlertAutoDismiss;
use crate::carousel::{RelatedCarousel, ScrollDirection};
use crate::config::EnhanceConfig;
use crate::dismiss::{BootstrapAlert, Dismissible};
use crate::dom::{Dom, NodeId, ScrollRecord, truncate_chars};
use crate::events::{EventKind, EventTarget, ListenerStore};
use crate::header::HeaderScrollState;
use crate::hero::HeroSlider;
use crate::html::parse_html;
use crate::scheduler::{PendingTimer, Scheduler, TimerQueue};
use crate::style;
use crate::{Action, Error, Result, Task};

/// Which features `Page::enhance` found on the page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnhanceReport {
    pub hero: bool,
    pub header: bool,
    pub carousels: usize,
    pub skipped_carousels: usize,
    pub alerts: usize,
}

/// A parsed page with the storefront behaviors attached.
///
/// `Page` plays the browser: it owns the DOM, the virtual clock, the window
/// scroll offset and the pointer, dispatches simulated input to the mounted
/// components and runs their timers.
pub struct Page {
    dom: Dom,
    config: EnhanceConfig,
    listeners: ListenerStore<Action>,
    timers: TimerQueue<Task>,
    dismisser: Box<dyn Dismissible>,
    scroll_y: f64,
    // Elements under the pointer, outermost first.
    hovered: Vec<NodeId>,
    hero: Option<HeroSlider>,
    header: Option<HeaderScrollState>,
    carousels: Vec<RelatedCarousel>,
    alerts: Option<AlertAutoDismiss>,
    enhanced: bool,
    trace: bool,
    trace_events: bool,
    trace_timers: bool,
    trace_logs: VecDeque<String>,
    trace_log_limit: usize,
}

impl Page {
    pub fn from_html(html: &str) -> Result<Self> {
        let dom = parse_html(html)?;
        Ok(Self {
            dom,
            config: EnhanceConfig::default(),
            listeners: ListenerStore::default(),
            timers: TimerQueue::new(),
            dismisser: Box::new(BootstrapAlert),
            scroll_y: 0.0,
            hovered: Vec::new(),
            hero: None,
            header: None,
            carousels: Vec::new(),
            alerts: None,
            enhanced: false,
            trace: false,
            trace_events: true,
            trace_timers: true,
            trace_logs: VecDeque::new(),
            trace_log_limit: 10_000,
        })
    }

    /// Replaces the configuration. Takes effect at the next `enhance`.
    pub fn with_config(mut self, config: EnhanceConfig) -> Result<Self> {
        config.validate()?;
        self.config = config;
        Ok(self)
    }

    pub fn with_dismisser<D>(mut self, dismisser: D) -> Self
    where
        D: Dismissible + 'static,
    {
        self.dismisser = Box::new(dismisser);
        self
    }

    pub fn config(&self) -> &EnhanceConfig {
        &self.config
    }

    pub fn dom(&self) -> &Dom {
        &self.dom
    }

    pub fn hero(&self) -> Option<&HeroSlider> {
        self.hero.as_ref()
    }

    pub fn header(&self) -> Option<&HeaderScrollState> {
        self.header.as_ref()
    }

    pub fn carousels(&self) -> &[RelatedCarousel] {
        &self.carousels
    }

    pub fn alerts(&self) -> Option<&AlertAutoDismiss> {
        self.alerts.as_ref()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// The page-ready hook: wires every feature whose elements are present.
    /// Calling it again tears down the previous wiring first.
    pub fn enhance(&mut self) -> Result<EnhanceReport> {
        if self.enhanced {
            self.dispose();
        }
        let config = self.config.clone();
        let selectors = &config.selectors;

        let background = self.dom.query_selector(&selectors.hero_background)?;
        let dots = self.dom.query_selector_all(&selectors.hero_dot)?;
        self.hero = HeroSlider::mount(
            &mut self.dom,
            background,
            dots,
            &config.hero,
            &mut self.listeners,
            &mut self.timers,
        )?;

        let header = self.dom.query_selector(&selectors.header)?;
        let has_hero = self.dom.query_selector(&selectors.hero_section)?.is_some();
        self.header = HeaderScrollState::mount(
            &mut self.dom,
            header,
            has_hero,
            &config.header,
            &mut self.listeners,
            self.scroll_y,
        )?;

        let roots = self.dom.query_selector_all(&selectors.carousel)?;
        let mut skipped_carousels = 0;
        for root in roots {
            let index = self.carousels.len();
            match RelatedCarousel::mount(
                &self.dom,
                index,
                root,
                selectors,
                &config.carousel,
                &mut self.listeners,
                &mut self.timers,
            )? {
                Some(carousel) => self.carousels.push(carousel),
                None => skipped_carousels += 1,
            }
        }

        let alerts = self.dom.query_selector_all(&selectors.auto_dismiss_alert)?;
        self.alerts = AlertAutoDismiss::mount(&alerts, &config.alerts, &mut self.timers);

        self.enhanced = true;
        let report = EnhanceReport {
            hero: self.hero.is_some(),
            header: self.header.is_some(),
            carousels: self.carousels.len(),
            skipped_carousels,
            alerts: alerts.len(),
        };
        log::info!(
            "page enhancements initialized: hero={} header={} carousels={} skipped_carousels={} alerts={}",
            report.hero,
            report.header,
            report.carousels,
            report.skipped_carousels,
            report.alerts
        );
        self.trace_line(format!("[page] enhance {report:?}"));
        Ok(report)
    }

    /// Cancels every timer and releases every listener the features own.
    /// DOM state is left as it is.
    pub fn dispose(&mut self) {
        if let Some(mut hero) = self.hero.take() {
            hero.dispose(&mut self.listeners, &mut self.timers);
        }
        if let Some(mut header) = self.header.take() {
            header.dispose(&mut self.listeners);
        }
        for mut carousel in self.carousels.drain(..) {
            carousel.dispose(&mut self.listeners, &mut self.timers);
        }
        if let Some(mut alerts) = self.alerts.take() {
            alerts.dispose(&mut self.timers);
        }
        self.enhanced = false;
        self.trace_line("[page] dispose".into());
    }

    pub fn click(&mut self, selector: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        self.dispatch(EventTarget::Node(target), EventKind::Click)?;
        Ok(())
    }

    /// Moves the pointer onto the element, firing `mouseleave` on elements
    /// it exits (innermost first) and `mouseenter` on elements it enters
    /// (outermost first).
    pub fn pointer_enter(&mut self, selector: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        let chain = self.hover_chain(target);
        self.move_pointer(chain)
    }

    /// Moves the pointer out of the element onto its parent. Does nothing
    /// when the pointer is not over the element.
    pub fn pointer_leave(&mut self, selector: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        let Some(pos) = self.hovered.iter().position(|node| *node == target) else {
            return Ok(());
        };
        let chain = self.hovered[..pos].to_vec();
        self.move_pointer(chain)
    }

    /// Moves the pointer off the page entirely.
    pub fn pointer_exit_page(&mut self) -> Result<()> {
        self.move_pointer(Vec::new())
    }

    pub fn hovered(&self) -> &[NodeId] {
        &self.hovered
    }

    pub fn scroll_y(&self) -> f64 {
        self.scroll_y
    }

    /// Sets the window's vertical offset and fires `scroll`. Negative
    /// offsets clamp to the top.
    pub fn scroll_window_to(&mut self, y: f64) -> Result<()> {
        if y.is_nan() {
            return Err(Error::Dom("scroll offset must be a number".into()));
        }
        self.scroll_y = y.max(0.0);
        self.dispatch(EventTarget::Window, EventKind::Scroll)?;
        Ok(())
    }

    pub fn fire_load(&mut self) -> Result<()> {
        self.dispatch(EventTarget::Window, EventKind::Load)?;
        Ok(())
    }

    pub fn set_layout(&mut self, selector: &str, client_width: f64, scroll_width: f64) -> Result<()> {
        let target = self.select_one(selector)?;
        self.dom.set_layout(target, client_width, scroll_width)
    }

    pub fn scroll_left(&self, selector: &str) -> Result<f64> {
        let target = self.select_one(selector)?;
        self.dom.scroll_left(target)
    }

    pub fn scroll_log(&self) -> &[ScrollRecord] {
        self.dom.scroll_log()
    }

    pub fn take_scroll_log(&mut self) -> Vec<ScrollRecord> {
        self.dom.take_scroll_log()
    }

    pub fn set_scroll_log_limit(&mut self, max_entries: usize) -> Result<()> {
        self.dom.set_scroll_log_limit(max_entries)
    }

    pub fn now_ms(&self) -> i64 {
        self.timers.now_ms()
    }

    pub fn pending_timers(&self) -> Vec<PendingTimer<Task>> {
        self.timers.pending()
    }

    pub fn clear_all_timers(&mut self) -> usize {
        let cleared = self.timers.clear_all();
        self.trace_timer_line(format!("[timer] clear_all cleared={cleared}"));
        cleared
    }

    pub fn set_timer_step_limit(&mut self, max_steps: usize) -> Result<()> {
        self.timers.set_step_limit(max_steps)
    }

    pub fn advance_time(&mut self, delta_ms: i64) -> Result<()> {
        if delta_ms < 0 {
            return Err(Error::Timer(
                "advance_time requires non-negative milliseconds".into(),
            ));
        }
        let from = self.now_ms();
        self.advance_clock(from.saturating_add(delta_ms))
    }

    pub fn advance_time_to(&mut self, target_ms: i64) -> Result<()> {
        let now = self.now_ms();
        if target_ms < now {
            return Err(Error::Timer(format!(
                "advance_time_to requires target >= now_ms (target={target_ms}, now_ms={now})"
            )));
        }
        self.advance_clock(target_ms)
    }

    fn advance_clock(&mut self, target_ms: i64) -> Result<()> {
        let from = self.now_ms();
        let ran = self.run_timer_queue(Some(target_ms))?;
        self.timers.set_now(target_ms);
        self.trace_timer_line(format!(
            "[timer] advance from={from} to={target_ms} ran_due={ran}"
        ));
        Ok(())
    }

    /// Runs the earliest timer, jumping the clock to it if needed.
    pub fn run_next_timer(&mut self) -> Result<bool> {
        if !self.timers.has_due(None) {
            self.trace_timer_line("[timer] run_next none".into());
            return Ok(false);
        }
        self.run_one_timer(None)?;
        Ok(true)
    }

    /// Runs every timer already due without moving the clock.
    pub fn run_due_timers(&mut self) -> Result<usize> {
        let ran = self.run_timer_queue(Some(self.now_ms()))?;
        self.trace_timer_line(format!(
            "[timer] run_due now_ms={} ran={ran}",
            self.now_ms()
        ));
        Ok(ran)
    }

    fn run_timer_queue(&mut self, due_limit: Option<i64>) -> Result<usize> {
        let mut steps = 0usize;
        while self.timers.has_due(due_limit) {
            steps += 1;
            if steps > self.timers.step_limit() {
                return Err(self.timers.step_limit_error(steps, due_limit));
            }
            self.run_one_timer(due_limit)?;
        }
        Ok(steps)
    }

    fn run_one_timer(&mut self, due_limit: Option<i64>) -> Result<()> {
        let Some(fired) = self.timers.pop_next(due_limit) else {
            return Ok(());
        };
        let interval_desc = fired
            .interval_ms
            .map(|value| value.to_string())
            .unwrap_or_else(|| "none".into());
        self.trace_timer_line(format!(
            "[timer] run id={} due_at={} interval_ms={} task={:?}",
            fired.id, fired.due_at, interval_desc, fired.task
        ));

        let result = self.run_task(fired.task);
        let id = fired.id;
        if let Some(due_at) = self.timers.finish(fired) {
            self.trace_timer_line(format!("[timer] requeue id={id} due_at={due_at}"));
        }
        result
    }

    fn run_task(&mut self, task: Task) -> Result<()> {
        match task {
            Task::HeroAdvance => {
                if let Some(hero) = self.hero.as_mut() {
                    hero.next_slide(&mut self.dom)?;
                }
            }
            Task::CarouselAdvance { carousel } => {
                if let Some(carousel) = self.carousels.get(carousel) {
                    carousel.scroll(&mut self.dom, ScrollDirection::Next)?;
                }
            }
            Task::DismissAlert { alert } => {
                if let Some(alerts) = self.alerts.as_mut() {
                    if alerts.dismiss(&mut self.dom, self.dismisser.as_mut(), alert)? {
                        let label = self.trace_node_label(alert);
                        self.trace_line(format!("[alert] closed {label}"));
                    }
                }
            }
        }
        Ok(())
    }

    fn run_action(&mut self, action: Action) -> Result<()> {
        match action {
            Action::HeroDot { index } => {
                if let Some(hero) = self.hero.as_mut() {
                    hero.on_dot_click(&mut self.dom, &mut self.timers, index)?;
                }
            }
            Action::HeaderRefresh => {
                if let Some(header) = self.header.as_ref() {
                    header.refresh(&mut self.dom, self.scroll_y)?;
                }
            }
            Action::CarouselScroll {
                carousel,
                direction,
            } => {
                if let Some(carousel) = self.carousels.get(carousel) {
                    carousel.scroll(&mut self.dom, direction)?;
                }
            }
            Action::CarouselPause { carousel } => {
                if let Some(carousel) = self.carousels.get_mut(carousel) {
                    carousel.pause(&mut self.timers);
                }
            }
            Action::CarouselResume { carousel } => {
                if let Some(carousel) = self.carousels.get_mut(carousel) {
                    carousel.arm(&mut self.timers);
                }
            }
        }
        Ok(())
    }

    fn dispatch(&mut self, target: EventTarget, event: EventKind) -> Result<usize> {
        let path = match target {
            EventTarget::Window => vec![EventTarget::Window],
            EventTarget::Node(node) if event.bubbles() => std::iter::once(node)
                .chain(self.dom.ancestors(node))
                .map(EventTarget::Node)
                .collect(),
            EventTarget::Node(node) => vec![EventTarget::Node(node)],
        };

        let mut invoked = 0usize;
        for current in path {
            for action in self.listeners.get(current, event) {
                if self.trace && self.trace_events {
                    let target_label = self.target_label(target);
                    let current_label = self.target_label(current);
                    self.trace_event_line(format!(
                        "[event] {event} target={target_label} current={current_label} action={action:?}"
                    ));
                }
                self.run_action(action)?;
                invoked += 1;
            }
        }

        if self.trace && self.trace_events {
            let target_label = self.target_label(target);
            self.trace_event_line(format!(
                "[event] done {event} target={target_label} listeners={invoked}"
            ));
        }
        Ok(invoked)
    }

    fn hover_chain(&self, target: NodeId) -> Vec<NodeId> {
        let mut chain = self
            .dom
            .ancestors(target)
            .into_iter()
            .filter(|node| self.dom.tag_name(*node).is_some())
            .collect::<Vec<_>>();
        chain.reverse();
        chain.push(target);
        chain
    }

    fn move_pointer(&mut self, chain: Vec<NodeId>) -> Result<()> {
        let shared = self
            .hovered
            .iter()
            .zip(&chain)
            .take_while(|(old, new)| old == new)
            .count();
        let left = self.hovered[shared..].to_vec();
        let entered = chain[shared..].to_vec();
        self.hovered = chain;

        for node in left.into_iter().rev() {
            self.dispatch(EventTarget::Node(node), EventKind::MouseLeave)?;
        }
        for node in entered {
            self.dispatch(EventTarget::Node(node), EventKind::MouseEnter)?;
        }
        Ok(())
    }

    pub fn exists(&self, selector: &str) -> Result<bool> {
        Ok(self.dom.query_selector(selector)?.is_some())
    }

    pub fn has_class(&self, selector: &str, class_name: &str) -> Result<bool> {
        let target = self.select_one(selector)?;
        self.dom.class_contains(target, class_name)
    }

    /// The path of the element's inline `background-image: url(...)`.
    pub fn background_image_url(&self, selector: &str) -> Result<Option<String>> {
        let target = self.select_one(selector)?;
        let value = self.dom.style_get(target, "background-image")?;
        style::background_image_url(&value)
    }

    pub fn assert_exists(&self, selector: &str) -> Result<()> {
        let _ = self.select_one(selector)?;
        Ok(())
    }

    pub fn assert_absent(&self, selector: &str) -> Result<()> {
        if let Some(found) = self.dom.query_selector(selector)? {
            return Err(Error::AssertionFailed {
                selector: selector.to_string(),
                expected: "no match".into(),
                actual: "matched".into(),
                dom_snippet: self.node_snippet(found),
            });
        }
        Ok(())
    }

    pub fn assert_class(&self, selector: &str, class_name: &str, expected: bool) -> Result<()> {
        let target = self.select_one(selector)?;
        let actual = self.dom.class_contains(target, class_name)?;
        if actual != expected {
            let describe = |present: bool| {
                if present {
                    format!("class {class_name:?} present")
                } else {
                    format!("class {class_name:?} absent")
                }
            };
            return Err(Error::AssertionFailed {
                selector: selector.to_string(),
                expected: describe(expected),
                actual: describe(actual),
                dom_snippet: self.node_snippet(target),
            });
        }
        Ok(())
    }

    pub fn assert_background_image(&self, selector: &str, expected: &str) -> Result<()> {
        let actual = self.background_image_url(selector)?;
        if actual.as_deref() != Some(expected) {
            let target = self.select_one(selector)?;
            return Err(Error::AssertionFailed {
                selector: selector.to_string(),
                expected: expected.to_string(),
                actual: actual.unwrap_or_else(|| "none".into()),
                dom_snippet: self.node_snippet(target),
            });
        }
        Ok(())
    }

    pub fn dump_dom(&self, selector: &str) -> Result<String> {
        let target = self.select_one(selector)?;
        Ok(self.dom.dump_node(target))
    }

    pub fn enable_trace(&mut self, enabled: bool) {
        self.trace = enabled;
    }

    pub fn take_trace_logs(&mut self) -> Vec<String> {
        std::mem::take(&mut self.trace_logs).into()
    }

    pub fn set_trace_events(&mut self, enabled: bool) {
        self.trace_events = enabled;
    }

    pub fn set_trace_timers(&mut self, enabled: bool) {
        self.trace_timers = enabled;
    }

    pub fn set_trace_log_limit(&mut self, max_entries: usize) -> Result<()> {
        if max_entries == 0 {
            return Err(Error::InvalidConfig(
                "set_trace_log_limit requires at least 1 entry".into(),
            ));
        }
        self.trace_log_limit = max_entries;
        while self.trace_logs.len() > self.trace_log_limit {
            self.trace_logs.pop_front();
        }
        Ok(())
    }

    fn select_one(&self, selector: &str) -> Result<NodeId> {
        self.dom
            .query_selector(selector)?
            .ok_or_else(|| Error::SelectorNotFound(selector.to_string()))
    }

    fn node_snippet(&self, node_id: NodeId) -> String {
        truncate_chars(&self.dom.dump_node(node_id), 200)
    }

    fn target_label(&self, target: EventTarget) -> String {
        match target {
            EventTarget::Window => "window".into(),
            EventTarget::Node(node) => self.trace_node_label(node),
        }
    }

    fn trace_node_label(&self, node: NodeId) -> String {
        if let Some(id) = self.dom.attr(node, "id") {
            if !id.is_empty() {
                return format!("#{id}");
            }
        }
        let Some(tag) = self.dom.tag_name(node) else {
            return "document".into();
        };
        match self.dom.attr(node, "class") {
            Some(classes) if !classes.trim().is_empty() => {
                format!("{tag}.{}", classes.split_whitespace().collect::<Vec<_>>().join("."))
            }
            _ => tag.to_string(),
        }
    }

    fn trace_event_line(&mut self, line: String) {
        if self.trace && self.trace_events {
            self.trace_line(line);
        }
    }

    fn trace_timer_line(&mut self, line: String) {
        if self.trace && self.trace_timers {
            self.trace_line(line);
        }
    }

    fn trace_line(&mut self, line: String) {
        if self.trace {
            log::debug!("{line}");
            if self.trace_logs.len() >= self.trace_log_limit {
                self.trace_logs.pop_front();
            }
            self.trace_logs.push_back(line);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pointer_moves_fire_enter_and_leave_on_the_changed_part_of_the_chain() -> Result<()> {
        let mut page = Page::from_html(
            r#"
            <div class="product-related-slider" id="s">
              <button class="product-related-arrow-left" id="l"></button>
              <div class="product-related-track" id="t"></div>
              <button class="product-related-arrow-right" id="r"></button>
            </div>
            <footer id="f"></footer>
            "#,
        )?;
        page.enhance()?;
        let slider = page.dom().by_id("s").expect("slider");
        let left = page.dom().by_id("l").expect("left");
        let footer = page.dom().by_id("f").expect("footer");

        page.pointer_enter("#l")?;
        assert_eq!(page.hovered(), &[slider, left]);
        assert!(!page.carousels()[0].is_armed());

        // Moving between children stays inside the slider.
        page.pointer_enter("#r")?;
        assert!(!page.carousels()[0].is_armed());

        page.pointer_enter("#f")?;
        assert_eq!(page.hovered(), &[footer]);
        assert!(page.carousels()[0].is_armed());
        Ok(())
    }

    #[test]
    fn pointer_leave_only_applies_to_hovered_elements() -> Result<()> {
        let mut page = Page::from_html(r#"<div id="a"><span id="b"></span></div>"#)?;
        let a = page.dom().by_id("a").expect("a");
        page.pointer_leave("#a")?;
        assert!(page.hovered().is_empty());

        page.pointer_enter("#b")?;
        page.pointer_leave("#b")?;
        assert_eq!(page.hovered(), &[a]);
        page.pointer_exit_page()?;
        assert!(page.hovered().is_empty());
        Ok(())
    }

    #[test]
    fn trace_records_events_and_timers_within_limit() -> Result<()> {
        let mut page = Page::from_html(
            r#"<div class="hero-bg"></div><button class="hero-dot" id="d0"></button>"#,
        )?;
        page.enable_trace(true);
        page.enhance()?;
        page.click("#d0")?;
        page.advance_time(7000)?;

        let logs = page.take_trace_logs();
        assert!(logs.iter().any(|line| line.starts_with("[page] enhance")));
        assert!(
            logs.iter()
                .any(|line| line.starts_with("[event] click target=#d0"))
        );
        assert!(
            logs.iter()
                .any(|line| line.contains("[timer] run") && line.contains("HeroAdvance"))
        );
        assert!(page.take_trace_logs().is_empty());

        page.set_trace_timers(false);
        page.set_trace_log_limit(1)?;
        page.click("#d0")?;
        page.advance_time(7000)?;
        let logs = page.take_trace_logs();
        assert_eq!(logs.len(), 1);
        assert!(logs[0].starts_with("[event] done click"));
        assert!(page.set_trace_log_limit(0).is_err());
        Ok(())
    }

    #[test]
    fn trace_node_label_prefers_id_then_classes() -> Result<()> {
        let page = Page::from_html(r#"<p id="x"></p><div class="a  b"></div><span></span>"#)?;
        let dom = page.dom();
        let p = dom.by_id("x").expect("p");
        let div = dom.query_selector("div")?.expect("div");
        let span = dom.query_selector("span")?.expect("span");
        assert_eq!(page.trace_node_label(p), "#x");
        assert_eq!(page.trace_node_label(div), "div.a.b");
        assert_eq!(page.trace_node_label(span), "span");
        assert_eq!(page.trace_node_label(dom.root()), "document");
        Ok(())
    }
}
