use crate::config::HeroConfig;
use crate::dom::{Dom, NodeId};
use crate::events::{EventKind, EventTarget, ListenerId, ListenerStore};
use crate::scheduler::{Scheduler, TimerId};
use crate::style::css_url;
use crate::{Action, Result, Task};

/// Rotating hero background with indicator dots.
///
/// The slider owns its auto-advance timer; clicking a dot shows that slide
/// and restarts the countdown from a full interval.
#[derive(Debug, Clone)]
pub struct HeroSlider {
    background: NodeId,
    dots: Vec<NodeId>,
    slides: Vec<String>,
    active_class: String,
    interval_ms: i64,
    current: usize,
    timer: Option<TimerId>,
    listeners: Vec<ListenerId>,
}

impl HeroSlider {
    /// Wires the slider when the background and at least one dot exist:
    /// shows slide 0 and starts auto-advance. Returns `None`, touching
    /// nothing, otherwise.
    pub fn mount<S>(
        dom: &mut Dom,
        background: Option<NodeId>,
        dots: Vec<NodeId>,
        config: &HeroConfig,
        listeners: &mut ListenerStore<Action>,
        scheduler: &mut S,
    ) -> Result<Option<Self>>
    where
        S: Scheduler<Task> + ?Sized,
    {
        let Some(background) = background else {
            return Ok(None);
        };
        if dots.is_empty() || config.slides.is_empty() {
            return Ok(None);
        }

        let mut slider = Self {
            background,
            dots,
            slides: config.slides.clone(),
            active_class: config.active_class.clone(),
            interval_ms: config.interval_ms,
            current: 0,
            timer: None,
            listeners: Vec::new(),
        };

        for (index, dot) in slider.dots.iter().enumerate() {
            let id = listeners.add(
                EventTarget::Node(*dot),
                EventKind::Click,
                Action::HeroDot { index },
            );
            slider.listeners.push(id);
        }

        slider.set_slide(dom, 0)?;
        slider.reset_timer(scheduler);
        Ok(Some(slider))
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    pub fn current_url(&self) -> &str {
        &self.slides[self.current]
    }

    pub fn timer(&self) -> Option<TimerId> {
        self.timer
    }

    pub fn background(&self) -> NodeId {
        self.background
    }

    pub fn dots(&self) -> &[NodeId] {
        &self.dots
    }

    /// Shows slide `index`. Out-of-range indices are ignored and reported as
    /// `false`.
    pub fn set_slide(&mut self, dom: &mut Dom, index: usize) -> Result<bool> {
        let Some(slide) = self.slides.get(index) else {
            return Ok(false);
        };

        self.current = index;
        dom.style_set(self.background, "background-image", &css_url(slide))?;
        for (i, dot) in self.dots.iter().enumerate() {
            dom.class_set(*dot, &self.active_class, i == index)?;
        }
        Ok(true)
    }

    pub fn next_slide(&mut self, dom: &mut Dom) -> Result<usize> {
        let next = (self.current + 1) % self.slides.len();
        self.set_slide(dom, next)?;
        Ok(self.current)
    }

    /// Cancels the live timer, if any, and arms a fresh interval.
    pub fn reset_timer<S>(&mut self, scheduler: &mut S) -> TimerId
    where
        S: Scheduler<Task> + ?Sized,
    {
        if let Some(previous) = self.timer.take() {
            scheduler.clear(previous);
        }
        let id = scheduler.set_interval(self.interval_ms, Task::HeroAdvance);
        self.timer = Some(id);
        id
    }

    pub fn on_dot_click<S>(&mut self, dom: &mut Dom, scheduler: &mut S, index: usize) -> Result<()>
    where
        S: Scheduler<Task> + ?Sized,
    {
        self.set_slide(dom, index)?;
        self.reset_timer(scheduler);
        Ok(())
    }

    pub fn dispose<S>(&mut self, listeners: &mut ListenerStore<Action>, scheduler: &mut S)
    where
        S: Scheduler<Task> + ?Sized,
    {
        if let Some(timer) = self.timer.take() {
            scheduler.clear(timer);
        }
        for id in self.listeners.drain(..) {
            listeners.remove(id);
        }
    }
}
