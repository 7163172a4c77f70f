use crate::config::{CarouselConfig, Selectors};
use crate::dom::{Dom, NodeId, ScrollBehavior};
use crate::events::{EventKind, EventTarget, ListenerId, ListenerStore};
use crate::scheduler::{Scheduler, TimerId};
use crate::{Action, Result, Task};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollDirection {
    Prev,
    Next,
}

impl ScrollDirection {
    fn sign(self) -> f64 {
        match self {
            Self::Prev => -1.0,
            Self::Next => 1.0,
        }
    }
}

/// One "you may also like" strip: a horizontally scrolling track with
/// arrows and an auto-advance that pauses while the pointer is inside.
///
/// Auto-advance only ever moves forward; once the track reaches its end the
/// clamped scroll keeps it there.
#[derive(Debug, Clone)]
pub struct RelatedCarousel {
    index: usize,
    root: NodeId,
    track: NodeId,
    prev: NodeId,
    next: NodeId,
    interval_ms: i64,
    step_ratio: f64,
    timer: Option<TimerId>,
    listeners: Vec<ListenerId>,
}

impl RelatedCarousel {
    /// Wires the instance rooted at `root`. Instances missing the track or
    /// either arrow are skipped: `Ok(None)`, nothing registered.
    pub fn mount<S>(
        dom: &Dom,
        index: usize,
        root: NodeId,
        selectors: &Selectors,
        config: &CarouselConfig,
        listeners: &mut ListenerStore<Action>,
        scheduler: &mut S,
    ) -> Result<Option<Self>>
    where
        S: Scheduler<Task> + ?Sized,
    {
        let track = dom.query_selector_from(root, &selectors.carousel_track)?;
        let prev = dom.query_selector_from(root, &selectors.carousel_prev)?;
        let next = dom.query_selector_from(root, &selectors.carousel_next)?;
        let (Some(track), Some(prev), Some(next)) = (track, prev, next) else {
            return Ok(None);
        };

        let mut carousel = Self {
            index,
            root,
            track,
            prev,
            next,
            interval_ms: config.interval_ms,
            step_ratio: config.step_ratio,
            timer: None,
            listeners: Vec::new(),
        };

        let wiring = [
            (
                prev,
                EventKind::Click,
                Action::CarouselScroll {
                    carousel: index,
                    direction: ScrollDirection::Prev,
                },
            ),
            (
                next,
                EventKind::Click,
                Action::CarouselScroll {
                    carousel: index,
                    direction: ScrollDirection::Next,
                },
            ),
            (
                root,
                EventKind::MouseEnter,
                Action::CarouselPause { carousel: index },
            ),
            (
                root,
                EventKind::MouseLeave,
                Action::CarouselResume { carousel: index },
            ),
        ];
        for (node, event, action) in wiring {
            carousel
                .listeners
                .push(listeners.add(EventTarget::Node(node), event, action));
        }

        carousel.arm(scheduler);
        Ok(Some(carousel))
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn track(&self) -> NodeId {
        self.track
    }

    pub fn arrows(&self) -> (NodeId, NodeId) {
        (self.prev, self.next)
    }

    pub fn timer(&self) -> Option<TimerId> {
        self.timer
    }

    pub fn is_armed(&self) -> bool {
        self.timer.is_some()
    }

    /// Step size from the track's width right now, so resizes between
    /// actions are honored.
    pub fn step(&self, dom: &Dom) -> Result<f64> {
        Ok(dom.client_width(self.track)? * self.step_ratio)
    }

    /// Smoothly scrolls one step and returns the new offset.
    pub fn scroll(&self, dom: &mut Dom, direction: ScrollDirection) -> Result<f64> {
        let step = self.step(dom)?;
        dom.scroll_by(self.track, direction.sign() * step, ScrollBehavior::Smooth)
    }

    /// Arms a fresh auto-advance interval, canceling any live one first.
    pub fn arm<S>(&mut self, scheduler: &mut S) -> TimerId
    where
        S: Scheduler<Task> + ?Sized,
    {
        self.pause(scheduler);
        let id = scheduler.set_interval(
            self.interval_ms,
            Task::CarouselAdvance {
                carousel: self.index,
            },
        );
        self.timer = Some(id);
        id
    }

    /// Cancels auto-advance. Returns whether a timer was live.
    pub fn pause<S>(&mut self, scheduler: &mut S) -> bool
    where
        S: Scheduler<Task> + ?Sized,
    {
        match self.timer.take() {
            Some(timer) => {
                scheduler.clear(timer);
                true
            }
            None => false,
        }
    }

    pub fn dispose<S>(&mut self, listeners: &mut ListenerStore<Action>, scheduler: &mut S)
    where
        S: Scheduler<Task> + ?Sized,
    {
        self.pause(scheduler);
        for id in self.listeners.drain(..) {
            listeners.remove(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::html::parse_html;
    use crate::scheduler::TimerQueue;

    const SLIDER_HTML: &str = r#"
        <div class="product-related-slider" id="s">
          <button class="product-related-arrow-left">&lt;</button>
          <div class="product-related-track" id="t"></div>
          <button class="product-related-arrow-right">&gt;</button>
        </div>
    "#;

    fn mount(html: &str) -> Result<(Dom, ListenerStore<Action>, TimerQueue<Task>, Option<RelatedCarousel>)> {
        let dom = parse_html(html)?;
        let root = dom
            .query_selector(".product-related-slider")?
            .expect("slider root");
        let mut listeners = ListenerStore::default();
        let mut timers = TimerQueue::new();
        let carousel = RelatedCarousel::mount(
            &dom,
            0,
            root,
            &Selectors::default(),
            &CarouselConfig::default(),
            &mut listeners,
            &mut timers,
        )?;
        Ok((dom, listeners, timers, carousel))
    }

    #[test]
    fn mount_wires_arrows_hover_and_timer() -> Result<()> {
        let (_, listeners, timers, carousel) = mount(SLIDER_HTML)?;
        let carousel = carousel.expect("mounted");
        let (prev, next) = carousel.arrows();

        assert_eq!(
            listeners.get(EventTarget::Node(next), EventKind::Click),
            vec![Action::CarouselScroll {
                carousel: 0,
                direction: ScrollDirection::Next
            }]
        );
        assert_eq!(listeners.count(EventTarget::Node(prev)), 1);
        assert_eq!(listeners.count(EventTarget::Node(carousel.root())), 2);

        let pending = timers.pending();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].due_at, 8000);
        assert_eq!(pending[0].task, Task::CarouselAdvance { carousel: 0 });
        Ok(())
    }

    #[test]
    fn step_tracks_current_width() -> Result<()> {
        let (mut dom, _, _, carousel) = mount(SLIDER_HTML)?;
        let carousel = carousel.expect("mounted");
        dom.set_layout(carousel.track(), 500.0, 3000.0)?;
        assert_eq!(carousel.scroll(&mut dom, ScrollDirection::Next)?, 400.0);

        dom.set_layout(carousel.track(), 1000.0, 3000.0)?;
        assert_eq!(carousel.scroll(&mut dom, ScrollDirection::Next)?, 1200.0);
        assert_eq!(carousel.scroll(&mut dom, ScrollDirection::Prev)?, 400.0);
        assert!(
            dom.scroll_log()
                .iter()
                .all(|record| record.behavior == ScrollBehavior::Smooth)
        );
        Ok(())
    }

    #[test]
    fn forward_scroll_stops_at_the_end() -> Result<()> {
        let (mut dom, _, _, carousel) = mount(SLIDER_HTML)?;
        let carousel = carousel.expect("mounted");
        dom.set_layout(carousel.track(), 500.0, 1000.0)?;
        assert_eq!(carousel.scroll(&mut dom, ScrollDirection::Next)?, 400.0);
        assert_eq!(carousel.scroll(&mut dom, ScrollDirection::Next)?, 500.0);
        assert_eq!(carousel.scroll(&mut dom, ScrollDirection::Next)?, 500.0);
        Ok(())
    }

    #[test]
    fn arm_never_leaves_two_live_timers() -> Result<()> {
        let (_, _, mut timers, carousel) = mount(SLIDER_HTML)?;
        let mut carousel = carousel.expect("mounted");
        carousel.arm(&mut timers);
        carousel.arm(&mut timers);
        assert_eq!(timers.len(), 1);

        assert!(carousel.pause(&mut timers));
        assert!(!carousel.pause(&mut timers));
        assert!(timers.is_empty());
        assert!(!carousel.is_armed());
        Ok(())
    }

    #[test]
    fn incomplete_instances_are_skipped() -> Result<()> {
        let variants = [
            r#"<div class="product-related-slider">
                 <button class="product-related-arrow-left"></button>
                 <button class="product-related-arrow-right"></button>
               </div>"#,
            r#"<div class="product-related-slider">
                 <div class="product-related-track"></div>
                 <button class="product-related-arrow-right"></button>
               </div>"#,
            r#"<div class="product-related-slider">
                 <button class="product-related-arrow-left"></button>
                 <div class="product-related-track"></div>
               </div>"#,
        ];
        for html in variants {
            let (_, listeners, timers, carousel) = mount(html)?;
            assert!(carousel.is_none());
            assert!(listeners.is_empty());
            assert!(timers.is_empty());
        }
        Ok(())
    }

    #[test]
    fn dispose_releases_everything() -> Result<()> {
        let (_, mut listeners, mut timers, carousel) = mount(SLIDER_HTML)?;
        let mut carousel = carousel.expect("mounted");
        carousel.dispose(&mut listeners, &mut timers);
        assert!(listeners.is_empty());
        assert!(timers.is_empty());
        Ok(())
    }
}
