//! Storefront page enhancements over a deterministic page model.
//!
//! The crate wires four independent behaviors into a parsed page:
//! a rotating hero background, a header scroll state, related-product
//! carousels and auto-dismissing alerts. Timers run on a virtual clock and
//! user input is simulated through [`Page`], so every behavior can be driven
//! and asserted without a browser.
//!
//! ```no_run
//! use fotolio_enhance::{Page, Result};
//!
//! fn run() -> Result<()> {
//!     let mut page = Page::from_html(r#"<div class="hero-bg"></div><button class="hero-dot"></button>"#)?;
//!     page.enhance()?;
//!     page.advance_time(7000)?;
//!     Ok(())
//! }
//! ```

mod alerts;
mod carousel;
mod config;
mod dismiss;
mod dom;
mod events;
mod header;
mod hero;
mod html;
mod page;
mod scheduler;
mod selector;
mod style;

pub use alerts::AlertAutoDismiss;
pub use carousel::{RelatedCarousel, ScrollDirection};
pub use config::{AlertConfig, CarouselConfig, EnhanceConfig, HeaderConfig, HeroConfig, Selectors};
pub use dismiss::{BootstrapAlert, Dismissible};
pub use dom::{Dom, NodeId, ScrollBehavior, ScrollRecord};
pub use events::{EventKind, EventTarget, ListenerId, ListenerStore};
pub use header::HeaderScrollState;
pub use hero::HeroSlider;
pub use html::parse_html;
pub use page::{EnhanceReport, Page};
pub use scheduler::{FiredTimer, PendingTimer, Scheduler, TimerId, TimerQueue};
pub use style::{background_image_url, css_url};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("html parse error: {0}")]
    HtmlParse(String),
    #[error("selector not found: {0}")]
    SelectorNotFound(String),
    #[error("unsupported selector: {0}")]
    UnsupportedSelector(String),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("dom error: {0}")]
    Dom(String),
    #[error("timer error: {0}")]
    Timer(String),
    #[error("assertion failed for {selector}: expected {expected}, actual {actual}, snippet {dom_snippet}")]
    AssertionFailed {
        selector: String,
        expected: String,
        actual: String,
        dom_snippet: String,
    },
}

/// Work the timer queue hands back to the page when a timer fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    HeroAdvance,
    CarouselAdvance { carousel: usize },
    DismissAlert { alert: NodeId },
}

/// What a registered listener does when its event reaches it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    HeroDot { index: usize },
    HeaderRefresh,
    CarouselScroll {
        carousel: usize,
        direction: ScrollDirection,
    },
    CarouselPause { carousel: usize },
    CarouselResume { carousel: usize },
}
