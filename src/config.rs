use crate::{Error, Result};

/// Marker classes the host page carries for each feature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selectors {
    pub hero_background: String,
    pub hero_dot: String,
    pub hero_section: String,
    pub header: String,
    pub carousel: String,
    pub carousel_track: String,
    pub carousel_prev: String,
    pub carousel_next: String,
    pub auto_dismiss_alert: String,
}

impl Default for Selectors {
    fn default() -> Self {
        Self {
            hero_background: ".hero-bg".into(),
            hero_dot: ".hero-dot".into(),
            hero_section: ".hero-section".into(),
            header: ".site-header".into(),
            carousel: ".product-related-slider".into(),
            carousel_track: ".product-related-track".into(),
            carousel_prev: ".product-related-arrow-left".into(),
            carousel_next: ".product-related-arrow-right".into(),
            auto_dismiss_alert: ".auto-dismiss-alert".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeroConfig {
    pub slides: Vec<String>,
    pub interval_ms: i64,
    pub active_class: String,
}

impl Default for HeroConfig {
    fn default() -> Self {
        Self {
            slides: vec![
                "/static/img/hero/hero-1.webp".into(),
                "/static/img/hero/hero-2.webp".into(),
                "/static/img/hero/hero-3.webp".into(),
            ],
            interval_ms: 7000,
            active_class: "active".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeaderConfig {
    /// The header turns "scrolled" strictly above this offset.
    pub threshold_px: f64,
    pub scrolled_class: String,
}

impl Default for HeaderConfig {
    fn default() -> Self {
        Self {
            threshold_px: 40.0,
            scrolled_class: "scrolled".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CarouselConfig {
    pub interval_ms: i64,
    /// Fraction of the track's visible width moved per step.
    pub step_ratio: f64,
}

impl Default for CarouselConfig {
    fn default() -> Self {
        Self {
            interval_ms: 8000,
            step_ratio: 0.8,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertConfig {
    pub delay_ms: i64,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self { delay_ms: 4000 }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnhanceConfig {
    pub selectors: Selectors,
    pub hero: HeroConfig,
    pub header: HeaderConfig,
    pub carousel: CarouselConfig,
    pub alerts: AlertConfig,
}

impl EnhanceConfig {
    pub fn with_slides<I, S>(mut self, slides: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.hero.slides = slides.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_hero_interval_ms(mut self, interval_ms: i64) -> Self {
        self.hero.interval_ms = interval_ms;
        self
    }

    pub fn with_header_threshold_px(mut self, threshold_px: f64) -> Self {
        self.header.threshold_px = threshold_px;
        self
    }

    pub fn with_carousel_interval_ms(mut self, interval_ms: i64) -> Self {
        self.carousel.interval_ms = interval_ms;
        self
    }

    pub fn with_carousel_step_ratio(mut self, step_ratio: f64) -> Self {
        self.carousel.step_ratio = step_ratio;
        self
    }

    pub fn with_alert_delay_ms(mut self, delay_ms: i64) -> Self {
        self.alerts.delay_ms = delay_ms;
        self
    }

    pub fn with_selectors(mut self, selectors: Selectors) -> Self {
        self.selectors = selectors;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.hero.slides.is_empty() {
            return Err(Error::InvalidConfig("hero needs at least one slide".into()));
        }
        if let Some(blank) = self.hero.slides.iter().position(|s| s.trim().is_empty()) {
            return Err(Error::InvalidConfig(format!("hero slide {blank} is blank")));
        }
        if self.hero.interval_ms <= 0 {
            return Err(Error::InvalidConfig(format!(
                "hero interval must be positive, got {}",
                self.hero.interval_ms
            )));
        }
        if !(self.header.threshold_px.is_finite() && self.header.threshold_px >= 0.0) {
            return Err(Error::InvalidConfig(format!(
                "header threshold must be a non-negative number, got {}",
                self.header.threshold_px
            )));
        }
        if self.carousel.interval_ms <= 0 {
            return Err(Error::InvalidConfig(format!(
                "carousel interval must be positive, got {}",
                self.carousel.interval_ms
            )));
        }
        if !(self.carousel.step_ratio > 0.0 && self.carousel.step_ratio <= 1.0) {
            return Err(Error::InvalidConfig(format!(
                "carousel step ratio must be in (0, 1], got {}",
                self.carousel.step_ratio
            )));
        }
        if self.alerts.delay_ms <= 0 {
            return Err(Error::InvalidConfig(format!(
                "alert delay must be positive, got {}",
                self.alerts.delay_ms
            )));
        }
        for class_name in [&self.hero.active_class, &self.header.scrolled_class] {
            if class_name.is_empty() || class_name.contains(char::is_whitespace) {
                return Err(Error::InvalidConfig(format!(
                    "invalid class name {class_name:?}"
                )));
            }
        }
        Ok(())
    }
}
