use log::debug;
use web_sys::{Document, ScrollBehavior, ScrollToOptions, Window};

use crate::config::SiteConfig;
use crate::dom;
use crate::error::SiteError;

const BACK_TO_TOP_ID: &str = "backToTop";
const HEADER_SELECTOR: &str = ".site-header";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollLimits {
    pub back_to_top_offset: f64,
    pub header_shrink_offset: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollResponse {
    pub show_back_to_top: bool,
    pub header_scrolled: bool,
}

impl ScrollLimits {
    pub fn from_config(config: &SiteConfig) -> Self {
        Self {
            back_to_top_offset: config.back_to_top_offset,
            header_shrink_offset: config.header_shrink_offset,
        }
    }

    pub fn respond(&self, scroll_y: f64) -> ScrollResponse {
        ScrollResponse {
            show_back_to_top: scroll_y > self.back_to_top_offset,
            header_scrolled: scroll_y > self.header_shrink_offset,
        }
    }
}

pub fn wire(window: &Window, document: &Document, config: &SiteConfig) -> Result<(), SiteError> {
    let back_to_top = document.get_element_by_id(BACK_TO_TOP_ID);
    let header = document.query_selector(HEADER_SELECTOR)?;
    debug!(
        "Scroll: back-to-top {}, header {}",
        back_to_top.is_some(),
        header.is_some()
    );
    if back_to_top.is_none() && header.is_none() {
        return Ok(());
    }

    if let Some(button) = &back_to_top {
        let win = window.clone();
        dom::listen(button, "click", move |_| {
            let options = ScrollToOptions::new();
            options.set_top(0.0);
            options.set_behavior(ScrollBehavior::Smooth);
            win.scroll_to_with_scroll_to_options(&options);
        })?;
    }

    let limits = ScrollLimits::from_config(config);
    let win = window.clone();
    dom::listen(window, "scroll", move |_| {
        let Ok(scroll_y) = win.scroll_y() else {
            return;
        };
        let response = limits.respond(scroll_y);
        if let Some(button) = &back_to_top {
            dom::warn_on_failure("toggle back-to-top", dom::set_class(button, "show", response.show_back_to_top));
        }
        if let Some(header) = &header {
            dom::warn_on_failure("toggle header", dom::set_class(header, "scrolled", response.header_scrolled));
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_limits() {
        let limits = ScrollLimits::from_config(&SiteConfig::default());
        assert_eq!(
            limits.respond(0.0),
            ScrollResponse { show_back_to_top: false, header_scrolled: false }
        );
        assert_eq!(
            limits.respond(51.0),
            ScrollResponse { show_back_to_top: false, header_scrolled: true }
        );
        assert_eq!(
            limits.respond(401.0),
            ScrollResponse { show_back_to_top: true, header_scrolled: true }
        );
    }

    #[test]
    fn limits_are_exclusive() {
        let limits = ScrollLimits::from_config(&SiteConfig::default());
        let at_edges = (limits.respond(50.0), limits.respond(400.0));
        assert!(!at_edges.0.header_scrolled);
        assert!(!at_edges.1.show_back_to_top);
    }
}
