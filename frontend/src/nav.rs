use std::cell::RefCell;
use std::rc::Rc;

use log::debug;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, ScrollBehavior, ScrollIntoViewOptions, ScrollLogicalPosition};

use crate::config::SiteConfig;
use crate::dom;
use crate::error::SiteError;
use crate::observer;

pub const NAV_LINK_SELECTOR: &str = ".main-nav a";
const IN_PAGE_LINK_SELECTOR: &str = r##"a[href^="#"]"##;
const ACTIVE_CLASS: &str = "active";

/// An href that points somewhere on this page. A bare `#` does not.
pub fn in_page_target(href: &str) -> Option<&str> {
    (href.starts_with('#') && href.len() > 1).then_some(href)
}

/// Which navigation link is active. At most one ever is.
#[derive(Debug, Clone)]
pub struct NavHighlight {
    hrefs: Vec<String>,
    active: Option<usize>,
}

impl NavHighlight {
    pub fn new(hrefs: Vec<String>) -> Self {
        Self { hrefs, active: None }
    }

    /// Marks the first link pointing at `section_id`. Returns its index, or
    /// `None` (leaving the current link active) if no link targets it.
    pub fn section_intersecting(&mut self, section_id: &str) -> Option<usize> {
        let wanted = format!("#{}", section_id);
        let index = self.hrefs.iter().position(|href| *href == wanted)?;
        self.active = Some(index);
        Some(index)
    }

    pub fn active(&self) -> Option<usize> {
        self.active
    }
}

pub fn wire_smooth_scroll(document: &Document) -> Result<(), SiteError> {
    let doc = document.clone();
    dom::listen(document, "click", move |event| {
        let Some(origin) = event.target().and_then(|t| t.dyn_into::<Element>().ok()) else {
            return;
        };
        let Ok(Some(link)) = origin.closest(IN_PAGE_LINK_SELECTOR) else {
            return;
        };
        let href = link.get_attribute("href").unwrap_or_default();
        let Some(target_id) = in_page_target(&href) else {
            return;
        };
        // Hrefs like "#1-intro" are not valid selectors; treat them as missing.
        if let Ok(Some(section)) = doc.query_selector(target_id) {
            event.prevent_default();
            let options = ScrollIntoViewOptions::new();
            options.set_behavior(ScrollBehavior::Smooth);
            options.set_block(ScrollLogicalPosition::Start);
            section.scroll_into_view_with_scroll_into_view_options(&options);
        }
    })
}

pub fn wire_highlight(document: &Document, config: &SiteConfig) -> Result<(), SiteError> {
    let links = dom::query_all(document, NAV_LINK_SELECTOR)?;
    let hrefs: Vec<String> = links
        .iter()
        .map(|link| link.get_attribute("href").unwrap_or_default())
        .collect();

    let sections: Vec<Element> = hrefs
        .iter()
        .filter_map(|href| in_page_target(href))
        .filter_map(|id| document.query_selector(id).ok().flatten())
        .collect();
    debug!("Nav: {} links, {} sections", links.len(), sections.len());

    let highlight = Rc::new(RefCell::new(NavHighlight::new(hrefs)));
    observer::watch(
        sections,
        &config.nav_thresholds,
        Some(config.nav_root_margin.as_str()),
        move |_, entry, _| {
            if !entry.is_intersecting() {
                return;
            }
            let mut highlight = highlight.borrow_mut();
            let previous = highlight.active();
            let Some(index) = highlight.section_intersecting(&entry.target().id()) else {
                return;
            };
            if previous == Some(index) {
                return;
            }
            for (i, link) in links.iter().enumerate() {
                dom::warn_on_failure("update nav link", dom::set_class(link, ACTIVE_CLASS, i == index));
            }
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn links() -> NavHighlight {
        NavHighlight::new(vec![
            "#overview".to_string(),
            "#risks".to_string(),
            "#faq".to_string(),
        ])
    }

    #[test]
    fn in_page_targets() {
        assert_eq!(in_page_target("#faq"), Some("#faq"));
        assert_eq!(in_page_target("#"), None);
        assert_eq!(in_page_target("/about#faq"), None);
        assert_eq!(in_page_target(""), None);
    }

    #[test]
    fn nothing_active_until_a_section_intersects() {
        assert_eq!(links().active(), None);
    }

    #[test]
    fn exactly_one_link_active_while_scrolling() {
        let mut nav = links();
        for id in ["overview", "risks", "faq", "risks", "overview"] {
            let index = nav.section_intersecting(id);
            assert_eq!(index, nav.active());
            assert!(nav.active().is_some());
        }
        assert_eq!(nav.active(), Some(0));
    }

    #[test]
    fn unknown_section_keeps_current_link() {
        let mut nav = links();
        nav.section_intersecting("risks");
        assert_eq!(nav.section_intersecting("footer"), None);
        assert_eq!(nav.active(), Some(1));
    }

    #[test]
    fn duplicate_hrefs_resolve_to_first_link() {
        let mut nav = NavHighlight::new(vec!["#a".to_string(), "#a".to_string()]);
        assert_eq!(nav.section_intersecting("a"), Some(0));
    }
}
