use log::debug;
use web_sys::Document;

use crate::config::SiteConfig;
use crate::dom;
use crate::error::SiteError;
use crate::observer;

pub const REVEAL_SELECTOR: &str = ".reveal";
const VISIBLE_CLASS: &str = "visible";

pub fn wire(document: &Document, config: &SiteConfig) -> Result<(), SiteError> {
    let elements = dom::query_all(document, REVEAL_SELECTOR)?;
    debug!("Reveal: {} elements", elements.len());
    observer::observe_once(elements, config.reveal_threshold, |el| {
        dom::warn_on_failure("reveal element", dom::set_class(el, VISIBLE_CLASS, true));
    })
}
