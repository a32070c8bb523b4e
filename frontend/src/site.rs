//! Startup ordering for all page behaviour.

use chrono::Datelike;
use gloo_timers::future::TimeoutFuture;
use log::{info, warn};
use wasm_bindgen_futures::spawn_local;
use web_sys::{Document, Window};

use crate::config::SiteConfig;
use crate::error::SiteError;
use crate::{bars, cards, counter, dom, faq, nav, reveal, scroll, theme};

const YEAR_ID: &str = "year";

fn report(feature: &str, result: Result<(), SiteError>) {
    if let Err(e) = result {
        warn!("{} disabled: {}", feature, e);
    }
}

pub fn year_text<D: Datelike>(date: &D) -> String {
    date.year().to_string()
}

fn wire_year(document: &Document) -> Result<(), SiteError> {
    if let Some(el) = document.get_element_by_id(YEAR_ID) {
        el.set_text_content(Some(year_text(&chrono::Local::now()).as_str()));
    }
    Ok(())
}

/// Ready states in which `DOMContentLoaded` has already fired.
pub fn is_ready(ready_state: &str) -> bool {
    ready_state != "loading"
}

fn start_deferred(document: Document, config: SiteConfig) {
    spawn_local(async move {
        TimeoutFuture::new(config.start_delay_ms).await;
        report("bar fill", bars::wire(&document, &config));
        report("counters", counter::wire(&document, &config));
        report("card hover", cards::wire(&document));
        info!("Deferred animations ready");
    });
}

fn schedule_deferred(document: &Document, config: SiteConfig) -> Result<(), SiteError> {
    if is_ready(&document.ready_state()) {
        start_deferred(document.clone(), config);
        return Ok(());
    }
    let doc = document.clone();
    let mut pending = Some(config);
    dom::listen(document, "DOMContentLoaded", move |_| {
        if let Some(config) = pending.take() {
            start_deferred(doc.clone(), config);
        }
    })
}

fn wire_all(window: &Window, document: &Document, config: SiteConfig) -> Result<(), SiteError> {
    report("smooth scroll", nav::wire_smooth_scroll(document));
    report("nav highlight", nav::wire_highlight(document, &config));
    report("scroll responders", scroll::wire(window, document, &config));
    report("theme", theme::wire(window, document, &config));
    report("footer year", wire_year(document));
    report("bar capture", bars::prepare(document));
    report("reveal", reveal::wire(document, &config));
    report("faq", faq::wire(document));
    schedule_deferred(document, config)
}

pub fn start() -> Result<(), SiteError> {
    let window = dom::window()?;
    let document = dom::document(&window)?;
    let config = SiteConfig::load(&document);
    wire_all(&window, &document, config)?;
    info!("Page interactivity wired");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn footer_shows_calendar_year() {
        let date = NaiveDate::from_ymd_opt(2031, 12, 31).unwrap();
        assert_eq!(year_text(&date), "2031");
    }

    #[test]
    fn ready_states() {
        assert!(!is_ready("loading"));
        assert!(is_ready("interactive"));
        assert!(is_ready("complete"));
    }
}
