//! Probability, impact and anomaly bars that grow to their authored size
//! the first time they are seen.

use log::debug;
use wasm_bindgen::JsCast;
use web_sys::js_sys::Math;
use web_sys::{Document, Element, HtmlElement};

use crate::config::SiteConfig;
use crate::dom;
use crate::error::SiteError;
use crate::observer;

const KEYFRAMES_ID: &str = "fill-bar-keyframes";
const ANIMATION_NAME: &str = "fillBar";

pub const FILL_KEYFRAMES: &str = r#"
  @keyframes fillBar {
    from { width: 0; height: 0; }
    to { width: var(--final-width, 100%); height: var(--final-height, 100%); }
  }
  .prob-fill, .impact-fill { --final-width: var(--width); }
  .anomaly-bar { --final-height: var(--height); }
"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarAxis {
    Width,
    Height,
}

impl BarAxis {
    pub const ALL: [BarAxis; 2] = [BarAxis::Width, BarAxis::Height];

    pub fn selector(self) -> &'static str {
        match self {
            Self::Width => ".prob-fill, .impact-fill",
            Self::Height => ".anomaly-bar",
        }
    }

    pub fn dimension(self) -> &'static str {
        match self {
            Self::Width => "width",
            Self::Height => "height",
        }
    }

    pub fn custom_property(self) -> &'static str {
        match self {
            Self::Width => "--width",
            Self::Height => "--height",
        }
    }

    /// Style writes that park the authored size in the custom property and
    /// collapse the bar. The custom property comes first so the size is
    /// read before it is zeroed.
    pub fn collapse(self, authored: &str) -> [(&'static str, String); 2] {
        [
            (self.custom_property(), authored.to_string()),
            (self.dimension(), "0".to_string()),
        ]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FillAnimation {
    delay_secs: f64,
    duration: String,
}

impl FillAnimation {
    /// `unit` is a random draw in [0, 1).
    pub fn new(unit: f64, max_delay_secs: f64, duration: &str) -> Self {
        Self {
            delay_secs: unit.clamp(0.0, 1.0) * max_delay_secs,
            duration: duration.to_string(),
        }
    }

    pub fn declarations(&self) -> [(&'static str, String); 4] {
        [
            ("animation-delay", format!("{}s", self.delay_secs)),
            ("animation-name", ANIMATION_NAME.to_string()),
            ("animation-duration", self.duration.clone()),
            ("animation-fill-mode", "forwards".to_string()),
        ]
    }
}

fn apply(element: &Element, declarations: &[(&'static str, String)]) -> Result<(), SiteError> {
    let Some(html) = element.dyn_ref::<HtmlElement>() else {
        return Ok(());
    };
    let style = html.style();
    for (property, value) in declarations {
        style.set_property(property, value)?;
    }
    Ok(())
}

fn inject_keyframes(document: &Document) -> Result<(), SiteError> {
    if document.get_element_by_id(KEYFRAMES_ID).is_some() {
        return Ok(());
    }
    let Some(head) = document.head() else {
        return Ok(());
    };
    let style = document.create_element("style")?;
    style.set_id(KEYFRAMES_ID);
    style.set_text_content(Some(FILL_KEYFRAMES));
    head.append_child(&style)?;
    Ok(())
}

/// Captures every bar's authored size and collapses it. Runs at startup,
/// before the bars are observed.
pub fn prepare(document: &Document) -> Result<(), SiteError> {
    inject_keyframes(document)?;
    for axis in BarAxis::ALL {
        let bars = dom::query_all(document, axis.selector())?;
        debug!("Bars: collapsing {} by {}", bars.len(), axis.dimension());
        for bar in &bars {
            let Some(html) = bar.dyn_ref::<HtmlElement>() else {
                continue;
            };
            let authored = html.style().get_property_value(axis.dimension())?;
            apply(bar, &axis.collapse(&authored))?;
        }
    }
    Ok(())
}

pub fn wire(document: &Document, config: &SiteConfig) -> Result<(), SiteError> {
    let mut bars = Vec::new();
    for axis in BarAxis::ALL {
        bars.extend(dom::query_all(document, axis.selector())?);
    }
    debug!("Bars: observing {}", bars.len());

    let max_delay = config.bar_max_delay_secs;
    let duration = config.bar_duration.clone();
    observer::observe_once(bars, config.bar_threshold, move |bar| {
        let animation = FillAnimation::new(Math::random(), max_delay, &duration);
        dom::warn_on_failure("start bar fill", apply(bar, &animation.declarations()));
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::{OneShotSet, Visibility};

    #[test]
    fn collapse_parks_size_before_zeroing() {
        let writes = BarAxis::Width.collapse("72%");
        assert_eq!(writes[0], ("--width", "72%".to_string()));
        assert_eq!(writes[1], ("width", "0".to_string()));

        let writes = BarAxis::Height.collapse("40px");
        assert_eq!(writes[0], ("--height", "40px".to_string()));
        assert_eq!(writes[1], ("height", "0".to_string()));
    }

    #[test]
    fn keyframes_read_back_the_captured_properties() {
        for axis in BarAxis::ALL {
            assert!(FILL_KEYFRAMES.contains(&format!("var({})", axis.custom_property())));
        }
        assert!(FILL_KEYFRAMES.contains(ANIMATION_NAME));
    }

    #[test]
    fn fill_delay_stays_within_bounds() {
        let earliest = FillAnimation::new(0.0, 0.3, "1.2s");
        assert_eq!(earliest.declarations()[0], ("animation-delay", "0s".to_string()));

        let latest = FillAnimation::new(0.999, 0.3, "1.2s");
        assert!(latest.delay_secs < 0.3);

        let clamped = FillAnimation::new(4.0, 0.3, "1.2s");
        assert!((clamped.delay_secs - 0.3).abs() < 1e-12);
    }

    #[test]
    fn fill_declarations_run_forwards() {
        let decls = FillAnimation::new(0.5, 0.3, "1.2s").declarations();
        assert_eq!(decls[1], ("animation-name", "fillBar".to_string()));
        assert_eq!(decls[2], ("animation-duration", "1.2s".to_string()));
        assert_eq!(decls[3], ("animation-fill-mode", "forwards".to_string()));
    }

    #[test]
    fn bars_fill_once_across_view_cycles() {
        let mut set = OneShotSet::new(1, 0.3);
        let seen = Visibility { is_intersecting: true, ratio: 0.35 };
        let gone = Visibility { is_intersecting: false, ratio: 0.0 };
        let fills = [seen, gone, seen, gone, seen]
            .iter()
            .filter(|v| set.observe(0, **v))
            .count();
        assert_eq!(fills, 1);
    }
}
