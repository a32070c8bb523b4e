//! Statistic counters that count up from zero once they scroll into view.

use gloo_timers::future::TimeoutFuture;
use log::debug;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Document, Element};

use crate::config::SiteConfig;
use crate::dom;
use crate::error::SiteError;
use crate::observer;

pub const STAT_SELECTOR: &str = ".stat-number";

const TEMPERATURE_MARK: &str = "°C";
const PERCENT_MARK: &str = "%";
const YEARS_MARK: &str = "ปี";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterFormat {
    Plain,
    Percentage,
    Temperature,
    YearsRange,
}

impl CounterFormat {
    pub fn detect(text: &str) -> Self {
        if text.contains(TEMPERATURE_MARK) {
            Self::Temperature
        } else if text.contains(PERCENT_MARK) {
            Self::Percentage
        } else if text.contains(YEARS_MARK) {
            Self::YearsRange
        } else {
            Self::Plain
        }
    }

    pub fn zero_text(self) -> &'static str {
        match self {
            Self::Plain => "0",
            Self::Percentage => "0%",
            Self::Temperature => "0°C",
            Self::YearsRange => "0 ปี",
        }
    }

    pub fn render(self, value: f64) -> String {
        let whole = value.floor();
        match self {
            Self::Plain => format!("{}", tenths(value)),
            Self::Temperature => format!("{}{}", tenths(value), TEMPERATURE_MARK),
            Self::Percentage => format!("{}{}", whole, PERCENT_MARK),
            Self::YearsRange => format!("{}-{} {}", whole, whole + 5.0, YEARS_MARK),
        }
    }

    pub fn is_complete(self, value: f64, target: f64) -> bool {
        value >= target
    }
}

fn tenths(value: f64) -> f64 {
    (value * 10.0).floor() / 10.0
}

/// Parses the leading decimal number of `text` the way a browser's
/// `parseFloat` does: "36.5°C" is 36.5, "1,200" is 1, "abc" is nothing.
pub fn parse_leading_number(text: &str) -> Option<f64> {
    let s = text.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }
    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if bytes.get(end) == Some(&b'.') {
        let frac_start = end + 1;
        let mut j = frac_start;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        digits += j - frac_start;
        if digits > 0 {
            end = j;
        }
    }
    if digits == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut j = end + 1;
        if matches!(bytes.get(j), Some(b'+' | b'-')) {
            j += 1;
        }
        let exp_start = j;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if j > exp_start {
            end = j;
        }
    }

    s[..end].parse::<f64>().ok()
}

#[derive(Debug, Clone, PartialEq)]
pub enum CounterStep {
    Render(String),
    Finished(String),
}

/// Linear count-up from 0 to the number in `final_text`.
#[derive(Debug, Clone)]
pub struct CounterAnimation {
    format: CounterFormat,
    final_text: String,
    target: f64,
    increment: f64,
    current: f64,
    ticks_left: u32,
    finished: bool,
}

impl CounterAnimation {
    /// Returns `None` when there is nothing to count: a missing, zero or
    /// negative target, or one too small to step towards, is already
    /// complete and the text is left alone.
    pub fn start(final_text: &str, steps: u32) -> Option<Self> {
        let target = parse_leading_number(final_text)?;
        if !target.is_finite() || target <= 0.0 {
            return None;
        }
        let steps = steps.max(1);
        let increment = target / f64::from(steps);
        if !increment.is_finite() || increment <= 0.0 {
            return None;
        }
        Some(Self {
            format: CounterFormat::detect(final_text),
            final_text: final_text.to_string(),
            target,
            increment,
            current: 0.0,
            // One spare tick absorbs float drift just below the target.
            ticks_left: steps.saturating_add(1),
            finished: false,
        })
    }

    pub fn initial_text(&self) -> &'static str {
        self.format.zero_text()
    }

    pub fn tick(&mut self) -> CounterStep {
        if self.finished {
            return CounterStep::Finished(self.final_text.clone());
        }
        self.current += self.increment;
        self.ticks_left = self.ticks_left.saturating_sub(1);
        if self.ticks_left == 0 || self.format.is_complete(self.current, self.target) {
            // Restore the authored text so float drift never shows.
            self.finished = true;
            CounterStep::Finished(self.final_text.clone())
        } else {
            CounterStep::Render(self.format.render(self.current))
        }
    }
}

pub fn wire(document: &Document, config: &SiteConfig) -> Result<(), SiteError> {
    let elements = dom::query_all(document, STAT_SELECTOR)?;
    debug!("Counters: {} stat numbers", elements.len());
    let tick_ms = config.counter_tick_ms;
    let steps = config.counter_steps;
    observer::observe_once(elements, config.counter_threshold, move |el| {
        run(el.clone(), tick_ms, steps);
    })
}

fn run(element: Element, tick_ms: u32, steps: u32) {
    let final_text = element.text_content().unwrap_or_default();
    let Some(mut animation) = CounterAnimation::start(&final_text, steps) else {
        debug!("Counter {:?} has no positive target, leaving as is", final_text);
        return;
    };
    element.set_text_content(Some(animation.initial_text()));

    spawn_local(async move {
        loop {
            TimeoutFuture::new(tick_ms).await;
            if !element.is_connected() {
                debug!("Counter element left the document, stopping");
                break;
            }
            match animation.tick() {
                CounterStep::Render(text) => element.set_text_content(Some(text.as_str())),
                CounterStep::Finished(text) => {
                    element.set_text_content(Some(text.as_str()));
                    break;
                }
            }
        }
    });
}
