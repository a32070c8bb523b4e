//! Viewport observation.
//!
//! The browser side only forwards `IntersectionObserver` entries. Whether an
//! entry fires is decided by [`TriggerState`], so an element that has fired
//! once stays fired no matter what the browser reports afterwards.

use std::cell::RefCell;
use std::rc::Rc;

use log::debug;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::js_sys::Array;
use web_sys::{Element, IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit, Node};

use crate::error::SiteError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Visibility {
    pub is_intersecting: bool,
    pub ratio: f64,
}

/// Browsers may report the ratio of a threshold-crossing entry slightly
/// under the threshold itself.
const RATIO_TOLERANCE: f64 = 1e-3;

impl Visibility {
    pub fn satisfies(&self, threshold: f64) -> bool {
        self.is_intersecting && self.ratio + RATIO_TOLERANCE >= threshold
    }
}

impl From<&IntersectionObserverEntry> for Visibility {
    fn from(entry: &IntersectionObserverEntry) -> Self {
        Self {
            is_intersecting: entry.is_intersecting(),
            ratio: entry.intersection_ratio(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TriggerState {
    #[default]
    Pending,
    Triggered,
}

impl TriggerState {
    /// Returns the next state and whether this event fired the trigger.
    pub fn observe(self, visibility: Visibility, threshold: f64) -> (Self, bool) {
        match self {
            Self::Pending if visibility.satisfies(threshold) => (Self::Triggered, true),
            state => (state, false),
        }
    }
}

/// One-shot trigger states for a fixed, ordered set of elements.
#[derive(Debug, Clone)]
pub struct OneShotSet {
    states: Vec<TriggerState>,
    threshold: f64,
}

impl OneShotSet {
    pub fn new(len: usize, threshold: f64) -> Self {
        Self {
            states: vec![TriggerState::Pending; len],
            threshold,
        }
    }

    /// Feeds one visibility event for the element at `index`. Returns true
    /// exactly once per element.
    pub fn observe(&mut self, index: usize, visibility: Visibility) -> bool {
        let Some(state) = self.states.get_mut(index) else {
            return false;
        };
        let (next, fired) = state.observe(visibility, self.threshold);
        *state = next;
        fired
    }

    pub fn pending(&self) -> usize {
        self.states
            .iter()
            .filter(|s| **s == TriggerState::Pending)
            .count()
    }
}

type EntryCallback = Closure<dyn FnMut(Array, IntersectionObserver)>;

fn build_observer(
    thresholds: &[f64],
    root_margin: Option<&str>,
    callback: &EntryCallback,
) -> Result<IntersectionObserver, SiteError> {
    let options = IntersectionObserverInit::new();
    let list = Array::new();
    for threshold in thresholds {
        list.push(&JsValue::from_f64(*threshold));
    }
    options.set_threshold(&list);
    if let Some(margin) = root_margin {
        options.set_root_margin(margin);
    }
    Ok(IntersectionObserver::new_with_options(
        callback.as_ref().unchecked_ref(),
        &options,
    )?)
}

/// Observes `elements` for the lifetime of the page and hands every entry to
/// `on_entry` together with the index of its target in `elements`.
pub fn watch<F>(
    elements: Vec<Element>,
    thresholds: &[f64],
    root_margin: Option<&str>,
    mut on_entry: F,
) -> Result<(), SiteError>
where
    F: FnMut(usize, &IntersectionObserverEntry, &IntersectionObserver) + 'static,
{
    if elements.is_empty() {
        return Ok(());
    }

    let targets = elements.clone();
    let callback: EntryCallback = Closure::new(move |entries: Array, observer: IntersectionObserver| {
        for entry in entries.iter() {
            let Ok(entry) = entry.dyn_into::<IntersectionObserverEntry>() else {
                continue;
            };
            let target = entry.target();
            let node: &Node = &target;
            if let Some(index) = targets.iter().position(|el| el.is_same_node(Some(node))) {
                on_entry(index, &entry, &observer);
            }
        }
    });

    let observer = build_observer(thresholds, root_margin, &callback)?;
    for element in &elements {
        observer.observe(element);
    }
    callback.forget();
    Ok(())
}

/// Runs `on_trigger` the first time each element is at least `threshold`
/// visible, then stops watching it.
pub fn observe_once<F>(elements: Vec<Element>, threshold: f64, mut on_trigger: F) -> Result<(), SiteError>
where
    F: FnMut(&Element) + 'static,
{
    let tracked = Rc::new(RefCell::new(OneShotSet::new(elements.len(), threshold)));
    watch(elements, &[threshold], None, move |index, entry, observer| {
        let fired = tracked.borrow_mut().observe(index, Visibility::from(entry));
        if fired {
            let target = entry.target();
            on_trigger(&target);
            observer.unobserve(&target);
            debug!("{} observed elements still pending", tracked.borrow().pending());
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn visible(ratio: f64) -> Visibility {
        Visibility { is_intersecting: true, ratio }
    }

    fn hidden() -> Visibility {
        Visibility { is_intersecting: false, ratio: 0.0 }
    }

    #[test]
    fn pending_fires_once_threshold_is_reached() {
        let (state, fired) = TriggerState::Pending.observe(visible(0.15), 0.15);
        assert_eq!(state, TriggerState::Triggered);
        assert!(fired);
    }

    #[test]
    fn below_threshold_stays_pending() {
        let (state, fired) = TriggerState::Pending.observe(visible(0.1), 0.15);
        assert_eq!(state, TriggerState::Pending);
        assert!(!fired);
    }

    #[test]
    fn crossing_reported_just_under_threshold_fires() {
        let (state, fired) = TriggerState::Pending.observe(visible(0.4996), 0.5);
        assert_eq!(state, TriggerState::Triggered);
        assert!(fired);

        let (state, fired) = TriggerState::Pending.observe(visible(0.49), 0.5);
        assert_eq!(state, TriggerState::Pending);
        assert!(!fired);
    }

    #[test]
    fn non_intersecting_entry_never_fires_even_with_ratio() {
        let entry = Visibility { is_intersecting: false, ratio: 1.0 };
        let (state, fired) = TriggerState::Pending.observe(entry, 0.5);
        assert_eq!(state, TriggerState::Pending);
        assert!(!fired);
    }

    #[test]
    fn triggered_ignores_later_events() {
        let (state, fired) = TriggerState::Triggered.observe(visible(1.0), 0.0);
        assert_eq!(state, TriggerState::Triggered);
        assert!(!fired);
    }

    #[test]
    fn reveal_cycles_fire_exactly_once() {
        let mut set = OneShotSet::new(1, 0.15);
        let events = [hidden(), visible(0.2), hidden(), visible(0.9), hidden(), visible(0.5)];
        let fired: Vec<bool> = events.iter().map(|v| set.observe(0, *v)).collect();
        assert_eq!(fired, vec![false, true, false, false, false, false]);
        assert_eq!(set.pending(), 0);
    }

    #[test]
    fn elements_trigger_independently() {
        let mut set = OneShotSet::new(3, 0.5);
        assert!(set.observe(2, visible(0.6)));
        assert!(!set.observe(0, visible(0.4)));
        assert_eq!(set.pending(), 2);
        assert!(set.observe(0, visible(0.5)));
        assert!(!set.observe(2, visible(1.0)));
        assert_eq!(set.pending(), 1);
    }

    #[test]
    fn unknown_index_is_ignored() {
        let mut set = OneShotSet::new(1, 0.3);
        assert!(!set.observe(5, visible(1.0)));
        assert_eq!(set.pending(), 1);
    }

    #[test]
    fn never_visible_elements_never_fire() {
        let mut set = OneShotSet::new(2, 0.3);
        for _ in 0..10 {
            set.observe(0, hidden());
            set.observe(1, visible(0.29));
        }
        assert_eq!(set.pending(), 2);
    }
}
