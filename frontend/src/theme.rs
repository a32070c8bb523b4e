//! Light/dark theme, persisted under a single storage key.

use std::cell::RefCell;
use std::rc::Rc;

use log::{debug, warn};
use web_sys::{Document, Storage, Window};

use crate::config::SiteConfig;
use crate::dom;
use crate::error::SiteError;

const TOGGLE_ID: &str = "themeToggle";
const THEME_ATTRIBUTE: &str = "data-theme";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Dark => "dark",
            Self::Light => "light",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "dark" => Some(Self::Dark),
            "light" => Some(Self::Light),
            _ => None,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }
}

pub trait PreferenceStore {
    fn load(&self) -> Option<Theme>;
    fn save(&mut self, theme: Theme) -> Result<(), SiteError>;
}

/// `window.localStorage`. When storage is unavailable (blocked cookies,
/// some private modes) nothing is remembered.
pub struct LocalStorage {
    storage: Option<Storage>,
    key: String,
}

impl LocalStorage {
    pub fn open(window: &Window, key: &str) -> Self {
        Self {
            storage: window.local_storage().ok().flatten(),
            key: key.to_string(),
        }
    }
}

impl PreferenceStore for LocalStorage {
    fn load(&self) -> Option<Theme> {
        let value = self.storage.as_ref()?.get_item(&self.key).ok().flatten()?;
        Theme::parse(&value)
    }

    fn save(&mut self, theme: Theme) -> Result<(), SiteError> {
        if let Some(storage) = &self.storage {
            storage.set_item(&self.key, theme.as_str())?;
        }
        Ok(())
    }
}

pub struct ThemeController<S> {
    store: S,
    stored: Option<Theme>,
    current: Theme,
}

impl<S: PreferenceStore> ThemeController<S> {
    /// `document_theme` is whatever the markup already declares; a stored
    /// preference wins over it, and dark is assumed when neither exists.
    pub fn new(store: S, document_theme: Option<Theme>) -> Self {
        let stored = store.load();
        Self {
            current: stored.or(document_theme).unwrap_or_default(),
            stored,
            store,
        }
    }

    /// The theme to apply at startup, if one was remembered.
    pub fn stored(&self) -> Option<Theme> {
        self.stored
    }

    pub fn current(&self) -> Theme {
        self.current
    }

    /// Flips the theme and persists it. The new theme is returned even if
    /// persisting fails.
    pub fn toggle(&mut self) -> (Theme, Result<(), SiteError>) {
        self.current = self.current.toggled();
        self.stored = Some(self.current);
        (self.current, self.store.save(self.current))
    }
}

fn apply(document: &Document, theme: Theme) -> Result<(), SiteError> {
    if let Some(root) = document.document_element() {
        root.set_attribute(THEME_ATTRIBUTE, theme.as_str())?;
    }
    Ok(())
}

fn document_theme(document: &Document) -> Option<Theme> {
    let value = document.document_element()?.get_attribute(THEME_ATTRIBUTE)?;
    Theme::parse(&value)
}

pub fn wire(window: &Window, document: &Document, config: &SiteConfig) -> Result<(), SiteError> {
    let store = LocalStorage::open(window, &config.theme_key);
    let controller = ThemeController::new(store, document_theme(document));
    debug!("Theme: starting as {}", controller.current().as_str());
    if let Some(theme) = controller.stored() {
        debug!("Theme: restoring {}", theme.as_str());
        apply(document, theme)?;
    }

    let Some(toggle) = document.get_element_by_id(TOGGLE_ID) else {
        return Ok(());
    };
    let controller = Rc::new(RefCell::new(controller));
    let doc = document.clone();
    dom::listen(&toggle, "click", move |_| {
        let (next, saved) = controller.borrow_mut().toggle();
        if let Err(e) = apply(&doc, next) {
            warn!("Could not apply theme: {}", e);
        }
        if let Err(e) = saved {
            warn!("Could not remember theme: {}", e);
        }
    })
}
