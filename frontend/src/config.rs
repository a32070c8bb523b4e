use log::{warn, Level};
use serde::Deserialize;
use web_sys::Document;

use crate::error::SiteError;

/// Id of the optional `<script type="application/json">` block that overrides defaults.
pub const CONFIG_ELEMENT_ID: &str = "site-config";

#[cfg(debug_assertions)]
pub fn log_level() -> Level {
    Level::Debug  // Verbose wiring logs when running locally
}

#[cfg(not(debug_assertions))]
pub fn log_level() -> Level {
    Level::Info
}

/// Every tunable the page behaviour depends on. Any subset can be overridden
/// from the page, missing fields keep their defaults.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub theme_key: String,
    pub reveal_threshold: f64,
    pub bar_threshold: f64,
    pub counter_threshold: f64,
    pub nav_thresholds: Vec<f64>,
    pub nav_root_margin: String,
    pub back_to_top_offset: f64,
    pub header_shrink_offset: f64,
    pub counter_tick_ms: u32,
    pub counter_steps: u32,
    pub bar_max_delay_secs: f64,
    pub bar_duration: String,
    pub start_delay_ms: u32,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            theme_key: "enso_theme".to_string(),
            reveal_threshold: 0.15,
            bar_threshold: 0.3,
            counter_threshold: 0.5,
            nav_thresholds: vec![0.0, 0.2, 0.5, 1.0],
            nav_root_margin: "-25% 0px -70% 0px".to_string(),
            back_to_top_offset: 400.0,
            header_shrink_offset: 50.0,
            counter_tick_ms: 16,
            counter_steps: 60,
            bar_max_delay_secs: 0.3,
            bar_duration: "1.2s".to_string(),
            start_delay_ms: 100,
        }
    }
}

impl SiteConfig {
    pub fn from_json(text: &str) -> Result<Self, SiteError> {
        let config: Self = serde_json::from_str(text)?;
        Ok(config.sanitized())
    }

    /// Reads the page's config block, falling back to defaults when it is
    /// absent or malformed.
    pub fn load(document: &Document) -> Self {
        let Some(text) = document
            .get_element_by_id(CONFIG_ELEMENT_ID)
            .and_then(|el| el.text_content())
        else {
            return Self::default();
        };

        match Self::from_json(&text) {
            Ok(config) => config,
            Err(e) => {
                warn!("Ignoring #{}: {}", CONFIG_ELEMENT_ID, e);
                Self::default()
            }
        }
    }

    // Observer thresholds outside [0, 1] make IntersectionObserver throw.
    fn sanitized(mut self) -> Self {
        self.reveal_threshold = unit(self.reveal_threshold);
        self.bar_threshold = unit(self.bar_threshold);
        self.counter_threshold = unit(self.counter_threshold);
        self.nav_thresholds = self.nav_thresholds.into_iter().map(unit).collect();
        if self.nav_thresholds.is_empty() {
            self.nav_thresholds.push(0.0);
        }
        self.counter_steps = self.counter_steps.max(1);
        self.bar_max_delay_secs = self.bar_max_delay_secs.max(0.0);
        self
    }
}

fn unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_yields_defaults() {
        let config = SiteConfig::from_json("{}").unwrap();
        assert_eq!(config, SiteConfig::default());
        assert_eq!(config.theme_key, "enso_theme");
        assert_eq!(config.counter_steps, 60);
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let config = SiteConfig::from_json(r#"{"reveal_threshold": 0.4, "theme_key": "site_theme"}"#).unwrap();
        assert!((config.reveal_threshold - 0.4).abs() < f64::EPSILON);
        assert_eq!(config.theme_key, "site_theme");
        assert!((config.bar_threshold - 0.3).abs() < f64::EPSILON);
        assert_eq!(config.nav_root_margin, "-25% 0px -70% 0px");
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let config = SiteConfig::from_json(
            r#"{"counter_threshold": 3.0, "bar_threshold": -1.0, "nav_thresholds": [], "counter_steps": 0}"#,
        )
        .unwrap();
        assert!((config.counter_threshold - 1.0).abs() < f64::EPSILON);
        assert!(config.bar_threshold.abs() < f64::EPSILON);
        assert_eq!(config.nav_thresholds, vec![0.0]);
        assert_eq!(config.counter_steps, 1);
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        let result = SiteConfig::from_json("{ not json");
        assert!(matches!(result, Err(SiteError::Config(_))));
    }
}
