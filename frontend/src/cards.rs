use log::debug;
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlElement};

use crate::dom;
use crate::error::SiteError;

pub const CARD_SELECTOR: &str = ".stat-card, .region-card, .gallery-item";
const REST_TRANSFORM: &str = "none";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardKind {
    Stat,
    Region,
    Gallery,
}

impl CardKind {
    pub fn classify(class_name: &str) -> Self {
        let has = |class: &str| class_name.split_whitespace().any(|c| c == class);
        if has("stat-card") {
            Self::Stat
        } else if has("region-card") {
            Self::Region
        } else {
            Self::Gallery
        }
    }

    pub fn hover_transform(self) -> &'static str {
        match self {
            Self::Stat | Self::Gallery => "scale(1.02)",
            Self::Region => "translateY(-2px)",
        }
    }
}

fn set_transform(card: &HtmlElement, transform: &str) {
    dom::warn_on_failure(
        "set card transform",
        card.style().set_property("transform", transform).map_err(SiteError::from),
    );
}

pub fn wire(document: &Document) -> Result<(), SiteError> {
    let cards = dom::query_all(document, CARD_SELECTOR)?;
    debug!("Cards: {} hover targets", cards.len());
    for card in cards {
        let Ok(card) = card.dyn_into::<HtmlElement>() else {
            continue;
        };
        let entered = card.clone();
        dom::listen(&card, "mouseenter", move |_| {
            let kind = CardKind::classify(&entered.class_name());
            set_transform(&entered, kind.hover_transform());
        })?;
        let left = card.clone();
        dom::listen(&card, "mouseleave", move |_| {
            set_transform(&left, REST_TRANSFORM);
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hover_transforms_by_kind() {
        assert_eq!(CardKind::classify("stat-card reveal").hover_transform(), "scale(1.02)");
        assert_eq!(CardKind::classify("card region-card").hover_transform(), "translateY(-2px)");
        assert_eq!(CardKind::classify("gallery-item").hover_transform(), "scale(1.02)");
    }

    #[test]
    fn stat_wins_over_region() {
        assert_eq!(CardKind::classify("region-card stat-card"), CardKind::Stat);
    }

    #[test]
    fn class_match_is_whole_word() {
        assert_eq!(CardKind::classify("stat-card-wide region-card"), CardKind::Region);
    }
}
