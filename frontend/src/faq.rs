use log::debug;
use web_sys::{Document, Element};

use crate::dom;
use crate::error::SiteError;

pub const QUESTION_SELECTOR: &str = ".faq-q";

/// Attribute values after one click on a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccordionToggle {
    pub expanded: bool,
    pub answer_hidden: Option<bool>,
}

/// Anything other than `"true"` counts as collapsed. `answer_hidden` is
/// `None` when the question has no answer sibling.
pub fn toggle(aria_expanded: Option<&str>, answer_hidden: Option<bool>) -> AccordionToggle {
    AccordionToggle {
        expanded: aria_expanded != Some("true"),
        answer_hidden: answer_hidden.map(|hidden| !hidden),
    }
}

fn on_click(question: &Element) -> Result<(), SiteError> {
    let answer = question.next_element_sibling();
    let next = toggle(
        question.get_attribute("aria-expanded").as_deref(),
        answer.as_ref().map(|a| a.has_attribute("hidden")),
    );
    question.set_attribute("aria-expanded", if next.expanded { "true" } else { "false" })?;
    if let (Some(answer), Some(hidden)) = (answer, next.answer_hidden) {
        if hidden {
            answer.set_attribute("hidden", "")?;
        } else {
            answer.remove_attribute("hidden")?;
        }
    }
    Ok(())
}

pub fn wire(document: &Document) -> Result<(), SiteError> {
    let questions = dom::query_all(document, QUESTION_SELECTOR)?;
    debug!("FAQ: {} questions", questions.len());
    for question in questions {
        let target = question.clone();
        dom::listen(&question, "click", move |_| {
            dom::warn_on_failure("toggle FAQ answer", on_click(&target));
        })?;
    }
    Ok(())
}
