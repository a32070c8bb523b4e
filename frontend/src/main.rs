use log::{error, info};

mod bars;
mod cards;
mod config;
mod counter;
mod dom;
mod error;
mod faq;
mod nav;
mod observer;
mod reveal;
mod scroll;
mod site;
mod theme;

fn main() {
    // Initialize console error panic hook for better error messages
    console_error_panic_hook::set_once();

    // Initialize logging
    console_log::init_with_level(config::log_level()).expect("error initializing log");

    info!("Starting page interactivity");
    if let Err(e) = site::start() {
        error!("Page interactivity unavailable: {}", e);
    }
}
