use log::{error, info, Level};

fn main() {
    // Initialize console error panic hook for better error messages
    console_error_panic_hook::set_once();

    // Initialize logging
    console_log::init_with_level(Level::Info).expect("error initializing log");

    info!("Starting page scripts");
    if let Err(e) = team_site::run() {
        error!("Page scripts did not start: {}", e);
    }
}
