//! Interactive chart preview
//!
//! Hosts one preview session in the terminal: the rendered chart's row
//! table on screen, mouse hover showing the identifier under the cursor,
//! mouse click opening the identifier's source location in `$EDITOR`,
//! repeated rapid clicks stepping through all of its occurrences.

mod app;
mod event;
mod ui;

use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

use anyhow::{anyhow, Result};

use super::output::Output;
use super::render_cmd::RenderArgs;
use crate::config::Config;

use app::App;
use event::EventHandler;

/// Launch the preview TUI
pub fn run(output: &Output, file: &Path, args: &RenderArgs) -> Result<()> {
    let config = Config::for_plan(file)?;
    let options = args.apply(config.preview.clone());

    output.verbose_ctx("preview", "Initializing preview session");

    // Initialize terminal
    let mut terminal = ui::init_terminal()?;

    // Create app state
    let mut app = App::new(file, &config, options);

    // Create event handler
    let event_handler = EventHandler::new(250);

    // Run the main loop with panic safety
    // This ensures terminal is restored even if the app panics
    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        app.run(&mut terminal, event_handler)
    }));

    // Always restore terminal, even on panic
    let restore_result = ui::restore_terminal();

    // Handle the result
    match result {
        Ok(inner_result) => {
            restore_result?;
            inner_result
        }
        Err(panic_payload) => {
            // Try to restore terminal first
            let _ = restore_result;
            // Re-raise the panic with context
            if let Some(s) = panic_payload.downcast_ref::<&str>() {
                Err(anyhow!("Preview panicked: {}", s))
            } else if let Some(s) = panic_payload.downcast_ref::<String>() {
                Err(anyhow!("Preview panicked: {}", s))
            } else {
                Err(anyhow!("Preview panicked with unknown error"))
            }
        }
    }
}
