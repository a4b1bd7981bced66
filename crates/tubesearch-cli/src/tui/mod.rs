mod app;
mod events;
mod layout;
mod render;
mod terminal;

pub use app::App;

use crate::error::CliError;
use terminal::TerminalManager;

/// Runs the interactive UI until the user quits.
pub fn run(app: &mut App) -> Result<(), CliError> {
    let mut manager = TerminalManager::new()?;
    let result = app.run(manager.terminal_mut());
    manager.restore()?;
    result
}
