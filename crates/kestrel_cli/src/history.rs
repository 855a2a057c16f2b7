use rustyline::{history::FileHistory, Editor, Helper};
use std::path::PathBuf;
use tracing::debug;

/// Persistent line history lives at `~/.kestrel_history`.
pub fn history_path() -> Option<PathBuf> {
    dirs_next::home_dir().map(|home| home.join(".kestrel_history"))
}

/// Load prior session history into the editor. Missing or unreadable
/// history is not an error.
pub fn load_history<H: Helper>(rl: &mut Editor<H, FileHistory>) {
    if let Some(path) = history_path() {
        if path.exists() {
            match rl.load_history(&path) {
                Ok(_) => debug!("Loaded history from {}", path.display()),
                Err(e) => debug!("Could not load history: {}", e),
            }
        }
    }
}

/// Persist the session history at shell exit.
pub fn save_history<H: Helper>(rl: &mut Editor<H, FileHistory>) {
    if let Some(path) = history_path() {
        match rl.save_history(&path) {
            Ok(_) => debug!("Saved history to {}", path.display()),
            Err(e) => debug!("Could not save history: {}", e),
        }
    }
}
